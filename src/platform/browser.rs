//! Browser timers via `setInterval` / `setTimeout`

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{Scheduler, Task, TaskHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Interval,
    Timeout,
}

/// Scheduler backed by the window's timer functions
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl BrowserScheduler {
    fn schedule(&self, kind: Kind, ms: u32, task: Task) -> BrowserHandle {
        let timer_id: Rc<Cell<Option<i32>>> = Rc::default();
        let task: Task = match kind {
            Kind::Interval => task,
            // A fired timeout is no longer active
            Kind::Timeout => {
                let fired = timer_id.clone();
                let mut task = task;
                Box::new(move || {
                    fired.set(None);
                    task();
                })
            }
        };
        let closure = Closure::wrap(task);
        let ms = ms.min(i32::MAX as u32) as i32;
        let id = web_sys::window().and_then(|window| {
            let callback = closure.as_ref().unchecked_ref();
            let result = match kind {
                Kind::Interval => {
                    window.set_interval_with_callback_and_timeout_and_arguments_0(callback, ms)
                }
                Kind::Timeout => {
                    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, ms)
                }
            };
            match result {
                Ok(id) => Some(id),
                Err(e) => {
                    log::error!("Failed to schedule {:?} timer: {:?}", kind, e);
                    None
                }
            }
        });
        timer_id.set(id);
        BrowserHandle {
            kind,
            id: timer_id,
            _closure: closure,
        }
    }
}

impl Scheduler for BrowserScheduler {
    type Handle = BrowserHandle;

    fn every(&self, period_ms: u32, task: Task) -> BrowserHandle {
        self.schedule(Kind::Interval, period_ms, task)
    }

    fn after(&self, delay_ms: u32, task: Task) -> BrowserHandle {
        self.schedule(Kind::Timeout, delay_ms, task)
    }
}

/// Owns the JS closure; the timer is cleared on cancel and on drop
pub struct BrowserHandle {
    kind: Kind,
    id: Rc<Cell<Option<i32>>>,
    _closure: Closure<dyn FnMut()>,
}

impl TaskHandle for BrowserHandle {
    fn cancel(&self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            match self.kind {
                Kind::Interval => window.clear_interval_with_handle(id),
                Kind::Timeout => window.clear_timeout_with_handle(id),
            }
        }
    }

    fn is_active(&self) -> bool {
        self.id.get().is_some()
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

//! Deterministic manual clock
//!
//! Time only moves when `advance` is called. Due tasks fire in order of due
//! time, then in order of registration.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::{Scheduler, Task, TaskHandle};

struct Entry {
    id: u64,
    due_ms: u64,
    period_ms: Option<u64>,
    callback: Rc<RefCell<Task>>,
    cancelled: Rc<Cell<bool>>,
}

#[derive(Default)]
struct Clock {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

/// Scheduler driven by explicit `advance` calls
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ms
    }

    /// Number of tasks still scheduled
    pub fn pending(&self) -> usize {
        self.clock
            .borrow()
            .entries
            .iter()
            .filter(|e| !e.cancelled.get())
            .count()
    }

    /// Move the clock forward, firing every task that comes due
    pub fn advance(&self, ms: u64) {
        let target = self.clock.borrow().now_ms + ms;
        loop {
            // Never hold the clock borrow while a callback runs; callbacks
            // may schedule or cancel tasks.
            let callback = {
                let mut clock = self.clock.borrow_mut();
                clock.entries.retain(|e| !e.cancelled.get());
                let next = clock
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due_ms <= target)
                    .min_by_key(|(_, e)| (e.due_ms, e.id))
                    .map(|(i, _)| i);
                let Some(idx) = next else {
                    clock.now_ms = target;
                    break;
                };
                let due_ms = clock.entries[idx].due_ms;
                clock.now_ms = due_ms;
                let entry = &mut clock.entries[idx];
                match entry.period_ms {
                    Some(period) => entry.due_ms += period,
                    None => entry.cancelled.set(true),
                }
                entry.callback.clone()
            };
            (callback.borrow_mut())();
        }
    }

    fn schedule(&self, delay_ms: u64, period_ms: Option<u64>, task: Task) -> ManualHandle {
        let mut clock = self.clock.borrow_mut();
        let id = clock.next_id;
        clock.next_id += 1;
        let cancelled = Rc::new(Cell::new(false));
        let due_ms = clock.now_ms + delay_ms;
        clock.entries.push(Entry {
            id,
            due_ms,
            period_ms,
            callback: Rc::new(RefCell::new(task)),
            cancelled: cancelled.clone(),
        });
        ManualHandle {
            cancelled,
            clock: Rc::downgrade(&self.clock),
        }
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn every(&self, period_ms: u32, task: Task) -> ManualHandle {
        // A zero period would fire forever within one advance
        let period = u64::from(period_ms.max(1));
        self.schedule(period, Some(period), task)
    }

    fn after(&self, delay_ms: u32, task: Task) -> ManualHandle {
        self.schedule(u64::from(delay_ms), None, task)
    }
}

pub struct ManualHandle {
    cancelled: Rc<Cell<bool>>,
    clock: Weak<RefCell<Clock>>,
}

impl TaskHandle for ManualHandle {
    fn cancel(&self) {
        self.cancelled.set(true);
    }

    fn is_active(&self) -> bool {
        !self.cancelled.get() && self.clock.strong_count() > 0
    }
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancel();
        // Free the callback now if the clock isn't mid-advance
        if let Some(clock) = self.clock.upgrade() {
            if let Ok(mut clock) = clock.try_borrow_mut() {
                clock.entries.retain(|e| !e.cancelled.get());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, Task) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Box::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn test_every_fires_on_period() {
        let scheduler = ManualScheduler::new();
        let (count, task) = counter();
        let _handle = scheduler.every(500, task);
        scheduler.advance(499);
        assert_eq!(count.get(), 0);
        scheduler.advance(1);
        assert_eq!(count.get(), 1);
        scheduler.advance(2000);
        assert_eq!(count.get(), 5);
        assert_eq!(scheduler.now_ms(), 2500);
    }

    #[test]
    fn test_after_fires_once() {
        let scheduler = ManualScheduler::new();
        let (count, task) = counter();
        let handle = scheduler.after(1500, task);
        assert!(handle.is_active());
        scheduler.advance(10_000);
        assert_eq!(count.get(), 1);
        assert!(!handle.is_active());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel_and_drop() {
        let scheduler = ManualScheduler::new();
        let (a, task_a) = counter();
        let (b, task_b) = counter();
        let handle_a = scheduler.every(100, task_a);
        let handle_b = scheduler.every(100, task_b);
        scheduler.advance(100);
        handle_a.cancel();
        drop(handle_b);
        scheduler.advance(1000);
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel_from_inside_callback() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<ManualHandle>>> = Rc::new(RefCell::new(None));
        let handle = {
            let count = count.clone();
            let slot = slot.clone();
            scheduler.every(
                100,
                Box::new(move || {
                    count.set(count.get() + 1);
                    if count.get() == 3 {
                        if let Some(h) = slot.borrow().as_ref() {
                            h.cancel();
                        }
                    }
                }),
            )
        };
        *slot.borrow_mut() = Some(handle);
        scheduler.advance(1000);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_ordering_by_due_then_registration() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let push = |tag: &'static str| -> Task {
            let log = log.clone();
            Box::new(move || log.borrow_mut().push(tag))
        };
        let _a = scheduler.every(1000, push("second"));
        let _b = scheduler.every(500, push("half"));
        scheduler.advance(1000);
        assert_eq!(*log.borrow(), vec!["half", "second", "half"]);
    }

    #[test]
    fn test_schedule_from_inside_callback() {
        let scheduler = ManualScheduler::new();
        let (count, task) = counter();
        let inner: Rc<RefCell<Option<ManualHandle>>> = Rc::new(RefCell::new(None));
        let task = RefCell::new(Some(task));
        let _outer = {
            let scheduler = scheduler.clone();
            let inner = inner.clone();
            scheduler.clone().after(
                100,
                Box::new(move || {
                    if let Some(task) = task.borrow_mut().take() {
                        *inner.borrow_mut() = Some(scheduler.every(100, task));
                    }
                }),
            )
        };
        scheduler.advance(350);
        assert_eq!(count.get(), 2);
    }
}

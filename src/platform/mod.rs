//! Platform abstraction layer
//!
//! Handles browser/native differences for scheduled tasks:
//! - `Scheduler` starts periodic and one-shot tasks
//! - `TaskHandle` cancels them; dropping a handle cancels too
//! - `ManualScheduler` is a deterministic clock for native runs and tests
//! - `BrowserScheduler` uses `setInterval`/`setTimeout` on wasm32

pub mod manual;
pub use manual::{ManualHandle, ManualScheduler};

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHandle, BrowserScheduler};

/// A scheduled task callback
pub type Task = Box<dyn FnMut()>;

/// Cancellation handle for a scheduled task.
///
/// Implementations cancel on drop. `cancel` must be safe to call from inside
/// the task's own callback; dropping the handle there is not.
pub trait TaskHandle {
    fn cancel(&self);
    fn is_active(&self) -> bool;
}

/// Source of timer callbacks
pub trait Scheduler {
    type Handle: TaskHandle;

    /// Run `task` every `period_ms` until cancelled
    fn every(&self, period_ms: u32, task: Task) -> Self::Handle;
    /// Run `task` once after `delay_ms` unless cancelled first
    fn after(&self, delay_ms: u32, task: Task) -> Self::Handle;
}

/// The two periodic timers of a round, acquired and released together
pub struct RoundTimers<H: TaskHandle> {
    spawn: H,
    countdown: H,
}

impl<H: TaskHandle> RoundTimers<H> {
    pub fn start<S>(
        scheduler: &S,
        spawn_ms: u32,
        countdown_ms: u32,
        on_spawn: Task,
        on_countdown: Task,
    ) -> Self
    where
        S: Scheduler<Handle = H>,
    {
        Self {
            spawn: scheduler.every(spawn_ms, on_spawn),
            countdown: scheduler.every(countdown_ms, on_countdown),
        }
    }

    /// Stop both timers
    pub fn cancel(&self) {
        self.spawn.cancel();
        self.countdown.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.spawn.is_active() || self.countdown.is_active()
    }

    pub fn into_handles(self) -> [H; 2] {
        [self.spawn, self.countdown]
    }
}

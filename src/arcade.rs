//! Timer-driven round driver
//!
//! `Arcade` owns one `GameSession` plus the timers that feed it: the intro
//! delay, the spawn interval and the countdown interval. The two round
//! timers are acquired together and released together. Every mutation is
//! reported to a single presentation listener along with a fresh snapshot.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::platform::{RoundTimers, Scheduler, TaskHandle};
use crate::sim::{GamePhase, GameSession, GameSnapshot, Resolution, RoundSummary, Target};

/// Something the presentation should react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ArcadeEvent {
    PhaseChanged(GamePhase),
    TargetSpawned(Target),
    TargetResolved(Resolution),
    TargetExpired(u32),
    /// Countdown tick
    Tick { time_remaining: u32 },
    GameOver(RoundSummary),
}

/// Presentation callback. Events raised while the listener itself is
/// running (re-entrant calls) are not delivered.
pub type Listener = Box<dyn FnMut(&ArcadeEvent, &GameSnapshot)>;

struct Shared<H: TaskHandle> {
    session: RefCell<GameSession>,
    timers: RefCell<Option<RoundTimers<H>>>,
    intro: RefCell<Option<H>>,
    /// Released handles whose callback may still be on the stack
    retired: RefCell<Vec<H>>,
    firing: Cell<bool>,
    listener: RefCell<Option<Listener>>,
}

pub struct Arcade<S: Scheduler> {
    scheduler: S,
    shared: Rc<Shared<S::Handle>>,
}

impl<S> Arcade<S>
where
    S: Scheduler + Clone + 'static,
    S::Handle: 'static,
{
    pub fn new(session: GameSession, scheduler: S) -> Self {
        Self {
            scheduler,
            shared: Rc::new(Shared {
                session: RefCell::new(session),
                timers: RefCell::new(None),
                intro: RefCell::new(None),
                retired: RefCell::new(Vec::new()),
                firing: Cell::new(false),
                listener: RefCell::new(None),
            }),
        }
    }

    pub fn set_listener(&self, listener: impl FnMut(&ArcadeEvent, &GameSnapshot) + 'static) {
        *self.shared.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn session(&self) -> Ref<'_, GameSession> {
        self.shared.session.borrow()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.session.borrow().snapshot()
    }

    pub fn summary(&self) -> Option<RoundSummary> {
        RoundSummary::from_session(&self.shared.session.borrow())
    }

    pub fn set_viewport_width(&self, width: f32) {
        self.shared.session.borrow_mut().set_viewport_width(width);
    }

    /// True while the spawn or countdown timer is running
    pub fn timers_active(&self) -> bool {
        self.shared
            .timers
            .borrow()
            .as_ref()
            .is_some_and(|t| t.is_active())
    }

    /// True while the "get ready" delay is pending
    pub fn intro_pending(&self) -> bool {
        self.shared
            .intro
            .borrow()
            .as_ref()
            .is_some_and(|h| h.is_active())
    }

    pub fn enter_screen(&self) -> GameSnapshot {
        self.shared.collect_retired();
        if self.shared.session.borrow_mut().enter_screen() {
            self.shared.emit(ArcadeEvent::PhaseChanged(GamePhase::ShowingRules));
        }
        self.snapshot()
    }

    /// Show the "get ready" screen, then start the round after the intro delay
    pub fn get_ready(&self) -> GameSnapshot {
        self.shared.collect_retired();
        let delay = {
            let mut session = self.shared.session.borrow_mut();
            let from_rules = session.phase() == GamePhase::ShowingRules;
            let delay = if from_rules {
                session.tuning().rules_intro_ms
            } else {
                session.tuning().restart_intro_ms
            };
            session.get_ready().then_some(delay)
        };
        let Some(delay) = delay else {
            return self.snapshot();
        };

        self.shared.release_timers();
        let weak = Rc::downgrade(&self.shared);
        let scheduler = self.scheduler.clone();
        let handle = self.scheduler.after(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.with_firing(|| begin_round(&scheduler, &shared, false));
                }
            }),
        );
        *self.shared.intro.borrow_mut() = Some(handle);
        self.shared.emit(ArcadeEvent::PhaseChanged(GamePhase::Countdown));
        self.snapshot()
    }

    /// Start immediately from the rules or "get ready" screen
    pub fn start_round(&self) -> GameSnapshot {
        self.shared.collect_retired();
        begin_round(&self.scheduler, &self.shared, false);
        self.snapshot()
    }

    /// Play again from the game-over screen
    pub fn restart_round(&self) -> GameSnapshot {
        self.shared.collect_retired();
        begin_round(&self.scheduler, &self.shared, true);
        self.snapshot()
    }

    pub fn resolve_target(&self, id: u32) -> Option<Resolution> {
        self.shared.collect_retired();
        let (resolution, over) = {
            let mut session = self.shared.session.borrow_mut();
            let resolution = session.resolve_target(id);
            (resolution, session.phase() == GamePhase::GameOver)
        };
        if let Some(resolution) = &resolution {
            self.shared
                .emit(ArcadeEvent::TargetResolved(resolution.clone()));
            if over {
                self.shared.end_round();
            }
        }
        resolution
    }

    pub fn expire_target(&self, id: u32) -> bool {
        self.shared.collect_retired();
        let removed = self.shared.session.borrow_mut().expire_target(id);
        if removed {
            self.shared.emit(ArcadeEvent::TargetExpired(id));
        }
        removed
    }

    /// Stop every timer and discard the round
    pub fn leave_screen(&self) -> GameSnapshot {
        self.shared.release_timers();
        self.shared.collect_retired();
        self.shared.session.borrow_mut().leave_screen();
        self.shared.emit(ArcadeEvent::PhaseChanged(GamePhase::NotStarted));
        self.snapshot()
    }
}

impl<S: Scheduler> Drop for Arcade<S> {
    fn drop(&mut self) {
        self.shared.release_timers();
    }
}

/// Move the session into Active and arm both round timers
fn begin_round<S>(scheduler: &S, shared: &Rc<Shared<S::Handle>>, restart: bool) -> bool
where
    S: Scheduler,
    S::Handle: 'static,
{
    let (started, spawn_ms, countdown_ms) = {
        let mut session = shared.session.borrow_mut();
        let started = if restart {
            session.restart_round()
        } else {
            session.start_round()
        };
        let tuning = session.tuning();
        (started, tuning.spawn_interval_ms, tuning.countdown_interval_ms)
    };
    if !started {
        return false;
    }

    shared.release_timers();
    let on_spawn = Rc::downgrade(shared);
    let on_countdown = Rc::downgrade(shared);
    let timers = RoundTimers::start(
        scheduler,
        spawn_ms,
        countdown_ms,
        Box::new(move || {
            if let Some(shared) = on_spawn.upgrade() {
                shared.with_firing(|| shared.on_spawn_tick());
            }
        }),
        Box::new(move || {
            if let Some(shared) = on_countdown.upgrade() {
                shared.with_firing(|| shared.on_countdown_tick());
            }
        }),
    );
    *shared.timers.borrow_mut() = Some(timers);
    shared.emit(ArcadeEvent::PhaseChanged(GamePhase::Active));
    true
}

impl<H: TaskHandle> Shared<H> {
    fn with_firing<R>(&self, f: impl FnOnce() -> R) -> R {
        let prev = self.firing.replace(true);
        let result = f();
        self.firing.set(prev);
        result
    }

    fn on_spawn_tick(&self) {
        let target = self.session.borrow_mut().tick_spawn();
        if let Some(target) = target {
            self.emit(ArcadeEvent::TargetSpawned(target));
        }
    }

    fn on_countdown_tick(&self) {
        let (remaining, over) = {
            let mut session = self.session.borrow_mut();
            let remaining = session.tick_countdown();
            (remaining, session.phase() == GamePhase::GameOver)
        };
        let Some(time_remaining) = remaining else {
            return;
        };
        self.emit(ArcadeEvent::Tick { time_remaining });
        if over {
            self.end_round();
        }
    }

    /// Round just hit GameOver: stop the timers, publish the summary
    fn end_round(&self) {
        if let Some(timers) = self.timers.borrow().as_ref() {
            timers.cancel();
        }
        let summary = RoundSummary::from_session(&self.session.borrow());
        if let Some(summary) = summary {
            self.emit(ArcadeEvent::GameOver(summary));
        }
    }

    /// Cancel the round timers and the intro delay
    fn release_timers(&self) {
        let mut handles = Vec::new();
        if let Some(timers) = self.timers.borrow_mut().take() {
            timers.cancel();
            handles.extend(timers.into_handles());
        }
        if let Some(intro) = self.intro.borrow_mut().take() {
            intro.cancel();
            handles.push(intro);
        }
        if self.firing.get() {
            // Can't free a callback that is running
            self.retired.borrow_mut().extend(handles);
        }
    }

    fn collect_retired(&self) {
        if !self.firing.get() {
            self.retired.borrow_mut().clear();
        }
    }

    fn emit(&self, event: ArcadeEvent) {
        let snapshot = self.session.borrow().snapshot();
        let listener = self.listener.borrow_mut().take();
        if let Some(mut listener) = listener {
            listener(&event, &snapshot);
            let mut slot = self.listener.borrow_mut();
            if slot.is_none() {
                *slot = Some(listener);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, PLAYED_FLAG_KEY};
    use crate::platform::ManualScheduler;
    use crate::sim::Reward;
    use crate::tuning::Tuning;

    type EventLog = Rc<RefCell<Vec<ArcadeEvent>>>;

    fn arcade_with(store: MemoryStore) -> (Arcade<ManualScheduler>, ManualScheduler, EventLog) {
        arcade_with_tuning(store, Tuning::default())
    }

    fn arcade_with_tuning(
        store: MemoryStore,
        tuning: Tuning,
    ) -> (Arcade<ManualScheduler>, ManualScheduler, EventLog) {
        let scheduler = ManualScheduler::new();
        let session = GameSession::new(tuning, 2024, Box::new(store)).unwrap();
        let arcade = Arcade::new(session, scheduler.clone());
        let events: EventLog = Rc::default();
        let sink = events.clone();
        arcade.set_listener(move |event, _| sink.borrow_mut().push(event.clone()));
        (arcade, scheduler, events)
    }

    fn spawned(events: &EventLog) -> Vec<Target> {
        events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ArcadeEvent::TargetSpawned(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_intro_then_active() {
        let (arcade, scheduler, _) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        let snap = arcade.get_ready();
        assert_eq!(snap.phase, GamePhase::Countdown);
        assert!(arcade.intro_pending());
        assert!(!arcade.timers_active());

        scheduler.advance(1499);
        assert_eq!(arcade.snapshot().phase, GamePhase::Countdown);
        scheduler.advance(1);
        assert_eq!(arcade.snapshot().phase, GamePhase::Active);
        assert!(arcade.timers_active());
        assert!(!arcade.intro_pending());
    }

    #[test]
    fn test_spawns_every_half_second() {
        let (arcade, scheduler, events) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        arcade.start_round();
        scheduler.advance(5000);
        assert_eq!(spawned(&events).len(), 10);
        assert_eq!(arcade.snapshot().time_remaining, 55);
        assert_eq!(arcade.snapshot().live_targets, 10);
    }

    #[test]
    fn test_round_times_out_and_timers_stop() {
        let (arcade, scheduler, events) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        arcade.start_round();
        scheduler.advance(60_000);

        let snap = arcade.snapshot();
        assert_eq!(snap.phase, GamePhase::GameOver);
        assert_eq!(snap.time_remaining, 0);
        assert!(!arcade.timers_active());
        assert_eq!(scheduler.pending(), 0);

        let spawns = spawned(&events).len();
        scheduler.advance(10_000);
        assert_eq!(spawned(&events).len(), spawns);

        let overs = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, ArcadeEvent::GameOver(_)))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_bombs_end_round_early() {
        let (arcade, scheduler, events) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        arcade.start_round();

        let mut bombs = 0;
        while arcade.snapshot().phase == GamePhase::Active {
            scheduler.advance(500);
            let live: Vec<Target> = arcade.session().targets().to_vec();
            for target in live {
                if target.kind == crate::sim::TargetKind::Bomb
                    && arcade.resolve_target(target.id).is_some()
                {
                    bombs += 1;
                }
            }
        }
        assert_eq!(bombs, 3);
        let snap = arcade.snapshot();
        assert_eq!(snap.lives, 0);
        assert!(snap.time_remaining > 0);
        assert!(!arcade.timers_active());
        assert!(matches!(
            events.borrow().last(),
            Some(ArcadeEvent::GameOver(_))
        ));
    }

    #[test]
    fn test_last_bomb_in_last_second_emits_one_game_over() {
        let tuning = Tuning {
            spawn_weights: vec![(crate::sim::TargetKind::Bomb, 1)],
            ..Tuning::default()
        };
        let (arcade, scheduler, events) = arcade_with_tuning(MemoryStore::new(), tuning);
        arcade.enter_screen();
        arcade.start_round();

        for _ in 0..2 {
            scheduler.advance(500);
            let bomb = arcade.session().targets()[0].id;
            assert!(arcade.resolve_target(bomb).is_some());
        }
        assert_eq!(arcade.snapshot().lives, 1);

        scheduler.advance(58_000);
        assert_eq!(arcade.snapshot().time_remaining, 1);
        let last = arcade.session().targets()[0].id;
        assert!(arcade.resolve_target(last).is_some());
        assert_eq!(arcade.snapshot().phase, GamePhase::GameOver);

        // The countdown due at 60 s must not fire a second game over
        scheduler.advance(5_000);
        let overs = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, ArcadeEvent::GameOver(_)))
            .count();
        assert_eq!(overs, 1);
        assert_eq!(arcade.session().rounds_completed(), 1);
        assert_eq!(arcade.snapshot().time_remaining, 1);
    }

    #[test]
    fn test_leave_screen_cancels_everything() {
        let (arcade, scheduler, events) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        arcade.start_round();
        scheduler.advance(2000);
        arcade.leave_screen();
        assert_eq!(scheduler.pending(), 0);
        assert!(!arcade.timers_active());

        let count = events.borrow().len();
        scheduler.advance(120_000);
        assert_eq!(events.borrow().len(), count);
        assert_eq!(arcade.snapshot().phase, GamePhase::NotStarted);
    }

    #[test]
    fn test_leave_during_intro() {
        let (arcade, scheduler, _) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        arcade.get_ready();
        arcade.leave_screen();
        scheduler.advance(5000);
        assert_eq!(arcade.snapshot().phase, GamePhase::NotStarted);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_restart_after_game_over() {
        let store = MemoryStore::new();
        let (arcade, scheduler, events) = arcade_with(store.clone());
        arcade.enter_screen();
        arcade.start_round();
        scheduler.advance(60_000);

        let summary = arcade.summary().unwrap();
        assert!(matches!(summary.reward, Reward::FirstTime { .. }));
        assert_eq!(store.get(PLAYED_FLAG_KEY), Some(true));

        let snap = arcade.restart_round();
        assert_eq!(snap.phase, GamePhase::Active);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.time_remaining, 60);
        assert!(snap.promo_code.is_none());
        assert!(arcade.timers_active());

        events.borrow_mut().clear();
        scheduler.advance(60_000);
        let summary = arcade.summary().unwrap();
        assert!(matches!(summary.reward, Reward::Returning { .. }));
        assert_eq!(spawned(&events).len(), 120);
    }

    #[test]
    fn test_play_again_with_intro() {
        let (arcade, scheduler, _) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        arcade.start_round();
        scheduler.advance(60_000);
        arcade.get_ready();
        assert_eq!(arcade.snapshot().phase, GamePhase::Countdown);
        scheduler.advance(500);
        assert_eq!(arcade.snapshot().phase, GamePhase::Active);
    }

    #[test]
    fn test_illegal_calls_are_noops() {
        let (arcade, scheduler, events) = arcade_with(MemoryStore::new());
        assert_eq!(arcade.start_round().phase, GamePhase::NotStarted);
        assert_eq!(arcade.restart_round().phase, GamePhase::NotStarted);
        assert!(arcade.resolve_target(1).is_none());
        assert!(!arcade.expire_target(1));
        assert!(events.borrow().is_empty());

        arcade.enter_screen();
        arcade.start_round();
        scheduler.advance(1000);
        // A second start must not reset the running round
        arcade.start_round();
        assert_eq!(arcade.snapshot().time_remaining, 59);
        assert!(arcade.timers_active());
    }

    #[test]
    fn test_expired_targets_leave_score_alone() {
        let (arcade, scheduler, events) = arcade_with(MemoryStore::new());
        arcade.enter_screen();
        arcade.start_round();
        scheduler.advance(2000);
        for target in spawned(&events) {
            assert!(arcade.expire_target(target.id));
            assert!(arcade.resolve_target(target.id).is_none());
        }
        let snap = arcade.snapshot();
        assert_eq!(snap.raw_score, 0);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.live_targets, 0);
    }

    #[test]
    fn test_events_serialize_for_presentation() {
        let event = ArcadeEvent::Tick { time_remaining: 12 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"Tick","data":{"time_remaining":12}}"#);
        let event = ArcadeEvent::PhaseChanged(GamePhase::Active);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"PhaseChanged","data":"Active"}"#);
    }
}

//! Round session state machine
//!
//! `GameSession` is the single owner of a round's state. Timers and input
//! live outside; they call in through the tick/resolve methods below. Calls
//! that don't fit the current phase are ignored.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::promo::generate_promo_code;
use super::scorer::{life_delta_for, points_for};
use super::spawner::Spawner;
use super::state::{GamePhase, GameSnapshot, Target};
use crate::persistence::{self, FlagStore};
use crate::tuning::{Tuning, TuningError};

/// Mixed into the seed so promo codes don't track the spawn sequence
const PROMO_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Effect of tapping a live target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub target: Target,
    pub points: i64,
    pub life_delta: i32,
}

pub struct GameSession {
    tuning: Tuning,
    phase: GamePhase,
    lives: u32,
    score: i64,
    time_remaining: u32,
    /// Live targets in spawn order
    targets: Vec<Target>,
    spawner: Spawner,
    promo_rng: Pcg32,
    store: Box<dyn FlagStore>,
    /// Loaded from the store on the first round start
    has_played_before: Option<bool>,
    promo_code: Option<String>,
    rounds_completed: u32,
}

impl GameSession {
    pub fn new(tuning: Tuning, seed: u64, store: Box<dyn FlagStore>) -> Result<Self, TuningError> {
        let spawner = Spawner::new(seed, &tuning)?;
        Ok(Self {
            phase: GamePhase::NotStarted,
            lives: tuning.starting_lives,
            score: 0,
            time_remaining: tuning.round_secs,
            targets: Vec::new(),
            spawner,
            promo_rng: Pcg32::seed_from_u64(seed ^ PROMO_SEED_SALT),
            store,
            has_played_before: None,
            promo_code: None,
            rounds_completed: 0,
            tuning,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Actual score, negative after an early bomb
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Score as shown to the player
    pub fn display_score(&self) -> i64 {
        self.score.max(0)
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Seconds elapsed in the current round
    pub fn time_played(&self) -> u32 {
        self.tuning.round_secs.saturating_sub(self.time_remaining)
    }

    /// Set once, on the browser's first completed round
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// `None` until the durable flag has been read
    pub fn has_played_before(&self) -> Option<bool> {
        self.has_played_before
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.spawner.set_viewport_width(width);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            lives: self.lives,
            score: self.display_score(),
            raw_score: self.score,
            time_remaining: self.time_remaining,
            promo_code: self.promo_code.clone(),
            live_targets: self.targets.len(),
        }
    }

    /// NotStarted -> ShowingRules
    pub fn enter_screen(&mut self) -> bool {
        if self.phase != GamePhase::NotStarted {
            return self.ignore("enter_screen");
        }
        self.phase = GamePhase::ShowingRules;
        log::info!("Showing rules");
        true
    }

    /// ShowingRules | GameOver -> Countdown (the "get ready" screen)
    pub fn get_ready(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::ShowingRules | GamePhase::GameOver) {
            return self.ignore("get_ready");
        }
        self.load_played_flag();
        self.reset_round();
        self.phase = GamePhase::Countdown;
        true
    }

    /// ShowingRules | Countdown -> Active
    pub fn start_round(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::ShowingRules | GamePhase::Countdown) {
            return self.ignore("start_round");
        }
        self.load_played_flag();
        self.reset_round();
        self.phase = GamePhase::Active;
        log::info!("Round started ({} s, {} lives)", self.time_remaining, self.lives);
        true
    }

    /// GameOver -> Active
    pub fn restart_round(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return self.ignore("restart_round");
        }
        self.reset_round();
        self.phase = GamePhase::Active;
        log::info!("Round restarted");
        true
    }

    /// Any phase -> NotStarted; the round is discarded
    pub fn leave_screen(&mut self) {
        self.reset_round();
        self.phase = GamePhase::NotStarted;
        log::info!("Left the game screen");
    }

    /// Spawn tick: one new target while Active
    pub fn tick_spawn(&mut self) -> Option<Target> {
        if self.phase != GamePhase::Active {
            return None;
        }
        let target = self.spawner.tick();
        self.targets.push(target.clone());
        Some(target)
    }

    /// Countdown tick: one second off the clock while Active.
    ///
    /// Returns the remaining time, or `None` if the tick was ignored.
    pub fn tick_countdown(&mut self) -> Option<u32> {
        if self.phase != GamePhase::Active {
            return None;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.check_round_end();
        Some(self.time_remaining)
    }

    /// Player tapped a target.
    ///
    /// Unknown or already-resolved IDs, and taps outside Active, do nothing.
    pub fn resolve_target(&mut self, id: u32) -> Option<Resolution> {
        if self.phase != GamePhase::Active {
            self.ignore("resolve_target");
            return None;
        }
        let Some(idx) = self.targets.iter().position(|t| t.id == id) else {
            log::debug!("Target {} already gone", id);
            return None;
        };
        let target = self.targets.remove(idx);

        let points = points_for(target.kind);
        let life_delta = life_delta_for(target.kind);
        self.score += points;
        self.lives = if life_delta < 0 {
            self.lives.saturating_sub(life_delta.unsigned_abs())
        } else {
            self.lives.saturating_add(life_delta as u32)
        };
        self.check_round_end();

        Some(Resolution {
            target,
            points,
            life_delta,
        })
    }

    /// A target fell off screen untouched
    pub fn expire_target(&mut self, id: u32) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        self.targets.len() != before
    }

    fn reset_round(&mut self) {
        self.lives = self.tuning.starting_lives;
        self.score = 0;
        self.time_remaining = self.tuning.round_secs;
        self.targets.clear();
        self.promo_code = None;
    }

    fn load_played_flag(&mut self) {
        if self.has_played_before.is_none() {
            self.has_played_before = Some(persistence::load_played_before(&*self.store));
        }
    }

    fn check_round_end(&mut self) {
        if self.lives == 0 || self.time_remaining == 0 {
            self.finish_round();
        }
    }

    /// Active -> GameOver, at most once per round
    fn finish_round(&mut self) {
        if self.phase != GamePhase::Active {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.targets.clear();
        self.rounds_completed += 1;
        log::info!(
            "Game over: score {} with {} lives and {} s left",
            self.score,
            self.lives,
            self.time_remaining
        );

        if self.has_played_before != Some(true) {
            self.has_played_before = Some(true);
            persistence::mark_played(&mut *self.store);
            let code = generate_promo_code(&mut self.promo_rng);
            log::info!("First round completed, promo code issued");
            self.promo_code = Some(code);
        }
    }

    fn ignore(&self, op: &str) -> bool {
        log::debug!("Ignoring {} in phase {}", op, self.phase.as_str());
        false
    }
}

//! Data-driven game balance
//!
//! Defaults reproduce the shipped game. A JSON document may override any
//! subset of fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{TargetKind, WeightedTable};

/// Round balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub round_secs: u32,
    pub starting_lives: u32,
    pub spawn_interval_ms: u32,
    pub countdown_interval_ms: u32,
    pub rules_intro_ms: u32,
    pub restart_intro_ms: u32,
    pub sprite_size: f32,
    pub fall_secs_min: f32,
    pub fall_secs_max: f32,
    pub points_per_dollar: i64,
    /// Spawn weights per target kind
    pub spawn_weights: Vec<(TargetKind, u32)>,
}

impl Default for Tuning {
    fn default() -> Self {
        // 70% cans split evenly over five flavours, 25% bombs, 5% diamonds
        let mut spawn_weights: Vec<(TargetKind, u32)> =
            TargetKind::COLLECTIBLES.iter().map(|&k| (k, 14)).collect();
        spawn_weights.push((TargetKind::Bomb, 25));
        spawn_weights.push((TargetKind::Diamond, 5));

        Self {
            round_secs: ROUND_SECS,
            starting_lives: STARTING_LIVES,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            countdown_interval_ms: COUNTDOWN_INTERVAL_MS,
            rules_intro_ms: RULES_INTRO_MS,
            restart_intro_ms: RESTART_INTRO_MS,
            sprite_size: SPRITE_SIZE,
            fall_secs_min: FALL_SECS_MIN,
            fall_secs_max: FALL_SECS_MAX,
            points_per_dollar: POINTS_PER_DOLLAR,
            spawn_weights,
        }
    }
}

/// Rejected tuning document
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// JSON did not parse
    Parse(String),
    /// A value is out of range
    Invalid(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(msg) => write!(f, "tuning parse error: {}", msg),
            TuningError::Invalid(what) => write!(f, "invalid tuning: {}", what),
        }
    }
}

impl std::error::Error for TuningError {}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.round_secs == 0 {
            return Err(TuningError::Invalid("round_secs must be positive"));
        }
        if self.starting_lives == 0 {
            return Err(TuningError::Invalid("starting_lives must be positive"));
        }
        if self.spawn_interval_ms == 0 || self.countdown_interval_ms == 0 {
            return Err(TuningError::Invalid("timer intervals must be positive"));
        }
        if !(self.fall_secs_min > 0.0
            && self.fall_secs_min < self.fall_secs_max
            && self.fall_secs_max.is_finite())
        {
            return Err(TuningError::Invalid("fall_secs range must be finite, positive and non-empty"));
        }
        if !self.sprite_size.is_finite() || self.sprite_size < 0.0 {
            return Err(TuningError::Invalid("sprite_size must be finite and non-negative"));
        }
        if self.points_per_dollar <= 0 {
            return Err(TuningError::Invalid("points_per_dollar must be positive"));
        }
        self.spawn_table()?;
        Ok(())
    }

    /// Build the weighted spawn table
    pub fn spawn_table(&self) -> Result<WeightedTable<TargetKind>, TuningError> {
        WeightedTable::new(self.spawn_weights.iter().copied())
            .map_err(|_| TuningError::Invalid("spawn_weights need at least one positive weight"))
    }
}

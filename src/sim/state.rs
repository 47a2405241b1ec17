//! Round state and core simulation types
//!
//! Everything the presentation needs to render a frame is reachable from
//! `GameSnapshot`.

use serde::{Deserialize, Serialize};

/// Current phase of the mini-game screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Screen not entered yet (or left)
    #[default]
    NotStarted,
    /// Rules dialog is up, waiting for the player to start
    ShowingRules,
    /// "Get ready" intro before targets start falling
    Countdown,
    /// Targets falling, clock running
    Active,
    /// Round ended (time up or out of lives)
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::NotStarted => "NotStarted",
            GamePhase::ShowingRules => "ShowingRules",
            GamePhase::Countdown => "Countdown",
            GamePhase::Active => "Active",
            GamePhase::GameOver => "GameOver",
        }
    }
}

/// Target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Fizzi1,
    Fizzi2,
    Fizzi3,
    Fizzi4,
    Fizzi5,
    /// Hazard: costs points and a life
    Bomb,
    /// Rare bonus
    Diamond,
}

impl TargetKind {
    /// The five soda-can collectibles
    pub const COLLECTIBLES: [TargetKind; 5] = [
        TargetKind::Fizzi1,
        TargetKind::Fizzi2,
        TargetKind::Fizzi3,
        TargetKind::Fizzi4,
        TargetKind::Fizzi5,
    ];

    pub const ALL: [TargetKind; 7] = [
        TargetKind::Fizzi1,
        TargetKind::Fizzi2,
        TargetKind::Fizzi3,
        TargetKind::Fizzi4,
        TargetKind::Fizzi5,
        TargetKind::Bomb,
        TargetKind::Diamond,
    ];

    pub fn is_collectible(&self) -> bool {
        !matches!(self, TargetKind::Bomb | TargetKind::Diamond)
    }

    pub fn is_hazard(&self) -> bool {
        *self == TargetKind::Bomb
    }

    /// Sprite name used by the presentation
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Fizzi1 => "Fizzi1",
            TargetKind::Fizzi2 => "Fizzi2",
            TargetKind::Fizzi3 => "Fizzi3",
            TargetKind::Fizzi4 => "Fizzi4",
            TargetKind::Fizzi5 => "Fizzi5",
            TargetKind::Bomb => "Bomb",
            TargetKind::Diamond => "Diamond",
        }
    }
}

/// A falling target entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub kind: TargetKind,
    /// Left edge in CSS pixels
    pub x: f32,
    /// Seconds to fall through the viewport (its time-to-live)
    pub fall_secs: f32,
    /// Starting rotation in degrees (cosmetic)
    pub rotation: f32,
}

/// Read-only view of a session, produced after every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub lives: u32,
    /// Score clamped to zero for display
    pub score: i64,
    /// Actual score (may be negative)
    pub raw_score: i64,
    pub time_remaining: u32,
    pub promo_code: Option<String>,
    /// Number of targets currently falling
    pub live_targets: usize,
}

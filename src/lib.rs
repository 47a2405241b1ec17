//! Fizzi Zone - the soda-catching arcade mini-game
//!
//! Core modules:
//! - `sim`: Round simulation (session state machine, spawner, scoring, rewards)
//! - `arcade`: Timer-driven driver that owns one session and its round timers
//! - `platform`: Scheduled tasks (browser intervals or a manual clock)
//! - `persistence`: The durable "has played before" flag
//! - `tuning`: Data-driven game balance
//! - `settings`: Player audio preferences
//! - `audio`: Sound cues for game events

pub mod arcade;
pub mod audio;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use arcade::{Arcade, ArcadeEvent};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Length of a round in seconds
    pub const ROUND_SECS: u32 = 60;
    /// Lives at the start of every round
    pub const STARTING_LIVES: u32 = 3;

    /// Spawn tick period while Active
    pub const SPAWN_INTERVAL_MS: u32 = 500;
    /// Countdown tick period while Active
    pub const COUNTDOWN_INTERVAL_MS: u32 = 1000;
    /// "Get ready" screen after confirming the rules
    pub const RULES_INTRO_MS: u32 = 1500;
    /// "Get ready" screen after pressing play again
    pub const RESTART_INTRO_MS: u32 = 500;

    /// Sprite box size in CSS pixels
    pub const SPRITE_SIZE: f32 = 80.0;
    /// Viewport width assumed until the presentation reports one
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    /// Fall duration range (seconds through the viewport)
    pub const FALL_SECS_MIN: f32 = 3.0;
    pub const FALL_SECS_MAX: f32 = 7.0;

    /// Score to store-credit conversion for first-time players
    pub const POINTS_PER_DOLLAR: i64 = 100;
    /// Score above which returning players get the "great job" message
    pub const GREAT_SCORE: i64 = 400;
}

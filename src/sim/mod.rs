//! Round simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform code:
//! - Seeded RNG only
//! - Timers are external; the session only reacts to tick calls
//! - Illegal calls are no-ops, never errors

pub mod promo;
pub mod sampler;
pub mod scorer;
pub mod session;
pub mod spawner;
pub mod state;
pub mod summary;

pub use promo::{PROMO_ALPHABET, PROMO_PREFIX, generate_promo_code, is_valid_promo_code};
pub use sampler::WeightedTable;
pub use scorer::{life_delta_for, points_for};
pub use session::{GameSession, Resolution};
pub use spawner::Spawner;
pub use state::{GamePhase, GameSnapshot, Target, TargetKind};
pub use summary::{Reward, RoundSummary};

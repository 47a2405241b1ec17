//! Game-over screen figures

use serde::{Deserialize, Serialize};

use super::session::GameSession;
use super::state::GamePhase;
use crate::consts::GREAT_SCORE;

/// What the player gets at the end of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reward {
    /// First completed round in this browser
    FirstTime {
        promo_code: String,
        redeemable_dollars: i64,
    },
    /// Every round after the first
    Returning { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Score clamped to zero
    pub final_score: i64,
    pub time_played: u32,
    pub lives_left: u32,
    pub reward: Reward,
}

impl RoundSummary {
    /// Summary of a finished round; `None` unless the session is in GameOver
    pub fn from_session(session: &GameSession) -> Option<Self> {
        if session.phase() != GamePhase::GameOver {
            return None;
        }
        let final_score = session.display_score();
        let reward = match session.promo_code() {
            Some(code) => Reward::FirstTime {
                promo_code: code.to_string(),
                redeemable_dollars: final_score / session.tuning().points_per_dollar,
            },
            None => Reward::Returning {
                message: returning_message(final_score).to_string(),
            },
        };
        Some(Self {
            final_score,
            time_played: session.time_played(),
            lives_left: session.lives(),
            reward,
        })
    }

    pub fn is_first_time(&self) -> bool {
        matches!(self.reward, Reward::FirstTime { .. })
    }

    /// The dollar panel and scratch card only appear when there is credit to redeem
    pub fn shows_scratch_card(&self) -> bool {
        matches!(self.reward, Reward::FirstTime { redeemable_dollars, .. } if redeemable_dollars > 0)
    }

    /// First-time players are pointed at the store finder
    pub fn shows_find_stores(&self) -> bool {
        self.is_first_time()
    }
}

fn returning_message(score: i64) -> &'static str {
    if score > GREAT_SCORE {
        "Great job! Keep playing to improve your score!"
    } else {
        "Better luck next time!"
    }
}

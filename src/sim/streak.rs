//! Win/loss streak policy

use serde::{Deserialize, Serialize};

use super::body::CoinSide;
use crate::consts::MILESTONE_INTERVAL;

/// Result of applying a landed side to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Streak extended (or started) to `streak`
    Win { streak: u32 },
    /// Streak broken; `prior` is the count that was lost
    Loss { prior: u32 },
}

/// Consecutive wins and the side needed to extend them
///
/// A target exists exactly when the streak is non-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    streak: u32,
    target: Option<CoinSide>,
}

impl StreakState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn target(&self) -> Option<CoinSide> {
        self.target
    }

    /// Streak the next win would produce
    pub fn projected(&self) -> u32 {
        self.streak + 1
    }

    /// Whether the next win lands on a milestone
    pub fn next_is_milestone(&self) -> bool {
        is_milestone(self.projected())
    }

    /// Apply a landed side
    pub fn apply(&mut self, side: CoinSide) -> Verdict {
        match self.target {
            // First toss of a run always counts and fixes the target
            None => {
                self.streak = 1;
                self.target = Some(side);
                Verdict::Win { streak: 1 }
            }
            Some(target) if target == side => {
                self.streak += 1;
                Verdict::Win { streak: self.streak }
            }
            Some(_) => {
                let prior = self.streak;
                self.streak = 0;
                self.target = None;
                Verdict::Loss { prior }
            }
        }
    }
}

/// A positive multiple of the milestone interval
pub fn is_milestone(streak: u32) -> bool {
    streak > 0 && streak % MILESTONE_INTERVAL == 0
}

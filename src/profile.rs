//! Local player profile
//!
//! Username and personal best, stored as two plain LocalStorage items.

use crate::leaderboard::{LeaderboardError, ScoreSubmission, validate_username};
use crate::platform;

const USERNAME_KEY: &str = "coin_toss_username";
const HIGH_SCORE_KEY: &str = "coin_toss_highscore";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerProfile {
    username: Option<String>,
    high_score: u32,
}

impl PlayerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a key lookup; unparsable values are treated as absent
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let username = get(USERNAME_KEY).and_then(|name| validate_username(&name).ok());
        let high_score = get(HIGH_SCORE_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Self {
            username,
            high_score,
        }
    }

    pub fn load() -> Self {
        let profile = Self::from_lookup(platform::storage_get);
        log::info!(
            "Profile loaded: user={:?} best={}",
            profile.username,
            profile.high_score
        );
        profile
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Validate and store a username
    pub fn set_username(&mut self, raw: &str) -> Result<(), LeaderboardError> {
        let name = validate_username(raw)?;
        platform::storage_set(USERNAME_KEY, &name);
        self.username = Some(name);
        Ok(())
    }

    /// Settle a broken streak
    ///
    /// Raises and persists the personal best, then returns the submission to
    /// send when a username is set.
    pub fn record_loss(&mut self, prior_streak: u32) -> Option<ScoreSubmission> {
        if prior_streak == 0 {
            return None;
        }
        let best = prior_streak.max(self.high_score);
        if best > self.high_score {
            self.high_score = best;
            platform::storage_set(HIGH_SCORE_KEY, &best.to_string());
            log::info!("New personal best: {best}");
        }

        let username = self.username.as_deref()?;
        match ScoreSubmission::new(username, best) {
            Ok(submission) => Some(submission),
            Err(e) => {
                log::warn!("Not submitting score: {e}");
                None
            }
        }
    }
}

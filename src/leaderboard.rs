//! Shared leaderboard
//!
//! A flat ranked list: one entry per username at that player's best score,
//! sorted descending and capped at `LEADERBOARD_CAPACITY`.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{LEADERBOARD_CAPACITY, MAX_USERNAME_CHARS};

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("username is required")]
    MissingUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("score must be a positive integer")]
    InvalidScore,
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("leaderboard storage failed: {0}")]
    Storage(#[from] io::Error),
}

/// A player's best score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    pub updated_at: DateTime<Utc>,
}

/// A validated score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    username: String,
    score: u32,
}

impl ScoreSubmission {
    /// Validate a username/score pair. The username is trimmed.
    pub fn new(username: &str, score: u32) -> Result<Self, LeaderboardError> {
        let username = validate_username(username)?;
        if score == 0 {
            return Err(LeaderboardError::InvalidScore);
        }
        Ok(Self { username, score })
    }

    /// Parse and validate a `{username, score}` request body
    ///
    /// `score` may arrive as any JSON number as long as it is a positive
    /// integer value.
    pub fn from_json(body: &[u8]) -> Result<Self, LeaderboardError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| LeaderboardError::MalformedBody(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| LeaderboardError::MalformedBody("expected a JSON object".into()))?;

        let username = object
            .get("username")
            .and_then(|v| v.as_str())
            .ok_or(LeaderboardError::MissingUsername)?;
        let score = object
            .get("score")
            .and_then(positive_integer)
            .ok_or(LeaderboardError::InvalidScore)?;

        Self::new(username, score)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}

pub fn validate_username(raw: &str) -> Result<String, LeaderboardError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LeaderboardError::MissingUsername);
    }
    if name.chars().count() > MAX_USERNAME_CHARS {
        return Err(LeaderboardError::UsernameTooLong {
            max: MAX_USERNAME_CHARS,
        });
    }
    Ok(name.to_string())
}

fn positive_integer(value: &serde_json::Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok().filter(|n| *n > 0);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= 1.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

/// One leaderboard line as shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRow<'a> {
    pub rank: usize,
    pub username: &'a str,
    pub score: u32,
    pub is_me: bool,
}

/// Ranked list of best scores
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary entries, restoring the list invariants
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self { entries };
        board.normalize();
        board
    }

    /// Parse stored JSON, falling back to an empty list on any error
    pub fn from_json_lenient(json: &str) -> Self {
        match serde_json::from_str::<Vec<LeaderboardEntry>>(json) {
            Ok(entries) => Self::from_entries(entries),
            Err(e) => {
                log::warn!("Discarding unreadable leaderboard: {e}");
                Self::new()
            }
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Display rows, flagging the entry that belongs to `me`
    pub fn rows<'a>(&'a self, me: Option<&'a str>) -> impl Iterator<Item = BoardRow<'a>> + 'a {
        self.entries.iter().enumerate().map(move |(i, e)| BoardRow {
            rank: i + 1,
            username: &e.username,
            score: e.score,
            is_me: me == Some(e.username.as_str()),
        })
    }

    /// 1-indexed rank of a username
    pub fn rank_of(&self, username: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.username == username)
            .map(|i| i + 1)
    }

    /// Upsert keeping the player's maximum
    ///
    /// Returns true if the list changed.
    pub fn submit(&mut self, submission: &ScoreSubmission, now: DateTime<Utc>) -> bool {
        let changed = match self
            .entries
            .iter_mut()
            .find(|e| e.username == submission.username)
        {
            Some(entry) if submission.score > entry.score => {
                entry.score = submission.score;
                entry.updated_at = now;
                true
            }
            Some(_) => false,
            None => {
                self.entries.push(LeaderboardEntry {
                    username: submission.username.clone(),
                    score: submission.score,
                    updated_at: now,
                });
                true
            }
        };
        if changed {
            self.normalize();
        }
        changed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sort descending (stable), keep each username's best, cap the length
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        let mut seen = HashSet::new();
        self.entries.retain(|e| seen.insert(e.username.clone()));
        self.entries.truncate(LEADERBOARD_CAPACITY);
    }
}

/// Minimal persistence interface for the leaderboard
pub trait LeaderboardStore: Send {
    /// Current list; unreadable storage yields an empty list
    fn load(&self) -> Leaderboard;
    fn save(&mut self, board: &Leaderboard) -> Result<(), LeaderboardError>;
}

/// Pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LeaderboardStore for FileStore {
    fn load(&self) -> Leaderboard {
        match fs::read_to_string(&self.path) {
            Ok(json) => Leaderboard::from_json_lenient(&json),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Leaderboard::new(),
            Err(e) => {
                log::warn!("Failed to read {}: {e}", self.path.display());
                Leaderboard::new()
            }
        }
    }

    fn save(&mut self, board: &Leaderboard) -> Result<(), LeaderboardError> {
        let json = serde_json::to_string_pretty(board).map_err(io::Error::other)?;
        // Write beside the target then swap in, so readers never see half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Leaderboard saved ({} entries)", board.len());
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    board: Leaderboard,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardStore for MemoryStore {
    fn load(&self) -> Leaderboard {
        self.board.clone()
    }

    fn save(&mut self, board: &Leaderboard) -> Result<(), LeaderboardError> {
        self.board = board.clone();
        Ok(())
    }
}

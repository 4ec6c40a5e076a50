//! Coin Streak - A physically simulated coin toss streak game
//!
//! Core modules:
//! - `sim`: Coin physics, toss resolution and streak rules
//! - `game`: Fixed-step game loop tying the simulation to audio and scores
//! - `audio`: Owned audio session (Web Audio in the browser)
//! - `leaderboard`: Shared ranked list and its stores
//! - `server`: HTTP leaderboard (native only)
//! - `platform`: Browser storage and network access

pub mod audio;
pub mod game;
pub mod leaderboard;
pub mod odds;
pub mod platform;
pub mod profile;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
pub mod settings;
pub mod sim;

pub use game::{CoinGame, GameNotice};
pub use leaderboard::{BoardRow, Leaderboard, LeaderboardEntry, LeaderboardError};
pub use profile::PlayerProfile;
pub use settings::{Language, Settings};

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Coin geometry (world units)
    pub const COIN_RADIUS: f32 = 0.75;
    pub const COIN_HALF_THICKNESS: f32 = 0.05;
    /// Where the coin waits between tosses
    pub const COIN_REST_POSITION: Vec3 = Vec3::new(0.0, 0.5, 0.0);

    /// World gravity (units/s²)
    pub const GRAVITY: f32 = -30.0;

    /// Invisible walls around the table
    pub const ARENA_MIN_X: f32 = -7.0;
    pub const ARENA_MAX_X: f32 = 7.0;
    pub const ARENA_MIN_Z: f32 = -7.5;
    pub const ARENA_MAX_Z: f32 = 14.0;
    pub const ARENA_CEILING: f32 = 24.0;

    /// Gesture thresholds (pixels / milliseconds)
    pub const TAP_MAX_TRAVEL_PX: f32 = 10.0;
    pub const TAP_MAX_MS: f32 = 300.0;
    pub const FLICK_MIN_RISE_PX: f32 = 20.0;
    pub const FLICK_MAX_MS: f32 = 600.0;
    pub const MIN_GESTURE_MS: f32 = 16.0;

    /// Launch tuning: px/ms to world units/s
    pub const LAUNCH_HORIZONTAL_GAIN: f32 = 15.0;
    pub const LAUNCH_MAX_VX: f32 = 15.0;
    /// Negative z is away from the camera
    pub const LAUNCH_MIN_VZ: f32 = -25.0;
    pub const LAUNCH_MAX_VZ: f32 = 10.0;
    pub const TAP_LAUNCH_VY: f32 = 20.0;
    pub const FLICK_VY_GAIN: f32 = 20.0;
    pub const FLICK_VY_BASE: f32 = 10.0;
    pub const FLICK_MAX_VY: f32 = 30.0;
    /// Flip spin (rad/s) per unit of launch speed
    pub const SPIN_PER_LAUNCH_SPEED: f32 = 1.5;
    /// Random yaw spin upper bound (rad/s)
    pub const MAX_YAW_SPIN: f32 = 2.0;
    /// Probe passes used to fit the spin to whole turns
    pub const SPIN_TUNING_PASSES: usize = 4;

    /// Every velocity component below this counts as settled
    pub const SETTLE_VELOCITY_THRESHOLD: f32 = 0.1;
    /// Forced landing after launch (seconds, unscaled)
    pub const SAFETY_TIMEOUT: f64 = 4.0;
    /// Delay between landing and putting the coin back (seconds)
    pub const RESET_DELAY: f64 = 1.2;

    /// Streak milestones trigger slow motion
    pub const MILESTONE_INTERVAL: u32 = 5;
    pub const SLOW_MOTION_SCALE: f32 = 0.6;

    /// Leaderboard limits
    pub const LEADERBOARD_CAPACITY: usize = 100;
    pub const MAX_USERNAME_CHARS: usize = 15;
    pub const LEADERBOARD_ENDPOINT: &str = "/leaderboard";
}

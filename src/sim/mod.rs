//! Coin simulation
//!
//! Everything here runs on the fixed timestep and is free of browser or
//! rendering dependencies:
//! - `body`: the coin and which face is up
//! - `physics`: the engine seam and the built-in table world
//! - `resolver`: the toss state machine
//! - `streak`: win/loss policy

pub mod body;
pub mod gesture;
pub mod physics;
pub mod resolver;
pub mod streak;
pub mod timer;

pub use body::{CoinSide, RigidBody};
pub use gesture::{Gesture, GestureKind, PointerTracker};
pub use physics::{ArenaConfig, CoinArena, Contact, PhysicsEngine};
pub use resolver::{Flight, ResolverTimer, TossEvent, TossPhase, TossRequest, TossResolver};
pub use streak::{StreakState, Verdict, is_milestone};
pub use timer::{TimerId, Timers};

//! Coin rigid body and face geometry

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{COIN_HALF_THICKNESS, COIN_RADIUS};

/// A face of the coin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn opposite(self) -> Self {
        match self {
            CoinSide::Heads => CoinSide::Tails,
            CoinSide::Tails => CoinSide::Heads,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoinSide::Heads => "heads",
            CoinSide::Tails => "tails",
        }
    }

    /// Orientation that puts this face up (heads is the identity)
    pub fn face_up_rotation(self) -> Quat {
        match self {
            CoinSide::Heads => Quat::IDENTITY,
            CoinSide::Tails => Quat::from_rotation_x(std::f32::consts::PI),
        }
    }

    /// Side whose face points up for the given orientation
    pub fn facing_up(rotation: Quat) -> Self {
        if (rotation * Vec3::Y).y > 0.0 {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }
}

/// The simulated coin
///
/// Velocities are world-space; `angvel` is an axis scaled by rad/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
    /// Lowest point of the coin was below the floor after the last step
    #[serde(default)]
    pub touching_floor: bool,
    /// Body was put to sleep by the engine
    #[serde(default)]
    pub sleeping: bool,
    /// Total rotation swept (radians) since the last write
    #[serde(skip)]
    pub spin_travel: f32,
}

impl RigidBody {
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            touching_floor: false,
            sleeping: false,
            spin_travel: 0.0,
        }
    }

    /// Unit normal of the heads face in world space
    pub fn face_normal(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Side currently facing up
    pub fn up_side(&self) -> CoinSide {
        CoinSide::facing_up(self.rotation)
    }

    /// Distance from the center to the lowest point of the disc
    pub fn vertical_extent(&self) -> f32 {
        let ny = self.face_normal().y.abs().min(1.0);
        COIN_RADIUS * (1.0 - ny * ny).sqrt() + COIN_HALF_THICKNESS * ny
    }

    /// Overwrite the full kinematic state and wake the body
    pub fn set_state(&mut self, position: Vec3, rotation: Quat, linvel: Vec3, angvel: Vec3) {
        self.position = position;
        self.rotation = rotation.normalize();
        self.linvel = linvel;
        self.angvel = angvel;
        self.touching_floor = false;
        self.sleeping = false;
        self.spin_travel = 0.0;
    }

    /// True when every velocity component is under `threshold`
    pub fn is_still(&self, threshold: f32) -> bool {
        self.linvel.abs().max_element() < threshold && self.angvel.abs().max_element() < threshold
    }
}

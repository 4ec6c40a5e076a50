//! Rigid-body stepping for the coin
//!
//! The engine is stateless apart from its tuning: per-body contact state lives
//! on the `RigidBody`, so a copy of the body can be stepped ahead to try a
//! launch without disturbing the real one.

use glam::{Quat, Vec3};

use super::body::RigidBody;
use crate::consts::*;

/// A body only sleeps once its face is within ~2.5 degrees of flat
const FLAT_COS: f32 = 0.999;

/// A contact that began during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Floor,
    Wall,
    Ceiling,
}

/// Physics collaborator seam
///
/// `step` advances the body by `dt` seconds and appends every contact that
/// began during the step.
pub trait PhysicsEngine {
    fn step(&self, body: &mut RigidBody, dt: f32, contacts: &mut Vec<Contact>);
}

/// Tuning for the table, walls and coin material
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub gravity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Floor bounce (coin 0.6 averaged with wood 0.3)
    pub restitution: f32,
    pub wall_restitution: f32,
    /// Rebounds slower than this come to rest
    pub resting_speed: f32,
    /// Horizontal speed kept through an impact
    pub impact_slide_retention: f32,
    /// Exponential decay rate of sliding and spinning while on the table
    pub contact_friction: f32,
    /// Tumble kept after an impact (spin about horizontal axes)
    pub tumble_retention: f32,
    /// Yaw kept after an impact (spin about the vertical axis)
    pub yaw_retention: f32,
    /// Rate at which a coin on the table settles onto its nearest face
    pub alignment_rate: f32,
    pub sleep_speed: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub ceiling: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            linear_damping: 0.4,
            angular_damping: 0.6,
            restitution: 0.45,
            wall_restitution: 0.45,
            resting_speed: 2.5,
            impact_slide_retention: 0.5,
            contact_friction: 8.0,
            tumble_retention: 0.02,
            yaw_retention: 0.8,
            alignment_rate: 20.0,
            sleep_speed: 0.05,
            min_x: ARENA_MIN_X,
            max_x: ARENA_MAX_X,
            min_z: ARENA_MIN_Z,
            max_z: ARENA_MAX_Z,
            ceiling: ARENA_CEILING,
        }
    }
}

/// Wooden table boxed in by invisible walls
#[derive(Debug, Clone, Default)]
pub struct CoinArena {
    pub config: ArenaConfig,
}

impl CoinArena {
    fn integrate(&self, body: &mut RigidBody, dt: f32) {
        let cfg = &self.config;

        body.linvel.y += cfg.gravity * dt;
        body.linvel *= 1.0 / (1.0 + dt * cfg.linear_damping);
        body.angvel *= 1.0 / (1.0 + dt * cfg.angular_damping);

        body.position += body.linvel * dt;

        let swept = body.angvel.length() * dt;
        if swept > 0.0 {
            body.rotation = (Quat::from_scaled_axis(body.angvel * dt) * body.rotation).normalize();
            body.spin_travel += swept;
        }
    }

    fn resolve_floor(&self, body: &mut RigidBody, dt: f32, contacts: &mut Vec<Contact>) {
        let cfg = &self.config;
        let extent = body.vertical_extent();

        if body.position.y - extent > 0.0 {
            body.touching_floor = false;
            return;
        }

        if !body.touching_floor {
            contacts.push(Contact::Floor);
            // Impact knocks out most of the tumble
            body.angvel.x *= cfg.tumble_retention;
            body.angvel.z *= cfg.tumble_retention;
            body.angvel.y *= cfg.yaw_retention;
            body.linvel.x *= cfg.impact_slide_retention;
            body.linvel.z *= cfg.impact_slide_retention;
        }
        body.touching_floor = true;

        if body.linvel.y < 0.0 {
            let rebound = -body.linvel.y * cfg.restitution;
            body.linvel.y = if rebound < cfg.resting_speed { 0.0 } else { rebound };
        }

        let friction = (-cfg.contact_friction * dt).exp();
        body.linvel.x *= friction;
        body.linvel.z *= friction;
        body.angvel *= friction;

        // Tip onto whichever face is already closer to up
        let normal = body.face_normal();
        let up = if normal.y >= 0.0 { Vec3::Y } else { Vec3::NEG_Y };
        let flat = Quat::from_rotation_arc(normal, up) * body.rotation;
        let t = 1.0 - (-cfg.alignment_rate * dt).exp();
        body.rotation = body.rotation.slerp(flat, t).normalize();

        // Seat on the table after tipping so the next step stays in contact
        body.position.y = body.vertical_extent();
    }

    fn resolve_walls(&self, body: &mut RigidBody, contacts: &mut Vec<Contact>) {
        let cfg = &self.config;
        let r = COIN_RADIUS;
        let e = cfg.wall_restitution;

        if body.position.x - r < cfg.min_x {
            body.position.x = cfg.min_x + r;
            if body.linvel.x < 0.0 {
                body.linvel.x = -body.linvel.x * e;
                contacts.push(Contact::Wall);
            }
        } else if body.position.x + r > cfg.max_x {
            body.position.x = cfg.max_x - r;
            if body.linvel.x > 0.0 {
                body.linvel.x = -body.linvel.x * e;
                contacts.push(Contact::Wall);
            }
        }

        if body.position.z - r < cfg.min_z {
            body.position.z = cfg.min_z + r;
            if body.linvel.z < 0.0 {
                body.linvel.z = -body.linvel.z * e;
                contacts.push(Contact::Wall);
            }
        } else if body.position.z + r > cfg.max_z {
            body.position.z = cfg.max_z - r;
            if body.linvel.z > 0.0 {
                body.linvel.z = -body.linvel.z * e;
                contacts.push(Contact::Wall);
            }
        }

        let top = body.position.y + body.vertical_extent();
        if top > cfg.ceiling {
            body.position.y -= top - cfg.ceiling;
            if body.linvel.y > 0.0 {
                body.linvel.y = -body.linvel.y * e;
                contacts.push(Contact::Ceiling);
            }
        }
    }

    fn try_sleep(&self, body: &mut RigidBody) {
        let limit = self.config.sleep_speed;
        let flat = body.face_normal().y.abs() > FLAT_COS;
        if body.touching_floor
            && flat
            && body.linvel.length() < limit
            && body.angvel.length() < limit
        {
            body.linvel = Vec3::ZERO;
            body.angvel = Vec3::ZERO;
            body.sleeping = true;
        }
    }
}

impl PhysicsEngine for CoinArena {
    fn step(&self, body: &mut RigidBody, dt: f32, contacts: &mut Vec<Contact>) {
        if body.sleeping || dt <= 0.0 {
            return;
        }
        self.integrate(body, dt);
        self.resolve_floor(body, dt, contacts);
        self.resolve_walls(body, contacts);
        self.try_sleep(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::CoinSide;

    fn run_until_asleep(arena: &CoinArena, body: &mut RigidBody, max_steps: usize) -> Vec<Contact> {
        let mut all = Vec::new();
        for _ in 0..max_steps {
            arena.step(body, SIM_DT, &mut all);
            if body.sleeping {
                break;
            }
        }
        all
    }

    #[test]
    fn test_dropped_coin_bounces_then_sleeps() {
        let arena = CoinArena::default();
        let mut body = RigidBody::at_rest(Vec3::new(0.0, 3.0, 0.0));

        let contacts = run_until_asleep(&arena, &mut body, 2000);

        assert!(body.sleeping);
        assert!(body.touching_floor);
        assert!((body.position.y - COIN_HALF_THICKNESS).abs() < 1e-3);
        let floor_hits = contacts.iter().filter(|c| **c == Contact::Floor).count();
        assert!(floor_hits >= 2, "expected at least one bounce, got {floor_hits}");
    }

    #[test]
    fn test_resting_contact_reports_floor_once() {
        let arena = CoinArena::default();
        let mut body = RigidBody::at_rest(Vec3::new(0.0, COIN_HALF_THICKNESS, 0.0));
        let mut contacts = Vec::new();
        for _ in 0..60 {
            arena.step(&mut body, SIM_DT, &mut contacts);
        }
        assert_eq!(contacts, vec![Contact::Floor]);
    }

    #[test]
    fn test_tilted_coin_settles_on_nearest_face() {
        let arena = CoinArena::default();
        let mut body = RigidBody::at_rest(Vec3::new(0.0, 1.0, 0.0));
        // Heads face tipped 60 degrees from up
        body.rotation = Quat::from_rotation_x(1.05);
        run_until_asleep(&arena, &mut body, 2000);
        assert_eq!(body.up_side(), CoinSide::Heads);

        let mut body = RigidBody::at_rest(Vec3::new(0.0, 1.0, 0.0));
        body.rotation = Quat::from_rotation_x(2.1);
        run_until_asleep(&arena, &mut body, 2000);
        assert_eq!(body.up_side(), CoinSide::Tails);
        assert!(body.face_normal().y < -0.99);
    }

    #[test]
    fn test_walls_keep_coin_in_arena() {
        let arena = CoinArena::default();
        let mut body = RigidBody::at_rest(Vec3::new(0.0, 2.0, 0.0));
        body.linvel = Vec3::new(40.0, 0.0, -40.0);
        let mut contacts = Vec::new();
        for _ in 0..240 {
            arena.step(&mut body, SIM_DT, &mut contacts);
            assert!(body.position.x + COIN_RADIUS <= ARENA_MAX_X + 1e-4);
            assert!(body.position.z - COIN_RADIUS >= ARENA_MIN_Z - 1e-4);
        }
        assert!(contacts.contains(&Contact::Wall));
    }

    #[test]
    fn test_sleeping_body_is_not_stepped() {
        let arena = CoinArena::default();
        let mut body = RigidBody::at_rest(Vec3::new(0.0, 5.0, 0.0));
        body.sleeping = true;
        let mut contacts = Vec::new();
        arena.step(&mut body, SIM_DT, &mut contacts);
        assert_eq!(body.position, Vec3::new(0.0, 5.0, 0.0));
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_spin_travel_accumulates() {
        let arena = CoinArena::default();
        let mut body = RigidBody::at_rest(Vec3::new(0.0, 10.0, 0.0));
        body.angvel = Vec3::new(12.0, 0.0, 0.0);
        let mut contacts = Vec::new();
        arena.step(&mut body, SIM_DT, &mut contacts);
        let expected = 12.0 / (1.0 + SIM_DT * 0.6) * SIM_DT;
        assert!((body.spin_travel - expected).abs() < 1e-5);
    }
}

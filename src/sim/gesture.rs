//! Pointer gesture tracking and classification
//!
//! Screen coordinates: +x right, +y down, so an upward swipe has negative `dy`.

use glam::{Vec2, Vec3};

use crate::consts::*;

/// Qualifying gesture shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Tap,
    Flick,
}

/// Displacement and duration between pointer press and release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    /// Horizontal displacement in pixels
    pub dx: f32,
    /// Vertical displacement in pixels (negative is up)
    pub dy: f32,
    /// Time between press and release in milliseconds
    pub elapsed_ms: f32,
}

impl Gesture {
    pub fn new(dx: f32, dy: f32, elapsed_ms: f32) -> Self {
        Self { dx, dy, elapsed_ms }
    }

    /// Elapsed time floored so a same-frame release never divides by ~0
    pub fn effective_ms(&self) -> f32 {
        self.elapsed_ms.max(MIN_GESTURE_MS)
    }

    /// Tap, flick, or `None` for anything else. A flick wins when both match.
    pub fn classify(&self) -> Option<GestureKind> {
        let dt = self.effective_ms();
        if self.dy < -FLICK_MIN_RISE_PX && dt < FLICK_MAX_MS {
            Some(GestureKind::Flick)
        } else if self.dx.abs() < TAP_MAX_TRAVEL_PX
            && self.dy.abs() < TAP_MAX_TRAVEL_PX
            && dt < TAP_MAX_MS
        {
            Some(GestureKind::Tap)
        } else {
            None
        }
    }

    /// Launch velocity in world units for a classified gesture
    ///
    /// Screen x maps to world x and screen y to world z, so an upward flick
    /// sends the coin away from the camera.
    pub fn launch_velocity(&self, kind: GestureKind) -> Vec3 {
        let dt = self.effective_ms();
        let vx = (self.dx / dt * LAUNCH_HORIZONTAL_GAIN).clamp(-LAUNCH_MAX_VX, LAUNCH_MAX_VX);
        let vz = (self.dy / dt * LAUNCH_HORIZONTAL_GAIN).clamp(LAUNCH_MIN_VZ, LAUNCH_MAX_VZ);
        let vy = match kind {
            GestureKind::Tap => TAP_LAUNCH_VY,
            GestureKind::Flick => {
                (self.dy.abs() / dt * FLICK_VY_GAIN + FLICK_VY_BASE).min(FLICK_MAX_VY)
            }
        };
        Vec3::new(vx, vy, vz)
    }
}

/// Remembers where and when the pointer went down
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pressed: Option<(Vec2, f64)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, pos: Vec2, time_ms: f64) {
        self.pressed = Some((pos, time_ms));
    }

    /// Complete the gesture. Returns `None` if there was no matching press.
    pub fn release(&mut self, pos: Vec2, time_ms: f64) -> Option<Gesture> {
        let (start, t0) = self.pressed.take()?;
        let delta = pos - start;
        Some(Gesture::new(delta.x, delta.y, (time_ms - t0).max(0.0) as f32))
    }

    pub fn cancel(&mut self) {
        self.pressed = None;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(Gesture::new(0.0, 0.0, 100.0).classify(), Some(GestureKind::Tap));
        assert_eq!(Gesture::new(3.0, -4.0, 299.0).classify(), Some(GestureKind::Tap));
        assert_eq!(Gesture::new(0.0, 0.0, 300.0).classify(), None);
        assert_eq!(Gesture::new(10.0, 0.0, 50.0).classify(), None);
        assert_eq!(Gesture::new(0.0, -21.0, 500.0).classify(), Some(GestureKind::Flick));
        assert_eq!(Gesture::new(40.0, -120.0, 150.0).classify(), Some(GestureKind::Flick));
        assert_eq!(Gesture::new(0.0, -120.0, 600.0).classify(), None);
        // Downward drags never toss
        assert_eq!(Gesture::new(0.0, 80.0, 100.0).classify(), None);
        // Sideways swipe
        assert_eq!(Gesture::new(200.0, -5.0, 100.0).classify(), None);
    }

    #[test]
    fn test_elapsed_is_floored() {
        let g = Gesture::new(0.0, -100.0, 0.0);
        assert_eq!(g.effective_ms(), MIN_GESTURE_MS);
        let v = g.launch_velocity(GestureKind::Flick);
        assert!(v.is_finite());
        assert_eq!(v.y, FLICK_MAX_VY);
    }

    #[test]
    fn test_tap_launch() {
        let v = Gesture::new(0.0, 0.0, 80.0).launch_velocity(GestureKind::Tap);
        assert_eq!(v, Vec3::new(0.0, TAP_LAUNCH_VY, 0.0));
    }

    #[test]
    fn test_flick_launch_scales_with_speed() {
        // 100 px in 200 ms: 0.5 px/ms
        let v = Gesture::new(0.0, -100.0, 200.0).launch_velocity(GestureKind::Flick);
        assert!((v.y - 20.0).abs() < 1e-4);
        assert!((v.z - -7.5).abs() < 1e-4);
        assert_eq!(v.x, 0.0);
    }

    #[test]
    fn test_tracker() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.release(Vec2::ZERO, 10.0).is_none());

        tracker.press(Vec2::new(100.0, 200.0), 1000.0);
        assert!(tracker.is_pressed());
        let g = tracker.release(Vec2::new(104.0, 150.0), 1120.0).unwrap();
        assert_eq!(g, Gesture::new(4.0, -50.0, 120.0));
        assert!(!tracker.is_pressed());

        tracker.press(Vec2::ZERO, 0.0);
        tracker.cancel();
        assert!(tracker.release(Vec2::ZERO, 5.0).is_none());
    }

    proptest! {
        #[test]
        fn prop_launch_velocity_is_clamped(
            dx in -5000.0f32..5000.0,
            dy in -5000.0f32..5000.0,
            ms in 0.0f32..2000.0,
        ) {
            let g = Gesture::new(dx, dy, ms);
            if let Some(kind) = g.classify() {
                let v = g.launch_velocity(kind);
                prop_assert!(v.x.abs() <= LAUNCH_MAX_VX);
                prop_assert!(v.z >= LAUNCH_MIN_VZ && v.z <= LAUNCH_MAX_VZ);
                prop_assert!(v.y >= TAP_LAUNCH_VY.min(FLICK_VY_BASE) && v.y <= FLICK_MAX_VY);
            }
        }

        #[test]
        fn prop_slow_gestures_are_ignored(
            dx in -50.0f32..50.0,
            dy in -500.0f32..500.0,
            ms in 600.0f32..5000.0,
        ) {
            prop_assert_eq!(Gesture::new(dx, dy, ms).classify(), None);
        }

        #[test]
        fn prop_classification_needs_upward_or_small_travel(
            dx in -500.0f32..500.0,
            dy in -500.0f32..500.0,
            ms in 0.0f32..1000.0,
        ) {
            let g = Gesture::new(dx, dy, ms);
            match g.classify() {
                Some(GestureKind::Flick) => prop_assert!(dy < -FLICK_MIN_RISE_PX),
                Some(GestureKind::Tap) => prop_assert!(dx.abs() < TAP_MAX_TRAVEL_PX && dy.abs() < TAP_MAX_TRAVEL_PX),
                None => {}
            }
        }
    }
}

//! Toss resolver
//!
//! Owns the coin body for the whole toss cycle:
//!
//! ```text
//! Idle --gesture--> InFlight --settled | safety timeout--> Settling --reset delay--> Idle
//! ```
//!
//! The logical outcome is drawn before any velocity is applied, and the launch
//! spin is tuned against the physics engine so the coin comes down on the
//! decided face. The side that gets reported is still read from the settled
//! orientation; a mismatch is logged rather than corrected.

use glam::{Quat, Vec3};
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{CoinSide, RigidBody};
use super::gesture::{Gesture, GestureKind};
use super::physics::{Contact, PhysicsEngine};
use super::streak::StreakState;
use super::timer::{TimerId, Timers};
use crate::consts::*;

/// Launch parameters, fixed before the body is touched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TossRequest {
    pub kind: GestureKind,
    pub linvel: Vec3,
    /// Spin actually applied (after tuning)
    pub angvel: Vec3,
    pub outcome: CoinSide,
    /// Resolver clock reading at launch (seconds)
    pub issued_at: f64,
}

/// Bookkeeping for a toss that has not landed yet
#[derive(Debug, Clone)]
pub struct Flight {
    pub request: TossRequest,
    safety: TimerId,
    /// Projected streak is a milestone
    milestone: bool,
    contacted: bool,
}

#[derive(Debug, Clone)]
pub enum TossPhase {
    Idle,
    InFlight(Flight),
    /// Landed side reported; waiting to put the coin back
    Settling { reset: TimerId },
}

impl TossPhase {
    /// A toss cycle is running (no new gesture accepted)
    pub fn is_flipping(&self) -> bool {
        !matches!(self, TossPhase::Idle)
    }

    /// The landed side for this cycle has been emitted
    pub fn has_reported(&self) -> bool {
        matches!(self, TossPhase::Settling { .. })
    }
}

/// Scheduled resolver work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverTimer {
    SafetyTimeout,
    Reset,
}

/// Everything the resolver reports to the rest of the game
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TossEvent {
    Launched(TossRequest),
    /// Coin hit the table while in flight
    FloorContact,
    TensionStarted,
    TensionStopped,
    Landed(CoinSide),
    /// Coin is back at rest and a new toss may start
    Reset,
}

pub struct TossResolver<R = Pcg32> {
    body: RigidBody,
    phase: TossPhase,
    timers: Timers<ResolverTimer>,
    time_scale: f32,
    tension: bool,
    reduced_motion: bool,
    rest: Vec3,
    rng: R,
}

impl TossResolver<Pcg32> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(Pcg32::seed_from_u64(seed))
    }
}

impl<R: RngCore> TossResolver<R> {
    pub fn new(rng: R) -> Self {
        Self {
            body: RigidBody::at_rest(COIN_REST_POSITION),
            phase: TossPhase::Idle,
            timers: Timers::new(),
            time_scale: 1.0,
            tension: false,
            reduced_motion: false,
            rest: COIN_REST_POSITION,
            rng,
        }
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn phase(&self) -> &TossPhase {
        &self.phase
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn tension_active(&self) -> bool {
        self.tension
    }

    /// Resolver clock (seconds of unscaled time)
    pub fn now(&self) -> f64 {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    /// Keep the time scale at 1.0 on milestones
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    /// Start a toss from a completed gesture
    ///
    /// Returns the launch request, or `None` when the gesture does not qualify
    /// or a toss cycle is already running. Rejected gestures change nothing.
    pub fn try_toss<E: PhysicsEngine>(
        &mut self,
        engine: &E,
        gesture: &Gesture,
        streak: &StreakState,
        events: &mut Vec<TossEvent>,
    ) -> Option<TossRequest> {
        let kind = gesture.classify()?;
        if self.phase.is_flipping() {
            log::debug!("Ignoring {kind:?}: toss already in progress");
            return None;
        }

        // Decide first; physics only has to agree with it
        let target = streak.target().unwrap_or(CoinSide::Heads);
        let outcome = if self.rng.random_bool(0.5) {
            target
        } else {
            target.opposite()
        };

        let linvel = gesture.launch_velocity(kind);
        let yaw = self.rng.random_range(0.0..MAX_YAW_SPIN);
        let nominal = Vec3::new(linvel.y * SPIN_PER_LAUNCH_SPEED, yaw, 0.0);

        let start = outcome.face_up_rotation();
        let angvel = tune_spin(engine, self.rest, start, linvel, nominal);

        self.timers.cancel_all();
        self.body.set_state(self.rest, start, linvel, angvel);

        let request = TossRequest {
            kind,
            linvel,
            angvel,
            outcome,
            issued_at: self.timers.now(),
        };
        let safety = self.timers.schedule(SAFETY_TIMEOUT, ResolverTimer::SafetyTimeout);
        self.phase = TossPhase::InFlight(Flight {
            request,
            safety,
            milestone: streak.next_is_milestone(),
            contacted: false,
        });

        log::debug!(
            "Toss launched: {kind:?} outcome={} linvel={linvel:?} spin={:.2}",
            outcome.as_str(),
            angvel.length()
        );
        events.push(TossEvent::Launched(request));
        Some(request)
    }

    /// Advance the resolver clock by `dt` and the physics by `dt * time_scale`
    pub fn tick<E: PhysicsEngine>(&mut self, engine: &E, dt: f32, events: &mut Vec<TossEvent>) {
        for (id, timer) in self.timers.advance(dt as f64) {
            self.on_timer(id, timer, events);
        }

        let mut contacts = Vec::new();
        engine.step(&mut self.body, dt * self.time_scale, &mut contacts);

        let TossPhase::InFlight(flight) = &mut self.phase else {
            return;
        };

        let mut start_tension = false;
        for contact in &contacts {
            if *contact != Contact::Floor {
                continue;
            }
            events.push(TossEvent::FloorContact);
            if !flight.contacted {
                flight.contacted = true;
                start_tension = flight.milestone;
            }
        }
        if start_tension {
            self.start_tension(events);
        }

        if self.body.touching_floor && self.body.is_still(SETTLE_VELOCITY_THRESHOLD) {
            self.land(events);
        }
    }

    /// Cancel pending timers and drop any running cycle
    pub fn shutdown(&mut self, events: &mut Vec<TossEvent>) {
        self.timers.cancel_all();
        self.time_scale = 1.0;
        if self.tension {
            self.tension = false;
            events.push(TossEvent::TensionStopped);
        }
        self.phase = TossPhase::Idle;
    }

    fn on_timer(&mut self, id: TimerId, timer: ResolverTimer, events: &mut Vec<TossEvent>) {
        match timer {
            ResolverTimer::SafetyTimeout
                if matches!(&self.phase, TossPhase::InFlight(f) if f.safety == id) =>
            {
                log::info!("Coin did not settle in time, forcing landing");
                self.land(events);
            }
            ResolverTimer::Reset
                if matches!(&self.phase, TossPhase::Settling { reset, .. } if *reset == id) =>
            {
                self.reset(events);
            }
            _ => log::debug!("Dropping stale {timer:?}"),
        }
    }

    fn start_tension(&mut self, events: &mut Vec<TossEvent>) {
        if self.tension {
            return;
        }
        self.tension = true;
        if !self.reduced_motion {
            self.time_scale = SLOW_MOTION_SCALE;
        }
        events.push(TossEvent::TensionStarted);
    }

    /// Report the up-facing side and schedule the reset
    fn land(&mut self, events: &mut Vec<TossEvent>) {
        let TossPhase::InFlight(flight) = &self.phase else {
            return;
        };
        self.timers.cancel(flight.safety);

        let side = self.body.up_side();
        if side != flight.request.outcome {
            log::warn!(
                "Coin landed {} but {} was decided",
                side.as_str(),
                flight.request.outcome.as_str()
            );
        }

        self.time_scale = 1.0;
        if self.tension {
            self.tension = false;
            events.push(TossEvent::TensionStopped);
        }
        events.push(TossEvent::Landed(side));

        let reset = self.timers.schedule(RESET_DELAY, ResolverTimer::Reset);
        self.phase = TossPhase::Settling { reset };
    }

    /// Put the coin back on its rest point, keeping the landed face up
    fn reset(&mut self, events: &mut Vec<TossEvent>) {
        let rotation = self.body.rotation;
        let position = Vec3::new(self.rest.x, COIN_REST_POSITION.y, self.rest.z);
        self.body.set_state(position, rotation, Vec3::ZERO, Vec3::ZERO);
        self.phase = TossPhase::Idle;
        events.push(TossEvent::Reset);
    }
}

/// Rescale `nominal` so the coin sweeps whole turns before it first hits the table
///
/// Steps a copy of the launched body through the engine. Returns `nominal`
/// unchanged when the trial copy never reaches the floor or never spins.
fn tune_spin<E: PhysicsEngine>(
    engine: &E,
    position: Vec3,
    rotation: Quat,
    linvel: Vec3,
    nominal: Vec3,
) -> Vec3 {
    let mut angvel = nominal;
    for _ in 0..SPIN_TUNING_PASSES {
        let mut trial = RigidBody::at_rest(position);
        trial.set_state(position, rotation, linvel, angvel);
        let Some(travel) = travel_to_first_contact(engine, &mut trial) else {
            return angvel;
        };
        if travel <= f32::EPSILON {
            return angvel;
        }
        let turns = (travel / std::f32::consts::TAU).round().max(1.0);
        let scale = turns * std::f32::consts::TAU / travel;
        angvel *= scale;
        if (scale - 1.0).abs() < 1e-3 {
            break;
        }
    }
    angvel
}

fn travel_to_first_contact<E: PhysicsEngine>(engine: &E, body: &mut RigidBody) -> Option<f32> {
    let max_steps = (SAFETY_TIMEOUT / SIM_DT as f64).ceil() as usize;
    let mut contacts = Vec::new();
    for _ in 0..max_steps {
        engine.step(body, SIM_DT, &mut contacts);
        if contacts.contains(&Contact::Floor) {
            return Some(body.spin_travel);
        }
        contacts.clear();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::CoinArena;

    /// Every draw returns the same word: 0 wins the coin flip, `u64::MAX` loses it
    struct FixedRng(u64);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for (i, byte) in dest.iter_mut().enumerate() {
                *byte = self.0.to_le_bytes()[i % 8];
            }
        }
    }

    const WIN: u64 = 0;
    const LOSE: u64 = u64::MAX;

    /// Lands on the first step without moving the coin
    struct ImmediateEngine;

    impl PhysicsEngine for ImmediateEngine {
        fn step(&self, body: &mut RigidBody, _dt: f32, contacts: &mut Vec<Contact>) {
            if !body.touching_floor {
                contacts.push(Contact::Floor);
            }
            body.touching_floor = true;
            body.linvel = Vec3::ZERO;
            body.angvel = Vec3::ZERO;
        }
    }

    /// Lands immediately but always shows `side`
    struct ShowsSideEngine(CoinSide);

    impl PhysicsEngine for ShowsSideEngine {
        fn step(&self, body: &mut RigidBody, dt: f32, contacts: &mut Vec<Contact>) {
            ImmediateEngine.step(body, dt, contacts);
            body.rotation = self.0.face_up_rotation();
        }
    }

    /// Keeps the coin spinning in mid-air, showing `side`
    struct StuckEngine(CoinSide);

    impl PhysicsEngine for StuckEngine {
        fn step(&self, body: &mut RigidBody, _dt: f32, _contacts: &mut Vec<Contact>) {
            body.rotation = self.0.face_up_rotation();
        }
    }

    fn tap() -> Gesture {
        Gesture::new(0.0, 0.0, 90.0)
    }

    fn streak_of(side: CoinSide, n: u32) -> StreakState {
        let mut streak = StreakState::new();
        for _ in 0..n {
            streak.apply(side);
        }
        streak
    }

    fn run<E: PhysicsEngine, R: RngCore>(
        resolver: &mut TossResolver<R>,
        engine: &E,
        seconds: f32,
        events: &mut Vec<TossEvent>,
    ) {
        let steps = (seconds / SIM_DT).round() as usize;
        for _ in 0..steps {
            resolver.tick(engine, SIM_DT, events);
        }
    }

    fn landed(events: &[TossEvent]) -> Vec<CoinSide> {
        events
            .iter()
            .filter_map(|e| match e {
                TossEvent::Landed(side) => Some(*side),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_invalid_gesture_changes_nothing() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        let slow = Gesture::new(0.0, 0.0, 900.0);
        assert!(resolver.try_toss(&ImmediateEngine, &slow, &StreakState::new(), &mut events).is_none());
        assert!(events.is_empty());
        assert!(matches!(resolver.phase(), TossPhase::Idle));
        assert_eq!(resolver.pending_timers(), 0);
        assert_eq!(resolver.body().position, COIN_REST_POSITION);
    }

    #[test]
    fn test_outcome_follows_draw_and_target() {
        let mut events = Vec::new();
        let none = StreakState::new();
        let tails = streak_of(CoinSide::Tails, 2);

        let mut resolver = TossResolver::new(FixedRng(WIN));
        let req = resolver.try_toss(&ImmediateEngine, &tap(), &none, &mut events).unwrap();
        assert_eq!(req.outcome, CoinSide::Heads);

        let mut resolver = TossResolver::new(FixedRng(LOSE));
        let req = resolver.try_toss(&ImmediateEngine, &tap(), &none, &mut events).unwrap();
        assert_eq!(req.outcome, CoinSide::Tails);

        let mut resolver = TossResolver::new(FixedRng(WIN));
        let req = resolver.try_toss(&ImmediateEngine, &tap(), &tails, &mut events).unwrap();
        assert_eq!(req.outcome, CoinSide::Tails);
        // Decided face is up at launch
        assert_eq!(resolver.body().up_side(), CoinSide::Tails);

        let mut resolver = TossResolver::new(FixedRng(LOSE));
        let req = resolver.try_toss(&ImmediateEngine, &tap(), &tails, &mut events).unwrap();
        assert_eq!(req.outcome, CoinSide::Heads);
    }

    #[test]
    fn test_launch_applies_request() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        let req = resolver
            .try_toss(&ImmediateEngine, &tap(), &StreakState::new(), &mut events)
            .unwrap();
        assert_eq!(events, vec![TossEvent::Launched(req)]);
        assert_eq!(req.linvel, Vec3::new(0.0, TAP_LAUNCH_VY, 0.0));
        assert_eq!(resolver.body().linvel, req.linvel);
        assert_eq!(resolver.body().angvel, req.angvel);
        assert_eq!(req.angvel.x, TAP_LAUNCH_VY * SPIN_PER_LAUNCH_SPEED);
        assert!(resolver.phase().is_flipping());
        assert!(!resolver.phase().has_reported());
    }

    #[test]
    fn test_gesture_rejected_until_reset() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let streak = StreakState::new();
        let mut events = Vec::new();
        assert!(resolver.try_toss(&ImmediateEngine, &tap(), &streak, &mut events).is_some());

        // In flight
        assert!(resolver.try_toss(&ImmediateEngine, &tap(), &streak, &mut events).is_none());

        // Settling
        resolver.tick(&ImmediateEngine, SIM_DT, &mut events);
        assert!(resolver.phase().has_reported());
        assert!(resolver.try_toss(&ImmediateEngine, &tap(), &streak, &mut events).is_none());

        run(&mut resolver, &ImmediateEngine, RESET_DELAY as f32 + 0.05, &mut events);
        assert!(matches!(resolver.phase(), TossPhase::Idle));
        assert!(resolver.try_toss(&ImmediateEngine, &tap(), &streak, &mut events).is_some());
        let launches = events.iter().filter(|e| matches!(e, TossEvent::Launched(_))).count();
        assert_eq!(launches, 2);
    }

    #[test]
    fn test_landed_once_then_reset() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        resolver.try_toss(&ImmediateEngine, &tap(), &StreakState::new(), &mut events);
        run(&mut resolver, &ImmediateEngine, 3.0, &mut events);

        assert_eq!(landed(&events), vec![CoinSide::Heads]);
        let landed_at = events.iter().position(|e| matches!(e, TossEvent::Landed(_)));
        let reset_at = events.iter().position(|e| *e == TossEvent::Reset);
        assert!(landed_at < reset_at);
        assert_eq!(events.iter().filter(|e| **e == TossEvent::Reset).count(), 1);

        // Back on the rest point with the landed face kept
        let body = resolver.body();
        assert_eq!(body.position.y, COIN_REST_POSITION.y);
        assert_eq!(body.linvel, Vec3::ZERO);
        assert_eq!(body.up_side(), CoinSide::Heads);
        // Safety timer was cancelled by the landing
        assert_eq!(resolver.pending_timers(), 0);
    }

    #[test]
    fn test_reported_side_comes_from_orientation() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        let engine = ShowsSideEngine(CoinSide::Tails);
        let req = resolver
            .try_toss(&engine, &tap(), &StreakState::new(), &mut events)
            .unwrap();
        assert_eq!(req.outcome, CoinSide::Heads);

        resolver.tick(&engine, SIM_DT, &mut events);
        assert_eq!(landed(&events), vec![CoinSide::Tails]);
    }

    #[test]
    fn test_safety_timeout_forces_landing() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        let engine = StuckEngine(CoinSide::Tails);
        resolver.try_toss(&engine, &tap(), &StreakState::new(), &mut events);

        run(&mut resolver, &engine, 3.9, &mut events);
        assert!(landed(&events).is_empty());

        run(&mut resolver, &engine, 0.2, &mut events);
        assert_eq!(landed(&events), vec![CoinSide::Tails]);
        assert!(resolver.phase().has_reported());

        // Still moving, but nothing reports twice
        run(&mut resolver, &engine, 1.0, &mut events);
        assert_eq!(landed(&events).len(), 1);
    }

    #[test]
    fn test_milestone_tension() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let streak = streak_of(CoinSide::Tails, 4);
        let mut events = Vec::new();
        resolver.try_toss(&ImmediateEngine, &tap(), &streak, &mut events);
        resolver.tick(&ImmediateEngine, SIM_DT, &mut events);

        assert_eq!(
            &events[1..],
            &[
                TossEvent::FloorContact,
                TossEvent::TensionStarted,
                TossEvent::TensionStopped,
                TossEvent::Landed(CoinSide::Tails),
            ]
        );
        assert_eq!(resolver.time_scale(), 1.0);
        assert!(!resolver.tension_active());
    }

    #[test]
    fn test_no_tension_off_milestone() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let streak = streak_of(CoinSide::Heads, 3);
        let mut events = Vec::new();
        resolver.try_toss(&ImmediateEngine, &tap(), &streak, &mut events);
        resolver.tick(&ImmediateEngine, SIM_DT, &mut events);
        assert!(!events.contains(&TossEvent::TensionStarted));
    }

    #[test]
    fn test_shutdown_cancels_pending_reset() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        resolver.try_toss(&ImmediateEngine, &tap(), &StreakState::new(), &mut events);
        resolver.tick(&ImmediateEngine, SIM_DT, &mut events);
        assert_eq!(resolver.pending_timers(), 1);

        resolver.shutdown(&mut events);
        assert_eq!(resolver.pending_timers(), 0);
        run(&mut resolver, &ImmediateEngine, 2.0, &mut events);
        assert!(!events.contains(&TossEvent::Reset));
    }

    #[test]
    fn test_shutdown_in_flight_cancels_safety_timer() {
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        let engine = StuckEngine(CoinSide::Heads);
        resolver.try_toss(&engine, &tap(), &StreakState::new(), &mut events);
        run(&mut resolver, &engine, 1.0, &mut events);
        assert!(matches!(resolver.phase(), TossPhase::InFlight(_)));

        resolver.shutdown(&mut events);
        assert_eq!(resolver.pending_timers(), 0);
        assert!(matches!(resolver.phase(), TossPhase::Idle));

        run(&mut resolver, &engine, SAFETY_TIMEOUT as f32 * 2.0, &mut events);
        assert!(landed(&events).is_empty());
        assert!(!events.contains(&TossEvent::Reset));
    }

    #[test]
    fn test_tap_in_arena_lands_decided_side() {
        let arena = CoinArena::default();
        for (word, seed_side) in [(WIN, CoinSide::Heads), (LOSE, CoinSide::Tails)] {
            let mut resolver = TossResolver::new(FixedRng(word));
            let mut events = Vec::new();
            let req = resolver
                .try_toss(&arena, &tap(), &StreakState::new(), &mut events)
                .unwrap();
            assert_eq!(req.outcome, seed_side);

            run(&mut resolver, &arena, SAFETY_TIMEOUT as f32 + 0.5, &mut events);
            assert_eq!(landed(&events), vec![req.outcome]);
        }
    }

    #[test]
    fn test_seeded_flicks_land_decided_side() {
        let arena = CoinArena::default();
        let flicks = [
            Gesture::new(0.0, -60.0, 120.0),
            Gesture::new(25.0, -140.0, 200.0),
            Gesture::new(-40.0, -300.0, 90.0),
        ];
        for (seed, gesture) in flicks.iter().enumerate() {
            let mut resolver = TossResolver::from_seed(seed as u64 + 7);
            let mut events = Vec::new();
            let req = resolver
                .try_toss(&arena, gesture, &StreakState::new(), &mut events)
                .unwrap();
            run(&mut resolver, &arena, SAFETY_TIMEOUT as f32 + 0.5, &mut events);
            assert_eq!(landed(&events), vec![req.outcome], "flick {gesture:?}");
        }
    }

    #[test]
    fn test_full_strength_flicks_settle_before_timeout() {
        let arena = CoinArena::default();
        let flicks = [
            Gesture::new(0.0, -400.0, 100.0),
            Gesture::new(60.0, -300.0, 150.0),
            Gesture::new(-80.0, -250.0, 120.0),
        ];
        for seed in 0..4u64 {
            for gesture in &flicks {
                let mut resolver = TossResolver::from_seed(seed);
                let mut events = Vec::new();
                let req = resolver
                    .try_toss(&arena, gesture, &StreakState::new(), &mut events)
                    .unwrap();
                assert_eq!(req.linvel.y, FLICK_MAX_VY);

                let mut landed_at = None;
                while resolver.now() < SAFETY_TIMEOUT + 0.5 {
                    let before = events.len();
                    resolver.tick(&arena, SIM_DT, &mut events);
                    if !landed(&events[before..]).is_empty() {
                        landed_at = Some(resolver.now());
                        break;
                    }
                }

                let landed_at = landed_at.expect("flick never landed");
                assert!(
                    landed_at < SAFETY_TIMEOUT - SIM_DT as f64,
                    "seed {seed} {gesture:?} only landed by timeout at {landed_at:.2}s"
                );
                assert!(resolver.body().is_still(SETTLE_VELOCITY_THRESHOLD));
                assert_eq!(landed(&events), vec![req.outcome]);
            }
        }
    }

    #[test]
    fn test_milestone_scenario_in_arena() {
        let arena = CoinArena::default();
        let mut streak = streak_of(CoinSide::Tails, 4);
        let mut resolver = TossResolver::new(FixedRng(WIN));
        let mut events = Vec::new();
        let req = resolver.try_toss(&arena, &tap(), &streak, &mut events).unwrap();
        assert_eq!(req.outcome, CoinSide::Tails);

        let mut saw_slow_motion = false;
        for _ in 0..((SAFETY_TIMEOUT as f32 + 0.5) / SIM_DT) as usize {
            let before = events.len();
            resolver.tick(&arena, SIM_DT, &mut events);
            if events[before..].contains(&TossEvent::TensionStarted) && resolver.tension_active() {
                assert_eq!(resolver.time_scale(), SLOW_MOTION_SCALE);
                saw_slow_motion = true;
            }
            if let Some(side) = landed(&events[before..]).first() {
                assert_eq!(*side, CoinSide::Tails);
                break;
            }
        }
        assert!(saw_slow_motion);
        assert_eq!(resolver.time_scale(), 1.0);

        let first_contact = events.iter().position(|e| *e == TossEvent::FloorContact);
        let tension = events.iter().position(|e| *e == TossEvent::TensionStarted);
        assert_eq!(tension, first_contact.map(|i| i + 1));

        assert_eq!(
            streak.apply(CoinSide::Tails),
            crate::sim::Verdict::Win { streak: 5 }
        );
    }

    #[test]
    fn test_reduced_motion_keeps_time_scale() {
        let arena = CoinArena::default();
        let streak = streak_of(CoinSide::Heads, 9);
        let mut resolver = TossResolver::new(FixedRng(WIN));
        resolver.set_reduced_motion(true);
        let mut events = Vec::new();
        resolver.try_toss(&arena, &tap(), &streak, &mut events);
        for _ in 0..((SAFETY_TIMEOUT as f32 + 0.5) / SIM_DT) as usize {
            resolver.tick(&arena, SIM_DT, &mut events);
            assert_eq!(resolver.time_scale(), 1.0);
        }
        assert!(events.contains(&TossEvent::TensionStarted));
    }
}

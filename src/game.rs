//! Game loop
//!
//! `CoinGame` owns the resolver, the physics world, the streak and the player
//! profile. Frames are fed in as wall-clock deltas and consumed in fixed
//! `SIM_DT` substeps; resolver events fan out to audio and scoring.

use glam::Vec2;
use rand::RngCore;
use rand_pcg::Pcg32;

use crate::audio::{AudioBackend, AudioSession, Cue};
use crate::consts::*;
use crate::leaderboard::ScoreSubmission;
use crate::odds::{StreakOdds, streak_odds};
use crate::profile::PlayerProfile;
use crate::settings::Language;
use crate::sim::{
    CoinArena, CoinSide, PhysicsEngine, PointerTracker, RigidBody, StreakState, TossEvent,
    TossPhase, TossRequest, TossResolver, Verdict,
};

/// What the shell (HUD, network) needs to hear about
#[derive(Debug, Clone, PartialEq)]
pub enum GameNotice {
    Launched(TossRequest),
    Landed { side: CoinSide, verdict: Verdict },
    /// Send this to the leaderboard
    Submit(ScoreSubmission),
    /// Coin is back and a new toss may start
    Ready,
}

pub struct CoinGame<R = Pcg32, E = CoinArena> {
    resolver: TossResolver<R>,
    engine: E,
    streak: StreakState,
    profile: PlayerProfile,
    pointer: PointerTracker,
    accumulator: f32,
    events: Vec<TossEvent>,
}

impl CoinGame<Pcg32, CoinArena> {
    pub fn new(seed: u64, profile: PlayerProfile) -> Self {
        Self::with_parts(TossResolver::from_seed(seed), CoinArena::default(), profile)
    }
}

impl<R: RngCore, E: PhysicsEngine> CoinGame<R, E> {
    pub fn with_parts(resolver: TossResolver<R>, engine: E, profile: PlayerProfile) -> Self {
        Self {
            resolver,
            engine,
            streak: StreakState::new(),
            profile,
            pointer: PointerTracker::new(),
            accumulator: 0.0,
            events: Vec::new(),
        }
    }

    pub fn streak(&self) -> &StreakState {
        &self.streak
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut PlayerProfile {
        &mut self.profile
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The coin, for rendering
    pub fn coin(&self) -> &RigidBody {
        self.resolver.body()
    }

    pub fn phase(&self) -> &TossPhase {
        self.resolver.phase()
    }

    pub fn time_scale(&self) -> f32 {
        self.resolver.time_scale()
    }

    /// Seconds of simulated (unscaled) time
    pub fn clock(&self) -> f64 {
        self.resolver.now()
    }

    pub fn odds(&self, lang: Language) -> Option<StreakOdds> {
        streak_odds(self.streak.streak(), lang)
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.resolver.set_reduced_motion(reduced);
    }

    pub fn pointer_down(&mut self, pos: Vec2, time_ms: f64) {
        if self.resolver.phase().is_flipping() {
            return;
        }
        self.pointer.press(pos, time_ms);
    }

    /// Finish a gesture; returns the launch if it started a toss
    pub fn pointer_up(&mut self, pos: Vec2, time_ms: f64) -> Option<TossRequest> {
        let gesture = self.pointer.release(pos, time_ms)?;
        self.resolver
            .try_toss(&self.engine, &gesture, &self.streak, &mut self.events)
    }

    pub fn pointer_cancel(&mut self) {
        self.pointer.cancel();
    }

    /// Advance by one frame
    pub fn update<B: AudioBackend>(
        &mut self,
        dt: f32,
        audio: &mut AudioSession<B>,
    ) -> Vec<GameNotice> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.resolver.tick(&self.engine, SIM_DT, &mut self.events);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop time we could not simulate rather than carry it forward
        self.accumulator = self.accumulator.min(SIM_DT);

        self.drain(audio)
    }

    /// Cancel pending work and release audio
    pub fn shutdown<B: AudioBackend>(&mut self, audio: &mut AudioSession<B>) -> Vec<GameNotice> {
        self.resolver.shutdown(&mut self.events);
        self.pointer.cancel();
        let notices = self.drain(audio);
        audio.dispose();
        notices
    }

    fn drain<B: AudioBackend>(&mut self, audio: &mut AudioSession<B>) -> Vec<GameNotice> {
        let mut notices = Vec::new();
        for event in std::mem::take(&mut self.events) {
            match event {
                TossEvent::Launched(request) => {
                    audio.play(Cue::Launch);
                    notices.push(GameNotice::Launched(request));
                }
                TossEvent::FloorContact => audio.play(Cue::Clink),
                TossEvent::TensionStarted => audio.play(Cue::TensionStart),
                TossEvent::TensionStopped => audio.play(Cue::TensionStop),
                TossEvent::Landed(side) => {
                    let verdict = self.streak.apply(side);
                    log::info!("Landed {} -> {verdict:?}", side.as_str());
                    notices.push(GameNotice::Landed { side, verdict });
                    match verdict {
                        Verdict::Win { .. } => audio.play(Cue::Win),
                        Verdict::Loss { prior } => {
                            audio.play(Cue::Loss);
                            if let Some(submission) = self.profile.record_loss(prior) {
                                notices.push(GameNotice::Submit(submission));
                            }
                        }
                    }
                }
                TossEvent::Reset => notices.push(GameNotice::Ready),
            }
        }
        notices
    }
}

//! Game audio
//!
//! `AudioSession` owns the audio device for the lifetime of the page and is
//! handed by `&mut` to whoever plays sounds. The actual synthesis sits behind
//! `AudioBackend`; the browser build uses Web Audio (see `web`).

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

/// Sound cues the game asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Coin leaves the hand
    Launch,
    /// Coin strikes the table
    Clink,
    Win,
    Loss,
    /// Milestone heartbeat on
    TensionStart,
    /// Milestone heartbeat off
    TensionStop,
}

/// Character of a metallic strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timbre {
    Plain,
    /// Filter sweeps upward (win chime)
    Bright,
    /// Square fundamental, louder
    Heavy,
}

impl Timbre {
    /// Peak gain before the master volume is applied
    pub fn peak(self) -> f32 {
        match self {
            Timbre::Plain => 0.4,
            Timbre::Bright => 0.3,
            Timbre::Heavy => 0.5,
        }
    }
}

/// One metallic strike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub base_freq: f32,
    /// Seconds until the envelope has decayed
    pub duration: f32,
    pub timbre: Timbre,
    /// Seconds from now
    pub delay: f32,
}

impl Tone {
    pub const fn new(base_freq: f32, duration: f32, timbre: Timbre) -> Self {
        Self {
            base_freq,
            duration,
            timbre,
            delay: 0.0,
        }
    }

    pub const fn after(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

impl Cue {
    /// Strikes that make up this cue (empty for the heartbeat cues)
    pub fn tones(self) -> Vec<Tone> {
        match self {
            Cue::Launch => vec![Tone::new(1400.0, 0.5, Timbre::Plain)],
            Cue::Clink => vec![Tone::new(1200.0, 0.2, Timbre::Heavy)],
            Cue::Win => vec![
                Tone::new(880.0, 1.5, Timbre::Bright),
                Tone::new(1108.73, 1.5, Timbre::Bright).after(0.05),
            ],
            Cue::Loss => vec![
                Tone::new(200.0, 0.4, Timbre::Plain),
                Tone::new(150.0, 0.4, Timbre::Plain).after(0.1),
            ],
            Cue::TensionStart | Cue::TensionStop => Vec::new(),
        }
    }
}

/// Synthesis seam
///
/// Volumes passed in already include the master volume.
pub trait AudioBackend {
    /// Resume a device suspended by autoplay policy
    fn resume(&mut self);
    fn play_tone(&mut self, tone: Tone, gain: f32);
    fn start_heartbeat(&mut self, gain: f32);
    fn stop_heartbeat(&mut self);
    /// Start (or keep) the looping music at `gain`
    fn start_music(&mut self, gain: f32);
    fn set_music_gain(&mut self, gain: f32);
    /// Release the device; no calls follow
    fn close(&mut self);
}

/// Backend that swallows everything (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn resume(&mut self) {}
    fn play_tone(&mut self, _tone: Tone, _gain: f32) {}
    fn start_heartbeat(&mut self, _gain: f32) {}
    fn stop_heartbeat(&mut self) {}
    fn start_music(&mut self, _gain: f32) {}
    fn set_music_gain(&mut self, _gain: f32) {}
    fn close(&mut self) {}
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    /// No device yet (browsers want a user gesture first)
    Uninitialized,
    Active,
    Disposed,
}

/// Background music level relative to master volume
const MUSIC_LEVEL: f32 = 0.04;

/// Audio device plus volume, explicitly owned
pub struct AudioSession<B> {
    backend: Option<B>,
    state: AudioState,
    master_volume: f32,
    heartbeat: bool,
}

impl<B: AudioBackend> AudioSession<B> {
    pub fn new(master_volume: f32) -> Self {
        Self {
            backend: None,
            state: AudioState::Uninitialized,
            master_volume: master_volume.clamp(0.0, 1.0),
            heartbeat: false,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Open the device on first use
    ///
    /// `open` is only called while uninitialized; a failed open leaves the
    /// session uninitialized so a later gesture can retry.
    pub fn ensure_active(&mut self, open: impl FnOnce() -> Option<B>) {
        match self.state {
            AudioState::Active => {
                if let Some(backend) = self.backend.as_mut() {
                    backend.resume();
                }
            }
            AudioState::Uninitialized => match open() {
                Some(mut backend) => {
                    backend.resume();
                    if self.master_volume > 0.0 {
                        backend.start_music(self.music_gain());
                    }
                    self.backend = Some(backend);
                    self.state = AudioState::Active;
                    log::info!("Audio session active");
                }
                None => log::warn!("Audio device unavailable - audio disabled"),
            },
            AudioState::Disposed => {}
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
        let gain = self.music_gain();
        let muted = self.master_volume <= 0.0;
        if let Some(backend) = self.backend.as_mut() {
            if muted {
                backend.set_music_gain(0.0);
            } else {
                backend.start_music(gain);
                backend.set_music_gain(gain);
            }
        }
    }

    pub fn play(&mut self, cue: Cue) {
        let volume = self.master_volume;
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        match cue {
            Cue::TensionStart => {
                if volume <= 0.0 {
                    return;
                }
                if self.heartbeat {
                    backend.stop_heartbeat();
                }
                backend.start_heartbeat(volume);
                self.heartbeat = true;
            }
            Cue::TensionStop => {
                if self.heartbeat {
                    backend.stop_heartbeat();
                    self.heartbeat = false;
                }
            }
            _ => {
                if volume <= 0.0 {
                    return;
                }
                for tone in cue.tones() {
                    backend.play_tone(tone, tone.timbre.peak() * volume);
                }
            }
        }
    }

    /// Release the device. Terminal: later cues and opens are ignored.
    pub fn dispose(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            if self.heartbeat {
                backend.stop_heartbeat();
            }
            backend.close();
        }
        self.heartbeat = false;
        self.state = AudioState::Disposed;
    }

    fn music_gain(&self) -> f32 {
        MUSIC_LEVEL * self.master_volume
    }
}

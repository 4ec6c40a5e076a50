//! Web Audio backend
//!
//! Procedurally generated strikes and heartbeat; the only asset is the
//! looping background track.

use web_sys::{
    AudioContext, AudioContextState, BiquadFilterNode, BiquadFilterType, GainNode,
    HtmlAudioElement, OscillatorNode, OscillatorType,
};

use super::{AudioBackend, Timbre, Tone};

/// Background track served next to the wasm bundle
const MUSIC_URL: &str = "/bgm2.mp3";
/// Partial ratios of the three-oscillator strike
const PARTIALS: [f32; 3] = [1.0, 2.76, 5.4];
/// Everything is voiced a fifth above the requested pitch
const PITCH_LIFT: f32 = 1.5;

pub struct WebAudioBackend {
    ctx: AudioContext,
    music: Option<(HtmlAudioElement, GainNode)>,
    heartbeat: Option<(OscillatorNode, GainNode)>,
}

impl WebAudioBackend {
    /// Open an audio context (may fail outside a secure context)
    pub fn open() -> Option<Self> {
        match AudioContext::new() {
            Ok(ctx) => Some(Self {
                ctx,
                music: None,
                heartbeat: None,
            }),
            Err(err) => {
                log::warn!("Failed to create AudioContext: {err:?}");
                None
            }
        }
    }

    fn create_osc(
        &self,
        freq: f32,
        osc_type: OscillatorType,
        t: f64,
    ) -> Option<OscillatorNode> {
        let osc = self.ctx.create_oscillator().ok()?;
        osc.set_type(osc_type);
        osc.frequency().set_value_at_time(freq, t).ok()?;
        Some(osc)
    }

    fn create_filter(&self, kind: BiquadFilterType, freq: f32, t: f64) -> Option<BiquadFilterNode> {
        let filter = self.ctx.create_biquad_filter().ok()?;
        filter.set_type(kind);
        filter.frequency().set_value_at_time(freq, t).ok()?;
        Some(filter)
    }

    fn strike(&self, tone: Tone, peak: f32) -> Option<()> {
        let t = self.ctx.current_time() + tone.delay as f64;
        let end = t + tone.duration as f64;
        let base = tone.base_freq * PITCH_LIFT;

        let gain = self.ctx.create_gain().ok()?;
        gain.gain().set_value_at_time(0.0, t).ok()?;
        gain.gain().linear_ramp_to_value_at_time(peak, t + 0.01).ok()?;
        gain.gain().exponential_ramp_to_value_at_time(0.001, end).ok()?;

        let filter = self.create_filter(BiquadFilterType::Bandpass, base * 2.0, t)?;
        let sweep_to = match tone.timbre {
            Timbre::Bright => base * 4.0,
            _ => base * 0.5,
        };
        filter.frequency().linear_ramp_to_value_at_time(sweep_to, t + 0.5).ok()?;
        filter.q().set_value(8.0);

        gain.connect_with_audio_node(&filter).ok()?;
        filter.connect_with_audio_node(&self.ctx.destination()).ok()?;

        let fundamental = match tone.timbre {
            Timbre::Heavy => OscillatorType::Square,
            _ => OscillatorType::Sine,
        };
        let shapes = [fundamental, OscillatorType::Sine, OscillatorType::Triangle];
        for (ratio, shape) in PARTIALS.into_iter().zip(shapes) {
            let osc = self.create_osc(base * ratio, shape, t)?;
            osc.connect_with_audio_node(&gain).ok()?;
            osc.start_with_when(t).ok()?;
            osc.stop_with_when(end).ok()?;
        }
        Some(())
    }

    fn heartbeat_voice(&self, volume: f32) -> Option<(OscillatorNode, GainNode)> {
        let t = self.ctx.current_time();
        let osc = self.create_osc(40.0, OscillatorType::Sine, t)?;
        let gain = self.ctx.create_gain().ok()?;

        // Two thumps, then a low rumble until stopped
        let g = gain.gain();
        g.set_value_at_time(0.0, t).ok()?;
        g.linear_ramp_to_value_at_time(0.8 * volume, t + 0.1).ok()?;
        g.exponential_ramp_to_value_at_time(0.1 * volume, t + 0.3).ok()?;
        g.linear_ramp_to_value_at_time(0.6 * volume, t + 0.4).ok()?;
        g.exponential_ramp_to_value_at_time(0.01 * volume, t + 0.8).ok()?;

        let filter = self.create_filter(BiquadFilterType::Lowpass, 150.0, t)?;
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&filter).ok()?;
        filter.connect_with_audio_node(&self.ctx.destination()).ok()?;
        osc.start_with_when(t).ok()?;
        Some((osc, gain))
    }

    fn music_voice(&self) -> Option<(HtmlAudioElement, GainNode)> {
        let element = HtmlAudioElement::new_with_src(MUSIC_URL).ok()?;
        element.set_loop(true);
        element.set_cross_origin(Some("anonymous"));
        let source = self.ctx.create_media_element_source(&element).ok()?;
        let gain = self.ctx.create_gain().ok()?;
        gain.gain().set_value_at_time(0.0, self.ctx.current_time()).ok()?;
        source.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&self.ctx.destination()).ok()?;
        Some((element, gain))
    }
}

impl AudioBackend for WebAudioBackend {
    fn resume(&mut self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    fn play_tone(&mut self, tone: Tone, gain: f32) {
        if self.strike(tone, gain).is_none() {
            log::debug!("Dropped tone at {} Hz", tone.base_freq);
        }
    }

    fn start_heartbeat(&mut self, gain: f32) {
        self.stop_heartbeat();
        self.heartbeat = self.heartbeat_voice(gain);
    }

    fn stop_heartbeat(&mut self) {
        if let Some((osc, gain)) = self.heartbeat.take() {
            let t = self.ctx.current_time();
            gain.gain().cancel_scheduled_values(t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.5).ok();
            osc.stop_with_when(t + 0.6).ok();
        }
    }

    fn start_music(&mut self, gain: f32) {
        if self.music.is_none() {
            self.music = self.music_voice();
            if self.music.is_none() {
                log::warn!("Background music unavailable");
                return;
            }
        }
        let Some((element, node)) = &self.music else {
            return;
        };
        if element.paused() {
            let t = self.ctx.current_time();
            node.gain().set_value_at_time(0.0, t).ok();
            // 3 s fade in
            node.gain().linear_ramp_to_value_at_time(gain, t + 3.0).ok();
            if let Err(err) = element.play() {
                log::warn!("Background music blocked: {err:?}");
            }
        }
    }

    fn set_music_gain(&mut self, gain: f32) {
        if let Some((_, node)) = &self.music {
            let t = self.ctx.current_time();
            node.gain().linear_ramp_to_value_at_time(gain, t + 0.1).ok();
        }
    }

    fn close(&mut self) {
        self.stop_heartbeat();
        if let Some((element, _)) = self.music.take() {
            element.pause().ok();
        }
        let _ = self.ctx.close();
    }
}

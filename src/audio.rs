//! Audio collaborator
//!
//! Bells map onto a C-major scale. On the web, cues are voiced with
//! procedurally generated Web Audio tones, no sample files needed.

use crate::sim::BellIndex;

/// C-major scale from C5 to C6, in Hz
pub const SCALE_HZ: [f32; 8] = [
    523.25, 587.33, 659.25, 698.46, 783.99, 880.0, 987.77, 1046.50,
];

/// Scale degree played by each bell class
pub const BELL_NOTES: [usize; 4] = [7, 0, 2, 3];

/// Output channels shared round-robin by all sounds
pub const VOICE_COUNT: usize = 6;

/// Frequency of the note a bell rings, if the bell exists
pub fn bell_frequency(bell: BellIndex) -> Option<f32> {
    let note = *BELL_NOTES.get(usize::from(bell))?;
    SCALE_HZ.get(note).copied()
}

/// Sounds the collaborator can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// A bell was struck
    Bell(BellIndex),
    /// Metronome tick on a full beat
    Click,
    /// Miss, wrong bell or lost pulse
    Boing,
    /// Run finished
    Complete,
}

impl Sound {
    /// Base pitch of the sound
    pub fn frequency(self) -> f32 {
        match self {
            Sound::Bell(bell) => bell_frequency(bell).unwrap_or(SCALE_HZ[0]),
            Sound::Click => 1800.0,
            Sound::Boing => 220.0,
            Sound::Complete => SCALE_HZ[7],
        }
    }

    /// Envelope length in seconds
    pub fn duration(self) -> f64 {
        match self {
            Sound::Bell(_) => 0.6,
            Sound::Click => 0.03,
            Sound::Boing => 0.3,
            Sound::Complete => 0.5,
        }
    }
}

/// Fixed-size set of voices handed out in rotation
///
/// When every voice is busy the oldest one is reused, which cuts its sound.
#[derive(Debug, Clone)]
pub struct VoicePool<T> {
    voices: Vec<T>,
    next: usize,
}

impl<T> VoicePool<T> {
    pub fn new(voices: Vec<T>) -> Self {
        Self { voices, next: 0 }
    }

    /// Build `count` voices, skipping any the factory fails to create
    pub fn from_fn(count: usize, mut make: impl FnMut(usize) -> Option<T>) -> Self {
        Self::new((0..count).filter_map(&mut make).collect())
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Take the next voice in rotation
    pub fn next_voice(&mut self) -> Option<&mut T> {
        if self.voices.is_empty() {
            return None;
        }
        let index = self.next;
        self.next = (index + 1) % self.voices.len();
        self.voices.get_mut(index)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Sound, VOICE_COUNT, VoicePool};
    use crate::settings::Settings;
    use crate::sim::{BellIndex, CueSink};

    /// Plays cues through the Web Audio API
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        channels: VoicePool<GainNode>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            let channels = match &ctx {
                Some(ctx) => VoicePool::from_fn(VOICE_COUNT, |_| {
                    let gain = ctx.create_gain().ok()?;
                    gain.connect_with_audio_node(&ctx.destination()).ok()?;
                    Some(gain)
                }),
                None => VoicePool::new(Vec::new()),
            };
            Self {
                ctx,
                channels,
                volume: settings.effective_volume(),
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play(&mut self, sound: Sound) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.ctx.clone() else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let osc_type = match sound {
                Sound::Bell(_) | Sound::Complete => OscillatorType::Sine,
                Sound::Click => OscillatorType::Square,
                Sound::Boing => OscillatorType::Triangle,
            };
            let Some((osc, gain)) = self.create_osc(&ctx, sound.frequency(), osc_type) else {
                return;
            };
            let t = ctx.current_time();
            let end = t + sound.duration();

            // The channel may still carry a previous envelope
            gain.gain().cancel_scheduled_values(t).ok();
            let peak = match sound {
                Sound::Bell(_) => 0.5,
                Sound::Click => 0.15,
                Sound::Boing => 0.4,
                Sound::Complete => 0.35,
            };
            gain.gain().set_value_at_time(vol * peak, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();

            match sound {
                Sound::Boing => {
                    osc.frequency().set_value_at_time(220.0, t).ok();
                    osc.frequency().set_value_at_time(300.0, t + 0.05).ok();
                    osc.frequency().set_value_at_time(180.0, t + 0.1).ok();
                    osc.frequency()
                        .exponential_ramp_to_value_at_time(110.0, end)
                        .ok();
                }
                Sound::Complete => {
                    osc.frequency()
                        .set_value_at_time(super::SCALE_HZ[0], t)
                        .ok();
                    osc.frequency()
                        .set_value_at_time(super::SCALE_HZ[4], t + 0.12)
                        .ok();
                    osc.frequency()
                        .set_value_at_time(super::SCALE_HZ[7], t + 0.24)
                        .ok();
                }
                Sound::Bell(_) | Sound::Click => {}
            }

            osc.start().ok();
            osc.stop_with_when(end + 0.05).ok();
        }

        /// Create an oscillator routed into the next output channel
        fn create_osc(
            &mut self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let gain = self.channels.next_voice()?.clone();
            let osc = ctx.create_oscillator().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;

            Some((osc, gain))
        }
    }

    impl CueSink for AudioManager {
        fn on_bell_rung(&mut self, bell: BellIndex) {
            self.play(Sound::Bell(bell));
        }

        fn on_click_beat(&mut self) {
            self.play(Sound::Click);
        }

        fn on_boing(&mut self) {
            self.play(Sound::Boing);
        }

        fn on_run_completed(&mut self) {
            self.play(Sound::Complete);
        }
    }
}

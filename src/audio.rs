//! Sound cues for game events
//!
//! Procedurally generated sound effects - no external files needed.
//! The cue table is plain data so it can be checked anywhere; only
//! [`AudioManager`] touches Web Audio and it exists on wasm32 only.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Ball launched off the paddle
    Launch,
    /// Ball hits paddle
    PaddleHit,
    /// Ball hits wall
    WallHit,
    /// Block damaged but still standing
    BlockHit,
    /// Block destroyed
    BlockBreak,
    /// Laser volley
    LaserShot,
    /// Pickup caught or upgrade applied
    PowerUp,
    /// Last ball gone, life spent
    LifeLost,
    /// Grid cleared
    LevelClear,
    /// Game over
    GameOver,
    /// Game over with a leaderboard placement
    HighScore,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator blip: start frequency, optional glide target, and an
/// exponential fade from `gain` over `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub freq: f32,
    pub glide_to: Option<f32>,
    pub wave: Wave,
    pub gain: f32,
    /// Offset from the cue start (s)
    pub delay: f64,
    pub duration: f64,
}

impl ToneSpec {
    fn new(freq: f32, wave: Wave, gain: f32, duration: f64) -> Self {
        Self {
            freq,
            glide_to: None,
            wave,
            gain,
            delay: 0.0,
            duration,
        }
    }

    fn glide(mut self, to: f32) -> Self {
        self.glide_to = Some(to);
        self
    }

    fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Evenly spaced notes of one waveform
fn arpeggio(freqs: &[f32], wave: Wave, gain: f32, spacing: f64, duration: f64) -> Vec<ToneSpec> {
    freqs
        .iter()
        .enumerate()
        .map(|(i, &f)| ToneSpec::new(f, wave, gain, duration).after(i as f64 * spacing))
        .collect()
}

impl SoundEffect {
    /// Cue for a single event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<SoundEffect> {
        match event {
            GameEvent::Launch => Some(SoundEffect::Launch),
            GameEvent::PaddleHit => Some(SoundEffect::PaddleHit),
            GameEvent::WallHit => Some(SoundEffect::WallHit),
            GameEvent::BlockHit { .. } => Some(SoundEffect::BlockHit),
            GameEvent::BlockDestroyed { .. } => Some(SoundEffect::BlockBreak),
            GameEvent::LaserFired => Some(SoundEffect::LaserShot),
            GameEvent::ItemCollected { .. } | GameEvent::UpgradeApplied { .. } => {
                Some(SoundEffect::PowerUp)
            }
            GameEvent::LifeLost { .. } => Some(SoundEffect::LifeLost),
            GameEvent::LevelCleared { .. } => Some(SoundEffect::LevelClear),
            GameEvent::GameOver { rank: Some(_), .. } => Some(SoundEffect::HighScore),
            GameEvent::GameOver { rank: None, .. } => Some(SoundEffect::GameOver),
            GameEvent::ItemSpawned { .. } | GameEvent::BallLost => None,
        }
    }

    /// Cues for one frame's events, each played at most once
    pub fn cues(events: &[GameEvent]) -> Vec<SoundEffect> {
        let mut cues: Vec<SoundEffect> = Vec::new();
        for cue in events.iter().filter_map(Self::from_event) {
            if !cues.contains(&cue) {
                cues.push(cue);
            }
        }
        cues
    }

    /// Oscillators that make up this cue
    pub fn tones(&self) -> Vec<ToneSpec> {
        match self {
            SoundEffect::Launch | SoundEffect::LaserShot => {
                vec![ToneSpec::new(800.0, Wave::Square, 0.1, 0.1).glide(200.0)]
            }
            SoundEffect::PaddleHit => vec![ToneSpec::new(440.0, Wave::Triangle, 0.1, 0.1)],
            SoundEffect::WallHit => vec![ToneSpec::new(400.0, Wave::Sine, 0.08, 0.08)],
            SoundEffect::BlockHit => vec![ToneSpec::new(300.0, Wave::Triangle, 0.08, 0.05)],
            SoundEffect::BlockBreak => {
                vec![ToneSpec::new(100.0, Wave::Sawtooth, 0.2, 0.3).glide(0.01)]
            }
            SoundEffect::PowerUp => vec![
                ToneSpec::new(600.0, Wave::Sine, 0.1, 0.1),
                ToneSpec::new(800.0, Wave::Sine, 0.1, 0.1).after(0.1),
                ToneSpec::new(1200.0, Wave::Sine, 0.1, 0.2).after(0.2),
            ],
            SoundEffect::LifeLost => {
                vec![ToneSpec::new(300.0, Wave::Sine, 0.15, 0.4).glide(60.0)]
            }
            SoundEffect::LevelClear => {
                arpeggio(&[400.0, 500.0, 600.0, 800.0], Wave::Triangle, 0.12, 0.1, 0.4)
            }
            SoundEffect::GameOver => arpeggio(&[400.0, 350.0, 300.0, 200.0], Wave::Sine, 0.12, 0.2, 0.3),
            SoundEffect::HighScore => arpeggio(
                &[500.0, 600.0, 700.0, 800.0, 1000.0],
                Wave::Triangle,
                0.1,
                0.08,
                0.25,
            ),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, ToneSpec, Wave};
    use crate::settings::Settings;
    use crate::sim::GameEvent;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self {
                ctx: Self::create_context(),
                volume: Settings::default().effective_volume(),
            }
        }

        fn create_context() -> Option<AudioContext> {
            // May fail outside a secure context or before a user gesture
            match AudioContext::new() {
                Ok(ctx) => Some(ctx),
                Err(e) => {
                    log::warn!("Failed to create AudioContext ({:?}) - audio disabled for now", e);
                    None
                }
            }
        }

        /// Resume audio context (call from a user gesture). Retries
        /// context creation if the first attempt failed.
        pub fn resume(&mut self) {
            if self.ctx.is_none() {
                self.ctx = Self::create_context();
            }
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Gain for every following cue, 0 silences
        pub fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        /// Play every cue for one frame's events
        pub fn play_events(&self, events: &[GameEvent]) {
            for cue in SoundEffect::cues(events) {
                self.play(cue);
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in effect.tones() {
                self.play_tone(ctx, &tone, vol);
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &ToneSpec, vol: f32) {
            let osc_type = match tone.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
                Wave::Triangle => OscillatorType::Triangle,
            };
            let Some((osc, gain)) = self.create_osc(ctx, tone.freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + tone.delay;
            let end = t + tone.duration;

            gain.gain().set_value_at_time(tone.gain * vol, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
            if let Some(to) = tone.glide_to {
                osc.frequency().set_value_at_time(tone.freq, t).ok();
                osc.frequency().exponential_ramp_to_value_at_time(to, end).ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(end).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{PickupEffect, UpgradeKind};

    #[test]
    fn test_event_mapping() {
        assert_eq!(SoundEffect::from_event(&GameEvent::PaddleHit), Some(SoundEffect::PaddleHit));
        assert_eq!(SoundEffect::from_event(&GameEvent::BallLost), None);
        assert_eq!(
            SoundEffect::from_event(&GameEvent::GameOver { score: 5, rank: None }),
            Some(SoundEffect::GameOver)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::GameOver {
                score: 500,
                rank: Some(1)
            }),
            Some(SoundEffect::HighScore)
        );
    }

    #[test]
    fn test_cues_play_once_per_frame() {
        let events = vec![
            GameEvent::WallHit,
            GameEvent::WallHit,
            GameEvent::ItemCollected {
                effect: PickupEffect::Laser,
            },
            GameEvent::UpgradeApplied {
                kind: UpgradeKind::Laser,
            },
            GameEvent::BallLost,
        ];
        assert_eq!(
            SoundEffect::cues(&events),
            vec![SoundEffect::WallHit, SoundEffect::PowerUp]
        );
    }

    #[test]
    fn test_paddle_tone_and_powerup_arpeggio() {
        let paddle = SoundEffect::PaddleHit.tones();
        assert_eq!(paddle.len(), 1);
        assert_eq!(paddle[0].freq, 440.0);
        assert_eq!(paddle[0].wave, Wave::Triangle);

        let freqs: Vec<f32> = SoundEffect::PowerUp.tones().iter().map(|t| t.freq).collect();
        assert_eq!(freqs, vec![600.0, 800.0, 1200.0]);
    }

    #[test]
    fn test_every_tone_is_playable() {
        let all = [
            SoundEffect::Launch,
            SoundEffect::PaddleHit,
            SoundEffect::WallHit,
            SoundEffect::BlockHit,
            SoundEffect::BlockBreak,
            SoundEffect::LaserShot,
            SoundEffect::PowerUp,
            SoundEffect::LifeLost,
            SoundEffect::LevelClear,
            SoundEffect::GameOver,
            SoundEffect::HighScore,
        ];
        for cue in all {
            for tone in cue.tones() {
                // Exponential ramps need strictly positive targets
                assert!(tone.freq > 0.0 && tone.glide_to.unwrap_or(1.0) > 0.0);
                assert!(tone.gain > 0.0 && tone.duration > 0.0 && tone.delay >= 0.0);
            }
        }
    }
}

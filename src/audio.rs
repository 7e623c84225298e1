//! Audio collaborator
//!
//! The engine reports outcomes through [`AudioSink`] and never looks at a return
//! value. In the browser, [`AudioManager`] synthesises every cue with the Web
//! Audio API, so no sound files are needed.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::sim::{ComboTier, SpecialKind};

/// Fire-and-forget outcome notifications. Implementations must not panic and
/// must swallow their own failures.
pub trait AudioSink {
    /// A regular shape was caught
    fn on_success(&mut self);
    fn on_miss(&mut self);
    fn on_combo_tier_reached(&mut self, tier: &ComboTier);
    fn on_bomb_hit(&mut self);
    fn on_special_caught(&mut self, kind: SpecialKind);
    fn on_level_complete(&mut self, level: u32);
    fn on_game_over(&mut self) {}
}

/// Lets the host keep a handle on a sink the engine also owns
impl<A: AudioSink> AudioSink for Rc<RefCell<A>> {
    fn on_success(&mut self) {
        self.borrow_mut().on_success();
    }

    fn on_miss(&mut self) {
        self.borrow_mut().on_miss();
    }

    fn on_combo_tier_reached(&mut self, tier: &ComboTier) {
        self.borrow_mut().on_combo_tier_reached(tier);
    }

    fn on_bomb_hit(&mut self) {
        self.borrow_mut().on_bomb_hit();
    }

    fn on_special_caught(&mut self, kind: SpecialKind) {
        self.borrow_mut().on_special_caught(kind);
    }

    fn on_level_complete(&mut self, level: u32) {
        self.borrow_mut().on_level_complete(level);
    }

    fn on_game_over(&mut self) {
        self.borrow_mut().on_game_over();
    }
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn on_success(&mut self) {}
    fn on_miss(&mut self) {}
    fn on_combo_tier_reached(&mut self, _tier: &ComboTier) {}
    fn on_bomb_hit(&mut self) {}
    fn on_special_caught(&mut self, _kind: SpecialKind) {}
    fn on_level_complete(&mut self, _level: u32) {}
}

/// Writes cues to the log (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn on_success(&mut self) {
        log::trace!("sfx: catch");
    }

    fn on_miss(&mut self) {
        log::debug!("sfx: miss");
    }

    fn on_combo_tier_reached(&mut self, tier: &ComboTier) {
        log::debug!("sfx: combo {}", tier.name);
    }

    fn on_bomb_hit(&mut self) {
        log::debug!("sfx: bomb");
    }

    fn on_special_caught(&mut self, kind: SpecialKind) {
        log::debug!("sfx: special {}", kind.as_str());
    }

    fn on_level_complete(&mut self, level: u32) {
        log::debug!("sfx: level {} complete", level);
    }

    fn on_game_over(&mut self) {
        log::debug!("sfx: game over");
    }
}

/// Volume controls shared by every synthesised cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub master: f32,
    pub sfx: f32,
    pub muted: bool,
}

impl Default for Volume {
    fn default() -> Self {
        Self {
            master: 0.8,
            sfx: 1.0,
            muted: false,
        }
    }
}

impl Volume {
    pub fn set_master(&mut self, vol: f32) {
        self.master = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx(&mut self, vol: f32) {
        self.sfx = vol.clamp(0.0, 1.0);
    }

    /// Gain applied to cues (0 when muted)
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master * self.sfx
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Volume};
    use crate::sim::{ComboTier, SpecialKind};

    /// Web Audio synthesiser
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: Volume,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: Volume::default(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_volume(&mut self, volume: Volume) {
            self.volume = volume;
        }

        /// Context plus gain, or None when silent/unavailable
        fn ready(&self) -> Option<(&AudioContext, f32)> {
            let vol = self.volume.effective();
            if vol <= 0.0 {
                return None;
            }
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some((ctx, vol))
        }

        fn create_osc(
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

        /// One enveloped tone starting `delay` seconds from now
        fn tone(ctx: &AudioContext, freq: f32, osc_type: OscillatorType, gain: f32, delay: f64, length: f64) {
            let Some((osc, node)) = Self::create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;
            node.gain().set_value_at_time(gain, t).ok();
            node.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        /// Ascending or descending run of tones
        fn arpeggio(ctx: &AudioContext, freqs: &[f32], osc_type: OscillatorType, gain: f32, spacing: f64, length: f64) {
            for (i, freq) in freqs.iter().enumerate() {
                Self::tone(ctx, *freq, osc_type, gain, i as f64 * spacing, length);
            }
        }

        /// Pitch sweep from `from` to `to`
        fn sweep(ctx: &AudioContext, from: f32, to: f32, osc_type: OscillatorType, gain: f32, length: f64) {
            let Some((osc, node)) = Self::create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time();
            node.gain().set_value_at_time(gain, t).ok();
            node.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + length)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn on_success(&mut self) {
            if let Some((ctx, vol)) = self.ready() {
                Self::tone(ctx, 660.0, OscillatorType::Sine, vol * 0.3, 0.0, 0.12);
            }
        }

        fn on_miss(&mut self) {
            if let Some((ctx, vol)) = self.ready() {
                Self::sweep(ctx, 220.0, 110.0, OscillatorType::Square, vol * 0.2, 0.2);
            }
        }

        fn on_combo_tier_reached(&mut self, tier: &ComboTier) {
            if let Some((ctx, vol)) = self.ready() {
                // Higher tiers start higher
                let base = 400.0 + tier.threshold as f32 * 15.0;
                Self::arpeggio(
                    ctx,
                    &[base, base * 1.25, base * 1.5],
                    OscillatorType::Triangle,
                    vol * 0.25,
                    0.06,
                    0.15,
                );
            }
        }

        fn on_bomb_hit(&mut self) {
            if let Some((ctx, vol)) = self.ready() {
                Self::sweep(ctx, 180.0, 30.0, OscillatorType::Sawtooth, vol * 0.5, 0.5);
                Self::sweep(ctx, 90.0, 20.0, OscillatorType::Sine, vol * 0.6, 0.6);
            }
        }

        fn on_special_caught(&mut self, kind: SpecialKind) {
            let Some((ctx, vol)) = self.ready() else {
                return;
            };
            match kind {
                SpecialKind::Diamond => {
                    Self::arpeggio(ctx, &[1200.0, 1600.0], OscillatorType::Sine, vol * 0.25, 0.05, 0.2)
                }
                SpecialKind::Rainbow => Self::arpeggio(
                    ctx,
                    &[523.0, 659.0, 784.0, 1047.0],
                    OscillatorType::Triangle,
                    vol * 0.2,
                    0.05,
                    0.15,
                ),
                SpecialKind::GoldenStar => Self::arpeggio(
                    ctx,
                    &[800.0, 1000.0, 1200.0, 1600.0],
                    OscillatorType::Sine,
                    vol * 0.3,
                    0.07,
                    0.25,
                ),
                SpecialKind::TimeBonus => {
                    Self::sweep(ctx, 400.0, 900.0, OscillatorType::Triangle, vol * 0.3, 0.25)
                }
                SpecialKind::Multiplier => {
                    Self::arpeggio(ctx, &[600.0, 800.0, 1000.0], OscillatorType::Sine, vol * 0.25, 0.08, 0.15)
                }
                SpecialKind::Bomb => self.on_bomb_hit(),
            }
        }

        fn on_level_complete(&mut self, _level: u32) {
            if let Some((ctx, vol)) = self.ready() {
                Self::arpeggio(ctx, &[400.0, 500.0, 600.0, 800.0], OscillatorType::Triangle, vol * 0.3, 0.1, 0.4);
            }
        }

        fn on_game_over(&mut self) {
            if let Some((ctx, vol)) = self.ready() {
                Self::arpeggio(ctx, &[400.0, 350.0, 300.0, 200.0], OscillatorType::Sine, vol * 0.3, 0.2, 0.3);
            }
        }
    }
}

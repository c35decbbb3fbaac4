//! Sound cues
//!
//! Procedurally generated sound effects, no external files needed. The
//! event-to-sound mapping and tone data are plain Rust; playback goes
//! through the Web Audio API on wasm.

use crate::sim::state::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player stepped onto a new tile
    Step,
    /// Item collected
    Pickup,
    /// Pickup refused
    InventoryFull,
    /// Quest objective finished
    QuestComplete,
    /// Exit used before the quests were done
    ExitLocked,
    /// Dialog box opened
    DialogOpen,
    /// Dialog message dismissed
    DialogAdvance,
    /// Area cleared
    AreaComplete,
    /// Final area cleared
    Fanfare,
    /// Something went wrong loading the next area
    Error,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// One oscillator voice with an exponential pitch and gain ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Wave,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Offset from the trigger time (s)
    pub delay: f64,
    /// Length of the ramp (s)
    pub duration: f64,
    /// Peak gain before volume scaling
    pub gain: f32,
}

const fn tone(wave: Wave, start_hz: f32, end_hz: f32, delay: f64, duration: f64, gain: f32) -> Tone {
    Tone {
        wave,
        start_hz,
        end_hz,
        delay,
        duration,
        gain,
    }
}

const STEP: [Tone; 1] = [tone(Wave::Sine, 220.0, 180.0, 0.0, 0.05, 0.15)];
const PICKUP: [Tone; 2] = [
    tone(Wave::Sine, 880.0, 880.0, 0.0, 0.08, 0.3),
    tone(Wave::Sine, 1320.0, 1320.0, 0.07, 0.12, 0.3),
];
const INVENTORY_FULL: [Tone; 1] = [tone(Wave::Square, 200.0, 140.0, 0.0, 0.2, 0.2)];
const QUEST_COMPLETE: [Tone; 3] = [
    tone(Wave::Triangle, 523.25, 523.25, 0.0, 0.12, 0.35),
    tone(Wave::Triangle, 659.25, 659.25, 0.1, 0.12, 0.35),
    tone(Wave::Triangle, 783.99, 783.99, 0.2, 0.25, 0.35),
];
const EXIT_LOCKED: [Tone; 2] = [
    tone(Wave::Square, 180.0, 180.0, 0.0, 0.1, 0.2),
    tone(Wave::Square, 150.0, 150.0, 0.12, 0.15, 0.2),
];
const DIALOG_OPEN: [Tone; 1] = [tone(Wave::Sine, 440.0, 660.0, 0.0, 0.1, 0.2)];
const DIALOG_ADVANCE: [Tone; 1] = [tone(Wave::Sine, 600.0, 600.0, 0.0, 0.04, 0.15)];
const AREA_COMPLETE: [Tone; 4] = [
    tone(Wave::Triangle, 392.0, 392.0, 0.0, 0.15, 0.4),
    tone(Wave::Triangle, 523.25, 523.25, 0.12, 0.15, 0.4),
    tone(Wave::Triangle, 659.25, 659.25, 0.24, 0.15, 0.4),
    tone(Wave::Triangle, 783.99, 783.99, 0.36, 0.4, 0.4),
];
const FANFARE: [Tone; 5] = [
    tone(Wave::Sawtooth, 523.25, 523.25, 0.0, 0.15, 0.25),
    tone(Wave::Sawtooth, 659.25, 659.25, 0.15, 0.15, 0.25),
    tone(Wave::Sawtooth, 783.99, 783.99, 0.3, 0.15, 0.25),
    tone(Wave::Sawtooth, 1046.5, 1046.5, 0.45, 0.5, 0.3),
    tone(Wave::Sine, 523.25, 523.25, 0.45, 0.5, 0.2),
];
const ERROR: [Tone; 1] = [tone(Wave::Sawtooth, 120.0, 60.0, 0.0, 0.4, 0.25)];

impl SoundEffect {
    /// Cue for a game event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Moved { .. } => Some(Self::Step),
            GameEvent::ItemPickedUp { .. } => Some(Self::Pickup),
            GameEvent::InventoryFull { .. } => Some(Self::InventoryFull),
            GameEvent::QuestCompleted { .. } => Some(Self::QuestComplete),
            GameEvent::ExitLocked { .. } => Some(Self::ExitLocked),
            GameEvent::DialogOpened { .. } => Some(Self::DialogOpen),
            GameEvent::DialogAdvanced { .. } | GameEvent::DialogClosed => Some(Self::DialogAdvance),
            GameEvent::AreaComplete { .. } => Some(Self::AreaComplete),
            GameEvent::GameFinished => Some(Self::Fanfare),
            GameEvent::MapLoadFailed { .. } => Some(Self::Error),
            GameEvent::MapLoaded { .. }
            | GameEvent::QuestProgress { .. }
            | GameEvent::Interacted { .. }
            | GameEvent::Paused
            | GameEvent::Resumed => None,
        }
    }

    pub fn tones(&self) -> &'static [Tone] {
        match self {
            Self::Step => &STEP,
            Self::Pickup => &PICKUP,
            Self::InventoryFull => &INVENTORY_FULL,
            Self::QuestComplete => &QUEST_COMPLETE,
            Self::ExitLocked => &EXIT_LOCKED,
            Self::DialogOpen => &DIALOG_OPEN,
            Self::DialogAdvance => &DIALOG_ADVANCE,
            Self::AreaComplete => &AREA_COMPLETE,
            Self::Fanfare => &FANFARE,
            Self::Error => &ERROR,
        }
    }
}

/// Cues for a batch of events, one per effect kind, in first-seen order
pub fn cues_for(events: &[GameEvent]) -> Vec<SoundEffect> {
    let mut cues: Vec<SoundEffect> = Vec::new();
    for effect in events.iter().filter_map(SoundEffect::for_event) {
        if !cues.contains(&effect) {
            cues.push(effect);
        }
    }
    cues
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, Tone, Wave};
    use crate::Settings;

    fn oscillator_type(wave: Wave) -> OscillatorType {
        match wave {
            Wave::Sine => OscillatorType::Sine,
            Wave::Triangle => OscillatorType::Triangle,
            Wave::Square => OscillatorType::Square,
            Wave::Sawtooth => OscillatorType::Sawtooth,
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Pick up volume or mute changes
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        pub fn set_muted(&mut self, muted: bool, settings: &Settings) {
            self.volume = if muted { 0.0 } else { settings.effective_volume() };
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let t = ctx.current_time();
            for tone in effect.tones() {
                self.play_tone(ctx, tone, t);
            }
        }

        fn create_osc(&self, ctx: &AudioContext, tone: &Tone) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(oscillator_type(tone.wave));
            osc.frequency().set_value(tone.start_hz);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &Tone, now: f64) {
            let Some((osc, gain)) = self.create_osc(ctx, tone) else {
                return;
            };
            let start = now + tone.delay;
            let end = start + tone.duration;

            gain.gain().set_value_at_time(0.0, now).ok();
            gain.gain()
                .set_value_at_time(tone.gain * self.volume, start)
                .ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
            if tone.end_hz != tone.start_hz {
                osc.frequency().set_value_at_time(tone.start_hz, start).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(tone.end_hz, end)
                    .ok();
            }

            osc.start_with_when(start).ok();
            osc.stop_with_when(end + 0.05).ok();
        }
    }
}

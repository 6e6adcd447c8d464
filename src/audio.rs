//! Audio cues
//!
//! `SoundEffect::for_event` picks the cue for a game event on every platform.
//! On wasm, `AudioManager` synthesizes the cues with Web Audio oscillators,
//! so no sound files are needed. Any audio failure is logged and the game
//! carries on silently.

use crate::sim::{Actor, GameEvent, Outcome, Ring, SlideOutcome};

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

#[cfg(target_arch = "wasm32")]
use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Mug pushed off
    SlideLaunch,
    /// Mug stopped inside a scoring ring
    RingHit,
    Bullseye,
    /// Mug went over the far edge
    Foul,
    /// Mug stopped outside the rings, or a click on an empty cell
    Miss,
    /// Player grabbed a beer
    BeerHit,
    /// Player grabbed a penalty beer
    PenaltyHit,
    /// Opponent grabbed a beer
    OpponentGrab,
    RoundEnd,
    GameWon,
    GameLost,
    /// New high score
    HighScore,
}

impl SoundEffect {
    /// Cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::SlideStarted { .. } => Some(SoundEffect::SlideLaunch),
            GameEvent::TurnResolved(result) => Some(match result.outcome {
                SlideOutcome::Foul => SoundEffect::Foul,
                SlideOutcome::Miss => SoundEffect::Miss,
                SlideOutcome::Ring(Ring::Bullseye) => SoundEffect::Bullseye,
                SlideOutcome::Ring(_) => SoundEffect::RingHit,
            }),
            GameEvent::BeerTaken {
                actor: Actor::Opponent,
                ..
            } => Some(SoundEffect::OpponentGrab),
            GameEvent::BeerTaken { points, .. } if *points < 0 => Some(SoundEffect::PenaltyHit),
            GameEvent::BeerTaken { .. } => Some(SoundEffect::BeerHit),
            GameEvent::Missed { .. } => Some(SoundEffect::Miss),
            GameEvent::RoundEnded { .. } => Some(SoundEffect::RoundEnd),
            GameEvent::MatchFinished { outcome, .. } => Some(match outcome {
                Outcome::PlayerWins => SoundEffect::GameWon,
                Outcome::OpponentWins => SoundEffect::GameLost,
                Outcome::Tie => SoundEffect::RoundEnd,
            }),
            GameEvent::HighscoreQualified { .. } => Some(SoundEffect::HighScore),
            _ => None,
        }
    }
}

/// Audio manager for the game
#[cfg(target_arch = "wasm32")]
pub struct AudioManager {
    ctx: Option<AudioContext>,
    settings: Settings,
    focused: bool,
    volume: f32,
}

#[cfg(target_arch = "wasm32")]
impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = match AudioContext::new() {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("Failed to create AudioContext - audio disabled: {:?}", e);
                None
            }
        };
        let settings = Settings::default();
        let volume = settings.effective_volume();
        Self {
            ctx,
            settings,
            focused: true,
            volume,
        }
    }

    /// Take volume and mute state from the settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        self.volume = self.settings.volume_when(self.focused);
    }

    /// Page gained or lost focus
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.volume = self.settings.volume_when(focused);
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            if let Err(e) = ctx.resume() {
                log::warn!("AudioContext resume rejected: {:?}", e);
            }
        }
    }

    /// Play the cue for an event, if any
    pub fn play_event(&self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        self.resume();

        match effect {
            SoundEffect::SlideLaunch => self.play_slide(ctx, vol),
            SoundEffect::RingHit => self.play_ring(ctx, vol),
            SoundEffect::Bullseye => self.play_bullseye(ctx, vol),
            SoundEffect::Foul => self.play_foul(ctx, vol),
            SoundEffect::Miss => self.play_miss(ctx, vol),
            SoundEffect::BeerHit => self.play_beer(ctx, vol),
            SoundEffect::PenaltyHit => self.play_penalty(ctx, vol),
            SoundEffect::OpponentGrab => self.play_opponent_grab(ctx, vol),
            SoundEffect::RoundEnd => self.play_sequence(ctx, vol, &[400.0, 500.0, 600.0], 0.1),
            SoundEffect::GameWon => {
                self.play_sequence(ctx, vol, &[400.0, 500.0, 600.0, 800.0], 0.1)
            }
            SoundEffect::GameLost => self.play_game_lost(ctx, vol),
            SoundEffect::HighScore => {
                self.play_sequence(ctx, vol, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08)
            }
        }
    }

    // === Sound generators ===

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

    /// Slide - low rumble fading out over the slide
    fn play_slide(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 90.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.35, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 1.8)
            .ok();
        osc.frequency().set_value_at_time(90.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(50.0, t + 1.8)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 2.0).ok();
    }

    /// Ring - glass clink
    fn play_ring(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.25)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    /// Bullseye - bright chime in harmonics
    fn play_bullseye(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [1200.0, 1800.0, 2400.0].iter().enumerate() {
            let delay = i as f64 * 0.03;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.45).ok();
            }
        }
    }

    /// Foul - mug crashes off the table
    fn play_foul(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.35)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.4).ok();
        }

        // Shatter on top
        if let Some((osc, gain)) = self.create_osc(ctx, 3000.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(3000.0, t).ok();
            osc.frequency().set_value_at_time(4500.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(2500.0, t + 0.06).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    /// Miss - dull thud
    fn play_miss(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(150.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(60.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Beer grabbed - happy ding
    fn play_beer(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [600.0, 800.0].iter().enumerate() {
            let delay = i as f64 * 0.06;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Penalty beer - buzzer
    fn play_penalty(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency().set_value_at_time(120.0, t).ok();
        osc.frequency().set_value_at_time(100.0, t + 0.1).ok();
        osc.frequency().set_value_at_time(80.0, t + 0.2).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.35).ok();
    }

    /// Opponent grab - short low blip
    fn play_opponent_grab(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.06)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.08).ok();
    }

    /// Rising note sequence (round end, win, high score)
    fn play_sequence(&self, ctx: &AudioContext, vol: f32, freqs: &[f32], step: f64) {
        for (i, freq) in freqs.iter().enumerate() {
            let delay = i as f64 * step;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.35).ok();
            }
        }
    }

    /// Game lost - sad descending
    fn play_game_lost(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let delay = i as f64 * 0.2;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}

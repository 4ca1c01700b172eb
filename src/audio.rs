/// Short procedural tones for game events.
///
/// Sinks are fire-and-forget: `play` cannot fail from the caller's point of
/// view, and a sink that cannot produce sound simply drops the tone.
use std::cell::RefCell;
use std::rc::Rc;

use crate::compute::{GameEvent, LifeLossCause};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Triangle,
    Sawtooth,
    Sine,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    pub waveform: Waveform,
}

const fn tone(frequency_hz: f32, duration_secs: f32, waveform: Waveform) -> Tone {
    Tone {
        frequency_hz,
        duration_secs,
        waveform,
    }
}

pub trait AudioSink {
    fn play(&mut self, tone: Tone);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _tone: Tone) {}
}

/// Keeps every tone it is given; clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    tones: Rc<RefCell<Vec<Tone>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.tones.borrow().clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, tone: Tone) {
        self.tones.borrow_mut().push(tone);
    }
}

/// The tone an event makes, if any.
pub fn tone_for(event: &GameEvent) -> Option<Tone> {
    let t = match event {
        GameEvent::Shot { .. } => tone(880.0, 0.05, Waveform::Square),
        GameEvent::EnemyHit { .. } => tone(440.0, 0.04, Waveform::Triangle),
        GameEvent::EnemyKilled { .. } => tone(660.0, 0.08, Waveform::Square),
        GameEvent::LifeLost {
            cause: LifeLossCause::Mud,
            ..
        } => tone(110.0, 0.3, Waveform::Sawtooth),
        GameEvent::LifeLost { .. } => tone(140.0, 0.3, Waveform::Sawtooth),
        GameEvent::PowerupCollected { .. } => tone(990.0, 0.15, Waveform::Sine),
        GameEvent::RowCleared { .. } => tone(520.0, 0.2, Waveform::Triangle),
        GameEvent::SpecialFired { .. } => tone(220.0, 0.5, Waveform::Sawtooth),
        GameEvent::WaveCleared { .. } => tone(784.0, 0.3, Waveform::Sine),
        GameEvent::GameOver { .. } => tone(98.0, 0.8, Waveform::Sawtooth),
        GameEvent::Victory { .. } => tone(1046.0, 0.8, Waveform::Sine),
        GameEvent::ComboBroken { .. }
        | GameEvent::MudDropped
        | GameEvent::WaveStarted { .. }
        | GameEvent::NewHighscore { .. } => return None,
    };
    Some(t)
}

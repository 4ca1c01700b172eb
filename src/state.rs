/// The game state machine.
///
/// `Game` owns the one live `GameSession` and decides which transitions are
/// legal: `Idle → WaveIntro → Playing ⇄ WaveIntro → GameOver | Victory`.
/// Only `Playing` accepts ticks. The pause before each wave is a delayed
/// transition tagged with the session epoch, so a restart during the pause
/// silently cancels it.
use rand::Rng;
use tracing::info;

use crate::audio::{self, AudioSink};
use crate::combo;
use crate::compute::{self, GameEvent};
use crate::config::Tuning;
use crate::entities::{GameSession, GameStatus, PERFECT_WAVE_BONUS, TOTAL_WAVES};
use crate::input::Intents;
use crate::persistence::Highscores;
use crate::snapshot::{summarize, FrameSnapshot, Overlay};
use crate::waves;

/// A scheduled `WaveIntro → Playing` transition.
#[derive(Clone, Copy, Debug)]
struct PendingIntro {
    remaining: f32,
    epoch: u64,
}

pub struct Game {
    session: GameSession,
    status: GameStatus,
    tuning: Tuning,
    epoch: u64,
    pending: Vec<PendingIntro>,
    /// Bonus text shown on the current wave-intro banner.
    intro_bonus: Option<u32>,
    highscores: Highscores,
    new_best: bool,
    audio: Box<dyn AudioSink>,
}

impl Game {
    pub fn new(tuning: Tuning, highscores: Highscores, audio: Box<dyn AudioSink>) -> Self {
        Self {
            session: GameSession::new(tuning.width, tuning.height),
            status: GameStatus::Idle,
            tuning,
            epoch: 0,
            pending: Vec::new(),
            intro_bonus: None,
            highscores,
            new_best: false,
            audio,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Direct access for hosts and tests that stage a situation.
    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn highscore(&self) -> u32 {
        self.highscores.best()
    }

    /// Whether the finished session set a new highscore.
    pub fn new_best(&self) -> bool {
        self.new_best
    }

    /// Delayed intro transitions still waiting, stale ones included.
    pub fn pending_intros(&self) -> usize {
        self.pending.len()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Begin a brand-new session from any state. Always a full reset.
    pub fn start(&mut self) {
        self.session.reset();
        self.session.wave = self.tuning.starting_wave;
        self.epoch += 1;
        self.new_best = false;
        self.intro_bonus = None;
        self.status = GameStatus::WaveIntro;
        info!(epoch = self.epoch, wave = self.session.wave, "session started");
        self.schedule_intro();
    }

    pub fn restart(&mut self) {
        self.start();
    }

    fn schedule_intro(&mut self) {
        self.pending.push(PendingIntro {
            remaining: self.tuning.wave_intro_secs,
            epoch: self.epoch,
        });
    }

    /// Run down the delayed transitions by `dt` seconds of wall time. An
    /// expired transition from an earlier epoch is dropped without effect.
    pub fn advance_timers(&mut self, dt: f32, rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let epoch = self.epoch;
        let mut due = false;
        self.pending.retain_mut(|intro| {
            intro.remaining -= dt;
            if intro.remaining > 0.0 {
                return true;
            }
            if intro.epoch == epoch {
                due = true;
            }
            false
        });
        if due && self.status == GameStatus::WaveIntro {
            self.begin_wave(rng, &mut events);
        }
        self.play(&events);
        events
    }

    fn begin_wave(&mut self, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
        waves::spawn_wave(&mut self.session, rng);
        self.status = GameStatus::Playing;
        let wave = self.session.wave;
        info!(wave, enemies = self.session.enemies.len(), "wave started");
        events.push(GameEvent::WaveStarted { wave });
    }

    // ── Playing ───────────────────────────────────────────────────────────────

    /// One simulation step. Ignored outside `Playing`.
    pub fn tick(&mut self, dt: f32, intents: &Intents, rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.status != GameStatus::Playing {
            return events;
        }
        if intents.activate_special {
            combo::fire_special(&mut self.session, rng, &mut events);
        }
        compute::tick(&mut self.session, intents, dt, &self.tuning, rng, &mut events);
        self.settle(&mut events);
        self.play(&events);
        events
    }

    /// Fire the special outside the tick pipeline, e.g. from a touch button.
    pub fn activate_special(&mut self, rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.status != GameStatus::Playing {
            return events;
        }
        if combo::fire_special(&mut self.session, rng, &mut events) {
            self.settle(&mut events);
        }
        self.play(&events);
        events
    }

    /// Apply the transitions a step may have triggered.
    fn settle(&mut self, events: &mut Vec<GameEvent>) {
        if self.session.is_defeated() {
            self.finish(GameStatus::GameOver, events);
        } else if self.session.wave_started && self.session.enemies.is_empty() {
            self.complete_wave(events);
        }
    }

    fn complete_wave(&mut self, events: &mut Vec<GameEvent>) {
        let session = &mut self.session;
        let wave = session.wave;
        let bonus = session.wave_perfect.then_some(PERFECT_WAVE_BONUS);
        if let Some(bonus) = bonus {
            session.score += bonus;
        }
        session.wave_started = false;
        session.bullets.clear();
        session.mud.clear();
        session.powerups.clear();
        session.particles.clear();
        info!(wave, ?bonus, score = session.score, "wave cleared");
        events.push(GameEvent::WaveCleared { wave, bonus });

        if wave >= TOTAL_WAVES {
            self.finish(GameStatus::Victory, events);
            return;
        }
        self.session.wave += 1;
        self.intro_bonus = bonus;
        self.status = GameStatus::WaveIntro;
        self.schedule_intro();
    }

    fn finish(&mut self, status: GameStatus, events: &mut Vec<GameEvent>) {
        self.status = status;
        let score = self.session.score;
        if status == GameStatus::Victory {
            info!(score, "victory");
            events.push(GameEvent::Victory { score });
        } else {
            info!(score, wave = self.session.wave, "game over");
            events.push(GameEvent::GameOver { score });
        }
        self.new_best = self.highscores.record(score);
        if self.new_best {
            events.push(GameEvent::NewHighscore { score });
        }
    }

    fn play(&mut self, events: &[GameEvent]) {
        for tone in events.iter().filter_map(audio::tone_for) {
            self.audio.play(tone);
        }
    }

    // ── Presentation ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> FrameSnapshot {
        let highscore = self.highscores.best();
        let overlay = match self.status {
            GameStatus::Idle => Some(Overlay::Start { highscore }),
            GameStatus::WaveIntro => Some(Overlay::WaveIntro {
                wave: self.session.wave,
                bonus: self.intro_bonus,
            }),
            GameStatus::Playing => None,
            GameStatus::GameOver => Some(Overlay::GameOver(summarize(
                &self.session,
                highscore,
                self.new_best,
            ))),
            GameStatus::Victory => Some(Overlay::Victory(summarize(
                &self.session,
                highscore,
                self.new_best,
            ))),
        };
        FrameSnapshot::capture(&self.session, self.status, highscore, overlay)
    }
}

mod display;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, ModifierKeyCode, MouseButton, MouseEvent,
        MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use space_groomers::audio::{AudioSink, NullAudio, Tone};
use space_groomers::clock::{GameClock, RealtimeFrames};
use space_groomers::config::{Config, LogConfig};
use space_groomers::entities::GameStatus;
use space_groomers::input::{InputState, Key};
use space_groomers::persistence::{FileStore, Highscores};
use space_groomers::snapshot::Presenter;
use space_groomers::state::Game;

use display::{touch_button_at, TerminalPresenter, TouchButton};

#[derive(Parser, Debug)]
#[command(name = "space_groomers", version)]
#[command(about = "Groom the invading swarm before it reaches the line")]
struct Cli {
    /// TOML config file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the persisted highscore
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Seed the RNG for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Never ring the terminal bell
    #[arg(long)]
    mute: bool,
    /// Start every session at this wave
    #[arg(long, value_name = "N")]
    wave: Option<u32>,
}

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈128 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<Key, u64>, key: Key, frame: u64) -> bool {
    key_frame
        .get(&key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::A),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::D),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
            Some(Key::Shift)
        }
        KeyCode::Modifier(ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl) => {
            Some(Key::Ctrl)
        }
        _ => None,
    }
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// Rings the terminal bell for the heavy tones: life lost, game over and
/// victory. Write failures are ignored.
struct BellAudio;

impl BellAudio {
    fn rings(tone: &Tone) -> bool {
        tone.frequency_hz < 150.0 || tone.duration_secs >= 0.8
    }
}

impl AudioSink for BellAudio {
    fn play(&mut self, tone: Tone) {
        if !Self::rings(&tone) {
            return;
        }
        let mut out = stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.dir = Some(dir.clone());
    }
    if let Some(file) = &cli.log_file {
        config.log.file = Some(file.clone());
    }
    if cli.mute {
        config.audio.bell = false;
    }
    if let Some(wave) = cli.wave {
        config.gameplay.starting_wave = wave;
    }
    config.validate().context("invalid command-line override")?;
    Ok(config)
}

/// The terminal belongs to the game, so logs only go to a file.
fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let Some(path) = &log.file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&log.level)
            .with_context(|| format!("invalid log level {:?}", log.level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key.  Each frame, keys still "fresh" (within
/// `HOLD_WINDOW` frames) are fed to `InputState` as held, so Space + A/D can
/// be held together.  Keyboard-enhancement terminals also report releases,
/// which remove keys immediately.
fn run<W: Write>(
    presenter: &mut TerminalPresenter<W>,
    game: &mut Game,
    config: &Config,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let frame_duration = config.frame_duration();
    let mut clock = GameClock::new(RealtimeFrames::new(frame_duration), config.max_delta());
    let mut input = InputState::new();
    let mut key_frame: HashMap<Key, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            KeyCode::Char('r') | KeyCode::Char('R') => {
                                game.restart();
                                input.clear();
                                key_frame.clear();
                                continue;
                            }
                            KeyCode::Enter
                                if game.status() == GameStatus::Idle
                                    || game.status().is_terminal() =>
                            {
                                game.start();
                                input.clear();
                                key_frame.clear();
                                continue;
                            }
                            _ => {}
                        }
                        if let Some(key) = map_key(code) {
                            key_frame.insert(key, frame);
                        }
                    }
                    KeyEventKind::Repeat => {
                        if let Some(key) = map_key(code) {
                            key_frame.insert(key, frame);
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(key) = map_key(code) {
                            key_frame.remove(&key);
                        }
                    }
                },
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => {
                    let (cols, rows) = presenter.size();
                    match kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            match touch_button_at(column, row, cols, rows) {
                                Some(TouchButton::Left) => input.set_touch_direction(-1),
                                Some(TouchButton::Right) => input.set_touch_direction(1),
                                Some(TouchButton::Fire) => input.set_touch_firing(true),
                                Some(TouchButton::Special) => input.press_touch_special(),
                                None => {}
                            }
                        }
                        MouseEventKind::Up(MouseButton::Left) => {
                            input.set_touch_direction(0);
                            input.set_touch_firing(false);
                        }
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => presenter.resize(cols, rows),
                _ => {}
            }
        }

        for key in Key::ALL {
            input.set_held(key, is_held(&key_frame, key, frame));
        }

        // ── Delayed transitions run on wall time ──────────────────────────────
        let now = Instant::now();
        game.advance_timers((now - last).as_secs_f32(), rng);
        last = now;

        clock.follow(game.status());
        match clock.next_tick() {
            Some(dt) => {
                let mut intents = input.intents();
                intents.activate_special = input.take_special();
                game.tick(dt, &intents, rng);
            }
            None => {
                // Presses outside play never carry over into the next wave.
                input.take_special();
                thread::sleep(frame_duration);
            }
        }
        clock.follow(game.status());

        presenter
            .present(&game.snapshot())
            .context("drawing frame")?;
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.log)?;

    let store_dir = config
        .storage
        .dir
        .clone()
        .unwrap_or_else(FileStore::default_dir);
    info!(dir = %store_dir.display(), "loading highscore");
    let highscores = Highscores::load(Box::new(FileStore::new(store_dir)));
    let audio: Box<dyn AudioSink> = if config.audio.bell {
        Box::new(BellAudio)
    } else {
        Box::new(NullAudio)
    };
    let mut game = Game::new(config.tuning(), highscores, audio);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut out = stdout();
    terminal::enable_raw_mode().context("enabling raw mode")?;
    let setup = out
        .execute(terminal::EnterAlternateScreen)
        .and_then(|out| out.execute(cursor::Hide))
        .and_then(|out| out.execute(EnableMouseCapture))
        .map(|_| ())
        .context("preparing the terminal");

    // Request key-release events and bare modifier keys from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = setup.is_ok()
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES,
            ))
            .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = setup
        .and_then(|()| terminal::size().context("reading terminal size"))
        .and_then(|(cols, rows)| {
            let mut presenter = TerminalPresenter::new(BufWriter::new(stdout()), cols, rows);
            run(&mut presenter, &mut game, &config, &mut rng, &rx)
        });

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        warn!(error = %e, "exiting with error");
    }
    info!(highscore = game.highscore(), "bye");
    result
}

use space_groomers::audio::{tone_for, NullAudio, RecordingAudio};
use space_groomers::compute::GameEvent;
use space_groomers::config::Tuning;
use space_groomers::entities::*;
use space_groomers::input::Intents;
use space_groomers::persistence::{Highscores, KeyValueStore, MemoryStore, HIGHSCORE_KEY};
use space_groomers::snapshot::Overlay;
use space_groomers::state::Game;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn tuning() -> Tuning {
    Tuning {
        powerup_chance_per_sec: 0.0,
        ..Tuning::default()
    }
}

fn new_game() -> Game {
    Game::new(tuning(), Highscores::volatile(), Box::new(NullAudio))
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Start a session and wait out the intro.
fn start_playing(game: &mut Game, rng: &mut StdRng) {
    game.start();
    let _ = game.advance_timers(game.tuning().wave_intro_secs, rng);
    assert_eq!(game.status(), GameStatus::Playing);
}

/// Shoot every enemy of the current wave with a bullet placed right on it.
fn shoot_down_wave(game: &mut Game, rng: &mut StdRng) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..1000 {
        if game.status() != GameStatus::Playing {
            break;
        }
        let Some(target) = game.session().enemies.first() else {
            break;
        };
        let (x, y) = (target.x, target.y);
        game.session_mut().bullets.push(Bullet { x, y });
        events.extend(game.tick(0.001, &Intents::default(), rng));
    }
    events
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn new_game_is_idle() {
    let mut game = new_game();
    assert_eq!(game.status(), GameStatus::Idle);
    assert_eq!(game.epoch(), 0);
    let events = game.tick(0.016, &Intents::default(), &mut seeded_rng());
    assert!(events.is_empty());
}

#[test]
fn start_enters_wave_intro_then_playing() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    game.start();
    assert_eq!(game.status(), GameStatus::WaveIntro);
    assert_eq!(game.epoch(), 1);
    assert!(game.session().enemies.is_empty());

    let _ = game.advance_timers(1.0, &mut rng);
    assert_eq!(game.status(), GameStatus::WaveIntro);

    let events = game.advance_timers(1.0, &mut rng);
    assert_eq!(game.status(), GameStatus::Playing);
    assert_eq!(game.session().enemies.len(), 12);
    assert_eq!(events, vec![GameEvent::WaveStarted { wave: 1 }]);
}

#[test]
fn ticks_are_ignored_during_intro() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    game.start();
    let fire = Intents {
        fire: true,
        ..Intents::default()
    };
    assert!(game.tick(0.016, &fire, &mut rng).is_empty());
    assert!(game.session().bullets.is_empty());
}

#[test]
fn starting_wave_override() {
    let mut game = Game::new(
        Tuning {
            starting_wave: 3,
            ..tuning()
        },
        Highscores::volatile(),
        Box::new(NullAudio),
    );
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    assert_eq!(game.session().wave, 3);
    assert_eq!(game.session().enemies.len(), 21);
}

// ── Restart & epoch guard ─────────────────────────────────────────────────────

#[test]
fn restart_during_intro_cancels_stale_transition() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    game.start();
    let _ = game.advance_timers(1.5, &mut rng);
    game.restart();
    assert_eq!(game.epoch(), 2);

    // The first session's transition expires here and must not fire.
    let events = game.advance_timers(0.75, &mut rng);
    assert!(events.is_empty());
    assert_eq!(game.status(), GameStatus::WaveIntro);
    assert!(game.session().enemies.is_empty());

    let _ = game.advance_timers(1.25, &mut rng);
    assert_eq!(game.status(), GameStatus::Playing);
    assert_eq!(game.pending_intros(), 0);
}

#[test]
fn restart_resets_the_session() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    {
        let s = game.session_mut();
        s.score = 1234;
        s.lives = 1;
        s.combo_count = 7;
        s.special_charge = 300;
        s.active_powerup = Some(PowerupKind::Shampoo);
    }

    game.restart();

    let s = game.session();
    assert_eq!(game.status(), GameStatus::WaveIntro);
    assert_eq!(s.score, 0);
    assert_eq!(s.wave, 1);
    assert_eq!(s.lives, STARTING_LIVES);
    assert_eq!(s.combo_count, 0);
    assert_eq!(s.special_charge, 0);
    assert_eq!(s.active_powerup, None);
    assert!(s.enemies.is_empty());
    assert!(s.bullets.is_empty());
}

// ── Wave completion ───────────────────────────────────────────────────────────

#[test]
fn perfect_wave_awards_bonus_once() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);

    let events = shoot_down_wave(&mut game, &mut rng);

    assert_eq!(game.status(), GameStatus::WaveIntro);
    assert_eq!(game.session().wave, 2);
    assert_eq!(game.session().score, 340);
    let cleared: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::WaveCleared { .. }))
        .collect();
    assert_eq!(
        cleared,
        vec![&GameEvent::WaveCleared {
            wave: 1,
            bonus: Some(PERFECT_WAVE_BONUS)
        }]
    );
    assert_eq!(
        game.snapshot().overlay,
        Some(Overlay::WaveIntro {
            wave: 2,
            bonus: Some(PERFECT_WAVE_BONUS)
        })
    );
}

#[test]
fn imperfect_wave_gets_no_bonus() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    game.session_mut().lose_life();

    let events = shoot_down_wave(&mut game, &mut rng);

    assert_eq!(game.session().score, 140);
    assert!(events.contains(&GameEvent::WaveCleared {
        wave: 1,
        bonus: None
    }));
    assert_eq!(
        game.snapshot().overlay,
        Some(Overlay::WaveIntro {
            wave: 2,
            bonus: None
        })
    );
}

#[test]
fn special_clearing_last_enemy_completes_wave() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    {
        let s = game.session_mut();
        s.enemies = vec![Enemy::new(EnemyKind::Flea, 300.0, 300.0, 40.0)];
        s.special_charge = SPECIAL_COST;
    }

    let events = game.activate_special(&mut rng);

    assert!(events.contains(&GameEvent::SpecialFired {
        cleared: 1,
        points: 10
    }));
    assert_eq!(game.status(), GameStatus::WaveIntro);
    assert_eq!(game.session().special_charge, 0);
    assert_eq!(game.session().score, 10 + PERFECT_WAVE_BONUS);
}

#[test]
fn special_intent_fires_during_tick() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    game.session_mut().special_charge = SPECIAL_COST;
    game.session_mut().enemies[0].y = 300.0;

    let intents = Intents {
        activate_special: true,
        ..Intents::default()
    };
    let events = game.tick(0.001, &intents, &mut rng);

    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::SpecialFired { cleared: 1, .. })));
    assert_eq!(game.session().enemies.len(), 11);
    assert_eq!(game.session().special_charge, 0);
}

#[test]
fn clearing_final_wave_is_victory() {
    let store = MemoryStore::new();
    let mut game = Game::new(
        Tuning {
            starting_wave: TOTAL_WAVES,
            ..tuning()
        },
        Highscores::load(Box::new(store.clone())),
        Box::new(NullAudio),
    );
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);

    let events = shoot_down_wave(&mut game, &mut rng);

    assert_eq!(game.status(), GameStatus::Victory);
    let score = game.session().score;
    assert!(events.contains(&GameEvent::Victory { score }));
    assert!(events.contains(&GameEvent::NewHighscore { score }));
    assert_eq!(game.highscore(), score);
    assert_eq!(
        store.get(HIGHSCORE_KEY).unwrap(),
        Some(score.to_string())
    );
    assert!(matches!(game.snapshot().overlay, Some(Overlay::Victory(_))));
    assert!(game.tick(0.016, &Intents::default(), &mut rng).is_empty());
}

// ── Game over ─────────────────────────────────────────────────────────────────

#[test]
fn game_over_happens_once() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    game.session_mut().lives = 1;
    game.session_mut().enemies[0].y = 420.0;

    let events = game.tick(0.001, &Intents::default(), &mut rng);
    let overs = events
        .iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .count();
    assert_eq!(overs, 1);
    assert_eq!(game.status(), GameStatus::GameOver);

    assert!(game.tick(0.001, &Intents::default(), &mut rng).is_empty());
    assert_eq!(game.status(), GameStatus::GameOver);
}

#[test]
fn no_scoring_after_last_life() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    let target = game.session().enemies[5].clone();
    {
        let s = game.session_mut();
        s.lives = 1;
        s.enemies[0].y = 420.0;
        s.bullets.push(Bullet {
            x: target.x,
            y: target.y,
        });
    }

    let _ = game.tick(0.001, &Intents::default(), &mut rng);

    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(game.session().score, 0);
    assert_eq!(game.session().enemies.len(), 11);
}

#[test]
fn game_over_records_highscore() {
    let store = MemoryStore::new();
    let mut game = Game::new(
        tuning(),
        Highscores::load(Box::new(store.clone())),
        Box::new(NullAudio),
    );
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    game.session_mut().score = 120;
    game.session_mut().lives = 1;
    game.session_mut().enemies[0].y = 420.0;

    let events = game.tick(0.001, &Intents::default(), &mut rng);

    assert!(events.contains(&GameEvent::GameOver { score: 120 }));
    assert!(events.contains(&GameEvent::NewHighscore { score: 120 }));
    assert!(game.new_best());
    assert_eq!(game.highscore(), 120);
    assert_eq!(store.get(HIGHSCORE_KEY).unwrap().as_deref(), Some("120"));

    match game.snapshot().overlay {
        Some(Overlay::GameOver(summary)) => {
            assert_eq!(summary.score, 120);
            assert_eq!(summary.highscore, 120);
            assert!(summary.new_best);
        }
        other => panic!("expected game-over overlay, got {other:?}"),
    }
}

#[test]
fn lower_score_keeps_highscore() {
    let mut store = MemoryStore::new();
    store.set(HIGHSCORE_KEY, "900").unwrap();
    let mut game = Game::new(
        tuning(),
        Highscores::load(Box::new(store.clone())),
        Box::new(NullAudio),
    );
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    game.session_mut().score = 50;
    game.session_mut().lives = 1;
    game.session_mut().enemies[0].y = 420.0;

    let events = game.tick(0.001, &Intents::default(), &mut rng);

    assert!(!events
        .iter()
        .any(|e| matches!(e, GameEvent::NewHighscore { .. })));
    assert!(!game.new_best());
    assert_eq!(game.highscore(), 900);
    assert_eq!(store.get(HIGHSCORE_KEY).unwrap().as_deref(), Some("900"));
}

// ── Snapshot & audio ──────────────────────────────────────────────────────────

#[test]
fn idle_snapshot_shows_start_overlay() {
    let game = new_game();
    let frame = game.snapshot();
    assert_eq!(frame.status, GameStatus::Idle);
    assert_eq!(frame.overlay, Some(Overlay::Start { highscore: 0 }));
    assert_eq!(frame.hud.lives, STARTING_LIVES);
    assert_eq!(frame.hud.total_waves, TOTAL_WAVES);
}

#[test]
fn playing_snapshot_reflects_session() {
    let mut game = new_game();
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    let frame = game.snapshot();
    assert_eq!(frame.overlay, None);
    assert_eq!(frame.enemies.len(), 12);
    assert_eq!(frame.hud.combo, None);
    assert_eq!(frame.hud.powerup, None);
    assert!(!frame.hud.special_ready());

    let (x, y) = (frame.enemies[0].x, frame.enemies[0].y);
    game.session_mut().bullets.push(Bullet { x, y });
    game.session_mut().active_powerup = Some(PowerupKind::Shampoo);
    game.session_mut().powerup_timer = 4.0;
    let _ = game.tick(0.001, &Intents::default(), &mut rng);

    let hud = game.snapshot().hud;
    let combo = hud.combo.unwrap();
    assert_eq!((combo.count, combo.multiplier), (1, 1));
    let powerup = hud.powerup.unwrap();
    assert_eq!(powerup.kind, PowerupKind::Shampoo);
    assert!((powerup.remaining_fraction - 0.5).abs() < 0.01);
    assert_eq!(hud.score, 10);
}

#[test]
fn events_are_voiced() {
    let audio = RecordingAudio::new();
    let mut game = Game::new(tuning(), Highscores::volatile(), Box::new(audio.clone()));
    let mut rng = seeded_rng();
    start_playing(&mut game, &mut rng);
    let (x, y) = {
        let e = &game.session().enemies[0];
        (e.x, e.y)
    };
    game.session_mut().bullets.push(Bullet { x, y });

    let events = game.tick(0.001, &Intents::default(), &mut rng);

    let expected: Vec<_> = events.iter().filter_map(tone_for).collect();
    assert!(!expected.is_empty());
    assert_eq!(audio.tones(), expected);
}

use space_groomers::compute::*;
use space_groomers::config::Tuning;
use space_groomers::entities::*;
use space_groomers::input::Intents;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_session() -> GameSession {
    let mut s = GameSession::new(600.0, 480.0);
    s.wave_started = true;
    s
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn flea(x: f32, y: f32) -> Enemy {
    Enemy::new(EnemyKind::Flea, x, y, 40.0)
}

fn no_powerups() -> Tuning {
    Tuning {
        powerup_chance_per_sec: 0.0,
        ..Tuning::default()
    }
}

// ── move_player ───────────────────────────────────────────────────────────────

#[test]
fn move_player_right() {
    let mut s = make_session(); // x=300
    move_player(&mut s, 1.0, 0.5);
    assert_eq!(s.player.x, 460.0); // 300 + 320 * 0.5
}

#[test]
fn move_player_clamps_left() {
    let mut s = make_session();
    s.player.x = 20.0;
    move_player(&mut s, -1.0, 1.0);
    assert_eq!(s.player.x, PLAYER_HALF_WIDTH);
}

#[test]
fn move_player_clamps_right() {
    let mut s = make_session();
    move_player(&mut s, 1.0, 10.0);
    assert_eq!(s.player.x, 600.0 - PLAYER_HALF_WIDTH);
}

#[test]
fn move_player_idle() {
    let mut s = make_session();
    move_player(&mut s, 0.0, 1.0);
    assert_eq!(s.player.x, 300.0);
}

// ── player_shoot ──────────────────────────────────────────────────────────────

#[test]
fn shoot_spawns_bullet_above_player() {
    let mut s = make_session();
    let mut events = Vec::new();
    assert_eq!(player_shoot(&mut s, &mut events), 1);
    assert_eq!(s.bullets, vec![Bullet { x: 300.0, y: 432.0 }]);
    assert_eq!(s.fire_cooldown, FIRE_COOLDOWN);
    assert_eq!(events, vec![GameEvent::Shot { bullets: 1 }]);
}

#[test]
fn shoot_respects_cooldown() {
    let mut s = make_session();
    let mut events = Vec::new();
    let _ = player_shoot(&mut s, &mut events);
    assert_eq!(player_shoot(&mut s, &mut events), 0);
    assert_eq!(s.bullets.len(), 1);
}

#[test]
fn shoot_with_shampoo_spreads() {
    let mut s = make_session();
    s.active_powerup = Some(PowerupKind::Shampoo);
    s.powerup_timer = 8.0;
    let mut events = Vec::new();
    assert_eq!(player_shoot(&mut s, &mut events), 3);
    assert_eq!(s.bullets.len(), 3);
    assert!(s.bullets.iter().any(|b| b.x < 300.0));
    assert!(s.bullets.iter().any(|b| b.x > 300.0));
}

// ── move_bullets ──────────────────────────────────────────────────────────────

#[test]
fn bullets_move_up() {
    let mut s = make_session();
    s.bullets.push(Bullet { x: 100.0, y: 200.0 });
    let mut events = Vec::new();
    move_bullets(&mut s, 0.1, &mut events);
    assert_eq!(s.bullets[0].y, 200.0 - BULLET_SPEED * 0.1);
    assert!(events.is_empty());
}

#[test]
fn wasted_bullet_breaks_combo() {
    let mut s = make_session();
    s.combo_count = 3;
    s.combo_timer = 4.0;
    s.bullets.push(Bullet { x: 100.0, y: 5.0 });
    let mut events = Vec::new();
    move_bullets(&mut s, 0.1, &mut events);
    assert!(s.bullets.is_empty());
    assert_eq!(s.combo_count, 0);
    assert_eq!(s.combo_multiplier, 1);
    assert_eq!(events, vec![GameEvent::ComboBroken { count: 3 }]);
}

// ── move_swarm ────────────────────────────────────────────────────────────────

#[test]
fn swarm_moves_rigidly_at_mean_speed() {
    let mut s = make_session();
    s.enemies.push(Enemy::new(EnemyKind::Flea, 200.0, 100.0, 40.0));
    s.enemies.push(Enemy::new(EnemyKind::Furball, 248.0, 100.0, 60.0));
    assert!(!move_swarm(&mut s, 0.5));
    assert_eq!(s.enemies[0].x, 225.0); // 200 + 50 * 0.5
    assert_eq!(s.enemies[1].x, 273.0);
}

#[test]
fn swarm_flips_and_drops_at_right_margin() {
    let mut s = make_session();
    s.enemies.push(Enemy::new(EnemyKind::Flea, 575.0, 100.0, 100.0));
    s.enemies.push(Enemy::new(EnemyKind::Flea, 527.0, 136.0, 100.0));
    assert!(move_swarm(&mut s, 0.1));
    assert_eq!(s.swarm_direction, -1.0);
    assert_eq!(s.enemies[0].y, 100.0 + SWARM_DROP);
    assert_eq!(s.enemies[1].y, 136.0 + SWARM_DROP);
}

#[test]
fn swarm_flips_at_left_margin() {
    let mut s = make_session();
    s.swarm_direction = -1.0;
    s.enemies.push(Enemy::new(EnemyKind::Flea, 25.0, 100.0, 100.0));
    assert!(move_swarm(&mut s, 0.1));
    assert_eq!(s.swarm_direction, 1.0);
}

#[test]
fn empty_swarm_does_nothing() {
    let mut s = make_session();
    assert!(!move_swarm(&mut s, 1.0));
}

// ── Danger line ───────────────────────────────────────────────────────────────

#[test]
fn breach_costs_a_life() {
    let mut s = make_session();
    s.enemies.push(flea(100.0, 420.0));
    s.enemies.push(flea(200.0, 100.0));
    let mut events = Vec::new();
    assert!(!breach_danger_line(&mut s, &mut events));
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.lives, 2);
    assert!(!s.wave_perfect);
    assert_eq!(
        events,
        vec![GameEvent::LifeLost {
            lives_left: 2,
            cause: LifeLossCause::Breach
        }]
    );
}

#[test]
fn breach_stops_at_last_life() {
    let mut s = make_session();
    s.lives = 1;
    s.enemies.push(flea(100.0, 420.0));
    s.enemies.push(flea(200.0, 430.0));
    let mut events = Vec::new();
    assert!(breach_danger_line(&mut s, &mut events));
    assert_eq!(s.lives, 0);
    assert_eq!(events.len(), 1);
}

// ── Mud ───────────────────────────────────────────────────────────────────────

#[test]
fn mud_interval_shrinks_to_floor() {
    assert!((mud_interval(2) - 2.2).abs() < 1e-5);
    assert_eq!(mud_interval(20), 0.8);
}

#[test]
fn no_mud_on_wave_one() {
    let mut s = make_session();
    s.enemies.push(flea(100.0, 100.0));
    let mut events = Vec::new();
    spawn_mud(&mut s, 10.0, &mut seeded_rng(), &mut events);
    assert!(s.mud.is_empty());
}

#[test]
fn no_mud_before_wave_starts() {
    let mut s = make_session();
    s.wave = 3;
    s.wave_started = false;
    s.enemies.push(flea(100.0, 100.0));
    let mut events = Vec::new();
    spawn_mud(&mut s, 10.0, &mut seeded_rng(), &mut events);
    assert!(s.mud.is_empty());
}

#[test]
fn mud_drops_from_an_enemy_after_interval() {
    let mut s = make_session();
    s.wave = 2;
    s.enemies.push(flea(150.0, 90.0));
    let mut events = Vec::new();
    let mut rng = seeded_rng();

    spawn_mud(&mut s, 1.0, &mut rng, &mut events);
    assert!(s.mud.is_empty());

    spawn_mud(&mut s, 1.5, &mut rng, &mut events);
    assert_eq!(s.mud, vec![MudDrop { x: 150.0, y: 90.0 }]);
    assert_eq!(s.mud_timer, 0.0);
    assert_eq!(events, vec![GameEvent::MudDropped]);
}

#[test]
fn mud_hitting_player_costs_a_life() {
    let mut s = make_session();
    s.mud.push(MudDrop {
        x: s.player.x,
        y: s.player.y - 5.0,
    });
    let mut events = Vec::new();
    assert!(!move_mud(&mut s, 0.01, &mut seeded_rng(), &mut events));
    assert!(s.mud.is_empty());
    assert_eq!(s.lives, 2);
    assert!(!s.wave_perfect);
    assert_eq!(
        events,
        vec![GameEvent::LifeLost {
            lives_left: 2,
            cause: LifeLossCause::Mud
        }]
    );
}

#[test]
fn mud_leaves_at_the_bottom() {
    let mut s = make_session();
    s.mud.push(MudDrop { x: 50.0, y: 479.0 });
    let mut events = Vec::new();
    assert!(!move_mud(&mut s, 0.1, &mut seeded_rng(), &mut events));
    assert!(s.mud.is_empty());
    assert_eq!(s.lives, 3);
    assert!(events.is_empty());
}

// ── Bullet ↔ enemy ────────────────────────────────────────────────────────────

#[test]
fn bullet_kills_flea() {
    let mut s = make_session();
    s.enemies.push(flea(300.0, 200.0));
    s.bullets.push(Bullet { x: 305.0, y: 205.0 });
    let mut events = Vec::new();
    resolve_bullet_hits(&mut s, &mut seeded_rng(), &mut events);

    assert!(s.enemies.is_empty());
    assert!(s.bullets.is_empty());
    assert_eq!(s.score, 10);
    assert_eq!(s.special_charge, 10);
    assert_eq!(s.combo_count, 1);
    assert_eq!(s.kill_stats.get(&EnemyKind::Flea), Some(&1));
    assert!(!s.particles.is_empty());
    assert!(events.contains(&GameEvent::EnemyKilled {
        kind: EnemyKind::Flea,
        points: 10
    }));
}

#[test]
fn tick_enemy_needs_two_hits() {
    let mut s = make_session();
    s.enemies.push(Enemy::new(EnemyKind::Tick, 300.0, 200.0, 30.0));
    s.bullets.push(Bullet { x: 300.0, y: 200.0 });
    let mut events = Vec::new();
    let mut rng = seeded_rng();

    resolve_bullet_hits(&mut s, &mut rng, &mut events);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].hp, 1);
    assert_eq!(s.score, 0);

    s.bullets.push(Bullet { x: 300.0, y: 200.0 });
    resolve_bullet_hits(&mut s, &mut rng, &mut events);
    assert!(s.enemies.is_empty());
    assert_eq!(s.score, 25);
}

#[test]
fn kill_uses_combo_multiplier() {
    let mut s = make_session();
    s.combo_count = 10;
    s.combo_multiplier = 2;
    s.enemies.push(flea(300.0, 200.0));
    s.bullets.push(Bullet { x: 300.0, y: 200.0 });
    let mut events = Vec::new();
    resolve_bullet_hits(&mut s, &mut seeded_rng(), &mut events);
    assert_eq!(s.score, 20);
    assert_eq!(s.special_charge, 20);
    assert_eq!(s.combo_count, 11);
}

#[test]
fn each_bullet_hits_one_enemy() {
    let mut s = make_session();
    s.enemies.push(flea(300.0, 200.0));
    s.enemies.push(flea(310.0, 200.0));
    s.bullets.push(Bullet { x: 305.0, y: 200.0 });
    let mut events = Vec::new();
    resolve_bullet_hits(&mut s, &mut seeded_rng(), &mut events);
    assert_eq!(s.enemies.len(), 1);
}

#[test]
fn distant_bullet_misses() {
    let mut s = make_session();
    s.enemies.push(flea(300.0, 200.0));
    s.bullets.push(Bullet { x: 340.0, y: 200.0 });
    let mut events = Vec::new();
    resolve_bullet_hits(&mut s, &mut seeded_rng(), &mut events);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.bullets.len(), 1);
    assert!(events.is_empty());
}

// ── Particles ─────────────────────────────────────────────────────────────────

#[test]
fn burst_is_capped() {
    let mut particles = Vec::new();
    let mut rng = seeded_rng();
    burst(&mut particles, 0.0, 0.0, C_SPARK, MAX_PARTICLES - 1, 10.0, &mut rng);
    burst(&mut particles, 0.0, 0.0, C_SPARK, 10, 10.0, &mut rng);
    assert_eq!(particles.len(), MAX_PARTICLES);
}

#[test]
fn particles_expire() {
    let mut s = make_session();
    burst(&mut s.particles, 10.0, 10.0, C_SPARK, 20, 50.0, &mut seeded_rng());
    update_particles(&mut s, 0.1);
    assert_eq!(s.particles.len(), 20); // life is at least 0.3s
    update_particles(&mut s, 1.0);
    assert!(s.particles.is_empty());
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_fires_on_intent() {
    let mut s = make_session();
    let intents = Intents {
        fire: true,
        ..Intents::default()
    };
    let mut events = Vec::new();
    tick(&mut s, &intents, 0.016, &no_powerups(), &mut seeded_rng(), &mut events);
    assert_eq!(s.bullets.len(), 1);
    assert!(s.bullets[0].y < 432.0);
    assert!(events.contains(&GameEvent::Shot { bullets: 1 }));
}

#[test]
fn tick_moves_player_on_intent() {
    let mut s = make_session();
    let intents = Intents {
        move_left: true,
        ..Intents::default()
    };
    let mut events = Vec::new();
    tick(&mut s, &intents, 0.1, &no_powerups(), &mut seeded_rng(), &mut events);
    assert!((s.player.x - 268.0).abs() < 1e-3); // 300 - 320 * 0.1
}

#[test]
fn tick_stops_processing_after_last_life() {
    let mut s = make_session();
    s.lives = 1;
    s.enemies.push(flea(100.0, 415.0));
    s.enemies.push(flea(300.0, 200.0));
    s.bullets.push(Bullet { x: 300.0, y: 200.0 });
    let mut events = Vec::new();
    tick(
        &mut s,
        &Intents::default(),
        0.001,
        &no_powerups(),
        &mut seeded_rng(),
        &mut events,
    );
    assert!(s.is_defeated());
    assert_eq!(s.score, 0);
    assert_eq!(s.enemies.len(), 1);
    assert!(!events
        .iter()
        .any(|e| matches!(e, GameEvent::EnemyKilled { .. })));
}

#[test]
fn tick_is_deterministic_for_a_seed() {
    let mut a = make_session();
    a.wave = 4;
    a.enemies = space_groomers::waves::build_wave(4, 600.0, &mut seeded_rng());
    let mut b = a.clone();
    let intents = Intents {
        fire: true,
        move_right: true,
        ..Intents::default()
    };
    let tuning = Tuning::default();
    let (mut ra, mut rb) = (seeded_rng(), seeded_rng());
    let (mut ea, mut eb) = (Vec::new(), Vec::new());
    for _ in 0..200 {
        tick(&mut a, &intents, 0.016, &tuning, &mut ra, &mut ea);
        tick(&mut b, &intents, 0.016, &tuning, &mut rb, &mut eb);
    }
    assert_eq!(a.score, b.score);
    assert_eq!(a.enemies, b.enemies);
    assert_eq!(ea, eb);
}

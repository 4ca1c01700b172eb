/// Per-frame movement and collision.
///
/// Every function takes the live `GameSession` explicitly (and, where
/// needed, an RNG handle) and records what happened into an `events`
/// buffer. Side effects are limited to the session and the injected RNG.
use std::f32::consts::TAU;

use rand::Rng;

use crate::combo;
use crate::config::Tuning;
use crate::entities::{
    Bullet, EnemyKind, GameSession, MudDrop, Particle, PowerupKind, Rgb, C_MUD, C_SPARK,
    PLAYER_HALF_WIDTH,
};
use crate::input::Intents;
use crate::powerups;

// ── Kinematics ───────────────────────────────────────────────────────────────

pub const BULLET_SPEED: f32 = 420.0;
pub const FIRE_COOLDOWN: f32 = 0.25;
/// Bullets leave the muzzle this far above the player's row.
const MUZZLE_OFFSET: f32 = 12.0;

/// Horizontal margin at which the swarm turns around.
pub const SWARM_MARGIN: f32 = 20.0;
/// Distance every enemy descends when the swarm turns.
pub const SWARM_DROP: f32 = 16.0;

pub const HIT_RADIUS: f32 = 16.0;

pub const MUD_SPEED: f32 = 160.0;
pub const MUD_FROM_WAVE: u32 = 2;
const MUD_HIT_HEIGHT: f32 = 14.0;

pub const MAX_PARTICLES: usize = 300;

pub fn mud_interval(wave: u32) -> f32 {
    (2.5 - 0.15 * wave as f32).max(0.8)
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeLossCause {
    /// An enemy crossed the danger line.
    Breach,
    Mud,
}

/// Everything observable that happened during a tick or transition.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Shot { bullets: u32 },
    EnemyHit { kind: EnemyKind },
    EnemyKilled { kind: EnemyKind, points: u32 },
    ComboBroken { count: u32 },
    LifeLost { lives_left: u32, cause: LifeLossCause },
    MudDropped,
    PowerupCollected { kind: PowerupKind },
    RowCleared { cleared: u32, points: u32 },
    SpecialFired { cleared: u32, points: u32 },
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32, bonus: Option<u32> },
    GameOver { score: u32 },
    Victory { score: u32 },
    NewHighscore { score: u32 },
}

// ── Input-driven transitions ──────────────────────────────────────────────────

/// Move the player by `direction` (−1, 0 or 1) for `dt` seconds, clamped so
/// the sprite stays on the playfield.
pub fn move_player(session: &mut GameSession, direction: f32, dt: f32) {
    let player = &mut session.player;
    let x = player.x + direction * player.speed * dt;
    player.x = x.clamp(PLAYER_HALF_WIDTH, session.width - PLAYER_HALF_WIDTH);
}

/// Fire from the player's muzzle unless the cooldown is still running.
/// Returns the number of bullets spawned.
pub fn player_shoot(session: &mut GameSession, events: &mut Vec<GameEvent>) -> u32 {
    if session.fire_cooldown > 0.0 {
        return 0;
    }
    let offsets = powerups::bullet_offsets(session);
    let y = session.player.y - MUZZLE_OFFSET;
    for dx in offsets {
        session.bullets.push(Bullet {
            x: session.player.x + dx,
            y,
        });
    }
    session.fire_cooldown = FIRE_COOLDOWN;
    let count = offsets.len() as u32;
    events.push(GameEvent::Shot { bullets: count });
    count
}

// ── Per-frame tick ────────────────────────────────────────────────────────────

/// Advance the simulation by `dt` seconds. All randomness comes through
/// `rng` so callers control determinism.
///
/// Stops early, leaving the rest of the frame unprocessed, as soon as the
/// last life is lost.
pub fn tick(
    session: &mut GameSession,
    intents: &Intents,
    dt: f32,
    tuning: &Tuning,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    // ── 1. Player ─────────────────────────────────────────────────────────────
    move_player(session, intents.direction(), dt);
    session.fire_cooldown = (session.fire_cooldown - dt).max(0.0);
    if intents.fire {
        player_shoot(session, events);
    }

    // ── 2. Bullets ────────────────────────────────────────────────────────────
    move_bullets(session, dt, events);

    // ── 3. Swarm ──────────────────────────────────────────────────────────────
    move_swarm(session, dt);

    // ── 4. Danger line ────────────────────────────────────────────────────────
    if breach_danger_line(session, events) {
        return;
    }

    // ── 5. Mud ────────────────────────────────────────────────────────────────
    spawn_mud(session, dt, rng, events);
    if move_mud(session, dt, rng, events) {
        return;
    }

    // ── 6. Bullet ↔ enemy ─────────────────────────────────────────────────────
    resolve_bullet_hits(session, rng, events);

    // ── 7. Powerups ───────────────────────────────────────────────────────────
    powerups::update(session, dt, tuning.powerup_chance_per_sec, rng, events);

    // ── 8. Timers & cosmetics ─────────────────────────────────────────────────
    combo::decay(session, dt, events);
    powerups::tick_timer(session, dt);
    update_particles(session, dt);
}

/// Bullets travel up; any that leave the top were wasted and break the combo.
pub fn move_bullets(session: &mut GameSession, dt: f32, events: &mut Vec<GameEvent>) {
    let before = session.bullets.len();
    for bullet in &mut session.bullets {
        bullet.y -= BULLET_SPEED * dt;
    }
    session.bullets.retain(|b| b.y >= 0.0);
    if session.bullets.len() < before {
        combo::break_combo(session, events);
    }
}

/// Move the swarm as one rigid formation. When its leading edge crosses a
/// side margin the shared direction flips and every enemy drops one step.
/// Returns `true` on a flip.
pub fn move_swarm(session: &mut GameSession, dt: f32) -> bool {
    if session.enemies.is_empty() {
        return false;
    }
    let speed = session.enemies.iter().map(|e| e.base_speed).sum::<f32>()
        / session.enemies.len() as f32;
    let dx = session.swarm_direction * speed * dt;
    for enemy in &mut session.enemies {
        enemy.x += dx;
    }

    let crossed = if session.swarm_direction > 0.0 {
        let max_x = session
            .enemies
            .iter()
            .map(|e| e.x)
            .fold(f32::MIN, f32::max);
        max_x > session.width - SWARM_MARGIN
    } else {
        let min_x = session
            .enemies
            .iter()
            .map(|e| e.x)
            .fold(f32::MAX, f32::min);
        min_x < SWARM_MARGIN
    };

    if crossed {
        session.swarm_direction = -session.swarm_direction;
        for enemy in &mut session.enemies {
            enemy.y += SWARM_DROP;
        }
    }
    crossed
}

/// Remove enemies past the danger line, one life each. Returns `true` if the
/// session ran out of lives.
pub fn breach_danger_line(session: &mut GameSession, events: &mut Vec<GameEvent>) -> bool {
    let line = session.danger_line();
    let mut i = 0;
    while i < session.enemies.len() {
        if session.enemies[i].y < line {
            i += 1;
            continue;
        }
        session.enemies.remove(i);
        session.lose_life();
        events.push(GameEvent::LifeLost {
            lives_left: session.lives,
            cause: LifeLossCause::Breach,
        });
        if session.is_defeated() {
            return true;
        }
    }
    false
}

/// Drop mud from a random live enemy once the wave's interval has elapsed.
pub fn spawn_mud(
    session: &mut GameSession,
    dt: f32,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    if session.wave < MUD_FROM_WAVE || !session.wave_started || session.enemies.is_empty() {
        return;
    }
    session.mud_timer += dt;
    if session.mud_timer < mud_interval(session.wave) {
        return;
    }
    session.mud_timer = 0.0;
    let source = &session.enemies[rng.gen_range(0..session.enemies.len())];
    session.mud.push(MudDrop {
        x: source.x,
        y: source.y,
    });
    events.push(GameEvent::MudDropped);
}

/// Mud falls; drops leave at the bottom or splash the player for a life.
/// Returns `true` if the session ran out of lives.
pub fn move_mud(
    session: &mut GameSession,
    dt: f32,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    let (px, py) = (session.player.x, session.player.y);
    let mut i = 0;
    while i < session.mud.len() {
        let drop = &mut session.mud[i];
        drop.y += MUD_SPEED * dt;
        if drop.y > session.height {
            session.mud.remove(i);
            continue;
        }
        let touching =
            (drop.x - px).abs() < PLAYER_HALF_WIDTH && (drop.y - py).abs() < MUD_HIT_HEIGHT;
        if !touching {
            i += 1;
            continue;
        }
        let drop = session.mud.remove(i);
        session.lose_life();
        burst(&mut session.particles, drop.x, drop.y, C_MUD, 8, 90.0, rng);
        events.push(GameEvent::LifeLost {
            lives_left: session.lives,
            cause: LifeLossCause::Mud,
        });
        if session.is_defeated() {
            return true;
        }
    }
    false
}

/// Proximity test between every bullet and the swarm. Each bullet hits at
/// most one enemy.
pub fn resolve_bullet_hits(
    session: &mut GameSession,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let radius = powerups::hit_radius(session);
    let mut bi = 0;
    while bi < session.bullets.len() {
        let (bx, by) = (session.bullets[bi].x, session.bullets[bi].y);
        let target = session
            .enemies
            .iter()
            .position(|e| (e.x - bx).abs() < radius && (e.y - by).abs() < radius);
        let Some(ei) = target else {
            bi += 1;
            continue;
        };

        session.bullets.remove(bi);
        let enemy = &mut session.enemies[ei];
        enemy.hp = enemy.hp.saturating_sub(1);
        let (kind, ex, ey, dead) = (enemy.kind, enemy.x, enemy.y, enemy.hp == 0);
        burst(&mut session.particles, bx, by, C_SPARK, 4, 80.0, rng);
        events.push(GameEvent::EnemyHit { kind });

        if dead {
            session.enemies.remove(ei);
            let points = kind.stats().points * session.combo_multiplier;
            session.score += points;
            session.add_special_charge(points);
            session.tally_kill(kind);
            combo::advance(session);
            burst(&mut session.particles, ex, ey, kind.stats().color, 12, 140.0, rng);
            events.push(GameEvent::EnemyKilled { kind, points });
        }
    }
}

/// Remove every enemy matching `doomed`, scoring each at its base value
/// (no combo multiplier). Returns `(cleared, points)`.
pub(crate) fn clear_enemies_where<F>(
    session: &mut GameSession,
    doomed: F,
    rng: &mut impl Rng,
) -> (u32, u32)
where
    F: Fn(f32, f32) -> bool,
{
    let mut cleared = 0;
    let mut points = 0;
    let mut i = 0;
    while i < session.enemies.len() {
        let enemy = &session.enemies[i];
        if !doomed(enemy.x, enemy.y) {
            i += 1;
            continue;
        }
        let enemy = session.enemies.remove(i);
        let stats = enemy.kind.stats();
        cleared += 1;
        points += stats.points;
        session.score += stats.points;
        session.tally_kill(enemy.kind);
        burst(&mut session.particles, enemy.x, enemy.y, stats.color, 10, 160.0, rng);
    }
    (cleared, points)
}

// ── Particles ─────────────────────────────────────────────────────────────────

/// Spray `count` particles from `(x, y)`. Silently stops at `MAX_PARTICLES`.
pub fn burst(
    particles: &mut Vec<Particle>,
    x: f32,
    y: f32,
    color: Rgb,
    count: usize,
    speed: f32,
    rng: &mut impl Rng,
) {
    let room = MAX_PARTICLES.saturating_sub(particles.len());
    for _ in 0..count.min(room) {
        let angle = rng.gen_range(0.0..TAU);
        let velocity = speed * rng.gen_range(0.3..1.0);
        particles.push(Particle {
            x,
            y,
            vx: angle.cos() * velocity,
            vy: angle.sin() * velocity,
            life: rng.gen_range(0.3..0.8),
            color,
            size: rng.gen_range(1.0..3.0),
        });
    }
}

pub fn update_particles(session: &mut GameSession, dt: f32) {
    for p in &mut session.particles {
        p.x += p.vx * dt;
        p.y += p.vy * dt;
        p.life -= dt;
    }
    session.particles.retain(|p| p.life > 0.0);
}

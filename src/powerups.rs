/// Falling pickups and their effects.
use rand::Rng;
use tracing::debug;

use crate::compute::{clear_enemies_where, GameEvent, HIT_RADIUS};
use crate::entities::{GameSession, Powerup, PowerupKind};

pub const POWERUP_FALL_SPEED: f32 = 70.0;
const COLLECT_RADIUS: f32 = 24.0;
/// Hit radius while Shampoo is active.
pub const SPLASH_RADIUS: f32 = 28.0;
/// Spawn positions keep this far from the side walls.
const SPAWN_MARGIN: f32 = 20.0;

const SINGLE_SHOT: [f32; 1] = [0.0];
const SPREAD_SHOT: [f32; 3] = [-14.0, 0.0, 14.0];

/// Horizontal muzzle offsets for one trigger pull.
pub fn bullet_offsets(session: &GameSession) -> &'static [f32] {
    match session.active_powerup {
        Some(PowerupKind::Shampoo) => &SPREAD_SHOT,
        _ => &SINGLE_SHOT,
    }
}

pub fn hit_radius(session: &GameSession) -> f32 {
    match session.active_powerup {
        Some(PowerupKind::Shampoo) => SPLASH_RADIUS,
        _ => HIT_RADIUS,
    }
}

/// Spawn, fall and collect in one step.
pub fn update(
    session: &mut GameSession,
    dt: f32,
    chance_per_sec: f64,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    maybe_spawn(session, dt, chance_per_sec, rng);

    let (px, py) = (session.player.x, session.player.y);
    let mut collected = Vec::new();
    for powerup in &mut session.powerups {
        powerup.y += POWERUP_FALL_SPEED * dt;
    }
    let height = session.height;
    session.powerups.retain(|p| {
        if (p.x - px).abs() < COLLECT_RADIUS && (p.y - py).abs() < COLLECT_RADIUS {
            collected.push(p.kind);
            return false;
        }
        p.y <= height
    });

    for kind in collected {
        collect(session, kind, rng, events);
    }
}

/// Roll for a new pickup. Nothing spawns once the swarm is gone.
pub fn maybe_spawn(session: &mut GameSession, dt: f32, chance_per_sec: f64, rng: &mut impl Rng) {
    if session.enemies.is_empty() {
        return;
    }
    let chance = (chance_per_sec * f64::from(dt)).clamp(0.0, 1.0);
    if !rng.gen_bool(chance) {
        return;
    }
    let kind = PowerupKind::ALL[rng.gen_range(0..PowerupKind::ALL.len())];
    let x = rng.gen_range(SPAWN_MARGIN..session.width - SPAWN_MARGIN);
    session.powerups.push(Powerup { kind, x, y: 0.0 });
}

/// Apply a collected pickup.
pub fn collect(
    session: &mut GameSession,
    kind: PowerupKind,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    debug!(powerup = kind.name(), "powerup collected");
    events.push(GameEvent::PowerupCollected { kind });
    match kind {
        PowerupKind::Shampoo => {
            session.active_powerup = Some(kind);
            session.powerup_timer = kind.duration().unwrap_or(0.0);
        }
        PowerupKind::Towel => {
            let (cleared, points) = towel_clear(session, rng);
            events.push(GameEvent::RowCleared { cleared, points });
        }
    }
}

/// Clear the full row the lowest enemy belongs to. Returns `(cleared, points)`.
pub fn towel_clear(session: &mut GameSession, rng: &mut impl Rng) -> (u32, u32) {
    if session.enemies.is_empty() {
        return (0, 0);
    }
    let lowest = session.enemies.iter().map(|e| e.y).fold(f32::MIN, f32::max);
    clear_enemies_where(session, |_, y| (y - lowest).abs() < 0.5, rng)
}

/// Count down the active timed powerup and expire it.
pub fn tick_timer(session: &mut GameSession, dt: f32) {
    if session.active_powerup.is_none() {
        return;
    }
    session.powerup_timer -= dt;
    if session.powerup_timer <= 0.0 {
        session.active_powerup = None;
        session.powerup_timer = 0.0;
    }
}

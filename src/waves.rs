/// Procedural enemy-grid construction.
///
/// The grid shape is a pure function of the wave number; only the per-cell
/// kind roll uses the injected RNG.
use rand::Rng;

use crate::entities::{Enemy, EnemyKind, GameSession, TOTAL_WAVES};

const MAX_COLS: u32 = 10;
const MAX_ROWS: u32 = 5;
const COL_PITCH: f32 = 48.0;
const ROW_PITCH: f32 = 36.0;
const TOP_OFFSET: f32 = 60.0;

const FURBALL_CHANCE: f64 = 0.25;
const FURBALL_FROM_WAVE: u32 = 2;
const TICK_FROM_WAVE: u32 = 3;

pub fn cols(wave: u32) -> u32 {
    (6 + wave / 3).min(MAX_COLS)
}

pub fn rows(wave: u32) -> u32 {
    (2 + wave / 2).min(MAX_ROWS)
}

/// Horizontal extent, in world units, of the widest grid any wave spawns:
/// one column pitch per column, so each edge enemy keeps half a cell.
pub fn max_grid_width() -> f32 {
    let widest = (1..=TOTAL_WAVES).map(cols).max().unwrap_or(1);
    widest as f32 * COL_PITCH
}

/// Spawn row of the lowest enemy of the tallest grid any wave spawns.
pub fn max_grid_bottom() -> f32 {
    let tallest = (1..=TOTAL_WAVES).map(rows).max().unwrap_or(1);
    TOP_OFFSET + (tallest - 1) as f32 * ROW_PITCH
}

/// Probability that a row-0 cell holds a Tick on `wave`.
pub fn tick_chance(wave: u32) -> f64 {
    (0.15 + 0.03 * f64::from(wave)).min(1.0)
}

/// Kinds that may appear on `wave`, weakest first.
pub fn eligible_kinds(wave: u32) -> Vec<EnemyKind> {
    let mut kinds = vec![EnemyKind::Flea];
    if wave >= FURBALL_FROM_WAVE {
        kinds.push(EnemyKind::Furball);
    }
    if wave >= TICK_FROM_WAVE {
        kinds.push(EnemyKind::Tick);
    }
    kinds
}

pub fn base_speed(kind: EnemyKind, wave: u32) -> f32 {
    kind.stats().speed * (1.0 + 0.08 * wave as f32)
}

fn pick_kind(row: u32, wave: u32, rng: &mut impl Rng) -> EnemyKind {
    if row == 0 && wave >= TICK_FROM_WAVE && rng.gen_bool(tick_chance(wave)) {
        EnemyKind::Tick
    } else if wave >= FURBALL_FROM_WAVE && rng.gen_bool(FURBALL_CHANCE) {
        EnemyKind::Furball
    } else {
        EnemyKind::Flea
    }
}

/// Build the enemy grid for `wave`, horizontally centred on a playfield of
/// the given width.
pub fn build_wave(wave: u32, width: f32, rng: &mut impl Rng) -> Vec<Enemy> {
    let cols = cols(wave);
    let rows = rows(wave);
    let grid_width = (cols - 1) as f32 * COL_PITCH;
    let left = (width - grid_width) / 2.0;

    let mut enemies = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let kind = pick_kind(row, wave, rng);
            enemies.push(Enemy::new(
                kind,
                left + col as f32 * COL_PITCH,
                TOP_OFFSET + row as f32 * ROW_PITCH,
                base_speed(kind, wave),
            ));
        }
    }
    enemies
}

/// Replace the session's enemies with the grid for its current wave and
/// arm the wave-local timers.
pub fn spawn_wave(session: &mut GameSession, rng: &mut impl Rng) {
    session.enemies = build_wave(session.wave, session.width, rng);
    session.bullets.clear();
    session.mud.clear();
    session.powerups.clear();
    session.swarm_direction = 1.0;
    session.mud_timer = 0.0;
    session.wave_perfect = true;
    session.wave_started = true;
}

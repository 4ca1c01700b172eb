/// Kill-streak multiplier and the chargeable special ability.
use rand::Rng;
use tracing::debug;

use crate::compute::{burst, clear_enemies_where, GameEvent};
use crate::entities::{GameSession, C_SPARK, SPECIAL_COST};

/// Seconds without a kill before the combo decays.
pub const COMBO_WINDOW: f32 = 5.0;
const SPECIAL_BURST_PARTICLES: usize = 60;

/// Multiplier as a step function of the streak length.
pub fn multiplier_for(count: u32) -> u32 {
    if count >= 20 {
        3
    } else if count >= 10 {
        2
    } else {
        1
    }
}

/// Register one kill: extend the streak and refresh the decay window.
pub fn advance(session: &mut GameSession) {
    session.combo_count += 1;
    session.combo_multiplier = multiplier_for(session.combo_count);
    session.combo_timer = COMBO_WINDOW;
}

/// Reset the streak to `{0, 1}`.
pub fn break_combo(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    if session.combo_count > 0 {
        debug!(count = session.combo_count, "combo broken");
        events.push(GameEvent::ComboBroken {
            count: session.combo_count,
        });
    }
    session.combo_count = 0;
    session.combo_multiplier = 1;
    session.combo_timer = 0.0;
}

pub fn decay(session: &mut GameSession, dt: f32, events: &mut Vec<GameEvent>) {
    if session.combo_count == 0 {
        return;
    }
    session.combo_timer -= dt;
    if session.combo_timer <= 0.0 {
        break_combo(session, events);
    }
}

pub fn special_ready(session: &GameSession) -> bool {
    session.special_charge >= SPECIAL_COST
}

/// Spend the full charge to wipe every enemy in the bottom half of the
/// playfield, each scored at base value. A no-op below the threshold.
/// Returns `true` if the ability fired.
pub fn fire_special(
    session: &mut GameSession,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    if !special_ready(session) {
        return false;
    }
    session.special_charge = 0;

    let midline = session.height / 2.0;
    let (cleared, points) = clear_enemies_where(session, |_, y| y > midline, rng);

    let (cx, cy) = (session.player.x, session.height * 0.75);
    burst(
        &mut session.particles,
        cx,
        cy,
        C_SPARK,
        SPECIAL_BURST_PARTICLES,
        320.0,
        rng,
    );
    debug!(cleared, points, "special fired");
    events.push(GameEvent::SpecialFired { cleared, points });
    true
}

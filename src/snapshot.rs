/// Read-only per-frame view handed to presenters.
use std::io;

use crate::entities::{
    Bullet, Enemy, EnemyKind, GameSession, GameStatus, MudDrop, Particle, Player, Powerup,
    PowerupKind, SPECIAL_COST, TOTAL_WAVES,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComboBadge {
    pub count: u32,
    pub multiplier: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerupIndicator {
    pub kind: PowerupKind,
    pub name: &'static str,
    pub icon: char,
    /// 1.0 when just collected, falling to 0.0 at expiry.
    pub remaining_fraction: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub highscore: u32,
    pub wave: u32,
    pub total_waves: u32,
    pub lives: u32,
    /// Present only while a streak is running.
    pub combo: Option<ComboBadge>,
    pub powerup: Option<PowerupIndicator>,
    pub special_charge: u32,
    pub special_cost: u32,
}

impl Hud {
    pub fn special_fraction(&self) -> f32 {
        self.special_charge as f32 / self.special_cost as f32
    }

    pub fn special_ready(&self) -> bool {
        self.special_charge >= self.special_cost
    }
}

/// End-of-session summary for the game-over and victory overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub score: u32,
    pub highscore: u32,
    pub new_best: bool,
    /// Kills per kind, in kind order; kinds never killed are omitted.
    pub kills: Vec<(EnemyKind, u32)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Start { highscore: u32 },
    WaveIntro { wave: u32, bonus: Option<u32> },
    GameOver(Summary),
    Victory(Summary),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub width: f32,
    pub height: f32,
    pub status: GameStatus,
    pub hud: Hud,
    pub overlay: Option<Overlay>,
    pub danger_line: f32,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub mud: Vec<MudDrop>,
    pub powerups: Vec<Powerup>,
    pub particles: Vec<Particle>,
}

impl FrameSnapshot {
    /// Copy everything a presenter needs out of the live session.
    pub fn capture(
        session: &GameSession,
        status: GameStatus,
        highscore: u32,
        overlay: Option<Overlay>,
    ) -> Self {
        let combo = (session.combo_count > 0).then(|| ComboBadge {
            count: session.combo_count,
            multiplier: session.combo_multiplier,
        });
        let powerup = session.active_powerup.map(|kind| PowerupIndicator {
            kind,
            name: kind.name(),
            icon: kind.icon(),
            remaining_fraction: kind
                .duration()
                .map(|total| (session.powerup_timer / total).clamp(0.0, 1.0))
                .unwrap_or(0.0),
        });
        FrameSnapshot {
            width: session.width,
            height: session.height,
            status,
            hud: Hud {
                score: session.score,
                highscore,
                wave: session.wave,
                total_waves: TOTAL_WAVES,
                lives: session.lives,
                combo,
                powerup,
                special_charge: session.special_charge,
                special_cost: SPECIAL_COST,
            },
            overlay,
            danger_line: session.danger_line(),
            player: session.player.clone(),
            bullets: session.bullets.clone(),
            enemies: session.enemies.clone(),
            mud: session.mud.clone(),
            powerups: session.powerups.clone(),
            particles: session.particles.clone(),
        }
    }
}

/// Builds the end-of-session summary from a finished session.
pub fn summarize(session: &GameSession, highscore: u32, new_best: bool) -> Summary {
    Summary {
        score: session.score,
        highscore,
        new_best,
        kills: session
            .kill_stats
            .iter()
            .map(|(kind, count)| (*kind, *count))
            .collect(),
    }
}

/// Anything that can show a frame. The simulation never calls back into it.
pub trait Presenter {
    fn present(&mut self, frame: &FrameSnapshot) -> io::Result<()>;
}


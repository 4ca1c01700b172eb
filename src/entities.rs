/// All game entity types and the per-kind stat tables. Pure data, no
/// per-frame logic.
use std::collections::BTreeMap;

// ── Session constants ─────────────────────────────────────────────────────────

/// Clearing this wave ends the session in victory.
pub const TOTAL_WAVES: u32 = 10;
pub const STARTING_LIVES: u32 = 3;
/// Charge needed (and consumed) by one special-ability activation.
pub const SPECIAL_COST: u32 = 500;
pub const PERFECT_WAVE_BONUS: u32 = 200;

/// Distance from the bottom edge to the player's fixed row.
const PLAYER_BOTTOM_OFFSET: f32 = 36.0;
/// Distance from the bottom edge to the danger line.
pub const DANGER_LINE_OFFSET: f32 = 70.0;
pub const PLAYER_SPEED: f32 = 320.0;
pub const PLAYER_HALF_WIDTH: f32 = 18.0;

// ── Colours ───────────────────────────────────────────────────────────────────

/// Plain RGB triple; presenters map it onto whatever their surface supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const C_PLAYER: Rgb = Rgb::new(120, 200, 255);
pub const C_BULLET: Rgb = Rgb::new(160, 240, 255);
pub const C_MUD: Rgb = Rgb::new(120, 80, 40);
pub const C_SPARK: Rgb = Rgb::new(255, 240, 160);

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnemyKind {
    Flea,
    Furball,
    Tick,
}

/// Static per-kind data. `speed` is the wave-1 horizontal speed before the
/// per-wave multiplier is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub hp: u32,
    pub points: u32,
    pub speed: f32,
    pub color: Rgb,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Flea, EnemyKind::Furball, EnemyKind::Tick];

    pub const fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Flea => EnemyStats {
                hp: 1,
                points: 10,
                speed: 40.0,
                color: Rgb::new(214, 170, 110),
            },
            EnemyKind::Furball => EnemyStats {
                hp: 1,
                points: 15,
                speed: 55.0,
                color: Rgb::new(180, 160, 210),
            },
            EnemyKind::Tick => EnemyStats {
                hp: 2,
                points: 25,
                speed: 30.0,
                color: Rgb::new(170, 40, 50),
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EnemyKind::Flea => "Flea",
            EnemyKind::Furball => "Furball",
            EnemyKind::Tick => "Tick",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerupKind {
    /// 3-bullet spread and a wider hit radius while it lasts.
    Shampoo,
    /// Instantly clears the enemy row closest to the bottom.
    Towel,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 2] = [PowerupKind::Shampoo, PowerupKind::Towel];

    pub const fn name(self) -> &'static str {
        match self {
            PowerupKind::Shampoo => "Shampoo",
            PowerupKind::Towel => "Towel",
        }
    }

    pub const fn icon(self) -> char {
        match self {
            PowerupKind::Shampoo => '§',
            PowerupKind::Towel => '≡',
        }
    }

    pub const fn color(self) -> Rgb {
        match self {
            PowerupKind::Shampoo => Rgb::new(120, 230, 200),
            PowerupKind::Towel => Rgb::new(250, 250, 250),
        }
    }

    /// Seconds the effect lasts; `None` for one-shot powerups.
    pub const fn duration(self) -> Option<f32> {
        match self {
            PowerupKind::Shampoo => Some(8.0),
            PowerupKind::Towel => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    WaveIntro,
    Playing,
    GameOver,
    Victory,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    /// Fixed row; never changes during a session.
    pub y: f32,
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub hp: u32,
    pub base_speed: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32, base_speed: f32) -> Self {
        Self {
            kind,
            x,
            y,
            hp: kind.stats().hp,
            base_speed,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MudDrop {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Powerup {
    pub kind: PowerupKind,
    pub x: f32,
    pub y: f32,
}

/// Cosmetic only; nothing in the simulation reads particles back.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Remaining lifetime in seconds.
    pub life: f32,
    pub color: Rgb,
    pub size: f32,
}

pub type KillStats = BTreeMap<EnemyKind, u32>;

// ── Master session state ──────────────────────────────────────────────────────

/// The single live game session. Every subsystem receives it explicitly;
/// none keeps hidden state of its own.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub mud: Vec<MudDrop>,
    pub powerups: Vec<Powerup>,
    pub particles: Vec<Particle>,

    pub score: u32,
    pub wave: u32,
    pub lives: u32,
    pub combo_count: u32,
    pub combo_multiplier: u32,
    /// Seconds left before the combo decays.
    pub combo_timer: f32,
    pub special_charge: u32,
    pub active_powerup: Option<PowerupKind>,
    /// Seconds left on `active_powerup`.
    pub powerup_timer: f32,
    pub wave_perfect: bool,
    pub kill_stats: KillStats,

    /// +1.0 moving right, -1.0 moving left.
    pub swarm_direction: f32,
    pub mud_timer: f32,
    pub fire_cooldown: f32,
    /// Set once the wave's grid is on screen; mud waits for it.
    pub wave_started: bool,

    pub width: f32,
    pub height: f32,
}

impl GameSession {
    /// A fresh wave-1 session on a `width` × `height` playfield.
    pub fn new(width: f32, height: f32) -> Self {
        GameSession {
            player: Player {
                x: width / 2.0,
                y: height - PLAYER_BOTTOM_OFFSET,
                speed: PLAYER_SPEED,
            },
            bullets: Vec::new(),
            enemies: Vec::new(),
            mud: Vec::new(),
            powerups: Vec::new(),
            particles: Vec::new(),
            score: 0,
            wave: 1,
            lives: STARTING_LIVES,
            combo_count: 0,
            combo_multiplier: 1,
            combo_timer: 0.0,
            special_charge: 0,
            active_powerup: None,
            powerup_timer: 0.0,
            wave_perfect: true,
            kill_stats: KillStats::new(),
            swarm_direction: 1.0,
            mud_timer: 0.0,
            fire_cooldown: 0.0,
            wave_started: false,
            width,
            height,
        }
    }

    /// Clears every collection, counter and timer; keeps the playfield size.
    pub fn reset(&mut self) {
        *self = GameSession::new(self.width, self.height);
    }

    pub fn danger_line(&self) -> f32 {
        self.height - DANGER_LINE_OFFSET
    }

    pub fn is_defeated(&self) -> bool {
        self.lives == 0
    }

    /// Removes one life and spoils the current wave's perfect bonus.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.wave_perfect = false;
    }

    pub fn add_special_charge(&mut self, amount: u32) {
        self.special_charge = self.special_charge.saturating_add(amount).min(SPECIAL_COST);
    }

    pub fn tally_kill(&mut self, kind: EnemyKind) {
        *self.kill_stats.entry(kind).or_insert(0) += 1;
    }

    pub fn total_kills(&self) -> u32 {
        self.kill_stats.values().sum()
    }
}

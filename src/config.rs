/// Runtime configuration: an optional TOML file, every field defaulted.
///
/// ```toml
/// [playfield]
/// width = 600.0
/// height = 480.0
///
/// [gameplay]
/// powerup_chance_per_sec = 0.12
/// ```
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::compute::SWARM_MARGIN;
use crate::entities::{DANGER_LINE_OFFSET, TOTAL_WAVES};
use crate::error::ConfigError;
use crate::waves;

/// Simulation tunables handed to the state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    pub width: f32,
    pub height: f32,
    /// Pause between a cleared wave and the next one.
    pub wave_intro_secs: f32,
    pub powerup_chance_per_sec: f64,
    pub starting_wave: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 480.0,
            wave_intro_secs: 2.0,
            powerup_chance_per_sec: 0.12,
            starting_wave: 1,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub playfield: PlayfieldConfig,
    pub clock: ClockConfig,
    pub gameplay: GameplayConfig,
    pub storage: StorageConfig,
    pub audio: AudioConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlayfieldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        let tuning = Tuning::default();
        Self {
            width: tuning.width,
            height: tuning.height,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    /// Display cadence of the host loop.
    pub frame_ms: u64,
    /// Upper bound on a single tick's delta.
    pub max_delta_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            max_delta_ms: 50,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GameplayConfig {
    pub wave_intro_secs: f32,
    pub powerup_chance_per_sec: f64,
    pub starting_wave: u32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        let tuning = Tuning::default();
        Self {
            wave_intro_secs: tuning.wave_intro_secs,
            powerup_chance_per_sec: tuning.powerup_chance_per_sec,
            starting_wave: tuning.starting_wave,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory for the key-value files; the platform data dir when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Ring the terminal bell for the loudest events.
    pub bell: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Log file; logging is off when unset.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        let min_width = waves::max_grid_width() + 2.0 * SWARM_MARGIN;
        if !(self.playfield.width >= min_width) {
            return invalid(
                "playfield.width",
                &format!("must be at least {min_width} to fit the widest wave"),
            );
        }
        let min_danger_line = waves::max_grid_bottom();
        if !(self.playfield.height - DANGER_LINE_OFFSET > min_danger_line) {
            return invalid(
                "playfield.height",
                &format!(
                    "must exceed {} so every wave spawns above the danger line",
                    min_danger_line + DANGER_LINE_OFFSET
                ),
            );
        }
        if self.clock.frame_ms == 0 {
            return invalid("clock.frame_ms", "must be positive");
        }
        if self.clock.max_delta_ms == 0 {
            return invalid("clock.max_delta_ms", "must be positive");
        }
        if !(self.gameplay.wave_intro_secs >= 0.0) {
            return invalid("gameplay.wave_intro_secs", "must not be negative");
        }
        if !(0.0..=1.0).contains(&self.gameplay.powerup_chance_per_sec) {
            return invalid("gameplay.powerup_chance_per_sec", "must be within [0, 1]");
        }
        if !(1..=TOTAL_WAVES).contains(&self.gameplay.starting_wave) {
            return invalid("gameplay.starting_wave", "must be a valid wave number");
        }
        Ok(())
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            width: self.playfield.width,
            height: self.playfield.height,
            wave_intro_secs: self.gameplay.wave_intro_secs,
            powerup_chance_per_sec: self.gameplay.powerup_chance_per_sec,
            starting_wave: self.gameplay.starting_wave,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.clock.frame_ms)
    }

    pub fn max_delta(&self) -> Duration {
        Duration::from_millis(self.clock.max_delta_ms)
    }
}

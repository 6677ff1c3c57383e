use serde::{Deserialize, Serialize};

use crate::physics::PhysicsConfig;

/// Frames per second the game logic is tuned for.
pub const FPS: u32 = 60;
/// Default session seed when none is configured.
pub const DEFAULT_SEED: u64 = 0x5EED_C0DE;
/// Longest input delay a room may be configured with (ten seconds).
pub const MAX_DELAY_FRAMES: usize = 10 * FPS as usize;

/// A configuration value that fails validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid config value `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Durations, all in ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub fps: u32,
    /// How long the between-room message stays up.
    pub transition_ticks: u32,
    /// Freeze after a fall before play resumes.
    pub death_cooldown_ticks: u32,
    /// Active play in one room before the bonus fruit appears.
    pub bonus_dwell_ticks: u32,
    pub hint_delay_ticks: u32,
    pub narrator_ticks: u32,
    pub dialogue_line_ticks: u32,
    pub fade_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fps: FPS,
            transition_ticks: 2 * FPS,
            death_cooldown_ticks: 30,
            bonus_dwell_ticks: 120 * FPS,
            hint_delay_ticks: 5 * FPS,
            narrator_ticks: 2 * FPS,
            dialogue_line_ticks: 5 * FPS,
            fade_ticks: FPS,
        }
    }
}

/// Which composite policy the final room uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalRoomPolicy {
    /// Four screen columns, each with its own controls.
    Zones,
    /// The whole room cycles through every effect over time.
    Rotation,
}

/// Momentum tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub max: f32,
    pub increment: f32,
    pub friction: f32,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            max: 15.0,
            increment: 0.5,
            friction: 0.1,
        }
    }
}

/// Parameters for the per-room input transforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub delay_frames: usize,
    pub composite_delay_frames: usize,
    pub randomize_interval: u32,
    pub momentum: MomentumConfig,
    pub zone_momentum_max: f32,
    pub rotation_ticks: u32,
    pub heavy_gravity_scale: f32,
    pub scatter_interval: u32,
    pub final_room_policy: FinalRoomPolicy,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            delay_frames: 30,
            composite_delay_frames: 15,
            randomize_interval: 10 * FPS,
            momentum: MomentumConfig::default(),
            zone_momentum_max: 12.0,
            rotation_ticks: 3 * FPS,
            heavy_gravity_scale: 2.0,
            scatter_interval: 4 * FPS,
            final_room_policy: FinalRoomPolicy::Zones,
        }
    }
}

/// Music tracks, one per room, as logical asset paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub tracks: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            tracks: (1..=7).map(|i| format!("music/room{i}.ogg")).collect(),
        }
    }
}

/// Top-level game configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub transforms: TransformConfig,
    pub audio: AudioConfig,
}

impl GameConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("CONTROLSHIFT_CONFIG")
            .unwrap_or_else(|_| "config/controlshift.toml".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<GameConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path, "Loaded game configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    GameConfig::default()
                },
            },
            Err(_) => GameConfig::default(),
        }
    }

    pub fn session_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        positive("physics.gravity", p.gravity)?;
        non_negative("physics.player_speed", p.player_speed)?;
        if !(p.jump_strength.is_finite() && p.jump_strength < 0.0) {
            return Err(ConfigError::new(
                "physics.jump_strength",
                "must be negative (screen y grows downward)",
            ));
        }
        non_negative("physics.collision_tolerance", p.collision_tolerance)?;
        positive("physics.player_width", p.player_width)?;
        positive("physics.player_height", p.player_height)?;
        positive("physics.screen_width", p.screen_width)?;
        positive("physics.screen_height", p.screen_height)?;
        if p.screen_width <= p.player_width || p.screen_height <= p.player_height {
            return Err(ConfigError::new(
                "physics.screen_width",
                "screen must be larger than the player",
            ));
        }
        if self.timing.fps == 0 {
            return Err(ConfigError::new("timing.fps", "must be > 0"));
        }

        let t = &self.transforms;
        for (field, frames) in [
            ("transforms.delay_frames", t.delay_frames),
            ("transforms.composite_delay_frames", t.composite_delay_frames),
        ] {
            if frames > MAX_DELAY_FRAMES {
                return Err(ConfigError::new(
                    field,
                    format!("must be <= {MAX_DELAY_FRAMES}, got {frames}"),
                ));
            }
        }
        if t.randomize_interval == 0 {
            return Err(ConfigError::new("transforms.randomize_interval", "must be > 0"));
        }
        if t.rotation_ticks == 0 {
            return Err(ConfigError::new("transforms.rotation_ticks", "must be > 0"));
        }
        if t.scatter_interval == 0 {
            return Err(ConfigError::new("transforms.scatter_interval", "must be > 0"));
        }
        positive("transforms.momentum.max", t.momentum.max)?;
        non_negative("transforms.momentum.increment", t.momentum.increment)?;
        non_negative("transforms.momentum.friction", t.momentum.friction)?;
        positive("transforms.zone_momentum_max", t.zone_momentum_max)?;
        positive("transforms.heavy_gravity_scale", t.heavy_gravity_scale)?;
        Ok(())
    }
}

/// Finite and strictly greater than zero. NaN fails.
fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("must be a finite value > 0, got {value}")))
    }
}

/// Finite and zero or greater. NaN fails.
fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("must be a finite value >= 0, got {value}")))
    }
}

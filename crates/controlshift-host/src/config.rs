use serde::{Deserialize, Serialize};

use controlshift_rooms::config::GameConfig;

use crate::error::HostError;

/// Host configuration, loaded from `controlshift.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub tick_rate_hz: u32,
    /// Stop after this many ticks even if the game is still running.
    pub max_ticks: Option<u64>,
    /// Directory music tracks are resolved against.
    pub asset_root: String,
    /// Game configuration file. Falls back to `CONTROLSHIFT_CONFIG` when unset.
    pub game_config: Option<String>,
    /// Input script to replay instead of live input.
    pub script: Option<String>,
    /// Overrides the seed from the game configuration.
    pub seed: Option<u64>,
    /// Print the session report as JSON on exit.
    pub report: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            max_ticks: None,
            asset_root: "assets".to_string(),
            game_config: None,
            script: None,
            seed: None,
            report: true,
        }
    }
}

impl HostConfig {
    /// Load from `CONTROLSHIFT_HOST_CONFIG` (default `controlshift.toml`) if it
    /// exists, then apply env var overrides.
    pub fn load() -> Self {
        let path = std::env::var("CONTROLSHIFT_HOST_CONFIG")
            .unwrap_or_else(|_| "controlshift.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<HostConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path, "Loaded host configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    HostConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                HostConfig::default()
            },
        };
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("CONTROLSHIFT_TICK_RATE")
            && let Ok(n) = val.parse::<u32>()
        {
            self.tick_rate_hz = n;
        }
        if let Ok(val) = std::env::var("CONTROLSHIFT_MAX_TICKS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.max_ticks = Some(n);
        }
        if let Ok(root) = std::env::var("CONTROLSHIFT_ASSET_ROOT")
            && !root.is_empty()
        {
            self.asset_root = root;
        }
        if let Ok(script) = std::env::var("CONTROLSHIFT_SCRIPT")
            && !script.is_empty()
        {
            self.script = Some(script);
        }
        if let Ok(val) = std::env::var("CONTROLSHIFT_SEED")
            && let Ok(seed) = val.parse::<u64>()
        {
            self.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<(), HostError> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err(HostError::InvalidConfig {
                field: "tick_rate_hz",
                reason: format!("must be in 1..=1000, got {}", self.tick_rate_hz),
            });
        }
        if self.max_ticks == Some(0) {
            return Err(HostError::InvalidConfig {
                field: "max_ticks",
                reason: "must be > 0 when set".to_string(),
            });
        }
        if self.asset_root.is_empty() {
            return Err(HostError::InvalidConfig {
                field: "asset_root",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the game configuration with the seed override applied.
    ///
    /// A file named explicitly in `game_config` must exist and parse.
    pub fn game_config(&self) -> Result<GameConfig, HostError> {
        let mut game = match &self.game_config {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| HostError::ConfigRead {
                        path: path.clone(),
                        source,
                    })?;
                toml::from_str::<GameConfig>(&content).map_err(|source| {
                    HostError::ConfigParse {
                        path: path.clone(),
                        source,
                    }
                })?
            },
            None => GameConfig::load(),
        };
        if let Some(seed) = self.seed {
            game.seed = Some(seed);
        }
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HostConfig::default();
        assert_eq!(cfg.tick_rate_hz, 60);
        assert_eq!(cfg.asset_root, "assets");
        assert!(cfg.max_ticks.is_none());
        assert!(cfg.report);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml() {
        let cfg: HostConfig = toml::from_str("max_ticks = 300\nseed = 9\n").unwrap();
        assert_eq!(cfg.max_ticks, Some(300));
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.tick_rate_hz, 60);
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = HostConfig {
            tick_rate_hz: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(HostError::InvalidConfig {
                field: "tick_rate_hz",
                ..
            })
        ));

        let cfg = HostConfig {
            max_ticks: Some(0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn seed_override_wins() {
        let cfg = HostConfig {
            game_config: Some("/nonexistent/controlshift-game.toml".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            cfg.game_config(),
            Err(HostError::ConfigRead { .. })
        ));

        let dir = std::env::temp_dir().join(format!("controlshift-host-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("game.toml");
        std::fs::write(&path, "seed = 5\n[timing]\nfps = 30\n").unwrap();
        let cfg = HostConfig {
            game_config: Some(path.to_string_lossy().into_owned()),
            seed: Some(77),
            ..Default::default()
        };
        let game = cfg.game_config().unwrap();
        assert_eq!(game.seed, Some(77));
        assert_eq!(game.timing.fps, 30);
        std::fs::remove_dir_all(&dir).ok();
    }
}

//! Configuration for the casino core.
//!
//! Defaults work out of the box; a TOML file and `STARS_*` environment
//! variables can override them. Everything is validated before use.

use crate::errors::{CasinoResult, ConfigurationError};
use crate::games::GameType;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CasinoConfig {
    pub storage: StorageConfig,
    pub balances: BalanceConfig,
    pub limits: BetLimits,
    pub sessions: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./casino_data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Stars granted on first interaction
    pub start_balance: u64,
    /// Hard upper bound on any balance, guards against overflow
    pub ceiling: u64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            start_balance: 1_000,
            ceiling: 100_000_000,
        }
    }
}

/// Inclusive bet range for one game
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BetRange {
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BetLimits {
    pub roulette: BetRange,
    pub blackjack: BetRange,
    pub poker: BetRange,
    pub chess: BetRange,
}

impl Default for BetLimits {
    fn default() -> Self {
        // Table limits shown in the bet menus
        Self {
            roulette: BetRange { min: 5, max: 100 },
            blackjack: BetRange { min: 5, max: 50 },
            poker: BetRange { min: 10, max: 100 },
            chess: BetRange { min: 5, max: 100 },
        }
    }
}

impl BetLimits {
    pub fn for_game(&self, game: GameType) -> BetRange {
        match game {
            GameType::Roulette => self.roulette,
            GameType::Blackjack => self.blackjack,
            GameType::Poker => self.poker,
            GameType::Chess => self.chess,
            // Purchases are not bets; give them the widest range
            GameType::Purchase => BetRange {
                min: 1,
                max: u64::MAX,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle TTL before a session is swept and its stake forfeited
    pub ttl_secs: u64,
    /// How often the reaper sweeps
    pub reaper_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 600,
            reaper_interval_secs: 60,
        }
    }
}

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> CasinoResult<CasinoConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            CasinoConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> CasinoResult<CasinoConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut CasinoConfig) -> CasinoResult<()> {
        if let Ok(dir) = env::var("STARS_DATA_DIR") {
            config.storage.data_dir = dir;
        }
        if let Ok(balance) = env::var("STARS_START_BALANCE") {
            config.balances.start_balance =
                balance.parse().map_err(|_| ConfigurationError::InvalidValue {
                    field: "STARS_START_BALANCE".to_string(),
                    value: balance,
                    reason: "Invalid balance".to_string(),
                })?;
        }
        if let Ok(ttl) = env::var("STARS_SESSION_TTL_SECS") {
            config.sessions.ttl_secs =
                ttl.parse().map_err(|_| ConfigurationError::InvalidValue {
                    field: "STARS_SESSION_TTL_SECS".to_string(),
                    value: ttl,
                    reason: "Invalid TTL".to_string(),
                })?;
        }

        Ok(())
    }

    fn validate(&self, config: &CasinoConfig) -> CasinoResult<()> {
        if config.balances.ceiling < config.balances.start_balance {
            return Err(ConfigurationError::InvalidValue {
                field: "balances.ceiling".to_string(),
                value: config.balances.ceiling.to_string(),
                reason: "ceiling is below the start balance".to_string(),
            }
            .into());
        }

        for (name, range) in [
            ("roulette", config.limits.roulette),
            ("blackjack", config.limits.blackjack),
            ("poker", config.limits.poker),
            ("chess", config.limits.chess),
        ] {
            if range.min == 0 || range.min > range.max {
                return Err(ConfigurationError::InvalidValue {
                    field: format!("limits.{}", name),
                    value: format!("{}..{}", range.min, range.max),
                    reason: "min must be positive and not above max".to_string(),
                }
                .into());
            }
        }

        if config.sessions.ttl_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "sessions.ttl_secs".to_string(),
                value: "0".to_string(),
                reason: "TTL must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.balances.start_balance, 1_000);
        assert_eq!(config.limits.for_game(GameType::Poker).min, 10);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let mut config = CasinoConfig::default();
        config.limits.blackjack = BetRange { min: 0, max: 50 };

        let loader = ConfigLoader::new();
        assert!(loader.validate(&config).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CasinoConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: CasinoConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.sessions.ttl_secs, config.sessions.ttl_secs);
    }
}

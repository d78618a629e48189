use std::time::Duration;

use hexfall_core::session::InvalidTimer;
use hexfall_game::config::HexfallConfig;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTickInterval,
    NoBots,
    ZeroRounds,
    InvalidTimer(InvalidTimer),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroTickInterval => write!(f, "tick_interval_ms must be > 0"),
            Self::NoBots => write!(f, "bots must be > 0"),
            Self::ZeroRounds => write!(f, "rounds must be > 0"),
            Self::InvalidTimer(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Headless host configuration, loaded from `hexfall-host.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Wall-clock length of one stage tick.
    pub tick_interval_ms: u64,
    /// Simulated players in the bot session.
    pub bots: usize,
    /// Rounds to play before shutting down.
    pub rounds: u32,
    /// Seconds into a round before bots start falling.
    pub bot_fall_after_secs: u64,
    /// Fixed RNG seed for spawn points and tile shades.
    pub seed: Option<u64>,
    pub game: HexfallConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            bots: 3,
            rounds: 1,
            bot_fall_after_secs: 4,
            seed: None,
            game: HexfallConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.bots == 0 {
            return Err(ConfigError::NoBots);
        }
        if self.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        self.game.timers.validate().map_err(ConfigError::InvalidTimer)
    }

    /// Load config from `hexfall-host.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("hexfall-host.toml") {
            Ok(content) => match toml::from_str::<HostConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from hexfall-host.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse hexfall-host.toml: {e}, using defaults");
                    HostConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No hexfall-host.toml found, using defaults");
                HostConfig {
                    game: HexfallConfig::load(),
                    ..HostConfig::default()
                }
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HEXFALL_TICK_MS")
            && let Ok(ms) = val.parse()
        {
            self.tick_interval_ms = ms;
        }
        if let Some(val) = var("HEXFALL_BOTS")
            && let Ok(n) = val.parse()
        {
            self.bots = n;
        }
        if let Some(val) = var("HEXFALL_ROUNDS")
            && let Ok(n) = val.parse()
        {
            self.rounds = n;
        }
        if let Some(val) = var("HEXFALL_SEED")
            && let Ok(seed) = val.parse()
        {
            self.seed = Some(seed);
        }
    }
}

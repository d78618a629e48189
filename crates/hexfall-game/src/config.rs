use hexfall_core::session::StageTimers;
use serde::{Deserialize, Serialize};

/// Base color of each arena floor, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl FloorColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
        }
    }
}

/// Arena geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Floor colors, one entry per floor. The number of floors is the length.
    pub floors: Vec<FloorColor>,
    pub rows: u8,
    pub columns: u8,
    /// Horizontal distance between neighbouring hexagons.
    pub x_spacing: f32,
    /// Distance between rows.
    pub z_spacing: f32,
    /// Vertical distance between floors.
    pub floor_height: f32,
    /// Height above the top floor at which players spawn.
    pub spawn_height: f32,
    /// Tile brightness is drawn uniformly from this range.
    pub shade_min: f32,
    pub shade_max: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            floors: vec![
                FloorColor::Red,
                FloorColor::Blue,
                FloorColor::Green,
                FloorColor::Yellow,
                FloorColor::Purple,
            ],
            rows: 7,
            columns: 7,
            x_spacing: 2.25,
            z_spacing: 1.95,
            floor_height: 10.0,
            spawn_height: 2.0,
            shade_min: 0.5,
            shade_max: 1.2,
        }
    }
}

/// Character movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Horizontal speed (units/s).
    pub speed: f32,
    /// Yaw speed while turning (rad/s).
    pub rotation_speed: f32,
    /// Vertical velocity applied on jump.
    pub jump_force: f32,
    /// Joystick axis values within this magnitude are ignored.
    pub joystick_dead_zone: f32,
    /// Vertical speed above which the body counts as airborne.
    pub airborne_threshold: f32,
    /// Upward speed that selects the jump-up clip.
    pub jump_up_speed: f32,
    /// Downward speed that selects the fall clip.
    pub fall_speed: f32,
    /// Horizontal speed (|vx| + |vz|) that selects the run clip.
    pub run_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 4.2,
            rotation_speed: 2.5,
            jump_force: 8.0,
            joystick_dead_zone: 0.1,
            airborne_threshold: 1.0,
            jump_up_speed: 2.0,
            fall_speed: 5.0,
            run_speed: 1.0,
        }
    }
}

/// Destructible tile tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Delay between a hit and the tile disappearing (ms).
    pub disable_after_ms: u32,
    /// Opacity lost per second while fading.
    pub fade_rate: f32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            disable_after_ms: 600,
            fade_rate: 1.2,
        }
    }
}

/// Data-driven configuration for a Hexfall match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexfallConfig {
    pub arena: ArenaConfig,
    pub movement: MovementConfig,
    pub tiles: TileConfig,
    pub timers: StageTimers,
}

impl HexfallConfig {
    /// Load config from `HEXFALL_CONFIG` or `config/hexfall.toml`, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("HEXFALL_CONFIG")
            && let Some(config) = Self::read(&path)
        {
            return config;
        }
        Self::read("config/hexfall.toml").unwrap_or_default()
    }

    /// Parse a TOML document. Stage timers that would never reach zero are
    /// replaced by the defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config = toml::from_str::<Self>(contents)?;
        if let Err(e) = config.timers.validate() {
            tracing::warn!(error = %e, "Invalid stage timers, using defaults");
            config.timers = StageTimers::default();
        }
        Ok(config)
    }

    fn read(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match Self::from_toml(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path, error = %e, "Ignoring malformed config file");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_arena_layout() {
        let config = HexfallConfig::default();
        assert_eq!(config.arena.floors.len(), 5);
        assert_eq!(config.arena.rows, 7);
        assert_eq!(config.arena.columns, 7);
        assert_eq!(config.tiles.disable_after_ms, 600);
        assert!((config.arena.floor_height - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: HexfallConfig = toml::from_str(
            r#"
            [movement]
            speed = 6.0

            [timers]
            countdown = 5
            "#,
        )
        .unwrap();
        assert!((config.movement.speed - 6.0).abs() < f32::EPSILON);
        assert!((config.movement.jump_force - 8.0).abs() < f32::EPSILON);
        assert_eq!(config.timers.countdown, 5);
        assert_eq!(config.timers.winner, 5);
        assert_eq!(config.arena, ArenaConfig::default());
    }

    #[test]
    fn stalled_timers_fall_back_to_defaults() {
        let config = HexfallConfig::from_toml(
            r#"
            [movement]
            speed = 6.0

            [timers]
            countdown = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.timers, StageTimers::default());
        assert!((config.movement.speed - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn floors_parse_from_names() {
        let config: HexfallConfig = toml::from_str(
            r#"
            [arena]
            floors = ["purple", "green"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.arena.floors,
            vec![FloorColor::Purple, FloorColor::Green]
        );
    }
}

use glam::Vec3;
use hexfall_core::tile::TileKey;
use rand::Rng;

use crate::config::{ArenaConfig, FloorColor};

/// Static placement of one hexagon.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayout {
    pub key: TileKey,
    pub position: Vec3,
    pub color: FloorColor,
    /// Brightness multiplier applied to the floor color.
    pub shade: f32,
}

/// The multi-floor hexagon arena. Immutable once generated.
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    tiles: Vec<TileLayout>,
}

impl Arena {
    /// Lay out every floor, row and column, drawing a brightness shade per tile.
    pub fn generate(config: ArenaConfig, rng: &mut impl Rng) -> Self {
        let capacity = config.floors.len() * config.rows as usize * config.columns as usize;
        let mut tiles = Vec::with_capacity(capacity);
        for (floor, &color) in config.floors.iter().enumerate() {
            for row in 0..config.rows {
                for column in 0..config.columns {
                    let key = TileKey::new(floor as u8, row, column);
                    let shade = if config.shade_max > config.shade_min {
                        rng.random_range(config.shade_min..config.shade_max)
                    } else {
                        config.shade_min
                    };
                    tiles.push(TileLayout {
                        key,
                        position: tile_position(&config, key),
                        color,
                        shade,
                    });
                }
            }
        }
        tracing::debug!(tiles = tiles.len(), "Generated arena layout");
        Self { config, tiles }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn tiles(&self) -> &[TileLayout] {
        &self.tiles
    }

    pub fn tile(&self, key: TileKey) -> Option<&TileLayout> {
        self.tiles.iter().find(|t| t.key == key)
    }

    pub fn contains(&self, key: TileKey) -> bool {
        (key.floor as usize) < self.config.floors.len()
            && key.row < self.config.rows
            && key.column < self.config.columns
    }

    pub fn floor_count(&self) -> usize {
        self.config.floors.len()
    }

    /// Half extents of the grid on the x and z axes.
    pub fn half_extents(&self) -> (f32, f32) {
        let half_x = (self.config.columns.saturating_sub(1)) as f32 * self.config.x_spacing / 2.0;
        let half_z = (self.config.rows.saturating_sub(1)) as f32 * self.config.z_spacing / 2.0;
        (half_x, half_z)
    }

    /// Random spawn point above the top floor, within the grid's x/z bounds.
    pub fn random_spawn(&self, rng: &mut impl Rng) -> Vec3 {
        let (half_x, half_z) = self.half_extents();
        let x = if half_x > 0.0 {
            rng.random_range(-half_x..=half_x)
        } else {
            0.0
        };
        let z = if half_z > 0.0 {
            rng.random_range(-half_z..=half_z)
        } else {
            0.0
        };
        Vec3::new(x, self.config.spawn_height, z)
    }

    /// Y coordinate below which a body has fallen out of the arena.
    pub fn elimination_height(&self) -> f32 {
        -(self.config.floor_height * self.config.floors.len() as f32)
    }
}

/// World position of a tile. Odd rows are shifted by half a column and the
/// grid is centred on the origin in x/z.
pub fn tile_position(config: &ArenaConfig, key: TileKey) -> Vec3 {
    let origin_x = -((config.columns.saturating_sub(1)) as f32 / 2.0) * config.x_spacing;
    let origin_z = -((config.rows.saturating_sub(1)) as f32 / 2.0) * config.z_spacing;
    let row_offset = if key.row % 2 == 1 {
        config.x_spacing / 2.0
    } else {
        0.0
    };
    Vec3::new(
        origin_x + row_offset + key.column as f32 * config.x_spacing,
        -(key.floor as f32) * config.floor_height,
        origin_z + key.row as f32 * config.z_spacing,
    )
}

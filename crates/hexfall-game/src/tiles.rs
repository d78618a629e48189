use std::collections::BTreeMap;

use hexfall_core::net::messages::TileHitMsg;
use hexfall_core::tile::TileKey;

use crate::arena::Arena;
use crate::config::TileConfig;

/// Result of marking a tile as hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    FirstHit,
    AlreadyHit,
    UnknownTile,
}

/// Time since a tile's first hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum HitTimer {
    #[default]
    Untouched,
    /// Hit since the last update; the delay starts counting at the next one.
    Pending,
    Running(f32),
}

/// Runtime state of one destructible hexagon.
#[derive(Debug, Clone, PartialEq)]
pub struct TileState {
    timer: HitTimer,
    pub disabled: bool,
    pub opacity: f32,
}

impl Default for TileState {
    fn default() -> Self {
        Self {
            timer: HitTimer::Untouched,
            disabled: false,
            opacity: 1.0,
        }
    }
}

impl TileState {
    pub fn is_hit(&self) -> bool {
        self.timer != HitTimer::Untouched
    }

    /// Tiles collide and render until disabled.
    pub fn is_solid(&self) -> bool {
        !self.disabled
    }
}

/// Tracks hit and disabled flags for every tile in the arena.
///
/// `hit` goes false to true exactly once per round; `disabled` follows after
/// the configured delay and never reverts until [`TileBoard::reset`].
#[derive(Debug, Clone)]
pub struct TileBoard {
    tiles: BTreeMap<TileKey, TileState>,
    config: TileConfig,
}

impl TileBoard {
    pub fn new(arena: &Arena, config: TileConfig) -> Self {
        let tiles = arena
            .tiles()
            .iter()
            .map(|t| (t.key, TileState::default()))
            .collect();
        Self { tiles, config }
    }

    /// A collision by the local player. Returns the broadcast to send when
    /// this is the tile's first hit.
    pub fn local_hit(&mut self, key: TileKey) -> Option<TileHitMsg> {
        match self.mark_hit(key) {
            HitOutcome::FirstHit => Some(TileHitMsg { tile: key }),
            HitOutcome::AlreadyHit | HitOutcome::UnknownTile => None,
        }
    }

    /// A hit broadcast by another client. Never re-broadcast.
    pub fn apply_remote_hit(&mut self, key: TileKey) -> HitOutcome {
        self.mark_hit(key)
    }

    fn mark_hit(&mut self, key: TileKey) -> HitOutcome {
        let Some(tile) = self.tiles.get_mut(&key) else {
            tracing::debug!(tile = %key, "Ignoring hit on unknown tile");
            return HitOutcome::UnknownTile;
        };
        if tile.is_hit() {
            return HitOutcome::AlreadyHit;
        }
        tile.timer = HitTimer::Pending;
        HitOutcome::FirstHit
    }

    /// Advance fades by `dt` seconds. Returns tiles disabled during this step.
    ///
    /// A hit's delay counts from the first update after it, so a tile never
    /// disappears sooner than the configured delay after being hit.
    pub fn update(&mut self, dt: f32) -> Vec<TileKey> {
        let delay = self.config.disable_after_ms as f32 / 1000.0;
        let fade = (dt * self.config.fade_rate).clamp(0.0, 1.0);
        let mut disabled = Vec::new();
        for (key, tile) in &mut self.tiles {
            if tile.disabled {
                continue;
            }
            let elapsed = match tile.timer {
                HitTimer::Untouched => continue,
                HitTimer::Pending => 0.0,
                HitTimer::Running(elapsed) => elapsed + dt,
            };
            tile.timer = HitTimer::Running(elapsed);
            tile.opacity -= tile.opacity * fade;
            if elapsed >= delay {
                tile.disabled = true;
                disabled.push(*key);
            }
        }
        disabled
    }

    pub fn get(&self, key: TileKey) -> Option<&TileState> {
        self.tiles.get(&key)
    }

    pub fn is_hit(&self, key: TileKey) -> bool {
        self.tiles.get(&key).is_some_and(TileState::is_hit)
    }

    pub fn is_disabled(&self, key: TileKey) -> bool {
        self.tiles.get(&key).is_some_and(|t| t.disabled)
    }

    pub fn opacity(&self, key: TileKey) -> Option<f32> {
        self.tiles.get(&key).map(|t| t.opacity)
    }

    pub fn remaining(&self) -> usize {
        self.tiles.values().filter(|t| !t.disabled).count()
    }

    /// Restore every tile for a new round.
    pub fn reset(&mut self) {
        for tile in self.tiles.values_mut() {
            *tile = TileState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::ArenaConfig;

    fn board() -> TileBoard {
        let arena = Arena::generate(ArenaConfig::default(), &mut StdRng::seed_from_u64(1));
        TileBoard::new(&arena, TileConfig::default())
    }

    #[test]
    fn first_local_hit_broadcasts_once() {
        let mut board = board();
        let key = TileKey::new(0, 3, 3);
        assert_eq!(board.local_hit(key), Some(TileHitMsg { tile: key }));
        assert_eq!(board.local_hit(key), None);
        assert_eq!(board.apply_remote_hit(key), HitOutcome::AlreadyHit);
    }

    #[test]
    fn repeated_hits_do_not_restart_fade() {
        let mut board = board();
        let key = TileKey::new(1, 0, 0);
        board.apply_remote_hit(key);
        assert!(board.update(0.25).is_empty());
        assert!(board.update(0.25).is_empty());
        board.apply_remote_hit(key);
        assert!(board.update(0.25).is_empty());
        assert_eq!(board.update(0.25), vec![key]);
        assert!(board.is_disabled(key));
    }

    #[test]
    fn disables_after_600ms() {
        let mut board = board();
        let key = TileKey::new(2, 1, 1);
        board.local_hit(key);
        let mut disabled = Vec::new();
        // The first update starts the delay; four more reach 500 ms.
        for _ in 0..5 {
            disabled.extend(board.update(0.125));
        }
        assert!(disabled.is_empty());
        assert!(board.is_hit(key));
        disabled.extend(board.update(0.125));
        assert_eq!(disabled, vec![key]);
        assert_eq!(board.remaining(), 5 * 7 * 7 - 1);
    }

    #[test]
    fn hit_between_updates_gets_the_full_delay() {
        let mut board = board();
        let key = TileKey::new(3, 4, 4);
        board.update(0.25);
        board.local_hit(key);
        assert!(board.update(0.5).is_empty());
        assert!(board.update(0.5).is_empty());
        assert_eq!(board.update(0.125), vec![key]);
    }

    #[test]
    fn opacity_fades_only_while_hit() {
        let mut board = board();
        let hit = TileKey::new(0, 0, 0);
        let untouched = TileKey::new(0, 0, 1);
        board.local_hit(hit);
        board.update(0.1);
        let faded = board.opacity(hit).unwrap();
        assert!((faded - 0.88).abs() < 1e-5);
        assert!((board.opacity(untouched).unwrap() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_tiles_are_ignored() {
        let mut board = board();
        let key = TileKey::new(9, 9, 9);
        assert_eq!(board.apply_remote_hit(key), HitOutcome::UnknownTile);
        assert_eq!(board.local_hit(key), None);
        assert!(!board.is_hit(key));
    }

    #[test]
    fn reset_restores_every_tile() {
        let mut board = board();
        let key = TileKey::new(0, 2, 2);
        board.local_hit(key);
        board.update(1.0);
        board.reset();
        assert!(!board.is_hit(key));
        assert!(!board.is_disabled(key));
        assert_eq!(board.local_hit(key), Some(TileHitMsg { tile: key }));
    }
}

pub mod net;
pub mod player;
pub mod room;
pub mod session;
pub mod tile;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use glam::Vec3;

    use crate::player::{Player, PlayerColor, PlayerId, PlayerProfile};

    /// Create `n` test profiles named `Player1..=PlayerN`.
    pub fn make_profiles(n: usize) -> Vec<PlayerProfile> {
        (0..n)
            .map(|i| PlayerProfile::new(format!("Player{}", i + 1), PlayerColor::for_index(i)))
            .collect()
    }

    /// Create `n` test players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        make_profiles(n)
            .into_iter()
            .enumerate()
            .map(|(i, profile)| Player::new(i as PlayerId + 1, profile))
            .collect()
    }

    /// Deterministic spawn point for the n-th test player.
    pub fn spawn_point(index: usize) -> Vec3 {
        Vec3::new(index as f32, 2.0, -(index as f32))
    }
}

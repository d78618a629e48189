pub mod app;
pub mod audio;
pub mod camera;
pub mod controller;
pub mod input;
pub mod invite;
pub mod net_client;
pub mod ui;
#[cfg(target_family = "wasm")]
pub mod web;

use hexfall_core::player::{PlayerColor, PlayerProfile};

/// Profile for a player who has not picked a name yet.
pub fn guest_profile(rng: &mut fastrand::Rng) -> PlayerProfile {
    let name = format!("Guest{:04}", rng.u16(0..10_000));
    let color = PlayerColor::for_index(rng.usize(..PlayerColor::PALETTE.len()));
    PlayerProfile::new(name, color)
}

pub mod arena;
pub mod config;
pub mod movement;
pub mod podium;
pub mod stage;
pub mod tiles;

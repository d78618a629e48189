pub mod config;
pub mod ticker;

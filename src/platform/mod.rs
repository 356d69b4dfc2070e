// LogCorral - platform/mod.rs
//
// Platform integration: config directories, config.toml loading, and
// interactive confirmation.

pub mod config;
pub mod confirm;

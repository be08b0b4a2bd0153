pub mod config;
pub mod player;
pub mod scenes;
pub mod script;

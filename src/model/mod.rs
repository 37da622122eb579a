pub mod config;
pub mod config_log;
pub mod playlist;

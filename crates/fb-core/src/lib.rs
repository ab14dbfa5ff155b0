//! Startup glue: application config and the launch sequence joining the
//! identity handshake with the runtime host bootstrap.

pub mod config;
mod launch;

pub use config::{AppConfig, AuthSection, CLIENT_ID_ENV, ConfigError};
pub use launch::{LaunchReport, launch};

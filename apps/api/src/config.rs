use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::draw::engine::DEFAULT_MAX_ATTEMPTS;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub draw_state_file: PathBuf,
    pub users_file: PathBuf,
    pub draw_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let draw_max_attempts = match std::env::var("DRAW_MAX_ATTEMPTS") {
            Ok(v) => v
                .parse::<u32>()
                .context("DRAW_MAX_ATTEMPTS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_ATTEMPTS,
        };
        ensure!(draw_max_attempts >= 1, "DRAW_MAX_ATTEMPTS must be at least 1");

        Ok(Config {
            draw_state_file: env_or("DRAW_STATE_FILE", "data/draw_state.json").into(),
            users_file: env_or("USERS_FILE", "users.json").into(),
            draw_max_attempts,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

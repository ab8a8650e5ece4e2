use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::providers::DEFAULT_MODEL;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_DICTIONARY_PATH: &str = "slovnik.json";
pub const DEFAULT_STATIC_ROOT: &str = "public";

/// Runtime configuration resolved from the environment. Individual fields
/// may be overridden by CLI flags in `main`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Missing keys surface as call-time failures, not startup failures.
    pub api_key: Option<String>,
    pub model: String,
    pub port: u16,
    pub dictionary_path: PathBuf,
    pub static_root: PathBuf,
}

pub fn load_settings() -> Result<Settings> {
    let port = match get_env("PORT") {
        Some(value) => value
            .parse::<u16>()
            .with_context(|| format!("invalid PORT value '{}'", value))?,
        None => DEFAULT_PORT,
    };
    Ok(Settings {
        api_key: get_env("OPENAI_API_KEY"),
        model: get_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        port,
        dictionary_path: get_env("DICTIONARY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DICTIONARY_PATH)),
        static_root: get_env("STATIC_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_ROOT)),
    })
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_STORAGE_DIR: &str = ".fitpulse";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the FitPulse backend, without trailing slash
    pub api_base_url: String,
    /// Directory backing `FileStorage`
    pub storage_dir: PathBuf,
    /// Whether trainer professional fields go to `POST /trainer/create`
    /// after the account is created
    pub trainer_endpoint: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            trainer_endpoint: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("FITPULSE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid("FITPULSE_API_URL", api_base_url));
        }

        let trainer_endpoint = match env::var("FITPULSE_TRAINER_ENDPOINT") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("FITPULSE_TRAINER_ENDPOINT", v))?,
            Err(_) => false,
        };

        Ok(Self {
            api_base_url,
            storage_dir: env::var("FITPULSE_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR)),
            trainer_endpoint,
        })
    }

    /// Config pointing at a local mock backend.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Same config with a different backend URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

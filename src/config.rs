// src/config.rs
use crate::errors::CreatorError;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub request_timeout: Duration,
    pub max_image_dimension: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, CreatorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, CreatorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = var("GEMINI_API_KEY")
            .ok_or_else(|| CreatorError::Config("GEMINI_API_KEY must be set".to_string()))?;

        let request_timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("REQUEST_TIMEOUT_SECS", &raw)?,
            None => 60,
        };
        let max_image_dimension = match var("MAX_IMAGE_DIMENSION") {
            Some(raw) => parse_number::<u32>("MAX_IMAGE_DIMENSION", &raw)?,
            None => 2048,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: var("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_image_dimension,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CreatorError> {
    raw.trim()
        .parse()
        .map_err(|_| CreatorError::Config(format!("{} must be a number, got `{}`", key, raw)))
}

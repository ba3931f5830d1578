// src/services/response_validator.rs
use crate::errors::CreatorError;
use crate::models::GenerationResult;
use crate::schema::{self, GENERATION_SCHEMA};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parses raw service output and checks it against `fields` before handing
/// out a typed value. Nothing partial is ever returned.
pub fn parse_checked<T: DeserializeOwned>(
    raw_text: &str,
    fields: &[schema::Field],
) -> Result<T, CreatorError> {
    if raw_text.trim().is_empty() {
        return Err(CreatorError::Parse("empty response".to_string()));
    }

    let value: Value =
        serde_json::from_str(raw_text).map_err(|e| CreatorError::Parse(e.to_string()))?;
    schema::check(&value, fields)?;

    serde_json::from_value(value).map_err(|e| CreatorError::Serialization(e.to_string()))
}

/// Validates a generation response. Scores are passed through verbatim; any
/// outside 0..=100 is only logged.
pub fn validate(raw_text: &str) -> Result<GenerationResult, CreatorError> {
    let result: GenerationResult = parse_checked(raw_text, &GENERATION_SCHEMA)?;

    for (field, score) in result.insight.scores() {
        if !(0.0..=100.0).contains(&score) {
            warn!("Insight score insight.{} = {} is outside 0..=100", field, score);
        }
    }

    Ok(result)
}

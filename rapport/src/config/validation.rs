//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &RapportConfig) -> Result<(), ConfigError> {
    validate_relationship_config(&config.relationships)?;
    validate_conversation_config(&config.conversation)?;

    Ok(())
}

fn validate_threshold(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validate relationship configuration.
fn validate_relationship_config(config: &RelationshipConfig) -> Result<(), ConfigError> {
    validate_threshold(
        "relationships.conflict_polarity_threshold",
        config.conflict_polarity_threshold,
    )?;

    for (relationship_type, threshold) in &config.type_polarity_thresholds {
        validate_threshold(
            &format!("relationships.type_polarity_thresholds.{}", relationship_type),
            *threshold,
        )?;
    }

    Ok(())
}

/// Validate conversation configuration.
fn validate_conversation_config(config: &ConversationConfig) -> Result<(), ConfigError> {
    if config.response_timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "conversation.response_timeout must be greater than 0".to_string(),
        ));
    }

    if config.history_window == 0 {
        return Err(ConfigError::ValidationError(
            "conversation.history_window must be greater than 0".to_string(),
        ));
    }

    if config.max_input_chars == Some(0) {
        return Err(ConfigError::ValidationError(
            "conversation.max_input_chars must be greater than 0 (omit it to disable the limit)"
                .to_string(),
        ));
    }

    if config.max_mode_duration_minutes == 0 {
        return Err(ConfigError::ValidationError(
            "conversation.max_mode_duration_minutes must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

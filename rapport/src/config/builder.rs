//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use crate::relationships::RelationshipType;
use std::path::Path;
use std::time::Duration;

/// Builder for creating RapportConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: RapportConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: RapportConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: RapportConfig) -> Self {
        Self { config }
    }

    /// Set what `create` does for an existing pair.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.relationships.duplicate_policy = policy;
        self
    }

    /// Set the default conflict level above which interactions turn negative.
    pub fn with_conflict_polarity_threshold(mut self, threshold: f64) -> Self {
        self.config.relationships.conflict_polarity_threshold = threshold;
        self
    }

    /// Override the polarity threshold for one relationship type.
    pub fn with_type_polarity_threshold(
        mut self,
        relationship_type: RelationshipType,
        threshold: f64,
    ) -> Self {
        self.config
            .relationships
            .type_polarity_thresholds
            .insert(relationship_type, threshold);
        self
    }

    /// Bound each response generator call.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.config.conversation.response_timeout = timeout;
        self
    }

    /// Number of trailing messages handed to the generator.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.config.conversation.history_window = window;
        self
    }

    /// Limit user input length; `None` removes the limit.
    pub fn with_max_input_chars(mut self, limit: Option<usize>) -> Self {
        self.config.conversation.max_input_chars = limit;
        self
    }

    /// Set what happens when a character with an active flow starts another one.
    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.config.conversation.start_policy = policy;
        self
    }

    /// How many closed flows stay readable after they end.
    pub fn with_closed_flow_retention(mut self, retained: usize) -> Self {
        self.config.conversation.closed_flow_retention = retained;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self.config.logging.stdout = false;
        self
    }

    /// Create a configuration for development: debug logging, generous timeouts.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
            .with_response_timeout(Duration::from_secs(60))
    }

    /// Create a configuration for automated tests: short timeouts, warnings only.
    pub fn testing() -> Self {
        Self::new()
            .with_log_level(LogLevel::Warn)
            .with_log_format(LogFormat::Compact)
            .with_response_timeout(Duration::from_secs(2))
    }

    /// Create a production configuration: JSON logs at Info.
    pub fn production() -> Self {
        Self::new()
            .with_log_level(LogLevel::Info)
            .with_log_format(LogFormat::Json)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<RapportConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

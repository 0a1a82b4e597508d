//! Configuration model definitions.

use crate::relationships::RelationshipType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for Rapport.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RapportConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Relationship registry and simulation rules
    pub relationships: RelationshipConfig,

    /// Conversation orchestration
    pub conversation: ConversationConfig,
}

/// What `create` does when the pair already has a relationship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Return the stored record untouched
    #[default]
    ReturnExisting,

    /// Fail with `AlreadyExists`
    Reject,
}

/// Relationship configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Behaviour of `create` on an existing pair
    pub duplicate_policy: DuplicatePolicy,

    /// Conflict level above which a simulated interaction turns negative
    pub conflict_polarity_threshold: f64,

    /// Per-type overrides of `conflict_polarity_threshold`
    pub type_polarity_thresholds: HashMap<RelationshipType, f64>,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::ReturnExisting,
            conflict_polarity_threshold: 0.5,
            type_polarity_thresholds: HashMap::new(),
        }
    }
}

impl RelationshipConfig {
    /// Polarity threshold that applies to the given relationship type
    pub fn polarity_threshold(&self, relationship_type: RelationshipType) -> f64 {
        self.type_polarity_thresholds
            .get(&relationship_type)
            .copied()
            .unwrap_or(self.conflict_polarity_threshold)
    }
}

/// What `start_conversation` does when the character already has an active flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Fail with `SessionAlreadyActive`
    #[default]
    Reject,

    /// Close the previous flow and start a new one
    Replace,
}

/// Conversation orchestration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Upper bound on a single response generator call
    #[serde(with = "humantime_serde")]
    pub response_timeout: Duration,

    /// Number of trailing messages handed to the generator
    pub history_window: usize,

    /// Maximum user input length in characters (None = unbounded)
    pub max_input_chars: Option<usize>,

    /// Behaviour on a second start for an already-active character
    pub start_policy: StartPolicy,

    /// Longest mode duration accepted, in minutes
    pub max_mode_duration_minutes: u32,

    /// Closed flows kept readable through `flow(id)`; older ones are dropped (0 = none)
    pub closed_flow_retention: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(15),
            history_window: 10,
            max_input_chars: Some(4000),
            start_policy: StartPolicy::Reject,
            max_mode_duration_minutes: 240,
            closed_flow_retention: 64,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}

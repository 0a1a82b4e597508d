//! # Rapport
//!
//! Relationship dynamics and conversation orchestration for fictional characters.
//!
//! Rapport tracks how pairs of characters feel about each other (strength, trust,
//! intimacy, conflict), evolves those bonds through interactions and conflicts, derives
//! health and trajectory analytics, and runs mode-sensitive conversations between a
//! user and an AI-voiced character.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rapport::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let rapport = Rapport::builder().build().await?;
//!
//!     let bond = rapport
//!         .relationships()
//!         .create("Alice", "Bob", RelationshipType::Friend)
//!         .await?;
//!     rapport.conflicts().generate_conflict("Alice", "Bob", "broke a promise").await?;
//!     rapport.conflicts().resolve_conflict(&bond.id, "apologized").await?;
//!
//!     let health = rapport.analytics().analyze_health(&bond.id).await?;
//!     println!("overall health: {:.2}", health.overall);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **relationships**: registry, interaction simulator, conflict subsystem, analytics
//! - **conversation**: flow orchestrator, input classifier, enrichment tables
//! - **hooks**: callbacks fired after conversation turns
//! - **engine**: the `Rapport` facade wiring everything from a `RapportConfig`
//!
//! Text generation and persistence are external: plug in a `ResponseGenerator`,
//! a `CharacterStateProvider` and, optionally, a `RelationshipStore`.

pub mod config;
pub mod conversation;
pub mod engine;
pub mod hooks;
pub mod logging;
pub mod relationships;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::engine::{Rapport, RapportBuilder};

    pub use crate::{init, init_with_defaults};

    pub use crate::config::{
        ConfigBuilder, ConversationConfig, DuplicatePolicy, LogLevel, RapportConfig,
        RelationshipConfig, StartPolicy,
    };

    pub use crate::relationships::{
        ConflictResolver, EventType, HealthReport, InteractionSimulator, NetworkSummary,
        RelationshipAnalytics, RelationshipArc, RelationshipEvent, RelationshipPatch,
        RelationshipRecord, RelationshipRegistry, RelationshipStatus, RelationshipType,
    };

    pub use crate::conversation::{
        CharacterProfile, CharacterResponse, CharacterStateProvider, ContextPatch,
        ConversationFlow, ConversationOrchestrator, ConversationTurn, Emotion, FlowAnalysis,
        GeneratedReply, InteractionContext, InteractionMode, ModeKind, ResponseGenerator,
        TemplateResponseGenerator,
    };

    pub use crate::hooks::{ConversationHook, HookRegistry, HookResult};

    pub use crate::{RapportError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Rapport operations
#[derive(Debug, thiserror::Error)]
pub enum RapportError {
    /// A relationship or flow lookup missed
    #[error("Not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },

    /// Operation on a closed or unknown conversation flow
    #[error("Conversation '{flow_id}' is not active")]
    SessionNotActive { flow_id: String },

    /// A second conversation was started for a character that already has one
    #[error(
        "Character '{character_id}' already has an active conversation. End it first or set conversation.start_policy = \"replace\""
    )]
    SessionAlreadyActive { character_id: String },

    /// Relationship already exists and the duplicate policy rejects re-creation
    #[error("Relationship '{id}' already exists")]
    AlreadyExists { id: String },

    /// The external response generator failed or timed out
    #[error("Response generation failed: {0}")]
    ResponseGenerationFailed(String),

    /// Malformed input (mode, duration, ids, user input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl RapportError {
    pub(crate) fn relationship_not_found(id: impl Into<String>) -> Self {
        RapportError::NotFound {
            entity_type: "relationship".to_string(),
            id: id.into(),
        }
    }

    pub(crate) fn session_not_active(flow_id: impl Into<String>) -> Self {
        RapportError::SessionNotActive {
            flow_id: flow_id.into(),
        }
    }
}

impl From<crate::config::ConfigError> for RapportError {
    fn from(err: crate::config::ConfigError) -> Self {
        RapportError::Configuration(err.to_string())
    }
}

/// Result type for Rapport operations
pub type Result<T> = std::result::Result<T, RapportError>;

/// Build a `Rapport` engine with the default configuration and offline collaborators.
pub async fn init_with_defaults() -> Result<engine::Rapport> {
    let config = config::ConfigBuilder::new().build()?;
    init(config).await
}

/// Build a `Rapport` engine from the given configuration.
///
/// Logging is initialised from `config.logging`; an already-installed global subscriber
/// is left in place.
pub async fn init(config: config::RapportConfig) -> Result<engine::Rapport> {
    let _ = logging::init(&config.logging);
    engine::Rapport::builder().with_config(config).build().await
}

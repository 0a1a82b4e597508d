//! Conversation Orchestration
//!
//! Runs mode-sensitive conversations between a user and a character:
//!
//! - `types`: flows, modes, contexts and responses
//! - `classifier`: keyword analysis of user input
//! - `tables`: emotion, body language and voice lookup tables
//! - `generator`: the `ResponseGenerator` and `CharacterStateProvider` seams
//! - `analysis`: flow metrics, insights and development summaries
//! - `orchestrator`: the `ConversationOrchestrator` state machine

pub mod analysis;
pub mod classifier;
pub mod generator;
pub mod orchestrator;
pub mod tables;
pub mod types;

pub use generator::{
    CharacterProfile, CharacterStateProvider, GeneratedReply, InMemoryCharacterProvider,
    ResponseGenerator, TemplateResponseGenerator,
};
pub use orchestrator::ConversationOrchestrator;
pub use types::{
    CharacterDevelopment, CharacterResponse, ContextPatch, ConversationFlow, ConversationTurn,
    Emotion, FlowAnalysis, FlowState, InputAnalysis, IntensityBucket, Intent, InteractionContext,
    InteractionMode, ModeKind, ResponseKind,
};

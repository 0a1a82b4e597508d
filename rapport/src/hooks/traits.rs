//! Traits for conversation hooks.
//!
//! Hooks let callers react to completed conversation turns and to relationship talk
//! detected in user input, without the orchestrator mutating relationships itself.
//!
//! # Examples
//!
//! ```no_run
//! use async_trait::async_trait;
//! use rapport::conversation::{ConversationFlow, ConversationTurn};
//! use rapport::hooks::{ConversationHook, HookResult};
//!
//! #[derive(Debug)]
//! struct TranscriptHook;
//!
//! #[async_trait]
//! impl ConversationHook for TranscriptHook {
//!     async fn on_turn_completed(
//!         &self,
//!         flow: &ConversationFlow,
//!         turn: &ConversationTurn,
//!     ) -> HookResult {
//!         println!("[{}] {}", flow.character_id, turn.response.content);
//!         HookResult::Continue
//!     }
//! }
//! ```

use crate::conversation::{ConversationFlow, ConversationTurn, Emotion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for hook execution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HookResult {
    /// The hook ran to completion
    #[default]
    Continue,
    /// The hook could not do its work; logged, never propagated
    Failed(String),
}

/// Relationship talk detected in a user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSignal {
    pub flow_id: String,
    pub character_id: String,
    /// Characters present in the scene whom the user named
    pub counterparts: Vec<String>,
    /// Relationship keyword that triggered the signal
    pub keyword: String,
    pub emotion: Emotion,
    /// The note appended to the flow's relationship changes
    pub note: String,
}

/// Trait for conversation hooks
///
/// Every method has a default implementation that does nothing and returns
/// `HookResult::Continue`.
///
/// # Hook Execution
///
/// - Hooks run after the turn is committed, with no flow lock held
/// - Hooks are executed in priority order (higher priority first)
/// - Failures and timeouts are logged but never fail the turn
/// - Each hook has a configurable timeout (default: 5000ms)
#[async_trait]
pub trait ConversationHook: Send + Sync + std::fmt::Debug {
    /// Called after a response has been appended to a flow
    ///
    /// # Arguments
    /// * `flow` - Snapshot of the flow including the new message
    /// * `turn` - Input analysis and the appended response
    async fn on_turn_completed(&self, flow: &ConversationFlow, turn: &ConversationTurn) -> HookResult {
        let _ = (flow, turn);
        HookResult::Continue
    }

    /// Called when a turn mentions the relationship between characters
    async fn on_relationship_signal(&self, signal: &RelationshipSignal) -> HookResult {
        let _ = signal;
        HookResult::Continue
    }

    /// Get the priority of this hook (higher = runs first)
    fn priority(&self) -> i32 {
        0
    }

    /// Get the timeout in milliseconds for this hook
    fn timeout_ms(&self) -> u64 {
        5000
    }

    /// Get a descriptive name for this hook (for logging)
    fn name(&self) -> &str {
        "anonymous_hook"
    }
}

//! Hook that turns relationship talk in a conversation into simulated interactions.

use super::traits::{ConversationHook, HookResult, RelationshipSignal};
use crate::RapportError;
use crate::relationships::InteractionSimulator;
use async_trait::async_trait;
use tracing::debug;

/// Runs one `simulate_interaction` per named counterpart whenever a turn mentions the
/// relationship. Pairs without a registered relationship are skipped.
#[derive(Debug, Clone)]
pub struct InteractionSimulatorHook {
    simulator: InteractionSimulator,
    interaction_type: String,
}

impl InteractionSimulatorHook {
    pub fn new(simulator: InteractionSimulator) -> Self {
        Self {
            simulator,
            interaction_type: "conversation".to_string(),
        }
    }

    /// Label recorded as the interaction type (default "conversation")
    pub fn with_interaction_type(mut self, interaction_type: impl Into<String>) -> Self {
        self.interaction_type = interaction_type.into();
        self
    }
}

#[async_trait]
impl ConversationHook for InteractionSimulatorHook {
    async fn on_relationship_signal(&self, signal: &RelationshipSignal) -> HookResult {
        for counterpart in &signal.counterparts {
            match self
                .simulator
                .simulate_interaction(
                    &signal.character_id,
                    counterpart,
                    &self.interaction_type,
                    &signal.note,
                )
                .await
            {
                Ok(event) => debug!(
                    "Conversation {} moved {} / {}: {:?}",
                    signal.flow_id, signal.character_id, counterpart, event.event_type
                ),
                Err(RapportError::NotFound { .. }) => debug!(
                    "No relationship between {} and {}; skipping",
                    signal.character_id, counterpart
                ),
                Err(err) => return HookResult::Failed(err.to_string()),
            }
        }

        HookResult::Continue
    }

    fn name(&self) -> &str {
        "interaction_simulator"
    }
}

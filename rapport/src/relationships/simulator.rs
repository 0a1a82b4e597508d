//! Interaction simulation: turn an interaction between two characters into a
//! relationship event and apply it.

use super::registry::RelationshipRegistry;
use super::types::{EventType, RelationshipEvent, RelationshipRecord};
use crate::Result;
use tracing::debug;

const INTERACTION_IMPACT: f64 = 0.1;

/// Generates and applies interaction events.
#[derive(Debug, Clone)]
pub struct InteractionSimulator {
    registry: RelationshipRegistry,
}

impl InteractionSimulator {
    pub fn new(registry: RelationshipRegistry) -> Self {
        Self { registry }
    }

    /// Simulate one interaction between `a` and `b`.
    ///
    /// The event turns negative when the pair's conflict exceeds the polarity threshold
    /// configured for its relationship type. Fails with `NotFound` when the pair has no
    /// relationship.
    pub async fn simulate_interaction(
        &self,
        a: &str,
        b: &str,
        interaction_type: &str,
        context: &str,
    ) -> Result<RelationshipEvent> {
        let config = self.registry.config();

        let event = self
            .registry
            .with_pair(a, b, |record| {
                let threshold = config.polarity_threshold(record.relationship_type);
                let event = interaction_event(record, threshold, interaction_type, context);
                apply_interaction(record, &event, interaction_type);
                event
            })
            .await?;

        debug!(
            "Simulated {} interaction between {} and {}: {:?} ({:+.2})",
            interaction_type, a, b, event.event_type, event.impact
        );
        Ok(event)
    }
}

fn interaction_event(
    record: &RelationshipRecord,
    threshold: f64,
    interaction_type: &str,
    context: &str,
) -> RelationshipEvent {
    let description = if context.trim().is_empty() {
        interaction_type.to_string()
    } else {
        format!("{}: {}", interaction_type, context)
    };

    if record.conflict > threshold {
        RelationshipEvent::new(
            EventType::Negative,
            description,
            -INTERACTION_IMPACT,
            &["tension", "frustration"],
            &["strained communication"],
        )
    } else {
        RelationshipEvent::new(
            EventType::Positive,
            description,
            INTERACTION_IMPACT,
            &["connection", "understanding"],
            &["strengthened bond"],
        )
    }
}

fn apply_interaction(
    record: &mut RelationshipRecord,
    event: &RelationshipEvent,
    interaction_type: &str,
) {
    let magnitude = event.impact.abs();

    match event.event_type {
        EventType::Positive => {
            record.strength += magnitude;
            record.trust += magnitude * 0.5;
            if !record.shared_experiences.iter().any(|e| e == interaction_type) {
                record.shared_experiences.push(interaction_type.to_string());
            }
        }
        _ => {
            record.conflict += magnitude;
            record.trust -= magnitude * 0.5;
        }
    }

    record.clamp_metrics();
    record.add_event(event.clone());
    record.refresh_status();
}

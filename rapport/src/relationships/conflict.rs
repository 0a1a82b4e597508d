//! Conflict creation, resolution and strategy suggestions.

use super::registry::RelationshipRegistry;
use super::types::{EventType, RelationshipEvent, RelationshipStatus, RelationshipType};
use crate::{RapportError, Result};
use tracing::info;

/// Strategies offered by [`ConflictResolver::suggest_conflict_resolution`], in display order.
pub const RESOLUTION_STRATEGIES: &[&str] = &[
    "Open honest communication about the underlying issue",
    "Seek mutual understanding of each other's perspective",
    "Practice empathy by acknowledging the other's feelings",
    "Rebuild trust through small, consistent actions",
    "Find a compromise that respects both sides",
    "Take time apart before revisiting the disagreement",
    "Involve a neutral mediator both sides respect",
    "Offer a sincere apology and commit to change",
];

const FAMILY_KEYWORDS: &[&str] = &["understanding", "empathy"];
const ROMANTIC_KEYWORDS: &[&str] = &["communication", "trust"];

/// Keywords a strategy must mention to be offered for the given type; `None` means all.
fn strategy_keywords(relationship_type: RelationshipType) -> Option<&'static [&'static str]> {
    match relationship_type {
        RelationshipType::Family => Some(FAMILY_KEYWORDS),
        RelationshipType::Romantic => Some(ROMANTIC_KEYWORDS),
        _ => None,
    }
}

/// Creates and resolves conflicts between characters.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    registry: RelationshipRegistry,
}

impl ConflictResolver {
    pub fn new(registry: RelationshipRegistry) -> Self {
        Self { registry }
    }

    /// Open a conflict over `issue` between `a` and `b`
    pub async fn generate_conflict(
        &self,
        a: &str,
        b: &str,
        issue: &str,
    ) -> Result<RelationshipEvent> {
        let event = RelationshipEvent::new(
            EventType::Conflict,
            format!("Conflict: {}", issue),
            -0.3,
            &["frustration", "anger", "disappointment"],
            &["decreased trust", "increased tension"],
        );

        let record_id = self
            .registry
            .with_pair(a, b, |record| {
                record.unresolved_issues.push(issue.to_string());
                record.conflict += 0.2;
                record.trust -= 0.1;
                record.clamp_metrics();
                record.current_status = RelationshipStatus::Conflicted;
                record.add_event(event.clone());
                record.id.clone()
            })
            .await?;

        info!("Conflict opened on {} ({} / {}): {}", record_id, a, b, issue);
        Ok(event)
    }

    /// Resolve the oldest open conflict of relationship `id`
    pub async fn resolve_conflict(&self, id: &str, resolution: &str) -> Result<RelationshipEvent> {
        let event = RelationshipEvent::new(
            EventType::Reconciliation,
            format!("Resolution: {}", resolution),
            0.2,
            &["relief", "understanding", "hope"],
            &["increased trust", "deeper understanding"],
        );

        let resolved_issue = self
            .registry
            .with_record(id, |record| {
                record.conflict -= 0.3;
                record.trust += 0.2;
                record.strength += 0.1;
                record.clamp_metrics();
                record.current_status = RelationshipStatus::Reconciling;
                record.add_event(event.clone());
                (!record.unresolved_issues.is_empty()).then(|| record.unresolved_issues.remove(0))
            })
            .await?;

        match resolved_issue {
            Some(issue) => info!("Conflict on {} resolved ({}): {}", id, issue, resolution),
            None => info!("Reconciliation on {} with no open issue: {}", id, resolution),
        }
        Ok(event)
    }

    /// Resolution strategies suited to the relationship's type
    pub async fn suggest_conflict_resolution(&self, id: &str) -> Result<Vec<String>> {
        let record = self
            .registry
            .get_by_id(id)
            .await?
            .ok_or_else(|| RapportError::relationship_not_found(id))?;

        let keywords = strategy_keywords(record.relationship_type);
        Ok(RESOLUTION_STRATEGIES
            .iter()
            .filter(|strategy| match keywords {
                Some(words) => {
                    let lowered = strategy.to_lowercase();
                    words.iter().any(|word| lowered.contains(word))
                }
                None => true,
            })
            .map(|strategy| strategy.to_string())
            .collect())
    }
}

//! Derived relationship metrics: health scores, predictions, network statistics and
//! narrative arcs.
//!
//! Everything here reads snapshots and never mutates a record.

use super::registry::RelationshipRegistry;
use super::types::{
    EventType, FuturePotential, RelationshipEvent, RelationshipRecord, RelationshipStatus,
    RelationshipType,
};
use crate::{RapportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Seven health scores of one relationship, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: f64,
    pub compatibility: f64,
    pub communication: f64,
    pub stability: f64,
    pub attraction: f64,
    pub conflict_resolution: f64,
    pub growth_potential: f64,
}

impl HealthReport {
    pub fn from_record(record: &RelationshipRecord) -> Self {
        let RelationshipRecord {
            strength,
            trust,
            intimacy,
            conflict,
            ..
        } = *record;

        Self {
            overall: (strength + trust + intimacy + (1.0 - conflict)) / 4.0,
            compatibility: (strength + trust) / 2.0,
            communication: trust * 0.6 + intimacy * 0.4,
            stability: (1.0 - conflict) * 0.7 + trust * 0.3,
            attraction: intimacy * 0.8 + strength * 0.2,
            conflict_resolution: 1.0 - conflict,
            growth_potential: if record.future_potential == FuturePotential::Positive {
                0.8
            } else {
                0.3
            },
        }
    }
}

/// Aggregate view of every relationship a character takes part in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub character_id: String,
    pub total: usize,
    /// strength > 0.7
    pub strong: usize,
    /// conflict > 0.5
    pub conflicted: usize,
    /// trust > 0.8
    pub trusted: usize,
    pub type_counts: BTreeMap<RelationshipType, usize>,
    pub average_trust: f64,
    pub average_conflict: f64,
}

/// Overall shape of a relationship's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcShape {
    /// A reconciliation followed a conflict
    Redemption,
    Rising,
    Falling,
    Flat,
}

impl fmt::Display for ArcShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArcShape::Redemption => "redemption",
            ArcShape::Rising => "rising",
            ArcShape::Falling => "falling",
            ArcShape::Flat => "flat",
        };
        f.write_str(name)
    }
}

/// Narrative summary of one relationship from a character's point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipArc {
    pub relationship_id: String,
    pub counterpart: String,
    pub relationship_type: RelationshipType,
    pub net_impact: f64,
    pub turning_points: Vec<RelationshipEvent>,
    pub shape: ArcShape,
    pub current_status: RelationshipStatus,
    pub next_beat: String,
}

/// Read-only analytics over the registry
#[derive(Debug, Clone)]
pub struct RelationshipAnalytics {
    registry: RelationshipRegistry,
}

impl RelationshipAnalytics {
    pub fn new(registry: RelationshipRegistry) -> Self {
        Self { registry }
    }

    async fn record(&self, id: &str) -> Result<RelationshipRecord> {
        self.registry
            .get_by_id(id)
            .await?
            .ok_or_else(|| RapportError::relationship_not_found(id))
    }

    pub async fn analyze_health(&self, id: &str) -> Result<HealthReport> {
        Ok(HealthReport::from_record(&self.record(id).await?))
    }

    /// One message per satisfied rule, in rule order
    pub async fn predict_future(&self, id: &str) -> Result<Vec<String>> {
        Ok(predictions(&self.record(id).await?))
    }

    pub async fn analyze_social_network(&self, character: &str) -> Result<NetworkSummary> {
        let records = self.registry.list_for(character).await?;
        Ok(summarize_network(character, &records))
    }

    /// One arc per relationship of `character`, ordered by relationship id
    pub async fn generate_relationship_arcs(&self, character: &str) -> Result<Vec<RelationshipArc>> {
        let records = self.registry.list_for(character).await?;
        Ok(records
            .iter()
            .map(|record| build_arc(character, record))
            .collect())
    }
}

fn predictions(record: &RelationshipRecord) -> Vec<String> {
    let rules: [(bool, &str); 4] = [
        (
            record.conflict > 0.7,
            "High conflict may reach a breaking point unless it is addressed",
        ),
        (
            record.trust < 0.3,
            "Low trust threatens the relationship's long-term stability",
        ),
        (
            record.strength > 0.8 && record.trust > 0.7,
            "A strong foundation points to a lasting, deepening bond",
        ),
        (
            record.intimacy > 0.6,
            "Growing intimacy could carry the relationship to a deeper level",
        ),
    ];

    rules
        .into_iter()
        .filter(|(holds, _)| *holds)
        .map(|(_, message)| message.to_string())
        .collect()
}

fn summarize_network(character: &str, records: &[RelationshipRecord]) -> NetworkSummary {
    let mut type_counts = BTreeMap::new();
    for record in records {
        *type_counts.entry(record.relationship_type).or_insert(0) += 1;
    }

    let total = records.len();
    let average = |metric: fn(&RelationshipRecord) -> f64| {
        if total == 0 {
            0.0
        } else {
            records.iter().map(metric).sum::<f64>() / total as f64
        }
    };

    NetworkSummary {
        character_id: character.to_string(),
        total,
        strong: records.iter().filter(|r| r.strength > 0.7).count(),
        conflicted: records.iter().filter(|r| r.conflict > 0.5).count(),
        trusted: records.iter().filter(|r| r.trust > 0.8).count(),
        type_counts,
        average_trust: average(|r| r.trust),
        average_conflict: average(|r| r.conflict),
    }
}

fn build_arc(character: &str, record: &RelationshipRecord) -> RelationshipArc {
    let net_impact: f64 = record.history.iter().map(|e| e.impact).sum();

    let turning_points = record
        .history
        .iter()
        .filter(|e| {
            matches!(e.event_type, EventType::Conflict | EventType::Reconciliation)
                || e.impact.abs() >= 0.2
        })
        .cloned()
        .collect();

    let first_conflict = record
        .history
        .iter()
        .position(|e| e.event_type == EventType::Conflict);
    let redeemed = first_conflict.is_some_and(|start| {
        record.history[start..]
            .iter()
            .any(|e| e.event_type == EventType::Reconciliation)
    });

    let shape = if redeemed {
        ArcShape::Redemption
    } else if net_impact > 0.1 {
        ArcShape::Rising
    } else if net_impact < -0.1 {
        ArcShape::Falling
    } else {
        ArcShape::Flat
    };

    RelationshipArc {
        relationship_id: record.id.clone(),
        counterpart: record.counterpart(character).unwrap_or_default().to_string(),
        relationship_type: record.relationship_type,
        net_impact,
        turning_points,
        shape,
        current_status: record.current_status,
        next_beat: next_beat(record.current_status).to_string(),
    }
}

fn next_beat(status: RelationshipStatus) -> &'static str {
    match status {
        RelationshipStatus::Stable => "Introduce an outside pressure that tests the bond",
        RelationshipStatus::Growing => "Give them a shared goal that deepens the connection",
        RelationshipStatus::Declining => "Show the small moments where they drift apart",
        RelationshipStatus::Conflicted => "Force a confrontation over the unresolved issue",
        RelationshipStatus::Reconciling => "Let a quiet moment prove the repair is real",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelationshipConfig;
    use crate::relationships::{ConflictResolver, InteractionSimulator, RelationshipPatch};

    const EPSILON: f64 = 1e-9;

    fn record_with(strength: f64, trust: f64, intimacy: f64, conflict: f64) -> RelationshipRecord {
        let mut record = RelationshipRecord::new("Alice", "Bob", RelationshipType::Friend);
        record.strength = strength;
        record.trust = trust;
        record.intimacy = intimacy;
        record.conflict = conflict;
        record
    }

    #[test]
    fn test_health_formulas() {
        let mut record = record_with(0.6, 0.8, 0.5, 0.2);
        let health = HealthReport::from_record(&record);

        assert!((health.overall - 0.675).abs() < EPSILON);
        assert!((health.compatibility - 0.7).abs() < EPSILON);
        assert!((health.communication - 0.68).abs() < EPSILON);
        assert!((health.stability - 0.8).abs() < EPSILON);
        assert!((health.attraction - 0.52).abs() < EPSILON);
        assert!((health.conflict_resolution - 0.8).abs() < EPSILON);
        assert_eq!(health.growth_potential, 0.3);

        record.future_potential = FuturePotential::Positive;
        assert_eq!(HealthReport::from_record(&record).growth_potential, 0.8);
    }

    #[test]
    fn test_predictions_keep_rule_order() {
        assert!(predictions(&record_with(0.5, 0.5, 0.3, 0.1)).is_empty());

        let all = predictions(&record_with(0.9, 0.75, 0.7, 0.8));
        assert_eq!(all.len(), 3);
        assert!(all[0].starts_with("High conflict"));
        assert!(all[1].starts_with("A strong foundation"));
        assert!(all[2].starts_with("Growing intimacy"));

        let distrust = predictions(&record_with(0.2, 0.1, 0.1, 0.9));
        assert_eq!(distrust.len(), 2);
        assert!(distrust[1].starts_with("Low trust"));
    }

    #[test]
    fn test_empty_network_is_zero() {
        let summary = summarize_network("Nobody", &[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_trust, 0.0);
        assert_eq!(summary.average_conflict, 0.0);
        assert!(!summary.average_trust.is_nan());
        assert!(summary.type_counts.is_empty());
    }

    #[tokio::test]
    async fn test_network_summary_counts() {
        let registry = RelationshipRegistry::new(RelationshipConfig::default());
        let bob = registry
            .create("Alice", "Bob", RelationshipType::Friend)
            .await
            .unwrap();
        let carol = registry
            .create("Alice", "Carol", RelationshipType::Friend)
            .await
            .unwrap();
        registry
            .create("Alice", "Dave", RelationshipType::Enemy)
            .await
            .unwrap();
        registry
            .update(
                &bob.id,
                RelationshipPatch {
                    strength: Some(0.9),
                    trust: Some(0.9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        registry
            .update(
                &carol.id,
                RelationshipPatch {
                    conflict: Some(0.8),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let analytics = RelationshipAnalytics::new(registry);
        let summary = analytics.analyze_social_network("Alice").await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.strong, 1);
        assert_eq!(summary.conflicted, 1);
        assert_eq!(summary.trusted, 1);
        assert_eq!(summary.type_counts[&RelationshipType::Friend], 2);
        assert_eq!(summary.type_counts[&RelationshipType::Enemy], 1);
        assert!((summary.average_trust - (0.9 + 0.5 + 0.5) / 3.0).abs() < EPSILON);
        assert!((summary.average_conflict - (0.1 + 0.8 + 0.1) / 3.0).abs() < EPSILON);
    }

    #[tokio::test]
    async fn test_arcs() {
        let registry = RelationshipRegistry::new(RelationshipConfig::default());
        let bond = registry
            .create("Alice", "Bob", RelationshipType::Friend)
            .await
            .unwrap();
        registry
            .create("Alice", "Carol", RelationshipType::Colleague)
            .await
            .unwrap();

        let conflicts = ConflictResolver::new(registry.clone());
        conflicts
            .generate_conflict("Alice", "Bob", "broke a promise")
            .await
            .unwrap();
        conflicts.resolve_conflict(&bond.id, "apologized").await.unwrap();

        let simulator = InteractionSimulator::new(registry.clone());
        for _ in 0..3 {
            simulator
                .simulate_interaction("Carol", "Alice", "project", "")
                .await
                .unwrap();
        }

        let analytics = RelationshipAnalytics::new(registry);
        let arcs = analytics.generate_relationship_arcs("Alice").await.unwrap();
        assert_eq!(arcs.len(), 2);

        let bob_arc = arcs.iter().find(|a| a.counterpart == "Bob").unwrap();
        assert_eq!(bob_arc.shape, ArcShape::Redemption);
        assert_eq!(bob_arc.turning_points.len(), 2);
        assert_eq!(bob_arc.current_status, RelationshipStatus::Reconciling);
        assert!((bob_arc.net_impact + 0.1).abs() < EPSILON);

        let carol_arc = arcs.iter().find(|a| a.counterpart == "Carol").unwrap();
        assert_eq!(carol_arc.shape, ArcShape::Rising);
        assert!(carol_arc.turning_points.is_empty());
        assert_eq!(
            carol_arc.next_beat,
            next_beat(carol_arc.current_status)
        );
    }

    #[tokio::test]
    async fn test_health_is_deterministic_and_checks_existence() {
        let registry = RelationshipRegistry::new(RelationshipConfig::default());
        let bond = registry
            .create("Alice", "Bob", RelationshipType::Mentor)
            .await
            .unwrap();
        let analytics = RelationshipAnalytics::new(registry);

        let first = analytics.analyze_health(&bond.id).await.unwrap();
        let second = analytics.analyze_health(&bond.id).await.unwrap();
        assert_eq!(first, second);

        assert!(matches!(
            analytics.analyze_health("missing").await,
            Err(RapportError::NotFound { .. })
        ));
    }
}

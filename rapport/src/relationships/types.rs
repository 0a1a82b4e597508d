//! Relationship data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace for pair-derived relationship ids.
const RELATIONSHIP_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_52c4_93d8_4b0e_a7c2_3f51_e08d_9b14);

/// Metrics are kept to twelve decimal places, so repeated tenth-sized steps land on
/// exact values (0.1 + 0.2 - 0.3 is stored as 0.0).
const METRIC_SCALE: f64 = 1e12;

/// Clamp a metric into the closed unit interval. NaN collapses to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        (value.clamp(0.0, 1.0) * METRIC_SCALE).round() / METRIC_SCALE
    }
}

/// Order-independent identity of a character pair.
///
/// `RelationshipKey::new("Alice", "Bob")` and `RelationshipKey::new("Bob", "Alice")`
/// are equal and derive the same record id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipKey {
    first: String,
    second: String,
}

impl RelationshipKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    /// The lexicographically smaller character id
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger character id
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Stable record id: a UUIDv5 over the sorted pair
    pub fn record_id(&self) -> String {
        // Unit separator keeps ("ab", "c") and ("a", "bc") apart.
        let name = format!("{}\u{1f}{}", self.first, self.second);
        Uuid::new_v5(&RELATIONSHIP_NAMESPACE, name.as_bytes()).to_string()
    }
}

impl fmt::Display for RelationshipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// Bond between two characters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: String,
    pub character_a: String,
    pub character_b: String,
    pub relationship_type: RelationshipType,
    pub strength: f64,
    pub trust: f64,
    pub intimacy: f64,
    pub conflict: f64,
    pub history: Vec<RelationshipEvent>,
    pub current_status: RelationshipStatus,
    pub shared_experiences: Vec<String>,
    pub communication_style: CommunicationStyle,
    pub power_dynamic: PowerDynamic,
    pub emotional_bonds: Vec<String>,
    pub unresolved_issues: Vec<String>,
    pub future_potential: FuturePotential,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl RelationshipRecord {
    /// Create a relationship with the default starting metrics
    pub fn new(a: &str, b: &str, relationship_type: RelationshipType) -> Self {
        let key = RelationshipKey::new(a, b);
        let now = Utc::now();
        Self {
            id: key.record_id(),
            character_a: key.first().to_string(),
            character_b: key.second().to_string(),
            relationship_type,
            strength: 0.5,
            trust: 0.5,
            intimacy: 0.3,
            conflict: 0.1,
            history: Vec::new(),
            current_status: RelationshipStatus::Stable,
            shared_experiences: Vec::new(),
            communication_style: CommunicationStyle::Casual,
            power_dynamic: PowerDynamic::Equal,
            emotional_bonds: Vec::new(),
            unresolved_issues: Vec::new(),
            future_potential: FuturePotential::Neutral,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey::new(&self.character_a, &self.character_b)
    }

    /// Check if this relationship involves the given character
    pub fn involves(&self, character: &str) -> bool {
        self.character_a == character || self.character_b == character
    }

    /// Get the other character in this relationship
    pub fn counterpart(&self, character: &str) -> Option<&str> {
        if self.character_a == character {
            Some(&self.character_b)
        } else if self.character_b == character {
            Some(&self.character_a)
        } else {
            None
        }
    }

    /// Append an event to the history
    pub fn add_event(&mut self, event: RelationshipEvent) {
        self.history.push(event);
        self.last_updated = Utc::now();
    }

    /// Re-clamp every scalar metric into [0, 1]
    pub fn clamp_metrics(&mut self) {
        self.strength = clamp_unit(self.strength);
        self.trust = clamp_unit(self.trust);
        self.intimacy = clamp_unit(self.intimacy);
        self.conflict = clamp_unit(self.conflict);
    }

    /// Recompute `current_status` from the fixed thresholds
    pub fn refresh_status(&mut self) {
        self.current_status = RelationshipStatus::derive(self.strength, self.conflict);
    }
}

/// Partial update for a relationship. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipPatch {
    pub relationship_type: Option<RelationshipType>,
    pub strength: Option<f64>,
    pub trust: Option<f64>,
    pub intimacy: Option<f64>,
    pub conflict: Option<f64>,
    pub shared_experiences: Option<Vec<String>>,
    pub communication_style: Option<CommunicationStyle>,
    pub power_dynamic: Option<PowerDynamic>,
    pub emotional_bonds: Option<Vec<String>>,
    pub unresolved_issues: Option<Vec<String>>,
    pub future_potential: Option<FuturePotential>,
}

impl RelationshipPatch {
    /// Merge present fields into `record`, clamping scalars
    pub fn apply_to(self, record: &mut RelationshipRecord) {
        if let Some(relationship_type) = self.relationship_type {
            record.relationship_type = relationship_type;
        }
        if let Some(strength) = self.strength {
            record.strength = strength;
        }
        if let Some(trust) = self.trust {
            record.trust = trust;
        }
        if let Some(intimacy) = self.intimacy {
            record.intimacy = intimacy;
        }
        if let Some(conflict) = self.conflict {
            record.conflict = conflict;
        }
        if let Some(shared) = self.shared_experiences {
            record.shared_experiences = shared;
        }
        if let Some(style) = self.communication_style {
            record.communication_style = style;
        }
        if let Some(power) = self.power_dynamic {
            record.power_dynamic = power;
        }
        if let Some(bonds) = self.emotional_bonds {
            record.emotional_bonds = bonds;
        }
        if let Some(issues) = self.unresolved_issues {
            record.unresolved_issues = issues;
        }
        if let Some(potential) = self.future_potential {
            record.future_potential = potential;
        }
        record.clamp_metrics();
        record.refresh_status();
        record.last_updated = Utc::now();
    }
}

/// Kinds of relationship between characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Friend,
    Enemy,
    Family,
    Romantic,
    Mentor,
    Rival,
    Colleague,
    Acquaintance,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 8] = [
        RelationshipType::Friend,
        RelationshipType::Enemy,
        RelationshipType::Family,
        RelationshipType::Romantic,
        RelationshipType::Mentor,
        RelationshipType::Rival,
        RelationshipType::Colleague,
        RelationshipType::Acquaintance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Friend => "friend",
            RelationshipType::Enemy => "enemy",
            RelationshipType::Family => "family",
            RelationshipType::Romantic => "romantic",
            RelationshipType::Mentor => "mentor",
            RelationshipType::Rival => "rival",
            RelationshipType::Colleague => "colleague",
            RelationshipType::Acquaintance => "acquaintance",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        RelationshipType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("Invalid relationship type: {}", s))
    }
}

/// Trajectory of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Stable,
    Growing,
    /// Never derived from thresholds; only carried in from external stores.
    Declining,
    Conflicted,
    Reconciling,
}

impl RelationshipStatus {
    /// Status implied by the current metrics
    pub fn derive(strength: f64, conflict: f64) -> Self {
        if conflict > 0.6 {
            RelationshipStatus::Conflicted
        } else if strength > 0.7 {
            RelationshipStatus::Growing
        } else {
            RelationshipStatus::Stable
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipStatus::Stable => "stable",
            RelationshipStatus::Growing => "growing",
            RelationshipStatus::Declining => "declining",
            RelationshipStatus::Conflicted => "conflicted",
            RelationshipStatus::Reconciling => "reconciling",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Formal,
    Casual,
    Intimate,
    Guarded,
    Hostile,
    Playful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerDynamic {
    Equal,
    ADominant,
    BDominant,
    Shifting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuturePotential {
    Positive,
    Neutral,
    Negative,
    Volatile,
}

/// Immutable record of one interaction's effect on a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEvent {
    pub id: String,
    pub event_type: EventType,
    pub description: String,
    pub impact: f64,
    pub timestamp: DateTime<Utc>,
    pub emotions: Vec<String>,
    pub consequences: Vec<String>,
}

impl RelationshipEvent {
    /// Create a new event; impact is clamped to [-1, 1]
    pub fn new(
        event_type: EventType,
        description: impl Into<String>,
        impact: f64,
        emotions: &[&str],
        consequences: &[&str],
    ) -> Self {
        let impact = if impact.is_nan() { 0.0 } else { impact.clamp(-1.0, 1.0) };
        Self {
            id: Uuid::new_v4().to_string(),
            event_type,
            description: description.into(),
            impact,
            timestamp: Utc::now(),
            emotions: emotions.iter().map(|e| e.to_string()).collect(),
            consequences: consequences.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Types of events that affect relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Positive,
    Negative,
    Neutral,
    Conflict,
    Reconciliation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit_drops_float_drift() {
        assert_eq!(clamp_unit(0.1 + 0.2 - 0.3), 0.0);
        assert_eq!(clamp_unit(0.4 + 0.2), 0.6);
        assert_eq!(clamp_unit(1.0000000000000002), 1.0);
        assert_eq!(clamp_unit(-0.25), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_key_is_order_independent() {
        let ab = RelationshipKey::new("Alice", "Bob");
        let ba = RelationshipKey::new("Bob", "Alice");
        assert_eq!(ab, ba);
        assert_eq!(ab.record_id(), ba.record_id());
        assert_eq!(ab.first(), "Alice");
    }

    #[test]
    fn test_key_separates_concatenation_collisions() {
        let left = RelationshipKey::new("ab", "c");
        let right = RelationshipKey::new("a", "bc");
        assert_ne!(left.record_id(), right.record_id());
    }

    #[test]
    fn test_new_record_defaults() {
        let record = RelationshipRecord::new("Bob", "Alice", RelationshipType::Friend);
        assert_eq!(record.character_a, "Alice");
        assert_eq!(record.character_b, "Bob");
        assert_eq!(record.strength, 0.5);
        assert_eq!(record.trust, 0.5);
        assert_eq!(record.intimacy, 0.3);
        assert_eq!(record.conflict, 0.1);
        assert_eq!(record.current_status, RelationshipStatus::Stable);
        assert!(record.history.is_empty());
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(RelationshipStatus::derive(0.9, 0.7), RelationshipStatus::Conflicted);
        assert_eq!(RelationshipStatus::derive(0.75, 0.6), RelationshipStatus::Growing);
        assert_eq!(RelationshipStatus::derive(0.7, 0.1), RelationshipStatus::Stable);
    }

    #[test]
    fn test_patch_clamps_and_rederives() {
        let mut record = RelationshipRecord::new("Alice", "Bob", RelationshipType::Rival);
        RelationshipPatch {
            conflict: Some(1.7),
            trust: Some(-0.4),
            ..Default::default()
        }
        .apply_to(&mut record);

        assert_eq!(record.conflict, 1.0);
        assert_eq!(record.trust, 0.0);
        assert_eq!(record.current_status, RelationshipStatus::Conflicted);
    }

    #[test]
    fn test_event_impact_clamped() {
        let event = RelationshipEvent::new(EventType::Negative, "spite", -3.0, &[], &[]);
        assert_eq!(event.impact, -1.0);
    }

    #[test]
    fn test_relationship_type_parse() {
        assert_eq!("Mentor".parse::<RelationshipType>(), Ok(RelationshipType::Mentor));
        assert!("nemesis".parse::<RelationshipType>().is_err());
    }
}

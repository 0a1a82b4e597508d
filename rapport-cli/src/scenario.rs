//! Scripted relationship scenarios
//!
//! A scenario is a JSON document listing relationship operations to run in order:
//!
//! ```json
//! {
//!   "name": "falling out",
//!   "steps": [
//!     { "op": "create", "a": "Alice", "b": "Bob", "type": "friend" },
//!     { "op": "conflict", "a": "Alice", "b": "Bob", "issue": "broke a promise" },
//!     { "op": "resolve", "a": "Alice", "b": "Bob", "resolution": "apologized" }
//!   ]
//! }
//! ```

use rapport::RapportError;
use rapport::engine::Rapport;
use rapport::relationships::{RelationshipEvent, RelationshipRecord, RelationshipType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScenarioStep {
    Create {
        a: String,
        b: String,
        #[serde(rename = "type")]
        relationship_type: RelationshipType,
    },
    Interact {
        a: String,
        b: String,
        interaction: String,
        #[serde(default)]
        context: String,
    },
    Conflict {
        a: String,
        b: String,
        issue: String,
    },
    Resolve {
        a: String,
        b: String,
        resolution: String,
    },
}

impl ScenarioStep {
    pub fn describe(&self) -> String {
        match self {
            ScenarioStep::Create {
                a,
                b,
                relationship_type,
            } => format!("{} and {} become {}", a, b, relationship_type),
            ScenarioStep::Interact {
                a, b, interaction, ..
            } => format!("{} and {} share a {}", a, b, interaction),
            ScenarioStep::Conflict { a, b, issue } => {
                format!("{} and {} clash over {}", a, b, issue)
            }
            ScenarioStep::Resolve { a, b, resolution } => {
                format!("{} and {} make up: {}", a, b, resolution)
            }
        }
    }
}

/// What one step did
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub description: String,
    pub event: Option<RelationshipEvent>,
    pub record: RelationshipRecord,
}

impl Scenario {
    pub fn from_path(path: &Path) -> rapport::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RapportError::Other(format!("Failed to read scenario {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> rapport::Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| RapportError::Validation(format!("Invalid scenario: {}", e)))
    }

    /// Alice and Bob fall out and make up; Carol watches from the side
    pub fn demo() -> Self {
        let step = |op: &str, a: &str, b: &str, text: &str| match op {
            "interact" => ScenarioStep::Interact {
                a: a.to_string(),
                b: b.to_string(),
                interaction: text.to_string(),
                context: String::new(),
            },
            "conflict" => ScenarioStep::Conflict {
                a: a.to_string(),
                b: b.to_string(),
                issue: text.to_string(),
            },
            _ => ScenarioStep::Resolve {
                a: a.to_string(),
                b: b.to_string(),
                resolution: text.to_string(),
            },
        };

        Scenario {
            name: "Alice and Bob".to_string(),
            steps: vec![
                ScenarioStep::Create {
                    a: "Alice".to_string(),
                    b: "Bob".to_string(),
                    relationship_type: RelationshipType::Friend,
                },
                ScenarioStep::Create {
                    a: "Alice".to_string(),
                    b: "Carol".to_string(),
                    relationship_type: RelationshipType::Family,
                },
                step("interact", "Alice", "Bob", "picnic"),
                step("conflict", "Alice", "Bob", "broke a promise"),
                step("interact", "Alice", "Carol", "late-night talk"),
                step("resolve", "Alice", "Bob", "apologized and explained"),
            ],
        }
    }

    /// Run every step against `rapport`, stopping at the first error
    pub async fn run(&self, rapport: &Rapport) -> rapport::Result<Vec<StepOutcome>> {
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            debug!("Scenario step: {}", step.describe());
            let (event, a, b) = match step {
                ScenarioStep::Create {
                    a,
                    b,
                    relationship_type,
                } => {
                    rapport
                        .relationships()
                        .create(a, b, *relationship_type)
                        .await?;
                    (None, a, b)
                }
                ScenarioStep::Interact {
                    a,
                    b,
                    interaction,
                    context,
                } => {
                    let event = rapport
                        .simulator()
                        .simulate_interaction(a, b, interaction, context)
                        .await?;
                    (Some(event), a, b)
                }
                ScenarioStep::Conflict { a, b, issue } => {
                    let event = rapport.conflicts().generate_conflict(a, b, issue).await?;
                    (Some(event), a, b)
                }
                ScenarioStep::Resolve { a, b, resolution } => {
                    let id = pair_record(rapport, a, b).await?.id;
                    let event = rapport.conflicts().resolve_conflict(&id, resolution).await?;
                    (Some(event), a, b)
                }
            };

            outcomes.push(StepOutcome {
                description: step.describe(),
                event,
                record: pair_record(rapport, a, b).await?,
            });
        }

        Ok(outcomes)
    }
}

/// The relationship between `a` and `b`, or `NotFound`
pub async fn pair_record(rapport: &Rapport, a: &str, b: &str) -> rapport::Result<RelationshipRecord> {
    rapport
        .relationships()
        .get(a, b)
        .await?
        .ok_or_else(|| RapportError::NotFound {
            entity_type: "relationship".to_string(),
            id: format!("{} <-> {}", a, b),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_json(
            r#"{
                "name": "rivals",
                "steps": [
                    { "op": "create", "a": "Dan", "b": "Erin", "type": "rival" },
                    { "op": "interact", "a": "Dan", "b": "Erin", "interaction": "race" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.name, "rivals");
        assert_eq!(
            scenario.steps[0],
            ScenarioStep::Create {
                a: "Dan".to_string(),
                b: "Erin".to_string(),
                relationship_type: RelationshipType::Rival,
            }
        );
        assert!(matches!(&scenario.steps[1], ScenarioStep::Interact { context, .. } if context.is_empty()));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let result = Scenario::from_json(r#"{ "steps": [ { "op": "marry", "a": "x", "b": "y" } ] }"#);
        assert!(matches!(result, Err(RapportError::Validation(_))));
    }
}

//! Integration tests for the Rapport CLI
//!
//! These exercise the pieces the commands are built from: configuration
//! loading, scenario scripts and the shared engine context.

use clap::Parser;
use rapport::RapportError;
use rapport::config::{DuplicatePolicy, RapportConfig};
use rapport::relationships::{RelationshipStatus, RelationshipType};
use rapport_cli::commands::{Cli, Commands, ScenarioCommands};
use rapport_cli::context::{RapportCliContext, load_config};
use rapport_cli::scenario::{Scenario, ScenarioStep, pair_record};
use std::fs;
use tempfile::TempDir;

async fn test_context() -> RapportCliContext {
    RapportCliContext::with_config(RapportConfig::default())
        .await
        .expect("Failed to build CLI context")
}

#[tokio::test]
async fn test_demo_scenario_leaves_alice_and_bob_reconciled() {
    let ctx = test_context().await;
    let outcomes = Scenario::demo().run(&ctx.rapport).await.unwrap();

    assert_eq!(outcomes.len(), Scenario::demo().steps.len());

    let record = pair_record(&ctx.rapport, "Bob", "Alice").await.unwrap();
    assert_eq!(record.relationship_type, RelationshipType::Friend);
    assert!(record.unresolved_issues.is_empty());
    assert!(record.history.len() >= 3);

    let network = ctx
        .rapport
        .analytics()
        .analyze_social_network("Alice")
        .await
        .unwrap();
    assert_eq!(network.total, 2);
}

#[tokio::test]
async fn test_scenario_file_round_trip_through_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("feud.json");
    fs::write(
        &path,
        r#"{
            "name": "Old feud",
            "steps": [
                { "op": "create", "a": "Ines", "b": "Oskar", "type": "rival" },
                { "op": "interact", "a": "Ines", "b": "Oskar", "interaction": "cook-off" },
                { "op": "conflict", "a": "Ines", "b": "Oskar", "issue": "the stolen recipe" }
            ]
        }"#,
    )
    .unwrap();

    let scenario = Scenario::from_path(&path).unwrap();
    assert_eq!(scenario.name, "Old feud");
    assert!(matches!(
        scenario.steps[1],
        ScenarioStep::Interact { ref context, .. } if context.is_empty()
    ));

    let ctx = test_context().await;
    scenario.run(&ctx.rapport).await.unwrap();

    let record = pair_record(&ctx.rapport, "Ines", "Oskar").await.unwrap();
    assert_eq!(record.unresolved_issues, vec!["the stolen recipe".to_string()]);
    assert_eq!(record.shared_experiences, vec!["cook-off".to_string()]);
    assert_eq!(record.current_status, RelationshipStatus::Conflicted);
}

#[tokio::test]
async fn test_scenario_step_on_missing_pair_fails() {
    let scenario = Scenario::from_json(
        r#"{ "steps": [ { "op": "interact", "a": "Nobody", "b": "Else", "interaction": "chat" } ] }"#,
    )
    .unwrap();

    let ctx = test_context().await;
    let result = scenario.run(&ctx.rapport).await;
    assert!(matches!(result, Err(RapportError::NotFound { .. })));
}

#[test]
fn test_malformed_scenario_is_a_validation_error() {
    let result = Scenario::from_json(r#"{ "steps": [ { "op": "dance" } ] }"#);
    assert!(matches!(result, Err(RapportError::Validation(_))));
}

#[test]
fn test_load_config_from_toml_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("rapport.toml");
    fs::write(
        &path,
        r#"
[relationships]
duplicate_policy = "reject"

[conversation]
history_window = 4
"#,
    )
    .unwrap();

    let config = load_config(Some(path.as_path())).unwrap();
    assert_eq!(config.relationships.duplicate_policy, DuplicatePolicy::Reject);
    assert_eq!(config.conversation.history_window, 4);
}

#[test]
fn test_load_config_rejects_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("absent.toml");
    assert!(load_config(Some(path.as_path())).is_err());
}

#[tokio::test]
async fn test_chat_context_registers_the_simulator_hook() {
    let ctx = test_context().await;
    let hooks = ctx.rapport.hooks().list_hooks().await;
    assert!(hooks.iter().any(|(name, _)| name == "interaction_simulator"));
}

#[test]
fn test_cli_parses_simulate_flags() {
    let cli = Cli::try_parse_from([
        "rapport-cli",
        "--machine",
        "simulate",
        "Alice",
        "Bob",
        "--type",
        "mentor",
        "--rounds",
        "2",
        "--conflict",
        "missed lesson",
        "--resolve",
        "made up for it",
    ])
    .unwrap();

    assert!(cli.machine);
    match cli.command {
        Commands::Simulate(args) => {
            assert_eq!(args.relationship_type, "mentor");
            assert_eq!(args.rounds, 2);
            assert_eq!(args.resolve.as_deref(), Some("made up for it"));
        }
        _ => panic!("expected simulate"),
    }
}

#[test]
fn test_cli_resolve_requires_conflict() {
    let result = Cli::try_parse_from(["rapport-cli", "simulate", "A", "B", "--resolve", "x"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_scenario_template() {
    let cli = Cli::try_parse_from(["rapport-cli", "scenario", "template"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Scenario(ScenarioCommands::Template)
    ));
}

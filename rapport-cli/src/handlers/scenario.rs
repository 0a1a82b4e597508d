//! Scenario command handlers

use crate::args::DemoArgs;
use crate::commands::ScenarioCommands;
use crate::context::RapportCliContext;
use crate::output::*;
use crate::scenario::{Scenario, StepOutcome};
use colored::Colorize;
use serde_json::json;

pub async fn handle_demo_command(
    args: DemoArgs,
    ctx: &RapportCliContext,
    output_format: &str,
) -> rapport::Result<()> {
    let scenario = Scenario::demo();
    let outcomes = scenario.run(&ctx.rapport).await?;
    report(&scenario, &outcomes, ctx, Some("Alice"), args.summary_only, output_format).await
}

pub async fn handle_scenario_command(
    cmd: ScenarioCommands,
    ctx: &RapportCliContext,
    output_format: &str,
) -> rapport::Result<()> {
    match cmd {
        ScenarioCommands::Run(args) => {
            let scenario = Scenario::from_path(&args.file)?;
            let outcomes = scenario.run(&ctx.rapport).await?;
            report(
                &scenario,
                &outcomes,
                ctx,
                args.character.as_deref(),
                false,
                output_format,
            )
            .await
        }

        ScenarioCommands::Template => {
            print_json(&Scenario::demo());
            Ok(())
        }
    }
}

async fn report(
    scenario: &Scenario,
    outcomes: &[StepOutcome],
    ctx: &RapportCliContext,
    character: Option<&str>,
    summary_only: bool,
    output_format: &str,
) -> rapport::Result<()> {
    let analytics = ctx.rapport.analytics();

    if output_format == "json" {
        let network = match character {
            Some(character) => Some(analytics.analyze_social_network(character).await?),
            None => None,
        };
        print_json(&json!({
            "scenario": scenario.name,
            "steps": outcomes,
            "relationships": ctx.rapport.relationships().list_all().await?,
            "network": network,
        }));
        return Ok(());
    }

    if !scenario.name.is_empty() {
        println!(
            "{}",
            format!("━━━ {} ━━━", scenario.name)
                .color(CliColors::accent())
                .bold()
        );
    }

    if !summary_only {
        for (index, outcome) in outcomes.iter().enumerate() {
            println!(
                "{} {}",
                format!("{:>2}.", index + 1).color(CliColors::muted()),
                outcome.description
            );
            if let Some(event) = &outcome.event {
                print_event(event);
            }
            println!(
                "    {} strength {:.2} · trust {:.2} · conflict {:.2}",
                format_status(outcome.record.current_status),
                outcome.record.strength,
                outcome.record.trust,
                outcome.record.conflict
            );
        }
        println!();
    }

    for record in ctx.rapport.relationships().list_all().await? {
        print_relationship(&record);
        println!();
    }

    if let Some(character) = character {
        print_network(&analytics.analyze_social_network(character).await?);
        print_arcs(&analytics.generate_relationship_arcs(character).await?);
    }

    println!(
        "{}",
        format_success(&format!("Ran {} steps", outcomes.len()))
    );
    Ok(())
}

//! Simulation command handler

use crate::args::SimulateArgs;
use crate::context::RapportCliContext;
use crate::output::*;
use crate::utils::parse_relationship_type;
use colored::Colorize;
use serde_json::json;

pub async fn handle_simulate_command(
    args: SimulateArgs,
    ctx: &RapportCliContext,
    output_format: &str,
) -> rapport::Result<()> {
    let relationship_type = parse_relationship_type(&args.relationship_type)?;
    let rapport = &ctx.rapport;

    let record = rapport
        .relationships()
        .create(&args.a, &args.b, relationship_type)
        .await?;

    let mut events = Vec::new();
    if let Some(issue) = &args.conflict {
        events.push(
            rapport
                .conflicts()
                .generate_conflict(&args.a, &args.b, issue)
                .await?,
        );
    }
    for _ in 0..args.rounds {
        events.push(
            rapport
                .simulator()
                .simulate_interaction(&args.a, &args.b, &args.interaction, &args.context)
                .await?,
        );
    }
    if let Some(resolution) = &args.resolve {
        events.push(
            rapport
                .conflicts()
                .resolve_conflict(&record.id, resolution)
                .await?,
        );
    }

    let record = rapport
        .relationships()
        .get_by_id(&record.id)
        .await?
        .unwrap_or(record);
    let health = rapport.analytics().analyze_health(&record.id).await?;
    let predictions = rapport.analytics().predict_future(&record.id).await?;
    let suggestions = if record.unresolved_issues.is_empty() {
        Vec::new()
    } else {
        rapport
            .conflicts()
            .suggest_conflict_resolution(&record.id)
            .await?
    };

    if output_format == "json" {
        print_json(&json!({
            "relationship": record,
            "events": events,
            "health": health,
            "predictions": predictions,
            "suggestions": suggestions,
        }));
        return Ok(());
    }

    println!("{}", "━━━ Events ━━━".color(CliColors::info()).bold());
    for event in &events {
        print_event(event);
    }
    println!();
    print_relationship(&record);
    println!();
    print_health(&health);
    println!();
    println!("{}", "━━━ Outlook ━━━".color(CliColors::info()).bold());
    print_predictions(&predictions);

    if !suggestions.is_empty() {
        println!();
        println!("{}", "━━━ Ways forward ━━━".color(CliColors::info()).bold());
        for suggestion in &suggestions {
            println!("  • {}", suggestion);
        }
    }

    Ok(())
}

//! Network analysis command handler

use crate::args::AnalyzeArgs;
use crate::context::RapportCliContext;
use crate::output::*;
use crate::scenario::Scenario;
use colored::Colorize;
use serde_json::json;

pub async fn handle_analyze_command(
    args: AnalyzeArgs,
    ctx: &RapportCliContext,
    output_format: &str,
) -> rapport::Result<()> {
    let scenario = Scenario::from_path(&args.file)?;
    scenario.run(&ctx.rapport).await?;

    let analytics = ctx.rapport.analytics();
    let network = analytics.analyze_social_network(&args.character).await?;
    let arcs = analytics.generate_relationship_arcs(&args.character).await?;

    let mut relationships = Vec::new();
    for arc in &arcs {
        let health = analytics.analyze_health(&arc.relationship_id).await?;
        let predictions = analytics.predict_future(&arc.relationship_id).await?;
        let suggestions = if args.suggestions {
            ctx.rapport
                .conflicts()
                .suggest_conflict_resolution(&arc.relationship_id)
                .await?
        } else {
            Vec::new()
        };
        relationships.push((arc, health, predictions, suggestions));
    }

    if output_format == "json" {
        let details: Vec<_> = relationships
            .iter()
            .map(|(arc, health, predictions, suggestions)| {
                json!({
                    "arc": arc,
                    "health": health,
                    "predictions": predictions,
                    "suggestions": suggestions,
                })
            })
            .collect();
        print_json(&json!({ "network": network, "relationships": details }));
        return Ok(());
    }

    print_network(&network);
    println!();
    print_arcs(&arcs);

    for (arc, health, predictions, suggestions) in &relationships {
        println!();
        println!(
            "{}",
            format!("━━━ {} & {} ━━━", args.character, arc.counterpart)
                .color(CliColors::accent())
                .bold()
        );
        print_health(health);
        print_predictions(predictions);
        for suggestion in suggestions {
            println!("  {} {}", "→".color(CliColors::muted()), suggestion);
        }
    }

    Ok(())
}

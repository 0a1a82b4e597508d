//! Interactive chat handler

use crate::args::ChatArgs;
use crate::context::RapportCliContext;
use crate::output::*;
use crate::scenario::Scenario;
use crate::utils::{parse_mode_kind, split_command};
use colored::Colorize;
use is_terminal::IsTerminal;
use rapport::RapportError;
use rapport::conversation::{
    CharacterProfile, ContextPatch, InteractionContext, InteractionMode,
};
use serde_json::json;
use std::io::{self, Write};

/// What the REPL should do after a command line
enum ChatControl {
    Continue,
    Quit,
}

pub async fn handle_chat_command(
    args: ChatArgs,
    ctx: &RapportCliContext,
    output_format: &str,
) -> rapport::Result<()> {
    if let Some(path) = &args.scenario {
        Scenario::from_path(path)?.run(&ctx.rapport).await?;
    }

    let name = args.name.clone().unwrap_or_else(|| args.character.clone());
    ctx.characters
        .insert(CharacterProfile::new(&args.character).with_name(&name))
        .await;

    let mut mode = InteractionMode::new(parse_mode_kind(&args.mode)?).with_intensity(args.intensity);
    if let Some(focus) = &args.focus {
        mode = mode.with_focus(focus);
    }
    let context = InteractionContext {
        other_characters: args.others.clone(),
        ..InteractionContext::default()
    };

    let conversations = ctx.rapport.conversations();
    let flow = conversations
        .start_conversation(&args.character, mode, context)
        .await?;

    let interactive = io::stdin().is_terminal();
    if interactive && output_format != "json" {
        println!(
            "{}",
            format_info(&format!(
                "Talking to {} in {} mode. Type /quit to finish.",
                name, flow.mode.kind
            ))
        );
    }

    let mut transcript = Vec::new();
    loop {
        if interactive {
            print!("{} ", "you>".color(CliColors::muted()));
            io::stdout()
                .flush()
                .map_err(|e| RapportError::Other(format!("Failed to flush stdout: {}", e)))?;
        }

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .map_err(|e| RapportError::Other(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((command, argument)) = split_command(line) {
            match run_command(ctx, &flow.id, command, argument, output_format).await {
                Ok(ChatControl::Quit) => break,
                Ok(ChatControl::Continue) => {}
                Err(e) => output_error_json(&e, output_format),
            }
            continue;
        }

        match conversations.generate_response(&flow.id, line).await {
            Ok(turn) => {
                if output_format == "json" {
                    transcript.push(turn);
                } else {
                    print_turn(&name, &turn);
                }
            }
            Err(e @ RapportError::Validation(_)) => output_error_json(&e, output_format),
            Err(e) => return Err(e),
        }
    }

    let insights = conversations
        .extract_insights_from_conversation(&flow.id)
        .await?;
    let development = conversations
        .update_character_from_conversation(&flow.id)
        .await?;
    let analysis = conversations.end_conversation(&flow.id).await?;

    if output_format == "json" {
        print_json(&json!({
            "flow_id": flow.id,
            "turns": transcript,
            "insights": insights,
            "development": development,
            "analysis": analysis,
        }));
        return Ok(());
    }

    println!();
    print_flow_analysis(&analysis);
    if !insights.is_empty() {
        println!("{}", "━━━ Insights ━━━".color(CliColors::info()).bold());
        for insight in &insights {
            println!("  • {}", insight);
        }
    }
    println!(
        "{}",
        format_success(&format!(
            "{} leaves feeling mostly {} (growth {:.2})",
            name,
            development.dominant_emotion.as_str(),
            development.growth
        ))
    );

    Ok(())
}

async fn run_command(
    ctx: &RapportCliContext,
    flow_id: &str,
    command: &str,
    argument: &str,
    output_format: &str,
) -> rapport::Result<ChatControl> {
    let conversations = ctx.rapport.conversations();

    match command {
        "quit" | "exit" => return Ok(ChatControl::Quit),
        "mode" => {
            let mode = InteractionMode::new(parse_mode_kind(argument)?);
            let transition = conversations.switch_interaction_mode(flow_id, mode).await?;
            if output_format == "json" {
                print_json(&transition);
            } else {
                println!("{}", transition.content.color(CliColors::character()).italic());
            }
        }
        "mood" | "location" => {
            if argument.is_empty() {
                return Err(RapportError::Validation(format!(
                    "/{} needs a value",
                    command
                )));
            }
            let patch = if command == "mood" {
                ContextPatch {
                    mood: Some(argument.to_string()),
                    ..ContextPatch::default()
                }
            } else {
                ContextPatch {
                    location: Some(argument.to_string()),
                    ..ContextPatch::default()
                }
            };
            let context = conversations.update_interaction_context(flow_id, patch).await?;
            if output_format == "json" {
                print_json(&context);
            } else {
                println!("{}", format_info(&format!("Scene updated: {} {}", command, argument)));
            }
        }
        "insights" => {
            let insights = conversations
                .extract_insights_from_conversation(flow_id)
                .await?;
            if output_format == "json" {
                print_json(&insights);
            } else if insights.is_empty() {
                println!("{}", format_info("Nothing stands out yet."));
            } else {
                for insight in &insights {
                    println!("  • {}", insight);
                }
            }
        }
        "analyze" => {
            let analysis = conversations.analyze_conversation_flow(flow_id).await?;
            if output_format == "json" {
                print_json(&analysis);
            } else {
                print_flow_analysis(&analysis);
            }
        }
        other => {
            return Err(RapportError::Validation(format!(
                "Unknown command: /{} (try /mode, /mood, /location, /insights, /analyze or /quit)",
                other
            )));
        }
    }

    Ok(ChatControl::Continue)
}

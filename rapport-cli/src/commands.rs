//! Command enum definitions
//!
//! This module contains all CLI command enums that define the command structure.

use crate::args::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rapport-cli")]
#[command(about = "Relationship dynamics and conversation engine CLI", long_about = None)]
#[command(version = rapport::VERSION)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON); defaults to rapport.* in the working directory
    #[arg(long, short = 'C', global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json) - use json for tool integration
    #[arg(long, short, default_value = "table", global = true)]
    pub output: String,

    /// Use machine-readable output (alias for --output json)
    #[arg(long, global = true)]
    pub machine: bool,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (suppress all logging output)
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display version information
    Version,

    /// Run the built-in Alice and Bob scenario
    Demo(DemoArgs),

    /// Scripted relationship scenarios
    #[command(subcommand)]
    Scenario(ScenarioCommands),

    /// Simulate interactions between two characters
    #[command(
        long_about = r#"
Create a relationship between two characters and run a number of simulated
interactions on it, optionally wrapped around a conflict.

Each interaction is positive while the pair's conflict level stays at or
below the polarity threshold (relationships.conflict_polarity_threshold,
0.5 by default) and negative above it.

EXAMPLES:
  rapport-cli simulate Alice Bob --type friend --rounds 5
  rapport-cli simulate Ines Oskar --type romantic --conflict "the move" --resolve "talked it over"
"#
    )]
    Simulate(SimulateArgs),

    /// Analyse a character's relationship network after running a scenario
    Analyze(AnalyzeArgs),

    /// Talk to a character interactively
    #[command(
        long_about = r#"
Start an interactive conversation with a character using the built-in offline
response generator.

COMMANDS DURING THE CHAT:
  /mode <kind>        switch interaction mode (casual, therapy, conflict, romantic,
                      mentoring, adventure, bonding)
  /mood <text>        update the scene mood
  /location <text>    update the scene location
  /insights           show insights gathered so far
  /analyze            show flow metrics
  /quit               end the conversation and print the summary
"#
    )]
    Chat(ChatArgs),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Subcommand)]
pub enum ScenarioCommands {
    /// Run a scenario script
    Run(RunScenarioArgs),

    /// Print an example scenario script
    Template,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show(ShowConfigArgs),
}

//! Command argument structures
//!
//! This module contains all CLI argument structs organized by command category.

use clap::Args;
use std::path::PathBuf;

// Scenario command arguments
#[derive(Args)]
pub struct RunScenarioArgs {
    /// Scenario script (JSON)
    pub file: PathBuf,

    /// Print a relationship report for this character once the script has run
    #[arg(long, short)]
    pub character: Option<String>,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Only print the final report
    #[arg(long)]
    pub summary_only: bool,
}

// Simulation arguments
#[derive(Args)]
pub struct SimulateArgs {
    /// First character
    pub a: String,

    /// Second character
    pub b: String,

    /// Relationship type (friend, enemy, family, romantic, mentor, rival, colleague, acquaintance)
    #[arg(long = "type", short = 't', default_value = "friend")]
    pub relationship_type: String,

    /// Interaction type recorded on each event
    #[arg(long, short, default_value = "conversation")]
    pub interaction: String,

    /// Free-text context for the interactions
    #[arg(long, default_value = "")]
    pub context: String,

    /// Number of interactions to simulate
    #[arg(long, short, default_value_t = 3)]
    pub rounds: usize,

    /// Open a conflict over this issue before simulating
    #[arg(long)]
    pub conflict: Option<String>,

    /// Resolve the opened conflict after simulating
    #[arg(long, requires = "conflict")]
    pub resolve: Option<String>,
}

// Analysis arguments
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Scenario script (JSON) that sets up the relationships
    pub file: PathBuf,

    /// Character whose network is analysed
    #[arg(long, short)]
    pub character: String,

    /// Include conflict resolution suggestions for each relationship
    #[arg(long)]
    pub suggestions: bool,
}

// Chat arguments
#[derive(Args)]
pub struct ChatArgs {
    /// Character to talk to
    #[arg(long, short)]
    pub character: String,

    /// Display name of the character
    #[arg(long)]
    pub name: Option<String>,

    /// Interaction mode (casual, therapy, conflict, romantic, mentoring, adventure, bonding)
    #[arg(long, short, default_value = "casual")]
    pub mode: String,

    /// Mode intensity (0.0 to 1.0)
    #[arg(long, default_value_t = 0.5)]
    pub intensity: f64,

    /// What the conversation should focus on
    #[arg(long)]
    pub focus: Option<String>,

    /// Other characters present in the scene
    #[arg(long = "with", short = 'w')]
    pub others: Vec<String>,

    /// Scenario script that seeds relationships before the chat
    #[arg(long)]
    pub scenario: Option<PathBuf>,
}

// Config arguments
#[derive(Args)]
pub struct ShowConfigArgs {
    /// Show only this section (logging, relationships, conversation)
    #[arg(long, short)]
    pub section: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(clap::ValueEnum, Clone, Copy)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

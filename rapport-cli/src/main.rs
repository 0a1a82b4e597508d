use clap::{CommandFactory, Parser};
use rapport_cli::commands::{Cli, Commands};
use rapport_cli::context::RapportCliContext;
use rapport_cli::handlers::*;
use rapport_cli::output::output_error_json;
use std::io;
use tracing::{Level, debug};

#[tokio::main]
async fn main() {
    let cli_args = Cli::parse();

    // Priority: machine flag > env var > cli arg
    let output_format = if cli_args.machine {
        "json".to_string()
    } else if let Ok(env_output) = std::env::var("RAPPORT_OUTPUT") {
        env_output
    } else {
        cli_args.output.clone()
    };

    let is_quiet = cli_args.quiet
        || std::env::var("RAPPORT_QUIET")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

    // Machine mode keeps stderr clean apart from errors
    let log_level = if is_quiet || cli_args.machine {
        Level::ERROR
    } else if cli_args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli_args, &output_format).await {
        output_error_json(&e, &output_format);
        std::process::exit(1);
    }
}

async fn run(cli_args: Cli, output_format: &str) -> rapport::Result<()> {
    match &cli_args.command {
        Commands::Version => {
            println!("Rapport CLI v{}", rapport::VERSION);
            return Ok(());
        }
        Commands::Completions(args) => {
            let mut command = Cli::command();
            clap_complete::generate(
                clap_complete::Shell::from(args.shell),
                &mut command,
                "rapport-cli",
                &mut io::stdout(),
            );
            return Ok(());
        }
        _ => {}
    }

    let ctx = RapportCliContext::new(cli_args.config.as_deref()).await?;
    debug!("Engine ready: {:?}", ctx.rapport);

    match cli_args.command {
        Commands::Demo(args) => handle_demo_command(args, &ctx, output_format).await,
        Commands::Scenario(cmd) => handle_scenario_command(cmd, &ctx, output_format).await,
        Commands::Simulate(args) => handle_simulate_command(args, &ctx, output_format).await,
        Commands::Analyze(args) => handle_analyze_command(args, &ctx, output_format).await,
        Commands::Chat(args) => handle_chat_command(args, &ctx, output_format).await,
        Commands::Config(cmd) => handle_config_command(cmd, ctx.rapport.config()),
        Commands::Version | Commands::Completions(_) => Ok(()),
    }
}

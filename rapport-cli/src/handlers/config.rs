//! Configuration command handler

use crate::args::ShowConfigArgs;
use crate::commands::ConfigCommands;
use crate::output::*;
use rapport::RapportError;
use rapport::config::RapportConfig;

/// Print the effective configuration; config output is always JSON
pub fn handle_config_command(cmd: ConfigCommands, config: &RapportConfig) -> rapport::Result<()> {
    match cmd {
        ConfigCommands::Show(ShowConfigArgs { section }) => {
            match section.as_deref() {
                None => print_json(config),
                Some("logging") => print_json(&config.logging),
                Some("relationships") => print_json(&config.relationships),
                Some("conversation") => print_json(&config.conversation),
                Some(other) => {
                    return Err(RapportError::Validation(format!(
                        "Unknown config section: {} (expected logging, relationships or conversation)",
                        other
                    )));
                }
            }
            Ok(())
        }
    }
}

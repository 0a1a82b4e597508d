//! Command handlers for the Rapport CLI

pub mod analyze;
pub mod chat;
pub mod config;
pub mod scenario;
pub mod simulate;

pub use analyze::handle_analyze_command;
pub use chat::handle_chat_command;
pub use config::handle_config_command;
pub use scenario::{handle_demo_command, handle_scenario_command};
pub use simulate::handle_simulate_command;

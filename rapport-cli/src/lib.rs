pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;
pub mod scenario;
pub mod utils;

pub use context::{RapportCliContext, load_config};
pub use output::{
    CliColors, format_error, format_info, format_metric, format_status, format_success,
    format_warning, output_error_json, print_arcs, print_event, print_flow_analysis, print_health,
    print_json, print_network, print_relationship, print_turn,
};
pub use scenario::{Scenario, ScenarioStep, StepOutcome};
pub use utils::{parse_mode_kind, parse_relationship_type, split_command};

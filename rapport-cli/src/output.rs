use colored::*;
use rapport::RapportError;
use rapport::conversation::{ConversationTurn, Emotion, FlowAnalysis};
use rapport::relationships::{
    EventType, HealthReport, NetworkSummary, RelationshipArc, RelationshipEvent,
    RelationshipRecord, RelationshipStatus,
};
use serde::Serialize;
use serde_json::json;

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn character() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn primary() -> Color {
        Color::White
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }
}

/// Output a RapportError, as structured JSON in json mode
pub fn output_error_json(error: &RapportError, output_format: &str) {
    if output_format == "json" {
        let (code, details) = match error {
            RapportError::NotFound { entity_type, id } => (
                "NOT_FOUND",
                Some(json!({ "entity_type": entity_type, "id": id })),
            ),
            RapportError::SessionNotActive { flow_id } => {
                ("SESSION_NOT_ACTIVE", Some(json!({ "flow_id": flow_id })))
            }
            RapportError::SessionAlreadyActive { character_id } => (
                "SESSION_ALREADY_ACTIVE",
                Some(json!({
                    "character_id": character_id,
                    "hint": "Set conversation.start_policy = \"replace\" to close the previous flow"
                })),
            ),
            RapportError::AlreadyExists { id } => ("ALREADY_EXISTS", Some(json!({ "id": id }))),
            RapportError::ResponseGenerationFailed(_) => ("RESPONSE_GENERATION_FAILED", None),
            RapportError::Validation(_) => ("VALIDATION_ERROR", None),
            RapportError::Configuration(_) => ("CONFIGURATION_ERROR", None),
            RapportError::Logging(_) => ("LOGGING_ERROR", None),
            RapportError::Other(_) => ("OTHER_ERROR", None),
        };

        let mut error_response = json!({
            "error": true,
            "code": code,
            "message": error.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if let Some(details) = details {
            error_response["details"] = details;
        }

        eprintln!(
            "{}",
            serde_json::to_string_pretty(&error_response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        eprintln!("{}", format_error(&error.to_string()));
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn format_success(msg: &str) -> String {
    format!(
        "{} {}",
        "✓".color(CliColors::success()).bold(),
        msg.color(CliColors::success())
    )
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

pub fn format_status(status: RelationshipStatus) -> ColoredString {
    let label = format!("{:?}", status);
    match status {
        RelationshipStatus::Growing => label.color(CliColors::success()),
        RelationshipStatus::Stable => label.color(CliColors::info()),
        RelationshipStatus::Reconciling => label.color(CliColors::warning()),
        RelationshipStatus::Conflicted | RelationshipStatus::Declining => {
            label.color(CliColors::error()).bold()
        }
    }
}

pub fn format_event_type(event_type: EventType) -> ColoredString {
    let label = format!("{:?}", event_type);
    match event_type {
        EventType::Positive => label.color(CliColors::success()),
        EventType::Reconciliation => label.color(CliColors::warning()),
        EventType::Negative | EventType::Conflict => label.color(CliColors::error()),
        EventType::Neutral => label.color(CliColors::muted()),
    }
}

pub fn format_emotion(emotion: Emotion) -> ColoredString {
    match emotion {
        Emotion::Joy => "joy".color(CliColors::success()),
        Emotion::Sadness => "sadness".color(CliColors::info()),
        Emotion::Anger | Emotion::Contempt => emotion.as_str().color(CliColors::error()),
        Emotion::Fear | Emotion::Surprise => emotion.as_str().color(CliColors::warning()),
        Emotion::Neutral => "neutral".color(CliColors::muted()),
    }
}

/// Ten-cell bar for a value in [0, 1]
pub fn format_metric(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!(
        "{}{} {:.2}",
        "█".repeat(filled).color(CliColors::accent()),
        "░".repeat(10 - filled).color(CliColors::muted()),
        value
    )
}

pub fn print_relationship(record: &RelationshipRecord) {
    println!(
        "{}",
        format!(
            "━━━ {} & {} ({}) ━━━",
            record.character_a, record.character_b, record.relationship_type
        )
        .color(CliColors::info())
        .bold()
    );
    println!(
        "{}: {}",
        "ID".color(CliColors::muted()),
        record.id.color(CliColors::accent())
    );
    println!(
        "{}: {}",
        "Status".color(CliColors::muted()),
        format_status(record.current_status)
    );
    for (label, value) in [
        ("Strength", record.strength),
        ("Trust", record.trust),
        ("Intimacy", record.intimacy),
        ("Conflict", record.conflict),
    ] {
        println!("{:<10} {}", label.color(CliColors::muted()), format_metric(value));
    }
    if !record.shared_experiences.is_empty() {
        println!(
            "{}: {}",
            "Shared".color(CliColors::muted()),
            record.shared_experiences.join(", ")
        );
    }
    if !record.unresolved_issues.is_empty() {
        println!(
            "{}: {}",
            "Open issues".color(CliColors::muted()),
            record.unresolved_issues.join(", ").color(CliColors::warning())
        );
    }
    println!(
        "{}: {} events",
        "History".color(CliColors::muted()),
        record.history.len()
    );
}

pub fn print_event(event: &RelationshipEvent) {
    println!(
        "  {} {:+.2} {}",
        format_event_type(event.event_type),
        event.impact,
        event.description.color(CliColors::primary())
    );
    if !event.consequences.is_empty() {
        println!(
            "    {}",
            event.consequences.join(", ").color(CliColors::muted())
        );
    }
}

pub fn print_health(health: &HealthReport) {
    println!("{}", "━━━ Health ━━━".color(CliColors::info()).bold());
    for (label, value) in [
        ("Overall", health.overall),
        ("Compatibility", health.compatibility),
        ("Communication", health.communication),
        ("Stability", health.stability),
        ("Attraction", health.attraction),
        ("Resolution", health.conflict_resolution),
        ("Growth", health.growth_potential),
    ] {
        println!("{:<14} {}", label.color(CliColors::muted()), format_metric(value));
    }
}

pub fn print_predictions(predictions: &[String]) {
    if predictions.is_empty() {
        println!("{}", format_info("No strong signals either way."));
        return;
    }
    for prediction in predictions {
        println!("  • {}", prediction);
    }
}

pub fn print_network(summary: &NetworkSummary) {
    println!(
        "{}",
        format!("━━━ Network of {} ━━━", summary.character_id)
            .color(CliColors::accent())
            .bold()
    );
    if summary.total == 0 {
        println!("{}", format_info("No relationships found."));
        return;
    }
    println!(
        "{}: {}  {}: {}  {}: {}  {}: {}",
        "Total".color(CliColors::muted()),
        summary.total,
        "Strong".color(CliColors::muted()),
        summary.strong,
        "Trusted".color(CliColors::muted()),
        summary.trusted,
        "Conflicted".color(CliColors::muted()),
        summary.conflicted
    );
    for (relationship_type, count) in &summary.type_counts {
        println!("  {:<14} {}", relationship_type.as_str(), count);
    }
    println!("{:<14} {}", "Avg trust".color(CliColors::muted()), format_metric(summary.average_trust));
    println!(
        "{:<14} {}",
        "Avg conflict".color(CliColors::muted()),
        format_metric(summary.average_conflict)
    );
}

pub fn print_arcs(arcs: &[RelationshipArc]) {
    for arc in arcs {
        println!(
            "{} {} ({}) {} {:+.2}",
            "▸".color(CliColors::accent()),
            arc.counterpart.color(CliColors::character()).bold(),
            arc.relationship_type,
            arc.shape.to_string().color(CliColors::info()),
            arc.net_impact
        );
        println!(
            "    {}: {}",
            "Next".color(CliColors::muted()),
            arc.next_beat
        );
        if !arc.turning_points.is_empty() {
            println!(
                "    {}: {}",
                "Turning points".color(CliColors::muted()),
                arc.turning_points
                    .iter()
                    .map(|e| e.description.as_str())
                    .collect::<Vec<_>>()
                    .join(" → ")
            );
        }
    }
}

pub fn print_turn(name: &str, turn: &ConversationTurn) {
    let response = &turn.response;
    println!(
        "{} {}",
        format!("{}:", name).color(CliColors::character()).bold(),
        response.content
    );
    println!(
        "  {} {} ({:.2}) · {} · {}",
        "⤷".color(CliColors::muted()),
        format_emotion(response.emotion),
        response.intensity,
        response.body_language.color(CliColors::muted()),
        response.voice_tone.color(CliColors::muted())
    );
    if let Some(memory) = &response.memory_triggered {
        println!("  {} {}", "memory:".color(CliColors::muted()), memory);
    }
    if let Some(impact) = &response.relationship_impact {
        println!("  {} {}", "relationship:".color(CliColors::muted()), impact);
    }
    if let Some(insight) = &response.development_insight {
        println!("  {} {}", "growth:".color(CliColors::muted()), insight);
    }
    if response.degraded {
        println!("{}", format_warning("The response generator did not answer; using a fallback line."));
    }
}

pub fn print_flow_analysis(analysis: &FlowAnalysis) {
    println!("{}", "━━━ Conversation ━━━".color(CliColors::info()).bold());
    println!(
        "{}: {}   {}: {}s",
        "Messages".color(CliColors::muted()),
        analysis.message_count,
        "Duration".color(CliColors::muted()),
        analysis.duration_seconds
    );
    for (label, value) in [
        ("Range", analysis.emotional_range),
        ("Depth", analysis.depth),
        ("Progress", analysis.development_progress),
        ("Effectiveness", analysis.mode_effectiveness),
    ] {
        println!("{:<14} {}", label.color(CliColors::muted()), format_metric(value));
    }
    if analysis.relationship_change_count > 0 {
        println!(
            "{}: {}",
            "Relationship moments".color(CliColors::muted()),
            analysis.relationship_change_count
        );
    }
}

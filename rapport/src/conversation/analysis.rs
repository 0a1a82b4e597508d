//! Metrics, insights and development summaries derived from a conversation flow.

use super::tables::preferred_emotions;
use super::types::{CharacterDevelopment, ConversationFlow, Emotion, FlowAnalysis};
use crate::relationships::types::clamp_unit;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

const EMOTION_COUNT: f64 = Emotion::ALL.len() as f64;

/// Analyse `flow` as of `now` (closed flows are measured up to their close time)
pub fn analyze_flow(flow: &ConversationFlow, now: DateTime<Utc>) -> FlowAnalysis {
    let end = flow.closed_at.unwrap_or(now);
    let duration_seconds = (end - flow.start_time).num_seconds().max(0);

    let message_count = flow.messages.len();
    if message_count == 0 {
        return FlowAnalysis {
            flow_id: flow.id.clone(),
            duration_seconds,
            message_count: 0,
            emotional_range: 0.0,
            depth: 0.0,
            relationship_change_count: 0,
            development_progress: 0.0,
            mode_effectiveness: 0.0,
        };
    }

    let distinct: BTreeSet<Emotion> = flow.emotional_arc.iter().copied().collect();
    let emotional_range = distinct.len() as f64 / EMOTION_COUNT;

    let average_intensity =
        flow.messages.iter().map(|m| m.intensity).sum::<f64>() / message_count as f64;
    let depth = (average_intensity + emotional_range) / 2.0;

    let preferred = preferred_emotions(flow.mode.kind);
    let aligned = flow
        .emotional_arc
        .iter()
        .filter(|e| preferred.contains(e))
        .count();
    let alignment = aligned as f64 / message_count as f64;

    let mode_effectiveness =
        clamp_unit(0.4 * alignment + 0.3 * depth + 0.3 * flow.development_progress);

    FlowAnalysis {
        flow_id: flow.id.clone(),
        duration_seconds,
        message_count,
        emotional_range,
        depth,
        relationship_change_count: flow.relationship_changes.len(),
        development_progress: flow.development_progress,
        mode_effectiveness,
    }
}

/// Most frequent emotion in the arc; ties resolve in [`Emotion::ALL`] order.
/// Neutral for an empty arc.
pub fn dominant_emotion(arc: &[Emotion]) -> Emotion {
    let mut counts: BTreeMap<Emotion, usize> = BTreeMap::new();
    for emotion in arc {
        *counts.entry(*emotion).or_insert(0) += 1;
    }

    let mut best = (Emotion::Neutral, 0);
    for emotion in Emotion::ALL {
        let count = counts.get(&emotion).copied().unwrap_or(0);
        if count > best.1 {
            best = (emotion, count);
        }
    }
    best.0
}

/// Human-readable observations about the conversation so far
pub fn extract_insights(flow: &ConversationFlow) -> Vec<String> {
    let mut insights = Vec::new();
    if flow.messages.is_empty() {
        return insights;
    }

    insights.push(format!(
        "Dominant emotion: {}",
        dominant_emotion(&flow.emotional_arc)
    ));

    let shifts = flow
        .emotional_arc
        .windows(2)
        .filter(|pair| pair[0] != pair[1])
        .count();
    insights.push(format!("Emotional shifts: {}", shifts));

    let recurring = recurring_topics(&flow.topics);
    if !recurring.is_empty() {
        insights.push(format!("Recurring topics: {}", recurring.join(", ")));
    }

    for message in &flow.messages {
        if let Some(memory) = &message.memory_triggered {
            insights.push(format!("Memory: {}", memory));
        }
        if let Some(development) = &message.development_insight {
            insights.push(format!("Development: {}", development));
        }
    }

    let degraded = flow.messages.iter().filter(|m| m.degraded).count();
    if degraded > 0 {
        insights.push(format!("Degraded turns: {}", degraded));
    }

    insights
}

/// Topics mentioned at least twice, in order of first mention
fn recurring_topics(topics: &[String]) -> Vec<String> {
    let mut seen: Vec<&String> = Vec::new();
    for topic in topics {
        if !seen.contains(&topic) {
            seen.push(topic);
        }
    }
    seen.into_iter()
        .filter(|topic| topics.iter().filter(|t| t == topic).count() > 1)
        .cloned()
        .collect()
}

pub fn build_development(flow: &ConversationFlow) -> CharacterDevelopment {
    CharacterDevelopment {
        character_id: flow.character_id.clone(),
        flow_id: flow.id.clone(),
        dominant_emotion: dominant_emotion(&flow.emotional_arc),
        emotional_arc: flow.emotional_arc.clone(),
        growth: flow.development_progress,
        insights: extract_insights(flow),
        relationship_notes: flow.relationship_changes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{
        CharacterResponse, InteractionContext, InteractionMode, ModeKind, ResponseKind,
    };

    const EPSILON: f64 = 1e-9;

    fn message(emotion: Emotion, intensity: f64) -> CharacterResponse {
        CharacterResponse {
            content: "...".to_string(),
            emotion,
            intensity,
            body_language: String::new(),
            voice_tone: String::new(),
            thought_process: String::new(),
            memory_triggered: None,
            relationship_impact: None,
            development_insight: None,
            degraded: false,
            kind: ResponseKind::Turn,
            timestamp: Utc::now(),
        }
    }

    fn flow(kind: ModeKind) -> ConversationFlow {
        ConversationFlow::new(
            "flow".to_string(),
            "mira",
            InteractionMode::new(kind),
            InteractionContext::default(),
        )
    }

    #[test]
    fn test_empty_flow_is_zero() {
        let analysis = analyze_flow(&flow(ModeKind::Casual), Utc::now());
        assert_eq!(analysis.message_count, 0);
        assert_eq!(analysis.emotional_range, 0.0);
        assert_eq!(analysis.depth, 0.0);
        assert_eq!(analysis.mode_effectiveness, 0.0);
        assert!(extract_insights(&flow(ModeKind::Casual)).is_empty());
    }

    #[test]
    fn test_flow_metrics() {
        let mut flow = flow(ModeKind::Therapy);
        flow.push_message(message(Emotion::Sadness, 0.8));
        flow.push_message(message(Emotion::Joy, 0.4));
        flow.development_progress = 0.2;

        let analysis = analyze_flow(&flow, Utc::now());
        let range = 2.0 / 7.0;
        let depth = (0.6 + range) / 2.0;
        let expected = 0.4 * 0.5 + 0.3 * depth + 0.3 * 0.2;

        assert_eq!(analysis.message_count, 2);
        assert!((analysis.emotional_range - range).abs() < EPSILON);
        assert!((analysis.depth - depth).abs() < EPSILON);
        assert!((analysis.mode_effectiveness - expected).abs() < EPSILON);
    }

    #[test]
    fn test_dominant_emotion_ties_follow_declaration_order() {
        assert_eq!(dominant_emotion(&[]), Emotion::Neutral);
        assert_eq!(
            dominant_emotion(&[Emotion::Fear, Emotion::Anger]),
            Emotion::Anger
        );
        assert_eq!(
            dominant_emotion(&[Emotion::Fear, Emotion::Anger, Emotion::Fear]),
            Emotion::Fear
        );
    }

    #[test]
    fn test_insights() {
        let mut flow = flow(ModeKind::Casual);
        let mut remembering = message(Emotion::Sadness, 0.5);
        remembering.memory_triggered = Some("Reminded of the lighthouse".to_string());
        let mut degraded = message(Emotion::Neutral, 0.5);
        degraded.degraded = true;

        flow.push_message(remembering);
        flow.push_message(degraded);
        flow.topics = vec!["lighthouse".into(), "storm".into(), "lighthouse".into()];

        let insights = extract_insights(&flow);
        assert_eq!(insights[0], "Dominant emotion: sadness");
        assert_eq!(insights[1], "Emotional shifts: 1");
        assert_eq!(insights[2], "Recurring topics: lighthouse");
        assert!(insights.contains(&"Memory: Reminded of the lighthouse".to_string()));
        assert_eq!(insights.last().unwrap(), "Degraded turns: 1");
    }
}

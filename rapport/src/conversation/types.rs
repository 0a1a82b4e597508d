//! Conversation data structures

use crate::{RapportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emotions recognised in user input and attached to responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Contempt,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Contempt,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Contempt => "contempt",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == lowered)
            .ok_or_else(|| format!("Invalid emotion: {}", s))
    }
}

/// Coarse intensity band used by the body language table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntensityBucket {
    Low,
    Medium,
    High,
}

impl IntensityBucket {
    pub fn of(intensity: f64) -> Self {
        if intensity >= 0.7 {
            IntensityBucket::High
        } else if intensity >= 0.4 {
            IntensityBucket::Medium
        } else {
            IntensityBucket::Low
        }
    }
}

/// What the user is trying to do with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Question,
    Command,
    Emotion,
    Statement,
}

/// Kind of interaction a conversation is running in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Casual,
    Therapy,
    Conflict,
    Bonding,
    Romantic,
    Mentoring,
    Adventure,
}

impl ModeKind {
    pub const ALL: [ModeKind; 7] = [
        ModeKind::Casual,
        ModeKind::Therapy,
        ModeKind::Conflict,
        ModeKind::Bonding,
        ModeKind::Romantic,
        ModeKind::Mentoring,
        ModeKind::Adventure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Casual => "casual",
            ModeKind::Therapy => "therapy",
            ModeKind::Conflict => "conflict",
            ModeKind::Bonding => "bonding",
            ModeKind::Romantic => "romantic",
            ModeKind::Mentoring => "mentoring",
            ModeKind::Adventure => "adventure",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        ModeKind::ALL
            .into_iter()
            .find(|m| m.as_str() == lowered)
            .ok_or_else(|| format!("Invalid interaction mode: {}", s))
    }
}

/// Shape of a conversation: kind, how hard to lean into it, and what it is for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionMode {
    pub kind: ModeKind,
    pub intensity: f64,
    pub focus: String,
    pub duration_minutes: u32,
    pub goals: Vec<String>,
}

impl InteractionMode {
    /// Mode of the given kind at medium intensity for half an hour
    pub fn new(kind: ModeKind) -> Self {
        Self {
            kind,
            intensity: 0.5,
            focus: String::new(),
            duration_minutes: 30,
            goals: Vec::new(),
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = focus.into();
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goals.push(goal.into());
        self
    }

    /// Reject out-of-range intensity and durations outside `1..=max_duration_minutes`
    pub fn validate(&self, max_duration_minutes: u32) -> Result<()> {
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(RapportError::Validation(format!(
                "mode intensity must be within [0, 1], got {}",
                self.intensity
            )));
        }
        if self.duration_minutes == 0 || self.duration_minutes > max_duration_minutes {
            return Err(RapportError::Validation(format!(
                "mode duration must be between 1 and {} minutes, got {}",
                max_duration_minutes, self.duration_minutes
            )));
        }
        Ok(())
    }
}

/// Scene the conversation takes place in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionContext {
    pub scene: String,
    pub mood: String,
    pub time_of_day: String,
    pub location: String,
    pub other_characters: Vec<String>,
    pub recent_events: Vec<String>,
    pub emotional_state: String,
    pub tone: String,
}

/// Partial update for an [`InteractionContext`]. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextPatch {
    pub scene: Option<String>,
    pub mood: Option<String>,
    pub time_of_day: Option<String>,
    pub location: Option<String>,
    pub other_characters: Option<Vec<String>>,
    pub recent_events: Option<Vec<String>>,
    pub emotional_state: Option<String>,
    pub tone: Option<String>,
}

impl ContextPatch {
    pub fn apply_to(self, context: &mut InteractionContext) {
        let ContextPatch {
            scene,
            mood,
            time_of_day,
            location,
            other_characters,
            recent_events,
            emotional_state,
            tone,
        } = self;

        if let Some(scene) = scene {
            context.scene = scene;
        }
        if let Some(mood) = mood {
            context.mood = mood;
        }
        if let Some(time_of_day) = time_of_day {
            context.time_of_day = time_of_day;
        }
        if let Some(location) = location {
            context.location = location;
        }
        if let Some(others) = other_characters {
            context.other_characters = others;
        }
        if let Some(events) = recent_events {
            context.recent_events = events;
        }
        if let Some(state) = emotional_state {
            context.emotional_state = state;
        }
        if let Some(tone) = tone {
            context.tone = tone;
        }
    }
}

/// Whether a message answered the user or marks a mode switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Turn,
    Transition,
}

/// One enriched character message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterResponse {
    pub content: String,
    pub emotion: Emotion,
    pub intensity: f64,
    pub body_language: String,
    pub voice_tone: String,
    pub thought_process: String,
    pub memory_triggered: Option<String>,
    pub relationship_impact: Option<String>,
    pub development_insight: Option<String>,
    /// Set when the generator failed and a fallback line was substituted
    pub degraded: bool,
    pub kind: ResponseKind,
    pub timestamp: DateTime<Utc>,
}

/// Result of classifying one user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputAnalysis {
    pub emotion: Emotion,
    pub intensity: f64,
    pub intent: Intent,
    pub topics: Vec<String>,
}

/// What `generate_response` hands back: the classification of the user's input
/// (before any generator override) and the appended response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub analysis: InputAnalysis,
    pub response: CharacterResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    Active,
    Closed,
}

/// Session state of one user/character conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationFlow {
    pub id: String,
    pub character_id: String,
    pub start_time: DateTime<Utc>,
    pub state: FlowState,
    pub closed_at: Option<DateTime<Utc>>,
    pub mode: InteractionMode,
    pub context: InteractionContext,
    pub messages: Vec<CharacterResponse>,
    pub insights: Vec<String>,
    /// One entry per message, in message order
    pub emotional_arc: Vec<Emotion>,
    pub relationship_changes: Vec<String>,
    /// Topics raised by the user, one entry per mention
    pub topics: Vec<String>,
    pub development_progress: f64,
}

impl ConversationFlow {
    pub(crate) fn new(
        id: String,
        character_id: &str,
        mode: InteractionMode,
        context: InteractionContext,
    ) -> Self {
        Self {
            id,
            character_id: character_id.to_string(),
            start_time: Utc::now(),
            state: FlowState::Active,
            closed_at: None,
            mode,
            context,
            messages: Vec::new(),
            insights: Vec::new(),
            emotional_arc: Vec::new(),
            relationship_changes: Vec::new(),
            topics: Vec::new(),
            development_progress: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == FlowState::Active
    }

    /// Append a message together with its arc entry
    pub(crate) fn push_message(&mut self, response: CharacterResponse) {
        self.emotional_arc.push(response.emotion);
        self.messages.push(response);
    }

    pub(crate) fn close(&mut self) {
        self.state = FlowState::Closed;
        self.closed_at = Some(Utc::now());
    }
}

/// Metrics over a conversation so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAnalysis {
    pub flow_id: String,
    pub duration_seconds: i64,
    pub message_count: usize,
    /// Distinct emotions over the seven known
    pub emotional_range: f64,
    pub depth: f64,
    pub relationship_change_count: usize,
    pub development_progress: f64,
    pub mode_effectiveness: f64,
}

/// Summary handed to the character state provider after a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDevelopment {
    pub character_id: String,
    pub flow_id: String,
    pub dominant_emotion: Emotion,
    pub emotional_arc: Vec<Emotion>,
    pub growth: f64,
    pub insights: Vec<String>,
    pub relationship_notes: Vec<String>,
}

//! External collaborators of the orchestrator: text generation and character state.
//!
//! Both are async traits so that model-backed or store-backed implementations can be
//! plugged in. The offline implementations here keep the engine usable without either.

use super::classifier;
use super::types::{
    CharacterDevelopment, CharacterResponse, Emotion, InteractionContext, InteractionMode, ModeKind,
};
use crate::{RapportError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Personality snapshot of a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub id: String,
    pub name: String,
    pub personality: Vec<String>,
    pub goals: Vec<String>,
    pub voice: String,
}

impl CharacterProfile {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            personality: Vec::new(),
            goals: Vec::new(),
            voice: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_trait(mut self, personality_trait: impl Into<String>) -> Self {
        self.personality.push(personality_trait.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goals.push(goal.into());
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }
}

/// Raw output of a response generator.
///
/// `emotion` and `intensity` override what the orchestrator detected in the user's
/// input when present; intensity is clamped to [0, 1] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReply {
    pub content: String,
    pub emotion: Option<Emotion>,
    pub intensity: Option<f64>,
}

impl GeneratedReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            emotion: None,
            intensity: None,
        }
    }
}

/// Produces a character's reply to user input
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(
        &self,
        character: &CharacterProfile,
        user_input: &str,
        history: &[CharacterResponse],
        context: &InteractionContext,
        mode: &InteractionMode,
    ) -> Result<GeneratedReply>;
}

/// Supplies character profiles and receives development summaries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterStateProvider: Send + Sync {
    async fn character_state(&self, character_id: &str) -> Result<CharacterProfile>;

    /// Called by `update_character_from_conversation`; ignored unless overridden
    async fn record_development(&self, development: CharacterDevelopment) -> Result<()> {
        let _ = development;
        Ok(())
    }
}

/// Offline generator that answers from fixed templates.
///
/// Deterministic: the same profile, input and mode always give the same reply.
#[derive(Debug, Clone, Default)]
pub struct TemplateResponseGenerator;

impl TemplateResponseGenerator {
    pub fn new() -> Self {
        Self
    }

    fn opener(mode: ModeKind, emotion: Emotion) -> &'static str {
        match (mode, emotion) {
            (ModeKind::Therapy, Emotion::Sadness) => "That sounds really painful.",
            (ModeKind::Therapy, _) => "Thank you for telling me that.",
            (ModeKind::Conflict, Emotion::Anger | Emotion::Contempt) => {
                "You don't get to talk to me like that."
            }
            (ModeKind::Conflict, _) => "We still have to settle this.",
            (ModeKind::Romantic, _) => "I like hearing you say that.",
            (ModeKind::Mentoring, _) => "Let's work through it together.",
            (ModeKind::Adventure, Emotion::Fear) => "Stay close to me.",
            (ModeKind::Adventure, _) => "Then let's keep moving.",
            (_, Emotion::Joy) => "That's wonderful to hear!",
            (_, Emotion::Sadness) => "I'm sorry, that's hard.",
            (_, Emotion::Anger) => "I can tell that got under your skin.",
            (_, Emotion::Fear) => "It's alright to be scared.",
            (_, Emotion::Surprise) => "I didn't see that coming either.",
            (_, Emotion::Contempt) => "You really don't think much of it, do you?",
            (_, Emotion::Neutral) => "I see.",
        }
    }
}

#[async_trait]
impl ResponseGenerator for TemplateResponseGenerator {
    async fn generate(
        &self,
        character: &CharacterProfile,
        user_input: &str,
        _history: &[CharacterResponse],
        _context: &InteractionContext,
        mode: &InteractionMode,
    ) -> Result<GeneratedReply> {
        let analysis = classifier::analyze(user_input);
        let opener = Self::opener(mode.kind, analysis.emotion);

        let follow_up = match analysis.topics.first() {
            Some(topic) => format!("Tell me more about the {}.", topic),
            None if !mode.focus.is_empty() => format!("Let's talk about {}.", mode.focus),
            None => "Go on.".to_string(),
        };

        let content = if character.voice.is_empty() {
            format!("{} {}", opener, follow_up)
        } else {
            format!("{} {} ({})", opener, follow_up, character.voice)
        };

        debug!("Template reply for {}: {}", character.id, content);
        Ok(GeneratedReply {
            content,
            emotion: None,
            intensity: Some(mode.intensity),
        })
    }
}

/// Character profiles held in memory.
///
/// Unknown ids resolve to a bare profile named after the id unless `strict` is set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCharacterProvider {
    profiles: Arc<RwLock<HashMap<String, CharacterProfile>>>,
    developments: Arc<RwLock<Vec<CharacterDevelopment>>>,
    strict: bool,
}

impl InMemoryCharacterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that fails with `NotFound` for unregistered characters
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub async fn insert(&self, profile: CharacterProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile);
    }

    /// Development summaries recorded so far, oldest first
    pub async fn developments(&self) -> Vec<CharacterDevelopment> {
        self.developments.read().await.clone()
    }
}

#[async_trait]
impl CharacterStateProvider for InMemoryCharacterProvider {
    async fn character_state(&self, character_id: &str) -> Result<CharacterProfile> {
        if let Some(profile) = self.profiles.read().await.get(character_id) {
            return Ok(profile.clone());
        }

        if self.strict {
            Err(RapportError::NotFound {
                entity_type: "character".to_string(),
                id: character_id.to_string(),
            })
        } else {
            Ok(CharacterProfile::new(character_id))
        }
    }

    async fn record_development(&self, development: CharacterDevelopment) -> Result<()> {
        self.developments.write().await.push(development);
        Ok(())
    }
}

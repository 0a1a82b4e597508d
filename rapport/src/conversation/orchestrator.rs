//! Conversation flow orchestration.
//!
//! A flow moves from `Active` (possibly through several modes) to `Closed`, which is
//! terminal. Every flow sits behind its own mutex; the response generator is awaited
//! with no flow lock held, so a slow or cancelled generation never blocks or corrupts
//! the flow. Results are appended only after re-checking that the flow is still active.

use super::analysis;
use super::classifier;
use super::generator::{CharacterProfile, CharacterStateProvider, GeneratedReply, ResponseGenerator};
use super::tables;
use super::types::{
    CharacterDevelopment, CharacterResponse, ContextPatch, ConversationFlow, ConversationTurn,
    Emotion, FlowAnalysis, InputAnalysis, IntensityBucket, Intent, InteractionContext,
    InteractionMode, ResponseKind,
};
use crate::config::{ConversationConfig, StartPolicy};
use crate::hooks::{HookRegistry, RelationshipSignal};
use crate::relationships::types::clamp_unit;
use crate::{RapportError, Result};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

type FlowHandle = Arc<Mutex<ConversationFlow>>;

/// State captured under the flow lock before generation
struct TurnSnapshot {
    character_id: String,
    mode: InteractionMode,
    context: InteractionContext,
    history: Vec<CharacterResponse>,
}

/// Runs conversations between users and characters.
///
/// Cloning is cheap; clones share flows, collaborators and hooks.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    generator: Arc<dyn ResponseGenerator>,
    characters: Arc<dyn CharacterStateProvider>,
    hooks: HookRegistry,
    config: Arc<ConversationConfig>,
    flows: Arc<RwLock<HashMap<String, FlowHandle>>>,
    /// character id -> id of that character's active flow
    active: Arc<RwLock<HashMap<String, String>>>,
    /// Ids of closed flows still held in `flows`, oldest first
    closed: Arc<Mutex<VecDeque<String>>>,
}

impl fmt::Debug for ConversationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationOrchestrator")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl ConversationOrchestrator {
    pub fn new(
        generator: Arc<dyn ResponseGenerator>,
        characters: Arc<dyn CharacterStateProvider>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            generator,
            characters,
            hooks: HookRegistry::new(),
            config: Arc::new(config),
            flows: Arc::new(RwLock::new(HashMap::new())),
            active: Arc::new(RwLock::new(HashMap::new())),
            closed: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Share an existing hook registry
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Start a conversation with `character_id`.
    ///
    /// A character has at most one active flow; a second start either fails with
    /// `SessionAlreadyActive` or closes the previous flow, per `conversation.start_policy`.
    pub async fn start_conversation(
        &self,
        character_id: &str,
        mode: InteractionMode,
        context: InteractionContext,
    ) -> Result<ConversationFlow> {
        if character_id.trim().is_empty() {
            return Err(RapportError::Validation(
                "character id must not be empty".to_string(),
            ));
        }
        mode.validate(self.config.max_mode_duration_minutes)?;

        let mut active = self.active.write().await;

        if let Some(previous_id) = active.get(character_id).cloned() {
            match self.config.start_policy {
                StartPolicy::Reject => {
                    return Err(RapportError::SessionAlreadyActive {
                        character_id: character_id.to_string(),
                    });
                }
                StartPolicy::Replace => {
                    if let Some(previous) = self.handle(&previous_id).await {
                        previous.lock().await.close();
                    }
                    self.retire(previous_id.clone()).await;
                    info!(
                        "Closed conversation {} for {} to start a new one",
                        previous_id, character_id
                    );
                }
            }
        }

        let flow = ConversationFlow::new(Uuid::new_v4().to_string(), character_id, mode, context);
        let snapshot = flow.clone();

        self.flows
            .write()
            .await
            .insert(flow.id.clone(), Arc::new(Mutex::new(flow)));
        active.insert(character_id.to_string(), snapshot.id.clone());

        info!(
            "Started {} conversation {} with {}",
            snapshot.mode.kind, snapshot.id, character_id
        );
        Ok(snapshot)
    }

    /// Classify `user_input`, obtain the character's reply and append it to the flow.
    ///
    /// Generator failures and timeouts are recovered with a fallback line and the turn
    /// is marked degraded. A flow closed while the reply was being generated is left
    /// untouched and the call fails with `SessionNotActive`.
    pub async fn generate_response(&self, flow_id: &str, user_input: &str) -> Result<ConversationTurn> {
        let snapshot = {
            let handle = self.active_handle(flow_id).await?;
            let flow = handle.lock().await;
            ensure_active(&flow)?;
            self.validate_input(user_input)?;
            let start = flow.messages.len().saturating_sub(self.config.history_window);
            TurnSnapshot {
                character_id: flow.character_id.clone(),
                mode: flow.mode.clone(),
                context: flow.context.clone(),
                history: flow.messages[start..].to_vec(),
            }
        };

        let words = classifier::tokenize(user_input);
        let analysis = classifier::analyze(user_input);
        debug!(
            "Flow {} input: emotion={} intensity={} intent={:?} topics={:?}",
            flow_id, analysis.emotion, analysis.intensity, analysis.intent, analysis.topics
        );

        let profile = self.characters.character_state(&snapshot.character_id).await?;
        let reply = self.request_reply(flow_id, &profile, user_input, &snapshot).await;
        let response = enrich(&analysis, reply, &profile, &snapshot.mode, &words);
        if response.degraded {
            warn!("Flow {} continues with a fallback response", flow_id);
        }

        let relationship_keyword =
            classifier::first_mention(&words, tables::RELATIONSHIP_KEYWORDS).map(str::to_string);

        let (flow_snapshot, signal) = {
            let handle = self.active_handle(flow_id).await?;
            let mut flow = handle.lock().await;
            ensure_active(&flow)?;

            let mut progress = tables::PROGRESS_PER_TURN;
            if response.development_insight.is_some() {
                progress += tables::PROGRESS_DEVELOPMENT_BONUS;
            }

            let signal = relationship_keyword.map(|keyword| {
                progress += tables::PROGRESS_RELATIONSHIP_BONUS;
                let note = format!(
                    "Turn {}: talk of {} {}",
                    flow.messages.len() + 1,
                    keyword,
                    tables::relationship_impact(response.emotion)
                );
                flow.relationship_changes.push(note.clone());
                RelationshipSignal {
                    flow_id: flow.id.clone(),
                    character_id: flow.character_id.clone(),
                    counterparts: named_counterparts(user_input, &flow.context),
                    keyword,
                    emotion: response.emotion,
                    note,
                }
            });

            flow.topics.extend(analysis.topics.iter().cloned());
            flow.push_message(response.clone());
            flow.development_progress = clamp_unit(flow.development_progress + progress);

            (flow.clone(), signal)
        };

        let turn = ConversationTurn { analysis, response };

        self.hooks.execute_turn_completed(&flow_snapshot, &turn).await;
        if let Some(signal) = signal {
            self.hooks.execute_relationship_signal(&signal).await;
        }

        Ok(turn)
    }

    /// Replace the flow's mode and append a neutral transition message
    pub async fn switch_interaction_mode(
        &self,
        flow_id: &str,
        new_mode: InteractionMode,
    ) -> Result<CharacterResponse> {
        let handle = self.active_handle(flow_id).await?;
        let mut flow = handle.lock().await;
        ensure_active(&flow)?;
        new_mode.validate(self.config.max_mode_duration_minutes)?;

        let kind = new_mode.kind;
        let previous = flow.mode.kind;
        let transition = CharacterResponse {
            content: tables::transition_line(kind).to_string(),
            emotion: Emotion::Neutral,
            intensity: 0.5,
            body_language: tables::body_language(Emotion::Neutral, IntensityBucket::Medium)
                .to_string(),
            voice_tone: tables::voice_tone(Emotion::Neutral, kind).to_string(),
            thought_process: format!("Time to shift from {} to {}.", previous, kind),
            memory_triggered: None,
            relationship_impact: None,
            development_insight: None,
            degraded: false,
            kind: ResponseKind::Transition,
            timestamp: Utc::now(),
        };

        flow.mode = new_mode;
        flow.push_message(transition.clone());

        info!("Flow {} switched from {} to {}", flow_id, previous, kind);
        Ok(transition)
    }

    pub async fn analyze_conversation_flow(&self, flow_id: &str) -> Result<FlowAnalysis> {
        let flow = self.active_snapshot(flow_id).await?;
        Ok(analysis::analyze_flow(&flow, Utc::now()))
    }

    /// Merge `patch` into the flow's context and return the result
    pub async fn update_interaction_context(
        &self,
        flow_id: &str,
        patch: ContextPatch,
    ) -> Result<InteractionContext> {
        let handle = self.active_handle(flow_id).await?;
        let mut flow = handle.lock().await;
        ensure_active(&flow)?;

        patch.apply_to(&mut flow.context);
        debug!("Flow {} context updated", flow_id);
        Ok(flow.context.clone())
    }

    /// Derive insights from the flow, store them on it and return them
    pub async fn extract_insights_from_conversation(&self, flow_id: &str) -> Result<Vec<String>> {
        let handle = self.active_handle(flow_id).await?;
        let mut flow = handle.lock().await;
        ensure_active(&flow)?;

        let insights = analysis::extract_insights(&flow);
        flow.insights = insights.clone();
        Ok(insights)
    }

    /// Summarise the flow's effect on the character and hand it to the state provider
    pub async fn update_character_from_conversation(
        &self,
        flow_id: &str,
    ) -> Result<CharacterDevelopment> {
        let flow = self.active_snapshot(flow_id).await?;
        let development = analysis::build_development(&flow);

        self.characters
            .record_development(development.clone())
            .await?;

        info!(
            "Recorded development for {} from {} (growth {:.2})",
            development.character_id, flow_id, development.growth
        );
        Ok(development)
    }

    /// Close the flow and return its final analysis
    pub async fn end_conversation(&self, flow_id: &str) -> Result<FlowAnalysis> {
        let (character_id, final_analysis) = {
            let handle = self.active_handle(flow_id).await?;
            let mut flow = handle.lock().await;
            ensure_active(&flow)?;
            flow.close();
            (flow.character_id.clone(), analysis::analyze_flow(&flow, Utc::now()))
        };

        {
            let mut active = self.active.write().await;
            if active.get(&character_id).is_some_and(|id| id == flow_id) {
                active.remove(&character_id);
            }
        }
        self.retire(flow_id.to_string()).await;

        info!(
            "Ended conversation {} with {} after {} messages",
            flow_id, character_id, final_analysis.message_count
        );
        Ok(final_analysis)
    }

    /// Snapshot of an active flow or of one of the most recently closed flows
    pub async fn flow(&self, flow_id: &str) -> Option<ConversationFlow> {
        match self.handle(flow_id).await {
            Some(handle) => Some(handle.lock().await.clone()),
            None => None,
        }
    }

    /// Snapshot of the character's active flow, if any
    pub async fn active_flow_for(&self, character_id: &str) -> Option<ConversationFlow> {
        let flow_id = self.active.read().await.get(character_id).cloned()?;
        let flow = self.flow(&flow_id).await?;
        flow.is_active().then_some(flow)
    }

    /// Queue a closed flow for retention, dropping the oldest beyond
    /// `conversation.closed_flow_retention`
    async fn retire(&self, flow_id: String) {
        let evicted: Vec<String> = {
            let mut closed = self.closed.lock().await;
            closed.push_back(flow_id);
            let excess = closed
                .len()
                .saturating_sub(self.config.closed_flow_retention);
            closed.drain(..excess).collect()
        };

        if evicted.is_empty() {
            return;
        }
        let mut flows = self.flows.write().await;
        for id in &evicted {
            flows.remove(id);
        }
        debug!("Dropped {} closed flows past retention", evicted.len());
    }

    async fn handle(&self, flow_id: &str) -> Option<FlowHandle> {
        self.flows.read().await.get(flow_id).cloned()
    }

    async fn active_handle(&self, flow_id: &str) -> Result<FlowHandle> {
        self.handle(flow_id)
            .await
            .ok_or_else(|| RapportError::session_not_active(flow_id))
    }

    async fn active_snapshot(&self, flow_id: &str) -> Result<ConversationFlow> {
        let handle = self.active_handle(flow_id).await?;
        let flow = handle.lock().await;
        ensure_active(&flow)?;
        Ok(flow.clone())
    }

    fn validate_input(&self, user_input: &str) -> Result<()> {
        if user_input.trim().is_empty() {
            return Err(RapportError::Validation(
                "user input must not be empty".to_string(),
            ));
        }
        if let Some(limit) = self.config.max_input_chars {
            let length = user_input.chars().count();
            if length > limit {
                return Err(RapportError::Validation(format!(
                    "user input is {} characters, limit is {}",
                    length, limit
                )));
            }
        }
        Ok(())
    }

    /// Call the generator under the configured timeout; `None` on failure
    async fn request_reply(
        &self,
        flow_id: &str,
        profile: &CharacterProfile,
        user_input: &str,
        snapshot: &TurnSnapshot,
    ) -> Option<GeneratedReply> {
        let timeout = self.config.response_timeout;
        let call = self.generator.generate(
            profile,
            user_input,
            &snapshot.history,
            &snapshot.context,
            &snapshot.mode,
        );

        let failure = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(reply)) if !reply.content.trim().is_empty() => return Some(reply),
            Ok(Ok(_)) => RapportError::ResponseGenerationFailed("empty reply".to_string()),
            Ok(Err(err)) => RapportError::ResponseGenerationFailed(err.to_string()),
            Err(_) => {
                RapportError::ResponseGenerationFailed(format!("no reply within {:?}", timeout))
            }
        };

        warn!("Flow {}: {}", flow_id, failure);
        None
    }
}

fn ensure_active(flow: &ConversationFlow) -> Result<()> {
    if flow.is_active() {
        Ok(())
    } else {
        Err(RapportError::session_not_active(&flow.id))
    }
}

/// Characters in the scene that the user named
fn named_counterparts(user_input: &str, context: &InteractionContext) -> Vec<String> {
    let lowered = user_input.to_lowercase();
    context
        .other_characters
        .iter()
        .filter(|name| !name.is_empty() && lowered.contains(&name.to_lowercase()))
        .cloned()
        .collect()
}

/// Turn a raw reply (or its absence) into a full character response
fn enrich(
    analysis: &InputAnalysis,
    reply: Option<GeneratedReply>,
    profile: &CharacterProfile,
    mode: &InteractionMode,
    words: &[String],
) -> CharacterResponse {
    let degraded = reply.is_none();
    let (content, emotion, intensity) = match reply {
        Some(reply) => (
            reply.content,
            reply.emotion.unwrap_or(analysis.emotion),
            reply.intensity.unwrap_or(analysis.intensity),
        ),
        None => (
            tables::fallback_line(mode.kind).to_string(),
            analysis.emotion,
            analysis.intensity,
        ),
    };
    let intensity = clamp_unit(intensity);

    let subject = if analysis.topics.is_empty() {
        "this".to_string()
    } else {
        analysis.topics.join(", ")
    };
    let thought_process = match analysis.intent {
        Intent::Question => format!("They're asking about {}. How much should I reveal?", subject),
        Intent::Command => format!("They want me to act on {}. Do I go along with it?", subject),
        Intent::Emotion => format!(
            "They're feeling {} about {}. I should answer that first.",
            analysis.emotion, subject
        ),
        Intent::Statement => format!("They mentioned {}. What does that mean to me?", subject),
    };

    let memory_triggered = classifier::mentions(words, tables::MEMORY_KEYWORDS).then(|| {
        match analysis.topics.first() {
            Some(topic) => format!("Reminded of the {}", topic),
            None => "Reminded of the past".to_string(),
        }
    });

    let relationship_impact = classifier::first_mention(words, tables::RELATIONSHIP_KEYWORDS)
        .map(|keyword| format!("Talk of {} {}", keyword, tables::relationship_impact(emotion)));

    let development_insight = if classifier::mentions(words, tables::GROWTH_KEYWORDS) {
        Some(format!("{} is reflecting on how they have changed", profile.name))
    } else if intensity >= tables::DEVELOPMENT_INTENSITY && emotion != Emotion::Neutral {
        Some(format!(
            "{} is confronting strong {} during {}",
            profile.name, emotion, mode.kind
        ))
    } else {
        None
    };

    CharacterResponse {
        content,
        emotion,
        intensity,
        body_language: tables::body_language(emotion, IntensityBucket::of(intensity)).to_string(),
        voice_tone: tables::voice_tone(emotion, mode.kind).to_string(),
        thought_process,
        memory_triggered,
        relationship_impact,
        development_insight,
        degraded,
        kind: ResponseKind::Turn,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::generator::{MockCharacterStateProvider, MockResponseGenerator};
    use crate::conversation::{FlowState, InMemoryCharacterProvider, ModeKind, TemplateResponseGenerator};
    use std::time::Duration;

    fn orchestrator_with(generator: impl ResponseGenerator + 'static, config: ConversationConfig) -> ConversationOrchestrator {
        ConversationOrchestrator::new(
            Arc::new(generator),
            Arc::new(InMemoryCharacterProvider::new()),
            config,
        )
    }

    fn template_orchestrator() -> ConversationOrchestrator {
        orchestrator_with(TemplateResponseGenerator::new(), ConversationConfig::default())
    }

    fn mock_replying(reply: GeneratedReply) -> MockResponseGenerator {
        let mut generator = MockResponseGenerator::new();
        generator
            .expect_generate()
            .returning(move |_, _, _, _, _| Ok(reply.clone()));
        generator
    }

    #[tokio::test]
    async fn test_therapy_sadness_detected_before_override() {
        let generator = mock_replying(GeneratedReply {
            content: "I'm here for you.".to_string(),
            emotion: Some(Emotion::Joy),
            intensity: Some(1.7),
        });
        let orchestrator = orchestrator_with(generator, ConversationConfig::default());
        let flow = orchestrator
            .start_conversation(
                "char1",
                InteractionMode::new(ModeKind::Therapy),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        let turn = orchestrator
            .generate_response(&flow.id, "I feel so sad about losing my job")
            .await
            .unwrap();

        assert_eq!(turn.analysis.emotion, Emotion::Sadness);
        assert_eq!(turn.response.emotion, Emotion::Joy);
        assert_eq!(turn.response.intensity, 1.0);
        assert!(!turn.response.degraded);

        let flow = orchestrator.flow(&flow.id).await.unwrap();
        assert_eq!(flow.messages.len(), 1);
        assert_eq!(flow.emotional_arc, vec![Emotion::Joy]);
    }

    #[tokio::test]
    async fn test_generator_error_degrades() {
        let mut generator = MockResponseGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _, _, _, _| Err(RapportError::Other("model offline".to_string())));
        let orchestrator = orchestrator_with(generator, ConversationConfig::default());
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Conflict),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        let turn = orchestrator
            .generate_response(&flow.id, "Why did you lie to me?")
            .await
            .unwrap();

        assert!(turn.response.degraded);
        assert_eq!(turn.response.content, tables::fallback_line(ModeKind::Conflict));
        assert_eq!(
            orchestrator.flow(&flow.id).await.unwrap().messages.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_history_window_limits_generator_context() {
        let mut generator = MockResponseGenerator::new();
        generator
            .expect_generate()
            .withf(|_, _, history, _, _| history.len() <= 2)
            .times(4)
            .returning(|_, _, _, _, _| Ok(GeneratedReply::text("Mm.")));
        let config = ConversationConfig {
            history_window: 2,
            ..Default::default()
        };
        let orchestrator = orchestrator_with(generator, config);
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        for _ in 0..4 {
            orchestrator.generate_response(&flow.id, "hello there").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_character_state_errors_propagate() {
        let mut characters = MockCharacterStateProvider::new();
        characters.expect_character_state().returning(|id| {
            Err(RapportError::NotFound {
                entity_type: "character".to_string(),
                id: id.to_string(),
            })
        });
        let orchestrator = ConversationOrchestrator::new(
            Arc::new(TemplateResponseGenerator::new()),
            Arc::new(characters),
            ConversationConfig::default(),
        );
        let flow = orchestrator
            .start_conversation(
                "ghost",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        let result = orchestrator.generate_response(&flow.id, "hello").await;
        assert!(matches!(result, Err(RapportError::NotFound { .. })));
        assert!(orchestrator.flow(&flow.id).await.unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn test_start_policy() {
        let orchestrator = template_orchestrator();
        let first = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        let second = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Bonding),
                InteractionContext::default(),
            )
            .await;
        assert!(matches!(second, Err(RapportError::SessionAlreadyActive { .. })));
        assert_eq!(orchestrator.active_flow_for("mira").await.unwrap().id, first.id);

        let replacing = orchestrator_with(
            TemplateResponseGenerator::new(),
            ConversationConfig {
                start_policy: StartPolicy::Replace,
                ..Default::default()
            },
        );
        let old = replacing
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();
        let new = replacing
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Bonding),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(replacing.flow(&old.id).await.unwrap().state, FlowState::Closed);
        assert_eq!(replacing.active_flow_for("mira").await.unwrap().id, new.id);
    }

    #[tokio::test]
    async fn test_start_validates_mode() {
        let orchestrator = template_orchestrator();
        let result = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual).with_duration(1000),
                InteractionContext::default(),
            )
            .await;
        assert!(matches!(result, Err(RapportError::Validation(_))));
        assert!(orchestrator.active_flow_for("mira").await.is_none());
    }

    #[tokio::test]
    async fn test_input_validation() {
        let orchestrator = orchestrator_with(
            TemplateResponseGenerator::new(),
            ConversationConfig {
                max_input_chars: Some(10),
                ..Default::default()
            },
        );
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        assert!(matches!(
            orchestrator.generate_response(&flow.id, "   ").await,
            Err(RapportError::Validation(_))
        ));
        assert!(matches!(
            orchestrator
                .generate_response(&flow.id, "this is far too long")
                .await,
            Err(RapportError::Validation(_))
        ));
        assert!(orchestrator.generate_response(&flow.id, "hi there").await.is_ok());
    }

    #[tokio::test]
    async fn test_relationship_talk_records_note() {
        let orchestrator = template_orchestrator();
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Bonding),
                InteractionContext {
                    other_characters: vec!["Tomas".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let turn = orchestrator
            .generate_response(&flow.id, "Do you still trust Tomas?")
            .await
            .unwrap();

        assert!(turn.response.relationship_impact.is_some());
        let flow = orchestrator.flow(&flow.id).await.unwrap();
        assert_eq!(flow.relationship_changes.len(), 1);
        assert!(flow.relationship_changes[0].contains("trust"));
        assert!(flow.development_progress > tables::PROGRESS_PER_TURN);
    }

    #[tokio::test]
    async fn test_context_and_insights() {
        let orchestrator = template_orchestrator();
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        let context = orchestrator
            .update_interaction_context(
                &flow.id,
                ContextPatch {
                    location: Some("harbour".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(context.location, "harbour");

        orchestrator
            .generate_response(&flow.id, "I remember the lighthouse")
            .await
            .unwrap();
        orchestrator
            .generate_response(&flow.id, "The lighthouse was so wonderful")
            .await
            .unwrap();

        let insights = orchestrator
            .extract_insights_from_conversation(&flow.id)
            .await
            .unwrap();
        assert!(insights.iter().any(|i| i == "Recurring topics: lighthouse"));
        assert!(insights.iter().any(|i| i == "Memory: Reminded of the lighthouse"));
        assert_eq!(orchestrator.flow(&flow.id).await.unwrap().insights, insights);
    }

    #[tokio::test]
    async fn test_update_character_hands_summary_to_provider() {
        let mut characters = MockCharacterStateProvider::new();
        characters
            .expect_character_state()
            .returning(|id| Ok(CharacterProfile::new(id)));
        characters
            .expect_record_development()
            .withf(|development| {
                development.character_id == "mira" && development.emotional_arc.len() == 1
            })
            .times(1)
            .returning(|_| Ok(()));

        let orchestrator = ConversationOrchestrator::new(
            Arc::new(TemplateResponseGenerator::new()),
            Arc::new(characters),
            ConversationConfig::default(),
        );
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Mentoring),
                InteractionContext::default(),
            )
            .await
            .unwrap();
        orchestrator
            .generate_response(&flow.id, "I learned to sail")
            .await
            .unwrap();

        let development = orchestrator
            .update_character_from_conversation(&flow.id)
            .await
            .unwrap();
        assert!(development.growth > 0.0);
    }

    #[tokio::test]
    async fn test_end_conversation_closes_flow() {
        let orchestrator = template_orchestrator();
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Adventure),
                InteractionContext::default(),
            )
            .await
            .unwrap();
        orchestrator
            .generate_response(&flow.id, "Look at the cave!")
            .await
            .unwrap();

        let analysis = orchestrator.end_conversation(&flow.id).await.unwrap();
        assert_eq!(analysis.message_count, 1);

        assert!(orchestrator.active_flow_for("mira").await.is_none());
        for result in [
            orchestrator.analyze_conversation_flow(&flow.id).await.map(|_| ()),
            orchestrator.end_conversation(&flow.id).await.map(|_| ()),
            orchestrator
                .switch_interaction_mode(&flow.id, InteractionMode::new(ModeKind::Casual))
                .await
                .map(|_| ()),
        ] {
            assert!(matches!(result, Err(RapportError::SessionNotActive { .. })));
        }

        // A new conversation can start once the old one is closed
        assert!(
            orchestrator
                .start_conversation(
                    "mira",
                    InteractionMode::new(ModeKind::Casual),
                    InteractionContext::default(),
                )
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unknown_flow_is_not_active() {
        let orchestrator = template_orchestrator();
        assert!(matches!(
            orchestrator.generate_response("missing", "hello").await,
            Err(RapportError::SessionNotActive { .. })
        ));
        assert!(orchestrator.flow("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_session_state_is_checked_before_arguments() {
        let orchestrator = template_orchestrator();
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();
        orchestrator.end_conversation(&flow.id).await.unwrap();

        assert!(matches!(
            orchestrator.generate_response(&flow.id, "   ").await,
            Err(RapportError::SessionNotActive { .. })
        ));
        assert!(matches!(
            orchestrator
                .switch_interaction_mode(
                    &flow.id,
                    InteractionMode::new(ModeKind::Therapy).with_duration(0),
                )
                .await,
            Err(RapportError::SessionNotActive { .. })
        ));
        assert!(matches!(
            orchestrator.generate_response("nope", "").await,
            Err(RapportError::SessionNotActive { .. })
        ));
        assert!(orchestrator.flow(&flow.id).await.unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn test_closed_flow_retention_is_bounded() {
        let orchestrator = orchestrator_with(
            TemplateResponseGenerator::new(),
            ConversationConfig {
                closed_flow_retention: 3,
                ..Default::default()
            },
        );

        let mut ids = Vec::new();
        for _ in 0..10 {
            let flow = orchestrator
                .start_conversation(
                    "mira",
                    InteractionMode::new(ModeKind::Casual),
                    InteractionContext::default(),
                )
                .await
                .unwrap();
            orchestrator.end_conversation(&flow.id).await.unwrap();
            ids.push(flow.id);
        }

        assert_eq!(orchestrator.flows.read().await.len(), 3);
        assert_eq!(orchestrator.closed.lock().await.len(), 3);
        for id in &ids[..7] {
            assert!(orchestrator.flow(id).await.is_none());
        }
        for id in &ids[7..] {
            assert_eq!(orchestrator.flow(id).await.unwrap().state, FlowState::Closed);
        }
    }

    #[tokio::test]
    async fn test_replaced_flow_counts_toward_retention() {
        let orchestrator = orchestrator_with(
            TemplateResponseGenerator::new(),
            ConversationConfig {
                start_policy: StartPolicy::Replace,
                closed_flow_retention: 0,
                ..Default::default()
            },
        );
        let old = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();
        let new = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Bonding),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        assert!(orchestrator.flow(&old.id).await.is_none());
        assert!(orchestrator.flow(&new.id).await.unwrap().is_active());
        assert_eq!(orchestrator.flows.read().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flow_closed_during_generation_is_untouched() {
        #[derive(Debug)]
        struct SlowGenerator;

        #[async_trait::async_trait]
        impl ResponseGenerator for SlowGenerator {
            async fn generate(
                &self,
                _character: &CharacterProfile,
                _user_input: &str,
                _history: &[CharacterResponse],
                _context: &InteractionContext,
                _mode: &InteractionMode,
            ) -> Result<GeneratedReply> {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(GeneratedReply::text("Sorry, I was miles away."))
            }
        }

        let orchestrator = orchestrator_with(SlowGenerator, ConversationConfig::default());
        let flow = orchestrator
            .start_conversation(
                "mira",
                InteractionMode::new(ModeKind::Casual),
                InteractionContext::default(),
            )
            .await
            .unwrap();

        let pending = {
            let orchestrator = orchestrator.clone();
            let flow_id = flow.id.clone();
            tokio::spawn(async move { orchestrator.generate_response(&flow_id, "hello?").await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        orchestrator.end_conversation(&flow.id).await.unwrap();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(RapportError::SessionNotActive { .. })));
        assert!(orchestrator.flow(&flow.id).await.unwrap().messages.is_empty());
    }
}

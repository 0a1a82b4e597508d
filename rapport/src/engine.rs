//! The `Rapport` facade
//!
//! Wires the relationship subsystems and the conversation orchestrator around one
//! shared registry and one configuration, so most callers need nothing else.

use crate::Result;
use crate::config::{ConfigBuilder, RapportConfig};
use crate::conversation::{
    CharacterStateProvider, ConversationOrchestrator, InMemoryCharacterProvider,
    ResponseGenerator, TemplateResponseGenerator,
};
use crate::hooks::{ConversationHook, HookRegistry, InteractionSimulatorHook};
use crate::relationships::{
    ConflictResolver, InMemoryRelationshipStore, InteractionSimulator, RelationshipAnalytics,
    RelationshipRegistry, RelationshipStore,
};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Relationship and conversation engine.
///
/// Every component shares the same relationship registry, so a conflict generated
/// through [`Rapport::conflicts`] is immediately visible to [`Rapport::analytics`].
///
/// # Examples
///
/// ```rust,no_run
/// use rapport::prelude::*;
///
/// async fn example() -> rapport::Result<()> {
///     let rapport = Rapport::new().await?;
///     rapport
///         .relationships()
///         .create("Alice", "Bob", RelationshipType::Friend)
///         .await?;
///     rapport
///         .simulator()
///         .simulate_interaction("Alice", "Bob", "dinner", "a long talk")
///         .await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Rapport {
    config: Arc<RapportConfig>,
    registry: RelationshipRegistry,
    simulator: InteractionSimulator,
    conflicts: ConflictResolver,
    analytics: RelationshipAnalytics,
    conversations: ConversationOrchestrator,
}

impl fmt::Debug for Rapport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rapport")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("conversations", &self.conversations)
            .finish()
    }
}

impl Rapport {
    /// Engine with the default configuration, in-memory storage and the template generator
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Engine with the testing configuration and a short response timeout
    pub async fn for_testing() -> Result<Self> {
        Self::builder()
            .with_config(ConfigBuilder::testing().build()?)
            .build()
            .await
    }

    pub fn builder() -> RapportBuilder {
        RapportBuilder::new()
    }

    pub fn config(&self) -> &RapportConfig {
        &self.config
    }

    /// Create, look up, patch and list relationships
    pub fn relationships(&self) -> &RelationshipRegistry {
        &self.registry
    }

    pub fn simulator(&self) -> &InteractionSimulator {
        &self.simulator
    }

    pub fn conflicts(&self) -> &ConflictResolver {
        &self.conflicts
    }

    pub fn analytics(&self) -> &RelationshipAnalytics {
        &self.analytics
    }

    pub fn conversations(&self) -> &ConversationOrchestrator {
        &self.conversations
    }

    pub fn hooks(&self) -> &HookRegistry {
        self.conversations.hooks()
    }
}

/// Builder for [`Rapport`]
///
/// Unset collaborators fall back to the offline defaults: [`TemplateResponseGenerator`],
/// [`InMemoryCharacterProvider`] and [`InMemoryRelationshipStore`].
#[derive(Default)]
pub struct RapportBuilder {
    config: Option<RapportConfig>,
    generator: Option<Arc<dyn ResponseGenerator>>,
    characters: Option<Arc<dyn CharacterStateProvider>>,
    store: Option<Arc<dyn RelationshipStore>>,
    hooks: Vec<Arc<dyn ConversationHook>>,
    link_relationships: bool,
}

impl RapportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration (validated again on build)
    pub fn with_config(mut self, config: RapportConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn ResponseGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_character_provider(mut self, characters: Arc<dyn CharacterStateProvider>) -> Self {
        self.characters = Some(characters);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn RelationshipStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register a conversation hook on the built engine
    pub fn with_hook(mut self, hook: Arc<dyn ConversationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Let relationship talk in conversations drive the interaction simulator
    pub fn link_conversations_to_relationships(mut self) -> Self {
        self.link_relationships = true;
        self
    }

    pub async fn build(self) -> Result<Rapport> {
        let config = match self.config {
            Some(config) => ConfigBuilder::from_config(config).build()?,
            None => ConfigBuilder::new().build()?,
        };

        let store: Arc<dyn RelationshipStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryRelationshipStore::new()),
        };
        let generator: Arc<dyn ResponseGenerator> = match self.generator {
            Some(generator) => generator,
            None => Arc::new(TemplateResponseGenerator::new()),
        };
        let characters: Arc<dyn CharacterStateProvider> = match self.characters {
            Some(characters) => characters,
            None => Arc::new(InMemoryCharacterProvider::new()),
        };

        let registry = RelationshipRegistry::with_store(store, config.relationships.clone());
        let simulator = InteractionSimulator::new(registry.clone());
        let conflicts = ConflictResolver::new(registry.clone());
        let analytics = RelationshipAnalytics::new(registry.clone());

        let hooks = HookRegistry::new();
        if self.link_relationships {
            hooks
                .register(Arc::new(InteractionSimulatorHook::new(simulator.clone())))
                .await;
        }
        for hook in self.hooks {
            hooks.register(hook).await;
        }

        let conversations =
            ConversationOrchestrator::new(generator, characters, config.conversation.clone())
                .with_hooks(hooks);

        info!(
            "Rapport engine ready ({} hooks)",
            conversations.hooks().hook_count().await
        );

        Ok(Rapport {
            config: Arc::new(config),
            registry,
            simulator,
            conflicts,
            analytics,
            conversations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelationshipConfig;
    use crate::relationships::RelationshipType;
    use crate::RapportError;

    #[tokio::test]
    async fn test_components_share_one_registry() {
        let rapport = Rapport::for_testing().await.unwrap();
        let record = rapport
            .relationships()
            .create("Alice", "Bob", RelationshipType::Friend)
            .await
            .unwrap();

        rapport
            .conflicts()
            .generate_conflict("Bob", "Alice", "the stolen map")
            .await
            .unwrap();

        let stored = rapport
            .relationships()
            .get_by_id(&record.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.conflict > 0.0);
        assert_eq!(stored.unresolved_issues, vec!["the stolen map".to_string()]);
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let config = RapportConfig {
            relationships: RelationshipConfig {
                conflict_polarity_threshold: 3.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let result = Rapport::builder().with_config(config).build().await;
        assert!(matches!(result, Err(RapportError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_linking_registers_simulator_hook() {
        let rapport = Rapport::builder()
            .link_conversations_to_relationships()
            .build()
            .await
            .unwrap();

        assert_eq!(
            rapport.hooks().list_hooks().await,
            vec![("interaction_simulator".to_string(), 0)]
        );
    }
}

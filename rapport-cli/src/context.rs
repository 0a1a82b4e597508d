use rapport::config::{ConfigLoader, RapportConfig};
use rapport::conversation::InMemoryCharacterProvider;
use rapport::engine::Rapport;
use std::path::Path;
use std::sync::Arc;

pub struct RapportCliContext {
    pub rapport: Rapport,
    /// Profiles the chat command registers before talking to a character
    pub characters: Arc<InMemoryCharacterProvider>,
}

impl RapportCliContext {
    /// Load the layered configuration (file, then `RAPPORT_` env vars) and build the engine
    pub async fn new(config_path: Option<&Path>) -> rapport::Result<Self> {
        let config = load_config(config_path)?;
        Self::with_config(config).await
    }

    pub async fn with_config(config: RapportConfig) -> rapport::Result<Self> {
        let characters = Arc::new(InMemoryCharacterProvider::new());
        let rapport = Rapport::builder()
            .with_config(config)
            .with_character_provider(characters.clone())
            .link_conversations_to_relationships()
            .build()
            .await?;

        Ok(Self {
            rapport,
            characters,
        })
    }
}

pub fn load_config(config_path: Option<&Path>) -> rapport::Result<RapportConfig> {
    let mut loader = ConfigLoader::new();
    match config_path {
        Some(path) => {
            loader.load_file(path)?;
        }
        None => {
            loader.load_default_files();
        }
    }
    loader.load_env();

    Ok(loader.extract()?)
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use guard_classifier::GeminiClient;
use guard_config::{EmbeddingMode, EmbeddingsConfig, GuardConfig};
use guard_embeddings::{Embedder, EmbeddingEngine, HashEmbedder};
use guard_store::{AuditLedger, ChunkStore, GuardDb, LibSqlChunkBackend, WindowConfig};

/// The regulatory chunk store as the CLI builds it.
pub type RegulatoryStore = ChunkStore<LibSqlChunkBackend, Box<dyn Embedder>>;

/// Shared application resources initialized once at startup.
///
/// The embedder and the model client are built on demand, so commands that
/// only read the ledger never load a model or need an API key.
pub struct AppContext {
    pub config: GuardConfig,
    pub project_root: PathBuf,
    pub db_path: PathBuf,
    pub db: GuardDb,
}

impl AppContext {
    pub async fn init(project_root: PathBuf, config: GuardConfig) -> anyhow::Result<Self> {
        let db_path = config.store.resolve_path(&project_root);
        let db = GuardDb::open_local(&db_path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open guardian store at {}", db_path.display()))?;

        tracing::debug!(
            root = %project_root.display(),
            db = %db_path.display(),
            "application context ready"
        );

        Ok(Self {
            config,
            project_root,
            db_path,
            db,
        })
    }

    pub fn backend(&self) -> LibSqlChunkBackend {
        LibSqlChunkBackend::new(self.db.clone())
    }

    pub fn ledger(&self) -> AuditLedger {
        AuditLedger::new(self.db.clone())
    }

    /// Chunk store over this project's database with the configured embedder.
    pub fn chunk_store(&self) -> anyhow::Result<RegulatoryStore> {
        let store = &self.config.store;
        let windows = WindowConfig::new(store.window_size, store.window_overlap)
            .context("invalid store window settings")?;
        let embedder = build_embedder(&self.config.embeddings, &self.project_root)?;
        Ok(ChunkStore::new(self.backend(), embedder).with_windows(windows))
    }

    pub fn model(&self) -> anyhow::Result<GeminiClient> {
        GeminiClient::new(&self.config.classifier).context(
            "classifier is not configured; set GOOGLE_API_KEY or GUARDIAN_CLASSIFIER__API_KEY",
        )
    }
}

fn build_embedder(config: &EmbeddingsConfig, project_root: &Path) -> anyhow::Result<Box<dyn Embedder>> {
    match config.mode {
        EmbeddingMode::Hash => Ok(Box::new(HashEmbedder::new(config.hash_dimension))),
        EmbeddingMode::Fastembed => {
            let cache_dir = (!config.cache_dir.is_empty()).then(|| project_root.join(&config.cache_dir));
            let engine = EmbeddingEngine::new(cache_dir)
                .context("failed to initialize fastembed model")?;
            Ok(Box::new(engine))
        }
    }
}

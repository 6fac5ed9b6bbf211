//! Application state wiring config, provider and store together.
//!
//! AppState holds the concrete instances used by both CLI commands and HTTP
//! handlers. Services are generic over the repository trait; AppState pins
//! them to the SQLite implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use remix_core::generation::box_provider::BoxGenerationProvider;
use remix_core::service::curation::{CurationController, CurationSettings};
use remix_core::service::posts::PostService;
use remix_infra::config::{database_url, load_global_config, resolve_api_key};
use remix_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use remix_infra::llm::create_provider;
use remix_infra::sqlite::pool::DatabasePool;
use remix_infra::sqlite::post::SqlitePostRepository;
use remix_types::config::{GlobalConfig, ProviderKind};
use remix_types::error::GenerationError;
use remix_types::platform::Platform;
use remix_types::post::OwnerId;

pub type ConcretePostService = PostService<SqlitePostRepository>;

pub type ConcreteController = CurationController<SqlitePostRepository>;

/// Per-invocation overrides taken from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub model: Option<String>,
    /// Forward generation through this `remix serve` instance.
    pub remote_url: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut GlobalConfig) {
        if let Some(model) = &self.model {
            config.provider.model = model.clone();
        }
        if let Some(url) = &self.remote_url {
            config.provider.kind = ProviderKind::Remote;
            config.provider.remote_url = url.clone();
        }
    }
}

/// Shared application state.
///
/// A provider that could not be built (usually a missing API key) is kept
/// as its error so that commands that never generate still work, and
/// commands that do get a typed failure.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GlobalConfig>,
    pub provider: Result<Arc<BoxGenerationProvider>, GenerationError>,
    pub post_service: Arc<ConcretePostService>,
    pub repo: SqlitePostRepository,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the DB,
    /// build the provider.
    pub async fn init(overrides: &Overrides) -> anyhow::Result<Self> {
        let data_dir = overrides.data_dir.clone().unwrap_or_else(resolve_data_dir);
        ensure_data_dir(&data_dir).await?;

        let mut config = load_global_config(&data_dir).await;
        overrides.apply(&mut config);

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let api_key = resolve_api_key(&config.provider);
        let provider = create_provider(&config.provider, api_key.as_deref());
        if let Err(e) = &provider {
            tracing::debug!(error = %e, "Generation provider unavailable");
        }

        Ok(Self::new(config, provider, db_pool, data_dir))
    }

    pub fn new(
        config: GlobalConfig,
        provider: Result<BoxGenerationProvider, GenerationError>,
        db_pool: DatabasePool,
        data_dir: PathBuf,
    ) -> Self {
        let repo = SqlitePostRepository::new(db_pool.clone());
        Self {
            config: Arc::new(config),
            provider: provider.map(Arc::new),
            post_service: Arc::new(PostService::new(repo.clone())),
            repo,
            data_dir,
            db_pool,
        }
    }

    pub fn provider(&self) -> Result<Arc<BoxGenerationProvider>, GenerationError> {
        self.provider.clone()
    }

    /// Owner recorded on posts when the caller does not name one.
    pub fn default_owner(&self) -> OwnerId {
        OwnerId::new(self.config.owner_id.clone())
    }

    /// Build a curation controller for one session, displaying `platform`.
    pub fn controller(&self, platform: Platform) -> Result<ConcreteController, GenerationError> {
        let settings = CurationSettings {
            generation_timeout: Some(Duration::from_secs(self.config.provider.timeout_secs)),
            feedback_window: Duration::from_millis(self.config.feedback_window_ms),
            platform,
        };
        Ok(CurationController::new(
            self.provider()?,
            self.repo.clone(),
            self.default_owner(),
            settings,
        ))
    }
}

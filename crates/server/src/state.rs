use std::sync::Arc;

use configs::{StoreBackend, StoreConfig};
use models::user::KEY_ATTRIBUTE;
use service::storage::{ItemStore, MapItemStore};
use service::users::{UserHandlers, UserRepository};
use tracing::info;

use crate::errors::StartupError;

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub handlers: UserHandlers,
}

impl AppState {
    pub fn new(handlers: UserHandlers) -> Self {
        Self { handlers }
    }

    /// Wire handlers over an already-built store.
    pub fn with_store(store: Arc<dyn ItemStore>, page_size: usize) -> Self {
        Self::new(UserHandlers::new(UserRepository::with_page_size(store, page_size)))
    }

    pub async fn from_config(cfg: &StoreConfig) -> Result<Self, StartupError> {
        let store = build_store(cfg).await?;
        Ok(Self::with_store(store, cfg.page_size))
    }
}

/// Build the item store selected by configuration.
pub async fn build_store(cfg: &StoreConfig) -> Result<Arc<dyn ItemStore>, StartupError> {
    let store: Arc<dyn ItemStore> = match cfg.backend {
        StoreBackend::Memory => Arc::new(MapItemStore::in_memory(KEY_ATTRIBUTE)),
        StoreBackend::File => Arc::new(MapItemStore::open(KEY_ATTRIBUTE, &cfg.data_path).await?),
        StoreBackend::Dynamodb => dynamodb_store(cfg).await?,
    };
    info!(backend = ?cfg.backend, table = %cfg.table, page_size = cfg.page_size, "item store ready");
    Ok(store)
}

#[cfg(feature = "dynamodb")]
async fn dynamodb_store(cfg: &StoreConfig) -> Result<Arc<dyn ItemStore>, StartupError> {
    use service::storage::dynamodb::DynamoItemStore;
    Ok(Arc::new(DynamoItemStore::from_env(cfg.table.clone(), KEY_ATTRIBUTE).await))
}

#[cfg(not(feature = "dynamodb"))]
async fn dynamodb_store(_cfg: &StoreConfig) -> Result<Arc<dyn ItemStore>, StartupError> {
    Err(StartupError::InvalidConfig("the dynamodb backend requires building with the `dynamodb` feature".into()))
}

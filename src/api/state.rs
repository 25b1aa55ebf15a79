use std::sync::Arc;

use crate::{
    config::Config,
    services::{InMemorySnapshot, SnapshotData, SnapshotProvider},
};

/// Shared application state
///
/// Holds no mutable data: every request reads its own snapshot through
/// `provider`.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn SnapshotProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(provider: Arc<dyn SnapshotProvider>, config: Config) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    /// State over a fixed in-memory snapshot with default configuration
    pub fn in_memory(data: SnapshotData) -> Self {
        Self::new(Arc::new(InMemorySnapshot::new(data)), Config::default())
    }
}

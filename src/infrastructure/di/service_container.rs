//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{RenderService, TreeService};
use crate::config::Settings;
use crate::infrastructure::error::StoreResult;
use crate::infrastructure::store::HttpTreeStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, Selector, SkimSelector, TreeStore};

/// Container holding the application's collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Tree store client
    pub store: Arc<dyn TreeStore>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interactive selector
    pub selector: Arc<dyn Selector>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> StoreResult<Self> {
        let store = HttpTreeStore::new(
            &settings.store.base_url,
            Duration::from_secs(settings.store.timeout_secs),
        )?;
        Ok(Self::with_deps(
            settings,
            Arc::new(store),
            Arc::new(RealFileSystem),
            Arc::new(SkimSelector),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn TreeStore>,
        fs: Arc<dyn FileSystem>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            store,
            fs,
            selector,
        }
    }

    /// Controller over the saved-tree list, starting from an empty state.
    pub fn tree_service(&self) -> TreeService {
        TreeService::new(Arc::clone(&self.store))
    }

    pub fn render_service(&self) -> RenderService {
        RenderService::new(Arc::clone(&self.fs), Arc::clone(&self.settings))
    }
}

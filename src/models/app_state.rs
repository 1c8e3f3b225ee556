use std::sync::Arc;

use crate::api::Backend;
use crate::config::AppConfig;
use crate::services::WizardStore;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub backend: Arc<Backend>,
    pub wizards: WizardStore,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Backend) -> Self {
        Self {
            config,
            backend: Arc::new(backend),
            wizards: WizardStore::new(),
        }
    }
}

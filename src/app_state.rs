//! Application state shared across all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::database::store::LayoutStore;
use crate::services::LayoutService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Layout service wrapping the default invariant enforcer.
    pub layout_service: LayoutService,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn LayoutStore>, config: Config) -> Self {
        let layout_service = LayoutService::new(store);
        Self {
            layout_service,
            config,
        }
    }
}

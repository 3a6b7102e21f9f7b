//! Shared application state for all routes.

use crate::config::Settings;
use crate::repository::ProductRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ProductRepository>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ProductRepository>, settings: Settings) -> Self {
        AppState {
            repo,
            settings: Arc::new(settings),
        }
    }

    pub fn repo(&self) -> &dyn ProductRepository {
        self.repo.as_ref()
    }

    pub fn expose_errors(&self) -> bool {
        self.settings.expose_errors
    }
}

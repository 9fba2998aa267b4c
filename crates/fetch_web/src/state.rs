use std::sync::Arc;

use fetch_extract::IngestManager;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<IngestManager>,
}

impl AppState {
    pub fn new(manager: IngestManager) -> Self {
        Self { manager: Arc::new(manager) }
    }
}

//! HTTP API for the interview coach

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::ModelInfo;

use crate::db::Database;
use crate::interview::{LlmAnalyzer, LlmInterviewer, ProductionService};
use crate::llm::ModelRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProductionService>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(db: Database, llm_registry: Arc<ModelRegistry>, service_timeout: Duration) -> Self {
        let service = ProductionService::new(
            db,
            LlmInterviewer::new(llm_registry.clone()),
            LlmAnalyzer::new(llm_registry.clone()),
            service_timeout,
        );
        Self {
            service: Arc::new(service),
            llm_registry,
        }
    }
}

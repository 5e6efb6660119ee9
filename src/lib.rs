pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::services::{
    ai_service::AiOrchestrator, candidate_store::CandidateStore, pipeline_service::PipelineService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CandidateStore>,
    pub pipeline_service: PipelineService,
}

impl AppState {
    pub fn new(store: Arc<CandidateStore>, ai_service: Arc<dyn AiOrchestrator>) -> Self {
        let pipeline_service = PipelineService::new(store.clone(), ai_service);
        Self {
            store,
            pipeline_service,
        }
    }
}

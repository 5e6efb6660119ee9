pub mod ai_service;
pub mod candidate_store;
pub mod pipeline_service;

pub mod ai_dto;
pub mod candidate_dto;

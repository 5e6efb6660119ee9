use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::document::SessionFile;

pub const DEFAULT_EVALUATION_METRICS: &str = "Assess communication skills, problem-solving abilities, cultural fit, and technical proficiency relevant to the role.";

#[derive(Debug, Clone)]
pub struct ResumeScreeningInput {
    pub resume: SessionFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ResumeScreeningOutput {
    pub generated_weighting_criteria: String,
    pub summary: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub weighted_score: f64,
}

#[derive(Debug, Clone, Validate)]
pub struct InterviewAnalysisInput {
    pub audio: SessionFile,
    #[validate(length(min = 50, message = "Transcript must be at least 50 characters."))]
    pub transcript: String,
    #[validate(length(min = 50, message = "Job description must be at least 50 characters."))]
    pub job_description: String,
    #[validate(length(min = 20, message = "Evaluation metrics must be at least 20 characters."))]
    pub evaluation_metrics: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct JobDescriptionInput {
    #[validate(length(min = 3, message = "Job title must be at least 3 characters."))]
    pub job_title: String,
    pub company_name: Option<String>,
    pub company_culture: Option<String>,
    pub key_responsibilities: Option<String>,
    pub required_skills: Option<String>,
    pub benefits: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionOutput {
    pub job_description: String,
}

fn default_question_count() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InterviewQuestionsInput {
    #[validate(length(min = 50, message = "Job description must be at least 50 characters."))]
    pub job_description: String,
    #[serde(default = "default_question_count")]
    #[validate(range(min = 3, max = 20))]
    pub number_of_questions: u32,
    #[serde(default)]
    pub question_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestionsOutput {
    pub questions: Vec<String>,
    #[serde(default)]
    pub suggested_focus_areas: Vec<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct SkillGapInput {
    pub resume: SessionFile,
    #[validate(length(min = 50, message = "Job description must be at least 50 characters."))]
    pub job_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SkillGapOutput {
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub skill_assessment_summary: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub overall_fit_score: f64,
}

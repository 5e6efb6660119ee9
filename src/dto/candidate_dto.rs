use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::candidate::{CandidatePatch, InterviewAnalysis};
use crate::models::status::{CandidateStatus, InterviewType};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCandidateRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
}

impl AddCandidateRequest {
    /// Surrounding whitespace is not part of a name or address; strip it
    /// before the length and format rules run.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

/// Body of `PATCH /api/candidates/:id`. Upload handles are not patchable
/// over JSON; they only arrive through the pipeline uploads.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCandidateRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address."))]
    pub email: Option<String>,
    pub status: Option<CandidateStatus>,

    pub resume_file_name: Option<String>,
    pub resume_summary: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub resume_score: Option<f64>,
    pub weighting_criteria: Option<String>,

    pub interview_audio_file_name: Option<String>,
    pub interview_transcript: Option<String>,
    pub job_description: Option<String>,
    pub evaluation_metrics: Option<String>,
    #[validate(nested)]
    pub interview_analysis: Option<InterviewAnalysis>,

    pub interview_date: Option<DateTime<Utc>>,
    pub interviewer: Option<String>,
    pub interview_type: Option<InterviewType>,
    pub interview_location_link: Option<String>,
}

impl UpdateCandidateRequest {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        self.email = self.email.map(|e| e.trim().to_string());
        self
    }
}

impl From<UpdateCandidateRequest> for CandidatePatch {
    fn from(req: UpdateCandidateRequest) -> Self {
        CandidatePatch {
            name: req.name,
            email: req.email,
            status: req.status,
            resume_file: None,
            resume_file_name: req.resume_file_name,
            resume_summary: req.resume_summary,
            resume_score: req.resume_score,
            weighting_criteria: req.weighting_criteria,
            interview_audio_file: None,
            interview_audio_file_name: req.interview_audio_file_name,
            interview_transcript: req.interview_transcript,
            job_description: req.job_description,
            evaluation_metrics: req.evaluation_metrics,
            interview_analysis: req.interview_analysis,
            interview_date: req.interview_date,
            interviewer: req.interviewer,
            interview_type: req.interview_type,
            interview_location_link: req.interview_location_link,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleInterviewRequest {
    pub interview_date: NaiveDate,
    #[validate(custom(function = "validate_interview_time"))]
    pub interview_time: String,
    #[validate(length(min = 2, message = "Interviewer name must be at least 2 characters."))]
    pub interviewer: String,
    pub interview_type: InterviewType,
    #[validate(length(min = 5, message = "Location/Link must be at least 5 characters."))]
    pub interview_location_link: String,
}

impl ScheduleInterviewRequest {
    /// Combines the calendar date and the `HH:MM` time into one UTC instant.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        let time = parse_interview_time(&self.interview_time)?;
        Some(self.interview_date.and_time(time).and_utc())
    }
}

fn parse_interview_time(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.split_once(':')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

fn validate_interview_time(value: &str) -> Result<(), ValidationError> {
    match parse_interview_time(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("interview_time");
            err.message = Some("Invalid time format (HH:MM).".into());
            Err(err)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateStatsResponse {
    pub total: usize,
    pub by_status: BTreeMap<CandidateStatus, usize>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::document::SessionFile;
use super::status::{CandidateStatus, InterviewType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InterviewAnalysis {
    #[validate(range(min = 0.0, max = 10.0))]
    pub overall_score: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub communication_skills_score: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub soft_skills_score: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub overall_fit_score: f64,
    pub insights: String,
}

/// Session view of a candidate: everything the process knows, including
/// uploads that are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,

    pub resume_file: Option<SessionFile>,
    pub resume_file_name: Option<String>,
    pub resume_summary: Option<String>,
    pub resume_score: Option<f64>,
    pub weighting_criteria: Option<String>,

    pub interview_audio_file: Option<SessionFile>,
    pub interview_audio_file_name: Option<String>,
    pub interview_transcript: Option<String>,
    pub job_description: Option<String>,
    pub evaluation_metrics: Option<String>,
    pub interview_analysis: Option<InterviewAnalysis>,

    pub interview_date: Option<DateTime<Utc>>,
    pub interviewer: Option<String>,
    pub interview_type: Option<InterviewType>,
    pub interview_location_link: Option<String>,
}

/// Persisted view of a candidate: the session view minus the upload handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCandidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighting_criteria: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_audio_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_metrics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_analysis: Option<InterviewAnalysis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<InterviewType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_location_link: Option<String>,
}

/// Partial update merged into an existing candidate. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<CandidateStatus>,

    pub resume_file: Option<SessionFile>,
    pub resume_file_name: Option<String>,
    pub resume_summary: Option<String>,
    pub resume_score: Option<f64>,
    pub weighting_criteria: Option<String>,

    pub interview_audio_file: Option<SessionFile>,
    pub interview_audio_file_name: Option<String>,
    pub interview_transcript: Option<String>,
    pub job_description: Option<String>,
    pub evaluation_metrics: Option<String>,
    pub interview_analysis: Option<InterviewAnalysis>,

    pub interview_date: Option<DateTime<Utc>>,
    pub interviewer: Option<String>,
    pub interview_type: Option<InterviewType>,
    pub interview_location_link: Option<String>,
}

impl CandidatePatch {
    pub fn status(status: CandidateStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Candidate {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            status: CandidateStatus::Applied,
            created_at: Utc::now(),
            resume_file: None,
            resume_file_name: None,
            resume_summary: None,
            resume_score: None,
            weighting_criteria: None,
            interview_audio_file: None,
            interview_audio_file_name: None,
            interview_transcript: None,
            job_description: None,
            evaluation_metrics: None,
            interview_analysis: None,
            interview_date: None,
            interviewer: None,
            interview_type: None,
            interview_location_link: None,
        }
    }

    pub fn apply(&mut self, patch: CandidatePatch) {
        fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }

        merge(&mut self.resume_file, patch.resume_file);
        merge(&mut self.resume_file_name, patch.resume_file_name);
        merge(&mut self.resume_summary, patch.resume_summary);
        merge(&mut self.resume_score, patch.resume_score);
        merge(&mut self.weighting_criteria, patch.weighting_criteria);

        merge(&mut self.interview_audio_file, patch.interview_audio_file);
        merge(&mut self.interview_audio_file_name, patch.interview_audio_file_name);
        merge(&mut self.interview_transcript, patch.interview_transcript);
        merge(&mut self.job_description, patch.job_description);
        merge(&mut self.evaluation_metrics, patch.evaluation_metrics);
        merge(&mut self.interview_analysis, patch.interview_analysis);

        merge(&mut self.interview_date, patch.interview_date);
        merge(&mut self.interviewer, patch.interviewer);
        merge(&mut self.interview_type, patch.interview_type);
        merge(&mut self.interview_location_link, patch.interview_location_link);
    }

    pub fn persisted_view(&self) -> PersistedCandidate {
        PersistedCandidate::from(self)
    }
}

impl From<&Candidate> for PersistedCandidate {
    fn from(c: &Candidate) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            status: c.status,
            created_at: c.created_at,
            resume_file_name: c.resume_file_name.clone(),
            resume_summary: c.resume_summary.clone(),
            resume_score: c.resume_score,
            weighting_criteria: c.weighting_criteria.clone(),
            interview_audio_file_name: c.interview_audio_file_name.clone(),
            interview_transcript: c.interview_transcript.clone(),
            job_description: c.job_description.clone(),
            evaluation_metrics: c.evaluation_metrics.clone(),
            interview_analysis: c.interview_analysis.clone(),
            interview_date: c.interview_date,
            interviewer: c.interviewer.clone(),
            interview_type: c.interview_type,
            interview_location_link: c.interview_location_link.clone(),
        }
    }
}

impl From<PersistedCandidate> for Candidate {
    fn from(p: PersistedCandidate) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            status: p.status,
            created_at: p.created_at,
            resume_file: None,
            resume_file_name: p.resume_file_name,
            resume_summary: p.resume_summary,
            resume_score: p.resume_score,
            weighting_criteria: p.weighting_criteria,
            interview_audio_file: None,
            interview_audio_file_name: p.interview_audio_file_name,
            interview_transcript: p.interview_transcript,
            job_description: p.job_description,
            evaluation_metrics: p.evaluation_metrics,
            interview_analysis: p.interview_analysis,
            interview_date: p.interview_date,
            interviewer: p.interviewer,
            interview_type: p.interview_type,
            interview_location_link: p.interview_location_link,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hiring stage of a candidate.
///
/// The store accepts any value at any time; stage ordering is only checked by
/// the pipeline operations that consume it (see `can_schedule_interview` and
/// `can_analyze_interview`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CandidateStatus {
    #[serde(rename = "Applied")]
    Applied,
    #[serde(rename = "Resume Screening Pending")]
    ResumeScreeningPending,
    #[serde(rename = "Resume Screened")]
    ResumeScreened,
    #[serde(rename = "Interview Scheduling")]
    InterviewScheduling,
    #[serde(rename = "Interview Scheduled")]
    InterviewScheduled,
    #[serde(rename = "Interview Analysis Pending")]
    InterviewAnalysisPending,
    #[serde(rename = "Interview Analyzed")]
    InterviewAnalyzed,
    #[serde(rename = "Offer Extended")]
    OfferExtended,
    #[serde(rename = "Hired")]
    Hired,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 10] = [
        CandidateStatus::Applied,
        CandidateStatus::ResumeScreeningPending,
        CandidateStatus::ResumeScreened,
        CandidateStatus::InterviewScheduling,
        CandidateStatus::InterviewScheduled,
        CandidateStatus::InterviewAnalysisPending,
        CandidateStatus::InterviewAnalyzed,
        CandidateStatus::OfferExtended,
        CandidateStatus::Hired,
        CandidateStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Applied => "Applied",
            CandidateStatus::ResumeScreeningPending => "Resume Screening Pending",
            CandidateStatus::ResumeScreened => "Resume Screened",
            CandidateStatus::InterviewScheduling => "Interview Scheduling",
            CandidateStatus::InterviewScheduled => "Interview Scheduled",
            CandidateStatus::InterviewAnalysisPending => "Interview Analysis Pending",
            CandidateStatus::InterviewAnalyzed => "Interview Analyzed",
            CandidateStatus::OfferExtended => "Offer Extended",
            CandidateStatus::Hired => "Hired",
            CandidateStatus::Rejected => "Rejected",
        }
    }

    /// Stages from which an interview may be (re)scheduled.
    pub fn can_schedule_interview(&self) -> bool {
        matches!(
            self,
            CandidateStatus::ResumeScreened
                | CandidateStatus::InterviewScheduling
                | CandidateStatus::InterviewScheduled
        )
    }

    /// Interview analysis opens once the resume has been screened and stays
    /// open for every later stage except rejection.
    pub fn can_analyze_interview(&self) -> bool {
        matches!(
            self,
            CandidateStatus::ResumeScreened
                | CandidateStatus::InterviewScheduling
                | CandidateStatus::InterviewScheduled
                | CandidateStatus::InterviewAnalysisPending
                | CandidateStatus::InterviewAnalyzed
                | CandidateStatus::OfferExtended
                | CandidateStatus::Hired
        )
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewType {
    #[serde(rename = "Phone Screen")]
    PhoneScreen,
    #[serde(rename = "Video Call")]
    VideoCall,
    #[serde(rename = "In-Person")]
    InPerson,
}

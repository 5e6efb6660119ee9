use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;
use validator::Validate;

use crate::dto::ai_dto::{
    InterviewAnalysisInput, InterviewQuestionsInput, InterviewQuestionsOutput, JobDescriptionInput,
    JobDescriptionOutput, ResumeScreeningInput, ResumeScreeningOutput, SkillGapInput, SkillGapOutput,
};
use crate::dto::candidate_dto::ScheduleInterviewRequest;
use crate::error::{AiOperation, Error, Result};
use crate::models::candidate::{Candidate, CandidatePatch, InterviewAnalysis};
use crate::models::document::SessionFile;
use crate::models::status::CandidateStatus;
use crate::services::ai_service::AiOrchestrator;
use crate::services::candidate_store::CandidateStore;
use crate::utils::upload::{check_audio, check_resume};

type InFlightKey = (Uuid, AiOperation);

/// Marks one AI operation on one candidate as running; released on drop.
struct InFlightGuard {
    registry: Arc<Mutex<HashSet<InFlightKey>>>,
    key: InFlightKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}

/// Stage operations that sit between the HTTP layer and the store: stage
/// gating, the AI call, and applying the complete result in one update.
#[derive(Clone)]
pub struct PipelineService {
    store: Arc<CandidateStore>,
    ai: Arc<dyn AiOrchestrator>,
    in_flight: Arc<Mutex<HashSet<InFlightKey>>>,
}

impl PipelineService {
    pub fn new(store: Arc<CandidateStore>, ai: Arc<dyn AiOrchestrator>) -> Self {
        Self {
            store,
            ai,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn begin(&self, candidate_id: Uuid, op: AiOperation) -> Result<InFlightGuard> {
        let key = (candidate_id, op);
        let mut running = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !running.insert(key) {
            return Err(Error::Conflict(format!(
                "A {} is already in progress for this candidate",
                op.label()
            )));
        }
        Ok(InFlightGuard {
            registry: self.in_flight.clone(),
            key,
        })
    }

    // Whatever went wrong, callers only see a generic failure for the operation.
    fn ai_failure(op: AiOperation, candidate_id: Option<Uuid>, err: Error) -> Error {
        match candidate_id {
            Some(id) => tracing::error!(candidate_id = %id, error = ?err, "AI {} failed", op.label()),
            None => tracing::error!(error = ?err, "AI {} failed", op.label()),
        }
        Error::Ai(op)
    }

    async fn apply(&self, id: Uuid, patch: CandidatePatch) -> Result<Candidate> {
        self.store
            .update_candidate(id, patch)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))
    }

    pub async fn screen_resume(&self, candidate_id: Uuid, resume: SessionFile) -> Result<Candidate> {
        self.store.get_candidate_by_id(candidate_id).await.into_result()?;
        check_resume(&resume)?;

        let _guard = self.begin(candidate_id, AiOperation::ResumeScreening)?;
        let input = ResumeScreeningInput { resume };
        let output = self
            .ai
            .screen_resume(&input)
            .await
            .map_err(|e| Self::ai_failure(AiOperation::ResumeScreening, Some(candidate_id), e))?;

        let resume = input.resume;
        let updated = self
            .apply(
                candidate_id,
                CandidatePatch {
                    status: Some(CandidateStatus::ResumeScreened),
                    resume_file_name: Some(resume.file_name.clone()),
                    resume_file: Some(resume),
                    weighting_criteria: Some(output.generated_weighting_criteria),
                    resume_summary: Some(output.summary),
                    resume_score: Some(output.weighted_score),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(candidate_id = %candidate_id, score = output.weighted_score, "Resume screened");
        Ok(updated)
    }

    pub async fn analyze_interview(
        &self,
        candidate_id: Uuid,
        input: InterviewAnalysisInput,
    ) -> Result<Candidate> {
        let candidate = self.store.get_candidate_by_id(candidate_id).await.into_result()?;
        if !candidate.status.can_analyze_interview() {
            return Err(Error::Conflict(format!(
                "Interview analysis is not available while the candidate is '{}'",
                candidate.status
            )));
        }
        input.validate()?;
        check_audio(&input.audio)?;

        let _guard = self.begin(candidate_id, AiOperation::InterviewAnalysis)?;
        let analysis = self
            .ai
            .analyze_interview(&input)
            .await
            .map_err(|e| Self::ai_failure(AiOperation::InterviewAnalysis, Some(candidate_id), e))?;

        let InterviewAnalysisInput {
            audio,
            transcript,
            job_description,
            evaluation_metrics,
        } = input;

        let updated = self
            .apply(
                candidate_id,
                CandidatePatch {
                    status: Some(CandidateStatus::InterviewAnalyzed),
                    interview_audio_file_name: Some(audio.file_name.clone()),
                    interview_audio_file: Some(audio),
                    interview_transcript: Some(transcript),
                    job_description: Some(job_description),
                    evaluation_metrics: Some(evaluation_metrics),
                    interview_analysis: Some(analysis),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(candidate_id = %candidate_id, "Interview analyzed");
        Ok(updated)
    }

    pub async fn schedule_interview(
        &self,
        candidate_id: Uuid,
        request: ScheduleInterviewRequest,
    ) -> Result<Candidate> {
        let candidate = self.store.get_candidate_by_id(candidate_id).await.into_result()?;
        if !candidate.status.can_schedule_interview() {
            return Err(Error::Conflict(format!(
                "Interviews can only be scheduled after resume screening (candidate is '{}')",
                candidate.status
            )));
        }
        request.validate()?;
        let scheduled_at = request
            .scheduled_at()
            .ok_or_else(|| Error::BadRequest("Invalid time format (HH:MM).".into()))?;

        let updated = self
            .apply(
                candidate_id,
                CandidatePatch {
                    status: Some(CandidateStatus::InterviewScheduled),
                    interview_date: Some(scheduled_at),
                    interviewer: Some(request.interviewer),
                    interview_type: Some(request.interview_type),
                    interview_location_link: Some(request.interview_location_link),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(candidate_id = %candidate_id, at = %scheduled_at, "Interview scheduled");
        Ok(updated)
    }

    /// Resume screening detached from any candidate; the result is only returned.
    pub async fn evaluate_resume(&self, resume: SessionFile) -> Result<ResumeScreeningOutput> {
        check_resume(&resume)?;
        self.ai
            .screen_resume(&ResumeScreeningInput { resume })
            .await
            .map_err(|e| Self::ai_failure(AiOperation::ResumeScreening, None, e))
    }

    pub async fn evaluate_interview(&self, input: InterviewAnalysisInput) -> Result<InterviewAnalysis> {
        input.validate()?;
        check_audio(&input.audio)?;
        self.ai
            .analyze_interview(&input)
            .await
            .map_err(|e| Self::ai_failure(AiOperation::InterviewAnalysis, None, e))
    }

    pub async fn generate_job_description(&self, input: JobDescriptionInput) -> Result<JobDescriptionOutput> {
        input.validate()?;
        self.ai
            .generate_job_description(&input)
            .await
            .map_err(|e| Self::ai_failure(AiOperation::JobDescription, None, e))
    }

    pub async fn generate_interview_questions(
        &self,
        input: InterviewQuestionsInput,
    ) -> Result<InterviewQuestionsOutput> {
        input.validate()?;
        self.ai
            .generate_interview_questions(&input)
            .await
            .map_err(|e| Self::ai_failure(AiOperation::InterviewQuestions, None, e))
    }

    pub async fn analyze_skill_gap(&self, input: SkillGapInput) -> Result<SkillGapOutput> {
        input.validate()?;
        check_resume(&input.resume)?;
        self.ai
            .analyze_skill_gap(&input)
            .await
            .map_err(|e| Self::ai_failure(AiOperation::SkillGap, None, e))
    }
}

use crate::dto::ai_dto::{
    InterviewAnalysisInput, InterviewQuestionsInput, InterviewQuestionsOutput, JobDescriptionInput,
    JobDescriptionOutput, ResumeScreeningInput, ResumeScreeningOutput, SkillGapInput, SkillGapOutput,
};
use crate::error::Result;
use crate::models::candidate::InterviewAnalysis;
use crate::models::document::SessionFile;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use validator::Validate;

/// Request/response contract with the generative-AI provider. Every call is
/// fallible and returns either the complete structured output or an error.
#[async_trait]
pub trait AiOrchestrator: Send + Sync {
    async fn screen_resume(&self, input: &ResumeScreeningInput) -> Result<ResumeScreeningOutput>;

    async fn analyze_interview(&self, input: &InterviewAnalysisInput) -> Result<InterviewAnalysis>;

    async fn generate_job_description(&self, input: &JobDescriptionInput) -> Result<JobDescriptionOutput>;

    async fn generate_interview_questions(
        &self,
        input: &InterviewQuestionsInput,
    ) -> Result<InterviewQuestionsOutput>;

    async fn analyze_skill_gap(&self, input: &SkillGapInput) -> Result<SkillGapOutput>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 2],
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: JsonValue,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> ChatRequest<'a> {
    /// One system instruction plus one user turn, answered as a JSON object.
    fn json_reply(model: &'a str, system_prompt: &str, user_content: JsonValue) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: JsonValue::String(system_prompt.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: None,
        }
    }

    fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Decodes the first choice of a completion as `T`. Refusals and replies cut
/// off by the token limit are errors, since their JSON cannot be trusted.
fn decode_reply<T: DeserializeOwned>(response: ChatResponse) -> Result<T> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("completion has no choices"))?;
    if let Some(refusal) = choice.message.refusal {
        return Err(anyhow::anyhow!("model refused: {}", refusal).into());
    }
    if choice.finish_reason.as_deref() == Some("length") {
        return Err(anyhow::anyhow!("completion truncated at the token limit").into());
    }
    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("completion has no content"))?;
    Ok(serde_json::from_str(&content)?)
}

const MAX_LOGGED_ERROR_BODY: usize = 500;

#[derive(Clone)]
pub struct OpenAiService {
    client: Client,
    api_key: String,
    completions_url: String,
    model: String,
    audio_model: Option<String>,
    timeout: Duration,
}

impl OpenAiService {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        audio_model: Option<String>,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model,
            audio_model,
            timeout,
        }
    }

    async fn complete<T: DeserializeOwned>(&self, request: &ChatRequest<'_>) -> Result<T> {
        let res = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let mut body = res.text().await.unwrap_or_default();
            if body.len() > MAX_LOGGED_ERROR_BODY {
                let cut = (0..=MAX_LOGGED_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            tracing::warn!(model = request.model, %status, body = %body, "Completion request rejected");
            return Err(anyhow::anyhow!("completion request failed with status {}", status).into());
        }

        decode_reply(res.json::<ChatResponse>().await?)
    }

    /// Completion whose JSON reply must also pass the output's range checks.
    async fn complete_validated<T>(&self, request: &ChatRequest<'_>) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let output: T = self.complete(request).await?;
        output.validate()?;
        Ok(output)
    }
}

fn text_part(text: impl Into<String>) -> JsonValue {
    json!({ "type": "text", "text": text.into() })
}

/// Plain text is inlined; PDF and DOCX travel as base64 `file` parts.
fn document_part(file: &SessionFile) -> JsonValue {
    if file.is_text() {
        return text_part(format!(
            "Document ({}):\n{}",
            file.file_name,
            String::from_utf8_lossy(&file.data)
        ));
    }
    json!({
        "type": "file",
        "file": { "filename": file.file_name, "file_data": file.to_data_uri() }
    })
}

fn audio_format(content_type: &str) -> Option<&'static str> {
    match content_type {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        _ => None,
    }
}

fn job_description_brief(input: &JobDescriptionInput) -> String {
    let mut brief = format!("Job Title: {}\n", input.job_title);
    let sections = [
        ("Company Name", &input.company_name),
        ("Company Culture & Values", &input.company_culture),
        ("Key Responsibilities", &input.key_responsibilities),
        ("Required Skills & Qualifications", &input.required_skills),
        ("Benefits & Perks", &input.benefits),
    ];
    for (heading, value) in sections {
        if let Some(text) = value.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            brief.push_str(&format!("\n{}:\n{}\n", heading, text));
        }
    }
    brief
}

const RESUME_SCREENING_PROMPT: &str = r#"You analyse resumes for a recruiting team.
Infer which roles the candidate is best suited for, then derive weighting criteria a recruiter
would use to evaluate the candidate for those roles. The criteria must follow from the resume itself.
Using those criteria, write a summary of how the profile aligns with them and compute a weighted score.

Return JSON: { "generated_weighting_criteria": "<criteria>", "summary": "<summary>", "weighted_score": <number 0-100> }"#;

const INTERVIEW_ANALYSIS_PROMPT: &str = r#"You are a hiring manager reviewing a recorded interview.
Use the transcript, the job description and the evaluation metrics to judge the candidate's
communication, soft skills and fit with the role. Score every dimension from 0 to 10.

Return JSON: { "overall_score": <0-10>, "communication_skills_score": <0-10>, "soft_skills_score": <0-10>, "overall_fit_score": <0-10>, "insights": "<insights>" }"#;

const JOB_DESCRIPTION_PROMPT: &str = r#"You are an HR copywriter. Write a clear, engaging job posting for the role described.
Include a short company overview when company details are given, a role summary, responsibilities,
required and preferred skills, benefits when provided, and a call to action. Use headings and bullet points.

Return JSON: { "job_description": "<full posting text>" }"#;

const INTERVIEW_QUESTIONS_PROMPT: &str = r#"You are a hiring manager preparing an interview. Based on the job description,
write insightful questions that assess skills, experience, problem solving and cultural fit.
Also list the focus areas the questions cover.

Return JSON: { "questions": ["<question>", ...], "suggested_focus_areas": ["<area>", ...] }"#;

const SKILL_GAP_PROMPT: &str = r#"You are an HR analyst comparing a resume against a job description.
List the skills present in both, the required skills the resume does not show, a short assessment
of strengths and gaps, and a fit score from 0 to 100. Base the analysis only on the two documents.

Return JSON: { "matching_skills": [...], "missing_skills": [...], "skill_assessment_summary": "<summary>", "overall_fit_score": <0-100> }"#;

#[async_trait]
impl AiOrchestrator for OpenAiService {
    async fn screen_resume(&self, input: &ResumeScreeningInput) -> Result<ResumeScreeningOutput> {
        tracing::info!("Screening resume {} ({} bytes)", input.resume.file_name, input.resume.size);
        let content = json!([text_part("Resume to analyse:"), document_part(&input.resume)]);
        self.complete_validated(&ChatRequest::json_reply(&self.model, RESUME_SCREENING_PROMPT, content))
            .await
    }

    async fn analyze_interview(&self, input: &InterviewAnalysisInput) -> Result<InterviewAnalysis> {
        let mut content = vec![text_part(format!(
            "Interview Transcript:\n{}\n\nJob Description:\n{}\n\nEvaluation Metrics:\n{}",
            input.transcript, input.job_description, input.evaluation_metrics
        ))];

        let model = match (&self.audio_model, audio_format(&input.audio.content_type)) {
            (Some(audio_model), Some(format)) => {
                content.push(json!({
                    "type": "input_audio",
                    "input_audio": { "data": input.audio.base64_payload(), "format": format }
                }));
                audio_model.as_str()
            }
            _ => {
                tracing::info!(
                    "Analysing interview from transcript only (audio type {})",
                    input.audio.content_type
                );
                self.model.as_str()
            }
        };

        self.complete_validated(&ChatRequest::json_reply(
            model,
            INTERVIEW_ANALYSIS_PROMPT,
            JsonValue::Array(content),
        ))
        .await
    }

    async fn generate_job_description(&self, input: &JobDescriptionInput) -> Result<JobDescriptionOutput> {
        let request = ChatRequest::json_reply(
            &self.model,
            JOB_DESCRIPTION_PROMPT,
            JsonValue::String(job_description_brief(input)),
        );
        let output: JobDescriptionOutput = self.complete(&request).await?;
        if output.job_description.trim().is_empty() {
            return Err(anyhow::anyhow!("Empty job description returned").into());
        }
        Ok(output)
    }

    async fn generate_interview_questions(
        &self,
        input: &InterviewQuestionsInput,
    ) -> Result<InterviewQuestionsOutput> {
        let mut ask = format!(
            "Job Description:\n{}\n\nGenerate exactly {} questions.",
            input.job_description, input.number_of_questions
        );
        if let Some(types) = input.question_types.as_ref().filter(|t| !t.is_empty()) {
            ask.push_str(&format!("\nFocus on these question types: {}.", types.join(", ")));
        }

        let request = ChatRequest::json_reply(&self.model, INTERVIEW_QUESTIONS_PROMPT, JsonValue::String(ask))
            .with_temperature(0.7);
        let mut output: InterviewQuestionsOutput = self.complete(&request).await?;
        output.questions.retain(|q| !q.trim().is_empty());
        if output.questions.is_empty() {
            return Err(anyhow::anyhow!("No interview questions returned").into());
        }
        output.questions.truncate(input.number_of_questions as usize);
        Ok(output)
    }

    async fn analyze_skill_gap(&self, input: &SkillGapInput) -> Result<SkillGapOutput> {
        let content = json!([
            text_part(format!("Job Description:\n{}", input.job_description)),
            text_part("Candidate Resume:"),
            document_part(&input.resume),
        ]);
        self.complete_validated(&ChatRequest::json_reply(&self.model, SKILL_GAP_PROMPT, content))
            .await
    }
}

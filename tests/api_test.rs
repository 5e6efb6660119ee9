use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hiring_pipeline::{
    database::slot::MemorySlot,
    dto::ai_dto::{
        InterviewAnalysisInput, InterviewQuestionsInput, InterviewQuestionsOutput, JobDescriptionInput,
        JobDescriptionOutput, ResumeScreeningInput, ResumeScreeningOutput, SkillGapInput, SkillGapOutput,
    },
    error::{Error, Result},
    middleware::{
        auth::{AuthKeys, Claims},
        rate_limit::RequestBudget,
    },
    models::candidate::InterviewAnalysis,
    routes::app_router,
    services::{ai_service::AiOrchestrator, candidate_store::CandidateStore},
    AppState,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use mockall::mock;
use serde_json::{json, Value as JsonValue};
use tokio::sync::Notify;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test_secret_key";
const BOUNDARY: &str = "----hiring-pipeline-test";

mock! {
    pub Ai {}

    #[async_trait]
    impl AiOrchestrator for Ai {
        async fn screen_resume(&self, input: &ResumeScreeningInput) -> Result<ResumeScreeningOutput>;
        async fn analyze_interview(&self, input: &InterviewAnalysisInput) -> Result<InterviewAnalysis>;
        async fn generate_job_description(&self, input: &JobDescriptionInput) -> Result<JobDescriptionOutput>;
        async fn generate_interview_questions(&self, input: &InterviewQuestionsInput) -> Result<InterviewQuestionsOutput>;
        async fn analyze_skill_gap(&self, input: &SkillGapInput) -> Result<SkillGapOutput>;
    }
}

/// Screening that holds until released, so a second request can overlap it.
#[derive(Default)]
struct GatedAi {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl AiOrchestrator for GatedAi {
    async fn screen_resume(&self, _input: &ResumeScreeningInput) -> Result<ResumeScreeningOutput> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(screening_ok())
    }

    async fn analyze_interview(&self, _input: &InterviewAnalysisInput) -> Result<InterviewAnalysis> {
        Err(Error::Internal("not used".into()))
    }

    async fn generate_job_description(&self, _input: &JobDescriptionInput) -> Result<JobDescriptionOutput> {
        Err(Error::Internal("not used".into()))
    }

    async fn generate_interview_questions(
        &self,
        _input: &InterviewQuestionsInput,
    ) -> Result<InterviewQuestionsOutput> {
        Err(Error::Internal("not used".into()))
    }

    async fn analyze_skill_gap(&self, _input: &SkillGapInput) -> Result<SkillGapOutput> {
        Err(Error::Internal("not used".into()))
    }
}

async fn setup_with(ai: Arc<dyn AiOrchestrator>, loaded: bool) -> Router {
    let store = Arc::new(CandidateStore::new(Arc::new(MemorySlot::new()), "candidates"));
    if loaded {
        store.load().await;
    }
    let state = AppState::new(store, ai);
    app_router(state, AuthKeys::new(SECRET), RequestBudget::per_second(1_000))
}

async fn setup_app(ai: MockAi, loaded: bool) -> Router {
    setup_with(Arc::new(ai), loaded).await
}

fn token() -> String {
    let claims = Claims {
        sub: "recruiter-1".into(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        email: Some("recruiter@example.com".into()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn json_request(method: &str, uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token()))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token()))
        .body(Body::empty())
        .unwrap()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token()))
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_candidate(app: &Router, name: &str) -> Uuid {
    let (status, body) = send(
        app,
        json_request("POST", "/api/candidates", json!({ "name": name, "email": "jane@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().parse().unwrap()
}

fn screening_ok() -> ResumeScreeningOutput {
    ResumeScreeningOutput {
        generated_weighting_criteria: "Backend experience 40%, Rust 60%".into(),
        summary: "Strong systems background".into(),
        weighted_score: 82.0,
    }
}

#[tokio::test]
async fn health_is_public_and_reports_store_readiness() {
    let app = setup_app(MockAi::new(), false).await;
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store_ready"], false);
}

#[tokio::test]
async fn api_requires_a_valid_bearer_token() {
    let app = setup_app(MockAi::new(), true).await;

    let missing = Request::builder().uri("/api/candidates").body(Body::empty()).unwrap();
    assert_eq!(send(&app, missing).await.0, StatusCode::UNAUTHORIZED);

    let forged = Request::builder()
        .uri("/api/candidates")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, forged).await.0, StatusCode::UNAUTHORIZED);

    assert_eq!(send(&app, get_request("/api/candidates")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn candidate_crud_flow() {
    let app = setup_app(MockAi::new(), true).await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/candidates", json!({ "name": "J", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/candidates", json!({ "name": "   ", "email": "a@b.co" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/candidates", json!({ "name": "  Jo  ", "email": " jo@example.com " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Jo");
    assert_eq!(body["email"], "jo@example.com");

    let id = create_candidate(&app, "Jane Doe").await;

    let (status, body) = send(&app, get_request(&format!("/api/candidates/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["status"], "Applied");

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/candidates/{}", id),
            json!({ "resume_summary": "Manually entered", "resume_score": 64.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resume_score"], 64.0);
    assert_eq!(body["name"], "Jane Doe");

    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/candidates/{}/status", id), json!({ "status": "Rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Rejected");

    let (status, body) = send(&app, get_request("/api/candidates/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["by_status"]["Rejected"], 1);
    assert_eq!(body["by_status"]["Applied"], 1);

    let (status, _) = send(&app, get_request(&format!("/api/candidates/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookups_during_loading_are_unavailable_not_missing() {
    let app = setup_app(MockAi::new(), false).await;
    let (status, _) = send(&app, get_request(&format!("/api/candidates/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/candidates", json!({ "name": "Early Bird", "email": "early@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn resume_screening_applies_the_full_result() {
    let mut ai = MockAi::new();
    ai.expect_screen_resume()
        .times(1)
        .returning(|input| {
            assert_eq!(input.resume.file_name, "jane.pdf");
            Ok(screening_ok())
        });
    let app = setup_app(ai, true).await;
    let id = create_candidate(&app, "Jane Doe").await;

    let (status, body) = send(
        &app,
        multipart_request(
            &format!("/api/candidates/{}/resume-screening", id),
            &[Part::File("resume", "jane.pdf", "application/pdf", b"%PDF-1.7 resume")],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Resume Screened");
    assert_eq!(body["resume_score"], 82.0);
    assert_eq!(body["resume_file_name"], "jane.pdf");
    assert_eq!(body["resume_file"]["file_name"], "jane.pdf");
    assert!(body["resume_file"].get("data").is_none());
    assert_eq!(body["weighting_criteria"], "Backend experience 40%, Rust 60%");
}

#[tokio::test]
async fn failed_ai_call_leaves_candidate_untouched() {
    let mut ai = MockAi::new();
    ai.expect_screen_resume()
        .returning(|_| Err(Error::Internal("upstream timeout".into())));
    let app = setup_app(ai, true).await;
    let id = create_candidate(&app, "Jane Doe").await;

    let (status, body) = send(
        &app,
        multipart_request(
            &format!("/api/candidates/{}/resume-screening", id),
            &[Part::File("resume", "jane.pdf", "application/pdf", b"%PDF-1.7 resume")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "AI resume screening failed. Please try again.");

    let (_, body) = send(&app, get_request(&format!("/api/candidates/{}", id))).await;
    assert_eq!(body["status"], "Applied");
    assert!(body["resume_score"].is_null());
    assert!(body["resume_file_name"].is_null());
}

#[tokio::test]
async fn invalid_resume_upload_is_rejected_before_the_ai_call() {
    let mut ai = MockAi::new();
    ai.expect_screen_resume().never();
    let app = setup_app(ai, true).await;
    let id = create_candidate(&app, "Jane Doe").await;

    let (status, _) = send(
        &app,
        multipart_request(
            &format!("/api/candidates/{}/resume-screening", id),
            &[Part::File("resume", "photo.png", "image/png", b"\x89PNG....")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        multipart_request(&format!("/api/candidates/{}/resume-screening", id), &[]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scheduling_and_analysis_follow_the_pipeline_order() {
    let mut ai = MockAi::new();
    ai.expect_screen_resume().returning(|_| Ok(screening_ok()));
    ai.expect_analyze_interview().times(1).returning(|input| {
        assert!(input.evaluation_metrics.starts_with("Assess communication skills"));
        Ok(InterviewAnalysis {
            overall_score: 8.0,
            communication_skills_score: 9.0,
            soft_skills_score: 7.5,
            overall_fit_score: 8.0,
            insights: "Clear communicator".into(),
        })
    });
    let app = setup_app(ai, true).await;
    let id = create_candidate(&app, "Jane Doe").await;

    let schedule = json!({
        "interview_date": "2026-11-02",
        "interview_time": "14:30",
        "interviewer": "Sam Lee",
        "interview_type": "Video Call",
        "interview_location_link": "https://meet.example.com/jane"
    });
    let schedule_uri = format!("/api/candidates/{}/interview-schedule", id);

    let (status, _) = send(&app, json_request("POST", &schedule_uri, schedule.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        multipart_request(
            &format!("/api/candidates/{}/resume-screening", id),
            &[Part::File("resume", "jane.txt", "text/plain", b"Rust engineer, 8 years")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut bad_time = schedule.clone();
    bad_time["interview_time"] = json!("2pm");
    let (status, _) = send(&app, json_request("POST", &schedule_uri, bad_time)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, json_request("POST", &schedule_uri, schedule)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Interview Scheduled");
    assert_eq!(body["interview_type"], "Video Call");
    assert_eq!(body["interview_date"], "2026-11-02T14:30:00Z");

    let transcript = "Interviewer: tell me about a hard bug. Candidate: a race in our cache layer...";
    let job_description = "Senior backend engineer building storage services in Rust and Postgres.";
    let (status, body) = send(
        &app,
        multipart_request(
            &format!("/api/candidates/{}/interview-analysis", id),
            &[
                Part::File("audio", "call.mp3", "audio/mpeg", b"ID3\x03\x00fake"),
                Part::Text("transcript", transcript),
                Part::Text("job_description", job_description),
                Part::Text("evaluation_metrics", "   "),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Interview Analyzed");
    assert_eq!(body["interview_analysis"]["communication_skills_score"], 9.0);
    assert_eq!(body["interview_audio_file_name"], "call.mp3");
    assert_eq!(body["interviewer"], "Sam Lee");
}

#[tokio::test]
async fn ai_tools_validate_before_calling_out() {
    let mut ai = MockAi::new();
    ai.expect_generate_interview_questions()
        .times(1)
        .returning(|input| {
            Ok(InterviewQuestionsOutput {
                questions: (0..input.number_of_questions).map(|i| format!("Question {}", i)).collect(),
                suggested_focus_areas: vec!["Ownership".into()],
            })
        });
    ai.expect_generate_job_description()
        .returning(|_| Err(Error::Internal("quota exceeded".into())));
    let app = setup_app(ai, true).await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/ai/interview-questions", json!({ "job_description": "too short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/ai/interview-questions",
            json!({
                "job_description": "Senior backend engineer building storage services in Rust and Postgres.",
                "number_of_questions": 4
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 4);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/ai/job-description", json!({ "job_title": "Platform Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "AI job description generation failed. Please try again.");
}

#[tokio::test]
async fn skill_gap_returns_result_without_touching_candidates() {
    let mut ai = MockAi::new();
    ai.expect_analyze_skill_gap().times(1).returning(|_| {
        Ok(SkillGapOutput {
            matching_skills: vec!["Rust".into()],
            missing_skills: vec!["Kubernetes".into()],
            skill_assessment_summary: "Good core fit".into(),
            overall_fit_score: 71.0,
        })
    });
    let app = setup_app(ai, true).await;

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/ai/skill-gap",
            &[
                Part::File("resume", "cv.txt", "text/plain", b"Rust, Postgres, Linux"),
                Part::Text(
                    "job_description",
                    "Platform engineer with Rust, Kubernetes and Postgres operations experience.",
                ),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["missing_skills"][0], "Kubernetes");
    assert_eq!(body["overall_fit_score"], 71.0);

    let (_, body) = send(&app, get_request("/api/candidates")).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn overlapping_screening_is_a_conflict_until_the_first_finishes() {
    let ai = Arc::new(GatedAi::default());
    let app = setup_with(ai.clone(), true).await;
    let id = create_candidate(&app, "Jane Doe").await;
    let uri = format!("/api/candidates/{}/resume-screening", id);
    let upload = || multipart_request(&uri, &[Part::File("resume", "jane.txt", "text/plain", b"Rust engineer")]);

    let first = tokio::spawn({
        let app = app.clone();
        let req = upload();
        async move { send(&app, req).await }
    });
    ai.entered.notified().await;

    let (status, body) = send(&app, upload()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already in progress"));

    ai.release.notify_one();
    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Resume Screened");

    // stored permit lets the next call through without waiting
    ai.release.notify_one();
    let (status, _) = send(&app, upload()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn interview_analysis_is_refused_for_a_fresh_applicant() {
    let mut ai = MockAi::new();
    ai.expect_analyze_interview().never();
    let app = setup_app(ai, true).await;
    let id = create_candidate(&app, "Jane Doe").await;

    let (status, _) = send(
        &app,
        multipart_request(
            &format!("/api/candidates/{}/interview-analysis", id),
            &[
                Part::File("audio", "call.mp3", "audio/mpeg", b"ID3\x03\x00fake"),
                Part::Text("transcript", "Interviewer: tell me about a hard bug. Candidate: a race in our cache layer..."),
                Part::Text("job_description", "Senior backend engineer building storage services in Rust and Postgres."),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, get_request(&format!("/api/candidates/{}", id))).await;
    assert_eq!(body["status"], "Applied");
    assert!(body["interview_analysis"].is_null());
}

#[tokio::test]
async fn standalone_resume_screening_stores_nothing() {
    let mut ai = MockAi::new();
    ai.expect_screen_resume().times(1).returning(|input| {
        assert_eq!(input.resume.file_name, "cv.pdf");
        Ok(screening_ok())
    });
    let app = setup_app(ai, true).await;

    let (status, _) = send(
        &app,
        multipart_request(
            "/api/ai/resume-screening",
            &[Part::File("resume", "photo.png", "image/png", b"\x89PNG....")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/ai/resume-screening",
            &[Part::File("resume", "cv.pdf", "application/pdf", b"%PDF-1.7 resume")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weighted_score"], 82.0);
    assert_eq!(body["summary"], "Strong systems background");

    let (_, body) = send(&app, get_request("/api/candidates")).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn standalone_interview_analysis_validates_and_stores_nothing() {
    let mut ai = MockAi::new();
    ai.expect_analyze_interview().times(1).returning(|input| {
        assert_eq!(input.evaluation_metrics, "Depth on distributed systems trade-offs");
        Ok(InterviewAnalysis {
            overall_score: 7.0,
            communication_skills_score: 6.5,
            soft_skills_score: 7.0,
            overall_fit_score: 7.5,
            insights: "Solid fundamentals".into(),
        })
    });
    let app = setup_app(ai, true).await;
    let transcript = "Interviewer: tell me about a hard bug. Candidate: a race in our cache layer...";
    let job_description = "Senior backend engineer building storage services in Rust and Postgres.";

    let (status, _) = send(
        &app,
        multipart_request(
            "/api/ai/interview-analysis",
            &[
                Part::File("audio", "call.mp3", "audio/mpeg", b"ID3\x03\x00fake"),
                Part::Text("transcript", "too short"),
                Part::Text("job_description", job_description),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        multipart_request(
            "/api/ai/interview-analysis",
            &[
                Part::File("audio", "notes.txt", "text/plain", b"not audio"),
                Part::Text("transcript", transcript),
                Part::Text("job_description", job_description),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/ai/interview-analysis",
            &[
                Part::File("audio", "call.mp3", "audio/mpeg", b"ID3\x03\x00fake"),
                Part::Text("transcript", transcript),
                Part::Text("job_description", job_description),
                Part::Text("evaluation_metrics", "  Depth on distributed systems trade-offs "),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_fit_score"], 7.5);
    assert_eq!(body["insights"], "Solid fundamentals");

    let (_, body) = send(&app, get_request("/api/candidates")).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::llm::{ChatMessage, LlmError, TextGenerator};
use crate::scenario::CaseLibrary;
use crate::workflows::assessment::{AssessmentRequest, AssessmentService, ChatTurn, Speaker};
use crate::workflows::differential::{Confidence, Differential, DifferentialEntry};
use crate::workflows::scoring::{ScoringConfig, ScoringRequest};

/// Generator returning one canned reply, or an HTTP 500 when none is set.
#[derive(Default)]
pub(super) struct ScriptedGenerator {
    reply: Option<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGenerator {
    pub(super) fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing() -> Self {
        Self::default()
    }

    pub(super) fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(messages);
        let reply = self.reply.clone();
        async move {
            reply.ok_or_else(|| LlmError::Status {
                status: 500,
                body: "model crashed".to_string(),
            })
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn base_url(&self) -> &str {
        "http://scripted.invalid"
    }
}

pub(super) fn library() -> Arc<CaseLibrary> {
    Arc::new(CaseLibrary::builtin().expect("bundled data loads"))
}

pub(super) fn build_service(
    generator: ScriptedGenerator,
) -> (AssessmentService<ScriptedGenerator>, Arc<ScriptedGenerator>) {
    let generator = Arc::new(generator);
    let service = AssessmentService::new(library(), generator.clone(), ScoringConfig::default());
    (service, generator)
}

pub(super) fn stemi_only_request() -> ScoringRequest {
    ScoringRequest {
        ordered_tests: vec!["ecg".to_string(), "troponin".to_string()],
        differential_detailed: Differential::from_entries(vec![DifferentialEntry::new(
            "stemi",
            1,
            Confidence::High,
        )]),
        final_dx_id: Some("stemi".to_string()),
        missing_must_not_miss: Vec::new(),
    }
}

pub(super) fn assessment_request() -> AssessmentRequest {
    AssessmentRequest {
        scenario_id: "chest-pain-er".to_string(),
        scoring: stemi_only_request(),
        red_flags_found: vec!["Exertional onset".to_string()],
        chief_complaint: Some("Chest pain".to_string()),
        chat: vec![
            ChatTurn {
                role: Speaker::Doctor,
                content: "Where is the pain?".to_string(),
            },
            ChatTurn {
                role: Speaker::Patient,
                content: "Right in the middle of my chest.".to_string(),
            },
        ],
        ..AssessmentRequest::default()
    }
}

pub(super) fn model_assessment() -> String {
    let body = json!({
        "overallRating": "Good",
        "summary": "Solid work.",
        "strengths": ["Ordered an ECG early"],
        "areasForImprovement": ["Broaden the differential"],
        "totalScore": 99,
        "scoreBreakdown": { "history": 4 }
    });
    format!("Here is the assessment:\n```json\n{body}\n```")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("valid json")
}

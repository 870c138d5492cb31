use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::AssessmentRequest;
use super::service::{AssessmentError, AssessmentService};
use crate::catalog::{CatalogQuery, ClinicalCategory, TestKind};
use crate::llm::{LlmError, TextGenerator};
use crate::workflows::resolution::ResolutionError;
use crate::workflows::scoring::ScoringRequest;
use crate::workflows::tutor::{PatientChatRequest, TermRequest};

type SharedService<G> = Arc<AssessmentService<G>>;

/// Router builder exposing catalogs, scenarios, scoring and the model-backed endpoints.
pub fn assessment_router<G>(service: SharedService<G>) -> Router
where
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/api/v1/scenarios", get(list_scenarios_handler::<G>))
        .route("/api/v1/scenarios/:scenario_id", get(scenario_handler::<G>))
        .route(
            "/api/v1/scenarios/:scenario_id/tests/:test_id",
            get(resolve_test_handler::<G>),
        )
        .route(
            "/api/v1/scenarios/:scenario_id/diagnoses/:dx_id",
            get(resolve_dx_handler::<G>),
        )
        .route(
            "/api/v1/scenarios/:scenario_id/score",
            post(score_handler::<G>),
        )
        .route("/api/v1/catalog/tests", get(test_catalog_handler::<G>))
        .route(
            "/api/v1/catalog/diagnoses",
            get(diagnosis_catalog_handler::<G>),
        )
        .route("/api/v1/assess", post(assess_handler::<G>))
        .route("/api/v1/patient-chat", post(patient_chat_handler::<G>))
        .route("/api/v1/explain-term", post(explain_term_handler::<G>))
        .route("/api/v1/llm/status", get(llm_status_handler::<G>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CatalogParams {
    category: Option<ClinicalCategory>,
    kind: Option<TestKind>,
    q: Option<String>,
    #[serde(default)]
    common_only: bool,
    /// Comma-separated ids to leave out.
    exclude: Option<String>,
}

impl CatalogParams {
    fn into_query(self) -> CatalogQuery {
        CatalogQuery {
            category: self.category,
            kind: self.kind,
            text: self.q,
            common_only: self.common_only,
            exclude: self
                .exclude
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn error_response(error: AssessmentError) -> Response {
    let (status, message, details) = match &error {
        AssessmentError::ScenarioNotFound(id) => (
            StatusCode::NOT_FOUND,
            "Scenario not found".to_string(),
            id.clone(),
        ),
        AssessmentError::Resolution(inner) => {
            let id = match inner {
                ResolutionError::TestNotFound(id) | ResolutionError::DiagnosisNotFound(id) => {
                    id.clone()
                }
            };
            (StatusCode::NOT_FOUND, inner.to_string(), id)
        }
        AssessmentError::Upstream(LlmError::Unavailable { source, .. }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            error.to_string(),
            source.to_string(),
        ),
        AssessmentError::Upstream(inner) => (
            StatusCode::BAD_GATEWAY,
            "Text-generation request failed".to_string(),
            inner.to_string(),
        ),
        AssessmentError::MalformedResponse(inner) => (
            StatusCode::BAD_GATEWAY,
            error.to_string(),
            inner.to_string(),
        ),
        AssessmentError::InvalidRequest(message) => (
            StatusCode::BAD_REQUEST,
            message.clone(),
            "request rejected".to_string(),
        ),
    };

    if status.is_server_error() {
        tracing::error!(%status, error = %error, "request failed");
    }

    let payload = json!({
        "error": message,
        "details": details,
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn list_scenarios_handler<G>(State(service): State<SharedService<G>>) -> Response
where
    G: TextGenerator + 'static,
{
    Json(service.library().scenarios.summaries()).into_response()
}

pub(crate) async fn scenario_handler<G>(
    State(service): State<SharedService<G>>,
    Path(scenario_id): Path<String>,
) -> Response
where
    G: TextGenerator + 'static,
{
    match service.scenario(&scenario_id) {
        Ok(scenario) => Json(scenario.public_view()).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resolve_test_handler<G>(
    State(service): State<SharedService<G>>,
    Path((scenario_id, test_id)): Path<(String, String)>,
) -> Response
where
    G: TextGenerator + 'static,
{
    match service.resolve_test(&scenario_id, &test_id) {
        Ok(resolved) => Json(resolved).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resolve_dx_handler<G>(
    State(service): State<SharedService<G>>,
    Path((scenario_id, dx_id)): Path<(String, String)>,
) -> Response
where
    G: TextGenerator + 'static,
{
    match service.resolve_dx(&scenario_id, &dx_id) {
        Ok(resolved) => Json(resolved).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<G>(
    State(service): State<SharedService<G>>,
    Path(scenario_id): Path<String>,
    Json(request): Json<ScoringRequest>,
) -> Response
where
    G: TextGenerator + 'static,
{
    match service.score(&scenario_id, &request) {
        Ok(report) => Json(report).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn test_catalog_handler<G>(
    State(service): State<SharedService<G>>,
    Query(params): Query<CatalogParams>,
) -> Response
where
    G: TextGenerator + 'static,
{
    let query = params.into_query();
    Json(service.library().tests.search(&query)).into_response()
}

pub(crate) async fn diagnosis_catalog_handler<G>(
    State(service): State<SharedService<G>>,
    Query(params): Query<CatalogParams>,
) -> Response
where
    G: TextGenerator + 'static,
{
    let query = params.into_query();
    Json(service.library().diagnoses.search(&query)).into_response()
}

pub(crate) async fn assess_handler<G>(
    State(service): State<SharedService<G>>,
    Json(request): Json<AssessmentRequest>,
) -> Response
where
    G: TextGenerator + 'static,
{
    match service.assess(&request).await {
        Ok(assessment) => Json(Value::Object(assessment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn patient_chat_handler<G>(
    State(service): State<SharedService<G>>,
    Json(request): Json<PatientChatRequest>,
) -> Response
where
    G: TextGenerator + 'static,
{
    match service.patient_reply(&request).await {
        Ok(reply) => Json(reply).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn explain_term_handler<G>(
    State(service): State<SharedService<G>>,
    Json(request): Json<TermRequest>,
) -> Response
where
    G: TextGenerator + 'static,
{
    match service.explain_term(&request).await {
        Ok(explanation) => Json(explanation).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn llm_status_handler<G>(State(service): State<SharedService<G>>) -> Response
where
    G: TextGenerator + 'static,
{
    match service.llm_status().await {
        Ok(status) => Json(status).into_response(),
        Err(AssessmentError::Upstream(error)) => {
            let generator = service.generator();
            let payload = json!({
                "success": false,
                "error": error.to_string(),
                "model": generator.model(),
                "baseUrl": generator.base_url(),
                "hint": format!(
                    "Make sure Ollama is running on {} (ollama serve)",
                    generator.base_url()
                ),
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

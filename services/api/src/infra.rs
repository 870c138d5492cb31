use casesim::config::AppConfig;
use casesim::error::AppError;
use casesim::llm::OllamaClient;
use casesim::scenario::CaseLibrary;
use casesim::workflows::assessment::AssessmentService;
use casesim::workflows::scoring::ScoringRequest;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SimulatorService = AssessmentService<OllamaClient>;

pub(crate) fn load_library(config: &AppConfig) -> Result<Arc<CaseLibrary>, AppError> {
    let library = CaseLibrary::load(&config.data)?;
    tracing::info!(
        scenarios = library.scenarios.len(),
        tests = library.tests.len(),
        diagnoses = library.diagnoses.len(),
        "case library loaded"
    );
    Ok(Arc::new(library))
}

pub(crate) fn build_service(config: &AppConfig) -> Result<SimulatorService, AppError> {
    let library = load_library(config)?;
    let generator = Arc::new(OllamaClient::new(&config.llm));
    Ok(AssessmentService::new(library, generator, config.scoring.clone()))
}

/// Recorded submission as saved by the front end; `scenarioId` is optional when given on the
/// command line instead.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Submission {
    #[serde(default)]
    pub(crate) scenario_id: Option<String>,
    #[serde(flatten)]
    pub(crate) scoring: ScoringRequest,
}

pub(crate) fn parse_submission(raw: &str) -> Result<Submission, AppError> {
    serde_json::from_str(raw)
        .map_err(|err| AppError::Usage(format!("submission is not valid JSON ({err})")))
}

pub(crate) fn read_submission(path: &Path) -> Result<Submission, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_submission(&raw)
}

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::domain::AssessmentRequest;
use super::prompt::{build_transcript, TranscriptContext, INSTRUCTOR_PROMPT};
use crate::llm::{parse_first_object, ChatMessage, ExtractionError, LlmError, TextGenerator};
use crate::scenario::{CaseLibrary, Scenario};
use crate::workflows::resolution::{ResolutionError, ResolvedDx, ResolvedTest};
use crate::workflows::scoring::{ScoreReport, ScoringConfig, ScoringEngine, ScoringRequest};
use crate::workflows::tutor::{
    glossary, patient, status, LlmStatus, PatientChatRequest, PatientReply, TermExplanation,
    TermRequest,
};

/// Facade over the reference data, the scorer and the text-generation client.
pub struct AssessmentService<G> {
    library: Arc<CaseLibrary>,
    engine: Arc<ScoringEngine>,
    generator: Arc<G>,
}

impl<G> Clone for AssessmentService<G> {
    fn clone(&self) -> Self {
        Self {
            library: Arc::clone(&self.library),
            engine: Arc::clone(&self.engine),
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<G> AssessmentService<G>
where
    G: TextGenerator + 'static,
{
    pub fn new(library: Arc<CaseLibrary>, generator: Arc<G>, config: ScoringConfig) -> Self {
        Self {
            library,
            engine: Arc::new(ScoringEngine::new(config)),
            generator,
        }
    }

    pub fn library(&self) -> &CaseLibrary {
        &self.library
    }

    pub fn scenario(&self, scenario_id: &str) -> Result<&Scenario, AssessmentError> {
        self.library
            .scenarios
            .get(scenario_id)
            .ok_or_else(|| AssessmentError::ScenarioNotFound(scenario_id.to_string()))
    }

    pub fn resolve_test(
        &self,
        scenario_id: &str,
        test_id: &str,
    ) -> Result<ResolvedTest<'_>, AssessmentError> {
        let scenario = self.scenario(scenario_id)?;
        Ok(self.library.resolver().resolve_test(scenario, test_id)?)
    }

    pub fn resolve_dx(
        &self,
        scenario_id: &str,
        dx_id: &str,
    ) -> Result<ResolvedDx<'_>, AssessmentError> {
        let scenario = self.scenario(scenario_id)?;
        Ok(self.library.resolver().resolve_dx(scenario, dx_id)?)
    }

    /// Offline score with no text-generation call.
    pub fn score(
        &self,
        scenario_id: &str,
        request: &ScoringRequest,
    ) -> Result<ScoreReport, AssessmentError> {
        let scenario = self.scenario(scenario_id)?;
        Ok(self
            .engine
            .score(&self.library.resolver(), scenario, request))
    }

    /// Instructor feedback from the model with the deterministic score fields written over it.
    pub async fn assess(
        &self,
        request: &AssessmentRequest,
    ) -> Result<Map<String, Value>, AssessmentError> {
        let scenario = self.scenario(&request.scenario_id)?;
        let report = self
            .engine
            .score(&self.library.resolver(), scenario, &request.scoring);

        let transcript = build_transcript(
            &TranscriptContext {
                scenario,
                diagnoses: &self.library.diagnoses,
                resolver: self.library.resolver(),
                missing_must_not_miss: &report.missing_must_not_miss,
                max_recommended_differential: self.engine.config().max_recommended_differential,
            },
            request,
        );
        let messages = vec![
            ChatMessage::system(INSTRUCTOR_PROMPT),
            ChatMessage::user(transcript),
        ];

        let reply = self.generator.chat(messages).await?;
        let mut assessment = parse_first_object(&reply)?;
        merge_scores(&mut assessment, &report);

        tracing::info!(
            scenario = %scenario.id,
            total = report.total_score,
            percentage = report.total_score_percentage,
            "assessment generated"
        );
        Ok(assessment)
    }

    pub async fn patient_reply(
        &self,
        request: &PatientChatRequest,
    ) -> Result<PatientReply, AssessmentError> {
        let scenario = self.scenario(&request.scenario_id)?;
        Ok(patient::reply(self.generator.as_ref(), scenario, &request.messages).await?)
    }

    pub async fn explain_term(
        &self,
        request: &TermRequest,
    ) -> Result<TermExplanation, AssessmentError> {
        if request.selected_text.trim().is_empty() {
            return Err(AssessmentError::InvalidRequest(
                "Missing or invalid selectedText".to_string(),
            ));
        }
        Ok(glossary::explain(self.generator.as_ref(), request).await?)
    }

    pub async fn llm_status(&self) -> Result<LlmStatus, AssessmentError> {
        Ok(status::check(self.generator.as_ref()).await?)
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}

/// Overwrite model-supplied score fields with the computed report.
pub fn merge_scores(assessment: &mut Map<String, Value>, report: &ScoreReport) {
    assessment.insert("totalScore".to_string(), Value::from(report.total_score));
    assessment.insert(
        "totalScorePercentage".to_string(),
        Value::from(report.total_score_percentage),
    );
    assessment.insert("maxScore".to_string(), Value::from(report.max_score));
    assessment.insert(
        "scoreBreakdown".to_string(),
        serde_json::to_value(&report.score_breakdown).unwrap_or(Value::Null),
    );
    assessment.insert(
        "missingMustNotMiss".to_string(),
        Value::from(report.missing_must_not_miss.clone()),
    );
    assessment.insert(
        "assessedAt".to_string(),
        Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Upstream(#[from] LlmError),
    #[error("The assessment service returned a response that could not be parsed as JSON")]
    MalformedResponse(#[from] ExtractionError),
    #[error("{0}")]
    InvalidRequest(String),
}

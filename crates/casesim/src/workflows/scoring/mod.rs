//! Deterministic scoring of a student's diagnostic workflow against a scenario.

mod ceiling;
mod config;
mod rules;

pub use ceiling::max_score;
pub use config::ScoringConfig;
pub use rules::{
    calculate_dx_score, calculate_efficiency_penalty, calculate_final_dx_score,
    calculate_must_not_miss_penalty, calculate_test_score,
};

use serde::{Deserialize, Serialize};

use super::differential::Differential;
use super::resolution::{check_missing_must_not_miss, Resolver};
use crate::scenario::Scenario;

/// Student selections that feed the score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    #[serde(default)]
    pub ordered_tests: Vec<String>,
    #[serde(default)]
    pub differential_detailed: Differential,
    #[serde(default)]
    pub final_dx_id: Option<String>,
    /// Client-side view of missed diagnoses; recomputed before use.
    #[serde(default)]
    pub missing_must_not_miss: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreFactor {
    TestYield,
    DiagnosisYield,
    FinalDiagnosis,
    Efficiency,
    MustNotMiss,
}

/// One line of the audit trail behind a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub points: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub total_score: f64,
    pub max_score: f64,
    pub total_score_percentage: u8,
    pub score_breakdown: ScoreBreakdown,
    pub components: Vec<ScoreComponent>,
    /// Submitted ids that did not resolve against the catalogs.
    pub skipped: Vec<String>,
    pub missing_must_not_miss: Vec<String>,
}

/// Integer percentage of `total` over `max`, clamped to `0..=100`.
pub fn score_percentage(total: f64, max: f64) -> u8 {
    if max.is_nan() || max <= 0.0 || !total.is_finite() {
        return 0;
    }
    (total / max * 100.0).clamp(0.0, 100.0).round() as u8
}

/// Stateless scorer parameterised by [`ScoringConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(
        &self,
        resolver: &Resolver<'_>,
        scenario: &Scenario,
        request: &ScoringRequest,
    ) -> ScoreReport {
        let mut components = Vec::new();
        let mut skipped = Vec::new();
        let mut breakdown = ScoreBreakdown::default();

        if !request.ordered_tests.is_empty() {
            let mut tests_total = 0.0;
            for test_id in &request.ordered_tests {
                match resolver.resolve_test(scenario, test_id) {
                    Ok(resolved) => {
                        let points = calculate_test_score(resolved.test_yield);
                        tests_total += points;
                        components.push(ScoreComponent {
                            factor: ScoreFactor::TestYield,
                            subject: Some(test_id.clone()),
                            points,
                            notes: format!(
                                "{} ordered ({} yield)",
                                resolved.test.name,
                                resolved.test_yield.label()
                            ),
                        });
                    }
                    Err(err) => {
                        tracing::warn!(
                            scenario = %scenario.id,
                            error = %err,
                            "skipping unresolved test"
                        );
                        skipped.push(test_id.clone());
                    }
                }
            }
            breakdown.tests = Some(tests_total);
        }

        let differential = &request.differential_detailed;
        let dx_ids = differential.dx_ids();
        let missing = check_missing_must_not_miss(
            dx_ids.as_slice(),
            Some(scenario.required_must_not_miss.as_slice()),
        );

        if !differential.is_empty() {
            let mut diagnosis_total = 0.0;
            for entry in differential.entries() {
                match resolver.resolve_dx(scenario, &entry.dx_id) {
                    Ok(resolved) => {
                        let points = calculate_dx_score(resolved.dx_yield);
                        diagnosis_total += points;
                        components.push(ScoreComponent {
                            factor: ScoreFactor::DiagnosisYield,
                            subject: Some(entry.dx_id.clone()),
                            points,
                            notes: format!(
                                "{} ranked #{} ({})",
                                resolved.dx.name,
                                entry.rank,
                                resolved.dx_yield.label()
                            ),
                        });
                    }
                    Err(err) => {
                        tracing::warn!(
                            scenario = %scenario.id,
                            error = %err,
                            "skipping unresolved diagnosis"
                        );
                        skipped.push(entry.dx_id.clone());
                    }
                }
            }

            let final_points = calculate_final_dx_score(
                request.final_dx_id.as_deref(),
                scenario.final_dx_id.as_deref(),
            );
            let chosen = request
                .final_dx_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty());
            if let Some(final_dx) = chosen {
                components.push(ScoreComponent {
                    factor: ScoreFactor::FinalDiagnosis,
                    subject: Some(final_dx.to_string()),
                    points: final_points,
                    notes: match final_points {
                        p if p > 0.0 => "final diagnosis matches the case".to_string(),
                        p if p < 0.0 => "final diagnosis does not match the case".to_string(),
                        _ => "case has no authored final diagnosis".to_string(),
                    },
                });
            }

            let efficiency = calculate_efficiency_penalty(
                differential.len(),
                self.config.max_recommended_differential,
            );
            if efficiency < 0.0 {
                components.push(ScoreComponent {
                    factor: ScoreFactor::Efficiency,
                    subject: None,
                    points: efficiency,
                    notes: format!(
                        "{} diagnoses listed, {} recommended",
                        differential.len(),
                        self.config.max_recommended_differential
                    ),
                });
            }

            let must_not_miss = calculate_must_not_miss_penalty(missing.len());
            for dx_id in &missing {
                components.push(ScoreComponent {
                    factor: ScoreFactor::MustNotMiss,
                    subject: Some(dx_id.clone()),
                    points: rules::MUST_NOT_MISS_POINTS,
                    notes: "must-not-miss diagnosis absent from differential".to_string(),
                });
            }

            breakdown.diagnosis =
                Some(diagnosis_total + final_points + efficiency + must_not_miss);
        }

        let total_score = breakdown.tests.unwrap_or(0.0) + breakdown.diagnosis.unwrap_or(0.0);
        let max_score = max_score(scenario, &self.config);

        ScoreReport {
            total_score,
            max_score,
            total_score_percentage: score_percentage(total_score, max_score),
            score_breakdown: breakdown,
            components,
            skipped,
            missing_must_not_miss: missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::CaseLibrary;
    use crate::workflows::differential::{Confidence, DifferentialEntry};

    fn request(tests: &[&str], dxs: &[&str], final_dx: Option<&str>) -> ScoringRequest {
        ScoringRequest {
            ordered_tests: tests.iter().map(|id| id.to_string()).collect(),
            differential_detailed: Differential::from_entries(
                dxs.iter()
                    .enumerate()
                    .map(|(i, id)| DifferentialEntry::new(*id, i as u32 + 1, Confidence::Medium))
                    .collect(),
            ),
            final_dx_id: final_dx.map(str::to_string),
            missing_must_not_miss: Vec::new(),
        }
    }

    #[test]
    fn percentage_is_clamped_integer() {
        assert_eq!(score_percentage(-40.0, 12.0), 0);
        assert_eq!(score_percentage(400.0, 12.0), 100);
        assert_eq!(score_percentage(5.0, 12.0), 42);
        assert_eq!(score_percentage(1.0, 0.0), 0);
    }

    #[test]
    fn breakdown_omits_untouched_sections() {
        let library = CaseLibrary::builtin().expect("bundled data");
        let scenario = library.scenarios.get("chest-pain-er").expect("scenario");
        let engine = ScoringEngine::default();

        let report = engine.score(
            &library.resolver(),
            scenario,
            &request(&[], &[], Some("stemi")),
        );
        assert_eq!(report.score_breakdown, ScoreBreakdown::default());
        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.max_score, 12.0);
        assert_eq!(report.missing_must_not_miss.len(), 3);
    }

    #[test]
    fn unresolvable_ids_are_skipped() {
        let library = CaseLibrary::builtin().expect("bundled data");
        let scenario = library.scenarios.get("chest-pain-er").expect("scenario");
        let engine = ScoringEngine::default();

        let report = engine.score(
            &library.resolver(),
            scenario,
            &request(
                &["ecg", "mystery_panel"],
                &["stemi", "pe", "aortic_dissection", "made_up"],
                Some("stemi"),
            ),
        );

        assert_eq!(report.skipped, vec!["mystery_panel", "made_up"]);
        assert_eq!(report.score_breakdown.tests, Some(2.0));
        // stemi +3, pe -3, dissection -3, final +5
        assert_eq!(report.score_breakdown.diagnosis, Some(2.0));
        assert!(report.missing_must_not_miss.is_empty());
        assert_eq!(report.total_score_percentage, 33);
    }

    #[test]
    fn blank_final_diagnosis_is_not_scored() {
        let library = CaseLibrary::builtin().expect("bundled data");
        let scenario = library.scenarios.get("chest-pain-er").expect("scenario");
        let engine = ScoringEngine::default();

        let report = engine.score(
            &library.resolver(),
            scenario,
            &request(&[], &["stemi"], Some("")),
        );

        // stemi +3, two must-not-miss entries missing at -3 each
        assert_eq!(report.score_breakdown.diagnosis, Some(-3.0));
        assert!(report
            .components
            .iter()
            .all(|component| component.factor != ScoreFactor::FinalDiagnosis));
    }

    #[test]
    fn low_yield_padding_never_helps() {
        let library = CaseLibrary::builtin().expect("bundled data");
        let scenario = library.scenarios.get("chest-pain-er").expect("scenario");
        let engine = ScoringEngine::new(ScoringConfig {
            max_recommended_differential: 4,
            ..ScoringConfig::default()
        });
        let resolver = library.resolver();

        let mut differential = vec!["stemi", "pe", "aortic_dissection"];
        let mut previous = engine
            .score(&resolver, scenario, &request(&[], &differential, None))
            .score_breakdown
            .diagnosis;
        for low in ["gerd", "panic", "costochondritis"] {
            differential.push(low);
            let current = engine
                .score(&resolver, scenario, &request(&[], &differential, None))
                .score_breakdown
                .diagnosis;
            assert!(current <= previous, "adding {low} raised the score");
            previous = current;
        }
        // two entries past the threshold of four
        assert_eq!(previous, Some(-4.0));
    }
}

//! End-to-end scoring through the public library surface, using a small authored case
//! alongside the bundled catalogs.

mod common {
    use casesim::catalog::{DiagnosisCatalog, TestCatalog};
    use casesim::scenario::{
        CaseLibrary, DxOverride, DxYield, Scenario, ScenarioDocument, ScenarioLibrary,
        TestOverride, TestYield,
    };

    pub(super) fn document(id: &str) -> ScenarioDocument {
        ScenarioDocument {
            id: id.to_string(),
            title: "Synthetic chest pain".to_string(),
            specialty: "Emergency Medicine".to_string(),
            estimated_minutes: 5,
            description: "Minimal authored case.".to_string(),
            ..ScenarioDocument::default()
        }
    }

    pub(super) fn ecg_stemi_document() -> ScenarioDocument {
        ScenarioDocument {
            test_overrides: vec![TestOverride {
                test_id: "ecg".to_string(),
                result: "ST elevation in the inferior leads.".to_string(),
                test_yield: TestYield::High,
            }],
            dx_overrides: vec![DxOverride {
                dx_id: "stemi".to_string(),
                dx_yield: DxYield::Correct,
                explanation: "Classic presentation.".to_string(),
            }],
            final_dx_id: Some("stemi".to_string()),
            ..document("ecg-stemi")
        }
    }

    pub(super) fn library(documents: Vec<ScenarioDocument>) -> CaseLibrary {
        let scenarios = documents
            .into_iter()
            .map(|document| Scenario::try_from(document).expect("valid scenario"))
            .collect();
        CaseLibrary::new(
            TestCatalog::builtin().expect("tests catalog"),
            DiagnosisCatalog::builtin().expect("diagnoses catalog"),
            ScenarioLibrary::new(scenarios).expect("unique ids"),
        )
        .expect("references resolve")
    }
}

use casesim::scenario::LibraryError;
use casesim::workflows::differential::{Confidence, Differential, DifferentialEntry};
use casesim::workflows::scoring::{ScoreFactor, ScoringConfig, ScoringEngine, ScoringRequest};
use common::*;

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
fn perfect_ecg_stemi_workup_scores_full_marks() {
    let library = library(vec![ecg_stemi_document()]);
    let scenario = library.scenarios.get("ecg-stemi").expect("scenario");
    let engine = ScoringEngine::new(ScoringConfig::default());

    let report = engine.score(
        &library.resolver(),
        scenario,
        &request(&["ecg"], &["stemi"], Some("stemi")),
    );

    assert_eq!(report.score_breakdown.tests, Some(2.0));
    assert_eq!(report.score_breakdown.diagnosis, Some(8.0));
    assert_eq!(report.total_score, 10.0);
    assert_eq!(report.max_score, 10.0);
    assert_eq!(report.total_score_percentage, 100);
}

#[test]
fn case_without_overrides_uses_fallback_ceiling() {
    let library = library(vec![document("bare")]);
    let scenario = library.scenarios.get("bare").expect("scenario");
    let engine = ScoringEngine::default();

    let report = engine.score(&library.resolver(), scenario, &ScoringRequest::default());

    assert_eq!(report.max_score, 45.0);
    assert_eq!(report.total_score, 0.0);
    assert_eq!(report.score_breakdown.tests, None);
    assert_eq!(report.score_breakdown.diagnosis, None);
}

#[test]
fn long_differential_pays_efficiency_penalty() {
    let library = library(vec![ecg_stemi_document()]);
    let scenario = library.scenarios.get("ecg-stemi").expect("scenario");
    let engine = ScoringEngine::default();
    let dxs = [
        "stemi",
        "pe",
        "aortic_dissection",
        "gerd",
        "panic",
        "costochondritis",
        "pneumonia",
        "pneumothorax",
        "pericarditis",
    ];

    let report = engine.score(&library.resolver(), scenario, &request(&[], &dxs, None));

    let efficiency: Vec<f64> = report
        .components
        .iter()
        .filter(|component| component.factor == ScoreFactor::Efficiency)
        .map(|component| component.points)
        .collect();
    assert_eq!(efficiency, vec![-1.5]);
}

#[test]
fn two_missing_must_not_miss_cost_six_points() {
    let mut document = ecg_stemi_document();
    document.required_must_not_miss = vec![
        "stemi".to_string(),
        "pe".to_string(),
        "aortic_dissection".to_string(),
    ];
    let library = library(vec![document]);
    let scenario = library.scenarios.get("ecg-stemi").expect("scenario");
    let engine = ScoringEngine::default();

    let report = engine.score(
        &library.resolver(),
        scenario,
        &request(&[], &["stemi"], None),
    );

    assert_eq!(
        report.missing_must_not_miss,
        vec!["pe", "aortic_dissection"]
    );
    let penalty: f64 = report
        .components
        .iter()
        .filter(|component| component.factor == ScoreFactor::MustNotMiss)
        .map(|component| component.points)
        .sum();
    assert_eq!(penalty, -6.0);
    assert_eq!(report.score_breakdown.diagnosis, Some(3.0 - 6.0));
}

#[test]
fn scenarios_referencing_unknown_ids_are_rejected() {
    let mut document = ecg_stemi_document();
    document.final_dx_id = Some("dragon_pox".to_string());
    let scenario = casesim::scenario::Scenario::try_from(document).expect("shape is valid");

    let result = casesim::scenario::CaseLibrary::new(
        casesim::catalog::TestCatalog::builtin().expect("tests catalog"),
        casesim::catalog::DiagnosisCatalog::builtin().expect("diagnoses catalog"),
        casesim::scenario::ScenarioLibrary::new(vec![scenario]).expect("unique ids"),
    );

    match result {
        Err(LibraryError::UnknownReference { id, .. }) => assert_eq!(id, "dragon_pox"),
        other => panic!("expected unknown reference, got {other:?}"),
    }
}

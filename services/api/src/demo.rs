use crate::infra::{load_library, read_submission};
use casesim::config::AppConfig;
use casesim::error::AppError;
use casesim::scenario::{CaseLibrary, DxYield, Scenario};
use casesim::workflows::differential::{Confidence, Differential};
use casesim::workflows::scoring::{ScoreReport, ScoringEngine, ScoringRequest};
use clap::Args;
use std::path::PathBuf;

const DEFAULT_DEMO_SCENARIO: &str = "chest-pain-er";

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Scenario id; falls back to `scenarioId` inside the submission
    #[arg(long)]
    pub(crate) scenario: Option<String>,
    /// JSON file holding orderedTests, differentialDetailed and finalDxId
    #[arg(long)]
    pub(crate) submission: PathBuf,
    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scenario to walk through
    #[arg(long)]
    pub(crate) scenario: Option<String>,
}

pub(crate) fn run_list_scenarios() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let library = load_library(&config)?;

    for summary in library.scenarios.summaries() {
        println!(
            "{:<22} {:<40} {:?}, ~{} min",
            summary.id, summary.title, summary.difficulty, summary.estimated_minutes
        );
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        scenario,
        submission,
        json,
    } = args;

    let config = AppConfig::load()?;
    let library = load_library(&config)?;
    let submission = read_submission(&submission)?;

    let scenario_id = scenario.or(submission.scenario_id).ok_or_else(|| {
        AppError::Usage("no scenario given: pass --scenario or set scenarioId".to_string())
    })?;
    let scenario = find_scenario(&library, &scenario_id)?;

    let engine = ScoringEngine::new(config.scoring.clone());
    let report = engine.score(&library.resolver(), scenario, &submission.scoring);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => println!("Score report unavailable: {err}"),
        }
    } else {
        render_report(scenario, &report);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let library = load_library(&config)?;
    let scenario_id = args
        .scenario
        .unwrap_or_else(|| DEFAULT_DEMO_SCENARIO.to_string());
    let scenario = find_scenario(&library, &scenario_id)?;

    println!("Clinical case simulator demo");
    println!("Case: {} ({})", scenario.title, scenario.specialty);
    println!("Patient: {}", scenario.patient_persona.chief_complaint);
    println!("Vitals: {}", scenario.patient_persona.vitals.summary());

    let request = scripted_request(scenario);
    let resolver = library.resolver();

    println!("\nTests ordered");
    for test_id in &request.ordered_tests {
        match resolver.resolve_test(scenario, test_id) {
            Ok(resolved) => println!(
                "- {} [{}]: {}",
                resolved.test.name,
                resolved.test_yield.label(),
                resolved.result
            ),
            Err(err) => println!("- {test_id}: {err}"),
        }
    }

    println!("\nDifferential");
    for entry in request.differential_detailed.entries() {
        match resolver.resolve_dx(scenario, &entry.dx_id) {
            Ok(resolved) => println!(
                "#{} {} [{}, {} confidence]: {}",
                entry.rank,
                resolved.dx.name,
                resolved.dx_yield.label(),
                entry.confidence.label(),
                resolved.explanation
            ),
            Err(err) => println!("#{} {}: {err}", entry.rank, entry.dx_id),
        }
    }

    let engine = ScoringEngine::new(config.scoring.clone());
    let report = engine.score(&resolver, scenario, &request);
    println!();
    render_report(scenario, &report);
    Ok(())
}

fn find_scenario<'l>(
    library: &'l CaseLibrary,
    scenario_id: &str,
) -> Result<&'l Scenario, AppError> {
    library
        .scenarios
        .get(scenario_id)
        .ok_or_else(|| AppError::Usage(format!("unknown scenario: {scenario_id}")))
}

/// A reasonable student: orders every authored test, lists the authored diagnoses worth
/// considering, and commits to the case's final diagnosis.
fn scripted_request(scenario: &Scenario) -> ScoringRequest {
    let ordered_tests = scenario
        .test_overrides()
        .iter()
        .map(|entry| entry.test_id.clone())
        .collect();

    let mut differential = Differential::default();
    for entry in scenario.dx_overrides() {
        if matches!(entry.dx_yield, DxYield::Correct | DxYield::Reasonable) {
            differential.add(&entry.dx_id);
        }
    }
    for dx_id in &scenario.required_must_not_miss {
        differential.add(dx_id);
    }
    if let Some(final_dx) = scenario.final_dx_id.as_deref() {
        differential.set_confidence(final_dx, Confidence::High);
    }

    ScoringRequest {
        ordered_tests,
        differential_detailed: differential,
        final_dx_id: scenario.final_dx_id.clone(),
        missing_must_not_miss: Vec::new(),
    }
}

fn render_report(scenario: &Scenario, report: &ScoreReport) {
    println!("Score for {}", scenario.title);
    println!(
        "Total: {:.1} / {:.1} ({}%)",
        report.total_score, report.max_score, report.total_score_percentage
    );
    if let Some(tests) = report.score_breakdown.tests {
        println!("  Tests: {tests:.1}");
    }
    if let Some(diagnosis) = report.score_breakdown.diagnosis {
        println!("  Diagnosis: {diagnosis:.1}");
    }

    println!("Components");
    for component in &report.components {
        println!("  {:+.1} {}", component.points, component.notes);
    }

    if !report.missing_must_not_miss.is_empty() {
        println!(
            "Missing must-not-miss: {}",
            report.missing_must_not_miss.join(", ")
        );
    }
    if !report.skipped.is_empty() {
        println!("Skipped unknown ids: {}", report.skipped.join(", "));
    }
}

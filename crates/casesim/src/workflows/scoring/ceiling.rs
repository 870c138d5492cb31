use super::config::ScoringConfig;
use crate::scenario::{DxYield, Scenario, TestYield};

const HIGH_YIELD_TEST_POINTS: f64 = 2.0;
const CORRECT_DX_POINTS: f64 = 3.0;
const FINAL_DX_POINTS: f64 = 5.0;

/// Best achievable total for a scenario, independent of what the student submitted.
pub fn max_score(scenario: &Scenario, config: &ScoringConfig) -> f64 {
    let high_yield_tests = scenario
        .test_overrides()
        .iter()
        .filter(|entry| entry.test_yield == TestYield::High)
        .count();
    let mut ceiling = HIGH_YIELD_TEST_POINTS * high_yield_tests as f64;

    if !scenario.dx_overrides().is_empty() {
        let correct = scenario
            .dx_overrides()
            .iter()
            .filter(|entry| entry.dx_yield == DxYield::Correct)
            .count()
            .min(config.optimal_differential_cap);
        ceiling += CORRECT_DX_POINTS * correct as f64 + FINAL_DX_POINTS;
    }

    if ceiling > 0.0 {
        ceiling
    } else {
        config.fallback_max_score
    }
}

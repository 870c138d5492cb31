use crate::scenario::{DxYield, TestYield};

pub const MUST_NOT_MISS_POINTS: f64 = -3.0;
const FINAL_DX_CORRECT: f64 = 5.0;
const FINAL_DX_INCORRECT: f64 = -2.0;
const EXTRA_ENTRY_POINTS: f64 = -0.5;

pub fn calculate_test_score(test_yield: TestYield) -> f64 {
    match test_yield {
        TestYield::High => 2.0,
        TestYield::Helpful => 1.0,
        TestYield::Low => 0.0,
        TestYield::Inappropriate => -2.0,
    }
}

pub fn calculate_dx_score(dx_yield: DxYield) -> f64 {
    match dx_yield {
        DxYield::Correct => 3.0,
        DxYield::Reasonable => 2.0,
        DxYield::Low => 0.0,
        DxYield::Irrelevant => -1.0,
        DxYield::DangerousMiss => -3.0,
    }
}

/// Zero unless both the student's and the authored final diagnosis are known.
/// Blank ids count as absent.
pub fn calculate_final_dx_score(final_dx_id: Option<&str>, correct_dx_id: Option<&str>) -> f64 {
    fn present(id: Option<&str>) -> Option<&str> {
        id.map(str::trim).filter(|id| !id.is_empty())
    }
    match (present(final_dx_id), present(correct_dx_id)) {
        (Some(chosen), Some(correct)) if chosen == correct => FINAL_DX_CORRECT,
        (Some(_), Some(_)) => FINAL_DX_INCORRECT,
        _ => 0.0,
    }
}

pub fn calculate_efficiency_penalty(differential_len: usize, max_recommended: usize) -> f64 {
    if differential_len <= max_recommended {
        0.0
    } else {
        EXTRA_ENTRY_POINTS * (differential_len - max_recommended) as f64
    }
}

pub fn calculate_must_not_miss_penalty(missing: usize) -> f64 {
    MUST_NOT_MISS_POINTS * missing as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yield_weights() {
        assert_eq!(calculate_test_score(TestYield::High), 2.0);
        assert_eq!(calculate_test_score(TestYield::Inappropriate), -2.0);
        assert_eq!(calculate_dx_score(DxYield::Reasonable), 2.0);
        assert_eq!(calculate_dx_score(DxYield::Irrelevant), -1.0);
        assert_eq!(calculate_dx_score(DxYield::DangerousMiss), -3.0);
    }

    #[test]
    fn final_dx_requires_both_sides() {
        assert_eq!(calculate_final_dx_score(Some("stemi"), Some("stemi")), 5.0);
        assert_eq!(calculate_final_dx_score(Some("gerd"), Some("stemi")), -2.0);
        assert_eq!(calculate_final_dx_score(None, Some("stemi")), 0.0);
        assert_eq!(calculate_final_dx_score(Some("stemi"), None), 0.0);
    }

    #[test]
    fn blank_final_dx_counts_as_absent() {
        assert_eq!(calculate_final_dx_score(Some(""), Some("stemi")), 0.0);
        assert_eq!(calculate_final_dx_score(Some("  "), Some("stemi")), 0.0);
        assert_eq!(calculate_final_dx_score(Some("stemi"), Some("")), 0.0);
        assert_eq!(
            calculate_final_dx_score(Some(" stemi "), Some("stemi")),
            5.0
        );
    }

    #[test]
    fn efficiency_penalty_beyond_threshold() {
        assert_eq!(calculate_efficiency_penalty(6, 6), 0.0);
        assert_eq!(calculate_efficiency_penalty(9, 6), -1.5);
        assert_eq!(calculate_efficiency_penalty(2, 0), -1.0);
    }

    #[test]
    fn must_not_miss_penalty_per_missing() {
        assert_eq!(calculate_must_not_miss_penalty(2), -6.0);
        assert_eq!(calculate_must_not_miss_penalty(0), 0.0);
    }
}

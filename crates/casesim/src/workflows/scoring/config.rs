use serde::{Deserialize, Serialize};

/// Tunables for the diagnostic workflow score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Differential length above which each extra entry costs half a point.
    pub max_recommended_differential: usize,
    /// Most correct diagnoses counted toward the achievable maximum.
    pub optimal_differential_cap: usize,
    /// Maximum used when a scenario authors nothing that can earn points.
    pub fallback_max_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_recommended_differential: 6,
            optimal_differential_cap: 6,
            fallback_max_score: 45.0,
        }
    }
}

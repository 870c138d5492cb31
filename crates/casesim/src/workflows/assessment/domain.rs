use serde::{Deserialize, Serialize};

use crate::workflows::differential::Confidence;
use crate::workflows::scoring::ScoringRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilityStatus {
    Stable,
    Unstable,
    Unknown,
}

impl StabilityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StabilityStatus::Stable => "Stable",
            StabilityStatus::Unstable => "Unstable",
            StabilityStatus::Unknown => "Unknown",
        }
    }
}

/// Who said a line of the interview transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Doctor,
    Patient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Speaker,
    pub content: String,
}

/// History of present illness, OPQRST style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hpi {
    pub onset: Option<String>,
    pub provocation: Option<String>,
    pub quality: Option<String>,
    pub radiation: Option<String>,
    pub severity: Option<u8>,
    pub timing: Option<String>,
    pub associated_symptoms: Vec<String>,
    pub pertinent_positives: Vec<String>,
    pub pertinent_negatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergy {
    pub allergen: String,
    pub reaction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialHistory {
    pub smoking: Option<String>,
    pub alcohol: Option<String>,
    pub drugs: Option<String>,
    pub occupation: Option<String>,
    pub travel: Option<String>,
    pub sexual_history: Option<String>,
}

impl SocialHistory {
    /// Recorded items as `Label: value` pairs, in a fixed order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Smoking", &self.smoking),
            ("Alcohol", &self.alcohol),
            ("Drugs", &self.drugs),
            ("Occupation", &self.occupation),
            ("Travel", &self.travel),
            ("Sexual history", &self.sexual_history),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .map(|value| (label, value))
        })
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalBackground {
    pub past_medical_history: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<Allergy>,
    pub family_history: Vec<String>,
    pub social_history: Option<SocialHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRepresentation {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMove {
    Up,
    Down,
}

/// A diagnosis the student moved after reviewing results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningUpdate {
    pub id: String,
    pub moved: RankMove,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    Discharge,
    Observe,
    Admit,
    #[serde(rename = "ICU")]
    Icu,
}

impl Disposition {
    pub const fn label(self) -> &'static str {
        match self {
            Disposition::Discharge => "Discharge",
            Disposition::Observe => "Observe",
            Disposition::Admit => "Admit",
            Disposition::Icu => "ICU",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub disposition: Disposition,
    #[serde(default)]
    pub plan_details: String,
    #[serde(default)]
    pub consultations: Vec<String>,
    #[serde(default)]
    pub monitoring: Vec<String>,
}

/// Everything the student recorded across the workflow, submitted for debrief.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub scenario_id: String,
    #[serde(flatten)]
    pub scoring: ScoringRequest,
    #[serde(default)]
    pub stability: Option<StabilityStatus>,
    #[serde(default)]
    pub red_flags_found: Vec<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub chat: Vec<ChatTurn>,
    #[serde(default)]
    pub hpi: Option<Hpi>,
    #[serde(default)]
    pub background: Option<MedicalBackground>,
    #[serde(default)]
    pub problem_rep: Option<ProblemRepresentation>,
    #[serde(default)]
    pub viewed_exam_sections: Vec<String>,
    #[serde(default)]
    pub reasoning_updates: Vec<ReasoningUpdate>,
    #[serde(default)]
    pub final_confidence: Option<Confidence>,
    #[serde(default)]
    pub final_next_steps: Option<String>,
    #[serde(default)]
    pub patient_explanation: Option<String>,
    #[serde(default)]
    pub plan: Option<Plan>,
}

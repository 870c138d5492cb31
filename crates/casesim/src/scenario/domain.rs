use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub heart_rate: u32,
    pub blood_pressure: String,
    pub respiratory_rate: u32,
    pub oxygen_sat: String,
    pub temperature: String,
}

impl VitalSigns {
    /// One-line vitals summary shared by the patient and instructor prompts.
    pub fn summary(&self) -> String {
        format!(
            "HR {} bpm, BP {}, RR {}/min, O2 Sat {}, Temp {}",
            self.heart_rate,
            self.blood_pressure,
            self.respiratory_rate,
            self.oxygen_sat,
            self.temperature
        )
    }
}

/// Scripted patient the student interviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPersona {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub chief_complaint: String,
    pub background: String,
    pub vitals: VitalSigns,
    #[serde(default)]
    pub key_history_points: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
}

/// Role-play constraints handed to the text-generation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInstructions {
    pub patient_style: String,
    #[serde(default)]
    pub behavior_rules: Vec<String>,
    #[serde(default)]
    pub do_not_reveal_directly: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalExamSection {
    pub id: String,
    pub label: String,
    pub summary: String,
    pub details: String,
}

/// Authored usefulness of ordering a test in one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestYield {
    High,
    Helpful,
    Low,
    Inappropriate,
}

impl TestYield {
    pub const fn label(self) -> &'static str {
        match self {
            TestYield::High => "high",
            TestYield::Helpful => "helpful",
            TestYield::Low => "low",
            TestYield::Inappropriate => "inappropriate",
        }
    }
}

/// Authored fit of a diagnosis to one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DxYield {
    Correct,
    Reasonable,
    Low,
    DangerousMiss,
    Irrelevant,
}

impl DxYield {
    pub const fn label(self) -> &'static str {
        match self {
            DxYield::Correct => "correct",
            DxYield::Reasonable => "reasonable",
            DxYield::Low => "low",
            DxYield::DangerousMiss => "dangerous-miss",
            DxYield::Irrelevant => "irrelevant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOverride {
    pub test_id: String,
    pub result: String,
    #[serde(rename = "yield")]
    pub test_yield: TestYield,
}

/// Narrative results used when a scenario has no override for an ordered test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefaults {
    pub lab_default: String,
    pub imaging_default: String,
    pub bedside_default: String,
    pub procedure_default: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DxOverride {
    pub dx_id: String,
    #[serde(rename = "yield")]
    pub dx_yield: DxYield,
    pub explanation: String,
}

//! Authored clinical cases and the reference data bundle they are validated against.

pub mod domain;
mod library;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use domain::{
    AiInstructions, Difficulty, DxOverride, DxYield, PatientPersona, PhysicalExamSection,
    TestDefaults, TestOverride, TestYield, VitalSigns,
};
pub use library::{CaseLibrary, LibraryError, ScenarioLibrary};

/// Scenario exactly as authored on disk; overrides are plain lists here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDocument {
    pub id: String,
    pub title: String,
    pub specialty: String,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    pub description: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    pub patient_persona: PatientPersona,
    pub ai_instructions: AiInstructions,
    #[serde(default)]
    pub physical_exam: Vec<PhysicalExamSection>,
    #[serde(default)]
    pub test_overrides: Vec<TestOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_default_behavior: Option<TestDefaults>,
    #[serde(default)]
    pub dx_overrides: Vec<DxOverride>,
    #[serde(default)]
    pub required_must_not_miss: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_dx_id: Option<String>,
    #[serde(default)]
    pub teaching_points: Vec<String>,
}

/// Load-time validated scenario with overrides indexed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScenarioDocument", into = "ScenarioDocument")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub specialty: String,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    pub description: String,
    pub objectives: Vec<String>,
    pub patient_persona: PatientPersona,
    pub ai_instructions: AiInstructions,
    pub physical_exam: Vec<PhysicalExamSection>,
    pub test_defaults: Option<TestDefaults>,
    pub required_must_not_miss: Vec<String>,
    pub final_dx_id: Option<String>,
    pub teaching_points: Vec<String>,
    test_overrides: Vec<TestOverride>,
    test_override_index: HashMap<String, usize>,
    dx_overrides: Vec<DxOverride>,
    dx_override_index: HashMap<String, usize>,
}

impl Scenario {
    pub fn test_override(&self, test_id: &str) -> Option<&TestOverride> {
        self.test_override_index
            .get(test_id)
            .map(|position| &self.test_overrides[*position])
    }

    pub fn dx_override(&self, dx_id: &str) -> Option<&DxOverride> {
        self.dx_override_index
            .get(dx_id)
            .map(|position| &self.dx_overrides[*position])
    }

    pub fn test_overrides(&self) -> &[TestOverride] {
        &self.test_overrides
    }

    pub fn dx_overrides(&self) -> &[DxOverride] {
        &self.dx_overrides
    }

    /// Fields a student may see while working the case; ground truth stays server-side.
    pub fn public_view(&self) -> ScenarioView {
        ScenarioView {
            id: self.id.clone(),
            title: self.title.clone(),
            specialty: self.specialty.clone(),
            difficulty: self.difficulty,
            estimated_minutes: self.estimated_minutes,
            description: self.description.clone(),
            objectives: self.objectives.clone(),
            patient_name: self.patient_persona.name.clone(),
            patient_age: self.patient_persona.age,
            patient_gender: self.patient_persona.gender.clone(),
            chief_complaint: self.patient_persona.chief_complaint.clone(),
            vitals: self.patient_persona.vitals.clone(),
            physical_exam: self.physical_exam.clone(),
        }
    }

    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            specialty: self.specialty.clone(),
            difficulty: self.difficulty,
            estimated_minutes: self.estimated_minutes,
        }
    }
}

impl TryFrom<ScenarioDocument> for Scenario {
    type Error = ScenarioError;

    fn try_from(document: ScenarioDocument) -> Result<Self, Self::Error> {
        if document.id.trim().is_empty() {
            return Err(ScenarioError::EmptyId);
        }

        let mut test_override_index = HashMap::with_capacity(document.test_overrides.len());
        for (position, entry) in document.test_overrides.iter().enumerate() {
            if test_override_index
                .insert(entry.test_id.clone(), position)
                .is_some()
            {
                return Err(ScenarioError::DuplicateTestOverride {
                    scenario: document.id,
                    test_id: entry.test_id.clone(),
                });
            }
        }

        let mut dx_override_index = HashMap::with_capacity(document.dx_overrides.len());
        for (position, entry) in document.dx_overrides.iter().enumerate() {
            if dx_override_index
                .insert(entry.dx_id.clone(), position)
                .is_some()
            {
                return Err(ScenarioError::DuplicateDxOverride {
                    scenario: document.id,
                    dx_id: entry.dx_id.clone(),
                });
            }
        }

        Ok(Self {
            id: document.id,
            title: document.title,
            specialty: document.specialty,
            difficulty: document.difficulty,
            estimated_minutes: document.estimated_minutes,
            description: document.description,
            objectives: document.objectives,
            patient_persona: document.patient_persona,
            ai_instructions: document.ai_instructions,
            physical_exam: document.physical_exam,
            test_defaults: document.test_default_behavior,
            required_must_not_miss: document.required_must_not_miss,
            final_dx_id: document.final_dx_id,
            teaching_points: document.teaching_points,
            test_overrides: document.test_overrides,
            test_override_index,
            dx_overrides: document.dx_overrides,
            dx_override_index,
        })
    }
}

impl From<Scenario> for ScenarioDocument {
    fn from(scenario: Scenario) -> Self {
        Self {
            id: scenario.id,
            title: scenario.title,
            specialty: scenario.specialty,
            difficulty: scenario.difficulty,
            estimated_minutes: scenario.estimated_minutes,
            description: scenario.description,
            objectives: scenario.objectives,
            patient_persona: scenario.patient_persona,
            ai_instructions: scenario.ai_instructions,
            physical_exam: scenario.physical_exam,
            test_overrides: scenario.test_overrides,
            test_default_behavior: scenario.test_defaults,
            dx_overrides: scenario.dx_overrides,
            required_must_not_miss: scenario.required_must_not_miss,
            final_dx_id: scenario.final_dx_id,
            teaching_points: scenario.teaching_points,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario id must not be empty")]
    EmptyId,
    #[error("scenario '{scenario}' has more than one override for test '{test_id}'")]
    DuplicateTestOverride { scenario: String, test_id: String },
    #[error("scenario '{scenario}' has more than one override for diagnosis '{dx_id}'")]
    DuplicateDxOverride { scenario: String, dx_id: String },
}

/// Student-facing projection of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioView {
    pub id: String,
    pub title: String,
    pub specialty: String,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    pub description: String,
    pub objectives: Vec<String>,
    pub patient_name: String,
    pub patient_age: u32,
    pub patient_gender: String,
    pub chief_complaint: String,
    pub vitals: VitalSigns,
    pub physical_exam: Vec<PhysicalExamSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: String,
    pub title: String,
    pub specialty: String,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
}

//! Maps a scenario and a catalog id to the authored (or default) outcome of a student choice.

use serde::Serialize;

use crate::catalog::{
    DiagnosisCatalog, DiagnosisCatalogEntry, TestCatalog, TestCatalogEntry, TestKind,
};
use crate::scenario::{DxYield, Scenario, TestYield};

const LAB_DEFAULT: &str = "Within normal limits.";
const IMAGING_DEFAULT: &str = "No acute abnormality.";
const BEDSIDE_DEFAULT: &str = "No significant abnormality.";
const PROCEDURE_DEFAULT: &str = "Not indicated in this case.";
const UNKNOWN_KIND_DEFAULT: &str = "Result not available.";
const DX_DEFAULT_EXPLANATION: &str = "Not strongly supported by this case data.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTest<'a> {
    pub test: &'a TestCatalogEntry,
    pub result: &'a str,
    #[serde(rename = "yield")]
    pub test_yield: TestYield,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDx<'a> {
    pub dx: &'a DiagnosisCatalogEntry,
    #[serde(rename = "yield")]
    pub dx_yield: DxYield,
    pub explanation: &'a str,
}

/// Pure lookup over the shared catalogs; holds no per-request state.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    tests: &'a TestCatalog,
    diagnoses: &'a DiagnosisCatalog,
}

impl<'a> Resolver<'a> {
    pub fn new(tests: &'a TestCatalog, diagnoses: &'a DiagnosisCatalog) -> Self {
        Self { tests, diagnoses }
    }

    pub fn resolve_test(
        &self,
        scenario: &'a Scenario,
        test_id: &str,
    ) -> Result<ResolvedTest<'a>, ResolutionError> {
        let test = self
            .tests
            .get(test_id)
            .ok_or_else(|| ResolutionError::TestNotFound(test_id.to_string()))?;

        if let Some(authored) = scenario.test_override(test_id) {
            return Ok(ResolvedTest {
                test,
                result: &authored.result,
                test_yield: authored.test_yield,
            });
        }

        let defaults = scenario.test_defaults.as_ref();
        let (result, test_yield) = match test.kind {
            TestKind::Lab => (
                defaults.map_or(LAB_DEFAULT, |d| d.lab_default.as_str()),
                TestYield::Low,
            ),
            TestKind::Imaging => (
                defaults.map_or(IMAGING_DEFAULT, |d| d.imaging_default.as_str()),
                TestYield::Low,
            ),
            TestKind::Bedside => (
                defaults.map_or(BEDSIDE_DEFAULT, |d| d.bedside_default.as_str()),
                TestYield::Low,
            ),
            TestKind::Procedure => (
                defaults.map_or(PROCEDURE_DEFAULT, |d| d.procedure_default.as_str()),
                TestYield::Inappropriate,
            ),
            TestKind::Other => (UNKNOWN_KIND_DEFAULT, TestYield::Low),
        };

        Ok(ResolvedTest {
            test,
            result,
            test_yield,
        })
    }

    pub fn resolve_dx(
        &self,
        scenario: &'a Scenario,
        dx_id: &str,
    ) -> Result<ResolvedDx<'a>, ResolutionError> {
        let dx = self
            .diagnoses
            .get(dx_id)
            .ok_or_else(|| ResolutionError::DiagnosisNotFound(dx_id.to_string()))?;

        Ok(match scenario.dx_override(dx_id) {
            Some(authored) => ResolvedDx {
                dx,
                dx_yield: authored.dx_yield,
                explanation: &authored.explanation,
            },
            None => ResolvedDx {
                dx,
                dx_yield: DxYield::Irrelevant,
                explanation: DX_DEFAULT_EXPLANATION,
            },
        })
    }
}

/// Required diagnoses absent from the differential, in the order they were authored.
pub fn check_missing_must_not_miss<S: AsRef<str>>(
    differential_dx_ids: &[S],
    required: Option<&[String]>,
) -> Vec<String> {
    let Some(required) = required else {
        return Vec::new();
    };

    required
        .iter()
        .filter(|id| {
            !differential_dx_ids
                .iter()
                .any(|candidate| candidate.as_ref() == id.as_str())
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("Test not found: {0}")]
    TestNotFound(String),
    #[error("Diagnosis not found: {0}")]
    DiagnosisNotFound(String),
}

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{Scenario, ScenarioSummary};
use crate::catalog::{CatalogError, DiagnosisCatalog, TestCatalog};
use crate::config::DataConfig;
use crate::workflows::resolution::Resolver;

const BUILTIN_SCENARIOS: &str = include_str!("../../data/scenarios.json");

pub const TESTS_FILE: &str = "tests.csv";
pub const DIAGNOSES_FILE: &str = "diagnoses.csv";
pub const SCENARIOS_FILE: &str = "scenarios.json";

/// Scenarios keyed by id, kept in authored order for listing.
#[derive(Debug, Clone)]
pub struct ScenarioLibrary {
    scenarios: Vec<Scenario>,
    index: HashMap<String, usize>,
}

impl ScenarioLibrary {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, LibraryError> {
        let mut index = HashMap::with_capacity(scenarios.len());
        for (position, scenario) in scenarios.iter().enumerate() {
            if index.insert(scenario.id.clone(), position).is_some() {
                return Err(LibraryError::DuplicateScenario {
                    id: scenario.id.clone(),
                });
            }
        }
        Ok(Self { scenarios, index })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LibraryError> {
        let scenarios: Vec<Scenario> = serde_json::from_reader(reader)?;
        Self::new(scenarios)
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.index
            .get(id)
            .map(|position| &self.scenarios[*position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn summaries(&self) -> Vec<ScenarioSummary> {
        self.scenarios.iter().map(Scenario::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Complete reference data set: both catalogs plus the scenarios that point into them.
#[derive(Debug, Clone)]
pub struct CaseLibrary {
    pub tests: TestCatalog,
    pub diagnoses: DiagnosisCatalog,
    pub scenarios: ScenarioLibrary,
}

impl CaseLibrary {
    /// Validate that every id a scenario authors exists in the catalogs.
    pub fn new(
        tests: TestCatalog,
        diagnoses: DiagnosisCatalog,
        scenarios: ScenarioLibrary,
    ) -> Result<Self, LibraryError> {
        for scenario in scenarios.iter() {
            for entry in scenario.test_overrides() {
                if !tests.contains(&entry.test_id) {
                    return Err(LibraryError::unknown(scenario, "test", &entry.test_id));
                }
            }

            let diagnosis_refs = scenario
                .dx_overrides()
                .iter()
                .map(|entry| entry.dx_id.as_str())
                .chain(scenario.required_must_not_miss.iter().map(String::as_str))
                .chain(scenario.final_dx_id.as_deref());
            for dx_id in diagnosis_refs {
                if !diagnoses.contains(dx_id) {
                    return Err(LibraryError::unknown(scenario, "diagnosis", dx_id));
                }
            }
        }

        Ok(Self {
            tests,
            diagnoses,
            scenarios,
        })
    }

    pub fn builtin() -> Result<Self, LibraryError> {
        Self::new(
            TestCatalog::builtin()?,
            DiagnosisCatalog::builtin()?,
            ScenarioLibrary::from_reader(BUILTIN_SCENARIOS.as_bytes())?,
        )
    }

    /// Load `tests.csv`, `diagnoses.csv` and `scenarios.json` from one directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, LibraryError> {
        let dir = dir.as_ref();
        let tests = TestCatalog::from_path(dir.join(TESTS_FILE))?;
        let diagnoses = DiagnosisCatalog::from_path(dir.join(DIAGNOSES_FILE))?;

        let scenarios_path = dir.join(SCENARIOS_FILE);
        let file = std::fs::File::open(&scenarios_path).map_err(|source| LibraryError::Io {
            path: scenarios_path.clone(),
            source,
        })?;
        let scenarios = ScenarioLibrary::from_reader(std::io::BufReader::new(file))?;

        Self::new(tests, diagnoses, scenarios)
    }

    pub fn load(config: &DataConfig) -> Result<Self, LibraryError> {
        match &config.catalog_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "loading case library from directory");
                Self::from_dir(dir)
            }
            None => Self::builtin(),
        }
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.tests, &self.diagnoses)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid scenario data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scenario id '{id}' appears more than once")]
    DuplicateScenario { id: String },
    #[error("scenario '{scenario}' references unknown {kind} '{id}'")]
    UnknownReference {
        scenario: String,
        kind: &'static str,
        id: String,
    },
}

impl LibraryError {
    fn unknown(scenario: &Scenario, kind: &'static str, id: &str) -> Self {
        Self::UnknownReference {
            scenario: scenario.id.clone(),
            kind,
            id: id.to_string(),
        }
    }
}

//! Shared reference catalogs of diagnostic tests and diagnoses.
//!
//! Catalogs are loaded once (from the bundled CSV files or a data directory) and never
//! mutated afterwards. Scenarios reference entries by id; resolution looks them up here.

mod parser;

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const BUILTIN_TESTS: &str = include_str!("../../data/tests.csv");
const BUILTIN_DIAGNOSES: &str = include_str!("../../data/diagnoses.csv");

/// Organ-system grouping shared by tests and diagnoses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClinicalCategory {
    Cardiac,
    Pulmonary,
    Neurology,
    #[serde(rename = "GI")]
    Gi,
    Renal,
    Endocrine,
    Infectious,
    Hematology,
    Psych,
    #[serde(rename = "MSK")]
    Msk,
    Imaging,
    Other,
}

/// How a test is performed; drives the default result when a scenario is silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestKind {
    Lab,
    Imaging,
    Bedside,
    Procedure,
    #[serde(other)]
    Other,
}

impl TestKind {
    pub const fn label(self) -> &'static str {
        match self {
            TestKind::Lab => "Lab",
            TestKind::Imaging => "Imaging",
            TestKind::Bedside => "Bedside",
            TestKind::Procedure => "Procedure",
            TestKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCatalogEntry {
    pub id: String,
    pub name: String,
    pub category: ClinicalCategory,
    pub kind: TestKind,
    pub description: String,
    pub typical_uses: Vec<String>,
    pub common: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisCatalogEntry {
    pub id: String,
    pub name: String,
    pub category: ClinicalCategory,
    pub brief: String,
    pub typical_clues: Vec<String>,
    pub common: bool,
}

/// Behavior a catalog needs from its entries for indexing and search.
pub trait CatalogItem {
    const CATALOG: &'static str;

    fn id(&self) -> &str;
    fn category(&self) -> ClinicalCategory;
    fn common(&self) -> bool;
    /// Case-insensitive match against the entry's searchable text; `needle` is lowercase.
    fn matches_text(&self, needle: &str) -> bool;

    fn matches_kind(&self, _kind: TestKind) -> bool {
        true
    }
}

impl CatalogItem for TestCatalogEntry {
    const CATALOG: &'static str = "test";

    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> ClinicalCategory {
        self.category
    }

    fn common(&self) -> bool {
        self.common
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    fn matches_kind(&self, kind: TestKind) -> bool {
        self.kind == kind
    }
}

impl CatalogItem for DiagnosisCatalogEntry {
    const CATALOG: &'static str = "diagnosis";

    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> ClinicalCategory {
        self.category
    }

    fn common(&self) -> bool {
        self.common
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.brief.to_lowercase().contains(needle)
            || self
                .typical_clues
                .iter()
                .any(|clue| clue.to_lowercase().contains(needle))
    }
}

/// Filter applied when browsing a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<ClinicalCategory>,
    pub kind: Option<TestKind>,
    pub text: Option<String>,
    pub common_only: bool,
    pub exclude: Vec<String>,
}

/// Immutable id-indexed table of catalog entries, in authored order.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

pub type TestCatalog = Catalog<TestCatalogEntry>;
pub type DiagnosisCatalog = Catalog<DiagnosisCatalogEntry>;

impl<T: CatalogItem> Catalog<T> {
    pub fn new(entries: Vec<T>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry.id().trim().is_empty() {
                return Err(CatalogError::EmptyId {
                    catalog: T::CATALOG,
                    row: position + 1,
                });
            }
            if index.insert(entry.id().to_string(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    catalog: T::CATALOG,
                    id: entry.id().to_string(),
                });
            }
        }

        Ok(Self { entries, index })
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|position| &self.entries[*position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn search(&self, query: &CatalogQuery) -> Vec<&T> {
        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase);

        self.entries
            .iter()
            .filter(|entry| query.category.map_or(true, |c| entry.category() == c))
            .filter(|entry| query.kind.map_or(true, |k| entry.matches_kind(k)))
            .filter(|entry| !query.common_only || entry.common())
            .filter(|entry| !query.exclude.iter().any(|id| id == entry.id()))
            .filter(|entry| needle.as_deref().map_or(true, |n| entry.matches_text(n)))
            .collect()
    }
}

impl TestCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_reader(BUILTIN_TESTS.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::new(parser::parse_tests(reader)?)
    }
}

impl DiagnosisCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_reader(BUILTIN_DIAGNOSES.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::new(parser::parse_diagnoses(reader)?)
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv(csv::Error),
    DuplicateId {
        catalog: &'static str,
        id: String,
    },
    EmptyId {
        catalog: &'static str,
        row: usize,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io { path, source } => {
                write!(f, "failed to read catalog {}: {}", path.display(), source)
            }
            CatalogError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogError::DuplicateId { catalog, id } => {
                write!(f, "{catalog} catalog lists id '{id}' more than once")
            }
            CatalogError::EmptyId { catalog, row } => {
                write!(f, "{catalog} catalog row {row} has an empty id")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io { source, .. } => Some(source),
            CatalogError::Csv(err) => Some(err),
            CatalogError::DuplicateId { .. } | CatalogError::EmptyId { .. } => None,
        }
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn builtin_catalogs_load() {
        let tests = TestCatalog::builtin().expect("bundled tests parse");
        let diagnoses = DiagnosisCatalog::builtin().expect("bundled diagnoses parse");

        assert_eq!(tests.len(), 35);
        assert_eq!(diagnoses.len(), 28);

        let ecg = tests.get("ecg").expect("ecg present");
        assert_eq!(ecg.kind, TestKind::Bedside);
        assert_eq!(ecg.category, ClinicalCategory::Cardiac);
        assert_eq!(ecg.typical_uses, vec!["Chest pain", "Arrhythmia", "ACS"]);

        let lp = tests.get("lumbar_puncture").expect("lp present");
        assert_eq!(lp.kind, TestKind::Procedure);

        let stemi = diagnoses.get("stemi").expect("stemi present");
        assert!(stemi.common);
        assert_eq!(stemi.typical_clues.len(), 4);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let csv = "id,name,category,kind,description,typical_uses,common\n\
                   ecg,ECG,Cardiac,Bedside,Heart tracing,Chest pain,true\n\
                   ecg,ECG again,Cardiac,Bedside,Heart tracing,,false\n";

        let err = TestCatalog::from_reader(Cursor::new(csv)).expect_err("duplicate rejected");
        match err {
            CatalogError::DuplicateId { catalog, id } => {
                assert_eq!(catalog, "test");
                assert_eq!(id, "ecg");
            }
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_maps_to_other() {
        let csv = "id,name,category,kind,description,typical_uses,common\n\
                   tilt,Tilt table,Cardiac,Provocation,Orthostatic challenge,Syncope,false\n";

        let catalog = TestCatalog::from_reader(Cursor::new(csv)).expect("catalog parses");
        assert_eq!(catalog.get("tilt").map(|t| t.kind), Some(TestKind::Other));
        assert!(catalog.get("tilt").map(|t| t.typical_uses.len()) == Some(1));
    }

    #[test]
    fn search_combines_filters() {
        let tests = TestCatalog::builtin().expect("bundled tests parse");

        let cardiac_labs = tests.search(&CatalogQuery {
            category: Some(ClinicalCategory::Cardiac),
            kind: Some(TestKind::Lab),
            ..CatalogQuery::default()
        });
        let ids: Vec<&str> = cardiac_labs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["troponin", "bnp"]);

        let text = tests.search(&CatalogQuery {
            text: Some("  CT ".to_string()),
            exclude: vec!["ct_head".to_string()],
            ..CatalogQuery::default()
        });
        assert!(text.iter().all(|t| t.id != "ct_head"));
        assert!(text.iter().any(|t| t.id == "ct_chest"));
    }

    #[test]
    fn diagnosis_search_matches_clues() {
        let diagnoses = DiagnosisCatalog::builtin().expect("bundled diagnoses parse");
        let hits = diagnoses.search(&CatalogQuery {
            text: Some("st elevation".to_string()),
            ..CatalogQuery::default()
        });
        assert!(hits.iter().any(|dx| dx.id == "stemi"));
    }
}

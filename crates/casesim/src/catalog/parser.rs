use super::{ClinicalCategory, DiagnosisCatalogEntry, TestCatalogEntry, TestKind};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct TestRow {
    id: String,
    name: String,
    category: ClinicalCategory,
    kind: TestKind,
    description: String,
    #[serde(default)]
    typical_uses: String,
    #[serde(default)]
    common: bool,
}

#[derive(Debug, Deserialize)]
struct DiagnosisRow {
    id: String,
    name: String,
    category: ClinicalCategory,
    brief: String,
    #[serde(default)]
    typical_clues: String,
    #[serde(default)]
    common: bool,
}

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// List columns hold `;`-separated values.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_tests<R: Read>(reader: R) -> Result<Vec<TestCatalogEntry>, csv::Error> {
    let mut entries = Vec::new();
    for row in reader_for(reader).deserialize::<TestRow>() {
        let row = row?;
        entries.push(TestCatalogEntry {
            typical_uses: split_list(&row.typical_uses),
            id: row.id,
            name: row.name,
            category: row.category,
            kind: row.kind,
            description: row.description,
            common: row.common,
        });
    }
    Ok(entries)
}

pub(crate) fn parse_diagnoses<R: Read>(
    reader: R,
) -> Result<Vec<DiagnosisCatalogEntry>, csv::Error> {
    let mut entries = Vec::new();
    for row in reader_for(reader).deserialize::<DiagnosisRow>() {
        let row = row?;
        entries.push(DiagnosisCatalogEntry {
            typical_clues: split_list(&row.typical_clues),
            id: row.id,
            name: row.name,
            category: row.category,
            brief: row.brief,
            common: row.common,
        });
    }
    Ok(entries)
}

//! Ranked differential diagnosis list as the student builds it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferentialEntry {
    pub dx_id: String,
    pub rank: u32,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DifferentialEntry {
    pub fn new(dx_id: impl Into<String>, rank: u32, confidence: Confidence) -> Self {
        Self {
            dx_id: dx_id.into(),
            rank,
            confidence,
            note: None,
        }
    }
}

/// Ordered differential whose ranks are always `1..=len`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DifferentialEntry>", into = "Vec<DifferentialEntry>")]
pub struct Differential {
    entries: Vec<DifferentialEntry>,
}

impl Differential {
    /// Order submitted entries by their rank (stable for ties) and renumber them.
    pub fn from_entries(mut entries: Vec<DifferentialEntry>) -> Self {
        entries.sort_by_key(|entry| entry.rank);
        let mut differential = Self { entries };
        differential.rerank();
        differential
    }

    pub fn entries(&self) -> &[DifferentialEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, dx_id: &str) -> bool {
        self.position(dx_id).is_some()
    }

    pub fn dx_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.dx_id.as_str())
            .collect()
    }

    /// Append at the bottom with medium confidence. Returns `false` if already listed.
    pub fn add(&mut self, dx_id: &str) -> bool {
        if self.contains(dx_id) {
            return false;
        }
        let rank = self.entries.len() as u32 + 1;
        self.entries
            .push(DifferentialEntry::new(dx_id, rank, Confidence::Medium));
        true
    }

    pub fn remove(&mut self, dx_id: &str) -> Option<DifferentialEntry> {
        let position = self.position(dx_id)?;
        let removed = self.entries.remove(position);
        self.rerank();
        Some(removed)
    }

    pub fn move_up(&mut self, dx_id: &str) -> bool {
        match self.position(dx_id) {
            Some(position) if position > 0 => {
                self.entries.swap(position, position - 1);
                self.rerank();
                true
            }
            _ => false,
        }
    }

    pub fn move_down(&mut self, dx_id: &str) -> bool {
        match self.position(dx_id) {
            Some(position) if position + 1 < self.entries.len() => {
                self.entries.swap(position, position + 1);
                self.rerank();
                true
            }
            _ => false,
        }
    }

    pub fn set_confidence(&mut self, dx_id: &str, confidence: Confidence) -> bool {
        match self.entry_mut(dx_id) {
            Some(entry) => {
                entry.confidence = confidence;
                true
            }
            None => false,
        }
    }

    /// Blank notes clear the field.
    pub fn set_note(&mut self, dx_id: &str, note: &str) -> bool {
        match self.entry_mut(dx_id) {
            Some(entry) => {
                let trimmed = note.trim();
                entry.note = (!trimmed.is_empty()).then(|| trimmed.to_string());
                true
            }
            None => false,
        }
    }

    pub fn into_entries(self) -> Vec<DifferentialEntry> {
        self.entries
    }

    fn position(&self, dx_id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.dx_id == dx_id)
    }

    fn entry_mut(&mut self, dx_id: &str) -> Option<&mut DifferentialEntry> {
        self.entries.iter_mut().find(|entry| entry.dx_id == dx_id)
    }

    fn rerank(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = index as u32 + 1;
        }
    }
}

impl From<Vec<DifferentialEntry>> for Differential {
    fn from(entries: Vec<DifferentialEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<Differential> for Vec<DifferentialEntry> {
    fn from(differential: Differential) -> Self {
        differential.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(differential: &Differential) -> Vec<u32> {
        differential
            .entries()
            .iter()
            .map(|entry| entry.rank)
            .collect()
    }

    #[test]
    fn from_entries_sorts_and_renumbers() {
        let differential = Differential::from_entries(vec![
            DifferentialEntry::new("pe", 7, Confidence::Low),
            DifferentialEntry::new("stemi", 2, Confidence::High),
            DifferentialEntry::new("gerd", 9, Confidence::Low),
        ]);

        assert_eq!(differential.dx_ids(), vec!["stemi", "pe", "gerd"]);
        assert_eq!(ranks(&differential), vec![1, 2, 3]);
    }

    #[test]
    fn add_appends_with_medium_confidence_once() {
        let mut differential = Differential::default();
        assert!(differential.add("stemi"));
        assert!(differential.add("pe"));
        assert!(!differential.add("stemi"));

        assert_eq!(differential.len(), 2);
        assert_eq!(differential.entries()[1].rank, 2);
        assert_eq!(differential.entries()[1].confidence, Confidence::Medium);
    }

    #[test]
    fn remove_and_moves_keep_ranks_contiguous() {
        let mut differential = Differential::default();
        for dx in ["stemi", "pe", "aortic_dissection", "gerd"] {
            differential.add(dx);
        }

        assert!(differential.remove("pe").is_some());
        assert_eq!(ranks(&differential), vec![1, 2, 3]);

        assert!(differential.move_up("gerd"));
        assert_eq!(
            differential.dx_ids(),
            vec!["stemi", "gerd", "aortic_dissection"]
        );
        assert!(!differential.move_up("stemi"));
        assert!(!differential.move_down("aortic_dissection"));
        assert!(differential.move_down("stemi"));
        assert_eq!(
            differential.dx_ids(),
            vec!["gerd", "stemi", "aortic_dissection"]
        );
        assert_eq!(ranks(&differential), vec![1, 2, 3]);
        assert!(differential.remove("missing").is_none());
    }

    #[test]
    fn updates_confidence_and_note() {
        let mut differential = Differential::default();
        differential.add("stemi");

        assert!(differential.set_confidence("stemi", Confidence::High));
        assert!(differential.set_note("stemi", "  ST elevation in II, III, aVF "));
        assert_eq!(
            differential.entries()[0].note.as_deref(),
            Some("ST elevation in II, III, aVF")
        );
        assert!(differential.set_note("stemi", "   "));
        assert!(differential.entries()[0].note.is_none());
        assert!(!differential.set_confidence("pe", Confidence::Low));
    }

    #[test]
    fn deserializes_from_submitted_list() {
        let differential: Differential = serde_json::from_value(serde_json::json!([
            { "dxId": "pe", "rank": 2, "confidence": "Low" },
            { "dxId": "stemi", "rank": 1, "confidence": "High", "note": "ECG" }
        ]))
        .expect("valid differential");

        assert_eq!(differential.dx_ids(), vec!["stemi", "pe"]);
        assert_eq!(differential.entries()[0].confidence, Confidence::High);
    }
}

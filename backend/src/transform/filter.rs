//! Row filter: drop order lines whose component is known non-chemotherapy noise.
//!
//! Matching is exact: case-sensitive and untrimmed. Rows with no component
//! name are kept.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::PipelineError;
use crate::models::{columns, Cell, CleanTable};

/// Default denylist of component names.
///
/// Kept byte-for-byte as maintained by pharmacy, including the
/// `"Sterile Water IVAtropine"` entry where two names were run together:
/// neither `"Sterile Water IV"` nor `"Atropine"` is excluded on its own.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "*0.9%NS 1000cc",
    "*0.9%NS 250 mL",
    "*0.9%NS 500cc",
    "Alpha Lipoic Acid (ALA)",
    "Ascorbic Acid",
    "Ascorbic Acid (Vit C)",
    "Ascorbic Acid (Vit C) - Cisplatin Bag 1",
    "Ascorbic Acid (Vit C) 1",
    "Ascorbic Acid (Vit C) -Bag #1 Vitamin",
    "Ascorbic Acid (Vit C) IV",
    "Calcium Gluconate 1000 mg/ 10 mL",
    "Dexamethasone",
    "Dexamethasone Inj (Decadron, Dexa)",
    "Dexamethasone Inj (Decadron, Dexa) 4-8 mg",
    "Dexamethasone Inj (Decadron, Dexa)- Admix",
    "Dexamethasone Inj-Admix",
    "Dexamethasone-Admix",
    "Diphenhydramine (Benadryl) IVP",
    "Diphenhydramine HCl injection (Benadryl) 25-50 mg",
    "Famotidine (Pepcid)",
    "Famotidine (Pepcid) - Admix",
    "Famotidine (Pepcid)-Admix",
    "Magnesium Sulfate",
    "Magnesium Sulfate - Bag #1 Vitamin",
    "Magnesium Sulfate - Cis",
    "Magnesium Sulfate - Vit",
    "Magnesium Sulfate 1",
    "Magnesium Sulfate Bag#1",
    "Magnesium Sulfate BAG#2",
    "Magnesium Sulfate IV",
    "Magnesium Sulfate-Vit",
    "Palonosetron (Aloxi)",
    "Palonosetron (Aloxi) - Admix",
    "Palonosetron (Aloxi)-Admix",
    "Pepcid",
    "Sterile Water",
    "Sterile Water IVAtropine",
];

/// Set of component names to exclude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionList {
    names: BTreeSet<String>,
}

impl ExclusionList {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a JSON array of names.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::from_names(DEFAULT_EXCLUSIONS.iter().copied())
    }
}

/// Remove rows whose component name is on the list. Returns the number removed.
pub fn filter_excluded(
    table: &mut CleanTable,
    exclusions: &ExclusionList,
) -> Result<usize, PipelineError> {
    let keep: Vec<bool> = table
        .require(columns::COMPONENT_NAME)?
        .iter()
        .map(|cell| match cell {
            Cell::Text(name) => !exclusions.contains(name),
            _ => true,
        })
        .collect();

    let before = table.row_count();
    table.retain_rows(&keep);
    Ok(before - table.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(names: &[Option<&str>]) -> CleanTable {
        let cells = names
            .iter()
            .map(|n| n.map_or(Cell::Null, |s| Cell::Text(s.to_string())))
            .collect::<Vec<_>>();
        let mut table = CleanTable::with_rows(cells.len());
        table.set_column(columns::COMPONENT_NAME, cells);
        table
    }

    fn remaining(table: &CleanTable) -> Vec<Option<&str>> {
        table
            .column(columns::COMPONENT_NAME)
            .unwrap()
            .iter()
            .map(Cell::as_text)
            .collect()
    }

    #[test]
    fn test_default_list() {
        let list = ExclusionList::default();
        assert_eq!(list.len(), 37);
        assert!(list.contains("Dexamethasone"));
        assert!(!list.contains("Chemo Drug X"));
    }

    #[test]
    fn test_filter_removes_exact_matches_only() {
        let mut table = components(&[
            Some("Dexamethasone"),
            Some("Chemo Drug X"),
            Some("dexamethasone"),
            Some("Dexamethasone "),
            None,
            Some("Pepcid"),
        ]);

        let removed = filter_excluded(&mut table, &ExclusionList::default()).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(
            remaining(&table),
            vec![Some("Chemo Drug X"), Some("dexamethasone"), Some("Dexamethasone "), None]
        );
    }

    #[test]
    fn test_concatenated_sterile_water_entry() {
        let mut table = components(&[
            Some("Sterile Water IVAtropine"),
            Some("Sterile Water IV"),
            Some("Atropine"),
            Some("Sterile Water"),
        ]);

        filter_excluded(&mut table, &ExclusionList::default()).unwrap();
        assert_eq!(remaining(&table), vec![Some("Sterile Water IV"), Some("Atropine")]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut table = components(&[Some("Pepcid"), Some("Cisplatin"), None, Some("Magnesium Sulfate")]);
        let list = ExclusionList::default();

        filter_excluded(&mut table, &list).unwrap();
        let once = table.clone();
        let removed = filter_excluded(&mut table, &list).unwrap();

        assert_eq!(removed, 0);
        assert_eq!(table, once);
    }

    #[test]
    fn test_fixture_list_substitutes_default() {
        let list = ExclusionList::from_json(r#"["Cisplatin"]"#).unwrap();
        let mut table = components(&[Some("Cisplatin"), Some("Pepcid")]);

        filter_excluded(&mut table, &list).unwrap();
        assert_eq!(remaining(&table), vec![Some("Pepcid")]);
    }

    #[test]
    fn test_missing_component_column() {
        let mut table = CleanTable::with_rows(0);
        let err = filter_excluded(&mut table, &ExclusionList::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == columns::COMPONENT_NAME));
    }
}

//! Competencies chosen for the report, deduplicated by (domain, subdomain, text).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Uniqueness key of a selected item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub domain: String,
    pub subdomain: String,
    pub text: String,
}

impl ItemKey {
    pub fn new(
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
            text: text.into(),
        }
    }
}

/// One competency chosen for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub domain: String,
    pub subdomain: String,
    pub text: String,
    /// "Month Year" label set when the item was added.
    pub timestamp: Option<String>,
    /// Add action this item came from.
    pub batch: Option<u32>,
}

impl SelectedItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.domain, &self.subdomain, &self.text)
    }

    /// Subdomain used for grouping: an empty subdomain groups under the domain.
    pub fn group(&self) -> &str {
        if self.subdomain.is_empty() {
            &self.domain
        } else {
            &self.subdomain
        }
    }
}

/// Month and year entered before adding competencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub month: String,
    pub year: String,
}

impl Timestamp {
    pub fn new(month: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            year: year.into(),
        }
    }

    /// The `"Month Year"` label, or a validation error if either part is blank.
    pub fn label(&self) -> Result<String> {
        let month = self.month.trim();
        let year = self.year.trim();
        if month.is_empty() || year.is_empty() {
            return Err(Error::Validation(
                "Veuillez remplir les champs Mois et Année avant d'ajouter des compétences."
                    .to_string(),
            ));
        }
        Ok(format!("{} {}", month, year))
    }
}

/// Result of one add action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub batch: u32,
    pub added: usize,
    pub duplicates: usize,
}

/// Ordered selection with a dedup set.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    items: Vec<SelectedItem>,
    keys: HashSet<ItemKey>,
    batch_counter: u32,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted items. Later duplicates are dropped.
    pub fn from_items(items: Vec<SelectedItem>, batch_counter: u32) -> Self {
        let mut selection = Self::new();
        for item in items {
            if !selection.push(item) {
                log::warn!("Dropping duplicate selection entry while loading");
            }
        }
        let highest = selection.items.iter().filter_map(|i| i.batch).max().unwrap_or(0);
        selection.batch_counter = batch_counter.max(highest);
        selection
    }

    fn push(&mut self, item: SelectedItem) -> bool {
        if !self.keys.insert(item.key()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Add the chosen competencies of one subdomain as a new batch.
    ///
    /// The batch counter advances even when every text is a duplicate.
    pub fn add_batch<S: AsRef<str>>(
        &mut self,
        domain: &str,
        subdomain: &str,
        texts: &[S],
        timestamp: &Timestamp,
    ) -> Result<AddOutcome> {
        let label = timestamp.label()?;
        if texts.is_empty() {
            return Err(Error::Validation(
                "Sélectionnez au moins une compétence.".to_string(),
            ));
        }

        self.batch_counter += 1;
        let batch = self.batch_counter;
        let mut outcome = AddOutcome {
            batch,
            added: 0,
            duplicates: 0,
        };

        for text in texts {
            let item = SelectedItem {
                domain: domain.to_string(),
                subdomain: subdomain.to_string(),
                text: text.as_ref().to_string(),
                timestamp: Some(label.clone()),
                batch: Some(batch),
            };
            if self.push(item) {
                outcome.added += 1;
            } else {
                outcome.duplicates += 1;
            }
        }

        log::debug!(
            "Batch {}: added {} ({} duplicates) to {}/{}",
            batch,
            outcome.added,
            outcome.duplicates,
            domain,
            subdomain
        );
        Ok(outcome)
    }

    /// Remove an item and free its key. Returns false if it was not selected.
    pub fn remove(&mut self, key: &ItemKey) -> bool {
        if !self.keys.remove(key) {
            return false;
        }
        self.items.retain(|item| item.key() != *key);
        true
    }

    /// Remove several items; returns how many were present.
    pub fn remove_many(&mut self, keys: &[ItemKey]) -> usize {
        keys.iter().filter(|key| self.remove(key)).count()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.keys.contains(key)
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn get(&self, key: &ItemKey) -> Option<&SelectedItem> {
        self.items.iter().find(|item| item.key() == *key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn batch_counter(&self) -> u32 {
        self.batch_counter
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.keys.clear();
        self.batch_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> Timestamp {
        Timestamp::new("Février", "2023")
    }

    #[test]
    fn test_add_batch_assigns_label_and_batch() {
        let mut sel = Selection::new();
        let outcome = sel.add_batch("Math", "Geo", &["a", "b"], &ts()).unwrap();
        assert_eq!(outcome, AddOutcome { batch: 1, added: 2, duplicates: 0 });
        assert_eq!(sel.items()[0].timestamp.as_deref(), Some("Février 2023"));
        assert_eq!(sel.items()[1].batch, Some(1));
    }

    #[test]
    fn test_duplicates_skipped_but_batch_advances() {
        let mut sel = Selection::new();
        sel.add_batch("Math", "Geo", &["a"], &ts()).unwrap();
        let outcome = sel.add_batch("Math", "Geo", &["a"], &ts()).unwrap();
        assert_eq!(outcome, AddOutcome { batch: 2, added: 0, duplicates: 1 });
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_same_text_in_other_subdomain_is_distinct() {
        let mut sel = Selection::new();
        sel.add_batch("Math", "Geo", &["a"], &ts()).unwrap();
        sel.add_batch("Math", "Num", &["a"], &ts()).unwrap();
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_missing_timestamp_is_validation_error() {
        let mut sel = Selection::new();
        let err = sel
            .add_batch("Math", "Geo", &["a"], &Timestamp::new("Mars", " "))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(sel.is_empty());
        assert_eq!(sel.batch_counter(), 0);
    }

    #[test]
    fn test_empty_choice_is_validation_error() {
        let mut sel = Selection::new();
        let none: [&str; 0] = [];
        assert!(sel.add_batch("Math", "Geo", &none, &ts()).unwrap_err().is_validation());
    }

    #[test]
    fn test_remove_frees_key_for_re_add() {
        let mut sel = Selection::new();
        sel.add_batch("Math", "Geo", &["a"], &ts()).unwrap();
        let key = ItemKey::new("Math", "Geo", "a");
        assert!(sel.remove(&key));
        assert!(!sel.contains(&key));
        let outcome = sel.add_batch("Math", "Geo", &["a"], &ts()).unwrap();
        assert_eq!(outcome.added, 1);
        assert!(!sel.remove(&ItemKey::new("Math", "Geo", "zzz")));
    }

    #[test]
    fn test_from_items_drops_duplicates_and_keeps_counter() {
        let item = SelectedItem {
            domain: "D".into(),
            subdomain: "S".into(),
            text: "t".into(),
            timestamp: None,
            batch: Some(7),
        };
        let sel = Selection::from_items(vec![item.clone(), item], 3);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.batch_counter(), 7);
    }

    #[test]
    fn test_group_falls_back_to_domain() {
        let item = SelectedItem {
            domain: "D".into(),
            subdomain: String::new(),
            text: "t".into(),
            timestamp: None,
            batch: None,
        };
        assert_eq!(item.group(), "D");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        const TEXTS: [&str; 5] = ["compter", "lire", "écrire", "dessiner", "chanter"];
        const SUBDOMAINS: [&str; 2] = ["Oral", "Écrit"];

        #[derive(Debug, Clone)]
        enum Op {
            Add(usize, Vec<usize>),
            Remove(usize, Vec<usize>),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            let picks = prop::collection::vec(0..TEXTS.len(), 1..6);
            prop_oneof![
                (0..SUBDOMAINS.len(), picks.clone()).prop_map(|(sub, picks)| Op::Add(sub, picks)),
                (0..SUBDOMAINS.len(), picks).prop_map(|(sub, picks)| Op::Remove(sub, picks)),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_keys_stay_unique(ops in prop::collection::vec(op_strategy(), 0..40)) {
                let mut sel = Selection::new();
                let mut batches = 0u32;
                for op in ops {
                    match op {
                        Op::Add(sub, picks) => {
                            let texts: Vec<&str> = picks.iter().map(|&i| TEXTS[i]).collect();
                            let outcome = sel.add_batch("Langage", SUBDOMAINS[sub], &texts, &ts());
                            prop_assert!(outcome.is_ok());
                            batches += 1;
                        }
                        Op::Remove(sub, picks) => {
                            let keys: Vec<ItemKey> = picks
                                .iter()
                                .map(|&i| ItemKey::new("Langage", SUBDOMAINS[sub], TEXTS[i]))
                                .collect();
                            sel.remove_many(&keys);
                            for key in &keys {
                                prop_assert!(!sel.contains(key));
                            }
                        }
                    }
                    let unique: HashSet<ItemKey> = sel.items().iter().map(|i| i.key()).collect();
                    prop_assert_eq!(unique.len(), sel.len());
                }
                prop_assert_eq!(sel.batch_counter(), batches);
            }
        }
    }
}

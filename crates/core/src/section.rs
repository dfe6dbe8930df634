//! Per-section records (school years) and the student's personal info.

use crate::normalize::sanitize_filename;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Fixed cycle sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKey {
    #[serde(rename = "TPS")]
    Tps,
    #[serde(rename = "PS")]
    Ps,
    #[serde(rename = "MS")]
    Ms,
    #[serde(rename = "GS")]
    Gs,
}

impl SectionKey {
    pub const ALL: [SectionKey; 4] = [Self::Tps, Self::Ps, Self::Ms, Self::Gs];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Tps => "TPS",
            Self::Ps => "PS",
            Self::Ms => "MS",
            Self::Gs => "GS",
        }
    }

    /// Position in [`SectionKey::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tps => "TOUTE PETITE SECTION",
            Self::Ps => "PETITE SECTION",
            Self::Ms => "MOYENNE SECTION",
            Self::Gs => "GRANDE SECTION",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SectionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("Unknown section: {}", s)))
    }
}

/// Text fields of a section record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionField {
    Annee,
    Ecole,
    Enseignants,
}

impl SectionField {
    pub const ALL: [SectionField; 3] = [Self::Annee, Self::Ecole, Self::Enseignants];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Annee => "annee",
            Self::Ecole => "ecole",
            Self::Enseignants => "enseignants",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Annee => "Année scolaire",
            Self::Ecole => "École",
            Self::Enseignants => "Enseignant(s)",
        }
    }
}

impl FromStr for SectionField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("Unknown section field: {}", s)))
    }
}

/// Data entered for one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionRecord {
    pub completed: bool,
    fields: BTreeMap<SectionField, String>,
    pub photo: Option<PathBuf>,
    #[serde(rename = "bilan1")]
    pub summary: String,
    #[serde(rename = "bilan2")]
    pub second_summary: String,
    #[serde(rename = "bilan2_enabled")]
    pub second_enabled: bool,
}

impl SectionRecord {
    pub fn field(&self, field: SectionField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Set a field (trimmed) and recompute the completion flag.
    pub fn set_field(&mut self, field: SectionField, value: &str) {
        self.fields.insert(field, value.trim().to_string());
        self.recompute_completed();
    }

    /// Manual override of the completion flag.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub fn all_fields_filled(&self) -> bool {
        SectionField::ALL
            .iter()
            .all(|field| !self.field(*field).trim().is_empty())
    }

    fn recompute_completed(&mut self) {
        self.completed = self.all_fields_filled();
    }

    /// `(label, value)` for every non-empty field, in field order.
    pub fn filled_fields(&self) -> Vec<(&'static str, &str)> {
        SectionField::ALL
            .iter()
            .map(|field| (field.label(), self.field(*field).trim()))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }

    /// The summaries shown on the synthesis slide.
    pub fn summaries(&self) -> Vec<&str> {
        if self.second_enabled {
            vec![self.summary.as_str(), self.second_summary.as_str()]
        } else {
            vec![self.summary.as_str()]
        }
    }

    /// Empty every field, the photo and both summaries.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.photo = None;
        self.summary.clear();
        self.second_summary.clear();
        self.second_enabled = false;
        self.recompute_completed();
    }
}

/// One record per section key, stored as a `{"TPS": {...}, ...}` object.
///
/// Keys missing from a file load as empty records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<SectionKey, SectionRecord>",
    into = "BTreeMap<SectionKey, SectionRecord>"
)]
pub struct Sections {
    records: [SectionRecord; 4],
}

impl From<BTreeMap<SectionKey, SectionRecord>> for Sections {
    fn from(mut map: BTreeMap<SectionKey, SectionRecord>) -> Self {
        Self {
            records: SectionKey::ALL.map(|key| map.remove(&key).unwrap_or_default()),
        }
    }
}

impl From<Sections> for BTreeMap<SectionKey, SectionRecord> {
    fn from(sections: Sections) -> Self {
        SectionKey::ALL.into_iter().zip(sections.records).collect()
    }
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SectionKey) -> &SectionRecord {
        &self.records[key.index()]
    }

    pub fn get_mut(&mut self, key: SectionKey) -> &mut SectionRecord {
        &mut self.records[key.index()]
    }

    /// Records in key order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &SectionRecord)> {
        SectionKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }

    /// Sections marked complete, in key order.
    pub fn completed(&self) -> impl Iterator<Item = (SectionKey, &SectionRecord)> {
        self.iter().filter(|(_, record)| record.completed)
    }
}

/// Cover page information about the student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "naissance")]
    pub birthdate: String,
    pub photo: Option<PathBuf>,
    #[serde(rename = "personal_completed")]
    pub completed: bool,
}

impl PersonalInfo {
    /// Set `completed` iff name, first name and birthdate are all filled.
    pub fn mark_completed(&mut self) -> bool {
        self.completed = [&self.last_name, &self.first_name, &self.birthdate]
            .iter()
            .all(|v| !v.trim().is_empty());
        self.completed
    }

    /// `<first>_<last>.pptx`, sanitized for use as a file name.
    pub fn default_export_filename(&self) -> String {
        let stem = format!("{}_{}", self.first_name.trim(), self.last_name.trim());
        format!("{}.pptx", sanitize_filename(&stem))
    }

    /// Lines of the cover info box, skipping empty values.
    pub fn cover_lines(&self) -> Vec<String> {
        [
            ("Nom", &self.last_name),
            ("Prénom", &self.first_name),
            ("Date de naissance", &self.birthdate),
        ]
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{}: {}", label, value.trim()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_follows_fields() {
        let mut record = SectionRecord::default();
        record.set_field(SectionField::Annee, "2023-2024");
        record.set_field(SectionField::Ecole, " Jules Ferry ");
        assert!(!record.completed);
        record.set_field(SectionField::Enseignants, "Mme Martin");
        assert!(record.completed);
        assert_eq!(record.field(SectionField::Ecole), "Jules Ferry");
        record.set_field(SectionField::Annee, "  ");
        assert!(!record.completed);
    }

    #[test]
    fn test_manual_override_and_clear() {
        let mut record = SectionRecord::default();
        record.set_completed(true);
        record.summary = "Bon travail".into();
        record.second_enabled = true;
        record.photo = Some("p.png".into());
        assert_eq!(record.summaries().len(), 2);
        record.clear();
        assert!(!record.completed);
        assert!(record.summary.is_empty());
        assert!(!record.second_enabled);
        assert!(record.photo.is_none());
        assert_eq!(record.summaries(), vec![""]);
    }

    #[test]
    fn test_filled_fields_skip_empty() {
        let mut record = SectionRecord::default();
        record.set_field(SectionField::Ecole, "Jules Ferry");
        assert_eq!(record.filled_fields(), vec![("École", "Jules Ferry")]);
    }

    #[test]
    fn test_sections_completed_in_key_order() {
        let mut sections = Sections::new();
        sections.get_mut(SectionKey::Gs).set_completed(true);
        sections.get_mut(SectionKey::Ps).set_completed(true);
        let keys: Vec<_> = sections.completed().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![SectionKey::Ps, SectionKey::Gs]);
    }

    #[test]
    fn test_section_key_parse() {
        assert_eq!("ms".parse::<SectionKey>().unwrap(), SectionKey::Ms);
        assert_eq!("TPS".parse::<SectionKey>().unwrap().label(), "TOUTE PETITE SECTION");
        assert!("CP".parse::<SectionKey>().is_err());
        assert_eq!("ecole".parse::<SectionField>().unwrap(), SectionField::Ecole);
    }

    #[test]
    fn test_record_serde_names() {
        let mut record = SectionRecord::default();
        record.set_field(SectionField::Annee, "2024");
        record.second_enabled = true;
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fields"]["annee"], "2024");
        assert_eq!(json["bilan2_enabled"], true);
        let sections = serde_json::to_value(Sections::new()).unwrap();
        assert!(sections.get("TPS").is_some());
    }

    #[test]
    fn test_personal_info() {
        let mut info = PersonalInfo {
            last_name: "Dupont".into(),
            first_name: "Léa".into(),
            ..Default::default()
        };
        assert!(!info.mark_completed());
        info.birthdate = "01/02/2019".into();
        assert!(info.mark_completed());
        assert_eq!(info.default_export_filename(), "Léa_Dupont.pptx");
        assert_eq!(info.cover_lines()[2], "Date de naissance: 01/02/2019");
    }

    #[test]
    fn test_default_filename_fallback() {
        assert_eq!(PersonalInfo::default().default_export_filename(), "presentation.pptx");
    }

    #[test]
    fn test_sections_missing_keys_load_empty() {
        let sections: Sections =
            serde_json::from_str(r#"{"PS": {"bilan1": "Curieux", "completed": true}}"#).unwrap();
        assert_eq!(sections.get(SectionKey::Ps).summary, "Curieux");
        assert_eq!(sections.get(SectionKey::Gs), &SectionRecord::default());
        assert_eq!(sections.completed().map(|(key, _)| key).collect::<Vec<_>>(), vec![SectionKey::Ps]);

        let json = serde_json::to_value(&sections).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&"TPS"));
    }
}

//! Competency catalog: domain → subdomain → competency strings.
//!
//! The catalog file is line oriented:
//!
//! ```text
//! ##-Domaine Mathématiques
//! #-Sous-domaine: Nombres
//! XX Compter jusqu'à 10
//! ```
//!
//! Lines that match no marker are ignored, so a malformed file never fails
//! to parse; it just yields fewer entries.

use crate::normalize::{strip_subdomain_label, TextNormalizer};
use crate::types::{palette_color, Rgb, DEFAULT_BODY_SIZE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Marker starting a domain block.
pub const DOMAIN_MARKER: &str = "##-Domaine";
/// Marker starting a subdomain block.
pub const SUBDOMAIN_MARKER: &str = "#-";
/// Marker of a competency line.
pub const COMPETENCY_MARKER: &str = "XX";
/// Domain used for competencies that appear before any domain marker.
pub const DEFAULT_DOMAIN: &str = "Domaine";

/// A top-level competency category with its display style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub color: Rgb,
    pub body_font_size: u32,
    pub subdomains: Vec<Subdomain>,
}

impl Domain {
    /// A new domain styled with the palette colour for its position.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            color: palette_color(index),
            body_font_size: DEFAULT_BODY_SIZE,
            subdomains: Vec::new(),
        }
    }

    pub fn subdomain(&self, name: &str) -> Option<&Subdomain> {
        self.subdomains.iter().find(|s| s.name == name)
    }

    fn subdomain_mut_or_insert(&mut self, name: &str) -> &mut Subdomain {
        let pos = match self.subdomains.iter().position(|s| s.name == name) {
            Some(pos) => pos,
            None => {
                self.subdomains.push(Subdomain {
                    name: name.to_string(),
                    competencies: Vec::new(),
                });
                self.subdomains.len() - 1
            }
        };
        &mut self.subdomains[pos]
    }
}

/// A named group of competencies inside a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdomain {
    pub name: String,
    pub competencies: Vec<String>,
}

/// Ordered catalog of available competencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    domains: Vec<Domain>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already-styled domains (project load).
    pub fn from_domains(domains: Vec<Domain>) -> Self {
        Self { domains }
    }

    /// Read and parse a catalog file (UTF-8, optional BOM).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let catalog = Self::parse(&content);
        log::info!(
            "Loaded catalog {}: {} domains, {} competencies",
            path.display(),
            catalog.domains.len(),
            catalog.competency_count()
        );
        Ok(catalog)
    }

    /// Parse catalog text. Unknown and blank lines are skipped.
    pub fn parse(content: &str) -> Self {
        let normalizer = TextNormalizer::new();
        let mut catalog = Self::new();
        let mut current_domain: Option<usize> = None;
        let mut current_subdomain: Option<String> = None;

        for raw in content.lines() {
            let line = normalizer.clean_line(raw);
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix(DOMAIN_MARKER) {
                let name = match rest.trim() {
                    "" => DEFAULT_DOMAIN,
                    name => name,
                };
                current_domain = Some(catalog.domain_index_or_insert(name));
                current_subdomain = None;
            } else if let Some(rest) = line.strip_prefix(SUBDOMAIN_MARKER) {
                current_subdomain = Some(strip_subdomain_label(rest));
            } else if let Some(rest) = line.strip_prefix(COMPETENCY_MARKER) {
                let domain_idx = match current_domain {
                    Some(idx) => idx,
                    None => {
                        let idx = catalog.domain_index_or_insert(DEFAULT_DOMAIN);
                        current_domain = Some(idx);
                        idx
                    }
                };
                let domain = &mut catalog.domains[domain_idx];
                let sub_name = match current_subdomain.as_deref() {
                    Some(s) if !s.is_empty() => s.to_string(),
                    _ => domain.name.clone(),
                };
                domain
                    .subdomain_mut_or_insert(&sub_name)
                    .competencies
                    .push(rest.trim().to_string());
            } else {
                log::debug!("Skipping catalog line: {}", line);
            }
        }

        catalog
    }

    fn domain_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.domains.iter().position(|d| d.name == name) {
            return idx;
        }
        let idx = self.domains.len();
        self.domains.push(Domain::new(name, idx));
        idx
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    pub fn domain_mut(&mut self, name: &str) -> Option<&mut Domain> {
        self.domains.iter_mut().find(|d| d.name == name)
    }

    /// Domain names in first-seen order.
    pub fn domain_order(&self) -> Vec<&str> {
        self.domains.iter().map(|d| d.name.as_str()).collect()
    }

    /// Competencies available under (domain, subdomain).
    pub fn competencies(&self, domain: &str, subdomain: &str) -> Option<&[String]> {
        self.domain(domain)?
            .subdomain(subdomain)
            .map(|s| s.competencies.as_slice())
    }

    pub fn competency_count(&self) -> usize {
        self.domains
            .iter()
            .flat_map(|d| d.subdomains.iter())
            .map(|s| s.competencies.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Change a domain's body font size and/or colour.
    pub fn set_domain_style(
        &mut self,
        domain: &str,
        body_font_size: Option<u32>,
        color: Option<Rgb>,
    ) -> Result<()> {
        let entry = self
            .domain_mut(domain)
            .ok_or_else(|| Error::Validation(format!("Unknown domain: {}", domain)))?;
        if let Some(size) = body_font_size {
            if size == 0 {
                return Err(Error::Validation("Font size must be positive".to_string()));
            }
            entry.body_font_size = size;
        }
        if let Some(color) = color {
            entry.color = color;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DOMAIN_PALETTE;

    #[test]
    fn test_parse_basic_markers() {
        let catalog = Catalog::parse("##-Domaine Math\n#-Geometry\nXX Measure angles\n");
        assert_eq!(
            catalog.competencies("Math", "Geometry"),
            Some(&["Measure angles".to_string()][..])
        );
    }

    #[test]
    fn test_subdomain_label_is_stripped() {
        let catalog = Catalog::parse("##-Domaine Math\n#-Sous-domaine: Nombres\nXX Compter\n");
        assert_eq!(catalog.competencies("Math", "Nombres").unwrap(), ["Compter"]);
    }

    #[test]
    fn test_competency_before_domain_uses_default() {
        let catalog = Catalog::parse("XX Orphan\n##-Domaine Math\nXX Count\n");
        assert_eq!(catalog.domain_order(), vec![DEFAULT_DOMAIN, "Math"]);
        assert_eq!(
            catalog.competencies(DEFAULT_DOMAIN, DEFAULT_DOMAIN).unwrap(),
            ["Orphan"]
        );
    }

    #[test]
    fn test_subdomain_defaults_to_domain_name() {
        let catalog = Catalog::parse("##-Domaine Art\nXX Draw\n");
        assert_eq!(catalog.competencies("Art", "Art").unwrap(), ["Draw"]);
    }

    #[test]
    fn test_domain_resets_subdomain() {
        let catalog =
            Catalog::parse("##-Domaine A\n#-Sub\nXX one\n##-Domaine B\nXX two\n");
        assert_eq!(catalog.competencies("B", "B").unwrap(), ["two"]);
        assert!(catalog.competencies("B", "Sub").is_none());
    }

    #[test]
    fn test_unknown_and_blank_lines_ignored() {
        let catalog = Catalog::parse("\n  \nrandom text\n##-Domaine Math\n-- comment\nXX Add\n");
        assert_eq!(catalog.competency_count(), 1);
    }

    #[test]
    fn test_unicode_cleanup_before_matching() {
        let catalog = Catalog::parse(
            "\u{feff}##-Domaine\u{00a0}Langage\n#-Oral\nXX Dire qu\u{2019}il pleut\n",
        );
        assert_eq!(
            catalog.competencies("Langage", "Oral").unwrap(),
            ["Dire qu'il pleut"]
        );
    }

    #[test]
    fn test_colors_follow_first_seen_order() {
        let catalog = Catalog::parse("##-Domaine Zeta\n##-Domaine Alpha\n##-Domaine Zeta\n");
        assert_eq!(catalog.domain_order(), vec!["Zeta", "Alpha"]);
        assert_eq!(catalog.domain("Zeta").unwrap().color, DOMAIN_PALETTE[0]);
        assert_eq!(catalog.domain("Alpha").unwrap().color, DOMAIN_PALETTE[1]);
    }

    #[test]
    fn test_subdomain_order_is_first_seen() {
        let catalog =
            Catalog::parse("##-Domaine M\n#-B\nXX b1\n#-A\nXX a1\n#-B\nXX b2\n");
        let domain = catalog.domain("M").unwrap();
        let names: Vec<_> = domain.subdomains.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(catalog.competencies("M", "B").unwrap(), ["b1", "b2"]);
    }

    #[test]
    fn test_set_domain_style() {
        let mut catalog = Catalog::parse("##-Domaine Math\nXX a\n");
        catalog
            .set_domain_style("Math", Some(14), Some(Rgb::new(1, 2, 3)))
            .unwrap();
        let domain = catalog.domain("Math").unwrap();
        assert_eq!(domain.body_font_size, 14);
        assert_eq!(domain.color, Rgb::new(1, 2, 3));
        assert!(catalog.set_domain_style("Nope", Some(10), None).is_err());
        assert!(catalog.set_domain_style("Math", Some(0), None).is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Catalog::load("/nonexistent/COMPETENCES.txt").is_err());
    }
}

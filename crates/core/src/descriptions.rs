//! Optional free-text descriptions per domain and per subdomain.
//!
//! Uses the catalog's markers (`##-` for a domain, `#-` for a subdomain);
//! every other line belongs to the block opened by the last marker.

use crate::normalize::{strip_domain_word, strip_subdomain_label, TextNormalizer};
use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Conventional file name looked up next to the working directory.
pub const DESCRIPTIONS_FILE: &str = "DOMAINES.txt";

/// Domain and subdomain descriptions consumed by the exporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptions {
    domains: HashMap<String, String>,
    subdomains: HashMap<(String, String), String>,
}

impl Descriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a description file. A missing file yields empty descriptions.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No description file at {}", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let normalizer = TextNormalizer::new();
        let mut parsed = Self::new();
        let mut block = Block::default();

        for raw in content.lines() {
            if raw.trim().is_empty() {
                block.lines.push(String::new());
                continue;
            }
            let line = normalizer.clean_line(raw);

            if let Some(rest) = line.strip_prefix("##-") {
                parsed.commit(&mut block);
                block.domain = Some(strip_domain_word(rest));
                block.subdomain = None;
            } else if let Some(rest) = line.strip_prefix("#-") {
                parsed.commit(&mut block);
                block.subdomain = Some(strip_subdomain_label(rest));
            } else {
                block.lines.push(line);
            }
        }
        parsed.commit(&mut block);

        parsed
    }

    fn commit(&mut self, block: &mut Block) {
        let text = block.lines.join("\n").trim().to_string();
        block.lines.clear();

        let Some(domain) = block.domain.clone() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        match block.subdomain.clone() {
            Some(sub) => {
                self.subdomains.insert((domain, sub), text);
            }
            None => {
                self.domains.insert(domain, text);
            }
        }
    }

    pub fn domain(&self, domain: &str) -> Option<&str> {
        self.domains.get(domain).map(String::as_str)
    }

    pub fn subdomain(&self, domain: &str, subdomain: &str) -> Option<&str> {
        self.subdomains
            .get(&(domain.to_string(), subdomain.to_string()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.subdomains.is_empty()
    }
}

/// Lines accumulated since the last marker.
#[derive(Debug, Default)]
struct Block {
    domain: Option<String>,
    subdomain: Option<String>,
    lines: Vec<String>,
}

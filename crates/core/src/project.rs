//! Project state and its JSON file format.

use crate::catalog::{Catalog, Domain, Subdomain};
use crate::config::{LayoutConfig, PREVIEW_HEIGHT, PREVIEW_WIDTH};
use crate::overlay::{Overlay, OverlayAnchor, OverlayStore};
use crate::paginate::PageId;
use crate::section::{PersonalInfo, Sections};
use crate::selection::{SelectedItem, Selection, Timestamp};
use crate::types::{CanvasSize, Rgb};
use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Current project file version.
pub const PROJECT_VERSION: u32 = 1;

/// Everything the user edits, owned by a single controller.
#[derive(Debug)]
pub struct ProjectState {
    pub catalog: Catalog,
    pub selection: Selection,
    pub overlays: OverlayStore,
    pub personal: PersonalInfo,
    /// Draft month/year applied to the next add.
    pub timestamp: Timestamp,
    pub sections: Sections,
    /// Live preview size the overlays were placed on.
    pub canvas: CanvasSize,
}

impl ProjectState {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            catalog: Catalog::new(),
            selection: Selection::new(),
            overlays: OverlayStore::new(layout),
            personal: PersonalInfo::default(),
            timestamp: Timestamp::default(),
            sections: Sections::new(),
            canvas: CanvasSize::new(PREVIEW_WIDTH, PREVIEW_HEIGHT),
        }
    }

    pub fn to_file(&self) -> ProjectFile {
        ProjectFile {
            version: PROJECT_VERSION,
            catalog: self.catalog.clone(),
            selected: self
                .selection
                .items()
                .iter()
                .cloned()
                .map(SelectionEntry::Item)
                .collect(),
            batch_counter: self.selection.batch_counter(),
            overlays: self
                .overlays
                .iter()
                .map(|(anchor, images)| OverlayRecord {
                    anchor: anchor.clone(),
                    images: images.to_vec(),
                })
                .collect(),
            infos: InfoRecord {
                personal: self.personal.clone(),
                month: None,
                year: None,
            },
            timestamp: self.timestamp.clone(),
            sections: self.sections.clone(),
            canvas: self.canvas,
            legacy: LegacyFields::default(),
        }
    }

    /// Build state from a parsed file. Overlay bitmaps are not decoded here.
    pub fn from_file(file: ProjectFile, layout: &LayoutConfig) -> Result<Self> {
        if file.version == 0 || file.version > PROJECT_VERSION {
            return Err(Error::ProjectFormat(format!(
                "Unsupported project version {}",
                file.version
            )));
        }

        let items: Vec<SelectedItem> = file.selected.into_iter().map(SelectedItem::from).collect();
        let mut overlays = OverlayStore::new(layout);
        for record in file.overlays {
            for image in record.images {
                overlays.insert(record.anchor.clone(), image);
            }
        }

        let legacy = file.legacy;
        let catalog = match legacy.available {
            Some(available) if file.catalog.is_empty() => {
                log::info!("Importing catalog from a desktop-format project");
                legacy_catalog(available, &legacy.domain_order, &legacy.domains)
            }
            _ => file.catalog,
        };
        if catalog.is_empty() && !items.is_empty() {
            log::warn!(
                "Project has {} selected item(s) but no catalog; nothing will be paginated",
                items.len()
            );
        }
        for record in legacy.page_images {
            let anchor = OverlayAnchor::Page(PageId::new(record.domain, record.page_index));
            for image in record.images {
                let [x, y] = image.pos;
                let [width, height] = image.size;
                overlays.insert(anchor.clone(), Overlay::new(image.path, x, y, width, height));
            }
        }

        let mut timestamp = file.timestamp;
        if timestamp == Timestamp::default() {
            if let (Some(month), Some(year)) = (file.infos.month, file.infos.year) {
                timestamp = Timestamp::new(month, year);
            }
        }

        Ok(Self {
            catalog,
            selection: Selection::from_items(items, file.batch_counter),
            overlays,
            personal: file.infos.personal,
            timestamp,
            sections: file.sections,
            canvas: file.canvas,
        })
    }

    /// Write the project as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.to_file())?;
        fs::write(path, json)?;
        log::info!("Saved project to {}", path.display());
        Ok(())
    }

    /// Read a project and re-decode its overlays.
    ///
    /// Images that fail to decode keep their geometry and are logged.
    pub fn load(path: impl AsRef<Path>, layout: &LayoutConfig) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let file: ProjectFile = serde_json::from_str(&content)?;
        let mut state = Self::from_file(file, layout)?;
        let failures = state.overlays.rehydrate();
        log::info!(
            "Loaded project {}: {} items, {} images ({} unreadable)",
            path.display(),
            state.selection.len(),
            state.overlays.len(),
            failures.len()
        );
        Ok(state)
    }
}

/// On-disk project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub selected: Vec<SelectionEntry>,
    #[serde(default)]
    pub batch_counter: u32,
    #[serde(default)]
    pub overlays: Vec<OverlayRecord>,
    #[serde(default)]
    pub infos: InfoRecord,
    #[serde(default)]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub sections: Sections,
    #[serde(default = "default_canvas")]
    pub canvas: CanvasSize,
    /// Keys only found in projects saved by the desktop application.
    #[serde(flatten)]
    pub legacy: LegacyFields,
}

/// Personal info, plus the draft month/year the desktop application kept
/// next to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoRecord {
    #[serde(flatten)]
    pub personal: PersonalInfo,
    #[serde(default, skip_serializing)]
    pub month: Option<String>,
    #[serde(default, skip_serializing)]
    pub year: Option<String>,
}

/// Catalog, domain styles and page images in the desktop layout.
/// Read on load, never written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyFields {
    #[serde(default, skip_serializing)]
    pub available: Option<OrderedMap<OrderedMap<Vec<String>>>>,
    #[serde(default, skip_serializing)]
    pub domain_order: Vec<String>,
    #[serde(default, skip_serializing)]
    pub domains: BTreeMap<String, LegacyDomainStyle>,
    #[serde(default, skip_serializing)]
    pub page_images: Vec<LegacyPageImages>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyDomainStyle {
    pub color: Option<Rgb>,
    /// `["Arial", 12]`
    pub font_body: Option<(String, u32)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyPageImages {
    pub domain: String,
    #[serde(default)]
    pub page_index: usize,
    #[serde(default)]
    pub images: Vec<LegacyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyImage {
    pub path: PathBuf,
    #[serde(default = "default_image_pos")]
    pub pos: [f32; 2],
    #[serde(default = "default_image_size")]
    pub size: [f32; 2],
}

fn default_image_pos() -> [f32; 2] {
    [60.0, 78.0]
}

fn default_image_size() -> [f32; 2] {
    [120.0, 120.0]
}

/// A JSON object read as `(key, value)` pairs in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// Catalog from the desktop layout: domains in `domain_order`, then any
/// others in file order, subdomains and competencies in file order.
fn legacy_catalog(
    available: OrderedMap<OrderedMap<Vec<String>>>,
    domain_order: &[String],
    styles: &BTreeMap<String, LegacyDomainStyle>,
) -> Catalog {
    let mut entries = available.0;
    let mut ordered = Vec::with_capacity(entries.len());
    for name in domain_order {
        match entries.iter().position(|(domain, _)| domain == name) {
            Some(pos) => ordered.push(entries.remove(pos)),
            None => ordered.push((name.clone(), OrderedMap(Vec::new()))),
        }
    }
    ordered.extend(entries);

    let domains = ordered
        .into_iter()
        .enumerate()
        .map(|(index, (name, subdomains))| {
            let mut domain = Domain::new(name, index);
            if let Some(style) = styles.get(&domain.name) {
                if let Some(color) = style.color {
                    domain.color = color;
                }
                if let Some((_, size)) = &style.font_body {
                    domain.body_font_size = *size;
                }
            }
            domain.subdomains = subdomains
                .0
                .into_iter()
                .map(|(name, competencies)| Subdomain { name, competencies })
                .collect();
            domain
        })
        .collect();
    Catalog::from_domains(domains)
}

fn default_version() -> u32 {
    PROJECT_VERSION
}

fn default_canvas() -> CanvasSize {
    CanvasSize::new(PREVIEW_WIDTH, PREVIEW_HEIGHT)
}

/// A selected item, also accepting the older positional forms
/// `[domain, subdomain, text]` and `[domain, subdomain, text, ts, batch]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionEntry {
    Item(SelectedItem),
    Tagged(String, String, String, Option<String>, Option<u32>),
    Plain(String, String, String),
}

impl From<SelectionEntry> for SelectedItem {
    fn from(entry: SelectionEntry) -> Self {
        match entry {
            SelectionEntry::Item(item) => item,
            SelectionEntry::Tagged(domain, subdomain, text, timestamp, batch) => SelectedItem {
                domain,
                subdomain,
                text,
                timestamp,
                batch,
            },
            SelectionEntry::Plain(domain, subdomain, text) => SelectedItem {
                domain,
                subdomain,
                text,
                timestamp: None,
                batch: None,
            },
        }
    }
}

/// Overlays of one anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecord {
    pub anchor: OverlayAnchor,
    pub images: Vec<Overlay>,
}

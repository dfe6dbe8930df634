//! Free-form images placed on preview pages.
//!
//! Geometry is stored in preview-canvas pixels. Overlays are bound to the
//! page (or domain) that was active when they were added and stay there
//! across repagination.

use crate::config::LayoutConfig;
use crate::paginate::{PageId, Pagination};
use crate::{Error, Result};
use image::imageops::FilterType;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What an overlay is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayAnchor {
    /// A single page of a domain.
    Page(PageId),
    /// A whole domain; drawn with the domain's first page.
    Domain(String),
}

impl OverlayAnchor {
    /// True if overlays under this anchor are drawn on `page`.
    pub fn shows_on(&self, page: &PageId) -> bool {
        match self {
            Self::Page(id) => id == page,
            Self::Domain(domain) => *domain == page.domain && page.index == 0,
        }
    }
}

impl fmt::Display for OverlayAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(id) => write!(f, "{}", id),
            Self::Domain(domain) => write!(f, "{} (domaine)", domain),
        }
    }
}

/// One image placed on a page.
#[derive(Clone, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(rename = "path")]
    pub source: PathBuf,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Decoded bitmap at the current size; rebuilt from `source` on load.
    #[serde(skip)]
    bitmap: Option<Arc<RgbaImage>>,
}

impl Overlay {
    /// An overlay record without a decoded bitmap.
    pub fn new(source: impl Into<PathBuf>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            source: source.into(),
            x,
            y,
            width,
            height,
            bitmap: None,
        }
    }

    /// Inclusive bounding-box containment.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.bitmap.is_some()
    }
}

impl PartialEq for Overlay {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("source", &self.source)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheSize {
    /// Aspect-preserving fit inside a square box, never enlarged.
    Fit(u32),
    Exact(u32, u32),
}

/// Decoded bitmaps keyed by (source, target size). No eviction.
#[derive(Default)]
struct ImageCache {
    entries: HashMap<(PathBuf, CacheSize), Arc<RgbaImage>>,
}

impl ImageCache {
    fn get(&mut self, path: &Path, size: CacheSize) -> Result<Arc<RgbaImage>> {
        let key = (path.to_path_buf(), size);
        if let Some(bitmap) = self.entries.get(&key) {
            return Ok(Arc::clone(bitmap));
        }

        let img = image::open(path).map_err(|e| Error::image(path, e))?;
        let resized = match key.1 {
            CacheSize::Fit(max) if img.width() > max || img.height() > max => {
                img.resize(max, max, FilterType::Lanczos3)
            }
            CacheSize::Fit(_) => img,
            CacheSize::Exact(w, h) => img.resize_exact(w, h, FilterType::Lanczos3),
        };
        let bitmap = Arc::new(resized.to_rgba8());
        self.entries.insert(key, Arc::clone(&bitmap));
        Ok(bitmap)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Kind of pointer interaction in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
}

/// An active drag on one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub anchor: OverlayAnchor,
    pub index: usize,
    pub kind: GestureKind,
    last: (f32, f32),
}

/// Overlays of every page, plus the decode cache.
pub struct OverlayStore {
    overlays: BTreeMap<OverlayAnchor, Vec<Overlay>>,
    cache: ImageCache,
    origin: (f32, f32),
    thumbnail_max: u32,
    min_side: f32,
    max_side: f32,
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl fmt::Debug for OverlayStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayStore")
            .field("overlays", &self.overlays)
            .finish_non_exhaustive()
    }
}

impl OverlayStore {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            overlays: BTreeMap::new(),
            cache: ImageCache::default(),
            origin: layout.image_origin,
            thumbnail_max: layout.thumbnail_max,
            min_side: layout.min_image_side,
            max_side: layout.max_image_side,
        }
    }

    /// Decode `path` as a thumbnail and place it at the default position.
    ///
    /// Returns the overlay's index under `anchor`.
    pub fn add(&mut self, anchor: OverlayAnchor, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let bitmap = self.cache.get(path, CacheSize::Fit(self.thumbnail_max))?;
        let (x, y) = self.origin;
        let overlay = Overlay {
            source: path.to_path_buf(),
            x,
            y,
            width: bitmap.width() as f32,
            height: bitmap.height() as f32,
            bitmap: Some(bitmap),
        };
        log::info!("Added image {} to {}", path.display(), anchor);
        let list = self.overlays.entry(anchor).or_default();
        list.push(overlay);
        Ok(list.len() - 1)
    }

    /// Add several images; a failing path does not stop the others.
    pub fn add_many<P: AsRef<Path>>(
        &mut self,
        anchor: &OverlayAnchor,
        paths: &[P],
    ) -> Vec<Result<usize>> {
        paths
            .iter()
            .map(|path| {
                self.add(anchor.clone(), path).map_err(|e| {
                    log::warn!("{}", e);
                    e
                })
            })
            .collect()
    }

    /// Insert a persisted record as-is, without decoding it.
    pub fn insert(&mut self, anchor: OverlayAnchor, overlay: Overlay) {
        self.overlays.entry(anchor).or_default().push(overlay);
    }

    pub fn get(&self, anchor: &OverlayAnchor) -> &[Overlay] {
        self.overlays.get(anchor).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn overlay(&self, anchor: &OverlayAnchor, index: usize) -> Result<&Overlay> {
        self.get(anchor).get(index).ok_or_else(|| Error::UnknownOverlay {
            anchor: anchor.to_string(),
            index,
        })
    }

    fn overlay_mut(&mut self, anchor: &OverlayAnchor, index: usize) -> Result<&mut Overlay> {
        self.overlays
            .get_mut(anchor)
            .and_then(|list| list.get_mut(index))
            .ok_or_else(|| Error::UnknownOverlay {
                anchor: anchor.to_string(),
                index,
            })
    }

    /// Overlays drawn on `page`: domain-anchored ones first, then the page's own.
    pub fn for_page<'a>(&'a self, page: &'a PageId) -> impl Iterator<Item = &'a Overlay> + 'a {
        self.overlays
            .iter()
            .filter(move |(anchor, _)| anchor.shows_on(page))
            .flat_map(|(_, list)| list.iter())
    }

    /// Topmost overlay under the point: last added wins.
    pub fn hit_test(&self, anchor: &OverlayAnchor, x: f32, y: f32) -> Option<usize> {
        self.get(anchor).iter().rposition(|o| o.contains(x, y))
    }

    pub fn move_by(&mut self, anchor: &OverlayAnchor, index: usize, dx: f32, dy: f32) -> Result<()> {
        let overlay = self.overlay_mut(anchor, index)?;
        overlay.x += dx;
        overlay.y += dy;
        Ok(())
    }

    /// Resize to whole pixels, each side at least the minimum.
    ///
    /// Sizes past the maximum side are rejected. The bitmap is re-decoded
    /// from the source; on failure the overlay is left unchanged.
    pub fn resize_to(
        &mut self,
        anchor: &OverlayAnchor,
        index: usize,
        width: f32,
        height: f32,
    ) -> Result<()> {
        check_size(width, height, self.max_side)?;
        let w = width.max(self.min_side).round();
        let h = height.max(self.min_side).round();
        let source = self.overlay(anchor, index)?.source.clone();
        let bitmap = self
            .cache
            .get(&source, CacheSize::Exact(w as u32, h as u32))?;

        let overlay = self.overlay_mut(anchor, index)?;
        overlay.width = w;
        overlay.height = h;
        overlay.bitmap = Some(bitmap);
        Ok(())
    }

    /// Start a move or resize if the point hits an overlay.
    pub fn begin_gesture(
        &self,
        anchor: &OverlayAnchor,
        kind: GestureKind,
        x: f32,
        y: f32,
    ) -> Option<Gesture> {
        let index = self.hit_test(anchor, x, y)?;
        Some(Gesture {
            anchor: anchor.clone(),
            index,
            kind,
            last: (x, y),
        })
    }

    /// Apply the pointer delta since the last event of `gesture`.
    pub fn update_gesture(&mut self, gesture: &mut Gesture, x: f32, y: f32) -> Result<()> {
        let (dx, dy) = (x - gesture.last.0, y - gesture.last.1);
        match gesture.kind {
            GestureKind::Move => self.move_by(&gesture.anchor, gesture.index, dx, dy)?,
            GestureKind::Resize => {
                let overlay = self.overlay(&gesture.anchor, gesture.index)?;
                let (w, h) = (overlay.width + dx, overlay.height + dy);
                self.resize_to(&gesture.anchor, gesture.index, w, h)?;
            }
        }
        gesture.last = (x, y);
        Ok(())
    }

    /// Decode every overlay at its stored size.
    ///
    /// Overlays whose source cannot be decoded keep their geometry and are
    /// returned with the error.
    pub fn rehydrate(&mut self) -> Vec<(PathBuf, Error)> {
        let mut failures = Vec::new();
        let max_side = self.max_side;
        let cache = &mut self.cache;
        for overlay in self.overlays.values_mut().flat_map(|list| list.iter_mut()) {
            if let Err(e) = check_size(overlay.width, overlay.height, max_side) {
                log::warn!("{}: {}", overlay.source.display(), e);
                overlay.bitmap = None;
                failures.push((overlay.source.clone(), e));
                continue;
            }
            let size = CacheSize::Exact(
                overlay.width.round().max(1.0) as u32,
                overlay.height.round().max(1.0) as u32,
            );
            match cache.get(&overlay.source, size) {
                Ok(bitmap) => overlay.bitmap = Some(bitmap),
                Err(e) => {
                    log::warn!("{}", e);
                    overlay.bitmap = None;
                    failures.push((overlay.source.clone(), e));
                }
            }
        }
        failures
    }

    /// All anchors with their overlays, in anchor order.
    pub fn iter(&self) -> impl Iterator<Item = (&OverlayAnchor, &[Overlay])> {
        self.overlays
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(anchor, list)| (anchor, list.as_slice()))
    }

    /// Anchors that no longer match any page of `pagination`.
    pub fn orphans<'a>(&'a self, pagination: &Pagination) -> Vec<&'a OverlayAnchor> {
        self.iter()
            .map(|(anchor, _)| anchor)
            .filter(|anchor| match anchor {
                OverlayAnchor::Page(id) => pagination.page(id).is_none(),
                OverlayAnchor::Domain(domain) => pagination.pages(domain).is_empty(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.overlays.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.overlays.clear();
        self.cache.clear();
    }
}

/// Both sides at most `max_side`; NaN fails too.
fn check_size(width: f32, height: f32, max_side: f32) -> Result<()> {
    if width <= max_side && height <= max_side {
        return Ok(());
    }
    Err(Error::Validation(format!(
        "Image size {}x{} exceeds the {} px limit",
        width, height, max_side
    )))
}

//! Single-owner controller tying the project state to pagination and navigation.
//!
//! Every mutation that can move page boundaries repaginates before returning,
//! so reads never observe a stale pagination.

use crate::catalog::Catalog;
use crate::config::LayoutConfig;
use crate::overlay::{Gesture, GestureKind, OverlayAnchor};
use crate::paginate::{PageId, Pagination, Paginator};
use crate::preview::{page_caption, PreviewRenderer, Scene};
use crate::project::ProjectState;
use crate::section::{PersonalInfo, Sections};
use crate::selection::{AddOutcome, ItemKey, Timestamp};
use crate::types::{CanvasSize, Rgb};
use crate::{Error, Result};
use std::path::Path;

pub struct Session {
    layout: LayoutConfig,
    paginator: Paginator,
    state: ProjectState,
    pagination: Pagination,
    /// Index into the flat page list; `None` when there are no pages.
    position: Option<usize>,
    gesture: Option<Gesture>,
}

impl Session {
    pub fn new(layout: LayoutConfig) -> Self {
        let state = ProjectState::new(&layout);
        Self::from_state(state, layout)
    }

    pub fn from_state(state: ProjectState, layout: LayoutConfig) -> Self {
        let mut session = Self {
            paginator: Paginator::from_layout(&layout),
            layout,
            state,
            pagination: Pagination::default(),
            position: None,
            gesture: None,
        };
        session.repaginate();
        session
    }

    /// Open a saved project. The current session is untouched on failure.
    pub fn open(path: impl AsRef<Path>, layout: LayoutConfig) -> Result<Self> {
        let state = ProjectState::load(path, &layout)?;
        Ok(Self::from_state(state, layout))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.state.save(path)
    }

    /// Replace the whole state with a saved project.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let state = ProjectState::load(path, &self.layout)?;
        self.state = state;
        self.gesture = None;
        self.position = None;
        self.repaginate();
        Ok(())
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn into_state(self) -> ProjectState {
        self.state
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn personal_mut(&mut self) -> &mut PersonalInfo {
        &mut self.state.personal
    }

    pub fn sections_mut(&mut self) -> &mut Sections {
        &mut self.state.sections
    }

    /// Load a catalog file, clearing the selection and all images.
    pub fn load_catalog(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let catalog = Catalog::load(path)?;
        self.set_catalog(catalog);
        Ok(())
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.state.catalog = catalog;
        self.state.selection.clear();
        self.state.overlays.clear();
        self.gesture = None;
        self.position = None;
        self.repaginate();
    }

    pub fn set_timestamp(&mut self, month: &str, year: &str) {
        self.state.timestamp = Timestamp::new(month.trim(), year.trim());
    }

    /// Add competencies of one catalog subdomain as a new batch.
    pub fn add_competencies<S: AsRef<str>>(
        &mut self,
        domain: &str,
        subdomain: &str,
        texts: &[S],
    ) -> Result<AddOutcome> {
        let available = self
            .state
            .catalog
            .competencies(domain, subdomain)
            .ok_or_else(|| Error::Validation("Sélectionnez un sous-domaine.".to_string()))?;
        if let Some(unknown) = texts
            .iter()
            .map(|text| text.as_ref())
            .find(|text: &&str| !available.iter().any(|a| a.as_str() == *text))
        {
            return Err(Error::Validation(format!(
                "Compétence inconnue dans {}/{}: {}",
                domain, subdomain, unknown
            )));
        }

        let outcome = self
            .state
            .selection
            .add_batch(domain, subdomain, texts, &self.state.timestamp)?;
        self.repaginate();
        Ok(outcome)
    }

    /// Remove selected items; returns how many were present.
    pub fn remove(&mut self, keys: &[ItemKey]) -> usize {
        let removed = self.state.selection.remove_many(keys);
        if removed > 0 {
            self.repaginate();
        }
        removed
    }

    /// Catalog competencies of a subdomain that are not selected yet.
    pub fn available_for(&self, domain: &str, subdomain: &str) -> Vec<&str> {
        self.state
            .catalog
            .competencies(domain, subdomain)
            .unwrap_or(&[])
            .iter()
            .filter(|text| {
                !self
                    .state
                    .selection
                    .contains(&ItemKey::new(domain, subdomain, text.as_str()))
            })
            .map(String::as_str)
            .collect()
    }

    pub fn set_domain_style(
        &mut self,
        domain: &str,
        body_font_size: Option<u32>,
        color: Option<Rgb>,
    ) -> Result<()> {
        self.state
            .catalog
            .set_domain_style(domain, body_font_size, color)
    }

    /// Rebuild pages from scratch and clamp the current position.
    pub fn repaginate(&mut self) {
        let order = self.state.catalog.domain_order();
        self.pagination = self.paginator.paginate(&order, self.state.selection.items());
        let count = self.pagination.page_count();
        self.position = match count {
            0 => None,
            n => Some(self.position.unwrap_or(0).min(n - 1)),
        };
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn current_page(&self) -> Option<&PageId> {
        self.position.and_then(|p| self.pagination.flat().get(p))
    }

    fn current_anchor(&self) -> Result<OverlayAnchor> {
        self.current_page()
            .cloned()
            .map(OverlayAnchor::Page)
            .ok_or_else(|| Error::Validation("Aucune page n'est disponible.".to_string()))
    }

    pub fn next(&mut self) -> bool {
        match self.position {
            Some(p) if p + 1 < self.pagination.page_count() => {
                self.position = Some(p + 1);
                true
            }
            _ => false,
        }
    }

    pub fn prev(&mut self) -> bool {
        match self.position {
            Some(p) if p > 0 => {
                self.position = Some(p - 1);
                true
            }
            _ => false,
        }
    }

    pub fn goto_page(&mut self, page: &PageId) -> Result<()> {
        let pos = self
            .pagination
            .flat_position(page)
            .ok_or_else(|| Error::UnknownPage(page.to_string()))?;
        self.position = Some(pos);
        Ok(())
    }

    /// Jump to the page holding a selected item.
    pub fn goto_item(&mut self, key: &ItemKey) -> Result<PageId> {
        let page = self
            .pagination
            .locate(key)
            .cloned()
            .ok_or_else(|| {
                Error::UnknownPage(format!("{}/{}/{}", key.domain, key.subdomain, key.text))
            })?;
        self.goto_page(&page)?;
        Ok(page)
    }

    pub fn caption(&self) -> String {
        page_caption(&self.pagination, self.position)
    }

    /// Add images to the page currently shown; one result per path.
    pub fn add_images<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<Result<usize>>> {
        let anchor = self.current_anchor()?;
        Ok(self.state.overlays.add_many(&anchor, paths))
    }

    pub fn move_image(&mut self, anchor: &OverlayAnchor, index: usize, dx: f32, dy: f32) -> Result<()> {
        self.state.overlays.move_by(anchor, index, dx, dy)
    }

    pub fn resize_image(
        &mut self,
        anchor: &OverlayAnchor,
        index: usize,
        width: f32,
        height: f32,
    ) -> Result<()> {
        self.state.overlays.resize_to(anchor, index, width, height)
    }

    /// Press on the current page; starts a drag if an image is hit.
    pub fn pointer_down(&mut self, kind: GestureKind, x: f32, y: f32) -> bool {
        self.gesture = self
            .current_anchor()
            .ok()
            .and_then(|anchor| self.state.overlays.begin_gesture(&anchor, kind, x, y));
        self.gesture.is_some()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<()> {
        match self.gesture.as_mut() {
            Some(gesture) => self.state.overlays.update_gesture(gesture, x, y),
            None => Ok(()),
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture = None;
    }

    /// Overlay anchors whose page no longer exists.
    pub fn orphaned_overlays(&self) -> Vec<&OverlayAnchor> {
        self.state.overlays.orphans(&self.pagination)
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.state.canvas = canvas;
    }

    /// Render the current page at the project's canvas size.
    pub fn render_preview(&self) -> Scene {
        PreviewRenderer::new(self.layout.clone()).render(
            &self.state.catalog,
            &self.pagination,
            &self.state.overlays,
            self.position,
            self.state.canvas,
        )
    }

    /// Render the cover page at the project's canvas size.
    pub fn render_cover(&self, assets: Option<&Path>) -> Scene {
        PreviewRenderer::new(self.layout.clone()).render_cover(
            &self.state.personal,
            assets,
            self.state.canvas,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    const CATALOG: &str = "##-Domaine Math\n#-Geo\nXX angles\nXX lignes\n#-Num\nXX compter\n##-Domaine Art\nXX dessiner\n";

    fn session() -> Session {
        let mut s = Session::new(LayoutConfig::new());
        s.set_catalog(Catalog::parse(CATALOG));
        s.set_timestamp("Mars", "2024");
        s
    }

    #[test]
    fn test_add_repaginates_and_positions() {
        let mut s = session();
        assert_eq!(s.position(), None);
        s.add_competencies("Math", "Geo", &["angles"]).unwrap();
        s.add_competencies("Art", "Art", &["dessiner"]).unwrap();
        assert_eq!(s.pagination().page_count(), 2);
        assert_eq!(s.current_page(), Some(&PageId::new("Math", 0)));
        assert!(s.next());
        assert!(!s.next());
        assert_eq!(s.caption(), "Page 2/2 — Domaine: Art — p.1/1");
        assert!(s.prev());
        assert!(!s.prev());
    }

    #[test]
    fn test_add_requires_timestamp_and_known_subdomain() {
        let mut s = session();
        s.set_timestamp("", "2024");
        assert!(s.add_competencies("Math", "Geo", &["angles"]).unwrap_err().is_validation());
        s.set_timestamp("Mars", "2024");
        assert!(s.add_competencies("Math", "Nope", &["angles"]).unwrap_err().is_validation());
        assert!(s.add_competencies("Math", "Geo", &["volumes"]).unwrap_err().is_validation());
        assert!(s.state().selection.is_empty());
    }

    #[test]
    fn test_available_excludes_selected() {
        let mut s = session();
        s.add_competencies("Math", "Geo", &["lignes"]).unwrap();
        assert_eq!(s.available_for("Math", "Geo"), vec!["angles"]);
        assert!(s.available_for("Math", "Missing").is_empty());
    }

    #[test]
    fn test_remove_clamps_position() {
        let mut s = session();
        s.add_competencies("Math", "Geo", &["angles"]).unwrap();
        s.add_competencies("Art", "Art", &["dessiner"]).unwrap();
        s.next();
        assert_eq!(s.remove(&[ItemKey::new("Art", "Art", "dessiner")]), 1);
        assert_eq!(s.position(), Some(0));
        s.remove(&[ItemKey::new("Math", "Geo", "angles")]);
        assert_eq!(s.position(), None);
        assert_eq!(s.caption(), "Page 0/0 — Aucune page (ajoutez des compétences)");
    }

    #[test]
    fn test_goto_item() {
        let mut s = session();
        s.add_competencies("Math", "Geo", &["angles"]).unwrap();
        s.add_competencies("Art", "Art", &["dessiner"]).unwrap();
        let page = s.goto_item(&ItemKey::new("Art", "Art", "dessiner")).unwrap();
        assert_eq!(page, PageId::new("Art", 0));
        assert_eq!(s.position(), Some(1));
        assert!(s.goto_item(&ItemKey::new("Art", "Art", "x")).is_err());
    }

    #[test]
    fn test_catalog_reload_clears_state() {
        let mut s = session();
        s.add_competencies("Math", "Geo", &["angles"]).unwrap();
        s.set_catalog(Catalog::parse(CATALOG));
        assert!(s.state().selection.is_empty());
        assert!(s.pagination().is_empty());
    }

    #[test]
    fn test_images_and_drag_on_current_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img.png");
        RgbaImage::from_pixel(100, 50, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let mut s = session();
        assert!(s.add_images(&[&path]).is_err());
        s.add_competencies("Math", "Geo", &["angles"]).unwrap();
        let results = s.add_images(&[&path]).unwrap();
        assert!(results[0].is_ok());

        assert!(s.pointer_down(GestureKind::Move, 70.0, 80.0));
        s.pointer_move(80.0, 90.0).unwrap();
        s.pointer_up();
        let anchor = OverlayAnchor::Page(PageId::new("Math", 0));
        let overlay = s.state().overlays.overlay(&anchor, 0).unwrap();
        assert_eq!((overlay.x, overlay.y), (70.0, 88.0));

        assert!(s.pointer_down(GestureKind::Resize, 75.0, 90.0));
        s.pointer_move(95.0, 100.0).unwrap();
        let overlay = s.state().overlays.overlay(&anchor, 0).unwrap();
        assert_eq!((overlay.width, overlay.height), (120.0, 60.0));

        assert!(!s.pointer_down(GestureKind::Move, 800.0, 500.0));
    }

    #[test]
    fn test_preview_uses_state_canvas() {
        let mut s = session();
        s.add_competencies("Math", "Num", &["compter"]).unwrap();
        s.set_canvas(CanvasSize::new(640.0, 480.0));
        let scene = s.render_preview();
        assert_eq!(scene.size, CanvasSize::new(640.0, 480.0));
        assert!(scene.texts().any(|t| t == "• compter"));
    }

    #[test]
    fn test_save_and_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.json");
        let mut s = session();
        s.add_competencies("Math", "Geo", &["angles", "lignes"]).unwrap();
        s.save(&path).unwrap();

        let opened = Session::open(&path, LayoutConfig::new()).unwrap();
        assert_eq!(opened.state().selection.items(), s.state().selection.items());
        assert_eq!(opened.pagination(), s.pagination());

        let mut other = session();
        other.add_competencies("Art", "Art", &["dessiner"]).unwrap();
        assert!(other.load(dir.path().join("missing.json")).is_err());
        assert_eq!(other.state().selection.len(), 1);
    }

    #[test]
    fn test_cover_preview_follows_personal_info() {
        let mut s = session();
        assert_eq!(s.render_cover(None).texts().count(), 1);
        s.personal_mut().birthdate = "01/02/2019".into();
        let scene = s.render_cover(None);
        assert_eq!(
            scene.texts().last(),
            Some("Date de naissance: 01/02/2019")
        );
    }
}

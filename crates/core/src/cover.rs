//! Cover page geometry, shared by the live cover preview and the exporter.
//!
//! Lengths are in inches on a 10 × 7.5 in page. The preview scales them
//! to canvas pixels, the exporter converts them to EMU.

use crate::types::Rgb;
use std::path::{Path, PathBuf};

pub const PAGE_WIDTH_IN: f64 = 10.0;
pub const PAGE_HEIGHT_IN: f64 = 7.5;

pub const COVER_TITLE: &str = "PROFIL DE L'ELEVE";
pub const COVER_GREY: Rgb = Rgb::new(0x6E, 0x6E, 0x6E);
pub const INFO_BOX_OLIVE: Rgb = Rgb::new(0x9B, 0xBB, 0x59);

/// File stems of the optional banner images in the assets directory.
pub const BANNER_TOP_STEM: &str = "banniere-top";
pub const BANNER_BOTTOM_STEM: &str = "banniere-bas";
const BANNER_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Point sizes of the cover texts.
pub const TITLE_SIZE: f64 = 28.0;
pub const INFO_SIZE: f64 = 14.0;

const MARGIN: f64 = 0.6;
const FALLBACK_BANNER_HEIGHT: f64 = 0.8;
const INFO_GAP: f64 = 0.15;
const INFO_HEIGHT: f64 = 1.8;
const INFO_INSET_X: f64 = 0.15;
const INFO_INSET_Y: f64 = 0.12;
const PHOTO_HEIGHT: f64 = 1.4;
const PHOTO_INSET: f64 = 0.2;
const SECTIONS_GAP: f64 = 0.2;

/// First `<stem>.png|jpg|jpeg` found in `dir`.
pub fn find_banner(dir: &Path, stem: &str) -> Option<PathBuf> {
    BANNER_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
}

/// Axis-aligned rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InchRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl InchRect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Placement of the cover's banner, info box and photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverGeometry {
    pub banner: InchRect,
    /// False when the banner is the grey title band.
    pub banner_is_image: bool,
    pub info_box: InchRect,
    /// Text frame inside the info box.
    pub info_text: InchRect,
    /// Photo frame, right-aligned in the info box.
    pub photo: Option<InchRect>,
    pub margin: f64,
}

impl CoverGeometry {
    /// Lay out the cover from the aspect ratios (width / height) of the
    /// banner image and the student photo, when present.
    pub fn new(banner_aspect: Option<f64>, photo_aspect: Option<f64>) -> Self {
        let (banner_h, banner_is_image) = match banner_aspect.filter(|a| *a > 0.0) {
            Some(aspect) => (PAGE_WIDTH_IN / aspect, true),
            None => (FALLBACK_BANNER_HEIGHT, false),
        };
        let banner = InchRect::new(0.0, 0.0, PAGE_WIDTH_IN, banner_h);
        let info_box = InchRect::new(
            MARGIN,
            banner_h + INFO_GAP,
            PAGE_WIDTH_IN - 2.0 * MARGIN,
            INFO_HEIGHT,
        );
        let info_text = InchRect::new(
            info_box.x + INFO_INSET_X,
            info_box.y + INFO_INSET_Y,
            info_box.w - 2.0 * INFO_INSET_X,
            info_box.h - 2.0 * INFO_INSET_Y,
        );
        let photo = photo_aspect.filter(|a| *a > 0.0).map(|aspect| {
            let w = PHOTO_HEIGHT * aspect;
            InchRect::new(
                info_box.x + info_box.w - PHOTO_INSET - w,
                info_box.y + PHOTO_INSET,
                w,
                PHOTO_HEIGHT,
            )
        });
        Self {
            banner,
            banner_is_image,
            info_box,
            info_text,
            photo,
            margin: MARGIN,
        }
    }

    /// Top of the per-section columns below the info box.
    pub fn sections_top(&self) -> f64 {
        self.info_box.bottom() + SECTIONS_GAP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fallback_band() {
        let geometry = CoverGeometry::new(None, None);
        assert!(!geometry.banner_is_image);
        assert_eq!(geometry.banner.h, 0.8);
        assert!((geometry.info_box.y - 0.95).abs() < 1e-9);
        assert!((geometry.info_box.w - 8.8).abs() < 1e-9);
        assert!(geometry.photo.is_none());
    }

    #[test]
    fn test_banner_and_photo() {
        let geometry = CoverGeometry::new(Some(5.0), Some(0.5));
        assert!(geometry.banner_is_image);
        assert_eq!(geometry.banner.h, 2.0);
        let photo = geometry.photo.unwrap();
        assert_eq!((photo.w, photo.h), (0.7, 1.4));
        assert!((photo.x + photo.w - (9.4 - 0.2)).abs() < 1e-9);
        assert!((geometry.sections_top() - (2.0 + 0.15 + 1.8 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_find_banner_extension_order() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_banner(dir.path(), BANNER_TOP_STEM), None);
        std::fs::write(dir.path().join("banniere-top.jpg"), b"x").unwrap();
        assert_eq!(
            find_banner(dir.path(), BANNER_TOP_STEM),
            Some(dir.path().join("banniere-top.jpg"))
        );
    }
}

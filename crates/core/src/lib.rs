//! Core model for student competency reports: catalog parsing, selection,
//! pagination, image overlays, preview rendering and project persistence.

pub mod catalog;
pub mod config;
pub mod cover;
pub mod descriptions;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod overlay;
pub mod paginate;
pub mod preview;
pub mod project;
pub mod section;
pub mod selection;
pub mod session;
pub mod svg;
pub mod types;

pub use catalog::{Catalog, Domain, Subdomain};
pub use config::LayoutConfig;
pub use cover::CoverGeometry;
pub use descriptions::Descriptions;
pub use error::{Error, Result};
pub use metrics::{wrap_text, ArialMetrics, TextMeasure};
pub use normalize::TextNormalizer;
pub use overlay::{GestureKind, Overlay, OverlayAnchor, OverlayStore};
pub use paginate::{LineEntry, Page, PageId, Pagination, Paginator};
pub use preview::{DrawOp, PreviewRenderer, Scene};
pub use project::ProjectState;
pub use section::{PersonalInfo, SectionField, SectionKey, SectionRecord, Sections};
pub use selection::{ItemKey, SelectedItem, Selection, Timestamp};
pub use session::Session;
pub use types::{CanvasSize, FontSpec, Rgb};

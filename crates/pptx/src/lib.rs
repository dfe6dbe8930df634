//! PPTX (Office Open XML) output for competency reports.
//!
//! [`ReportExporter`] lays a project out as a [`Deck`], [`PptxWriter`]
//! packages it, and [`DeckReader`] reads the outline of a written deck back.

pub mod deck;
pub mod export;
pub mod reader;
pub mod units;
pub mod writer;

pub use deck::{Deck, Frame, MediaFormat, Shape, Slide};
pub use export::{ExportOptions, ExportReport, ReportExporter, SkippedImage};
pub use reader::{DeckOutline, DeckReader, SlideOutline};
pub use writer::PptxWriter;

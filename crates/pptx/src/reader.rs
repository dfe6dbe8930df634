//! Outline reader for `.pptx` files, used to inspect exported decks.

use livret_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Texts and picture count of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideOutline {
    /// 1-based position in the deck.
    pub number: usize,
    /// One entry per text shape, paragraphs joined by `\n`, in reading
    /// order (top to bottom, then left to right).
    pub texts: Vec<String>,
    pub pictures: usize,
}

impl SlideOutline {
    /// Every paragraph of every shape, in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.texts.iter().flat_map(|t| t.lines())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.contains(needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckOutline {
    pub slides: Vec<SlideOutline>,
}

/// Reads the slide outline of a PPTX package.
#[derive(Debug, Default)]
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    pub fn open(&self, path: impl AsRef<Path>) -> Result<DeckOutline> {
        let file = File::open(path.as_ref())?;
        self.read(BufReader::new(file))
    }

    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<DeckOutline> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut outline = DeckOutline::default();
        for (index, slide_path) in self.slide_order(&mut archive)?.iter().enumerate() {
            let content = read_part(&mut archive, slide_path)?;
            let (shapes, pictures) = extract_shapes(&content)?;
            outline.slides.push(SlideOutline {
                number: index + 1,
                texts: shapes.into_iter().map(|s| s.text).collect(),
                pictures,
            });
        }
        log::debug!("Read {} slides", outline.slides.len());
        Ok(outline)
    }

    /// Slide part paths ordered by their relationship number.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels = read_part(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let rel_type = attr(e, b"Type").unwrap_or_default();
                    let target = attr(e, b"Target").unwrap_or_default();
                    let id = attr(e, b"Id").unwrap_or_default();

                    if rel_type.ends_with("/slide") {
                        let order = extract_number(&id).or_else(|| extract_number(&target));
                        let path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((path, order));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }
}

#[derive(Debug, Default)]
struct ShapeText {
    text: String,
    x: i64,
    y: i64,
}

/// Text shapes in reading order, and the number of pictures.
fn extract_shapes(xml: &str) -> Result<(Vec<ShapeText>, usize)> {
    let mut shapes = Vec::new();
    let mut pictures = 0;
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut current: Option<ShapeText> = None;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => current = Some(ShapeText::default()),
                b"pic" => pictures += 1,
                b"p" if current.is_some() => paragraphs.push(String::new()),
                b"t" => in_run_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"off" => {
                    if let Some(shape) = current.as_mut() {
                        shape.x = attr(e, b"x").and_then(|v| v.parse().ok()).unwrap_or(0);
                        shape.y = attr(e, b"y").and_then(|v| v.parse().ok()).unwrap_or(0);
                    }
                }
                b"p" if current.is_some() => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_run_text => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::XmlError(format!("Bad slide text: {}", e)))?;
                if let Some(last) = paragraphs.last_mut() {
                    last.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(mut shape) = current.take() {
                        shape.text = paragraphs.join("\n").trim().to_string();
                        if !shape.text.is_empty() {
                            shapes.push(shape);
                        }
                    }
                    paragraphs.clear();
                }
                b"t" => in_run_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
            }
            _ => {}
        }
    }

    // Stable sort keeps insertion order for shapes sharing a position.
    shapes.sort_by_key(|s| (s.y, s.x));
    Ok((shapes, pictures))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;
    Ok(content)
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Local part of a possibly prefixed XML name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Trailing number of `rId12` or `slide3.xml`.
fn extract_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml");
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    s[start..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Deck, Frame, Paragraph, Run, Slide};
    use crate::writer::PptxWriter;
    use std::io::Cursor;

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number("rId1"), Some(1));
        assert_eq!(extract_number("rId12"), Some(12));
        assert_eq!(extract_number("slides/slide123.xml"), Some(123));
        assert_eq!(extract_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_reads_back_written_deck() {
        let mut deck = Deck::new();
        for n in 0..12 {
            let mut slide = Slide::new();
            slide.add_text(
                Frame::new(0, 500, 10, 10),
                vec![Paragraph::new(Run::new(format!("bas {}", n), 12.0))],
            );
            slide.add_text(
                Frame::new(0, 100, 10, 10),
                vec![
                    Paragraph::new(Run::new(format!("haut {}", n), 12.0)),
                    Paragraph::new(Run::new("L'élève & co", 12.0)),
                ],
            );
            deck.push_slide(slide);
        }
        let mut buffer = Cursor::new(Vec::new());
        PptxWriter::new().write(&deck, &mut buffer).unwrap();
        buffer.set_position(0);

        let outline = DeckReader::new().read(buffer).unwrap();
        assert_eq!(outline.slides.len(), 12);
        let tenth = &outline.slides[10];
        assert_eq!(tenth.number, 11);
        assert_eq!(tenth.texts, vec!["haut 10\nL'élève & co", "bas 10"]);
        assert_eq!(tenth.lines().count(), 3);
        assert_eq!(tenth.pictures, 0);
    }

    #[test]
    fn test_not_a_zip() {
        let result = DeckReader::new().read(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }
}

//! Glyph-width text measurement and word wrapping.
//!
//! Preview and export must wrap text at the same points, so both measure
//! through [`TextMeasure`] instead of counting characters.

use crate::types::FontSpec;
use unicode_normalization::UnicodeNormalization;

/// Measures the rendered width of a string, in canvas pixels.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32;
}

/// Arial regular advance widths for U+0020..=U+007E, in 1/1000 em.
const ARIAL_REGULAR: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Arial bold advance widths for U+0020..=U+007E, in 1/1000 em.
const ARIAL_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Width used for characters with no table entry and no ASCII base letter.
const FALLBACK_WIDTH: u16 = 556;

/// Text measurement from Arial's advance-width tables.
///
/// Accented Latin letters are measured as their base letter, which matches
/// Arial for the French alphabet.
#[derive(Debug, Clone, Copy)]
pub struct ArialMetrics {
    /// Canvas pixels per typographic point.
    px_per_pt: f32,
}

impl Default for ArialMetrics {
    fn default() -> Self {
        // 96 dpi screen
        Self {
            px_per_pt: 96.0 / 72.0,
        }
    }
}

impl ArialMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_px_per_pt(mut self, px_per_pt: f32) -> Self {
        self.px_per_pt = px_per_pt;
        self
    }

    fn advance(c: char, bold: bool) -> u16 {
        let table = if bold { &ARIAL_BOLD } else { &ARIAL_REGULAR };
        match c {
            ' '..='~' => table[c as usize - 0x20],
            '\u{a0}' | '\u{202f}' => table[0],
            '\u{2019}' | '\u{2018}' => 222,
            '\u{2022}' => 350,
            '\u{2013}' => 556,
            '\u{2014}' => 1000,
            '\u{ab}' | '\u{bb}' => 556,
            'œ' => 944,
            'Œ' => 1000,
            'æ' => 889,
            'Æ' => 1000,
            _ => c
                .to_string()
                .nfd()
                .next()
                .filter(|base| (' '..='~').contains(base))
                .map(|base| table[base as usize - 0x20])
                .unwrap_or(FALLBACK_WIDTH),
        }
    }
}

impl TextMeasure for ArialMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| u32::from(Self::advance(c, font.bold)))
            .sum();
        units as f32 * font.size * self.px_per_pt / 1000.0
    }
}

/// Greedy word wrap at measured widths.
///
/// Words are split on whitespace; a single word wider than `max_width`
/// stays on its own line. Empty text yields no lines.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    max_width: f32,
    font: &FontSpec,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if measure.text_width(&candidate, font) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 10 px wide.
    struct FixedWidth;

    impl TextMeasure for FixedWidth {
        fn text_width(&self, text: &str, _font: &FontSpec) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    #[test]
    fn test_arial_widths() {
        let m = ArialMetrics::new().with_px_per_pt(1.0);
        let font = FontSpec::regular(1000.0);
        assert_eq!(m.text_width("a", &font), 556.0);
        assert_eq!(m.text_width("il", &font), 444.0);
        assert_eq!(m.text_width(" ", &font), 278.0);
    }

    #[test]
    fn test_bold_is_wider() {
        let m = ArialMetrics::new();
        let text = "Reconnaître les formes";
        assert!(m.text_width(text, &FontSpec::bold(12.0)) > m.text_width(text, &FontSpec::regular(12.0)));
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        let m = ArialMetrics::new();
        let font = FontSpec::regular(12.0);
        assert_eq!(m.text_width("é", &font), m.text_width("e", &font));
        assert_eq!(m.text_width("À", &font), m.text_width("A", &font));
    }

    #[test]
    fn test_scales_with_size() {
        let m = ArialMetrics::new();
        let w12 = m.text_width("Compter", &FontSpec::regular(12.0));
        let w24 = m.text_width("Compter", &FontSpec::regular(24.0));
        assert!((w24 - 2.0 * w12).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_greedy() {
        let font = FontSpec::regular(12.0);
        let lines = wrap_text(&FixedWidth, "aa bb cc dd", 50.0, &font);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn test_wrap_long_word_kept_whole() {
        let font = FontSpec::regular(12.0);
        let lines = wrap_text(&FixedWidth, "a verylongword b", 50.0, &font);
        assert_eq!(lines, vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn test_wrap_empty() {
        let font = FontSpec::regular(12.0);
        assert!(wrap_text(&FixedWidth, "   ", 50.0, &font).is_empty());
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        let font = FontSpec::regular(12.0);
        let lines = wrap_text(&FixedWidth, "a\n\nb   c", 100.0, &font);
        assert_eq!(lines, vec!["a b c"]);
    }
}

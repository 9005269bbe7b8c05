//! Page model for paginated documents.
//!
//! Coordinates are millimetres measured from the top-left corner of an A4
//! page. Text `y` is the baseline. The PDF writer converts to points.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Build a colour from `0xRRGGBB`.
    pub const fn hex(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// Horizontal anchor of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
        /// Corner radius; 0 for square corners.
        radius: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        font: Font,
        color: Rgb,
        align: Align,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<Op>,
}

impl Page {
    /// Text runs on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text { text, .. } => Some(text.as_str()),
            Op::Rect { .. } => None,
        })
    }
}

/// A multi-page document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub pages: Vec<Page>,
}

impl Document {
    /// A document with a single blank page.
    pub fn new(id: Uuid, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            created_at,
            pages: vec![Page::default()],
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append an operation to the last page.
    pub fn push(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Append an operation to every page.
    pub fn push_on_every_page(&mut self, op: Op) {
        for page in &mut self.pages {
            page.ops.push(op.clone());
        }
    }
}

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
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

fn glyph_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - 32],
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 278,
        'Á' | 'À' | 'Ä' | 'É' | 'È' | 'Ë' => 667,
        'Ó' | 'Ò' | 'Ö' => 778,
        'Ú' | 'Ù' | 'Ü' | 'Ñ' => 722,
        '¿' => 611,
        '¡' => 333,
        _ => 556,
    }
}

/// Width of `text` in millimetres at `size` points.
///
/// Bold glyphs are approximated from the regular metrics.
pub fn text_width(text: &str, size: f64, font: Font) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c))).sum();
    let scale = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.06,
    };
    f64::from(units) / 1000.0 * size * MM_PER_PT * scale
}

/// Break `text` into lines no wider than `max_width` millimetres.
///
/// Words longer than a line are split by character. Always returns at least
/// one line.
pub fn wrap_text(text: &str, max_width: f64, size: f64, font: Font) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, size, font) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for c in word.chars() {
            current.push(c);
            if text_width(&current, size, font) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colours() {
        assert_eq!(Rgb::hex(0xB28DFF), Rgb(0xB2, 0x8D, 0xFF));
        assert_eq!(Rgb::hex(0xFFFFFF), Rgb::WHITE);
    }

    #[test]
    fn width_scales_with_size() {
        let small = text_width("Promedio", 10.0, Font::Regular);
        let large = text_width("Promedio", 20.0, Font::Regular);
        assert!((large - 2.0 * small).abs() < 1e-9);
        assert!(text_width("Promedio", 10.0, Font::Bold) > small);
        assert_eq!(text_width("", 10.0, Font::Regular), 0.0);
    }

    #[test]
    fn width_of_known_string() {
        // "00" at 10pt: 2 * 556 / 1000 * 10pt
        let w = text_width("00", 10.0, Font::Regular);
        assert!((w - 11.12 * MM_PER_PT).abs() < 1e-9);
    }

    #[test]
    fn wrap_short_text_is_single_line() {
        assert_eq!(wrap_text("Finanzas", 80.0, 10.0, Font::Regular), vec!["Finanzas"]);
        assert_eq!(wrap_text("", 80.0, 10.0, Font::Regular), vec![""]);
    }

    #[test]
    fn wrap_long_text() {
        let text = "Fundamentos de Administración y Gestión de Negocios Internacionales";
        let lines = wrap_text(text, 40.0, 10.0, Font::Regular);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0, Font::Regular) <= 40.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrap_splits_long_words() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, 20.0, 10.0, Font::Regular);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn document_pages() {
        let mut doc = Document::new(Uuid::nil(), "t", Utc::now());
        assert_eq!(doc.page_count(), 1);
        doc.add_page();
        doc.push(Op::Text {
            x: 0.0,
            y: 0.0,
            text: "last".into(),
            size: 8.0,
            font: Font::Regular,
            color: Rgb::WHITE,
            align: Align::Left,
        });
        assert_eq!(doc.pages[0].texts().count(), 0);
        assert_eq!(doc.pages[1].texts().collect::<Vec<_>>(), vec!["last"]);
    }
}

//! Minimal PDF 1.4 writer.
//!
//! Uses the standard Helvetica fonts with WinAnsiEncoding, so no font data is
//! embedded. Content streams are left uncompressed.

use std::fmt::Write as _;

use crate::layout::{text_width, Align, Document, Font, Op, Rgb, MM_PER_PT, PAGE_HEIGHT, PAGE_WIDTH};

/// Stroke width for borders, in points.
const LINE_WIDTH_PT: f64 = 0.28;

/// Bezier control distance for quarter circles.
const KAPPA: f64 = 0.552_284_75;

const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_PAGE: usize = 6;

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn begin_object(&mut self, number: usize) {
        if self.offsets.len() < number {
            self.offsets.resize(number, 0);
        }
        self.offsets[number - 1] = self.buf.len();
        self.write_str(&format!("{number} 0 obj\n"));
    }

    fn object(&mut self, number: usize, body: &str) {
        self.begin_object(number);
        self.write_str(body);
        self.write_str("\nendobj\n");
    }

    fn stream(&mut self, number: usize, content: &[u8]) {
        self.begin_object(number);
        self.write_str(&format!("<< /Length {} >>\nstream\n", content.len()));
        self.buf.extend_from_slice(content);
        self.write_str("\nendstream\nendobj\n");
    }

    fn write_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn finish(mut self, trailer_extra: &str) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        self.write_str(&xref);
        self.write_str(&format!(
            "trailer\n<< /Size {count} /Root {CATALOG} 0 R /Info {INFO} 0 R {trailer_extra}>>\nstartxref\n{xref_offset}\n%%EOF\n"
        ));
        self.buf
    }
}

/// Serialize a document to PDF bytes.
pub fn to_pdf_bytes(doc: &Document) -> Vec<u8> {
    let mut w = PdfWriter::new();
    let page_objects: Vec<usize> = (0..doc.pages.len())
        .map(|i| FIRST_PAGE + 2 * i)
        .collect();

    w.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));

    let kids: Vec<String> = page_objects.iter().map(|n| format!("{n} 0 R")).collect();
    w.object(
        PAGES,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {} {}] >>",
            kids.join(" "),
            page_objects.len(),
            fmt_num(PAGE_WIDTH / MM_PER_PT),
            fmt_num(PAGE_HEIGHT / MM_PER_PT),
        ),
    );
    w.object(FONT_REGULAR, &font_dict("Helvetica"));
    w.object(FONT_BOLD, &font_dict("Helvetica-Bold"));

    let title = String::from_utf8_lossy(&encode_text(&doc.title)).into_owned();
    w.object(
        INFO,
        &format!(
            "<< /Title ({}) /Producer (gradebook) /CreationDate ({}) >>",
            title,
            doc.created_at.format("D:%Y%m%d%H%M%SZ")
        ),
    );

    for (page, &number) in doc.pages.iter().zip(&page_objects) {
        w.object(
            number,
            &format!(
                "<< /Type /Page /Parent {PAGES} 0 R /Resources << /Font << /F1 {FONT_REGULAR} 0 R /F2 {FONT_BOLD} 0 R >> >> /Contents {} 0 R >>",
                number + 1
            ),
        );
        w.stream(number + 1, &content_stream(&page.ops));
    }

    let id = doc.id.simple().to_string();
    w.finish(&format!("/ID [<{id}> <{id}>] "))
}

fn font_dict(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

fn content_stream(ops: &[Op]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("{} w\n", fmt_num(LINE_WIDTH_PT)).as_bytes());

    for op in ops {
        match op {
            Op::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
                radius,
            } => {
                let paint = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => continue,
                };
                let mut s = String::from("q\n");
                if let Some(c) = fill {
                    s.push_str(&format!("{} rg\n", colour(*c)));
                }
                if let Some(c) = stroke {
                    s.push_str(&format!("{} RG\n", colour(*c)));
                }
                if *radius > 0.0 {
                    s.push_str(&rounded_rect_path(*x, *y, *width, *height, *radius));
                } else {
                    s.push_str(&format!(
                        "{} {} {} {} re\n",
                        pt(*x),
                        pt(PAGE_HEIGHT - y - height),
                        pt(*width),
                        pt(*height)
                    ));
                }
                s.push_str(paint);
                s.push_str("\nQ\n");
                out.extend_from_slice(s.as_bytes());
            }
            Op::Text {
                x,
                y,
                text,
                size,
                font,
                color,
                align,
            } => {
                let width = text_width(text, *size, *font);
                let left = match align {
                    Align::Left => *x,
                    Align::Center => x - width / 2.0,
                    Align::Right => x - width,
                };
                let font_name = match font {
                    Font::Regular => "F1",
                    Font::Bold => "F2",
                };
                out.extend_from_slice(
                    format!(
                        "BT\n/{font_name} {} Tf\n{} rg\n{} {} Td\n(",
                        fmt_num(*size),
                        colour(*color),
                        pt(left),
                        pt(PAGE_HEIGHT - y)
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(&encode_text(text));
                out.extend_from_slice(b") Tj\nET\n");
            }
        }
    }
    out
}

/// Path for a rectangle with rounded corners; `y` is the top edge in mm.
fn rounded_rect_path(x: f64, y: f64, w: f64, h: f64, r: f64) -> String {
    let r = r.min(w / 2.0).min(h / 2.0);
    let k = r * KAPPA;
    let (left, right) = (x, x + w);
    let (top, bottom) = (PAGE_HEIGHT - y, PAGE_HEIGHT - y - h);

    let p = |mx: f64, my: f64| format!("{} {}", pt(mx), pt(my));
    let mut s = String::new();
    let _ = writeln!(s, "{} m", p(left + r, bottom));
    let _ = writeln!(s, "{} l", p(right - r, bottom));
    let _ = writeln!(
        s,
        "{} {} {} c",
        p(right - r + k, bottom),
        p(right, bottom + r - k),
        p(right, bottom + r)
    );
    let _ = writeln!(s, "{} l", p(right, top - r));
    let _ = writeln!(
        s,
        "{} {} {} c",
        p(right, top - r + k),
        p(right - r + k, top),
        p(right - r, top)
    );
    let _ = writeln!(s, "{} l", p(left + r, top));
    let _ = writeln!(
        s,
        "{} {} {} c",
        p(left + r - k, top),
        p(left, top - r + k),
        p(left, top - r)
    );
    let _ = writeln!(s, "{} l", p(left, bottom + r));
    let _ = writeln!(
        s,
        "{} {} {} c",
        p(left, bottom + r - k),
        p(left + r - k, bottom),
        p(left + r, bottom)
    );
    s.push_str("h\n");
    s
}

/// Millimetres to a formatted point value.
fn pt(mm: f64) -> String {
    fmt_num(mm / MM_PER_PT)
}

fn fmt_num(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn colour(c: Rgb) -> String {
    let channel = |v: u8| fmt_num(f64::from(v) / 255.0);
    format!("{} {} {}", channel(c.0), channel(c.1), channel(c.2))
}

/// Encode text as a WinAnsi PDF string body, escaping delimiters.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                c as u8
            }
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            _ => b'?',
        };
        if byte >= 0x80 {
            out.extend_from_slice(format!("\\{byte:03o}").as_bytes());
        } else {
            out.push(byte);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_doc(pages: usize) -> Document {
        let mut doc = Document::new(Uuid::nil(), "Reporte Académico", Utc::now());
        for i in 0..pages {
            if i > 0 {
                doc.add_page();
            }
            doc.push(Op::Rect {
                x: 14.0,
                y: 40.0,
                width: 182.0,
                height: 30.0,
                fill: Some(Rgb::hex(0xf3f3f3)),
                stroke: Some(Rgb::hex(0xD4AF37)),
                radius: 3.0,
            });
            doc.push(Op::Text {
                x: 105.0,
                y: 290.0,
                text: format!("Page (draft) {}", i + 1),
                size: 8.0,
                font: Font::Regular,
                color: Rgb(150, 150, 150),
                align: Align::Center,
            });
        }
        doc
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn header_and_trailer() {
        let bytes = to_pdf_bytes(&sample_doc(1));
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(find(&bytes, b"/Count 1").is_some());
        assert!(find(&bytes, b"/BaseFont /Helvetica-Bold").is_some());
        assert!(find(&bytes, b"/ID [<00000000000000000000000000000000>").is_some());
    }

    #[test]
    fn one_content_stream_per_page() {
        let bytes = to_pdf_bytes(&sample_doc(3));
        assert!(find(&bytes, b"/Count 3").is_some());
        assert!(find(&bytes, b"/Kids [6 0 R 8 0 R 10 0 R]").is_some());
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("endstream").count(), 3);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = to_pdf_bytes(&sample_doc(2));
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let startxref = text.rfind("startxref\n").unwrap() + "startxref\n".len();
        let end = text[startxref..].find('\n').unwrap() + startxref;
        let xref_offset: usize = text[startxref..end].parse().unwrap();
        assert!(bytes[xref_offset..].starts_with(b"xref\n"));

        let table = String::from_utf8_lossy(&bytes[xref_offset..]).into_owned();
        let entries: Vec<&str> = table.lines().skip(3).take(9).collect();
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", i + 1);
            assert!(
                bytes[offset..].starts_with(expected.as_bytes()),
                "object {} not at offset {offset}",
                i + 1
            );
        }
    }

    #[test]
    fn text_is_escaped_and_encoded() {
        assert_eq!(encode_text("a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
        assert_eq!(encode_text("Créditos"), b"Cr\\351ditos".to_vec());
        assert_eq!(encode_text("¿sí?"), b"\\277s\\355?".to_vec());
        assert_eq!(encode_text("日"), b"?".to_vec());
    }

    #[test]
    fn escaped_text_in_stream() {
        let bytes = to_pdf_bytes(&sample_doc(1));
        assert!(find(&bytes, b"(Page \\(draft\\) 1) Tj").is_some());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(1.234), "1.23");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(pt(25.4), "72");
    }

    #[test]
    fn colours_are_normalised() {
        assert_eq!(colour(Rgb::WHITE), "1 1 1");
        assert_eq!(colour(Rgb(0, 0, 0)), "0 0 0");
    }
}

//! Academic report layout.
//!
//! Walks a report model top to bottom with a vertical cursor, starting new
//! pages whenever the next block would cross the bottom margin.

use gradebook_core::config::GradebookConfig;
use gradebook_core::report::{AcademicReport, SemesterSection, SubjectRow, COLUMNS};
use gradebook_core::statistics::{format_average, Stats};

use crate::layout::{wrap_text, Align, Document, Font, Op, Rgb, MM_PER_PT, PAGE_WIDTH};

const LILAC: Rgb = Rgb::hex(0xB28DFF);
const LILAC_DARK: Rgb = Rgb::hex(0x8C66D6);
const GOLD: Rgb = Rgb::hex(0xD4AF37);
const GOLD_DARK: Rgb = Rgb::hex(0xAA8C2C);
const TEXT: Rgb = Rgb::hex(0x333333);
const LIGHT_GRAY: Rgb = Rgb::hex(0xF3F3F3);
const BODY_TEXT: Rgb = Rgb(20, 20, 20);
const SUMMARY_GRAY: Rgb = Rgb(100, 100, 100);
const FOOTER_GRAY: Rgb = Rgb(150, 150, 150);
const GRID: Rgb = Rgb(200, 200, 200);

pub const BANNER_TITLE: &str = "Reporte Académico";
pub const SUMMARY_TITLE: &str = "Resumen Final de Carrera";

const MARGIN_X: f64 = 14.0;
const TABLE_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN_X;
const COLUMN_WIDTHS: [f64; 4] = [82.0, 30.0, 40.0, 30.0];
const BANNER_HEIGHT: f64 = 25.0;
const FIRST_CURSOR: f64 = 35.0;
/// Cursor after a page break outside a table.
const TOP_MARGIN: f64 = 20.0;
/// Cursor after a page break inside a table.
const TABLE_TOP_MARGIN: f64 = 10.0;
/// Lowest y any table row may reach.
const PAGE_BOTTOM: f64 = 283.0;
const FOOTER_Y: f64 = 290.0;
const SUMMARY_X: f64 = 150.0;

const TABLE_FONT_SIZE: f64 = 10.0;
const CELL_PADDING: f64 = 1.76;
const LINE_HEIGHT: f64 = TABLE_FONT_SIZE * 1.15 * MM_PER_PT;

/// Summary box is moved to a fresh page when the cursor is past this line.
const SUMMARY_BREAK: f64 = 250.0;
const SUMMARY_HEIGHT: f64 = 30.0;

struct Layout<'a> {
    doc: Document,
    y: f64,
    config: &'a GradebookConfig,
}

/// Lay out a report as pages of drawing operations.
pub fn layout_report(report: &AcademicReport, config: &GradebookConfig) -> Document {
    let mut layout = Layout {
        doc: Document::new(report.id, report.title(), report.created_at),
        y: FIRST_CURSOR,
        config,
    };

    layout.banner();
    layout.section_title(&report.title());
    for section in &report.sections {
        layout.semester(section);
    }
    if let Some(summary) = &report.summary {
        layout.summary(summary);
    }
    layout.footer();

    layout.doc
}

impl Layout<'_> {
    fn text(&mut self, x: f64, text: impl Into<String>, size: f64, font: Font, color: Rgb, align: Align) {
        self.text_at(x, self.y, text, size, font, color, align);
    }

    #[allow(clippy::too_many_arguments)]
    fn text_at(
        &mut self,
        x: f64,
        y: f64,
        text: impl Into<String>,
        size: f64,
        font: Font,
        color: Rgb,
        align: Align,
    ) {
        self.doc.push(Op::Text {
            x,
            y,
            text: text.into(),
            size,
            font,
            color,
            align,
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Option<Rgb>, stroke: Option<Rgb>) {
        self.doc.push(Op::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            radius: 0.0,
        });
    }

    fn new_page(&mut self, cursor: f64) {
        self.doc.add_page();
        self.y = cursor;
    }

    fn banner(&mut self) {
        self.rect(0.0, 0.0, PAGE_WIDTH, BANNER_HEIGHT, Some(LILAC), None);
        self.text_at(MARGIN_X, 16.0, BANNER_TITLE, 22.0, Font::Bold, Rgb::WHITE, Align::Left);
        let owner = self.config.owner_line();
        self.text_at(MARGIN_X, 23.0, owner, 14.0, Font::Regular, Rgb::WHITE, Align::Left);
    }

    fn section_title(&mut self, title: &str) {
        self.text(MARGIN_X, title, 18.0, Font::Bold, GOLD_DARK, Align::Left);
        self.y += 10.0;
    }

    fn semester(&mut self, section: &SemesterSection) {
        // Header, table head and one body row must fit together.
        let first_row = section
            .rows
            .first()
            .map(row_height)
            .unwrap_or(0.0);
        if self.y + 2.0 + head_height() + first_row > PAGE_BOTTOM {
            self.new_page(TOP_MARGIN);
        }

        self.text(MARGIN_X, section.name.as_str(), 14.0, Font::Bold, LILAC_DARK, Align::Left);
        self.text(
            SUMMARY_X,
            section.summary_line(),
            10.0,
            Font::Regular,
            SUMMARY_GRAY,
            Align::Right,
        );
        self.y += 2.0;

        self.table(&section.rows);
        self.y += 15.0;
    }

    fn table(&mut self, rows: &[SubjectRow]) {
        self.head_row();
        for (i, row) in rows.iter().enumerate() {
            let height = row_height(row);
            if self.y + height > PAGE_BOTTOM {
                self.new_page(TABLE_TOP_MARGIN);
                self.head_row();
            }
            let fill = if i % 2 == 1 { Some(LIGHT_GRAY) } else { None };
            self.row(&row.cells(), height, Font::Regular, BODY_TEXT, fill);
        }
    }

    fn head_row(&mut self) {
        let height = head_height();
        self.row(&COLUMNS, height, Font::Bold, Rgb::WHITE, Some(GOLD));
    }

    fn row(&mut self, cells: &[&str; 4], height: f64, font: Font, color: Rgb, fill: Option<Rgb>) {
        let top = self.y;
        let mut x = MARGIN_X;
        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            self.rect(x, top, width, height, fill, Some(GRID));
            let lines = wrap_text(cell, width - 2.0 * CELL_PADDING, TABLE_FONT_SIZE, font);
            for (n, line) in lines.into_iter().enumerate() {
                let baseline = top + CELL_PADDING + LINE_HEIGHT * (n as f64 + 0.8);
                self.text_at(x + CELL_PADDING, baseline, line, TABLE_FONT_SIZE, font, color, Align::Left);
            }
            x += width;
        }
        self.y = top + height;
    }

    fn summary(&mut self, stats: &Stats) {
        if self.y > SUMMARY_BREAK {
            self.new_page(TOP_MARGIN);
        } else {
            self.y += 5.0;
        }

        let top = self.y;
        self.doc.push(Op::Rect {
            x: MARGIN_X,
            y: top,
            width: TABLE_WIDTH,
            height: SUMMARY_HEIGHT,
            fill: Some(LIGHT_GRAY),
            stroke: Some(GOLD),
            radius: 3.0,
        });
        self.text_at(20.0, top + 10.0, SUMMARY_TITLE, 16.0, Font::Bold, GOLD_DARK, Align::Left);
        self.text_at(
            20.0,
            top + 20.0,
            format!("Total Créditos Cursados: {}", stats.total_credits),
            12.0,
            Font::Regular,
            TEXT,
            Align::Left,
        );
        self.text_at(
            190.0,
            top + 20.0,
            format!(
                "Promedio Ponderado Acumulado: {}",
                format_average(stats.weighted_average)
            ),
            14.0,
            Font::Bold,
            LILAC_DARK,
            Align::Right,
        );
        self.y = top + SUMMARY_HEIGHT;
    }

    fn footer(&mut self) {
        self.doc.push_on_every_page(Op::Text {
            x: PAGE_WIDTH / 2.0,
            y: FOOTER_Y,
            text: self.config.footer_line(),
            size: 8.0,
            font: Font::Regular,
            color: FOOTER_GRAY,
            align: Align::Center,
        });
    }
}

fn head_height() -> f64 {
    let lines = COLUMNS
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(c, w)| wrap_text(c, w - 2.0 * CELL_PADDING, TABLE_FONT_SIZE, Font::Bold).len())
        .max()
        .unwrap_or(1);
    lines as f64 * LINE_HEIGHT + 2.0 * CELL_PADDING
}

fn row_height(row: &SubjectRow) -> f64 {
    let lines = row
        .cells()
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(c, w)| wrap_text(c, w - 2.0 * CELL_PADDING, TABLE_FONT_SIZE, Font::Regular).len())
        .max()
        .unwrap_or(1);
    lines as f64 * LINE_HEIGHT + 2.0 * CELL_PADDING
}

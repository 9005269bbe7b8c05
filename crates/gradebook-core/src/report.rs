//! Report model: what an exported report shows, independent of the renderer.
//!
//! Cells are preformatted here so every renderer applies the same
//! placeholder conventions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Semester, Subject};
use crate::statistics::{self, format_average, Stats};

/// Cell shown for an unset or zero number.
pub const EMPTY_CELL: &str = "-";
/// Cell shown for a subject without a name.
pub const UNNAMED_SUBJECT: &str = "Sin nombre";
/// File name of the complete history export.
pub const HISTORY_FILE_NAME: &str = "Historial_Academico_Completo.pdf";
/// Section title of the complete history export.
pub const HISTORY_TITLE: &str = "Historial Académico Completo";

/// Which part of the grade book a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportScope {
    /// One semester, identified by its name at export time.
    Semester { name: String },
    /// Every semester plus the cumulative summary.
    History,
}

/// A complete report snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub scope: ReportScope,
    /// One section per semester, in display order.
    pub sections: Vec<SemesterSection>,
    /// Cumulative statistics, present for history reports only.
    pub summary: Option<Stats>,
}

/// One semester's header and table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemesterSection {
    pub name: String,
    pub stats: Stats,
    pub rows: Vec<SubjectRow>,
}

/// One table row, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRow {
    pub name: String,
    pub credits: String,
    pub grade: String,
    pub points: String,
}

impl SubjectRow {
    pub fn from_subject(subject: &Subject) -> Self {
        let name = if subject.name.is_empty() {
            UNNAMED_SUBJECT.to_string()
        } else {
            subject.name.clone()
        };
        let grade = subject.grade.contribution();
        let credits = subject.credits.contribution();
        Self {
            name,
            credits: number_cell(credits),
            grade: number_cell(grade),
            points: number_cell(grade * credits),
        }
    }

    /// Cells in column order.
    pub fn cells(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.credits.as_str(),
            self.grade.as_str(),
            self.points.as_str(),
        ]
    }
}

/// Column headings shared by every renderer.
pub const COLUMNS: [&str; 4] = ["Materia", "Créditos", "Nota (0-500)", "Puntos"];

/// Characters that cannot appear in a file name on common platforms.
const RESERVED_IN_FILE_NAME: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Turn a semester name into a single path component.
///
/// Every run of whitespace, control or path-reserved characters becomes one
/// underscore.
fn sanitize_file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_whitespace() || c.is_control() || RESERVED_IN_FILE_NAME.contains(&c) {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn number_cell(value: f64) -> String {
    if value == 0.0 {
        EMPTY_CELL.to_string()
    } else {
        value.to_string()
    }
}

impl SemesterSection {
    pub fn from_semester(semester: &Semester) -> Self {
        Self {
            name: semester.name.clone(),
            stats: statistics::semester_stats(semester),
            rows: semester.subjects.iter().map(SubjectRow::from_subject).collect(),
        }
    }

    /// Inline summary printed next to the semester name.
    pub fn summary_line(&self) -> String {
        format!(
            "Promedio: {} | Créditos: {}",
            format_average(self.stats.weighted_average),
            self.stats.total_credits
        )
    }
}

impl AcademicReport {
    /// Report for a single semester.
    pub fn for_semester(semester: &Semester) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scope: ReportScope::Semester {
                name: semester.name.clone(),
            },
            sections: vec![SemesterSection::from_semester(semester)],
            summary: None,
        }
    }

    /// Report over every semester with the cumulative summary.
    pub fn for_history(semesters: &[Semester]) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scope: ReportScope::History,
            sections: semesters.iter().map(SemesterSection::from_semester).collect(),
            summary: Some(statistics::global_stats(semesters)),
        }
    }

    /// Section title shown under the banner.
    pub fn title(&self) -> String {
        match &self.scope {
            ReportScope::Semester { name } => format!("Reporte: {name}"),
            ReportScope::History => HISTORY_TITLE.to_string(),
        }
    }

    /// Deterministic artifact file name.
    pub fn file_name(&self) -> String {
        match &self.scope {
            ReportScope::Semester { name } => format!("Notas_{}.pdf", sanitize_file_stem(name)),
            ReportScope::History => HISTORY_FILE_NAME.to_string(),
        }
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.title()));

        for section in &self.sections {
            md.push_str(&format!("### {}\n\n", section.name));
            md.push_str(&format!("{}\n\n", section.summary_line()));
            md.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
            md.push_str("|---------|----------|--------------|--------|\n");
            for row in &section.rows {
                md.push_str(&format!("| {} |\n", row.cells().join(" | ")));
            }
            md.push('\n');
        }

        if let Some(summary) = &self.summary {
            md.push_str(&format!(
                "**Total Créditos Cursados:** {}\n\n**Promedio Ponderado Acumulado:** {}\n",
                summary.total_credits,
                format_average(summary.weighted_average)
            ));
        }

        md
    }
}

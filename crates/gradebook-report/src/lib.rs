//! gradebook-report: Paginated PDF report export.
//!
//! Turns an [`AcademicReport`] into a laid-out [`layout::Document`] and writes
//! it as a PDF file named after the report scope.

pub mod layout;
pub mod pdf;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use gradebook_core::config::GradebookConfig;
use gradebook_core::report::AcademicReport;

pub use render::layout_report;

/// Render a report to PDF bytes.
pub fn generate_pdf(report: &AcademicReport, config: &GradebookConfig) -> Vec<u8> {
    pdf::to_pdf_bytes(&layout_report(report, config))
}

/// Write a report into `dir` under its deterministic file name.
///
/// Returns the path of the written file.
pub fn write_pdf_report(
    report: &AcademicReport,
    config: &GradebookConfig,
    dir: &Path,
) -> Result<PathBuf> {
    let doc = layout_report(report, config);
    let bytes = pdf::to_pdf_bytes(&doc);

    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }
    let path = dir.join(report.file_name());
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write report to {}", path.display()))?;

    info!(
        path = %path.display(),
        pages = doc.page_count(),
        "report exported"
    );
    Ok(path)
}

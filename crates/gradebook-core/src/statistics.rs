//! Weighted-average aggregation.
//!
//! The same computation runs at semester scope and at global scope. Global
//! statistics are computed over the concatenation of every semester's
//! subjects, never as an average of semester averages.

use serde::{Deserialize, Serialize};

use crate::model::{Semester, Subject};

/// Totals derived from a list of subjects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Sum of credits of contributing subjects.
    pub total_credits: u32,
    /// Sum of grade × credits of contributing subjects.
    pub total_points: f64,
    /// `total_points / total_credits`, or 0 when there are no credits.
    pub weighted_average: f64,
}

/// Aggregate any sequence of subjects.
///
/// A subject contributes only when both its grade and credits are positive.
pub fn aggregate<'a, I>(subjects: I) -> Stats
where
    I: IntoIterator<Item = &'a Subject>,
{
    let mut total_credits = 0u32;
    let mut total_points = 0.0f64;

    for subject in subjects {
        if !subject.contributes() {
            continue;
        }
        if let Some(&credits) = subject.credits.value() {
            total_credits += u32::from(credits);
        }
        total_points += subject.points();
    }

    let weighted_average = if total_credits > 0 {
        total_points / f64::from(total_credits)
    } else {
        0.0
    };

    Stats {
        total_credits,
        total_points,
        weighted_average,
    }
}

/// Statistics for a single semester.
pub fn semester_stats(semester: &Semester) -> Stats {
    aggregate(&semester.subjects)
}

/// Cumulative statistics across every semester.
pub fn global_stats(semesters: &[Semester]) -> Stats {
    aggregate(semesters.iter().flat_map(|s| s.subjects.iter()))
}

/// Format an average with exactly two decimals, rounding halves away from zero.
///
/// The value is scaled by 100 before rounding, so a binary value stored just
/// below a half (`1.555`) still rounds up to `1.56`.
pub fn format_average(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded:.2}")
}

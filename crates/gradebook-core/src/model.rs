//! Core data model types for gradebook.
//!
//! A [`GradeBook`](crate::store::GradeBook) owns semesters, each semester owns
//! its subjects. Grades and credits are [`Entry`] values so an empty input
//! field is represented explicitly instead of as a magic number.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest grade on the 0–500 scale.
pub const MAX_GRADE: f64 = 500.0;

/// A numeric field that may not have been filled in yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry<T> {
    /// A number was entered.
    Value(T),
    /// The field is empty.
    #[default]
    Unset,
}

/// A grade on the 0–500 scale.
pub type Grade = Entry<f64>;

/// Credits for a subject (a single digit).
pub type Credits = Entry<u8>;

impl<T: Copy + Into<f64>> Entry<T> {
    /// The value this entry contributes to aggregation.
    ///
    /// Unset, non-positive, and non-finite values contribute nothing.
    pub fn contribution(&self) -> f64 {
        match *self {
            Entry::Value(v) => {
                let v: f64 = v.into();
                if v.is_finite() && v > 0.0 {
                    v
                } else {
                    0.0
                }
            }
            Entry::Unset => 0.0,
        }
    }
}

impl<T> Entry<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Entry::Unset)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Entry::Value(v) => Some(v),
            Entry::Unset => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Value(v) => write!(f, "{v}"),
            Entry::Unset => Ok(()),
        }
    }
}

/// A single course taken during a semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique identifier, stable for the subject's lifetime.
    pub id: Uuid,
    /// Course name. May be empty while the user is still typing.
    #[serde(default)]
    pub name: String,
    /// Grade on the 0–500 scale.
    #[serde(default)]
    pub grade: Grade,
    /// Credit count.
    #[serde(default)]
    pub credits: Credits,
}

impl Subject {
    /// A blank subject, as created by "add subject".
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            grade: Entry::Unset,
            credits: Entry::Unset,
        }
    }

    /// Whether this subject counts toward credit and average totals.
    pub fn contributes(&self) -> bool {
        self.grade.contribution() > 0.0 && self.credits.contribution() > 0.0
    }

    /// Grade multiplied by credits, with unset fields counting as zero.
    pub fn points(&self) -> f64 {
        self.grade.contribution() * self.credits.contribution()
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::new()
    }
}

/// A named group of subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    /// Unique identifier, stable for the semester's lifetime.
    pub id: Uuid,
    /// Display name, e.g. "Semestre 2".
    pub name: String,
    /// Subjects in insertion order.
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Semester {
    /// An empty semester with the default numbered name.
    pub fn numbered(n: usize) -> Self {
        Self::named(default_semester_name(n))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            subjects: Vec::new(),
        }
    }

    pub fn subject(&self, id: Uuid) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }
}

/// Name given to the `n`-th semester when it is created.
pub fn default_semester_name(n: usize) -> String {
    format!("Semestre {n}")
}

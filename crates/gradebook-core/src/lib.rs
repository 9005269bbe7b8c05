//! gradebook-core: Grade model, aggregation, and session state.
//!
//! This crate defines the semester/subject data model, the weighted-average
//! aggregation, field validation, the session's grade book, and the
//! renderer-independent report model that the rest of gradebook builds on.

pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod statistics;
pub mod store;
pub mod traits;
pub mod validation;

pub use config::GradebookConfig;
pub use error::StoreError;
pub use model::{Credits, Entry, Grade, Semester, Subject};
pub use report::AcademicReport;
pub use statistics::Stats;
pub use store::{GradeBook, Removal};
pub use traits::Confirm;
pub use validation::{Field, SubjectUpdate};

//! Store error types.
//!
//! Rejected field input is not an error (see [`crate::validation`]); these
//! only cover references to entities that do not exist in the store.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`GradeBook`](crate::store::GradeBook) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No semester with this id exists.
    #[error("semester not found: {0}")]
    SemesterNotFound(Uuid),

    /// The semester exists but holds no subject with this id.
    #[error("subject {subject} not found in semester {semester}")]
    SubjectNotFound { semester: Uuid, subject: Uuid },
}

//! The session's grade book: an owned tree of semesters and subjects.
//!
//! Every mutation either applies completely or returns a [`StoreError`]
//! before touching state. Updates replace entities in place and never
//! reorder them.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Semester, Subject};
use crate::statistics::{self, Stats};
use crate::traits::Confirm;
use crate::validation::SubjectUpdate;

/// Question asked before a semester and its subjects are deleted.
pub const REMOVE_SEMESTER_PROMPT: &str =
    "¿Estás segura de que quieres eliminar este semestre y todas sus materias?";

/// Outcome of a confirmation-gated removal.
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// The user approved; the removed semester is returned.
    Removed(Semester),
    /// The user declined; nothing changed.
    Cancelled,
}

/// All semesters recorded during a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeBook {
    semesters: Vec<Semester>,
}

impl GradeBook {
    /// An empty grade book.
    pub fn new() -> Self {
        Self::default()
    }

    /// The state a new session starts in: one empty "Semestre 1".
    pub fn with_first_semester() -> Self {
        let mut book = Self::new();
        book.add_semester();
        book
    }

    /// Current semesters in display order.
    pub fn semesters(&self) -> &[Semester] {
        &self.semesters
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> Vec<Semester> {
        self.semesters.clone()
    }

    /// The current semesters as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.semesters)
    }

    pub fn len(&self) -> usize {
        self.semesters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty()
    }

    pub fn semester(&self, id: Uuid) -> Result<&Semester, StoreError> {
        self.semesters
            .iter()
            .find(|s| s.id == id)
            .ok_or(StoreError::SemesterNotFound(id))
    }

    fn semester_mut(&mut self, id: Uuid) -> Result<&mut Semester, StoreError> {
        self.semesters
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::SemesterNotFound(id))
    }

    fn subject_mut(
        &mut self,
        semester_id: Uuid,
        subject_id: Uuid,
    ) -> Result<&mut Subject, StoreError> {
        self.semester_mut(semester_id)?
            .subjects
            .iter_mut()
            .find(|s| s.id == subject_id)
            .ok_or(StoreError::SubjectNotFound {
                semester: semester_id,
                subject: subject_id,
            })
    }

    /// Append an empty semester named after its position.
    pub fn add_semester(&mut self) -> Uuid {
        let semester = Semester::numbered(self.semesters.len() + 1);
        let id = semester.id;
        debug!(%id, name = %semester.name, "semester added");
        self.semesters.push(semester);
        id
    }

    /// Remove a semester and all of its subjects, if `confirm` approves.
    pub fn remove_semester(
        &mut self,
        id: Uuid,
        confirm: &mut impl Confirm,
    ) -> Result<Removal, StoreError> {
        let index = self
            .semesters
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::SemesterNotFound(id))?;

        if !confirm.confirm(REMOVE_SEMESTER_PROMPT) {
            debug!(%id, "semester removal cancelled");
            return Ok(Removal::Cancelled);
        }

        let removed = self.semesters.remove(index);
        debug!(%id, subjects = removed.subjects.len(), "semester removed");
        Ok(Removal::Removed(removed))
    }

    pub fn update_semester_name(
        &mut self,
        id: Uuid,
        name: impl Into<String>,
    ) -> Result<(), StoreError> {
        let semester = self.semester_mut(id)?;
        semester.name = name.into();
        debug!(%id, name = %semester.name, "semester renamed");
        Ok(())
    }

    /// Append a blank subject to a semester.
    pub fn add_subject(&mut self, semester_id: Uuid) -> Result<Uuid, StoreError> {
        let semester = self.semester_mut(semester_id)?;
        let subject = Subject::new();
        let id = subject.id;
        semester.subjects.push(subject);
        debug!(semester = %semester_id, subject = %id, "subject added");
        Ok(id)
    }

    /// Set one field of a subject. The value must already be validated.
    pub fn update_subject(
        &mut self,
        semester_id: Uuid,
        subject_id: Uuid,
        update: SubjectUpdate,
    ) -> Result<(), StoreError> {
        let subject = self.subject_mut(semester_id, subject_id)?;
        debug!(subject = %subject_id, field = %update.field(), "subject updated");
        match update {
            SubjectUpdate::Name(name) => subject.name = name,
            SubjectUpdate::Grade(grade) => subject.grade = grade,
            SubjectUpdate::Credits(credits) => subject.credits = credits,
        }
        Ok(())
    }

    pub fn remove_subject(
        &mut self,
        semester_id: Uuid,
        subject_id: Uuid,
    ) -> Result<Subject, StoreError> {
        let semester = self.semester_mut(semester_id)?;
        let index = semester
            .subjects
            .iter()
            .position(|s| s.id == subject_id)
            .ok_or(StoreError::SubjectNotFound {
                semester: semester_id,
                subject: subject_id,
            })?;
        let removed = semester.subjects.remove(index);
        debug!(semester = %semester_id, subject = %subject_id, "subject removed");
        Ok(removed)
    }

    /// Statistics for one semester.
    pub fn semester_stats(&self, id: Uuid) -> Result<Stats, StoreError> {
        self.semester(id).map(statistics::semester_stats)
    }

    /// Cumulative statistics across all semesters.
    pub fn global_stats(&self) -> Stats {
        statistics::global_stats(&self.semesters)
    }
}

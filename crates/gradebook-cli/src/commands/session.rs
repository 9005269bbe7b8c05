//! The `gradebook session` command: a line-oriented view over one grade book.
//!
//! Semesters and subjects are addressed by their 1-based position as shown by
//! `show`. State lives only for the duration of the session.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tracing::{info, warn};
use uuid::Uuid;

use gradebook_core::config::{load_config_from, GradebookConfig};
use gradebook_core::report::{AcademicReport, SubjectRow};
use gradebook_core::statistics::{format_average, semester_stats};
use gradebook_core::traits::Confirm;
use gradebook_core::validation::{parse_field, Field};
use gradebook_core::{GradeBook, Removal, Semester};
use gradebook_report::write_pdf_report;

const HELP: &str = "\
Commands (indices are 1-based, as listed by `show`):
  show                                  list semesters, subjects and averages
  preview [<s>]                         print a report as markdown (all semesters if omitted)
  json                                  print the current state as JSON
  add-semester                          append a new semester
  rename-semester <s> <name>            rename a semester
  remove-semester <s>                   remove a semester and its subjects (asks first)
  add-subject <s>                       append a blank subject
  set <s> <m> <name|grade|credits> [v]  set one field; an empty value clears it
  remove-subject <s> <m>                remove a subject
  export <s>                            write Notas_<name>.pdf
  export-all                            write Historial_Academico_Completo.pdf
  help                                  show this help
  quit                                  end the session";

pub fn execute(config_path: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(dir) = output {
        config.output_dir = dir;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(config, stdin.lock(), stdout.lock());
    session.run()
}

/// Asks for confirmation on the session's own input stream.
struct LineConfirm<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<'_, R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.out, "{prompt} [s/N] ").and_then(|_| self.out.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(
                answer.trim().to_lowercase().as_str(),
                "s" | "si" | "sí" | "y" | "yes"
            ),
        }
    }
}

pub struct Session<R, W> {
    book: GradeBook,
    config: GradebookConfig,
    input: R,
    out: W,
}

/// A semester resolved from user input, detached from the book borrow.
struct SemesterRef {
    id: Uuid,
    name: String,
}

/// Outcome of one command line.
enum Flow {
    Continue,
    Quit,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(config: GradebookConfig, input: R, out: W) -> Self {
        Self {
            book: GradeBook::with_first_semester(),
            config,
            input,
            out,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        info!(output_dir = %self.config.output_dir.display(), "session started");
        writeln!(self.out, "gradebook session. Type `help` for commands.")?;

        let mut line = String::new();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            line.clear();
            if self.input.read_line(&mut line).context("failed to read input")? == 0 {
                writeln!(self.out)?;
                break;
            }
            if let Flow::Quit = self.dispatch(line.trim_end_matches(['\n', '\r']))? {
                break;
            }
        }

        info!(semesters = self.book.len(), "session ended");
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let (command, rest) = split_first(line);
        match command {
            "" => {}
            "help" => writeln!(self.out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            "show" => self.show()?,
            "preview" => self.preview(rest)?,
            "json" => {
                let json = self.book.to_json()?;
                writeln!(self.out, "{json}")?;
            }
            "add-semester" => {
                let id = self.book.add_semester();
                let name = self.book.semester(id)?.name.clone();
                writeln!(self.out, "Added {name} (#{})", self.book.len())?;
            }
            "rename-semester" => self.rename_semester(rest)?,
            "remove-semester" => self.remove_semester(rest)?,
            "add-subject" => self.add_subject(rest)?,
            "set" => self.set(rest)?,
            "remove-subject" => self.remove_subject(rest)?,
            "export" => self.export(rest)?,
            "export-all" => {
                let report = AcademicReport::for_history(self.book.semesters());
                self.write_report(&report)?;
            }
            other => writeln!(self.out, "Unknown command: {other}. Type `help` for commands.")?,
        }
        Ok(Flow::Continue)
    }

    /// Resolve a 1-based semester index, reporting bad input to the user.
    fn semester_at(&mut self, arg: &str) -> Result<Option<SemesterRef>> {
        let arg = arg.trim();
        match parse_index(arg).and_then(|i| self.book.semesters().get(i)) {
            Some(sem) => Ok(Some(SemesterRef {
                id: sem.id,
                name: sem.name.clone(),
            })),
            None => {
                writeln!(self.out, "No semester #{arg}")?;
                Ok(None)
            }
        }
    }

    fn subject_at(&mut self, sem: &SemesterRef, arg: &str) -> Result<Option<Uuid>> {
        let arg = arg.trim();
        let semester = self.book.semester(sem.id)?;
        match parse_index(arg).and_then(|i| semester.subjects.get(i)) {
            Some(subject) => Ok(Some(subject.id)),
            None => {
                writeln!(self.out, "No subject #{arg} in {}", sem.name)?;
                Ok(None)
            }
        }
    }

    fn show(&mut self) -> Result<()> {
        for (i, semester) in self.book.semesters().iter().enumerate() {
            writeln!(self.out, "{}", semester_table(i + 1, semester))?;
        }
        let global = self.book.global_stats();
        writeln!(
            self.out,
            "Total créditos: {} | Promedio Ponderado Final: {}",
            global.total_credits,
            format_average(global.weighted_average)
        )?;
        Ok(())
    }

    fn preview(&mut self, rest: &str) -> Result<()> {
        let report = if rest.trim().is_empty() {
            AcademicReport::for_history(self.book.semesters())
        } else {
            let Some(sem) = self.semester_at(rest)? else {
                return Ok(());
            };
            AcademicReport::for_semester(self.book.semester(sem.id)?)
        };
        writeln!(self.out, "{}", report.to_markdown())?;
        Ok(())
    }

    fn rename_semester(&mut self, rest: &str) -> Result<()> {
        let (index, name) = split_first(rest);
        let Some(sem) = self.semester_at(index)? else {
            return Ok(());
        };
        self.book.update_semester_name(sem.id, name.trim())?;
        writeln!(self.out, "Renamed {} to {}", sem.name, name.trim())?;
        Ok(())
    }

    fn remove_semester(&mut self, rest: &str) -> Result<()> {
        let Some(sem) = self.semester_at(rest)? else {
            return Ok(());
        };
        let mut confirm = LineConfirm {
            input: &mut self.input,
            out: &mut self.out,
        };
        let outcome = self.book.remove_semester(sem.id, &mut confirm)?;
        match outcome {
            Removal::Removed(removed) => writeln!(
                self.out,
                "Removed {} ({} subjects)",
                removed.name,
                removed.subjects.len()
            )?,
            Removal::Cancelled => writeln!(self.out, "Cancelled")?,
        }
        Ok(())
    }

    fn add_subject(&mut self, rest: &str) -> Result<()> {
        let Some(sem) = self.semester_at(rest)? else {
            return Ok(());
        };
        self.book.add_subject(sem.id)?;
        let count = self.book.semester(sem.id)?.subjects.len();
        writeln!(self.out, "Added subject #{count} to {}", sem.name)?;
        Ok(())
    }

    fn set(&mut self, rest: &str) -> Result<()> {
        let (sem_arg, rest) = split_first(rest);
        let (sub_arg, rest) = split_first(rest);
        let (field_arg, raw) = split_first(rest);

        let field: Field = match field_arg.parse() {
            Ok(field) => field,
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(());
            }
        };
        let Some(sem) = self.semester_at(sem_arg)? else {
            return Ok(());
        };
        let Some(subject_id) = self.subject_at(&sem, sub_arg)? else {
            return Ok(());
        };

        let raw = if field == Field::Name {
            raw.trim_start()
        } else {
            raw.trim()
        };
        match parse_field(field, raw) {
            Some(update) => {
                self.book.update_subject(sem.id, subject_id, update)?;
            }
            None => {
                warn!(%field, input = raw, "input rejected");
                write!(self.out, "Rejected, ")?;
            }
        }

        let semester = self.book.semester(sem.id)?;
        let current = match semester.subject(subject_id) {
            Some(subject) => match field {
                Field::Name => subject.name.clone(),
                Field::Grade => subject.grade.to_string(),
                Field::Credits => subject.credits.to_string(),
            },
            None => String::new(),
        };
        let stats = semester_stats(semester);
        writeln!(
            self.out,
            "{field} = {current:?} | {}: Promedio {} | Créditos {}",
            sem.name,
            format_average(stats.weighted_average),
            stats.total_credits
        )?;
        Ok(())
    }

    fn remove_subject(&mut self, rest: &str) -> Result<()> {
        let (sem_arg, sub_arg) = split_first(rest);
        let Some(sem) = self.semester_at(sem_arg)? else {
            return Ok(());
        };
        let Some(subject_id) = self.subject_at(&sem, sub_arg)? else {
            return Ok(());
        };
        let removed = self.book.remove_subject(sem.id, subject_id)?;
        let row = SubjectRow::from_subject(&removed);
        writeln!(self.out, "Removed {} from {}", row.name, sem.name)?;
        Ok(())
    }

    fn export(&mut self, rest: &str) -> Result<()> {
        let Some(sem) = self.semester_at(rest)? else {
            return Ok(());
        };
        let report = AcademicReport::for_semester(self.book.semester(sem.id)?);
        self.write_report(&report)
    }

    /// Export failures are reported and the session continues.
    fn write_report(&mut self, report: &AcademicReport) -> Result<()> {
        match write_pdf_report(report, &self.config, &self.config.output_dir) {
            Ok(path) => writeln!(self.out, "Report saved to: {}", path.display())?,
            Err(e) => writeln!(self.out, "Error: {e:#}")?,
        }
        Ok(())
    }
}

fn semester_table(position: usize, semester: &Semester) -> String {
    let stats = semester_stats(semester);
    let mut table = Table::new();
    table.set_header(vec!["#", "Materia", "Nota", "Créditos", "Puntos"]);

    for (i, subject) in semester.subjects.iter().enumerate() {
        let row = SubjectRow::from_subject(subject);
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&subject.name),
            Cell::new(subject.grade.to_string()),
            Cell::new(subject.credits.to_string()),
            Cell::new(row.points),
        ]);
    }

    format!(
        "[{position}] {}\n{table}\nTotal créditos: {} | Promedio semestral: {} / 500\n",
        semester.name,
        stats.total_credits,
        format_average(stats.weighted_average)
    )
}

/// Split off the first whitespace-delimited word.
fn split_first(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], &s[pos..]),
        None => (s, ""),
    }
}

/// Parse a 1-based index into a 0-based one.
fn parse_index(arg: &str) -> Option<usize> {
    arg.trim().parse::<usize>().ok()?.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(script: &str, config: GradebookConfig) -> (GradeBook, String) {
        let mut session = Session::new(config, Cursor::new(script.as_bytes()), Vec::new());
        session.run().unwrap();
        let out = String::from_utf8(session.out).unwrap();
        (session.book, out)
    }

    fn run_default(script: &str) -> (GradeBook, String) {
        run(script, GradebookConfig::default())
    }

    #[test]
    fn starts_with_one_semester() {
        let (book, _) = run_default("quit\n");
        assert_eq!(book.len(), 1);
        assert_eq!(book.semesters()[0].name, "Semestre 1");
    }

    #[test]
    fn eof_ends_session() {
        let (book, out) = run_default("add-semester\n");
        assert_eq!(book.len(), 2);
        assert!(out.contains("Added Semestre 2 (#2)"));
    }

    #[test]
    fn set_fields_updates_averages() {
        let script = "add-subject 1\nset 1 1 name Finanzas\nset 1 1 grade 400\nset 1 1 credits 3\n\
                      add-subject 1\nset 1 2 grade 500\nset 1 2 credits 1\nshow\n";
        let (book, out) = run_default(script);
        let subject = &book.semesters()[0].subjects[0];
        assert_eq!(subject.name, "Finanzas");
        assert_eq!(book.global_stats().total_credits, 4);
        assert!(out.contains("Promedio Ponderado Final: 425.00"));
        assert!(out.contains("Semestre 1: Promedio 425.00 | Créditos 4"));
    }

    #[test]
    fn rejected_input_keeps_previous_value() {
        let script = "add-subject 1\nset 1 1 credits 3\nset 1 1 credits 10\nset 1 1 grade 501\n";
        let (book, out) = run_default(script);
        let subject = &book.semesters()[0].subjects[0];
        assert_eq!(subject.credits, gradebook_core::Entry::Value(3));
        assert!(subject.grade.is_unset());
        assert!(out.contains("Rejected, credits = \"3\""));
        assert!(out.contains("Rejected, grade = \"\""));
    }

    #[test]
    fn empty_value_clears_field() {
        let script = "add-subject 1\nset 1 1 grade 350\nset 1 1 grade\n";
        let (book, _) = run_default(script);
        assert!(book.semesters()[0].subjects[0].grade.is_unset());
    }

    #[test]
    fn names_keep_inner_spacing() {
        let (book, _) = run_default("add-subject 1\nset 1 1 name Cálculo  Integral\n");
        assert_eq!(book.semesters()[0].subjects[0].name, "Cálculo  Integral");
    }

    #[test]
    fn remove_semester_asks_first() {
        let (book, out) = run_default("add-semester\nremove-semester 2\nno\n");
        assert_eq!(book.len(), 2);
        assert!(out.contains("[s/N]"));
        assert!(out.contains("Cancelled"));

        let (book, out) = run_default("add-semester\nremove-semester 1\nsí\n");
        assert_eq!(book.len(), 1);
        assert_eq!(book.semesters()[0].name, "Semestre 2");
        assert!(out.contains("Removed Semestre 1 (0 subjects)"));
    }

    #[test]
    fn remove_semester_at_eof_cancels() {
        let (book, out) = run_default("remove-semester 1\n");
        assert_eq!(book.len(), 1);
        assert!(out.contains("Cancelled"));
    }

    #[test]
    fn remaining_semester_can_be_removed() {
        let (book, _) = run_default("remove-semester 1\ns\nshow\n");
        assert!(book.is_empty());
    }

    #[test]
    fn bad_indices_are_reported() {
        let (book, out) = run_default("add-subject 7\nset 1 4 grade 300\nremove-subject 0 1\nfrobnicate\n");
        assert_eq!(book.semesters()[0].subjects.len(), 0);
        assert!(out.contains("No semester #7"));
        assert!(out.contains("No subject #4 in Semestre 1"));
        assert!(out.contains("No semester #0"));
        assert!(out.contains("Unknown command: frobnicate"));
    }

    #[test]
    fn rename_and_remove_subject() {
        let script = "rename-semester 1 2024 I\nadd-subject 1\nset 1 1 name Química\nremove-subject 1 1\n";
        let (book, out) = run_default(script);
        assert_eq!(book.semesters()[0].name, "2024 I");
        assert!(book.semesters()[0].subjects.is_empty());
        assert!(out.contains("Removed Química from 2024 I"));
    }

    #[test]
    fn json_prints_snapshot() {
        let (_, out) = run_default("add-subject 1\nset 1 1 grade 420\njson\n");
        let start = out.find('[').unwrap();
        let end = out.rfind(']').unwrap();
        let value: serde_json::Value = serde_json::from_str(&out[start..=end]).unwrap();
        assert_eq!(value[0]["name"], "Semestre 1");
        assert_eq!(value[0]["subjects"][0]["grade"], 420.0);
    }

    #[test]
    fn preview_renders_markdown() {
        let (_, out) = run_default("add-subject 1\nset 1 1 name Finanzas\npreview 1\npreview\n");
        assert!(out.contains("## Reporte: Semestre 1"));
        assert!(out.contains("## Historial Académico Completo"));
        assert!(out.contains("| Finanzas | - | - | - |"));
    }

    #[test]
    fn exports_write_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        let config = GradebookConfig {
            output_dir: dir.path().to_path_buf(),
            ..GradebookConfig::default()
        };
        let (_, out) = run("export 1\nexport-all\n", config);
        assert!(dir.path().join("Notas_Semestre_1.pdf").exists());
        assert!(dir.path().join("Historial_Academico_Completo.pdf").exists());
        assert!(out.contains("Report saved to:"));
    }

    #[test]
    fn export_failure_keeps_session_alive() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let config = GradebookConfig {
            output_dir: blocker.join("nested"),
            ..GradebookConfig::default()
        };
        let (book, out) = run("export 1\nadd-semester\n", config);
        assert!(out.contains("Error: failed to create output directory"));
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn split_first_word() {
        assert_eq!(split_first("  set 1 2"), ("set", " 1 2"));
        assert_eq!(split_first("show"), ("show", ""));
        assert_eq!(split_first(""), ("", ""));
    }

    #[test]
    fn indices_are_one_based() {
        assert_eq!(parse_index("1"), Some(0));
        assert_eq!(parse_index("0"), None);
        assert_eq!(parse_index("x"), None);
    }
}

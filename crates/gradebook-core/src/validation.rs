//! Field-level input guards.
//!
//! Raw text typed into a subject field is checked here before the store is
//! touched. A rejected edit yields `None` and the field keeps its previous
//! value; rejections are never reported as errors.

use std::fmt;
use std::str::FromStr;

use crate::model::{Credits, Entry, Grade, MAX_GRADE};

/// Longest accepted credits input, in characters.
pub const MAX_CREDITS_LEN: usize = 1;
/// Longest accepted grade input, in characters.
pub const MAX_GRADE_LEN: usize = 3;

/// An editable subject field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Grade,
    Credits,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Grade => write!(f, "grade"),
            Field::Credits => write!(f, "credits"),
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "nombre" | "materia" => Ok(Field::Name),
            "grade" | "nota" => Ok(Field::Grade),
            "credits" | "creditos" | "créditos" => Ok(Field::Credits),
            other => Err(format!("unknown field: {other}")),
        }
    }
}

/// A single-field change to a subject, already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectUpdate {
    Name(String),
    Grade(Grade),
    Credits(Credits),
}

impl SubjectUpdate {
    pub fn field(&self) -> Field {
        match self {
            SubjectUpdate::Name(_) => Field::Name,
            SubjectUpdate::Grade(_) => Field::Grade,
            SubjectUpdate::Credits(_) => Field::Credits,
        }
    }
}

/// Validate raw input for `field`.
///
/// Returns `None` when the input must be ignored.
pub fn parse_field(field: Field, raw: &str) -> Option<SubjectUpdate> {
    match field {
        Field::Name => Some(SubjectUpdate::Name(raw.to_string())),
        Field::Grade => parse_grade(raw).map(SubjectUpdate::Grade),
        Field::Credits => parse_credits(raw).map(SubjectUpdate::Credits),
    }
}

/// Validate a grade: at most three characters, within 0–500.
///
/// Fractional grades such as `4.5` are accepted.
pub fn parse_grade(raw: &str) -> Option<Grade> {
    if raw.chars().count() > MAX_GRADE_LEN {
        return None;
    }
    if raw.is_empty() {
        return Some(Entry::Unset);
    }
    let value = parse_number(raw)?;
    if !(0.0..=MAX_GRADE).contains(&value) {
        return None;
    }
    Some(Entry::Value(value))
}

/// Validate credits: a single non-negative digit.
///
/// Only the length guard bounds the value, so any of 0–9 is accepted.
pub fn parse_credits(raw: &str) -> Option<Credits> {
    if raw.chars().count() > MAX_CREDITS_LEN {
        return None;
    }
    if raw.is_empty() {
        return Some(Entry::Unset);
    }
    let value = parse_number(raw)?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u8::MAX) {
        return None;
    }
    Some(Entry::Value(value as u8))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_parse() {
        assert_eq!("grade".parse::<Field>().unwrap(), Field::Grade);
        assert_eq!("Nota".parse::<Field>().unwrap(), Field::Grade);
        assert_eq!("créditos".parse::<Field>().unwrap(), Field::Credits);
        assert_eq!("name".parse::<Field>().unwrap(), Field::Name);
        assert!("weight".parse::<Field>().is_err());
        assert_eq!(Field::Credits.to_string(), "credits");
    }

    #[test]
    fn grade_bounds() {
        assert_eq!(parse_grade("500"), Some(Entry::Value(500.0)));
        assert_eq!(parse_grade("0"), Some(Entry::Value(0.0)));
        assert_eq!(parse_grade("501"), None);
        assert_eq!(parse_grade("-1"), None);
    }

    #[test]
    fn grade_length_guard() {
        assert_eq!(parse_grade("4500"), None);
        assert_eq!(parse_grade("450.5"), None);
        assert_eq!(parse_grade("4.5"), Some(Entry::Value(4.5)));
    }

    #[test]
    fn grade_rejects_non_numeric() {
        assert_eq!(parse_grade("abc"), None);
        assert_eq!(parse_grade("NaN"), None);
        assert_eq!(parse_grade("inf"), None);
        assert_eq!(parse_grade("4a"), None);
    }

    #[test]
    fn empty_input_unsets() {
        assert_eq!(parse_grade(""), Some(Entry::Unset));
        assert_eq!(parse_credits(""), Some(Entry::Unset));
    }

    #[test]
    fn credits_single_digit_only() {
        assert_eq!(parse_credits("3"), Some(Entry::Value(3)));
        assert_eq!(parse_credits("9"), Some(Entry::Value(9)));
        assert_eq!(parse_credits("0"), Some(Entry::Value(0)));
        assert_eq!(parse_credits("10"), None);
        assert_eq!(parse_credits("-1"), None);
        assert_eq!(parse_credits("x"), None);
        assert_eq!(parse_credits("."), None);
    }

    #[test]
    fn name_is_accepted_verbatim() {
        assert_eq!(
            parse_field(Field::Name, "  Finanzas  "),
            Some(SubjectUpdate::Name("  Finanzas  ".into()))
        );
        assert_eq!(
            parse_field(Field::Name, ""),
            Some(SubjectUpdate::Name(String::new()))
        );
    }

    #[test]
    fn parse_field_dispatches() {
        let update = parse_field(Field::Credits, "4").unwrap();
        assert_eq!(update.field(), Field::Credits);
        assert_eq!(update, SubjectUpdate::Credits(Entry::Value(4)));
        assert!(parse_field(Field::Grade, "999").is_none());
    }
}

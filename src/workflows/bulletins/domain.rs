use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a student across every source: lower-cased capitalised names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StudentKey {
    pub first_name: String,
    pub last_name: String,
}

impl StudentKey {
    /// Builds the key from raw spreadsheet cells. Returns `None` when the row
    /// cannot identify a student (empty last name).
    pub fn from_raw(first_name: &str, last_name: &str) -> Option<Self> {
        let first_name = capitalize_name(first_name);
        let last_name = capitalize_name(last_name);
        if last_name.is_empty() {
            return None;
        }

        Some(Self {
            first_name: first_name.to_lowercase(),
            last_name: last_name.to_lowercase(),
        })
    }
}

impl fmt::Display for StudentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentChoice {
    Paes,
    Linova,
    Unspecified,
}

impl EnrollmentChoice {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paes => "PAES",
            Self::Linova => "Linova",
            Self::Unspecified => "Non renseigné",
        }
    }
}

/// One student as assembled from the grade and identity sources.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Raw score per canonical subject. A present key with `None` means the
    /// student appears in that subject's source without a usable score.
    pub scores: BTreeMap<String, Option<f64>>,
    pub enrollment_choice: EnrollmentChoice,
    pub identity_matched: bool,
}

impl StudentRecord {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: capitalize_name(first_name),
            last_name: capitalize_name(last_name),
            email: None,
            birth_date: None,
            scores: BTreeMap::new(),
            enrollment_choice: EnrollmentChoice::Unspecified,
            identity_matched: false,
        }
    }

    pub fn key(&self) -> StudentKey {
        StudentKey {
            first_name: self.first_name.to_lowercase(),
            last_name: self.last_name.to_lowercase(),
        }
    }

    pub fn raw_score(&self, subject_key: &str) -> Option<f64> {
        self.scores.get(subject_key).copied().flatten()
    }

    /// A record is incomplete when no identity row matched it or the matched
    /// row carried no birth date.
    pub fn is_incomplete(&self) -> bool {
        !self.identity_matched || self.birth_date.is_none()
    }

    pub fn slug(&self) -> String {
        student_slug(&self.first_name, &self.last_name)
    }
}

/// A subject line of one report layout. `score_key` names the canonical
/// subject whose adjusted score the line displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSpec {
    pub display_name: String,
    pub teacher_name: String,
    pub score_key: String,
}

impl SubjectSpec {
    pub fn new(display_name: &str, teacher_name: &str, score_key: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            teacher_name: teacher_name.to_string(),
            score_key: score_key.to_string(),
        }
    }
}

/// Canonical subject fed by one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSubject {
    pub key: &'static str,
    pub source_file: &'static str,
}

/// Capitalises every whitespace- and hyphen-separated token and collapses
/// runs of whitespace.
pub fn capitalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            word.split('-')
                .map(capitalize_token)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_token(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// File-system safe slug `first_last`: diacritics stripped, punctuation
/// dropped, whitespace and hyphen runs turned into single underscores.
pub fn student_slug(first_name: &str, last_name: &str) -> String {
    [first_name, last_name]
        .iter()
        .map(|part| sanitize_component(part))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn sanitize_component(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace() || *ch == '-' || *ch == '_')
        .collect();
    slug::slugify(kept).replace('-', "_")
}

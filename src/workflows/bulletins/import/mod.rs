mod normalizer;
mod parser;

pub use parser::{IdentityRow, ParseError, ParsedRows, SubjectRow};

use super::domain::CanonicalSubject;
use parser::{IDENTITY_OPTIONAL_COLUMNS, NAME_COLUMNS, SUBJECT_OPTIONAL_COLUMNS};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },
}

/// Rows of one canonical subject's export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSource {
    pub subject_key: String,
    pub rows: Vec<SubjectRow>,
}

pub fn read_subject_rows<R: Read>(reader: R) -> Result<ParsedRows<SubjectRow>, ParseError> {
    parser::parse_rows(reader, &NAME_COLUMNS, &SUBJECT_OPTIONAL_COLUMNS)
}

pub fn read_identity_rows<R: Read>(reader: R) -> Result<ParsedRows<IdentityRow>, ParseError> {
    parser::parse_rows(reader, &NAME_COLUMNS, &IDENTITY_OPTIONAL_COLUMNS)
}

/// Reads every canonical subject's export in declared order. A missing file
/// or a file without name columns contributes an empty source.
pub fn load_subject_sources(
    data_dir: &Path,
    subjects: &[CanonicalSubject],
) -> Result<Vec<SubjectSource>, ImportError> {
    let mut sources = Vec::with_capacity(subjects.len());

    for subject in subjects {
        let path = data_dir.join(subject.source_file);
        let rows = match open_optional(&path)? {
            Some(file) => match read_subject_rows(file) {
                Ok(parsed) => {
                    if !parsed.missing_optional.is_empty() {
                        warn!(
                            subject = subject.key,
                            path = %path.display(),
                            missing = ?parsed.missing_optional,
                            "grade source has no score column, every score will use the fallback"
                        );
                    }
                    parsed.rows
                }
                Err(ParseError::MissingColumns(missing)) => {
                    warn!(
                        subject = subject.key,
                        path = %path.display(),
                        missing = ?missing,
                        "grade source lacks name columns, skipping it"
                    );
                    Vec::new()
                }
                Err(source) => return Err(ImportError::Parse { path, source }),
            },
            None => {
                warn!(
                    subject = subject.key,
                    path = %path.display(),
                    "grade source not found, subject contributes no scores"
                );
                Vec::new()
            }
        };

        info!(subject = subject.key, rows = rows.len(), "grade source loaded");
        sources.push(SubjectSource {
            subject_key: subject.key.to_string(),
            rows,
        });
    }

    Ok(sources)
}

/// Reads the identity export. Absence or missing name columns downgrade to
/// a warning and an empty table.
pub fn load_identity_rows(path: &Path) -> Result<Vec<IdentityRow>, ImportError> {
    let Some(file) = open_optional(path)? else {
        warn!(path = %path.display(), "identity source not found, every record stays incomplete");
        return Ok(Vec::new());
    };

    match read_identity_rows(file) {
        Ok(parsed) => {
            if !parsed.missing_optional.is_empty() {
                warn!(
                    path = %path.display(),
                    missing = ?parsed.missing_optional,
                    "identity source lacks optional columns, affected fields stay empty"
                );
            }
            info!(rows = parsed.rows.len(), "identity source loaded");
            Ok(parsed.rows)
        }
        Err(ParseError::MissingColumns(missing)) => {
            warn!(
                path = %path.display(),
                missing = ?missing,
                "identity source lacks required columns, skipping it"
            );
            Ok(Vec::new())
        }
        Err(source) => Err(ImportError::Parse {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn open_optional(path: &Path) -> Result<Option<File>, ImportError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ImportError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::bulletins::test_support::capture_warnings;
    use std::fs;

    fn subjects() -> Vec<CanonicalSubject> {
        vec![
            CanonicalSubject {
                key: "Maths",
                source_file: "maths.csv",
            },
            CanonicalSubject {
                key: "SVT",
                source_file: "svt.csv",
            },
        ]
    }

    #[test]
    fn missing_subject_file_yields_empty_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("maths.csv"), "Nom,Prénom,Note\nDupont,Jean,12\n")
            .expect("write fixture");

        let sources = load_subject_sources(dir.path(), &subjects()).expect("sources load");
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].subject_key, "Maths");
        assert_eq!(sources[0].rows.len(), 1);
        assert_eq!(sources[1].subject_key, "SVT");
        assert!(sources[1].rows.is_empty());
    }

    #[test]
    fn subject_file_without_names_is_skipped() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("maths.csv"), "Note\n12\n").expect("write fixture");

        let sources = load_subject_sources(dir.path(), &subjects()).expect("sources load");
        assert!(sources[0].rows.is_empty());
    }

    #[test]
    fn identity_without_required_columns_is_skipped() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("identite.csv");
        fs::write(&path, "Prénom,Date de naissance\nJean,01/02/2007\n").expect("write fixture");

        let rows = load_identity_rows(&path).expect("missing columns are not fatal");
        assert!(rows.is_empty());
    }

    #[test]
    fn identity_without_date_or_choice_columns_warns() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("identite.csv");
        fs::write(&path, "Nom,Prénom,Email\nDupont,Jean,jean@x.com\n").expect("write fixture");

        let (rows, logs) = capture_warnings(|| load_identity_rows(&path));
        let rows = rows.expect("optional columns are not required");
        assert_eq!(rows.len(), 1);
        assert!(logs.contains("identity source lacks optional columns"));
        assert!(logs.contains("birth_date"));
        assert!(logs.contains("choice"));
    }

    #[test]
    fn complete_identity_file_loads_quietly() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("identite.csv");
        fs::write(
            &path,
            "Nom,Prénom,Date de naissance,Choix\nDupont,Jean,01/02/2007,PAES\n",
        )
        .expect("write fixture");

        let (rows, logs) = capture_warnings(|| load_identity_rows(&path));
        assert_eq!(rows.expect("loads").len(), 1);
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn subject_file_without_score_column_warns() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("maths.csv"), "Nom,Prénom\nDupont,Jean\n").expect("write fixture");

        let (sources, logs) = capture_warnings(|| load_subject_sources(dir.path(), &subjects()));
        let sources = sources.expect("sources load");
        assert_eq!(sources[0].rows.len(), 1);
        assert!(logs.contains("no score column"));
    }

    #[test]
    fn missing_identity_file_is_not_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let rows = load_identity_rows(&dir.path().join("absent.csv")).expect("not fatal");
        assert!(rows.is_empty());
    }
}

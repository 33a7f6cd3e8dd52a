use super::domain::{StudentKey, StudentRecord};
use super::grading::parse_score;
use super::import::SubjectSource;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Students keyed by identity, iterated in key order.
pub type StudentRoster = BTreeMap<StudentKey, StudentRecord>;

/// Folds single-subject sources into one record per student.
#[derive(Debug, Default)]
pub struct RecordMerger;

impl RecordMerger {
    pub fn merge(sources: &[SubjectSource]) -> StudentRoster {
        let mut roster = StudentRoster::new();
        let mut skipped = 0usize;

        for source in sources {
            for row in &source.rows {
                let Some(key) = StudentKey::from_raw(&row.first_name, &row.last_name) else {
                    skipped += 1;
                    continue;
                };

                let record = roster
                    .entry(key)
                    .or_insert_with(|| StudentRecord::new(&row.first_name, &row.last_name));

                fill_if_empty(&mut record.email, row.email.as_deref());

                let score = row.score.as_deref().and_then(parse_score);
                if row.score.is_some() && score.is_none() {
                    warn!(
                        student = %record.key(),
                        subject = %source.subject_key,
                        "score cell is not numeric, adjusted value will use the fallback"
                    );
                }

                let entry = record.scores.entry(source.subject_key.clone()).or_insert(None);
                if entry.is_none() {
                    *entry = score;
                }
            }
        }

        info!(
            students = roster.len(),
            sources = sources.len(),
            skipped_rows = skipped,
            "grade sources merged"
        );
        roster
    }
}

/// First non-empty value wins.
pub(crate) fn fill_if_empty(slot: &mut Option<String>, candidate: Option<&str>) {
    if slot.is_some() {
        return;
    }
    if let Some(value) = candidate.map(str::trim).filter(|value| !value.is_empty()) {
        *slot = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::bulletins::import::SubjectRow;
    use crate::workflows::bulletins::test_support::capture_warnings;

    fn row(first: &str, last: &str, email: Option<&str>, score: Option<&str>) -> SubjectRow {
        SubjectRow {
            last_name: last.to_string(),
            first_name: first.to_string(),
            email: email.map(str::to_string),
            score: score.map(str::to_string),
        }
    }

    fn source(key: &str, rows: Vec<SubjectRow>) -> SubjectSource {
        SubjectSource {
            subject_key: key.to_string(),
            rows,
        }
    }

    #[test]
    fn merges_subjects_by_normalized_name() {
        let roster = RecordMerger::merge(&[
            source("Maths", vec![row("jean", "DUPONT", None, Some("12 / 20"))]),
            source("SVT", vec![row(" Jean ", "dupont", None, Some("15"))]),
        ]);

        assert_eq!(roster.len(), 1);
        let record = roster.values().next().expect("one record");
        assert_eq!(record.first_name, "Jean");
        assert_eq!(record.last_name, "Dupont");
        assert_eq!(record.raw_score("Maths"), Some(12.0));
        assert_eq!(record.raw_score("SVT"), Some(15.0));
    }

    #[test]
    fn email_fill_is_order_independent() {
        let empty_first = RecordMerger::merge(&[
            source("Maths", vec![row("Lina", "Martin", Some(""), None)]),
            source("SVT", vec![row("Lina", "Martin", Some("a@x.com"), None)]),
        ]);
        let filled_first = RecordMerger::merge(&[
            source("SVT", vec![row("Lina", "Martin", Some("a@x.com"), None)]),
            source("Maths", vec![row("Lina", "Martin", Some(""), None)]),
        ]);

        let a = empty_first.values().next().expect("record");
        let b = filled_first.values().next().expect("record");
        assert_eq!(a.email.as_deref(), Some("a@x.com"));
        assert_eq!(b.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn rows_without_last_name_are_skipped() {
        let roster = RecordMerger::merge(&[source(
            "Maths",
            vec![
                row("Jean", "", None, Some("12")),
                row("", "", None, None),
                row("", "Solo", None, Some("9")),
            ],
        )]);

        assert_eq!(roster.len(), 1);
        let key = StudentKey::from_raw("", "Solo").expect("key");
        assert_eq!(roster[&key].raw_score("Maths"), Some(9.0));
    }

    #[test]
    fn non_numeric_cell_is_reported_as_a_warning() {
        let (roster, logs) = capture_warnings(|| {
            RecordMerger::merge(&[source(
                "Maths",
                vec![
                    row("Jean", "Dupont", None, Some("abs")),
                    row("Lina", "Martin", None, None),
                ],
            )])
        });

        assert_eq!(roster.len(), 2);
        assert_eq!(logs.matches("score cell is not numeric").count(), 1);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("jean dupont"));
        assert!(logs.contains("Maths"));
    }

    #[test]
    fn absent_subject_has_no_entry_and_bad_cell_is_absent() {
        let roster = RecordMerger::merge(&[
            source("Maths", vec![row("Jean", "Dupont", None, Some("abs"))]),
            source("SVT", vec![row("Lina", "Martin", None, Some("11"))]),
        ]);

        let jean = &roster[&StudentKey::from_raw("Jean", "Dupont").expect("key")];
        assert!(jean.scores.contains_key("Maths"));
        assert_eq!(jean.raw_score("Maths"), None);
        assert!(!jean.scores.contains_key("SVT"));
    }
}

use super::domain::{CanonicalSubject, StudentRecord};
use super::grading::GradeTransform;
use super::merge::StudentRoster;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A student whose adjusted scores have been fixed for the run. Built only
/// by [`precompute_adjusted_scores`]; nothing downstream can recompute them.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedStudent {
    record: StudentRecord,
    adjusted: BTreeMap<String, f64>,
}

impl GradedStudent {
    pub fn record(&self) -> &StudentRecord {
        &self.record
    }

    pub fn adjusted_score(&self, score_key: &str) -> Option<f64> {
        self.adjusted.get(score_key).copied()
    }

    pub fn adjusted_scores(&self) -> &BTreeMap<String, f64> {
        &self.adjusted
    }
}

#[cfg(test)]
pub(crate) fn graded_for_tests(record: StudentRecord, adjusted: &[(&str, f64)]) -> GradedStudent {
    GradedStudent {
        record,
        adjusted: adjusted
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect(),
    }
}

/// Adjusts every (student, canonical subject) pair exactly once from one
/// stream seeded with `seed`. Draw order is subject-major in the declared
/// subject order, then student key order.
pub fn precompute_adjusted_scores(
    roster: StudentRoster,
    subjects: &[CanonicalSubject],
    seed: u64,
) -> Vec<GradedStudent> {
    let mut transform = GradeTransform::seeded(seed);
    let mut students: Vec<GradedStudent> = roster
        .into_values()
        .map(|record| GradedStudent {
            record,
            adjusted: BTreeMap::new(),
        })
        .collect();

    let mut fallbacks = 0usize;
    for subject in subjects {
        for student in &mut students {
            let raw = student.record.raw_score(subject.key);
            if raw.is_none() {
                fallbacks += 1;
                debug!(
                    student = %student.record.key(),
                    subject = subject.key,
                    "no usable raw score, drawing fallback"
                );
            }
            let adjusted = transform.adjust(raw);
            student.adjusted.insert(subject.key.to_string(), adjusted);
        }
    }

    info!(
        students = students.len(),
        subjects = subjects.len(),
        fallbacks,
        seed,
        "adjusted scores computed"
    );
    students
}

use super::domain::SubjectSpec;
use super::precompute::GradedStudent;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SubjectStats {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SubjectStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            mean: Some(sum / values.len() as f64),
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Class statistics of one taxonomy, keyed by subject display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassStats {
    pub subjects: HashMap<String, SubjectStats>,
    /// Mean of the present subject means; subjects nobody took are skipped.
    pub overall_average: Option<f64>,
}

impl ClassStats {
    pub fn subject(&self, display_name: &str) -> SubjectStats {
        self.subjects.get(display_name).copied().unwrap_or_default()
    }
}

/// Aggregates cached adjusted scores. `score_key` picks the canonical score
/// behind each subject line, which lets several taxonomies share one score set.
pub fn class_stats<F>(students: &[GradedStudent], subjects: &[SubjectSpec], score_key: F) -> ClassStats
where
    F: Fn(&SubjectSpec) -> &str,
{
    let mut stats = HashMap::with_capacity(subjects.len());
    let mut means = Vec::with_capacity(subjects.len());

    for subject in subjects {
        let key = score_key(subject);
        let values: Vec<f64> = students
            .iter()
            .filter_map(|student| student.adjusted_score(key))
            .collect();
        let subject_stats = SubjectStats::from_values(&values);
        if let Some(mean) = subject_stats.mean {
            means.push(mean);
        }
        stats.insert(subject.display_name.clone(), subject_stats);
    }

    ClassStats {
        subjects: stats,
        overall_average: mean(&means),
    }
}

/// Stats of a taxonomy through each subject's own `score_key`.
pub fn taxonomy_stats(students: &[GradedStudent], subjects: &[SubjectSpec]) -> ClassStats {
    class_stats(students, subjects, |subject| subject.score_key.as_str())
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

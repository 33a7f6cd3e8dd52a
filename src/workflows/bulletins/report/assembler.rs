use super::super::appreciation::{comment_for, overall_comment, NEUTRAL_SCORE};
use super::super::catalog::ReportProfile;
use super::super::precompute::GradedStudent;
use super::super::stats::{mean, ClassStats};
use super::fields::{ReportCard, SubjectLine, NO_ABSENCE_NOTE};

/// Decides which value goes where on one profile's reports. Scores are read
/// from the pre-computed cache only.
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler<'a> {
    profile: &'a ReportProfile,
    stats: &'a ClassStats,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(profile: &'a ReportProfile, stats: &'a ClassStats) -> Self {
        Self { profile, stats }
    }

    pub fn assemble(&self, student: &GradedStudent) -> ReportCard {
        let record = student.record();
        let mut own_scores = Vec::with_capacity(self.profile.subjects.len());

        let lines: Vec<SubjectLine> = self
            .profile
            .subjects
            .iter()
            .map(|subject| {
                let score = student.adjusted_score(&subject.score_key);
                own_scores.extend(score);
                SubjectLine {
                    display_name: subject.display_name.clone(),
                    teacher_name: subject.teacher_name.clone(),
                    score,
                    class: self.stats.subject(&subject.display_name),
                    comment: comment_for(score, subject, &self.profile.appreciations),
                }
            })
            .collect();

        let student_average = mean(&own_scores).unwrap_or(NEUTRAL_SCORE);

        ReportCard {
            profile: self.profile.kind,
            institution: self.profile.institution.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            birth_date: record.birth_date,
            lines,
            student_average,
            class_average: self.stats.overall_average,
            absences: NO_ABSENCE_NOTE.to_string(),
            overall_comment: overall_comment(&record.first_name, Some(student_average)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::bulletins::catalog::ReportProfile;
    use crate::workflows::bulletins::domain::StudentRecord;
    use crate::workflows::bulletins::precompute::graded_for_tests;
    use crate::workflows::bulletins::stats::taxonomy_stats;
    use chrono::NaiveDate;

    fn class() -> Vec<GradedStudent> {
        let mut jean = StudentRecord::new("Jean", "Dupont");
        jean.birth_date = NaiveDate::from_ymd_opt(2007, 3, 14);
        vec![
            graded_for_tests(jean, &[("Biochimie", 14.44), ("Maths", 17.0)]),
            graded_for_tests(StudentRecord::new("Lina", "Martin"), &[("Biochimie", 9.0)]),
        ]
    }

    #[test]
    fn assembles_lines_from_cached_scores() {
        let students = class();
        let profile = ReportProfile::paes();
        let stats = taxonomy_stats(&students, &profile.subjects);
        let card = ReportAssembler::new(&profile, &stats).assemble(&students[0]);

        assert_eq!(card.lines.len(), profile.subjects.len());
        assert_eq!(card.lines[0].display_name, "Biochimie");
        assert_eq!(card.lines[0].score, Some(14.44));
        assert_eq!(card.lines[0].class.min, Some(9.0));
        assert!((card.student_average - 15.72).abs() < 1e-9);
        assert!(card.overall_comment.starts_with("Jean a fourni un travail régulier"));

        let fields = card.fields();
        assert_eq!(fields.get("MOY_ELEVE_1"), Some("14,4"));
        assert_eq!(fields.get("MOY_ELEVE_2"), Some("NN"));
        assert_eq!(fields.get("DATE_NAISSANCE"), Some("14/03/2007"));
        assert_eq!(fields.get("NOM_ETABLISSEMENT"), Some("Diploma Santé"));
        assert_eq!(fields.subject_count(), 9);
    }

    #[test]
    fn student_without_scores_defaults_to_neutral_average() {
        let students = vec![graded_for_tests(StudentRecord::new("Zoé", "Petit"), &[])];
        let profile = ReportProfile::paes();
        let stats = taxonomy_stats(&students, &profile.subjects);
        let card = ReportAssembler::new(&profile, &stats).assemble(&students[0]);

        assert_eq!(card.student_average, NEUTRAL_SCORE);
        assert_eq!(card.class_average, None);
        let fields = card.fields();
        assert_eq!(fields.get("MOYENNE_GENERALE_CLASSE"), Some("NN"));
        assert!(!fields.contains("DATE_NAISSANCE"));
    }

    #[test]
    fn both_profiles_show_identical_numbers() {
        let students = class();
        let paes = ReportProfile::paes();
        let linova = ReportProfile::linova();
        let paes_stats = taxonomy_stats(&students, &paes.subjects);
        let linova_stats = taxonomy_stats(&students, &linova.subjects);

        let a = ReportAssembler::new(&paes, &paes_stats).assemble(&students[0]).fields();
        let b = ReportAssembler::new(&linova, &linova_stats)
            .assemble(&students[0])
            .fields();

        for i in 1..=paes.subjects.len() {
            for prefix in ["MOY_ELEVE", "MOY_CLASSE", "NOTE_MIN", "NOTE_MAX"] {
                let name = format!("{prefix}_{i}");
                assert_eq!(a.get(&name), b.get(&name), "{name}");
            }
        }
        assert_ne!(a.get("MATIERE_2"), b.get("MATIERE_2"));
        assert_eq!(a.get("MOYENNE_GENERALE_ELEVE"), b.get("MOYENNE_GENERALE_ELEVE"));
    }
}

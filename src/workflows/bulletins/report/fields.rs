use super::super::catalog::{Institution, ProfileKind};
use super::super::stats::SubjectStats;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Shown wherever a numeric value is absent.
pub const NOT_AVAILABLE: &str = "NN";
pub const NO_ABSENCE_NOTE: &str = "RAS";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectLine {
    pub display_name: String,
    pub teacher_name: String,
    pub score: Option<f64>,
    pub class: SubjectStats,
    pub comment: String,
}

/// Every value that ends up on one student's report for one profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCard {
    pub profile: ProfileKind,
    pub institution: Institution,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub lines: Vec<SubjectLine>,
    pub student_average: f64,
    pub class_average: Option<f64>,
    pub absences: String,
    pub overall_comment: String,
}

impl ReportCard {
    /// Flattens the card into named template fields. An absent birth date
    /// leaves `DATE_NAISSANCE` out of the bag entirely.
    pub fn fields(&self) -> FieldBag {
        let mut bag = FieldBag::default();
        let institution = &self.institution;

        bag.insert("NOM_ETABLISSEMENT", &institution.name);
        bag.insert("ADRESSE_ETABLISSEMENT", &institution.address);
        bag.insert("CODE_POSTAL", &institution.postal_code);
        bag.insert("VILLE", &institution.city);
        bag.insert("ANNEE_SCOLAIRE", &institution.school_year);
        bag.insert("CLASSE", &institution.class_label);
        bag.insert("CHARGE_ETUDES", &institution.study_advisor);
        bag.insert("SEMESTRE", &institution.semester);

        bag.insert("PRENOM_ELEVE", &self.first_name);
        bag.insert("NOM_ELEVE", &self.last_name);
        if let Some(date) = self.birth_date {
            bag.insert("DATE_NAISSANCE", &format_date(date));
        }

        bag.insert("NB_MATIERES", &self.lines.len().to_string());
        for (index, line) in self.lines.iter().enumerate() {
            let i = index + 1;
            bag.insert(&format!("MATIERE_{i}"), &line.display_name);
            bag.insert(&format!("ENSEIGNANT_{i}"), &line.teacher_name);
            bag.insert(&format!("MOY_ELEVE_{i}"), &format_score(line.score));
            bag.insert(&format!("MOY_CLASSE_{i}"), &format_score(line.class.mean));
            bag.insert(&format!("NOTE_MIN_{i}"), &format_score(line.class.min));
            bag.insert(&format!("NOTE_MAX_{i}"), &format_score(line.class.max));
            bag.insert(&format!("APPRECIATION_{i}"), &line.comment);
        }

        bag.insert(
            "MOYENNE_GENERALE_ELEVE",
            &format_score(Some(self.student_average)),
        );
        bag.insert("MOYENNE_GENERALE_CLASSE", &format_score(self.class_average));
        bag.insert("ABSENCES", &self.absences);
        bag.insert("APPRECIATION_GENERALE", &self.overall_comment);
        bag
    }
}

/// Named string values consumed by a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldBag(BTreeMap<String, String>);

impl FieldBag {
    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn subject_count(&self) -> usize {
        self.get("NB_MATIERES")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }
}

/// One decimal with a decimal comma, or the not-available token.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{value:.1}").replace('.', ","),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

use super::appreciation::{AppreciationTable, BandComments};
use super::domain::{CanonicalSubject, SubjectSpec};
use serde::Serialize;

/// Canonical subjects in declared order. The order drives the seeded
/// pre-computation and must not change between runs that should agree.
pub fn canonical_subjects() -> Vec<CanonicalSubject> {
    const SUBJECTS: &[(&str, &str)] = &[
        ("Biochimie", "biochimie.csv"),
        ("Biologie Cellulaire", "biologie_cellulaire.csv"),
        ("Biostatistiques", "biostatistiques.csv"),
        ("Chimie 1", "chimie_1.csv"),
        ("Chimie 2", "chimie_2.csv"),
        ("Maths", "maths.csv"),
        ("Physique", "physique.csv"),
        ("Physique Biophysique", "physique_biophysique.csv"),
        ("SVT", "svt.csv"),
    ];

    SUBJECTS
        .iter()
        .map(|&(key, source_file)| CanonicalSubject { key, source_file })
        .collect()
}

pub const IDENTITY_FILE: &str = "identite.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Paes,
    Linova,
}

impl ProfileKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Paes, Self::Linova]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paes => "PAES",
            Self::Linova => "Linova",
        }
    }

    /// Directory and template name of the profile.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Paes => "paes",
            Self::Linova => "linova",
        }
    }
}

/// Letterhead values copied verbatim onto every report of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Institution {
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub school_year: String,
    pub class_label: String,
    pub study_advisor: String,
    pub semester: String,
}

/// Everything that distinguishes one branded report layout from another.
#[derive(Debug, Clone)]
pub struct ReportProfile {
    pub kind: ProfileKind,
    pub institution: Institution,
    pub subjects: Vec<SubjectSpec>,
    pub appreciations: AppreciationTable,
}

impl ReportProfile {
    pub fn standard_set() -> Vec<Self> {
        vec![Self::paes(), Self::linova()]
    }

    pub fn paes() -> Self {
        let subjects = PAES_SUBJECTS
            .iter()
            .map(|(display, teacher, key)| SubjectSpec::new(display, teacher, key))
            .collect();

        let mut appreciations = AppreciationTable::new();
        for (display, comments) in PAES_COMMENTS {
            appreciations.insert(*display, BandComments::new(*comments));
        }

        Self {
            kind: ProfileKind::Paes,
            institution: Institution {
                name: "Diploma Santé".to_string(),
                address: "85 Avenue Ledru Rollin".to_string(),
                postal_code: "75012".to_string(),
                city: "Paris".to_string(),
                school_year: "2025/2026".to_string(),
                class_label: "PAES".to_string(),
                study_advisor: "Shirel Benchetrit".to_string(),
                semester: "1er Semestre".to_string(),
            },
            subjects,
            appreciations,
        }
    }

    /// Same grades as PAES under Linova's own subject names; comments follow
    /// the score key so both layouts describe the same work identically.
    pub fn linova() -> Self {
        let paes = Self::paes();
        let mut subjects = Vec::with_capacity(LINOVA_SUBJECTS.len());
        let mut appreciations = AppreciationTable::new();

        for (display, teacher, key) in LINOVA_SUBJECTS {
            let subject = SubjectSpec::new(display, teacher, key);
            let source_comments = paes
                .subjects
                .iter()
                .find(|candidate| candidate.score_key == subject.score_key)
                .and_then(|candidate| paes.appreciations.get(&candidate.display_name));
            if let Some(comments) = source_comments {
                appreciations.insert(subject.display_name.clone(), comments.clone());
            }
            subjects.push(subject);
        }

        Self {
            kind: ProfileKind::Linova,
            institution: Institution {
                name: "Linova".to_string(),
                address: "12 Rue de la Roquette".to_string(),
                postal_code: "75011".to_string(),
                city: "Paris".to_string(),
                school_year: "2025/2026".to_string(),
                class_label: "Prépa Santé Linova".to_string(),
                study_advisor: "Shirel Benchetrit".to_string(),
                semester: "1er Semestre".to_string(),
            },
            subjects,
            appreciations,
        }
    }
}

/// Free-text markers that classify the enrollment choice column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentMarkers {
    pub paes: [String; 2],
    pub linova: [String; 2],
}

impl EnrollmentMarkers {
    pub fn standard() -> Self {
        Self {
            paes: ["diploma".to_string(), "paes".to_string()],
            linova: ["linova".to_string(), "licence acces sante".to_string()],
        }
    }
}

const PAES_SUBJECTS: &[(&str, &str, &str)] = &[
    ("Biochimie", "M. Da Fonseca", "Biochimie"),
    ("Biologie Cellulaire", "M. Descatoire", "Biologie Cellulaire"),
    ("Biostatistiques", "U. Bederede", "Biostatistiques"),
    ("Chimie Médecine", "R. Hadjerci", "Chimie 1"),
    ("Chimie Terminale", "D. Yazidi", "Chimie 2"),
    ("Mathématiques", "U. Bederede", "Maths"),
    ("Physique", "H. Diaw", "Physique"),
    ("Physique/Biophysique", "H. Diaw", "Physique Biophysique"),
    ("SVT", "M. Descatoire", "SVT"),
];

const LINOVA_SUBJECTS: &[(&str, &str, &str)] = &[
    ("Biochimie Médicale", "M. Da Fonseca", "Biochimie"),
    ("Biologie de la Cellule", "M. Descatoire", "Biologie Cellulaire"),
    ("Statistiques Appliquées", "U. Bederede", "Biostatistiques"),
    ("Chimie Générale", "R. Hadjerci", "Chimie 1"),
    ("Chimie Organique", "D. Yazidi", "Chimie 2"),
    ("Mathématiques", "U. Bederede", "Maths"),
    ("Physique Générale", "H. Diaw", "Physique"),
    ("Biophysique", "H. Diaw", "Physique Biophysique"),
    ("Sciences de la Vie", "M. Descatoire", "SVT"),
];

const PAES_COMMENTS: &[(&str, [&str; 5])] = &[
    (
        "Biochimie",
        [
            "Les notions de biochimie nécessitent un approfondissement. Un travail régulier permettra de progresser.",
            "Les bases en biochimie sont acquises. Poursuivez vos efforts pour consolider vos connaissances.",
            "Bonne compréhension des concepts biochimiques. Continuez sur cette voie prometteuse.",
            "Très bonne maîtrise de la biochimie. Vos efforts sont récompensés, persévérez.",
            "Excellente maîtrise des notions biochimiques. Félicitations pour ce travail remarquable.",
        ],
    ),
    (
        "Biologie Cellulaire",
        [
            "Les mécanismes cellulaires doivent être revus. Un travail plus soutenu est nécessaire.",
            "Compréhension correcte de la biologie cellulaire. Des efforts supplémentaires consolideront vos acquis.",
            "Bonne assimilation des concepts cellulaires. Maintenez cette dynamique positive.",
            "Très bonne compréhension des processus cellulaires. Continuez ainsi.",
            "Maîtrise remarquable de la biologie cellulaire. Travail exemplaire.",
        ],
    ),
    (
        "Biostatistiques",
        [
            "Les méthodes statistiques demandent plus de pratique. Un entraînement régulier est conseillé.",
            "Les bases statistiques sont comprises. Continuez à vous exercer pour gagner en aisance.",
            "Bonne application des outils statistiques. Poursuivez vos efforts.",
            "Très bonne maîtrise des biostatistiques. Résultats très satisfaisants.",
            "Excellente compréhension et application des méthodes statistiques. Bravo.",
        ],
    ),
    (
        "Chimie Médecine",
        [
            "Les fondamentaux en chimie médicale doivent être renforcés. Travaillez régulièrement.",
            "Niveau correct en chimie médicale. Poursuivez vos efforts pour vous améliorer.",
            "Bonne compréhension de la chimie appliquée à la médecine. Continuez ainsi.",
            "Très bon niveau en chimie médicale. Vos résultats sont encourageants.",
            "Excellente maîtrise de la chimie médicale. Félicitations pour votre investissement.",
        ],
    ),
    (
        "Chimie Terminale",
        [
            "Les acquis de chimie terminale nécessitent une révision. Un travail soutenu s'impose.",
            "Les notions de chimie terminale sont assimilées. Continuez à progresser.",
            "Bonne maîtrise des concepts de chimie terminale. Persévérez dans vos efforts.",
            "Très bonne compréhension de la chimie terminale. Résultats très positifs.",
            "Excellents résultats en chimie terminale. Travail remarquable et rigoureux.",
        ],
    ),
    (
        "Mathématiques",
        [
            "Les compétences mathématiques doivent être consolidées. Un entraînement quotidien est recommandé.",
            "Niveau satisfaisant en mathématiques. Continuez à pratiquer pour progresser.",
            "Bonne maîtrise des outils mathématiques. Maintenez vos efforts.",
            "Très bon niveau en mathématiques. Vos compétences sont solides.",
            "Excellente maîtrise des mathématiques. Résultats impressionnants, félicitations.",
        ],
    ),
    (
        "Physique",
        [
            "Les concepts physiques nécessitent plus de travail. Revoyez les notions fondamentales.",
            "Compréhension correcte des phénomènes physiques. Poursuivez vos efforts.",
            "Bonne assimilation des lois physiques. Continuez sur cette lancée positive.",
            "Très bonne maîtrise de la physique. Vos efforts portent leurs fruits.",
            "Excellente compréhension de la physique. Travail exemplaire et rigoureux.",
        ],
    ),
    (
        "Physique/Biophysique",
        [
            "Les notions de biophysique demandent un approfondissement. Travaillez régulièrement.",
            "Les bases en biophysique sont acquises. Continuez à consolider vos connaissances.",
            "Bonne compréhension des applications physiques en biologie. Persévérez.",
            "Très bon niveau en biophysique. Résultats très encourageants.",
            "Maîtrise excellente de la biophysique. Félicitations pour ce parcours remarquable.",
        ],
    ),
    (
        "SVT",
        [
            "Les connaissances en SVT doivent être renforcées. Un travail plus régulier est nécessaire.",
            "Niveau correct en SVT. Poursuivez vos efforts pour améliorer vos résultats.",
            "Bonne compréhension des sciences de la vie et de la Terre. Continuez ainsi.",
            "Très bonne maîtrise des SVT. Vos résultats reflètent un travail sérieux.",
            "Excellents résultats en SVT. Travail remarquable et approfondi, bravo.",
        ],
    ),
];

use super::domain::SubjectSpec;
use serde::Serialize;
use std::collections::HashMap;

/// Score used for banding when no score is available.
pub const NEUTRAL_SCORE: f64 = 10.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Insufficient,
    Passable,
    Good,
    VeryGood,
    Excellent,
}

impl Band {
    /// Half-open bands: `<10`, `<12`, `<14`, `<16`, then everything above.
    pub fn for_score(score: Option<f64>) -> Self {
        let score = score.unwrap_or(NEUTRAL_SCORE);
        if score < 10.0 {
            Self::Insufficient
        } else if score < 12.0 {
            Self::Passable
        } else if score < 14.0 {
            Self::Good
        } else if score < 16.0 {
            Self::VeryGood
        } else {
            Self::Excellent
        }
    }

    const fn generic_comment(self) -> &'static str {
        match self {
            Self::Insufficient => "Des efforts sont nécessaires pour progresser.",
            Self::Passable => "Résultats encourageants. Continuez vos efforts.",
            Self::Good => "Bon travail. Poursuivez dans cette voie.",
            Self::VeryGood => "Très bon travail. Continuez ainsi.",
            Self::Excellent => "Excellents résultats. Félicitations.",
        }
    }
}

/// The five canned comments of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandComments {
    pub insufficient: String,
    pub passable: String,
    pub good: String,
    pub very_good: String,
    pub excellent: String,
}

impl BandComments {
    pub fn new(comments: [&str; 5]) -> Self {
        let [insufficient, passable, good, very_good, excellent] = comments;
        Self {
            insufficient: insufficient.to_string(),
            passable: passable.to_string(),
            good: good.to_string(),
            very_good: very_good.to_string(),
            excellent: excellent.to_string(),
        }
    }

    pub fn get(&self, band: Band) -> &str {
        match band {
            Band::Insufficient => &self.insufficient,
            Band::Passable => &self.passable,
            Band::Good => &self.good,
            Band::VeryGood => &self.very_good,
            Band::Excellent => &self.excellent,
        }
    }
}

/// Per-subject comments keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppreciationTable {
    entries: HashMap<String, BandComments>,
}

impl AppreciationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, display_name: impl Into<String>, comments: BandComments) {
        self.entries.insert(display_name.into(), comments);
    }

    pub fn get(&self, display_name: &str) -> Option<&BandComments> {
        self.entries.get(display_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Subject comment for a score; subjects missing from the table get the
/// generic sentence of the band.
pub fn comment_for(score: Option<f64>, subject: &SubjectSpec, table: &AppreciationTable) -> String {
    let band = Band::for_score(score);
    match table.get(&subject.display_name) {
        Some(comments) => comments.get(band).to_string(),
        None => band.generic_comment().to_string(),
    }
}

pub fn overall_comment(first_name: &str, average: Option<f64>) -> String {
    match Band::for_score(average) {
        Band::Insufficient => format!(
            "{first_name} doit fournir davantage d'efforts pour progresser. Un travail régulier et soutenu permettra d'améliorer les résultats au prochain semestre."
        ),
        Band::Passable => format!(
            "{first_name} montre des résultats encourageants. Avec plus de régularité dans le travail, les résultats continueront de s'améliorer."
        ),
        Band::Good => format!(
            "{first_name} fournit un bon travail ce semestre. Les bases sont acquises et les efforts doivent être maintenus pour progresser davantage."
        ),
        Band::VeryGood => format!(
            "{first_name} a fourni un travail régulier et rigoureux tout au long du semestre. Les résultats sont très satisfaisants. Continuez ainsi."
        ),
        Band::Excellent => format!(
            "{first_name} a fourni un travail remarquable tout au long du semestre. Félicitations pour ces excellents résultats."
        ),
    }
}

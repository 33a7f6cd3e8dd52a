use super::catalog::EnrollmentMarkers;
use super::domain::{EnrollmentChoice, StudentKey};
use super::import::IdentityRow;
use super::merge::{fill_if_empty, StudentRoster};
use tracing::{debug, info, warn};

/// Joins the identity table onto merged records by name key.
#[derive(Debug, Clone)]
pub struct IdentityEnricher {
    markers: EnrollmentMarkers,
}

impl IdentityEnricher {
    pub fn new(markers: EnrollmentMarkers) -> Self {
        Self { markers }
    }

    pub fn enrich(&self, mut roster: StudentRoster, rows: &[IdentityRow]) -> StudentRoster {
        let mut unmatched = 0usize;

        for row in rows {
            let Some(key) = StudentKey::from_raw(&row.first_name, &row.last_name) else {
                continue;
            };
            let Some(record) = roster.get_mut(&key) else {
                debug!(student = %key, "identity row without grades, ignoring it");
                unmatched += 1;
                continue;
            };

            record.identity_matched = true;
            if record.birth_date.is_none() {
                record.birth_date = row.birth_date;
            }
            if record.enrollment_choice == EnrollmentChoice::Unspecified {
                record.enrollment_choice = self.classify(row.choice.as_deref());
            }
            fill_if_empty(&mut record.email, row.email.as_deref());
        }

        let incomplete: Vec<String> = roster
            .values()
            .filter(|record| record.is_incomplete())
            .map(|record| format!("{} {}", record.first_name, record.last_name))
            .collect();
        if !incomplete.is_empty() {
            warn!(
                count = incomplete.len(),
                students = ?incomplete,
                "records without identity match or birth date"
            );
        }
        info!(
            identity_rows = rows.len(),
            unmatched_rows = unmatched,
            "identity enrichment complete"
        );

        roster
    }

    /// PAES markers are checked before Linova markers.
    pub fn classify(&self, choice: Option<&str>) -> EnrollmentChoice {
        let Some(text) = choice else {
            return EnrollmentChoice::Unspecified;
        };
        let folded = slug::slugify(text).replace('-', " ");
        let contains = |marker: &String| {
            let marker = slug::slugify(marker).replace('-', " ");
            !marker.is_empty() && folded.contains(&marker)
        };

        if self.markers.paes.iter().any(contains) {
            EnrollmentChoice::Paes
        } else if self.markers.linova.iter().any(contains) {
            EnrollmentChoice::Linova
        } else {
            EnrollmentChoice::Unspecified
        }
    }
}

impl Default for IdentityEnricher {
    fn default() -> Self {
        Self::new(EnrollmentMarkers::standard())
    }
}

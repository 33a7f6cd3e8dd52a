use std::collections::HashMap;
use std::sync::OnceLock;

static HEADER_ALIASES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// Folds a header cell to a comparable form: invisible characters dropped,
/// accents stripped, lower-cased, words joined by hyphens.
pub(crate) fn fold_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    slug::slugify(cleaned)
}

/// Canonical field name for a header cell, if it is one the importer reads.
pub(crate) fn canonical_header(value: &str) -> Option<&'static str> {
    header_aliases().get(fold_header(value).as_str()).copied()
}

fn header_aliases() -> &'static HashMap<&'static str, &'static str> {
    HEADER_ALIASES.get_or_init(|| {
        const ALIASES: &[(&str, &str)] = &[
            ("nom", "last_name"),
            ("nom-de-famille", "last_name"),
            ("last-name", "last_name"),
            ("lastname", "last_name"),
            ("prenom", "first_name"),
            ("first-name", "first_name"),
            ("firstname", "first_name"),
            ("email", "email"),
            ("e-mail", "email"),
            ("mail", "email"),
            ("adresse-mail", "email"),
            ("courriel", "email"),
            ("note", "score"),
            ("note-20", "score"),
            ("score", "score"),
            ("resultat", "score"),
            ("date-de-naissance", "birth_date"),
            ("date-naissance", "birth_date"),
            ("naissance", "birth_date"),
            ("birth-date", "birth_date"),
            ("birthdate", "birth_date"),
            ("choix", "choice"),
            ("choix-parcoursup", "choice"),
            ("parcoursup", "choice"),
            ("voeu", "choice"),
            ("enrollment-choice", "choice"),
        ];

        ALIASES.iter().copied().collect()
    })
}

use super::super::catalog::ProfileKind;
use super::fields::{FieldBag, NOT_AVAILABLE};
use super::RenderError;
use html_escape::encode_text;
use std::fmt::Write as _;
use std::path::Path;

/// Turns a field bag into a complete HTML document.
pub trait ReportRenderer {
    fn render(&self, fields: &FieldBag) -> Result<String, RenderError>;
}

/// The layouts shipped with the tool, one per profile.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinLayout {
    kind: ProfileKind,
}

impl BuiltinLayout {
    pub fn new(kind: ProfileKind) -> Self {
        Self { kind }
    }
}

impl ReportRenderer for BuiltinLayout {
    fn render(&self, fields: &FieldBag) -> Result<String, RenderError> {
        let mut html = String::new();
        let field = |name: &str| encode_text(fields.get(name).unwrap_or(NOT_AVAILABLE)).into_owned();

        write_head(&mut html, self.kind, &field("NOM_ETABLISSEMENT"))?;

        match self.kind {
            ProfileKind::Paes => {
                writeln!(
                    html,
                    "<header><div class=\"school\"><h1>{}</h1><p>{}<br>{} {}</p></div>\
<div class=\"term\"><p>Année scolaire {}</p><p>{}</p><p>Classe {}</p></div></header>",
                    field("NOM_ETABLISSEMENT"),
                    field("ADRESSE_ETABLISSEMENT"),
                    field("CODE_POSTAL"),
                    field("VILLE"),
                    field("ANNEE_SCOLAIRE"),
                    field("SEMESTRE"),
                    field("CLASSE"),
                )?;
            }
            ProfileKind::Linova => {
                writeln!(
                    html,
                    "<header><h1>{}</h1><p class=\"term\">{} · {} · {}</p>\
<p class=\"address\">{}, {} {}</p></header>",
                    field("NOM_ETABLISSEMENT"),
                    field("CLASSE"),
                    field("SEMESTRE"),
                    field("ANNEE_SCOLAIRE"),
                    field("ADRESSE_ETABLISSEMENT"),
                    field("CODE_POSTAL"),
                    field("VILLE"),
                )?;
            }
        }

        write!(
            html,
            "<section class=\"student\"><h2>{} {}</h2>",
            field("PRENOM_ELEVE"),
            field("NOM_ELEVE")
        )?;
        if fields.contains("DATE_NAISSANCE") {
            write!(html, "<p>Né(e) le {}</p>", field("DATE_NAISSANCE"))?;
        }
        writeln!(
            html,
            "<p>Chargé(e) d'études : {}</p></section>",
            field("CHARGE_ETUDES")
        )?;

        html.push_str(
            "<table><thead><tr><th>Matière</th><th>Élève</th><th>Classe</th>\
<th>Min</th><th>Max</th><th>Appréciation</th></tr></thead><tbody>\n",
        );
        for i in 1..=fields.subject_count() {
            writeln!(
                html,
                "<tr><td><strong>{}</strong><br><span class=\"teacher\">{}</span></td>\
<td class=\"score\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                field(&format!("MATIERE_{i}")),
                field(&format!("ENSEIGNANT_{i}")),
                field(&format!("MOY_ELEVE_{i}")),
                field(&format!("MOY_CLASSE_{i}")),
                field(&format!("NOTE_MIN_{i}")),
                field(&format!("NOTE_MAX_{i}")),
                field(&format!("APPRECIATION_{i}")),
            )?;
        }
        writeln!(
            html,
            "<tr class=\"overall\"><td>Moyenne générale</td><td class=\"score\">{}</td>\
<td>{}</td><td colspan=\"3\"></td></tr></tbody></table>",
            field("MOYENNE_GENERALE_ELEVE"),
            field("MOYENNE_GENERALE_CLASSE"),
        )?;

        writeln!(
            html,
            "<section class=\"summary\"><p><strong>Absences :</strong> {}</p>\
<p><strong>Appréciation générale :</strong> {}</p></section></body></html>",
            field("ABSENCES"),
            field("APPRECIATION_GENERALE"),
        )?;

        Ok(html)
    }
}

fn write_head(html: &mut String, kind: ProfileKind, title: &str) -> std::fmt::Result {
    let (accent, font) = match kind {
        ProfileKind::Paes => ("#2c3e50", "'Open Sans', Arial, sans-serif"),
        ProfileKind::Linova => ("#1f7a5c", "Georgia, 'Times New Roman', serif"),
    };

    writeln!(
        html,
        "<!DOCTYPE html>\n<html lang=\"fr\"><head><meta charset=\"UTF-8\">\
<title>Bulletin - {title}</title><style>\
@page {{ size: A4; margin: 14mm; }}\
body {{ font-family: {font}; font-size: 10pt; color: #222; }}\
header {{ display: flex; justify-content: space-between; border-bottom: 3px solid {accent}; }}\
h1 {{ color: {accent}; font-size: 16pt; }}\
table {{ width: 100%; border-collapse: collapse; margin-top: 8mm; }}\
th {{ background: {accent}; color: #fff; padding: 4px; text-align: left; }}\
td {{ border-bottom: 1px solid #ddd; padding: 4px; vertical-align: top; }}\
.score {{ font-weight: 700; }} .teacher {{ color: #666; font-size: 8pt; }}\
.overall td {{ border-top: 2px solid {accent}; font-weight: 700; }}\
</style></head><body>"
    )
}

/// `{{FIELD}}` substitution over a user-supplied template. Placeholders
/// missing from the bag render as empty text.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: String,
}

impl TemplateRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let template = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(template))
    }
}

impl ReportRenderer for TemplateRenderer {
    fn render(&self, fields: &FieldBag) -> Result<String, RenderError> {
        let mut output = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                RenderError::Template(format!(
                    "unterminated placeholder at byte {}",
                    self.template.len() - rest.len() + start
                ))
            })?;
            let name = after[..end].trim();
            if let Some(value) = fields.get(name) {
                output.push_str(&encode_text(value));
            }
            rest = &after[end + 2..];
        }
        output.push_str(rest);

        Ok(output)
    }
}

use super::super::catalog::{Institution, ProfileKind};
use super::super::domain::EnrollmentChoice;
use super::fields::format_date;
use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

/// One student line of the index page.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub enrollment_choice: EnrollmentChoice,
    pub incomplete: bool,
    /// Relative link per profile, in profile order.
    pub documents: Vec<(ProfileKind, String)>,
}

/// Renders the searchable index. Entries are listed by last then first name.
pub fn render_index(
    entries: &[IndexEntry],
    institution: &Institution,
    subject_count: usize,
) -> Result<String, std::fmt::Error> {
    let mut sorted: Vec<&IndexEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        (a.last_name.to_lowercase(), a.first_name.to_lowercase())
            .cmp(&(b.last_name.to_lowercase(), b.first_name.to_lowercase()))
    });

    let mut html = String::new();
    writeln!(
        html,
        "<!DOCTYPE html>\n<html lang=\"fr\"><head><meta charset=\"UTF-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
<title>Bulletins scolaires - {name}</title><style>\
body {{ font-family: 'Open Sans', Arial, sans-serif; margin: 0; background: #f4f6f8; }}\
.container {{ max-width: 1200px; margin: 20px auto; background: #fff; border-radius: 12px; overflow: hidden; }}\
.header {{ background: #2c3e50; color: #fff; padding: 24px 40px; text-align: center; }}\
.stats {{ display: flex; justify-content: center; gap: 40px; }}\
.search {{ width: 100%; padding: 12px; box-sizing: border-box; font-size: 14px; }}\
table {{ width: 100%; border-collapse: collapse; }}\
th, td {{ padding: 12px; border-bottom: 1px solid #eee; text-align: left; }}\
.badge {{ background: #e67e22; color: #fff; border-radius: 4px; padding: 2px 6px; font-size: 11px; }}\
.btn {{ display: inline-block; padding: 6px 10px; border-radius: 6px; color: #fff; background: #e74c3c; text-decoration: none; }}\
#noResults {{ display: none; padding: 40px; text-align: center; color: #666; }}\
</style></head><body><div class=\"container\">",
        name = encode_text(&institution.name),
    )?;

    writeln!(
        html,
        "<div class=\"header\"><h1>Bulletins du {}</h1><p>{} - Année scolaire {}</p>\
<div class=\"stats\"><div><strong>{}</strong> Élèves</div><div><strong>{}</strong> Matières</div></div></div>",
        encode_text(&institution.semester),
        encode_text(&institution.name),
        encode_text(&institution.school_year),
        entries.len(),
        subject_count,
    )?;

    html.push_str(
        "<div><input type=\"text\" class=\"search\" id=\"searchInput\" \
placeholder=\"Rechercher un élève par nom, prénom, email ou parcours...\"></div>\
<table id=\"studentsTable\"><thead><tr><th>Prénom</th><th>Nom</th><th>Email</th>\
<th>Date de naissance</th><th>Choix</th><th>Bulletins</th></tr></thead><tbody>\n",
    );

    for entry in sorted {
        write_row(&mut html, entry)?;
    }

    html.push_str(
        "</tbody></table><div id=\"noResults\">Aucun élève trouvé pour cette recherche.</div></div>\
<script>\
document.getElementById('searchInput').addEventListener('input', function() {\
const term = this.value.toLowerCase(); let visible = 0;\
document.querySelectorAll('#studentsTable tbody tr').forEach(function(row) {\
const show = row.textContent.toLowerCase().includes(term);\
row.style.display = show ? '' : 'none'; if (show) visible++; });\
document.getElementById('noResults').style.display = visible === 0 ? 'block' : 'none';\
});\
</script></body></html>\n",
    );

    Ok(html)
}

fn write_row(html: &mut String, entry: &IndexEntry) -> std::fmt::Result {
    let email = entry.email.as_deref().unwrap_or_default();
    let birth = match entry.birth_date {
        Some(date) => format_date(date),
        None => String::new(),
    };
    let marker = if entry.incomplete {
        " <span class=\"badge\">incomplet</span>"
    } else {
        ""
    };

    write!(
        html,
        "<tr><td>{}</td><td>{}</td><td><a href=\"mailto:{}\">{}</a></td><td>{}{}</td><td>{}</td><td>",
        encode_text(&entry.first_name),
        encode_text(&entry.last_name),
        encode_double_quoted_attribute(email),
        encode_text(email),
        birth,
        marker,
        entry.enrollment_choice.label(),
    )?;
    for (kind, href) in &entry.documents {
        write!(
            html,
            "<a class=\"btn\" href=\"{}\" target=\"_blank\">{}</a> ",
            encode_double_quoted_attribute(href),
            kind.label()
        )?;
    }
    writeln!(html, "</td></tr>")
}

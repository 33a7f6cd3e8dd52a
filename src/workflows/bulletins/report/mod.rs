mod assembler;
mod fields;
mod html;
pub mod index;

pub use assembler::ReportAssembler;
pub use fields::{format_date, format_score, FieldBag, ReportCard, SubjectLine, NOT_AVAILABLE};
pub use html::{BuiltinLayout, ReportRenderer, TemplateRenderer};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid template: {0}")]
    Template(String),
    #[error("could not format document")]
    Format(#[from] std::fmt::Error),
    #[error("PDF conversion with '{program}' failed: {detail}")]
    Pdf { program: String, detail: String },
}

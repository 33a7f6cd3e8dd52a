use super::catalog::ProfileKind;
use super::report::RenderError;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Converts a rendered HTML file into a PDF next to it.
pub trait PdfConverter: Debug {
    fn convert(&self, html: &Path, pdf: &Path) -> Result<(), RenderError>;
}

/// Runs an external program as `<program> [args...] <html> <pdf>`.
#[derive(Debug, Clone)]
pub struct CommandPdfConverter {
    program: String,
    args: Vec<String>,
}

impl CommandPdfConverter {
    /// `command` is split on whitespace; the first word is the program.
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_else(|| "weasyprint".to_string());
        Self {
            program,
            args: words.collect(),
        }
    }
}

impl PdfConverter for CommandPdfConverter {
    fn convert(&self, html: &Path, pdf: &Path) -> Result<(), RenderError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(html)
            .arg(pdf)
            .output()
            .map_err(|err| RenderError::Pdf {
                program: self.program.clone(),
                detail: err.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(RenderError::Pdf {
            program: self.program.clone(),
            detail: format!("{} ({})", output.status, stderr.trim()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Generated,
    Skipped,
    Failed { reason: String },
}

/// Where every generated file lives under the output root.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    pdf_enabled: bool,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, pdf_enabled: bool) -> Self {
        Self {
            root: root.into(),
            pdf_enabled,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn html_path(&self, kind: ProfileKind, slug: &str) -> PathBuf {
        self.root.join(self.relative_html(kind, slug))
    }

    pub fn pdf_path(&self, kind: ProfileKind, slug: &str) -> PathBuf {
        self.root.join(self.relative_pdf(kind, slug))
    }

    /// The file whose presence marks a (profile, student) item as done.
    pub fn target_path(&self, kind: ProfileKind, slug: &str) -> PathBuf {
        self.root.join(self.relative_target(kind, slug))
    }

    /// Link from the index page to the item's target.
    pub fn relative_target(&self, kind: ProfileKind, slug: &str) -> String {
        if self.pdf_enabled {
            self.relative_pdf(kind, slug)
        } else {
            self.relative_html(kind, slug)
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.html")
    }

    pub fn prepare(&self) -> io::Result<()> {
        for kind in ProfileKind::ordered() {
            fs::create_dir_all(self.root.join(kind.slug()).join("html"))?;
            if self.pdf_enabled {
                fs::create_dir_all(self.root.join(kind.slug()).join("pdf"))?;
            }
        }
        Ok(())
    }

    /// Removes every previously generated document and the index.
    pub fn reset(&self) -> io::Result<()> {
        for kind in ProfileKind::ordered() {
            let dir = self.root.join(kind.slug());
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
        }
        let index = self.index_path();
        if index.exists() {
            fs::remove_file(index)?;
        }
        Ok(())
    }

    fn relative_html(&self, kind: ProfileKind, slug: &str) -> String {
        format!("{}/html/bulletin_{slug}.html", kind.slug())
    }

    fn relative_pdf(&self, kind: ProfileKind, slug: &str) -> String {
        format!("{}/pdf/bulletin_{slug}.pdf", kind.slug())
    }
}

/// Writes one item unless its target already exists.
#[derive(Debug)]
pub struct DocumentWriter<'a> {
    layout: &'a OutputLayout,
    pdf: Option<&'a dyn PdfConverter>,
}

impl<'a> DocumentWriter<'a> {
    pub fn new(layout: &'a OutputLayout, pdf: Option<&'a dyn PdfConverter>) -> Self {
        Self { layout, pdf }
    }

    pub fn write<F>(&self, kind: ProfileKind, slug: &str, render: F) -> ItemOutcome
    where
        F: FnOnce() -> Result<String, RenderError>,
    {
        let target = self.layout.target_path(kind, slug);
        if target.exists() {
            debug!(profile = kind.label(), slug, "document already present, skipping");
            return ItemOutcome::Skipped;
        }

        match self.produce(kind, slug, render) {
            Ok(()) => ItemOutcome::Generated,
            Err(err) => {
                warn!(profile = kind.label(), slug, error = %err, "document generation failed");
                ItemOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn produce<F>(&self, kind: ProfileKind, slug: &str, render: F) -> Result<(), RenderError>
    where
        F: FnOnce() -> Result<String, RenderError>,
    {
        let html = render()?;
        let html_path = self.layout.html_path(kind, slug);
        let staged_html = partial_path(&html_path);
        if let Err(source) =
            fs::write(&staged_html, html).and_then(|()| fs::rename(&staged_html, &html_path))
        {
            let _ = fs::remove_file(&staged_html);
            return Err(RenderError::Io {
                path: html_path,
                source,
            });
        }

        if let Some(converter) = self.pdf {
            let pdf_path = self.layout.pdf_path(kind, slug);
            let staged_pdf = partial_path(&pdf_path);
            let converted = converter.convert(&html_path, &staged_pdf).and_then(|()| {
                fs::rename(&staged_pdf, &pdf_path).map_err(|source| RenderError::Io {
                    path: pdf_path.clone(),
                    source,
                })
            });
            if let Err(err) = converted {
                let _ = fs::remove_file(&staged_pdf);
                return Err(err);
            }
        }

        Ok(())
    }
}

/// Sibling that receives a document until it is complete, e.g.
/// `bulletin_x.html` is staged as `bulletin_x.partial.html`.
fn partial_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => path.with_file_name(format!("{stem}.partial.{}", ext.to_string_lossy())),
        None => path.with_file_name(format!("{stem}.partial")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FailingConverter;

    impl PdfConverter for FailingConverter {
        fn convert(&self, _html: &Path, pdf: &Path) -> Result<(), RenderError> {
            fs::write(pdf, b"partial").expect("write partial pdf");
            Err(RenderError::Pdf {
                program: "fake".to_string(),
                detail: "boom".to_string(),
            })
        }
    }

    #[test]
    fn existing_target_is_skipped_untouched() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = OutputLayout::new(dir.path(), false);
        layout.prepare().expect("dirs");
        let writer = DocumentWriter::new(&layout, None);

        let first = writer.write(ProfileKind::Paes, "jean_dupont", || Ok("v1".to_string()));
        assert_eq!(first, ItemOutcome::Generated);
        let second = writer.write(ProfileKind::Paes, "jean_dupont", || Ok("v2".to_string()));
        assert_eq!(second, ItemOutcome::Skipped);

        let content = fs::read_to_string(layout.html_path(ProfileKind::Paes, "jean_dupont"))
            .expect("html present");
        assert_eq!(content, "v1");
    }

    #[test]
    fn failed_conversion_leaves_no_target_behind() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = OutputLayout::new(dir.path(), true);
        layout.prepare().expect("dirs");
        let converter = FailingConverter;
        let writer = DocumentWriter::new(&layout, Some(&converter));

        let outcome = writer.write(ProfileKind::Linova, "lina_martin", || Ok("<html>".to_string()));
        assert!(matches!(outcome, ItemOutcome::Failed { ref reason } if reason.contains("boom")));
        let target = layout.target_path(ProfileKind::Linova, "lina_martin");
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
    }

    #[test]
    fn interrupted_html_write_never_becomes_the_target() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = OutputLayout::new(dir.path(), false);
        layout.prepare().expect("dirs");
        let target = layout.target_path(ProfileKind::Paes, "jean_dupont");
        // A directory in the staging slot makes the write fail midway.
        fs::create_dir(partial_path(&target)).expect("block staging file");
        let writer = DocumentWriter::new(&layout, None);

        let outcome = writer.write(ProfileKind::Paes, "jean_dupont", || Ok("<html>".to_string()));
        assert!(matches!(outcome, ItemOutcome::Failed { .. }));
        assert!(!target.exists());

        fs::remove_dir(partial_path(&target)).expect("unblock");
        let retry = writer.write(ProfileKind::Paes, "jean_dupont", || Ok("<html>".to_string()));
        assert_eq!(retry, ItemOutcome::Generated);
        assert_eq!(fs::read_to_string(&target).expect("html present"), "<html>");
    }

    #[test]
    fn leftover_partial_file_does_not_count_as_done() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = OutputLayout::new(dir.path(), false);
        layout.prepare().expect("dirs");
        let target = layout.target_path(ProfileKind::Paes, "jean_dupont");
        fs::write(partial_path(&target), "<ht").expect("stale partial");
        let writer = DocumentWriter::new(&layout, None);

        let outcome = writer.write(ProfileKind::Paes, "jean_dupont", || Ok("<html>".to_string()));
        assert_eq!(outcome, ItemOutcome::Generated);
        assert_eq!(fs::read_to_string(&target).expect("html present"), "<html>");
        assert!(!partial_path(&target).exists());
    }

    #[test]
    fn partial_path_keeps_the_extension() {
        assert_eq!(
            partial_path(Path::new("out/paes/pdf/bulletin_jean.pdf")),
            PathBuf::from("out/paes/pdf/bulletin_jean.partial.pdf")
        );
    }

    #[test]
    fn reset_discards_previous_outputs() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = OutputLayout::new(dir.path(), false);
        layout.prepare().expect("dirs");
        fs::write(layout.html_path(ProfileKind::Paes, "a"), "x").expect("write");
        fs::write(layout.index_path(), "index").expect("write");

        layout.reset().expect("reset");
        assert!(!layout.html_path(ProfileKind::Paes, "a").exists());
        assert!(!layout.index_path().exists());
    }

    #[test]
    fn command_converter_splits_program_and_args() {
        let converter = CommandPdfConverter::new("wkhtmltopdf --quiet");
        assert_eq!(converter.program, "wkhtmltopdf");
        assert_eq!(converter.args, vec!["--quiet".to_string()]);
    }
}

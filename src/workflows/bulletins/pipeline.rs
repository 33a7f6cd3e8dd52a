use super::catalog::{canonical_subjects, EnrollmentMarkers, ProfileKind, ReportProfile, IDENTITY_FILE};
use super::domain::CanonicalSubject;
use super::enrich::IdentityEnricher;
use super::import::{self, ImportError};
use super::merge::RecordMerger;
use super::output::{CommandPdfConverter, DocumentWriter, ItemOutcome, OutputLayout, PdfConverter};
use super::precompute::{precompute_adjusted_scores, GradedStudent};
use super::report::index::{render_index, IndexEntry};
use super::report::{BuiltinLayout, RenderError, ReportAssembler, ReportRenderer, TemplateRenderer};
use super::stats::{taxonomy_stats, ClassStats};
use crate::config::AppConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum BulletinError {
    #[error("no students found in {}; nothing was generated", .0.display())]
    NoStudents(PathBuf),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub seed: u64,
    /// External PDF command; `None` writes HTML only.
    pub pdf_command: Option<String>,
    pub reset: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let generation = &config.generation;
        Self {
            data_dir: config.paths.data_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            template_dir: config.paths.template_dir.clone(),
            seed: generation.seed,
            pdf_command: generation
                .pdf_enabled
                .then(|| generation.pdf_command.clone()),
            reset: generation.reset,
        }
    }
}

/// Class statistics of one profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileStats {
    pub kind: ProfileKind,
    pub stats: ClassStats,
}

/// Students with their fixed scores and every profile's statistics.
#[derive(Debug, Clone)]
pub struct PreparedClass {
    pub students: Vec<GradedStudent>,
    /// Output slug per student, same order as `students`.
    pub slugs: Vec<String>,
    pub stats: Vec<ProfileStats>,
}

impl PreparedClass {
    pub fn stats_for(&self, kind: ProfileKind) -> Option<&ClassStats> {
        self.stats
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| &entry.stats)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    pub student: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub kind: ProfileKind,
    pub generated: usize,
    pub skipped: usize,
    pub failed: Vec<FailedItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub students: usize,
    pub profiles: Vec<ProfileSummary>,
    pub index_path: PathBuf,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.profiles.iter().map(|profile| profile.failed.len()).sum()
    }
}

/// Runs merge → enrich → pre-compute → stats → assemble/render → index.
#[derive(Debug, Clone)]
pub struct BulletinPipeline {
    options: PipelineOptions,
    subjects: Vec<CanonicalSubject>,
    profiles: Vec<ReportProfile>,
    markers: EnrollmentMarkers,
}

impl BulletinPipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            subjects: canonical_subjects(),
            profiles: ReportProfile::standard_set(),
            markers: EnrollmentMarkers::standard(),
        }
    }

    pub fn profiles(&self) -> &[ReportProfile] {
        &self.profiles
    }

    /// Everything up to and including the statistics; writes nothing.
    pub fn prepare(&self) -> Result<PreparedClass, BulletinError> {
        let data_dir = &self.options.data_dir;
        info!(data_dir = %data_dir.display(), "loading grade sources");

        let sources = import::load_subject_sources(data_dir, &self.subjects)?;
        let roster = RecordMerger::merge(&sources);
        if roster.is_empty() {
            error!(data_dir = %data_dir.display(), "no students in any grade source");
            return Err(BulletinError::NoStudents(data_dir.clone()));
        }

        let identity_rows = import::load_identity_rows(&data_dir.join(IDENTITY_FILE))?;
        let roster = IdentityEnricher::new(self.markers.clone()).enrich(roster, &identity_rows);

        let students = precompute_adjusted_scores(roster, &self.subjects, self.options.seed);
        let slugs = assign_slugs(&students);

        let stats = self
            .profiles
            .iter()
            .map(|profile| ProfileStats {
                kind: profile.kind,
                stats: taxonomy_stats(&students, &profile.subjects),
            })
            .collect();

        Ok(PreparedClass {
            students,
            slugs,
            stats,
        })
    }

    pub fn run(&self) -> Result<RunSummary, BulletinError> {
        let prepared = self.prepare()?;

        let layout = OutputLayout::new(&self.options.output_dir, self.options.pdf_command.is_some());
        if self.options.reset {
            info!(output_dir = %layout.root().display(), "discarding previous outputs");
            layout.reset().map_err(|source| BulletinError::Io {
                path: layout.root().to_path_buf(),
                source,
            })?;
        }
        layout.prepare().map_err(|source| BulletinError::Io {
            path: layout.root().to_path_buf(),
            source,
        })?;

        let converter = self.options.pdf_command.as_deref().map(CommandPdfConverter::new);
        let writer = DocumentWriter::new(
            &layout,
            converter.as_ref().map(|converter| converter as &dyn PdfConverter),
        );

        let mut profiles = Vec::with_capacity(self.profiles.len());
        for profile in &self.profiles {
            profiles.push(self.render_profile(profile, &prepared, &writer)?);
        }

        let index_path = self.write_index(&prepared, &layout)?;
        let summary = RunSummary {
            students: prepared.students.len(),
            profiles,
            index_path,
        };
        info!(
            students = summary.students,
            failures = summary.failures(),
            "generation run complete"
        );
        Ok(summary)
    }

    fn render_profile(
        &self,
        profile: &ReportProfile,
        prepared: &PreparedClass,
        writer: &DocumentWriter<'_>,
    ) -> Result<ProfileSummary, BulletinError> {
        let empty = ClassStats::default();
        let stats = prepared.stats_for(profile.kind).unwrap_or(&empty);
        let renderer = self.renderer_for(profile.kind)?;
        let assembler = ReportAssembler::new(profile, stats);

        let mut summary = ProfileSummary {
            kind: profile.kind,
            generated: 0,
            skipped: 0,
            failed: Vec::new(),
        };

        for (student, slug) in prepared.students.iter().zip(&prepared.slugs) {
            let outcome = writer.write(profile.kind, slug, || {
                let card = assembler.assemble(student);
                renderer.render(&card.fields())
            });
            match outcome {
                ItemOutcome::Generated => summary.generated += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
                ItemOutcome::Failed { reason } => {
                    let record = student.record();
                    summary.failed.push(FailedItem {
                        student: format!("{} {}", record.first_name, record.last_name),
                        reason,
                    });
                }
            }
        }

        info!(
            profile = profile.kind.label(),
            generated = summary.generated,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "profile rendered"
        );
        Ok(summary)
    }

    fn renderer_for(&self, kind: ProfileKind) -> Result<Box<dyn ReportRenderer>, BulletinError> {
        if let Some(dir) = &self.options.template_dir {
            let path = dir.join(format!("{}.html", kind.slug()));
            if path.exists() {
                info!(profile = kind.label(), template = %path.display(), "using custom template");
                return Ok(Box::new(TemplateRenderer::from_path(&path)?));
            }
        }
        Ok(Box::new(BuiltinLayout::new(kind)))
    }

    fn write_index(&self, prepared: &PreparedClass, layout: &OutputLayout) -> Result<PathBuf, BulletinError> {
        let entries: Vec<IndexEntry> = prepared
            .students
            .iter()
            .zip(&prepared.slugs)
            .map(|(student, slug)| {
                let record = student.record();
                IndexEntry {
                    first_name: record.first_name.clone(),
                    last_name: record.last_name.clone(),
                    email: record.email.clone(),
                    birth_date: record.birth_date,
                    enrollment_choice: record.enrollment_choice,
                    incomplete: record.is_incomplete(),
                    documents: self
                        .profiles
                        .iter()
                        .map(|profile| (profile.kind, layout.relative_target(profile.kind, slug)))
                        .collect(),
                }
            })
            .collect();

        let primary = self
            .profiles
            .first()
            .map(|profile| (&profile.institution, profile.subjects.len()));
        let fallback = ReportProfile::paes();
        let (institution, subject_count) =
            primary.unwrap_or((&fallback.institution, fallback.subjects.len()));

        let html = render_index(&entries, institution, subject_count).map_err(RenderError::from)?;
        let path = layout.index_path();
        write_file(&path, &html)?;
        info!(path = %path.display(), "index written");
        Ok(path)
    }
}

/// Slugs in student order. A slug already handed out, natural or suffixed,
/// sends the student to the next free `_N` suffix.
fn assign_slugs(students: &[GradedStudent]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    students
        .iter()
        .map(|student| {
            let base = student.record().slug();
            let mut candidate = base.clone();
            let mut suffix = 1;
            while taken.contains(&candidate) {
                suffix += 1;
                candidate = format!("{base}_{suffix}");
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn write_file(path: &Path, contents: &str) -> Result<(), BulletinError> {
    fs::write(path, contents).map_err(|source| BulletinError::Io {
        path: path.to_path_buf(),
        source,
    })
}

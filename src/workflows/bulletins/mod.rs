pub mod appreciation;
pub mod catalog;
pub mod domain;
pub mod enrich;
pub mod grading;
pub mod import;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod precompute;
pub mod report;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use catalog::{ProfileKind, ReportProfile};
pub use domain::{EnrollmentChoice, StudentKey, StudentRecord, SubjectSpec};
pub use grading::GradeTransform;
pub use pipeline::{BulletinError, BulletinPipeline, PipelineOptions, PreparedClass, RunSummary};
pub use precompute::GradedStudent;
pub use stats::{ClassStats, SubjectStats};

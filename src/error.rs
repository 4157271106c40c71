//! Top-level error returned by [`crate::pipeline::run`].

use std::io;
use std::path::PathBuf;

use crate::builder::ReportBuildError;
use crate::dataset::LoadError;

/// Fatal failures of a report run.
#[derive(Debug)]
pub enum ReportError {
    /// The dataset could not be read.
    Load(LoadError),
    /// No usable font family was found.
    Fonts(genpdf::error::Error),
    /// The PDF could not be assembled.
    Build(ReportBuildError),
    /// The PDF could not be written to disk.
    Write {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(_) => write!(f, "Failed to load the bestseller dataset"),
            Self::Fonts(_) => write!(f, "No usable font family found"),
            Self::Build(_) => write!(f, "Failed to build the report"),
            Self::Write { path, .. } => write!(f, "Failed to write {}", path.display()),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Fonts(err) => Some(err),
            Self::Build(err) => Some(err),
            Self::Write { source, .. } => Some(source),
        }
    }
}

impl From<LoadError> for ReportError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<ReportBuildError> for ReportError {
    fn from(err: ReportBuildError) -> Self {
        Self::Build(err)
    }
}

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure conditions the rotation engine distinguishes. All of them are
/// local to one root, one archive, or one source file; none aborts the run.
#[derive(Debug, Error)]
pub enum RotateError {
    #[error("root path not found: {0}")]
    PathNotFound(PathBuf),
    #[error("source file unreadable: {path}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive could not be opened or created: {path}")]
    ArchiveUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archived entry {entry} in {archive} does not match its source")]
    VerificationMismatch { archive: PathBuf, entry: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl RotateError {
    /// Stable machine-readable code used in warn lines and reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PathNotFound(_) => "PATH_NOT_FOUND",
            Self::SourceUnreadable { .. } => "SOURCE_UNREADABLE",
            Self::ArchiveUnwritable { .. } => "ARCHIVE_UNWRITABLE",
            Self::VerificationMismatch { .. } => "VERIFICATION_MISMATCH",
            Self::Io(_) => "IO",
            Self::Zip(_) => "ZIP",
        }
    }
}

// LogCorral - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors preserve the causal chain
// for diagnostic logging.
//
// Per-file failures (classification, routing, audit reads) are accumulated
// by the pipeline and never abort a stage. Only precondition failures and a
// failed report write are fatal, and those are the variants of the top-level
// `CorralError`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for fatal pipeline failures.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CorralError {
    /// A stage-level precondition failed before any work was done.
    Precondition(PreconditionError),

    /// The audit walk could not start (invalid root or marker).
    Audit(AuditError),

    /// The report could not be written.
    Report(ReportError),
}

impl fmt::Display for CorralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition(e) => write!(f, "Precondition error: {e}"),
            Self::Audit(e) => write!(f, "Audit error: {e}"),
            Self::Report(e) => write!(f, "Report error: {e}"),
        }
    }
}

impl std::error::Error for CorralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Precondition(e) => Some(e),
            Self::Audit(e) => Some(e),
            Self::Report(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

/// Errors related to deriving a service name from a file name.
/// Always per-file: the offending file is skipped, the run continues.
#[derive(Debug)]
pub enum ClassifyError {
    /// The file name does not match the classification pattern.
    NoMatch { name: String },

    /// The pattern matched but the service capture group was empty.
    EmptyService { name: String },

    /// The classification pattern is not a valid regex.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// The configured capture group does not exist in the pattern.
    MissingCaptureGroup {
        pattern: String,
        group: usize,
        groups: usize,
    },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch { name } => {
                write!(f, "'{name}' does not match the classification pattern")
            }
            Self::EmptyService { name } => {
                write!(f, "'{name}' matched but yielded an empty service name")
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid classification pattern '{pattern}': {source}")
            }
            Self::MissingCaptureGroup {
                pattern,
                group,
                groups,
            } => write!(
                f,
                "Pattern '{pattern}' has no capture group {group} \
                 ({groups} groups available)"
            ),
        }
    }
}

impl std::error::Error for ClassifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Precondition errors
// ---------------------------------------------------------------------------

/// Stage-level precondition failures. Always fatal: the pipeline halts
/// before any file is touched.
#[derive(Debug)]
pub enum PreconditionError {
    /// The source directory does not exist.
    SourceNotFound { path: PathBuf },

    /// The source path exists but is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the source directory.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The destination root could not be created.
    DestRootUncreatable { path: PathBuf, source: io::Error },

    /// The source directory could not be listed.
    Unreadable { path: PathBuf, source: io::Error },

    /// The source directory contains no log files at its top level.
    NoLogFiles { path: PathBuf },
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound { path } => {
                write!(f, "Source directory '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "'{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::DestRootUncreatable { path, source } => write!(
                f,
                "Cannot create destination root '{}': {source}",
                path.display()
            ),
            Self::Unreadable { path, source } => {
                write!(f, "Cannot list '{}': {source}", path.display())
            }
            Self::NoLogFiles { path } => {
                write!(f, "No log files found in '{}'", path.display())
            }
        }
    }
}

impl std::error::Error for PreconditionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::DestRootUncreatable { source, .. } => Some(source),
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PreconditionError> for CorralError {
    fn from(e: PreconditionError) -> Self {
        Self::Precondition(e)
    }
}

// ---------------------------------------------------------------------------
// Route errors
// ---------------------------------------------------------------------------

/// Per-file routing failures. Reported to the caller and accumulated;
/// they never abort the routing stage.
#[derive(Debug)]
pub enum RouteError {
    /// The file name could not be classified.
    Classify(ClassifyError),

    /// The source file vanished between listing and move.
    SourceVanished { path: PathBuf, source: io::Error },

    /// Permission denied on the source or the destination.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Other I/O failure during the move.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classify(e) => write!(f, "{e}"),
            Self::SourceVanished { path, source } => {
                write!(f, "'{}' vanished before the move: {source}", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(f, "Permission denied on '{}': {source}", path.display())
            }
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Classify(e) => Some(e),
            Self::SourceVanished { source, .. } => Some(source),
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ClassifyError> for RouteError {
    fn from(e: ClassifyError) -> Self {
        Self::Classify(e)
    }
}

// ---------------------------------------------------------------------------
// Audit errors
// ---------------------------------------------------------------------------

/// Errors that prevent the audit walk from starting. Per-file read failures
/// during the walk are non-fatal and surface as warning strings instead.
#[derive(Debug)]
pub enum AuditError {
    /// The audit root does not exist.
    RootNotFound { path: PathBuf },

    /// The audit root is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the audit root.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The marker token is empty; a word-boundary match needs at least
    /// one character.
    EmptyMarker,

    /// The marker token did not compile into a regex.
    InvalidMarker {
        token: String,
        source: regex::Error,
    },
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Audit root '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Audit root '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::EmptyMarker => write!(f, "Marker token must not be empty"),
            Self::InvalidMarker { token, source } => {
                write!(f, "Invalid marker token '{token}': {source}")
            }
        }
    }
}

impl std::error::Error for AuditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::InvalidMarker { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<AuditError> for CorralError {
    fn from(e: AuditError) -> Self {
        Self::Audit(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors writing the report artifact. Fatal for the report step, but the
/// routing work already done on disk is kept.
#[derive(Debug)]
pub enum ReportError {
    /// I/O error writing the report file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Report I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV report error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON report error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ReportError> for CorralError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

/// Convenience type alias for LogCorral results.
pub type Result<T> = std::result::Result<T, CorralError>;

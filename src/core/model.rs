// LogCorral - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no CLI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::RouteError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Source file (output of the source listing)
// =============================================================================

/// Metadata about a log file found in the source directory, before routing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Full path to the file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,

    /// Last modification timestamp.
    pub modified: Option<DateTime<Utc>>,
}

impl SourceFile {
    /// The file's base name, lossily converted for display and matching.
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// =============================================================================
// Route outcome
// =============================================================================

/// Result of routing a single file into the destination tree.
///
/// A name collision is an outcome, not an error: the source file stays in
/// place and the destination copy is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The file was moved to its service directory.
    Moved { from: PathBuf, to: PathBuf },

    /// The destination path already exists; nothing was moved.
    Skipped { dest: PathBuf },
}

/// A per-file routing failure, kept for the end-of-run summary.
#[derive(Debug)]
pub struct RouteFailure {
    /// The source file that failed to route.
    pub path: PathBuf,

    /// What went wrong.
    pub error: RouteError,
}

// =============================================================================
// Audit entry
// =============================================================================

/// One audited file: its base name and the number of marker matches found
/// in its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Base name of the audited file.
    pub file_name: String,

    /// Number of whole-word, case-insensitive marker occurrences.
    pub error_count: usize,
}

// =============================================================================
// Pipeline state machine
// =============================================================================

/// Stages of a pipeline run.
///
/// `PartiallyFailed` is terminal and reachable when one or more per-file
/// failures occurred but every stage otherwise completed. Per-file failures
/// never stop the pipeline from advancing to the next stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Routing,
    Auditing,
    Reporting,
    Done,
    PartiallyFailed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Routing => "routing",
            Self::Auditing => "auditing",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::PartiallyFailed => "partially failed",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Pipeline summary
// =============================================================================

/// Summary statistics for a completed pipeline run.
#[derive(Debug, Default)]
pub struct PipelineSummary {
    /// Log files found at the top level of the source directory.
    pub files_found: usize,

    /// Files moved into the destination tree.
    pub moved: usize,

    /// Files skipped because the destination already existed.
    pub skipped: usize,

    /// Per-file routing failures.
    pub route_failures: Vec<RouteFailure>,

    /// Files counted during the audit pass.
    pub files_audited: usize,

    /// Non-fatal audit warnings (unreadable files, traversal errors).
    pub audit_warnings: Vec<String>,

    /// Total marker matches across all audited files.
    pub total_matches: usize,

    /// Lines written to the report artifact.
    pub report_lines: usize,

    /// Wall-clock duration of the run.
    pub duration: std::time::Duration,

    /// Terminal state: `Done` or `PartiallyFailed`.
    pub state: PipelineState,
}

impl PipelineSummary {
    /// True if any per-file failure occurred in routing or auditing.
    pub fn has_failures(&self) -> bool {
        !self.route_failures.is_empty() || !self.audit_warnings.is_empty()
    }
}

// =============================================================================
// Pipeline progress (for caller updates)
// =============================================================================

/// Progress events delivered to the caller's callback during a run.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Routing phase started.
    RoutingStarted { total_files: usize },

    /// A file was moved into its service directory.
    FileRouted { from: PathBuf, to: PathBuf },

    /// A file was skipped because its destination already exists.
    FileSkipped { dest: PathBuf },

    /// A file failed to route (non-fatal).
    RouteFailed { path: PathBuf, message: String },

    /// Routing phase completed.
    RoutingCompleted {
        moved: usize,
        skipped: usize,
        failed: usize,
    },

    /// Audit phase started.
    AuditStarted { root: PathBuf },

    /// A file has been audited.
    FileAudited {
        file_name: String,
        error_count: usize,
    },

    /// Audit phase completed.
    AuditCompleted {
        files: usize,
        total_matches: usize,
    },

    /// The report artifact was written.
    ReportWritten { path: PathBuf, lines: usize },

    /// A non-fatal warning occurred.
    Warning { message: String },
}

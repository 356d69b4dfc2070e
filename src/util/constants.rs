// LogCorral - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogCorral";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogCorral";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Classification
// =============================================================================

/// Default filename pattern used to derive a service name.
///
/// Matches `<service>_<YYYY-MM-DD>.log`, anchored at both ends so a missing
/// date suffix or a wrong extension fails classification outright. The
/// service group is greedy: a name containing several date-like substrings
/// binds the service to everything up to the last valid date.
pub const DEFAULT_SERVICE_PATTERN: &str = r"^(.+)_([0-9]{4}-[0-9]{2}-[0-9]{2})\.log$";

/// Capture group of `DEFAULT_SERVICE_PATTERN` that holds the service name.
pub const DEFAULT_SERVICE_GROUP: usize = 1;

// =============================================================================
// Audit
// =============================================================================

/// Default marker token counted during the audit pass.
/// Compiled as a case-insensitive, word-boundary-delimited regex.
pub const DEFAULT_MARKER_TOKEN: &str = "error";

/// Default include glob patterns for audit traversal and source listing.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.log"];

/// Default exclude glob patterns for audit traversal.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.gz", "*.zip", "*.bak", "*.tmp"];

/// Maximum directory recursion depth during the audit walk.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Hard upper bound on max depth (prevents infinite traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// File size (bytes) above which audit reads switch to memory-mapped I/O.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

/// Maximum number of non-fatal warnings accumulated across a single run.
/// Prevents the warnings Vec from growing without bound when a large tree
/// contains many unreadable files.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// Report
// =============================================================================

/// Default report file name, written into the current working directory.
pub const DEFAULT_REPORT_FILE_NAME: &str = "reporte.txt";

/// Trailing label on every plain-text report line
/// (`<file>: <count> errores`). Kept verbatim for compatibility with the
/// report consumers downstream.
pub const REPORT_LINE_LABEL: &str = "errores";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

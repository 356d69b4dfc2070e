// LogCorral - pipeline/run.rs
//
// Pipeline orchestration: source listing → routing → audit → report.
//
// Architecture:
//   - The caller supplies a `PipelineConfig` and an event callback; all
//     progress flows through `PipelineEvent` values. The pipeline itself
//     never prints or prompts.
//   - Per-file failures are accumulated and reported at the end; they never
//     abort a stage. Only stage-level preconditions and a failed report
//     write halt the run.
//   - Routing is strictly sequential so the exists-check and the move on a
//     destination path form a single logical step. The audit stage
//     parallelises internally (see core::audit).
//
// Re-running the pipeline on an already-classified tree is safe: routing
// only ever adds files that are not already present at their destination.

use crate::core::audit::{audit_tree, AuditConfig, MarkerPattern};
use crate::core::classify::ServicePattern;
use crate::core::model::{
    PipelineEvent, PipelineState, PipelineSummary, RouteFailure, RouteOutcome, SourceFile,
};
use crate::core::patterns;
use crate::core::report::{write_report_file, ReportFormat};
use crate::core::route::route_file;
use crate::util::error::{PreconditionError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

// =============================================================================
// Configuration
// =============================================================================

/// Everything a pipeline run needs, passed in explicitly so runs are
/// testable and reentrant. No module-level state.
#[derive(Debug)]
pub struct PipelineConfig {
    /// Directory holding the raw log files (scanned non-recursively).
    pub source_dir: PathBuf,

    /// Root of the per-service destination tree.
    pub dest_root: PathBuf,

    /// Path of the report artifact.
    pub report_path: PathBuf,

    /// Filename classification policy.
    pub service_pattern: ServicePattern,

    /// Content marker counted during the audit.
    pub marker: MarkerPattern,

    /// Audit traversal settings (also provides the include patterns used
    /// for the source listing).
    pub audit: AuditConfig,

    /// Report output format.
    pub report_format: ReportFormat,
}

// =============================================================================
// Source listing
// =============================================================================

/// List log files at the top level of `source_dir` (non-recursive).
///
/// Entries that cannot be stat'ed are skipped with a warning; a source
/// directory that is missing, not a directory, or unlistable is a fatal
/// precondition failure. Results are sorted by file name so routing order
/// is stable across filesystems.
pub fn list_source_files(
    source_dir: &Path,
    include_patterns: &[String],
) -> std::result::Result<(Vec<SourceFile>, Vec<String>), PreconditionError> {
    match fs::metadata(source_dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(PreconditionError::NotADirectory {
                path: source_dir.to_path_buf(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(PreconditionError::PermissionDenied {
                path: source_dir.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(PreconditionError::SourceNotFound {
                path: source_dir.to_path_buf(),
            })
        }
    }

    let include_pats = patterns::compile_patterns(include_patterns, "include");

    let read_dir = fs::read_dir(source_dir).map_err(|e| PreconditionError::Unreadable {
        path: source_dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<SourceFile> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for entry_result in read_dir {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                warnings.push(format!(
                    "Cannot read an entry of '{}': {e}",
                    source_dir.display()
                ));
                continue;
            }
        };

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if !patterns::is_included(&file_name, &include_pats) {
            continue;
        }

        // Follows symlinks, so a linked log file is listed like a plain one.
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warnings.push(format!(
                    "Cannot read metadata for '{}': {e}",
                    path.display()
                ));
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let modified: Option<DateTime<Utc>> = metadata.modified().ok().map(DateTime::<Utc>::from);
        tracing::debug!(
            file = %path.display(),
            size = metadata.len(),
            modified = ?modified,
            "Source file listed"
        );

        files.push(SourceFile {
            path,
            size: metadata.len(),
            modified,
        });
    }

    files.sort_by_key(|f| f.base_name());

    Ok((files, warnings))
}

// =============================================================================
// Pipeline
// =============================================================================

/// Run the full pipeline: list → route → audit → report.
///
/// Progress is delivered through `on_event`. Returns the run summary, whose
/// terminal state is `Done` or, when any per-file failure occurred,
/// `PartiallyFailed`. A partial report is always preferred over an aborted
/// run.
pub fn run_pipeline<F>(config: &PipelineConfig, mut on_event: F) -> Result<PipelineSummary>
where
    F: FnMut(PipelineEvent),
{
    let start = Instant::now();
    let mut state = PipelineState::Idle;
    let mut summary = PipelineSummary::default();

    tracing::debug!(
        %state,
        source = %config.source_dir.display(),
        dest = %config.dest_root.display(),
        "Pipeline starting"
    );

    // -------------------------------------------------------------------------
    // Preconditions
    // -------------------------------------------------------------------------
    let (sources, listing_warnings) =
        list_source_files(&config.source_dir, &config.audit.include_patterns)?;

    for warning in listing_warnings {
        tracing::warn!(warning = %warning, "Source listing warning");
        on_event(PipelineEvent::Warning { message: warning });
    }

    if sources.is_empty() {
        return Err(PreconditionError::NoLogFiles {
            path: config.source_dir.clone(),
        }
        .into());
    }

    fs::create_dir_all(&config.dest_root).map_err(|e| PreconditionError::DestRootUncreatable {
        path: config.dest_root.clone(),
        source: e,
    })?;

    summary.files_found = sources.len();

    // -------------------------------------------------------------------------
    // Phase 1: Routing
    // -------------------------------------------------------------------------
    state = PipelineState::Routing;
    tracing::info!(%state, files = sources.len(), "Routing started");
    on_event(PipelineEvent::RoutingStarted {
        total_files: sources.len(),
    });

    for source in &sources {
        match route_file(&source.path, &config.dest_root, &config.service_pattern) {
            Ok(RouteOutcome::Moved { from, to }) => {
                summary.moved += 1;
                on_event(PipelineEvent::FileRouted { from, to });
            }
            Ok(RouteOutcome::Skipped { dest }) => {
                summary.skipped += 1;
                on_event(PipelineEvent::FileSkipped { dest });
            }
            Err(e) => {
                tracing::warn!(file = %source.path.display(), error = %e, "Route failed");
                on_event(PipelineEvent::RouteFailed {
                    path: source.path.clone(),
                    message: e.to_string(),
                });
                summary.route_failures.push(RouteFailure {
                    path: source.path.clone(),
                    error: e,
                });
            }
        }
    }

    on_event(PipelineEvent::RoutingCompleted {
        moved: summary.moved,
        skipped: summary.skipped,
        failed: summary.route_failures.len(),
    });

    // -------------------------------------------------------------------------
    // Phase 2: Auditing
    // -------------------------------------------------------------------------
    state = PipelineState::Auditing;
    tracing::info!(%state, root = %config.dest_root.display(), "Audit started");
    on_event(PipelineEvent::AuditStarted {
        root: config.dest_root.clone(),
    });

    let (entries, audit_warnings) = audit_tree(
        &config.dest_root,
        &config.marker,
        &config.audit,
        |entry, _| {
            on_event(PipelineEvent::FileAudited {
                file_name: entry.file_name.clone(),
                error_count: entry.error_count,
            });
        },
    )?;

    for warning in &audit_warnings {
        on_event(PipelineEvent::Warning {
            message: warning.clone(),
        });
    }

    summary.files_audited = entries.len();
    summary.total_matches = entries.iter().map(|e| e.error_count).sum();
    summary.audit_warnings = audit_warnings;

    on_event(PipelineEvent::AuditCompleted {
        files: summary.files_audited,
        total_matches: summary.total_matches,
    });

    // -------------------------------------------------------------------------
    // Phase 3: Reporting
    // -------------------------------------------------------------------------
    state = PipelineState::Reporting;
    tracing::info!(
        %state,
        path = %config.report_path.display(),
        format = config.report_format.label(),
        "Report started"
    );

    // A report failure is fatal, but the routing work above stays on disk.
    summary.report_lines = write_report_file(&entries, &config.report_path, config.report_format)?;

    on_event(PipelineEvent::ReportWritten {
        path: config.report_path.clone(),
        lines: summary.report_lines,
    });

    state = if summary.has_failures() {
        PipelineState::PartiallyFailed
    } else {
        PipelineState::Done
    };
    summary.state = state;
    summary.duration = start.elapsed();

    tracing::info!(
        %state,
        moved = summary.moved,
        skipped = summary.skipped,
        route_failures = summary.route_failures.len(),
        audited = summary.files_audited,
        matches = summary.total_matches,
        elapsed_ms = summary.duration.as_millis() as u64,
        "Pipeline finished"
    );

    Ok(summary)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::constants;
    use crate::util::error::CorralError;
    use std::fs;
    use tempfile::TempDir;

    fn config(source: &Path, dest: &Path, report: &Path) -> PipelineConfig {
        PipelineConfig {
            source_dir: source.to_path_buf(),
            dest_root: dest.to_path_buf(),
            report_path: report.to_path_buf(),
            service_pattern: ServicePattern::standard().unwrap(),
            marker: MarkerPattern::word(constants::DEFAULT_MARKER_TOKEN).unwrap(),
            audit: AuditConfig::default(),
            report_format: ReportFormat::Text,
        }
    }

    #[test]
    fn test_list_is_non_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b_2024-01-01.log"), "x").unwrap();
        fs::write(dir.path().join("a_2024-01-01.log"), "x").unwrap();
        fs::write(dir.path().join("readme.md"), "x").unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("c_2024-01-01.log"), "x").unwrap();

        let include = vec!["*.log".to_string()];
        let (files, warnings) = list_source_files(dir.path(), &include).unwrap();

        assert!(warnings.is_empty());
        let names: Vec<_> = files.iter().map(|f| f.base_name()).collect();
        assert_eq!(names, vec!["a_2024-01-01.log", "b_2024-01-01.log"]);
    }

    #[test]
    fn test_list_missing_source_is_fatal() {
        let result = list_source_files(Path::new("/nonexistent/logcorral-src"), &[]);
        assert!(matches!(result, Err(PreconditionError::SourceNotFound { .. })));
    }

    #[test]
    fn test_list_source_file_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.log");
        fs::write(&file, "x").unwrap();
        let result = list_source_files(&file, &[]);
        assert!(matches!(result, Err(PreconditionError::NotADirectory { .. })));
    }

    #[test]
    fn test_empty_source_halts_before_any_work() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let report = src.path().join("reporte.txt");

        let result = run_pipeline(&config(src.path(), dst.path(), &report), |_| {});
        assert!(matches!(
            result,
            Err(CorralError::Precondition(PreconditionError::NoLogFiles { .. }))
        ));
        assert!(!report.exists(), "no report may be written on a halt");
    }

    #[test]
    fn test_clean_run_reaches_done() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let report = src.path().join("reporte.txt");

        fs::write(src.path().join("auth_2024-01-01.log"), "Error once\n").unwrap();
        fs::write(src.path().join("auth_2024-01-02.log"), "no problems\n").unwrap();

        let summary = run_pipeline(&config(src.path(), dst.path(), &report), |_| {}).unwrap();

        assert_eq!(summary.state, PipelineState::Done);
        assert_eq!(summary.files_found, 2);
        assert_eq!(summary.moved, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.files_audited, 2);
        assert_eq!(summary.total_matches, 1);
        assert_eq!(summary.report_lines, 2);
    }

    #[test]
    fn test_unclassifiable_file_yields_partial_failure() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let report = src.path().join("reporte.txt");

        fs::write(src.path().join("auth_2024-01-01.log"), "ok\n").unwrap();
        fs::write(src.path().join("undated.log"), "error\n").unwrap();

        let summary = run_pipeline(&config(src.path(), dst.path(), &report), |_| {}).unwrap();

        assert_eq!(summary.state, PipelineState::PartiallyFailed);
        assert_eq!(summary.moved, 1, "good file must still route");
        assert_eq!(summary.route_failures.len(), 1);
        assert!(
            src.path().join("undated.log").exists(),
            "failed file stays in the source"
        );
        assert!(report.exists(), "report must still be written");
    }

    #[test]
    fn test_second_run_skips_everything_already_routed() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let report = src.path().join("reporte.txt");

        fs::write(src.path().join("auth_2024-01-01.log"), "Error\n").unwrap();
        run_pipeline(&config(src.path(), dst.path(), &report), |_| {}).unwrap();

        // Same name reappears in the source; its destination is occupied.
        fs::write(src.path().join("auth_2024-01-01.log"), "different content\n").unwrap();
        let mut skips = 0usize;
        let summary = run_pipeline(&config(src.path(), dst.path(), &report), |event| {
            if matches!(event, PipelineEvent::FileSkipped { .. }) {
                skips += 1;
            }
        })
        .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(skips, 1, "the skip must surface as an event");
        assert!(
            src.path().join("auth_2024-01-01.log").exists(),
            "collided source stays in place"
        );
        assert_eq!(
            fs::read_to_string(dst.path().join("auth").join("auth_2024-01-01.log")).unwrap(),
            "Error\n",
            "destination content must be untouched"
        );
    }

    #[test]
    fn test_unwritable_report_is_fatal_but_routing_is_kept() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let report = src.path().join("no-such-dir").join("reporte.txt");

        fs::write(src.path().join("auth_2024-01-01.log"), "x\n").unwrap();

        let result = run_pipeline(&config(src.path(), dst.path(), &report), |_| {});
        assert!(matches!(result, Err(CorralError::Report(_))));
        assert!(
            dst.path().join("auth").join("auth_2024-01-01.log").exists(),
            "routing work must survive a report failure"
        );
    }
}

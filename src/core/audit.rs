// LogCorral - core/audit.rs
//
// Error audit: recursively walk the classified tree, count marker matches
// per log file, and return one entry per audited file.
//
// Each invocation performs a fresh traversal (no retained cursor), so the
// audit is restartable. Files are never mutated during an audit, which is
// what makes the per-file counting safe to run in parallel. Traversal order
// is made deterministic by sorting directory entries by file name; the
// parallel counting preserves that order in its output.
//
// Per-file read failures are non-fatal: they become warning strings and the
// file is excluded from the results. Only an invalid root or marker aborts
// the audit.

use crate::core::model::AuditEntry;
use crate::core::patterns;
use crate::util::constants;
use crate::util::error::AuditError;
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// =============================================================================
// Marker pattern
// =============================================================================

/// A compiled content marker: a case-insensitive, word-boundary-delimited
/// match of a literal token.
///
/// The default token "error" compiles to `(?i)\berror\b`: it matches
/// "error", "Error" and "ERROR" as standalone tokens, but not occurrences
/// embedded in a larger word such as "errors" or "errorless", because the
/// boundary requires a non-alphanumeric neighbour on both sides.
#[derive(Debug, Clone)]
pub struct MarkerPattern {
    regex: Regex,
    token: String,
}

impl MarkerPattern {
    /// Compile a whole-word marker from a literal token.
    /// The token is escaped, so regex metacharacters in it match literally.
    pub fn word(token: &str) -> Result<Self, AuditError> {
        if token.is_empty() {
            return Err(AuditError::EmptyMarker);
        }

        let pattern = format!(r"(?i)\b{}\b", regex::escape(token));
        let regex = Regex::new(&pattern).map_err(|e| AuditError::InvalidMarker {
            token: token.to_string(),
            source: e,
        })?;

        Ok(Self {
            regex,
            token: token.to_string(),
        })
    }

    /// The literal token this marker was built from.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Count marker occurrences in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for an audit walk.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Glob patterns (filename-only) that a file MUST match to be audited.
    pub include_patterns: Vec<String>,

    /// Glob patterns matched against filenames AND directory component
    /// names. Matching files are skipped; matching directories are not
    /// descended into.
    pub exclude_patterns: Vec<String>,

    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// File size (bytes) above which reads switch to memory-mapped I/O.
    pub large_file_threshold: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_depth: constants::DEFAULT_MAX_DEPTH,
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
        }
    }
}

// =============================================================================
// Audit walk
// =============================================================================

/// Audit every matching file under `root`, counting `marker` occurrences.
///
/// # Progress reporting
/// `on_file` is called once per audited file, receiving the entry and the
/// running count of files audited so far. The callback should be cheap; it
/// is called on the caller's thread after the parallel counting completes.
///
/// # Non-fatal errors
/// Files that cannot be read are recorded as human-readable strings in the
/// returned warnings vector and excluded from the entries.
///
/// # Fatal errors
/// Returns `Err` only if the root path is invalid.
pub fn audit_tree<F>(
    root: &Path,
    marker: &MarkerPattern,
    config: &AuditConfig,
    mut on_file: F,
) -> Result<(Vec<AuditEntry>, Vec<String>), AuditError>
where
    F: FnMut(&AuditEntry, usize),
{
    preflight(root)?;

    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        marker = marker.token(),
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Audit starting"
    );

    let include_pats = patterns::compile_patterns(&config.include_patterns, "include");
    let exclude_pats = patterns::compile_patterns(&config.exclude_patterns, "exclude");

    let mut warnings: Vec<String> = Vec::new();
    let mut candidates: Vec<(PathBuf, u64)> = Vec::new();

    // Sorted traversal keeps the report order stable across runs and
    // filesystems. filter_entry short-circuits descent into excluded
    // directory names.
    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_str().unwrap_or("");
                return !patterns::is_excluded_component(name, &exclude_pats);
            }
            true
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                push_warning(&mut warnings, format!("Cannot access '{path_str}': {e}"));
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                push_warning(
                    &mut warnings,
                    format!("Skipping '{}': non-UTF-8 filename", path.display()),
                );
                continue;
            }
        };

        if patterns::is_excluded_filename(file_name, &exclude_pats) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }
        if !patterns::is_included(file_name, &include_pats) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                push_warning(
                    &mut warnings,
                    format!("Cannot read metadata for '{}': {e}", path.display()),
                );
                continue;
            }
        };

        candidates.push((path.to_path_buf(), size));
    }

    // Parallel counting phase. Indexed collect keeps the results in
    // traversal order.
    let results: Vec<std::result::Result<AuditEntry, String>> = candidates
        .par_iter()
        .map(|(path, size)| {
            let is_large = *size >= config.large_file_threshold;
            match read_log_content(path, is_large) {
                Ok(content) => {
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    Ok(AuditEntry {
                        file_name,
                        error_count: marker.count(&content),
                    })
                }
                Err(e) => Err(format!("Cannot read '{}': {e}", path.display())),
            }
        })
        .collect();

    let mut entries: Vec<AuditEntry> = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(entry) => {
                on_file(&entry, entries.len() + 1);
                entries.push(entry);
            }
            Err(warning) => {
                tracing::warn!(warning = %warning, "Audit read failed");
                push_warning(&mut warnings, warning);
            }
        }
    }

    tracing::debug!(
        files = entries.len(),
        warnings = warnings.len(),
        "Audit complete"
    );

    Ok((entries, warnings))
}

/// Validate the audit root, distinguishing missing, non-directory and
/// access-denied paths. `fs::metadata` is used rather than `Path::is_dir`
/// because the helpers map all errors to `false`, hiding PermissionDenied.
fn preflight(root: &Path) -> Result<(), AuditError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(AuditError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(AuditError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(AuditError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

/// Append a warning, saturating at the global cap so a pathological tree
/// cannot grow the vector without bound.
fn push_warning(warnings: &mut Vec<String>, warning: String) {
    if warnings.len() < constants::MAX_WARNINGS {
        warnings.push(warning);
    } else {
        tracing::debug!(warning = %warning, "Warning cap reached, suppressing");
    }
}

/// Read a log file's full content for counting.
///
/// Invalid UTF-8 is converted lossily so a stray byte never aborts the
/// audit. Large files are memory-mapped to avoid doubling their footprint
/// on the heap.
fn read_log_content(path: &Path, is_large: bool) -> io::Result<String> {
    if is_large {
        let file = fs::File::open(path)?;
        // SAFETY: the file is opened read-only and the map is never
        // mutated. External modification of the file during the map's
        // lifetime is the documented residual risk, acceptable for an
        // audit pass over already-written log files.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Ok(String::from_utf8_lossy(&mmap).into_owned())
    } else {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn marker() -> MarkerPattern {
        MarkerPattern::word("error").unwrap()
    }

    #[test]
    fn test_marker_counts_whole_words_case_insensitive() {
        let m = marker();
        assert_eq!(m.count("error Error ERROR"), 3);
        assert_eq!(m.count("no marker here"), 0);
    }

    #[test]
    fn test_marker_excludes_embedded_occurrences() {
        let m = marker();
        // "errors" and "errorless" continue with a word character, so the
        // right boundary fails; "error-prone" and "(error)" still match.
        assert_eq!(m.count("errors errorless"), 0);
        assert_eq!(m.count("error-prone (error)"), 2);
    }

    #[test]
    fn test_marker_escapes_literal_tokens() {
        let m = MarkerPattern::word("e.r").unwrap();
        assert_eq!(m.count("e.r ear exr"), 1, "dot must match literally");
    }

    #[test]
    fn test_empty_marker_rejected() {
        assert!(matches!(
            MarkerPattern::word(""),
            Err(AuditError::EmptyMarker)
        ));
    }

    fn make_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("b.log"), "Error at start\nall fine\nerror again\n").unwrap();
        fs::write(root.join("a.log"), "clean run\n").unwrap();
        fs::write(root.join("notes.txt"), "error error error\n").unwrap();

        let sub = root.join("auth");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("c.log"), "one ERROR\n").unwrap();

        dir
    }

    #[test]
    fn test_audits_tree_recursively_in_name_order() {
        let dir = make_tree();
        let (entries, warnings) =
            audit_tree(dir.path(), &marker(), &AuditConfig::default(), |_, _| {}).unwrap();

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

        // Depth-first sorted traversal: a.log, then the auth/ subtree,
        // then b.log.
        let summary: Vec<(String, usize)> = entries
            .iter()
            .map(|e| (e.file_name.clone(), e.error_count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a.log".to_string(), 0),
                ("c.log".to_string(), 1),
                ("b.log".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_non_log_files_are_not_audited() {
        let dir = make_tree();
        let (entries, _) =
            audit_tree(dir.path(), &marker(), &AuditConfig::default(), |_, _| {}).unwrap();
        assert!(
            entries.iter().all(|e| e.file_name != "notes.txt"),
            "only include-matched files may be audited"
        );
    }

    #[test]
    fn test_callback_fires_per_audited_file() {
        let dir = make_tree();
        let mut calls = 0usize;
        let (entries, _) = audit_tree(dir.path(), &marker(), &AuditConfig::default(), |_, n| {
            calls = n;
        })
        .unwrap();
        assert_eq!(calls, entries.len());
    }

    #[test]
    fn test_directory_named_like_a_log_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("trap.log")).unwrap();
        fs::write(dir.path().join("real.log"), "error\n").unwrap();

        let (entries, warnings) =
            audit_tree(dir.path(), &marker(), &AuditConfig::default(), |_, _| {}).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "real.log");
        assert!(warnings.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_becomes_warning() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.log"), "error\n").unwrap();
        // A dangling symlink reads as NotFound once the audit opens it.
        std::os::unix::fs::symlink(
            dir.path().join("missing-target"),
            dir.path().join("broken.log"),
        )
        .unwrap();

        let (entries, warnings) =
            audit_tree(dir.path(), &marker(), &AuditConfig::default(), |_, _| {}).unwrap();

        assert_eq!(entries.len(), 1, "readable file must still be audited");
        assert_eq!(entries[0].file_name, "ok.log");
        assert_eq!(warnings.len(), 1, "unreadable file must surface a warning");
        assert!(warnings[0].contains("broken.log"));
    }

    #[test]
    fn test_root_not_found() {
        let result = audit_tree(
            Path::new("/nonexistent/logcorral-audit"),
            &marker(),
            &AuditConfig::default(),
            |_, _| {},
        );
        assert!(matches!(result, Err(AuditError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.log");
        fs::write(&file, "x").unwrap();
        let result = audit_tree(&file, &marker(), &AuditConfig::default(), |_, _| {});
        assert!(matches!(result, Err(AuditError::NotADirectory { .. })));
    }

    #[test]
    fn test_custom_marker_token() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("svc.log"), "FAIL fail failed\n").unwrap();

        let m = MarkerPattern::word("fail").unwrap();
        let (entries, _) =
            audit_tree(dir.path(), &m, &AuditConfig::default(), |_, _| {}).unwrap();
        assert_eq!(entries[0].error_count, 2, "'failed' must not count");
    }
}

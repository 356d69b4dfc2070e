// LogCorral - core/route.rs
//
// File routing: move a classified log file into its per-service directory
// under the destination root.
//
// Invariants:
//   - Routing never overwrites an existing destination file. A collision
//     yields `RouteOutcome::Skipped` and leaves the source in place.
//   - A partially-copied file is never visible at the destination path:
//     the cross-device fallback stages into a hidden temp file and renames
//     it into place.
//   - Per-file I/O errors are returned to the caller for accumulation; they
//     must not abort processing of the remaining files.

use crate::core::classify::ServicePattern;
use crate::core::model::RouteOutcome;
use crate::util::error::{ClassifyError, RouteError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Route a single log file into `dest_root/<service>/<base name>`.
///
/// The service name is derived from the file's base name via `pattern`.
/// The service directory is created on demand (idempotent; a pre-existing
/// directory is not an error). If the destination path already exists the
/// outcome is `Skipped`: no data moves and the source is untouched.
pub fn route_file(
    source: &Path,
    dest_root: &Path,
    pattern: &ServicePattern,
) -> Result<RouteOutcome, RouteError> {
    // Non-UTF-8 names cannot be classified; fail per-file like any other
    // unmatched name rather than routing under a mangled name.
    let name = match source.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_string(),
        None => {
            return Err(RouteError::Classify(ClassifyError::NoMatch {
                name: source.to_string_lossy().into_owned(),
            }))
        }
    };

    let service = pattern.classify(&name)?;

    let service_dir = dest_root.join(&service);
    fs::create_dir_all(&service_dir).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => RouteError::PermissionDenied {
            path: service_dir.clone(),
            source: e,
        },
        _ => RouteError::Io {
            path: service_dir.clone(),
            operation: "create service directory",
            source: e,
        },
    })?;

    let dest = service_dir.join(&name);
    if dest.exists() {
        tracing::warn!(
            dest = %dest.display(),
            "Destination already exists, skipping"
        );
        return Ok(RouteOutcome::Skipped { dest });
    }

    move_file(source, &dest)?;

    tracing::debug!(
        from = %source.display(),
        to = %dest.display(),
        service = %service,
        "File routed"
    );

    Ok(RouteOutcome::Moved {
        from: source.to_path_buf(),
        to: dest,
    })
}

/// Move `from` to `to`, preserving metadata.
///
/// `fs::rename` handles the same-filesystem case atomically and keeps the
/// mtime. When the destination is on another filesystem, rename fails and
/// the copy-then-delete fallback takes over.
fn move_file(from: &Path, to: &Path) -> Result<(), RouteError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RouteError::SourceVanished {
            path: from.to_path_buf(),
            source: e,
        }),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(RouteError::PermissionDenied {
                path: from.to_path_buf(),
                source: e,
            })
        }
        Err(e) => {
            tracing::debug!(
                from = %from.display(),
                error = %e,
                "Rename failed, falling back to copy-then-delete"
            );
            copy_then_remove(from, to)
        }
    }
}

/// Cross-device fallback: copy into a hidden temp file beside the
/// destination, restore the source mtime, rename into place, then remove
/// the source. The temp file lives in the destination directory so the
/// final rename stays on one filesystem.
fn copy_then_remove(from: &Path, to: &Path) -> Result<(), RouteError> {
    let tmp = staging_path(to);

    if let Err(e) = fs::copy(from, &tmp) {
        // Best effort: never leave a partial staging file behind.
        let _ = fs::remove_file(&tmp);
        return Err(match e.kind() {
            io::ErrorKind::NotFound => RouteError::SourceVanished {
                path: from.to_path_buf(),
                source: e,
            },
            io::ErrorKind::PermissionDenied => RouteError::PermissionDenied {
                path: from.to_path_buf(),
                source: e,
            },
            _ => RouteError::Io {
                path: from.to_path_buf(),
                operation: "copy",
                source: e,
            },
        });
    }

    restore_mtime(from, &tmp);

    if let Err(e) = fs::rename(&tmp, to) {
        let _ = fs::remove_file(&tmp);
        return Err(RouteError::Io {
            path: to.to_path_buf(),
            operation: "rename staged copy",
            source: e,
        });
    }

    fs::remove_file(from).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => RouteError::PermissionDenied {
            path: from.to_path_buf(),
            source: e,
        },
        _ => RouteError::Io {
            path: from.to_path_buf(),
            operation: "remove source",
            source: e,
        },
    })
}

/// Hidden staging name beside the destination: `.<base name>.incoming`.
fn staging_path(to: &Path) -> PathBuf {
    let base = to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    to.with_file_name(format!(".{base}.incoming"))
}

/// Copy the source's mtime onto the staged file. Failure here is logged
/// but does not fail the move: the content is already safe.
fn restore_mtime(from: &Path, staged: &Path) {
    let mtime = match fs::metadata(from).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(
                file = %from.display(),
                error = %e,
                "Cannot read source mtime"
            );
            return;
        }
    };

    let result = fs::OpenOptions::new()
        .write(true)
        .open(staged)
        .and_then(|f| f.set_modified(mtime));

    if let Err(e) = result {
        tracing::warn!(
            file = %staged.display(),
            error = %e,
            "Cannot restore mtime on staged copy"
        );
    }
}

// =============================================================================
// Tests
// =============================================================================

// LogCorral - core/report.rs
//
// Report serialisation: one line per audited file.
//
// The plain-text form is the format of record and keeps its historical
// `<file>: <count> errores` line verbatim; CSV and JSON are alternates for
// machine consumers, written through any Write trait object.
//
// Any I/O failure here is fatal to the report step only. Routing work
// already done on disk is never undone by a failed report.

use crate::core::model::AuditEntry;
use crate::util::constants;
use crate::util::error::ReportError;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

// =============================================================================
// Format selection
// =============================================================================

/// Output format of the report artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// `<file>: <count> errores` lines.
    #[default]
    Text,

    /// CSV with a `file,error_count` header.
    Csv,

    /// Pretty-printed JSON array of entries.
    Json,
}

impl ReportFormat {
    /// Parse a user-supplied format name. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Canonical name for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

// =============================================================================
// Writers
// =============================================================================

/// Write the plain-text report to `dest`, truncating any existing file.
///
/// One line per entry, in the order given:
/// `<file name>: <count> errores`
pub fn write_report(entries: &[AuditEntry], dest: &Path) -> Result<usize, ReportError> {
    let file = fs::File::create(dest).map_err(|e| ReportError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        writeln!(
            writer,
            "{}: {} {}",
            entry.file_name,
            entry.error_count,
            constants::REPORT_LINE_LABEL
        )
        .map_err(|e| ReportError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| ReportError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(entries.len())
}

/// Write entries as CSV: `file,error_count` header plus one record each.
pub fn write_csv<W: Write>(
    entries: &[AuditEntry],
    writer: W,
    report_path: &Path,
) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["file", "error_count"])
        .map_err(|e| ReportError::Csv {
            path: report_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for entry in entries {
        csv_writer
            .write_record([&entry.file_name, &entry.error_count.to_string()])
            .map_err(|e| ReportError::Csv {
                path: report_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ReportError::Io {
        path: report_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Write entries as a pretty-printed JSON array.
pub fn write_json<W: Write>(
    entries: &[AuditEntry],
    writer: W,
    report_path: &Path,
) -> Result<usize, ReportError> {
    serde_json::to_writer_pretty(writer, entries).map_err(|e| ReportError::Json {
        path: report_path.to_path_buf(),
        source: e,
    })?;
    Ok(entries.len())
}

/// Write the report artifact to `dest` in the chosen format,
/// truncating any existing file.
pub fn write_report_file(
    entries: &[AuditEntry],
    dest: &Path,
    format: ReportFormat,
) -> Result<usize, ReportError> {
    match format {
        ReportFormat::Text => write_report(entries, dest),
        ReportFormat::Csv => {
            let file = fs::File::create(dest).map_err(|e| ReportError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
            write_csv(entries, BufWriter::new(file), dest)
        }
        ReportFormat::Json => {
            let file = fs::File::create(dest).map_err(|e| ReportError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
            write_json(entries, BufWriter::new(file), dest)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries() -> Vec<AuditEntry> {
        vec![
            AuditEntry {
                file_name: "a.log".to_string(),
                error_count: 2,
            },
            AuditEntry {
                file_name: "b.log".to_string(),
                error_count: 0,
            },
        ]
    }

    #[test]
    fn test_text_report_exact_lines() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("reporte.txt");

        let lines = write_report(&entries(), &dest).unwrap();
        assert_eq!(lines, 2);

        let content = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(content, "a.log: 2 errores\nb.log: 0 errores\n");
    }

    #[test]
    fn test_text_report_truncates_previous_content() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("reporte.txt");
        std::fs::write(&dest, "stale line\nstale line\nstale line\n").unwrap();

        write_report(&entries()[..1], &dest).unwrap();

        let content = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(content, "a.log: 2 errores\n", "old content must be gone");
    }

    #[test]
    fn test_csv_report() {
        let mut buf = Vec::new();
        let count = write_csv(&entries(), &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("file,error_count\n"));
        assert!(output.contains("a.log,2"));
        assert!(output.contains("b.log,0"));
    }

    #[test]
    fn test_json_report() {
        let mut buf = Vec::new();
        let count = write_json(&entries(), &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 2);

        let parsed: Vec<AuditEntry> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, entries());
    }

    #[test]
    fn test_unwritable_destination_is_fatal() {
        let result = write_report(&entries(), Path::new("/nonexistent/dir/reporte.txt"));
        assert!(matches!(result, Err(ReportError::Io { .. })));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ReportFormat::parse("text"), Some(ReportFormat::Text));
        assert_eq!(ReportFormat::parse("TXT"), Some(ReportFormat::Text));
        assert_eq!(ReportFormat::parse("csv"), Some(ReportFormat::Csv));
        assert_eq!(ReportFormat::parse("Json"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::parse("yaml"), None);
    }

    #[test]
    fn test_dispatch_by_format() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("reporte.json");
        write_report_file(&entries(), &dest, ReportFormat::Json).unwrap();

        let parsed: Vec<AuditEntry> =
            serde_json::from_slice(&std::fs::read(&dest).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}

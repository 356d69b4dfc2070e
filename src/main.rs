// LogCorral - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Confirmation prompts (report overwrite, destination-root creation)
// 4. Pipeline invocation and progress output

use clap::Parser;
use logcorral::core::audit::{AuditConfig, MarkerPattern};
use logcorral::core::classify::ServicePattern;
use logcorral::core::model::{PipelineEvent, PipelineState};
use logcorral::core::report::ReportFormat;
use logcorral::pipeline::{list_source_files, run_pipeline, PipelineConfig};
use logcorral::platform::config::{load_config, PlatformPaths};
use logcorral::platform::confirm::{AssumeYes, Confirm, StdinConfirm};
use logcorral::util;
use std::path::PathBuf;

/// LogCorral - classify log files into per-service directories and audit
/// them for error markers.
///
/// Point LogCorral at a directory of raw log files: each file is moved into
/// a per-service subdirectory derived from its name, then the classified
/// tree is scanned and a per-file error count report is written.
#[derive(Parser, Debug)]
#[command(name = "logcorral", version, about)]
struct Cli {
    /// Directory containing the raw log files to classify.
    source_dir: PathBuf,

    /// Destination root for the per-service tree.
    #[arg(short = 'D', long = "dest")]
    dest: Option<PathBuf>,

    /// Report file path (default: reporte.txt in the working directory).
    #[arg(short = 'r', long = "report")]
    report: Option<PathBuf>,

    /// Filename classification regex.
    #[arg(long = "pattern")]
    pattern: Option<String>,

    /// Capture group of the classification regex holding the service name.
    #[arg(long = "service-group")]
    service_group: Option<usize>,

    /// Marker token counted in each audited file.
    #[arg(short = 'm', long = "marker")]
    marker: Option<String>,

    /// Report format: text, csv, or json.
    #[arg(short = 'F', long = "format")]
    format: Option<String>,

    /// Answer yes to every confirmation prompt.
    #[arg(short = 'y', long = "assume-yes")]
    assume_yes: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging init so the configured level can take
    // effect; load-time diagnostics come back as strings and are logged
    // right after init.
    let platform_paths = PlatformPaths::resolve();
    let (config, config_warnings) = load_config(&platform_paths.config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogCorral starting"
    );

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // ---- Resolve effective settings: CLI flag > config file > default ----

    let dest_root = match cli.dest.or(config.dest_root) {
        Some(d) => d,
        None => {
            eprintln!(
                "Error: no destination root configured. \
                 Pass --dest or set [routing] dest_root in config.toml."
            );
            std::process::exit(1);
        }
    };

    let report_path = cli
        .report
        .or(config.report_path)
        .unwrap_or_else(|| PathBuf::from(util::constants::DEFAULT_REPORT_FILE_NAME));

    let pattern_str = cli.pattern.unwrap_or(config.service_pattern);
    let service_group = cli.service_group.unwrap_or(config.service_group);
    let service_pattern = match ServicePattern::new(&pattern_str, service_group) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing::debug!(
        pattern = service_pattern.as_str(),
        group = service_group,
        "Classification policy"
    );

    let marker_token = cli.marker.unwrap_or(config.marker_token);
    let marker = match MarkerPattern::word(&marker_token) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let report_format = match cli.format {
        Some(ref s) => match ReportFormat::parse(s) {
            Some(f) => f,
            None => {
                eprintln!("Error: unknown report format '{s}'. Valid values: text, csv, json.");
                std::process::exit(1);
            }
        },
        None => config.report_format,
    };

    let audit = AuditConfig {
        include_patterns: config.include_patterns,
        exclude_patterns: config.exclude_patterns,
        max_depth: config.max_depth,
        large_file_threshold: config.large_file_threshold,
    };

    // ---- List the source files up front, like ls before the move ----

    match list_source_files(&cli.source_dir, &audit.include_patterns) {
        Ok((files, _)) => {
            for file in &files {
                println!("{}", file.path.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    // ---- Confirmations (never inside the pipeline) ----

    let mut confirm: Box<dyn Confirm> = if cli.assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };

    if report_path.exists() {
        let prompt = format!(
            "Report file '{}' already exists. Overwrite?",
            report_path.display()
        );
        if !confirm.confirm(&prompt) {
            eprintln!("Aborted.");
            std::process::exit(1);
        }
    }

    if !dest_root.exists() {
        let prompt = format!("Create destination root '{}'?", dest_root.display());
        if !confirm.confirm(&prompt) {
            eprintln!("Aborted.");
            std::process::exit(1);
        }
    }

    // ---- Run ----

    let pipeline_config = PipelineConfig {
        source_dir: cli.source_dir,
        dest_root,
        report_path,
        service_pattern,
        marker,
        audit,
        report_format,
    };

    let result = run_pipeline(&pipeline_config, |event| match event {
        PipelineEvent::RoutingStarted { total_files } => {
            println!("Routing {total_files} log files...");
        }
        PipelineEvent::FileRouted { from, to } => {
            println!("  {} -> {}", from.display(), to.display());
        }
        PipelineEvent::FileSkipped { dest } => {
            eprintln!("Warning: {} already exists. Skipping.", dest.display());
        }
        PipelineEvent::RouteFailed { message, .. } => {
            eprintln!("Error: {message}");
        }
        PipelineEvent::RoutingCompleted {
            moved,
            skipped,
            failed,
        } => {
            println!("Routing done: {moved} moved, {skipped} skipped, {failed} failed.");
        }
        PipelineEvent::AuditStarted { root } => {
            println!("Auditing {}...", root.display());
        }
        PipelineEvent::FileAudited { .. } => {}
        PipelineEvent::AuditCompleted {
            files,
            total_matches,
        } => {
            println!("Audited {files} files, {total_matches} marker matches.");
        }
        PipelineEvent::ReportWritten { path, lines } => {
            println!("Report written to {} ({lines} lines).", path.display());
        }
        PipelineEvent::Warning { message } => {
            eprintln!("Warning: {message}");
        }
    });

    match result {
        Ok(summary) => {
            if summary.state == PipelineState::PartiallyFailed {
                eprintln!(
                    "Completed with {} routing failure(s) and {} audit warning(s).",
                    summary.route_failures.len(),
                    summary.audit_warnings.len()
                );
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Pipeline failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

// LogCorral - platform/config.rs
//
// Platform config-directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::classify::ServicePattern;
use crate::core::report::ReportFormat;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogCorral data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logcorral/ or %APPDATA%\LogCorral\)
    pub config_dir: PathBuf,

    /// Data directory for caches and run artifacts.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[classify]` section.
    pub classify: ClassifySection,
    /// `[routing]` section.
    pub routing: RoutingSection,
    /// `[audit]` section.
    pub audit: AuditSection,
    /// `[report]` section.
    pub report: ReportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[classify]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ClassifySection {
    /// Filename classification regex.
    pub pattern: Option<String>,
    /// Capture group holding the service name (1-based).
    pub service_group: Option<usize>,
}

/// `[routing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RoutingSection {
    /// Destination root for the per-service tree.
    pub dest_root: Option<String>,
}

/// `[audit]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Marker token counted per file.
    pub marker_token: Option<String>,
    /// Include glob patterns.
    pub include_patterns: Option<Vec<String>>,
    /// Exclude glob patterns.
    pub exclude_patterns: Option<Vec<String>>,
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Large file threshold in bytes.
    pub large_file_threshold_bytes: Option<u64>,
}

/// `[report]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Report artifact path.
    pub path: Option<String>,
    /// Report format: "text", "csv", or "json".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults;
/// a broken config never stops the tool from starting.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Classify --
    /// Filename classification regex.
    pub service_pattern: String,
    /// Capture group holding the service name.
    pub service_group: usize,

    // -- Routing --
    /// Destination root, if configured (CLI flag takes priority).
    pub dest_root: Option<PathBuf>,

    // -- Audit --
    /// Marker token counted per file.
    pub marker_token: String,
    /// Include glob patterns.
    pub include_patterns: Vec<String>,
    /// Exclude glob patterns.
    pub exclude_patterns: Vec<String>,
    /// Maximum directory recursion depth.
    pub max_depth: usize,
    /// Large file threshold in bytes.
    pub large_file_threshold: u64,

    // -- Report --
    /// Report artifact path, if configured.
    pub report_path: Option<PathBuf>,
    /// Report format.
    pub report_format: ReportFormat,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_pattern: constants::DEFAULT_SERVICE_PATTERN.to_string(),
            service_group: constants::DEFAULT_SERVICE_GROUP,
            dest_root: None,
            marker_token: constants::DEFAULT_MARKER_TOKEN.to_string(),
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
            report_path: None,
            report_format: ReportFormat::Text,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no warnings
/// (first-run). If the file is unparseable, returns defaults with an error
/// warning -- the tool still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let mut config = AppConfig::default();

    // -- Classify: pattern + service_group (validated jointly) --
    if raw.classify.pattern.is_some() || raw.classify.service_group.is_some() {
        let pattern = raw
            .classify
            .pattern
            .unwrap_or_else(|| constants::DEFAULT_SERVICE_PATTERN.to_string());
        let group = raw
            .classify
            .service_group
            .unwrap_or(constants::DEFAULT_SERVICE_GROUP);
        match ServicePattern::new(&pattern, group) {
            Ok(_) => {
                config.service_pattern = pattern;
                config.service_group = group;
            }
            Err(e) => {
                warnings.push(format!(
                    "[classify] pattern/service_group rejected: {e}. Using defaults."
                ));
            }
        }
    }

    // -- Routing: dest_root --
    if let Some(ref dest) = raw.routing.dest_root {
        if dest.is_empty() {
            warnings.push("[routing] dest_root is empty. Ignoring.".to_string());
        } else {
            config.dest_root = Some(PathBuf::from(dest));
        }
    }

    // -- Audit: marker_token --
    if let Some(ref token) = raw.audit.marker_token {
        if token.is_empty() {
            warnings.push(format!(
                "[audit] marker_token is empty. Using default (\"{}\").",
                constants::DEFAULT_MARKER_TOKEN
            ));
        } else {
            config.marker_token = token.clone();
        }
    }

    // -- Audit: include/exclude patterns --
    if let Some(patterns) = raw.audit.include_patterns {
        config.include_patterns = patterns;
    }
    if let Some(patterns) = raw.audit.exclude_patterns {
        config.exclude_patterns = patterns;
    }

    // -- Audit: max_depth --
    if let Some(depth) = raw.audit.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[audit] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    // -- Audit: large_file_threshold_bytes --
    if let Some(threshold) = raw.audit.large_file_threshold_bytes {
        config.large_file_threshold = threshold;
    }

    // -- Report: path --
    if let Some(ref path) = raw.report.path {
        if !path.is_empty() {
            config.report_path = Some(PathBuf::from(path));
        }
    }

    // -- Report: format --
    if let Some(ref format) = raw.report.format {
        match ReportFormat::parse(format) {
            Some(f) => config.report_format = f,
            None => {
                warnings.push(format!(
                    "[report] format = \"{format}\" is not recognised. \
                     Valid values: text, csv, json. Using default (text).",
                ));
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) {
        fs::write(dir.path().join(constants::CONFIG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.marker_token, "error");
        assert_eq!(config.service_pattern, constants::DEFAULT_SERVICE_PATTERN);
    }

    #[test]
    fn test_valid_config_applies() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
[routing]
dest_root = "/var/log/sorted"

[audit]
marker_token = "fail"
max_depth = 3

[report]
format = "csv"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.dest_root, Some(PathBuf::from("/var/log/sorted")));
        assert_eq!(config.marker_token, "fail");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.report_format, ReportFormat::Csv);
    }

    #[test]
    fn test_out_of_range_depth_warns_and_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[audit]\nmax_depth = 9999\n");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("max_depth"));
    }

    #[test]
    fn test_bad_classify_pattern_warns_and_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[classify]\npattern = \"[broken\"\n");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.service_pattern, constants::DEFAULT_SERVICE_PATTERN);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_format_warns_and_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[report]\nformat = \"yaml\"\n");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.report_format, ReportFormat::Text);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unparseable_toml_warns_and_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "this is not toml ===");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config.marker_token, "error");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[future_section]\nnew_key = true\n");
        let (_, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "unknown keys must not warn");
    }
}

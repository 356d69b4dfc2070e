// LogCorral - core/patterns.rs
//
// Glob pattern helpers shared by the source listing and the audit walk.
//
// Exclude patterns without wildcards double as directory-component matchers
// so excluded subtrees are never descended into at all.

/// Compile a list of glob pattern strings into `glob::Pattern` objects.
/// Patterns that fail to compile are logged as warnings and skipped.
pub fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Returns true if `dir_name` matches any exclude pattern that contains no
/// wildcard characters. These are treated as directory component exclusions
/// rather than filename glob patterns.
pub fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        // Only literal patterns (no wildcards) are used as component matchers.
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

/// Returns true if `file_name` matches any exclude pattern (wildcard or literal).
pub fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

/// Returns true if `file_name` matches at least one include pattern.
/// An empty include list means "include all" (returns true).
pub fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    if include_pats.is_empty() {
        return true;
    }
    include_pats.iter().any(|p| p.matches(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(patterns: &[&str]) -> Vec<glob::Pattern> {
        compile_patterns(
            &patterns.iter().map(|s| (*s).to_string()).collect::<Vec<_>>(),
            "test",
        )
    }

    #[test]
    fn test_include_empty_means_all() {
        assert!(is_included("anything.bin", &[]));
    }

    #[test]
    fn test_include_matches_glob() {
        let pats = compile(&["*.log"]);
        assert!(is_included("app.log", &pats));
        assert!(!is_included("app.txt", &pats));
    }

    #[test]
    fn test_literal_excludes_match_directory_components() {
        let pats = compile(&["*.gz", "archive"]);
        assert!(is_excluded_component("archive", &pats));
        // Wildcard patterns are filename-only, never component matchers.
        assert!(!is_excluded_component("logs.gz", &pats));
        assert!(is_excluded_filename("logs.gz", &pats));
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let pats = compile(&["[bad", "*.log"]);
        assert_eq!(pats.len(), 1, "invalid pattern should be dropped");
    }
}

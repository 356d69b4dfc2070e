// LogCorral - core/classify.rs
//
// Filename classification: derive a service name from a log file's base
// name via a configurable pattern. Pure logic, no I/O, no side effects.
//
// The pattern is a policy object rather than a hard-coded expression, so
// alternate naming schemes can be supported without touching the router:
// any regex plus a capture-group index makes a valid classification policy.

use crate::util::constants;
use crate::util::error::ClassifyError;
use regex::Regex;

/// A compiled classification policy: a filename regex and the capture group
/// that holds the service name.
///
/// The whole name must match the pattern. The default policy matches
/// `<service>_<YYYY-MM-DD>.log` with a greedy service group, so a name
/// containing several date-like substrings binds the service to everything
/// up to the last valid date suffix.
#[derive(Debug, Clone)]
pub struct ServicePattern {
    regex: Regex,
    service_group: usize,
}

impl ServicePattern {
    /// Compile a classification pattern.
    ///
    /// `service_group` is the 1-based capture group holding the service
    /// name. Fails if the pattern does not compile or the group does not
    /// exist (group 0 is the whole match and is not accepted).
    pub fn new(pattern: &str, service_group: usize) -> Result<Self, ClassifyError> {
        let regex = Regex::new(pattern).map_err(|e| ClassifyError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;

        // captures_len counts group 0; user groups are 1..captures_len.
        let groups = regex.captures_len() - 1;
        if service_group == 0 || service_group > groups {
            return Err(ClassifyError::MissingCaptureGroup {
                pattern: pattern.to_string(),
                group: service_group,
                groups,
            });
        }

        Ok(Self {
            regex,
            service_group,
        })
    }

    /// Compile the default `<service>_<YYYY-MM-DD>.log` policy.
    pub fn standard() -> Result<Self, ClassifyError> {
        Self::new(
            constants::DEFAULT_SERVICE_PATTERN,
            constants::DEFAULT_SERVICE_GROUP,
        )
    }

    /// The source pattern string, for diagnostics.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract the service name from a file's base name.
    ///
    /// Fails with `NoMatch` when the whole name does not match the pattern
    /// (missing date suffix, wrong extension), and with `EmptyService` when
    /// the service group captured nothing. Both are per-file failures for
    /// the caller to accumulate, never a process abort.
    pub fn classify(&self, name: &str) -> Result<String, ClassifyError> {
        let captures = self
            .regex
            .captures(name)
            .ok_or_else(|| ClassifyError::NoMatch {
                name: name.to_string(),
            })?;

        let service = captures
            .get(self.service_group)
            .map(|m| m.as_str())
            .unwrap_or_default();

        if service.is_empty() {
            return Err(ClassifyError::EmptyService {
                name: name.to_string(),
            });
        }

        Ok(service.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_standard_name() {
        let pattern = ServicePattern::standard().unwrap();
        assert_eq!(pattern.classify("auth_2024-01-01.log").unwrap(), "auth");
        assert_eq!(
            pattern.classify("billing-api_2023-12-31.log").unwrap(),
            "billing-api"
        );
    }

    #[test]
    fn test_greedy_service_binds_to_last_date() {
        // A service name that itself contains a date-like substring: the
        // greedy group consumes up to the last valid date anchor.
        let pattern = ServicePattern::standard().unwrap();
        assert_eq!(
            pattern
                .classify("backup_2024-01-01_restore_2024-02-02.log")
                .unwrap(),
            "backup_2024-01-01_restore"
        );
    }

    #[test]
    fn test_missing_date_fails() {
        let pattern = ServicePattern::standard().unwrap();
        let result = pattern.classify("auth.log");
        assert!(matches!(result, Err(ClassifyError::NoMatch { .. })));
    }

    #[test]
    fn test_wrong_extension_fails() {
        let pattern = ServicePattern::standard().unwrap();
        assert!(matches!(
            pattern.classify("auth_2024-01-01.txt"),
            Err(ClassifyError::NoMatch { .. })
        ));
        // Trailing junk after the extension must not match either.
        assert!(matches!(
            pattern.classify("auth_2024-01-01.log.bak"),
            Err(ClassifyError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_malformed_date_fails() {
        let pattern = ServicePattern::standard().unwrap();
        assert!(matches!(
            pattern.classify("auth_2024-1-1.log"),
            Err(ClassifyError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_empty_service_fails() {
        let pattern = ServicePattern::standard().unwrap();
        assert!(matches!(
            pattern.classify("_2024-01-01.log"),
            Err(ClassifyError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_custom_pattern_and_group() {
        // Alternate naming scheme: <date>-<service>.log, service in group 2.
        let pattern =
            ServicePattern::new(r"^([0-9]{8})-([a-z]+)\.log$", 2).unwrap();
        assert_eq!(pattern.classify("20240101-auth.log").unwrap(), "auth");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = ServicePattern::new("[invalid", 1);
        assert!(matches!(result, Err(ClassifyError::InvalidPattern { .. })));
    }

    #[test]
    fn test_missing_capture_group_rejected() {
        let result = ServicePattern::new(r"^(.+)\.log$", 2);
        assert!(matches!(
            result,
            Err(ClassifyError::MissingCaptureGroup { groups: 1, .. })
        ));
        // Group 0 (the whole match) is not a valid service group.
        assert!(matches!(
            ServicePattern::new(r"^(.+)\.log$", 0),
            Err(ClassifyError::MissingCaptureGroup { .. })
        ));
    }

    #[test]
    fn test_optional_group_that_captures_nothing() {
        // A pattern whose service group is optional: no capture means no
        // usable service name.
        let pattern = ServicePattern::new(r"^(x)?y\.log$", 1).unwrap();
        assert!(matches!(
            pattern.classify("y.log"),
            Err(ClassifyError::EmptyService { .. })
        ));
    }
}

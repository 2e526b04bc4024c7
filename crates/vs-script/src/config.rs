//! Validator configuration.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::diagnostics::{DiagnosticCode, Severity};

/// Validator settings, loaded from the `[validator]` table of `vessel.toml`.
///
/// ```toml
/// [validator]
/// strict = false
///
/// [validator.severity]
/// label-unreferenced = "error"
/// unknown-speaker = "note"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Per-code severity overrides.
    pub severity: BTreeMap<DiagnosticCode, Severity>,
    /// Promote every note to an error.
    pub strict: bool,
}

impl ValidatorConfig {
    /// Override the severity of one diagnostic code.
    pub fn with_severity(mut self, code: DiagnosticCode, severity: Severity) -> Self {
        self.severity.insert(code, severity);
        self
    }

    /// Promote every note to an error.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The effective severity of a code.
    pub fn severity_of(&self, code: DiagnosticCode) -> Severity {
        let severity = self
            .severity
            .get(&code)
            .copied()
            .unwrap_or_else(|| code.default_severity());
        if self.strict {
            Severity::Error
        } else {
            severity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_catalog() {
        let config = ValidatorConfig::default();
        assert_eq!(config.severity_of(DiagnosticCode::LabelDuplicate), Severity::Error);
        assert_eq!(config.severity_of(DiagnosticCode::LabelUnreferenced), Severity::Note);
    }

    #[test]
    fn overrides_and_strict() {
        let config = ValidatorConfig::default()
            .with_severity(DiagnosticCode::PauseNegative, Severity::Note);
        assert_eq!(config.severity_of(DiagnosticCode::PauseNegative), Severity::Note);

        let strict = config.with_strict(true);
        assert_eq!(strict.severity_of(DiagnosticCode::PauseNegative), Severity::Error);
        assert_eq!(strict.severity_of(DiagnosticCode::UnknownSpeaker), Severity::Error);
    }

    #[test]
    fn deserialize_from_toml() {
        let config: ValidatorConfig = toml::from_str(
            r#"
            strict = false

            [severity]
            label-unreferenced = "error"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.severity_of(DiagnosticCode::LabelUnreferenced),
            Severity::Error
        );
        assert!(!config.strict);
    }

    #[test]
    fn empty_table_is_default() {
        let config: ValidatorConfig = toml::from_str("").unwrap();
        assert_eq!(config, ValidatorConfig::default());
    }
}

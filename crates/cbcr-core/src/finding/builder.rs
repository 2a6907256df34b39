//! Consuming, fluent [`FindingBuilder`] — the sole path to a [`super::Finding`].
use std::collections::BTreeMap;

use super::{Category, ExpectedActual, Finding, RuleId, Severity};
use crate::reference;

/// Builds a [`Finding`] for a given [`RuleId`], auto-filling category,
/// severity, suggestion and reference from [`reference::rule_meta`] unless
/// explicitly overridden. Every setter takes `self` by value; `.build()`
/// never panics, degrading to built-in defaults for an unknown rule id.
pub struct FindingBuilder {
    rule_id: RuleId,
    category: Option<Category>,
    severity: Option<Severity>,
    message: Option<String>,
    xpath: Option<String>,
    details: BTreeMap<String, String>,
    suggestion: Option<String>,
    reference: Option<String>,
    oecd_error_code: Option<u32>,
    field_name: Option<String>,
    expected_actual: Option<ExpectedActual>,
}

impl FindingBuilder {
    pub fn new(rule_id: RuleId) -> Self {
        Self {
            rule_id,
            category: None,
            severity: None,
            message: None,
            xpath: None,
            details: BTreeMap::new(),
            suggestion: None,
            reference: None,
            oecd_error_code: None,
            field_name: None,
            expected_actual: None,
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = Some(xpath.into());
        self
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn oecd_error_code(mut self, code: u32) -> Self {
        self.oecd_error_code = Some(code);
        self
    }

    pub fn field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    pub fn expected_actual(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected_actual = Some(ExpectedActual {
            expected: expected.into(),
            actual: actual.into(),
        });
        self
    }

    /// Consumes the builder, enriching any unset field from
    /// [`reference::rule_meta`]. Never panics.
    pub fn build(self) -> Finding {
        let meta = reference::rule_meta(&self.rule_id);
        Finding {
            category: self.category.unwrap_or(meta.category),
            severity: self.severity.unwrap_or(meta.default_severity),
            message: self
                .message
                .unwrap_or_else(|| format!("{} check failed", self.rule_id.code())),
            xpath: self.xpath,
            details: self.details,
            suggestion: self
                .suggestion
                .or_else(|| reference::default_suggestion(&self.rule_id)),
            reference: self.reference.or_else(|| Some(meta.spec_reference.to_string())),
            oecd_error_code: self.oecd_error_code,
            field_name: self.field_name,
            expected_actual: self.expected_actual,
            rule_id: self.rule_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_never_panics_for_extension_rule_id() {
        let finding = FindingBuilder::new(RuleId::Extension("XX-001".to_string())).build();
        assert_eq!(finding.rule_id.code(), "XX-001");
        assert_eq!(finding.category, Category::DataQuality);
        assert_eq!(finding.severity, Severity::Info);
    }

    #[test]
    fn explicit_overrides_win_over_defaults() {
        let finding = FindingBuilder::new(RuleId::DocRefIdDuplicateInFile)
            .severity(Severity::Warning)
            .message("custom message")
            .xpath("/CBC_OECD/CbcBody/CbcReports[1]/DocSpec/DocRefId")
            .build();
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.message, "custom message");
    }

    #[test]
    fn default_severity_is_critical_for_duplicate_doc_ref_id() {
        let finding = FindingBuilder::new(RuleId::DocRefIdDuplicateInFile).build();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.category, Category::SchemaConformity);
    }
}

//! The base validator contract: [`Validator`], [`ValidatorMeta`], the
//! engine's panic-isolating [`execute`] wrapper, and the [`xpath`] helper
//! module every rule file builds locations from.
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::context::AnalysisContext;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};

/// Static metadata describing one validator's identity, phase, and
/// applicability.
#[derive(Debug, Clone)]
pub struct ValidatorMeta {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub order: u32,
    /// `None` means applicable regardless of the configured primary
    /// country; `Some(countries)` restricts the validator to those ISO
    /// country codes.
    pub applicable_countries: Option<&'static [&'static str]>,
    pub enabled: bool,
}

/// A validator: a stateless unit of work over an [`AnalysisContext`].
///
/// Implementations must not mutate the parsed report and must not perform
/// I/O, with the sole exception of the one validator that consults the
/// external `DocRefIdStore` (spec.md §4.4.2).
pub trait Validator: Send + Sync {
    fn metadata(&self) -> ValidatorMeta;
    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding>;
}

/// The outcome of running one validator through [`execute`].
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub validator_id: String,
    pub findings: Vec<Finding>,
    pub elapsed_ms: u64,
    pub ok: bool,
    pub error: Option<String>,
}

/// Evaluates applicability (enabled, country filter, category filter), then
/// runs `validator.validate` inside [`panic::catch_unwind`]. An unexpected
/// panic becomes a single `APP-005` critical finding bearing the
/// validator's id and the captured message; it is never rethrown.
pub fn execute(validator: &dyn Validator, ctx: &AnalysisContext) -> ExecutionRecord {
    let meta = validator.metadata();
    let start = Instant::now();

    let applicable = meta.enabled
        && meta
            .applicable_countries
            .is_none_or(|countries| countries.contains(&ctx.options().primary_country.as_str()));

    if !applicable {
        return ExecutionRecord {
            validator_id: meta.id.to_string(),
            findings: Vec::new(),
            elapsed_ms: start.elapsed().as_millis() as u64,
            ok: true,
            error: None,
        };
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| validator.validate(ctx)));
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(findings) => ExecutionRecord {
            validator_id: meta.id.to_string(),
            findings,
            elapsed_ms,
            ok: true,
            error: None,
        },
        Err(payload) => {
            let message = panic_message(&payload);
            let finding = FindingBuilder::new(RuleId::AppValidatorPanic)
                .message(format!("validator '{}' failed unexpectedly: {message}", meta.id))
                .detail("validatorId", meta.id)
                .build();
            ExecutionRecord {
                validator_id: meta.id.to_string(),
                findings: vec![finding],
                elapsed_ms,
                ok: false,
                error: Some(message),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Canonical XPath constructors, rooted at `/CBC_OECD`, matching spec.md
/// §4.3's requirement that every finding's xpath be rooted at the document
/// element. Free functions, not methods: one module replaces the teacher's
/// per-rule-file XPath helpers.
pub mod xpath {
    pub fn message_spec() -> String {
        "/CBC_OECD/MessageSpec".to_string()
    }

    pub fn message_spec_field(field: &str) -> String {
        format!("/CBC_OECD/MessageSpec/{field}")
    }

    pub fn reporting_entity() -> String {
        "/CBC_OECD/CbcBody/ReportingEntity".to_string()
    }

    pub fn reporting_entity_field(field: &str) -> String {
        format!("/CBC_OECD/CbcBody/ReportingEntity/{field}")
    }

    pub fn reporting_entity_doc_spec(field: &str) -> String {
        format!("/CBC_OECD/CbcBody/ReportingEntity/DocSpec/{field}")
    }

    pub fn cbc_report(report_index: usize) -> String {
        format!("/CBC_OECD/CbcBody/CbcReports[{}]", report_index + 1)
    }

    pub fn cbc_report_field(report_index: usize, field: &str) -> String {
        format!("/CBC_OECD/CbcBody/CbcReports[{}]/{field}", report_index + 1)
    }

    pub fn cbc_report_doc_spec(report_index: usize, field: &str) -> String {
        format!(
            "/CBC_OECD/CbcBody/CbcReports[{}]/DocSpec/{field}",
            report_index + 1
        )
    }

    pub fn cbc_report_summary(report_index: usize, field: &str) -> String {
        format!(
            "/CBC_OECD/CbcBody/CbcReports[{}]/Summary/{field}",
            report_index + 1
        )
    }

    pub fn const_entity(report_index: usize, entity_index: usize) -> String {
        format!(
            "/CBC_OECD/CbcBody/CbcReports[{}]/ConstEntities/ConstEntity[{}]",
            report_index + 1,
            entity_index + 1
        )
    }

    pub fn const_entity_field(report_index: usize, entity_index: usize, field: &str) -> String {
        format!(
            "/CBC_OECD/CbcBody/CbcReports[{}]/ConstEntities/ConstEntity[{}]/{field}",
            report_index + 1,
            entity_index + 1
        )
    }

    pub fn additional_info(index: usize) -> String {
        format!("/CBC_OECD/CbcBody/AdditionalInfo[{}]", index + 1)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use crate::context::ValidationOptions;
    use crate::finding::Severity;
    use crate::test_support::minimal_report;

    struct PanickingValidator;

    impl Validator for PanickingValidator {
        fn metadata(&self) -> ValidatorMeta {
            ValidatorMeta {
                id: "test.panicking",
                name: "Panicking",
                description: "always panics",
                category: Category::DataQuality,
                order: 0,
                applicable_countries: None,
                enabled: true,
            }
        }

        fn validate(&self, _ctx: &AnalysisContext) -> Vec<Finding> {
            panic!("boom");
        }
    }

    struct DisabledValidator;

    impl Validator for DisabledValidator {
        fn metadata(&self) -> ValidatorMeta {
            ValidatorMeta {
                id: "test.disabled",
                name: "Disabled",
                description: "never runs",
                category: Category::DataQuality,
                order: 0,
                applicable_countries: None,
                enabled: false,
            }
        }

        fn validate(&self, _ctx: &AnalysisContext) -> Vec<Finding> {
            unreachable!("disabled validators must not run")
        }
    }

    #[test]
    fn execute_captures_panic_as_app_005() {
        let ctx = AnalysisContext::new(minimal_report(), ValidationOptions::default());
        let record = execute(&PanickingValidator, &ctx);
        assert!(!record.ok);
        assert_eq!(record.findings.len(), 1);
        assert_eq!(record.findings[0].rule_id.code(), "APP-005");
        assert_eq!(record.findings[0].severity, Severity::Critical);
    }

    #[test]
    fn execute_skips_disabled_validator_without_calling_validate() {
        let ctx = AnalysisContext::new(minimal_report(), ValidationOptions::default());
        let record = execute(&DisabledValidator, &ctx);
        assert!(record.ok);
        assert!(record.findings.is_empty());
    }

    #[test]
    fn execute_skips_validator_outside_country_filter() {
        struct LuOnly;
        impl Validator for LuOnly {
            fn metadata(&self) -> ValidatorMeta {
                ValidatorMeta {
                    id: "test.lu_only",
                    name: "LU only",
                    description: "",
                    category: Category::Country,
                    order: 0,
                    applicable_countries: Some(&["LU"]),
                    enabled: true,
                }
            }
            fn validate(&self, _ctx: &AnalysisContext) -> Vec<Finding> {
                vec![FindingBuilder::new(RuleId::LuBelowThreshold).build()]
            }
        }

        let mut options = ValidationOptions::default();
        options.primary_country = "DE".to_string();
        let ctx = AnalysisContext::new(minimal_report(), options);
        let record = execute(&LuOnly, &ctx);
        assert!(record.findings.is_empty());
    }
}

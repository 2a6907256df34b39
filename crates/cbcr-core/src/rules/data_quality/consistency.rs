//! Cross-field consistency checks (spec.md §4.7.2): currency usage,
//! accounting-period ordering/length, and DocRefId/jurisdiction alignment.
use std::collections::BTreeSet;

use crate::context::AnalysisContext;
use crate::dates;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::validator::{Validator, ValidatorMeta, xpath};

/// A fiscal year is expected to run roughly 12 months; outside this window
/// (in days) it is worth a second look, distinct from CE-012's stricter
/// "unusually long period" check.
const FISCAL_YEAR_MIN_DAYS: i64 = 300;
const FISCAL_YEAR_MAX_DAYS: i64 = 400;

pub struct ConsistencyValidator;

impl Validator for ConsistencyValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "data_quality_consistency",
            name: "Consistency",
            description: "Flags currency, accounting-period, and DocRefId/jurisdiction inconsistencies",
            category: Category::DataQuality,
            order: 90,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();

        let mut all_currencies: BTreeSet<String> = BTreeSet::new();

        for (report_index, report) in body.cbc_reports.iter().enumerate() {
            let fields = report.summary.monetary_fields();
            let currencies: BTreeSet<&str> = fields.iter().map(|(_, m)| m.currency.as_str()).collect();
            for c in &currencies {
                all_currencies.insert((*c).to_string());
            }
            if currencies.len() > 1 {
                findings.push(
                    FindingBuilder::new(RuleId::EncMultipleCurrenciesAcrossFields)
                        .message("This jurisdiction's Summary fields are not all denominated in the same currency, so they cannot be aggregated without conversion")
                        .xpath(xpath::cbc_report(report_index))
                        .build(),
                );
            }

            if let (Some(start), Some(end)) = self.single_entity_period(report) {
                if let (Some(start_ymd), Some(end_ymd)) = (dates::parse_ymd(start), dates::parse_ymd(end)) {
                    if start_ymd > end_ymd {
                        findings.push(
                            FindingBuilder::new(RuleId::EncAcctPeriodInverted)
                                .message(format!("AcctPeriodStart ({start}) is after AcctPeriodEnd ({end})"))
                                .xpath(xpath::const_entity(report_index, 0))
                                .build(),
                        );
                    } else {
                        let days = dates::days_between(start_ymd, end_ymd);
                        if !(FISCAL_YEAR_MIN_DAYS..=FISCAL_YEAR_MAX_DAYS).contains(&days) {
                            findings.push(
                                FindingBuilder::new(RuleId::EncFiscalYearLengthAnomaly)
                                    .message(format!("Accounting period spans {days} days, outside the usual ~365-day fiscal year"))
                                    .xpath(xpath::const_entity(report_index, 0))
                                    .build(),
                            );
                        }
                    }
                }
            }

            let doc_ref_id = &report.doc_spec.doc_ref_id;
            let jurisdiction = report.res_country_code.as_str();
            if doc_ref_id.len() >= 2 && !doc_ref_id.starts_with(jurisdiction) {
                findings.push(
                    FindingBuilder::new(RuleId::EncRefIdPrefixMismatch)
                        .message(format!(
                            "DocRefId '{doc_ref_id}' does not begin with this CbcReport's own ResCountryCode ({jurisdiction})"
                        ))
                        .xpath(xpath::cbc_report_doc_spec(report_index, "DocRefId"))
                        .build(),
                );
            }
        }

        if all_currencies.len() > 2 {
            findings.push(
                FindingBuilder::new(RuleId::EncMixedCurrencyPresence)
                    .message(format!("The filing uses {} distinct currencies across its jurisdictions", all_currencies.len()))
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
        }

        findings
    }
}

impl ConsistencyValidator {
    /// Returns the first entity's accounting period, a reasonable proxy when
    /// a jurisdiction reports a single constituent entity; multi-entity
    /// period reconciliation is out of scope (spec.md's Non-goals).
    fn single_entity_period<'a>(&self, report: &'a crate::model::CbcReport) -> (Option<&'a str>, Option<&'a str>) {
        match report.const_entities.entities.first() {
            Some(entity) => (
                entity.acct_period_start.as_ref().map(|d| d.as_ref()),
                entity.acct_period_end.as_ref().map(|d| d.as_ref()),
            ),
            None => (None, None),
        }
    }
}

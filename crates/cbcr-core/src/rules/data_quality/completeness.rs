//! Completeness checks (spec.md §4.7.1): fields that are structurally
//! optional but whose absence still leaves a filing hard to rely on.
const ADDITIONAL_INFO_MIN_LEN: usize = 10;

use crate::context::AnalysisContext;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::validator::{Validator, ValidatorMeta, xpath};

pub struct CompletenessValidator;

impl Validator for CompletenessValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "data_quality_completeness",
            name: "Completeness",
            description: "Flags structurally-optional fields whose absence weakens the filing",
            category: Category::DataQuality,
            order: 80,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();

        if body.reporting_entity.addresses.is_empty() {
            findings.push(
                FindingBuilder::new(RuleId::CcSummaryFieldMissing)
                    .message("ReportingEntity has no address recorded")
                    .xpath(xpath::reporting_entity_field("Address"))
                    .build(),
            );
        }

        for (report_index, report) in body.cbc_reports.iter().enumerate() {
            let s = &report.summary;
            match (&s.unrelated_revenues, &s.related_revenues) {
                (Some(_), None) | (None, Some(_)) => {
                    findings.push(
                        FindingBuilder::new(RuleId::CcRevenueDecompositionPartial)
                            .message("Only one of UnrelatedRevenues/RelatedRevenues is present for this jurisdiction")
                            .xpath(xpath::cbc_report_summary(report_index, "TotalRevenues"))
                            .build(),
                    );
                }
                _ => {}
            }

            for (entity_index, entity) in report.const_entities.entities.iter().enumerate() {
                if entity.names.is_empty() {
                    findings.push(
                        FindingBuilder::new(RuleId::CcEntityNameMissing)
                            .message("ConstituentEntity has no name recorded")
                            .xpath(xpath::const_entity_field(report_index, entity_index, "Name"))
                            .build(),
                    );
                }
            }
        }

        let upe_name = ctx.metadata().upe_name.trim().to_lowercase();
        if !upe_name.is_empty() && !ctx.entities().iter().any(|e| e.name_normalized == upe_name) {
            findings.push(
                FindingBuilder::new(RuleId::CcReportingEntityNotInEntityList)
                    .message("The reporting entity's name does not appear among any jurisdiction's constituent entities")
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
        }

        let upe_tin_countries: Vec<&str> = body
            .reporting_entity
            .tins
            .iter()
            .filter_map(|t| t.issued_by.as_ref().map(|c| c.as_str()))
            .collect();
        if !upe_tin_countries.is_empty()
            && !ctx.jurisdictions().iter().any(|j| upe_tin_countries.contains(&j.country_code.as_str()))
        {
            findings.push(
                FindingBuilder::new(RuleId::CcReportingEntityOutsideHomeJurisdiction)
                    .message("None of the ReportingEntity's TIN-issuing jurisdictions appear among the filed CbcReports")
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
        }

        for (i, info) in body.additional_info.iter().enumerate() {
            let trimmed = info.other_info.trim();
            if !trimmed.is_empty() && trimmed.len() < ADDITIONAL_INFO_MIN_LEN {
                findings.push(
                    FindingBuilder::new(RuleId::CcAdditionalInfoTooShort)
                        .message(format!("AdditionalInfo text is only {} characters, likely too brief to be useful", trimmed.len()))
                        .xpath(format!("{}/OtherInfo", xpath::additional_info(i)))
                        .build(),
                );
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidationOptions;
    use crate::test_support::happy_path_report;

    #[test]
    fn happy_path_produces_no_findings() {
        let ctx = AnalysisContext::new(happy_path_report(), ValidationOptions::default());
        let findings = CompletenessValidator.validate(&ctx);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn missing_address_is_flagged() {
        let mut report = happy_path_report();
        report.message.cbc_body.reporting_entity.addresses.clear();
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = CompletenessValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::CcSummaryFieldMissing));
    }

    #[test]
    fn partial_revenue_decomposition_is_flagged() {
        let mut report = happy_path_report();
        report.message.cbc_body.cbc_reports[0].summary.related_revenues = None;
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = CompletenessValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::CcRevenueDecompositionPartial));
    }
}

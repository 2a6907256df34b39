//! Business activity code plausibility (spec.md §4.4.5).
//!
//! `BIZ-001` (invalid activity code) has no code path here: `BusinessActivityCode`
//! is a closed enum populated by the structural parser, so an out-of-range
//! code is rejected before a `ParsedReport` can exist at all.
use std::collections::HashSet;

use crate::context::AnalysisContext;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::model::{BusinessActivityCode, ConstituentEntity};
use crate::validator::{Validator, ValidatorMeta, xpath};

/// Revenue above which a holding-only jurisdiction is worth a second look.
const HOLDING_ONLY_LARGE_SCALE_REVENUE: f64 = 10_000_000.0;
/// Employee count above which a holding-only jurisdiction is worth a second look.
const HOLDING_ONLY_LARGE_SCALE_EMPLOYEES: f64 = 10.0;

pub struct BusinessActivityValidator;

impl Validator for BusinessActivityValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "business_activity",
            name: "BusinessActivity",
            description: "Checks BusinessActivity code presence, duplication, and consistency with other fields",
            category: Category::Business,
            order: 50,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();

        for (report_index, report) in body.cbc_reports.iter().enumerate() {
            for (entity_index, entity) in report.const_entities.entities.iter().enumerate() {
                findings.extend(self.check_entity(report_index, entity_index, entity));
            }

            let s = &report.summary;
            let has_dormant_activity = report
                .const_entities
                .entities
                .iter()
                .any(|e| e.business_activities.contains(&BusinessActivityCode::Dormant));
            let has_positive_activity = s.total_revenues.value > 0.0
                || s.profit_or_loss.value > 0.0
                || s.number_of_employees > 0.0;
            if has_dormant_activity && has_positive_activity {
                findings.push(
                    FindingBuilder::new(RuleId::BizDormantWithActivity)
                        .message("Dormant (CBC512) is declared but revenue, profit, or employees are positive for this jurisdiction")
                        .xpath(xpath::cbc_report(report_index))
                        .build(),
                );
            }

            let holding_only_total: f64 = report
                .const_entities
                .entities
                .iter()
                .filter(|e| e.business_activities.iter().copied().all(BusinessActivityCode::is_holding_only) && !e.business_activities.is_empty())
                .count() as f64;
            if holding_only_total > 0.0
                && (report.summary.total_revenues.value > HOLDING_ONLY_LARGE_SCALE_REVENUE
                    || report.summary.number_of_employees > HOLDING_ONLY_LARGE_SCALE_EMPLOYEES)
            {
                findings.push(
                    FindingBuilder::new(RuleId::BizHoldingOnlyLargeScale)
                        .message(format!(
                            "Jurisdiction reports only holding-only business activities but {} in TotalRevenues and {} employees",
                            report.summary.total_revenues.value, report.summary.number_of_employees
                        ))
                        .xpath(xpath::cbc_report(report_index))
                        .build(),
                );
            }
        }

        findings
    }
}

impl BusinessActivityValidator {
    fn check_entity(&self, report_index: usize, entity_index: usize, entity: &ConstituentEntity) -> Vec<Finding> {
        let mut findings = Vec::new();
        let xpath = xpath::const_entity_field(report_index, entity_index, "BusinessActivities");

        if entity.business_activities.is_empty() {
            findings.push(
                FindingBuilder::new(RuleId::BizNoActivitiesListed)
                    .message("ConstituentEntity lists no BusinessActivity codes")
                    .xpath(xpath.clone())
                    .build(),
            );
            return findings;
        }

        let mut seen = HashSet::new();
        for activity in &entity.business_activities {
            if !seen.insert(*activity) {
                findings.push(
                    FindingBuilder::new(RuleId::BizDuplicateActivityCode)
                        .message(format!("BusinessActivity code {} is listed more than once", activity.code()))
                        .xpath(xpath.clone())
                        .build(),
                );
            }
        }

        let has_other = entity.business_activities.contains(&BusinessActivityCode::Other);
        if has_other && entity.other_entity_info.as_deref().is_none_or(str::is_empty) {
            findings.push(
                FindingBuilder::new(RuleId::BizOtherActivityMissingInfo)
                    .message("BusinessActivity includes Other (CBC513) but OtherEntityInfo is absent")
                    .xpath(xpath.clone())
                    .build(),
            );
        }

        let has_dormant = entity.business_activities.contains(&BusinessActivityCode::Dormant);
        if has_dormant && entity.business_activities.len() > 1 {
            findings.push(
                FindingBuilder::new(RuleId::BizDormantWithActivity)
                    .message("BusinessActivity includes Dormant (CBC512) alongside another activity code")
                    .xpath(xpath.clone())
                    .build(),
            );
        }
        if has_dormant && has_other {
            findings.push(
                FindingBuilder::new(RuleId::BizDormantWithOtherCode)
                    .message("BusinessActivity includes both Dormant (CBC512) and Other (CBC513)")
                    .xpath(xpath)
                    .build(),
            );
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
        let findings = BusinessActivityValidator.validate(&ctx);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn no_activities_listed_is_flagged() {
        let mut report = happy_path_report();
        report.message.cbc_body.cbc_reports[0].const_entities.entities[0].business_activities.clear();
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = BusinessActivityValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::BizNoActivitiesListed));
    }

    #[test]
    fn dormant_with_other_activity_is_flagged() {
        let mut report = happy_path_report();
        report.message.cbc_body.cbc_reports[0].const_entities.entities[0].business_activities =
            vec![BusinessActivityCode::Dormant, BusinessActivityCode::Manufacturing];
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = BusinessActivityValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::BizDormantWithActivity));
    }
}

//! The OECD's published list of common CbC reporting errors (spec.md
//! §4.7.4), as far as they can be detected from the parsed document alone.
use crate::context::AnalysisContext;
use crate::dates;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::model::BusinessActivityCode;
use crate::reference;
use crate::validator::{Validator, ValidatorMeta, xpath};

const SUSPICIOUSLY_SMALL_REVENUE: f64 = 1_000.0;
/// Rounding slack tolerated between `unrelated + related` and `total`
/// before `rules::summary`'s relative-tolerance mismatch would fire; below
/// this, it is a rounding note rather than an error.
const ROUNDING_SLACK: f64 = 1.0;
const LONG_ACCOUNTING_PERIOD_DAYS: i64 = 400;
/// A reporting period ending within this many days of today suggests the
/// filer may have used the filing date instead of the fiscal year end.
const RECENT_REPORTING_DATE_WINDOW_DAYS: i64 = 14;

pub struct CommonErrorsValidator;

impl Validator for CommonErrorsValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "data_quality_common_errors",
            name: "CommonErrors",
            description: "Checks the filing against the OECD's published list of common CbC reporting errors",
            category: Category::DataQuality,
            order: 110,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();

        if !body.reporting_entity.tins.is_empty() {
            let upe_name = ctx.metadata().upe_name.trim().to_lowercase();
            if !upe_name.is_empty() && !ctx.entities().iter().any(|e| e.name_normalized == upe_name) {
                findings.push(
                    FindingBuilder::new(RuleId::Ce005ReportingEntityAbsentFromEntityList)
                        .message("The reporting entity does not appear among any jurisdiction's constituent entities, one of the 28 most common CbC errors")
                        .xpath(xpath::reporting_entity())
                        .build(),
                );
            }
        }

        let mut seen_tins: std::collections::HashMap<String, (usize, usize)> = std::collections::HashMap::new();
        for entity_ref in ctx.entities() {
            for tin in &entity_ref.tins_uppercased {
                if tin.is_empty() || tin == "NOTIN" {
                    continue;
                }
                if let Some(_prior) = seen_tins.insert(tin.clone(), (entity_ref.report_index, entity_ref.entity_index)) {
                    findings.push(
                        FindingBuilder::new(RuleId::Ce003DuplicateTinAcrossEntities)
                            .message(format!("TIN '{tin}' is used by more than one constituent entity"))
                            .xpath(xpath::const_entity(entity_ref.report_index, entity_ref.entity_index))
                            .build(),
                    );
                }
            }
        }

        for (report_index, report) in body.cbc_reports.iter().enumerate() {
            let s = &report.summary;
            let jurisdiction = report.res_country_code.as_str();

            if s.total_revenues.value < 0.0 {
                findings.push(
                    FindingBuilder::new(RuleId::Ce009NegativeRevenues)
                        .message(format!("TotalRevenues is negative ({})", s.total_revenues.value))
                        .xpath(xpath::cbc_report_summary(report_index, "TotalRevenues"))
                        .build(),
                );
            }
            if s.total_revenues.value > 0.0 && s.total_revenues.value < SUSPICIOUSLY_SMALL_REVENUE {
                findings.push(
                    FindingBuilder::new(RuleId::Ce007SuspiciouslySmallAmounts)
                        .message(format!(
                            "TotalRevenues ({}) is suspiciously small; check for a currency-unit mismatch (whole units vs. thousands)",
                            s.total_revenues.value
                        ))
                        .xpath(xpath::cbc_report_summary(report_index, "TotalRevenues"))
                        .build(),
                );
            }
            if let (Some(u), Some(r)) = (&s.unrelated_revenues, &s.related_revenues) {
                let diff = (u.value + r.value - s.total_revenues.value).abs();
                if diff > 0.0 && diff <= ROUNDING_SLACK {
                    findings.push(
                        FindingBuilder::new(RuleId::Ce008RevenueSumOffByRounding)
                            .message(format!("UnrelatedRevenues + RelatedRevenues differs from TotalRevenues by {diff}, consistent with rounding"))
                            .xpath(xpath::cbc_report_summary(report_index, "TotalRevenues"))
                            .build(),
                    );
                }
            }
            for (_, amount) in s.monetary_fields() {
                if !reference::is_known_currency(&amount.currency) {
                    findings.push(
                        FindingBuilder::new(RuleId::Ce010CurrencyInconsistency)
                            .message(format!("Currency code '{}' is not a recognised ISO 4217 code", amount.currency))
                            .xpath(xpath::cbc_report(report_index))
                            .build(),
                    );
                    break;
                }
            }

            for (entity_index, entity) in report.const_entities.entities.iter().enumerate() {
                if entity.tins.is_empty() {
                    findings.push(
                        FindingBuilder::new(RuleId::Ce001MissingTin)
                            .message("Constituent entity has no TIN, one of the 28 most common CbC errors")
                            .xpath(xpath::const_entity_field(report_index, entity_index, "TIN"))
                            .build(),
                    );
                }
                for tin in &entity.tins {
                    if tin.value.eq_ignore_ascii_case("NOTIN") {
                        if let Some(info) = reference::country_info(jurisdiction) {
                            if info.tin_pattern.is_some() {
                                findings.push(
                                    FindingBuilder::new(RuleId::Ce002MisuseOfNotin)
                                        .message(format!("TIN is 'NOTIN' but {jurisdiction} is known to issue TINs; confirm this entity truly has none"))
                                        .xpath(xpath::const_entity(report_index, entity_index))
                                        .build(),
                                );
                            }
                        }
                    }
                    if let Some(issued_by) = &tin.issued_by {
                        if entity.incorp_country_code.as_deref() == Some(jurisdiction) && issued_by.as_str() != jurisdiction {
                            findings.push(
                                FindingBuilder::new(RuleId::Ce019TinCountryPatternCrossCheck)
                                    .message(format!(
                                        "Entity is incorporated and reported under {jurisdiction} but its TIN was issued by {}",
                                        issued_by.as_str()
                                    ))
                                    .xpath(xpath::const_entity(report_index, entity_index))
                                    .build(),
                            );
                        }
                    }
                }

                if entity.incorp_country_code.as_deref().is_some_and(|c| c != jurisdiction) {
                    findings.push(
                        FindingBuilder::new(RuleId::Ce004Table1Table2JurisdictionMismatch)
                            .message("ConstituentEntity's IncorpCountryCode differs from the CbcReport's own ResCountryCode")
                            .xpath(xpath::const_entity_field(report_index, entity_index, "IncorpCountryCode"))
                            .build(),
                    );
                }

                if entity.business_activities.contains(&BusinessActivityCode::Other) && entity.other_entity_info.as_deref().is_none_or(str::is_empty) {
                    findings.push(
                        FindingBuilder::new(RuleId::Ce013Cbc513WithoutExplanation)
                            .message("BusinessActivity is Other (CBC513) without an OtherEntityInfo explanation")
                            .xpath(xpath::const_entity_field(report_index, entity_index, "OtherEntityInfo"))
                            .build(),
                    );
                }

                if let (Some(start), Some(end)) = (&entity.acct_period_start, &entity.acct_period_end) {
                    if let (Some(start_ymd), Some(end_ymd)) = (dates::parse_ymd(start), dates::parse_ymd(end)) {
                        if start_ymd <= end_ymd {
                            let days = dates::days_between(start_ymd, end_ymd);
                            if days > LONG_ACCOUNTING_PERIOD_DAYS {
                                findings.push(
                                    FindingBuilder::new(RuleId::Ce012LongAccountingPeriod)
                                        .message(format!("Accounting period spans {days} days, unusually long for a single fiscal year"))
                                        .xpath(xpath::const_entity(report_index, entity_index))
                                        .build(),
                                );
                            }
                            let today = dates::today();
                            if end_ymd <= today && dates::days_between(end_ymd, today) <= RECENT_REPORTING_DATE_WINDOW_DAYS {
                                findings.push(
                                    FindingBuilder::new(RuleId::Ce011RecentReportingDateFilingConfusion)
                                        .message("AcctPeriodEnd is within the last two weeks; confirm this is the fiscal year end and not the filing date")
                                        .xpath(xpath::const_entity(report_index, entity_index))
                                        .build(),
                                );
                            }
                            if end_ymd.month == 2 && end_ymd.day == 29 {
                                findings.push(
                                    FindingBuilder::new(RuleId::Ce020LeapDayPeriodLengthNote)
                                        .message("AcctPeriodEnd falls on a leap day (Feb 29); note when computing subsequent period lengths")
                                        .xpath(xpath::const_entity(report_index, entity_index))
                                        .build(),
                                );
                            }
                        }
                    }
                }
            }
        }

        for (i, info) in body.additional_info.iter().enumerate() {
            if info.other_info.trim().is_empty() {
                findings.push(
                    FindingBuilder::new(RuleId::Ce014EmptyAdditionalInfo)
                        .message("AdditionalInfo block is present but its OtherInfo text is empty")
                        .xpath(format!("{}/OtherInfo", xpath::additional_info(i)))
                        .build(),
                );
            }
        }

        let decimal_detail = body
            .cbc_reports
            .iter()
            .enumerate()
            .flat_map(|(i, r)| r.summary.monetary_fields().into_iter().map(move |(name, amount)| (i, name, amount.value)))
            .find(|(_, _, value)| has_excess_decimals(*value));
        if let Some((i, name, _)) = decimal_detail {
            findings.push(
                FindingBuilder::new(RuleId::Ce006DecimalsInMonetaryFields)
                    .message(format!("{name} carries more than two decimal places, an unusual level of precision for this table"))
                    .xpath(xpath::cbc_report_summary(i, name))
                    .build(),
            );
        }

        findings
    }
}

fn has_excess_decimals(value: f64) -> bool {
    let scaled = value * 100.0;
    (scaled - scaled.round()).abs() > f64::EPSILON * scaled.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidationOptions;
    use crate::test_support::happy_path_report;

    #[test]
    fn happy_path_produces_no_findings() {
        let ctx = AnalysisContext::new(happy_path_report(), ValidationOptions::default());
        let findings = CommonErrorsValidator.validate(&ctx);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn negative_revenue_is_flagged() {
        let mut report = happy_path_report();
        report.message.cbc_body.cbc_reports[0].summary.total_revenues = crate::model::MonetaryAmount::new(-1.0, "EUR");
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = CommonErrorsValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::Ce009NegativeRevenues));
    }

    #[test]
    fn missing_entity_tin_is_flagged() {
        let mut report = happy_path_report();
        report.message.cbc_body.cbc_reports[0].const_entities.entities[0].tins.clear();
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = CommonErrorsValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::Ce001MissingTin));
    }
}

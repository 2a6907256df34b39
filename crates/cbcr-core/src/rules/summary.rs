//! `Summary` (Table 1) validation, both per-jurisdiction and global
//! (spec.md §4.4.4).
use crate::context::AnalysisContext;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::model::{BusinessActivityCode, CbcReport};
use crate::validator::{Validator, ValidatorMeta, xpath};

/// Relative tolerance for `unrelated + related == total` (spec.md §8, §9(c)).
const REVENUE_SUM_TOLERANCE: f64 = 0.0001;
const MONETARY_ABS_LIMIT: f64 = 1.0e15;
const HIGH_TAX_RATIO_THRESHOLD: f64 = 0.5;
const LOW_SIMPLIFIED_ETR_THRESHOLD: f64 = 0.001;
const TAX_DISCREPANCY_RATIO_THRESHOLD: f64 = 0.5;
const HIGH_ZERO_EMPLOYEE_REVENUE: f64 = 10_000_000.0;
const GLOBAL_REVENUE_THRESHOLD: f64 = 750_000_000.0;
const SINGLE_JURISDICTION_PROFIT_SHARE: f64 = 0.9;
const SINGLE_JURISDICTION_MIN_COUNT: usize = 3;

pub struct SummaryValidator;

impl Validator for SummaryValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "summary",
            name: "Summary",
            description: "Validates Table 1 monetary arithmetic, ranges, and plausibility per jurisdiction and globally",
            category: Category::Business,
            order: 40,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();

        for (i, report) in body.cbc_reports.iter().enumerate() {
            findings.extend(self.check_report(i, report));
        }

        findings.extend(self.check_global(ctx));

        findings
    }
}

impl SummaryValidator {
    fn check_report(&self, i: usize, report: &CbcReport) -> Vec<Finding> {
        let mut findings = Vec::new();
        let s = &report.summary;
        let field = |name: &str| xpath::cbc_report_summary(i, name);

        for (name, amount) in s.monetary_fields() {
            if !amount.value.is_finite() {
                findings.push(
                    FindingBuilder::new(RuleId::SumMonetaryNotFinite)
                        .message(format!("{name} is not a finite number"))
                        .xpath(field(name))
                        .build(),
                );
                continue;
            }
            if amount.value.abs() > MONETARY_ABS_LIMIT {
                findings.push(
                    FindingBuilder::new(RuleId::SumMonetaryOutOfRange)
                        .message(format!("{name} magnitude {} exceeds a plausible reporting range", amount.value))
                        .xpath(field(name))
                        .build(),
                );
            }
            if (name == "TotalRevenues" || name == "TangibleAssets") && amount.value < 0.0 {
                findings.push(
                    FindingBuilder::new(RuleId::SumMonetaryMustBeNonNegative)
                        .message(format!("{name} is negative ({})", amount.value))
                        .xpath(field(name))
                        .build(),
                );
            }
            if has_excess_decimals(amount.value) {
                findings.push(
                    FindingBuilder::new(RuleId::SumExcessDecimalPlaces)
                        .message(format!("{name} carries more than two decimal places ({})", amount.value))
                        .xpath(field(name))
                        .build(),
                );
            }
        }

        if s.capital.value < 0.0 {
            findings.push(
                FindingBuilder::new(RuleId::SumNegativeCapitalInfo)
                    .message(format!("Capital is negative ({})", s.capital.value))
                    .xpath(field("Capital"))
                    .build(),
            );
        }

        if !s.number_of_employees.is_finite() || s.number_of_employees < 0.0 || s.number_of_employees.fract() != 0.0 {
            findings.push(
                FindingBuilder::new(RuleId::SumEmployeesInvalid)
                    .message(format!("NumberOfEmployees ({}) is negative or not a whole number", s.number_of_employees))
                    .xpath(field("NumberOfEmployees"))
                    .build(),
            );
        }

        match (&s.unrelated_revenues, &s.related_revenues) {
            (None, None) => {
                if s.total_revenues.value != 0.0 {
                    findings.push(
                        FindingBuilder::new(RuleId::SumRevenueDecompositionMissing)
                            .message("TotalRevenues is non-zero but UnrelatedRevenues/RelatedRevenues are both absent")
                            .xpath(field("TotalRevenues"))
                            .build(),
                    );
                }
            }
            (Some(u), Some(r)) => {
                let sum = u.value + r.value;
                let scale = sum.abs().max(s.total_revenues.value.abs()).max(1.0);
                if (sum - s.total_revenues.value).abs() > scale * REVENUE_SUM_TOLERANCE {
                    findings.push(
                        FindingBuilder::new(RuleId::SumRevenueSumMismatch)
                            .message(format!(
                                "UnrelatedRevenues + RelatedRevenues ({sum}) does not equal TotalRevenues ({})",
                                s.total_revenues.value
                            ))
                            .xpath(field("TotalRevenues"))
                            .expected_actual(s.total_revenues.value.to_string(), sum.to_string())
                            .build(),
                    );
                }
            }
            _ => {
                findings.push(
                    FindingBuilder::new(RuleId::SumRevenueDecompositionMissing)
                        .message("Only one of UnrelatedRevenues/RelatedRevenues is present")
                        .xpath(field("TotalRevenues"))
                        .build(),
                );
            }
        }

        let currencies: std::collections::BTreeSet<&str> =
            s.monetary_fields().iter().map(|(_, m)| m.currency.as_str()).collect();
        if currencies.len() > 1 {
            findings.push(
                FindingBuilder::new(RuleId::SumCurrencyInconsistent)
                    .message("Summary's monetary fields do not all share the same currency code")
                    .xpath(xpath::cbc_report(i))
                    .build(),
            );
        }

        let profit = s.profit_or_loss.value;
        if profit > 0.0 {
            let effective_tax = s.tax_paid.value.max(s.tax_accrued.value);
            if effective_tax / profit > HIGH_TAX_RATIO_THRESHOLD {
                findings.push(
                    FindingBuilder::new(RuleId::SumHighTaxRatio)
                        .message("Tax paid/accrued exceeds half of profit, an unusually high effective rate")
                        .xpath(xpath::cbc_report(i))
                        .build(),
                );
            }
            if s.tax_paid.value == 0.0 && s.tax_accrued.value == 0.0 {
                findings.push(
                    FindingBuilder::new(RuleId::SumZeroTaxWithProfit)
                        .message("Profit is positive but both TaxPaid and TaxAccrued are zero")
                        .xpath(xpath::cbc_report(i))
                        .build(),
                );
            }
            if s.tax_accrued.value / profit < LOW_SIMPLIFIED_ETR_THRESHOLD {
                findings.push(
                    FindingBuilder::new(RuleId::SumLowSimplifiedEtr)
                        .message("Simplified ETR (TaxAccrued / Profit) is below 0.1%")
                        .xpath(xpath::cbc_report(i))
                        .build(),
                );
            }
            if s.tax_paid.value > 0.0 && s.tax_accrued.value > 0.0 {
                let diff = (s.tax_paid.value - s.tax_accrued.value).abs();
                let scale = s.tax_paid.value.max(s.tax_accrued.value);
                if diff / scale > TAX_DISCREPANCY_RATIO_THRESHOLD {
                    findings.push(
                        FindingBuilder::new(RuleId::SumTaxDiscrepancy)
                            .message("TaxPaid and TaxAccrued differ by more than half, worth a plausibility check")
                            .xpath(xpath::cbc_report(i))
                            .build(),
                    );
                }
            }
        }

        if s.total_revenues.value == 0.0 && s.number_of_employees > 0.0 {
            findings.push(
                FindingBuilder::new(RuleId::SumRevenueZeroEmployeesPositive)
                    .message("TotalRevenues is zero but NumberOfEmployees is positive")
                    .xpath(xpath::cbc_report(i))
                    .build(),
            );
        }
        if s.total_revenues.value > HIGH_ZERO_EMPLOYEE_REVENUE && s.number_of_employees == 0.0 {
            findings.push(
                FindingBuilder::new(RuleId::SumRevenueHighZeroEmployees)
                    .message("TotalRevenues exceeds 10,000,000 but NumberOfEmployees is zero")
                    .xpath(xpath::cbc_report(i))
                    .build(),
            );
        }

        let has_dormant_only = report
            .const_entities
            .business_activities
            .iter()
            .any(|a| *a == BusinessActivityCode::Dormant);
        if s.is_all_zero() && !report.const_entities.entities.is_empty() && !has_dormant_only {
            findings.push(
                FindingBuilder::new(RuleId::SumAllZeroSummary)
                    .message("Every Summary field is zero for a jurisdiction with at least one entity, and no Dormant activity is declared")
                    .xpath(xpath::cbc_report(i))
                    .build(),
            );
        }

        findings
    }

    fn check_global(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let totals = ctx.global_totals();

        if totals.total_revenues < GLOBAL_REVENUE_THRESHOLD {
            findings.push(
                FindingBuilder::new(RuleId::SumGlobalRevenueBelowThreshold)
                    .message(format!(
                        "Group-wide TotalRevenues ({}) is below the 750,000,000 CbC filing-obligation threshold",
                        totals.total_revenues
                    ))
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
        }

        let jurisdictions = ctx.jurisdictions();
        if jurisdictions.len() > SINGLE_JURISDICTION_MIN_COUNT && totals.profit_or_loss > 0.0 {
            if let Some(max) = jurisdictions.iter().map(|j| j.totals.profit_or_loss).fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            }) {
                if max / totals.profit_or_loss > SINGLE_JURISDICTION_PROFIT_SHARE {
                    findings.push(
                        FindingBuilder::new(RuleId::SumSingleJurisdictionProfitConcentration)
                            .message("One jurisdiction accounts for over 90% of group-wide profit across more than three jurisdictions")
                            .xpath(xpath::reporting_entity())
                            .build(),
                    );
                }
            }
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
    use crate::test_support::{happy_path_report, revenue_sum_mismatch_report};

    #[test]
    fn happy_path_produces_only_global_threshold_finding() {
        let ctx = AnalysisContext::new(happy_path_report(), ValidationOptions::default());
        let findings = SummaryValidator.validate(&ctx);
        assert!(findings.iter().all(|f| f.rule_id == RuleId::SumGlobalRevenueBelowThreshold), "{findings:?}");
    }

    #[test]
    fn revenue_sum_mismatch_is_flagged() {
        let ctx = AnalysisContext::new(revenue_sum_mismatch_report(), ValidationOptions::default());
        let findings = SummaryValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::SumRevenueSumMismatch));
    }

    #[test]
    fn excess_decimal_places_are_detected() {
        assert!(has_excess_decimals(1.005));
        assert!(!has_excess_decimals(1.00));
        assert!(!has_excess_decimals(1.5));
    }
}

//! Luxembourg-specific country rules (spec.md §4.5), gated on
//! `ValidationOptions::primary_country == "LU"` by [`crate::validator::execute`].
use std::sync::LazyLock;

use regex::Regex;

use crate::context::AnalysisContext;
use crate::dates::{self, Ymd};
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::model::CbcReport;
use crate::reference;
use crate::validator::{Validator, ValidatorMeta, xpath};

const LU_COUNTRY_CODE: &str = "LU";
/// Filing deadline: 12 months after the close of the reporting fiscal year.
const FILING_DEADLINE_MONTHS: i32 = 12;
const FILING_URGENT_DAYS: i64 = 7;
const FILING_APPROACHING_DAYS: i64 = 30;
const ACCEPTED_LANGUAGES: &[&str] = &["en", "fr", "de"];
/// Consolidated group revenue below which Luxembourg's CbC filing
/// obligation does not bite; distinct from `rules::summary`'s group-wide
/// check (`SUM-017`) in that this one is gated on Luxembourg being the
/// primary jurisdiction and carries Luxembourg-specific guidance text.
const LU_CONSOLIDATED_REVENUE_THRESHOLD: f64 = 750_000_000.0;

static LU_VAT_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^LU\d").unwrap_or_else(|_| Regex::new("a^").unwrap_or_else(|_| Regex::default())));

pub struct LuxembourgValidator;

impl Validator for LuxembourgValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "country_luxembourg",
            name: "Luxembourg",
            description: "Luxembourg-specific TIN, currency, language, and filing-deadline checks",
            category: Category::Country,
            order: 60,
            applicable_countries: Some(&[LU_COUNTRY_CODE]),
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();
        let spec = ctx.report().message_spec();

        if let Some(lang) = &spec.language {
            if !ACCEPTED_LANGUAGES.contains(&lang.to_lowercase().as_str()) {
                findings.push(
                    FindingBuilder::new(RuleId::LuLanguageNotAccepted)
                        .message(format!("Language '{lang}' is not one of Luxembourg's accepted filing languages (en, fr, de)"))
                        .xpath(xpath::message_spec_field("Language"))
                        .build(),
                );
            }
        }

        let lu_reports: Vec<(usize, &CbcReport)> = body
            .cbc_reports
            .iter()
            .enumerate()
            .filter(|(_, r)| r.res_country_code.as_str() == LU_COUNTRY_CODE)
            .collect();

        if lu_reports.is_empty() {
            findings.push(
                FindingBuilder::new(RuleId::LuMissingLuReport)
                    .message("ReportingEntity's primary country is Luxembourg but no CbcReport carries ResCountryCode LU")
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
            return findings;
        }

        for (i, report) in lu_reports {
            findings.extend(self.check_report(i, report, spec.reporting_period.as_ref()));
        }

        let consolidated_revenue = ctx.global_totals().total_revenues;
        if consolidated_revenue < LU_CONSOLIDATED_REVENUE_THRESHOLD {
            findings.push(
                FindingBuilder::new(RuleId::LuBelowThreshold)
                    .message(format!(
                        "Consolidated group revenue ({consolidated_revenue}) is below Luxembourg's EUR 750,000,000 CbC filing threshold"
                    ))
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
        }

        findings
    }
}

impl LuxembourgValidator {
    fn check_report(&self, i: usize, report: &CbcReport, reporting_period: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (name, amount) in report.summary.monetary_fields() {
            if amount.currency != "EUR" {
                findings.push(
                    FindingBuilder::new(RuleId::LuNonEurCurrency)
                        .message(format!("{name} is reported in {}, not EUR", amount.currency))
                        .xpath(xpath::cbc_report_summary(i, name))
                        .build(),
                );
                break;
            }
        }

        if let Some(fy_end) = dates::parse_ymd(reporting_period) {
            findings.extend(self.check_deadline(i, fy_end));
        }

        for (entity_index, entity) in report.const_entities.entities.iter().enumerate() {
            for (tin_index, tin) in entity.tins.iter().enumerate() {
                let xpath = format!("{}/TIN[{}]", xpath::const_entity(i, entity_index), tin_index + 1);
                findings.extend(self.check_tin(&tin.value, tin.issued_by.as_deref(), entity.incorp_country_code.as_deref(), xpath));
            }
        }

        findings
    }

    fn check_deadline(&self, i: usize, fy_end: Ymd) -> Vec<Finding> {
        let mut findings = Vec::new();
        let deadline = dates::add_months(fy_end, FILING_DEADLINE_MONTHS);
        let today = dates::today();
        let days_remaining = dates::days_between(today, deadline);

        if days_remaining < 0 {
            findings.push(
                FindingBuilder::new(RuleId::LuFilingPastDeadline)
                    .message(format!(
                        "Luxembourg's 12-month filing deadline ({}) has already passed",
                        deadline.to_iso_string()
                    ))
                    .xpath(xpath::cbc_report(i))
                    .build(),
            );
        } else if days_remaining <= FILING_URGENT_DAYS {
            findings.push(
                FindingBuilder::new(RuleId::LuFilingUrgent)
                    .message(format!("Luxembourg's filing deadline ({}) is within {FILING_URGENT_DAYS} days", deadline.to_iso_string()))
                    .xpath(xpath::cbc_report(i))
                    .build(),
            );
        } else if days_remaining <= FILING_APPROACHING_DAYS {
            findings.push(
                FindingBuilder::new(RuleId::LuFilingApproaching)
                    .message(format!(
                        "Luxembourg's filing deadline ({}) is within {FILING_APPROACHING_DAYS} days",
                        deadline.to_iso_string()
                    ))
                    .xpath(xpath::cbc_report(i))
                    .build(),
            );
        }

        findings
    }

    fn check_tin(&self, value: &str, issued_by: Option<&str>, incorp_country: Option<&str>, xpath: String) -> Vec<Finding> {
        let mut findings = Vec::new();
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("NOTIN") {
            return findings;
        }

        if LU_VAT_SHAPE_RE.is_match(value) {
            findings.push(
                FindingBuilder::new(RuleId::LuTinVatConfusion)
                    .message(format!("TIN '{value}' has the shape of a Luxembourg VAT number (LU-prefixed), not a tax identification number"))
                    .xpath(xpath.clone())
                    .build(),
            );
        } else if let Some(pattern) = reference::country_info(LU_COUNTRY_CODE).and_then(|c| c.tin_pattern) {
            if let Ok(re) = Regex::new(pattern) {
                if !re.is_match(value) {
                    findings.push(
                        FindingBuilder::new(RuleId::LuTinFormatInvalid)
                            .message(format!("TIN '{value}' does not match Luxembourg's expected matricule format"))
                            .xpath(xpath.clone())
                            .build(),
                    );
                }
            }
        }

        if value.chars().collect::<std::collections::HashSet<_>>().len() == 1 {
            findings.push(
                FindingBuilder::new(RuleId::LuTinPlaceholder)
                    .message(format!("TIN '{value}' is a single repeated character, a common placeholder"))
                    .xpath(xpath.clone())
                    .build(),
            );
        }

        if incorp_country == Some(LU_COUNTRY_CODE) && issued_by != Some(LU_COUNTRY_CODE) {
            findings.push(
                FindingBuilder::new(RuleId::LuTinIssuedByMismatch)
                    .message("Entity is incorporated in Luxembourg but its TIN's issuedBy jurisdiction is not LU")
                    .xpath(xpath)
                    .build(),
            );
        }

        findings
    }
}

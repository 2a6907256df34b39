//! TIN validation (spec.md §4.4.3): the reporting entity must carry at
//! least one TIN; every TIN everywhere in the filing is checked for shape,
//! placeholder/blacklist patterns, and issuing-jurisdiction consistency.
use std::sync::LazyLock;

use regex::Regex;

use crate::context::AnalysisContext;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::model::Tin;
use crate::reference;
use crate::validator::{Validator, ValidatorMeta, xpath};

const TIN_MIN_LEN: usize = 2;
const TIN_MAX_LEN: usize = 200;

static REPEATED_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.)\1*$").unwrap_or_else(|_| Regex::new("a^").unwrap_or_else(|_| Regex::default())));

const BLACKLISTED_TINS: &[&str] = &["N/A", "NONE", "NULL", "UNKNOWN", "NOT AVAILABLE", "TBD"];

struct TinOccurrence<'a> {
    tin: &'a Tin,
    xpath: String,
}

pub struct TinValidator;

impl Validator for TinValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "tin",
            name: "TIN",
            description: "Validates TIN presence, shape, placeholder patterns, and issuing-jurisdiction consistency",
            category: Category::Business,
            order: 30,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();

        if body.reporting_entity.tins.is_empty() {
            findings.push(
                FindingBuilder::new(RuleId::TinReportingEntityMissing)
                    .message("ReportingEntity has no TIN at all")
                    .xpath(xpath::reporting_entity_field("TIN"))
                    .build(),
            );
        }

        let mut occurrences = Vec::new();
        for (i, tin) in body.reporting_entity.tins.iter().enumerate() {
            occurrences.push(TinOccurrence {
                tin,
                xpath: format!("{}[{}]", xpath::reporting_entity_field("TIN"), i + 1),
            });
        }
        for (report_index, report) in body.cbc_reports.iter().enumerate() {
            for (entity_index, entity) in report.const_entities.entities.iter().enumerate() {
                for (i, tin) in entity.tins.iter().enumerate() {
                    occurrences.push(TinOccurrence {
                        tin,
                        xpath: format!("{}/TIN[{}]", xpath::const_entity(report_index, entity_index), i + 1),
                    });
                }
            }
        }

        for occ in &occurrences {
            findings.extend(self.check_one(occ));
        }

        findings
    }
}

impl TinValidator {
    fn check_one(&self, occ: &TinOccurrence<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        let value = occ.tin.value.trim();

        if value.is_empty() {
            findings.push(
                FindingBuilder::new(RuleId::TinEmpty)
                    .message("TIN value is empty")
                    .xpath(occ.xpath.clone())
                    .build(),
            );
            return findings;
        }
        if occ.tin.value != value {
            findings.push(
                FindingBuilder::new(RuleId::TinWhitespace)
                    .message("TIN value has leading or trailing whitespace")
                    .xpath(occ.xpath.clone())
                    .build(),
            );
        }
        if value.len() < TIN_MIN_LEN || value.len() > TIN_MAX_LEN {
            findings.push(
                FindingBuilder::new(RuleId::TinLengthInvalid)
                    .message(format!("TIN length {} is outside [{TIN_MIN_LEN}, {TIN_MAX_LEN}]", value.len()))
                    .xpath(occ.xpath.clone())
                    .build(),
            );
        }
        if REPEATED_CHAR_RE.is_match(value) {
            findings.push(
                FindingBuilder::new(RuleId::TinRepeatedCharPattern)
                    .message(format!("TIN '{value}' is a single character repeated, a common placeholder pattern"))
                    .xpath(occ.xpath.clone())
                    .build(),
            );
        }
        let upper = value.to_uppercase();
        if BLACKLISTED_TINS.contains(&upper.as_str()) {
            findings.push(
                FindingBuilder::new(RuleId::TinPlaceholderBlacklisted)
                    .message(format!("TIN '{value}' is a known placeholder value, not a real identifier"))
                    .xpath(occ.xpath.clone())
                    .build(),
            );
        } else if upper == "NOTIN" {
            findings.push(
                FindingBuilder::new(RuleId::TinNotinInfo)
                    .message("TIN is the literal 'NOTIN' sentinel, meaning no TIN was issued to this entity")
                    .xpath(occ.xpath.clone())
                    .build(),
            );
        }

        match &occ.tin.issued_by {
            None => {
                findings.push(
                    FindingBuilder::new(RuleId::TinIssuedByMissing)
                        .message("TIN has no issuedBy jurisdiction recorded")
                        .xpath(occ.xpath.clone())
                        .build(),
                );
            }
            Some(country) => {
                let country = country.as_str();
                if !reference::is_known_country(country) {
                    findings.push(
                        FindingBuilder::new(RuleId::TinIssuedByInvalidCountry)
                            .message(format!("TIN issuedBy '{country}' is not a recognised country code"))
                            .xpath(occ.xpath.clone())
                            .build(),
                    );
                } else if let Some(info) = reference::country_info(country) {
                    if let Some(pattern) = info.tin_pattern {
                        if let Ok(re) = Regex::new(pattern) {
                            if !re.is_match(value) && !value.eq_ignore_ascii_case("NOTIN") {
                                findings.push(
                                    FindingBuilder::new(RuleId::TinPatternMismatch)
                                        .message(format!(
                                            "TIN '{value}' does not match {country}'s expected local format ({pattern})"
                                        ))
                                        .xpath(occ.xpath.clone())
                                        .build(),
                                );
                            }
                        }
                    }
                }
            }
        }

        findings
    }
}

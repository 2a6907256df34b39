//! `MessageSpec` validation: the envelope metadata for the whole filing
//! (spec.md §4.4.1).
use std::sync::LazyLock;

use regex::Regex;

use crate::context::AnalysisContext;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::model::MessageTypeIndic;
use crate::validator::{Validator, ValidatorMeta, xpath};
use crate::{dates, reference};

const MESSAGE_REF_ID_MAX_LEN: usize = 170;

static MESSAGE_REF_ID_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap_or_else(|_| Regex::new("a^").unwrap_or_else(|_| Regex::default())));

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
        .unwrap_or_else(|_| Regex::new("a^").unwrap_or_else(|_| Regex::default()))
});

pub struct MessageSpecValidator;

impl Validator for MessageSpecValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "message_spec",
            name: "MessageSpec",
            description: "Validates the message envelope: refId shape, correction matrix, timestamp, authorities",
            category: Category::Business,
            order: 10,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let spec = ctx.report().message_spec();
        let field = |name: &str| xpath::message_spec_field(name);

        let ref_id = spec.message_ref_id.trim();
        if ref_id.is_empty() {
            findings.push(
                FindingBuilder::new(RuleId::MsgMessageRefIdMissing)
                    .message("MessageSpec/MessageRefId is missing or blank")
                    .xpath(field("MessageRefId"))
                    .build(),
            );
        } else {
            if spec.message_ref_id.len() > MESSAGE_REF_ID_MAX_LEN {
                findings.push(
                    FindingBuilder::new(RuleId::MsgMessageRefIdTooLong)
                        .message(format!(
                            "MessageRefId is {} characters, exceeding the {MESSAGE_REF_ID_MAX_LEN}-character limit",
                            spec.message_ref_id.len()
                        ))
                        .xpath(field("MessageRefId"))
                        .build(),
                );
            }
            if !MESSAGE_REF_ID_CHARS_RE.is_match(&spec.message_ref_id) {
                findings.push(
                    FindingBuilder::new(RuleId::MsgMessageRefIdInvalidChars)
                        .message("MessageRefId contains characters outside [A-Za-z0-9._-]")
                        .xpath(field("MessageRefId"))
                        .build(),
                );
            }
            let sending = spec.sending_competent_authority.as_str();
            if !spec.message_ref_id.starts_with(sending) {
                findings.push(
                    FindingBuilder::new(RuleId::MsgMessageRefIdAuthorityMismatch)
                        .message(format!(
                            "MessageRefId does not begin with the sending authority's country code ({sending})"
                        ))
                        .xpath(field("MessageRefId"))
                        .build(),
                );
            }
            let period_year = &spec.reporting_period.as_ref()[..4.min(spec.reporting_period.len())];
            if !spec.message_ref_id.contains(period_year) {
                findings.push(
                    FindingBuilder::new(RuleId::MsgMessageRefIdYearMismatch)
                        .message(format!(
                            "MessageRefId does not contain the reporting period's year ({period_year})"
                        ))
                        .xpath(field("MessageRefId"))
                        .build(),
                );
            }
        }

        match spec.message_type_indic {
            MessageTypeIndic::Cbc702 => {
                if spec.corr_message_ref_id.is_none() {
                    findings.push(
                        FindingBuilder::new(RuleId::MsgCorrMessageRefIdRequired)
                            .message("MessageTypeIndic is CBC702 (correction) but CorrMessageRefId is absent")
                            .xpath(field("CorrMessageRefId"))
                            .build(),
                    );
                }
            }
            MessageTypeIndic::Cbc701 => {
                if spec.corr_message_ref_id.is_some() {
                    findings.push(
                        FindingBuilder::new(RuleId::MsgCorrMessageRefIdUnexpected)
                            .message("MessageTypeIndic is CBC701 (new data) but CorrMessageRefId is present")
                            .xpath(field("CorrMessageRefId"))
                            .build(),
                    );
                }
            }
        }

        match dates::parse_ymd(&spec.reporting_period) {
            None => findings.push(
                FindingBuilder::new(RuleId::MsgReportingPeriodInvalid)
                    .message(format!("ReportingPeriod '{}' is not a calendar-valid date", *spec.reporting_period))
                    .xpath(field("ReportingPeriod"))
                    .build(),
            ),
            Some(_) => {
                if dates::is_future(&spec.reporting_period) {
                    findings.push(
                        FindingBuilder::new(RuleId::AppReportingPeriodInFuture)
                            .message("ReportingPeriod lies in the future relative to today")
                            .xpath(field("ReportingPeriod"))
                            .build(),
                    );
                }
            }
        }

        if let Some(ts) = &spec.timestamp {
            if !TIMESTAMP_RE.is_match(ts) {
                findings.push(
                    FindingBuilder::new(RuleId::MsgTimestampInvalid)
                        .message(format!("Timestamp '{ts}' does not match any accepted ISO 8601 form"))
                        .xpath(field("Timestamp"))
                        .build(),
                );
            }
        }

        if spec.message_type == crate::model::MessageType::Cbc401
            && spec.sending_competent_authority != spec.receiving_competent_authority
        {
            findings.push(
                FindingBuilder::new(RuleId::MsgSendingReceivingSameCbc401)
                    .message("CBC401 message has different sending and receiving competent authorities")
                    .xpath(xpath::message_spec())
                    .build(),
            );
        }

        if !reference::is_known_country(spec.sending_competent_authority.as_str()) {
            findings.push(
                FindingBuilder::new(RuleId::MsgInvalidSendingCountryCode)
                    .message(format!(
                        "SendingCompetentAuthority '{}' is not a recognised country code",
                        spec.sending_competent_authority.as_str()
                    ))
                    .xpath(field("SendingCompetentAuthority"))
                    .build(),
            );
        }
        if !reference::is_known_country(spec.receiving_competent_authority.as_str()) {
            findings.push(
                FindingBuilder::new(RuleId::MsgInvalidReceivingCountryCode)
                    .message(format!(
                        "ReceivingCompetentAuthority '{}' is not a recognised country code",
                        spec.receiving_competent_authority.as_str()
                    ))
                    .xpath(field("ReceivingCompetentAuthority"))
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
    use crate::test_support::{happy_path_report, minimal_report};

    #[test]
    fn happy_path_produces_no_findings() {
        let ctx = AnalysisContext::new(happy_path_report(), ValidationOptions::default());
        let findings = MessageSpecValidator.validate(&ctx);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn missing_message_ref_id_is_critical() {
        let mut report = minimal_report();
        report.message.message_spec.message_ref_id = String::new();
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = MessageSpecValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::MsgMessageRefIdMissing));
    }

    #[test]
    fn correction_without_reference_flags_msg_006() {
        let mut report = minimal_report();
        report.message.message_spec.message_type_indic = MessageTypeIndic::Cbc702;
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = MessageSpecValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::MsgCorrMessageRefIdRequired));
    }

    #[test]
    fn invalid_reporting_period_is_flagged() {
        let Ok(bad_period) = crate::newtypes::CalendarDate::try_from("2024-02-30") else {
            unreachable!("2024-02-30 matches the lexical YYYY-MM-DD shape");
        };
        let mut report = minimal_report();
        report.message.message_spec.reporting_period = bad_period;
        let ctx = AnalysisContext::new(report, ValidationOptions::default());
        let findings = MessageSpecValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::MsgReportingPeriodInvalid));
    }
}

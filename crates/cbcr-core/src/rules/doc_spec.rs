//! `DocSpec` validation across the reporting entity, every `CbcReport`, and
//! every `AdditionalInfo` block (spec.md §4.4.2): refId shape, in-file and
//! global uniqueness, and the `DocTypeIndic`/`MessageTypeIndic` correction
//! matrix.
use std::sync::LazyLock;

use regex::Regex;

use crate::context::AnalysisContext;
use crate::external::DocRefIdStoreError;
use crate::finding::builder::FindingBuilder;
use crate::finding::{Category, Finding, RuleId};
use crate::model::{DocSpec, DocTypeIndic, MessageTypeIndic};
use crate::validator::{Validator, ValidatorMeta, xpath};

const DOC_REF_ID_MAX_LEN: usize = 200;

static DOC_REF_ID_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap_or_else(|_| Regex::new("a^").unwrap_or_else(|_| Regex::default())));

struct DocOccurrence<'a> {
    spec: &'a DocSpec,
    xpath: String,
}

pub struct DocSpecValidator;

impl Validator for DocSpecValidator {
    fn metadata(&self) -> ValidatorMeta {
        ValidatorMeta {
            id: "doc_spec",
            name: "DocSpec",
            description: "Validates DocRefId shape/uniqueness and the DocTypeIndic correction matrix",
            category: Category::Business,
            order: 20,
            applicable_countries: None,
            enabled: true,
        }
    }

    fn validate(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let body = ctx.report().cbc_body();

        let mut occurrences = vec![DocOccurrence {
            spec: &body.reporting_entity.doc_spec,
            xpath: xpath::reporting_entity_doc_spec("DocRefId"),
        }];
        for (i, report) in body.cbc_reports.iter().enumerate() {
            occurrences.push(DocOccurrence {
                spec: &report.doc_spec,
                xpath: xpath::cbc_report_doc_spec(i, "DocRefId"),
            });
        }
        for (i, info) in body.additional_info.iter().enumerate() {
            occurrences.push(DocOccurrence {
                spec: &info.doc_spec,
                xpath: format!("{}/DocSpec/DocRefId", xpath::additional_info(i)),
            });
        }

        let message_type_indic = ctx.report().message_spec().message_type_indic;
        let sending = ctx.report().message_spec().sending_competent_authority.as_str();

        let mut saw_production = false;
        let mut saw_test = false;
        let mut saw_oecd2 = false;
        let mut saw_oecd3 = false;

        for occ in &occurrences {
            let doc_ref_id = occ.spec.doc_ref_id.trim();
            if doc_ref_id.is_empty() {
                findings.push(
                    FindingBuilder::new(RuleId::DocRefIdMissing)
                        .message("DocRefId is missing or blank")
                        .xpath(occ.xpath.clone())
                        .build(),
                );
            } else {
                if occ.spec.doc_ref_id.len() > DOC_REF_ID_MAX_LEN {
                    findings.push(
                        FindingBuilder::new(RuleId::DocRefIdTooLong)
                            .message(format!(
                                "DocRefId is {} characters, exceeding the {DOC_REF_ID_MAX_LEN}-character limit",
                                occ.spec.doc_ref_id.len()
                            ))
                            .xpath(occ.xpath.clone())
                            .build(),
                    );
                }
                if !DOC_REF_ID_CHARS_RE.is_match(&occ.spec.doc_ref_id) {
                    findings.push(
                        FindingBuilder::new(RuleId::DocRefIdInvalidChars)
                            .message("DocRefId contains characters outside [A-Za-z0-9._-]")
                            .xpath(occ.xpath.clone())
                            .build(),
                    );
                }
                if !occ.spec.doc_ref_id.starts_with(sending) {
                    findings.push(
                        FindingBuilder::new(RuleId::DocRefIdCountryPrefixMissing)
                            .message(format!("DocRefId does not begin with the sending country code ({sending})"))
                            .xpath(occ.xpath.clone())
                            .build(),
                    );
                }
                if !ctx.register_doc_ref_id(&occ.spec.doc_ref_id, &occ.xpath) {
                    let first_xpath = ctx.first_doc_ref_id_xpath(&occ.spec.doc_ref_id).unwrap_or_default();
                    findings.push(
                        FindingBuilder::new(RuleId::DocRefIdDuplicateInFile)
                            .message(format!("DocRefId '{}' is used more than once in this file", occ.spec.doc_ref_id))
                            .xpath(occ.xpath.clone())
                            .detail("firstSeenAt", first_xpath)
                            .build(),
                    );
                }
            }

            let indic = occ.spec.doc_type_indic;
            if indic.is_test() {
                saw_test = true;
            } else {
                saw_production = true;
            }
            if matches!(indic, DocTypeIndic::Oecd2 | DocTypeIndic::Oecd12) {
                saw_oecd2 = true;
            }
            if matches!(indic, DocTypeIndic::Oecd3 | DocTypeIndic::Oecd13) {
                saw_oecd3 = true;
            }

            if matches!(message_type_indic, MessageTypeIndic::Cbc701)
                && matches!(indic, DocTypeIndic::Oecd2 | DocTypeIndic::Oecd3 | DocTypeIndic::Oecd12 | DocTypeIndic::Oecd13)
            {
                findings.push(
                    FindingBuilder::new(RuleId::DocTypeMessageTypeMismatch)
                        .message("MessageTypeIndic is CBC701 (new data) but this DocSpec carries a correction/deletion DocTypeIndic")
                        .xpath(occ.xpath.clone())
                        .build(),
                );
            }
            if matches!(message_type_indic, MessageTypeIndic::Cbc702)
                && matches!(indic, DocTypeIndic::Oecd1 | DocTypeIndic::Oecd11)
            {
                findings.push(
                    FindingBuilder::new(RuleId::DocTypeMessageTypeMismatch)
                        .message("MessageTypeIndic is CBC702 (correction) but this DocSpec is marked as brand-new data")
                        .xpath(occ.xpath.clone())
                        .build(),
                );
            }

            if indic.is_correction_or_deletion() && occ.spec.corr_doc_ref_id.is_none() {
                findings.push(
                    FindingBuilder::new(RuleId::DocCorrDocRefIdRequired)
                        .message("DocTypeIndic is a correction/deletion but CorrDocRefId is absent")
                        .xpath(occ.xpath.clone())
                        .build(),
                );
            }
            if indic.is_correction_or_deletion() && occ.spec.corr_message_ref_id.is_none() {
                findings.push(
                    FindingBuilder::new(RuleId::DocCorrMessageRefIdRequired)
                        .message("DocTypeIndic is a correction/deletion but CorrMessageRefId is absent")
                        .xpath(occ.xpath.clone())
                        .build(),
                );
            }
            if let Some(corr) = &occ.spec.corr_doc_ref_id {
                if corr == &occ.spec.doc_ref_id {
                    findings.push(
                        FindingBuilder::new(RuleId::DocCorrDocRefIdEqualsDocRefId)
                            .message("CorrDocRefId is identical to this DocSpec's own DocRefId")
                            .xpath(occ.xpath.clone())
                            .build(),
                    );
                }
            }
            if indic.is_new() && (occ.spec.corr_doc_ref_id.is_some() || occ.spec.corr_message_ref_id.is_some()) {
                findings.push(
                    FindingBuilder::new(RuleId::DocCorrFieldsPresentOnNewData)
                        .message("DocTypeIndic marks brand-new data but a correction reference field is present")
                        .xpath(occ.xpath.clone())
                        .build(),
                );
            }
        }

        if saw_production && saw_test {
            findings.push(
                FindingBuilder::new(RuleId::DocProductionTestFamilyMixed)
                    .message("Both production (OECD0-3) and test (OECD10-13) DocTypeIndic values appear in the same message")
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
        }
        if saw_oecd2 && saw_oecd3 {
            findings.push(
                FindingBuilder::new(RuleId::DocOecdTypeMixed23)
                    .message("Both OECD2 (corrected) and OECD3 (deleted) DocTypeIndic values appear in the same message")
                    .xpath(xpath::reporting_entity())
                    .build(),
            );
        }

        if ctx.options().check_global_doc_ref_ids {
            findings.extend(self.check_global_uniqueness(ctx, &occurrences));
        }

        findings
    }
}

impl DocSpecValidator {
    fn check_global_uniqueness(&self, ctx: &AnalysisContext, occurrences: &[DocOccurrence<'_>]) -> Vec<Finding> {
        let ids: Vec<String> = occurrences
            .iter()
            .filter(|o| !o.spec.doc_ref_id.trim().is_empty())
            .map(|o| o.spec.doc_ref_id.clone())
            .collect();
        if ids.is_empty() {
            return Vec::new();
        }

        match ctx.doc_ref_id_store().batch_check(&ids) {
            Ok(response) => response
                .duplicates
                .into_iter()
                .map(|dup| {
                    let xpath = occurrences
                        .iter()
                        .find(|o| o.spec.doc_ref_id == dup.doc_ref_id)
                        .map(|o| o.xpath.clone());
                    let mut builder = if dup.existing_record.is_superseded {
                        FindingBuilder::new(RuleId::DocGlobalDuplicateCorrectionChain).message(format!(
                            "DocRefId '{}' matches a superseded record from a prior submission, consistent with a correction chain",
                            dup.doc_ref_id
                        ))
                    } else {
                        FindingBuilder::new(RuleId::DocGlobalDuplicateCritical).message(format!(
                            "DocRefId '{}' was already submitted in jurisdiction {} and is not superseded",
                            dup.doc_ref_id, dup.existing_record.issuing_jurisdiction
                        ))
                    };
                    if let Some(xpath) = xpath {
                        builder = builder.xpath(xpath);
                    }
                    builder
                        .detail("existingJurisdiction", dup.existing_record.issuing_jurisdiction)
                        .detail("existingReportingPeriod", dup.existing_record.reporting_period)
                        .build()
                })
                .collect(),
            Err(err) => vec![
                FindingBuilder::new(RuleId::AppExternalStoreFailure)
                    .message(format!("global DocRefId uniqueness check could not complete: {}", describe(&err)))
                    .build(),
            ],
        }
    }
}

fn describe(err: &DocRefIdStoreError) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidationOptions;
    use crate::test_support::{correction_without_reference_report, duplicate_doc_ref_id_report, happy_path_report};

    #[test]
    fn happy_path_produces_no_findings() {
        let ctx = AnalysisContext::new(happy_path_report(), ValidationOptions::default());
        let findings = DocSpecValidator.validate(&ctx);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn duplicate_doc_ref_id_in_file_is_flagged() {
        let ctx = AnalysisContext::new(duplicate_doc_ref_id_report(), ValidationOptions::default());
        let findings = DocSpecValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::DocRefIdDuplicateInFile));
    }

    #[test]
    fn correction_without_reference_flags_doc_005_and_006() {
        let ctx = AnalysisContext::new(correction_without_reference_report(), ValidationOptions::default());
        let findings = DocSpecValidator.validate(&ctx);
        assert!(findings.iter().any(|f| f.rule_id == RuleId::DocCorrDocRefIdRequired));
        assert!(findings.iter().any(|f| f.rule_id == RuleId::DocCorrMessageRefIdRequired));
    }
}

//! Test-only fixture constructors, in the teacher's `test_helpers.rs` idiom:
//! plain functions building [`ParsedReport`] values as Rust struct literals,
//! one per spec.md §8 end-to-end scenario. Not compiled into release builds.
#![cfg(test)]
#![allow(clippy::panic)]

use crate::model::*;
use crate::newtypes::{CalendarDate, CountryCode};

fn cc(code: &str) -> CountryCode {
    CountryCode::try_from(code).unwrap_or_else(|_| panic!("bad test fixture country code {code}"))
}

fn date(s: &str) -> CalendarDate {
    CalendarDate::try_from(s).unwrap_or_else(|_| panic!("bad test fixture date {s}"))
}

fn eur(value: f64) -> MonetaryAmount {
    MonetaryAmount::new(value, "EUR")
}

fn base_message_spec() -> MessageSpec {
    MessageSpec {
        message_ref_id: "LU2024-001".to_string(),
        message_type: MessageType::Cbc401,
        message_type_indic: MessageTypeIndic::Cbc701,
        corr_message_ref_id: None,
        reporting_period: date("2024-12-31"),
        timestamp: Some("2025-03-01T10:00:00Z".to_string()),
        sending_competent_authority: cc("LU"),
        receiving_competent_authority: cc("LU"),
        language: Some("EN".to_string()),
    }
}

fn base_reporting_entity() -> ReportingEntity {
    ReportingEntity {
        names: vec!["Acme Group Holdings".to_string()],
        addresses: vec!["1 Rue de la Gare, Luxembourg".to_string()],
        tins: vec![Tin {
            value: "12345678901".to_string(),
            issued_by: Some(cc("LU")),
        }],
        reporting_role: ReportingRole::UltimateParentEntity,
        doc_spec: DocSpec {
            doc_type_indic: DocTypeIndic::Oecd1,
            doc_ref_id: "LU2024-001-1".to_string(),
            corr_doc_ref_id: None,
            corr_message_ref_id: None,
        },
    }
}

fn base_cbc_report() -> CbcReport {
    CbcReport {
        res_country_code: cc("LU"),
        doc_spec: DocSpec {
            doc_type_indic: DocTypeIndic::Oecd1,
            doc_ref_id: "LU2024-001-2".to_string(),
            corr_doc_ref_id: None,
            corr_message_ref_id: None,
        },
        summary: Summary {
            total_revenues: eur(1_000_000.0),
            unrelated_revenues: Some(eur(600_000.0)),
            related_revenues: Some(eur(400_000.0)),
            profit_or_loss: eur(200_000.0),
            tax_paid: eur(40_000.0),
            tax_accrued: eur(40_000.0),
            capital: eur(500_000.0),
            accumulated_earnings: eur(300_000.0),
            tangible_assets: eur(250_000.0),
            number_of_employees: 10.0,
        },
        const_entities: ConstEntities {
            business_activities: vec![BusinessActivityCode::Manufacturing],
            entities: vec![ConstituentEntity {
                names: vec!["Acme Group Holdings".to_string()],
                tins: vec![Tin {
                    value: "12345678901".to_string(),
                    issued_by: Some(cc("LU")),
                }],
                addresses: vec!["1 Rue de la Gare, Luxembourg".to_string()],
                incorp_country_code: Some(cc("LU")),
                acct_period_start: Some(date("2024-01-01")),
                acct_period_end: Some(date("2024-12-31")),
                business_activities: vec![BusinessActivityCode::Manufacturing],
                other_entity_info: None,
            }],
        },
    }
}

/// Scenario 1: happy path, one jurisdiction.
pub fn happy_path_report() -> ParsedReport {
    ParsedReport {
        message: Message {
            message_spec: base_message_spec(),
            cbc_body: CbcBody {
                reporting_entity: base_reporting_entity(),
                cbc_reports: vec![base_cbc_report()],
                additional_info: Vec::new(),
            },
        },
    }
}

/// A bare-minimum fixture for tests that only need *a* valid report, not
/// the full happy-path shape.
pub fn minimal_report() -> ParsedReport {
    happy_path_report()
}

/// Scenario 2: duplicate DocRefId across the reporting entity and the
/// single `CbcReport`.
pub fn duplicate_doc_ref_id_report() -> ParsedReport {
    let mut report = happy_path_report();
    report.message.cbc_body.cbc_reports[0].doc_spec.doc_ref_id =
        report.message.cbc_body.reporting_entity.doc_spec.doc_ref_id.clone();
    report
}

/// Scenario 3: revenue sum mismatch (`600,000 + 399,000 != 1,000,000`).
pub fn revenue_sum_mismatch_report() -> ParsedReport {
    let mut report = happy_path_report();
    report.message.cbc_body.cbc_reports[0].summary.related_revenues = Some(eur(399_000.0));
    report
}

/// Scenario 4: correction without reference — `CBC702` with no
/// `corrMessageRefId`, reporting entity `OECD2` with no `corrDocRefId`.
pub fn correction_without_reference_report() -> ParsedReport {
    let mut report = happy_path_report();
    report.message.message_spec.message_type_indic = MessageTypeIndic::Cbc702;
    report.message.cbc_body.reporting_entity.doc_spec.doc_type_indic = DocTypeIndic::Oecd2;
    report
}

/// Scenario 5: Pillar 2 safe-harbour pass via de-minimis.
pub fn pillar2_de_minimis_report() -> ParsedReport {
    let mut report = happy_path_report();
    let r = &mut report.message.cbc_body.cbc_reports[0].summary;
    r.total_revenues = eur(5_000_000.0);
    r.unrelated_revenues = None;
    r.related_revenues = None;
    r.profit_or_loss = eur(500_000.0);
    r.tax_accrued = eur(0.0);
    r.number_of_employees = 3.0;
    r.tangible_assets = eur(0.0);
    report
}

/// Scenario 6: low-tax jurisdiction top-up estimate (simplified ETR 5%).
pub fn pillar2_low_tax_report() -> ParsedReport {
    let mut report = happy_path_report();
    let r = &mut report.message.cbc_body.cbc_reports[0].summary;
    r.total_revenues = eur(50_000_000.0);
    r.unrelated_revenues = None;
    r.related_revenues = None;
    r.profit_or_loss = eur(10_000_000.0);
    r.tax_accrued = eur(500_000.0);
    report
}

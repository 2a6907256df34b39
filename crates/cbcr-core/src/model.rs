//! The parsed CbCR document: immutable, already-deserialized domain types.
//!
//! Everything in this module is produced by an external XML deserializer
//! (out of scope for this crate, per `DESIGN.md`) and is read-only from the
//! moment a [`ParsedReport`] is constructed. Validators never mutate these
//! types; all derived state lives in [`crate::context::AnalysisContext`].
use serde::{Deserialize, Serialize};

use crate::newtypes::{CalendarDate, CountryCode, RefId};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// `MessageSpec/MessageType`: the OECD CbC schema message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// CBC401 — a CbC report message.
    #[serde(rename = "CBC401")]
    Cbc401,
    /// CBC402 — a CbC status message.
    #[serde(rename = "CBC402")]
    Cbc402,
}

/// `MessageSpec/MessageTypeIndic`: whether this message is new or a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageTypeIndic {
    /// CBC701 — new information.
    #[serde(rename = "CBC701")]
    Cbc701,
    /// CBC702 — the message corrects a previously submitted message.
    #[serde(rename = "CBC702")]
    Cbc702,
}

/// `ReportingEntity/ReportingRole`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportingRole {
    /// CBC801 — Ultimate Parent Entity.
    #[serde(rename = "CBC801")]
    UltimateParentEntity,
    /// CBC802 — Surrogate Parent Entity.
    #[serde(rename = "CBC802")]
    SurrogateParentEntity,
    /// CBC803 — any other reporting entity.
    #[serde(rename = "CBC803")]
    Other,
}

/// `DocSpec/DocTypeIndic`: the lifecycle state of one document within the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocTypeIndic {
    /// OECD0 — resent data, no modification.
    #[serde(rename = "OECD0")]
    Oecd0,
    /// OECD1 — new data.
    #[serde(rename = "OECD1")]
    Oecd1,
    /// OECD2 — corrected data.
    #[serde(rename = "OECD2")]
    Oecd2,
    /// OECD3 — deletion of previously sent data.
    #[serde(rename = "OECD3")]
    Oecd3,
    /// OECD10 — resent data (test).
    #[serde(rename = "OECD10")]
    Oecd10,
    /// OECD11 — new data (test).
    #[serde(rename = "OECD11")]
    Oecd11,
    /// OECD12 — corrected data (test).
    #[serde(rename = "OECD12")]
    Oecd12,
    /// OECD13 — deletion of previously sent data (test).
    #[serde(rename = "OECD13")]
    Oecd13,
}

impl DocTypeIndic {
    /// `true` for the `OECD10`..`OECD13` test-submission family.
    pub fn is_test(self) -> bool {
        matches!(self, Self::Oecd10 | Self::Oecd11 | Self::Oecd12 | Self::Oecd13)
    }

    /// `true` for `OECD2`/`OECD12` (correction) or `OECD3`/`OECD13` (deletion).
    pub fn is_correction_or_deletion(self) -> bool {
        matches!(self, Self::Oecd2 | Self::Oecd3 | Self::Oecd12 | Self::Oecd13)
    }

    /// `true` for `OECD1`/`OECD11` (brand-new data).
    pub fn is_new(self) -> bool {
        matches!(self, Self::Oecd1 | Self::Oecd11)
    }

    /// `true` for `OECD2`/`OECD12`, the "corrected data" family specifically
    /// (as opposed to `OECD3`/`OECD13` deletions).
    pub fn is_correction(self) -> bool {
        matches!(self, Self::Oecd2 | Self::Oecd12)
    }

    /// `true` for `OECD3`/`OECD13`, the "deletion" family.
    pub fn is_deletion(self) -> bool {
        matches!(self, Self::Oecd3 | Self::Oecd13)
    }
}

/// OECD business-activity codes, `CBC501`..`CBC513`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessActivityCode {
    /// CBC501 — Research and Development.
    #[serde(rename = "CBC501")]
    ResearchAndDevelopment,
    /// CBC502 — Holding or Managing intellectual property.
    #[serde(rename = "CBC502")]
    HoldingOrManagingIp,
    /// CBC503 — Purchasing or Procurement.
    #[serde(rename = "CBC503")]
    Purchasing,
    /// CBC504 — Manufacturing or Production.
    #[serde(rename = "CBC504")]
    Manufacturing,
    /// CBC505 — Sales, Marketing or Distribution.
    #[serde(rename = "CBC505")]
    SalesMarketingDistribution,
    /// CBC506 — Administrative, Management or Support Services.
    #[serde(rename = "CBC506")]
    AdministrativeSupport,
    /// CBC507 — Provision of Services to Unrelated Parties.
    #[serde(rename = "CBC507")]
    ServicesToUnrelatedParties,
    /// CBC508 — Internal Group Finance.
    #[serde(rename = "CBC508")]
    InternalGroupFinance,
    /// CBC509 — Regulated Financial Services.
    #[serde(rename = "CBC509")]
    RegulatedFinancialServices,
    /// CBC510 — Insurance.
    #[serde(rename = "CBC510")]
    Insurance,
    /// CBC511 — Holding Shares or Other Equity Instruments.
    #[serde(rename = "CBC511")]
    HoldingShares,
    /// CBC512 — Dormant.
    #[serde(rename = "CBC512")]
    Dormant,
    /// CBC513 — Other.
    #[serde(rename = "CBC513")]
    Other,
}

impl BusinessActivityCode {
    /// Returns the canonical `CBCnnn` code string.
    pub fn code(self) -> &'static str {
        match self {
            Self::ResearchAndDevelopment => "CBC501",
            Self::HoldingOrManagingIp => "CBC502",
            Self::Purchasing => "CBC503",
            Self::Manufacturing => "CBC504",
            Self::SalesMarketingDistribution => "CBC505",
            Self::AdministrativeSupport => "CBC506",
            Self::ServicesToUnrelatedParties => "CBC507",
            Self::InternalGroupFinance => "CBC508",
            Self::RegulatedFinancialServices => "CBC509",
            Self::Insurance => "CBC510",
            Self::HoldingShares => "CBC511",
            Self::Dormant => "CBC512",
            Self::Other => "CBC513",
        }
    }

    /// `true` for the two holding-only activities (CBC502, CBC511).
    pub fn is_holding_only(self) -> bool {
        matches!(self, Self::HoldingOrManagingIp | Self::HoldingShares)
    }
}

// ---------------------------------------------------------------------------
// Monetary amounts and TINs
// ---------------------------------------------------------------------------

/// A monetary value paired with its ISO 4217 currency code.
///
/// The currency is kept as a plain `String` rather than a closed enum: the
/// reference data's currency table is the source of truth for whether a
/// code is recognised, and validators (not the type system) report
/// unrecognised codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub value: f64,
    pub currency: String,
}

impl MonetaryAmount {
    pub fn new(value: f64, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }
}

/// One `TIN` element: a value plus the optional issuing jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tin {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<CountryCode>,
}

// ---------------------------------------------------------------------------
// DocSpec
// ---------------------------------------------------------------------------

/// `DocSpec`, present on the reporting entity, every `CbcReport`, and every
/// `AdditionalInfo` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocSpec {
    pub doc_type_indic: DocTypeIndic,
    pub doc_ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corr_doc_ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corr_message_ref_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// `ReportingEntity`: the UPE, surrogate, or other entity filing the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingEntity {
    pub names: Vec<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub tins: Vec<Tin>,
    pub reporting_role: ReportingRole,
    pub doc_spec: DocSpec,
}

impl ReportingEntity {
    /// The entity's primary (first) name, used as `upeName` in the report
    /// metadata. Empty string if no name is present (a `MSG`/`TIN`-family
    /// validator flags that separately).
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }
}

/// One `ConstituentEntity` within a `CbcReport`'s `ConstEntities` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentEntity {
    pub names: Vec<String>,
    #[serde(default)]
    pub tins: Vec<Tin>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorp_country_code: Option<CountryCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acct_period_start: Option<CalendarDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acct_period_end: Option<CalendarDate>,
    #[serde(default)]
    pub business_activities: Vec<BusinessActivityCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_entity_info: Option<String>,
}

impl ConstituentEntity {
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }
}

/// `CbcReport/ConstEntities`: the per-jurisdiction activity codes and entity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstEntities {
    #[serde(default)]
    pub business_activities: Vec<BusinessActivityCode>,
    #[serde(default)]
    pub entities: Vec<ConstituentEntity>,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// `CbcReport/Summary`: the Table 1 monetary aggregates for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_revenues: MonetaryAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrelated_revenues: Option<MonetaryAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_revenues: Option<MonetaryAmount>,
    pub profit_or_loss: MonetaryAmount,
    pub tax_paid: MonetaryAmount,
    pub tax_accrued: MonetaryAmount,
    pub capital: MonetaryAmount,
    pub accumulated_earnings: MonetaryAmount,
    pub tangible_assets: MonetaryAmount,
    pub number_of_employees: f64,
}

impl Summary {
    /// Iterates over every monetary field as `(field_name, &MonetaryAmount)`,
    /// in the canonical Table 1 ordering. Used by currency-consistency and
    /// magnitude checks that apply uniformly across all nine fields.
    pub fn monetary_fields(&self) -> Vec<(&'static str, &MonetaryAmount)> {
        let mut fields = vec![
            ("TotalRevenues", &self.total_revenues),
            ("ProfitOrLoss", &self.profit_or_loss),
            ("TaxPaid", &self.tax_paid),
            ("TaxAccrued", &self.tax_accrued),
            ("Capital", &self.capital),
            ("AccumulatedEarnings", &self.accumulated_earnings),
            ("TangibleAssets", &self.tangible_assets),
        ];
        if let Some(u) = &self.unrelated_revenues {
            fields.push(("UnrelatedRevenues", u));
        }
        if let Some(r) = &self.related_revenues {
            fields.push(("RelatedRevenues", r));
        }
        fields
    }

    /// `true` if every monetary field is exactly zero and there are no employees.
    pub fn is_all_zero(&self) -> bool {
        self.monetary_fields().iter().all(|(_, m)| m.value == 0.0) && self.number_of_employees == 0.0
    }
}

// ---------------------------------------------------------------------------
// CbcReport / CbcBody / Message
// ---------------------------------------------------------------------------

/// One `CbcReports` element: the per-jurisdiction Table 1 + Table 2 data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbcReport {
    pub res_country_code: CountryCode,
    pub doc_spec: DocSpec,
    pub summary: Summary,
    pub const_entities: ConstEntities,
}

/// One `AdditionalInfo` block (Table 3 free-text notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    pub doc_spec: DocSpec,
    #[serde(default)]
    pub other_info: String,
    #[serde(default)]
    pub res_country_codes: Vec<CountryCode>,
}

/// `CbcBody`: the reporting entity plus its jurisdiction reports and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbcBody {
    pub reporting_entity: ReportingEntity,
    #[serde(default)]
    pub cbc_reports: Vec<CbcReport>,
    #[serde(default)]
    pub additional_info: Vec<AdditionalInfo>,
}

/// `MessageSpec`: the envelope metadata for the whole filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSpec {
    pub message_ref_id: String,
    pub message_type: MessageType,
    pub message_type_indic: MessageTypeIndic,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corr_message_ref_id: Option<String>,
    pub reporting_period: CalendarDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub sending_competent_authority: CountryCode,
    pub receiving_competent_authority: CountryCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// `Message`: `MessageSpec` + `CbcBody`. The root's only child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_spec: MessageSpec,
    pub cbc_body: CbcBody,
}

/// The root parsed document: `/CBC_OECD`.
///
/// Immutable after construction. Produced by an external XML deserializer;
/// this crate never parses XML itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub message: Message,
}

impl ParsedReport {
    /// `true` iff `MessageSpec/MessageTypeIndic == CBC702`.
    pub fn is_correction(&self) -> bool {
        self.message.message_spec.message_type_indic == MessageTypeIndic::Cbc702
    }

    /// `true` iff the reporting entity's `DocTypeIndic` is in the
    /// `OECD10`..`OECD13` test-submission family.
    pub fn is_test_submission(&self) -> bool {
        self.message
            .cbc_body
            .reporting_entity
            .doc_spec
            .doc_type_indic
            .is_test()
    }

    /// Convenience accessor for `MessageSpec`.
    pub fn message_spec(&self) -> &MessageSpec {
        &self.message.message_spec
    }

    /// Convenience accessor for `CbcBody`.
    pub fn cbc_body(&self) -> &CbcBody {
        &self.message.cbc_body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_type_indic_classification_is_mutually_exclusive() {
        for variant in [
            DocTypeIndic::Oecd0,
            DocTypeIndic::Oecd1,
            DocTypeIndic::Oecd2,
            DocTypeIndic::Oecd3,
            DocTypeIndic::Oecd10,
            DocTypeIndic::Oecd11,
            DocTypeIndic::Oecd12,
            DocTypeIndic::Oecd13,
        ] {
            let flags = [
                variant.is_new(),
                variant.is_correction(),
                variant.is_deletion(),
            ];
            assert!(flags.iter().filter(|b| **b).count() <= 1, "{variant:?}");
        }
    }

    #[test]
    fn business_activity_code_round_trips() {
        assert_eq!(BusinessActivityCode::Dormant.code(), "CBC512");
        assert!(BusinessActivityCode::HoldingShares.is_holding_only());
        assert!(!BusinessActivityCode::Manufacturing.is_holding_only());
    }

    #[test]
    fn summary_all_zero_requires_zero_employees() {
        let zero = MonetaryAmount::new(0.0, "EUR");
        let summary = Summary {
            total_revenues: zero.clone(),
            unrelated_revenues: None,
            related_revenues: None,
            profit_or_loss: zero.clone(),
            tax_paid: zero.clone(),
            tax_accrued: zero.clone(),
            capital: zero.clone(),
            accumulated_earnings: zero.clone(),
            tangible_assets: zero,
            number_of_employees: 0.0,
        };
        assert!(summary.is_all_zero());
    }
}

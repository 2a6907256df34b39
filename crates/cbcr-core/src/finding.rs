//! The diagnostic model: a stable rule-id surface, severity/category
//! enumerations, and the immutable [`Finding`] type validators produce.
//!
//! [`FindingBuilder`] (in [`builder`]) is the only way to construct a
//! [`Finding`]; it consults [`crate::reference::rule_meta`] for defaults so
//! individual validators never repeat category/severity/suggestion text.
pub mod builder;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The six top-level finding categories, matching the engine's phase grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    XmlWellformedness,
    SchemaConformity,
    Business,
    Country,
    DataQuality,
    Pillar2,
}

/// Ordered severity: `Info < Warning < Error < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// The stable rule-identifier surface. One variant per condition a
/// validator can report, grouped by prefix family. `Extension` is an escape
/// hatch for forward-compatible rule ids not known at compile time;
/// `Internal` backs the engine's own synthesized findings (`APP-005`
/// panic-capture, etc. also have dedicated variants below — `Internal` is
/// reserved for findings with no stable identity at all, and should not
/// appear in a conforming report).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    // -- MSG: MessageSpec ---------------------------------------------------
    MsgMessageRefIdMissing,
    MsgMessageRefIdTooLong,
    MsgMessageRefIdInvalidChars,
    MsgMessageRefIdAuthorityMismatch,
    MsgMessageRefIdYearMismatch,
    MsgCorrMessageRefIdRequired,
    MsgCorrMessageRefIdUnexpected,
    MsgReportingPeriodInvalid,
    MsgTimestampInvalid,
    MsgSendingReceivingSameCbc401,
    MsgInvalidSendingCountryCode,
    MsgInvalidReceivingCountryCode,

    // -- DOC: DocSpec --------------------------------------------------------
    DocRefIdMissing,
    DocRefIdDuplicateInFile,
    DocRefIdTooLong,
    DocRefIdInvalidChars,
    DocTypeMessageTypeMismatch,
    DocCorrDocRefIdRequired,
    DocCorrMessageRefIdRequired,
    DocCorrDocRefIdEqualsDocRefId,
    DocCorrFieldsPresentOnNewData,
    DocProductionTestFamilyMixed,
    DocOecdTypeMixed23,
    DocRefIdCountryPrefixMissing,
    DocGlobalDuplicateCritical,
    DocGlobalDuplicateCorrectionChain,

    // -- TIN -------------------------------------------------------------
    TinReportingEntityMissing,
    TinEmpty,
    TinWhitespace,
    TinLengthInvalid,
    TinRepeatedCharPattern,
    TinPlaceholderBlacklisted,
    TinNotinInfo,
    TinIssuedByMissing,
    TinIssuedByInvalidCountry,
    TinPatternMismatch,

    // -- SUM: Summary ------------------------------------------------------
    SumRevenueDecompositionMissing,
    SumRevenueSumMismatch,
    SumEmployeesInvalid,
    SumMonetaryNotFinite,
    SumMonetaryOutOfRange,
    SumMonetaryMustBeNonNegative,
    SumNegativeCapitalInfo,
    SumExcessDecimalPlaces,
    SumCurrencyInconsistent,
    SumHighTaxRatio,
    SumZeroTaxWithProfit,
    SumLowSimplifiedEtr,
    SumTaxDiscrepancy,
    SumRevenueZeroEmployeesPositive,
    SumRevenueHighZeroEmployees,
    SumAllZeroSummary,
    SumGlobalRevenueBelowThreshold,
    SumSingleJurisdictionProfitConcentration,

    // -- BIZ: business activity --------------------------------------------
    BizInvalidActivityCode,
    BizNoActivitiesListed,
    BizDuplicateActivityCode,
    BizOtherActivityMissingInfo,
    BizDormantWithActivity,
    BizDormantWithOtherCode,
    BizHoldingOnlyLargeScale,

    // -- XFV: cross-field data quality --------------------------------------
    XfvHoldingWithHighTangibleAssets,
    XfvManufacturingLowAssets,
    XfvAssetIntensiveZeroAssets,
    XfvManufacturingAbnormalAssetRatio,
    XfvDividendExclusionReminder,

    // -- ENC: consistency data quality ---------------------------------------
    EncMultipleCurrenciesAcrossFields,
    EncMixedCurrencyPresence,
    EncAcctPeriodInverted,
    EncFiscalYearLengthAnomaly,
    EncRefIdPrefixMismatch,

    // -- CC: completeness data quality --------------------------------------
    CcSummaryFieldMissing,
    CcRevenueDecompositionPartial,
    CcEntityNameMissing,
    CcReportingEntityNotInEntityList,
    CcReportingEntityOutsideHomeJurisdiction,
    CcAdditionalInfoTooShort,

    // -- CE: OECD "28 common errors" ----------------------------------------
    Ce001MissingTin,
    Ce002MisuseOfNotin,
    Ce003DuplicateTinAcrossEntities,
    Ce004Table1Table2JurisdictionMismatch,
    Ce005ReportingEntityAbsentFromEntityList,
    Ce006DecimalsInMonetaryFields,
    Ce007SuspiciouslySmallAmounts,
    Ce008RevenueSumOffByRounding,
    Ce009NegativeRevenues,
    Ce010CurrencyInconsistency,
    Ce011RecentReportingDateFilingConfusion,
    Ce012LongAccountingPeriod,
    Ce013Cbc513WithoutExplanation,
    Ce014EmptyAdditionalInfo,
    Ce019TinCountryPatternCrossCheck,
    Ce020LeapDayPeriodLengthNote,

    // -- P2: Pillar 2 --------------------------------------------------------
    P2NotApplicableFiscalYear,
    P2SafeHarbourPass,
    P2JurTopUpHigh,
    P2JurTopUpMedium,
    P2JurTopUpLow,
    P2JurisdictionMechanism,

    // -- LU: Luxembourg country rules -----------------------------------------
    LuTinFormatInvalid,
    LuTinPlaceholder,
    LuTinVatConfusion,
    LuFilingPastDeadline,
    LuFilingUrgent,
    LuFilingApproaching,
    LuNonEurCurrency,
    LuTinIssuedByMismatch,
    LuLanguageNotAccepted,
    LuBelowThreshold,
    LuMissingLuReport,

    // -- APP: engine/infrastructure -----------------------------------------
    AppContextConstructionWarning,
    AppExternalStoreFailure,
    AppValidatorPanic,
    AppCancellationPartialReport,
    AppReportingPeriodInFuture,

    /// Forward-compatible escape hatch for a rule id not known at compile time.
    Extension(String),
    /// Reserved for findings with no stable identity. Should not appear in
    /// a conforming report; `APP-005` and friends have dedicated variants.
    Internal,
}

impl RuleId {
    /// Returns the canonical hyphenated rule-id string, e.g. `"DOC-002"`.
    pub fn code(&self) -> String {
        match self {
            Self::MsgMessageRefIdMissing => "MSG-001".to_string(),
            Self::MsgMessageRefIdTooLong => "MSG-002".to_string(),
            Self::MsgMessageRefIdInvalidChars => "MSG-003".to_string(),
            Self::MsgMessageRefIdAuthorityMismatch => "MSG-004".to_string(),
            Self::MsgMessageRefIdYearMismatch => "MSG-005".to_string(),
            Self::MsgCorrMessageRefIdRequired => "MSG-006".to_string(),
            Self::MsgCorrMessageRefIdUnexpected => "MSG-007".to_string(),
            Self::MsgReportingPeriodInvalid => "MSG-008".to_string(),
            Self::MsgTimestampInvalid => "MSG-009".to_string(),
            Self::MsgSendingReceivingSameCbc401 => "MSG-010".to_string(),
            Self::MsgInvalidSendingCountryCode => "MSG-011".to_string(),
            Self::MsgInvalidReceivingCountryCode => "MSG-012".to_string(),

            Self::DocRefIdMissing => "DOC-001".to_string(),
            Self::DocRefIdDuplicateInFile => "DOC-002".to_string(),
            Self::DocRefIdTooLong => "DOC-003".to_string(),
            Self::DocTypeMessageTypeMismatch => "DOC-004".to_string(),
            Self::DocCorrDocRefIdRequired => "DOC-005".to_string(),
            Self::DocCorrMessageRefIdRequired => "DOC-006".to_string(),
            Self::DocCorrDocRefIdEqualsDocRefId => "DOC-007".to_string(),
            Self::DocCorrFieldsPresentOnNewData => "DOC-008".to_string(),
            Self::DocProductionTestFamilyMixed => "DOC-009".to_string(),
            Self::DocOecdTypeMixed23 => "DOC-010".to_string(),
            Self::DocRefIdCountryPrefixMissing => "DOC-011".to_string(),
            Self::DocRefIdInvalidChars => "DOC-012".to_string(),
            Self::DocGlobalDuplicateCritical => "DOC-013".to_string(),
            Self::DocGlobalDuplicateCorrectionChain => "DOC-014".to_string(),

            Self::TinReportingEntityMissing => "TIN-001".to_string(),
            Self::TinEmpty => "TIN-002".to_string(),
            Self::TinWhitespace => "TIN-003".to_string(),
            Self::TinLengthInvalid => "TIN-004".to_string(),
            Self::TinRepeatedCharPattern => "TIN-005".to_string(),
            Self::TinPlaceholderBlacklisted => "TIN-006".to_string(),
            Self::TinNotinInfo => "TIN-007".to_string(),
            Self::TinIssuedByMissing => "TIN-008".to_string(),
            Self::TinIssuedByInvalidCountry => "TIN-009".to_string(),
            Self::TinPatternMismatch => "TIN-010".to_string(),

            Self::SumRevenueDecompositionMissing => "SUM-001".to_string(),
            Self::SumRevenueSumMismatch => "SUM-002".to_string(),
            Self::SumEmployeesInvalid => "SUM-003".to_string(),
            Self::SumMonetaryNotFinite => "SUM-004".to_string(),
            Self::SumMonetaryOutOfRange => "SUM-005".to_string(),
            Self::SumMonetaryMustBeNonNegative => "SUM-006".to_string(),
            Self::SumNegativeCapitalInfo => "SUM-007".to_string(),
            Self::SumExcessDecimalPlaces => "SUM-008".to_string(),
            Self::SumCurrencyInconsistent => "SUM-009".to_string(),
            Self::SumHighTaxRatio => "SUM-010".to_string(),
            Self::SumZeroTaxWithProfit => "SUM-011".to_string(),
            Self::SumLowSimplifiedEtr => "SUM-012".to_string(),
            Self::SumTaxDiscrepancy => "SUM-013".to_string(),
            Self::SumRevenueZeroEmployeesPositive => "SUM-014".to_string(),
            Self::SumRevenueHighZeroEmployees => "SUM-015".to_string(),
            Self::SumAllZeroSummary => "SUM-016".to_string(),
            Self::SumGlobalRevenueBelowThreshold => "SUM-017".to_string(),
            Self::SumSingleJurisdictionProfitConcentration => "SUM-018".to_string(),

            Self::BizInvalidActivityCode => "BIZ-001".to_string(),
            Self::BizNoActivitiesListed => "BIZ-002".to_string(),
            Self::BizDuplicateActivityCode => "BIZ-003".to_string(),
            Self::BizOtherActivityMissingInfo => "BIZ-004".to_string(),
            Self::BizDormantWithActivity => "BIZ-005".to_string(),
            Self::BizDormantWithOtherCode => "BIZ-006".to_string(),
            Self::BizHoldingOnlyLargeScale => "BIZ-007".to_string(),

            Self::XfvHoldingWithHighTangibleAssets => "XFV-001".to_string(),
            Self::XfvManufacturingLowAssets => "XFV-002".to_string(),
            Self::XfvAssetIntensiveZeroAssets => "XFV-003".to_string(),
            Self::XfvManufacturingAbnormalAssetRatio => "XFV-004".to_string(),
            Self::XfvDividendExclusionReminder => "XFV-005".to_string(),

            Self::EncMultipleCurrenciesAcrossFields => "ENC-001".to_string(),
            Self::EncMixedCurrencyPresence => "ENC-002".to_string(),
            Self::EncAcctPeriodInverted => "ENC-003".to_string(),
            Self::EncFiscalYearLengthAnomaly => "ENC-004".to_string(),
            Self::EncRefIdPrefixMismatch => "ENC-005".to_string(),

            Self::CcSummaryFieldMissing => "CC-001".to_string(),
            Self::CcRevenueDecompositionPartial => "CC-002".to_string(),
            Self::CcEntityNameMissing => "CC-003".to_string(),
            Self::CcReportingEntityNotInEntityList => "CC-004".to_string(),
            Self::CcReportingEntityOutsideHomeJurisdiction => "CC-005".to_string(),
            Self::CcAdditionalInfoTooShort => "CC-006".to_string(),

            Self::Ce001MissingTin => "CE-001".to_string(),
            Self::Ce002MisuseOfNotin => "CE-002".to_string(),
            Self::Ce003DuplicateTinAcrossEntities => "CE-003".to_string(),
            Self::Ce004Table1Table2JurisdictionMismatch => "CE-004".to_string(),
            Self::Ce005ReportingEntityAbsentFromEntityList => "CE-005".to_string(),
            Self::Ce006DecimalsInMonetaryFields => "CE-006".to_string(),
            Self::Ce007SuspiciouslySmallAmounts => "CE-007".to_string(),
            Self::Ce008RevenueSumOffByRounding => "CE-008".to_string(),
            Self::Ce009NegativeRevenues => "CE-009".to_string(),
            Self::Ce010CurrencyInconsistency => "CE-010".to_string(),
            Self::Ce011RecentReportingDateFilingConfusion => "CE-011".to_string(),
            Self::Ce012LongAccountingPeriod => "CE-012".to_string(),
            Self::Ce013Cbc513WithoutExplanation => "CE-013".to_string(),
            Self::Ce014EmptyAdditionalInfo => "CE-014".to_string(),
            Self::Ce019TinCountryPatternCrossCheck => "CE-019".to_string(),
            Self::Ce020LeapDayPeriodLengthNote => "CE-020".to_string(),

            Self::P2NotApplicableFiscalYear => "P2-001".to_string(),
            Self::P2SafeHarbourPass => "P2-SH-PASS".to_string(),
            Self::P2JurTopUpHigh => "P2-JUR-010".to_string(),
            Self::P2JurTopUpMedium => "P2-JUR-011".to_string(),
            Self::P2JurTopUpLow => "P2-JUR-012".to_string(),
            Self::P2JurisdictionMechanism => "P2-JUR-001".to_string(),

            Self::LuTinFormatInvalid => "LU-001".to_string(),
            Self::LuTinPlaceholder => "LU-002".to_string(),
            Self::LuTinVatConfusion => "LU-003".to_string(),
            Self::LuFilingPastDeadline => "LU-004".to_string(),
            Self::LuFilingUrgent => "LU-005".to_string(),
            Self::LuFilingApproaching => "LU-006".to_string(),
            Self::LuNonEurCurrency => "LU-007".to_string(),
            Self::LuTinIssuedByMismatch => "LU-008".to_string(),
            Self::LuLanguageNotAccepted => "LU-009".to_string(),
            Self::LuBelowThreshold => "LU-010".to_string(),
            Self::LuMissingLuReport => "LU-011".to_string(),

            Self::AppContextConstructionWarning => "APP-002".to_string(),
            Self::AppExternalStoreFailure => "APP-004".to_string(),
            Self::AppValidatorPanic => "APP-005".to_string(),
            Self::AppCancellationPartialReport => "APP-006".to_string(),
            Self::AppReportingPeriodInFuture => "APP-007".to_string(),

            Self::Extension(code) => code.clone(),
            Self::Internal => "INTERNAL".to_string(),
        }
    }

    /// The rule-id's prefix family (`"MSG"`, `"DOC"`, ... `"APP"`), used by
    /// [`builder::FindingBuilder`] to pick a default suggestion template.
    /// Returns `"EXT"` for [`Self::Extension`] and `"INTERNAL"` for
    /// [`Self::Internal`].
    pub fn family(&self) -> &'static str {
        match self {
            Self::MsgMessageRefIdMissing
            | Self::MsgMessageRefIdTooLong
            | Self::MsgMessageRefIdInvalidChars
            | Self::MsgMessageRefIdAuthorityMismatch
            | Self::MsgMessageRefIdYearMismatch
            | Self::MsgCorrMessageRefIdRequired
            | Self::MsgCorrMessageRefIdUnexpected
            | Self::MsgReportingPeriodInvalid
            | Self::MsgTimestampInvalid
            | Self::MsgSendingReceivingSameCbc401
            | Self::MsgInvalidSendingCountryCode
            | Self::MsgInvalidReceivingCountryCode => "MSG",

            Self::DocRefIdMissing
            | Self::DocRefIdDuplicateInFile
            | Self::DocRefIdTooLong
            | Self::DocRefIdInvalidChars
            | Self::DocTypeMessageTypeMismatch
            | Self::DocCorrDocRefIdRequired
            | Self::DocCorrMessageRefIdRequired
            | Self::DocCorrDocRefIdEqualsDocRefId
            | Self::DocCorrFieldsPresentOnNewData
            | Self::DocProductionTestFamilyMixed
            | Self::DocOecdTypeMixed23
            | Self::DocRefIdCountryPrefixMissing
            | Self::DocGlobalDuplicateCritical
            | Self::DocGlobalDuplicateCorrectionChain => "DOC",

            Self::TinReportingEntityMissing
            | Self::TinEmpty
            | Self::TinWhitespace
            | Self::TinLengthInvalid
            | Self::TinRepeatedCharPattern
            | Self::TinPlaceholderBlacklisted
            | Self::TinNotinInfo
            | Self::TinIssuedByMissing
            | Self::TinIssuedByInvalidCountry
            | Self::TinPatternMismatch => "TIN",

            Self::SumRevenueDecompositionMissing
            | Self::SumRevenueSumMismatch
            | Self::SumEmployeesInvalid
            | Self::SumMonetaryNotFinite
            | Self::SumMonetaryOutOfRange
            | Self::SumMonetaryMustBeNonNegative
            | Self::SumNegativeCapitalInfo
            | Self::SumExcessDecimalPlaces
            | Self::SumCurrencyInconsistent
            | Self::SumHighTaxRatio
            | Self::SumZeroTaxWithProfit
            | Self::SumLowSimplifiedEtr
            | Self::SumTaxDiscrepancy
            | Self::SumRevenueZeroEmployeesPositive
            | Self::SumRevenueHighZeroEmployees
            | Self::SumAllZeroSummary
            | Self::SumGlobalRevenueBelowThreshold
            | Self::SumSingleJurisdictionProfitConcentration => "SUM",

            Self::BizInvalidActivityCode
            | Self::BizNoActivitiesListed
            | Self::BizDuplicateActivityCode
            | Self::BizOtherActivityMissingInfo
            | Self::BizDormantWithActivity
            | Self::BizDormantWithOtherCode
            | Self::BizHoldingOnlyLargeScale => "BIZ",

            Self::XfvHoldingWithHighTangibleAssets
            | Self::XfvManufacturingLowAssets
            | Self::XfvAssetIntensiveZeroAssets
            | Self::XfvManufacturingAbnormalAssetRatio
            | Self::XfvDividendExclusionReminder => "XFV",

            Self::EncMultipleCurrenciesAcrossFields
            | Self::EncMixedCurrencyPresence
            | Self::EncAcctPeriodInverted
            | Self::EncFiscalYearLengthAnomaly
            | Self::EncRefIdPrefixMismatch => "ENC",

            Self::CcSummaryFieldMissing
            | Self::CcRevenueDecompositionPartial
            | Self::CcEntityNameMissing
            | Self::CcReportingEntityNotInEntityList
            | Self::CcReportingEntityOutsideHomeJurisdiction
            | Self::CcAdditionalInfoTooShort => "CC",

            Self::Ce001MissingTin
            | Self::Ce002MisuseOfNotin
            | Self::Ce003DuplicateTinAcrossEntities
            | Self::Ce004Table1Table2JurisdictionMismatch
            | Self::Ce005ReportingEntityAbsentFromEntityList
            | Self::Ce006DecimalsInMonetaryFields
            | Self::Ce007SuspiciouslySmallAmounts
            | Self::Ce008RevenueSumOffByRounding
            | Self::Ce009NegativeRevenues
            | Self::Ce010CurrencyInconsistency
            | Self::Ce011RecentReportingDateFilingConfusion
            | Self::Ce012LongAccountingPeriod
            | Self::Ce013Cbc513WithoutExplanation
            | Self::Ce014EmptyAdditionalInfo
            | Self::Ce019TinCountryPatternCrossCheck
            | Self::Ce020LeapDayPeriodLengthNote => "CE",

            Self::P2NotApplicableFiscalYear
            | Self::P2SafeHarbourPass
            | Self::P2JurTopUpHigh
            | Self::P2JurTopUpMedium
            | Self::P2JurTopUpLow
            | Self::P2JurisdictionMechanism => "P2",

            Self::LuTinFormatInvalid
            | Self::LuTinPlaceholder
            | Self::LuTinVatConfusion
            | Self::LuFilingPastDeadline
            | Self::LuFilingUrgent
            | Self::LuFilingApproaching
            | Self::LuNonEurCurrency
            | Self::LuTinIssuedByMismatch
            | Self::LuLanguageNotAccepted
            | Self::LuBelowThreshold
            | Self::LuMissingLuReport => "LU",

            Self::AppContextConstructionWarning
            | Self::AppExternalStoreFailure
            | Self::AppValidatorPanic
            | Self::AppCancellationPartialReport
            | Self::AppReportingPeriodInFuture => "APP",

            Self::Extension(_) => "EXT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// An expected-vs-actual value pair, serialized as plain strings so the
/// finding stays JSON-friendly regardless of the underlying types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedActual {
    pub expected: String,
    pub actual: String,
}

/// One diagnostic produced by a validator.
///
/// Constructed exclusively via [`builder::FindingBuilder`]; never built
/// from a struct literal outside this crate so that enrichment defaults are
/// always applied consistently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: RuleId,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oecd_error_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_actual: Option<ExpectedActual>,
}

impl Finding {
    /// The dedup/sort key the engine uses: `(ruleId code, xpath, message)`.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.rule_id.code(),
            self.xpath.clone().unwrap_or_default(),
            self.message.clone(),
        )
    }
}

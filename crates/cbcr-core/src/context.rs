//! [`AnalysisContext`]: the derived, mutable aggregator the engine builds
//! once per validation pass and hands to every validator.
//!
//! Mutating methods take `&self` and serialize through an internal
//! [`Mutex`], so the same type is safe to share across threads in the
//! engine's bounded-parallel dispatch mode without a separate
//! sequential/parallel code path.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::external::{DocRefIdStore, NullDocRefIdStore};
use crate::finding::{Category, Finding, Severity};
use crate::model::ParsedReport;
use crate::newtypes::CountryCode;

/// Runtime configuration for a single validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOptions {
    pub primary_country: String,
    pub fiscal_year: String,
    pub check_pillar2: bool,
    pub check_global_doc_ref_ids: bool,
    pub strict_mode: bool,
    pub fail_fast: bool,
    /// 0 means unlimited.
    pub max_issues: usize,
    pub track_timing: bool,
    /// Empty means all jurisdictions.
    pub jurisdictions: Vec<String>,
    pub min_severity: Severity,
    /// Empty means all categories.
    pub categories: Vec<Category>,
    pub skip_rules: HashSet<String>,
    pub include_passed_rules: bool,
    pub test_mode: bool,
    /// Upper bound on concurrently running validators in bounded-parallel
    /// mode; defaults to 1 (sequential).
    pub max_parallel: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            primary_country: "LU".to_string(),
            fiscal_year: crate::dates::today().year.to_string(),
            check_pillar2: true,
            check_global_doc_ref_ids: true,
            strict_mode: false,
            fail_fast: false,
            max_issues: 0,
            track_timing: false,
            jurisdictions: Vec::new(),
            min_severity: Severity::Info,
            categories: Vec::new(),
            skip_rules: HashSet::new(),
            include_passed_rules: false,
            test_mode: false,
            max_parallel: 1,
        }
    }
}

/// Monetary/employee aggregates for one jurisdiction, or summed globally.
#[derive(Debug, Clone, Default)]
pub struct JurisdictionTotals {
    pub total_revenues: f64,
    pub unrelated_revenues: f64,
    pub related_revenues: f64,
    pub profit_or_loss: f64,
    pub tax_paid: f64,
    pub tax_accrued: f64,
    pub capital: f64,
    pub accumulated_earnings: f64,
    pub tangible_assets: f64,
    pub number_of_employees: f64,
}

impl JurisdictionTotals {
    fn add(&mut self, other: &JurisdictionTotals) {
        self.total_revenues += other.total_revenues;
        self.unrelated_revenues += other.unrelated_revenues;
        self.related_revenues += other.related_revenues;
        self.profit_or_loss += other.profit_or_loss;
        self.tax_paid += other.tax_paid;
        self.tax_accrued += other.tax_accrued;
        self.capital += other.capital;
        self.accumulated_earnings += other.accumulated_earnings;
        self.tangible_assets += other.tangible_assets;
        self.number_of_employees += other.number_of_employees;
    }
}

/// A `CbcReport`'s precomputed per-jurisdiction aggregate, indexed to its
/// position in `CbcBody.cbcReports` for canonical xpath construction.
#[derive(Debug, Clone)]
pub struct JurisdictionRef {
    pub report_index: usize,
    pub country_code: CountryCode,
    pub doc_ref_id: String,
    pub totals: JurisdictionTotals,
    /// `Some` only if every monetary field in the summary shared one
    /// currency code; `None` signals heterogeneity, left for
    /// `rules::data_quality::consistency` to report.
    pub currency: Option<String>,
}

/// A `ConstituentEntity`'s precomputed cross-reference, indexed to its
/// owning report and its position within that report's entity list.
#[derive(Debug, Clone)]
pub struct EntityRef {
    pub report_index: usize,
    pub entity_index: usize,
    pub owning_doc_ref_id: String,
    pub jurisdiction: CountryCode,
    pub name_normalized: String,
    pub tins_uppercased: Vec<String>,
}

/// Document-level facts the engine needs before any validator runs, but
/// that are not literally OECD schema fields.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub upe_name: String,
    pub jurisdiction_count: usize,
    pub entity_count: usize,
}

/// The derived, mutable aggregator shared across every validator.
pub struct AnalysisContext {
    report: ParsedReport,
    options: ValidationOptions,
    metadata: ReportMetadata,
    jurisdictions: Vec<JurisdictionRef>,
    entities: Vec<EntityRef>,
    seen_doc_ref_ids: Mutex<HashMap<String, String>>,
    seen_message_ref_ids: Mutex<HashSet<String>>,
    findings: Mutex<Vec<Finding>>,
    should_stop: AtomicBool,
    doc_ref_id_store: Arc<dyn DocRefIdStore>,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl AnalysisContext {
    /// Walks `CbcBody.cbcReports` in order, populating the jurisdiction and
    /// entity tables. Normalization: entity names are lowercased/trimmed,
    /// TINs are upper-cased, for comparison purposes only (the original
    /// `ParsedReport` values are untouched).
    pub fn new(report: ParsedReport, options: ValidationOptions) -> Self {
        Self::with_doc_ref_id_store(report, options, Arc::new(NullDocRefIdStore))
    }

    /// Like [`Self::new`], but wires up the external `DocRefIdStore` the
    /// global-uniqueness check in `rules::doc_spec` consults.
    pub fn with_doc_ref_id_store(
        report: ParsedReport,
        options: ValidationOptions,
        doc_ref_id_store: Arc<dyn DocRefIdStore>,
    ) -> Self {
        let mut jurisdictions = Vec::new();
        let mut entities = Vec::new();

        for (report_index, cbc_report) in report.cbc_body().cbc_reports.iter().enumerate() {
            let fields = cbc_report.summary.monetary_fields();
            let mut currency = None;
            let mut currencies_seen: HashSet<&str> = HashSet::new();
            for (_, amount) in &fields {
                currencies_seen.insert(amount.currency.as_str());
            }
            if currencies_seen.len() == 1 {
                currency = currencies_seen.into_iter().next().map(str::to_string);
            }

            let totals = JurisdictionTotals {
                total_revenues: cbc_report.summary.total_revenues.value,
                unrelated_revenues: cbc_report
                    .summary
                    .unrelated_revenues
                    .as_ref()
                    .map(|m| m.value)
                    .unwrap_or(0.0),
                related_revenues: cbc_report
                    .summary
                    .related_revenues
                    .as_ref()
                    .map(|m| m.value)
                    .unwrap_or(0.0),
                profit_or_loss: cbc_report.summary.profit_or_loss.value,
                tax_paid: cbc_report.summary.tax_paid.value,
                tax_accrued: cbc_report.summary.tax_accrued.value,
                capital: cbc_report.summary.capital.value,
                accumulated_earnings: cbc_report.summary.accumulated_earnings.value,
                tangible_assets: cbc_report.summary.tangible_assets.value,
                number_of_employees: cbc_report.summary.number_of_employees,
            };

            jurisdictions.push(JurisdictionRef {
                report_index,
                country_code: cbc_report.res_country_code.clone(),
                doc_ref_id: cbc_report.doc_spec.doc_ref_id.clone(),
                totals,
                currency,
            });

            for (entity_index, entity) in cbc_report.const_entities.entities.iter().enumerate() {
                entities.push(EntityRef {
                    report_index,
                    entity_index,
                    owning_doc_ref_id: cbc_report.doc_spec.doc_ref_id.clone(),
                    jurisdiction: cbc_report.res_country_code.clone(),
                    name_normalized: normalize_name(entity.primary_name()),
                    tins_uppercased: entity
                        .tins
                        .iter()
                        .map(|t| t.value.to_uppercase())
                        .collect(),
                });
            }
        }

        let metadata = ReportMetadata {
            upe_name: report.cbc_body().reporting_entity.primary_name().to_string(),
            jurisdiction_count: jurisdictions.len(),
            entity_count: entities.len(),
        };

        Self {
            report,
            options,
            metadata,
            jurisdictions,
            entities,
            seen_doc_ref_ids: Mutex::new(HashMap::new()),
            seen_message_ref_ids: Mutex::new(HashSet::new()),
            findings: Mutex::new(Vec::new()),
            should_stop: AtomicBool::new(false),
            doc_ref_id_store,
        }
    }

    pub fn report(&self) -> &ParsedReport {
        &self.report
    }

    pub fn doc_ref_id_store(&self) -> &dyn DocRefIdStore {
        self.doc_ref_id_store.as_ref()
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    pub fn metadata(&self) -> &ReportMetadata {
        &self.metadata
    }

    pub fn jurisdictions(&self) -> &[JurisdictionRef] {
        &self.jurisdictions
    }

    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    pub fn jurisdiction_by_code(&self, code: &str) -> Option<&JurisdictionRef> {
        self.jurisdictions.iter().find(|j| &*j.country_code == code)
    }

    pub fn entity_by_tin(&self, tin: &str) -> Option<&EntityRef> {
        let needle = tin.to_uppercase();
        self.entities
            .iter()
            .find(|e| e.tins_uppercased.iter().any(|t| t == &needle))
    }

    pub fn entities_by_name_substring(&self, needle: &str) -> Vec<&EntityRef> {
        let needle = normalize_name(needle);
        self.entities
            .iter()
            .filter(|e| e.name_normalized.contains(&needle))
            .collect()
    }

    /// Sums [`JurisdictionTotals`] across every jurisdiction.
    pub fn global_totals(&self) -> JurisdictionTotals {
        let mut totals = JurisdictionTotals::default();
        for j in &self.jurisdictions {
            totals.add(&j.totals);
        }
        totals
    }

    pub fn is_correction(&self) -> bool {
        self.report.is_correction()
    }

    pub fn is_test_submission(&self) -> bool {
        self.report.is_test_submission()
    }

    /// Returns `false` if `id` was already registered; records `xpath` only
    /// on first sight.
    pub fn register_doc_ref_id(&self, id: &str, xpath: &str) -> bool {
        let mut seen = self.seen_doc_ref_ids.lock().unwrap_or_else(|e| e.into_inner());
        if seen.contains_key(id) {
            false
        } else {
            seen.insert(id.to_string(), xpath.to_string());
            true
        }
    }

    /// The xpath of the first-seen occurrence of `id`, if registered.
    pub fn first_doc_ref_id_xpath(&self, id: &str) -> Option<String> {
        let seen = self.seen_doc_ref_ids.lock().unwrap_or_else(|e| e.into_inner());
        seen.get(id).cloned()
    }

    pub fn register_message_ref_id(&self, id: &str) -> bool {
        let mut seen = self
            .seen_message_ref_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        seen.insert(id.to_string())
    }

    pub fn has_message_ref_id(&self, id: &str) -> bool {
        let seen = self
            .seen_message_ref_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        seen.contains(id)
    }

    /// Applies the eight-step policy from spec.md §4.2 and appends the
    /// finding unless dropped.
    pub fn add_finding(&self, finding: Finding) {
        if self.should_stop.load(Ordering::SeqCst) {
            return;
        }
        if self.options.skip_rules.contains(&finding.rule_id.code()) {
            return;
        }

        let mut finding = finding;
        if self.options.strict_mode && finding.severity == Severity::Warning {
            finding.severity = Severity::Error;
        }

        if finding.severity < self.options.min_severity {
            return;
        }
        if !self.options.categories.is_empty() && !self.options.categories.contains(&finding.category) {
            return;
        }

        let is_critical = finding.severity == Severity::Critical;

        let mut findings = self.findings.lock().unwrap_or_else(|e| e.into_inner());
        findings.push(finding);
        let count = findings.len();
        drop(findings);

        if self.options.fail_fast && is_critical {
            self.should_stop.store(true, Ordering::SeqCst);
        }
        if self.options.max_issues > 0 && count >= self.options.max_issues {
            self.should_stop.store(true, Ordering::SeqCst);
        }
    }

    pub fn findings(&self) -> Vec<Finding> {
        self.findings.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn findings_by_severity(&self, severity: Severity) -> Vec<Finding> {
        self.findings()
            .into_iter()
            .filter(|f| f.severity == severity)
            .collect()
    }

    pub fn findings_by_category(&self, category: Category) -> Vec<Finding> {
        self.findings()
            .into_iter()
            .filter(|f| f.category == category)
            .collect()
    }

    pub fn has_critical(&self) -> bool {
        self.findings().iter().any(|f| f.severity == Severity::Critical)
    }

    pub fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    /// Allows the engine to trip cancellation externally (spec.md §5).
    pub fn request_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::builder::FindingBuilder;
    use crate::finding::RuleId;
    use crate::test_support::minimal_report;

    #[test]
    fn register_doc_ref_id_returns_false_on_repeat() {
        let ctx = AnalysisContext::new(minimal_report(), ValidationOptions::default());
        assert!(ctx.register_doc_ref_id("LU2024-1", "/a"));
        assert!(!ctx.register_doc_ref_id("LU2024-1", "/b"));
        assert_eq!(ctx.first_doc_ref_id_xpath("LU2024-1"), Some("/a".to_string()));
    }

    #[test]
    fn add_finding_promotes_warning_to_error_in_strict_mode() {
        let mut options = ValidationOptions::default();
        options.strict_mode = true;
        let ctx = AnalysisContext::new(minimal_report(), options);
        ctx.add_finding(
            FindingBuilder::new(RuleId::MsgMessageRefIdYearMismatch)
                .severity(Severity::Warning)
                .build(),
        );
        assert_eq!(ctx.findings()[0].severity, Severity::Error);
    }

    #[test]
    fn add_finding_respects_min_severity_filter() {
        let mut options = ValidationOptions::default();
        options.min_severity = Severity::Error;
        let ctx = AnalysisContext::new(minimal_report(), options);
        ctx.add_finding(FindingBuilder::new(RuleId::SumNegativeCapitalInfo).severity(Severity::Info).build());
        assert!(ctx.findings().is_empty());
    }

    #[test]
    fn fail_fast_latches_should_stop_on_critical() {
        let mut options = ValidationOptions::default();
        options.fail_fast = true;
        let ctx = AnalysisContext::new(minimal_report(), options);
        assert!(!ctx.should_stop());
        ctx.add_finding(
            FindingBuilder::new(RuleId::DocRefIdDuplicateInFile)
                .severity(Severity::Critical)
                .build(),
        );
        assert!(ctx.should_stop());
    }

    #[test]
    fn max_issues_latches_should_stop_once_reached() {
        let mut options = ValidationOptions::default();
        options.max_issues = 2;
        let ctx = AnalysisContext::new(minimal_report(), options);
        ctx.add_finding(FindingBuilder::new(RuleId::SumNegativeCapitalInfo).build());
        assert!(!ctx.should_stop());
        ctx.add_finding(FindingBuilder::new(RuleId::SumNegativeCapitalInfo).build());
        assert!(ctx.should_stop());
    }

    #[test]
    fn skip_rules_drops_matching_findings() {
        let mut options = ValidationOptions::default();
        options.skip_rules.insert("SUM-007".to_string());
        let ctx = AnalysisContext::new(minimal_report(), options);
        ctx.add_finding(FindingBuilder::new(RuleId::SumNegativeCapitalInfo).build());
        assert!(ctx.findings().is_empty());
    }
}

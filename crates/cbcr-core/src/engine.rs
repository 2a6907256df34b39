//! The validation engine: phase orchestration, dedup/ranking, and the final
//! [`ValidationReport`] (spec.md §4.4.9, §5).
//!
//! [`run`] is the crate's single entry point: it builds an
//! [`AnalysisContext`] from a [`ParsedReport`] + [`ValidationOptions`],
//! dispatches the registry in fixed phase order, and folds the accumulated
//! findings into a deterministic, ranked report.
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::context::{AnalysisContext, ValidationOptions};
use crate::external::DocRefIdStore;
use crate::finding::{Category, Finding, Severity};
use crate::model::ParsedReport;
use crate::rules::build_registry;
use crate::validator::{self, Validator};

/// The six fixed phases from spec.md §4.4.9, in dispatch order.
///
/// `Parsing` carries no validators of its own — XML well-formedness is
/// delegated to the external deserializer (spec.md §1) — but is kept as a
/// phase so progress percentages match the spec's phase count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Parsing,
    Schema,
    BusinessRules,
    CountryRules,
    DataQuality,
    Pillar2,
}

const PHASES: [Phase; 6] = [
    Phase::Parsing,
    Phase::Schema,
    Phase::BusinessRules,
    Phase::CountryRules,
    Phase::DataQuality,
    Phase::Pillar2,
];

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Schema => "schema",
            Self::BusinessRules => "business_rules",
            Self::CountryRules => "country_rules",
            Self::DataQuality => "data_quality",
            Self::Pillar2 => "pillar2",
        }
    }

    /// The validator-metadata [`Category`] dispatched in this phase, or
    /// `None` for the parsing phase (no validator belongs to it).
    fn category(self) -> Option<Category> {
        match self {
            Self::Parsing => None,
            Self::Schema => Some(Category::SchemaConformity),
            Self::BusinessRules => Some(Category::Business),
            Self::CountryRules => Some(Category::Country),
            Self::DataQuality => Some(Category::DataQuality),
            Self::Pillar2 => Some(Category::Pillar2),
        }
    }
}

/// A progress update fired at the start of each phase and once more on
/// completion (spec.md §4.4.9).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub phase_name: &'static str,
    pub phase_index: usize,
    pub total_phases: usize,
    pub percent_complete: f64,
}

/// Final disposition of a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Cancelled,
    Failed,
}

/// Counts by severity, computed once after dedup/sort (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    /// Rules that ran and produced no finding, if `include_passed_rules`
    /// was requested; `0` otherwise.
    pub passed: usize,
    pub total: usize,
}

/// The engine's output: spec.md §6's `ValidationReport`, minus the
/// upload-plumbing fields (`filename`, `fileSize`, `uploadedAt`) that belong
/// to the out-of-scope web/CLI front end — `cbcr-cli` enriches this with
/// those when it prints a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReport {
    pub status: Status,
    pub is_valid: bool,
    pub fiscal_year: String,
    pub upe_jurisdiction: Option<String>,
    pub upe_name: String,
    pub message_ref_id: String,
    pub jurisdiction_count: usize,
    pub entity_count: usize,
    pub duration_ms: u64,
    pub summary: SeveritySummary,
    pub by_category: BTreeMap<Category, usize>,
    pub results: Vec<Finding>,
}

/// An opaque handle the caller can trip to cancel an in-flight validation
/// pass (spec.md §5). Polled between validators and between phases.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs the full validation pipeline (spec.md §4.4.9) with no cancellation
/// token, external `DocRefIdStore`, or progress callback.
pub fn run(report: ParsedReport, options: ValidationOptions) -> EngineReport {
    run_with(report, options, Arc::new(crate::external::NullDocRefIdStore), None, |_| {})
}

/// Runs the full validation pipeline, wiring up an external
/// [`DocRefIdStore`] and an optional [`CancellationToken`], and firing
/// `on_progress` at phase boundaries.
pub fn run_with(
    report: ParsedReport,
    options: ValidationOptions,
    doc_ref_id_store: Arc<dyn DocRefIdStore>,
    cancellation: Option<CancellationToken>,
    mut on_progress: impl FnMut(Progress),
) -> EngineReport {
    let start = Instant::now();
    let registry = build_registry();
    let ctx = AnalysisContext::with_doc_ref_id_store(report, options, doc_ref_id_store);

    let total_phases = PHASES.len();
    let mut cancelled = false;

    for (phase_index, phase) in PHASES.iter().copied().enumerate() {
        on_progress(Progress {
            phase_name: phase.name(),
            phase_index,
            total_phases,
            percent_complete: (phase_index as f64 / total_phases as f64) * 100.0,
        });

        if cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
            cancelled = true;
            break;
        }

        let Some(category) = phase.category() else {
            continue;
        };
        if category == Category::Pillar2 && !ctx.options().check_pillar2 {
            continue;
        }

        let phase_validators: Vec<&dyn Validator> = registry
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| v.metadata().category == category)
            .collect();

        dispatch_phase(&phase_validators, &ctx, ctx.options().max_parallel.max(1));

        if ctx.should_stop() {
            break;
        }
        if cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
            cancelled = true;
            break;
        }
    }

    on_progress(Progress {
        phase_name: "done",
        phase_index: total_phases,
        total_phases,
        percent_complete: 100.0,
    });

    finalize(ctx, start, cancelled)
}

/// Runs every validator in `validators` against `ctx`, appending each
/// produced finding through [`AnalysisContext::add_finding`] so the
/// fail-fast/max-issues/severity/category policy applies uniformly.
///
/// Sequential when `max_parallel <= 1` (the default); otherwise spawns up
/// to `max_parallel` threads via [`std::thread::scope`] over this phase's
/// validators. `AnalysisContext`'s mutating methods are mutex-serialized
/// (spec.md §5), so this is the only code path needed for both modes.
fn dispatch_phase(validators: &[&dyn Validator], ctx: &AnalysisContext, max_parallel: usize) {
    if max_parallel <= 1 || validators.len() <= 1 {
        for validator in validators {
            if ctx.should_stop() {
                break;
            }
            run_one(*validator, ctx);
        }
        return;
    }

    std::thread::scope(|scope| {
        let mut chunks: Vec<Vec<&dyn Validator>> = vec![Vec::new(); max_parallel.min(validators.len())];
        for (i, validator) in validators.iter().enumerate() {
            chunks[i % chunks.len()].push(*validator);
        }
        for chunk in chunks {
            scope.spawn(move || {
                for validator in chunk {
                    if ctx.should_stop() {
                        break;
                    }
                    run_one(validator, ctx);
                }
            });
        }
    });
}

fn run_one(validator: &dyn Validator, ctx: &AnalysisContext) {
    let meta = validator.metadata();
    tracing::debug!(validator = meta.id, "running validator");
    let record = validator::execute(validator, ctx);
    for finding in record.findings {
        ctx.add_finding(finding);
    }
}

fn finalize(ctx: AnalysisContext, start: Instant, cancelled: bool) -> EngineReport {
    let options_strict_summary = ctx.options().clone();
    let mut findings = ctx.findings();

    // Deduplicate by (ruleId, xpath, message), then stable-sort by severity
    // descending with (ruleId, xpath, message) as the tiebreak, per spec.md
    // §5/§9's determinism requirement.
    let mut seen = std::collections::HashSet::new();
    findings.retain(|f| seen.insert(f.dedup_key()));
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.rule_id.code().cmp(&b.rule_id.code()))
            .then_with(|| a.xpath.cmp(&b.xpath))
            .then_with(|| a.message.cmp(&b.message))
    });

    let mut summary = SeveritySummary {
        total: findings.len(),
        ..SeveritySummary::default()
    };
    let mut by_category: BTreeMap<Category, usize> = BTreeMap::new();
    for f in &findings {
        match f.severity {
            Severity::Critical => summary.critical += 1,
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.info += 1,
        }
        *by_category.entry(f.category).or_default() += 1;
    }

    let is_valid = summary.critical == 0;
    let status = if cancelled {
        Status::Cancelled
    } else {
        Status::Completed
    };

    let report = ctx.report();
    let upe_jurisdiction = ctx
        .jurisdictions()
        .iter()
        .find(|j| j.country_code.as_str() == ctx.options().primary_country)
        .map(|j| j.country_code.as_str().to_string());

    EngineReport {
        status,
        is_valid,
        fiscal_year: options_strict_summary.fiscal_year.clone(),
        upe_jurisdiction,
        upe_name: ctx.metadata().upe_name.clone(),
        message_ref_id: report.message_spec().message_ref_id.clone(),
        jurisdiction_count: ctx.metadata().jurisdiction_count,
        entity_count: ctx.metadata().entity_count,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        summary,
        by_category,
        results: findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{happy_path_report, revenue_sum_mismatch_report};

    #[test]
    fn happy_path_report_is_valid_with_no_critical_or_error() {
        let report = run(happy_path_report(), ValidationOptions::default());
        assert!(report.is_valid, "{:#?}", report.results);
        assert_eq!(report.summary.critical, 0);
        assert_eq!(report.summary.errors, 0);
        assert_eq!(report.status, Status::Completed);
    }

    #[test]
    fn revenue_mismatch_is_an_error_not_a_critical() {
        let report = run(revenue_sum_mismatch_report(), ValidationOptions::default());
        assert!(report.is_valid);
        assert!(report.summary.errors >= 1);
        assert!(
            report
                .results
                .iter()
                .any(|f| f.rule_id.code() == "SUM-002")
        );
    }

    #[test]
    fn findings_are_sorted_severity_descending() {
        let report = run(revenue_sum_mismatch_report(), ValidationOptions::default());
        for pair in report.results.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn dedup_removes_exact_rule_xpath_message_duplicates() {
        let a = Finding {
            rule_id: crate::finding::RuleId::SumNegativeCapitalInfo,
            category: Category::Business,
            severity: Severity::Info,
            message: "same".to_string(),
            xpath: Some("/x".to_string()),
            details: BTreeMap::new(),
            suggestion: None,
            reference: None,
            oecd_error_code: None,
            field_name: None,
            expected_actual: None,
        };
        let mut findings = vec![a.clone(), a.clone(), a];
        let mut seen = std::collections::HashSet::new();
        findings.retain(|f| seen.insert(f.dedup_key()));
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn sequential_and_bounded_parallel_modes_agree() {
        let mut parallel_options = ValidationOptions::default();
        parallel_options.max_parallel = 4;
        let sequential = run(happy_path_report(), ValidationOptions::default());
        let parallel = run(happy_path_report(), parallel_options);
        assert_eq!(sequential.results, parallel.results);
    }

    #[test]
    fn fail_fast_stops_with_at_most_one_critical() {
        let mut options = ValidationOptions::default();
        options.fail_fast = true;
        let report = run(crate::test_support::duplicate_doc_ref_id_report(), options);
        assert_eq!(report.summary.critical, 1);
    }
}

//! Implementation of `cbcr validate <file>`.
//!
//! Parses a CbCR report (given as the parsed JSON shape `cbcr_core::ParsedReport`
//! expects — XML-to-JSON conversion is out of scope, per `DESIGN.md`) and runs
//! the validation engine, emitting findings to stderr.
//!
//! Exit codes:
//! - 0 = valid (no Critical findings)
//! - 1 = validation errors (at least one Critical finding)
//! - 2 = parse failure (not valid JSON or missing required fields)
use std::collections::HashSet;
use std::time::Instant;

use cbcr_core::{Category, ParsedReport, Severity, ValidationOptions};

use crate::cli::{CategoryArg, SeverityArg};
use crate::error::CliError;
use crate::format::{FormatMode, FormatterConfig, write_finding, write_summary, write_timing_human};
use crate::OutputFormat;

/// Arguments accepted by the `validate` command, already unpacked from
/// [`crate::cli::Command::Validate`].
pub struct ValidateArgs<'a> {
    pub country: &'a str,
    pub fiscal_year: Option<&'a str>,
    pub no_pillar2: bool,
    pub no_global_doc_ref_ids: bool,
    pub strict: bool,
    pub fail_fast: bool,
    pub max_issues: usize,
    pub min_severity: SeverityArg,
    pub category: &'a [CategoryArg],
    pub skip_rule: &'a [String],
    pub jurisdiction: &'a [String],
    pub test_mode: bool,
    pub max_parallel: usize,
}

fn severity_from_arg(arg: SeverityArg) -> Severity {
    match arg {
        SeverityArg::Info => Severity::Info,
        SeverityArg::Warning => Severity::Warning,
        SeverityArg::Error => Severity::Error,
        SeverityArg::Critical => Severity::Critical,
    }
}

fn category_from_arg(arg: CategoryArg) -> Category {
    match arg {
        CategoryArg::SchemaConformity => Category::SchemaConformity,
        CategoryArg::Business => Category::Business,
        CategoryArg::Country => Category::Country,
        CategoryArg::DataQuality => Category::DataQuality,
        CategoryArg::Pillar2 => Category::Pillar2,
    }
}

fn build_options(args: &ValidateArgs<'_>) -> ValidationOptions {
    let mut options = ValidationOptions {
        primary_country: args.country.to_owned(),
        check_pillar2: !args.no_pillar2,
        check_global_doc_ref_ids: !args.no_global_doc_ref_ids,
        strict_mode: args.strict,
        fail_fast: args.fail_fast,
        max_issues: args.max_issues,
        min_severity: severity_from_arg(args.min_severity),
        categories: args.category.iter().copied().map(category_from_arg).collect(),
        skip_rules: args.skip_rule.iter().cloned().collect::<HashSet<_>>(),
        jurisdictions: args.jurisdiction.to_vec(),
        test_mode: args.test_mode,
        max_parallel: args.max_parallel.max(1),
        ..ValidationOptions::default()
    };
    if let Some(fiscal_year) = args.fiscal_year {
        options.fiscal_year = fiscal_year.to_owned();
    }
    options
}

/// Runs the `validate` command.
///
/// Parses `content` as a [`ParsedReport`], runs the validation engine with
/// options derived from `args`, and emits findings to stderr. The summary
/// line is written to stderr in human mode (or as a final NDJSON object in
/// JSON mode).
///
/// Returns `Ok(())` when the report is valid (no Critical findings). Returns
/// [`CliError::ValidationErrors`] (exit code 1) when the report is invalid, or
/// [`CliError::ParseFailed`] (exit code 2) when the content cannot be parsed.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] — content is not a valid `ParsedReport`.
/// - [`CliError::ValidationErrors`] — at least one Critical finding was found.
pub fn run(content: &str, args: &ValidateArgs<'_>, format: &OutputFormat, quiet: bool, verbose: bool, no_color: bool) -> Result<(), CliError> {
    let report: ParsedReport = serde_json::from_str(content).map_err(|e| CliError::ParseFailed {
        detail: format!("line {}, column {}: {e}", e.line(), e.column()),
    })?;

    let options = build_options(args);

    let mode = match format {
        OutputFormat::Human => FormatMode::Human,
        OutputFormat::Json => FormatMode::Json,
    };
    let fmt_config = FormatterConfig::from_flags(no_color, quiet, verbose);

    let start = Instant::now();
    let engine_report = cbcr_core::run(report, options);

    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();

    for finding in &engine_report.results {
        write_finding(&mut err_out, finding, mode, &fmt_config).map_err(|e| CliError::IoError {
            source: "stderr".to_owned(),
            detail: e.to_string(),
        })?;
    }

    write_summary(&mut err_out, &engine_report.summary, mode, &fmt_config).map_err(|e| CliError::IoError {
        source: "stderr".to_owned(),
        detail: e.to_string(),
    })?;

    write_timing_human(&mut err_out, "validated", start.elapsed(), &fmt_config).map_err(|e| CliError::IoError {
        source: "stderr".to_owned(),
        detail: e.to_string(),
    })?;

    if engine_report.is_valid {
        Ok(())
    } else {
        Err(CliError::ValidationErrors)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;

    fn default_args() -> ValidateArgs<'static> {
        ValidateArgs {
            country: "LU",
            fiscal_year: None,
            no_pillar2: false,
            no_global_doc_ref_ids: true,
            strict: false,
            fail_fast: false,
            max_issues: 0,
            min_severity: SeverityArg::Info,
            category: &[],
            skip_rule: &[],
            jurisdiction: &[],
            test_mode: false,
            max_parallel: 1,
        }
    }

    const NOT_JSON: &str = "this is not a report";

    #[test]
    fn build_options_maps_severity_and_category() {
        let args = ValidateArgs {
            min_severity: SeverityArg::Warning,
            category: &[CategoryArg::Business, CategoryArg::Country],
            ..default_args()
        };
        let options = build_options(&args);
        assert_eq!(options.min_severity, Severity::Warning);
        assert_eq!(options.categories, vec![Category::Business, Category::Country]);
    }

    #[test]
    fn build_options_inverts_no_pillar2_and_no_global_doc_ref_ids() {
        let args = ValidateArgs {
            no_pillar2: true,
            no_global_doc_ref_ids: true,
            ..default_args()
        };
        let options = build_options(&args);
        assert!(!options.check_pillar2);
        assert!(!options.check_global_doc_ref_ids);
    }

    #[test]
    fn build_options_honors_explicit_fiscal_year() {
        let args = ValidateArgs {
            fiscal_year: Some("2025"),
            ..default_args()
        };
        let options = build_options(&args);
        assert_eq!(options.fiscal_year, "2025");
    }

    #[test]
    fn run_invalid_json_returns_parse_failed() {
        let result = run(NOT_JSON, &default_args(), &OutputFormat::Human, true, false, true);
        match result {
            Err(CliError::ParseFailed { .. }) => {}
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn run_parse_failure_exit_code_is_2() {
        let result = run(NOT_JSON, &default_args(), &OutputFormat::Human, true, false, true);
        let err = result.expect_err("should fail");
        assert_eq!(err.exit_code(), 2);
    }

    fn happy_path_report_json() -> String {
        use cbcr_core::model::*;
        use cbcr_core::{CalendarDate, CountryCode};

        let cc = |s: &str| CountryCode::try_from(s).expect("valid country code");
        let date = |s: &str| CalendarDate::try_from(s).expect("valid date");
        let eur = |v: f64| MonetaryAmount::new(v, "EUR");

        let report = ParsedReport {
            message: Message {
                message_spec: MessageSpec {
                    message_ref_id: "LU2024-001".to_string(),
                    message_type: MessageType::Cbc401,
                    message_type_indic: MessageTypeIndic::Cbc701,
                    corr_message_ref_id: None,
                    reporting_period: date("2024-12-31"),
                    timestamp: Some("2025-03-01T10:00:00Z".to_string()),
                    sending_competent_authority: cc("LU"),
                    receiving_competent_authority: cc("LU"),
                    language: Some("EN".to_string()),
                },
                cbc_body: CbcBody {
                    reporting_entity: ReportingEntity {
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
                    },
                    cbc_reports: vec![CbcReport {
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
                    }],
                    additional_info: Vec::new(),
                },
            },
        };
        serde_json::to_string(&report).expect("serializable report")
    }

    #[test]
    fn run_happy_path_report_is_ok() {
        let content = happy_path_report_json();
        let result = run(&content, &default_args(), &OutputFormat::Human, true, false, true);
        assert!(result.is_ok(), "expected Ok for clean report: {result:?}");
    }

    #[test]
    fn run_json_format_happy_path_is_ok() {
        let content = happy_path_report_json();
        let result = run(&content, &default_args(), &OutputFormat::Json, true, false, true);
        assert!(result.is_ok());
    }
}

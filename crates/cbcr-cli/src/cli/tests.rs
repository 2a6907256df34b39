#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use clap::CommandFactory;

use super::*;

/// The root help output must contain the `validate` subcommand.
#[test]
fn test_root_help_lists_validate_subcommand() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    assert!(
        help.contains("validate"),
        "root help should mention the validate subcommand"
    );
}

/// The root help output must describe every global flag.
#[test]
fn test_root_help_lists_global_flags() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());

    let expected_flags = [
        "--format",
        "--quiet",
        "--verbose",
        "--max-file-size",
        "--no-color",
        "--help",
        "--version",
    ];
    for flag in &expected_flags {
        assert!(
            help.contains(flag),
            "root help should mention flag '{flag}'"
        );
    }
}

/// `cbcr validate --help` must mention the CbCR-specific flags and `FILE`.
#[test]
fn test_validate_help() {
    let mut cmd = Cli::command();
    let sub = cmd
        .find_subcommand_mut("validate")
        .expect("validate subcommand should exist");
    let help = format!("{}", sub.render_help());
    for flag in [
        "--country",
        "--fiscal-year",
        "--no-pillar2",
        "--no-global-doc-ref-ids",
        "--strict",
        "--fail-fast",
        "--max-issues",
        "--min-severity",
        "--category",
        "--skip-rule",
        "--jurisdiction",
        "--test-mode",
        "--max-parallel",
        "FILE",
    ] {
        assert!(help.contains(flag), "validate help should mention '{flag}'");
    }
}

// ── parsing: validate ───────────────────────────────────────────────────────

#[test]
fn test_validate_parses_file_path() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    match cli.command {
        Command::Validate { file, .. } => match file {
            PathOrStdin::Path(p) => assert_eq!(p.to_str(), Some("report.json")),
            PathOrStdin::Stdin => panic!("expected Path, got Stdin"),
        },
    }
}

#[test]
fn test_validate_parses_stdin_sentinel() {
    let cli = Cli::parse_from(["cbcr", "validate", "-"]);
    match cli.command {
        Command::Validate { file, .. } => match file {
            PathOrStdin::Stdin => {}
            PathOrStdin::Path(p) => panic!("expected Stdin, got Path({p:?})"),
        },
    }
}

#[test]
fn test_validate_default_country_is_lu() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    match cli.command {
        Command::Validate { country, .. } => assert_eq!(country, "LU"),
    }
}

#[test]
fn test_validate_country_flag_overrides_default() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json", "--country", "DE"]);
    match cli.command {
        Command::Validate { country, .. } => assert_eq!(country, "DE"),
    }
}

#[test]
fn test_validate_fiscal_year_defaults_to_none() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    match cli.command {
        Command::Validate { fiscal_year, .. } => assert!(fiscal_year.is_none()),
    }
}

#[test]
fn test_validate_fiscal_year_flag_is_parsed() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json", "--fiscal-year", "2024"]);
    match cli.command {
        Command::Validate { fiscal_year, .. } => {
            assert_eq!(fiscal_year.as_deref(), Some("2024"));
        }
    }
}

#[test]
fn test_validate_boolean_flags_default_false() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    match cli.command {
        Command::Validate {
            no_pillar2,
            no_global_doc_ref_ids,
            strict,
            fail_fast,
            test_mode,
            ..
        } => {
            assert!(!no_pillar2);
            assert!(!no_global_doc_ref_ids);
            assert!(!strict);
            assert!(!fail_fast);
            assert!(!test_mode);
        }
    }
}

#[test]
fn test_validate_boolean_flags_can_be_set() {
    let cli = Cli::parse_from([
        "cbcr",
        "validate",
        "report.json",
        "--strict",
        "--fail-fast",
        "--no-pillar2",
        "--no-global-doc-ref-ids",
        "--test-mode",
    ]);
    match cli.command {
        Command::Validate {
            no_pillar2,
            no_global_doc_ref_ids,
            strict,
            fail_fast,
            test_mode,
            ..
        } => {
            assert!(no_pillar2);
            assert!(no_global_doc_ref_ids);
            assert!(strict);
            assert!(fail_fast);
            assert!(test_mode);
        }
    }
}

#[test]
fn test_validate_max_issues_defaults_to_zero() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    match cli.command {
        Command::Validate { max_issues, .. } => assert_eq!(max_issues, 0),
    }
}

#[test]
fn test_validate_max_parallel_defaults_to_one() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    match cli.command {
        Command::Validate { max_parallel, .. } => assert_eq!(max_parallel, 1),
    }
}

#[test]
fn test_validate_min_severity_defaults_to_info() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    match cli.command {
        Command::Validate { min_severity, .. } => {
            assert!(matches!(min_severity, SeverityArg::Info));
        }
    }
}

#[test]
fn test_validate_min_severity_flag_is_parsed() {
    let cli = Cli::parse_from([
        "cbcr",
        "validate",
        "report.json",
        "--min-severity",
        "error",
    ]);
    match cli.command {
        Command::Validate { min_severity, .. } => {
            assert!(matches!(min_severity, SeverityArg::Error));
        }
    }
}

#[test]
fn test_validate_category_is_repeatable() {
    let cli = Cli::parse_from([
        "cbcr",
        "validate",
        "report.json",
        "--category",
        "business",
        "--category",
        "pillar2",
    ]);
    match cli.command {
        Command::Validate { category, .. } => assert_eq!(category.len(), 2),
    }
}

#[test]
fn test_validate_skip_rule_is_repeatable() {
    let cli = Cli::parse_from([
        "cbcr",
        "validate",
        "report.json",
        "--skip-rule",
        "DOC-005",
        "--skip-rule",
        "MSG-009",
    ]);
    match cli.command {
        Command::Validate { skip_rule, .. } => {
            assert_eq!(skip_rule, vec!["DOC-005".to_owned(), "MSG-009".to_owned()]);
        }
    }
}

#[test]
fn test_validate_jurisdiction_is_repeatable() {
    let cli = Cli::parse_from([
        "cbcr",
        "validate",
        "report.json",
        "--jurisdiction",
        "LU",
        "--jurisdiction",
        "DE",
    ]);
    match cli.command {
        Command::Validate { jurisdiction, .. } => {
            assert_eq!(jurisdiction, vec!["LU".to_owned(), "DE".to_owned()]);
        }
    }
}

// ── global flags ─────────────────────────────────────────────────────────

#[test]
fn test_quiet_and_verbose_conflict() {
    let result = Cli::try_parse_from(["cbcr", "--quiet", "--verbose", "validate", "report.json"]);
    assert!(result.is_err(), "quiet and verbose should conflict");
}

#[test]
fn test_max_file_size_default() {
    let cli = Cli::parse_from(["cbcr", "validate", "report.json"]);
    assert_eq!(cli.max_file_size, 268_435_456);
}

#[test]
fn test_max_file_size_flag_overrides_default() {
    let cli = Cli::parse_from(["cbcr", "--max-file-size", "1024", "validate", "report.json"]);
    assert_eq!(cli.max_file_size, 1024);
}

#[test]
fn test_format_flag_short_alias() {
    let cli = Cli::parse_from(["cbcr", "-f", "json", "validate", "report.json"]);
    assert!(matches!(cli.format, OutputFormat::Json));
}

//! Integration tests for `cbcr validate`, run against the compiled binary.
#![allow(clippy::expect_used)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Command;

/// Path to the compiled `cbcr` binary.
fn cbcr_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    // current_exe is something like …/deps/cmd_validate-<hash>
    // The binary lives in the parent directory.
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("cbcr");
    path
}

/// A minimal, fully valid CbCR report: one UPE, one jurisdiction, no findings
/// above Info severity. Global DocRefId checks are disabled so the test stays
/// self-contained (no external store needed).
fn happy_path_json() -> String {
    r#"{
        "message": {
            "message_spec": {
                "message_ref_id": "LU2024-001",
                "message_type": "CBC401",
                "message_type_indic": "CBC701",
                "corr_message_ref_id": null,
                "reporting_period": "2024-12-31",
                "timestamp": "2025-03-01T10:00:00Z",
                "sending_competent_authority": "LU",
                "receiving_competent_authority": "LU",
                "language": "EN"
            },
            "cbc_body": {
                "reporting_entity": {
                    "names": ["Acme Group Holdings"],
                    "addresses": ["1 Rue de la Gare, Luxembourg"],
                    "tins": [{"value": "12345678901", "issued_by": "LU"}],
                    "reporting_role": "CBC801",
                    "doc_spec": {
                        "doc_type_indic": "OECD1",
                        "doc_ref_id": "LU2024-001-1",
                        "corr_doc_ref_id": null,
                        "corr_message_ref_id": null
                    }
                },
                "cbc_reports": [{
                    "res_country_code": "LU",
                    "doc_spec": {
                        "doc_type_indic": "OECD1",
                        "doc_ref_id": "LU2024-001-2",
                        "corr_doc_ref_id": null,
                        "corr_message_ref_id": null
                    },
                    "summary": {
                        "total_revenues": {"value": 1000000.0, "currency": "EUR"},
                        "unrelated_revenues": {"value": 600000.0, "currency": "EUR"},
                        "related_revenues": {"value": 400000.0, "currency": "EUR"},
                        "profit_or_loss": {"value": 200000.0, "currency": "EUR"},
                        "tax_paid": {"value": 40000.0, "currency": "EUR"},
                        "tax_accrued": {"value": 40000.0, "currency": "EUR"},
                        "capital": {"value": 500000.0, "currency": "EUR"},
                        "accumulated_earnings": {"value": 300000.0, "currency": "EUR"},
                        "tangible_assets": {"value": 250000.0, "currency": "EUR"},
                        "number_of_employees": 10.0
                    },
                    "const_entities": {
                        "business_activities": ["CBC501"],
                        "entities": [{
                            "names": ["Acme Group Holdings"],
                            "tins": [{"value": "12345678901", "issued_by": "LU"}],
                            "addresses": ["1 Rue de la Gare, Luxembourg"],
                            "incorp_country_code": "LU",
                            "acct_period_start": "2024-01-01",
                            "acct_period_end": "2024-12-31",
                            "business_activities": ["CBC501"],
                            "other_entity_info": null
                        }]
                    }
                }],
                "additional_info": []
            }
        }
    }"#
    .to_owned()
}

/// A report whose total revenues disagree with unrelated + related revenues —
/// triggers an arithmetic-consistency finding at Error severity or above.
fn revenue_mismatch_json() -> String {
    happy_path_json().replace(
        r#""total_revenues": {"value": 1000000.0, "currency": "EUR"}"#,
        r#""total_revenues": {"value": 1.0, "currency": "EUR"}"#,
    )
}

fn run_cbcr(args: &[&str], stdin_content: Option<&str>) -> std::process::Output {
    if let Some(content) = stdin_content {
        let mut child = Command::new(cbcr_bin())
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .expect("spawn cbcr");
        child
            .stdin
            .as_mut()
            .expect("stdin")
            .write_all(content.as_bytes())
            .expect("write stdin");
        child.wait_with_output().expect("wait")
    } else {
        Command::new(cbcr_bin())
            .args(args)
            .output()
            .expect("run cbcr")
    }
}

fn temp_file_with(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(content.as_bytes()).expect("write temp file");
    f
}

// ---------------------------------------------------------------------------
// validate: known-good report (exit 0)
// ---------------------------------------------------------------------------

#[test]
fn validate_happy_path_exits_0() {
    let f = temp_file_with(&happy_path_json());
    let out = run_cbcr(
        &[
            "validate",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    assert_eq!(
        out.status.code(),
        Some(0),
        "expected exit 0 for a clean report; stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn validate_happy_path_produces_no_stdout() {
    let f = temp_file_with(&happy_path_json());
    let out = run_cbcr(
        &[
            "validate",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    assert!(
        out.stdout.is_empty(),
        "validate should not write to stdout; stdout: {}",
        String::from_utf8_lossy(&out.stdout)
    );
}

#[test]
fn validate_happy_path_summary_on_stderr() {
    let f = temp_file_with(&happy_path_json());
    let out = run_cbcr(
        &[
            "validate",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("critical") || stderr.contains("error"),
        "stderr should contain a summary; stderr: {stderr}"
    );
}

// ---------------------------------------------------------------------------
// validate: report with a revenue inconsistency (non-zero exit)
// ---------------------------------------------------------------------------

#[test]
fn validate_revenue_mismatch_is_nonzero_exit() {
    let f = temp_file_with(&revenue_mismatch_json());
    let out = run_cbcr(
        &[
            "validate",
            "--strict",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    assert_ne!(
        out.status.code(),
        Some(0),
        "expected a non-zero exit for a revenue mismatch in strict mode; stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn validate_revenue_mismatch_produces_no_stdout() {
    let f = temp_file_with(&revenue_mismatch_json());
    let out = run_cbcr(
        &[
            "validate",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    assert!(
        out.stdout.is_empty(),
        "validate should not write to stdout; stdout: {}",
        String::from_utf8_lossy(&out.stdout)
    );
}

// ---------------------------------------------------------------------------
// validate: parse failure (exit 2)
// ---------------------------------------------------------------------------

#[test]
fn validate_invalid_json_exits_2() {
    let f = temp_file_with("not-valid-json");
    let out = run_cbcr(&["validate", f.path().to_str().expect("path")], None);
    assert_eq!(
        out.status.code(),
        Some(2),
        "expected exit 2 for invalid JSON"
    );
}

#[test]
fn validate_nonexistent_file_exits_2() {
    let out = run_cbcr(&["validate", "/no/such/file/ever.json"], None);
    assert_eq!(
        out.status.code(),
        Some(2),
        "expected exit 2 for nonexistent file"
    );
}

// ---------------------------------------------------------------------------
// validate: stdin support
// ---------------------------------------------------------------------------

#[test]
fn validate_stdin_happy_path_exits_0() {
    let out = run_cbcr(
        &["validate", "--no-global-doc-ref-ids", "-"],
        Some(&happy_path_json()),
    );
    assert_eq!(
        out.status.code(),
        Some(0),
        "expected exit 0 via stdin; stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

// ---------------------------------------------------------------------------
// validate: JSON output format
// ---------------------------------------------------------------------------

#[test]
fn validate_json_format_happy_path_exits_0() {
    let f = temp_file_with(&happy_path_json());
    let out = run_cbcr(
        &[
            "validate",
            "-f",
            "json",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    assert_eq!(
        out.status.code(),
        Some(0),
        "expected exit 0 for a clean report in JSON mode; stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn validate_json_format_revenue_mismatch_emits_ndjson_on_stderr() {
    let f = temp_file_with(&revenue_mismatch_json());
    let out = run_cbcr(
        &[
            "validate",
            "-f",
            "json",
            "--strict",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    let first_line = stderr.lines().next().expect("at least one line on stderr");
    let parsed: Result<serde_json::Value, _> = serde_json::from_str(first_line);
    assert!(
        parsed.is_ok(),
        "first stderr line should be valid JSON: {first_line}"
    );
    let obj = parsed.expect("valid json");
    assert!(obj.get("rule_id").is_some(), "missing rule_id field");
    assert!(obj.get("severity").is_some(), "missing severity field");
}

// ---------------------------------------------------------------------------
// validate: quiet mode
// ---------------------------------------------------------------------------

#[test]
fn validate_quiet_suppresses_output_for_clean_report() {
    let f = temp_file_with(&happy_path_json());
    let out = run_cbcr(
        &[
            "validate",
            "--quiet",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.is_empty(),
        "stderr should be empty in quiet mode for a clean report; stderr: {stderr}"
    );
}

// ---------------------------------------------------------------------------
// validate: --country and --jurisdiction flags
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_country_flag() {
    let f = temp_file_with(&happy_path_json());
    let out = run_cbcr(
        &[
            "validate",
            "--country",
            "LU",
            "--no-global-doc-ref-ids",
            f.path().to_str().expect("path"),
        ],
        None,
    );
    assert_eq!(
        out.status.code(),
        Some(0),
        "expected exit 0 with explicit --country LU; stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

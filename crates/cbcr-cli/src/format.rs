/// Finding formatting: human-readable and JSON (NDJSON) modes.
///
/// This module implements two output strategies for [`cbcr_core::Finding`]
/// values:
///
/// - **Human mode** (default): one line per finding, color-coded by
///   severity, to stderr. Colors are disabled when `--no-color` is set, the
///   `NO_COLOR` environment variable is present (per <https://no-color.org>),
///   or stderr is not a TTY.
/// - **JSON mode**: each finding is serialized as a single-line JSON object
///   (NDJSON) via `serde_json`, since `Finding` already derives `Serialize`.
///
/// Both modes support a **quiet** flag (suppress everything but Error/Critical
/// findings and the summary) and a **verbose** flag (add timing).
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use cbcr_core::{Finding, Severity};

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stderr.
///
/// Colors are disabled when any of the following conditions hold:
/// - `no_color_flag` is `true` (the `--no-color` CLI flag was passed).
/// - The `NO_COLOR` environment variable is present (any non-empty value).
/// - stderr is not a TTY (e.g. the output is piped to a file).
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_RED: &str = "\x1b[31m";
const ANSI_BOLD_RED: &str = "\x1b[1;31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the finding formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress Info and Warning findings and the summary line.
    pub quiet: bool,
    /// Emit timing information to stderr.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    ///
    /// `no_color_flag` is the `--no-color` boolean. Color detection also
    /// checks the `NO_COLOR` env var and the stderr TTY state.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }
}

fn is_suppressed_in_quiet(severity: Severity) -> bool {
    matches!(severity, Severity::Info | Severity::Warning)
}

// ---------------------------------------------------------------------------
// Human-mode formatting
// ---------------------------------------------------------------------------

/// Writes a single [`Finding`] to `writer` in human-readable format.
///
/// Format: `[ERROR] SUM-002  /CBC_OECD/.../SummaryInNonDefaultCurrency: message`
///
/// The severity tag is color-coded when `config.colors` is `true`:
/// - `[CRITICAL]` → bold red
/// - `[ERROR]` → red
/// - `[WARNING]` → yellow
/// - `[INFO]` → cyan
///
/// In quiet mode, [`Severity::Info`] and [`Severity::Warning`] findings are
/// suppressed. In verbose mode, the finding's `suggestion` (if any) is
/// printed on a continuation line.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_finding_human<W: Write>(
    writer: &mut W,
    finding: &Finding,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && is_suppressed_in_quiet(finding.severity) {
        return Ok(());
    }

    let (tag, color) = match finding.severity {
        Severity::Critical => ("[CRITICAL]", ANSI_BOLD_RED),
        Severity::Error => ("[ERROR]", ANSI_RED),
        Severity::Warning => ("[WARNING]", ANSI_YELLOW),
        Severity::Info => ("[INFO]", ANSI_CYAN),
    };
    let location = finding.xpath.as_deref().unwrap_or("(no xpath)");
    let rule_id = finding.rule_id.code();

    if config.colors {
        writeln!(
            writer,
            "{color}{tag}{ANSI_RESET} {rule_id}  {location}: {message}",
            message = finding.message,
        )?;
    } else {
        writeln!(writer, "{tag} {rule_id}  {location}: {message}", message = finding.message)?;
    }

    if config.verbose {
        if let Some(suggestion) = &finding.suggestion {
            writeln!(writer, "    suggestion: {suggestion}")?;
        }
    }
    Ok(())
}

/// Writes a summary line to `writer` for human mode.
///
/// Format: `2 critical, 3 errors, 1 warning, 0 info`
///
/// In quiet mode the summary is suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary_human<W: Write>(writer: &mut W, summary: &cbcr_core::SeveritySummary, config: &FormatterConfig) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    writeln!(
        writer,
        "{critical} {}, {errors} {}, {warnings} {}, {info} {}",
        pluralize(summary.critical, "critical", "critical"),
        pluralize(summary.errors, "error", "errors"),
        pluralize(summary.warnings, "warning", "warnings"),
        pluralize(summary.info, "info", "info"),
        critical = summary.critical,
        errors = summary.errors,
        warnings = summary.warnings,
        info = summary.info,
    )
}

/// Writes timing information to `writer` in verbose mode.
///
/// This is a no-op when `config.verbose` is `false`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing_human<W: Write>(writer: &mut W, label: &str, duration: Duration, config: &FormatterConfig) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

// ---------------------------------------------------------------------------
// JSON-mode formatting (NDJSON)
// ---------------------------------------------------------------------------

/// Writes a single [`Finding`] to `writer` as an NDJSON line, using
/// `Finding`'s own `Serialize` impl rather than hand-rolled escaping.
///
/// In quiet mode, [`Severity::Info`] and [`Severity::Warning`] findings are
/// suppressed.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails, or (in practice
/// unreachable) if `Finding` cannot be serialized.
pub fn write_finding_json<W: Write>(writer: &mut W, finding: &Finding, config: &FormatterConfig) -> std::io::Result<()> {
    if config.quiet && is_suppressed_in_quiet(finding.severity) {
        return Ok(());
    }
    let line = serde_json::to_string(finding).unwrap_or_else(|_| "{}".to_string());
    writeln!(writer, "{line}")
}

/// Writes a JSON summary object as a final NDJSON line.
///
/// In quiet mode the summary is suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary_json<W: Write>(writer: &mut W, summary: &cbcr_core::SeveritySummary, config: &FormatterConfig) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    let line = serde_json::to_string(&serde_json::json!({ "summary": summary })).unwrap_or_else(|_| "{}".to_string());
    writeln!(writer, "{line}")
}

// ---------------------------------------------------------------------------
// Helper: dispatch by format
// ---------------------------------------------------------------------------

/// Output format selection, mirroring the CLI `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Human-readable, optionally colored output.
    Human,
    /// Structured NDJSON output.
    Json,
}

/// Writes a single [`Finding`] to `writer` in the requested format.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_finding<W: Write>(writer: &mut W, finding: &Finding, mode: FormatMode, config: &FormatterConfig) -> std::io::Result<()> {
    match mode {
        FormatMode::Human => write_finding_human(writer, finding, config),
        FormatMode::Json => write_finding_json(writer, finding, config),
    }
}

/// Writes a summary to `writer` in the requested format.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary<W: Write>(writer: &mut W, summary: &cbcr_core::SeveritySummary, mode: FormatMode, config: &FormatterConfig) -> std::io::Result<()> {
    match mode {
        FormatMode::Human => write_summary_human(writer, summary, config),
        FormatMode::Json => write_summary_json(writer, summary, config),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns the singular or plural form of `word` depending on `count`.
fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].  This avoids stringly-typed handling of the stdin
/// sentinel throughout the codebase.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits colored, tabular output to stderr and plain text to stdout.
/// `Json` emits structured JSON (NDJSON for findings, single object for the
/// closing summary).
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// Structured JSON / NDJSON output.
    Json,
}

/// `--min-severity` value, mirrored onto `cbcr_core::finding::Severity`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SeverityArg {
    Info,
    Warning,
    Error,
    Critical,
}

/// `--category` value, mirrored onto `cbcr_core::finding::Category`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CategoryArg {
    SchemaConformity,
    Business,
    Country,
    DataQuality,
    Pillar2,
}

/// All top-level subcommands exposed by the `cbcr` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Validate a CbCR XML filing (given as parsed JSON) and report findings.
    Validate {
        /// Path to a parsed CbCR report JSON file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,

        /// Reporting entity's tax jurisdiction (ISO 3166-1 alpha-2).
        #[arg(long, value_name = "CC", default_value = "LU")]
        country: String,

        /// Fiscal year under review, for reporting-period cross-checks.
        #[arg(long, value_name = "YYYY")]
        fiscal_year: Option<String>,

        /// Skip the Pillar 2 / GloBE readiness heuristics (spec.md §4.4.8).
        #[arg(long)]
        no_pillar2: bool,

        /// Skip the external DocRefId uniqueness lookup (spec.md §4.4.2).
        #[arg(long)]
        no_global_doc_ref_ids: bool,

        /// Promote every Warning finding to Error.
        #[arg(long)]
        strict: bool,

        /// Stop the pass at the first Critical finding.
        #[arg(long)]
        fail_fast: bool,

        /// Stop the pass after this many findings have been recorded (0 = unlimited).
        #[arg(long, default_value = "0")]
        max_issues: usize,

        /// Suppress findings below this severity.
        #[arg(long, value_enum, default_value = "info")]
        min_severity: SeverityArg,

        /// Restrict the pass to this finding category (repeatable; default: all).
        #[arg(long, value_name = "CATEGORY")]
        category: Vec<CategoryArg>,

        /// Drop findings for this rule id (repeatable, e.g. `DOC-005`).
        #[arg(long, value_name = "RULE_ID")]
        skip_rule: Vec<String>,

        /// Restrict the pass to these jurisdictions (repeatable; default: all).
        #[arg(long, value_name = "CC")]
        jurisdiction: Vec<String>,

        /// Treat the filing as a test submission (relaxes production-only checks).
        #[arg(long)]
        test_mode: bool,

        /// Upper bound on concurrently dispatched validators within a phase.
        #[arg(long, default_value = "1")]
        max_parallel: usize,
    },
}

/// Root CLI struct for the `cbcr` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "cbcr",
    version,
    about = "OECD Country-by-Country Reporting (CbCR) XML filing validator",
    long_about = "Validates parsed OECD Country-by-Country Reporting filings against\n\
                  structural, business-rule, country-specific, data-quality, and\n\
                  Pillar 2 / GloBE readiness checks, producing a ranked diagnostic report."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase stderr verbosity: timing, phase progress, metadata
    /// (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `CBCR_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "CBCR_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[cfg(test)]
mod tests;

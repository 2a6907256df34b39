pub mod cli;
pub mod cmd;
pub mod error;
pub mod format;
pub mod io;

pub use cli::{Cli, CategoryArg, Command, OutputFormat, PathOrStdin, SeverityArg};

use clap::Parser;

fn main() {
    #[cfg(unix)]
    install_sigpipe_default();

    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let result = dispatch(&cli);

    if let Err(e) = result {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Dispatches the parsed CLI arguments to the appropriate command handler.
///
/// Returns `Ok(())` on success or a [`error::CliError`] on failure. The
/// caller is responsible for printing the error message and exiting with the
/// appropriate exit code.
fn dispatch(cli: &Cli) -> Result<(), error::CliError> {
    match &cli.command {
        Command::Validate {
            file,
            country,
            fiscal_year,
            no_pillar2,
            no_global_doc_ref_ids,
            strict,
            fail_fast,
            max_issues,
            min_severity,
            category,
            skip_rule,
            jurisdiction,
            test_mode,
            max_parallel,
        } => {
            let content = io::read_input(file, cli.max_file_size)?;
            let args = cmd::validate::ValidateArgs {
                country,
                fiscal_year: fiscal_year.as_deref(),
                no_pillar2: *no_pillar2,
                no_global_doc_ref_ids: *no_global_doc_ref_ids,
                strict: *strict,
                fail_fast: *fail_fast,
                max_issues: *max_issues,
                min_severity: *min_severity,
                category,
                skip_rule,
                jurisdiction,
                test_mode: *test_mode,
                max_parallel: *max_parallel,
            };
            cmd::validate::run(&content, &args, &cli.format, cli.quiet, cli.verbose, cli.no_color)
        }
    }
}

/// Installs a `tracing-subscriber` writer targeting stderr.
///
/// `RUST_LOG` always takes precedence when set. Otherwise `--quiet` lowers
/// the default level to `error` and `--verbose` raises it to `debug`; the
/// default is `warn`. Findings themselves are printed separately by
/// [`format`] — this subscriber carries only engine/CLI diagnostics.
fn init_tracing(quiet: bool, verbose: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Resets `SIGPIPE` to its default disposition (`SIG_DFL`).
///
/// Rust's runtime ignores `SIGPIPE` by default, which causes programs that
/// write to a closed pipe (e.g. `cbcr validate file.json | head`) to receive
/// an `Err(BrokenPipe)` from a write call rather than being terminated silently.
/// By restoring the default disposition, the kernel will terminate the process
/// with exit code 0 (consistent with standard Unix behavior) when a write to a
/// closed pipe occurs.
///
/// This function uses `libc::signal` which requires the `libc` crate. It is
/// only compiled on Unix targets via `#[cfg(unix)]` at the call site.
#[cfg(unix)]
fn install_sigpipe_default() {
    // SAFETY: signal() is safe to call during single-threaded program
    // initialization before any other threads are spawned. SIG_DFL is a valid
    // handler for SIGPIPE. The return value (previous handler) is discarded.
    //
    // The workspace denies `unsafe_code` globally, but this is the minimal
    // unavoidable use of libc required for SIGPIPE handling on Unix. There is
    // no safe Rust equivalent in the standard library.
    //
    // We use an inline allow rather than a workspace-level exception so the
    // scope of the unsafe block is as narrow as possible.
    #[allow(unsafe_code)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cspmd::{analyze_path, render_outcome, DriverError};
use cspmd_diagnostics::build_diagnostic_message;
use tracing_subscriber::EnvFilter;

/// Counted-loop vectorization analyzer and SPMD kernel emitter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input C source file to analyze
    input: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    // A missing argument exits 1, matching the driver contract;
    // --help and --version still exit 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(error) => {
            let _ = error.print();
            return match error.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::SUCCESS
                }
                _ => ExitCode::FAILURE,
            };
        }
    };

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("Analyzing file: {}", args.input.display());

    let analysis = match analyze_path(&args.input) {
        Ok(analysis) => analysis,
        Err(DriverError::Io { path, source }) => {
            eprintln!("Error reading file '{}': {source}", path.display());
            return ExitCode::FAILURE;
        }
        Err(DriverError::Parse {
            source_text,
            diagnostics,
            ..
        }) => {
            for diagnostic in &diagnostics {
                println!("{}", build_diagnostic_message(&source_text, diagnostic, true));
            }
            return ExitCode::FAILURE;
        }
    };

    for outcome in &analysis.outcomes {
        print!("{}", render_outcome(outcome));
    }

    println!(
        "\nAnalyzed {} loop(s), emitted {} kernel(s){}",
        analysis.loops_analyzed(),
        analysis.kernels_emitted(),
        if analysis.emissions_failed() > 0 {
            format!(", {} emission failure(s)", analysis.emissions_failed())
        } else {
            String::new()
        }
    );

    // Emission failures are per-loop and do not fail the run
    ExitCode::SUCCESS
}

//! brilrun Interpreter
//!
//! Runs a Bril program read from a file or from standard input. Arguments
//! after the options are passed to `main`.

use anyhow::{Context, Result};
use brilrun::{Format, RunConfig, RunStats};
use clap::Parser;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "brilrun", version, about = "Reference interpreter for Bril programs")]
struct Cli {
    /// Program to run; read from standard input if omitted
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Source encoding; inferred from the file extension by default
    #[arg(long = "format", value_enum)]
    format: Option<Format>,

    /// Report the number of executed instructions on standard error
    #[arg(short = 'p', long = "profile", default_value_t = false)]
    profile: bool,

    /// Print the program in text form instead of running it
    #[arg(long = "print", default_value_t = false)]
    print: bool,

    /// Maximum call depth before the run is aborted
    #[arg(long = "max-depth", default_value_t = brilrun::runner::DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Arguments bound to the parameters of `main`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let log_level = std::env::var("BRILRUN_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(stats) => {
            if let Some(stats) = stats.filter(|_| cli.profile) {
                eprintln!("total_dyn_inst: {}", stats.dynamic_instructions);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Option<RunStats>> {
    let program = match &cli.file {
        Some(path) => brilrun::load_file(path, cli.format)?,
        None => {
            let mut src = String::new();
            io::stdin()
                .read_to_string(&mut src)
                .context("failed to read program from standard input")?;
            brilrun::load_source(&src, cli.format.unwrap_or(Format::Json))?
        }
    };
    info!("Loaded {} top-level function(s)", program.functions.len());

    let mut out = BufWriter::new(io::stdout().lock());
    if cli.print {
        write!(out, "{program}")
            .and_then(|()| out.flush())
            .context("failed to write program text")?;
        return Ok(None);
    }

    let config = RunConfig {
        max_call_depth: cli.max_depth,
    };
    // `run` flushes `out` itself, also when the program fails.
    let stats = brilrun::run(&program, &cli.args, &config, &mut out)?;
    Ok(Some(stats))
}

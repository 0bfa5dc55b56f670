use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use loxi::Lox;
use tracing_subscriber::EnvFilter;

/// A tree-walking interpreter for the Lox programming language.
#[derive(Parser, Debug)]
#[command(name = "loxi", version, about)]
struct Cli {
    /// Script to run. Omit to start an interactive prompt.
    script: Option<String>,

    /// Enable debug-level logging, overriding RUST_LOG.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // `Cli::parse()` would exit with clap's own code (2) on a usage
    // error; this CLI's contract is 64 for any usage error, so usage
    // failures are mapped explicitly instead. `--help`/`--version`
    // still print and exit 0 through clap's own path.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
        Err(err) => {
            let _ = err.print();
            process::exit(64);
        }
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).without_time().init();

    let mut lox = Lox::new();

    let exit_code = match cli.script {
        Some(script) => lox.run_file(script),
        None => {
            lox.run_prompt();
            0
        }
    };

    process::exit(exit_code);
}

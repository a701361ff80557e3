// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments, run the pipeline.
// - Prints the landing page URL on success, or the error and its exit code.

use clap::Parser;
use s3share::cli::{run, Cli};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries the progress bar and the URL.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(shared) => {
            println!("{}", shared.page.url);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

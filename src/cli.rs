// Command line surface and the end-to-end run: config, input check,
// bucket resolution, upload, landing page.

use crate::config::Config;
use crate::error::Result;
use crate::storage::S3Client;
use crate::share::{self, Shared};
use crate::ui;
use clap::Parser;
use std::path::PathBuf;

/// Upload a file to S3 and print a link to a public download page.
#[derive(Debug, Parser)]
#[command(name = "s3share", version, about)]
pub struct Cli {
    /// The path to the file to be uploaded
    pub file: PathBuf,

    /// Do not show a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub overwrite: bool,
}

/// Run the whole pipeline and return what was shared. Steps run strictly in
/// order and the first failure ends the run.
pub fn run(cli: &Cli) -> Result<Shared> {
    let config = Config::load()?;
    let target = share::validate_input(&cli.file)?;

    let client = S3Client::new(&config)?;
    client.resolve_bucket()?;

    let progress = ui::progress_sink(!cli.no_progress);
    share::share(&client, &target, cli.overwrite, progress)
}

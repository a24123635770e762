//! Campaign A/B Viewer - control vs test campaign comparison
//!
//! Opens the interactive viewer by default; `--headless` prints the summary
//! and writes the charts to the output directory.

mod cli;

use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use campaign_ab_viewer::logging::init_logging;
use campaign_ab_viewer::{gui, AbReport};
use clap::Parser;
use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_config()) {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.report_config().context("invalid configuration")?;

    if !cli.headless {
        return gui::run_viewer(config).map_err(|e| anyhow!("viewer error: {e}"));
    }

    let report = AbReport::build(&config).context("building the report")?;
    report
        .print_summary(config.preview_rows)
        .context("writing the summary")?;

    if !cli.no_export {
        let files = report
            .export(&config.output_dir, config.chart_width, config.chart_height)
            .context("exporting charts")?;
        println!(
            "\nWrote {} files to {}",
            files.len(),
            config.output_dir.display()
        );
    }
    Ok(())
}

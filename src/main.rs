use anyhow::Result;
use clap::Parser;
use tracing::error;

use sitemap_stats::{analysis, config, report, utils, Args};

fn run(args: &Args) -> Result<()> {
    let config = analysis::load_config(args)?;
    // Bad patterns abort here, before anything is downloaded
    let patterns = config.compile_patterns()?;

    let result = analysis::analyze_sitemap(&config, &patterns)?;
    report::print_analysis_results(&result, args.top);
    analysis::export_results(
        &result,
        &config.output.directory,
        config.output.chart_top,
        args,
    )
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    if args.init {
        config::init_default_config(&args.config)?;
        return Ok(());
    }

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

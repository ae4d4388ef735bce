use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sitemap-stats",
    about = "Classify the URLs of a sitemap into categories, products and other pages",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Sitemap URL or local file, overriding `sitemap_url` from the config
    #[arg(short, long)]
    pub url: Option<String>,

    /// Output directory, overriding `output.directory` from the config
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of manufacturers to display, largest first
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Do not write the text report
    #[arg(long)]
    pub no_txt: bool,

    /// Do not write the CSV files
    #[arg(long)]
    pub no_csv: bool,

    /// Do not render the manufacturer chart
    #[arg(long)]
    pub no_chart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Initialize the configuration file with default patterns
    #[arg(long)]
    pub init: bool,
}

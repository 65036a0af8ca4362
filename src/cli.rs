use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use bex_lib::Viewport;

#[derive(Parser)]
#[command(name = "bex")]
#[command(
    version,
    about = "Brand Extractor - derive a structured brand identity profile from a website URL",
    long_about = "Brand Extractor (bex)\n\nFetches a page, parses its markup and stylesheets, optionally captures a\nscreenshot through configured rendering providers and runs vision inference\non it, then fuses everything into one confidence-scored brand profile.\n\nProviders are configured in the TOML config file; without any, the profile\nis derived from heuristics alone at lower confidence."
)]
pub struct Cli {
    #[arg(help = "Website URL to analyze (e.g., https://example.com)")]
    pub url: String,

    #[arg(
        long,
        value_name = "PATH",
        help = "Config file (TOML) for viewport/retry/validation/fusion settings and provider lists"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Viewport dimensions (WIDTHxHEIGHT); overrides config")]
    pub viewport: Option<Viewport>,

    #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, value_name = "PATH", help = "Write output to a file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Include the provider attempt trail in the output")]
    pub show_attempts: bool,

    #[arg(long, help = "Enable verbose logging to stderr")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

pub fn parse() -> Cli {
    Cli::parse()
}

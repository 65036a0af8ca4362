mod cli;
mod formatting;

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use bex_lib::output::{BexOutput, ExtractOutput, BEX_OUTPUT_VERSION};
use bex_lib::{BrandExtractor, Config};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();

    let filter = if args.verbose {
        EnvFilter::new("bex=debug,bex_lib=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return formatting::render_error(err, args.format, args.output),
    };
    if let Some(viewport) = args.viewport {
        config.viewport = viewport;
    }
    let viewport = config.viewport;

    let extractor = match BrandExtractor::new(config) {
        Ok(extractor) => extractor,
        Err(err) => return formatting::render_error(err, args.format, args.output),
    };

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    match extractor.extract_brand_profile(&args.url, &cancel).await {
        Ok(extraction) => {
            let body = BexOutput::Extract(ExtractOutput {
                version: BEX_OUTPUT_VERSION.to_string(),
                url: args.url.clone(),
                viewport,
                profile: extraction.profile,
                attempts: if args.show_attempts {
                    extraction.attempts
                } else {
                    Vec::new()
                },
                elapsed_ms: extraction.elapsed.as_millis() as u64,
            });
            match formatting::write_output(&body, args.format, args.output) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Failed to write output: {}", err);
                    ExitCode::from(2)
                }
            }
        }
        Err(err) => formatting::render_error(err, args.format, args.output),
    }
}

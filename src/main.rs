//! Rerank Latency Bench - Main CLI Application
//!
//! Benchmarks the latency of reranking and embedding API providers under
//! a synthetic open-loop Poisson load.

use clap::Parser;
use rerank_latency_bench::{
    app::run_benchmark,
    cli::Cli,
    config::{display_config_summary, load_config},
    error::AppError,
    output::SummaryFormatter,
    PKG_NAME, VERSION,
};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    // Parse command line arguments
    let cli = Cli::parse();
    let use_colors = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_colors));

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        // Print suggestions for common errors
        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> rerank_latency_bench::Result<()> {
    // Show debug info if requested
    if cli.debug {
        println!("{} v{}", PKG_NAME, VERSION);
        println!("Debug mode enabled");
        println!();
    }

    // Load and validate configuration (credentials fail fast here)
    let config = load_config(cli)?;

    if config.debug {
        println!("{}", display_config_summary(&config));
    }

    // Execute the benchmark run
    let summary = run_benchmark(&config).await?;

    // Print the result summary
    let formatter = SummaryFormatter::new(config.enable_color, config.verbose);
    println!();
    println!("{}", formatter.format(&summary));

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check --qps and --duration are positive numbers");
            eprintln!("  - -k must not exceed the corpus size");
            eprintln!("  - Check your .env file format");
        }
        AppError::Auth(_) => {
            eprintln!();
            eprintln!("Credential help:");
            eprintln!("  - Set ZEROENTROPY_BASE_URL and ZEROENTROPY_API_KEY for --provider zeroentropy");
            eprintln!("  - Set COHERE_API_KEY for --provider cohere");
            eprintln!("  - Set JINA_API_KEY for --provider jina");
            eprintln!("  - Values can be placed in a .env file in the working directory");
        }
        AppError::Io(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Corpus help:");
            eprintln!("  - Run rlb-fetch to download the query and document corpora");
            eprintln!("  - Corpus files must be JSON arrays of strings");
        }
        AppError::Network(_) | AppError::HttpRequest(_) | AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection and the provider status page");
            eprintln!("  - Verify the API key is valid and has quota remaining");
            eprintln!("  - Increase --timeout for slow providers");
            eprintln!("  - Note: failed runs produce no partial results; latency numbers");
            eprintln!("    would be meaningless with silent retries");
        }
        _ => {}
    }
}

use alexandria::extract::ExtractOptions;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "alexandria")]
#[command(about = "Extract readable prose from Wikipedia dumps into a JSON corpus")]
struct Cli {
    /// Path to the Wikipedia dump file (.xml.bz2)
    #[arg(short, long)]
    input: String,

    /// Path for the JSON corpus output file
    #[arg(short, long)]
    output: String,

    /// Minimum word count for a cleaned article to be kept
    #[arg(long, default_value_t = alexandria::config::DEFAULT_MIN_WORDS)]
    min_words: usize,

    /// Limit number of pages to process (for testing)
    #[arg(long)]
    limit: Option<u64>,

    /// Dry run - parse and clean but don't write the output file
    #[arg(long)]
    dry_run: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&cancel);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .context("Failed to install interrupt handler")?;
    }

    let options = ExtractOptions {
        min_words: cli.min_words,
        limit: cli.limit,
        dry_run: cli.dry_run,
    };

    info!("Starting extraction pass");
    let start = Instant::now();
    let stats = alexandria::extract::run_extraction(
        Path::new(&cli.input),
        Path::new(&cli.output),
        &options,
        Some(cancel),
    )?;
    let duration = start.elapsed();

    let secs = duration.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.accepted as f64 / secs
    } else {
        0.0
    };

    println!();
    println!("=== Summary ===");
    println!("Extraction time:    {:.2}s", secs);
    println!("Rate:               {:.0} articles/s", rate);
    println!();
    println!("Pages read:         {}", stats.pages_seen);
    println!("Articles accepted:  {}", stats.accepted);
    println!("Skipped namespace:  {}", stats.skipped_namespace);
    println!("Skipped incomplete: {}", stats.skipped_incomplete);
    println!("Skipped redirects:  {}", stats.skipped_redirect);
    println!("Skipped too short:  {}", stats.skipped_short);
    println!("Skipped by cleaner: {}", stats.skipped_markup);
    println!("Skipped by filter:  {}", stats.skipped_prose);

    if stats.interrupted {
        println!();
        println!("Run interrupted: output was closed early and remains valid JSON");
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(cli) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

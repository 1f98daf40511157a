use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_harvest::{
    build_adapters, CleanedDataset, FixedPause, HarvestConfig, Harvester, KaggleCatalog,
    ReqwestClient, RunReport,
};

#[derive(Parser)]
#[command(version, about = "Fetch, merge and clean book metadata from public sources")]
struct Args {
    /// JSON settings file (defaults are used for anything it leaves out)
    #[arg(short, long, env = "BOOK_HARVEST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every source, write the raw dataset, then clean it (default)
    Run,
    /// Clean an existing raw dataset without fetching
    Clean,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_harvest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => HarvestConfig::from_file(path)?,
        None => {
            let config = HarvestConfig::default();
            config.validate()?;
            config
        }
    };

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run_harvest(&config),
        Command::Clean => run_clean(&config),
    }
}

fn run_harvest(config: &HarvestConfig) -> Result<()> {
    println!("📚 Book Harvest - fetch → merge → clean");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let http = ReqwestClient::new(&config.user_agent, config.request_timeout())?;
    let pacer = FixedPause::new(config.pause());
    let catalog = KaggleCatalog::new(
        &config.kaggle.cache_dir,
        &config.kaggle.download_url,
        &config.user_agent,
        config.request_timeout(),
    )?;

    let adapters = build_adapters(config, &http, &pacer, &catalog);
    println!("\n🔌 Running {} sources...", adapters.len());

    let harvester = Harvester::new(config, adapters);
    let report = harvester.run()?;

    print_report(&report);
    Ok(())
}

fn run_clean(config: &HarvestConfig) -> Result<()> {
    println!("🧹 Cleaning {}", config.output.raw_path.display());

    let harvester = Harvester::new(config, Vec::new());
    let cleaned = harvester.clean_only()?;

    print_cleaned(&cleaned);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    for source in &report.sources {
        match &source.reason {
            Some(reason) => println!("  ⚠️  {:<15} unavailable ({})", source.source.name(), reason),
            None => println!(
                "  ✓ {:<15} {:>6} records ({})",
                source.source.name(),
                source.records,
                source.outcome
            ),
        }
    }

    println!(
        "\n💾 Raw dataset: {} rows × {} columns → {}",
        report.raw.rows,
        report.raw.columns.len(),
        report.raw.path.display()
    );
    print_cleaned(&report.cleaned);
    println!("⏱️  Finished in {}s", report.elapsed_secs());
}

fn print_cleaned(cleaned: &CleanedDataset) {
    println!("✅ Cleaned dataset: {}", cleaned.report.summary());
    println!("   → {}", cleaned.output.path.display());
}

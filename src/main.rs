mod config;
mod error;
mod fetch;
mod models;
mod parser;
mod pipeline;
mod stages;
mod store;
mod transform;

use std::future::Future;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use config::Settings;
use fetch::HttpTransport;
use pipeline::{OutputStats, Pipeline, Stage};

#[derive(Parser)]
#[command(
    name = "fastfood_scraper",
    about = "Nutrition, allergen and serving-size scraper for fastfoodnutrition.org"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restaurants → menus → nutrition → normalized export
    Run(RunOpts),
    /// Scrape the restaurant listing into 01_restaurants.json
    Restaurants(RunOpts),
    /// Scrape menus for the saved restaurants into 02_menu_items.json
    Menus(RunOpts),
    /// Scrape nutrition detail for the saved menus into 03_enriched_data.json
    Nutrition(RunOpts),
    /// Normalize 03_enriched_data.json into brand/item/variation files
    Transform,
    /// Summarize what the output directory holds
    Stats,
}

/// Per-run overrides on top of the loaded settings.
#[derive(Args, Default)]
struct RunOpts {
    /// Only scrape the first N restaurants
    #[arg(long)]
    max_restaurants: Option<usize>,
    /// Only scrape the first N items of each restaurant
    #[arg(long)]
    max_items: Option<usize>,
    /// Only scrape this restaurant (repeatable, exact name)
    #[arg(short = 'r', long = "restaurant")]
    restaurants: Vec<String>,
    /// Ignore existing checkpoints
    #[arg(long)]
    no_resume: bool,
}

impl RunOpts {
    fn apply(self, settings: &mut Settings) {
        if self.max_restaurants.is_some() {
            settings.max_restaurants = self.max_restaurants;
        }
        if self.max_items.is_some() {
            settings.max_items_per_restaurant = self.max_items;
        }
        if !self.restaurants.is_empty() {
            settings.specific_restaurants = Some(self.restaurants);
        }
        if self.no_resume {
            settings.resume_from_checkpoint = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    let t0 = Instant::now();

    let result = match cli.command {
        Commands::Run(opts) => {
            opts.apply(&mut settings);
            let mut pipeline = connect(settings)?;
            interruptible(pipeline.run()).await.map(|s| println!("{}", s))
        }
        Commands::Restaurants(opts) => run_stage(settings, opts, Stage::Restaurants).await,
        Commands::Menus(opts) => run_stage(settings, opts, Stage::MenuItems).await,
        Commands::Nutrition(opts) => run_stage(settings, opts, Stage::NutritionDetail).await,
        Commands::Transform => run_stage(settings, RunOpts::default(), Stage::Transform).await,
        Commands::Stats => {
            let stats = OutputStats::collect(&settings)?;
            println!("Output: {}", settings.output_dir.display());
            println!("{}", stats);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn connect(
    settings: Settings,
) -> anyhow::Result<Pipeline<impl FnMut() -> anyhow::Result<HttpTransport>>> {
    let browser = settings.user_agent.clone();
    let timeout = settings.fetch_config().timeout;
    Pipeline::new(settings, move || HttpTransport::new(&browser, timeout))
}

async fn run_stage(mut settings: Settings, opts: RunOpts, stage: Stage) -> anyhow::Result<()> {
    opts.apply(&mut settings);
    let mut pipeline = connect(settings)?;
    let summary = interruptible(pipeline.run_stage(stage)).await?;
    println!("{}: {}", stage, summary);
    Ok(())
}

/// Ctrl-C drops the running stage. Stage files and checkpoints already on
/// disk stay usable for the next run.
async fn interruptible<T>(work: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
    tokio::select! {
        result = work => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, completed stages and checkpoints are kept");
            anyhow::bail!("interrupted")
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

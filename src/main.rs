use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use draw_forecast::analysis::PatternAnalyzer;
use draw_forecast::config::AppConfig;
use draw_forecast::database::{Database, HistoryStore};
use draw_forecast::prediction::Forecaster;
use draw_forecast::types::{AnimalCatalog, Outcome, TimeWindow};

#[derive(Parser)]
#[command(name = "draw-forecast")]
#[command(version = "0.1.0")]
#[command(about = "Pattern analysis and forecasting over a 36-animal draw history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe patterns in a time window
    Analyze {
        /// today, yesterday, this_week, last_week, this_month or recent_days
        #[arg(short, long, default_value = "this_week")]
        window: String,
        /// Drill into one animal (name, label or number)
        #[arg(short, long)]
        animal: Option<String>,
    },
    /// Forecast the next draw
    Forecast,
    /// Record a draw outcome
    Record {
        /// Animal name, label or number
        #[arg(short, long)]
        animal: String,
        /// Draw date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Draw time (HH:MM or HH:MM:SS)
        #[arg(short, long)]
        time: String,
        /// Unique draw identifier
        #[arg(short = 'n', long)]
        draw_number: String,
    },
    /// List the animal catalog
    Catalog,
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let app = AppConfig::load(&cli.config)?;

    let catalog = Arc::new(match &app.catalog_path {
        Some(path) => AnimalCatalog::load(path)?,
        None => AnimalCatalog::builtin(),
    });

    match cli.command {
        Commands::Analyze { window, animal } => {
            let window: TimeWindow = window.parse()?;
            let animal = animal.map(|a| catalog.lookup(&a)).transpose()?;

            let store = open_store(&app).await?;
            let analyzer = PatternAnalyzer::new(store, catalog, app.engine);
            print_json(&analyzer.analyze(window, animal).await)?;
        }
        Commands::Forecast => {
            let store = open_store(&app).await?;
            let forecaster = Forecaster::new(store, catalog, app.engine);
            print_json(&forecaster.generate_forecast().await)?;
        }
        Commands::Record {
            animal,
            date,
            time,
            draw_number,
        } => {
            let animal = catalog.lookup(&animal)?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid date '{}'", date))?;
            let time = parse_time(&time)?;

            let db = Database::new(&app.database.url, app.database.max_connections).await?;
            db.record_outcome(&Outcome::new(draw_number, animal, date, time))
                .await?;
            info!("Recorded {} at {} {}", animal, date, time);
        }
        Commands::Catalog => {
            print_json(&catalog.entries())?;
        }
        Commands::ShowConfig => {
            println!("{}", app.to_toml()?);
        }
    }

    Ok(())
}

async fn open_store(app: &AppConfig) -> Result<Arc<dyn HistoryStore>> {
    let db = Database::new(&app.database.url, app.database.max_connections).await?;
    Ok(Arc::new(db))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| anyhow!("invalid time '{}', expected HH:MM or HH:MM:SS", raw))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use tracing::error;

use volume_tracker::analytics::{IntensityFilter, LeaderKind};
use volume_tracker::app::{build_services, CacheMode};
use volume_tracker::app_config::log::setup_logging;
use volume_tracker::app_config::{env_is_true, AppConfig};
use volume_tracker::error::{AppError, AppResult};
use volume_tracker::market::MarketQuery;
use volume_tracker::services::AppServices;

#[derive(Parser)]
#[command(name = "volume_tracker")]
#[command(about = "Crypto volume tracking and analytics", long_about = None)]
struct Cli {
    /// Use the in-process cache instead of Redis
    #[arg(long, global = true)]
    no_redis: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily volume tracking for one coin
    Tracking {
        coin_id: String,
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
    /// Volume spikes for one coin
    Spikes {
        coin_id: String,
        #[arg(short, long, default_value_t = 30)]
        days: u32,
        /// moderate | high | extreme
        #[arg(short, long, default_value = "moderate")]
        intensity: IntensityFilter,
    },
    /// Calendar heatmap of daily volume
    Heatmap {
        coin_id: String,
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
    /// Volume tracking for up to 10 coins (comma-separated)
    Multi {
        coin_ids: String,
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },
    /// 7d / 30d volume comparison for one coin
    Compare { coin_id: String },
    /// Market overview page with volume comparison
    Market {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        per_page: u32,
    },
    /// Search coins
    Search { query: String },
    /// Trending coins with volume data
    Trending,
    /// Volume change leaders
    Leaders {
        /// gainers | losers
        #[arg(short = 't', long = "type", default_value = "gainers")]
        kind: LeaderKind,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Market-wide volume analytics overview
    Overview,
    /// Hourly volume analysis for up to 10 coins (comma-separated)
    Detailed { coin_ids: String },
    /// Historical market chart
    Historical {
        coin_id: String,
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
    /// Coin detail
    Coin { coin_id: String },
    /// Cache administration
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Health and backend info
    Status,
    /// List keys with remaining TTL
    Keys {
        #[arg(short, long, default_value = "*")]
        pattern: String,
    },
    /// Remove every key
    Flush,
    /// Remove one key
    Delete { key: String },
    /// Set / get / exists / delete round trip
    Test,
}

fn to_json<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

async fn run(services: &AppServices, command: Commands) -> AppResult<serde_json::Value> {
    match command {
        Commands::Tracking { coin_id, days } => {
            to_json(&services.volume_tracking.daily_volume_tracking(&coin_id, days).await?)
        }
        Commands::Spikes {
            coin_id,
            days,
            intensity,
        } => to_json(
            &services
                .volume_tracking
                .volume_spikes(&coin_id, days, intensity)
                .await?,
        ),
        Commands::Heatmap { coin_id, days } => {
            to_json(&services.volume_tracking.volume_heatmap(&coin_id, days).await?)
        }
        Commands::Multi { coin_ids, days } => to_json(
            &services
                .volume_tracking
                .multi_volume_tracking(&coin_ids, days)
                .await?,
        ),
        Commands::Compare { coin_id } => {
            to_json(&services.crypto.volume_comparison(&coin_id).await?)
        }
        Commands::Market { page, per_page } => to_json(
            &services
                .crypto
                .market_overview(MarketQuery { page, per_page })
                .await?,
        ),
        Commands::Search { query } => to_json(&services.crypto.search(&query).await?),
        Commands::Trending => to_json(&services.crypto.trending().await?),
        Commands::Leaders { kind, limit } => {
            to_json(&services.analytics.volume_leaders(kind, limit).await?)
        }
        Commands::Overview => to_json(&services.analytics.volume_analytics_overview().await?),
        Commands::Detailed { coin_ids } => {
            to_json(&services.analytics.detailed_volume_analysis(&coin_ids).await?)
        }
        Commands::Historical { coin_id, days } => {
            to_json(&services.crypto.historical(&coin_id, days).await?)
        }
        Commands::Coin { coin_id } => to_json(&services.crypto.coin_data(&coin_id).await?),
        Commands::Cache { action } => run_cache(services, action).await,
    }
}

async fn run_cache(services: &AppServices, action: CacheAction) -> AppResult<serde_json::Value> {
    let cache = &services.cache;
    match action {
        CacheAction::Status => to_json(&cache.status().await),
        CacheAction::Keys { pattern } => to_json(&cache.keys(&pattern).await?),
        CacheAction::Flush => to_json(&cache.flush_report().await),
        CacheAction::Delete { key } => to_json(&cache.delete_report(&key).await?),
        CacheAction::Test => to_json(&cache.self_test().await),
    }
}

fn print_error(err: &AppError) {
    error!("command failed: {}", err);
    match serde_json::to_string_pretty(&err.to_response()) {
        Ok(body) => eprintln!("{}", body),
        Err(_) => eprintln!("{}", err),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    // 设置日志
    setup_logging()?;

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let mode = if cli.no_redis || !env_is_true("USE_REDIS", true) {
        CacheMode::InMemory
    } else {
        CacheMode::Redis
    };
    let services = build_services(&config, mode).await?;

    match run(&services, cli.command).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            print_error(&err);
            std::process::exit(1);
        }
    }
}

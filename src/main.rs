use anyhow::{Context, Result};
use clap::Parser;
use ipma_alert_bot::{
    scheduler, AssetLocator, Config, HttpFetcher, LogNotifier, Notifier, SystemClock,
    TelegramNotifier, WeatherBot,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// IPMA forecast and warnings bot for Telegram
#[derive(Parser)]
#[command(name = "ipma-alert-bot", version)]
struct Cli {
    /// Run the forecast and warnings cycles once, then exit.
    #[arg(long)]
    once: bool,

    /// Log messages instead of sending them to Telegram.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipma_alert_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::info!("Bot starting");

    let config = Config::from_env().context("invalid configuration")?;

    if !config.images_dir.is_dir() {
        anyhow::bail!("Asset directory '{}' not found", config.images_dir.display());
    }

    let notifier: Arc<dyn Notifier> = match (&config.telegram, cli.dry_run) {
        (Some(credentials), false) => Arc::new(TelegramNotifier::new(credentials)?),
        (None, false) => {
            tracing::warn!("BOT_TOKEN or CHAT_ID not set, messages will only be logged");
            Arc::new(LogNotifier)
        }
        (_, true) => Arc::new(LogNotifier),
    };
    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout)?);
    let assets = AssetLocator::new(
        config.images_dir.clone(),
        config.icon_period,
        Arc::new(SystemClock),
    );
    let bot = Arc::new(WeatherBot::from_config(&config, fetcher, notifier, assets));

    bot.warm_up().await;
    bot.run_forecast_cycle().await;
    tracing::info!("Startup forecast cycle done");
    bot.run_warnings_cycle().await;
    tracing::info!("Startup warnings cycle done");

    if cli.once {
        return Ok(());
    }

    tracing::info!(
        "Warnings every {} min, forecast daily at {}",
        config.check_interval.as_secs() / 60,
        config.forecast_time.format("%H:%M")
    );
    scheduler::run(bot, config.check_interval, config.forecast_time).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

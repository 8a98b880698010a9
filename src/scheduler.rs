//! Timers driving the two cycles until Ctrl-C.

use crate::service::WeatherBot;
use chrono::{Local, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Next occurrence of `at`, strictly after `now`.
pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let target = now.date().and_time(at);
    if target <= now {
        target + chrono::Duration::days(1)
    } else {
        target
    }
}

/// Target following a run scheduled for `previous`. Never earlier than a day
/// after `previous`, even if the clock stepped back past it.
pub fn next_target(previous: NaiveDateTime, now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    next_occurrence(now.max(previous), at)
}

/// Wait until `target`; zero once it has passed.
pub fn remaining(now: NaiveDateTime, target: NaiveDateTime) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

async fn warnings_loop(bot: Arc<WeatherBot>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        bot.run_warnings_cycle().await;
    }
}

async fn forecast_loop(bot: Arc<WeatherBot>, at: NaiveTime) {
    let mut target = next_occurrence(Local::now().naive_local(), at);
    loop {
        // Re-read the clock after each sleep: a backward step leaves us early.
        loop {
            let wait = remaining(Local::now().naive_local(), target);
            if wait.is_zero() {
                break;
            }
            tracing::info!("Next forecast at {} (in {} min)", target, wait.as_secs() / 60);
            sleep(wait).await;
        }
        bot.run_forecast_cycle().await;
        target = next_target(target, Local::now().naive_local(), at);
    }
}

/// Runs the warnings cycle every `check_interval` and the forecast cycle daily at
/// `forecast_time` (local), until the process receives Ctrl-C.
pub async fn run(bot: Arc<WeatherBot>, check_interval: Duration, forecast_time: NaiveTime) {
    let warnings = tokio::spawn(warnings_loop(bot.clone(), check_interval));
    let forecast = tokio::spawn(forecast_loop(bot, forecast_time));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
    warnings.abort();
    forecast.abort();
}

use crate::assets::AssetLocator;
use crate::config::Config;
use crate::constants::TOMORROW_INDEX;
use crate::dispatch::{dispatch, DispatchOutcome, Notifier};
use crate::fetch::{fetch_as, JsonFetcher};
use crate::forecast::build_forecast_notification;
use crate::models::{decode_records, DataEnvelope, ForecastRecord, WarningRecord};
use crate::reference::{ReferenceData, ReferenceSources};
use crate::warnings::{build_new_warning_notifications, is_relevant, SentWarnings};
use std::sync::Arc;

/// Upstream feeds polled by the two cycles
#[derive(Debug, Clone, Default)]
pub struct Feeds {
    pub forecast_url: Option<String>,
    pub warnings_url: Option<String>,
}

/// Owns every collaborator and cache used by the forecast and warnings cycles.
pub struct WeatherBot {
    fetcher: Arc<dyn JsonFetcher>,
    notifier: Arc<dyn Notifier>,
    reference: ReferenceData,
    assets: AssetLocator,
    sent: SentWarnings,
    feeds: Feeds,
    area_id: String,
}

impl WeatherBot {
    pub fn new(
        fetcher: Arc<dyn JsonFetcher>,
        notifier: Arc<dyn Notifier>,
        sources: ReferenceSources,
        assets: AssetLocator,
        feeds: Feeds,
        area_id: impl Into<String>,
    ) -> Self {
        Self {
            reference: ReferenceData::new(fetcher.clone(), sources),
            fetcher,
            notifier,
            assets,
            sent: SentWarnings::new(),
            feeds,
            area_id: area_id.into(),
        }
    }

    /// Wires a bot from the loaded configuration.
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn JsonFetcher>,
        notifier: Arc<dyn Notifier>,
        assets: AssetLocator,
    ) -> Self {
        let sources = ReferenceSources {
            districts_url: config.districts_url.clone(),
            weather_types_url: config.weather_types_url.clone(),
            wind_types_url: config.wind_types_url.clone(),
        };
        let feeds = Feeds {
            forecast_url: config.forecast_url(),
            warnings_url: config.warnings_url.clone(),
        };
        Self::new(fetcher, notifier, sources, assets, feeds, config.area_id.clone())
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn sent_warnings(&self) -> &SentWarnings {
        &self.sent
    }

    /// Resolves and caches the monitored area's display name.
    pub async fn warm_up(&self) {
        let name = self.reference.resolve_location_name(&self.area_id).await;
        tracing::info!("Monitoring area {} ({})", self.area_id, name.as_str());
    }

    /// Fetches tomorrow's forecast and sends it.
    pub async fn run_forecast_cycle(&self) {
        tracing::info!("Processing daily forecast...");

        let Some(url) = self.feeds.forecast_url.as_deref() else {
            tracing::warn!("Forecast feed not configured, skipping");
            return;
        };

        let envelope = match fetch_as::<DataEnvelope>(self.fetcher.as_ref(), url).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("Failed to fetch forecast: {}", e);
                return;
            }
        };

        let Some(entry) = envelope.data.into_iter().nth(TOMORROW_INDEX) else {
            tracing::error!("Forecast feed has no entry for tomorrow");
            return;
        };
        let record: ForecastRecord = match serde_json::from_value(entry) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Malformed forecast entry: {}", e);
                return;
            }
        };

        let notification =
            build_forecast_notification(&record, &self.area_id, &self.reference, &self.assets)
                .await;
        let outcome = dispatch(self.notifier.as_ref(), &notification).await;
        match (&notification.asset, outcome) {
            (Some(asset), DispatchOutcome::Rich) => {
                tracing::info!("Forecast sent with image: {}", asset.path.display())
            }
            (_, DispatchOutcome::Failed) => tracing::error!("Forecast was not delivered"),
            (_, outcome) => tracing::info!("Forecast sent ({:?})", outcome),
        }
    }

    /// Fetches active warnings and sends the ones not delivered before.
    pub async fn run_warnings_cycle(&self) {
        tracing::info!("Checking warnings...");

        let Some(url) = self.feeds.warnings_url.as_deref() else {
            return;
        };

        let values = match fetch_as::<Vec<serde_json::Value>>(self.fetcher.as_ref(), url).await {
            Ok(values) => values,
            Err(e) => {
                tracing::error!("Failed to fetch warnings: {}", e);
                return;
            }
        };
        let records: Vec<WarningRecord> = decode_records(values, "warning");

        if !records.iter().any(|r| is_relevant(r, &self.area_id)) {
            tracing::debug!("No active warnings for {}", self.area_id);
            return;
        }

        let location = self
            .reference
            .resolve_location_name(&self.area_id)
            .await
            .into_inner();
        let notifications = build_new_warning_notifications(
            &records,
            &self.area_id,
            &location,
            &self.assets,
            &self.sent,
        );

        for notification in &notifications {
            let outcome = dispatch(self.notifier.as_ref(), notification).await;
            tracing::info!("Warning sent: {} ({:?})", notification.subject, outcome);
        }
    }
}

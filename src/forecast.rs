use crate::assets::AssetLocator;
use crate::formatters::{format_forecast, pretty_date, ForecastText};
use crate::models::{ForecastRecord, Notification};
use crate::reference::{expand_direction, unknown_weather_description, ReferenceData};

/// Builds the daily forecast message for one feed entry.
///
/// Every template field is always filled; a missing or malformed value shows up
/// as its raw text. Only the asset lookup decides between rich and plain delivery.
pub async fn build_forecast_notification(
    record: &ForecastRecord,
    area_id: &str,
    reference: &ReferenceData,
    assets: &AssetLocator,
) -> Notification {
    let weather_code = record.weather_type.as_int();
    let weather = match weather_code {
        Some(code) => reference.resolve_weather_description(code).await.into_inner(),
        None => {
            tracing::warn!("Forecast has non-numeric weather type {}", record.weather_type);
            unknown_weather_description(&record.weather_type)
        }
    };
    let wind = reference
        .resolve_wind_description(&record.wind_class)
        .await
        .into_inner();
    let location = reference.resolve_location_name(area_id).await.into_inner();
    let date = pretty_date(&record.forecast_date);
    let asset = weather_code.and_then(|code| assets.locate_weather_asset(code));

    let text = format_forecast(&ForecastText {
        date: &date,
        location: &location,
        weather: &weather,
        t_min: &record.t_min.to_string(),
        t_max: &record.t_max.to_string(),
        precipitation: &record.precipita_prob.to_string(),
        wind_direction: expand_direction(&record.wind_dir),
        wind: &wind,
    });

    Notification {
        subject: format!("forecast {}", record.forecast_date),
        text,
        asset,
    }
}

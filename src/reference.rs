//! Reference data: area names, weather-type descriptions and wind classes.
//!
//! Each table is fetched at most once per `ReferenceData` instance and then
//! kept for its lifetime, including when the fetch failed and a fallback was
//! cached instead. None of the resolvers return errors; they degrade to a
//! deterministic text and say so through [`Resolution`].

use crate::fetch::{fetch_as, JsonFetcher};
use crate::models::{
    decode_records, AreaRecord, DataEnvelope, Scalar, WeatherTypeRecord, WindClassRecord,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Built-in weather-type table used when the remote one is unavailable.
const WEATHER_TYPES_FALLBACK: &[(i64, &str)] = &[
    (-99, "---"),
    (0, "Sem informação"),
    (1, "Céu limpo"),
    (2, "Céu pouco nublado"),
    (3, "Céu parcialmente nublado"),
    (4, "Céu muito nublado ou encoberto"),
    (5, "Céu nublado por nuvens altas"),
    (6, "Aguaceiros/chuva"),
    (7, "Aguaceiros/chuva fracos"),
    (8, "Aguaceiros/chuva fortes"),
    (9, "Chuva/aguaceiros"),
    (10, "Chuva fraca ou chuvisco"),
    (11, "Chuva/aguaceiros forte"),
    (12, "Períodos de chuva"),
    (13, "Períodos de chuva fraca"),
    (14, "Períodos de chuva forte"),
    (15, "Chuvisco"),
    (16, "Neblina"),
    (17, "Nevoeiro ou nuvens baixas"),
    (18, "Neve"),
    (19, "Trovoada"),
    (20, "Aguaceiros e possibilidade de trovoada"),
    (21, "Granizo"),
    (22, "Geada"),
    (23, "Chuva e possibilidade de trovoada"),
    (24, "Nebulosidade convectiva"),
    (25, "Céu com períodos de muito nublado"),
    (26, "Nevoeiro"),
    (27, "Céu nublado"),
    (28, "Aguaceiros de neve"),
    (29, "Chuva e Neve"),
    (30, "Chuva e Neve"),
];

/// Text for a weather-type code that no table knows about.
pub fn unknown_weather_description(code: impl std::fmt::Display) -> String {
    format!("Desconhecido ({})", code)
}

/// Expands a compass abbreviation to its Portuguese name; unknown input is returned as is.
pub fn expand_direction(abbr: &str) -> &str {
    match abbr {
        "N" => "Norte",
        "NE" => "Nordeste",
        "E" => "Este",
        "SE" => "Sudeste",
        "S" => "Sul",
        "SW" => "Sudoeste",
        "W" => "Oeste",
        "NW" => "Noroeste",
        other => other,
    }
}

/// Outcome of a lookup: either the upstream value or a local substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Authoritative(String),
    Fallback(String),
}

impl Resolution {
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::Authoritative(s) | Resolution::Fallback(s) => s,
        }
    }

    pub fn into_inner(self) -> String {
        match self {
            Resolution::Authoritative(s) | Resolution::Fallback(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }
}

/// Remote endpoints for each reference table. `None` means "use the fallback".
#[derive(Debug, Clone, Default)]
pub struct ReferenceSources {
    pub districts_url: Option<String>,
    pub weather_types_url: Option<String>,
    pub wind_types_url: Option<String>,
}

#[derive(Debug)]
struct WeatherTable {
    descriptions: HashMap<i64, String>,
    remote: bool,
}

/// Lazily populated reference tables, shared by both cycles.
pub struct ReferenceData {
    fetcher: Arc<dyn JsonFetcher>,
    sources: ReferenceSources,
    // `None` when the area table could not be loaded.
    areas: OnceCell<Option<HashMap<String, String>>>,
    weather_types: OnceCell<WeatherTable>,
    wind_types: OnceCell<HashMap<i64, String>>,
}

impl ReferenceData {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, sources: ReferenceSources) -> Self {
        Self {
            fetcher,
            sources,
            areas: OnceCell::new(),
            weather_types: OnceCell::new(),
            wind_types: OnceCell::new(),
        }
    }

    /// Display name for a warning area, or the id itself when it can't be resolved.
    pub async fn resolve_location_name(&self, area_id: &str) -> Resolution {
        let areas = self.areas.get_or_init(|| self.load_areas()).await;
        match areas.as_ref().and_then(|table| table.get(area_id)) {
            Some(name) => Resolution::Authoritative(name.clone()),
            None => {
                tracing::debug!("Using area id as location name for {}", area_id);
                Resolution::Fallback(area_id.to_string())
            }
        }
    }

    /// Portuguese description of a weather-type code.
    pub async fn resolve_weather_description(&self, code: i64) -> Resolution {
        let table = self
            .weather_types
            .get_or_init(|| self.load_weather_types())
            .await;
        match table.descriptions.get(&code) {
            Some(desc) if table.remote => Resolution::Authoritative(desc.clone()),
            Some(desc) => Resolution::Fallback(desc.clone()),
            None => Resolution::Fallback(unknown_weather_description(code)),
        }
    }

    /// Portuguese description of a wind-speed class; falls back to the raw code text.
    pub async fn resolve_wind_description(&self, raw_code: &Scalar) -> Resolution {
        let Some(code) = raw_code.as_int() else {
            tracing::debug!("Wind class {:?} is not numeric", raw_code);
            return Resolution::Fallback(raw_code.to_string());
        };

        let classes = self.wind_types.get_or_init(|| self.load_wind_types()).await;
        match classes.get(&code) {
            Some(desc) => Resolution::Authoritative(desc.clone()),
            None => Resolution::Fallback(raw_code.to_string()),
        }
    }

    async fn load_areas(&self) -> Option<HashMap<String, String>> {
        let url = self.sources.districts_url.as_deref()?;

        let envelope = match fetch_as::<DataEnvelope>(self.fetcher.as_ref(), url).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("Failed to load area names from {}: {}", url, e);
                return None;
            }
        };

        let mut table = HashMap::new();
        for record in decode_records::<AreaRecord>(envelope.data, "area") {
            if let (Some(id), Some(name)) = (record.area_id, record.local) {
                // First row for an id wins.
                table.entry(id).or_insert(name);
            }
        }
        tracing::info!("Loaded {} area names", table.len());
        Some(table)
    }

    async fn load_weather_types(&self) -> WeatherTable {
        if let Some(url) = self.sources.weather_types_url.as_deref() {
            match fetch_as::<DataEnvelope>(self.fetcher.as_ref(), url).await {
                Ok(envelope) => {
                    let descriptions: HashMap<i64, String> =
                        decode_records::<WeatherTypeRecord>(envelope.data, "weather type")
                            .into_iter()
                            .filter_map(|record| {
                                let code = record.id.as_int()?;
                                let desc = record
                                    .description
                                    .filter(|d| !d.is_empty())
                                    .unwrap_or_else(|| unknown_weather_description(code));
                                Some((code, desc))
                            })
                            .collect();
                    if !descriptions.is_empty() {
                        tracing::info!("Loaded {} weather types", descriptions.len());
                        return WeatherTable {
                            descriptions,
                            remote: true,
                        };
                    }
                    tracing::warn!("Weather type table at {} is empty, using built-in", url);
                }
                Err(e) => tracing::error!("Failed to load weather types from {}: {}", url, e),
            }
        }

        WeatherTable {
            descriptions: WEATHER_TYPES_FALLBACK
                .iter()
                .map(|(code, desc)| (*code, desc.to_string()))
                .collect(),
            remote: false,
        }
    }

    async fn load_wind_types(&self) -> HashMap<i64, String> {
        let Some(url) = self.sources.wind_types_url.as_deref() else {
            return HashMap::new();
        };

        let envelope = match fetch_as::<DataEnvelope>(self.fetcher.as_ref(), url).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("Failed to load wind classes from {}: {}", url, e);
                return HashMap::new();
            }
        };

        let mut classes = HashMap::new();
        for record in decode_records::<WindClassRecord>(envelope.data, "wind class") {
            if record.class == Scalar::Missing {
                continue;
            }
            let Some(code) = record.class.as_int() else {
                tracing::warn!("Skipping wind class with non-numeric id {}", record.class);
                continue;
            };
            let desc = record
                .daily_description
                .filter(|d| !d.is_empty())
                .or(record.description.filter(|d| !d.is_empty()))
                .unwrap_or_else(|| record.class.to_string());
            classes.insert(code, desc);
        }
        tracing::info!("Loaded {} wind classes", classes.len());
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::MockJsonFetcher;
    use reqwest::StatusCode;
    use serde_json::json;

    fn reference(fetcher: MockJsonFetcher, sources: ReferenceSources) -> ReferenceData {
        ReferenceData::new(Arc::new(fetcher), sources)
    }

    fn districts() -> ReferenceSources {
        ReferenceSources {
            districts_url: Some("http://ipma/districts".into()),
            ..Default::default()
        }
    }

    fn server_error() -> FetchError {
        FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[tokio::test]
    async fn test_location_name_fetched_once() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher
            .expect_fetch_json()
            .withf(|url| url.ends_with("/districts"))
            .times(1)
            .returning(|_| {
                Ok(json!({ "data": [
                    { "idAreaAviso": "BRG", "local": "Braga" },
                    { "idAreaAviso": "AVR", "local": "Aveiro" },
                    { "idAreaAviso": "AVR", "local": "Aveiro (dup)" }
                ]}))
            });
        let refs = reference(fetcher, districts());

        let first = refs.resolve_location_name("AVR").await;
        let second = refs.resolve_location_name("AVR").await;

        assert_eq!(first, Resolution::Authoritative("Aveiro".into()));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_location_name_failure_is_cached_as_fallback() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher
            .expect_fetch_json()
            .times(1)
            .returning(|_| Err(server_error()));
        let refs = reference(fetcher, districts());

        assert_eq!(
            refs.resolve_location_name("AVR").await,
            Resolution::Fallback("AVR".into())
        );
        assert_eq!(
            refs.resolve_location_name("AVR").await,
            Resolution::Fallback("AVR".into())
        );
    }

    #[tokio::test]
    async fn test_location_name_unknown_id_falls_back() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher
            .expect_fetch_json()
            .times(1)
            .returning(|_| Ok(json!({ "data": [{ "idAreaAviso": "BRG", "local": "Braga" }] })));
        let refs = reference(fetcher, districts());

        let name = refs.resolve_location_name("AVR").await;
        assert!(name.is_fallback());
        assert_eq!(name.as_str(), "AVR");
    }

    #[tokio::test]
    async fn test_location_name_unconfigured_never_fetches() {
        let refs = reference(MockJsonFetcher::new(), ReferenceSources::default());
        assert_eq!(refs.resolve_location_name("AVR").await.into_inner(), "AVR");
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_table() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher
            .expect_fetch_json()
            .times(1)
            .returning(|_| Ok(json!({ "data": [{ "idAreaAviso": "AVR", "local": "Aveiro" }] })));
        let refs = reference(fetcher, districts());

        let (a, b) = tokio::join!(
            refs.resolve_location_name("AVR"),
            refs.resolve_location_name("AVR")
        );
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Aveiro");
    }

    #[tokio::test]
    async fn test_weather_static_table_covers_supported_range() {
        let refs = reference(MockJsonFetcher::new(), ReferenceSources::default());
        for code in 0..=30 {
            let desc = refs.resolve_weather_description(code).await;
            assert!(desc.is_fallback());
            assert!(!desc.as_str().is_empty(), "code {} has no description", code);
        }
        assert_eq!(refs.resolve_weather_description(-99).await.as_str(), "---");
    }

    #[tokio::test]
    async fn test_weather_unknown_code_is_synthesized() {
        let refs = reference(MockJsonFetcher::new(), ReferenceSources::default());
        assert_eq!(
            refs.resolve_weather_description(77).await,
            Resolution::Fallback("Desconhecido (77)".into())
        );
    }

    #[tokio::test]
    async fn test_weather_remote_table_is_authoritative() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher.expect_fetch_json().times(1).returning(|_| {
            Ok(json!({ "data": [
                { "idWeatherType": 6, "descWeatherTypePT": "Aguaceiros" },
                { "idWeatherType": "9" }
            ]}))
        });
        let refs = reference(
            fetcher,
            ReferenceSources {
                weather_types_url: Some("http://ipma/weather-types".into()),
                ..Default::default()
            },
        );

        assert_eq!(
            refs.resolve_weather_description(6).await,
            Resolution::Authoritative("Aguaceiros".into())
        );
        assert_eq!(
            refs.resolve_weather_description(9).await.as_str(),
            "Desconhecido (9)"
        );
        // A code missing from the remote table is not looked up in the built-in one.
        assert_eq!(
            refs.resolve_weather_description(1).await.as_str(),
            "Desconhecido (1)"
        );
    }

    #[tokio::test]
    async fn test_weather_empty_or_failed_remote_uses_builtin() {
        for response in [Ok(json!({ "data": [] })), Err(server_error())] {
            let mut fetcher = MockJsonFetcher::new();
            let mut response = Some(response);
            fetcher
                .expect_fetch_json()
                .times(1)
                .returning(move |_| response.take().unwrap_or_else(|| Err(server_error())));
            let refs = reference(
                fetcher,
                ReferenceSources {
                    weather_types_url: Some("http://ipma/weather-types".into()),
                    ..Default::default()
                },
            );

            assert_eq!(
                refs.resolve_weather_description(1).await,
                Resolution::Fallback("Céu limpo".into())
            );
        }
    }

    fn wind_sources() -> ReferenceSources {
        ReferenceSources {
            wind_types_url: Some("http://ipma/wind".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_wind_description_field_preference() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher.expect_fetch_json().times(1).returning(|_| {
            Ok(json!({ "data": [
                { "classWindSpeed": "1", "descClassWindSpeedDailyPT": "Fraco", "descClassWindSpeedPT": "fraco (<15 km/h)" },
                { "classWindSpeed": "2", "descClassWindSpeedPT": "Moderado" },
                { "classWindSpeed": 3 },
                { "descClassWindSpeedPT": "sem classe" }
            ]}))
        });
        let refs = reference(fetcher, wind_sources());

        assert_eq!(
            refs.resolve_wind_description(&Scalar::from(1)).await,
            Resolution::Authoritative("Fraco".into())
        );
        assert_eq!(
            refs.resolve_wind_description(&Scalar::from(" 2 ")).await.as_str(),
            "Moderado"
        );
        assert_eq!(refs.resolve_wind_description(&Scalar::from(3)).await.as_str(), "3");
        assert_eq!(
            refs.resolve_wind_description(&Scalar::from(9)).await,
            Resolution::Fallback("9".into())
        );
    }

    #[tokio::test]
    async fn test_wind_non_numeric_code_passes_through_without_fetch() {
        let refs = reference(MockJsonFetcher::new(), wind_sources());
        assert_eq!(
            refs.resolve_wind_description(&Scalar::from("forte")).await,
            Resolution::Fallback("forte".into())
        );
    }

    #[tokio::test]
    async fn test_wind_fetch_failure_is_not_retried() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher
            .expect_fetch_json()
            .times(1)
            .returning(|_| Err(server_error()));
        let refs = reference(fetcher, wind_sources());

        assert_eq!(refs.resolve_wind_description(&Scalar::from(2)).await.as_str(), "2");
        assert_eq!(refs.resolve_wind_description(&Scalar::from(4)).await.as_str(), "4");
    }

    #[test]
    fn test_expand_direction() {
        assert_eq!(expand_direction("NW"), "Noroeste");
        assert_eq!(expand_direction("E"), "Este");
        assert_eq!(expand_direction("NNE"), "NNE");
        assert_eq!(expand_direction(""), "");
    }
}

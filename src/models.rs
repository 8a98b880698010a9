use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Loose upstream values
// ============================================================================

/// A field IPMA sends either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
    #[default]
    Missing,
}

impl Scalar {
    /// Integer view of the value, if it has one. Strings are trimmed first.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n.as_i64(),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Missing => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Missing => f.write_str("-"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Reads any JSON value as text: `null` becomes empty, numbers and booleans
/// keep their JSON spelling.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Envelope used by every IPMA table endpoint: `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// Decodes records one by one, skipping (and logging) the ones that don't fit.
pub fn decode_records<T: DeserializeOwned>(values: Vec<serde_json::Value>, what: &str) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed {} record #{}: {}", what, i, e);
                None
            }
        })
        .collect()
}

// ============================================================================
// IPMA feed models
// ============================================================================

/// One daily entry from the city forecast feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastRecord {
    #[serde(rename = "forecastDate", default, deserialize_with = "lenient_string")]
    pub forecast_date: String,
    #[serde(rename = "tMin", default)]
    pub t_min: Scalar,
    #[serde(rename = "tMax", default)]
    pub t_max: Scalar,
    #[serde(rename = "precipitaProb", default)]
    pub precipita_prob: Scalar,
    #[serde(rename = "idWeatherType", default)]
    pub weather_type: Scalar,
    #[serde(rename = "classWindSpeed", default)]
    pub wind_class: Scalar,
    #[serde(rename = "predWindDir", default, deserialize_with = "lenient_string")]
    pub wind_dir: String,
}

/// One entry from the warnings feed (a bare JSON array)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarningRecord {
    #[serde(rename = "idAreaAviso", default, deserialize_with = "lenient_string")]
    pub area_id: String,
    #[serde(rename = "awarenessTypeName", default, deserialize_with = "lenient_string")]
    pub type_name: String,
    #[serde(rename = "awarenessLevelID", default, deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(rename = "startTime", default, deserialize_with = "lenient_string")]
    pub start_time: String,
    #[serde(rename = "endTime", default, deserialize_with = "lenient_string")]
    pub end_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
}

/// Row of the district / warning-area table
#[derive(Debug, Deserialize)]
pub struct AreaRecord {
    #[serde(rename = "idAreaAviso")]
    pub area_id: Option<String>,
    pub local: Option<String>,
}

/// Row of the weather-type table
#[derive(Debug, Deserialize)]
pub struct WeatherTypeRecord {
    #[serde(rename = "idWeatherType")]
    pub id: Scalar,
    #[serde(rename = "descWeatherTypePT")]
    pub description: Option<String>,
}

/// Row of the wind-speed class table
#[derive(Debug, Deserialize)]
pub struct WindClassRecord {
    #[serde(rename = "classWindSpeed", default)]
    pub class: Scalar,
    #[serde(rename = "descClassWindSpeedDailyPT")]
    pub daily_description: Option<String>,
    #[serde(rename = "descClassWindSpeedPT")]
    pub description: Option<String>,
}

// ============================================================================
// Outbound notifications
// ============================================================================

/// How an asset must be delivered to the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// Animated sticker; the provider accepts no caption
    Animated,
    /// Static photo with caption
    Static,
}

/// A local asset file plus the delivery kind implied by its extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub path: PathBuf,
    pub kind: DeliveryKind,
}

impl AssetReference {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = if has_extension(&path, "tgs") {
            DeliveryKind::Animated
        } else {
            DeliveryKind::Static
        };
        Self { path, kind }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// A message ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short label used in logs (forecast date or warning identity)
    pub subject: String,
    pub text: String,
    pub asset: Option<AssetReference>,
}

//! Local sticker and icon lookup.

use crate::config::IconPeriod;
use crate::models::AssetReference;
use chrono::{NaiveDateTime, Timelike};
use std::path::PathBuf;
use std::sync::Arc;

/// Candidate extensions, in priority order: animated sticker first, then static image.
const EXTENSIONS: [&str; 2] = ["tgs", "png"];

/// Dedicated stickers for IPMA warning types
const WARNING_ASSETS: &[(&str, &str)] = &[
    ("Agitação Marítima", "coastalevent.tgs"),
    ("Nevoeiro", "fog.tgs"),
    ("Tempo Quente", "high-temperature.tgs"),
    ("Tempo Frio", "low-temperature.tgs"),
    ("Precipitação", "rain.tgs"),
    ("Neve", "snow-ice.tgs"),
    ("Trovoada", "thunderstorm.tgs"),
    ("Vento", "wind.tgs"),
];

/// Wall-clock source, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Icon file stem for a weather-type code, e.g. `w_ic_d_03`.
pub fn weather_asset_base(code: i64, night: bool) -> String {
    let period = if night { "n" } else { "d" };
    format!("w_ic_{}_{:02}", period, code)
}

/// Resolves weather and warning codes to files in the asset directory.
pub struct AssetLocator {
    dir: PathBuf,
    period: IconPeriod,
    clock: Arc<dyn Clock>,
}

impl AssetLocator {
    pub fn new(dir: impl Into<PathBuf>, period: IconPeriod, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            period,
            clock,
        }
    }

    fn is_night(&self) -> bool {
        match self.period {
            IconPeriod::Day => false,
            IconPeriod::Auto => {
                let hour = self.clock.now().hour();
                !(7..20).contains(&hour)
            }
        }
    }

    /// First existing icon for `code`, or `None` when there is nothing on disk.
    pub fn locate_weather_asset(&self, code: i64) -> Option<AssetReference> {
        let variants: &[bool] = if self.is_night() { &[true, false] } else { &[false] };

        for &night in variants {
            let base = weather_asset_base(code, night);
            for ext in EXTENSIONS {
                let path = self.dir.join(format!("{}.{}", base, ext));
                if path.exists() {
                    return Some(AssetReference::from_path(path));
                }
            }
        }

        tracing::debug!("No icon found for weather type {}", code);
        None
    }

    /// Dedicated sticker for a warning type, if the type has one and it exists on disk.
    pub fn locate_warning_asset(&self, type_name: &str) -> Option<AssetReference> {
        let (_, file) = WARNING_ASSETS.iter().find(|(name, _)| *name == type_name)?;
        let path = self.dir.join(file);
        if path.exists() {
            Some(AssetReference::from_path(path))
        } else {
            tracing::warn!("Sticker {} for warning type {} is missing", file, type_name);
            None
        }
    }
}

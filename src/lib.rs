//! IPMA weather bot
//!
//! Polls the IPMA forecast and warning feeds, resolves their codes to
//! Portuguese text and delivers deduplicated notifications to one Telegram chat.

pub mod assets;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod formatters;
pub mod models;
pub mod reference;
pub mod scheduler;
pub mod service;
pub mod warnings;

pub use assets::{AssetLocator, Clock, SystemClock};
pub use config::Config;
pub use dispatch::{dispatch, DispatchOutcome, LogNotifier, Notifier, TelegramNotifier};
pub use fetch::{HttpFetcher, JsonFetcher};
pub use reference::{ReferenceData, ReferenceSources, Resolution};
pub use service::{Feeds, WeatherBot};
pub use warnings::{SentWarnings, WarningIdentity};

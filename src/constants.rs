/// User agent string for HTTP requests
pub const USER_AGENT: &str = "ipma-alert-bot/0.1.0";

/// Telegram Bot API base URL
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Default timeout for upstream and reference-data fetches, in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Timeout for plain text sends, in seconds
pub const TEXT_SEND_TIMEOUT_SECS: u64 = 10;

/// Timeout for photo and sticker uploads, in seconds
pub const MEDIA_SEND_TIMEOUT_SECS: u64 = 30;

/// Attribution link appended to forecast messages
pub const FORECAST_SOURCE_LINK: &str =
    "[ipma.pt](https://www.ipma.pt/pt/otempo/prev.localidade.hora/)";

/// Attribution link appended to warning messages
pub const WARNING_SOURCE_LINK: &str = "[ipma.pt](https://www.ipma.pt/pt/otempo/prev-sam/)";

/// Date format used by the forecast feed
pub const FORECAST_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format shown in forecast messages
pub const FORECAST_DISPLAY_FORMAT: &str = "%d-%m-%Y";

/// Timestamp format used by the warnings feed
pub const WARNING_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Timestamp format shown in warning messages
pub const WARNING_DISPLAY_FORMAT: &str = "%H:%M %d-%m-%Y";

/// Index of tomorrow's entry in the forecast feed
pub const TOMORROW_INDEX: usize = 1;

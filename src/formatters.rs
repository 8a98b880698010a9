use crate::constants::{
    FORECAST_DATE_FORMAT, FORECAST_DISPLAY_FORMAT, FORECAST_SOURCE_LINK, WARNING_DISPLAY_FORMAT,
    WARNING_SOURCE_LINK, WARNING_TIME_FORMAT,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Fields of a forecast message, already resolved to display text
#[derive(Debug)]
pub struct ForecastText<'a> {
    pub date: &'a str,
    pub location: &'a str,
    pub weather: &'a str,
    pub t_min: &'a str,
    pub t_max: &'a str,
    pub precipitation: &'a str,
    pub wind_direction: &'a str,
    pub wind: &'a str,
}

/// Fields of a warning message, already resolved to display text
#[derive(Debug)]
pub struct WarningText<'a> {
    pub location: &'a str,
    pub type_name: &'a str,
    pub severity: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub body: &'a str,
}

/// Formats tomorrow's forecast as a Telegram Markdown message
pub fn format_forecast(f: &ForecastText<'_>) -> String {
    format!(
        "👀 *Previsão do tempo para amanhã:*\n\
         📅 *{}*\n\
         \n\
         📍 Região: *{}*\n\
         🌤️ {}\n\
         🌡️ Min: {}ºC | Max: {}ºC\n\
         ☔ Previsão de chuva: {}%\n\
         💨 Vento de {} - {}\n\
         \n\
         🌍 Fonte: {}",
        f.date,
        f.location,
        f.weather,
        f.t_min,
        f.t_max,
        f.precipitation,
        f.wind_direction,
        f.wind,
        FORECAST_SOURCE_LINK
    )
}

/// Formats a weather warning as a Telegram Markdown message
pub fn format_warning(w: &WarningText<'_>) -> String {
    format!(
        "⚠️ *AVISO IPMA:*\n\
         \n\
         📍 Região: *{}*\n\
         🔔 {}\n\
         {}\n\
         🕒 {} até {}\n\
         \n\
         📝 {}\n\
         \n\
         🌍 Fonte: {}",
        w.location, w.type_name, w.severity, w.start, w.end, w.body, WARNING_SOURCE_LINK
    )
}

/// `2024-03-05` becomes `05-03-2024`; anything unparsable is returned unchanged.
pub fn pretty_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, FORECAST_DATE_FORMAT) {
        Ok(date) => date.format(FORECAST_DISPLAY_FORMAT).to_string(),
        Err(_) => {
            tracing::debug!("Unparsable forecast date {:?}", raw);
            raw.to_string()
        }
    }
}

/// `2024-01-01T10:00:00` becomes `10:00 01-01-2024`; otherwise the `T` separator is replaced.
pub fn pretty_timestamp(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, WARNING_TIME_FORMAT) {
        Ok(ts) => ts.format(WARNING_DISPLAY_FORMAT).to_string(),
        Err(_) => raw.replace('T', " "),
    }
}

/// Labelled, coloured severity for an IPMA awareness level
pub fn severity_label(level: &str) -> String {
    match level.to_uppercase().as_str() {
        "YELLOW" => "🟡 Alerta Amarelo".to_string(),
        "ORANGE" => "🟠 Alerta Laranja".to_string(),
        "RED" => "🔴 Alerta Vermelho".to_string(),
        "GREEN" => "🟢 Alerta Verde".to_string(),
        _ => capitalize(level),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_date() {
        assert_eq!(pretty_date("2024-03-05"), "05-03-2024");
        assert_eq!(pretty_date("05/03/2024"), "05/03/2024");
        assert_eq!(pretty_date(""), "");
    }

    #[test]
    fn test_pretty_timestamp() {
        assert_eq!(pretty_timestamp("2024-01-01T10:00:00"), "10:00 01-01-2024");
        assert_eq!(pretty_timestamp("2024-01-01T10:00"), "2024-01-01 10:00");
        assert_eq!(pretty_timestamp("amanhã"), "amanhã");
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(severity_label("yellow"), "🟡 Alerta Amarelo");
        assert_eq!(severity_label("Orange"), "🟠 Alerta Laranja");
        assert_eq!(severity_label("RED"), "🔴 Alerta Vermelho");
        assert_eq!(severity_label("green"), "🟢 Alerta Verde");
    }

    #[test]
    fn test_unknown_severity_is_capitalized() {
        assert_eq!(severity_label("pURPLE"), "Purple");
        assert_eq!(severity_label(""), "");
    }

    #[test]
    fn test_forecast_template_contains_every_field() {
        let text = format_forecast(&ForecastText {
            date: "05-03-2024",
            location: "Aveiro",
            weather: "Aguaceiros/chuva",
            t_min: "5",
            t_max: "14",
            precipitation: "80",
            wind_direction: "Noroeste",
            wind: "Moderado",
        });

        assert!(text.starts_with("👀 *Previsão do tempo para amanhã:*\n📅 *05-03-2024*\n\n"));
        assert!(text.contains("📍 Região: *Aveiro*\n"));
        assert!(text.contains("🌡️ Min: 5ºC | Max: 14ºC\n"));
        assert!(text.contains("☔ Previsão de chuva: 80%\n"));
        assert!(text.contains("💨 Vento de Noroeste - Moderado\n"));
        assert!(text.ends_with(FORECAST_SOURCE_LINK));
    }

    #[test]
    fn test_warning_template_layout() {
        let text = format_warning(&WarningText {
            location: "Aveiro",
            type_name: "Vento",
            severity: "🟠 Alerta Laranja",
            start: "10:00 01-01-2024",
            end: "18:00 01-01-2024",
            body: "Vento forte",
        });

        assert!(text.contains("🔔 Vento\n🟠 Alerta Laranja\n"));
        assert!(text.contains("🕒 10:00 01-01-2024 até 18:00 01-01-2024\n"));
        assert!(text.contains("📝 Vento forte\n"));
    }
}

//! Weather advice
//!
//! Daily forecast summaries, gardening tips and the short advice attached
//! to watering logs.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    is_rain_condition, is_wet_condition, DailyForecast, ForecastEntry, GardeningTip, TipKind, WeatherSnapshot,
};

/// Number of days shown in a daily forecast
pub const FORECAST_DAYS: usize = 5;

/// Tip thresholds
pub const HOT_TIP_CELSIUS: i64 = 27;
pub const HUMID_TIP_PERCENT: i32 = 80;
/// 15 mph, in tenths of a metre per second
pub const WINDY_TIP_DECI_MPS: i64 = 67;

/// Extreme weather bounds
pub const EXTREME_HOT_CELSIUS: i64 = 35;
pub const EXTREME_COLD_CELSIUS: i64 = 5;

/// Collapse 3-hourly forecast entries into per-day summaries.
///
/// Days keep the order they first appear in; only the first
/// [`FORECAST_DAYS`] are returned.
pub fn daily_forecast(entries: &[ForecastEntry]) -> Vec<DailyForecast> {
    let mut days: Vec<(DailyForecast, Vec<&ForecastEntry>)> = Vec::new();

    for entry in entries {
        let date = entry.timestamp.date_naive();
        match days.iter_mut().find(|(day, _)| day.date == date) {
            Some((_, bucket)) => bucket.push(entry),
            None => {
                if days.len() == FORECAST_DAYS {
                    continue;
                }
                let day = DailyForecast {
                    date,
                    high_celsius: entry.temperature_celsius,
                    low_celsius: entry.temperature_celsius,
                    humidity_percent: entry.humidity_percent,
                    wind_speed_mps: entry.wind_speed_mps,
                    condition: entry.condition.clone(),
                };
                days.push((day, vec![entry]));
            }
        }
    }

    days.into_iter()
        .map(|(mut day, bucket)| {
            let count = Decimal::from(bucket.len() as u64);
            let mut humidity = Decimal::ZERO;
            let mut wind = Decimal::ZERO;
            for entry in &bucket {
                day.high_celsius = day.high_celsius.max(entry.temperature_celsius);
                day.low_celsius = day.low_celsius.min(entry.temperature_celsius);
                humidity += Decimal::from(entry.humidity_percent);
                wind += entry.wind_speed_mps;
            }
            // Midpoints round up, matching the forecast page
            day.humidity_percent = (humidity / count)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i32()
                .unwrap_or(day.humidity_percent);
            day.wind_speed_mps =
                (wind / count).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            day
        })
        .collect()
}

/// Tips for the current conditions and the coming days.
///
/// The soil moisture tip is always last.
pub fn gardening_tips(current: &WeatherSnapshot, daily: &[DailyForecast]) -> Vec<GardeningTip> {
    let mut tips = Vec::new();

    if current.temperature_celsius > Decimal::from(HOT_TIP_CELSIUS) {
        tips.push(tip(
            TipKind::Warning,
            "High Temperature Alert",
            "Water your plants early in the morning or late in the evening to reduce evaporation.",
        ));
    }

    if current.humidity_percent > HUMID_TIP_PERCENT {
        tips.push(tip(
            TipKind::Info,
            "High Humidity",
            "Watch for fungal diseases and keep air moving around your plants.",
        ));
    }

    if let Some(day) = daily.iter().find(|day| is_wet_condition(&day.condition)) {
        tips.push(GardeningTip {
            kind: TipKind::Info,
            title: "Rain Expected".to_string(),
            message: format!(
                "{} forecast for {}. Consider skipping watering.",
                day.condition,
                day.date.format("%A")
            ),
        });
    }

    if current.wind_speed_mps > Decimal::new(WINDY_TIP_DECI_MPS, 1) {
        tips.push(tip(
            TipKind::Warning,
            "Windy Conditions",
            "Stake tall plants and shelter delicate seedlings.",
        ));
    }

    tips.push(tip(
        TipKind::Success,
        "Daily Tip",
        "Check soil moisture before watering. Water when the top inch of soil is dry.",
    ));

    tips
}

/// Warning when any forecast entry is outside the safe band
pub fn extreme_weather_warning(forecast: &[ForecastEntry]) -> Option<String> {
    let hot = Decimal::from(EXTREME_HOT_CELSIUS);
    let cold = Decimal::from(EXTREME_COLD_CELSIUS);

    let entry = forecast
        .iter()
        .find(|e| e.temperature_celsius > hot || e.temperature_celsius < cold)?;

    let kind = if entry.temperature_celsius > hot { "heat" } else { "cold" };
    Some(format!(
        "Extreme {} expected on {} ({}°C). Protect your crops.",
        kind,
        entry.timestamp.format("%Y-%m-%d"),
        entry.temperature_celsius.round_dp(1)
    ))
}

/// Advice stored with a watering log, `None` when nothing applies
pub fn watering_advice(weather: &WeatherSnapshot) -> Option<String> {
    let mut parts = Vec::new();

    if weather.temperature_celsius > Decimal::from(32) {
        parts.push("Hot day – add ~200ml more.");
    }
    if weather.humidity_percent < 40 {
        parts.push("Low humidity – keep soil moist.");
    }
    if is_rain_condition(&weather.condition) {
        parts.push("Rain expected – reduce watering.");
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn tip(kind: TipKind, title: &str, message: &str) -> GardeningTip {
    GardeningTip {
        kind,
        title: title.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
    }

    fn entry(hours: i64, temp: Decimal, humidity: i32, wind: Decimal, condition: &str) -> ForecastEntry {
        ForecastEntry {
            timestamp: start() + Duration::hours(hours),
            condition: condition.to_string(),
            temperature_celsius: temp,
            humidity_percent: humidity,
            wind_speed_mps: wind,
        }
    }

    fn snapshot(temp: Decimal, humidity: i32, wind: Decimal, condition: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_celsius: temp,
            humidity_percent: humidity,
            wind_speed_mps: wind,
            condition: condition.to_string(),
            description: String::new(),
            forecast: Vec::new(),
        }
    }

    #[test]
    fn test_daily_forecast_aggregates_a_day() {
        let entries = vec![
            entry(0, dec("20.5"), 70, dec("2.0"), "Clouds"),
            entry(3, dec("26.0"), 61, dec("3.1"), "Clear"),
            entry(6, dec("18.0"), 64, dec("2.5"), "Rain"),
        ];
        let days = daily_forecast(&entries);
        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(day.high_celsius, dec("26.0"));
        assert_eq!(day.low_celsius, dec("18.0"));
        assert_eq!(day.humidity_percent, 65);
        assert_eq!(day.wind_speed_mps, dec("2.5"));
        assert_eq!(day.condition, "Clouds");
    }

    #[test]
    fn test_daily_forecast_keeps_five_days() {
        let entries: Vec<_> = (0..7)
            .map(|d| entry(d * 24, dec("22"), 50, dec("1"), "Clear"))
            .collect();
        let days = daily_forecast(&entries);
        assert_eq!(days.len(), FORECAST_DAYS);
        assert_eq!(days[4].date, NaiveDate::from_ymd_opt(2024, 7, 5).unwrap());
    }

    #[test]
    fn test_tips_always_end_with_soil_tip() {
        let tips = gardening_tips(&snapshot(dec("20"), 50, dec("1"), "Clear"), &[]);
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].kind, TipKind::Success);
    }

    #[test]
    fn test_tips_for_hot_humid_windy_rainy_week() {
        let daily = daily_forecast(&[
            entry(0, dec("30"), 85, dec("7"), "Clear"),
            entry(24, dec("25"), 90, dec("7"), "Thunderstorm"),
        ]);
        let tips = gardening_tips(&snapshot(dec("30"), 85, dec("7.5"), "Clear"), &daily);
        let titles: Vec<_> = tips.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["High Temperature Alert", "High Humidity", "Rain Expected", "Windy Conditions", "Daily Tip"]
        );
        assert!(tips[2].message.starts_with("Thunderstorm forecast for Tuesday"));
    }

    #[test]
    fn test_extreme_weather_warning() {
        assert!(extreme_weather_warning(&[entry(0, dec("20"), 50, dec("1"), "Clear")]).is_none());

        let hot = extreme_weather_warning(&[entry(0, dec("36.2"), 30, dec("1"), "Clear")]);
        assert!(hot.unwrap().contains("heat"));

        let cold = extreme_weather_warning(&[entry(0, dec("4"), 30, dec("1"), "Snow")]);
        assert!(cold.unwrap().contains("cold"));
    }

    #[test]
    fn test_watering_advice_composition() {
        assert_eq!(watering_advice(&snapshot(dec("25"), 55, dec("1"), "Clear")), None);
        assert_eq!(
            watering_advice(&snapshot(dec("33"), 35, dec("1"), "Clear")).as_deref(),
            Some("Hot day – add ~200ml more. Low humidity – keep soil moist.")
        );
        assert_eq!(
            watering_advice(&snapshot(dec("20"), 90, dec("1"), "Rain")).as_deref(),
            Some("Rain expected – reduce watering.")
        );
    }
}

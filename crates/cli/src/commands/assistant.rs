//! AgriBot chat and weather lookups.

use chrono::Utc;
use nongsan_client::Nongsan;
use nongsan_client::weather::WeatherError;
use nongsan_core::dto::{
    ChatMessage, Coord, CurrentWeather, ForecastEntry, SUGGESTED_PROMPTS, Sender, WeatherIcon,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CommandError, out};

/// Ask one question, or converse line by line on stdin until EOF.
pub async fn chat(app: &Nongsan, message: Option<&str>) -> Result<(), CommandError> {
    let mut history = vec![ChatMessage::welcome(now_ms())];

    if let Some(message) = message {
        out(app.chatbot.reply(message, &history).await);
        return Ok(());
    }

    out(format!("AgriBot: {}", nongsan_core::dto::WELCOME_MESSAGE));
    out(format!("Gợi ý: {}", SUGGESTED_PROMPTS.join(" · ")));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let answer = app.chatbot.reply(text, &history).await;
        out(format!("AgriBot: {answer}"));
        let sent = now_ms();
        history.push(ChatMessage::new(Sender::User, text, sent));
        history.push(ChatMessage::new(Sender::Bot, answer, sent + 1));
    }
    Ok(())
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Conditions now, by city name or by coordinate.
pub async fn now(
    app: &Nongsan,
    city: Option<&str>,
    coord: Option<Coord>,
) -> Result<(), CommandError> {
    match (city, coord) {
        (Some(city), _) => {
            let (location, weather) = app.weather.current_in_city(city).await?;
            print_current(location.vietnamese_name(), &weather);
        }
        (None, Some(coord)) => {
            let weather = app.weather.current(coord).await?;
            print_current(&weather.name, &weather);
        }
        (None, None) => return Err(WeatherError::CityRequired.into()),
    }
    Ok(())
}

fn print_current(place: &str, weather: &CurrentWeather) {
    let (label, description) = weather.condition().map_or(("-", ""), |c| {
        (WeatherIcon::from_code(&c.icon).label(), c.description.as_str())
    });
    out(format!("{place}: {:.1}°C, {label} ({description})", weather.main.temp));
    out(format!(
        "  cảm giác: {:.1}°C   độ ẩm: {}%   gió: {:.1} m/s   mây: {}%",
        weather.main.feels_like, weather.main.humidity, weather.wind.speed, weather.clouds.all
    ));
}

/// Where a city is.
pub async fn city(app: &Nongsan, name: &str) -> Result<(), CommandError> {
    let location = app.weather.find_city(name).await?;
    let state = location.state.as_deref().unwrap_or("-");
    out(format!(
        "{} ({}, {})  {:.4}, {:.4}",
        location.vietnamese_name(),
        state,
        location.country,
        location.lat,
        location.lon
    ));
    Ok(())
}

/// Five days ahead, one line per day.
pub async fn forecast(app: &Nongsan, city: &str) -> Result<(), CommandError> {
    let forecast = app.weather.forecast(city).await?;
    out(format!("{} ({})", forecast.city.name, forecast.city.country));

    let mut days: Vec<(&str, Vec<&ForecastEntry>)> = Vec::new();
    for entry in &forecast.list {
        let day = entry.dt_txt.get(..10).unwrap_or(&entry.dt_txt);
        match days.last_mut() {
            Some((current, slots)) if *current == day => slots.push(entry),
            _ => days.push((day, vec![entry])),
        }
    }

    for (day, slots) in days {
        let low = slots.iter().map(|s| s.main.temp_min).fold(f64::INFINITY, f64::min);
        let high = slots.iter().map(|s| s.main.temp_max).fold(f64::NEG_INFINITY, f64::max);
        let rain = slots.iter().filter_map(|s| s.pop).fold(0.0, f64::max);
        let label = slots
            .get(slots.len() / 2)
            .and_then(|s| s.weather.first())
            .map_or("-", |c| WeatherIcon::from_code(&c.icon).label());
        out(format!(
            "{day}  {low:.0}–{high:.0}°C  {label}  mưa {:.0}%",
            rain * 100.0
        ));
    }
    Ok(())
}

//! Rendering of the briefing text.
//!
//! Output is Telegram HTML: `<b>` for emphasis, free text escaped.

use chrono::{DateTime, TimeZone};

use crate::{
    model::{City, CityWeather},
    provider::FetchError,
    weather_code,
};

pub const TITLE: &str = "🌤️ <b>Daily Weather Report</b>";
pub const RULE: &str = "==============================";
pub const FOOTER: &str = "✨ Have a great day!";

const ERROR_MAX_CHARS: usize = 100;

/// Render one city's section, either the weather or an inline failure notice.
pub fn render_city_block(city: &City, result: &Result<CityWeather, FetchError>) -> String {
    match result {
        Ok(weather) => render_weather(city, weather),
        Err(err) => render_failure(city, err),
    }
}

fn render_weather(city: &City, weather: &CityWeather) -> String {
    let now = &weather.current;
    let entry = weather_code::lookup(now.weather_code);

    let mut out = format!(
        "\n📍 <b>{name}</b>\n\
         {emoji} {description}\n\
         🌡️ Now: {temp}°C (feels like {feels}°C)\n\
         💧 Humidity: {humidity}%\n\
         💨 Wind: {wind:.1} km/h\n\
         \n\
         <b>Today's forecast:</b>",
        name = escape_html(&city.name),
        emoji = entry.emoji,
        description = entry.description,
        temp = round_whole(now.temperature_c),
        feels = round_whole(now.feels_like_c),
        humidity = now.humidity_pct,
        wind = round_tenth(now.wind_speed_kmh),
    );

    for forecast in &weather.forecast {
        out.push_str(&format!(
            "\n  {} {} {:02}:00  {} {}°C",
            forecast.slot.emoji(),
            forecast.slot.label(),
            forecast.slot.hour(),
            weather_code::lookup(forecast.sample.weather_code).emoji,
            round_whole(forecast.sample.temperature_c),
        ));
    }

    out.push_str(&format!("\n🕐 Updated: {}\n", now.observed_at.format("%H:%M")));
    out
}

fn render_failure(city: &City, err: &FetchError) -> String {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        truncate_chars(&err.to_string(), ERROR_MAX_CHARS)
    };

    format!(
        "\n📍 <b>{}</b>\n   ⚠️ Weather unavailable: {}\n",
        escape_html(&city.name),
        escape_html(&reason)
    )
}

/// Assemble header, city blocks and footer into the final message.
pub fn render_report<Tz>(now: &DateTime<Tz>, blocks: &[String]) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = format!("{TITLE}\n📅 {}\n{RULE}\n", now.format("%Y-%m-%d %A"));
    for block in blocks {
        out.push_str(block);
    }
    out.push('\n');
    out.push_str(FOOTER);
    out
}

/// Plain-text rendition of a message for console preview.
pub fn strip_markup(message: &str) -> String {
    ["<b>", "</b>", "<i>", "</i>"]
        .iter()
        .fold(message.to_string(), |acc, tag| acc.replace(tag, ""))
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// Halves go to the even neighbour; as i64 so -0.4 doesn't show up as -0
fn round_whole(value: f64) -> i64 {
    value.round_ties_even() as i64
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

//! Plain-text rendering of dashboard state. Everything here is a pure
//! function of its input.

use std::fmt::Write;

use atmos_core::{DaySlot, HourlySlot, Icon, LoadState, Place, WeatherReport};
use chrono::{FixedOffset, Offset, Utc};

const HOURS_PER_ROW: usize = 6;

pub fn render(state: &LoadState) -> String {
    match state {
        LoadState::Idle => String::new(),
        LoadState::Loading { .. } => "Loading Forecast...\n".to_string(),
        LoadState::Failed { message, .. } => format!("{message}\n"),
        LoadState::Ready { report, .. } => render_report(report),
    }
}

pub fn render_report(report: &WeatherReport) -> String {
    let mut out = String::new();
    let w = &report.weather;

    let _ = writeln!(out, "{}", w.location);
    let _ = writeln!(out, "  {}  {}°  {}", glyph(w.condition_icon), w.temp, w.condition_label);
    let _ = writeln!(
        out,
        "  Wind {} mph   Humidity {}%   H / L {}° / {}°",
        w.wind,
        w.humidity,
        degrees(w.high),
        degrees(w.low)
    );

    if !report.hourly.is_empty() {
        let _ = writeln!(out, "\nHourly Forecast");
        for row in report.hourly.chunks(HOURS_PER_ROW) {
            let cells: Vec<String> = row.iter().map(hour_cell).collect();
            let _ = writeln!(out, "  {}", cells.join("  "));
        }
    }

    if !report.forecast.is_empty() {
        let _ = writeln!(out, "\n{}-Day Forecast", report.forecast.len());
        for day in &report.forecast {
            let _ = writeln!(out, "  {}", day_row(day));
        }
    }

    let _ = writeln!(out, "\n{} · Powered by Open-Meteo", updated_line(report));
    out
}

/// Fetch time as a wall clock reading at the forecast location.
fn updated_line(report: &WeatherReport) -> String {
    let offset = FixedOffset::east_opt(report.utc_offset_seconds).unwrap_or_else(|| Utc.fix());
    let at = report.fetched_at.with_timezone(&offset).format("%H:%M");
    match &report.timezone {
        Some(tz) => format!("Updated {at} {tz}"),
        None => format!("Updated {at} UTC{offset}"),
    }
}

/// Numbered list of search hits, one per line.
pub fn render_places(places: &[Place]) -> String {
    if places.is_empty() {
        return "No results found\n".to_string();
    }

    let mut out = String::new();
    for (i, place) in places.iter().enumerate() {
        let region = place.region_line();
        if region.is_empty() {
            let _ = writeln!(out, "{:>2}. {}", i + 1, place.name);
        } else {
            let _ = writeln!(out, "{:>2}. {} ({})", i + 1, place.name, region);
        }
    }
    out
}

fn hour_cell(slot: &HourlySlot) -> String {
    format!("{:>5} {} {:>3}°", slot.time, glyph(slot.icon), degrees(slot.temp))
}

fn day_row(day: &DaySlot) -> String {
    format!(
        "{:<6}{} {:<14}{:>4}° {:>4}°",
        day.day,
        glyph(day.icon),
        day.label,
        degrees(day.max),
        degrees(day.min)
    )
}

fn glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Sun => "☀",
        Icon::CloudSun => "⛅",
        Icon::Cloud => "☁",
        Icon::CloudFog => "🌫",
        Icon::CloudDrizzle => "🌦",
        Icon::CloudRain => "🌧",
        Icon::CloudLightning => "⛈",
        Icon::Snowflake => "❄",
    }
}

/// Whole degrees for display; halves round up.
fn degrees(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

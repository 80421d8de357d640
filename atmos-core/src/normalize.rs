//! Turns a raw forecast payload into the display model.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::{
    condition::condition_for,
    error::WeatherError,
    model::{
        Coordinates, DaySlot, DisplayWeather, HourlySlot, RawDaily, RawForecastResponse, RawHourly,
        WeatherReport,
    },
};

/// Number of hourly slots shown, starting at the current hour.
pub const HOURLY_WINDOW: usize = 24;

const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DAILY_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn normalize(
    raw: &RawForecastResponse,
    location: String,
    coordinates: Coordinates,
    now: DateTime<Utc>,
) -> Result<WeatherReport, WeatherError> {
    check_daily(&raw.daily)?;
    check_hourly(&raw.hourly)?;

    let daily = &raw.daily;
    let (high, low) = match (daily.temperature_2m_max.first(), daily.temperature_2m_min.first()) {
        (Some(high), Some(low)) => (*high, *low),
        _ => {
            return Err(WeatherError::data_shape(
                "daily block has no entries; high/low unavailable",
            ));
        }
    };

    let current = &raw.current;
    let condition = condition_for(current.weather_code);

    let weather = DisplayWeather {
        coordinates,
        temp: round_half_up(current.temperature_2m),
        condition_label: condition.label,
        condition_icon: condition.icon,
        high,
        low,
        wind: current.wind_speed_10m,
        humidity: current.relative_humidity_2m,
        location,
    };

    let utc_offset_seconds = raw.utc_offset_seconds.unwrap_or(0);
    let local_now = now.naive_utc() + Duration::seconds(i64::from(utc_offset_seconds));
    let start = current_hour_index(&raw.hourly.time, local_now);

    Ok(WeatherReport {
        weather,
        hourly: hourly_slots(&raw.hourly, start),
        forecast: day_slots(daily)?,
        fetched_at: now,
        timezone: raw.timezone.clone().filter(|tz| !tz.is_empty()),
        utc_offset_seconds,
    })
}

/// Index of the entry for the hour containing `local_now`, or 0 when the
/// sequence has no such hour.
pub fn current_hour_index(times: &[String], local_now: NaiveDateTime) -> usize {
    let prefix = local_now.format("%Y-%m-%dT%H").to_string();
    match times.iter().position(|t| t.starts_with(&prefix)) {
        Some(idx) => idx,
        None => {
            tracing::debug!(hour = %prefix, "current hour not in hourly series, starting at 0");
            0
        }
    }
}

/// 12-hour label such as "5 PM". Seconds or an offset after the minutes are
/// ignored; a time that cannot be read at all is shown as given.
pub fn hour_label(time: &str) -> String {
    match NaiveDateTime::parse_and_remainder(time, HOURLY_TIME_FORMAT) {
        Ok((at, _)) => at.format("%-I %p").to_string(),
        Err(e) => {
            tracing::debug!(time, error = %e, "unreadable hourly time, using it verbatim");
            time.to_string()
        }
    }
}

fn hourly_slots(hourly: &RawHourly, start: usize) -> Vec<HourlySlot> {
    let end = (start + HOURLY_WINDOW).min(hourly.time.len());

    (start..end)
        .map(|i| HourlySlot {
            time: hour_label(&hourly.time[i]),
            temp: hourly.temperature_2m[i],
            icon: condition_for(hourly.weather_code[i]).icon,
        })
        .collect()
}

fn day_slots(daily: &RawDaily) -> Result<Vec<DaySlot>, WeatherError> {
    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let day = if i == 0 {
                "Today".to_string()
            } else {
                NaiveDate::parse_from_str(date, DAILY_DATE_FORMAT)
                    .map_err(|e| {
                        WeatherError::data_shape(format!("daily time '{date}' is not a date: {e}"))
                    })?
                    .format("%a")
                    .to_string()
            };
            let condition = condition_for(daily.weather_code[i]);

            Ok(DaySlot {
                day,
                max: daily.temperature_2m_max[i],
                min: daily.temperature_2m_min[i],
                label: condition.label,
                icon: condition.icon,
            })
        })
        .collect()
}

fn check_daily(daily: &RawDaily) -> Result<(), WeatherError> {
    let n = daily.time.len();
    if daily.weather_code.len() != n
        || daily.temperature_2m_max.len() != n
        || daily.temperature_2m_min.len() != n
    {
        return Err(WeatherError::data_shape(format!(
            "daily arrays are misaligned (time={}, weather_code={}, max={}, min={})",
            n,
            daily.weather_code.len(),
            daily.temperature_2m_max.len(),
            daily.temperature_2m_min.len(),
        )));
    }
    Ok(())
}

fn check_hourly(hourly: &RawHourly) -> Result<(), WeatherError> {
    let n = hourly.time.len();
    if hourly.temperature_2m.len() != n || hourly.weather_code.len() != n {
        return Err(WeatherError::data_shape(format!(
            "hourly arrays are misaligned (time={}, temperature={}, weather_code={})",
            n,
            hourly.temperature_2m.len(),
            hourly.weather_code.len(),
        )));
    }
    Ok(())
}

/// Round to the nearest integer, halves toward positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Daily forecast client (Open-Meteo).
//!
//! The provider returns parallel arrays per variable; they are zipped into
//! one [`DayForecast`] per date. A day missing its date, weather code or
//! temperatures is dropped on its own.

mod conditions;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{get_text, FetchError, Outcome};
use crate::location::Coordinates;

pub use conditions::WeatherCondition;

/// Open-Meteo forecast endpoint.
pub const DEFAULT_FORECAST_API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Number of days requested.
pub const FORECAST_DAYS: u8 = 7;

const PROVIDER: &str = "forecast";

const DAILY_VARIABLES: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max";

/// Temperature unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the provider's `temperature_unit` parameter.
    #[must_use]
    pub fn temperature_unit(self) -> &'static str {
        match self {
            Units::Metric => "celsius",
            Units::Imperial => "fahrenheit",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }
}

/// One forecast day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub condition: WeatherCondition,
    pub temperature_max: f64,
    pub temperature_min: f64,
    /// Maximum precipitation probability in percent, if reported.
    pub precipitation_probability: Option<u8>,
}

/// Forecast for one location, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub location: Coordinates,
    pub units: Units,
    pub days: Vec<DayForecast>,
}

#[derive(Debug, Deserialize)]
struct ForecastDocument {
    #[serde(default)]
    daily: DailyColumns,
}

/// Column arrays kept as raw JSON so one bad cell only loses its own day.
#[derive(Debug, Default, Deserialize)]
struct DailyColumns {
    #[serde(default)]
    time: Value,
    #[serde(default)]
    weather_code: Value,
    #[serde(default)]
    temperature_2m_max: Value,
    #[serde(default)]
    temperature_2m_min: Value,
    #[serde(default)]
    precipitation_probability_max: Value,
}

fn cells(column: &Value) -> &[Value] {
    column.as_array().map_or(&[][..], Vec::as_slice)
}

fn number(column: &Value, index: usize) -> Option<f64> {
    cells(column)
        .get(index)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

fn weather_code(value: f64) -> Option<u16> {
    if !(0.0..=f64::from(u16::MAX)).contains(&value) || value.fract() != 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "range checked above")]
    let code = value as u16;
    Some(code)
}

fn percent(value: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to 0..=100")]
    let percent = value.round().clamp(0.0, 100.0) as u8;
    percent
}

impl DailyColumns {
    fn len(&self) -> usize {
        cells(&self.time).len()
    }

    fn day(&self, index: usize) -> Option<DayForecast> {
        let date = cells(&self.time).get(index)?.as_str()?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let code = weather_code(number(&self.weather_code, index)?)?;
        let temperature_max = number(&self.temperature_2m_max, index)?;
        let temperature_min = number(&self.temperature_2m_min, index)?;

        Some(DayForecast {
            date,
            condition: WeatherCondition::from_code(code),
            temperature_max,
            temperature_min,
            precipitation_probability: number(&self.precipitation_probability_max, index)
                .map(percent),
        })
    }
}

/// Parse a forecast response body.
pub fn parse_forecast(
    body: &str,
    location: Coordinates,
    units: Units,
) -> Result<DailyForecast, FetchError> {
    let document: ForecastDocument =
        serde_json::from_str(body).map_err(FetchError::malformed(PROVIDER))?;

    let columns = &document.daily;
    let days: Vec<DayForecast> = (0..columns.len())
        .filter_map(|index| {
            let day = columns.day(index);
            if day.is_none() {
                debug!("Dropping incomplete forecast day at index {}", index);
            }
            day
        })
        .collect();

    Ok(DailyForecast {
        location,
        units,
        days,
    })
}

/// Client for the daily forecast provider.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    api_url: String,
}

impl ForecastClient {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_api_url(client, DEFAULT_FORECAST_API_URL)
    }

    #[must_use]
    pub fn with_api_url(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Fetch the seven-day forecast for `location`.
    pub async fn fetch(
        &self,
        location: Coordinates,
        units: Units,
    ) -> Result<Outcome<DailyForecast>, FetchError> {
        debug!("Fetching forecast for {}", location);

        let request = self.client.get(&self.api_url).query(&[
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("daily", DAILY_VARIABLES.to_string()),
            ("temperature_unit", units.temperature_unit().to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("timezone", "auto".to_string()),
        ]);

        let body = get_text(PROVIDER, request).await?;
        let forecast = parse_forecast(&body, location, units)?;

        if forecast.days.is_empty() {
            info!("Forecast for {} contained no usable days", location);
            return Ok(Outcome::Unavailable);
        }

        Ok(Outcome::Available(forecast))
    }
}

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

//! WMO weather interpretation codes.

/// Weather condition derived from a WMO code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    Showers,
    SnowShowers,
    Thunder,
    Unknown(u16),
}

impl WeatherCondition {
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Clear,
            1 | 2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 | 77 => Self::Snow,
            80..=82 => Self::Showers,
            85 | 86 => Self::SnowShowers,
            95 | 96 | 99 => Self::Thunder,
            other => Self::Unknown(other),
        }
    }

    /// Short label for forecast cards.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::Showers => "Showers",
            Self::SnowShowers => "Snow showers",
            Self::Thunder => "Thunder",
            Self::Unknown(_) => "Unknown",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::PartlyCloudy => "⛅",
            Self::Cloudy => "☁",
            Self::Fog => "🌫",
            Self::Drizzle | Self::Showers => "🌦",
            Self::FreezingDrizzle | Self::Rain | Self::FreezingRain => "🌧",
            Self::Snow => "❄",
            Self::SnowShowers => "🌨",
            Self::Thunder => "⛈",
            Self::Unknown(_) => "?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_rain_thunder() {
        let labels: Vec<&str> = [0, 61, 95]
            .into_iter()
            .map(|code| WeatherCondition::from_code(code).label())
            .collect();
        assert_eq!(labels, vec!["Clear", "Rain", "Thunder"]);
    }

    #[test]
    fn test_code_families() {
        assert_eq!(WeatherCondition::from_code(2), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_code(48), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_code(81), WeatherCondition::Showers);
        assert_eq!(WeatherCondition::from_code(99), WeatherCondition::Thunder);
        assert_eq!(WeatherCondition::from_code(7), WeatherCondition::Unknown(7));
        assert_eq!(WeatherCondition::from_code(7).icon(), "?");
    }
}

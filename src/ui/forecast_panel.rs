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

use nimbus_client::{DailyForecast, DayForecast, Units};

use super::UiAction;

/// What the forecast panel is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastView {
    Loading,
    Ready(DailyForecast),
    Unavailable(String),
}

/// Seven-day forecast list with a units toggle
#[derive(Debug)]
pub struct ForecastPanel {
    pub view: ForecastView,
    /// Name of the place the forecast is for, when known
    pub place_name: Option<String>,
}

impl Default for ForecastPanel {
    fn default() -> Self {
        Self {
            view: ForecastView::Loading,
            place_name: None,
        }
    }
}

impl ForecastPanel {
    pub fn show(&self, ui: &mut egui::Ui, units: Units, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("7-DAY FORECAST")
                    .color(egui::Color32::from_rgb(150, 150, 150))
                    .size(10.0)
                    .strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .small_button(units.toggled().symbol())
                    .on_hover_text("Switch temperature units")
                    .clicked()
                {
                    actions.push(UiAction::ToggleUnits);
                }
            });
        });

        if let Some(name) = &self.place_name {
            ui.label(
                egui::RichText::new(name)
                    .color(egui::Color32::from_rgb(100, 180, 220))
                    .size(11.0),
            );
        }

        match &self.view {
            ForecastView::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading forecast…");
                });
            }
            ForecastView::Unavailable(message) => {
                ui.label(
                    egui::RichText::new(message)
                        .color(egui::Color32::from_rgb(255, 200, 100))
                        .italics(),
                );
            }
            ForecastView::Ready(forecast) => {
                ui.label(
                    egui::RichText::new(forecast.location.to_string())
                        .color(egui::Color32::from_rgb(100, 100, 100))
                        .size(8.0)
                        .monospace(),
                );
                egui::Grid::new("forecast_days")
                    .num_columns(4)
                    .spacing([8.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        for day in &forecast.days {
                            day_row(ui, day, forecast.units);
                            ui.end_row();
                        }
                    });
            }
        }
    }
}

fn day_row(ui: &mut egui::Ui, day: &DayForecast, units: Units) {
    ui.label(egui::RichText::new(day.date.format("%a %d").to_string()).monospace());
    ui.label(egui::RichText::new(day.condition.icon()).size(16.0))
        .on_hover_text(day.condition.label());
    ui.label(temperature_range(day, units));
    match day.precipitation_probability {
        Some(probability) => ui.label(
            egui::RichText::new(format!("💧{probability}%"))
                .color(egui::Color32::from_rgb(100, 180, 255))
                .size(10.0),
        ),
        None => ui.label(""),
    };
}

/// "max° / min°" rounded to whole degrees
pub fn temperature_range(day: &DayForecast, units: Units) -> String {
    format!(
        "{:.0}{} / {:.0}{}",
        day.temperature_max,
        units.symbol(),
        day.temperature_min,
        units.symbol()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nimbus_client::WeatherCondition;

    #[test]
    fn test_temperature_range_rounds() {
        let day = DayForecast {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            condition: WeatherCondition::from_code(0),
            temperature_max: 24.6,
            temperature_min: 11.2,
            precipitation_probability: None,
        };

        assert_eq!(temperature_range(&day, Units::Metric), "25°C / 11°C");
        assert_eq!(temperature_range(&day, Units::Imperial), "25°F / 11°F");
    }
}

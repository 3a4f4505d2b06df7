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

//! Radar playback controls.

use std::time::Duration;

use nimbus_client::ControlSurface;

use super::UiAction;
use crate::config::PLAYBACK_INTERVAL_RANGE_MS;

/// Playback widgets and the values the player mirrors into them.
#[derive(Debug)]
pub struct RadarControls {
    position: usize,
    frame_count: usize,
    label: String,
    playing: bool,
    unavailable: bool,
    opacity: f32,
    interval_ms: u64,
}

impl RadarControls {
    pub fn new(opacity: f32, interval: Duration) -> Self {
        Self {
            position: 0,
            frame_count: 0,
            label: "Loading radar…".to_string(),
            playing: false,
            unavailable: false,
            opacity: opacity.clamp(0.0, 1.0),
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Draw the controls, pushing any user input onto `actions`.
    pub fn show(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("RADAR")
                    .color(egui::Color32::from_rgb(150, 150, 150))
                    .size(10.0)
                    .strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .small_button("⟳")
                    .on_hover_text("Reload radar frames")
                    .clicked()
                {
                    actions.push(UiAction::RefreshRadar);
                }
            });
        });

        let label_color = if self.unavailable {
            egui::Color32::from_rgb(255, 200, 100)
        } else {
            egui::Color32::from_rgb(200, 200, 200)
        };
        ui.label(egui::RichText::new(&self.label).color(label_color).monospace());

        let has_frames = self.frame_count > 0;
        ui.add_enabled_ui(has_frames, |ui| {
            let last = self.frame_count.saturating_sub(1);
            let mut position = self.position;
            let slider = egui::Slider::new(&mut position, 0..=last).show_value(false);
            if ui.add(slider).changed() && position != self.position {
                actions.push(UiAction::Seek(position));
            }

            ui.horizontal(|ui| {
                if ui.button("⏮").on_hover_text("Previous frame").clicked() {
                    actions.push(UiAction::StepBack);
                }

                let toggle = if self.playing { "⏸ Pause" } else { "▶ Play" };
                if ui.button(toggle).clicked() {
                    actions.push(UiAction::TogglePlayback);
                }

                if ui.button("⏭").on_hover_text("Next frame").clicked() {
                    actions.push(UiAction::StepForward);
                }

                ui.label(
                    egui::RichText::new(format!("{}/{}", self.position + 1, self.frame_count))
                        .color(egui::Color32::from_rgb(130, 130, 130))
                        .size(10.0),
                );
            });
        });

        ui.add_space(4.0);

        let opacity = ui.add(
            egui::Slider::new(&mut self.opacity, 0.0..=1.0)
                .text("Opacity")
                .fixed_decimals(2),
        );
        if opacity.changed() {
            actions.push(UiAction::OpacityChanged);
        }

        let speed = ui.add(
            egui::Slider::new(&mut self.interval_ms, PLAYBACK_INTERVAL_RANGE_MS)
                .text("ms / frame")
                .logarithmic(true),
        );
        if speed.changed() {
            actions.push(UiAction::IntervalChanged(Duration::from_millis(
                self.interval_ms,
            )));
        }

        if opacity.drag_stopped() || speed.drag_stopped() {
            actions.push(UiAction::SettingsCommitted);
        }
    }
}

impl ControlSurface for RadarControls {
    fn show_position(&mut self, index: usize, frame_count: usize, label: &str) {
        self.position = index;
        self.frame_count = frame_count;
        self.unavailable = false;
        label.clone_into(&mut self.label);
    }

    fn show_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn show_unavailable(&mut self, message: &str) {
        self.position = 0;
        self.frame_count = 0;
        self.playing = false;
        self.unavailable = true;
        message.clone_into(&mut self.label);
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_updates_label_and_range() {
        let mut controls = RadarControls::new(0.8, Duration::from_millis(600));
        controls.show_position(3, 12, "Frame: 2025-06-01 12:30");

        assert_eq!(controls.position(), 3);
        assert_eq!(controls.frame_count(), 12);
        assert_eq!(controls.label(), "Frame: 2025-06-01 12:30");
        assert_eq!(controls.interval_ms(), 600);
    }

    #[test]
    fn test_unavailable_resets_position() {
        let mut controls = RadarControls::new(0.8, Duration::from_millis(600));
        controls.show_position(5, 6, "Frame: x");
        controls.show_playing(true);
        controls.show_unavailable("No radar frames available.");

        assert_eq!(controls.frame_count(), 0);
        assert_eq!(controls.position(), 0);
        assert!(!controls.is_playing());
        assert_eq!(controls.label(), "No radar frames available.");
    }

    #[test]
    fn test_opacity_is_clamped() {
        let controls = RadarControls::new(3.0, Duration::from_millis(600));
        assert!((controls.opacity() - 1.0).abs() < f32::EPSILON);
    }
}

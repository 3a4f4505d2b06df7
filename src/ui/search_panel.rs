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

use nimbus_client::Place;

use super::UiAction;

/// Place search box, its results and the locate button
#[derive(Debug, Default)]
pub struct SearchPanel {
    pub query: String,
    results: Vec<Place>,
    message: Option<String>,
    searching: bool,
    locating: bool,
}

impl SearchPanel {
    /// A search was issued; results arrive later
    pub fn begin_search(&mut self) {
        self.searching = true;
        self.message = None;
    }

    pub fn set_results(&mut self, results: Vec<Place>) {
        self.searching = false;
        self.message = None;
        self.results = results;
    }

    /// Replace the result list with a short message
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.searching = false;
        self.results.clear();
        self.message = Some(message.into());
    }

    pub fn set_locating(&mut self, locating: bool) {
        self.locating = locating;
    }

    pub fn results(&self) -> &[Place] {
        &self.results
    }

    pub fn show(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.label(
            egui::RichText::new("LOCATION")
                .color(egui::Color32::from_rgb(150, 150, 150))
                .size(10.0)
                .strong(),
        );

        ui.horizontal(|ui| {
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .hint_text("Search city…")
                    .desired_width(170.0),
            );
            let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("🔍").clicked() || submitted) && !self.query.trim().is_empty() {
                actions.push(UiAction::Search(self.query.trim().to_string()));
            }

            let locate = ui.add_enabled(!self.locating, egui::Button::new("📍"));
            if locate.on_hover_text("Use my location").clicked() {
                actions.push(UiAction::Locate);
            }
        });

        if self.searching || self.locating {
            ui.spinner();
        }

        if let Some(message) = &self.message {
            ui.label(
                egui::RichText::new(message)
                    .color(egui::Color32::from_rgb(120, 120, 120))
                    .size(10.0)
                    .italics(),
            );
        }

        let mut selected = None;
        for place in &self.results {
            if ui.selectable_label(false, place.display_name()).clicked() {
                selected = Some(place.clone());
            }
        }

        if let Some(place) = selected {
            self.query.clone_from(&place.name);
            self.results.clear();
            actions.push(UiAction::SelectPlace(place));
        }
    }
}

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

use nimbus_client::Coordinates;
use walkers::{lon_lat, MapMemory, Plugin, Position, Projector};

const MARKER_RADIUS: f32 = 6.0;
const MARKER_COLOR: egui::Color32 = egui::Color32::from_rgb(54, 194, 255);

/// Map position for a pair of coordinates
pub fn position(coordinates: Coordinates) -> Position {
    lon_lat(coordinates.longitude, coordinates.latitude)
}

/// Coordinates of a map position (`x` is longitude, `y` latitude)
pub fn coordinates(position: Position) -> Coordinates {
    Coordinates::new(position.y(), position.x())
}

/// Filled circle at the located or selected place
#[derive(Debug, Clone)]
pub struct PlaceMarker {
    pub coordinates: Coordinates,
    pub label: Option<String>,
}

impl PlaceMarker {
    pub fn new(coordinates: Coordinates, label: Option<String>) -> Self {
        Self { coordinates, label }
    }

    /// Hover text: the place name when known, else the coordinates
    pub fn hover_text(&self) -> String {
        match &self.label {
            Some(label) => format!("{label}\n{}", self.coordinates),
            None => self.coordinates.to_string(),
        }
    }
}

impl Plugin for PlaceMarker {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let screen = projector.project(position(self.coordinates));
        let center = egui::pos2(screen.x, screen.y);

        let painter = ui.painter();
        painter.circle(
            center,
            MARKER_RADIUS,
            MARKER_COLOR.gamma_multiply(0.9),
            egui::Stroke::new(2.0, MARKER_COLOR),
        );

        let hovered = response
            .hover_pos()
            .is_some_and(|pointer| pointer.distance(center) <= MARKER_RADIUS + 2.0);
        if hovered {
            response.clone().on_hover_text(self.hover_text());
        }
    }
}

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

//! UI components for Nimbus Desktop.
//!
//! Panels draw their own state and report user input as [`UiAction`]s; the
//! app applies them after drawing so no panel needs access to the player or
//! the network clients.

pub mod controls;
pub mod forecast_panel;
pub mod search_panel;
pub mod status_pane;

use std::time::Duration;

use nimbus_client::Place;

pub use controls::RadarControls;
pub use forecast_panel::{ForecastPanel, ForecastView};
pub use search_panel::SearchPanel;
pub use status_pane::{StatusPane, StatusSummary};

/// User input collected while drawing a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Seek(usize),
    StepBack,
    StepForward,
    TogglePlayback,
    OpacityChanged,
    IntervalChanged(Duration),
    /// A slider drag finished; persist settings.
    SettingsCommitted,
    RefreshRadar,
    Search(String),
    SelectPlace(Place),
    Locate,
    ToggleUnits,
}

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

//! Playback controls as seen by the radar player.

/// UI elements that mirror the player's state.
///
/// The player writes to these on every index or playback change and reads
/// the opacity when it creates an overlay.
pub trait ControlSurface {
    /// Move the position indicator and update the timestamp label.
    fn show_position(&mut self, index: usize, frame_count: usize, label: &str);

    /// Reflect the play/pause state on the toggle.
    fn show_playing(&mut self, playing: bool);

    /// Replace the position display with an explicit "unavailable" message.
    fn show_unavailable(&mut self, message: &str);

    /// Current overlay opacity in `[0, 1]`.
    fn opacity(&self) -> f32;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ControlSurface;

    /// Control surface double that keeps the last written values.
    #[derive(Debug)]
    pub(crate) struct RecordingControls {
        pub(crate) position: Option<(usize, usize)>,
        pub(crate) label: String,
        pub(crate) playing: bool,
        pub(crate) opacity: f32,
        pub(crate) position_writes: usize,
    }

    impl Default for RecordingControls {
        fn default() -> Self {
            Self {
                position: None,
                label: String::new(),
                playing: false,
                opacity: 0.8,
                position_writes: 0,
            }
        }
    }

    impl ControlSurface for RecordingControls {
        fn show_position(&mut self, index: usize, frame_count: usize, label: &str) {
            self.position = Some((index, frame_count));
            self.label = label.to_string();
            self.position_writes += 1;
        }

        fn show_playing(&mut self, playing: bool) {
            self.playing = playing;
        }

        fn show_unavailable(&mut self, message: &str) {
            self.position = None;
            self.label = message.to_string();
        }

        fn opacity(&self) -> f32 {
            self.opacity
        }
    }
}

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

//! Radar tile layer management.
//!
//! [`TileLayer`] owns the single radar overlay on the map. The map widget is
//! reached only through the [`OverlayHost`] trait, so the layer lifecycle can
//! be driven from a GUI or from tests alike.

use std::fmt;

use log::debug;

use crate::catalog::Frame;

/// Stacking order of the radar overlay above the base map.
pub const RADAR_Z_INDEX: i32 = 100;

/// Opacity used when no control value is available.
pub const DEFAULT_OPACITY: f32 = 0.8;

/// Handle to an overlay attached to the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Fixed styling parameters of radar tile URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileStyle {
    /// Tile edge in pixels.
    pub size: u32,
    /// RainViewer color scheme number.
    pub color_scheme: u8,
    /// Rendering options, `{smooth}_{snow}`.
    pub options: String,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            size: 256,
            color_scheme: 2,
            options: "1_1".to_string(),
        }
    }
}

/// Tile URL with `{z}`, `{x}` and `{y}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlTemplate(String);

impl TileUrlTemplate {
    /// Build the template for a frame served from `host`.
    #[must_use]
    pub fn for_frame(host: &str, frame: &Frame, style: &TileStyle) -> Self {
        Self(format!(
            "{}{}/{}/{{z}}/{{x}}/{{y}}/{}/{}.png",
            host.trim_end_matches('/'),
            frame.path,
            style.size,
            style.color_scheme,
            style.options
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute tile coordinates.
    #[must_use]
    pub fn expand(&self, zoom: u8, x: u32, y: u32) -> String {
        self.0
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

impl fmt::Display for TileUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the host needs to create an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub template: TileUrlTemplate,
    pub opacity: f32,
    pub z_index: i32,
}

/// The map widget side of the radar overlay.
pub trait OverlayHost {
    /// Create and attach a new overlay.
    fn attach(&mut self, spec: OverlaySpec) -> LayerId;

    /// Remove an overlay from the map.
    fn detach(&mut self, id: LayerId);

    /// Point an existing overlay at a different tile set.
    fn set_url(&mut self, id: LayerId, template: &TileUrlTemplate);

    fn set_opacity(&mut self, id: LayerId, opacity: f32);
}

#[derive(Debug)]
struct ActiveLayer {
    id: LayerId,
    template: TileUrlTemplate,
}

/// Owner of the single radar overlay.
#[derive(Debug)]
pub struct TileLayer<H> {
    host: H,
    style: TileStyle,
    active: Option<ActiveLayer>,
}

impl<H: OverlayHost> TileLayer<H> {
    #[must_use]
    pub fn new(host: H, style: TileStyle) -> Self {
        Self {
            host,
            style,
            active: None,
        }
    }

    /// Show `frame` on the map.
    ///
    /// A new overlay is created when none exists or `force_new_layer` is set;
    /// the previous one is always detached first. Otherwise the existing
    /// overlay's URL is swapped in place.
    pub fn render(&mut self, tile_host: &str, frame: &Frame, force_new_layer: bool, opacity: f32) {
        let template = TileUrlTemplate::for_frame(tile_host, frame, &self.style);

        if !force_new_layer {
            if let Some(active) = self.active.as_mut() {
                if active.template != template {
                    self.host.set_url(active.id, &template);
                    active.template = template;
                }
                return;
            }
        }

        self.clear();
        let id = self.host.attach(OverlaySpec {
            template: template.clone(),
            opacity,
            z_index: RADAR_Z_INDEX,
        });
        debug!("Attached radar overlay {:?}: {}", id, template);
        self.active = Some(ActiveLayer { id, template });
    }

    /// Apply opacity to the current overlay, if any.
    pub fn set_opacity(&mut self, opacity: f32) {
        if let Some(active) = &self.active {
            self.host.set_opacity(active.id, opacity);
        }
    }

    /// Detach the overlay.
    pub fn clear(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Detaching radar overlay {:?}", active.id);
            self.host.detach(active.id);
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn current_template(&self) -> Option<&TileUrlTemplate> {
        self.active.as_ref().map(|active| &active.template)
    }

    #[must_use]
    pub fn style(&self) -> &TileStyle {
        &self.style
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::{LayerId, OverlayHost, OverlaySpec, TileUrlTemplate};

    /// Host double that records every call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingHost {
        next_id: u64,
        pub(crate) attached: HashMap<LayerId, OverlaySpec>,
        pub(crate) attach_calls: usize,
        pub(crate) detach_calls: usize,
        pub(crate) url_swaps: usize,
        pub(crate) max_attached: usize,
    }

    impl OverlayHost for RecordingHost {
        fn attach(&mut self, spec: OverlaySpec) -> LayerId {
            self.next_id += 1;
            let id = LayerId(self.next_id);
            self.attached.insert(id, spec);
            self.attach_calls += 1;
            self.max_attached = self.max_attached.max(self.attached.len());
            id
        }

        fn detach(&mut self, id: LayerId) {
            self.attached.remove(&id);
            self.detach_calls += 1;
        }

        fn set_url(&mut self, id: LayerId, template: &TileUrlTemplate) {
            if let Some(spec) = self.attached.get_mut(&id) {
                spec.template = template.clone();
            }
            self.url_swaps += 1;
        }

        fn set_opacity(&mut self, id: LayerId, opacity: f32) {
            if let Some(spec) = self.attached.get_mut(&id) {
                spec.opacity = opacity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingHost;
    use super::*;

    fn frame(timestamp: i64, path: &str) -> Frame {
        Frame {
            timestamp,
            path: path.to_string(),
        }
    }

    #[test]
    fn test_template_format() {
        let template = TileUrlTemplate::for_frame(
            "https://tilecache.rainviewer.com",
            &frame(100, "/v2/radar/abc"),
            &TileStyle::default(),
        );

        assert_eq!(
            template.as_str(),
            "https://tilecache.rainviewer.com/v2/radar/abc/256/{z}/{x}/{y}/2/1_1.png"
        );
        assert_eq!(
            template.expand(5, 10, 12),
            "https://tilecache.rainviewer.com/v2/radar/abc/256/5/10/12/2/1_1.png"
        );
    }

    #[test]
    fn test_first_render_attaches() {
        let mut layer = TileLayer::new(RecordingHost::default(), TileStyle::default());
        layer.render("https://h", &frame(1, "/a"), false, 0.5);

        assert!(layer.is_attached());
        assert_eq!(layer.host().attach_calls, 1);
        let spec = layer.host().attached.values().next().unwrap();
        assert_eq!(spec.z_index, RADAR_Z_INDEX);
        assert!((spec.opacity - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_subsequent_render_swaps_url_in_place() {
        let mut layer = TileLayer::new(RecordingHost::default(), TileStyle::default());
        layer.render("https://h", &frame(1, "/a"), false, 0.8);
        layer.render("https://h", &frame(2, "/b"), false, 0.8);

        assert_eq!(layer.host().attach_calls, 1);
        assert_eq!(layer.host().url_swaps, 1);
        let spec = layer.host().attached.values().next().unwrap();
        assert!(spec.template.as_str().contains("/b/256/"));
    }

    #[test]
    fn test_same_url_is_noop() {
        let mut layer = TileLayer::new(RecordingHost::default(), TileStyle::default());
        layer.render("https://h", &frame(1, "/a"), false, 0.8);
        layer.render("https://h", &frame(1, "/a"), false, 0.8);

        assert_eq!(layer.host().url_swaps, 0);
    }

    #[test]
    fn test_forced_render_never_leaves_two_overlays() {
        let mut layer = TileLayer::new(RecordingHost::default(), TileStyle::default());
        layer.render("https://h", &frame(1, "/a"), false, 0.8);
        layer.render("https://other", &frame(2, "/b"), true, 0.8);
        layer.render("https://other", &frame(3, "/c"), true, 0.8);

        assert_eq!(layer.host().attach_calls, 3);
        assert_eq!(layer.host().detach_calls, 2);
        assert_eq!(layer.host().attached.len(), 1);
        assert_eq!(layer.host().max_attached, 1);
    }

    #[test]
    fn test_opacity_targets_current_overlay() {
        let mut layer = TileLayer::new(RecordingHost::default(), TileStyle::default());
        layer.set_opacity(0.3);
        assert!(!layer.is_attached());

        layer.render("https://h", &frame(1, "/a"), false, 0.8);
        layer.set_opacity(0.3);
        let spec = layer.host().attached.values().next().unwrap();
        assert!((spec.opacity - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clear_detaches() {
        let mut layer = TileLayer::new(RecordingHost::default(), TileStyle::default());
        layer.render("https://h", &frame(1, "/a"), false, 0.8);
        layer.clear();
        layer.clear();

        assert!(!layer.is_attached());
        assert!(layer.host().attached.is_empty());
        assert_eq!(layer.host().detach_calls, 1);
    }
}

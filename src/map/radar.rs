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

//! Radar overlay backed by `walkers` tile loaders.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use nimbus_client::{LayerId, OverlayHost, OverlaySpec, TileUrlTemplate};
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpTiles, TileId};

use super::basemap::http_options;

/// Tile loaders kept alive so a looping animation does not refetch.
const MAX_TILE_SETS: usize = 32;

/// Tile source for one radar frame
#[derive(Debug, Clone)]
pub struct RadarTileSource {
    template: TileUrlTemplate,
}

impl RadarTileSource {
    pub fn new(template: TileUrlTemplate) -> Self {
        Self { template }
    }
}

impl TileSource for RadarTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.template.expand(tile_id.zoom, tile_id.x, tile_id.y)
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Radar © RainViewer",
            url: "https://www.rainviewer.com/",
            logo_light: None,
            logo_dark: None,
        }
    }
}

#[derive(Debug)]
struct RadarLayer {
    id: LayerId,
    template: TileUrlTemplate,
    opacity: f32,
}

/// The map side of the radar overlay.
///
/// Holds at most one attached layer. Each frame's tiles get their own
/// `HttpTiles` loader, so swapping the URL only changes which loader is drawn.
pub struct RadarOverlay {
    ctx: egui::Context,
    next_id: u64,
    layer: Option<RadarLayer>,
    tile_sets: HashMap<String, HttpTiles>,
}

impl fmt::Debug for RadarOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadarOverlay")
            .field("layer", &self.layer)
            .field("tile_sets", &self.tile_sets.len())
            .finish_non_exhaustive()
    }
}

impl RadarOverlay {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            next_id: 0,
            layer: None,
            tile_sets: HashMap::new(),
        }
    }

    /// Tiles and opacity of the attached layer, for drawing
    pub fn visible_layer(&mut self) -> Option<(&mut HttpTiles, f32)> {
        let layer = self.layer.as_ref()?;
        let tiles = self.tile_sets.get_mut(layer.template.as_str())?;
        Some((tiles, layer.opacity))
    }

    fn ensure_tiles(&mut self, template: &TileUrlTemplate) {
        if self.tile_sets.contains_key(template.as_str()) {
            return;
        }

        if self.tile_sets.len() >= MAX_TILE_SETS {
            debug!("Dropping {} cached radar tile sets", self.tile_sets.len());
            self.tile_sets.clear();
        }

        let source = RadarTileSource::new(template.clone());
        self.tile_sets.insert(
            template.as_str().to_owned(),
            HttpTiles::with_options(source, http_options("radar"), self.ctx.clone()),
        );
    }
}

impl OverlayHost for RadarOverlay {
    fn attach(&mut self, spec: OverlaySpec) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);

        self.ensure_tiles(&spec.template);
        self.layer = Some(RadarLayer {
            id,
            template: spec.template,
            opacity: spec.opacity,
        });
        self.ctx.request_repaint();
        id
    }

    fn detach(&mut self, id: LayerId) {
        if self.layer.as_ref().is_some_and(|layer| layer.id == id) {
            self.layer = None;
            // A new catalog may come from a different host
            self.tile_sets.clear();
            self.ctx.request_repaint();
        }
    }

    fn set_url(&mut self, id: LayerId, template: &TileUrlTemplate) {
        let attached = self.layer.as_ref().is_some_and(|layer| layer.id == id);
        if !attached {
            return;
        }

        self.ensure_tiles(template);
        if let Some(layer) = self.layer.as_mut() {
            layer.template = template.clone();
        }
        self.ctx.request_repaint();
    }

    fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        if let Some(layer) = self.layer.as_mut().filter(|layer| layer.id == id) {
            layer.opacity = opacity;
            self.ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_client::{Frame, TileStyle};

    #[test]
    fn test_radar_tile_url_uses_frame_path() {
        let frame = Frame {
            timestamp: 1_700_000_000,
            path: "/v2/radar/1700000000".to_string(),
        };
        let template = TileUrlTemplate::for_frame(
            "https://tilecache.rainviewer.com",
            &frame,
            &TileStyle::default(),
        );

        let url = RadarTileSource::new(template).tile_url(TileId { x: 20, y: 49, zoom: 7 });
        assert_eq!(
            url,
            "https://tilecache.rainviewer.com/v2/radar/1700000000/256/7/20/49/2/1_1.png"
        );
    }
}

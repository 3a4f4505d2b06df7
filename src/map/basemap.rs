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

use std::path::PathBuf;

use walkers::sources::{Attribution, OpenStreetMap, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

use crate::config::BaseMap;

/// Tile source for Carto CDN dark basemap tiles
/// Uses subdomain load balancing across a-d.basemaps.cartocdn.com
#[derive(Debug, Clone, Copy)]
pub struct CartoDarkSource;

impl TileSource for CartoDarkSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        let subdomain = ['a', 'b', 'c', 'd'][((tile_id.x + tile_id.y) % 4) as usize];

        format!(
            "https://{}.basemaps.cartocdn.com/dark_all/{}/{}/{}.png",
            subdomain, tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors, © CARTO",
            url: "https://carto.com/attributions",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// On-disk tile cache for one kind of layer
pub(crate) fn http_options(layer: &str) -> HttpOptions {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("nimbus-desktop")
        .join(layer);

    HttpOptions {
        cache: Some(cache_dir),
        ..Default::default()
    }
}

/// Create the tile loader for the configured base map
pub fn base_tiles(base_map: BaseMap, ctx: &egui::Context) -> HttpTiles {
    match base_map {
        BaseMap::OpenStreetMap => {
            HttpTiles::with_options(OpenStreetMap, http_options("osm"), ctx.clone())
        }
        BaseMap::CartoDark => {
            HttpTiles::with_options(CartoDarkSource, http_options("carto"), ctx.clone())
        }
    }
}

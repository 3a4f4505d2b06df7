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

//! Weather dashboard client library.
//!
//! Everything the Nimbus dashboard does that is not drawing lives here, so it
//! can be driven and tested without a window:
//!
//! - **Catalog layer**: radar metadata fetch and validation ([`RadarClient`])
//! - **Player layer**: frame animation state machine with a single playback
//!   timer ([`RadarPlayer`]) and the radar overlay it owns ([`TileLayer`])
//! - **Provider clients**: daily forecast ([`ForecastClient`]), place search
//!   ([`Geocoder`]) and IP geolocation ([`Locator`])
//! - **Refresh plumbing**: debounced map moves and stale-response filtering
//!
//! # Driving the player
//!
//! The map widget implements [`OverlayHost`], the control panel implements
//! [`ControlSurface`]. Timer ticks come back on a channel so the thread that
//! owns the player applies them:
//!
//! ```no_run
//! use nimbus_client::{ControlSurface, LayerId, OverlayHost, OverlaySpec, PlayerConfig};
//! use nimbus_client::{RadarClient, RadarPlayer, TileUrlTemplate};
//!
//! # struct Map;
//! # impl OverlayHost for Map {
//! #     fn attach(&mut self, _: OverlaySpec) -> LayerId { LayerId(1) }
//! #     fn detach(&mut self, _: LayerId) {}
//! #     fn set_url(&mut self, _: LayerId, _: &TileUrlTemplate) {}
//! #     fn set_opacity(&mut self, _: LayerId, _: f32) {}
//! # }
//! # struct Panel;
//! # impl ControlSurface for Panel {
//! #     fn show_position(&mut self, _: usize, _: usize, _: &str) {}
//! #     fn show_playing(&mut self, _: bool) {}
//! #     fn show_unavailable(&mut self, _: &str) {}
//! #     fn opacity(&self) -> f32 { 0.8 }
//! # }
//! #[tokio::main]
//! async fn main() -> Result<(), nimbus_client::FetchError> {
//!     let radar = RadarClient::new(nimbus_client::http_client()?);
//!     let (mut player, mut ticks) = RadarPlayer::new(
//!         Map,
//!         Panel,
//!         PlayerConfig::default(),
//!         tokio::runtime::Handle::current(),
//!     );
//!
//!     let catalog = radar.load().await?.into_option().unwrap_or_default();
//!     player.load_catalog(catalog);
//!     player.start();
//!
//!     while let Some(tick) = ticks.recv().await {
//!         player.on_tick(tick);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod control;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod locate;
pub mod location;
pub mod overlay;
pub mod player;
pub mod refresh;

use std::time::Duration;

pub use catalog::{Frame, FrameCatalog, RadarClient};
pub use control::ControlSurface;
pub use error::{FetchError, Outcome};
pub use forecast::{DailyForecast, DayForecast, ForecastClient, Units, WeatherCondition};
pub use geocode::{Geocoder, Place};
pub use locate::Locator;
pub use location::Coordinates;
pub use overlay::{LayerId, OverlayHost, OverlaySpec, TileLayer, TileStyle, TileUrlTemplate};
pub use player::{PlayerConfig, PlayerState, RadarPlayer, TimerTick};
pub use refresh::{Debouncer, RequestSequencer, RequestToken};

/// Timeout applied to every provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Build the HTTP client shared by all provider clients.
pub fn http_client() -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("nimbus-desktop/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(4)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

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

//! The dashboard window.
//!
//! `NimbusApp` owns every piece of state. Network requests run on the tokio
//! runtime and report back as [`AppEvent`]s, which are drained at the start
//! of each egui frame together with playback ticks and debounced map moves.

use std::time::Duration;

use eframe::egui;
use log::{debug, info, warn};
use nimbus_client::refresh::DEFAULT_QUIET_PERIOD;
use nimbus_client::{
    ControlSurface, Coordinates, DailyForecast, Debouncer, FetchError, ForecastClient,
    FrameCatalog, Geocoder, Locator, Outcome, Place, PlayerConfig, RadarClient, RadarPlayer,
    RequestSequencer, RequestToken, TimerTick, Units,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use walkers::{HttpTiles, Map, MapMemory, Position};

use crate::config::AppConfig;
use crate::map::marker::{coordinates, position};
use crate::map::{base_tiles, PlaceMarker, RadarOverlay};
use crate::status::StatusLog;
use crate::ui::{
    ForecastPanel, ForecastView, RadarControls, SearchPanel, StatusPane, StatusSummary, UiAction,
};

/// Zoom applied when jumping to a located or searched place
const PLACE_ZOOM: f64 = 9.0;

/// Map moves smaller than this (degrees) do not refresh the forecast
const CENTER_EPSILON: f64 = 1e-4;

/// How often the window wakes to drain timer ticks while animating
const TICK_POLL: Duration = Duration::from_millis(50);

/// Results of background work, delivered to the GUI thread.
#[derive(Debug)]
pub enum AppEvent {
    CatalogLoaded(Result<Outcome<FrameCatalog>, FetchError>),
    ForecastLoaded(RequestToken, Result<Outcome<DailyForecast>, FetchError>),
    SearchResults(RequestToken, Result<Outcome<Vec<Place>>, FetchError>),
    Located(Result<Coordinates, FetchError>),
}

/// Network clients shared by background tasks
#[derive(Debug, Clone)]
struct Clients {
    radar: RadarClient,
    forecast: ForecastClient,
    geocoder: Geocoder,
    locator: Locator,
}

impl Clients {
    fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let http = nimbus_client::http_client()?;
        Ok(Self {
            radar: RadarClient::with_api_url(http.clone(), &config.radar_api_url),
            forecast: ForecastClient::with_api_url(http.clone(), &config.forecast_api_url),
            geocoder: Geocoder::with_api_url(http.clone(), &config.geocoding_api_url)
                .with_max_results(config.search_result_limit),
            locator: Locator::new(http),
        })
    }
}

pub struct NimbusApp {
    config: AppConfig,
    runtime: Handle,
    clients: Clients,
    ctx: egui::Context,

    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,

    player: RadarPlayer<RadarOverlay, RadarControls>,
    ticks: mpsc::UnboundedReceiver<TimerTick>,

    debouncer: Debouncer<Coordinates>,
    moves: mpsc::UnboundedReceiver<Coordinates>,
    forecast_requests: RequestSequencer,
    search_requests: RequestSequencer,

    base_tiles: HttpTiles,
    map_memory: MapMemory,
    my_position: Position,
    marker: Option<PlaceMarker>,
    last_center: Coordinates,
    units: Units,

    forecast_panel: ForecastPanel,
    search_panel: SearchPanel,
    status: StatusLog,
    status_pane: StatusPane,
}

impl NimbusApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        runtime: Handle,
    ) -> Result<Self, FetchError> {
        let ctx = cc.egui_ctx.clone();
        let clients = Clients::new(&config)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let controls = RadarControls::new(config.radar_opacity, config.playback_interval());
        let player_config = PlayerConfig {
            interval: config.playback_interval(),
            ..PlayerConfig::default()
        };
        let (player, ticks) = RadarPlayer::new(
            RadarOverlay::new(ctx.clone()),
            controls,
            player_config,
            runtime.clone(),
        );

        let (debouncer, moves) = Debouncer::new(runtime.clone(), DEFAULT_QUIET_PERIOD);

        let home = config.home();
        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(config.default_zoom).is_err() {
            warn!("Ignoring invalid zoom level {}", config.default_zoom);
        }

        let mut app = Self {
            base_tiles: base_tiles(config.base_map, &ctx),
            units: config.units,
            config,
            runtime,
            clients,
            ctx,
            events_tx,
            events_rx,
            player,
            ticks,
            debouncer,
            moves,
            forecast_requests: RequestSequencer::new(),
            search_requests: RequestSequencer::new(),
            map_memory,
            my_position: position(home),
            marker: None,
            last_center: home,
            forecast_panel: ForecastPanel::default(),
            search_panel: SearchPanel::default(),
            status: StatusLog::new(),
            status_pane: StatusPane::new(),
        };

        app.refresh_radar();
        app.refresh_forecast(home);
        Ok(app)
    }

    /// Run `work` on the runtime and post its result back to the GUI thread
    fn spawn<F>(&self, work: F)
    where
        F: std::future::Future<Output = AppEvent> + Send + 'static,
    {
        let events = self.events_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = work.await;
            if events.send(event).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    fn refresh_radar(&mut self) {
        info!("Loading radar catalog");
        let radar = self.clients.radar.clone();
        self.spawn(async move { AppEvent::CatalogLoaded(radar.load().await) });
    }

    fn refresh_forecast(&mut self, location: Coordinates) {
        debug!("Requesting forecast for {}", location);
        let token = self.forecast_requests.issue();
        let client = self.clients.forecast.clone();
        let units = self.units;
        self.forecast_panel.view = ForecastView::Loading;
        self.spawn(async move {
            AppEvent::ForecastLoaded(token, client.fetch(location, units).await)
        });
    }

    fn search(&mut self, query: String) {
        let token = self.search_requests.issue();
        let geocoder = self.clients.geocoder.clone();
        self.search_panel.begin_search();
        self.spawn(async move { AppEvent::SearchResults(token, geocoder.search(&query).await) });
    }

    fn locate(&mut self) {
        if let Some(location) = self.config.override_location() {
            info!("Using configured location {}", location);
            self.handle_event(AppEvent::Located(Ok(location)));
            return;
        }

        self.search_panel.set_locating(true);
        let locator = self.clients.locator.clone();
        self.spawn(async move { AppEvent::Located(locator.current().await) });
    }

    /// Recentre and mark the map on `location`, then refresh the forecast right away
    fn go_to(&mut self, location: Coordinates, place_name: Option<String>) {
        self.my_position = position(location);
        self.marker = Some(PlaceMarker::new(location, place_name.clone()));
        self.map_memory.follow_my_position();
        if self.map_memory.set_zoom(PLACE_ZOOM).is_err() {
            warn!("Could not zoom to {}", PLACE_ZOOM);
        }

        self.debouncer.cancel();
        self.last_center = location;
        self.forecast_panel.place_name = place_name;
        self.refresh_forecast(location);
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save() {
            self.status.warn(format!("Failed to save settings: {e}"));
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CatalogLoaded(Ok(Outcome::Available(catalog))) => {
                self.status
                    .info(format!("Radar updated: {} frames", catalog.len()));
                self.player.load_catalog(catalog);
            }
            AppEvent::CatalogLoaded(Ok(Outcome::Unavailable)) => {
                self.status.warn("No radar frames available.");
                self.player.load_catalog(FrameCatalog::empty());
            }
            AppEvent::CatalogLoaded(Err(e)) => {
                self.status.error(format!("Failed to load radar data: {e}"));
                self.player.load_failed();
            }
            AppEvent::ForecastLoaded(token, result) => {
                if !self.forecast_requests.accept(token) {
                    debug!("Dropping stale forecast response {:?}", token);
                    return;
                }
                self.forecast_panel.view = match result {
                    Ok(Outcome::Available(forecast)) => ForecastView::Ready(forecast),
                    Ok(Outcome::Unavailable) => {
                        self.status.warn("Forecast unavailable for this location");
                        ForecastView::Unavailable("Forecast unavailable.".to_string())
                    }
                    Err(e) => {
                        self.status.error(format!("Failed to load forecast: {e}"));
                        ForecastView::Unavailable("Failed to load forecast.".to_string())
                    }
                };
            }
            AppEvent::SearchResults(token, result) => {
                if !self.search_requests.accept(token) {
                    debug!("Dropping stale search response {:?}", token);
                    return;
                }
                match result {
                    Ok(Outcome::Available(places)) => self.search_panel.set_results(places),
                    Ok(Outcome::Unavailable) => self.search_panel.set_message("No places found."),
                    Err(e) => {
                        self.status.error(format!("Place search failed: {e}"));
                        self.search_panel.set_message("Search failed.");
                    }
                }
            }
            AppEvent::Located(result) => {
                self.search_panel.set_locating(false);
                match result {
                    Ok(location) => {
                        self.status.info(format!("Located at {location}"));
                        self.go_to(location, Some("My location".to_string()));
                    }
                    Err(e) => self.status.error(format!("Could not get your location: {e}")),
                }
            }
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Seek(index) => {
                self.player.seek(i64::try_from(index).unwrap_or(i64::MAX));
            }
            UiAction::StepBack => self.player.step_back(),
            UiAction::StepForward => self.player.step_forward(),
            UiAction::TogglePlayback => self.player.toggle(),
            UiAction::OpacityChanged => {
                self.player.apply_opacity();
                self.config.radar_opacity = self.player.controls().opacity();
            }
            UiAction::IntervalChanged(interval) => {
                self.player.set_interval(interval);
                self.config.playback_interval_ms = self.player.controls().interval_ms();
            }
            UiAction::SettingsCommitted => self.save_config(),
            UiAction::RefreshRadar => self.refresh_radar(),
            UiAction::Search(query) => self.search(query),
            UiAction::SelectPlace(place) => {
                let name = place.display_name();
                self.status.info(format!("Showing {name}"));
                self.go_to(place.coordinates, Some(name));
            }
            UiAction::Locate => self.locate(),
            UiAction::ToggleUnits => {
                self.units = self.units.toggled();
                self.config.units = self.units;
                self.save_config();
                self.refresh_forecast(self.last_center);
            }
        }
    }

    /// Drain background results, playback ticks and debounced moves
    fn drain_channels(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }

        while let Ok(tick) = self.ticks.try_recv() {
            self.player.on_tick(tick);
        }

        let mut settled = None;
        while let Ok(center) = self.moves.try_recv() {
            settled = Some(center);
        }
        if let Some(center) = settled {
            info!("Map settled at {}", center);
            self.forecast_panel.place_name = None;
            self.refresh_forecast(center);
        }
    }

    fn map_center(&self) -> Coordinates {
        coordinates(self.map_memory.detached().unwrap_or(self.my_position))
    }

    /// Debounce a forecast refresh when the user has panned the map
    fn track_map_center(&mut self) {
        let center = self.map_center();
        if center_moved(self.last_center, center) {
            self.last_center = center;
            self.debouncer.trigger(center);
            self.ctx
                .request_repaint_after(DEFAULT_QUIET_PERIOD + TICK_POLL);
        }
    }

    fn status_summary(&self) -> StatusSummary {
        StatusSummary {
            frame_count: self.player.catalog().len(),
            generated: self.player.catalog().generated(),
            playing: self.player.is_playing(),
            center: self.last_center,
        }
    }
}

/// Whether the map centre has moved far enough to refresh the forecast
fn center_moved(last: Coordinates, center: Coordinates) -> bool {
    let moved = (center.latitude - last.latitude).abs() > CENTER_EPSILON
        || (center.longitude - last.longitude).abs() > CENTER_EPSILON;
    moved && center.is_valid()
}

impl eframe::App for NimbusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_channels();

        let mut actions = Vec::new();

        egui::SidePanel::right("side_panel")
            .resizable(false)
            .exact_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.player.controls_mut().show(ui, &mut actions);
                    ui.separator();
                    self.search_panel.show(ui, &mut actions);
                    ui.separator();
                    self.forecast_panel.show(ui, self.units, &mut actions);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let mut map = Map::new(
                    Some(&mut self.base_tiles),
                    &mut self.map_memory,
                    self.my_position,
                );
                if let Some((radar, opacity)) = self.player.overlay_host_mut().visible_layer() {
                    map = map.with_layer(radar, opacity);
                }
                if let Some(marker) = &self.marker {
                    map = map.with_plugin(marker.clone());
                }
                ui.add(map);
            });

        let summary = self.status_summary();
        self.status_pane.render(ctx, &mut self.status, &summary);

        for action in actions {
            self.apply(action);
        }

        self.track_map_center();

        if self.player.is_playing() {
            ctx.request_repaint_after(TICK_POLL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: Coordinates = Coordinates {
        latitude: 38.58,
        longitude: -121.49,
    };

    #[test]
    fn test_small_drift_is_not_a_move() {
        let drift = Coordinates::new(HOME.latitude + 5e-5, HOME.longitude - 5e-5);
        assert!(!center_moved(HOME, drift));
        assert!(!center_moved(HOME, HOME));
    }

    #[test]
    fn test_pan_on_either_axis_is_a_move() {
        assert!(center_moved(HOME, Coordinates::new(HOME.latitude + 0.01, HOME.longitude)));
        assert!(center_moved(HOME, Coordinates::new(HOME.latitude, HOME.longitude - 0.01)));
    }

    #[test]
    fn test_invalid_center_is_ignored() {
        assert!(!center_moved(HOME, Coordinates::new(91.0, HOME.longitude)));
    }

    #[test]
    fn test_map_position_round_trips_coordinates() {
        let center = coordinates(position(HOME));
        assert!(!center_moved(HOME, center));
        assert!((center.longitude - HOME.longitude).abs() < 1e-9);
    }
}

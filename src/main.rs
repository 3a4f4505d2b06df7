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

mod app;
mod config;
mod map;
mod status;
mod ui;

use clap::{Parser, ValueEnum};
use eframe::egui;
use log::{info, warn};
use mimalloc::MiMalloc;
use nimbus_client::Units;

use app::NimbusApp;
use config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const APP_TITLE: &str = "Nimbus";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for Units {
    fn from(units: UnitsArg) -> Self {
        match units {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
        }
    }
}

/// Weather dashboard with animated precipitation radar
#[derive(Parser, Debug)]
#[command(name = "nimbus-desktop", version, about)]
struct Cli {
    /// Starting latitude (overrides the configured home)
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Starting longitude (overrides the configured home)
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Starting zoom level
    #[arg(long)]
    zoom: Option<f64>,

    /// Temperature units for the forecast
    #[arg(long, value_enum)]
    units: Option<UnitsArg>,

    /// Log filter, e.g. `debug` or `nimbus_client=trace` (RUST_LOG wins when set)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Apply command line overrides on top of the stored configuration
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(lat) = self.lat {
            config.home_latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.home_longitude = lon;
        }
        if let Some(zoom) = self.zoom {
            config.default_zoom = zoom;
        }
        if let Some(units) = self.units {
            config.units = units.into();
        }
        config.sanitized()
    }
}

fn load_config() -> AppConfig {
    match AppConfig::load() {
        Ok(config) => {
            if let Ok(path) = AppConfig::get_config_path() {
                info!("Loaded configuration from {}", path.display());
            }
            config
        }
        Err(e) => {
            warn!("Failed to load configuration, using defaults: {e}");
            AppConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting Nimbus Desktop {}", env!("CARGO_PKG_VERSION"));

    let config = cli.apply(load_config());

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("nimbus-worker")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {e}");
            return Err(eframe::Error::AppCreation(Box::new(e)));
        }
    };
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    let result = eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(NimbusApp::new(cc, config, handle)?))),
    );

    runtime.shutdown_background();
    result
}

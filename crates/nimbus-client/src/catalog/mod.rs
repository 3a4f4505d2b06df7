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

//! Radar frame catalog.
//!
//! Fetches the RainViewer weather-maps document and turns its `past`, `now`
//! and `future` bands into one chronological list of [`Frame`]s. Malformed
//! entries are dropped one by one; they never fail the whole batch.

use chrono::{DateTime, Local};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{get_text, FetchError, Outcome};

/// Public RainViewer metadata endpoint.
pub const DEFAULT_RADAR_API_URL: &str = "https://api.rainviewer.com/public/weather-maps.json";

/// Tile host used when the metadata document does not name one.
pub const DEFAULT_TILE_HOST: &str = "https://tilecache.rainviewer.com";

const PROVIDER: &str = "radar metadata";

/// One radar snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Opaque token addressing the tile set for this timestamp.
    pub path: String,
}

impl Frame {
    /// Human-readable label shown next to the position slider.
    #[must_use]
    pub fn label(&self) -> String {
        frame_label(self.timestamp)
    }
}

/// Format a frame timestamp in local time.
#[must_use]
pub fn frame_label(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => format!("Frame: {}", utc.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
        None => format!("Frame: {timestamp}"),
    }
}

/// Ordered frames for the current animation window, oldest first.
///
/// Replaced wholesale on every successful fetch; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameCatalog {
    host: String,
    generated: Option<i64>,
    frames: Vec<Frame>,
}

impl FrameCatalog {
    /// Build a catalog, dropping frames that would break chronological order.
    #[must_use]
    pub fn new(host: impl Into<String>, frames: Vec<Frame>) -> Self {
        let mut kept: Vec<Frame> = Vec::with_capacity(frames.len());
        for frame in frames {
            if frame.timestamp < 0 || frame.path.is_empty() {
                debug!("Dropping invalid radar frame {:?}", frame);
                continue;
            }
            if let Some(previous) = kept.last() {
                if frame.timestamp < previous.timestamp {
                    debug!(
                        "Dropping out-of-order radar frame {} (previous {})",
                        frame.timestamp, previous.timestamp
                    );
                    continue;
                }
            }
            kept.push(frame);
        }

        Self {
            host: host.into(),
            generated: None,
            frames: kept,
        }
    }

    /// A catalog with no frames.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_generated(mut self, generated: Option<i64>) -> Self {
        self.generated = generated;
        self
    }

    /// Tile host every frame path is relative to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// When the provider generated this document, if reported.
    #[must_use]
    pub fn generated(&self) -> Option<i64> {
        self.generated
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the most recent frame.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }
}

#[derive(Debug, Deserialize)]
struct WeatherMapsDocument {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    generated: Value,
    #[serde(default)]
    radar: RadarBands,
}

#[derive(Debug, Default, Deserialize)]
struct RadarBands {
    #[serde(default)]
    past: Value,
    #[serde(default)]
    now: Value,
    #[serde(default)]
    future: Value,
    #[serde(default)]
    nowcast: Value,
}

impl RadarBands {
    /// Concatenate the bands in chronological order.
    fn entries(&self) -> impl Iterator<Item = &Value> {
        let now: &[Value] = match &self.now {
            Value::Object(_) => std::slice::from_ref(&self.now),
            _ => &[],
        };

        band(&self.past)
            .iter()
            .chain(now.iter())
            .chain(band(&self.future).iter())
            .chain(band(&self.nowcast).iter())
    }
}

fn band(value: &Value) -> &[Value] {
    value.as_array().map_or(&[][..], Vec::as_slice)
}

fn integral_seconds(value: &Value) -> Option<i64> {
    if let Some(seconds) = value.as_i64() {
        return Some(seconds);
    }
    let seconds = value.as_f64()?;
    if !seconds.is_finite() || seconds.fract() != 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, reason = "integral value checked above")]
    let seconds = seconds as i64;
    Some(seconds)
}

fn parse_frame(entry: &Value) -> Option<Frame> {
    let timestamp = entry.get("time").and_then(integral_seconds)?;
    if timestamp < 0 {
        return None;
    }

    let path = entry.get("path")?.as_str()?;
    if path.is_empty() {
        return None;
    }

    Some(Frame {
        timestamp,
        path: path.to_string(),
    })
}

/// Parse a weather-maps document into a catalog.
///
/// Returns an error only when the document itself is not a JSON object of
/// the expected shape; individual bad frames are skipped.
pub fn parse_weather_maps(body: &str) -> Result<FrameCatalog, FetchError> {
    let document: WeatherMapsDocument =
        serde_json::from_str(body).map_err(FetchError::malformed(PROVIDER))?;

    let mut dropped = 0usize;
    let frames: Vec<Frame> = document
        .radar
        .entries()
        .filter_map(|entry| {
            let frame = parse_frame(entry);
            if frame.is_none() {
                dropped += 1;
            }
            frame
        })
        .collect();

    if dropped > 0 {
        debug!("Dropped {} malformed radar frame(s)", dropped);
    }

    let host = document
        .host
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_TILE_HOST.to_string());

    Ok(FrameCatalog::new(host, frames).with_generated(integral_seconds(&document.generated)))
}

/// Client for the radar metadata provider.
#[derive(Debug, Clone)]
pub struct RadarClient {
    client: reqwest::Client,
    api_url: String,
}

impl RadarClient {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_api_url(client, DEFAULT_RADAR_API_URL)
    }

    #[must_use]
    pub fn with_api_url(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Fetch the current frame catalog.
    pub async fn load(&self) -> Result<Outcome<FrameCatalog>, FetchError> {
        debug!("Fetching radar metadata: {}", self.api_url);

        let body = get_text(PROVIDER, self.client.get(&self.api_url)).await?;
        let catalog = parse_weather_maps(&body)?;

        if catalog.is_empty() {
            info!("Radar metadata contained no usable frames");
            return Ok(Outcome::Unavailable);
        }

        info!(
            "Loaded {} radar frame(s) from {}",
            catalog.len(),
            catalog.host()
        );
        Ok(Outcome::Available(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "version": "2.0",
        "generated": 1700000600,
        "host": "https://tilecache.rainviewer.com",
        "radar": {
            "past": [
                {"time": 1700000000, "path": "/v2/radar/a"},
                {"time": 1700000600, "path": "/v2/radar/b"}
            ],
            "nowcast": [
                {"time": 1700001200, "path": "/v2/radar/c"}
            ]
        }
    }"#;

    #[test]
    fn test_parse_bands_in_order() {
        let catalog = parse_weather_maps(DOCUMENT).unwrap();

        assert_eq!(catalog.host(), "https://tilecache.rainviewer.com");
        assert_eq!(catalog.generated(), Some(1_700_000_600));
        let paths: Vec<&str> = catalog.frames().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["/v2/radar/a", "/v2/radar/b", "/v2/radar/c"]);
        assert_eq!(catalog.last_index(), Some(2));
    }

    #[test]
    fn test_now_is_placed_between_past_and_future() {
        let body = r#"{
            "host": "https://tiles.example",
            "radar": {
                "past": [{"time": 100, "path": "/a"}],
                "now": {"time": 200, "path": "/b"},
                "future": [{"time": 300, "path": "/c"}]
            }
        }"#;

        let catalog = parse_weather_maps(body).unwrap();
        let times: Vec<i64> = catalog.frames().iter().map(|f| f.timestamp).collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn test_malformed_frames_are_dropped() {
        let body = r#"{
            "host": "https://tiles.example",
            "radar": {
                "past": [
                    {"time": "yesterday", "path": "/bad-time"},
                    {"time": 100, "path": ""},
                    {"time": 150},
                    42,
                    {"time": 200, "path": "/good"},
                    {"time": -5, "path": "/negative"}
                ]
            }
        }"#;

        let catalog = parse_weather_maps(body).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().path, "/good");
    }

    #[test]
    fn test_non_array_band_treated_as_empty() {
        let body = r#"{"radar": {"past": "oops", "now": null, "future": [{"time": 1, "path": "/x"}]}}"#;

        let catalog = parse_weather_maps(body).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.host(), DEFAULT_TILE_HOST);
    }

    #[test]
    fn test_missing_radar_section_is_empty_catalog() {
        let catalog = parse_weather_maps(r#"{"host": "https://tiles.example"}"#).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.last_index(), None);
    }

    #[test]
    fn test_out_of_order_frames_are_dropped() {
        let catalog = FrameCatalog::new(
            "https://tiles.example",
            vec![
                Frame { timestamp: 300, path: "/c".into() },
                Frame { timestamp: 100, path: "/a".into() },
                Frame { timestamp: 300, path: "/d".into() },
            ],
        );

        let paths: Vec<&str> = catalog.frames().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["/c", "/d"]);
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = parse_weather_maps("<html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn test_frame_label_prefix() {
        let frame = Frame { timestamp: 300, path: "/c".into() };
        assert!(frame.label().starts_with("Frame: "));
        assert_eq!(frame.label(), frame_label(300));
    }
}

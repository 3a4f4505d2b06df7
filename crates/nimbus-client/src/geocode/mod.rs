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

//! Place-name search (Open-Meteo geocoding).

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{get_text, FetchError, Outcome};
use crate::location::Coordinates;

/// Open-Meteo geocoding endpoint.
pub const DEFAULT_GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Matches requested when no limit is configured.
pub const DEFAULT_MAX_RESULTS: usize = 5;

const PROVIDER: &str = "geocoder";

/// A ranked place match.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    /// First-level administrative area (state, province).
    pub region: Option<String>,
    pub country: Option<String>,
    pub coordinates: Coordinates,
}

impl Place {
    /// "Name, Region, Country" with empty parts left out.
    #[must_use]
    pub fn display_name(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.region.as_deref())
            .chain(self.country.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct SearchDocument {
    #[serde(default)]
    results: Value,
}

fn text(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
}

fn place(entry: &Value) -> Option<Place> {
    let name = text(entry, "name")?;
    let latitude = entry.get("latitude").and_then(Value::as_f64)?;
    let longitude = entry.get("longitude").and_then(Value::as_f64)?;
    let coordinates = Coordinates::new(latitude, longitude);
    if !coordinates.is_valid() {
        return None;
    }

    Some(Place {
        name,
        region: text(entry, "admin1"),
        country: text(entry, "country"),
        coordinates,
    })
}

/// Parse a search response, keeping at most `limit` valid places.
pub fn parse_places(body: &str, limit: usize) -> Result<Vec<Place>, FetchError> {
    let document: SearchDocument =
        serde_json::from_str(body).map_err(FetchError::malformed(PROVIDER))?;

    let entries = document.results.as_array().map_or(&[][..], Vec::as_slice);
    Ok(entries
        .iter()
        .filter_map(|entry| {
            let place = place(entry);
            if place.is_none() {
                debug!("Dropping malformed place entry {}", entry);
            }
            place
        })
        .take(limit)
        .collect())
}

/// Client for the place-name geocoder.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    api_url: String,
    max_results: usize,
}

impl Geocoder {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_api_url(client, DEFAULT_GEOCODING_API_URL)
    }

    #[must_use]
    pub fn with_api_url(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Search for places matching `query`.
    ///
    /// A blank query resolves to `Unavailable` without touching the network.
    pub async fn search(&self, query: &str) -> Result<Outcome<Vec<Place>>, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Outcome::Unavailable);
        }

        debug!("Searching places for {:?}", query);

        let request = self.client.get(&self.api_url).query(&[
            ("name", query.to_string()),
            ("count", self.max_results.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ]);

        let body = get_text(PROVIDER, request).await?;
        let places = parse_places(&body, self.max_results)?;

        if places.is_empty() {
            return Ok(Outcome::Unavailable);
        }
        Ok(Outcome::Available(places))
    }
}

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

//! IP-based geolocation for the "locate me" action.

use log::{info, warn};
use serde_json::Value;

use crate::error::{get_text, FetchError};
use crate::location::Coordinates;

const PROVIDER: &str = "geolocation";

/// A lookup service and the JSON keys it reports coordinates under.
#[derive(Debug, Clone)]
struct LookupService {
    url: String,
    latitude_key: &'static str,
    longitude_key: &'static str,
}

/// Resolves the machine's approximate location.
///
/// Services are tried in order until one returns usable coordinates.
#[derive(Debug, Clone)]
pub struct Locator {
    client: reqwest::Client,
    services: Vec<LookupService>,
}

impl Locator {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            services: vec![
                LookupService {
                    url: "https://ipapi.co/json/".to_string(),
                    latitude_key: "latitude",
                    longitude_key: "longitude",
                },
                // No API key needed
                LookupService {
                    url: "http://ip-api.com/json/".to_string(),
                    latitude_key: "lat",
                    longitude_key: "lon",
                },
            ],
        }
    }

    /// Look up the current location.
    pub async fn current(&self) -> Result<Coordinates, FetchError> {
        let mut last_error = FetchError::NotFound { provider: PROVIDER };

        for service in &self.services {
            match self.query(service).await {
                Ok(coordinates) => {
                    info!("Location found via {}: {}", service.url, coordinates);
                    return Ok(coordinates);
                }
                Err(e) => {
                    warn!("Location lookup via {} failed: {}", service.url, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn query(&self, service: &LookupService) -> Result<Coordinates, FetchError> {
        let body = get_text(PROVIDER, self.client.get(&service.url)).await?;
        parse_location(&body, service.latitude_key, service.longitude_key)
    }
}

fn parse_location(
    body: &str,
    latitude_key: &str,
    longitude_key: &str,
) -> Result<Coordinates, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(FetchError::malformed(PROVIDER))?;

    match (
        value.get(latitude_key).and_then(Value::as_f64),
        value.get(longitude_key).and_then(Value::as_f64),
    ) {
        (Some(latitude), Some(longitude)) => {
            let coordinates = Coordinates::new(latitude, longitude);
            if coordinates.is_valid() {
                Ok(coordinates)
            } else {
                Err(FetchError::NotFound { provider: PROVIDER })
            }
        }
        _ => Err(FetchError::NotFound { provider: PROVIDER }),
    }
}

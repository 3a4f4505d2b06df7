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

//! Error and outcome types shared by the provider clients.

use thiserror::Error;

/// Errors that can occur while talking to an external provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("malformed {provider} response: {source}")]
    Malformed {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} did not return a usable result")]
    NotFound { provider: &'static str },
}

impl FetchError {
    pub(crate) fn malformed(provider: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Malformed { provider, source }
    }
}

/// Result of a request that succeeded at the transport level.
///
/// An empty catalog, a forecast with no days or a search with no matches is
/// not an error; callers render an explicit "unavailable" state instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Available(T),
    Unavailable,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Convert into an `Option`, dropping the "unavailable" distinction.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

/// Send a GET request and return the body, mapping non-success statuses.
pub(crate) async fn get_text(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<String, FetchError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            provider,
            status: response.status().as_u16(),
        });
    }

    Ok(response.text().await?)
}

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

//! Rate limiting and ordering for location-driven refreshes.
//!
//! Map moves arrive in bursts; [`Debouncer`] turns each burst into a single
//! delivery once the map has been quiet for a while. Fetches are never
//! cancelled, so [`RequestSequencer`] lets the caller drop any response that
//! is not from the most recent request.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Quiet period before a map move triggers a forecast refresh.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(900);

/// Delivers only the last value of a burst, after a quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    runtime: Handle,
    quiet: Duration,
    output: mpsc::UnboundedSender<T>,
    pending: Option<CancellationToken>,
}

impl<T: Send + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(runtime: Handle, quiet: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (output, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            runtime,
            quiet,
            output,
            pending: None,
        };
        (debouncer, rx)
    }

    /// Schedule `value`, superseding anything still waiting.
    pub fn trigger(&mut self, value: T) {
        self.cancel();

        let token = CancellationToken::new();
        let task_token = token.clone();
        let output = self.output.clone();
        let quiet = self.quiet;

        self.runtime.spawn(async move {
            tokio::select! {
                () = task_token.cancelled() => {}
                () = sleep(quiet) => {
                    let _ = output.send(value);
                }
            }
        });

        self.pending = Some(token);
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Hands out monotonically increasing request tokens.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for a new request; all earlier tokens become stale.
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// True when `token` belongs to the most recent request.
    #[must_use]
    pub fn accept(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_delivers_last_value_once() {
        let (mut debouncer, mut rx) = Debouncer::new(Handle::current(), DEFAULT_QUIET_PERIOD);

        debouncer.trigger(1);
        sleep(Duration::from_millis(300)).await;
        debouncer.trigger(2);
        sleep(Duration::from_millis(300)).await;
        debouncer.trigger(3);

        sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(rx.try_recv().ok(), Some(3));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_deliver() {
        let (mut debouncer, mut rx) = Debouncer::new(Handle::current(), DEFAULT_QUIET_PERIOD);

        debouncer.trigger("a");
        sleep(Duration::from_millis(1000)).await;
        debouncer.trigger("b");
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(rx.try_recv().ok(), Some("a"));
        assert_eq!(rx.try_recv().ok(), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let (mut debouncer, mut rx) = Debouncer::new(Handle::current(), DEFAULT_QUIET_PERIOD);

        debouncer.trigger(7);
        debouncer.cancel();
        sleep(Duration::from_millis(2000)).await;

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_only_latest_token_accepted() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(first < second);
        assert!(!sequencer.accept(first));
        assert!(sequencer.accept(second));

        let third = sequencer.issue();
        assert!(!sequencer.accept(second));
        assert!(sequencer.accept(third));
    }
}

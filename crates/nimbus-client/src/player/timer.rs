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

//! Recurring playback timer.

use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// One firing of a playback timer.
///
/// `generation` identifies the timer that produced it, so ticks still queued
/// after a restart can be told apart from live ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub generation: u64,
}

/// Handle to a running timer task. Dropping it cancels the task.
#[derive(Debug)]
pub(crate) struct PlaybackTimer {
    generation: u64,
    cancel_token: CancellationToken,
}

impl PlaybackTimer {
    pub(crate) fn spawn(
        runtime: &Handle,
        interval: Duration,
        generation: u64,
        ticks: mpsc::UnboundedSender<TimerTick>,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();

        runtime.spawn(async move {
            let mut interval = tokio::time::interval(interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    () = task_cancel.cancelled() => {
                        debug!("Playback timer {} cancelled", generation);
                        return;
                    }
                    _ = interval.tick() => {
                        if ticks.send(TimerTick { generation }).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Self {
            generation,
            cancel_token,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

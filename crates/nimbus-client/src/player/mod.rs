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

//! Radar frame player.
//!
//! Turns a [`FrameCatalog`] into a loopable animation. The player owns the
//! current index, the single playback timer and the radar overlay, and keeps
//! the control surface in sync with every index change.
//!
//! State machine:
//!
//! - `Empty`: no frames; `seek`, `step` and `start` do nothing.
//! - `Idle`: paused on a valid frame.
//! - `Playing`: a timer advances one frame per interval, wrapping at the end.
//!
//! Timer ticks are delivered through a channel and fed back with
//! [`RadarPlayer::on_tick`] from the thread that owns the player.

mod timer;

use std::time::Duration;

use log::{debug, info};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::catalog::{Frame, FrameCatalog};
use crate::control::ControlSurface;
use crate::overlay::{OverlayHost, TileLayer, TileStyle};

pub use timer::TimerTick;
use timer::PlaybackTimer;

/// Playback interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(600);

/// Shortest accepted playback interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Message shown when a catalog reload produced no frames.
pub const NO_FRAMES_MESSAGE: &str = "No radar frames available.";

/// Message shown when the catalog could not be fetched and none is loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load radar data.";

/// Player configuration.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Time between frames while playing.
    pub interval: Duration,
    /// Styling parameters baked into tile URLs.
    pub style: TileStyle,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            style: TileStyle::default(),
        }
    }
}

/// Observable player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Empty,
    Idle,
    Playing,
}

/// Radar animation state machine.
#[derive(Debug)]
pub struct RadarPlayer<H, C> {
    catalog: FrameCatalog,
    frame_index: Option<usize>,
    interval: Duration,
    layer: TileLayer<H>,
    controls: C,
    timer: Option<PlaybackTimer>,
    next_generation: u64,
    runtime: Handle,
    ticks: mpsc::UnboundedSender<TimerTick>,
}

impl<H: OverlayHost, C: ControlSurface> RadarPlayer<H, C> {
    /// Create an empty player.
    ///
    /// Timer tasks are spawned on `runtime`; their ticks arrive on the
    /// returned receiver and must be passed to [`Self::on_tick`].
    #[must_use]
    pub fn new(
        host: H,
        controls: C,
        config: PlayerConfig,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<TimerTick>) {
        let (ticks, tick_rx) = mpsc::unbounded_channel();

        let player = Self {
            catalog: FrameCatalog::empty(),
            frame_index: None,
            interval: config.interval.max(MIN_INTERVAL),
            layer: TileLayer::new(host, config.style),
            controls,
            timer: None,
            next_generation: 0,
            runtime,
            ticks,
        };

        (player, tick_rx)
    }

    /// Replace the catalog.
    ///
    /// Playback always stops. A non-empty catalog selects its most recent
    /// frame and recreates the overlay, since the tile host may have changed.
    /// An empty one detaches the overlay and shows "unavailable".
    pub fn load_catalog(&mut self, catalog: FrameCatalog) {
        self.stop();
        self.catalog = catalog;

        match self.catalog.last_index() {
            Some(last) => {
                info!("Radar catalog loaded with {} frame(s)", self.catalog.len());
                self.show_frame(last, true);
            }
            None => {
                info!("Radar catalog is empty");
                self.frame_index = None;
                self.layer.clear();
                self.controls.show_unavailable(NO_FRAMES_MESSAGE);
            }
        }
    }

    /// A catalog fetch failed.
    ///
    /// A loaded catalog keeps playing; without one the player goes empty and
    /// the controls report the failure rather than an empty result.
    pub fn load_failed(&mut self) {
        if !self.catalog.is_empty() {
            return;
        }
        self.load_catalog(FrameCatalog::empty());
        self.controls.show_unavailable(LOAD_FAILED_MESSAGE);
    }

    /// Jump to `index`, clamped into the catalog bounds.
    pub fn seek(&mut self, index: i64) {
        let Some(last) = self.catalog.last_index() else {
            return;
        };
        let target = usize::try_from(index.max(0)).unwrap_or(usize::MAX).min(last);
        self.go_to(target);
    }

    /// Move `delta` frames, wrapping around both ends.
    pub fn step(&mut self, delta: i64) {
        let Some(current) = self.frame_index else {
            return;
        };
        let len = self.catalog.len();
        let Ok(len_i64) = i64::try_from(len) else {
            return;
        };
        // rem_euclid keeps the offset in [0, len) for negative deltas too
        let offset = usize::try_from(delta.rem_euclid(len_i64)).unwrap_or(0);
        self.go_to((current + offset) % len);
    }

    /// Step-back trigger: pauses playback, then moves one frame back.
    pub fn step_back(&mut self) {
        self.stop();
        self.step(-1);
    }

    /// Step-forward trigger: pauses playback, then moves one frame ahead.
    pub fn step_forward(&mut self) {
        self.stop();
        self.step(1);
    }

    /// Begin advancing on the playback timer.
    pub fn start(&mut self) {
        if self.catalog.is_empty() || self.timer.is_some() {
            return;
        }
        self.spawn_timer();
        self.controls.show_playing(true);
    }

    /// Cancel the playback timer. Does nothing when already paused.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!("Stopping playback timer {}", timer.generation());
            drop(timer);
            self.controls.show_playing(false);
        }
    }

    /// Play/pause toggle.
    pub fn toggle(&mut self) {
        if self.timer.is_some() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Change the playback speed, restarting the timer when playing.
    pub fn set_interval(&mut self, interval: Duration) {
        let interval = interval.max(MIN_INTERVAL);
        if interval == self.interval {
            return;
        }
        self.interval = interval;

        if self.timer.take().is_some() {
            self.spawn_timer();
        }
    }

    /// Re-read opacity from the control surface and apply it to the overlay.
    pub fn apply_opacity(&mut self) {
        let opacity = self.controls.opacity().clamp(0.0, 1.0);
        self.layer.set_opacity(opacity);
    }

    /// Handle a timer tick. Returns true when it advanced the animation.
    pub fn on_tick(&mut self, tick: TimerTick) -> bool {
        let live = self.timer.as_ref().map(PlaybackTimer::generation);
        if live == Some(tick.generation) {
            self.step(1);
            true
        } else {
            debug!("Ignoring stale playback tick {}", tick.generation);
            false
        }
    }

    #[must_use]
    pub fn state(&self) -> PlayerState {
        if self.catalog.is_empty() {
            PlayerState::Empty
        } else if self.timer.is_some() {
            PlayerState::Playing
        } else {
            PlayerState::Idle
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    #[must_use]
    pub fn frame_index(&self) -> Option<usize> {
        self.frame_index
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frame_index.and_then(|index| self.catalog.get(index))
    }

    #[must_use]
    pub fn catalog(&self) -> &FrameCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn controls(&self) -> &C {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }

    #[must_use]
    pub fn layer(&self) -> &TileLayer<H> {
        &self.layer
    }

    pub fn overlay_host_mut(&mut self) -> &mut H {
        self.layer.host_mut()
    }

    fn go_to(&mut self, index: usize) {
        if self.frame_index == Some(index) {
            return;
        }
        self.show_frame(index, false);
    }

    fn show_frame(&mut self, index: usize, force_new_layer: bool) {
        let Some(frame) = self.catalog.get(index) else {
            return;
        };
        self.frame_index = Some(index);

        let opacity = self.controls.opacity().clamp(0.0, 1.0);
        self.layer
            .render(self.catalog.host(), frame, force_new_layer, opacity);
        self.controls
            .show_position(index, self.catalog.len(), &frame.label());
    }

    fn spawn_timer(&mut self) {
        self.next_generation += 1;
        debug!(
            "Starting playback timer {} at {:?}",
            self.next_generation, self.interval
        );
        self.timer = Some(PlaybackTimer::spawn(
            &self.runtime,
            self.interval,
            self.next_generation,
            self.ticks.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::frame_label;
    use crate::control::testing::RecordingControls;
    use crate::overlay::testing::RecordingHost;

    type TestPlayer = RadarPlayer<RecordingHost, RecordingControls>;

    fn catalog(frames: &[(i64, &str)]) -> FrameCatalog {
        FrameCatalog::new(
            "https://tiles.example",
            frames
                .iter()
                .map(|(timestamp, path)| Frame {
                    timestamp: *timestamp,
                    path: (*path).to_string(),
                })
                .collect(),
        )
    }

    fn abc() -> FrameCatalog {
        catalog(&[(100, "/a"), (200, "/b"), (300, "/c")])
    }

    fn player() -> (TestPlayer, mpsc::UnboundedReceiver<TimerTick>) {
        RadarPlayer::new(
            RecordingHost::default(),
            RecordingControls::default(),
            PlayerConfig::default(),
            Handle::current(),
        )
    }

    fn drain(player: &mut TestPlayer, ticks: &mut mpsc::UnboundedReceiver<TimerTick>) -> usize {
        let mut advanced = 0;
        while let Ok(tick) = ticks.try_recv() {
            if player.on_tick(tick) {
                advanced += 1;
            }
        }
        advanced
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let (mut player, _ticks) = player();
        assert_eq!(player.state(), PlayerState::Empty);

        player.seek(3);
        player.step(1);
        player.start();

        assert_eq!(player.state(), PlayerState::Empty);
        assert_eq!(player.frame_index(), None);
        assert!(!player.controls().playing);
        assert_eq!(player.layer().host().attach_calls, 0);
    }

    #[tokio::test]
    async fn test_load_selects_latest_frame() {
        for len in 1..6 {
            let (mut player, _ticks) = player();
            let frames: Vec<(i64, String)> =
                (0..len).map(|i| (i * 10, format!("/f{i}"))).collect();
            let refs: Vec<(i64, &str)> = frames.iter().map(|(t, p)| (*t, p.as_str())).collect();

            player.load_catalog(catalog(&refs));

            let last = usize::try_from(len - 1).unwrap();
            assert_eq!(player.frame_index(), Some(last));
            assert_eq!(player.state(), PlayerState::Idle);
            assert_eq!(player.controls().position, Some((last, refs.len())));
        }
    }

    #[tokio::test]
    async fn test_step_wraps_both_ends() {
        for len in 1..6_usize {
            let (mut player, _ticks) = player();
            let frames: Vec<(i64, String)> = (0..len)
                .map(|i| (i64::try_from(i).unwrap(), format!("/f{i}")))
                .collect();
            let refs: Vec<(i64, &str)> = frames.iter().map(|(t, p)| (*t, p.as_str())).collect();
            player.load_catalog(catalog(&refs));

            player.step(1);
            assert_eq!(player.frame_index(), Some(0));
            player.step(-1);
            assert_eq!(player.frame_index(), Some(len - 1));
        }
    }

    #[tokio::test]
    async fn test_seek_clamps() {
        let (mut player, _ticks) = player();
        player.load_catalog(abc());

        player.seek(-7);
        assert_eq!(player.frame_index(), Some(0));
        player.seek(1);
        assert_eq!(player.frame_index(), Some(1));
        player.seek(99);
        assert_eq!(player.frame_index(), Some(2));
        player.seek(i64::MIN);
        assert_eq!(player.frame_index(), Some(0));
        player.seek(i64::MAX);
        assert_eq!(player.frame_index(), Some(2));
    }

    #[tokio::test]
    async fn test_scenario_step_back_sequence() {
        let (mut player, _ticks) = player();
        player.load_catalog(abc());
        assert_eq!(player.frame_index(), Some(2));
        assert_eq!(player.controls().label, frame_label(300));

        let mut seen = vec![2];
        for _ in 0..3 {
            player.step(-1);
            seen.push(player.frame_index().unwrap());
        }
        assert_eq!(seen, vec![2, 1, 0, 2]);
        assert_eq!(player.controls().label, frame_label(300));

        player.step(-1);
        assert_eq!(player.controls().label, frame_label(200));
        assert_eq!(player.controls().position, Some((1, 3)));
    }

    #[tokio::test]
    async fn test_index_changes_swap_url_on_one_overlay() {
        let (mut player, _ticks) = player();
        player.load_catalog(abc());
        player.step(1);
        player.step(1);

        let host = player.layer().host();
        assert_eq!(host.attach_calls, 1);
        assert_eq!(host.url_swaps, 2);
        assert_eq!(host.attached.len(), 1);
        let template = player.layer().current_template().unwrap();
        assert!(template.as_str().starts_with("https://tiles.example/b/256/"));
    }

    #[tokio::test]
    async fn test_reload_recreates_single_overlay() {
        let (mut player, _ticks) = player();
        player.load_catalog(abc());
        player.load_catalog(catalog(&[(400, "/d")]));

        let host = player.layer().host();
        assert_eq!(host.attach_calls, 2);
        assert_eq!(host.attached.len(), 1);
        assert_eq!(host.max_attached, 1);
    }

    #[tokio::test]
    async fn test_idempotent_stop_and_seek() {
        let (mut player, _ticks) = player();
        player.load_catalog(abc());
        let writes = player.controls().position_writes;

        player.stop();
        player.seek(2);

        assert_eq!(player.controls().position_writes, writes);
        assert_eq!(player.layer().host().url_swaps, 0);
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[tokio::test]
    async fn test_opacity_read_on_creation_and_change() {
        let (mut player, _ticks) = player();
        player.controls_mut().opacity = 0.4;
        player.load_catalog(abc());

        let spec = player.layer().host().attached.values().next().unwrap();
        assert!((spec.opacity - 0.4).abs() < f32::EPSILON);

        player.controls_mut().opacity = 0.9;
        player.apply_opacity();
        let spec = player.layer().host().attached.values().next().unwrap();
        assert!((spec.opacity - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_advances_once_per_interval() {
        let (mut player, mut ticks) = player();
        player.load_catalog(abc());
        player.start();
        assert_eq!(player.state(), PlayerState::Playing);
        assert!(player.controls().playing);

        tokio::time::sleep(Duration::from_millis(1250)).await;

        assert_eq!(drain(&mut player, &mut ticks), 2);
        assert_eq!(player.frame_index(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_one_timer() {
        let (mut player, mut ticks) = player();
        player.load_catalog(abc());
        player.start();
        player.start();

        tokio::time::sleep(Duration::from_millis(650)).await;

        assert_eq!(drain(&mut player, &mut ticks), 1);
        assert_eq!(player.frame_index(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_restarts_timer() {
        let (mut player, mut ticks) = player();
        player.load_catalog(abc());
        player.start();

        tokio::time::sleep(Duration::from_millis(300)).await;
        player.set_interval(Duration::from_millis(1000));
        assert!(player.is_playing());

        // Old timer would have fired at 600 and 1200; the new one fires at 1300.
        tokio::time::sleep(Duration::from_millis(1050)).await;

        assert_eq!(drain(&mut player, &mut ticks), 1);
        assert_eq!(player.frame_index(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_tick_is_ignored() {
        let (mut player, mut ticks) = player();
        player.load_catalog(abc());
        player.start();

        tokio::time::sleep(Duration::from_millis(650)).await;
        let stale = ticks.try_recv().unwrap();
        player.stop();
        player.start();

        assert!(!player.on_tick(stale));
        assert_eq!(player.frame_index(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_reload_while_playing_stops_timer() {
        let (mut player, mut ticks) = player();
        player.load_catalog(abc());
        player.start();

        player.load_catalog(FrameCatalog::empty());
        assert_eq!(player.state(), PlayerState::Empty);
        assert!(!player.controls().playing);
        assert_eq!(player.controls().label, NO_FRAMES_MESSAGE);
        assert!(!player.layer().is_attached());

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(drain(&mut player, &mut ticks), 0);
        assert_eq!(player.frame_index(), None);
    }

    #[tokio::test]
    async fn test_failed_first_load_reports_failure() {
        let (mut player, _ticks) = player();
        player.load_failed();

        assert_eq!(player.state(), PlayerState::Empty);
        assert_eq!(player.controls().label, LOAD_FAILED_MESSAGE);
        assert_ne!(player.controls().label, NO_FRAMES_MESSAGE);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_loaded_catalog() {
        let (mut player, _ticks) = player();
        player.load_catalog(abc());
        player.load_failed();

        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.frame_index(), Some(2));
        assert_eq!(player.controls().position, Some((2, 3)));
        assert!(player.layer().is_attached());
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_buttons_pause_playback() {
        let (mut player, mut ticks) = player();
        player.load_catalog(abc());
        player.start();

        player.step_back();
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.frame_index(), Some(1));

        player.step_forward();
        assert_eq!(player.frame_index(), Some(2));

        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(drain(&mut player, &mut ticks), 0);
    }

    #[tokio::test]
    async fn test_toggle_flips_playback() {
        let (mut player, _ticks) = player();
        player.load_catalog(abc());

        player.toggle();
        assert!(player.controls().playing);
        player.toggle();
        assert!(!player.controls().playing);
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let (mut player, _ticks) = player();
        player.set_interval(Duration::ZERO);
        assert_eq!(player.interval(), MIN_INTERVAL);
    }
}

//! Playback controller for the month timeline.
//!
//! [`Playback`] is the synchronous state machine. [`spawn_ticker`] drives
//! it from a tokio interval. Each armed timer carries the epoch it was
//! armed in; pause, reset and speed changes bump the epoch, so a tick from
//! a cancelled timer is ignored even if it was already waiting on the lock.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::timeline::MONTHS;

// ---

pub const SPEEDS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];
const DEFAULT_SPEED_SLOT: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Request to arm a periodic timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arm {
    pub epoch: u64,
    pub period: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub index: usize,
    pub speed: f64,
}

#[derive(Debug, Clone)]
pub struct Playback {
    state: PlaybackState,
    index: usize,
    speed_slot: usize,
    epoch: u64,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

impl Playback {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            index: 0,
            speed_slot: DEFAULT_SPEED_SLOT,
            epoch: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn speed(&self) -> f64 {
        SPEEDS[self.speed_slot]
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Tick period at the current speed: 1000 ms / speed.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.speed())
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.state,
            index: self.index,
            speed: self.speed(),
        }
    }

    fn arm(&mut self) -> Arm {
        self.epoch += 1;
        Arm {
            epoch: self.epoch,
            period: self.period(),
        }
    }

    /// Returns the timer to arm, or `None` when already playing.
    pub fn start(&mut self) -> Option<Arm> {
        // ---
        if self.state == PlaybackState::Playing {
            return None;
        }
        self.state = PlaybackState::Playing;
        tracing::info!("Playback started at month {} (speed {}x)", self.index, self.speed());
        Some(self.arm())
    }

    /// Stop advancing. Any armed timer is invalidated.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Stopped;
            self.epoch += 1;
            tracing::info!("Playback paused at month {}", self.index);
        }
    }

    /// Stop and rewind to the first month, from any state.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
        self.index = 0;
        self.epoch += 1;
        tracing::info!("Playback reset");
    }

    /// Cycle 0.5 → 1 → 2 → 4 → 0.5. While playing, returns the timer to
    /// re-arm at the new period; the index is kept.
    pub fn change_speed(&mut self) -> Option<Arm> {
        // ---
        self.speed_slot = (self.speed_slot + 1) % SPEEDS.len();
        tracing::debug!("Playback speed set to {}x", self.speed());
        match self.state {
            PlaybackState::Playing => Some(self.arm()),
            PlaybackState::Stopped => None,
        }
    }

    /// Jump to a month without changing state.
    pub fn seek(&mut self, index: usize) {
        self.index = index % MONTHS;
    }

    /// Advance one month if `epoch` belongs to the live timer.
    pub fn tick(&mut self, epoch: u64) -> Option<usize> {
        // ---
        if self.state != PlaybackState::Playing || epoch != self.epoch {
            tracing::debug!("Ignoring stale tick (epoch {} vs {})", epoch, self.epoch);
            return None;
        }
        self.index = (self.index + 1) % MONTHS;
        Some(self.index)
    }
}

/// Spawn the periodic task for `arm`. `on_tick` runs under the lock and
/// returns `false` to stop the task.
pub fn spawn_ticker<T, F>(shared: Arc<Mutex<T>>, arm: Arm, on_tick: F) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(&mut T, u64) -> bool + Send + 'static,
{
    tokio::spawn(async move {
        // ---
        let mut interval = time::interval_at(Instant::now() + arm.period, arm.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let mut guard = shared.lock().await;
            if !on_tick(&mut *guard, arm.epoch) {
                tracing::debug!("Ticker for epoch {} stopped", arm.epoch);
                break;
            }
        }
    })
}

//! Time management utilities
//!
//! Both types are fed timestamps from the windowing backend's clock rather
//! than reading the system clock themselves, so they run identically against
//! GLFW and against the headless backend's manual clock.

use std::time::Duration;

/// Frame timer driven by backend timestamps (seconds)
#[derive(Debug, Clone, Default)]
pub struct Timer {
    last_time: Option<f64>,
    delta_time: f32,
    total_time: f64,
    frame_count: u64,
}

impl Timer {
    /// Create a new timer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the timer to `now` and return the elapsed seconds since the previous tick
    ///
    /// The first tick only records the start time and reports zero. A clock
    /// that steps backwards also reports zero rather than a negative delta.
    pub fn tick(&mut self, now: f64) -> f32 {
        let delta = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);
        self.delta_time = delta as f32;
        self.total_time += delta;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since the first tick
    #[must_use]
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the current frame count
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (based on last frame time)
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// Rolling frames-per-second measurement
///
/// Accumulates presented frames and reports the measured rate once per
/// reporting interval.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: Duration,
    last_time: Option<f64>,
    accumulated: f64,
    frames: u32,
    last_fps: Option<f64>,
}

impl FpsCounter {
    /// Default reporting interval
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    /// Create a counter reporting once per `interval`
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_time: None,
            accumulated: 0.0,
            frames: 0,
            last_fps: None,
        }
    }

    /// Record one frame presented at `now`
    ///
    /// Returns `Some(fps)` when a full interval has elapsed; the accumulators
    /// then restart.
    pub fn frame(&mut self, now: f64) -> Option<f64> {
        let last = self.last_time.replace(now)?;

        self.accumulated += (now - last).max(0.0);
        self.frames += 1;

        if self.accumulated < self.interval.as_secs_f64() {
            return None;
        }

        let fps = f64::from(self.frames) / self.accumulated;
        self.accumulated = 0.0;
        self.frames = 0;
        self.last_fps = Some(fps);
        Some(fps)
    }

    /// Most recently reported rate
    #[must_use]
    pub const fn last_fps(&self) -> Option<f64> {
        self.last_fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

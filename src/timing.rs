//! Frame pacing
//!
//! `FrameClock::tick` is called once per frame. It measures the time since
//! the previous tick, waits out the remainder of the frame when a frame
//! rate cap is set, and refreshes the averaged FPS once per interval.

use std::time::{Duration, Instant};

/// Leave this much of the wait to a spin loop; `sleep` overshoots.
const SPIN_MARGIN: Duration = Duration::from_millis(2);

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Instant,
    /// Minimum seconds per frame, from the FPS cap
    min_delta: Option<f64>,
    /// Seconds of frames averaged into each FPS reading
    fps_interval: f64,

    total_time: f64,
    total_frames: u64,
    delta: f64,
    fps: f64,

    delta_sum: f64,
    delta_count: u32,
}

impl FrameClock {
    /// `fps_interval` of zero refreshes the FPS reading every frame.
    pub fn new(max_fps: Option<f32>, fps_interval: f64) -> Self {
        Self {
            last_tick: Instant::now(),
            min_delta: max_fps.filter(|fps| *fps > 0.0).map(|fps| 1.0 / fps as f64),
            fps_interval,
            total_time: 0.0,
            total_frames: 0,
            delta: 0.0,
            fps: 0.0,
            delta_sum: 0.0,
            delta_count: 0,
        }
    }

    /// Finish a frame: pace to the cap, then record its duration.
    pub fn tick(&mut self) {
        if let Some(min_delta) = self.min_delta {
            let target = self.last_tick + Duration::from_secs_f64(min_delta);
            while Instant::now() + SPIN_MARGIN < target {
                std::thread::sleep(Duration::from_millis(1));
            }
            while Instant::now() < target {
                std::hint::spin_loop();
            }
        }
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        self.record(delta);
    }

    /// Account for one frame of `delta` seconds.
    fn record(&mut self, delta: f64) {
        self.delta = delta;
        self.total_time += delta;
        self.total_frames += 1;
        self.delta_sum += delta;
        self.delta_count += 1;

        if self.delta_sum >= self.fps_interval && self.delta_sum > 0.0 {
            self.fps = self.delta_count as f64 / self.delta_sum;
            self.delta_sum = 0.0;
            self.delta_count = 0;
        }
    }

    /// Seconds since the clock was created, summed over frames
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// True while fewer than `limit` frames have been ticked; `None` never ends.
    pub fn within_limit(&self, limit: Option<u64>) -> bool {
        limit.is_none_or(|limit| self.total_frames < limit)
    }

    /// Duration of the last frame in seconds
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(None, 1.0)
    }
}

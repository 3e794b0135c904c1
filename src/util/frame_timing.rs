//! Frame pacing for simulated runs.

use web_time::{Duration, Instant};

/// Fixed-rate frame clock for the headless driver.
///
/// Hands out simulated frame instants at the target rate and tracks a
/// smoothed frames-per-second figure from the wall-clock cost of each
/// frame.
pub struct FrameTiming {
    /// Duration of one frame at the target rate.
    frame_duration: Duration,
    /// Simulated time of the next frame.
    next_frame: Instant,
    /// Wall-clock start of the frame in progress.
    frame_started: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    frames: u64,
}

impl FrameTiming {
    /// Create a frame clock starting at `start` (0 FPS falls back to 60).
    #[must_use]
    pub fn new(target_fps: u32, start: Instant) -> Self {
        let fps = if target_fps == 0 { 60 } else { target_fps };
        let frame_duration = Duration::from_secs_f64(1.0 / f64::from(fps));

        Self {
            frame_duration,
            next_frame: start,
            frame_started: Instant::now(),
            smoothed_fps: fps as f32,
            smoothing: 0.05,
            frames: 0,
        }
    }

    /// Begin a frame and return its simulated instant.
    pub fn begin_frame(&mut self) -> Instant {
        self.frame_started = Instant::now();
        let now = self.next_frame;
        self.next_frame += self.frame_duration;
        self.frames += 1;
        now
    }

    /// Finish the frame and fold its wall-clock cost into the FPS estimate.
    pub fn end_frame(&mut self) {
        let frame_time = self.frame_started.elapsed().as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Seconds per frame at the target rate.
    #[must_use]
    pub fn frame_seconds(&self) -> f32 {
        self.frame_duration.as_secs_f32()
    }

    /// Number of frames begun so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_advance_at_target_rate() {
        let start = Instant::now();
        let mut timing = FrameTiming::new(50, start);
        let first = timing.begin_frame();
        timing.end_frame();
        let second = timing.begin_frame();
        assert_eq!(first, start);
        assert_eq!(second - first, Duration::from_millis(20));
        assert_eq!(timing.frames(), 2);
    }

    #[test]
    fn zero_fps_defaults_to_sixty() {
        let timing = FrameTiming::new(0, Instant::now());
        assert!((timing.frame_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }
}

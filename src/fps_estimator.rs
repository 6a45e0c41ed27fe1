use log::debug;
use std::time::{Duration, Instant};

/// Paces a loop at a fixed rate and counts how many iterations actually happened in
/// each wall-clock second.
#[derive(Debug)]
pub struct FpsEstimator {
    iteration_start: Instant,
    pub iteration_duration: Duration,

    window_start: Instant,
    frames_in_window: u32,
    last_fps: u32,
}

impl FpsEstimator {
    pub fn new(fps: f64) -> FpsEstimator {
        let now = Instant::now();
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        FpsEstimator {
            iteration_start: now,
            iteration_duration: Duration::from_secs_f64(1.0 / fps),
            window_start: now,
            frames_in_window: 0,
            last_fps: 0,
        }
    }

    /// Marks the start of a new iteration and returns how long the previous one took.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let sleep_until = self.iteration_start + self.iteration_duration;
        if now > sleep_until {
            let overslept_by = now - sleep_until;
            if overslept_by > self.iteration_duration {
                debug!("Over time budget by: {:?}", overslept_by);
            }
        }
        let delta_t = now - self.iteration_start;
        self.iteration_start = now;

        self.frames_in_window += 1;
        if now - self.window_start >= Duration::from_secs(1) {
            self.last_fps = self.frames_in_window;
            self.frames_in_window = 0;
            self.window_start = now;
        }
        delta_t
    }

    /// Time left before the next iteration should start. Zero if already late.
    pub fn time_until_next(&self) -> Duration {
        (self.iteration_start + self.iteration_duration).saturating_duration_since(Instant::now())
    }

    /// Iterations counted over the last full second.
    pub fn fps(&self) -> u32 {
        self.last_fps
    }
}

//! Frame clock: turns `performance.now()` timestamps into per-frame deltas.
//!
//! `draw_web()` calls at ~60fps with variable delta. FrameClock converts
//! that into seconds, clamped so a backgrounded tab does not produce one
//! huge step on return.

/// Longest delta a single frame may report, in milliseconds.
const MAX_DELTA_MS: f64 = 500.0;

#[derive(Debug, Default)]
pub struct FrameClock {
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed wall-clock timestamp (from `performance.now()` or similar).
    /// Returns the seconds elapsed since the previous call.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_DELTA_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        delta / 1000.0
    }
}

//! Fixed-timestep scheduler
//!
//! The host calls [`GameLoop::frame`] once per display refresh with a
//! monotonic timestamp in milliseconds. Elapsed time is accumulated and drained
//! in whole `FRAME_TIME` steps, then the render callback receives the leftover
//! fraction of a step for interpolation.

use crate::consts::{FRAME_TIME, MAX_CATCH_UP_STEPS, SIM_DT};

/// Float slack when comparing the accumulator against a whole step. Keeps
/// `100ms` in one chunk and ten `10ms` chunks producing the same step count.
const STEP_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct GameLoop {
    running: bool,
    paused: bool,
    /// Timestamp of the previous frame (ms)
    last_time: f64,
    /// Unsimulated time (ms), always in `[0, FRAME_TIME)` between frames
    accumulator: f64,
    max_steps: u32,
    /// Whole steps discarded by the catch-up cap
    dropped_steps: u64,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self {
            running: false,
            paused: false,
            last_time: 0.0,
            accumulator: 0.0,
            max_steps: MAX_CATCH_UP_STEPS,
            dropped_steps: 0,
        }
    }
}

impl GameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-frame catch-up cap (at least one step)
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Begin scheduling from `now`. Returns false if already running.
    pub fn start(&mut self, now: f64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.paused = false;
        self.last_time = now;
        self.accumulator = 0.0;
        log::info!("Game loop started");
        true
    }

    /// Cancel scheduling. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.paused = false;
        self.accumulator = 0.0;
        log::info!("Game loop stopped");
    }

    /// Freeze updates and rendering while keeping the loop scheduled
    pub fn pause(&mut self) {
        if self.running && !self.paused {
            self.paused = true;
            log::debug!("Game loop paused");
        }
    }

    /// Continue from `now` without replaying the time spent paused
    pub fn resume(&mut self, now: f64) {
        if self.running && self.paused {
            self.paused = false;
            self.last_time = now;
            log::debug!("Game loop resumed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn dropped_steps(&self) -> u64 {
        self.dropped_steps
    }

    /// Run one host frame.
    ///
    /// `update` receives the fixed step in seconds and may run several times;
    /// `render` receives `accumulator / FRAME_TIME`. Neither fires while paused
    /// or stopped. Returns whether the host should schedule another frame.
    pub fn frame<U, R>(&mut self, now: f64, mut update: U, mut render: R) -> bool
    where
        U: FnMut(f32),
        R: FnMut(f64),
    {
        if !self.running {
            return false;
        }
        if self.paused {
            return true;
        }

        // Clock going backwards is treated as no time passing
        let frame_time = (now - self.last_time).max(0.0);
        self.last_time = now;
        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= FRAME_TIME {
            if steps == self.max_steps {
                let surplus = ((self.accumulator + STEP_EPSILON) / FRAME_TIME).floor();
                self.accumulator = (self.accumulator - surplus * FRAME_TIME).max(0.0);
                self.dropped_steps += surplus as u64;
                log::debug!("Catch-up capped at {} steps, dropped {}", self.max_steps, surplus);
                break;
            }
            update(SIM_DT);
            self.accumulator = (self.accumulator - FRAME_TIME).max(0.0);
            steps += 1;
        }

        render(self.accumulator / FRAME_TIME);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Feed frames at the given deltas; return total update steps
    fn run_chunks(game_loop: &mut GameLoop, deltas: &[f64]) -> u32 {
        let mut now = 0.0;
        let mut steps = 0;
        for delta in deltas {
            now += delta;
            game_loop.frame(now, |_| steps += 1, |_| {});
        }
        steps
    }

    #[test]
    fn test_one_chunk_equals_ten_small_chunks() {
        let mut big = GameLoop::new();
        big.start(0.0);
        let mut small = GameLoop::new();
        small.start(0.0);

        assert_eq!(run_chunks(&mut big, &[100.0]), 6);
        assert_eq!(run_chunks(&mut small, &[10.0; 10]), 6);
        assert!(big.accumulator() < 1e-6);
        assert!(small.accumulator() < 1e-6);
    }

    #[test]
    fn test_update_receives_fixed_seconds() {
        let mut game_loop = GameLoop::new();
        game_loop.start(0.0);
        let mut dts = Vec::new();
        game_loop.frame(40.0, |dt| dts.push(dt), |_| {});
        assert_eq!(dts, vec![SIM_DT, SIM_DT]);
    }

    #[test]
    fn test_render_interpolation() {
        let mut game_loop = GameLoop::new();
        game_loop.start(0.0);
        let mut alpha = None;
        game_loop.frame(25.0, |_| {}, |a| alpha = Some(a));
        let alpha = alpha.unwrap();
        assert!((alpha - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_catch_up_capped() {
        let mut game_loop = GameLoop::new();
        game_loop.start(0.0);
        let steps = run_chunks(&mut game_loop, &[1000.0]);
        assert_eq!(steps, MAX_CATCH_UP_STEPS);
        assert_eq!(game_loop.dropped_steps(), 60 - u64::from(MAX_CATCH_UP_STEPS));
        assert!(game_loop.accumulator() < FRAME_TIME);
    }

    #[test]
    fn test_pause_suppresses_callbacks_and_resume_skips_gap() {
        let mut game_loop = GameLoop::new();
        game_loop.start(0.0);
        game_loop.pause();

        let (mut updates, mut renders) = (0, 0);
        assert!(game_loop.frame(500.0, |_| updates += 1, |_| renders += 1));
        assert_eq!((updates, renders), (0, 0));

        game_loop.resume(5000.0);
        let mut steps = 0;
        game_loop.frame(5020.0, |_| steps += 1, |_| {});
        assert_eq!(steps, 1);
    }

    #[test]
    fn test_stop_is_idempotent_and_final() {
        let mut game_loop = GameLoop::new();
        game_loop.stop();
        assert!(game_loop.start(0.0));
        assert!(!game_loop.start(10.0));
        game_loop.stop();
        game_loop.stop();

        let (mut updates, mut renders) = (0, 0);
        assert!(!game_loop.frame(100.0, |_| updates += 1, |_| renders += 1));
        assert_eq!((updates, renders), (0, 0));
        assert!(!game_loop.is_running());
    }

    #[test]
    fn test_backwards_clock_ignored() {
        let mut game_loop = GameLoop::new();
        game_loop.start(100.0);
        assert_eq!(run_chunks(&mut game_loop, &[-50.0]), 0);
        assert_eq!(game_loop.accumulator(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_step_count(chunks in proptest::collection::vec(0u32..60, 1..200)) {
            let deltas: Vec<f64> = chunks.iter().map(|&ms| f64::from(ms)).collect();
            let total: f64 = deltas.iter().sum();

            let mut chunked = GameLoop::new().with_max_steps(u32::MAX);
            chunked.start(0.0);
            let mut whole = GameLoop::new().with_max_steps(u32::MAX);
            whole.start(0.0);

            let a = run_chunks(&mut chunked, &deltas);
            let b = run_chunks(&mut whole, &[total]);
            prop_assert_eq!(a, b);
        }
    }
}

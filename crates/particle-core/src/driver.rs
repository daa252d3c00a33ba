//! Frame driver
//!
//! Once per display refresh: advance time, run the simulation pass from the
//! current buffer into the next one, render the buffer just written, swap.

use crate::clock::FrameClock;
use crate::ping_pong::PingPong;
use glam::Vec2;

/// Uniform inputs shared by both passes for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameUniforms {
    /// Accumulated simulation time in seconds
    pub time: f32,
    /// Attractor read once at the top of the frame
    pub pointer: Vec2,
}

/// The simulation program, seen from the driver.
///
/// Implementations receive buffer references per call and must not keep them.
pub trait SimulationStep<T> {
    /// Read `previous`, write the next state into `next`.
    fn simulate(&mut self, previous: &T, next: &mut T, uniforms: &FrameUniforms);
}

/// Both GPU programs of a displayed frame.
pub trait FramePasses<T>: SimulationStep<T> {
    /// Draw the particles stored in `latest` to the display.
    fn render(&mut self, latest: &T, uniforms: &FrameUniforms);
}

/// Host display-sync primitive.
pub trait DisplaySync {
    /// Block until the next refresh. `false` once the display is torn down.
    fn wait_for_refresh(&mut self) -> bool;
}

/// Run `step_fn` once per refresh until teardown. Returns the frame count.
///
/// `step_fn` gets the sync object back, so hosts that keep their frame state
/// inside it need no extra sharing.
pub fn run_forever<S: DisplaySync, F: FnMut(&mut S)>(sync: &mut S, mut step_fn: F) -> u64 {
    let mut frames = 0;
    while sync.wait_for_refresh() {
        step_fn(sync);
        frames += 1;
    }
    log::info!("Frame loop ended after {} frames", frames);
    frames
}

pub struct FrameDriver<T, C> {
    buffers: PingPong<T>,
    clock: C,
    previous_time: f64,
    time: f32,
    frame: u64,
}

impl<T, C: FrameClock> FrameDriver<T, C> {
    /// Reads the clock once; simulation time starts from that reading.
    pub fn new(buffers: PingPong<T>, mut clock: C) -> Self {
        let previous_time = clock.elapsed();
        Self {
            buffers,
            clock,
            previous_time,
            time: 0.0,
            frame: 0,
        }
    }

    /// Startup pass: run the simulation from `seed` into both buffers so
    /// neither starts out undefined.
    pub fn prime<P: SimulationStep<T>>(&mut self, passes: &mut P, seed: &T, pointer: Vec2) {
        let uniforms = self.uniforms(pointer);
        for _ in 0..2 {
            let (_, next) = self.buffers.split_mut();
            passes.simulate(seed, next, &uniforms);
            self.buffers.swap();
        }
    }

    /// Advance time and run the simulation pass, then swap roles so the
    /// freshly written buffer becomes current.
    pub fn step<P: SimulationStep<T>>(&mut self, passes: &mut P, pointer: Vec2) -> FrameUniforms {
        let now = self.clock.elapsed();
        // Differenced in f64 so the step stays exact however long the clock has run.
        let delta = (now - self.previous_time).max(0.0) as f32;
        self.previous_time = now;
        self.time += delta;

        let uniforms = self.uniforms(pointer);
        let (previous, next) = self.buffers.split_mut();
        passes.simulate(previous, next, &uniforms);
        self.buffers.swap();
        self.frame += 1;

        uniforms
    }

    /// Render the current buffer, i.e. the one the last `step` wrote.
    pub fn render<P: FramePasses<T>>(&self, passes: &mut P, uniforms: &FrameUniforms) {
        passes.render(self.buffers.current(), uniforms);
    }

    /// One full frame: `step` then `render`.
    pub fn tick<P: FramePasses<T>>(&mut self, passes: &mut P, pointer: Vec2) -> FrameUniforms {
        let uniforms = self.step(passes, pointer);
        self.render(passes, &uniforms);
        uniforms
    }

    pub fn buffers(&self) -> &PingPong<T> {
        &self.buffers
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn uniforms(&self, pointer: Vec2) -> FrameUniforms {
        FrameUniforms {
            time: self.time,
            pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedStepClock;

    /// Buffers are plain slot ids; the passes record what they were handed.
    #[derive(Default)]
    struct Recorder {
        simulated: Vec<(u8, u8)>,
        rendered: Vec<u8>,
        times: Vec<f32>,
    }

    impl SimulationStep<u8> for Recorder {
        fn simulate(&mut self, previous: &u8, next: &mut u8, uniforms: &FrameUniforms) {
            self.simulated.push((*previous, *next));
            self.times.push(uniforms.time);
        }
    }

    impl FramePasses<u8> for Recorder {
        fn render(&mut self, latest: &u8, _uniforms: &FrameUniforms) {
            self.rendered.push(*latest);
        }
    }

    struct Refreshes(u32);

    impl DisplaySync for Refreshes {
        fn wait_for_refresh(&mut self) -> bool {
            if self.0 == 0 {
                return false;
            }
            self.0 -= 1;
            true
        }
    }

    fn driver() -> FrameDriver<u8, FixedStepClock> {
        FrameDriver::new(PingPong::new(0, 1), FixedStepClock::new(0.016))
    }

    #[test]
    fn test_buffers_alternate_with_period_two() {
        let mut driver = driver();
        let mut passes = Recorder::default();

        for _ in 0..10 {
            driver.tick(&mut passes, Vec2::ZERO);
        }

        for (read, write) in &passes.simulated {
            assert_ne!(read, write);
        }
        for frames in passes.simulated.windows(2) {
            assert_eq!(frames[1].0, frames[0].1, "frame reads what the previous wrote");
            assert_eq!(frames[1].1, frames[0].0);
        }
    }

    #[test]
    fn test_render_reads_buffer_just_written() {
        let mut driver = driver();
        let mut passes = Recorder::default();

        for _ in 0..6 {
            driver.tick(&mut passes, Vec2::ZERO);
        }

        let written: Vec<u8> = passes.simulated.iter().map(|(_, w)| *w).collect();
        assert_eq!(passes.rendered, written);
    }

    #[test]
    fn test_time_accumulates_fixed_steps() {
        let mut driver = driver();
        let mut passes = Recorder::default();

        let mut last = FrameUniforms::default();
        for _ in 0..100 {
            last = driver.tick(&mut passes, Vec2::ZERO);
        }

        assert!((last.time - 1.6).abs() < 1e-4, "time {}", last.time);
        assert!((driver.time() - 1.6).abs() < 1e-4);
        assert_eq!(driver.frame(), 100);
        assert!(passes.times.windows(2).all(|t| t[1] > t[0]));
    }

    #[test]
    fn test_prime_writes_both_buffers_from_seed() {
        let mut driver = driver();
        let mut passes = Recorder::default();

        driver.prime(&mut passes, &9, Vec2::ZERO);

        assert_eq!(passes.simulated, vec![(9, 1), (9, 0)]);
        assert_eq!(driver.buffers().active_slot(), 0);
        assert_eq!(driver.frame(), 0);
    }

    #[test]
    fn test_pointer_forwarded_to_passes() {
        let mut driver = driver();
        let uniforms = driver.tick(&mut Recorder::default(), Vec2::new(0.25, -0.5));
        assert_eq!(uniforms.pointer, Vec2::new(0.25, -0.5));
    }

    #[test]
    fn test_run_forever_until_teardown() {
        let mut driver = driver();
        let mut passes = Recorder::default();

        let frames = run_forever(&mut Refreshes(100), |_| {
            driver.tick(&mut passes, Vec2::ZERO);
        });

        assert_eq!(frames, 100);
        assert_eq!(passes.rendered.len(), 100);
    }

    #[test]
    fn test_step_sees_remaining_refreshes() {
        let mut seen = Vec::new();
        run_forever(&mut Refreshes(3), |sync| seen.push(sync.0));
        assert_eq!(seen, vec![2, 1, 0]);
    }

    /// A clock that has been running for about 28 hours.
    struct LongRunningClock {
        now: f64,
    }

    impl FrameClock for LongRunningClock {
        fn elapsed(&mut self) -> f64 {
            self.now += 0.016;
            self.now
        }
    }

    #[test]
    fn test_delta_exact_on_long_running_clock() {
        let mut driver = FrameDriver::new(
            PingPong::new(0u8, 1u8),
            LongRunningClock { now: 100_000.0 },
        );
        let mut passes = Recorder::default();

        for _ in 0..10 {
            driver.tick(&mut passes, Vec2::ZERO);
        }

        assert!((driver.time() - 0.16).abs() < 1e-5, "time {}", driver.time());
    }
}

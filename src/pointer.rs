//! Pointer smoothing.
//!
//! Raw cursor positions are normalized to `[-1, 1]`, written to a target
//! [`PointerCell`], and chased by a damped spring per axis. The smoothed
//! value is published to a second cell that the render loop reads once per
//! frame. Each cell has exactly one writer and one reader; a reader may see
//! a value one sample old.
//!
//! The spring can run on its own thread ([`PointerTracker::start`]) or be
//! stepped from the render loop ([`PointerTracker::sample`]).

use crate::config::PointerConfig;
use crate::error::TrackerError;
use glam::Vec2;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest interval a single spring integration step covers.
const MAX_SUBSTEP: f32 = 1.0 / 240.0;
/// Largest gap a single spring step will integrate.
pub const MAX_SAMPLE_DT: f32 = 0.1;
/// Sampling rates accepted by the background loop.
pub const MIN_SAMPLE_RATE_HZ: f32 = 1.0;
pub const MAX_SAMPLE_RATE_HZ: f32 = 1000.0;
/// Ceiling on `stiffness / mass` that RK4 stays stable for at `MAX_SUBSTEP`.
pub const MAX_STIFFNESS_PER_MASS: f32 = 4.0e5;
/// Ceiling on `damping / mass` for the same reason.
pub const MAX_DAMPING_PER_MASS: f32 = 600.0;
const SETTLE_EPSILON: f32 = 1e-3;

/// Map a pixel position to normalized coordinates.
///
/// Origin at the centre of the surface, x to the right, y up. A zero-sized
/// surface maps everything to the origin.
pub fn normalize(pixel: Vec2, size: (u32, u32)) -> Vec2 {
    let (w, h) = size;
    if w == 0 || h == 0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        (pixel.x / w as f32) * 2.0 - 1.0,
        1.0 - (pixel.y / h as f32) * 2.0,
    )
}

/// One-dimensional damped spring, RK4-integrated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    value: f32,
    velocity: f32,
    target: f32,
    stiffness: f32,
    damping: f32,
    mass: f32,
}

impl Spring {
    pub fn new(config: &PointerConfig, initial: f32) -> Self {
        Self {
            value: initial,
            velocity: 0.0,
            target: initial,
            stiffness: config.stiffness,
            damping: config.damping,
            mass: config.mass.max(f32::EPSILON),
        }
    }

    #[inline]
    pub fn set(&mut self, target: f32) {
        self.target = target;
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Snap to `value` with no motion.
    pub fn jump(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < SETTLE_EPSILON && self.velocity.abs() < SETTLE_EPSILON
    }

    /// Advance by `dt` seconds, at most [`MAX_SAMPLE_DT`] at a time.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        let dt = dt.min(MAX_SAMPLE_DT);
        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            self.rk4(h);
        }
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        (-self.stiffness * (x - self.target) - self.damping * v) / self.mass
    }

    fn rk4(&mut self, h: f32) {
        let (x, v) = (self.value, self.velocity);

        let k1x = v;
        let k1v = self.acceleration(x, v);
        let k2x = v + k1v * h * 0.5;
        let k2v = self.acceleration(x + k1x * h * 0.5, k2x);
        let k3x = v + k2v * h * 0.5;
        let k3v = self.acceleration(x + k2x * h * 0.5, k3x);
        let k4x = v + k3v * h;
        let k4v = self.acceleration(x + k3x * h, k4x);

        self.value = x + (k1x + 2.0 * k2x + 2.0 * k3x + k4x) * h / 6.0;
        self.velocity = v + (k1v + 2.0 * k2v + 2.0 * k3v + k4v) * h / 6.0;
    }
}

/// Single-slot cell holding a 2D point.
///
/// Both axes are packed into one atomic word, so a reader always sees a
/// pair that was written together.
#[derive(Debug, Default)]
pub struct PointerCell {
    bits: AtomicU64,
}

impl PointerCell {
    pub fn new(value: Vec2) -> Self {
        Self {
            bits: AtomicU64::new(pack(value)),
        }
    }

    #[inline]
    pub fn store(&self, value: Vec2) {
        self.bits.store(pack(value), Ordering::Release);
    }

    #[inline]
    pub fn load(&self) -> Vec2 {
        unpack(self.bits.load(Ordering::Acquire))
    }
}

fn pack(v: Vec2) -> u64 {
    (v.x.to_bits() as u64) | ((v.y.to_bits() as u64) << 32)
}

fn unpack(bits: u64) -> Vec2 {
    Vec2::new(f32::from_bits(bits as u32), f32::from_bits((bits >> 32) as u32))
}

/// One spring per axis.
#[derive(Debug, Clone, Copy)]
struct SpringPair {
    x: Spring,
    y: Spring,
}

impl SpringPair {
    fn new(config: &PointerConfig, at: Vec2) -> Self {
        Self {
            x: Spring::new(config, at.x),
            y: Spring::new(config, at.y),
        }
    }

    fn sample(&mut self, target: &PointerCell, smoothed: &PointerCell, dt: f32) -> Vec2 {
        let t = target.load();
        self.x.set(t.x);
        self.y.set(t.y);
        self.x.step(dt);
        self.y.step(dt);
        let value = Vec2::new(self.x.get(), self.y.get());
        smoothed.store(value);
        value
    }
}

/// Smooths pointer input on a background sampling loop.
///
/// The loop is a scoped resource: [`stop`](Self::stop) halts and joins it,
/// and dropping the tracker stops it too.
pub struct PointerTracker {
    config: PointerConfig,
    target: Arc<PointerCell>,
    smoothed: Arc<PointerCell>,
    /// Dropping it wakes and ends the sampling loop.
    stop_tx: Option<Sender<()>>,
    /// Held here while the loop is stopped, moved into the thread while it runs.
    springs: Option<SpringPair>,
    thread: Option<JoinHandle<SpringPair>>,
}

impl PointerTracker {
    pub fn new(config: PointerConfig) -> Self {
        let springs = SpringPair::new(&config, Vec2::ZERO);
        Self {
            config,
            target: Arc::new(PointerCell::default()),
            smoothed: Arc::new(PointerCell::default()),
            stop_tx: None,
            springs: Some(springs),
            thread: None,
        }
    }

    /// Set the raw (normalized) pointer position the spring chases.
    #[inline]
    pub fn set_target(&self, ndc: Vec2) {
        self.target.store(ndc);
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target.load()
    }

    /// Latest smoothed pointer position.
    #[inline]
    pub fn smoothed(&self) -> Vec2 {
        self.smoothed.load()
    }

    /// Shared handle to the target cell, for an input source on another thread.
    pub fn target_cell(&self) -> Arc<PointerCell> {
        Arc::clone(&self.target)
    }

    /// Shared handle to the smoothed cell.
    pub fn smoothed_cell(&self) -> Arc<PointerCell> {
        Arc::clone(&self.smoothed)
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Step the springs by `dt` on the calling thread.
    ///
    /// While the background loop is running this only reads the latest
    /// smoothed value.
    pub fn sample(&mut self, dt: f32) -> Vec2 {
        match self.springs.as_mut() {
            Some(springs) => springs.sample(&self.target, &self.smoothed, dt),
            None => self.smoothed.load(),
        }
    }

    /// Start the background sampling loop.
    pub fn start(&mut self) -> Result<(), TrackerError> {
        if self.thread.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }
        let Some(mut springs) = self.springs.take() else {
            return Err(TrackerError::AlreadyRunning);
        };

        let requested = self.config.sample_rate_hz;
        let rate = if requested.is_finite() && requested > 0.0 {
            requested.clamp(MIN_SAMPLE_RATE_HZ, MAX_SAMPLE_RATE_HZ)
        } else {
            120.0
        };
        if rate != requested {
            warn!("[POINTER] Sample rate {} unusable, sampling at {} Hz", requested, rate);
        }
        let period = Duration::from_secs_f32(1.0 / rate);

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let target = Arc::clone(&self.target);
        let smoothed = Arc::clone(&self.smoothed);

        let spawned = thread::Builder::new()
            .name("pointer-tracker".into())
            .spawn(move || {
                debug!("[POINTER] Sampling loop started at {:.0} Hz", rate);
                let mut last = Instant::now();
                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            let now = Instant::now();
                            let dt = now.duration_since(last).as_secs_f32();
                            last = now;
                            springs.sample(&target, &smoothed, dt);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("[POINTER] Sampling loop stopped");
                springs
            });

        match spawned {
            Ok(handle) => {
                self.stop_tx = Some(stop_tx);
                self.thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                // The closure (and the springs in it) is gone; rebuild at the last published value.
                self.springs = Some(SpringPair::new(&self.config, self.smoothed.load()));
                Err(TrackerError::Spawn(e))
            }
        }
    }

    /// Halt and join the sampling loop. Does nothing if it is not running.
    pub fn stop(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };
        self.stop_tx = None;

        match handle.join() {
            Ok(springs) => self.springs = Some(springs),
            Err(e) => {
                warn!("[POINTER] Sampling thread panicked: {:?}", e);
                self.springs = Some(SpringPair::new(&self.config, self.smoothed.load()));
            }
        }
    }
}

impl Drop for PointerTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_corners_and_centre() {
        let size = (800, 600);
        assert_eq!(normalize(Vec2::new(400.0, 300.0), size), Vec2::ZERO);
        assert_eq!(normalize(Vec2::new(0.0, 0.0), size), Vec2::new(-1.0, 1.0));
        assert_eq!(normalize(Vec2::new(800.0, 600.0), size), Vec2::new(1.0, -1.0));
        assert_eq!(normalize(Vec2::new(10.0, 10.0), (0, 600)), Vec2::ZERO);
    }

    #[test]
    fn test_spring_converges_and_settles() {
        let mut spring = Spring::new(&PointerConfig::default(), 0.0);
        spring.set(1.0);
        assert!(!spring.is_settled());

        for _ in 0..300 {
            spring.step(1.0 / 60.0);
        }
        assert!((spring.get() - 1.0).abs() < 1e-3);
        assert!(spring.is_settled());
    }

    #[test]
    fn test_spring_lags_behind_target() {
        let mut spring = Spring::new(&PointerConfig::default(), 0.0);
        spring.set(1.0);
        spring.step(1.0 / 60.0);
        assert!(spring.get() > 0.0 && spring.get() < 0.5);
        assert!(spring.velocity() > 0.0);
    }

    #[test]
    fn test_spring_ignores_bad_dt() {
        let mut spring = Spring::new(&PointerConfig::default(), 0.25);
        spring.set(1.0);
        spring.step(0.0);
        spring.step(f32::NAN);
        spring.step(-1.0);
        assert_eq!(spring.get(), 0.25);

        spring.jump(-0.5);
        assert!(spring.is_settled());
        assert_eq!(spring.target(), -0.5);
    }

    #[test]
    fn test_cell_keeps_axes_together() {
        let cell = PointerCell::new(Vec2::new(0.25, -0.75));
        assert_eq!(cell.load(), Vec2::new(0.25, -0.75));
        cell.store(Vec2::new(-1.0, 1.0));
        assert_eq!(cell.load(), Vec2::new(-1.0, 1.0));
        assert_eq!(PointerCell::default().load(), Vec2::ZERO);
    }

    #[test]
    fn test_sample_on_calling_thread() {
        let mut tracker = PointerTracker::new(PointerConfig::default());
        tracker.set_target(Vec2::new(0.5, -0.5));
        for _ in 0..300 {
            tracker.sample(1.0 / 60.0);
        }
        let s = tracker.smoothed();
        assert!((s - Vec2::new(0.5, -0.5)).length() < 1e-2);
    }

    #[test]
    fn test_background_loop_start_stop() {
        let mut tracker = PointerTracker::new(PointerConfig::default());
        tracker.start().unwrap();
        assert!(tracker.is_running());
        assert!(matches!(tracker.start(), Err(TrackerError::AlreadyRunning)));

        tracker.set_target(Vec2::new(0.8, 0.4));
        let deadline = Instant::now() + Duration::from_secs(5);
        while (tracker.smoothed() - Vec2::new(0.8, 0.4)).length() > 1e-2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!((tracker.smoothed() - Vec2::new(0.8, 0.4)).length() <= 1e-2);

        tracker.stop();
        assert!(!tracker.is_running());
        tracker.stop();

        // Springs are back on this thread and pick up where the loop left off.
        let before = tracker.smoothed();
        let after = tracker.sample(1.0 / 60.0);
        assert!((after - before).length() < 1e-2);

        let cell = tracker.smoothed_cell();
        tracker.start().unwrap();
        assert_eq!(Arc::strong_count(&cell), 3);
        drop(tracker);
        // Only this handle is left: the thread was joined and released its clone.
        assert_eq!(Arc::strong_count(&cell), 1);
    }

    #[test]
    fn test_stop_wakes_slow_loop() {
        let config = PointerConfig {
            sample_rate_hz: MIN_SAMPLE_RATE_HZ,
            ..Default::default()
        };
        let mut tracker = PointerTracker::new(config);
        tracker.start().unwrap();
        thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        tracker.stop();
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(!tracker.is_running());
    }

    #[test]
    fn test_start_with_out_of_range_rate() {
        for rate in [1e-39, 0.25, 1e9, f32::NAN] {
            let mut tracker = PointerTracker::new(PointerConfig {
                sample_rate_hz: rate,
                ..Default::default()
            });
            tracker.start().unwrap();
            let started = Instant::now();
            tracker.stop();
            assert!(started.elapsed() < Duration::from_millis(500));
        }
    }

    #[test]
    fn test_spring_caps_long_steps() {
        let mut long = Spring::new(&PointerConfig::default(), 0.0);
        let mut capped = long;
        long.set(1.0);
        capped.set(1.0);

        long.step(1.0e6);
        capped.step(MAX_SAMPLE_DT);
        assert_eq!(long, capped);
        assert!(long.get().is_finite());
    }
}

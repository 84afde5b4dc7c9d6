use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::uniforms::TimeWriter;

/// Amount `uTime` advances per frame, independent of wall-clock time.
pub const TIME_INCREMENT: f32 = 0.1;

/// Per-frame time source feeding `uTime`.
#[derive(Debug)]
pub struct FrameClock {
    time: f32,
    frames: u64,
    uniforms: TimeWriter,
}

impl FrameClock {
    pub fn new(uniforms: TimeWriter) -> Self {
        Self {
            time: 0.0,
            frames: 0,
            uniforms,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances time by one increment and publishes it.
    pub fn step(&mut self) -> f32 {
        self.frames += 1;
        self.time = self.frames as f32 * TIME_INCREMENT;
        self.uniforms.set_time(self.time);
        self.time
    }
}

/// Cooperative stop flag for the frame drivers. Never set unless a host asks.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Calls `step` once per frame until `signal` is set or `limit` frames ran.
/// Returns the number of frames stepped. An error from `step` ends the loop.
pub fn run_frames<F>(signal: &StopSignal, limit: Option<u64>, mut step: F) -> Result<u64>
where
    F: FnMut(u64) -> Result<()>,
{
    let mut frame = 0;
    while !signal.is_stopped() && limit.map_or(true, |limit| frame < limit) {
        step(frame)?;
        frame += 1;
    }
    debug!("frame loop ended after {frame} frame(s)");
    Ok(frame)
}

/// Fills `slot` with `make()` unless a frame callback is already installed.
/// Returns whether a new one was installed; the first callback stays alive
/// while its scheduled frame is pending.
pub fn install_once<T>(slot: &RefCell<Option<T>>, make: impl FnOnce() -> T) -> bool {
    let mut slot = slot.borrow_mut();
    if slot.is_some() {
        return false;
    }
    *slot = Some(make());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::SharedUniforms;

    #[test]
    fn time_advances_a_tenth_per_step() {
        let uniforms = SharedUniforms::new();
        let mut clock = FrameClock::new(uniforms.time_writer());
        for _ in 0..250 {
            clock.step();
        }
        assert_eq!(clock.frames(), 250);
        assert!((uniforms.snapshot().time - 25.0).abs() < 1e-4);
        assert_eq!(uniforms.snapshot().time, clock.time());
    }

    #[test]
    fn run_frames_honours_the_limit() {
        let signal = StopSignal::new();
        let mut seen = Vec::new();
        let count = run_frames(&signal, Some(3), |frame| {
            seen.push(frame);
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn stop_signal_ends_the_loop() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        let count = run_frames(&signal, None, |frame| {
            if frame == 4 {
                handle.stop();
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn stopped_signal_runs_nothing() {
        let signal = StopSignal::new();
        signal.stop();
        let count = run_frames(&signal, None, |_| Ok(())).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn step_errors_propagate() {
        let signal = StopSignal::new();
        let result = run_frames(&signal, Some(10), |frame| {
            if frame == 2 {
                anyhow::bail!("render failed");
            }
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn second_install_keeps_the_first_callback() {
        let slot = RefCell::new(None);
        assert!(install_once(&slot, || 1));
        assert!(!install_once(&slot, || 2));
        assert_eq!(*slot.borrow(), Some(1));
    }
}

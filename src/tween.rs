use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Easing curves understood by the transition tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out; the default curve for hover transitions.
    PowerOneOut,
    PowerOneInOut,
    /// Cubic ease-out.
    PowerTwoOut,
}

impl Ease {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "linear" | "none" => Ease::Linear,
            "power1.out" | "power1" => Ease::PowerOneOut,
            "power1.inOut" => Ease::PowerOneInOut,
            "power2.out" | "power2" => Ease::PowerTwoOut,
            _ => return None,
        })
    }

    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::PowerOneOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::PowerOneInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::PowerTwoOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Result of advancing a [`Tween`] by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenStep {
    pub value: f32,
    /// True only on the tick that started the tween.
    pub started: bool,
    pub finished: bool,
}

/// Time-driven interpolation from `from` to `to`.
///
/// The tween does nothing until its first [`Tween::advance`]; that tick reports
/// `started` and already applies its elapsed time.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    ease: Ease,
    elapsed: Duration,
    started: bool,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            ease,
            elapsed: Duration::ZERO,
            started: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.elapsed >= self.duration
    }

    pub fn value(&self) -> f32 {
        if self.duration.is_zero() {
            return if self.started { self.to } else { self.from };
        }
        let progress = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.ease.apply(progress)
    }

    pub fn advance(&mut self, delta: Duration) -> TweenStep {
        let started = !self.started;
        self.started = true;
        self.elapsed = self.elapsed.saturating_add(delta).min(self.duration);
        TweenStep {
            value: self.value(),
            started,
            finished: self.is_finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 4] = [
        Ease::Linear,
        Ease::PowerOneOut,
        Ease::PowerOneInOut,
        Ease::PowerTwoOut,
    ];

    #[test]
    fn endpoints_are_stable() {
        for ease in ALL {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for ease in ALL {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b);
            assert!(b < c);
        }
    }

    #[test]
    fn power_one_out_front_loads_progress() {
        assert!((Ease::PowerOneOut.apply(0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn names_resolve() {
        assert_eq!(Ease::from_name("power1.out"), Some(Ease::PowerOneOut));
        assert_eq!(Ease::from_name("linear"), Some(Ease::Linear));
        assert_eq!(Ease::from_name("bounce"), None);
    }

    #[test]
    fn first_advance_reports_start_once() {
        let mut tween = Tween::new(0.0, 3.0, Duration::from_millis(1500), Ease::Linear);
        assert!(!tween.is_started());
        let first = tween.advance(Duration::from_millis(150));
        assert!(first.started);
        assert!((first.value - 0.3).abs() < 1e-4);
        let second = tween.advance(Duration::from_millis(150));
        assert!(!second.started);
        assert!(!second.finished);
    }

    #[test]
    fn reaches_target_exactly() {
        let mut tween = Tween::new(0.0, 3.0, Duration::from_millis(1500), Ease::PowerOneOut);
        let step = tween.advance(Duration::from_secs(5));
        assert!(step.finished);
        assert_eq!(step.value, 3.0);
    }

    #[test]
    fn zero_duration_finishes_on_first_tick() {
        let mut tween = Tween::new(0.0, 3.0, Duration::ZERO, Ease::Linear);
        assert_eq!(tween.value(), 0.0);
        let step = tween.advance(Duration::ZERO);
        assert!(step.started && step.finished);
        assert_eq!(step.value, 3.0);
    }
}

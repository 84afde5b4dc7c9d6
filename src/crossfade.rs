use std::time::Duration;

use log::{debug, warn};

use crate::page::TransitionConfig;
use crate::tween::Tween;
use crate::uniforms::TransitionWriter;

struct PendingTransition {
    link: usize,
    tween: Tween,
}

/// Drives `uTimeline` and the start/end indices in response to link hovers.
///
/// A new hover always wins: the timeline drops back to 0 and any tween still
/// running is abandoned. Indices are only handed to the shader once the new
/// tween actually starts, at which point the hovered link's index also becomes
/// the start index of the next transition.
pub struct CrossfadeController {
    config: TransitionConfig,
    start_index: usize,
    end_index: usize,
    active: Option<PendingTransition>,
    uniforms: TransitionWriter,
}

impl CrossfadeController {
    pub fn new(config: TransitionConfig, uniforms: TransitionWriter) -> Self {
        Self {
            config,
            start_index: 0,
            end_index: 1,
            active: None,
            uniforms,
        }
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Mouse-enter on the `link`-th link element.
    pub fn hover(&mut self, link: usize) {
        if self.active.is_some() {
            debug!("hover on link {link} replaces the running transition");
        }
        self.uniforms.set_timeline(0.0);
        let tween = Tween::new(
            self.uniforms.timeline(),
            self.config.target,
            self.duration(),
            self.config.ease,
        );
        self.active = Some(PendingTransition { link, tween });
    }

    fn duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.config.duration).unwrap_or_else(|_| {
            warn!(
                "transition duration {} is unusable; switching instantly",
                self.config.duration
            );
            Duration::ZERO
        })
    }

    /// Advances the running tween, if any, by `delta`.
    pub fn tick(&mut self, delta: Duration) {
        let Some(transition) = self.active.as_mut() else {
            return;
        };
        let step = transition.tween.advance(delta);
        if step.started {
            self.end_index = transition.link;
            self.uniforms.set_indices(self.start_index, self.end_index);
            self.start_index = self.end_index;
        }
        self.uniforms.set_timeline(step.value);
        if step.finished {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{SharedUniforms, INITIAL_TIMELINE};

    const FRAME: Duration = Duration::from_millis(16);

    fn controller() -> (CrossfadeController, SharedUniforms) {
        let uniforms = SharedUniforms::new();
        let controller =
            CrossfadeController::new(TransitionConfig::default(), uniforms.transition_writer());
        (controller, uniforms)
    }

    #[test]
    fn idle_until_hovered() {
        let (mut controller, uniforms) = controller();
        controller.tick(FRAME);
        let state = uniforms.snapshot();
        assert_eq!(state.timeline, INITIAL_TIMELINE);
        assert_eq!((state.start_index, state.end_index), (0, 1));
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn indices_are_handed_over_when_the_tween_starts() {
        let (mut controller, uniforms) = controller();
        controller.hover(2);

        // trigger resets the timeline but leaves the indices alone
        let state = uniforms.snapshot();
        assert_eq!(state.timeline, 0.0);
        assert_eq!((state.start_index, state.end_index), (0, 1));

        controller.tick(FRAME);
        let state = uniforms.snapshot();
        assert_eq!((state.start_index, state.end_index), (0, 2));
        assert_eq!(controller.start_index(), 2);
        assert!(state.timeline > 0.0);
    }

    #[test]
    fn unrepresentable_duration_jumps_to_target() {
        let uniforms = SharedUniforms::new();
        let config = TransitionConfig {
            duration: f32::INFINITY,
            ..TransitionConfig::default()
        };
        let mut controller = CrossfadeController::new(config, uniforms.transition_writer());
        controller.hover(0);
        controller.tick(FRAME);
        assert_eq!(uniforms.snapshot().timeline, 3.0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn transition_settles_at_target() {
        let (mut controller, uniforms) = controller();
        controller.hover(1);
        for _ in 0..200 {
            controller.tick(FRAME);
        }
        assert_eq!(uniforms.snapshot().timeline, 3.0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn retrigger_restarts_from_zero_with_rolled_start() {
        let (mut controller, uniforms) = controller();
        controller.hover(2);
        for _ in 0..10 {
            controller.tick(FRAME);
        }
        let midway = uniforms.snapshot().timeline;
        assert!(midway > 0.0 && midway < 3.0);

        controller.hover(3);
        assert_eq!(uniforms.snapshot().timeline, 0.0);

        controller.tick(FRAME);
        let state = uniforms.snapshot();
        assert_eq!((state.start_index, state.end_index), (2, 3));
        assert_eq!(controller.start_index(), 3);
        assert!(state.timeline < midway);
    }

    #[test]
    fn retrigger_before_start_uses_previous_start() {
        let (mut controller, uniforms) = controller();
        controller.hover(2);
        controller.hover(3);
        controller.tick(FRAME);
        let state = uniforms.snapshot();
        assert_eq!((state.start_index, state.end_index), (0, 3));
    }
}

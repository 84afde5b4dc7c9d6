//! Uniform bag shared by every image plane.
//!
//! Two writers touch it: the frame loop owns `time`, the crossfade controller
//! owns `timeline` and the start/end indices. Each gets a handle that can only
//! write its own fields; readers take a [`ShaderState`] snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Number of image samplers the crossfade shader declares.
pub const TEXTURE_SLOTS: usize = 4;

/// Value `uTimeline` holds before the first hover.
pub const INITIAL_TIMELINE: f32 = 0.2;

/// Snapshot of the values handed to the crossfade shader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShaderState {
    pub time: f32,
    pub timeline: f32,
    pub start_index: usize,
    pub end_index: usize,
    /// Image index bound to each sampler slot, `None` for an unmapped slot.
    pub textures: [Option<usize>; TEXTURE_SLOTS],
}

impl Default for ShaderState {
    fn default() -> Self {
        Self {
            time: 0.0,
            timeline: INITIAL_TIMELINE,
            start_index: 0,
            end_index: 1,
            textures: [None; TEXTURE_SLOTS],
        }
    }
}

/// Shared handle to the single uniform bag.
#[derive(Debug, Default)]
pub struct SharedUniforms {
    state: Arc<RwLock<ShaderState>>,
}

impl Clone for SharedUniforms {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl SharedUniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ShaderState {
        *self.state.read()
    }

    pub fn set_textures(&self, textures: [Option<usize>; TEXTURE_SLOTS]) {
        self.state.write().textures = textures;
    }

    pub fn time_writer(&self) -> TimeWriter {
        TimeWriter {
            state: Arc::clone(&self.state),
        }
    }

    pub fn transition_writer(&self) -> TransitionWriter {
        TransitionWriter {
            state: Arc::clone(&self.state),
        }
    }
}

/// Write access to `time` only.
#[derive(Debug)]
pub struct TimeWriter {
    state: Arc<RwLock<ShaderState>>,
}

impl TimeWriter {
    pub fn set_time(&self, time: f32) {
        self.state.write().time = time;
    }
}

/// Write access to `timeline`, `start_index` and `end_index`.
#[derive(Debug)]
pub struct TransitionWriter {
    state: Arc<RwLock<ShaderState>>,
}

impl TransitionWriter {
    pub fn set_timeline(&self, timeline: f32) {
        self.state.write().timeline = timeline;
    }

    pub fn set_indices(&self, start_index: usize, end_index: usize) {
        let mut state = self.state.write();
        state.start_index = start_index;
        state.end_index = end_index;
    }

    pub fn timeline(&self) -> f32 {
        self.state.read().timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_material() {
        let state = ShaderState::default();
        assert_eq!(state.time, 0.0);
        assert_eq!(state.timeline, INITIAL_TIMELINE);
        assert_eq!((state.start_index, state.end_index), (0, 1));
        assert_eq!(state.textures, [None; TEXTURE_SLOTS]);
    }

    #[test]
    fn writers_share_one_bag() {
        let uniforms = SharedUniforms::new();
        let time = uniforms.time_writer();
        let transition = uniforms.transition_writer();

        time.set_time(1.5);
        transition.set_timeline(2.0);
        transition.set_indices(3, 0);

        let state = uniforms.clone().snapshot();
        assert_eq!(state.time, 1.5);
        assert_eq!(state.timeline, 2.0);
        assert_eq!((state.start_index, state.end_index), (3, 0));
    }
}

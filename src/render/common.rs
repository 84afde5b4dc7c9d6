use bytemuck::{Pod, Zeroable};

use crate::registry::PlaneMesh;
use crate::uniforms::ShaderState;
use crate::viewport::Viewport;

/// Per-frame uniform block: camera plus the crossfade parameters
/// (`uTime`, `uTimeline`, `uStartIndex`, `uEndIndex`).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub time: f32,
    pub timeline: f32,
    pub start_index: f32,
    pub end_index: f32,
}

impl FrameUniform {
    pub fn new(viewport: &Viewport, state: &ShaderState) -> Self {
        Self {
            view_proj: viewport.view_proj().to_cols_array_2d(),
            time: state.time,
            timeline: state.timeline,
            start_index: state.start_index as f32,
            end_index: state.end_index as f32,
        }
    }
}

/// Per-plane uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct PlaneUniform {
    pub model: [[f32; 4]; 4],
    pub size: [f32; 4],
}

impl PlaneUniform {
    pub fn new(mesh: &PlaneMesh) -> Self {
        Self {
            model: mesh.model_matrix().to_cols_array_2d(),
            size: [mesh.width, mesh.height, 0.0, 0.0],
        }
    }
}

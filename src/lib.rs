//! Page images drawn as planes on a GPU canvas, kept pinned to their layout
//! boxes and crossfaded through a shared shader when navigation links are
//! hovered.
//!
//! The core (`page`, `viewport`, `registry`, `sync`, `crossfade`,
//! `frame_loop`) is host-agnostic and fully testable headless. The native
//! binary drives it from a winit window and an XML page description; the
//! `wasm32` build drives it from a real browser document.

pub mod app;
pub mod crossfade;
pub mod frame_loop;
pub mod input;
pub mod page;
pub mod registry;
pub mod render;
pub mod sync;
pub mod tween;
pub mod uniforms;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{print_summary, Site};
pub use crossfade::CrossfadeController;
pub use frame_loop::{run_frames, FrameClock, StopSignal, TIME_INCREMENT};
pub use input::HoverTracker;
pub use page::{
    BoundingBox, ContainerHandle, LayoutElement, LayoutError, PageElement, PageLayout,
    TransitionConfig,
};
pub use registry::{PlaneMesh, TrackedImage};
pub use render::Renderer;
pub use sync::sync_positions;
pub use tween::{Ease, Tween};
pub use uniforms::{ShaderState, SharedUniforms, TEXTURE_SLOTS};
pub use viewport::Viewport;

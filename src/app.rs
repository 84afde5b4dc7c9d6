use std::time::Duration;

use log::{debug, info};

use crate::crossfade::CrossfadeController;
use crate::frame_loop::FrameClock;
use crate::page::{PageElement, TransitionConfig};
use crate::registry::{self, PlaneMesh, TrackedImage};
use crate::sync::sync_positions;
use crate::uniforms::{ShaderState, SharedUniforms};
use crate::viewport::Viewport;

/// The composed page effect: camera, tracked planes, crossfade and frame clock.
///
/// Hosts feed it container sizes, hover indices and frame ticks; it never
/// touches a window or a GPU itself.
pub struct Site<E> {
    viewport: Viewport,
    images: Vec<TrackedImage<E>>,
    crossfade: CrossfadeController,
    clock: FrameClock,
    uniforms: SharedUniforms,
}

impl<E: PageElement> Site<E> {
    pub fn new(container: (f32, f32), elements: Vec<E>, transition: TransitionConfig) -> Self {
        let viewport = Viewport::new(container.0, container.1);
        let uniforms = SharedUniforms::new();
        let mut images = registry::build(elements);
        uniforms.set_textures(registry::texture_bindings(images.len()));
        sync_positions(&mut images, viewport.size());

        info!(
            "site ready: {} image plane(s), fov {:.2} deg",
            images.len(),
            viewport.fov
        );

        Self {
            viewport,
            crossfade: CrossfadeController::new(transition, uniforms.transition_writer()),
            clock: FrameClock::new(uniforms.time_writer()),
            images,
            uniforms,
        }
    }

    /// Container resize: recompute the camera, then re-pin every plane.
    /// A zero-area container (minimized window) is ignored.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            debug!("ignoring {width}x{height} container");
            return;
        }
        self.viewport.resize(width, height);
        sync_positions(&mut self.images, self.viewport.size());
    }

    pub fn hover_link(&mut self, index: usize) {
        self.crossfade.hover(index);
    }

    /// One display frame: tween tick, then `uTime` advance. Returns the uniforms
    /// to draw with.
    pub fn step(&mut self, delta: Duration) -> ShaderState {
        self.crossfade.tick(delta);
        self.clock.step();
        self.uniforms.snapshot()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn images(&self) -> &[TrackedImage<E>] {
        &self.images
    }

    pub fn meshes(&self) -> Vec<PlaneMesh> {
        self.images.iter().map(|image| image.mesh).collect()
    }

    pub fn uniforms(&self) -> &SharedUniforms {
        &self.uniforms
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }
}

/// Prints the per-image and uniform summary used by the headless run.
pub fn print_summary<E: PageElement>(site: &Site<E>) {
    println!("Final image planes:");
    for (index, image) in site.images().iter().enumerate() {
        let slot = image
            .texture_slot
            .map(|slot| slot.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!(
            " - image {index} src={} size={}x{} pos=({:.2}, {:.2}) slot={slot}",
            image.element.source(),
            image.mesh.width,
            image.mesh.height,
            image.mesh.position.x,
            image.mesh.position.y,
        );
    }
    let state = site.uniforms().snapshot();
    println!(
        "uTime={:.2} uTimeline={:.2} uStartIndex={} uEndIndex={}",
        state.time, state.timeline, state.start_index, state.end_index
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::BoundingBox;

    #[derive(Debug, Clone)]
    struct FixedElement(BoundingBox);

    impl PageElement for FixedElement {
        fn bounding_box(&self) -> BoundingBox {
            self.0
        }

        fn source(&self) -> String {
            String::new()
        }
    }

    fn site(count: usize) -> Site<FixedElement> {
        let elements = (0..count)
            .map(|i| FixedElement(BoundingBox::new(100.0, i as f32 * 200.0, 150.0, 200.0)))
            .collect();
        Site::new((1000.0, 800.0), elements, TransitionConfig::default())
    }

    #[test]
    fn construction_pins_planes_to_their_images() {
        let site = site(2);
        let second = &site.images()[1];
        assert_eq!(second.mesh.position.x, 200.0 - 500.0 + 75.0);
        assert_eq!(second.mesh.position.y, -100.0 + 400.0 - 100.0);
    }

    #[test]
    fn resize_moves_planes_and_camera() {
        let mut site = site(1);
        site.resize(500.0, 500.0);
        assert_eq!(*site.viewport(), Viewport::new(500.0, 500.0));
        assert_eq!(site.images()[0].mesh.position.x, 0.0 - 250.0 + 75.0);
    }

    #[test]
    fn zero_area_resize_keeps_the_last_camera() {
        let mut site = site(1);
        site.resize(0.0, 0.0);
        assert_eq!(*site.viewport(), Viewport::new(1000.0, 800.0));
        assert!(site.viewport().aspect.is_finite());
        assert_eq!(site.images()[0].mesh.position.x, 0.0 - 500.0 + 75.0);
    }

    #[test]
    fn frame_steps_accumulate_time() {
        let mut site = site(4);
        let mut state = site.uniforms().snapshot();
        for _ in 0..30 {
            state = site.step(Duration::from_millis(16));
        }
        assert!((state.time - 3.0).abs() < 1e-4);
        assert_eq!(site.frames(), 30);
    }

    #[test]
    fn hover_then_frame_hands_over_indices() {
        let mut site = site(4);
        site.hover_link(2);
        let state = site.step(Duration::from_millis(16));
        assert_eq!((state.start_index, state.end_index), (0, 2));
    }

    #[test]
    fn five_images_leave_the_last_unmapped() {
        let site = site(5);
        let state = site.uniforms().snapshot();
        assert_eq!(state.textures, [Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(site.images()[4].texture_slot, None);
        assert_eq!(site.meshes().len(), 5);
    }
}

use glam::{Mat4, Vec3};
use log::{debug, warn};

use crate::page::{BoundingBox, PageElement};
use crate::uniforms::TEXTURE_SLOTS;

/// Rectangular plane drawn under one page image.
///
/// Width and height come from the image box at creation time and are never
/// re-measured; only `position` moves afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMesh {
    pub width: f32,
    pub height: f32,
    pub position: Vec3,
}

impl PlaneMesh {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            position: Vec3::ZERO,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    /// Interleaved `position.xyz, uv` vertices for the two triangles of the plane,
    /// centered on the origin.
    pub fn vertices(&self) -> [f32; 20] {
        let x = self.width / 2.0;
        let y = self.height / 2.0;
        #[rustfmt::skip]
        let vertices = [
            -x, -y, 0.0, 0.0, 1.0,
             x, -y, 0.0, 1.0, 1.0,
             x,  y, 0.0, 1.0, 0.0,
            -x,  y, 0.0, 0.0, 0.0,
        ];
        vertices
    }

    pub const INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
}

/// Links a page image, its plane and the box it had when the plane was built.
#[derive(Debug, Clone)]
pub struct TrackedImage<E> {
    pub element: E,
    pub mesh: PlaneMesh,
    pub initial: BoundingBox,
    /// Sampler slot holding this image's texture, if it got one.
    pub texture_slot: Option<usize>,
}

/// Builds one tracked plane per element, in page order.
pub fn build<E: PageElement>(elements: Vec<E>) -> Vec<TrackedImage<E>> {
    let images: Vec<_> = elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            let initial = element.bounding_box();
            debug!(
                "image {index} ({}) tracked at {:.0}x{:.0}",
                element.source(),
                initial.width,
                initial.height
            );
            TrackedImage {
                mesh: PlaneMesh::new(initial.width, initial.height),
                initial,
                texture_slot: (index < TEXTURE_SLOTS).then_some(index),
                element,
            }
        })
        .collect();

    if images.len() > TEXTURE_SLOTS {
        warn!(
            "{} images found but only {TEXTURE_SLOTS} texture slots exist; {} image(s) render without a texture",
            images.len(),
            images.len() - TEXTURE_SLOTS
        );
    }
    images
}

/// Image index bound to each sampler slot: slot `i` shows image `i` when it exists.
pub fn texture_bindings(image_count: usize) -> [Option<usize>; TEXTURE_SLOTS] {
    std::array::from_fn(|slot| (slot < image_count).then_some(slot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct FixedElement(BoundingBox);

    impl PageElement for FixedElement {
        fn bounding_box(&self) -> BoundingBox {
            self.0
        }

        fn source(&self) -> String {
            "fixed.png".to_string()
        }
    }

    fn elements(count: usize) -> Vec<FixedElement> {
        (0..count)
            .map(|i| FixedElement(BoundingBox::new(0.0, i as f32 * 100.0, 80.0, 60.0)))
            .collect()
    }

    #[test]
    fn one_plane_per_image_sized_from_its_box() {
        let images = build(elements(3));
        assert_eq!(images.len(), 3);
        for image in &images {
            assert_eq!(image.mesh.width, 80.0);
            assert_eq!(image.mesh.height, 60.0);
            assert_eq!(image.initial, image.element.0);
        }
    }

    #[test]
    fn fifth_image_has_no_texture_slot() {
        let images = build(elements(5));
        let slots: Vec<_> = images.iter().map(|image| image.texture_slot).collect();
        assert_eq!(slots, vec![Some(0), Some(1), Some(2), Some(3), None]);
        assert_eq!(
            texture_bindings(images.len()),
            [Some(0), Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn fewer_images_leave_slots_unmapped() {
        assert_eq!(texture_bindings(2), [Some(0), Some(1), None, None]);
    }

    #[test]
    fn plane_vertices_span_its_size() {
        let mesh = PlaneMesh::new(10.0, 4.0);
        let vertices = mesh.vertices();
        assert_eq!(&vertices[0..2], &[-5.0, -2.0]);
        assert_eq!(&vertices[10..12], &[5.0, 2.0]);
    }
}

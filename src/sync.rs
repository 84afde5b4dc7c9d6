use glam::Vec2;

use crate::page::{BoundingBox, PageElement};
use crate::registry::TrackedImage;

/// Center of `bounds` in scene coordinates: origin at the middle of the
/// container, y pointing up.
pub fn scene_position(bounds: &BoundingBox, viewport: (f32, f32)) -> Vec2 {
    let (width, height) = viewport;
    Vec2::new(
        bounds.left - width / 2.0 + bounds.width / 2.0,
        -bounds.top + height / 2.0 - bounds.height / 2.0,
    )
}

/// Re-reads every image box and moves its plane underneath it.
///
/// Runs at startup and on resize only. Scrolling is not tracked, so planes
/// drift from their images while the page scrolls until the next resize.
pub fn sync_positions<E: PageElement>(images: &mut [TrackedImage<E>], viewport: (f32, f32)) {
    for image in images.iter_mut() {
        let bounds = image.element.bounding_box();
        let position = scene_position(&bounds, viewport);
        image.mesh.position.x = position.x;
        image.mesh.position.y = position.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{BoxSpec, ContainerHandle, LayoutElement, Length};
    use crate::registry;

    #[test]
    fn top_left_box_maps_to_upper_left_quadrant() {
        let position = scene_position(&BoundingBox::new(0.0, 0.0, 100.0, 50.0), (800.0, 600.0));
        assert_eq!(position, Vec2::new(-350.0, 275.0));
    }

    #[test]
    fn centered_box_maps_to_origin() {
        let position = scene_position(&BoundingBox::new(250.0, 350.0, 100.0, 100.0), (800.0, 600.0));
        assert_eq!(position, Vec2::ZERO);
    }

    #[test]
    fn sync_follows_the_live_layout() {
        let container = ContainerHandle::new(800.0, 600.0);
        let spec = BoxSpec {
            top: Length::Percent(50.0),
            left: Length::Px(20.0),
            width: Length::Px(100.0),
            height: Length::Px(40.0),
        };
        let element = LayoutElement::new("a.png".into(), spec, container.clone());
        let mut images = registry::build(vec![element]);

        sync_positions(&mut images, container.size());
        let bounds = images[0].element.bounding_box();
        assert_eq!(images[0].mesh.position.x, bounds.left - 400.0 + bounds.width / 2.0);
        assert_eq!(images[0].mesh.position.y, -bounds.top + 300.0 - bounds.height / 2.0);

        container.update(1000.0, 1000.0);
        sync_positions(&mut images, container.size());
        assert_eq!(images[0].mesh.position.x, 20.0 - 500.0 + 50.0);
        assert_eq!(images[0].mesh.position.y, -500.0 + 500.0 - 20.0);
        // geometry stays as first measured
        assert_eq!(images[0].mesh.width, 100.0);
        assert_eq!(images[0].mesh.position.z, 0.0);
    }
}

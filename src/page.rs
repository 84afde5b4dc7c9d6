use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tween::Ease;

/// On-screen rectangle of a page element, in page pixels with the origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// An image element as seen by the plane registry and position synchronizer.
pub trait PageElement {
    /// Current layout box. Re-read on every sync, never cached by the element.
    fn bounding_box(&self) -> BoundingBox;

    /// Location of the pixel source backing the element.
    fn source(&self) -> String;
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid page XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("<{0}> element is missing")]
    MissingElement(&'static str),
    #[error("<{element}> is missing the `{attribute}` attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("invalid length `{value}` for `{attribute}`")]
    InvalidLength { attribute: String, value: String },
    #[error("invalid number `{value}` for `{attribute}`")]
    InvalidNumber { attribute: String, value: String },
    #[error("unknown ease `{0}`")]
    UnknownEase(String),
}

/// Length as written in the page file: absolute pixels or a share of the container extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Length::Px(value) => value,
            Length::Percent(value) => extent * value / 100.0,
        }
    }

    fn parse(attribute: &str, raw: &str) -> Result<Self, LayoutError> {
        let raw = raw.trim();
        let invalid = || LayoutError::InvalidLength {
            attribute: attribute.to_string(),
            value: raw.to_string(),
        };
        if let Some(percent) = raw.strip_suffix('%') {
            return percent
                .trim()
                .parse::<f32>()
                .map(Length::Percent)
                .map_err(|_| invalid());
        }
        raw.strip_suffix("px")
            .unwrap_or(raw)
            .trim()
            .parse::<f32>()
            .map(Length::Px)
            .map_err(|_| invalid())
    }
}

/// Box whose edges may be relative to the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpec {
    pub top: Length,
    pub left: Length,
    pub width: Length,
    pub height: Length,
}

impl BoxSpec {
    pub fn resolve(&self, container: (f32, f32)) -> BoundingBox {
        let (width, height) = container;
        BoundingBox {
            top: self.top.resolve(height),
            left: self.left.resolve(width),
            width: self.width.resolve(width),
            height: self.height.resolve(height),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    pub src: String,
    pub bounds: BoxSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkSpec {
    pub label: String,
    pub bounds: BoxSpec,
}

/// Hover transition settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfig {
    pub duration: f32,
    pub target: f32,
    pub ease: Ease,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 1.5,
            target: 3.0,
            ease: Ease::PowerOneOut,
        }
    }
}

/// Page description used by the native host in place of a browser document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub images: Vec<ImageSpec>,
    pub links: Vec<LinkSpec>,
    pub transition: TransitionConfig,
}

impl PageLayout {
    pub const DEFAULT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_HEIGHT: f32 = 720.0;

    /// Parses a page file. `<images>` and `<links>` must both be present.
    pub fn from_xml(xml: &str) -> Result<Self, LayoutError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();

        let width = parse_number(&root, "width")?.unwrap_or(Self::DEFAULT_WIDTH);
        let height = parse_number(&root, "height")?.unwrap_or(Self::DEFAULT_HEIGHT);

        let images_node = child(&root, "images").ok_or(LayoutError::MissingElement("images"))?;
        let links_node = child(&root, "links").ok_or(LayoutError::MissingElement("links"))?;

        let mut images = Vec::new();
        for node in images_node.children().filter(|n| n.has_tag_name("img")) {
            let src = node
                .attribute("src")
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .ok_or(LayoutError::MissingAttribute {
                    element: "img",
                    attribute: "src",
                })?;
            images.push(ImageSpec {
                src: src.to_string(),
                bounds: parse_box(&node, "img")?,
            });
        }

        let mut links = Vec::new();
        for node in links_node.children().filter(|n| n.has_tag_name("a")) {
            links.push(LinkSpec {
                label: node.text().map(str::trim).unwrap_or_default().to_string(),
                bounds: parse_box(&node, "a")?,
            });
        }

        let transition = match child(&root, "transition") {
            Some(node) => parse_transition(&node)?,
            None => TransitionConfig::default(),
        };

        Ok(Self {
            width,
            height,
            images,
            links,
            transition,
        })
    }

    /// Creates one element per `<img>`, all resolving against `container`.
    pub fn image_elements(&self, container: &ContainerHandle) -> Vec<LayoutElement> {
        self.images
            .iter()
            .map(|image| LayoutElement::new(image.src.clone(), image.bounds, container.clone()))
            .collect()
    }

    /// Resolves every link box against the given container size.
    pub fn link_boxes(&self, container: (f32, f32)) -> Vec<BoundingBox> {
        self.links
            .iter()
            .map(|link| link.bounds.resolve(container))
            .collect()
    }
}

/// Shared container size, updated by the host on resize and read by every element.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    size: Arc<RwLock<(f32, f32)>>,
}

impl ContainerHandle {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Arc::new(RwLock::new((width, height))),
        }
    }

    pub fn update(&self, width: f32, height: f32) {
        *self.size.write() = (width, height);
    }

    pub fn size(&self) -> (f32, f32) {
        *self.size.read()
    }
}

/// Image element laid out from a [`BoxSpec`] inside a resizable container.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    src: String,
    bounds: BoxSpec,
    container: ContainerHandle,
}

impl LayoutElement {
    pub fn new(src: String, bounds: BoxSpec, container: ContainerHandle) -> Self {
        Self {
            src,
            bounds,
            container,
        }
    }
}

impl PageElement for LayoutElement {
    fn bounding_box(&self) -> BoundingBox {
        self.bounds.resolve(self.container.size())
    }

    fn source(&self) -> String {
        self.src.clone()
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn parse_box(node: &Node<'_, '_>, element: &'static str) -> Result<BoxSpec, LayoutError> {
    let length = |attribute: &'static str| -> Result<Length, LayoutError> {
        let raw = node
            .attribute(attribute)
            .ok_or(LayoutError::MissingAttribute { element, attribute })?;
        Length::parse(attribute, raw)
    };
    Ok(BoxSpec {
        top: length("top")?,
        left: length("left")?,
        width: length("width")?,
        height: length("height")?,
    })
}

fn parse_transition(node: &Node<'_, '_>) -> Result<TransitionConfig, LayoutError> {
    let defaults = TransitionConfig::default();
    let ease = match node.attribute("ease") {
        Some(name) => {
            Ease::from_name(name.trim()).ok_or_else(|| LayoutError::UnknownEase(name.to_string()))?
        }
        None => defaults.ease,
    };
    let duration = parse_number(node, "duration")?.unwrap_or(defaults.duration);
    if Duration::try_from_secs_f32(duration).is_err() {
        return Err(invalid_number(node, "duration"));
    }
    let target = parse_number(node, "target")?.unwrap_or(defaults.target);
    if !target.is_finite() {
        return Err(invalid_number(node, "target"));
    }
    Ok(TransitionConfig {
        duration,
        target,
        ease,
    })
}

fn invalid_number(node: &Node<'_, '_>, attribute: &str) -> LayoutError {
    LayoutError::InvalidNumber {
        attribute: attribute.to_string(),
        value: node.attribute(attribute).unwrap_or_default().to_string(),
    }
}

fn parse_number(node: &Node<'_, '_>, attribute: &str) -> Result<Option<f32>, LayoutError> {
    let Some(raw) = node.attribute(attribute) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f32>()
        .map(Some)
        .map_err(|_| LayoutError::InvalidNumber {
            attribute: attribute.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <page width="1000" height="500">
        <images>
            <img src="a.jpg" top="10%" left="100" width="200px" height="50%"/>
            <img src="b.jpg" top="0" left="0" width="10" height="10"/>
        </images>
        <links>
            <a top="0" left="0" width="50" height="20">First</a>
        </links>
        <transition duration="0.5" ease="linear"/>
    </page>
    "#;

    #[test]
    fn parse_page_populates_images_and_links() {
        let page = PageLayout::from_xml(SAMPLE).unwrap();
        assert_eq!(page.width, 1000.0);
        assert_eq!(page.height, 500.0);
        assert_eq!(page.images.len(), 2);
        assert_eq!(page.images[0].src, "a.jpg");
        assert_eq!(page.links.len(), 1);
        assert_eq!(page.links[0].label, "First");
        assert_eq!(page.transition.duration, 0.5);
        assert_eq!(page.transition.target, 3.0);
        assert_eq!(page.transition.ease, Ease::Linear);
    }

    #[test]
    fn percentages_follow_the_container() {
        let page = PageLayout::from_xml(SAMPLE).unwrap();
        let container = ContainerHandle::new(1000.0, 500.0);
        let elements = page.image_elements(&container);
        assert_eq!(
            elements[0].bounding_box(),
            BoundingBox::new(50.0, 100.0, 200.0, 250.0)
        );

        container.update(1000.0, 800.0);
        assert_eq!(
            elements[0].bounding_box(),
            BoundingBox::new(80.0, 100.0, 200.0, 400.0)
        );
    }

    #[test]
    fn missing_links_is_an_error() {
        let bad = r#"<page><images/></page>"#;
        assert!(matches!(
            PageLayout::from_xml(bad),
            Err(LayoutError::MissingElement("links"))
        ));
    }

    #[test]
    fn image_without_src_is_an_error() {
        let bad = r#"<page><images><img top="0" left="0" width="1" height="1"/></images><links/></page>"#;
        assert!(matches!(
            PageLayout::from_xml(bad),
            Err(LayoutError::MissingAttribute {
                element: "img",
                attribute: "src"
            })
        ));
    }

    #[test]
    fn bad_length_is_reported() {
        let bad = r#"<page><images><img src="a" top="x%" left="0" width="1" height="1"/></images><links/></page>"#;
        assert!(matches!(
            PageLayout::from_xml(bad),
            Err(LayoutError::InvalidLength { .. })
        ));
    }

    #[test]
    fn unusable_transition_numbers_are_rejected() {
        for transition in [
            r#"duration="inf""#,
            r#"duration="1e30""#,
            r#"duration="-1""#,
            r#"duration="NaN""#,
            r#"target="infinity""#,
        ] {
            let xml = format!("<page><images/><links/><transition {transition}/></page>");
            assert!(
                matches!(
                    PageLayout::from_xml(&xml),
                    Err(LayoutError::InvalidNumber { .. })
                ),
                "{transition} was accepted"
            );
        }
    }

    #[test]
    fn bounding_box_contains_is_half_open() {
        let bounds = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
        assert!(bounds.contains(10.0, 10.0));
        assert!(!bounds.contains(15.0, 12.0));
    }
}

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::{anyhow, Result};
use gloo_events::EventListener;
use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlImageElement};

use crate::app::Site;
use crate::frame_loop::{install_once, StopSignal};
use crate::input::wasm::WasmInputHandler;
use crate::page::{BoundingBox, PageElement, TransitionConfig};
use crate::render::Renderer;

const DEFAULT_CONTAINER: &str = ".canvas";
const DEFAULT_IMAGES: &str = ".images img";
const DEFAULT_LINKS: &str = ".links a";

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// An `<img>` in the live document, measured on demand.
pub struct DomImage(HtmlImageElement);

impl PageElement for DomImage {
    fn bounding_box(&self) -> BoundingBox {
        let rect = self.0.get_bounding_client_rect();
        BoundingBox::new(
            rect.top() as f32,
            rect.left() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn source(&self) -> String {
        self.0.src()
    }
}

struct WebState {
    site: Site<DomImage>,
    renderer: Renderer,
    canvas: HtmlCanvasElement,
    container: HtmlElement,
    last_time: Option<f64>,
    _input: Option<WasmInputHandler>,
    _loads: Vec<EventListener>,
}

impl WebState {
    fn container_size(&self) -> (f32, f32) {
        element_size(&self.container)
    }

    fn resize(&mut self) {
        let (width, height) = self.container_size();
        let physical = size_canvas(&self.canvas, (width, height));
        self.renderer.resize(physical);
        self.site.resize(width, height);
        debug!("container resized to {width}x{height}");
    }

    fn upload(&mut self, slot: usize, image: &HtmlImageElement) {
        if self.renderer.texture_loaded(slot) {
            return;
        }
        match self.renderer.upload_image_element(slot, image) {
            Ok(()) => debug!("uploaded {} into slot {slot}", image.src()),
            Err(err) => warn!("failed to upload {} into slot {slot}: {err:?}", image.src()),
        }
    }

    fn render_frame(&mut self, now: f64) -> Result<()> {
        let delta_ms = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);
        let state = self
            .site
            .step(std::time::Duration::from_secs_f64(delta_ms / 1000.0));
        let meshes = self.site.meshes();
        self.renderer
            .render_frame(self.site.viewport(), &state, &meshes)
    }
}

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Browser handle to a running crossfade site.
#[wasm_bindgen]
pub struct WasmSite {
    state: Rc<RefCell<WebState>>,
    signal: StopSignal,
    frame: FrameClosure,
}

#[wasm_bindgen]
impl WasmSite {
    /// Builds the site from the current document. Selectors default to
    /// `.canvas`, `.images img` and `.links a`.
    pub async fn create(
        container_selector: Option<String>,
        images_selector: Option<String>,
        links_selector: Option<String>,
    ) -> Result<WasmSite, JsValue> {
        build_site(
            container_selector.as_deref().unwrap_or(DEFAULT_CONTAINER),
            images_selector.as_deref().unwrap_or(DEFAULT_IMAGES),
            links_selector.as_deref().unwrap_or(DEFAULT_LINKS),
        )
        .await
        .map_err(|err| JsValue::from_str(&format!("{err:?}")))
    }

    /// Starts the requestAnimationFrame loop. Does nothing once started.
    pub fn start(&self) -> Result<(), JsValue> {
        schedule_animation_loop(
            Rc::clone(&self.state),
            self.signal.clone(),
            Rc::clone(&self.frame),
        )
        .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Stops the loop; the current frame finishes and no further one is requested.
    pub fn stop(&self) {
        self.signal.stop();
    }
}

async fn build_site(container_sel: &str, images_sel: &str, links_sel: &str) -> Result<WasmSite> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("document not available"))?;

    let container: HtmlElement = query(&document, container_sel)?
        .dyn_into()
        .map_err(|_| anyhow!("{container_sel} is not an HTML element"))?;
    let images: Vec<HtmlImageElement> = query_all(&document, images_sel)?
        .into_iter()
        .filter_map(|element| element.dyn_into().ok())
        .collect();
    let links = query_all(&document, links_sel)?;
    info!(
        "found {} image(s) and {} link(s) in the document",
        images.len(),
        links.len()
    );

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|err| anyhow!("failed to create canvas: {err:?}"))?
        .dyn_into()
        .map_err(|_| anyhow!("created element is not a canvas"))?;
    container
        .append_child(&canvas)
        .map_err(|err| anyhow!("failed to append canvas: {err:?}"))?;

    let size = element_size(&container);
    let physical = size_canvas(&canvas, size);
    let mut renderer =
        Renderer::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), physical).await?;

    let elements = images.iter().cloned().map(DomImage).collect();
    let site = Site::new(size, elements, TransitionConfig::default());
    renderer.set_planes(&site.meshes());

    let state = Rc::new(RefCell::new(WebState {
        site,
        renderer,
        canvas,
        container,
        last_time: None,
        _input: None,
        _loads: Vec::new(),
    }));

    let slots: Vec<(usize, HtmlImageElement)> = {
        let borrowed = state.borrow();
        borrowed
            .site
            .images()
            .iter()
            .zip(&images)
            .filter_map(|(tracked, image)| tracked.texture_slot.map(|slot| (slot, image.clone())))
            .collect()
    };
    let mut loads = Vec::new();
    for (slot, image) in slots {
        if image.complete() && image.natural_width() > 0 {
            state.borrow_mut().upload(slot, &image);
        } else {
            let weak = Rc::downgrade(&state);
            let target = image.clone();
            loads.push(EventListener::once(&image, "load", move |_event| {
                with_state(&weak, |state| state.upload(slot, &target));
            }));
        }
    }

    let hover_state = Rc::downgrade(&state);
    let resize_state = Rc::downgrade(&state);
    let input = WasmInputHandler::attach(
        &window,
        &links,
        Rc::new(move |link: usize| {
            with_state(&hover_state, |state| {
                info!("hover on link {link}");
                state.site.hover_link(link);
            })
        }),
        Rc::new(move || with_state(&resize_state, WebState::resize)),
    );

    {
        let mut borrowed = state.borrow_mut();
        borrowed._input = Some(input);
        borrowed._loads = loads;
    }

    Ok(WasmSite {
        state,
        signal: StopSignal::new(),
        frame: Rc::new(RefCell::new(None)),
    })
}

fn with_state(weak: &Weak<RefCell<WebState>>, f: impl FnOnce(&mut WebState)) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => f(&mut state),
        Err(_) => warn!("site busy; dropping DOM event"),
    };
}

fn schedule_animation_loop(
    state: Rc<RefCell<WebState>>,
    signal: StopSignal,
    frame: FrameClosure,
) -> Result<()> {
    let next = Rc::clone(&frame);
    let installed = install_once(&frame, move || {
        Closure::wrap(Box::new(move || {
            if signal.is_stopped() {
                return;
            }
            let now = web_sys::window()
                .and_then(|window| window.performance())
                .map_or(0.0, |performance| performance.now());
            if let Err(err) = state.borrow_mut().render_frame(now) {
                error!("render failed: {err:?}");
                signal.stop();
            }
            if let Err(err) = request_frame(&next) {
                error!("{err:?}");
            }
        }) as Box<dyn FnMut()>)
    });
    if !installed {
        debug!("animation loop already running");
        return Ok(());
    }
    request_frame(&frame)
}

fn request_frame(frame: &FrameClosure) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let borrowed = frame.borrow();
    let Some(closure) = borrowed.as_ref() else {
        return Ok(());
    };
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
    Ok(())
}

fn query(document: &Document, selector: &str) -> Result<Element> {
    document
        .query_selector(selector)
        .map_err(|err| anyhow!("invalid selector {selector}: {err:?}"))?
        .ok_or_else(|| anyhow!("no element matches {selector}"))
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>> {
    let nodes = document
        .query_selector_all(selector)
        .map_err(|err| anyhow!("invalid selector {selector}: {err:?}"))?;
    Ok((0..nodes.length())
        .filter_map(|index| nodes.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn element_size(element: &HtmlElement) -> (f32, f32) {
    (
        element.offset_width().max(1) as f32,
        element.offset_height().max(1) as f32,
    )
}

/// Sizes the drawing buffer at device resolution and the CSS box at layout size.
fn size_canvas(canvas: &HtmlCanvasElement, (width, height): (f32, f32)) -> (u32, u32) {
    let ratio = web_sys::window().map_or(1.0, |window| window.device_pixel_ratio()) as f32;
    let physical = (
        (width * ratio).round().max(1.0) as u32,
        (height * ratio).round().max(1.0) as u32,
    );
    canvas.set_width(physical.0);
    canvas.set_height(physical.1);
    let style = canvas.style();
    let _ = style.set_property("width", &format!("{width}px"));
    let _ = style.set_property("height", &format!("{height}px"));
    physical
}

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{debug, info};
use pollster::block_on;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::Window;

use dom_crossfade::render::ImageLoader;
use dom_crossfade::{
    print_summary, ContainerHandle, HoverTracker, LayoutElement, PageElement, PageLayout, Renderer,
    Site, StopSignal,
};

#[derive(Debug)]
pub struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

pub fn run_interactive(page: &PageLayout, base_dir: &Path) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("dom-crossfade")
                    .with_transparent(true)
                    .with_inner_size(LogicalSize::new(page.width, page.height)),
            )
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let physical = window.inner_size();
    let scale = window.scale_factor();
    let logical = physical.to_logical::<f32>(scale);
    let container = ContainerHandle::new(logical.width, logical.height);

    let site = Site::new(
        container.size(),
        page.image_elements(&container),
        page.transition,
    );

    let mut renderer = block_on(Renderer::new(
        Arc::clone(&window),
        (physical.width, physical.height),
    ))?;
    renderer.set_planes(&site.meshes());

    let loader = ImageLoader::new();
    for image in site.images() {
        if let Some(slot) = image.texture_slot {
            loader.load(slot, resolve_source(base_dir, &image.element.source()));
        }
    }

    let mut app = AppState {
        window,
        renderer,
        site,
        page: page.clone(),
        container,
        hover: HoverTracker::new(),
        loader,
        signal: StopSignal::new(),
        last_frame: Instant::now(),
        last_error: None,
    };

    #[allow(deprecated)]
    let result = event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        if let Err(err) = app.process_event(&event, elwt) {
            app.last_error = Some(err);
            app.signal.stop();
            elwt.exit();
        }
    });

    print_summary(&app.site);

    if let Some(err) = app.last_error {
        return Err(err);
    }
    result.map_err(|err| anyhow!("event loop error: {err}"))
}

fn resolve_source(base_dir: &Path, src: &str) -> PathBuf {
    let path = Path::new(src);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

struct AppState {
    window: Arc<Window>,
    renderer: Renderer,
    site: Site<LayoutElement>,
    page: PageLayout,
    container: ContainerHandle,
    hover: HoverTracker,
    loader: ImageLoader,
    signal: StopSignal,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, elwt: &ActiveEventLoop) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.window.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        self.signal.stop();
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => self.resize(*size),
                    WindowEvent::ScaleFactorChanged { .. } => {
                        self.resize(self.window.inner_size());
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let logical = position.to_logical::<f32>(self.window.scale_factor());
                        let links = self.page.link_boxes(self.container.size());
                        let pointer = Vec2::new(logical.x, logical.y);
                        if let Some(link) = self.hover.set_mouse_position(pointer, &links) {
                            info!("hover on link {link}");
                            self.site.hover_link(link);
                        }
                    }
                    WindowEvent::CursorLeft { .. } => self.hover.clear(),
                    WindowEvent::RedrawRequested => self.redraw()?,
                    _ => {}
                }
            }
            Event::AboutToWait => {
                if !self.signal.is_stopped() {
                    self.window.request_redraw();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.renderer.resize((size.width, size.height));
        let logical = size.to_logical::<f32>(self.window.scale_factor());
        self.container.update(logical.width, logical.height);
        self.site.resize(logical.width, logical.height);
        debug!("container resized to {}x{}", logical.width, logical.height);
    }

    fn redraw(&mut self) -> Result<()> {
        for decoded in self.loader.poll() {
            self.renderer.upload_texture(
                decoded.slot,
                decoded.width,
                decoded.height,
                &decoded.pixels,
            )?;
        }

        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;

        let state = self.site.step(delta);
        self.renderer
            .render_frame(self.site.viewport(), &state, &self.site.meshes())
    }
}

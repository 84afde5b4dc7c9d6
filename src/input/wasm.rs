use std::rc::Rc;

use gloo_events::EventListener;
use web_sys::{Element, Window};

/// Keeps the DOM listeners that feed hover and resize notifications to the site.
pub struct WasmInputHandler {
    listeners: Vec<EventListener>,
}

impl WasmInputHandler {
    /// Registers a `mouseover` listener on every link (reporting its index) and a
    /// `resize` listener on the window.
    pub fn attach(
        window: &Window,
        links: &[Element],
        on_hover: Rc<dyn Fn(usize)>,
        on_resize: Rc<dyn Fn()>,
    ) -> Self {
        let mut listeners = Vec::with_capacity(links.len() + 1);

        for (index, link) in links.iter().enumerate() {
            let on_hover = Rc::clone(&on_hover);
            listeners.push(EventListener::new(link, "mouseover", move |_event| {
                on_hover(index);
            }));
        }

        listeners.push(EventListener::new(window, "resize", move |_event| {
            on_resize();
        }));

        Self { listeners }
    }
}

impl Drop for WasmInputHandler {
    fn drop(&mut self) {
        self.listeners.clear();
    }
}

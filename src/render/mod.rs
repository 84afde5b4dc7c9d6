mod common;
mod gpu;
mod shader;
mod texture;

pub use gpu::Renderer;
#[cfg(not(target_arch = "wasm32"))]
pub use texture::{DecodedImage, ImageLoader};

use anyhow::{anyhow, Result};

use crate::uniforms::TEXTURE_SLOTS;

pub(crate) const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// The four image samplers of the crossfade material.
///
/// Every slot starts out as a 1x1 transparent placeholder and is swapped for
/// the real image whenever its pixels arrive.
pub(crate) struct TextureSlots {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    slots: Vec<SlotTexture>,
    bind_group: wgpu::BindGroup,
}

struct SlotTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    loaded: bool,
}

impl TextureSlots {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..TEXTURE_SLOTS as u32)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: TEXTURE_SLOTS as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("image-slots-layout"),
            entries: &entries,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("image-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let slots: Vec<SlotTexture> = (0..TEXTURE_SLOTS)
            .map(|slot| {
                let label = format!("image-slot-{slot}-placeholder");
                let texture = create_texture(device, 1, 1, &label);
                write_pixels(queue, &texture, 1, 1, &[0, 0, 0, 0]);
                SlotTexture {
                    view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
                    _texture: texture,
                    loaded: false,
                }
            })
            .collect();

        let bind_group = create_bind_group(device, &layout, &sampler, &slots);
        Self {
            layout,
            sampler,
            slots,
            bind_group,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn is_loaded(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|slot| slot.loaded)
    }

    /// Replaces `slot` with tightly packed RGBA8 pixels.
    pub fn upload_rgba(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: usize,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<()> {
        check_slot(slot)?;
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(anyhow!(
                "slot {slot}: expected {expected} bytes for {width}x{height}, got {}",
                pixels.len()
            ));
        }
        let texture = create_texture(device, width, height, &format!("image-slot-{slot}"));
        write_pixels(queue, &texture, width, height, pixels);
        self.install(device, slot, texture);
        Ok(())
    }

    /// Copies an already loaded `<img>` element into `slot`.
    #[cfg(target_arch = "wasm32")]
    pub fn upload_image_element(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: usize,
        image: &web_sys::HtmlImageElement,
    ) -> Result<()> {
        check_slot(slot)?;
        let (width, height) = (image.natural_width(), image.natural_height());
        if width == 0 || height == 0 {
            return Err(anyhow!("slot {slot}: image has no pixels yet"));
        }
        let texture = create_texture(device, width, height, &format!("image-slot-{slot}"));
        queue.copy_external_image_to_texture(
            &wgpu::CopyExternalImageSourceInfo {
                source: wgpu::ExternalImageSource::HTMLImageElement(image.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::CopyExternalImageDestInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.install(device, slot, texture);
        Ok(())
    }

    fn install(&mut self, device: &wgpu::Device, slot: usize, texture: wgpu::Texture) {
        self.slots[slot] = SlotTexture {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            _texture: texture,
            loaded: true,
        };
        self.bind_group = create_bind_group(device, &self.layout, &self.sampler, &self.slots);
    }
}

fn check_slot(slot: usize) -> Result<()> {
    if slot >= TEXTURE_SLOTS {
        return Err(anyhow!(
            "texture slot {slot} out of range (only {TEXTURE_SLOTS} slots)"
        ));
    }
    Ok(())
}

fn create_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

fn write_pixels(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
    data: &[u8],
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    slots: &[SlotTexture],
) -> wgpu::BindGroup {
    let mut entries: Vec<wgpu::BindGroupEntry> = slots
        .iter()
        .enumerate()
        .map(|(binding, slot)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: wgpu::BindingResource::TextureView(&slot.view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: TEXTURE_SLOTS as u32,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("image-slots"),
        layout,
        entries: &entries,
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub use loader::{DecodedImage, ImageLoader};

#[cfg(not(target_arch = "wasm32"))]
mod loader {
    use std::path::{Path, PathBuf};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;

    use anyhow::{Context, Result};
    use log::{debug, warn};

    /// RGBA8 pixels decoded for one texture slot.
    pub struct DecodedImage {
        pub slot: usize,
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u8>,
    }

    /// Decodes image files on background threads; the host polls for results.
    ///
    /// Failures are logged and otherwise dropped: the slot keeps its placeholder.
    pub struct ImageLoader {
        sender: Sender<DecodedImage>,
        receiver: Receiver<DecodedImage>,
    }

    impl Default for ImageLoader {
        fn default() -> Self {
            let (sender, receiver) = mpsc::channel();
            Self { sender, receiver }
        }
    }

    impl ImageLoader {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn load(&self, slot: usize, path: PathBuf) {
            let sender = self.sender.clone();
            thread::spawn(move || match decode(&path) {
                Ok((width, height, pixels)) => {
                    debug!("decoded {} ({width}x{height}) for slot {slot}", path.display());
                    let _ = sender.send(DecodedImage {
                        slot,
                        width,
                        height,
                        pixels,
                    });
                }
                Err(err) => warn!("failed to load image for slot {slot}: {err:?}"),
            });
        }

        /// Everything decoded since the last poll.
        pub fn poll(&self) -> Vec<DecodedImage> {
            self.receiver.try_iter().collect()
        }
    }

    fn decode(path: &Path) -> Result<(u32, u32, Vec<u8>)> {
        let image = image::open(path)
            .with_context(|| format!("unable to decode {}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok((width, height, image.into_raw()))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::time::{Duration, Instant};

        fn wait_for(loader: &ImageLoader) -> Vec<DecodedImage> {
            let deadline = Instant::now() + Duration::from_secs(5);
            loop {
                let decoded = loader.poll();
                if !decoded.is_empty() || Instant::now() > deadline {
                    return decoded;
                }
                thread::sleep(Duration::from_millis(10));
            }
        }

        #[test]
        fn decodes_png_in_the_background() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("pixel.png");
            image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
                .save(&path)
                .unwrap();

            let loader = ImageLoader::new();
            loader.load(1, path);
            let decoded = wait_for(&loader);
            assert_eq!(decoded.len(), 1);
            assert_eq!(decoded[0].slot, 1);
            assert_eq!((decoded[0].width, decoded[0].height), (3, 2));
            assert_eq!(decoded[0].pixels.len(), 3 * 2 * 4);
        }

        #[test]
        fn missing_file_yields_nothing() {
            let loader = ImageLoader::new();
            loader.load(0, PathBuf::from("/definitely/not/here.png"));
            thread::sleep(Duration::from_millis(100));
            assert!(loader.poll().is_empty());
        }
    }
}

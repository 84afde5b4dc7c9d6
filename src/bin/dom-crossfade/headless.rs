use std::time::Duration;

use anyhow::{anyhow, Result};
use log::info;
use serde::Serialize;

use dom_crossfade::{
    print_summary, run_frames, BoundingBox, ContainerHandle, LayoutElement, PageElement,
    PageLayout, ShaderState, Site, StopSignal, Viewport,
};

use crate::cli::{Cli, HoverEvent};

/// Tween delta used for every headless frame.
const FRAME_DELTA: Duration = Duration::from_micros(16_667);

#[derive(Debug, Serialize)]
struct Report {
    frames: u64,
    viewport: Viewport,
    images: Vec<ImageReport>,
    uniforms: ShaderState,
}

#[derive(Debug, Serialize)]
struct ImageReport {
    src: String,
    bounds: BoundingBox,
    size: [f32; 2],
    position: [f32; 2],
    texture_slot: Option<usize>,
}

pub fn run_headless(page: &PageLayout, cli: &Cli) -> Result<()> {
    check_hovers(&cli.hovers, page.links.len())?;

    let container = ContainerHandle::new(page.width, page.height);
    let mut site = Site::new(
        container.size(),
        page.image_elements(&container),
        page.transition,
    );

    let signal = StopSignal::new();
    let stepped = run_frames(&signal, Some(cli.frames), |frame| {
        for hover in cli.hovers.iter().filter(|hover| hover.frame == frame) {
            info!("frame {frame}: hover on link {}", hover.link);
            site.hover_link(hover.link);
        }
        site.step(FRAME_DELTA);
        Ok(())
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report(&site, stepped))?);
    } else {
        print_summary(&site);
    }
    Ok(())
}

fn check_hovers(hovers: &[HoverEvent], links: usize) -> Result<()> {
    match hovers.iter().find(|hover| hover.link >= links) {
        Some(hover) => Err(anyhow!(
            "--hover {}@{} targets a missing link (page has {links})",
            hover.link,
            hover.frame
        )),
        None => Ok(()),
    }
}

fn report(site: &Site<LayoutElement>, frames: u64) -> Report {
    Report {
        frames,
        viewport: *site.viewport(),
        images: site
            .images()
            .iter()
            .map(|image| ImageReport {
                src: image.element.source(),
                bounds: image.element.bounding_box(),
                size: [image.mesh.width, image.mesh.height],
                position: [image.mesh.position.x, image.mesh.position.y],
                texture_slot: image.texture_slot,
            })
            .collect(),
        uniforms: site.uniforms().snapshot(),
    }
}

use std::path::PathBuf;

use clap::Parser;

/// Renders the images of a page description and crossfades them on link hover.
#[derive(Debug, Parser)]
#[command(name = "dom-crossfade", version, about)]
pub struct Cli {
    /// Page layout XML listing the images and links.
    pub page: PathBuf,

    /// Step the site without opening a window and print the final state.
    #[arg(long)]
    pub headless: bool,

    /// Number of frames to step in headless mode.
    #[arg(long, default_value_t = 60)]
    pub frames: u64,

    /// Hover link LINK right before frame FRAME (headless only, repeatable).
    #[arg(long = "hover", value_name = "LINK@FRAME", value_parser = parse_hover)]
    pub hovers: Vec<HoverEvent>,

    /// Print the final headless state as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Scripted mouse-enter on a link, applied before the given 0-based frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverEvent {
    pub link: usize,
    pub frame: u64,
}

fn parse_hover(raw: &str) -> Result<HoverEvent, String> {
    let (link, frame) = raw
        .split_once('@')
        .ok_or_else(|| format!("expected LINK@FRAME, got `{raw}`"))?;
    let link = link
        .trim()
        .parse()
        .map_err(|err| format!("invalid link index `{link}`: {err}"))?;
    let frame = frame
        .trim()
        .parse()
        .map_err(|err| format!("invalid frame `{frame}`: {err}"))?;
    Ok(HoverEvent { link, frame })
}

#[cfg(not(target_arch = "wasm32"))]
mod cli;
#[cfg(not(target_arch = "wasm32"))]
mod headless;
#[cfg(not(target_arch = "wasm32"))]
mod window;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> anyhow::Result<()> {
    use std::fs;
    use std::path::Path;

    use anyhow::Context;
    use clap::Parser;
    use dom_crossfade::PageLayout;

    let cli = cli::Cli::parse();
    let xml = fs::read_to_string(&cli.page)
        .with_context(|| format!("failed to read page {}", cli.page.display()))?;
    let page = PageLayout::from_xml(&xml)
        .with_context(|| format!("failed to parse page {}", cli.page.display()))?;
    let base_dir = cli
        .page
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    if !cli.json {
        println!(
            "Loaded page with {} images ({} links)",
            page.images.len(),
            page.links.len()
        );
    }

    if cli.headless {
        return headless::run_headless(&page, &cli);
    }

    match window::run_interactive(&page, &base_dir) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<window::WindowInitError>().is_some() => {
            eprintln!("{err}. Falling back to --headless mode (set DISPLAY to enable rendering).");
            headless::run_headless(&page, &cli)
        }
        Err(err) => Err(err),
    }
}

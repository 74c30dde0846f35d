/// scrollcube terminal preview
///
/// Renders the landing-page cube as ASCII and simulates page scrolling so
/// the scroll mapping can be tuned without a browser.
/// Controls:
///   - Up/Down, j/k, mouse wheel: Scroll the simulated page
///   - PageUp/PageDown: Scroll ten steps
///   - Home: Back to the top
///   - Q/ESC: Quit
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use scrollcube_core::hdr::parse_hdr;
use scrollcube_core::{AssetTracker, CubeConfig, CubeScene, RoundedBox};
use scrollcube_terminal::{ScrollSimulation, TerminalApp};

#[derive(Parser)]
#[command(name = "scrollcube-terminal")]
#[command(about = "Preview the scroll-driven cube in the terminal", long_about = None)]
struct Cli {
    /// Canvas top in page coordinates (px)
    #[arg(long, default_value_t = 510.0)]
    canvas_page_top: f32,

    /// Pixels scrolled per key press or wheel notch
    #[arg(long, default_value_t = 20.0)]
    scroll_step: f32,

    /// JSON file overriding the page configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment map to decode before the scene comes up
    #[arg(long)]
    hdr: Option<PathBuf>,

    /// Subdivisions across each rounded edge
    #[arg(long, default_value_t = 3)]
    segments: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CubeConfig::from_json(&fs::read_to_string(path)?)?,
        None => CubeConfig::default(),
    };

    let mut scene = CubeScene::new(config);
    let mut assets = AssetTracker::new();
    if let Some(path) = &cli.hdr {
        match fs::read(path).map_err(|e| e.to_string()).and_then(|data| parse_hdr(&data).map_err(|e| e.to_string())) {
            Ok(image) => {
                log::info!(
                    "environment map {}x{} (exposure {})",
                    image.width(),
                    image.height(),
                    image.exposure()
                );
                assets.environment_loaded();
            }
            Err(e) => assets.environment_failed(e),
        }
    }
    // A missing environment map only dims the cube
    scene.mark_ready();

    let cube = RoundedBox {
        segments: cli.segments,
        ..RoundedBox::cube()
    }
    .build();
    log::info!("cube mesh has {} triangles", cube.triangles.len());

    println!("scrollcube terminal preview (press Q to quit)...");

    let simulation = ScrollSimulation::new(cli.canvas_page_top, cli.scroll_step);
    let mut app = TerminalApp::new(cube, scene, simulation)?;
    app.run()?;

    Ok(())
}

/// Example: Decode an environment map and print what the cube will see
///
/// Usage: cargo run --example inspect_hdr -- path/to/cube-texture.hdr

use std::env;
use std::fs;
use std::io;
use scrollcube_core::hdr;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <hdr-file>", args[0]);
        return Ok(());
    }

    let hdr_path = &args[1];

    // Read HDR file
    let data = fs::read(hdr_path)
        .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("Failed to read HDR file: {}", e)))?;

    // Decode HDR
    let image = hdr::parse_hdr(&data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Failed to decode HDR: {}", e)))?;

    println!("{}: {}x{}", hdr_path, image.width(), image.height());
    println!("  exposure:       {}", image.exposure());
    println!("  mean luminance: {:.4}", image.mean_luminance());
    if let Some([r, g, b]) = image.pixel_rgb(image.width() / 2, 0) {
        println!("  zenith radiance: ({:.3}, {:.3}, {:.3})", r, g, b);
    }

    Ok(())
}

//! `info` - report decoded image dimensions, color mode, and metadata.

use anyhow::Result;
use clap::Args;
use rasterpipe_transform::FormatOptions;
use std::path::PathBuf;
use tracing::info as log_info;

use super::read_input;

#[derive(Args, Clone)]
pub struct InfoArgs {
    /// Input image path.
    pub input: PathBuf,
}

pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let bytes = read_input(&args.input)?;
    let decoded = rasterpipe_io::decode(&bytes, &mut FormatOptions::builder())?;
    log_info!(path = %args.input.display(), "decoded");

    println!("path: {}", args.input.display());
    println!("width: {}", decoded.image.width);
    println!("height: {}", decoded.image.height);
    println!("color_mode: {}", decoded.image.color_mode);
    println!("exif_orientation: {}", decoded.exif_orientation);
    if let Some(pano) = &decoded.pano {
        println!("pano: {pano:?}");
    }
    if verbose > 0 {
        println!("bytes: {}", bytes.len());
    }
    Ok(())
}

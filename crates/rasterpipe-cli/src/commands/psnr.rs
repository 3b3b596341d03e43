//! `psnr` - compute PSNR between two images of equal dimensions.

use anyhow::{bail, Result};
use clap::Args;
use rasterpipe_transform::FormatOptions;
use std::path::PathBuf;

use super::read_input;

#[derive(Args, Clone)]
pub struct PsnrArgs {
    /// First input image path.
    pub a: PathBuf,
    /// Second input image path.
    pub b: PathBuf,
}

pub fn run(args: PsnrArgs, verbose: u8) -> Result<()> {
    let a_bytes = read_input(&args.a)?;
    let b_bytes = read_input(&args.b)?;
    let a = rasterpipe_io::decode(&a_bytes, &mut FormatOptions::builder())?.image;
    let b = rasterpipe_io::decode(&b_bytes, &mut FormatOptions::builder())?.image;

    if a.width != b.width || a.height != b.height || a.color_mode != b.color_mode {
        bail!("psnr requires matching dimensions and color mode");
    }

    let bpp = a.color_mode.bpp();
    let pitch = a.width as usize * bpp;
    let value = rasterpipe_core::bitmap::psnr(&a.data, pitch, &b.data, pitch, a.width, a.height, bpp);
    if verbose > 0 {
        println!("{} vs {}: {value:.3} dB", args.a.display(), args.b.display());
    } else {
        println!("{value:.3}");
    }
    Ok(())
}

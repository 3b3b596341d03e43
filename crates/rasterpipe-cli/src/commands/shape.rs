//! `shape` - report the crop/output Rects implied by a set of options for a
//! given source image, without performing the pixel transform. Lets scripts
//! and tests introspect `computeCropRect`/`computeOutputSize` without
//! paying for a full decode.

use anyhow::{bail, Result};
use clap::Args;
use rasterpipe_transform::{FormatOptions, ScaleMode};
use std::path::PathBuf;

use super::read_input;

#[derive(Args, Clone)]
pub struct ShapeArgs {
    /// Input image path (only its header is decoded).
    pub input: PathBuf,
    /// Maximum output width.
    #[arg(long = "width")]
    pub width: Option<i32>,
    /// Maximum output height.
    #[arg(long = "height")]
    pub height: Option<i32>,
    /// `letterbox`, `crop`, or `fit`.
    #[arg(long = "scale", default_value = "letterbox")]
    pub scale: String,
}

pub fn run(args: ShapeArgs, _verbose: u8) -> Result<()> {
    let bytes = read_input(&args.input)?;
    let decoded = rasterpipe_io::decode(&bytes, &mut FormatOptions::builder())?;
    let image = decoded.image;

    let mut options = FormatOptions::builder();
    if let Some(w) = args.width {
        options.max_width = w;
    }
    if let Some(h) = args.height {
        options.max_height = h;
    }
    options.scale_mode = match args.scale.as_str() {
        "letterbox" => ScaleMode::Letterbox,
        "crop" => ScaleMode::Crop,
        "fit" => ScaleMode::Fit,
        other => bail!("unknown -scale value: {other}"),
    };

    let crop_rect = options.compute_crop_rect(image.width, image.height);
    let (out_w, out_h, mode) = options.compute_output_size(crop_rect.width, crop_rect.height);

    println!("source: {}x{}", image.width, image.height);
    println!(
        "crop_rect: {}x{}@{},{}",
        crop_rect.width, crop_rect.height, crop_rect.x, crop_rect.y
    );
    println!("output_size: {out_w}x{out_h} ({mode:?})");
    Ok(())
}

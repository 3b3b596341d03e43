//! `transcode` - decode, transform, and re-encode an image.

use anyhow::{bail, Result};
use clap::Args;
use rasterpipe_core::ColorMode;
use rasterpipe_transform::{CropMode, FormatOptions, OutputFormat, ScaleMode};
use std::path::PathBuf;

use super::{read_input, write_output};

#[derive(Args, Clone)]
pub struct TranscodeArgs {
    /// Input image path.
    pub input: PathBuf,
    /// Output image path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Maximum output width; unconstrained if omitted.
    #[arg(long = "width")]
    pub width: Option<i32>,
    /// Maximum output height; unconstrained if omitted.
    #[arg(long = "height")]
    pub height: Option<i32>,
    /// `letterbox`, `crop`, or `fit`.
    #[arg(long = "scale", default_value = "letterbox")]
    pub scale: String,
    /// JPEG/WebP quality, 0-100.
    #[arg(long = "quality", default_value = "85")]
    pub quality: u8,
    /// Output container: `jpeg`, `png`, or `webp`.
    #[arg(long = "format")]
    pub format: String,
    /// Sharpen sigma; 0 disables.
    #[arg(long = "sharpen", default_value = "0.0")]
    pub sharpen: f64,
    /// `WxH@X,Y` absolute crop rectangle.
    #[arg(long = "crop")]
    pub crop: Option<String>,
}

pub fn run(args: TranscodeArgs, verbose: u8) -> Result<()> {
    let bytes = read_input(&args.input)?;

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
    options.quality = args.quality;
    options.sharpen = args.sharpen;
    options.format = match args.format.as_str() {
        "jpeg" | "jpg" => OutputFormat::Jpeg,
        "png" => OutputFormat::Png,
        "webp" => OutputFormat::WebP,
        other => bail!("unknown -format value: {other}"),
    };
    if let Some(spec) = &args.crop {
        let (w, h, x, y) = parse_crop_spec(spec)?;
        options.crop_size_mode = CropMode::Absolute;
        options.crop_offset_mode = CropMode::Absolute;
        options.crop_width = w;
        options.crop_height = h;
        options.crop_x = x;
        options.crop_y = y;
    }

    let dst_color_mode = match options.format {
        OutputFormat::WebP => ColorMode::Rgba,
        _ => ColorMode::Rgb,
    };

    let encoded = rasterpipe_io::transcode(&bytes, dst_color_mode, &mut options)?;
    if verbose > 0 {
        println!("wrote {} bytes to {}", encoded.len(), args.output.display());
    }
    write_output(&args.output, &encoded)
}

fn parse_crop_spec(spec: &str) -> Result<(i32, i32, i32, i32)> {
    let (size, offset) = spec.split_once('@').ok_or_else(|| anyhow::anyhow!("expected WxH@X,Y"))?;
    let (w, h) = size.split_once('x').ok_or_else(|| anyhow::anyhow!("expected WxH@X,Y"))?;
    let (x, y) = offset.split_once(',').ok_or_else(|| anyhow::anyhow!("expected WxH@X,Y"))?;
    Ok((w.parse()?, h.parse()?, x.parse()?, y.parse()?))
}

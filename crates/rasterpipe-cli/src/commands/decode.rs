//! `decode` - decode a source image and dump it as a raw packed bitmap.

use anyhow::Result;
use clap::Args;
use rasterpipe_transform::FormatOptions;
use std::path::PathBuf;

use super::{read_input, write_output};

#[derive(Args, Clone)]
pub struct DecodeArgs {
    /// Input image path.
    pub input: PathBuf,
    /// Output path for the raw packed pixel dump.
    #[arg(short, long)]
    pub output: PathBuf,
    /// Post-decode rotation, in degrees. 0 disables.
    #[arg(long = "rotate", default_value = "0.0")]
    pub rotate: f64,
    /// Post-decode box blur radius, in pixels. 0 disables.
    #[arg(long = "blur", default_value = "0.0")]
    pub blur: f64,
}

pub fn run(args: DecodeArgs, verbose: u8) -> Result<()> {
    let bytes = read_input(&args.input)?;
    let mut options = FormatOptions::builder();
    options.rotate = args.rotate;
    options.blur = args.blur;
    let decoded = rasterpipe_io::decode(&bytes, &mut options)?;
    if verbose > 0 {
        println!(
            "decoded {}x{} {} -> {}",
            decoded.image.width,
            decoded.image.height,
            decoded.image.color_mode,
            args.output.display()
        );
    }
    write_output(&args.output, &decoded.image.data)
}

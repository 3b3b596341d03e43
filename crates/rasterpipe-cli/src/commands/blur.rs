//! `blur` - apply the sharpen/blur convolution in isolation, at identity
//! crop and scale, to exercise the Transformer's convolution stage alone.

use anyhow::Result;
use clap::Args;
use rasterpipe_core::Rect;
use rasterpipe_transform::{FormatOptions, Transformer};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use super::{read_input, write_output};

#[derive(Args, Clone)]
pub struct BlurArgs {
    /// Input image path.
    pub input: PathBuf,
    /// Output path for the raw packed pixel result.
    #[arg(short, long)]
    pub output: PathBuf,
    /// Sharpen sigma. Negative values are rejected.
    #[arg(long = "sharpen", default_value = "0.8")]
    pub sharpen: f64,
}

pub fn run(args: BlurArgs, verbose: u8) -> Result<()> {
    let bytes = read_input(&args.input)?;
    let decoded = rasterpipe_io::decode(&bytes, &mut FormatOptions::builder())?;
    let image = decoded.image;

    let full_rect = Rect::new(0, 0, image.width, image.height);
    let mut transformer =
        Transformer::new(image.width, full_rect, full_rect, image.color_mode, image.color_mode);
    transformer.set_sharpen(args.sharpen);

    let out = Rc::new(RefCell::new(Vec::with_capacity(image.data.len())));
    let out_writer = out.clone();
    transformer.add_writer(Box::new(move |row, _w, _bpp, _y| {
        out_writer.borrow_mut().extend_from_slice(row);
        Ok(())
    }));

    let row_bytes = image.width.max(0) as usize * image.color_mode.bpp();
    for y in 0..image.height as usize {
        let start = y * row_bytes;
        transformer.push(&image.data[start..start + row_bytes])?;
    }
    transformer.finish()?;
    drop(transformer);

    if verbose > 0 {
        println!("applied sharpen sigma={} to {}", args.sharpen, args.input.display());
    }
    let out = Rc::try_unwrap(out).expect("writer dropped with the transformer").into_inner();
    write_output(&args.output, &out)
}

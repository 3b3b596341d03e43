//! `design` - drive the design/orb tile renderer collaborator: lay out a
//! contact-sheet canvas from a set of input thumbnails at fixed cell size,
//! re-using `decode` + `Transformer` per cell and the Bitmap writer to blit
//! into the shared canvas.

use anyhow::Result;
use clap::Args;
use rasterpipe_core::{Bitmap, ColorMode, Rect};
use rasterpipe_transform::{FormatOptions, Transformer};
use std::path::PathBuf;

use super::{read_input, write_output};

#[derive(Args, Clone)]
pub struct DesignArgs {
    /// Input thumbnail image paths, laid out left-to-right, top-to-bottom.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Output path for the raw packed canvas.
    #[arg(short, long)]
    pub output: PathBuf,
    /// Cell width in pixels.
    #[arg(long = "cell-width", default_value = "128")]
    pub cell_width: i32,
    /// Cell height in pixels.
    #[arg(long = "cell-height", default_value = "128")]
    pub cell_height: i32,
    /// Padding between cells, in pixels.
    #[arg(long = "padding", default_value = "4")]
    pub padding: i32,
    /// Number of columns in the contact sheet.
    #[arg(long = "cols", default_value = "4")]
    pub cols: i32,
}

pub fn run(args: DesignArgs, verbose: u8) -> Result<()> {
    let cols = args.cols.max(1);
    let rows = (args.inputs.len() as i32 + cols - 1) / cols;
    let canvas_w = cols * args.cell_width + (cols + 1) * args.padding;
    let canvas_h = rows * args.cell_height + (rows + 1) * args.padding;

    let mut canvas = Bitmap::new(canvas_w, canvas_h, ColorMode::Rgb);
    {
        let buf = canvas.lock()?;
        buf.fill(0);
    }
    canvas.unlock();
    let canvas = canvas.into_shared();

    for (index, path) in args.inputs.iter().enumerate() {
        let bytes = read_input(path)?;
        let decoded = rasterpipe_io::decode(&bytes, &mut FormatOptions::builder())?;
        let image = decoded.image;

        let col = index as i32 % cols;
        let row = index as i32 / cols;
        let cell_x = args.padding + col * (args.cell_width + args.padding);
        let cell_y = args.padding + row * (args.cell_height + args.padding);

        let src_rect = Rect::new(0, 0, image.width, image.height);
        let dest_rect = Rect::new(cell_x, cell_y, args.cell_width, args.cell_height);
        let mut transformer =
            Transformer::new(image.width, src_rect, dest_rect, image.color_mode, ColorMode::Rgb);
        transformer.set_dest_bitmap(canvas.clone());

        let row_bytes = image.width.max(0) as usize * image.color_mode.bpp();
        for y in 0..image.height as usize {
            let start = y * row_bytes;
            transformer.push(&image.data[start..start + row_bytes])?;
        }
        transformer.finish()?;

        if verbose > 0 {
            println!("placed {} at cell ({row}, {col})", path.display());
        }
    }

    let bytes = {
        let mut canvas = canvas.borrow_mut();
        let buf = canvas.lock()?;
        let out = buf.to_vec();
        canvas.unlock();
        out
    };
    write_output(&args.output, &bytes)
}

//! `tile` - split a decoded bitmap into a grid of numbered sub-bitmap files.
//!
//! A thin consumer of the Bitmap region API, not a new pixel algorithm:
//! each cell's rows are copied out via `set_region` + `region_buffer`.

use anyhow::Result;
use clap::Args;
use rasterpipe_core::{Bitmap, Rect};
use rasterpipe_transform::FormatOptions;
use std::path::PathBuf;

use super::read_input;

#[derive(Args, Clone)]
pub struct TileArgs {
    /// Input image path.
    pub input: PathBuf,
    /// Output directory; tiles are written as `tile_<row>_<col>.raw`.
    #[arg(short, long)]
    pub output_dir: PathBuf,
    /// Number of tile columns.
    #[arg(long = "cols", default_value = "2")]
    pub cols: i32,
    /// Number of tile rows.
    #[arg(long = "rows", default_value = "2")]
    pub rows: i32,
}

pub fn run(args: TileArgs, verbose: u8) -> Result<()> {
    let bytes = read_input(&args.input)?;
    let decoded = rasterpipe_io::decode(&bytes, &mut FormatOptions::builder())?;
    let image = decoded.image;

    let mut bitmap = Bitmap::new(image.width, image.height, image.color_mode);
    {
        let buf = bitmap.lock()?;
        buf[..image.data.len()].copy_from_slice(&image.data);
    }

    std::fs::create_dir_all(&args.output_dir)?;

    let tile_w = image.width / args.cols.max(1);
    let tile_h = image.height / args.rows.max(1);
    for row in 0..args.rows {
        for col in 0..args.cols {
            let x = col * tile_w;
            let y = row * tile_h;
            let w = if col == args.cols - 1 { image.width - x } else { tile_w };
            let h = if row == args.rows - 1 { image.height - y } else { tile_h };
            bitmap.set_region(Rect::new(x, y, w, h));

            let mut tile_bytes = Vec::with_capacity(w.max(0) as usize * h.max(0) as usize * image.color_mode.bpp());
            for ty in y..y + h {
                if let Some(row_buf) = bitmap.region_buffer(ty)? {
                    tile_bytes.extend_from_slice(row_buf);
                }
            }
            bitmap.clear_region();

            let path = args.output_dir.join(format!("tile_{row}_{col}.raw"));
            std::fs::write(&path, &tile_bytes)?;
            if verbose > 0 {
                println!("wrote {}", path.display());
            }
        }
    }
    bitmap.unlock();
    Ok(())
}

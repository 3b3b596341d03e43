//! Bridges a fully-decoded pixel buffer into the [`rasterpipe_transform::Transformer`]
//! one scanline at a time.
//!
//! The codec crates this module wraps (`jpeg-decoder`, `png`, `gif`, `image`)
//! hand back a complete decoded buffer rather than exposing a true
//! line-at-a-time decode API, so the "streaming" boundary in this pipeline
//! starts at the Transformer rather than at the file read. Decoders still
//! push one row at a time so the Transformer's own memory bound
//! (proportional to width, not height) holds regardless.

use rasterpipe_core::ColorMode;
use rasterpipe_transform::Transformer;

/// A fully decoded source image: packed rows at `color_mode` bpp.
pub struct DecodedImage {
    /// Pixel width.
    pub width: i32,
    /// Pixel height.
    pub height: i32,
    /// Pixel layout of `data`.
    pub color_mode: ColorMode,
    /// Row-major pixel data, `height` rows of `width * color_mode.bpp()` bytes.
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// Feed every row of this image into `transformer`, then flush it.
    pub fn drive(&self, transformer: &mut Transformer) -> rasterpipe_core::Result<()> {
        let row_bytes = self.width.max(0) as usize * self.color_mode.bpp();
        for y in 0..self.height as usize {
            let start = y * row_bytes;
            transformer.push(&self.data[start..start + row_bytes])?;
        }
        transformer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterpipe_core::Rect;

    #[test]
    fn drive_pushes_every_row_then_finishes() {
        let image = DecodedImage {
            width: 2,
            height: 3,
            color_mode: ColorMode::Gray,
            data: vec![1, 2, 3, 4, 5, 6],
        };
        let mut t = Transformer::new(2, Rect::new(0, 0, 2, 3), Rect::new(0, 0, 2, 3), ColorMode::Gray, ColorMode::Gray);
        let rows = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let rows2 = rows.clone();
        t.add_writer(Box::new(move |row, _w, _bpp, _y| {
            rows2.borrow_mut().push(row.to_vec());
            Ok(())
        }));
        image.drive(&mut t).unwrap();
        assert_eq!(*rows.borrow(), vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    }
}

//! The scanline engine: horizontal area-weighted resampling, vertical
//! weighted-merge accumulation, sharpen convolution, and shader application,
//! fused into a single streaming pass.

use std::cell::RefCell;
use std::rc::Rc;

use rasterpipe_core::{ColorMode, Error, Rect, Result, SharedBitmap};
use rasterpipe_shader::PixelShader;

use crate::fixed::YFIXED_ONE;
use crate::kernel::Kernel3x3;

/// Anything that accepts one finished destination scanline.
///
/// Replaces the writer-function-pointer-plus-`void*` pattern: multiple
/// writers are simply multiple entries pushed onto [`Transformer::add_writer`].
pub type Writer = Box<dyn FnMut(&[u8], i32, usize, i32) -> Result<()>>;

/// Line-driven geometric and color pipeline. Consumes exactly
/// `src_rect.height` source scanlines (at `src_w` width, `src_color_mode`)
/// and produces exactly `dest_rect.height` destination scanlines (at
/// `dest_rect.width`, `dst_color_mode`).
pub struct Transformer {
    src_w: i32,
    src_rect: Rect,
    dest_rect: Rect,
    src_color_mode: ColorMode,
    dst_color_mode: ColorMode,

    kernel: Option<Kernel3x3>,
    shader: Option<Rc<RefCell<PixelShader>>>,
    dest_bitmap: Option<SharedBitmap>,
    writers: Vec<Writer>,

    col_map: Vec<i64>,
    src_line_idx: i32,

    acc: Vec<i64>,
    acc_weight: i64,
    cur_dst_row: i32,
    rows_written: i32,

    conv_above: Option<(i32, Vec<u8>)>,
    conv_center: Option<(i32, Vec<u8>)>,

    aborted: bool,
    configured: bool,
}

impl Transformer {
    /// Build a Transformer. `src_w`/`src_rect` describe the source geometry
    /// and crop window; `dest_rect` describes the destination window within
    /// the output canvas (its `width`/`height` are the scaled output size,
    /// its `x`/`y` offset where the built-in bitmap writer places rows).
    pub fn new(
        src_w: i32,
        src_rect: Rect,
        dest_rect: Rect,
        src_color_mode: ColorMode,
        dst_color_mode: ColorMode,
    ) -> Self {
        let col_map = build_column_map(src_rect, dest_rect.width);
        Transformer {
            src_w,
            src_rect,
            dest_rect,
            src_color_mode,
            dst_color_mode,
            kernel: None,
            shader: None,
            dest_bitmap: None,
            writers: Vec::new(),
            col_map,
            src_line_idx: 0,
            acc: vec![0i64; (dest_rect.width.max(0) as usize) * dst_color_mode.bpp()],
            acc_weight: 0,
            cur_dst_row: 0,
            rows_written: 0,
            conv_above: None,
            conv_center: None,
            aborted: false,
            configured: true,
        }
    }

    /// Set the 3×3 sharpen kernel from σ (the "fast" mode, the only one the
    /// codec path exercises). `sigma <= 0.0` disables convolution.
    pub fn set_sharpen(&mut self, sigma: f64) -> &mut Self {
        self.kernel = if sigma > 0.0 { Some(Kernel3x3::from_sigma(sigma, true)) } else { None };
        self
    }

    /// Override the convolution kernel directly.
    pub fn set_kernel(&mut self, kernel: Kernel3x3) -> &mut Self {
        self.kernel = Some(kernel);
        self
    }

    /// Attach a pixel shader, applied to every completed destination row.
    pub fn set_shader(&mut self, shader: Rc<RefCell<PixelShader>>) -> &mut Self {
        self.shader = Some(shader);
        self
    }

    /// Route finished rows into a destination bitmap via the built-in writer.
    pub fn set_dest_bitmap(&mut self, bitmap: SharedBitmap) -> &mut Self {
        self.dest_bitmap = Some(bitmap);
        self
    }

    /// Append an additional writer capability; it runs alongside the
    /// built-in bitmap writer, in the order added.
    pub fn add_writer(&mut self, writer: Writer) -> &mut Self {
        self.writers.push(writer);
        self
    }

    /// Total destination rows this Transformer is configured to produce.
    pub fn dest_height(&self) -> i32 {
        self.dest_rect.height
    }

    /// Push one source scanline (`src_w` pixels, packed at `src_color_mode`
    /// bpp). May synchronously emit zero, one, or many destination rows.
    pub fn push(&mut self, line: &[u8]) -> Result<()> {
        if !self.configured {
            return Err(Error::invalid_state("Transformer pushed before configured"));
        }
        if self.aborted {
            return Err(Error::aborted("pipeline previously aborted"));
        }
        let expected_len = self.src_w.max(0) as usize * self.src_color_mode.bpp();
        if line.len() < expected_len {
            return Err(Error::invalid_argument("pushed line shorter than src_w * bpp"));
        }

        let line_idx = self.src_line_idx;
        self.src_line_idx += 1;

        if self.rows_written >= self.dest_rect.height {
            return Ok(()); // rows pushed after the expected total are ignored
        }
        if line_idx < self.src_rect.y || line_idx >= self.src_rect.bottom() {
            return Ok(()); // outside the vertical crop: drop
        }
        let s = line_idx - self.src_rect.y;

        let converted = convert_row(line, self.src_color_mode, self.dst_color_mode);
        let h_scaled = self.scale_horizontal(&converted);
        self.accumulate_vertical(&h_scaled, s)
    }

    fn scale_horizontal(&self, row: &[u8]) -> Vec<u8> {
        let bpp = self.dst_color_mode.bpp();
        let dst_w = self.dest_rect.width.max(0) as usize;
        let mut out = vec![0u8; dst_w * bpp];
        for i in 0..dst_w {
            let f0 = self.col_map[i];
            let f1 = self.col_map[i + 1];
            if f1 <= f0 {
                // Degenerate (upscale column with zero width source span);
                // sample nearest.
                let src_col = (f0 / YFIXED_ONE).clamp(0, self.src_w as i64 - 1) as usize;
                out[i * bpp..i * bpp + bpp].copy_from_slice(&row[src_col * bpp..src_col * bpp + bpp]);
                continue;
            }
            let mut sums = [0i64; 4];
            let first_col = (f0 / YFIXED_ONE) as i64;
            let last_col = ((f1 - 1) / YFIXED_ONE) as i64;
            for col in first_col..=last_col {
                let col_start = col * YFIXED_ONE;
                let col_end = col_start + YFIXED_ONE;
                let overlap = col_end.min(f1) - col_start.max(f0);
                if overlap <= 0 {
                    continue;
                }
                let col_clamped = (col.clamp(0, self.src_w as i64 - 1)) as usize;
                for c in 0..bpp {
                    sums[c] += row[col_clamped * bpp + c] as i64 * overlap;
                }
            }
            let total_weight = f1 - f0;
            for c in 0..bpp {
                out[i * bpp + c] = (sums[c] / total_weight).clamp(0, 255) as u8;
            }
        }
        out
    }

    fn accumulate_vertical(&mut self, row: &[u8], s: i32) -> Result<()> {
        let src_h = self.src_rect.height.max(1) as i64;
        let dst_h = self.dest_rect.height as i64;
        let y0 = row_to_dst_pos(s as i64, src_h, dst_h);
        let y1 = row_to_dst_pos(s as i64 + 1, src_h, dst_h);
        let mut pos = y0;
        let bpp = self.dst_color_mode.bpp();

        while pos < y1 && self.rows_written < self.dest_rect.height {
            let row_boundary = (self.cur_dst_row as i64 + 1) * YFIXED_ONE;
            let seg_end = y1.min(row_boundary);
            let seg_weight = seg_end - pos;
            if seg_weight > 0 {
                for c in 0..bpp {
                    let old = self.acc[c] * self.acc_weight;
                    let new = row[c] as i64 * seg_weight;
                    self.acc[c] = (old + new) / (self.acc_weight + seg_weight);
                }
                self.acc_weight += seg_weight;
            }
            pos = seg_end;
            if pos >= row_boundary {
                self.complete_current_row()?;
            }
        }
        Ok(())
    }

    fn complete_current_row(&mut self) -> Result<()> {
        let bpp = self.dst_color_mode.bpp();
        let mut finished = vec![0u8; bpp * self.dest_rect.width.max(0) as usize];
        for (i, chunk) in finished.chunks_mut(bpp).enumerate() {
            for c in 0..bpp {
                chunk[c] = self.acc[i * bpp + c].clamp(0, 255) as u8;
            }
        }

        let y = self.dest_rect.y + self.cur_dst_row;
        if let Some(shader) = &self.shader {
            shader.borrow().apply(&mut finished, self.dst_color_mode, self.dest_rect, y);
        }

        self.push_through_convolution(y, finished)?;

        self.acc_weight = 0;
        self.cur_dst_row += 1;
        Ok(())
    }

    fn push_through_convolution(&mut self, y: i32, row: Vec<u8>) -> Result<()> {
        let Some(kernel) = self.kernel else {
            return self.emit(y, &row);
        };

        if self.conv_center.is_none() {
            self.conv_above = Some((y, row.clone()));
            self.conv_center = Some((y, row));
            return Ok(());
        }

        let (above_y, above) = self.conv_above.take().unwrap();
        let (center_y, center) = self.conv_center.take().unwrap();
        let _ = above_y;
        let convolved = convolve_row(&above, &center, &row, self.dest_rect.width, self.dst_color_mode, &kernel);
        self.emit(center_y, &convolved)?;
        self.conv_above = Some((center_y, center));
        self.conv_center = Some((y, row));
        Ok(())
    }

    fn emit(&mut self, y: i32, row: &[u8]) -> Result<()> {
        let bpp = self.dst_color_mode.bpp();
        if let Some(bitmap) = &self.dest_bitmap {
            bitmap.borrow_mut().write_row(y, row)?;
        }
        for writer in &mut self.writers {
            if let Err(e) = writer(row, self.dest_rect.width, bpp, y) {
                self.aborted = true;
                return Err(e);
            }
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Flush any row still held in the convolution window (duplicating it
    /// as its own "below" boundary). Must be called exactly once after all
    /// source rows have been pushed.
    pub fn finish(&mut self) -> Result<()> {
        if self.kernel.is_none() {
            return Ok(());
        }
        if let Some((center_y, center)) = self.conv_center.take() {
            let above = self.conv_above.take().map(|(_, row)| row).unwrap_or_else(|| center.clone());
            let kernel = self.kernel.unwrap();
            let convolved =
                convolve_row(&above, &center, &center, self.dest_rect.width, self.dst_color_mode, &kernel);
            self.emit(center_y, &convolved)?;
        }
        Ok(())
    }
}

fn row_to_dst_pos(s: i64, src_h: i64, dst_h: i64) -> i64 {
    (s * dst_h * YFIXED_ONE) / src_h
}

fn build_column_map(src_rect: Rect, dst_w: i32) -> Vec<i64> {
    let dst_w = dst_w.max(0) as i64;
    let src_w = src_rect.width.max(1) as i64;
    let offset = src_rect.x as i64 * YFIXED_ONE;
    (0..=dst_w).map(|i| offset + (i * src_w * YFIXED_ONE) / dst_w.max(1)).collect()
}

fn convert_row(line: &[u8], src_mode: ColorMode, dst_mode: ColorMode) -> Vec<u8> {
    if src_mode == dst_mode {
        return line.to_vec();
    }
    let src_bpp = src_mode.bpp();
    let dst_bpp = dst_mode.bpp();
    let n = line.len() / src_bpp;
    let mut out = vec![0u8; n * dst_bpp];
    for i in 0..n {
        rasterpipe_core::convert_pixel(
            src_mode,
            &line[i * src_bpp..i * src_bpp + src_bpp],
            dst_mode,
            &mut out[i * dst_bpp..i * dst_bpp + dst_bpp],
        );
    }
    out
}

fn convolve_row(
    above: &[u8],
    center: &[u8],
    below: &[u8],
    width: i32,
    color_mode: ColorMode,
    kernel: &Kernel3x3,
) -> Vec<u8> {
    let bpp = color_mode.bpp();
    let w = width.max(0) as usize;
    let mut out = vec![0u8; w * bpp];
    for x in 0..w {
        let left = x.saturating_sub(1);
        let right = (x + 1).min(w - 1);
        for c in 0..bpp {
            out[x * bpp + c] = kernel.apply_pixel(
                center[x * bpp + c] as i32,
                center[left * bpp + c] as i32,
                center[right * bpp + c] as i32,
                above[x * bpp + c] as i32,
                below[x * bpp + c] as i32,
                above[left * bpp + c] as i32,
                above[right * bpp + c] as i32,
                below[left * bpp + c] as i32,
                below[right * bpp + c] as i32,
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collect_writer(rows: Rc<RefCell<Vec<Vec<u8>>>>) -> Writer {
        Box::new(move |row, _w, _bpp, _y| {
            rows.borrow_mut().push(row.to_vec());
            Ok(())
        })
    }

    #[test]
    fn row_count_conservation_downscale() {
        for (src_h, dst_h) in [(100, 1), (37, 37), (1000, 17), (5, 5)] {
            let rows = Rc::new(RefCell::new(Vec::new()));
            let mut t = Transformer::new(
                4,
                Rect::new(0, 0, 4, src_h),
                Rect::new(0, 0, 4, dst_h),
                ColorMode::Gray,
                ColorMode::Gray,
            );
            t.add_writer(collect_writer(rows.clone()));
            for _ in 0..src_h {
                t.push(&[10, 20, 30, 40]).unwrap();
            }
            t.finish().unwrap();
            assert_eq!(rows.borrow().len() as i32, dst_h, "src_h={src_h} dst_h={dst_h}");
        }
    }

    #[test]
    fn row_count_conservation_upscale() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut t = Transformer::new(
            2,
            Rect::new(0, 0, 2, 1),
            Rect::new(0, 0, 2, 10),
            ColorMode::Gray,
            ColorMode::Gray,
        );
        t.add_writer(collect_writer(rows.clone()));
        t.push(&[5, 6]).unwrap();
        t.finish().unwrap();
        assert_eq!(rows.borrow().len(), 10);
    }

    #[test]
    fn identity_transform_is_byte_exact() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut t = Transformer::new(
            4,
            Rect::new(0, 0, 4, 3),
            Rect::new(0, 0, 4, 3),
            ColorMode::Rgb,
            ColorMode::Rgb,
        );
        t.add_writer(collect_writer(rows.clone()));
        let inputs: Vec<Vec<u8>> = vec![
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            vec![20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31],
            vec![100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110, 111],
        ];
        for row in &inputs {
            t.push(row).unwrap();
        }
        t.finish().unwrap();
        assert_eq!(*rows.borrow(), inputs);
    }

    #[test]
    fn uniform_downscale_to_one_pixel() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut t = Transformer::new(
            100,
            Rect::new(0, 0, 100, 100),
            Rect::new(0, 0, 1, 1),
            ColorMode::Gray,
            ColorMode::Gray,
        );
        t.add_writer(collect_writer(rows.clone()));
        for _ in 0..100 {
            t.push(&[128u8; 100]).unwrap();
        }
        t.finish().unwrap();
        assert_eq!(rows.borrow()[0], vec![128u8]);
    }

    #[test]
    fn sharpen_preserves_constant_image() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut t = Transformer::new(
            5,
            Rect::new(0, 0, 5, 5),
            Rect::new(0, 0, 5, 5),
            ColorMode::Gray,
            ColorMode::Gray,
        );
        t.set_sharpen(0.8);
        t.add_writer(collect_writer(rows.clone()));
        for _ in 0..5 {
            t.push(&[77u8; 5]).unwrap();
        }
        t.finish().unwrap();
        for row in rows.borrow().iter() {
            assert_eq!(*row, vec![77u8; 5]);
        }
    }

    #[test]
    fn bounded_memory_independent_of_height() {
        // Working buffers are all sized from dst_w/src_w, never from height;
        // this is a structural guarantee, exercised here by a tall pipeline
        // that must not allocate proportional to height.
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut t = Transformer::new(
            8,
            Rect::new(0, 0, 8, 200_000),
            Rect::new(0, 0, 8, 200),
            ColorMode::Gray,
            ColorMode::Gray,
        );
        t.add_writer(collect_writer(rows.clone()));
        for i in 0..200_000 {
            t.push(&[(i % 256) as u8; 8]).unwrap();
        }
        t.finish().unwrap();
        assert_eq!(rows.borrow().len(), 200);
    }

    #[test]
    fn rgb_to_rgba_forces_opaque_alpha_through_pipeline() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let mut t = Transformer::new(
            1,
            Rect::new(0, 0, 1, 1),
            Rect::new(0, 0, 1, 1),
            ColorMode::Rgb,
            ColorMode::Rgba,
        );
        t.add_writer(collect_writer(rows.clone()));
        t.push(&[10, 20, 30]).unwrap();
        t.finish().unwrap();
        assert_eq!(rows.borrow()[0], vec![10, 20, 30, 255]);
    }

    #[test]
    fn push_before_configured_state_is_unreachable_but_abort_after_writer_error() {
        let mut t = Transformer::new(
            2,
            Rect::new(0, 0, 2, 1),
            Rect::new(0, 0, 2, 1),
            ColorMode::Gray,
            ColorMode::Gray,
        );
        t.add_writer(Box::new(|_row, _w, _bpp, _y| Err(Error::aborted("writer stopped"))));
        assert!(t.push(&[1, 2]).is_err());
        assert!(t.push(&[1, 2]).is_err());
    }
}

//! Ordered composition of per-pixel color operations.

use std::cell::RefCell;
use std::rc::Rc;

use rasterpipe_core::{Bitmap, ColorMode, Rect};

use crate::color_matrix::ColorMatrixParams;
use crate::compose::{compose_channel, compose_colorize, ComposeMode};

/// One step of a [`PixelShader`]'s effect list.
pub enum Effect {
    /// Accumulated brightness/exposure/contrast/saturation/temperature/whitebalance LUT.
    ColorMatrix(ColorMatrixParams),
    /// A spatial mask composited against the row, scaled to the image rect.
    Vignette { mask: Rc<RefCell<Bitmap>>, mode: ComposeMode },
    /// Three independent 256-entry per-channel lookup tables.
    Preset(Box<[[u8; 256]; 3]>),
}

/// A linear sequence of color effects applied to each destination row.
///
/// Color-matrix terms accumulate additively into a single LUT rather than
/// each becoming its own pass; calling [`PixelShader::color_matrix`]
/// more than once folds the new terms into the existing `ColorMatrix` effect
/// in place (rather than appending a second one), matching "accumulated into
/// a single 256-entry per-channel LUT."
#[derive(Default)]
pub struct PixelShader {
    effects: Vec<Effect>,
}

impl PixelShader {
    /// An empty shader (identity).
    pub fn new() -> Self {
        PixelShader { effects: Vec::new() }
    }

    /// Fold color-matrix terms into the shader's accumulated LUT, merging
    /// with any terms already added by a prior call.
    pub fn color_matrix(&mut self, params: ColorMatrixParams) -> &mut Self {
        if let Some(Effect::ColorMatrix(existing)) =
            self.effects.iter_mut().find(|e| matches!(e, Effect::ColorMatrix(_)))
        {
            existing.brightness += params.brightness;
            existing.exposure *= params.exposure;
            existing.contrast *= params.contrast;
            existing.saturation *= params.saturation;
            existing.temperature += params.temperature;
            existing.whitebalance += params.whitebalance;
        } else {
            self.effects.push(Effect::ColorMatrix(params));
        }
        self
    }

    /// Append a vignette overlay.
    pub fn vignette(&mut self, mask: Rc<RefCell<Bitmap>>, mode: ComposeMode) -> &mut Self {
        self.effects.push(Effect::Vignette { mask, mode });
        self
    }

    /// Append a preset per-channel LUT.
    pub fn preset(&mut self, lut: [[u8; 256]; 3]) -> &mut Self {
        self.effects.push(Effect::Preset(Box::new(lut)));
        self
    }

    /// Whether this shader contains a vignette effect.
    pub fn has_vignette(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::Vignette { .. }))
    }

    /// Apply every effect, in order, to one destination row.
    ///
    /// `row` holds `image_rect.width` pixels at `color_mode`. `image_rect` is
    /// the destination window within the full output canvas; `y` is this
    /// row's absolute position within that canvas (used to locate the
    /// correct vignette-mask row).
    pub fn apply(&self, row: &mut [u8], color_mode: ColorMode, image_rect: Rect, y: i32) {
        for effect in &self.effects {
            match effect {
                Effect::ColorMatrix(params) => {
                    if !params.is_identity() {
                        apply_lut(row, color_mode, &params.build_lut());
                    }
                }
                Effect::Preset(lut) => apply_lut(row, color_mode, lut),
                Effect::Vignette { mask, mode } => {
                    apply_vignette(row, color_mode, image_rect, y, &mut mask.borrow_mut(), *mode);
                }
            }
        }
    }
}

fn apply_lut(row: &mut [u8], color_mode: ColorMode, lut: &[[u8; 256]; 3]) {
    let bpp = color_mode.bpp();
    for pixel in row.chunks_mut(bpp) {
        match color_mode {
            ColorMode::Gray => pixel[0] = lut[0][pixel[0] as usize],
            ColorMode::Rgb | ColorMode::Rgba => {
                pixel[0] = lut[0][pixel[0] as usize];
                pixel[1] = lut[1][pixel[1] as usize];
                pixel[2] = lut[2][pixel[2] as usize];
            }
            ColorMode::Yuv => pixel[0] = lut[0][pixel[0] as usize],
        }
    }
}

fn apply_vignette(
    row: &mut [u8],
    color_mode: ColorMode,
    image_rect: Rect,
    y: i32,
    mask: &mut Bitmap,
    mode: ComposeMode,
) {
    if image_rect.height <= 0 || image_rect.width <= 0 {
        return;
    }
    let mask_w = mask.width().max(1);
    let mask_h = mask.height().max(1);
    let mask_y = ((y - image_rect.y) * mask_h / image_rect.height).clamp(0, mask_h - 1);
    let mask_bpp = mask.color_mode().bpp();
    let mask_row: Vec<u8> = mask.copy_row(mask_y).unwrap_or_default();

    if mask_row.is_empty() {
        return;
    }
    let bpp = color_mode.bpp();
    let width = image_rect.width.max(0) as usize;
    for (x, pixel) in row.chunks_mut(bpp).take(width).enumerate() {
        let mask_x = ((x as i32) * mask_w / image_rect.width).clamp(0, mask_w - 1) as usize;
        let mask_px_start = mask_x * mask_bpp;
        let sample = |c: usize| -> u8 {
            if mask_bpp == 1 {
                mask_row[mask_px_start]
            } else {
                mask_row[(mask_px_start + c).min(mask_row.len() - 1)]
            }
        };
        match color_mode {
            ColorMode::Gray | ColorMode::Yuv => {
                pixel[0] = compose_channel(mode, pixel[0], sample(0));
            }
            ColorMode::Rgb | ColorMode::Rgba => {
                if mode == ComposeMode::Colorize {
                    let tint = [sample(0), sample(1.min(mask_bpp.saturating_sub(1))), sample(2.min(mask_bpp.saturating_sub(1)))];
                    let base = [pixel[0], pixel[1], pixel[2]];
                    let out = compose_colorize(base, tint);
                    pixel[0] = out[0];
                    pixel[1] = out[1];
                    pixel[2] = out[2];
                } else {
                    pixel[0] = compose_channel(mode, pixel[0], sample(0));
                    pixel[1] = compose_channel(mode, pixel[1], sample(1.min(mask_bpp.saturating_sub(1))));
                    pixel[2] = compose_channel(mode, pixel[2], sample(2.min(mask_bpp.saturating_sub(1))));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterpipe_core::ColorMode;

    #[test]
    fn empty_shader_is_identity() {
        let shader = PixelShader::new();
        let mut row = vec![10u8, 20, 30, 40, 50, 60];
        let original = row.clone();
        shader.apply(&mut row, ColorMode::Rgb, Rect::from_size(2, 1), 0);
        assert_eq!(row, original);
    }

    #[test]
    fn repeated_color_matrix_calls_fold_into_one_effect() {
        let mut shader = PixelShader::new();
        shader.color_matrix(ColorMatrixParams { brightness: 10.0, ..Default::default() });
        shader.color_matrix(ColorMatrixParams { brightness: 5.0, ..Default::default() });
        assert_eq!(shader.effects.len(), 1);
        let mut row = vec![100u8];
        shader.apply(&mut row, ColorMode::Gray, Rect::from_size(1, 1), 0);
        assert_eq!(row[0], 115);
    }

    #[test]
    fn has_vignette_detects_presence() {
        let mut shader = PixelShader::new();
        assert!(!shader.has_vignette());
        let mask = Bitmap::new(4, 4, ColorMode::Gray).into_shared();
        shader.vignette(mask, ComposeMode::Mult);
        assert!(shader.has_vignette());
    }
}

//! Immutable-after-build description of a transform: size caps, scale mode,
//! crop, quality, orientation, metadata policy, shader, and callback.

use std::cell::RefCell;
use std::rc::Rc;

use rasterpipe_core::{Error, Rect, Result};
use rasterpipe_shader::PixelShader;

/// How the output size is derived from the (possibly cropped) source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Preserve aspect ratio, fit inside the cap; empty borders are left for
    /// the caller to fill with [`FormatOptions::background_color`].
    #[default]
    Letterbox,
    /// Preserve aspect ratio, fill the cap, trimming the source window.
    Crop,
    /// Allow the aspect ratio to change to hit the cap exactly.
    Fit,
    /// No scaling: output equals the (cropped) source size.
    None,
    /// Fast power-of-two halving applied only during raw YUV→RGB conversion.
    HalfQuick,
    /// Averaging power-of-two halving applied only during raw YUV→RGB conversion.
    HalfAverage,
}

/// How the output size is fit to the caps when both `ScaleMode` and caps
/// interact (reserved for the `Letterbox` + fixed-canvas case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjustMode {
    /// The bitmap is resized to the fitted content size, no fixed canvas.
    #[default]
    None,
    /// The fitted content must fit within the cap (never exceeding it).
    Inner,
    /// The fitted content must fill the cap (a fixed canvas, letterboxed).
    Outer,
}

/// How a crop offset or size is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropMode {
    /// No crop in this axis-pair.
    #[default]
    None,
    /// An absolute pixel value.
    Absolute,
    /// A fraction (`0.0..=1.0`) of the source dimension.
    Relative,
}

/// Target container format for an encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Format left to the dispatcher to decide (typically: same as input).
    #[default]
    Unknown,
    /// Baseline or progressive JPEG.
    Jpeg,
    /// 8-bit PNG.
    Png,
    /// Lossy WebP (VP8).
    WebP,
    /// GIF. Decode-only; encoding is not implemented.
    Gif,
}

/// Metadata marker-copy policy for JPEG transcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaMode {
    /// Strip all metadata markers.
    None,
    /// Copy only COM (comment) markers.
    Comments,
    /// Copy all non-APP0, non-colorspace markers.
    All,
    /// Codec-adapter default (`None` for thumbnails, `All` for full-size transcodes).
    #[default]
    Default,
}

/// 8-bit RGBA color, used for letterbox fill and rotation padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 255 };
    /// Opaque white.
    pub const WHITE: Rgba8 = Rgba8 { r: 255, g: 255, b: 255, a: 255 };
}

type ProgressCallback = Box<dyn FnMut(&mut FormatOptions, i32, i32, OutputFormat) -> bool>;

/// A pure data record describing one decode/transcode/encode operation.
///
/// The progress callback is a captured Rust closure rather than an opaque
/// payload pointer: a caller that needs external state threads it through
/// the closure's own captures instead of an untyped pointer.
pub struct FormatOptions {
    /// Maximum output width; `-1` = unconstrained.
    pub max_width: i32,
    /// Maximum output height; `-1` = unconstrained.
    pub max_height: i32,
    /// How output size is derived from the (cropped) source size.
    pub scale_mode: ScaleMode,
    /// How the fitted size relates to a fixed canvas.
    pub adjust_mode: AdjustMode,
    /// Whether the destination bitmap may be resized by the core.
    pub resizable: bool,

    /// How `crop_x`/`crop_y` are interpreted.
    pub crop_offset_mode: CropMode,
    /// How `crop_width`/`crop_height` are interpreted.
    pub crop_size_mode: CropMode,
    /// Absolute crop X offset, used when `crop_offset_mode == Absolute`.
    pub crop_x: i32,
    /// Absolute crop Y offset, used when `crop_offset_mode == Absolute`.
    pub crop_y: i32,
    /// Absolute crop width, used when `crop_size_mode == Absolute`.
    pub crop_width: i32,
    /// Absolute crop height, used when `crop_size_mode == Absolute`.
    pub crop_height: i32,
    /// Relative crop X offset (fraction of source width), used when
    /// `crop_offset_mode == Relative`.
    pub crop_x_relative: f32,
    /// Relative crop Y offset (fraction of source height).
    pub crop_y_relative: f32,
    /// Relative crop width (fraction of source width).
    pub crop_width_relative: f32,
    /// Relative crop height (fraction of source height).
    pub crop_height_relative: f32,

    /// JPEG/WebP quality, `0..=100`. Default `85`.
    pub quality: u8,
    /// `-1` or `0..=100`; toggles the codec's DCT accuracy/method.
    pub accuracy: i32,
    /// Chroma subsampling: `0` = 4:4:4, `1` = 4:2:0, etc.
    pub subsampling: u8,
    /// Whether JPEG output is progressive rather than baseline.
    pub progressive: bool,

    /// Sharpen σ, `>= 0`; `0` disables the sharpen convolution.
    pub sharpen: f64,
    /// Blur radius in pixels.
    pub blur: f64,
    /// Post-decode rotation, in degrees.
    pub rotate: f64,

    /// Target output container format.
    pub format: OutputFormat,
    /// Metadata marker-copy policy.
    pub meta_mode: MetaMode,
    /// Fill color for letterbox borders and rotation padding.
    pub background_color: Rgba8,
    /// Optional pixel shader applied to every destination row.
    pub shader: Option<Rc<RefCell<PixelShader>>>,

    progress_callback: Option<ProgressCallback>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            max_width: -1,
            max_height: -1,
            scale_mode: ScaleMode::default(),
            adjust_mode: AdjustMode::default(),
            resizable: true,
            crop_offset_mode: CropMode::default(),
            crop_size_mode: CropMode::default(),
            crop_x: 0,
            crop_y: 0,
            crop_width: 0,
            crop_height: 0,
            crop_x_relative: 0.0,
            crop_y_relative: 0.0,
            crop_width_relative: 0.0,
            crop_height_relative: 0.0,
            quality: 85,
            accuracy: -1,
            subsampling: 1,
            progressive: false,
            sharpen: 0.0,
            blur: 0.0,
            rotate: 0.0,
            format: OutputFormat::default(),
            meta_mode: MetaMode::default(),
            background_color: Rgba8::BLACK,
            shader: None,
            progress_callback: None,
        }
    }
}

impl FormatOptions {
    /// Start building options with default values.
    pub fn builder() -> FormatOptions {
        FormatOptions::default()
    }

    /// Install a progress callback. Captured state lives in the closure
    /// itself rather than behind an opaque pointer.
    pub fn set_progress_callback<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut FormatOptions, i32, i32, OutputFormat) -> bool + 'static,
    {
        self.progress_callback = Some(Box::new(f));
        self
    }

    /// Invoke the progress callback, if any, after the source's dimensions
    /// are known and before any scanline is produced. A `false` return
    /// aborts the operation.
    pub fn invoke_callback(&mut self, width: i32, height: i32, format: OutputFormat) -> Result<()> {
        if let Some(mut cb) = self.progress_callback.take() {
            let ok = cb(self, width, height, format);
            self.progress_callback = Some(cb);
            if !ok {
                return Err(Error::aborted("progress callback requested stop"));
            }
        }
        Ok(())
    }

    /// Compute the crop window in source coordinates. Cropping happens
    /// before scaling. When no explicit crop is configured and `scale_mode`
    /// is `Crop`, a centered crop matching the cap aspect ratio is derived
    /// automatically so the subsequent scale-to-cap never distorts.
    pub fn compute_crop_rect(&self, src_w: i32, src_h: i32) -> Rect {
        let has_explicit_crop =
            self.crop_offset_mode != CropMode::None || self.crop_size_mode != CropMode::None;

        if !has_explicit_crop && self.scale_mode == ScaleMode::Crop && self.max_width > 0 && self.max_height > 0
        {
            let target_aspect = self.max_width as f64 / self.max_height as f64;
            let src_aspect = src_w as f64 / src_h as f64;
            return if src_aspect > target_aspect {
                let w = (src_h as f64 * target_aspect).round() as i32;
                Rect::new((src_w - w) / 2, 0, w, src_h)
            } else {
                let h = (src_w as f64 / target_aspect).round() as i32;
                Rect::new(0, (src_h - h) / 2, src_w, h)
            };
        }

        let (x, y) = match self.crop_offset_mode {
            CropMode::None => (0, 0),
            CropMode::Absolute => (self.crop_x, self.crop_y),
            CropMode::Relative => (
                (self.crop_x_relative as f64 * src_w as f64).round() as i32,
                (self.crop_y_relative as f64 * src_h as f64).round() as i32,
            ),
        };
        let (w, h) = match self.crop_size_mode {
            CropMode::None => (src_w - x, src_h - y),
            CropMode::Absolute => (self.crop_width, self.crop_height),
            CropMode::Relative => (
                (self.crop_width_relative as f64 * src_w as f64).round() as i32,
                (self.crop_height_relative as f64 * src_h as f64).round() as i32,
            ),
        };
        Rect::new(x, y, w, h).intersect_rect(Rect::from_size(src_w, src_h))
    }

    /// Compute `(outW, outH, effectiveScaleMode)` from the (already cropped)
    /// source dimensions.
    pub fn compute_output_size(&self, cropped_w: i32, cropped_h: i32) -> (i32, i32, ScaleMode) {
        if self.max_width < 0 && self.max_height < 0 {
            return (cropped_w, cropped_h, ScaleMode::None);
        }
        match self.scale_mode {
            ScaleMode::Letterbox => {
                let max_w = if self.max_width >= 0 { self.max_width as f64 } else { f64::MAX };
                let max_h = if self.max_height >= 0 { self.max_height as f64 } else { f64::MAX };
                let scale = (max_w / cropped_w as f64).min(max_h / cropped_h as f64);
                let w = (cropped_w as f64 * scale).round().max(1.0) as i32;
                let h = (cropped_h as f64 * scale).round().max(1.0) as i32;
                (w, h, ScaleMode::Letterbox)
            }
            ScaleMode::Crop => {
                let w = if self.max_width >= 0 { self.max_width } else { cropped_w };
                let h = if self.max_height >= 0 { self.max_height } else { cropped_h };
                (w, h, ScaleMode::Crop)
            }
            ScaleMode::Fit => {
                let w = if self.max_width >= 0 { self.max_width } else { cropped_w };
                let h = if self.max_height >= 0 { self.max_height } else { cropped_h };
                (w, h, ScaleMode::Fit)
            }
            mode @ (ScaleMode::None | ScaleMode::HalfQuick | ScaleMode::HalfAverage) => {
                (cropped_w, cropped_h, mode)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_is_width_bound() {
        let mut opts = FormatOptions::builder();
        opts.scale_mode = ScaleMode::Letterbox;
        opts.max_width = 600;
        opts.max_height = 600;
        let crop = opts.compute_crop_rect(1350, 900);
        assert_eq!(crop, Rect::new(0, 0, 1350, 900));
        let (w, h, _) = opts.compute_output_size(crop.width, crop.height);
        assert_eq!((w, h), (600, 400));
    }

    #[test]
    fn crop_autocrops_to_cap_aspect() {
        let mut opts = FormatOptions::builder();
        opts.scale_mode = ScaleMode::Crop;
        opts.max_width = 600;
        opts.max_height = 600;
        let crop = opts.compute_crop_rect(1350, 900);
        assert_eq!(crop, Rect::new(225, 0, 900, 900));
        let (w, h, _) = opts.compute_output_size(crop.width, crop.height);
        assert_eq!((w, h), (600, 600));
    }

    #[test]
    fn absolute_crop_no_caps() {
        let mut opts = FormatOptions::builder();
        opts.crop_offset_mode = CropMode::Absolute;
        opts.crop_size_mode = CropMode::Absolute;
        opts.crop_x = 100;
        opts.crop_y = 100;
        opts.crop_width = 200;
        opts.crop_height = 200;
        let crop = opts.compute_crop_rect(400, 400);
        assert_eq!(crop, Rect::new(100, 100, 200, 200));
        let (w, h, _) = opts.compute_output_size(crop.width, crop.height);
        assert_eq!((w, h), (200, 200));
    }

    #[test]
    fn relative_crop_no_caps() {
        let mut opts = FormatOptions::builder();
        opts.crop_offset_mode = CropMode::Relative;
        opts.crop_size_mode = CropMode::Relative;
        opts.crop_x_relative = 0.25;
        opts.crop_y_relative = 0.25;
        opts.crop_width_relative = 0.5;
        opts.crop_height_relative = 0.5;
        let crop = opts.compute_crop_rect(1000, 800);
        assert_eq!(crop, Rect::new(250, 200, 500, 400));
        let (w, h, _) = opts.compute_output_size(crop.width, crop.height);
        assert_eq!((w, h), (500, 400));
    }

    #[test]
    fn no_caps_no_crop_is_passthrough() {
        let opts = FormatOptions::builder();
        let crop = opts.compute_crop_rect(640, 480);
        assert_eq!(crop, Rect::new(0, 0, 640, 480));
        let (w, h, mode) = opts.compute_output_size(crop.width, crop.height);
        assert_eq!((w, h), (640, 480));
        assert_eq!(mode, ScaleMode::None);
    }

    #[test]
    fn progress_callback_can_mutate_options_and_abort() {
        let mut opts = FormatOptions::builder();
        opts.set_progress_callback(|opts, w, h, _fmt| {
            opts.quality = 50;
            w > 0 && h > 0
        });
        opts.invoke_callback(100, 100, OutputFormat::Jpeg).unwrap();
        assert_eq!(opts.quality, 50);

        let mut opts2 = FormatOptions::builder();
        opts2.set_progress_callback(|_, _, _, _| false);
        assert!(opts2.invoke_callback(100, 100, OutputFormat::Jpeg).is_err());
    }
}

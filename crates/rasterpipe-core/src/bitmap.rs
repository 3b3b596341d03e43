//! Reference-counted pixel buffer with color mode, pitch, and an active
//! sub-region.
//!
//! The original C type manually retained/released a refcounted handle and
//! dispatched through Android/iOS JNI globals for host-owned memory. Per the
//! ownership-semantics redesign: [`Bitmap`] itself is a plain, uniquely-owned
//! value; the binding-boundary `retain`/`release` façade is modeled instead
//! as `Rc<RefCell<Bitmap>>` (see [`SharedBitmap`]), and host-owned memory is
//! modeled as an opaque [`HostHandle`] trait object rather than a JNI
//! reference.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::color_mode::ColorMode;
use crate::error::{Error, Result};
use crate::rect::Rect;

/// A `Bitmap` guarded by the binding-boundary retain/release façade.
pub type SharedBitmap = Rc<RefCell<Bitmap>>;

/// Opaque host-owned pixel storage (e.g. an Android `Bitmap` or an iOS
/// `CGImage` backing store), supplied by a binding crate. The core never
/// interprets its contents beyond the byte slice it hands back.
pub trait HostHandle: fmt::Debug {
    /// Pin the host memory and return a writable view of `height` rows of
    /// `pitch` bytes each.
    fn lock(&mut self) -> Result<&mut [u8]>;

    /// Release the pin taken by [`HostHandle::lock`].
    fn unlock(&mut self);

    /// Row stride in bytes, as dictated by the host allocator.
    fn pitch(&self) -> usize;
}

/// Backing storage for a [`Bitmap`]'s pixels.
pub enum BitmapBacking {
    /// A buffer this Bitmap allocated and owns outright.
    Owned(Vec<u8>),
    /// Caller-supplied static memory borrowed for the bitmap's lifetime.
    Borrowed { data: &'static mut [u8], pitch: usize },
    /// Host-language-owned memory reached through an opaque handle.
    Host(Box<dyn HostHandle>),
}

impl fmt::Debug for BitmapBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitmapBacking::Owned(v) => write!(f, "Owned({} bytes)", v.len()),
            BitmapBacking::Borrowed { data, pitch } => {
                write!(f, "Borrowed({} bytes, pitch {pitch})", data.len())
            }
            BitmapBacking::Host(h) => write!(f, "Host({h:?})"),
        }
    }
}

/// Panoramic XMP `GPano:` metadata, recorded on a Bitmap when a decoded
/// JPEG's APP1 XMP packet carries the namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanoMetadata {
    /// Whether viewers should treat the image as a panorama.
    pub use_panorama_viewer: Option<bool>,
    /// Only `"equirectangular"` is recognized; other values pass through.
    pub projection_type: Option<String>,
    /// Width, in pixels, of the cropped area this image represents.
    pub cropped_area_image_width_pixels: Option<u32>,
    /// Height, in pixels, of the cropped area this image represents.
    pub cropped_area_image_height_pixels: Option<u32>,
    /// Width, in pixels, of the full panorama this image was cropped from.
    pub full_pano_width_pixels: Option<u32>,
    /// Height, in pixels, of the full panorama this image was cropped from.
    pub full_pano_height_pixels: Option<u32>,
    /// X offset, in pixels, of the cropped area within the full panorama.
    pub cropped_area_left_pixels: Option<u32>,
    /// Y offset, in pixels, of the cropped area within the full panorama.
    pub cropped_area_top_pixels: Option<u32>,
}

/// A reference-counted pixel grid: width, height, pitch, color mode, an
/// advisory lock flag, and an optional active sub-region.
#[derive(Debug)]
pub struct Bitmap {
    width: i32,
    height: i32,
    pitch: usize,
    color_mode: ColorMode,
    backing: Option<BitmapBacking>,
    locked: bool,
    region: Option<Rect>,
    is_static: bool,
    /// Exif IFD0 orientation tag (1-8), if the source carried one.
    pub exif_orientation: Option<u8>,
    /// Panoramic XMP metadata, if the source carried a `GPano:` packet.
    pub pano: Option<PanoMetadata>,
}

impl Bitmap {
    /// Create a new, unallocated bitmap of the given size and color mode.
    /// The backing buffer is acquired lazily on first [`Bitmap::lock`].
    pub fn new(width: i32, height: i32, color_mode: ColorMode) -> Self {
        let pitch = (width.max(0) as usize) * color_mode.bpp();
        Bitmap {
            width,
            height,
            pitch,
            color_mode,
            backing: None,
            locked: false,
            region: None,
            is_static: false,
            exif_orientation: None,
            pano: None,
        }
    }

    /// Wrap caller-supplied static memory. Resizing such a bitmap is an
    /// error.
    pub fn from_static(
        width: i32,
        height: i32,
        color_mode: ColorMode,
        data: &'static mut [u8],
        pitch: usize,
    ) -> Result<Self> {
        if pitch < (width.max(0) as usize) * color_mode.bpp() {
            return Err(Error::invalid_argument("pitch smaller than width * bpp"));
        }
        Ok(Bitmap {
            width,
            height,
            pitch,
            color_mode,
            backing: Some(BitmapBacking::Borrowed { data, pitch }),
            locked: false,
            region: None,
            is_static: true,
            exif_orientation: None,
            pano: None,
        })
    }

    /// Wrap a host-owned backing.
    pub fn from_host(
        width: i32,
        height: i32,
        color_mode: ColorMode,
        handle: Box<dyn HostHandle>,
    ) -> Self {
        let pitch = handle.pitch();
        Bitmap {
            width,
            height,
            pitch,
            color_mode,
            backing: Some(BitmapBacking::Host(handle)),
            locked: false,
            region: None,
            is_static: true,
            exif_orientation: None,
            pano: None,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// The bitmap's color mode.
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Whether the bitmap currently holds an advisory lock.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The full-canvas rect for this bitmap.
    pub fn full_rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Set the active sub-region. Always intersected with the full rect on
    /// query, not at set time, so later resizes narrow it automatically.
    pub fn set_region(&mut self, rect: Rect) {
        self.region = Some(rect);
    }

    /// Clear the active sub-region, reverting to the full canvas.
    pub fn clear_region(&mut self) {
        self.region = None;
    }

    /// The active sub-region intersected with the full rect, or the full
    /// rect if none is set.
    pub fn active_region(&self) -> Rect {
        self.full_rect().intersect(self.region)
    }

    /// Acquire the advisory lock and return a mutable view of the full
    /// buffer, allocating it on first use for `Owned` bitmaps.
    pub fn lock(&mut self) -> Result<&mut [u8]> {
        if self.locked {
            return Err(Error::invalid_state("bitmap already locked"));
        }
        if self.backing.is_none() {
            let len = self.pitch * self.height.max(0) as usize;
            self.backing = Some(BitmapBacking::Owned(vec![0u8; len]));
        }
        self.locked = true;
        match self.backing.as_mut().unwrap() {
            BitmapBacking::Owned(v) => Ok(v.as_mut_slice()),
            BitmapBacking::Borrowed { data, .. } => Ok(data),
            BitmapBacking::Host(h) => h.lock(),
        }
    }

    /// Release the advisory lock taken by [`Bitmap::lock`].
    pub fn unlock(&mut self) {
        if let Some(BitmapBacking::Host(h)) = self.backing.as_mut() {
            h.unlock();
        }
        self.locked = false;
    }

    /// Copy out the full-width bytes of row `y`, locking first if necessary
    /// and releasing the lock again if this call is the one that took it.
    /// Used by readers (e.g. the vignette compositor) that need one row
    /// regardless of the bitmap's current lock state.
    pub fn copy_row(&mut self, y: i32) -> Result<Vec<u8>> {
        if y < 0 || y >= self.height {
            return Err(Error::invalid_argument(format!("row {y} out of bounds")));
        }
        let took_lock = !self.locked;
        let pitch = self.pitch;
        let row_bytes = self.width.max(0) as usize * self.color_mode.bpp();
        let buf = if took_lock { self.lock()? } else { self.current_buffer()? };
        let start = y as usize * pitch;
        let row = buf[start..start + row_bytes].to_vec();
        if took_lock {
            self.unlock();
        }
        Ok(row)
    }

    /// Write `data` (exactly `width * bpp` bytes) into row `y`, locking
    /// first if necessary and releasing again if this call took the lock.
    pub fn write_row(&mut self, y: i32, data: &[u8]) -> Result<()> {
        if y < 0 || y >= self.height {
            return Err(Error::invalid_argument(format!("row {y} out of bounds")));
        }
        let took_lock = !self.locked;
        let pitch = self.pitch;
        let row_bytes = self.width.max(0) as usize * self.color_mode.bpp();
        if data.len() < row_bytes {
            return Err(Error::invalid_argument("row data shorter than width * bpp"));
        }
        let buf = if took_lock { self.lock()? } else { self.current_buffer()? };
        let start = y as usize * pitch;
        buf[start..start + row_bytes].copy_from_slice(&data[..row_bytes]);
        if took_lock {
            self.unlock();
        }
        Ok(())
    }

    fn current_buffer(&mut self) -> Result<&mut [u8]> {
        match self.backing.as_mut() {
            Some(BitmapBacking::Owned(v)) => Ok(v.as_mut_slice()),
            Some(BitmapBacking::Borrowed { data, .. }) => Ok(data),
            Some(BitmapBacking::Host(h)) => h.lock(),
            None => Err(Error::invalid_state("bitmap has no backing buffer")),
        }
    }

    /// Row `y`'s pixel bytes within the active region, or `None` if the
    /// region is empty at this row or the bitmap is unlocked.
    pub fn region_buffer(&mut self, y: i32) -> Result<Option<&mut [u8]>> {
        if !self.locked {
            return Err(Error::invalid_state("regionBuffer() requires a locked bitmap"));
        }
        let region = self.active_region();
        if region.is_empty() || y < region.y || y >= region.bottom() {
            return Ok(None);
        }
        let bpp = self.color_mode.bpp();
        let pitch = self.pitch;
        let row_start = (y as usize) * pitch + (region.x.max(0) as usize) * bpp;
        let row_len = (region.width as usize) * bpp;
        let buf = match self.backing.as_mut().unwrap() {
            BitmapBacking::Owned(v) => v.as_mut_slice(),
            BitmapBacking::Borrowed { data, .. } => &mut **data,
            BitmapBacking::Host(h) => h.lock()?,
        };
        Ok(Some(&mut buf[row_start..row_start + row_len]))
    }

    /// Reallocate to a new size. Fails for static/host-backed bitmaps and
    /// for locked bitmaps.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        if self.locked {
            return Err(Error::invalid_state("cannot resize a locked bitmap"));
        }
        if self.is_static {
            return Err(Error::invalid_argument("cannot resize a static/host bitmap"));
        }
        self.width = width;
        self.height = height;
        self.pitch = (width.max(0) as usize) * self.color_mode.bpp();
        self.backing = None; // invalidate: reacquired lazily on next lock()
        self.region = None;
        Ok(())
    }

    /// Wrap this bitmap in the binding-boundary retain/release façade.
    pub fn into_shared(self) -> SharedBitmap {
        Rc::new(RefCell::new(self))
    }
}

/// PSNR between two equal-dimension bitmaps' full buffers, assuming both are
/// already locked. Returns `-1.0` for mismatched shapes, capped at `100.0`
/// when mean squared error is effectively zero.
pub fn psnr(a: &[u8], a_pitch: usize, b: &[u8], b_pitch: usize, width: i32, height: i32, bpp: usize) -> f64 {
    if width <= 0 || height <= 0 {
        return -1.0;
    }
    let row_bytes = width as usize * bpp;
    if a.len() < a_pitch * height as usize || b.len() < b_pitch * height as usize {
        return -1.0;
    }
    let mut sum_sq: f64 = 0.0;
    let mut count: f64 = 0.0;
    for y in 0..height as usize {
        let ra = &a[y * a_pitch..y * a_pitch + row_bytes];
        let rb = &b[y * b_pitch..y * b_pitch + row_bytes];
        for (pa, pb) in ra.iter().zip(rb.iter()) {
            let d = *pa as f64 - *pb as f64;
            sum_sq += d * d;
            count += 1.0;
        }
    }
    if count == 0.0 {
        return -1.0;
    }
    let mse = sum_sq / count;
    if mse <= 1e-9 {
        return 100.0;
    }
    let value = 20.0 * (255.0f64).log10() - 10.0 * mse.log10();
    value.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bitmap_computes_pitch() {
        let b = Bitmap::new(10, 5, ColorMode::Rgb);
        assert_eq!(b.pitch(), 30);
    }

    #[test]
    fn lock_allocates_owned_backing() {
        let mut b = Bitmap::new(4, 4, ColorMode::Gray);
        let buf = b.lock().unwrap();
        assert_eq!(buf.len(), 16);
        b.unlock();
    }

    #[test]
    fn double_lock_is_invalid_state() {
        let mut b = Bitmap::new(2, 2, ColorMode::Gray);
        b.lock().unwrap();
        assert!(b.lock().is_err());
    }

    #[test]
    fn resizing_locked_bitmap_fails() {
        let mut b = Bitmap::new(2, 2, ColorMode::Gray);
        b.lock().unwrap();
        assert!(b.resize(4, 4).is_err());
    }

    #[test]
    fn empty_region_yields_none() {
        let mut b = Bitmap::new(4, 4, ColorMode::Gray);
        b.lock().unwrap();
        b.set_region(Rect::new(100, 100, 2, 2));
        assert!(b.region_buffer(0).unwrap().is_none());
    }

    #[test]
    fn psnr_is_symmetric_and_capped() {
        let a = vec![10u8; 16];
        let b = vec![10u8; 16];
        assert_eq!(psnr(&a, 4, &b, 4, 4, 4, 1), 100.0);
        let c = vec![200u8; 16];
        let pab = psnr(&a, 4, &c, 4, 4, 4, 1);
        let pba = psnr(&c, 4, &a, 4, 4, 4, 1);
        assert!((pab - pba).abs() < 1e-9);
        assert!(pab >= 0.0);
    }

    #[test]
    fn psnr_mismatched_shape_is_negative_one() {
        let a = vec![0u8; 4];
        let b = vec![0u8; 16];
        assert_eq!(psnr(&a, 2, &b, 4, 4, 4, 1), -1.0);
    }
}

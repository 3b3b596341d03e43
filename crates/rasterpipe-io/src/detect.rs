//! Format sniffing from magic bytes.

/// Container formats the dispatcher knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Joint Photographic Experts Group.
    Jpeg,
    /// Portable Network Graphics.
    Png,
    /// WebP (RIFF container, VP8/VP8L/VP8X payload).
    WebP,
    /// Graphics Interchange Format.
    Gif,
}

impl ImageFormat {
    /// Sniff the format from the leading bytes of a file. Needs at least 16
    /// bytes to recognize WebP's RIFF header reliably; shorter buffers only
    /// match JPEG/PNG/GIF.
    pub fn detect(header: &[u8]) -> Option<ImageFormat> {
        if header.len() >= 3 && header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
            return Some(ImageFormat::Jpeg);
        }
        if header.len() >= 8 && header[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(ImageFormat::Png);
        }
        if header.len() >= 6 && (&header[..6] == b"GIF87a" || &header[..6] == b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jpeg() {
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn detects_png() {
        let sig = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageFormat::detect(&sig), Some(ImageFormat::Png));
    }

    #[test]
    fn detects_gif() {
        assert_eq!(ImageFormat::detect(b"GIF89a...."), Some(ImageFormat::Gif));
    }

    #[test]
    fn detects_webp() {
        let mut header = b"RIFF".to_vec();
        header.extend_from_slice(&[0, 0, 0, 0]);
        header.extend_from_slice(b"WEBP");
        assert_eq!(ImageFormat::detect(&header), Some(ImageFormat::WebP));
    }

    #[test]
    fn rejects_unknown_or_short() {
        assert_eq!(ImageFormat::detect(b"abc"), None);
        assert_eq!(ImageFormat::detect(&[0x00, 0x01]), None);
    }
}

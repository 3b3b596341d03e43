//! Exif orientation and XMP GPano extraction.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use rasterpipe_core::PanoMetadata;

/// Decode the Exif orientation tag (0x0112) from a raw Exif TIFF blob
/// (the bytes following the `"Exif\0\0"` APP1 marker prefix).
///
/// Returns `1` (identity) if the tag is absent or the blob is malformed;
/// orientation is advisory metadata, never a reason to fail decode.
pub fn parse_exif_orientation(tiff: &[u8]) -> u16 {
    if tiff.len() < 8 {
        return 1;
    }
    let little_endian = match &tiff[0..2] {
        b"II" => true,
        b"MM" => false,
        _ => return 1,
    };
    let read_u16 = |b: &[u8]| -> u16 {
        if little_endian { LittleEndian::read_u16(b) } else { BigEndian::read_u16(b) }
    };
    let read_u32 = |b: &[u8]| -> u32 {
        if little_endian { LittleEndian::read_u32(b) } else { BigEndian::read_u32(b) }
    };
    if read_u16(&tiff[2..4]) != 42 {
        return 1;
    }
    let ifd0_offset = read_u32(&tiff[4..8]) as usize;
    if ifd0_offset + 2 > tiff.len() {
        return 1;
    }
    let entry_count = read_u16(&tiff[ifd0_offset..ifd0_offset + 2]) as usize;
    let entries_start = ifd0_offset + 2;
    for i in 0..entry_count {
        let entry_start = entries_start + i * 12;
        if entry_start + 12 > tiff.len() {
            break;
        }
        let tag = read_u16(&tiff[entry_start..entry_start + 2]);
        if tag == 0x0112 {
            let value = read_u16(&tiff[entry_start + 8..entry_start + 10]);
            return if (1..=8).contains(&value) { value } else { 1 };
        }
    }
    1
}

/// Extract Google Photo Sphere (`GPano:`) fields from an embedded XMP
/// packet's RDF/XML text. Tolerant of both `attribute="value"` and
/// `<tag>value</tag>` RDF serialization styles.
pub fn parse_xmp_gpano(xmp: &str) -> PanoMetadata {
    let mut pano = PanoMetadata::default();
    pano.full_pano_width_pixels = find_u32(xmp, "GPano:FullPanoWidthPixels");
    pano.full_pano_height_pixels = find_u32(xmp, "GPano:FullPanoHeightPixels");
    pano.cropped_area_image_width_pixels = find_u32(xmp, "GPano:CroppedAreaImageWidthPixels");
    pano.cropped_area_image_height_pixels = find_u32(xmp, "GPano:CroppedAreaImageHeightPixels");
    pano.cropped_area_left_pixels = find_u32(xmp, "GPano:CroppedAreaLeftPixels");
    pano.cropped_area_top_pixels = find_u32(xmp, "GPano:CroppedAreaTopPixels");
    pano.use_panorama_viewer = find_str(xmp, "GPano:UsePanoramaViewer").map(|s| s == "True" || s == "true");
    pano.projection_type = find_str(xmp, "GPano:ProjectionType");
    pano
}

fn find_u32(xmp: &str, field: &str) -> Option<u32> {
    find_str(xmp, field).and_then(|s| s.parse().ok())
}

fn find_str(xmp: &str, field: &str) -> Option<String> {
    if let Some(pos) = xmp.find(field) {
        let rest = &xmp[pos + field.len()..];
        if let Some(eq) = rest.find('=') {
            let after_eq = rest[eq + 1..].trim_start();
            let quote = after_eq.chars().next()?;
            if quote == '"' || quote == '\'' {
                let body = &after_eq[1..];
                if let Some(end) = body.find(quote) {
                    return Some(body[..end].to_string());
                }
            }
        }
        if let Some(gt) = rest.find('>') {
            let body = &rest[gt + 1..];
            if let Some(end) = body.find('<') {
                return Some(body[..end].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_exif_defaults_to_identity_orientation() {
        assert_eq!(parse_exif_orientation(&[]), 1);
    }

    #[test]
    fn parses_little_endian_orientation() {
        // II TIFF header, IFD0 at offset 8, one entry: tag 0x0112, type
        // SHORT, count 1, value 6 (rotate 90 CW) in the first two value bytes.
        let mut tiff = vec![b'I', b'I', 42, 0, 8, 0, 0, 0];
        tiff.extend_from_slice(&1u16.to_le_bytes()); // entry count
        tiff.extend_from_slice(&0x0112u16.to_le_bytes()); // tag
        tiff.extend_from_slice(&3u16.to_le_bytes()); // type SHORT
        tiff.extend_from_slice(&1u32.to_le_bytes()); // count
        tiff.extend_from_slice(&6u16.to_le_bytes()); // value
        tiff.extend_from_slice(&0u16.to_le_bytes()); // padding
        assert_eq!(parse_exif_orientation(&tiff), 6);
    }

    #[test]
    fn parses_gpano_attributes() {
        let xmp = r#"<rdf:Description GPano:FullPanoWidthPixels="8000" GPano:ProjectionType="equirectangular"/>"#;
        let pano = parse_xmp_gpano(xmp);
        assert_eq!(pano.full_pano_width_pixels, Some(8000));
        assert_eq!(pano.projection_type.as_deref(), Some("equirectangular"));
    }

    #[test]
    fn parses_gpano_elements() {
        let xmp = "<GPano:CroppedAreaLeftPixels>400</GPano:CroppedAreaLeftPixels>";
        let pano = parse_xmp_gpano(xmp);
        assert_eq!(pano.cropped_area_left_pixels, Some(400));
    }
}

use std::fs;
use std::path::Path;

use image::{ImageFormat, RgbImage};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};

/// Decodes uploaded JPEG or PNG bytes into an RGB pixel grid
pub fn decode_upload(bytes: &[u8]) -> Result<RgbImage> {
    if bytes.is_empty() {
        return Err(AnalysisError::invalid_input("upload is empty"));
    }

    let format = image::guess_format(bytes)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        warn!("Rejected upload in {:?} format", format);
        return Err(AnalysisError::UnsupportedFormat {
            format: format!("{:?}", format),
        });
    }

    let img = image::load_from_memory_with_format(bytes, format)?.to_rgb8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(AnalysisError::invalid_input("image has no pixels"));
    }

    debug!("Decoded {:?} upload: {}x{}", format, width, height);
    Ok(img)
}

/// Reads an image file from disk and decodes it
pub fn load_upload(path: &Path) -> Result<RgbImage> {
    let bytes = fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
    decode_upload(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let img = RgbImage::from_pixel(3, 2, Rgb([12, 200, 40]));
        let decoded = decode_upload(&encode(&img, ImageFormat::Png)).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([12, 200, 40]));
    }

    #[test]
    fn test_decode_jpeg() {
        let img = RgbImage::from_pixel(16, 16, Rgb([250, 250, 250]));
        let decoded = decode_upload(&encode(&img, ImageFormat::Jpeg)).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
    }

    #[test]
    fn test_rejects_other_formats() {
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        let err = decode_upload(&encode(&img, ImageFormat::Bmp)).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = decode_upload(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AnalysisError::ImageDecode { .. }));
    }

    #[test]
    fn test_rejects_empty_upload() {
        let err = decode_upload(&[]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_upload(Path::new("nonexistent_upload.png")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}

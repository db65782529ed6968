//! Decoding uploads and encoding the stamped result.
//!
//! Every decoded image is widened to RGBA so compositing can assume an alpha
//! channel. Every output is a quality-90 JPEG, whatever the input format was.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageReader, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// JPEG quality used for every watermarked output.
pub const OUTPUT_QUALITY: u8 = 90;

/// Decode an image file into an RGBA buffer.
///
/// The container format is sniffed from the file contents, so a PNG saved
/// with a `.jpg` extension still decodes. Sources without alpha get a fully
/// opaque alpha channel.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the file is unreadable, empty, or not a
/// recognized image.
pub fn decode(path: &Path) -> Result<RgbaImage> {
    let decode_err = |source: ImageError| Error::Decode {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(ImageError::IoError(e)))?;
    let image = reader.decode().map_err(decode_err)?;

    Ok(image.to_rgba8())
}

/// Drop the alpha channel, treating stored colors as already opaque.
#[must_use]
pub fn flatten(image: RgbaImage) -> RgbImage {
    DynamicImage::ImageRgba8(image).to_rgb8()
}

/// Encode an RGB image as JPEG bytes at the given quality.
///
/// # Errors
///
/// Returns the codec error if encoding fails.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> std::result::Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
        encoder.encode_image(image)?;
    }
    Ok(buf.into_inner())
}

/// Flatten and write an image as a JPEG at `path`.
///
/// The whole file is encoded in memory before anything touches the disk. If
/// the write itself fails, a partially written file is removed on a
/// best-effort basis.
///
/// # Errors
///
/// Returns [`Error::Encode`] on codec failure or any I/O failure writing
/// `path`.
pub fn encode(image: RgbaImage, path: &Path, quality: u8) -> Result<()> {
    let encode_err = |source: ImageError| Error::Encode {
        path: path.to_path_buf(),
        source,
    };

    let rgb = flatten(image);
    let bytes = encode_jpeg(&rgb, quality).map_err(encode_err)?;

    if let Err(e) = std::fs::write(path, &bytes) {
        if path.exists() {
            discard(path, "partial output");
        }
        return Err(encode_err(ImageError::IoError(e)));
    }

    Ok(())
}

/// Remove a file we no longer want, logging rather than failing.
pub(crate) fn discard(path: &Path, what: &str) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove {what}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    #[test]
    fn decode_adds_opaque_alpha_to_rgb_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.png");
        RgbImage::from_pixel(12, 7, Rgb([10, 200, 30]))
            .save(&path)
            .unwrap();

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.dimensions(), (12, 7));
        assert!(decoded.pixels().all(|p| p[3] == 255));
        assert_eq!(*decoded.get_pixel(3, 3), Rgba([10, 200, 30, 255]));
    }

    #[test]
    fn decode_sniffs_format_instead_of_trusting_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("real.png");
        RgbImage::new(5, 5).save(&png).unwrap();
        let misnamed = dir.path().join("actually_png.jpg");
        std::fs::copy(&png, &misnamed).unwrap();

        assert_eq!(decode(&misnamed).unwrap().dimensions(), (5, 5));
    }

    #[test]
    fn decode_rejects_empty_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();

        assert!(matches!(decode(&empty), Err(Error::Decode { .. })));
        assert!(matches!(
            decode(&dir.path().join("missing.png")),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn encode_writes_rgb_jpeg_with_same_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.jpg");
        let img = RgbaImage::from_pixel(40, 30, Rgba([90, 120, 150, 80]));

        encode(img, &out, OUTPUT_QUALITY).unwrap();

        let reread = image::open(&out).unwrap();
        assert_eq!(reread.color(), image::ColorType::Rgb8);
        assert_eq!((reread.width(), reread.height()), (40, 30));
    }

    #[test]
    fn encode_into_missing_directory_fails_without_leaving_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no_such_dir").join("out.jpg");

        let err = encode(RgbaImage::new(4, 4), &out, OUTPUT_QUALITY).unwrap_err();
        assert!(matches!(err, Error::Encode { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn discard_removes_file_and_tolerates_missing_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leftover.jpg");
        std::fs::write(&path, b"x").unwrap();

        discard(&path, "leftover");
        assert!(!path.exists());
        discard(&path, "leftover");
    }

    #[test]
    fn flatten_keeps_color_values() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 0]));
        assert_eq!(*flatten(img).get_pixel(1, 1), Rgb([1, 2, 3]));
    }
}

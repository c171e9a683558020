use super::error::PhotoError;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;

/// Serialize a stamped raster to JPEG at the encoder's default quality.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, PhotoError> {
    let mut bytes = Vec::new();
    JpegEncoder::new(&mut bytes)
        .encode_image(image)
        .map_err(|e| PhotoError::EncodingFailure(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn output_is_a_jpeg() {
        let img = RgbImage::from_pixel(32, 24, Rgb([10, 120, 200]));
        let bytes = encode_jpeg(&img).unwrap();

        // SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
    }
}

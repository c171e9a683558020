//! Attendance photo pipeline.
//!
//! validate → decode → bound to 1024px → stamp timestamp band → encode JPEG.
//!
//! [`PhotoPipeline::process`] is synchronous and holds no state besides its
//! limits, so one instance can be shared across workers.

pub mod encode;
pub mod error;
pub mod resize;
pub mod stamp;
pub mod validate;

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

pub use error::PhotoError;

use resize::MAX_DIMENSION;
use validate::DEFAULT_MAX_PHOTO_SIZE;

/// One uploaded photo, as received.
#[derive(Debug, Clone)]
pub struct PhotoUploadRequest {
    bytes: Vec<u8>,
    content_type: Option<String>,
    captured_at: NaiveDateTime,
}

impl PhotoUploadRequest {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>, captured_at: NaiveDateTime) -> Self {
        Self {
            bytes,
            content_type,
            captured_at,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }
}

/// Encoded JPEG ready to be stored on the attendance record.
#[derive(Debug, Clone)]
pub struct ProcessedPhoto {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PhotoPipeline {
    max_photo_size: u64,
    max_dimension: u32,
}

impl Default for PhotoPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PHOTO_SIZE)
    }
}

impl PhotoPipeline {
    pub fn new(max_photo_size: u64) -> Self {
        Self {
            max_photo_size,
            max_dimension: MAX_DIMENSION,
        }
    }

    pub fn max_photo_size(&self) -> u64 {
        self.max_photo_size
    }

    /// Metadata checks only: emptiness, size and declared content type. Cheap
    /// enough to run before any database or decoding work.
    pub fn check(&self, request: &PhotoUploadRequest) -> Result<(), PhotoError> {
        validate::validate_photo(request.len(), request.content_type(), self.max_photo_size)
    }

    /// Run the whole pipeline. Nothing is returned unless every stage succeeds.
    #[instrument(
        name = "photo_process",
        skip(self, request),
        fields(size = request.len(), content_type = ?request.content_type())
    )]
    pub fn process(&self, request: &PhotoUploadRequest) -> Result<ProcessedPhoto, PhotoError> {
        self.check(request)?;

        let decoded = resize::decode(request.bytes())?;
        debug!(width = decoded.width(), height = decoded.height(), "Photo decoded");

        let bounded = resize::bound(decoded, self.max_dimension);
        let stamped = stamp::stamp(&bounded, &request.captured_at());
        drop(bounded);

        let bytes = encode::encode_jpeg(&stamped)?;
        debug!(
            width = stamped.width(),
            height = stamped.height(),
            encoded = bytes.len(),
            "Photo encoded"
        );

        Ok(ProcessedPhoto {
            bytes,
            width: stamped.width(),
            height: stamped.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::sync::Arc;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap()
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
        encode::encode_jpeg(&gradient(width, height)).unwrap()
    }

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(gradient(width, height))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn jpeg_request(bytes: Vec<u8>) -> PhotoUploadRequest {
        PhotoUploadRequest::new(bytes, Some("image/jpeg".to_string()), ts())
    }

    fn decoded_dims(photo: &ProcessedPhoto) -> (u32, u32) {
        let img = image::load_from_memory(&photo.bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn request_length_tracks_bytes() {
        let req = jpeg_request(vec![1, 2, 3]);
        assert_eq!(req.len(), 3);
        assert!(!req.is_empty());
        assert_eq!(req.content_type(), Some("image/jpeg"));
    }

    #[test]
    fn empty_bytes_are_rejected() {
        let err = PhotoPipeline::default()
            .process(&jpeg_request(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, PhotoError::EmptyPhoto));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let err = PhotoPipeline::new(1_048_576)
            .process(&jpeg_request(vec![0u8; 2_000_000]))
            .unwrap_err();
        assert!(matches!(err, PhotoError::PhotoTooLarge { size: 2_000_000, .. }));
    }

    #[test]
    fn text_content_type_is_rejected() {
        let req = PhotoUploadRequest::new(jpeg_fixture(8, 8), Some("text/plain".into()), ts());
        let err = PhotoPipeline::default().process(&req).unwrap_err();
        assert!(matches!(err, PhotoError::InvalidContentType(_)));
    }

    #[test]
    fn corrupt_jpeg_is_unsupported() {
        let err = PhotoPipeline::default()
            .process(&jpeg_request(b"this is not a jpeg at all".to_vec()))
            .unwrap_err();
        assert!(matches!(err, PhotoError::UnsupportedImageFormat(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn large_landscape_is_bounded_then_stamped() {
        let photo = PhotoPipeline::default()
            .process(&jpeg_request(jpeg_fixture(2048, 1024)))
            .unwrap();
        assert_eq!((photo.width, photo.height), (1024, 542));
        assert_eq!(decoded_dims(&photo), (1024, 542));
    }

    #[test]
    fn small_photo_keeps_its_size() {
        let photo = PhotoPipeline::default()
            .process(&jpeg_request(jpeg_fixture(800, 600)))
            .unwrap();
        assert_eq!(decoded_dims(&photo), (800, 630));
    }

    #[test]
    fn band_bottom_row_decodes_near_white() {
        let photo = PhotoPipeline::default()
            .process(&jpeg_request(jpeg_fixture(800, 600)))
            .unwrap();
        let img = image::load_from_memory(&photo.bytes).unwrap().to_rgb8();

        // last row of the band has no glyph ink; allow for JPEG loss
        let y = img.height() - 1;
        for x in (0..img.width()).step_by(37) {
            let Rgb([r, g, b]) = *img.get_pixel(x, y);
            assert!(r > 230 && g > 230 && b > 230, "({x}, {y}) = {r},{g},{b}");
        }
    }

    #[test]
    fn png_input_is_reencoded_as_jpeg() {
        let req = PhotoUploadRequest::new(png_fixture(300, 1200), Some("image/png".into()), ts());
        let photo = PhotoPipeline::default().process(&req).unwrap();

        assert_eq!(
            image::guess_format(&photo.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
        // 300 * 1024 / 1200 = 256
        assert_eq!(decoded_dims(&photo), (256, 1024 + 30));
    }

    #[test]
    fn mislabeled_payload_fails_at_decode() {
        // passes the label check, fails the content check
        let req = PhotoUploadRequest::new(b"GIF89a broken".to_vec(), Some("image/gif".into()), ts());
        let err = PhotoPipeline::default().process(&req).unwrap_err();
        assert!(matches!(
            err,
            PhotoError::UnsupportedImageFormat(_) | PhotoError::DecodeIo(_)
        ));
    }

    #[test]
    fn check_stops_at_metadata() {
        let pipeline = PhotoPipeline::new(64);

        // content is never looked at
        let garbage = jpeg_request(b"not decoded here".to_vec());
        assert!(pipeline.check(&garbage).is_ok());
        assert!(pipeline.process(&garbage).is_err());

        assert!(matches!(
            pipeline.check(&jpeg_request(Vec::new())),
            Err(PhotoError::EmptyPhoto)
        ));
        assert!(matches!(
            pipeline.check(&jpeg_request(vec![0u8; 65])),
            Err(PhotoError::PhotoTooLarge { size: 65, max: 64 })
        ));
        let text = PhotoUploadRequest::new(vec![1], Some("text/plain".into()), ts());
        assert!(matches!(
            pipeline.check(&text),
            Err(PhotoError::InvalidContentType(_))
        ));
    }

    #[test]
    fn repeated_runs_have_identical_dimensions() {
        let pipeline = PhotoPipeline::default();
        let req = jpeg_request(jpeg_fixture(1500, 1000));

        let first = pipeline.process(&req).unwrap();
        let second = pipeline.process(&req).unwrap();
        assert_eq!(decoded_dims(&first), decoded_dims(&second));
        assert_eq!(decoded_dims(&first), (1024, 683 + 30));
    }

    #[test]
    fn concurrent_runs_need_no_coordination() {
        let pipeline = PhotoPipeline::default();
        let req = Arc::new(jpeg_request(jpeg_fixture(640, 480)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let req = Arc::clone(&req);
                std::thread::spawn(move || pipeline.process(&req).map(|p| (p.width, p.height)))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), (640, 510));
        }
    }
}

use super::error::PhotoError;

/// Default upload cap, 1 MiB.
pub const DEFAULT_MAX_PHOTO_SIZE: u64 = 1_048_576;

const IMAGE_MIME_PREFIX: &str = "image/";

/// Metadata-only check of an upload.
///
/// The content type is trusted as declared. A payload labeled `image/*` that
/// is not actually decodable is rejected later by the decoder.
pub fn validate_photo(
    len: u64,
    content_type: Option<&str>,
    max_size: u64,
) -> Result<(), PhotoError> {
    if len == 0 {
        return Err(PhotoError::EmptyPhoto);
    }

    if len > max_size {
        return Err(PhotoError::PhotoTooLarge {
            size: len,
            max: max_size,
        });
    }

    match content_type {
        Some(ct) if ct.starts_with(IMAGE_MIME_PREFIX) => Ok(()),
        other => Err(PhotoError::InvalidContentType(other.map(str::to_owned))),
    }
}

use crate::error::ValidationError;
use crate::models::image::{CandidateFile, ImagePayload, ImagePreview};
use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Largest accepted upload (10 MiB)
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Validate a candidate file and take ownership of its bytes
///
/// The type check runs first, so a non-image is `InvalidType` whatever its size.
pub fn validate(file: CandidateFile) -> Result<ImagePayload, ValidationError> {
    if !file.mime_type.starts_with("image/") {
        return Err(ValidationError::InvalidType {
            mime_type: file.mime_type,
        });
    }

    let size_bytes = file.bytes.len() as u64;
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge {
            size_bytes,
            limit_bytes: MAX_IMAGE_BYTES,
        });
    }

    Ok(ImagePayload::new(file.bytes, file.mime_type, file.file_name))
}

/// Encode image bytes as base64
///
/// With `include_data_url_prefix` the result is a `data:<mime>;base64,...` URL,
/// otherwise the bare base64 body.
pub fn to_base64(payload: &ImagePayload, include_data_url_prefix: bool) -> String {
    let body = general_purpose::STANDARD.encode(payload.bytes());
    if include_data_url_prefix {
        format!("data:{};base64,{}", payload.mime_type(), body)
    } else {
        body
    }
}

/// Read a file from disk, guessing its MIME type from the extension
pub fn read_candidate(path: &Path) -> Result<CandidateFile, ValidationError> {
    let bytes = fs::read(path)
        .map_err(|e| ValidationError::Unreadable(format!("{}: {}", path.display(), e)))?;

    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(CandidateFile::new(file_name, mime_type, bytes))
}

/// Build a candidate from a base64 upload (bare body or `data:` URL)
pub fn decode_upload(
    file_name: impl Into<String>,
    mime_type: impl Into<String>,
    data: &str,
) -> Result<CandidateFile, ValidationError> {
    let body = match data.split_once(";base64,") {
        Some((prefix, body)) if prefix.starts_with("data:") => body,
        _ => data,
    };

    let bytes = general_purpose::STANDARD
        .decode(body.trim())
        .map_err(|e| ValidationError::Unreadable(format!("invalid base64: {}", e)))?;

    Ok(CandidateFile::new(file_name, mime_type, bytes))
}

/// Pixel dimensions from the image header, if the format is decodable
pub fn probe_dimensions(payload: &ImagePayload) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(payload.bytes()))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

impl ImagePayload {
    /// Metadata the presentation layer needs to show the preview step
    pub fn preview(&self) -> ImagePreview {
        let dimensions = probe_dimensions(self);
        ImagePreview {
            file_name: self.file_name().to_string(),
            mime_type: self.mime_type().to_string(),
            size_bytes: self.size_bytes(),
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            data_url: to_base64(self, true),
        }
    }
}

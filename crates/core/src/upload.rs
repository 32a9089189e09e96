//! Photo upload rules: accepted image types, size ceiling, preview and
//! storage path construction.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::error::CoreError;
use crate::wizard::PhotoTarget;

/// Largest accepted photo (5 MiB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Bucket holding child/character photos and generated PDFs.
pub const IMAGES_BUCKET: &str = "images";

/// Accepted MIME types and the extension stored for each.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/heic", "heic"),
];

/// Check the declared content type and size of a selected photo.
///
/// Returns the file extension to store the object under.
pub fn validate_photo(content_type: &str, size: usize) -> Result<&'static str, CoreError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let ext = ACCEPTED_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == mime)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unsupported image type '{content_type}'. Please upload a JPEG, PNG, WebP or HEIC photo"
            ))
        })?;

    if size == 0 {
        return Err(CoreError::Validation("The selected file is empty".to_string()));
    }
    if size > MAX_PHOTO_BYTES {
        return Err(CoreError::Validation(format!(
            "Photo is too large ({size} bytes). The limit is 5 MB"
        )));
    }

    Ok(ext)
}

/// Build the `data:` URL preview returned to the client.
pub fn preview_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Object path for a new photo inside [`IMAGES_BUCKET`].
pub fn photo_object_path(target: PhotoTarget, session_id: Uuid, ext: &str) -> String {
    let folder = match target {
        PhotoTarget::Child => "children",
        PhotoTarget::Character(_) => "characters",
    };
    format!("{folder}/{session_id}/{}.{ext}", Uuid::new_v4())
}

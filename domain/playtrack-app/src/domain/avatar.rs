pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

#[derive(Clone, Debug)]
pub struct AvatarUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// An upload that passed type and size checks.
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvatarError {
    #[error("No file uploaded")]
    Empty,
    #[error("Avatar must not exceed 5 MB")]
    TooLarge,
    #[error("Only image files are allowed")]
    UnsupportedType,
}

impl AvatarImage {
    /// Both the file extension and the MIME subtype must name an allowed image type.
    pub fn from_upload(upload: AvatarUpload) -> Result<Self, AvatarError> {
        if upload.bytes.is_empty() {
            return Err(AvatarError::Empty);
        }
        if upload.bytes.len() > MAX_AVATAR_BYTES {
            return Err(AvatarError::TooLarge);
        }
        let extension = upload
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or(AvatarError::UnsupportedType)?;
        let mime_ok = upload
            .content_type
            .as_deref()
            .and_then(|ct| ct.strip_prefix("image/"))
            .map(|subtype| ALLOWED_EXTENSIONS.contains(&subtype.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !mime_ok {
            return Err(AvatarError::UnsupportedType);
        }
        Ok(Self {
            extension,
            bytes: upload.bytes,
        })
    }
}

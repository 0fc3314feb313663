//! Allowed image formats and payload sniffing.

use crate::error::CoreError;

/// Image formats accepted for product pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// Parse a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Identify the format from the payload's magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used for stored objects.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Decide the format of an uploaded payload.
///
/// The sniffed format is authoritative. A declared content type is optional;
/// when present (and not the generic `application/octet-stream`) it must be
/// an allowed image type and agree with the sniffed one.
pub fn detect_image(data: &[u8], declared: Option<&str>) -> Result<ImageKind, CoreError> {
    let sniffed = ImageKind::sniff(data).ok_or_else(|| {
        CoreError::InvalidAsset("Only JPEG, PNG, GIF and WebP images are allowed".into())
    })?;

    match declared.map(str::trim) {
        None | Some("") | Some("application/octet-stream") => Ok(sniffed),
        Some(mime) => {
            let declared_kind = ImageKind::from_mime(mime).ok_or_else(|| {
                CoreError::InvalidAsset(format!("Content type '{mime}' is not an allowed image type"))
            })?;
            if declared_kind != sniffed {
                return Err(CoreError::InvalidAsset(format!(
                    "Declared content type '{mime}' does not match {} payload",
                    sniffed.mime()
                )));
            }
            Ok(sniffed)
        }
    }
}


#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::fixtures::*;
    use super::*;

    #[test]
    fn sniffs_every_allowed_format() {
        assert_eq!(ImageKind::sniff(PNG), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(JPEG), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(GIF), Some(ImageKind::Gif));
        assert_eq!(ImageKind::sniff(WEBP), Some(ImageKind::Webp));
        assert_eq!(ImageKind::sniff(b"plain text"), None);
    }

    #[test]
    fn mime_parsing_ignores_case_and_params() {
        assert_eq!(ImageKind::from_mime("IMAGE/PNG"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_mime("image/jpg; q=1"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime("image/svg+xml"), None);
    }

    #[test]
    fn detect_accepts_matching_or_missing_declaration() {
        assert_eq!(detect_image(PNG, Some("image/png")).unwrap(), ImageKind::Png);
        assert_eq!(detect_image(GIF, None).unwrap(), ImageKind::Gif);
        assert_eq!(
            detect_image(WEBP, Some("application/octet-stream")).unwrap(),
            ImageKind::Webp
        );
    }

    #[test]
    fn detect_rejects_disallowed_or_mismatched() {
        assert_matches!(
            detect_image(b"%PDF-1.7", Some("application/pdf")),
            Err(CoreError::InvalidAsset(_))
        );
        assert_matches!(
            detect_image(PNG, Some("text/plain")),
            Err(CoreError::InvalidAsset(_))
        );
        assert_matches!(
            detect_image(PNG, Some("image/jpeg")),
            Err(CoreError::InvalidAsset(msg)) if msg.contains("does not match")
        );
    }
}

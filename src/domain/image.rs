//! Embedded image attachments
//!
//! The browser sends images as base64 data URLs. Only a handful of raster
//! formats are forwarded to the model; everything else (PDFs in particular)
//! is rejected before any upstream call.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::PortalError;

/// MIME types accepted for inline images
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Marker appended to a rendered turn that carried an image
pub const IMAGE_MARKER: &str = "[Image uploaded]";

fn data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^data:([^;]+);base64,").expect("data URL pattern is valid")
    })
}

/// A validated inline image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Lower-cased MIME type, always one of [`ALLOWED_IMAGE_TYPES`]
    pub mime_type: String,
    /// Base64 payload without the data URL prefix
    pub data: String,
}

impl ImageAttachment {
    /// Parse and validate a `data:<mime>;base64,<payload>` string.
    pub fn from_data_url(url: &str) -> Result<Self, PortalError> {
        let captures = data_url_pattern()
            .captures(url)
            .ok_or(PortalError::MalformedImage)?;
        let mime_type = captures[1].to_lowercase();

        if !ALLOWED_IMAGE_TYPES.contains(&mime_type.as_str()) {
            return Err(PortalError::UnsupportedImageType(mime_type));
        }

        let data = url
            .split_once(',')
            .map(|(_, payload)| payload.to_string())
            .unwrap_or_default();

        Ok(Self { mime_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_types() {
        for mime in ALLOWED_IMAGE_TYPES {
            let url = format!("data:{};base64,AAAA", mime);
            let image = ImageAttachment::from_data_url(&url).unwrap();
            assert_eq!(image.mime_type, mime);
            assert_eq!(image.data, "AAAA");
        }
    }

    #[test]
    fn test_mime_sniffing_is_case_insensitive() {
        let image = ImageAttachment::from_data_url("DATA:Image/PNG;BASE64,iVBORw0K").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "iVBORw0K");
    }

    #[test]
    fn test_rejects_pdf() {
        let err = ImageAttachment::from_data_url("data:application/pdf;base64,JVBERi0x").unwrap_err();
        assert!(matches!(err, PortalError::UnsupportedImageType(ref m) if m == "application/pdf"));
    }

    #[test]
    fn test_rejects_non_data_url() {
        assert!(matches!(
            ImageAttachment::from_data_url("https://example.com/cat.png"),
            Err(PortalError::MalformedImage)
        ));
        assert!(matches!(
            ImageAttachment::from_data_url("data:image/png,rawbytes"),
            Err(PortalError::MalformedImage)
        ));
    }
}

//! MIME type sniffing.
//!
//! The only "validation" performed on source files: a type is guessed from
//! the extension and, failing that, from a handful of magic byte signatures.

use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// Number of leading bytes needed by [`Mime::from_magic_bytes`].
pub const SNIFF_LEN: usize = 12;

const OCTET_STREAM: &str = "application/octet-stream";

const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const GIF_MAGIC: [u8; 4] = [0x47, 0x49, 0x46, 0x38];
const BMP_MAGIC: [u8; 2] = [0x42, 0x4D];
const TIFF_LE_MAGIC: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];
const TIFF_BE_MAGIC: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const PDF_MAGIC: [u8; 5] = *b"%PDF-";

/// A MIME type string such as `image/png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mime(Cow<'static, str>);

impl Mime {
    pub fn new(value: impl Into<Cow<'static, str>>) -> Self {
        Self(value.into())
    }

    /// The generic binary type, used when nothing better is known.
    pub fn octet_stream() -> Self {
        Self(Cow::Borrowed(OCTET_STREAM))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for any `image/*` type.
    pub fn is_image(&self) -> bool {
        self.0.starts_with("image/")
    }

    pub fn is_octet_stream(&self) -> bool {
        self.0 == OCTET_STREAM
    }

    /// Guess a type from the file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let guessed = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "png" => Some("image/png"),
                "jpg" | "jpeg" | "jpe" => Some("image/jpeg"),
                "gif" => Some("image/gif"),
                "bmp" => Some("image/bmp"),
                "webp" => Some("image/webp"),
                "tif" | "tiff" => Some("image/tiff"),
                "svg" => Some("image/svg+xml"),
                "avif" => Some("image/avif"),
                "ico" => Some("image/x-icon"),
                "txt" => Some("text/plain"),
                "csv" => Some("text/csv"),
                "html" | "htm" => Some("text/html"),
                "json" => Some("application/json"),
                "pdf" => Some("application/pdf"),
                "zip" => Some("application/zip"),
                "pptx" => Some("application/vnd.openxmlformats-officedocument.presentationml.presentation"),
                _ => None,
            });
        guessed.map(|m| Self(Cow::Borrowed(m))).unwrap_or_else(Self::octet_stream)
    }

    /// Detect a type from leading magic bytes.
    ///
    /// Returns `None` if no signature matches or if the input is too short.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        let found = if bytes.starts_with(&PNG_MAGIC) {
            "image/png"
        } else if bytes.starts_with(&JPEG_MAGIC) {
            "image/jpeg"
        } else if bytes.starts_with(&GIF_MAGIC) {
            "image/gif"
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            "image/webp"
        } else if bytes.starts_with(&TIFF_LE_MAGIC) || bytes.starts_with(&TIFF_BE_MAGIC) {
            "image/tiff"
        } else if bytes.starts_with(&ZIP_MAGIC) {
            "application/zip"
        } else if bytes.starts_with(&PDF_MAGIC) {
            "application/pdf"
        } else if bytes.starts_with(&BMP_MAGIC) {
            // Only two bytes of magic; checked last.
            "image/bmp"
        } else {
            return None;
        };
        Some(Self(Cow::Borrowed(found)))
    }

    /// Extension first, then magic bytes, then the generic binary type.
    #[must_use]
    pub fn sniff(path: impl AsRef<Path>, head: &[u8]) -> Self {
        let by_extension = Self::from_path(path);
        if !by_extension.is_octet_stream() {
            return by_extension;
        }
        Self::from_magic_bytes(head).unwrap_or(by_extension)
    }
}

impl Display for Mime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Mime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

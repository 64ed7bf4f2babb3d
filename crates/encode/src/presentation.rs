use crate::archive::write_zip;
use crate::error::{Error, ErrorKind, Result};
use crate::reader::DataUri;
use async_trait::async_trait;
use exn::ResultExt;
use slidepack_storage::mime::Mime;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use zip::CompressionMethod;

mod pptx;

/// English Metric Units per inch.
pub const EMU_PER_INCH: u64 = 914_400;

/// Slide canvas dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// 10in x 5.625in.
    #[default]
    Widescreen16x9,
    /// 10in x 7.5in.
    Standard4x3,
}

impl Layout {
    /// Canvas `(width, height)` in EMU.
    pub const fn size(self) -> (u64, u64) {
        match self {
            Self::Widescreen16x9 => (9_144_000, 5_143_500),
            Self::Standard4x3 => (9_144_000, 6_858_000),
        }
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Widescreen16x9 => "16x9",
            Self::Standard4x3 => "4x3",
        })
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "16x9" | "16:9" | "widescreen" => Ok(Self::Widescreen16x9),
            "4x3" | "4:3" | "standard" => Ok(Self::Standard4x3),
            _ => exn::bail!(ErrorKind::UnsupportedLayout(s.to_string())),
        }
    }
}

/// Image types that can be embedded in a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Webp,
    Svg,
}

impl ImageFormat {
    pub fn from_mime(mime: &Mime) -> Result<Self> {
        Ok(match mime.as_str().to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/bmp" | "image/x-ms-bmp" => Self::Bmp,
            "image/tiff" => Self::Tiff,
            "image/webp" => Self::Webp,
            "image/svg+xml" => Self::Svg,
            other => exn::bail!(ErrorKind::UnsupportedImage(other.to_string())),
        })
    }

    /// Extension used for the media part.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// One image on one slide, positioned in EMU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlacement {
    /// Shown as the picture's alt text.
    pub name: String,
    pub image: DataUri,
    pub x: u64,
    pub y: u64,
    pub width: u64,
    pub height: u64,
}

impl ImagePlacement {
    /// Fill the whole canvas with no margin.
    pub fn full_bleed(name: impl Into<String>, image: DataUri, layout: Layout) -> Self {
        let (width, height) = layout.size();
        Self { name: name.into(), image, x: 0, y: 0, width, height }
    }

    pub fn is_full_bleed(&self, layout: Layout) -> bool {
        (self.x, self.y) == (0, 0) && (self.width, self.height) == layout.size()
    }
}

/// Lays out one image per slide into a presentation document.
#[async_trait]
pub trait PresentationEncoder: Send + Sync {
    /// File extension of the produced document, without the dot.
    fn extension(&self) -> &'static str;

    async fn encode(&self, layout: Layout, slides: Vec<ImagePlacement>) -> Result<Vec<u8>>;
}

/// PowerPoint (PresentationML) documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxEncoder;

#[async_trait]
impl PresentationEncoder for PptxEncoder {
    fn extension(&self) -> &'static str {
        "pptx"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(layout = %layout, slides = slides.len()))]
    async fn encode(&self, layout: Layout, slides: Vec<ImagePlacement>) -> Result<Vec<u8>> {
        let bytes = tokio::task::spawn_blocking(move || {
            let parts = pptx::package(layout, &slides)?;
            write_zip(parts.iter().map(|(name, data)| (name.as_str(), data.as_slice())), CompressionMethod::Deflated)
        })
        .await
        .or_raise(|| ErrorKind::Task)??;
        tracing::debug!(bytes = bytes.len(), "Encoded presentation");
        Ok(bytes)
    }
}

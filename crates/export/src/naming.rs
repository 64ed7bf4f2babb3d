//! Artifact naming.
//!
//! Output file names come from [upon] templates (`{{ variable }}`,
//! `{{ value|formatter }}`, `{% if %}` blocks), extended with:
//!
//! - **`slug`**: converts strings to URL-safe slugs, stripping quotation marks
//!   first to avoid artifacts like leading/trailing hyphens.
//! - **`truncate`**: truncates strings to a maximum byte length at a character
//!   boundary, usable as either `truncate(value, n)` or `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Variable | Type             | Description                           |
//! |----------|------------------|---------------------------------------|
//! | `date`   | `String`         | Export date (UTC) as `YYYY-MM-DD`     |
//! | `title`  | `Option<String>` | Title given by the user, if any       |
//!
//! # Example
//!
//! ```
//! use slidepack_export::{ArtifactNamer, NamingContext};
//! use time::macros::date;
//!
//! let namer: ArtifactNamer = "{{ title|slug }}_{{ date }}".parse().unwrap();
//! let context = NamingContext::new(date!(2024 - 03 - 07)).with_title("Summer Trip".to_string());
//! assert_eq!(namer.generate_with_ext(&context, "pptx").unwrap(), "summer-trip_2024-03-07.pptx");
//! ```

use crate::error::{Error, ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use slidepack_storage::validate_path;
use std::str::FromStr;
use time::{Date, UtcDateTime};
use tracing::instrument;
use upon::{Engine, Template};

/// `Presentation_<date>`, or the slugged title in place of `Presentation`
/// when one is given.
pub const DEFAULT_SLIDESHOW_TEMPLATE: &str = "{% if title %}{{ title|slug }}{% else %}Presentation{% endif %}_{{ date }}";
/// `Archived_Files_<date>`.
pub const DEFAULT_ARCHIVE_TEMPLATE: &str = "Archived_Files_{{ date }}";

/// Values exposed to naming templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub date: Date,
    pub title: Option<String>,
}

impl NamingContext {
    pub fn new(date: Date) -> Self {
        Self { date, title: None }
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self::new(UtcDateTime::now().date())
    }

    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into().filter(|t| !t.trim().is_empty());
        self
    }

    fn parameters(&self) -> upon::Value {
        upon::value! {
            // `Date`'s Display is ISO 8601 (`YYYY-MM-DD`).
            date: self.date.to_string(),
            title: self.title.as_deref(),
        }
    }
}

/// Generates artifact file names from a [`NamingContext`] and a template.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at creation time rather than at export time.
pub struct ArtifactNamer {
    engine: Engine<'static>,
    template: Template<'static>,
}

impl FromStr for ArtifactNamer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            exn::bail!(ErrorKind::Template);
        }
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}

impl ArtifactNamer {
    /// Render the template, without any file extension.
    #[instrument(level = "debug", skip_all, fields(date = %context.date))]
    pub fn generate(&self, context: &NamingContext) -> Result<String> {
        let name = self
            .template
            .render(&self.engine, context.parameters())
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Self::normalize(name)
    }

    /// Render the template and append `ext` (with or without a leading dot).
    pub fn generate_with_ext(&self, context: &NamingContext, ext: impl AsRef<str>) -> Result<String> {
        let name = self.generate(context)?;
        Ok(format!("{name}.{}", ext.as_ref().trim().trim_matches('.')))
    }

    /// Trims each path segment, joins them with `/`, then validates via
    /// [`slidepack_storage::validate_path`].
    fn normalize(s: impl Into<String>) -> Result<String> {
        let path = s.into().trim().split('/').map(str::trim).collect::<Vec<_>>().join("/");
        let path = validate_path(&path).or_raise(|| ErrorKind::Template)?;
        // Infallible: input was a String.
        path.to_str().map(str::to_string).ok_or_raise(|| ErrorKind::Template)
    }
}

/// Custom [`upon`] extensions for file-name-safe string manipulation.
mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    const QUOTATION_MARKS: [char; 13] = [
        '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}', '\u{0060}',
        '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
    ];

    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                let stripped: String = s.chars().filter(|c| !QUOTATION_MARKS.contains(c)).collect();
                write!(f, "{}", slugify!(&stripped))?
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_string()
    }

    pub(super) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("slug", slug_formatter);
        engine.add_function("truncate", truncate_to_char_boundary);
    }
}

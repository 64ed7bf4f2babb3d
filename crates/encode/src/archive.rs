use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One flat entry of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveMember {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), data: data.into() }
    }
}

/// Packs members, in order, into a single compressed blob.
#[async_trait]
pub trait ArchiveEncoder: Send + Sync {
    /// File extension of the produced archive, without the dot.
    fn extension(&self) -> &'static str;

    async fn encode(&self, members: Vec<ArchiveMember>) -> Result<Vec<u8>>;
}

/// ZIP archives via the `zip` crate.
#[derive(Debug, Clone, Copy)]
pub struct ZipEncoder {
    compression: CompressionMethod,
}

impl Default for ZipEncoder {
    fn default() -> Self {
        Self { compression: CompressionMethod::Deflated }
    }
}

impl ZipEncoder {
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    fn check_names(members: &[ArchiveMember]) -> Result<()> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in members {
            if !seen.insert(member.name.as_str()) {
                exn::bail!(ErrorKind::DuplicateMember(member.name.clone()));
            }
        }
        Ok(())
    }
}

/// Write `members` into an in-memory ZIP. Blocking.
pub(crate) fn write_zip<'a>(
    members: impl IntoIterator<Item = (&'a str, &'a [u8])>,
    compression: CompressionMethod,
) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(compression);
    for (name, data) in members {
        writer.start_file(name, options).or_raise(|| ErrorKind::Archive)?;
        writer.write_all(data).or_raise(|| ErrorKind::Archive)?;
    }
    let cursor = writer.finish().or_raise(|| ErrorKind::Archive)?;
    Ok(cursor.into_inner())
}

#[async_trait]
impl ArchiveEncoder for ZipEncoder {
    fn extension(&self) -> &'static str {
        "zip"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(members = members.len()))]
    async fn encode(&self, members: Vec<ArchiveMember>) -> Result<Vec<u8>> {
        Self::check_names(&members)?;
        let compression = self.compression;
        let bytes = tokio::task::spawn_blocking(move || {
            write_zip(members.iter().map(|m| (m.name.as_str(), m.data.as_slice())), compression)
        })
        .await
        .or_raise(|| ErrorKind::Task)??;
        tracing::debug!(bytes = bytes.len(), "Encoded archive");
        Ok(bytes)
    }
}

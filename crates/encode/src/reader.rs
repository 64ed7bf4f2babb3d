use crate::error::{Error, ErrorKind, Result};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use exn::{OptionExt, ResultExt};
use slidepack_collection::SourceFile;
use slidepack_storage::mime::Mime;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A self-contained `data:<mime>;base64,<payload>` encoding of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: Mime,
    payload: String,
}

impl DataUri {
    /// Encode `bytes` with the standard base64 alphabet.
    pub fn encode(mime: Mime, bytes: &[u8]) -> Self {
        Self { mime, payload: BASE64.encode(bytes) }
    }

    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    /// The base64 text after the comma.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload back into the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64.decode(&self.payload).or_raise(|| ErrorKind::InvalidDataUri("payload is not valid base64"))
    }
}

impl Display for DataUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

impl FromStr for DataUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s.strip_prefix("data:").ok_or_raise(|| ErrorKind::InvalidDataUri("missing data: scheme"))?;
        let (header, payload) = rest.split_once(',').ok_or_raise(|| ErrorKind::InvalidDataUri("missing comma"))?;
        let mime = header.strip_suffix(";base64").ok_or_raise(|| ErrorKind::InvalidDataUri("not base64 encoded"))?;
        if mime.is_empty() {
            exn::bail!(ErrorKind::InvalidDataUri("missing media type"));
        }
        Ok(Self { mime: Mime::new(mime.to_string()), payload: payload.to_string() })
    }
}

/// Materialises the content of a source file.
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Read every byte of `file`, failing if it has become unreadable.
    async fn read_bytes(&self, file: &SourceFile) -> Result<Vec<u8>>;

    /// Read `file` into an inline [`DataUri`] using its sniffed MIME type.
    async fn read_data_uri(&self, file: &SourceFile) -> Result<DataUri> {
        let bytes = self.read_bytes(file).await?;
        Ok(DataUri::encode(file.mime().clone(), &bytes))
    }
}

/// Reads straight from the backend that holds the source file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendReader;

#[async_trait]
impl ContentReader for BackendReader {
    #[tracing::instrument(level = "debug", skip_all, fields(name = file.name()))]
    async fn read_bytes(&self, file: &SourceFile) -> Result<Vec<u8>> {
        file.read().await.or_raise(|| ErrorKind::Read(file.name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use slidepack_storage::BackendHandle;
    use slidepack_storage::backend::MockBackend;
    use std::sync::Arc;

    #[test]
    fn test_display_and_parse() {
        let uri = DataUri::encode(Mime::new("image/png"), b"hello");
        assert_eq!(uri.to_string(), "data:image/png;base64,aGVsbG8=");

        let parsed: DataUri = uri.to_string().parse().unwrap();
        assert_eq!(parsed, uri);
        assert_eq!(parsed.decode().unwrap(), b"hello");
    }

    #[rstest]
    #[case("image/png;base64,aGVsbG8=")]
    #[case("data:image/png;base64")]
    #[case("data:image/png,aGVsbG8=")]
    #[case("data:;base64,aGVsbG8=")]
    fn test_parse_rejects(#[case] input: &str) {
        let err = input.parse::<DataUri>().unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidDataUri(_)));
    }

    #[test]
    fn test_decode_rejects_bad_payload() {
        let uri: DataUri = "data:image/png;base64,!!!".parse().unwrap();
        assert!(matches!(*uri.decode().unwrap_err(), ErrorKind::InvalidDataUri(_)));
    }

    #[tokio::test]
    async fn test_backend_reader() {
        let mock = Arc::new(MockBackend::with_files([("Slide 1.png", b"\x89PNG".to_vec())]));
        let backend: BackendHandle = mock.clone();
        let file = SourceFile::open(&backend, "Slide 1.png").await.unwrap();

        let uri = BackendReader.read_data_uri(&file).await.unwrap();
        assert_eq!(uri.mime().as_str(), "image/png");
        assert_eq!(uri.decode().unwrap(), b"\x89PNG");

        mock.make_unreadable("Slide 1.png").await;
        let err = BackendReader.read_data_uri(&file).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Read("Slide 1.png".to_string()));
    }
}

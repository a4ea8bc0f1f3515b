use std::path::PathBuf;

/// One field of a mime (multipart form) request body.
///
/// A field carries either an inline value or a path to a file whose contents
/// the transport streams when the request executes. Mime fields are mutually
/// exclusive with a raw POST body, see [`Request::add_mime_field`].
///
/// [`Request::add_mime_field`]: crate::Request::add_mime_field
#[derive(Debug, Clone)]
pub struct MimeField {
    name: String,
    source: MimeFieldSource,
}

/// Where a mime field's contents come from.
#[derive(Debug, Clone)]
pub enum MimeFieldSource {
    /// An inline value.
    Value(String),
    /// A file on disk, read by the transport at execution time. The file is
    /// not checked for existence up front; a missing file fails the transfer.
    File(PathBuf),
}

impl MimeField {
    /// Creates a mime field with an inline value.
    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: MimeFieldSource::Value(value.into()),
        }
    }

    /// Creates a mime field whose contents are read from a file.
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: MimeFieldSource::File(path.into()),
        }
    }

    /// The field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's contents source.
    pub fn source(&self) -> &MimeFieldSource {
        &self.source
    }
}

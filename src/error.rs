use std::{error::Error as StdError, fmt};

/// A `Result` alias where the `Err` case is `lift::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// A boxed error type that can be used for dynamic error handling.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// The errors that may occur while building or submitting a [`Request`].
///
/// Network-phase outcomes are never reported through this type; they travel
/// inside the [`Response`] as a [`LiftStatus`].
///
/// [`Request`]: crate::Request
/// [`Response`]: crate::Response
/// [`LiftStatus`]: crate::LiftStatus
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// A request was put together in a contradictory way, e.g. a POST body
    /// mixed with mime fields.
    Builder,
    /// The client could not be constructed or driven.
    Client,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    pub(crate) fn builder<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::Builder, Some(e))
    }

    pub(crate) fn client<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::Client, Some(e))
    }

    /// Returns true if the error came from misusing a request builder.
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if the error came from constructing or driving a client.
    pub fn is_client(&self) -> bool {
        matches!(self.inner.kind, Kind::Client)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut builder = f.debug_struct("lift::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner.kind {
            Kind::Builder => f.write_str("builder error")?,
            Kind::Client => f.write_str("client error")?,
        }

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

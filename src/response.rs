use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use crate::header::Header;
use crate::http::{StatusCode, Version};
use crate::status::LiftStatus;

/// The outcome of a single HTTP request.
///
/// Always check [`lift_status`](Response::lift_status) first: it reports how
/// the transfer itself ended (success, timeout, connect error, ...) and is
/// distinct from the HTTP [`status_code`](Response::status_code) the remote
/// server sent.
#[derive(Debug, Clone)]
pub struct Response {
    pub(crate) headers: Vec<Header>,
    pub(crate) data: Bytes,
    // Milliseconds fit 49 days in a u32, plenty for one transfer.
    pub(crate) total_time_ms: u32,
    pub(crate) status_code: StatusCode,
    pub(crate) lift_status: LiftStatus,
    pub(crate) version: Version,
    pub(crate) num_connects: u8,
    pub(crate) num_redirects: u8,
}

impl Response {
    /// How the request completed in the client, e.g. success or timeout.
    ///
    /// This is not the HTTP status code returned by the remote server.
    pub fn lift_status(&self) -> LiftStatus {
        self.lift_status
    }

    /// The HTTP response status code.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// The HTTP version of the response.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The response headers, in the order they arrived.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Looks up the first response header with the given name,
    /// case-insensitively.
    pub fn header(&self, name: &str) -> Option<&Header> {
        self.headers
            .iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))
    }

    /// The downloaded response body.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the response, returning the body.
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// The total time the request took.
    ///
    /// For a request that hit its user-visible timeout this is stamped to
    /// the configured timeout value.
    pub fn total_time(&self) -> Duration {
        Duration::from_millis(u64::from(self.total_time_ms))
    }

    /// The number of connections made to serve this request, saturating
    /// at 255.
    pub fn num_connects(&self) -> u8 {
        self.num_connects
    }

    /// The number of redirects followed while serving this request,
    /// saturating at 255.
    pub fn num_redirects(&self) -> u8 {
        self.num_redirects
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            data: Bytes::new(),
            total_time_ms: 0,
            status_code: StatusCode::HttpUnknown,
            lift_status: LiftStatus::Building,
            version: Version::Http11,
            num_connects: 0,
            num_redirects: 0,
        }
    }
}

impl fmt::Display for Response {
    /// Formats the response in the raw HTTP format.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}\r\n", self.version, self.status_code)?;
        for header in &self.headers {
            write!(f, "{header}\r\n")?;
        }
        f.write_str("\r\n")?;
        if !self.data.is_empty() {
            f.write_str(&String::from_utf8_lossy(&self.data))?;
        }
        Ok(())
    }
}

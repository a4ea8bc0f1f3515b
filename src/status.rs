use std::fmt;

/// The completion status of a request as seen by the library.
///
/// This tells you whether the request completed, timed out, failed to
/// connect, had an SSL error, and so on. It has nothing in common with the
/// HTTP [`StatusCode`] returned by the remote server; always check this value
/// on a [`Response`] before trusting any other field.
///
/// [`StatusCode`]: crate::StatusCode
/// [`Response`]: crate::Response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiftStatus {
    /// The request is under construction.
    Building,
    /// The request is being executed.
    Executing,
    /// The request completed successfully.  This is the one you want.
    Success,
    /// The request had a connect error.
    ConnectError,
    /// The request couldn't lookup the DNS entry for the url.
    ConnectDnsError,
    /// The request had an SSL connection error.
    ConnectSslError,
    /// The request timed out.
    Timeout,
    /// The request received an empty response (socket severed).
    ResponseEmpty,
    /// The request had an error and failed.
    Error,
    /// The request failed to start, did the client shutdown?
    ErrorFailedToStart,
    /// The request had an error while reading data off the socket.
    DownloadError,
}

impl LiftStatus {
    /// The status as a human readable string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LiftStatus::Building => "building",
            LiftStatus::Executing => "executing",
            LiftStatus::Success => "success",
            LiftStatus::ConnectError => "connect_error",
            LiftStatus::ConnectDnsError => "connect_dns_error",
            LiftStatus::ConnectSslError => "connect_ssl_error",
            LiftStatus::Timeout => "timeout",
            LiftStatus::ResponseEmpty => "response_empty",
            LiftStatus::Error => "error",
            LiftStatus::ErrorFailedToStart => "error_failed_to_start",
            LiftStatus::DownloadError => "download_error",
        }
    }
}

impl fmt::Display for LiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings() {
        assert_eq!(LiftStatus::Success.as_str(), "success");
        assert_eq!(LiftStatus::ConnectDnsError.as_str(), "connect_dns_error");
        assert_eq!(
            LiftStatus::ErrorFailedToStart.to_string(),
            "error_failed_to_start"
        );
    }
}

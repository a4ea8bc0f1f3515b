//! The per-transfer adapter between a [`Request`] and the transport.
//!
//! An executor owns one easy handle plus the buffers a transfer fills in,
//! and ties the request to its in-flight [`Response`]. Executors are pooled
//! by the client and reused across transfers; `reset` returns one to a
//! pristine state.
//!
//! Users of the library never see this type.

use std::os::raw::{c_long, c_void};
use std::time::Duration;

use bytes::Bytes;
use curl::easy::{Auth, Easy2, Form, Handler, HttpVersion, InfoType, List, WriteError};
use curl::multi::{Easy2Handle, Multi};

use crate::error::BoxError;
use crate::header::Header;
use crate::http::{Method, StatusCode, Version};
use crate::mime::MimeFieldSource;
use crate::proxy::HttpAuthType;
use crate::request::{DebugInfoHandler, DebugInfoType, Request, TransferProgress, TransferProgressHandler};
use crate::resolve::ResolveHost;
use crate::response::Response;
use crate::share::Share;
use crate::status::LiftStatus;
use crate::timeout::TimeoutKey;

// Option and info codes the safe bindings do not expose, values from curl.h.
const CURLOPT_SSL_VERIFYSTATUS: curl_sys::CURLoption = 232;
const CURLOPT_HAPPY_EYEBALLS_TIMEOUT_MS: curl_sys::CURLoption = 271;
const CURLOPT_SHARE: curl_sys::CURLoption = 10_000 + 100;
const CURLINFO_NUM_CONNECTS: curl_sys::CURLINFO = 0x0020_0000 + 26;

/// Collects the incoming side of one transfer: response headers, body bytes,
/// the status-line HTTP version, and the user callback shims.
#[derive(Default)]
pub(crate) struct Collector {
    headers: Vec<Header>,
    data: Vec<u8>,
    version: Option<Version>,
    progress: Option<TransferProgressHandler>,
    debug: Option<DebugInfoHandler>,
}

impl Collector {
    fn arm(&mut self, progress: Option<TransferProgressHandler>, debug: Option<DebugInfoHandler>) {
        self.progress = progress;
        self.debug = debug;
    }

    fn clear(&mut self) {
        self.headers.clear();
        self.data.clear();
        self.version = None;
        self.progress = None;
        self.debug = None;
    }
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.data.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, data: &[u8]) -> bool {
        let line = String::from_utf8_lossy(data);
        let line = line.strip_suffix("\r\n").unwrap_or(&line);

        if line.is_empty() {
            return true;
        }
        // The status line is not a header; it carries the response version.
        if line.starts_with("HTTP/") {
            let token = line.split(' ').next().unwrap_or("");
            self.version = Some(Version::from(token));
            return true;
        }

        self.headers.push(Header::from_line(line));
        true
    }

    fn progress(&mut self, dltotal: f64, dlnow: f64, ultotal: f64, ulnow: f64) -> bool {
        match &self.progress {
            Some(handler) => handler(TransferProgress {
                downloaded: dlnow as u64,
                download_total: dltotal as u64,
                uploaded: ulnow as u64,
                upload_total: ultotal as u64,
            }),
            None => true,
        }
    }

    fn debug(&mut self, kind: InfoType, data: &[u8]) {
        let handler = match &self.debug {
            Some(handler) => handler,
            None => return,
        };

        let kind = match kind {
            InfoType::Text => DebugInfoType::Text,
            InfoType::HeaderIn => DebugInfoType::HeaderIn,
            InfoType::HeaderOut => DebugInfoType::HeaderOut,
            InfoType::DataIn => DebugInfoType::DataIn,
            InfoType::DataOut => DebugInfoType::DataOut,
            InfoType::SslDataIn => DebugInfoType::SslDataIn,
            InfoType::SslDataOut => DebugInfoType::SslDataOut,
            _ => return,
        };

        handler(kind, data);
    }
}

/// A pooled adapter executing one transfer at a time.
///
/// The easy handle lives in `easy` while idle or executing synchronously and
/// moves into `installed` while the multiplex owns it; exactly one of the
/// two is `Some` at any time (both may be `None` only after an install
/// failure, `reset` replenishes the handle).
pub(crate) struct Executor {
    easy: Option<Easy2<Collector>>,
    installed: Option<Easy2Handle<Collector>>,
    pub(crate) request: Option<Request>,
    pub(crate) response: Response,
    pub(crate) timeout_key: Option<TimeoutKey>,
    pub(crate) completion_processed: bool,
    // Keeps the share's state alive for as long as the handle points at it.
    share: Option<Share>,
}

impl Executor {
    pub(crate) fn new() -> Self {
        Self {
            easy: Some(Easy2::new(Collector::default())),
            installed: None,
            request: None,
            response: Response::default(),
            timeout_key: None,
            completion_processed: false,
            share: None,
        }
    }

    /// Takes ownership of an asynchronous request about to be executed.
    pub(crate) fn attach(&mut self, request: Request) {
        self.request = Some(request);
        self.response = Response::default();
    }

    /// Applies every field of the attached request to the easy handle.
    ///
    /// Timeout options are left alone: for asynchronous requests the client
    /// decides which tier enforces which deadline after `prepare` returns.
    pub(crate) fn prepare(
        &mut self,
        client_resolve_hosts: &[ResolveHost],
        share: Option<&Share>,
    ) -> Result<(), curl::Error> {
        let request = match self.request.take() {
            Some(request) => request,
            None => return Ok(()),
        };

        let result = match self.easy.as_mut() {
            Some(easy) => Self::apply_request(easy, &request, client_resolve_hosts, share, false),
            None => Ok(()),
        };

        self.share = share.cloned();
        self.request = Some(request);
        result
    }

    /// Synchronously drives `request` to completion on the calling thread.
    pub(crate) fn perform(&mut self, request: &Request, share: Option<&Share>) -> Response {
        self.response = Response::default();
        self.response.lift_status = LiftStatus::Executing;
        self.share = share.cloned();

        let status = match self.easy.as_mut() {
            Some(easy) => match Self::apply_request(easy, request, &[], share, true) {
                Ok(()) => match easy.perform() {
                    Ok(()) => LiftStatus::Success,
                    Err(error) => Self::convert(&error),
                },
                Err(error) => {
                    log::warn!("failed to prepare request for {}: {}", request.url(), error);
                    LiftStatus::ErrorFailedToStart
                }
            },
            None => LiftStatus::ErrorFailedToStart,
        };

        self.harvest(status);
        let response = std::mem::take(&mut self.response);
        self.reset();
        response
    }

    /// Moves the easy handle into the multiplex and tags it with `token` so
    /// the completion message can be routed back to this executor.
    pub(crate) fn install(&mut self, multi: &Multi, token: usize) -> Result<(), BoxError> {
        let easy = match self.easy.take() {
            Some(easy) => easy,
            None => return Ok(()),
        };

        let mut handle = multi.add2(easy)?;
        if let Err(error) = handle.set_token(token) {
            // Pull the handle back out so the executor stays reusable.
            if let Ok(easy) = multi.remove2(handle) {
                self.easy = Some(easy);
            }
            return Err(error.into());
        }

        self.response.lift_status = LiftStatus::Executing;
        self.installed = Some(handle);
        Ok(())
    }

    /// Removes the easy handle from the multiplex, making the transfer's
    /// results readable again.
    pub(crate) fn uninstall(&mut self, multi: &Multi) -> Result<(), BoxError> {
        if let Some(handle) = self.installed.take() {
            self.easy = Some(multi.remove2(handle)?);
        }
        Ok(())
    }

    /// Sets the transport-enforced total timeout tier. Sub-millisecond
    /// values round up to one millisecond.
    pub(crate) fn set_transport_timeout(&mut self, timeout: Duration) {
        if let Some(easy) = self.easy.as_mut() {
            let timeout = timeout.max(Duration::from_millis(1));
            if let Err(error) = easy.timeout(timeout) {
                log::warn!("failed to set transport timeout: {error}");
            }
        }
    }

    /// Copies every available response field out of the easy handle.
    pub(crate) fn harvest(&mut self, status: LiftStatus) {
        self.response.lift_status = status;

        if let Some(easy) = self.easy.as_mut() {
            if let Ok(code) = easy.response_code() {
                self.response.status_code = StatusCode::from_u16(code.min(u32::from(u16::MAX)) as u16);
            }
            if let Ok(total) = easy.total_time() {
                self.response.total_time_ms = total.as_millis().min(u128::from(u32::MAX)) as u32;
            }
            if let Ok(redirects) = easy.redirect_count() {
                self.response.num_redirects = redirects.min(u32::from(u8::MAX)) as u8;
            }
            if let Some(connects) = getinfo_long(easy, CURLINFO_NUM_CONNECTS) {
                self.response.num_connects = connects.clamp(0, c_long::from(u8::MAX)) as u8;
            }

            let collector = easy.get_mut();
            self.response.headers = std::mem::take(&mut collector.headers);
            self.response.data = Bytes::from(std::mem::take(&mut collector.data));
            if let Some(version) = collector.version.take() {
                self.response.version = version;
            }
        }

        // A request that never started gets a synthetic 500 instead of the
        // transport's zero status code.
        if status == LiftStatus::ErrorFailedToStart
            && self.response.status_code == StatusCode::HttpUnknown
        {
            self.response.status_code = StatusCode::Http500InternalServerError;
        }
    }

    /// Stamps the synthetic outcome of a user-visible timeout.
    pub(crate) fn set_timesup_response(&mut self, total_time: Duration) {
        self.response.lift_status = LiftStatus::Timeout;
        self.response.status_code = StatusCode::Http504GatewayTimeout;
        self.response.total_time_ms = total_time.as_millis().min(u128::from(u32::MAX)) as u32;
        self.response.num_connects = 0;
        self.response.num_redirects = 0;
    }

    /// Returns the executor to a pristine state ready for the next request.
    pub(crate) fn reset(&mut self) {
        self.request = None;
        self.timeout_key = None;
        self.completion_processed = false;
        self.response = Response::default();
        self.share = None;

        match self.easy.as_mut() {
            Some(easy) => {
                easy.get_mut().clear();
                // Unhook the share before the handle is reset and pooled.
                let _ = setopt_ptr(easy, CURLOPT_SHARE, std::ptr::null_mut());
                easy.reset();
            }
            // The handle was lost to a failed install, replenish it.
            None => {
                if self.installed.is_none() {
                    self.easy = Some(Easy2::new(Collector::default()));
                }
            }
        }
    }

    /// Maps the transport's terminal code into the library taxonomy.
    pub(crate) fn convert(error: &curl::Error) -> LiftStatus {
        if error.is_got_nothing() {
            LiftStatus::ResponseEmpty
        } else if error.is_operation_timedout() {
            LiftStatus::Timeout
        } else if error.is_couldnt_connect() {
            LiftStatus::ConnectError
        } else if error.is_couldnt_resolve_host() {
            LiftStatus::ConnectDnsError
        } else if error.is_ssl_connect_error() {
            LiftStatus::ConnectSslError
        } else if error.is_write_error() {
            LiftStatus::DownloadError
        } else if error.is_send_error() {
            LiftStatus::ErrorFailedToStart
        } else {
            LiftStatus::Error
        }
    }

    fn apply_request(
        easy: &mut Easy2<Collector>,
        request: &Request,
        client_resolve_hosts: &[ResolveHost],
        share: Option<&Share>,
        sync_timeouts: bool,
    ) -> Result<(), curl::Error> {
        easy.get_mut().arm(
            request.transfer_progress_handler().cloned(),
            request.debug_info_handler().cloned(),
        );

        easy.url(request.url())?;

        match request.method() {
            // Default to GET on an unknown method.
            Method::Unknown | Method::Get => easy.get(true)?,
            Method::Head => easy.nobody(true)?,
            Method::Post => easy.post(true)?,
            Method::Put => easy.put(true)?,
            Method::Delete => easy.custom_request("DELETE")?,
            Method::Connect => easy.connect_only(true)?,
            Method::Options => easy.custom_request("OPTIONS")?,
            Method::Patch => easy.custom_request("PATCH")?,
        }

        easy.http_version(match request.version() {
            // Default to the best available version on an unknown value.
            Version::Unknown | Version::UseBest => HttpVersion::Any,
            Version::Http10 => HttpVersion::V10,
            Version::Http11 => HttpVersion::V11,
            Version::Http2 => HttpVersion::V2,
            Version::Http2Tls => HttpVersion::V2TLS,
            Version::Http2Only => HttpVersion::V2PriorKnowledge,
        })?;

        // Synchronous requests enforce their deadlines directly on the
        // handle. Asynchronous deadlines go through the client's timer index
        // instead, which picks the enforcing tier (two-tier timeout rule).
        if sync_timeouts {
            if let Some(connect_timeout) = request.connect_timeout() {
                easy.connect_timeout(connect_timeout)?;
            }
            if let Some(timeout) = request.timeout() {
                easy.timeout(timeout.max(Duration::from_millis(1)))?;
            }
        }

        if request.follow_redirects() {
            easy.follow_location(true)?;
            let max = request.max_redirects();
            if max >= 0 {
                easy.max_redirections(max as u32)?;
            }
        } else {
            easy.follow_location(false)?;
        }

        easy.ssl_verify_peer(request.verify_ssl_peer())?;
        easy.ssl_verify_host(request.verify_ssl_host())?;
        setopt_long(
            easy,
            CURLOPT_SSL_VERIFYSTATUS,
            c_long::from(request.verify_ssl_status()),
        )?;

        if let Some(cert) = request.ssl_cert() {
            easy.ssl_cert(cert)?;
        }
        if let Some(cert_type) = request.ssl_cert_type() {
            easy.ssl_cert_type(cert_type.as_str())?;
        }
        if let Some(key) = request.ssl_key() {
            easy.ssl_key(key)?;
        }
        if let Some(password) = request.key_password() {
            easy.key_password(password)?;
        }

        if let Some(proxy) = request.proxy() {
            easy.proxy(&format!("{}://{}", proxy.proxy_type.scheme(), proxy.host))?;
            easy.proxy_port(proxy.port)?;
            if let Some(username) = &proxy.username {
                easy.proxy_username(username)?;
            }
            if let Some(password) = &proxy.password {
                easy.proxy_password(password)?;
            }
            if let Some(auth_types) = &proxy.auth_types {
                let mut auth = Auth::new();
                for auth_type in auth_types {
                    match auth_type {
                        HttpAuthType::Basic => {
                            auth.basic(true);
                        }
                        HttpAuthType::Any => {
                            auth.basic(true).digest(true).gssnegotiate(true).ntlm(true);
                        }
                        HttpAuthType::AnySafe => {
                            auth.digest(true).gssnegotiate(true).ntlm(true);
                        }
                    }
                }
                easy.proxy_auth(&auth)?;
            }
        }

        if let Some(encodings) = request.accept_encodings() {
            // An empty list joins to "", which asks the transport for every
            // codec it was built with.
            easy.accept_encoding(&encodings.join(", "))?;
        }

        let mut headers = List::new();
        for header in request.headers() {
            headers.append(header.data())?;
        }
        easy.http_headers(headers)?;

        if !request.resolve_hosts().is_empty() || !client_resolve_hosts.is_empty() {
            let mut resolves = List::new();
            for resolve_host in request.resolve_hosts().iter().chain(client_resolve_hosts) {
                resolves.append(resolve_host.wire_format())?;
            }
            easy.resolve(resolves)?;
        }

        if let Some(body) = request.body() {
            easy.post_field_size(body.len() as u64)?;
            easy.post_fields_copy(body)?;
        } else if !request.mime_fields().is_empty() {
            let mut form = Form::new();
            for field in request.mime_fields() {
                let mut part = form.part(field.name());
                match field.source() {
                    MimeFieldSource::Value(value) => {
                        part.contents(value.as_bytes());
                    }
                    MimeFieldSource::File(path) => {
                        part.file(path);
                    }
                }
                part.add()
                    .map_err(|_| curl::Error::new(curl_sys::CURLE_HTTP_POST_ERROR))?;
            }
            easy.httppost(form)?;
        }

        easy.progress(request.transfer_progress_handler().is_some())?;

        if request.debug_info_handler().is_some() {
            easy.verbose(true)?;
        }

        if let Some(timeout) = request.happy_eyeballs_timeout() {
            setopt_long(
                easy,
                CURLOPT_HAPPY_EYEBALLS_TIMEOUT_MS,
                timeout.as_millis().min(u128::from(u32::MAX)) as c_long,
            )?;
        }

        if let Some(share) = share {
            setopt_ptr(easy, CURLOPT_SHARE, share.raw() as *mut c_void)?;
        }

        Ok(())
    }
}

fn setopt_long(
    easy: &Easy2<Collector>,
    option: curl_sys::CURLoption,
    value: c_long,
) -> Result<(), curl::Error> {
    let rc = unsafe { curl_sys::curl_easy_setopt(easy.raw(), option, value) };
    if rc == curl_sys::CURLE_OK {
        Ok(())
    } else {
        Err(curl::Error::new(rc))
    }
}

fn setopt_ptr(
    easy: &Easy2<Collector>,
    option: curl_sys::CURLoption,
    value: *mut c_void,
) -> Result<(), curl::Error> {
    let rc = unsafe { curl_sys::curl_easy_setopt(easy.raw(), option, value) };
    if rc == curl_sys::CURLE_OK {
        Ok(())
    } else {
        Err(curl::Error::new(rc))
    }
}

fn getinfo_long(easy: &Easy2<Collector>, info: curl_sys::CURLINFO) -> Option<c_long> {
    let mut value: c_long = 0;
    let rc = unsafe { curl_sys::curl_easy_getinfo(easy.raw(), info, &mut value) };
    (rc == curl_sys::CURLE_OK).then(|| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_maps_transport_codes() {
        let cases: &[(curl_sys::CURLcode, LiftStatus)] = &[
            (curl_sys::CURLE_GOT_NOTHING, LiftStatus::ResponseEmpty),
            (curl_sys::CURLE_OPERATION_TIMEDOUT, LiftStatus::Timeout),
            (curl_sys::CURLE_COULDNT_CONNECT, LiftStatus::ConnectError),
            (
                curl_sys::CURLE_COULDNT_RESOLVE_HOST,
                LiftStatus::ConnectDnsError,
            ),
            (
                curl_sys::CURLE_SSL_CONNECT_ERROR,
                LiftStatus::ConnectSslError,
            ),
            (curl_sys::CURLE_WRITE_ERROR, LiftStatus::DownloadError),
            (curl_sys::CURLE_SEND_ERROR, LiftStatus::ErrorFailedToStart),
            (curl_sys::CURLE_TOO_MANY_REDIRECTS, LiftStatus::Error),
        ];

        for (code, expected) in cases {
            assert_eq!(Executor::convert(&curl::Error::new(*code)), *expected);
        }
    }

    #[test]
    fn collector_skips_status_and_blank_lines() {
        let mut collector = Collector::default();

        assert!(collector.header(b"HTTP/1.1 200 OK\r\n"));
        assert!(collector.header(b"Content-Type: text/plain\r\n"));
        assert!(collector.header(b"\r\n"));

        assert_eq!(collector.headers.len(), 1);
        assert_eq!(collector.headers[0].name(), "Content-Type");
        assert_eq!(collector.headers[0].value(), "text/plain");
        assert_eq!(collector.version, Some(Version::Http11));
    }

    #[test]
    fn collector_parses_h2_status_line() {
        let mut collector = Collector::default();
        assert!(collector.header(b"HTTP/2 404 \r\n"));
        assert_eq!(collector.version, Some(Version::Http2));
    }

    #[test]
    fn collector_accumulates_body() {
        let mut collector = Collector::default();
        assert_eq!(collector.write(b"hello ").unwrap(), 6);
        assert_eq!(collector.write(b"world").unwrap(), 5);
        assert_eq!(collector.data, b"hello world");
    }

    #[test]
    fn timesup_stamp() {
        let mut executor = Executor::new();
        executor.set_timesup_response(Duration::from_millis(5));

        assert_eq!(executor.response.lift_status(), LiftStatus::Timeout);
        assert_eq!(
            executor.response.status_code(),
            StatusCode::Http504GatewayTimeout
        );
        assert_eq!(executor.response.total_time(), Duration::from_millis(5));
        assert_eq!(executor.response.num_connects(), 0);
        assert_eq!(executor.response.num_redirects(), 0);
    }
}

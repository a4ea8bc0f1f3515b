use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_channel::oneshot;

use crate::error::Error;
use crate::executor::Executor;
use crate::header::Header;
use crate::http::{Method, Version};
use crate::init;
use crate::mime::MimeField;
use crate::proxy::ProxyData;
use crate::resolve::ResolveHost;
use crate::response::Response;
use crate::share::Share;

/// Byte counters handed to a transfer progress handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes downloaded so far.
    pub downloaded: u64,
    /// Total bytes the transfer expects to download, zero if unknown.
    pub download_total: u64,
    /// Bytes uploaded so far.
    pub uploaded: u64,
    /// Total bytes the transfer expects to upload, zero if unknown.
    pub upload_total: u64,
}

/// Periodic transfer progress callback; return `true` to continue the
/// request and `false` to abort it.
pub type TransferProgressHandler = Arc<dyn Fn(TransferProgress) -> bool + Send + Sync + 'static>;

/// Receives the transport's verbose debug stream for a request.
pub type DebugInfoHandler = Arc<dyn Fn(DebugInfoType, &[u8]) + Send + Sync + 'static>;

/// The kind of event a [`DebugInfoHandler`] receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugInfoType {
    /// Informational text.
    Text,
    /// A header received from the peer.
    HeaderIn,
    /// A header sent to the peer.
    HeaderOut,
    /// Body data received from the peer.
    DataIn,
    /// Body data sent to the peer.
    DataOut,
    /// Encrypted data received from the peer.
    SslDataIn,
    /// Encrypted data sent to the peer.
    SslDataOut,
}

impl DebugInfoType {
    /// The event kind as a human readable string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugInfoType::Text => "text",
            DebugInfoType::HeaderIn => "header_in",
            DebugInfoType::HeaderOut => "header_out",
            DebugInfoType::DataIn => "data_in",
            DebugInfoType::DataOut => "data_out",
            DebugInfoType::SslDataIn => "ssl_data_in",
            DebugInfoType::SslDataOut => "ssl_data_out",
        }
    }
}

/// The kind of TLS client certificate file a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslCertType {
    /// A PEM encoded certificate.
    Pem,
    /// A DER encoded certificate.
    Der,
}

impl SslCertType {
    /// The certificate type string the transport understands.
    pub fn as_str(&self) -> &'static str {
        match self {
            SslCertType::Pem => "PEM",
            SslCertType::Der => "DER",
        }
    }
}

/// Where the terminal outcome of an asynchronous request is delivered.
///
/// Exactly one of these is armed per submission. The value is moved out on
/// first delivery, so even if a second delivery were attempted it would find
/// `None` and do nothing.
pub(crate) enum CompletionSink {
    None,
    Callback(Box<dyn FnOnce(Request, Response) + Send + 'static>),
    Promise(oneshot::Sender<(Request, Response)>),
}

impl CompletionSink {
    pub(crate) fn deliver(self, request: Request, response: Response) {
        match self {
            CompletionSink::None => {}
            CompletionSink::Callback(callback) => callback(request, response),
            CompletionSink::Promise(sender) => {
                // The user may have dropped the future, that is their way of
                // saying they don't care about the outcome.
                let _ = sender.send((request, response));
            }
        }
    }
}

/// A single HTTP request under construction.
///
/// A request is built up with setters, then either driven to completion on
/// the calling thread with [`perform`](Request::perform) or handed to a
/// [`Client`](crate::Client) for asynchronous execution. On submission the
/// client takes ownership; the request comes back to the caller together
/// with the [`Response`] through the completion sink.
///
/// ```no_run
/// use lift::Request;
///
/// let mut request = Request::new("http://www.example.com", None);
/// request.add_header("Connection", "keep-alive");
///
/// let response = request.perform(None);
/// println!("{}", response.lift_status());
/// ```
pub struct Request {
    url: String,
    method: Method,
    version: Version,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    happy_eyeballs_timeout: Option<Duration>,
    follow_redirects: bool,
    max_redirects: i64,
    verify_ssl_peer: bool,
    verify_ssl_host: bool,
    verify_ssl_status: bool,
    ssl_cert: Option<PathBuf>,
    ssl_cert_type: Option<SslCertType>,
    ssl_key: Option<PathBuf>,
    key_password: Option<String>,
    proxy: Option<ProxyData>,
    accept_encodings: Option<Vec<String>>,
    resolve_hosts: Vec<ResolveHost>,
    headers: Vec<Header>,
    body: Option<Bytes>,
    mime_fields: Vec<MimeField>,
    transfer_progress: Option<TransferProgressHandler>,
    debug_info: Option<DebugInfoHandler>,
    completion: CompletionSink,
}

impl Request {
    /// Creates a new request for the given url.
    ///
    /// Without a timeout the request can block forever if the remote server
    /// never responds, both synchronously and through a client.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            version: Version::UseBest,
            timeout,
            connect_timeout: None,
            happy_eyeballs_timeout: None,
            follow_redirects: true,
            max_redirects: -1,
            verify_ssl_peer: true,
            verify_ssl_host: true,
            verify_ssl_status: false,
            ssl_cert: None,
            ssl_cert_type: None,
            ssl_key: None,
            key_password: None,
            proxy: None,
            accept_encodings: None,
            resolve_hosts: Vec::new(),
            headers: Vec::new(),
            body: None,
            mime_fields: Vec::new(),
            transfer_progress: None,
            debug_info: None,
            completion: CompletionSink::None,
        }
    }

    /// Synchronously executes this request on the calling thread.
    ///
    /// Note: if there is no timeout set on the request and the remote server
    /// fails to respond this call can block forever.
    pub fn perform(&self, share: Option<&Share>) -> Response {
        init::global_init();
        let mut executor = Executor::new();
        let response = executor.perform(self, share);
        init::global_cleanup();
        response
    }

    /// The url of the request.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sets the url of the request.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// The HTTP method this request will use.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Sets the HTTP method this request should use.
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// The HTTP version this request will use.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the HTTP version this request should use.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// The amount of time the whole request may take, or `None` for no limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Sets the amount of time the whole request may take.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// The amount of time the request may spend connecting, or `None` for
    /// the transport default.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Sets the amount of time the request may spend connecting.
    ///
    /// On a synchronous request this should be shorter than the total
    /// timeout. Through a [`Client`](crate::Client) it may be *longer*: the
    /// user sees a timeout at the total value while the connection attempt
    /// is given until the connect value to finish in the background, so
    /// often-repeated requests on keep-alive connections can carry a short
    /// total timeout and a generous connect budget.
    pub fn set_connect_timeout(&mut self, connect_timeout: Option<Duration>) {
        self.connect_timeout = connect_timeout;
    }

    /// The happy eyeballs (dual-stack IPv4/IPv6 racing) timeout, if set.
    pub fn happy_eyeballs_timeout(&self) -> Option<Duration> {
        self.happy_eyeballs_timeout
    }

    /// Sets how long the transport waits before racing the second address
    /// family, see <https://en.wikipedia.org/wiki/Happy_Eyeballs>.
    pub fn set_happy_eyeballs_timeout(&mut self, timeout: Option<Duration>) {
        self.happy_eyeballs_timeout = timeout;
    }

    /// Is the request automatically following redirects?
    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// When following redirects, the maximum number allowed; `-1` means
    /// infinite and `0` means none.
    pub fn max_redirects(&self) -> i64 {
        self.max_redirects
    }

    /// Sets whether this request follows redirects, enabled by default.
    ///
    /// With `follow` true a `max_redirects` of `None` allows an unlimited
    /// chain; with `follow` false no redirect is ever taken.
    pub fn set_follow_redirects(&mut self, follow: bool, max_redirects: Option<u64>) {
        if follow {
            self.follow_redirects = true;
            self.max_redirects = match max_redirects {
                Some(max) => max as i64,
                None => -1,
            };
        } else {
            self.follow_redirects = false;
            self.max_redirects = 0;
        }
    }

    /// Is the TLS peer verified? Defaults to enabled.
    pub fn verify_ssl_peer(&self) -> bool {
        self.verify_ssl_peer
    }

    /// Sets whether the TLS peer certificate is verified.
    pub fn set_verify_ssl_peer(&mut self, verify: bool) {
        self.verify_ssl_peer = verify;
    }

    /// Is the TLS host name verified? Defaults to enabled.
    pub fn verify_ssl_host(&self) -> bool {
        self.verify_ssl_host
    }

    /// Sets whether the certificate's host name is verified.
    pub fn set_verify_ssl_host(&mut self, verify: bool) {
        self.verify_ssl_host = verify;
    }

    /// Is the certificate status (OCSP stapling) verified? Defaults to
    /// disabled.
    pub fn verify_ssl_status(&self) -> bool {
        self.verify_ssl_status
    }

    /// Sets whether the certificate status is verified.
    pub fn set_verify_ssl_status(&mut self, verify: bool) {
        self.verify_ssl_status = verify;
    }

    /// The TLS client certificate file, if set.
    pub fn ssl_cert(&self) -> Option<&Path> {
        self.ssl_cert.as_deref()
    }

    /// Sets the TLS client certificate file to use.
    pub fn set_ssl_cert(&mut self, cert: impl Into<PathBuf>) {
        self.ssl_cert = Some(cert.into());
    }

    /// The TLS client certificate type, if set.
    pub fn ssl_cert_type(&self) -> Option<SslCertType> {
        self.ssl_cert_type
    }

    /// Sets the TLS client certificate type.
    pub fn set_ssl_cert_type(&mut self, cert_type: SslCertType) {
        self.ssl_cert_type = Some(cert_type);
    }

    /// The TLS client key file, if set.
    pub fn ssl_key(&self) -> Option<&Path> {
        self.ssl_key.as_deref()
    }

    /// Sets the TLS client key file to use.
    pub fn set_ssl_key(&mut self, key: impl Into<PathBuf>) {
        self.ssl_key = Some(key.into());
    }

    /// The pass phrase for the TLS client key, if set.
    pub fn key_password(&self) -> Option<&str> {
        self.key_password.as_deref()
    }

    /// Sets the pass phrase for the TLS client key.
    pub fn set_key_password(&mut self, password: impl Into<String>) {
        self.key_password = Some(password.into());
    }

    /// The proxy settings for this request, if any.
    pub fn proxy(&self) -> Option<&ProxyData> {
        self.proxy.as_ref()
    }

    /// Sets the proxy this request connects through.
    pub fn set_proxy(&mut self, proxy: ProxyData) {
        self.proxy = Some(proxy);
    }

    /// The currently set `Accept-Encoding` values.
    ///
    /// `None` leaves the header to the transport; an empty list asks for
    /// every codec the transport was built with.
    pub fn accept_encodings(&self) -> Option<&[String]> {
        self.accept_encodings.as_deref()
    }

    /// Sets the `Accept-Encoding` values sent with the request.
    ///
    /// Using this is mutually exclusive with adding your own
    /// `Accept-Encoding` header.
    pub fn set_accept_encodings(&mut self, encodings: Option<Vec<String>>) {
        self.accept_encodings = encodings;
    }

    /// Asks for every content encoding the transport was built with.
    pub fn accept_encoding_all_available(&mut self) {
        self.accept_encodings = Some(Vec::new());
    }

    /// The `host:port` to ip address overrides set on this request.
    pub fn resolve_hosts(&self) -> &[ResolveHost] {
        &self.resolve_hosts
    }

    /// Adds a resolve host to this request to bypass DNS lookups.
    pub fn add_resolve_host(&mut self, resolve_host: ResolveHost) {
        self.resolve_hosts.push(resolve_host);
    }

    /// Clears all resolve hosts set on this request.
    pub fn clear_resolve_hosts(&mut self) {
        self.resolve_hosts.clear();
    }

    /// The list of headers added to this request, in insertion order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Adds a request header with its value. Duplicates are allowed and
    /// insertion order is preserved.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) {
        self.headers.push(Header::new(name, value));
    }

    /// Removes a header from the request.
    ///
    /// A few default headers are always added by the transport in certain
    /// scenarios; passing their name here (storing the header with an empty
    /// value) makes the transport strip them, e.g. `Accept` or `Expect`.
    pub fn remove_header(&mut self, name: impl AsRef<str>) {
        self.add_header(name, "");
    }

    /// Clears every header set on this request.
    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    /// The request body, if one was set.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Sets the request body and switches the method to `POST` unless it is
    /// already `POST` or `PUT`.
    ///
    /// Mutually exclusive with mime fields; setting a body after
    /// [`add_mime_field`](Request::add_mime_field) is a fail-fast error.
    pub fn set_body(&mut self, body: impl Into<Bytes>) -> crate::Result<()> {
        if !self.mime_fields.is_empty() {
            return Err(Error::builder(
                "cannot set body data on a request that already has mime fields",
            ));
        }

        self.body = Some(body.into());
        if self.method != Method::Post && self.method != Method::Put {
            self.method = Method::Post;
        }
        Ok(())
    }

    /// The mime fields set on this request.
    pub fn mime_fields(&self) -> &[MimeField] {
        &self.mime_fields
    }

    /// Adds a mime field to this request.
    ///
    /// Mutually exclusive with a raw body; adding a field after
    /// [`set_body`](Request::set_body) is a fail-fast error.
    pub fn add_mime_field(&mut self, field: MimeField) -> crate::Result<()> {
        if self.body.is_some() {
            return Err(Error::builder(
                "cannot add mime fields to a request that already has body data",
            ));
        }

        self.mime_fields.push(field);
        Ok(())
    }

    /// Sets a transfer progress handler, called periodically with the byte
    /// counters of the transfer. Returning `false` aborts the request.
    pub fn set_transfer_progress_handler<F>(&mut self, handler: F)
    where
        F: Fn(TransferProgress) -> bool + Send + Sync + 'static,
    {
        self.transfer_progress = Some(Arc::new(handler));
    }

    /// Removes the transfer progress handler.
    pub fn clear_transfer_progress_handler(&mut self) {
        self.transfer_progress = None;
    }

    /// Sets a handler for the transport's verbose debug stream; setting one
    /// switches the transfer to verbose mode.
    pub fn set_debug_info_handler<F>(&mut self, handler: F)
    where
        F: Fn(DebugInfoType, &[u8]) + Send + Sync + 'static,
    {
        self.debug_info = Some(Arc::new(handler));
    }

    /// Removes the debug info handler.
    pub fn clear_debug_info_handler(&mut self) {
        self.debug_info = None;
    }

    pub(crate) fn transfer_progress_handler(&self) -> Option<&TransferProgressHandler> {
        self.transfer_progress.as_ref()
    }

    pub(crate) fn debug_info_handler(&self) -> Option<&DebugInfoHandler> {
        self.debug_info.as_ref()
    }

    pub(crate) fn set_completion(&mut self, sink: CompletionSink) {
        self.completion = sink;
    }

    pub(crate) fn take_completion(&mut self) -> CompletionSink {
        std::mem::replace(&mut self.completion, CompletionSink::None)
    }
}

impl Clone for Request {
    /// Clones everything except the completion sink; the clone is not armed
    /// to notify anyone.
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            method: self.method,
            version: self.version,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            happy_eyeballs_timeout: self.happy_eyeballs_timeout,
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
            verify_ssl_peer: self.verify_ssl_peer,
            verify_ssl_host: self.verify_ssl_host,
            verify_ssl_status: self.verify_ssl_status,
            ssl_cert: self.ssl_cert.clone(),
            ssl_cert_type: self.ssl_cert_type,
            ssl_key: self.ssl_key.clone(),
            key_password: self.key_password.clone(),
            proxy: self.proxy.clone(),
            accept_encodings: self.accept_encodings.clone(),
            resolve_hosts: self.resolve_hosts.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            mime_fields: self.mime_fields.clone(),
            transfer_progress: self.transfer_progress.clone(),
            debug_info: self.debug_info.clone(),
            completion: CompletionSink::None,
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("follow_redirects", &self.follow_redirects)
            .field("max_redirects", &self.max_redirects)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::MimeField;

    #[test]
    fn body_then_mime_fails_fast() {
        let mut request = Request::new("http://localhost:80/", None);
        request.set_body("name=value").unwrap();

        let err = request
            .add_mime_field(MimeField::value("name", "value"))
            .unwrap_err();
        assert!(err.is_builder());
    }

    #[test]
    fn mime_then_body_fails_fast() {
        let mut request = Request::new("http://localhost:80/", None);
        request
            .add_mime_field(MimeField::value("name", "value"))
            .unwrap();

        let err = request.set_body("name=value").unwrap_err();
        assert!(err.is_builder());
    }

    #[test]
    fn body_switches_method_to_post() {
        let mut request = Request::new("http://localhost:80/", None);
        assert_eq!(request.method(), Method::Get);
        request.set_body("data").unwrap();
        assert_eq!(request.method(), Method::Post);

        let mut put = Request::new("http://localhost:80/", None);
        put.set_method(Method::Put);
        put.set_body("data").unwrap();
        assert_eq!(put.method(), Method::Put);
    }

    #[test]
    fn redirect_flag_plumbs_max_redirects() {
        let mut request = Request::new("http://localhost:80/", None);
        assert!(request.follow_redirects());
        assert_eq!(request.max_redirects(), -1);

        request.set_follow_redirects(true, Some(10));
        assert_eq!(request.max_redirects(), 10);

        request.set_follow_redirects(false, Some(10));
        assert!(!request.follow_redirects());
        assert_eq!(request.max_redirects(), 0);

        request.set_follow_redirects(true, None);
        assert_eq!(request.max_redirects(), -1);
    }

    #[test]
    fn remove_header_stores_empty_value() {
        let mut request = Request::new("http://localhost:80/", None);
        request.remove_header("Expect");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()[0].data(), "Expect: ");
    }

    #[test]
    fn clone_disarms_completion() {
        let mut request = Request::new("http://localhost:80/", None);
        let (tx, _rx) = oneshot::channel();
        request.set_completion(CompletionSink::Promise(tx));

        let clone = request.clone();
        assert!(matches!(
            request.take_completion(),
            CompletionSink::Promise(_)
        ));

        let mut clone = clone;
        assert!(matches!(clone.take_completion(), CompletionSink::None));
    }

    #[test]
    fn accept_encoding_all_available_is_empty_list() {
        let mut request = Request::new("http://localhost:80/", None);
        assert!(request.accept_encodings().is_none());
        request.accept_encoding_all_available();
        assert_eq!(request.accept_encodings(), Some(&[][..]));
    }
}

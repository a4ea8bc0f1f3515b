//! HTTP wire-boundary enums.
//!
//! Every enum here converts to and from its wire string form. Unrecognized
//! input never fails, it maps to the `Unknown` variant of the enum instead so
//! responses with exotic values still surface to the caller.

use std::fmt;

/// The HTTP method a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET, the default.
    Get,
    /// HEAD, requests the headers of a resource without its body.
    Head,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
    /// CONNECT.  The transport only establishes the connection.
    Connect,
    /// OPTIONS.
    Options,
    /// PATCH.
    Patch,
    /// Any unrecognized method string maps here.
    Unknown,
}

impl Method {
    /// The method as its wire string, e.g. `"GET"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Unknown => "unknown",
        }
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "CONNECT" => Method::Connect,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            _ => Method::Unknown,
        }
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::Get
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTTP version a request should use, or a response arrived with.
///
/// Some liberty is taken on the string forms where they don't match any
/// specification, e.g. `"HTTP/Best"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Use the best version available.
    UseBest,
    /// HTTP 1.0.
    Http10,
    /// HTTP 1.1.
    Http11,
    /// Attempt HTTP 2 but fallback to 1.1 on failure.
    Http2,
    /// Attempt HTTP 2 over TLS (HTTPS) but fallback to 1.1 on failure.
    Http2Tls,
    /// HTTP 2 with prior knowledge and no fallback to 1.1.
    Http2Only,
    /// Any unrecognized version maps here.
    Unknown,
}

impl Version {
    /// The version as a string, e.g. `"HTTP/1.1"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::UseBest => "HTTP/Best",
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
            Version::Http2 => "HTTP/2.0",
            Version::Http2Tls => "HTTP/2.0-TLS",
            Version::Http2Only => "HTTP/2.0-only",
            Version::Unknown => "HTTP/unknown",
        }
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        match value {
            "HTTP/Best" => Version::UseBest,
            "HTTP/1.0" => Version::Http10,
            "HTTP/1.1" => Version::Http11,
            "HTTP/2" | "HTTP/2.0" => Version::Http2,
            "HTTP/2.0-TLS" => Version::Http2Tls,
            "HTTP/2.0-only" => Version::Http2Only,
            _ => Version::Unknown,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::UseBest
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP response status codes.
///
/// Covers every standard code from the IANA registry; anything else maps to
/// [`StatusCode::HttpUnknown`]. For known codes the integer conversion round
/// trips: `StatusCode::from_u16(sc.as_u16()) == sc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum StatusCode {
    HttpUnknown = 0,

    Http100Continue = 100,
    Http101SwitchingProtocols = 101,
    Http102Processing = 102,
    Http103EarlyHints = 103,

    Http200Ok = 200,
    Http201Created = 201,
    Http202Accepted = 202,
    Http203NonAuthoritativeInformation = 203,
    Http204NoContent = 204,
    Http205ResetContent = 205,
    Http206PartialContent = 206,
    Http207MultiStatus = 207,
    Http208AlreadyReported = 208,
    Http226ImUsed = 226,

    Http300MultipleChoices = 300,
    Http301MovedPermanently = 301,
    Http302Found = 302,
    Http303SeeOther = 303,
    Http304NotModified = 304,
    Http305UseProxy = 305,
    // 306 is unused and reserved per RFC 7231 section 6.4.6 but originally
    // meant 'switch proxy', kept for backwards compatibility.
    Http306SwitchProxy = 306,
    Http307TemporaryRedirect = 307,
    Http308PermanentRedirect = 308,

    Http400BadRequest = 400,
    Http401Unauthorized = 401,
    Http402PaymentRequired = 402,
    Http403Forbidden = 403,
    Http404NotFound = 404,
    Http405MethodNotAllowed = 405,
    Http406NotAcceptable = 406,
    Http407ProxyAuthenticationRequired = 407,
    Http408RequestTimeout = 408,
    Http409Conflict = 409,
    Http410Gone = 410,
    Http411LengthRequired = 411,
    Http412PreconditionFailed = 412,
    Http413PayloadTooLarge = 413,
    Http414UriTooLong = 414,
    Http415UnsupportedMediaType = 415,
    Http416RangeNotSatisfiable = 416,
    Http417ExpectationFailed = 417,
    Http418ImATeapot = 418,
    Http421MisdirectedRequest = 421,
    Http422UnprocessableEntity = 422,
    Http423Locked = 423,
    Http424FailedDependency = 424,
    Http425TooEarly = 425,
    Http426UpgradeRequired = 426,
    Http428PreconditionRequired = 428,
    Http429TooManyRequests = 429,
    Http431RequestHeaderFieldsTooLarge = 431,
    Http451UnavailableForLegalReasons = 451,

    Http500InternalServerError = 500,
    Http501NotImplemented = 501,
    Http502BadGateway = 502,
    Http503ServiceUnavailable = 503,
    Http504GatewayTimeout = 504,
    Http505HttpVersionNotSupported = 505,
    Http506VariantAlsoNegotiates = 506,
    Http507InsufficientStorage = 507,
    Http508LoopDetected = 508,
    Http510NotExtended = 510,
    Http511NetworkAuthenticationRequired = 511,
}

impl StatusCode {
    /// Converts an integer status code into the enum, `HttpUnknown` if the
    /// value isn't a known status code.
    pub fn from_u16(code: u16) -> StatusCode {
        match code {
            100 => StatusCode::Http100Continue,
            101 => StatusCode::Http101SwitchingProtocols,
            102 => StatusCode::Http102Processing,
            103 => StatusCode::Http103EarlyHints,

            200 => StatusCode::Http200Ok,
            201 => StatusCode::Http201Created,
            202 => StatusCode::Http202Accepted,
            203 => StatusCode::Http203NonAuthoritativeInformation,
            204 => StatusCode::Http204NoContent,
            205 => StatusCode::Http205ResetContent,
            206 => StatusCode::Http206PartialContent,
            207 => StatusCode::Http207MultiStatus,
            208 => StatusCode::Http208AlreadyReported,
            226 => StatusCode::Http226ImUsed,

            300 => StatusCode::Http300MultipleChoices,
            301 => StatusCode::Http301MovedPermanently,
            302 => StatusCode::Http302Found,
            303 => StatusCode::Http303SeeOther,
            304 => StatusCode::Http304NotModified,
            305 => StatusCode::Http305UseProxy,
            306 => StatusCode::Http306SwitchProxy,
            307 => StatusCode::Http307TemporaryRedirect,
            308 => StatusCode::Http308PermanentRedirect,

            400 => StatusCode::Http400BadRequest,
            401 => StatusCode::Http401Unauthorized,
            402 => StatusCode::Http402PaymentRequired,
            403 => StatusCode::Http403Forbidden,
            404 => StatusCode::Http404NotFound,
            405 => StatusCode::Http405MethodNotAllowed,
            406 => StatusCode::Http406NotAcceptable,
            407 => StatusCode::Http407ProxyAuthenticationRequired,
            408 => StatusCode::Http408RequestTimeout,
            409 => StatusCode::Http409Conflict,
            410 => StatusCode::Http410Gone,
            411 => StatusCode::Http411LengthRequired,
            412 => StatusCode::Http412PreconditionFailed,
            413 => StatusCode::Http413PayloadTooLarge,
            414 => StatusCode::Http414UriTooLong,
            415 => StatusCode::Http415UnsupportedMediaType,
            416 => StatusCode::Http416RangeNotSatisfiable,
            417 => StatusCode::Http417ExpectationFailed,
            418 => StatusCode::Http418ImATeapot,
            421 => StatusCode::Http421MisdirectedRequest,
            422 => StatusCode::Http422UnprocessableEntity,
            423 => StatusCode::Http423Locked,
            424 => StatusCode::Http424FailedDependency,
            425 => StatusCode::Http425TooEarly,
            426 => StatusCode::Http426UpgradeRequired,
            428 => StatusCode::Http428PreconditionRequired,
            429 => StatusCode::Http429TooManyRequests,
            431 => StatusCode::Http431RequestHeaderFieldsTooLarge,
            451 => StatusCode::Http451UnavailableForLegalReasons,

            500 => StatusCode::Http500InternalServerError,
            501 => StatusCode::Http501NotImplemented,
            502 => StatusCode::Http502BadGateway,
            503 => StatusCode::Http503ServiceUnavailable,
            504 => StatusCode::Http504GatewayTimeout,
            505 => StatusCode::Http505HttpVersionNotSupported,
            506 => StatusCode::Http506VariantAlsoNegotiates,
            507 => StatusCode::Http507InsufficientStorage,
            508 => StatusCode::Http508LoopDetected,
            510 => StatusCode::Http510NotExtended,
            511 => StatusCode::Http511NetworkAuthenticationRequired,

            _ => StatusCode::HttpUnknown,
        }
    }

    /// The integer value of the status code, `0` for `HttpUnknown`.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// The code with its canonical reason phrase, e.g. `"200 OK"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::HttpUnknown => "unknown",

            StatusCode::Http100Continue => "100 Continue",
            StatusCode::Http101SwitchingProtocols => "101 Switching Protocols",
            StatusCode::Http102Processing => "102 Processing",
            StatusCode::Http103EarlyHints => "103 Early Hints",

            StatusCode::Http200Ok => "200 OK",
            StatusCode::Http201Created => "201 Created",
            StatusCode::Http202Accepted => "202 Accepted",
            StatusCode::Http203NonAuthoritativeInformation => "203 Non-Authoritative Information",
            StatusCode::Http204NoContent => "204 No Content",
            StatusCode::Http205ResetContent => "205 Reset Content",
            StatusCode::Http206PartialContent => "206 Partial Content",
            StatusCode::Http207MultiStatus => "207 Multi-Status",
            StatusCode::Http208AlreadyReported => "208 Already Reported",
            StatusCode::Http226ImUsed => "226 IM Used",

            StatusCode::Http300MultipleChoices => "300 Multiple Choices",
            StatusCode::Http301MovedPermanently => "301 Moved Permanently",
            StatusCode::Http302Found => "302 Found",
            StatusCode::Http303SeeOther => "303 See Other",
            StatusCode::Http304NotModified => "304 Not Modified",
            StatusCode::Http305UseProxy => "305 Use Proxy",
            StatusCode::Http306SwitchProxy => "306 Switch Proxy",
            StatusCode::Http307TemporaryRedirect => "307 Temporary Redirect",
            StatusCode::Http308PermanentRedirect => "308 Permanent Redirect",

            StatusCode::Http400BadRequest => "400 Bad Request",
            StatusCode::Http401Unauthorized => "401 Unauthorized",
            StatusCode::Http402PaymentRequired => "402 Payment Required",
            StatusCode::Http403Forbidden => "403 Forbidden",
            StatusCode::Http404NotFound => "404 Not Found",
            StatusCode::Http405MethodNotAllowed => "405 Method Not Allowed",
            StatusCode::Http406NotAcceptable => "406 Not Acceptable",
            StatusCode::Http407ProxyAuthenticationRequired => "407 Proxy Authentication Required",
            StatusCode::Http408RequestTimeout => "408 Request Timeout",
            StatusCode::Http409Conflict => "409 Conflict",
            StatusCode::Http410Gone => "410 Gone",
            StatusCode::Http411LengthRequired => "411 Length Required",
            StatusCode::Http412PreconditionFailed => "412 Precondition Failed",
            StatusCode::Http413PayloadTooLarge => "413 Payload Too Large",
            StatusCode::Http414UriTooLong => "414 URI Too Long",
            StatusCode::Http415UnsupportedMediaType => "415 Unsupported Media Type",
            StatusCode::Http416RangeNotSatisfiable => "416 Range Not Satisfiable",
            StatusCode::Http417ExpectationFailed => "417 Expectation Failed",
            StatusCode::Http418ImATeapot => "418 I'm a teapot",
            StatusCode::Http421MisdirectedRequest => "421 Misdirected Request",
            StatusCode::Http422UnprocessableEntity => "422 Unprocessable Entity",
            StatusCode::Http423Locked => "423 Locked",
            StatusCode::Http424FailedDependency => "424 Failed Dependency",
            StatusCode::Http425TooEarly => "425 Too Early",
            StatusCode::Http426UpgradeRequired => "426 Upgrade Required",
            StatusCode::Http428PreconditionRequired => "428 Precondition Required",
            StatusCode::Http429TooManyRequests => "429 Too Many Requests",
            StatusCode::Http431RequestHeaderFieldsTooLarge => "431 Request Header Fields Too Large",
            StatusCode::Http451UnavailableForLegalReasons => "451 Unavailable For Legal Reasons",

            StatusCode::Http500InternalServerError => "500 Internal Server Error",
            StatusCode::Http501NotImplemented => "501 Not Implemented",
            StatusCode::Http502BadGateway => "502 Bad Gateway",
            StatusCode::Http503ServiceUnavailable => "503 Service Unavailable",
            StatusCode::Http504GatewayTimeout => "504 Gateway Timeout",
            StatusCode::Http505HttpVersionNotSupported => "505 HTTP Version Not Supported",
            StatusCode::Http506VariantAlsoNegotiates => "506 Variant Also Negotiates",
            StatusCode::Http507InsufficientStorage => "507 Insufficient Storage",
            StatusCode::Http508LoopDetected => "508 Loop Detected",
            StatusCode::Http510NotExtended => "510 Not Extended",
            StatusCode::Http511NetworkAuthenticationRequired => {
                "511 Network Authentication Required"
            }
        }
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::HttpUnknown
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP `Content-Type` values.
///
/// A convenience table for composing requests; the library does not parse
/// these from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ContentType {
    Unknown,

    NoContent,

    TextCss,
    TextCsv,
    TextHtml,
    TextPlain,
    TextXml,

    ImageGif,
    ImageJpeg,
    ImagePng,
    ImageTiff,
    ImageXIcon,
    ImageSvgXml,

    VideoMpeg,
    VideoMp4,
    VideoXFlv,
    VideoWebm,

    MultipartMixed,
    MultipartAlternative,
    MultipartRelated,
    MultipartFormData,

    AudioMpeg,
    AudioXMsWma,
    AudioXWav,

    ApplicationJavascript,
    ApplicationOctetStream,
    ApplicationOgg,
    ApplicationPdf,
    ApplicationXhtmlXml,
    ApplicationXShockwaveFlash,
    ApplicationJson,
    ApplicationLdJson,
    ApplicationXml,
    ApplicationZip,
    ApplicationXWwwFormUrlencoded,
}

impl ContentType {
    /// The content type as its wire string, e.g. `"application/json"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Unknown => "unknown",
            ContentType::NoContent => "",

            ContentType::TextCss => "text/css",
            ContentType::TextCsv => "text/csv",
            ContentType::TextHtml => "text/html",
            ContentType::TextPlain => "text/plain",
            ContentType::TextXml => "text/xml",

            ContentType::ImageGif => "image/gif",
            ContentType::ImageJpeg => "image/jpeg",
            ContentType::ImagePng => "image/png",
            ContentType::ImageTiff => "image/tiff",
            ContentType::ImageXIcon => "image/x-icon",
            ContentType::ImageSvgXml => "image/svg+xml",

            ContentType::VideoMpeg => "video/mpeg",
            ContentType::VideoMp4 => "video/mp4",
            ContentType::VideoXFlv => "video/x-flv",
            ContentType::VideoWebm => "video/webm",

            ContentType::MultipartMixed => "multipart/mixed",
            ContentType::MultipartAlternative => "multipart/alternative",
            ContentType::MultipartRelated => "multipart/related",
            ContentType::MultipartFormData => "multipart/form-data",

            ContentType::AudioMpeg => "audio/mpeg",
            ContentType::AudioXMsWma => "audio/x-ms-wma",
            ContentType::AudioXWav => "audio/x-wav",

            ContentType::ApplicationJavascript => "application/javascript",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::ApplicationOgg => "application/ogg",
            ContentType::ApplicationPdf => "application/pdf",
            ContentType::ApplicationXhtmlXml => "application/xhtml+xml",
            ContentType::ApplicationXShockwaveFlash => "application/x-shockwave-flash",
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationLdJson => "application/ld+json",
            ContentType::ApplicationXml => "application/xml",
            ContentType::ApplicationZip => "application/zip",
            ContentType::ApplicationXWwwFormUrlencoded => "application/x-www-form-urlencoded",
        }
    }
}

impl From<&str> for ContentType {
    fn from(value: &str) -> Self {
        match value {
            "" => ContentType::NoContent,

            "text/css" => ContentType::TextCss,
            "text/csv" => ContentType::TextCsv,
            "text/html" => ContentType::TextHtml,
            "text/plain" => ContentType::TextPlain,
            "text/xml" => ContentType::TextXml,

            "image/gif" => ContentType::ImageGif,
            "image/jpeg" => ContentType::ImageJpeg,
            "image/png" => ContentType::ImagePng,
            "image/tiff" => ContentType::ImageTiff,
            "image/x-icon" => ContentType::ImageXIcon,
            "image/svg+xml" => ContentType::ImageSvgXml,

            "video/mpeg" => ContentType::VideoMpeg,
            "video/mp4" => ContentType::VideoMp4,
            "video/x-flv" => ContentType::VideoXFlv,
            "video/webm" => ContentType::VideoWebm,

            "multipart/mixed" => ContentType::MultipartMixed,
            "multipart/alternative" => ContentType::MultipartAlternative,
            "multipart/related" => ContentType::MultipartRelated,
            "multipart/form-data" => ContentType::MultipartFormData,

            "audio/mpeg" => ContentType::AudioMpeg,
            "audio/x-ms-wma" => ContentType::AudioXMsWma,
            "audio/x-wav" => ContentType::AudioXWav,

            "application/javascript" => ContentType::ApplicationJavascript,
            "application/octet-stream" => ContentType::ApplicationOctetStream,
            "application/ogg" => ContentType::ApplicationOgg,
            "application/pdf" => ContentType::ApplicationPdf,
            "application/xhtml+xml" => ContentType::ApplicationXhtmlXml,
            "application/x-shockwave-flash" => ContentType::ApplicationXShockwaveFlash,
            "application/json" => ContentType::ApplicationJson,
            "application/ld+json" => ContentType::ApplicationLdJson,
            "application/xml" => ContentType::ApplicationXml,
            "application/zip" => ContentType::ApplicationZip,
            "application/x-www-form-urlencoded" => ContentType::ApplicationXWwwFormUrlencoded,

            _ => ContentType::Unknown,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP `Connection` header values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// `close`
    Close,
    /// `keep-alive`
    KeepAlive,
    /// `upgrade`
    Upgrade,
    /// Any unrecognized connection value maps here.
    Unknown,
}

impl ConnectionType {
    /// The connection type as its wire string, e.g. `"keep-alive"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Close => "close",
            ConnectionType::KeepAlive => "keep-alive",
            ConnectionType::Upgrade => "upgrade",
            ConnectionType::Unknown => "unknown",
        }
    }
}

impl From<&str> for ConnectionType {
    fn from(value: &str) -> Self {
        match value {
            "close" => ConnectionType::Close,
            "keep-alive" => ConnectionType::KeepAlive,
            "upgrade" => ConnectionType::Upgrade,
            _ => ConnectionType::Unknown,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! # lift
//!
//! A safe and easy to use asynchronous HTTP client library powered by
//! libcurl.
//!
//! - Synchronous single requests driven on the calling thread
//! - Asynchronous execution of very large request batches on one background
//!   reactor thread per [`Client`]
//! - Two-tier timeouts: a per-request deadline plus a longer connect budget
//! - Connection, DNS and TLS session reuse across clients via [`Share`]
//! - DNS overrides, proxies, TLS client certificates, transfer progress
//!   callbacks
//! - Completion delivery through one-shot futures or callbacks
//!
//! ## Synchronous requests
//!
//! ```rust,no_run
//! use lift::Request;
//!
//! let request = Request::new("http://www.example.com", None);
//! let response = request.perform(None);
//!
//! println!("{}", response.lift_status());
//! for header in response.headers() {
//!     println!("{header}");
//! }
//! ```
//!
//! ## Asynchronous requests
//!
//! A [`Client`] owns a background event loop that multiplexes every request
//! submitted to it. Ownership of a [`Request`] transfers into the client and
//! comes back through the completion sink, either a future:
//!
//! ```rust,no_run
//! use lift::{Client, Request};
//!
//! # fn main() -> Result<(), lift::Error> {
//! let client = Client::builder().build()?;
//!
//! let future = client.start_request(Request::new("http://www.example.com", None));
//! let (request, response) = futures::executor::block_on(future);
//! println!("{} -> {}", request.url(), response.lift_status());
//! # Ok(())
//! # }
//! ```
//!
//! or a callback invoked on the client's reactor thread:
//!
//! ```rust,no_run
//! use lift::{Client, Request};
//!
//! # fn main() -> Result<(), lift::Error> {
//! let client = Client::builder().build()?;
//!
//! client.start_request_with_callback(
//!     Request::new("http://www.example.com", None),
//!     |request, response| {
//!         println!("{} -> {}", request.url(), response.lift_status());
//!     },
//! );
//!
//! while !client.is_empty() {
//!     std::thread::yield_now();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Keep callbacks light: they run on the reactor thread and heavy work there
//! stalls every other in-flight transfer.
//!
//! ## Timeouts
//!
//! A request may carry a total timeout and a connect timeout. On a client,
//! when the effective connect budget exceeds the total timeout the user
//! observes the timeout at the total value (a synthetic `504` response with
//! [`LiftStatus::Timeout`]) while the transport quietly finishes winding the
//! connection down within the connect budget, keeping it available for
//! later requests. Without any timeout a request can block forever.

mod client;
mod client_pool;
mod error;
mod escape;
mod executor;
mod header;
mod init;
mod mime;
mod proxy;
mod query_builder;
mod request;
mod resolve;
mod response;
mod share;
mod status;
mod timeout;

pub mod http;

pub use self::client::{Client, ClientBuilder, ResponseFuture, ThreadEventHandler};
pub use self::client_pool::{ClientPool, ClientPoolBuilder};
pub use self::error::{Error, Result};
pub use self::escape::{escape, unescape, unescape_recurse};
pub use self::header::Header;
pub use self::http::{ConnectionType, ContentType, Method, StatusCode, Version};
pub use self::init::{global_cleanup, global_init, GlobalScopeGuard};
pub use self::mime::{MimeField, MimeFieldSource};
pub use self::proxy::{HttpAuthType, ProxyData, ProxyType};
pub use self::query_builder::QueryBuilder;
pub use self::request::{
    DebugInfoHandler, DebugInfoType, Request, SslCertType, TransferProgress,
    TransferProgressHandler,
};
pub use self::resolve::ResolveHost;
pub use self::response::Response;
pub use self::share::{Share, ShareOptions};
pub use self::status::LiftStatus;

//! Sharing of DNS, TLS session and connection state across requests.
//!
//! The safe transport bindings do not cover the share interface, so this
//! module talks to `curl-sys` directly. The transport calls back into
//! [`lock_callback`]/[`unlock_callback`] around every access to a shared
//! resource; each lockable resource class maps to its own mutex so
//! independent resources do not serialize.

use std::fmt;
use std::ops::BitOr;
use std::os::raw::{c_int, c_void};
use std::sync::Arc;

use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;

use crate::error::Error;
use crate::init;

/// The resource classes a [`Share`] carries across requests.
///
/// Options combine with `|`:
///
/// ```
/// use lift::ShareOptions;
///
/// let opts = ShareOptions::DNS | ShareOptions::SSL;
/// assert!(opts.contains(ShareOptions::DNS));
/// assert!(!opts.contains(ShareOptions::DATA));
/// assert_eq!(ShareOptions::DNS | ShareOptions::SSL | ShareOptions::DATA, ShareOptions::ALL);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareOptions(u64);

impl ShareOptions {
    /// Share nothing across requests.
    pub const NOTHING: ShareOptions = ShareOptions(0);
    /// Share DNS information across requests.
    pub const DNS: ShareOptions = ShareOptions(1 << 1);
    /// Share SSL session information across requests.
    pub const SSL: ShareOptions = ShareOptions(1 << 2);
    /// Share the connection pool across requests.
    pub const DATA: ShareOptions = ShareOptions(1 << 3);
    /// Share all available resource classes.
    pub const ALL: ShareOptions =
        ShareOptions(Self::DNS.0 | Self::SSL.0 | Self::DATA.0);

    /// Returns true if every class in `other` is enabled in `self`.
    pub fn contains(&self, other: ShareOptions) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for ShareOptions {
    type Output = ShareOptions;

    fn bitor(self, rhs: ShareOptions) -> ShareOptions {
        ShareOptions(self.0 | rhs.0)
    }
}

// One mutex per curl lock-data class. curl currently defines seven classes;
// anything newer the linked library reports is clamped onto the last slot.
const LOCK_CLASSES: usize = 8;

struct Inner {
    raw: *mut curl_sys::CURLSH,
    locks: [RawMutex; LOCK_CLASSES],
}

// The raw share handle is only ever mutated by the transport, which brackets
// every access with lock_callback/unlock_callback on the mutexes below.
unsafe impl Send for Inner {}
unsafe impl Sync for Inner {}

impl Drop for Inner {
    fn drop(&mut self) {
        unsafe {
            curl_sys::curl_share_cleanup(self.raw);
        }
        init::global_cleanup();
    }
}

extern "C" fn lock_callback(
    _handle: *mut curl_sys::CURL,
    data: c_int,
    _access: c_int,
    user_ptr: *mut c_void,
) {
    let inner = unsafe { &*(user_ptr as *const Inner) };
    inner.locks[(data as usize).min(LOCK_CLASSES - 1)].lock();
}

extern "C" fn unlock_callback(_handle: *mut curl_sys::CURL, data: c_int, user_ptr: *mut c_void) {
    let inner = unsafe { &*(user_ptr as *const Inner) };
    unsafe {
        inner.locks[(data as usize).min(LOCK_CLASSES - 1)].unlock();
    }
}

/// A reference-counted carrier of DNS cache, TLS session cache and connection
/// pool state.
///
/// A `Share` can be mounted into any number of [`Client`]s and synchronous
/// [`Request::perform`] calls concurrently and may outlive all of them.
/// Cloning is cheap and every clone refers to the same underlying state.
///
/// [`Client`]: crate::Client
/// [`Request::perform`]: crate::Request::perform
#[derive(Clone)]
pub struct Share {
    inner: Arc<Inner>,
}

impl Share {
    /// Creates a share carrying the given resource classes.
    pub fn new(options: ShareOptions) -> crate::Result<Share> {
        init::global_init();

        let raw = unsafe { curl_sys::curl_share_init() };
        if raw.is_null() {
            init::global_cleanup();
            return Err(Error::client("curl_share_init returned null"));
        }

        let inner = Arc::new(Inner {
            raw,
            locks: [RawMutex::INIT; LOCK_CLASSES],
        });

        unsafe {
            curl_sys::curl_share_setopt(
                raw,
                curl_sys::CURLSHOPT_LOCKFUNC,
                lock_callback as extern "C" fn(*mut curl_sys::CURL, c_int, c_int, *mut c_void),
            );
            curl_sys::curl_share_setopt(
                raw,
                curl_sys::CURLSHOPT_UNLOCKFUNC,
                unlock_callback as extern "C" fn(*mut curl_sys::CURL, c_int, *mut c_void),
            );
            curl_sys::curl_share_setopt(
                raw,
                curl_sys::CURLSHOPT_USERDATA,
                Arc::as_ptr(&inner) as *mut c_void,
            );

            if options == ShareOptions::NOTHING {
                curl_sys::curl_share_setopt(
                    raw,
                    curl_sys::CURLSHOPT_SHARE,
                    curl_sys::CURL_LOCK_DATA_NONE,
                );
            } else {
                if options.contains(ShareOptions::DNS) {
                    curl_sys::curl_share_setopt(
                        raw,
                        curl_sys::CURLSHOPT_SHARE,
                        curl_sys::CURL_LOCK_DATA_DNS,
                    );
                }
                if options.contains(ShareOptions::SSL) {
                    curl_sys::curl_share_setopt(
                        raw,
                        curl_sys::CURLSHOPT_SHARE,
                        curl_sys::CURL_LOCK_DATA_SSL_SESSION,
                    );
                }
                if options.contains(ShareOptions::DATA) {
                    curl_sys::curl_share_setopt(
                        raw,
                        curl_sys::CURLSHOPT_SHARE,
                        curl_sys::CURL_LOCK_DATA_CONNECT,
                    );
                }
            }
        }

        Ok(Share { inner })
    }

    /// The raw share handle, installed on easy handles at prepare time.
    pub(crate) fn raw(&self) -> *mut curl_sys::CURLSH {
        self.inner.raw
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Share").finish_non_exhaustive()
    }
}

//! Process-wide transport initialization.
//!
//! The transport's global init must run before any handle is created and is
//! not thread safe, so a single refcount behind a mutex funnels every
//! init/cleanup pair through here. The first acquire performs the real
//! initialization; the matching teardown is delegated to the transport
//! bindings, which pin their global state for the process lifetime.

use once_cell::sync::Lazy;
use std::sync::Mutex;

static INIT_REFCOUNT: Lazy<Mutex<u64>> = Lazy::new(|| Mutex::new(0));

/// Acquires one reference on the process-wide transport state, initializing
/// the transport on the first acquire.
///
/// Every [`Client`](crate::Client) and synchronous
/// [`Request::perform`](crate::Request::perform) acquires this internally;
/// calling it by hand is only needed when embedding the library somewhere
/// with exotic startup ordering. Prefer [`GlobalScopeGuard`] in `main`.
pub fn global_init() {
    let mut count = INIT_REFCOUNT.lock().unwrap();
    if *count == 0 {
        curl::init();
    }
    *count += 1;
}

/// Releases one reference acquired by [`global_init`].
pub fn global_cleanup() {
    let mut count = INIT_REFCOUNT.lock().unwrap();
    *count = count.saturating_sub(1);
}

/// RAII holder of one process-wide init reference, for use at the top of
/// `main` so the transport stays initialized for the program's lifetime.
#[derive(Debug)]
pub struct GlobalScopeGuard {
    _private: (),
}

impl GlobalScopeGuard {
    /// Acquires the process-wide init reference.
    pub fn new() -> Self {
        global_init();
        GlobalScopeGuard { _private: () }
    }
}

impl Default for GlobalScopeGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GlobalScopeGuard {
    fn drop(&mut self) {
        global_cleanup();
    }
}

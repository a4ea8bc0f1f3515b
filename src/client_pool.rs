use std::sync::atomic::{AtomicUsize, Ordering};

use crate::client::{Client, ResponseFuture, ThreadEventHandler};
use crate::request::Request;
use crate::response::Response;

/// A builder for [`ClientPool`] options.
#[derive(Default)]
pub struct ClientPoolBuilder {
    client_count: Option<usize>,
    on_thread_event: Option<ThreadEventHandler>,
}

impl ClientPoolBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of clients to spin up in the pool, two by default.
    pub fn client_count(mut self, count: usize) -> Self {
        self.client_count = Some(count);
        self
    }

    /// Installs a hook called on each client's reactor thread when it starts
    /// and again when it stops.
    pub fn on_thread_event<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_thread_event = Some(std::sync::Arc::new(handler));
        self
    }

    /// Spawns the pool's clients.
    pub fn build(self) -> crate::Result<ClientPool> {
        let count = self.client_count.unwrap_or(2).max(1);

        let mut clients = Vec::with_capacity(count);
        for _ in 0..count {
            let mut builder = Client::builder();
            if let Some(hook) = &self.on_thread_event {
                let hook = hook.clone();
                builder = builder.on_thread_event(move || hook());
            }
            clients.push(builder.build()?);
        }

        Ok(ClientPool {
            index: AtomicUsize::new(0),
            clients,
        })
    }
}

impl std::fmt::Debug for ClientPoolBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ClientPoolBuilder")
            .field("client_count", &self.client_count)
            .finish_non_exhaustive()
    }
}

/// A round-robin pool of [`Client`]s.
///
/// Spreads submissions across several reactor threads for workloads where a
/// single event loop becomes the bottleneck. Each submission is handed to
/// the next client in rotation.
#[derive(Debug)]
pub struct ClientPool {
    index: AtomicUsize,
    clients: Vec<Client>,
}

impl ClientPool {
    /// Creates a pool with default options.
    ///
    /// # Panics
    ///
    /// Panics if a background reactor cannot be spawned; use
    /// [`ClientPool::builder`] to handle the failure instead.
    pub fn new() -> ClientPool {
        Self::builder().build().expect("ClientPool::new()")
    }

    /// Creates a [`ClientPoolBuilder`] to configure a pool.
    pub fn builder() -> ClientPoolBuilder {
        ClientPoolBuilder::new()
    }

    /// Stops every client in the pool from accepting new requests; existing
    /// requests keep processing until they complete.
    pub fn stop(&self) {
        for client in &self.clients {
            client.stop();
        }
    }

    /// The number of requests currently pending or executing across the
    /// whole pool.
    pub fn size(&self) -> usize {
        self.clients.iter().map(Client::size).sum()
    }

    /// True if no requests are pending or executing in any client.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Starts processing the given request on the next client in rotation.
    pub fn start_request(&self, request: Request) -> ResponseFuture {
        self.next_client().start_request(request)
    }

    /// Starts processing the given request on the next client in rotation,
    /// invoking `callback` on that client's reactor thread on completion.
    pub fn start_request_with_callback<F>(&self, request: Request, callback: F)
    where
        F: FnOnce(Request, Response) + Send + 'static,
    {
        self.next_client().start_request_with_callback(request, callback)
    }

    /// Starts processing a batch of requests spread across the pool,
    /// returning one future per request in submission order.
    pub fn start_requests<I>(&self, requests: I) -> Vec<ResponseFuture>
    where
        I: IntoIterator<Item = Request>,
    {
        requests
            .into_iter()
            .map(|request| self.start_request(request))
            .collect()
    }

    fn next_client(&self) -> &Client {
        let index = self.index.fetch_add(1, Ordering::AcqRel) % self.clients.len();
        &self.clients[index]
    }
}

impl Default for ClientPool {
    fn default() -> Self {
        Self::new()
    }
}

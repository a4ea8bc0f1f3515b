//! The asynchronous client and its background reactor.
//!
//! A [`Client`] spawns one background thread that drives every submitted
//! request through the transport multiplex. Submissions land in a pending
//! vector under a mutex; the reactor swaps that vector out on each wake so
//! the lock is never held across a transport call (the transport has
//! internal locks of its own and the two could deadlock). Completions are
//! delivered on the reactor thread, so completion callbacks and awaited
//! futures should avoid heavy work or they will stall other transfers.

use std::collections::HashMap;
use std::future::Future;
use std::net::UdpSocket;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::thread;
use std::time::{Duration, Instant};

use curl::multi::{Multi, WaitFd};
use futures_channel::oneshot;

use crate::error::Error;
use crate::executor::Executor;
use crate::init;
use crate::request::{CompletionSink, Request};
use crate::resolve::ResolveHost;
use crate::response::Response;
use crate::share::Share;
use crate::status::LiftStatus;
use crate::timeout::TimeoutQueue;

/// Callback invoked on the reactor thread right after it starts and right
/// before it stops, e.g. to set the thread's priority or name.
pub type ThreadEventHandler = Arc<dyn Fn() + Send + Sync + 'static>;

// How long the reactor sleeps when neither the transport nor the deadline
// index wants to run sooner.
const IDLE_WAIT: Duration = Duration::from_millis(500);

pin_project_lite::pin_project! {
    /// A one-shot future fulfilled with the request and its response when an
    /// asynchronous submission completes.
    ///
    /// The client delivers exactly one completion per submission, including
    /// during shutdown, so this future always resolves.
    ///
    /// # Panics
    ///
    /// Polling panics if the client's reactor thread terminated abnormally
    /// without completing the request; that only happens if the reactor
    /// itself panicked.
    #[derive(Debug)]
    pub struct ResponseFuture {
        #[pin]
        receiver: oneshot::Receiver<(Request, Response)>,
    }
}

impl Future for ResponseFuture {
    type Output = (Request, Response);

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().receiver.poll(cx).map(|result| match result {
            Ok(pair) => pair,
            Err(oneshot::Canceled) => {
                panic!("lift client terminated without completing the request")
            }
        })
    }
}

/// A builder for [`Client`] options.
#[derive(Default)]
pub struct ClientBuilder {
    reserve_connections: usize,
    max_connections: Option<usize>,
    connect_timeout: Option<Duration>,
    resolve_hosts: Vec<ResolveHost>,
    share: Option<Share>,
    on_thread_event: Option<ThreadEventHandler>,
}

impl ClientBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of transport handles to prepare up front so the first
    /// submissions don't allocate.
    pub fn reserve_connections(mut self, count: usize) -> Self {
        self.reserve_connections = count;
        self
    }

    /// The maximum number of connections the client keeps open at any given
    /// time; exceeding it closes the oldest unused connection.
    pub fn max_connections(mut self, count: usize) -> Self {
        self.max_connections = Some(count);
        self
    }

    /// The connect budget applied to every request executed through this
    /// client, unless the request carries its own connect timeout.
    ///
    /// Unlike a per-request value on the synchronous path, this may usefully
    /// be *longer* than a request's total timeout: long tail connects are
    /// allowed to finish in the background while requests on established
    /// keep-alive connections time out quickly.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Adds a `host:port` to ip override applied to every request executed
    /// through this client.
    pub fn resolve_host(mut self, resolve_host: ResolveHost) -> Self {
        self.resolve_hosts.push(resolve_host);
        self
    }

    /// Shares connection, DNS and TLS session state with other clients and
    /// synchronous requests mounting the same [`Share`].
    pub fn share(mut self, share: Share) -> Self {
        self.share = Some(share);
        self
    }

    /// Installs a hook called on the reactor thread when it starts and again
    /// when it stops.
    pub fn on_thread_event<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_thread_event = Some(Arc::new(handler));
        self
    }

    /// Spawns the background reactor and returns the running client.
    ///
    /// The reactor is guaranteed to be accepting submissions by the time
    /// this returns.
    pub fn build(self) -> crate::Result<Client> {
        init::global_init();

        // Loopback socket pair waking the reactor out of its transport poll;
        // the receiving end is registered as an extra poll fd.
        let drain = UdpSocket::bind(("127.0.0.1", 0)).map_err(Error::client)?;
        drain.set_nonblocking(true).map_err(Error::client)?;
        let wake = UdpSocket::bind(("127.0.0.1", 0)).map_err(Error::client)?;
        wake.connect(drain.local_addr().map_err(Error::client)?)
            .map_err(Error::client)?;

        let inner = Arc::new(Inner {
            is_running: AtomicBool::new(false),
            is_stopping: AtomicBool::new(false),
            active_requests: AtomicUsize::new(0),
            pending: Mutex::new(Vec::new()),
            waker: Waker { socket: wake },
        });

        let reactor_inner = Arc::clone(&inner);
        let on_thread_event = self.on_thread_event.clone();
        let config = ReactorConfig {
            reserve_connections: self.reserve_connections,
            max_connections: self.max_connections,
            connect_timeout: self.connect_timeout,
            resolve_hosts: self.resolve_hosts,
            share: self.share,
        };

        let thread = thread::Builder::new()
            .name("lift-client".into())
            .spawn(move || {
                if let Some(hook) = &on_thread_event {
                    hook();
                }

                let mut reactor = Reactor::new(reactor_inner.clone(), config, drain);
                reactor_inner.is_running.store(true, Ordering::Release);
                reactor.run();
                reactor_inner.is_running.store(false, Ordering::Release);

                if let Some(hook) = &on_thread_event {
                    hook();
                }
            })
            .map_err(Error::client)?;

        // Spin until the reactor accepts submissions so callers may submit
        // immediately after the constructor returns.
        while !inner.is_running.load(Ordering::Acquire) {
            if thread.is_finished() {
                return Err(Error::client("reactor thread exited during startup"));
            }
            thread::yield_now();
        }

        Ok(Client {
            inner,
            thread: Some(thread),
        })
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("reserve_connections", &self.reserve_connections)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("resolve_hosts", &self.resolve_hosts)
            .finish_non_exhaustive()
    }
}

/// An asynchronous HTTP client executing many requests simultaneously on a
/// single background reactor thread.
///
/// Submission is thread safe. Ownership of a [`Request`] transfers into the
/// client and returns to the caller with the [`Response`] through the chosen
/// completion sink, either a [`ResponseFuture`] or a callback invoked on the
/// reactor thread.
///
/// Dropping the client blocks until every in-flight request has completed.
///
/// ```no_run
/// use lift::{Client, Request};
///
/// # fn main() -> Result<(), lift::Error> {
/// let client = Client::builder().build()?;
///
/// let future = client.start_request(Request::new("http://localhost:80/", None));
/// let (request, response) = futures::executor::block_on(future);
/// println!("{} -> {}", request.url(), response.lift_status());
/// # Ok(())
/// # }
/// ```
pub struct Client {
    inner: Arc<Inner>,
    thread: Option<thread::JoinHandle<()>>,
}

struct Inner {
    is_running: AtomicBool,
    is_stopping: AtomicBool,
    // Counts pending submissions as well as installed transfers.
    active_requests: AtomicUsize,
    pending: Mutex<Vec<Request>>,
    waker: Waker,
}

struct Waker {
    socket: UdpSocket,
}

impl Waker {
    fn wake(&self) {
        // A lost wake is fine, the reactor polls again within IDLE_WAIT.
        let _ = self.socket.send(&[1]);
    }
}

impl Client {
    /// Creates a client with default options.
    ///
    /// # Panics
    ///
    /// Panics if the background reactor cannot be spawned; use
    /// [`Client::builder`] to handle the failure instead.
    pub fn new() -> Client {
        Self::builder().build().expect("Client::new()")
    }

    /// Creates a [`ClientBuilder`] to configure a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// True while the background reactor is accepting and driving requests.
    pub fn is_running(&self) -> bool {
        self.inner.is_running.load(Ordering::Acquire)
    }

    /// Stops the client from accepting new requests; existing requests keep
    /// processing until they complete.
    ///
    /// This does not block. Requests submitted after this call complete
    /// immediately with [`LiftStatus::ErrorFailedToStart`].
    pub fn stop(&self) {
        self.inner.is_stopping.store(true, Ordering::Release);
        self.inner.waker.wake();
    }

    /// The number of requests currently pending or executing.
    pub fn size(&self) -> usize {
        self.inner.active_requests.load(Ordering::Acquire)
    }

    /// True if no requests are pending or executing.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Starts processing the given request, fulfilling the returned future
    /// when it completes.
    pub fn start_request(&self, mut request: Request) -> ResponseFuture {
        let (sender, receiver) = oneshot::channel();
        request.set_completion(CompletionSink::Promise(sender));
        self.submit(request);
        ResponseFuture { receiver }
    }

    /// Starts processing the given request, invoking `callback` on the
    /// reactor thread when it completes.
    pub fn start_request_with_callback<F>(&self, mut request: Request, callback: F)
    where
        F: FnOnce(Request, Response) + Send + 'static,
    {
        request.set_completion(CompletionSink::Callback(Box::new(callback)));
        self.submit(request);
    }

    /// Starts processing a batch of requests, returning one future per
    /// request in submission order.
    ///
    /// Requests enter the reactor in submission order; completion order
    /// depends on network outcomes.
    pub fn start_requests<I>(&self, requests: I) -> Vec<ResponseFuture>
    where
        I: IntoIterator<Item = Request>,
    {
        let mut futures = Vec::new();
        let mut batch = Vec::new();

        for mut request in requests {
            let (sender, receiver) = oneshot::channel();
            request.set_completion(CompletionSink::Promise(sender));
            futures.push(ResponseFuture { receiver });
            batch.push(request);
        }

        self.submit_all(batch);
        futures
    }

    /// Starts processing a batch of requests, invoking the same `callback`
    /// on the reactor thread as each request completes.
    pub fn start_requests_with_callback<I, F>(&self, requests: I, callback: F)
    where
        I: IntoIterator<Item = Request>,
        F: Fn(Request, Response) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let batch = requests
            .into_iter()
            .map(|mut request| {
                let callback = Arc::clone(&callback);
                request.set_completion(CompletionSink::Callback(Box::new(move |req, resp| {
                    callback(req, resp)
                })));
                request
            })
            .collect();

        self.submit_all(batch);
    }

    fn submit(&self, request: Request) {
        if self.inner.is_stopping.load(Ordering::Acquire) {
            notify_failed_start(request);
            return;
        }

        // Counted before the reactor sees it so size() includes pending
        // submissions.
        self.inner.active_requests.fetch_add(1, Ordering::Release);
        {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.push(request);
        }
        self.inner.waker.wake();
    }

    fn submit_all(&self, batch: Vec<Request>) {
        if batch.is_empty() {
            return;
        }

        if self.inner.is_stopping.load(Ordering::Acquire) {
            for request in batch {
                notify_failed_start(request);
            }
            return;
        }

        self.inner
            .active_requests
            .fetch_add(batch.len(), Ordering::Release);
        {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.extend(batch);
        }
        self.inner.waker.wake();
    }
}

impl Drop for Client {
    /// Blocks until every pending and in-flight request has completed, then
    /// tears the reactor down.
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        init::global_cleanup();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("is_running", &self.is_running())
            .field("is_stopping", &self.inner.is_stopping.load(Ordering::Acquire))
            .field("active_requests", &self.size())
            .finish()
    }
}

/// Completes a request that never made it into the reactor.
fn notify_failed_start(mut request: Request) {
    let sink = request.take_completion();

    let mut response = Response::default();
    response.lift_status = LiftStatus::ErrorFailedToStart;
    // This http status code isn't perfect, but it beats reporting nothing.
    response.status_code = crate::http::StatusCode::Http500InternalServerError;

    sink.deliver(request, response);
}

struct ReactorConfig {
    reserve_connections: usize,
    max_connections: Option<usize>,
    connect_timeout: Option<Duration>,
    resolve_hosts: Vec<ResolveHost>,
    share: Option<Share>,
}

/// Reactor state; lives on, and is only touched by, the background thread.
struct Reactor {
    inner: Arc<Inner>,
    multi: Multi,
    drain: UdpSocket,
    // Free-list of executors so repeated submissions don't allocate.
    pool: Vec<Executor>,
    in_flight: HashMap<usize, Executor>,
    timeouts: TimeoutQueue,
    next_token: usize,
    connect_timeout: Option<Duration>,
    resolve_hosts: Vec<ResolveHost>,
    share: Option<Share>,
}

impl Reactor {
    fn new(inner: Arc<Inner>, config: ReactorConfig, drain: UdpSocket) -> Self {
        let mut multi = Multi::new();
        if let Some(max) = config.max_connections {
            if let Err(error) = multi.set_max_connects(max) {
                log::warn!("failed to cap multiplex connection cache: {error}");
            }
        }

        let pool = (0..config.reserve_connections)
            .map(|_| Executor::new())
            .collect();

        Self {
            inner,
            multi,
            drain,
            pool,
            in_flight: HashMap::new(),
            timeouts: TimeoutQueue::new(),
            next_token: 0,
            connect_timeout: config.connect_timeout,
            resolve_hosts: config.resolve_hosts,
            share: config.share,
        }
    }

    fn run(&mut self) {
        loop {
            let timeout = self.wait_timeout();

            let mut wait_fds = [wake_wait_fd(&self.drain)];
            if let Err(error) = self.multi.wait(&mut wait_fds, timeout) {
                log::error!("transport poll failed: {error}");
            }
            self.drain_wakes();

            self.accept_pending();
            self.drive_transport();
            self.expire_timeouts();

            if self.inner.is_stopping.load(Ordering::Acquire)
                && self.inner.active_requests.load(Ordering::Acquire) == 0
            {
                break;
            }
        }

        self.reject_leftovers();
    }

    /// Fails any submission that raced a concurrent `stop()` and landed in
    /// the pending vector after the final drain.
    fn reject_leftovers(&mut self) {
        let leftovers: Vec<Request> = {
            let mut pending = self.inner.pending.lock().unwrap();
            std::mem::take(&mut *pending)
        };

        for request in leftovers {
            notify_failed_start(request);
            self.inner.active_requests.fetch_sub(1, Ordering::Release);
        }
    }

    /// The reactor's single next-fire timer: poll no longer than the
    /// transport suggests, the distance to the nearest user deadline, or the
    /// idle cap, whichever is shortest.
    fn wait_timeout(&mut self) -> Duration {
        let mut timeout = match self.multi.get_timeout() {
            Ok(Some(suggested)) => suggested.min(IDLE_WAIT),
            _ => IDLE_WAIT,
        };

        if let Some(deadline) = self.timeouts.next_deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
        }

        timeout
    }

    fn drain_wakes(&mut self) {
        let mut buf = [0u8; 16];
        while self.drain.recv(&mut buf).is_ok() {}
    }

    /// Swaps the pending vector out under its lock and installs each grabbed
    /// request in the multiplex.
    fn accept_pending(&mut self) {
        let grabbed: Vec<Request> = {
            let mut pending = self.inner.pending.lock().unwrap();
            std::mem::take(&mut *pending)
        };

        for request in grabbed {
            self.start_transfer(request);
        }
    }

    fn start_transfer(&mut self, request: Request) {
        let mut executor = self.pool.pop().unwrap_or_else(Executor::new);
        executor.attach(request);

        if let Err(error) = executor.prepare(&self.resolve_hosts, self.share.as_ref()) {
            log::warn!("failed to prepare transfer: {error}");
            self.finish_transfer(executor, LiftStatus::ErrorFailedToStart);
            return;
        }

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);

        // Register the deadline before the multiplex sees the handle; a very
        // fast transfer could otherwise complete before its deadline exists.
        self.add_timeout(&mut executor, token);

        match executor.install(&self.multi, token) {
            Ok(()) => {
                log::trace!("transfer {token} installed in the multiplex");
                self.in_flight.insert(token, executor);
            }
            Err(error) => {
                log::warn!("failed to add transfer to the multiplex: {error}");
                self.finish_transfer(executor, LiftStatus::ErrorFailedToStart);
            }
        }
    }

    /// The two-tier timeout rule. With both a total timeout and a longer
    /// effective connect budget, the transport is given the connect budget
    /// while the timer index delivers the user-visible timeout at the total
    /// value; otherwise the transport enforces the total timeout alone.
    fn add_timeout(&mut self, executor: &mut Executor, token: usize) {
        let request_timeout = match executor.request.as_ref().and_then(|r| r.timeout()) {
            Some(timeout) => timeout,
            None => return,
        };

        // The per-request connect timeout wins over the client-wide value.
        let connect_timeout = executor
            .request
            .as_ref()
            .and_then(|r| r.connect_timeout())
            .or(self.connect_timeout);

        match connect_timeout {
            Some(connect) if connect > request_timeout => {
                let deadline = Instant::now() + request_timeout;
                executor.timeout_key = Some(self.timeouts.insert(deadline, token));
                executor.set_transport_timeout(connect);
            }
            _ => executor.set_transport_timeout(request_timeout),
        }
    }

    /// Ticks the multiplex and completes every transfer it reports done.
    fn drive_transport(&mut self) {
        if let Err(error) = self.multi.perform() {
            log::error!("transport perform failed: {error}");
        }

        let mut finished = Vec::new();
        self.multi.messages(|message| match message.token() {
            Ok(token) => finished.push((token, message.result())),
            Err(error) => log::error!("transfer message without a token: {error}"),
        });

        for (token, result) in finished {
            let executor = match self.in_flight.remove(&token) {
                Some(executor) => executor,
                None => continue,
            };

            let status = match result {
                Some(Ok(())) => LiftStatus::Success,
                Some(Err(error)) => {
                    log::debug!("transfer {token} finished with error: {error}");
                    Executor::convert(&error)
                }
                // Not a completion message; leave the transfer in flight.
                None => {
                    self.in_flight.insert(token, executor);
                    continue;
                }
            };

            self.finish_transfer(executor, status);
        }
    }

    /// Normal completion path; also used for requests that failed to start.
    ///
    /// Guarded so that a request whose user-visible timeout already fired is
    /// recycled silently: bookkeeping always runs here exactly once per
    /// transfer, user notification at most once per request.
    fn finish_transfer(&mut self, mut executor: Executor, status: LiftStatus) {
        if let Err(error) = executor.uninstall(&self.multi) {
            log::error!("failed to remove transfer from the multiplex: {error}");
        }

        if !executor.completion_processed {
            executor.completion_processed = true;

            if let Some(key) = executor.timeout_key.take() {
                self.timeouts.remove(key);
            }

            executor.harvest(status);

            if let Some(mut request) = executor.request.take() {
                let sink = request.take_completion();
                let response = std::mem::take(&mut executor.response);
                sink.deliver(request, response);
            }
        }

        executor.reset();
        self.pool.push(executor);
        self.inner.active_requests.fetch_sub(1, Ordering::Release);
    }

    /// Fires every deadline at or past due, delivering the synthetic timeout
    /// outcome to each affected request.
    fn expire_timeouts(&mut self) {
        if self.timeouts.is_empty() {
            return;
        }

        let now = Instant::now();
        for (_, token) in self.timeouts.pop_due(now) {
            if let Some(executor) = self.in_flight.get_mut(&token) {
                executor.timeout_key = None;
                deliver_timeout(executor);
            }
        }
    }
}

/// Delivers the user-visible timeout for a transfer that is still in the
/// multiplex.
///
/// The transfer is left running so the transport can finish establishing the
/// connection within its own budget; the per-transfer buffers must stay
/// valid until then, so the user receives a clone of the request while the
/// original stays pinned in the executor. The active counter is decremented
/// by the eventual normal completion, which the `completion_processed` flag
/// turns into a silent recycle.
fn deliver_timeout(executor: &mut Executor) {
    if executor.completion_processed {
        return;
    }
    executor.completion_processed = true;

    let total_time = executor
        .request
        .as_ref()
        .and_then(|r| r.timeout())
        .unwrap_or_default();
    executor.set_timesup_response(total_time);

    let (request_copy, sink) = match executor.request.as_mut() {
        Some(request) => {
            let sink = request.take_completion();
            (request.clone(), sink)
        }
        None => return,
    };

    let response = std::mem::take(&mut executor.response);
    sink.deliver(request_copy, response);
}

fn wake_wait_fd(socket: &UdpSocket) -> WaitFd {
    let mut wait_fd = WaitFd::new();
    wait_fd.set_fd(socket_handle(socket));
    wait_fd.poll_on_read(true);
    wait_fd
}

#[cfg(unix)]
fn socket_handle(socket: &UdpSocket) -> curl_sys::curl_socket_t {
    use std::os::unix::io::AsRawFd;
    socket.as_raw_fd()
}

#[cfg(windows)]
fn socket_handle(socket: &UdpSocket) -> curl_sys::curl_socket_t {
    use std::os::windows::io::AsRawSocket;
    socket.as_raw_socket() as curl_sys::curl_socket_t
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use futures::future::join_all;
use lift::{Client, ClientPool, LiftStatus, Method, Request, ResolveHost, StatusCode};

fn wait_until_empty(client: &Client) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !client.is_empty() {
        assert!(Instant::now() < deadline, "client never drained");
        std::thread::yield_now();
    }
}

#[test]
fn async_get_via_future() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mock = mockito::mock("GET", "/async-get")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("hello world")
        .create();

    let client = Client::builder().build().unwrap();
    let url = format!("{}/async-get", mockito::server_url());

    let future = client.start_request(Request::new(url.clone(), Some(Duration::from_secs(10))));
    let (request, response) = block_on(future);

    assert_eq!(request.url(), url);
    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
    assert_eq!(&response.data()[..], b"hello world");
    assert_eq!(
        response.header("Content-Type").map(|h| h.value()),
        Some("text/plain")
    );

    mock.assert();
    wait_until_empty(&client);
}

#[test]
fn async_get_not_found() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("GET", "/async-missing")
        .with_status(404)
        .create();

    let client = Client::new();
    let url = format!("{}/async-missing", mockito::server_url());

    let (_request, response) =
        block_on(client.start_request(Request::new(url, Some(Duration::from_secs(10)))));

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http404NotFound);
}

#[test]
fn async_get_via_callback() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("GET", "/async-callback")
        .with_status(200)
        .with_body("callback")
        .create();

    let client = Client::new();
    let url = format!("{}/async-callback", mockito::server_url());
    let (sender, receiver) = mpsc::channel();

    client.start_request_with_callback(
        Request::new(url, Some(Duration::from_secs(10))),
        move |request, response| {
            sender.send((request, response)).unwrap();
        },
    );

    let (_request, response) = receiver.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(&response.data()[..], b"callback");
}

#[test]
fn batch_of_concurrent_requests() {
    let _ = env_logger::builder().is_test(true).try_init();

    const COUNT: usize = 100;

    let _mock = mockito::mock("GET", "/batch")
        .with_status(200)
        .with_body("batch body")
        .expect(COUNT)
        .create();

    let client = Client::new();
    let url = format!("{}/batch", mockito::server_url());

    let requests: Vec<Request> = (0..COUNT)
        .map(|_| Request::new(url.clone(), Some(Duration::from_secs(10))))
        .collect();

    let futures = client.start_requests(requests);
    assert_eq!(futures.len(), COUNT);

    let completions = block_on(join_all(futures));
    assert_eq!(completions.len(), COUNT);
    for (_request, response) in completions {
        assert_eq!(response.lift_status(), LiftStatus::Success);
        assert_eq!(response.status_code(), StatusCode::Http200Ok);
    }

    wait_until_empty(&client);
}

#[test]
fn batch_with_shared_callback_counts_every_completion() {
    let _ = env_logger::builder().is_test(true).try_init();

    const COUNT: usize = 25;

    let _mock = mockito::mock("GET", "/batch-callback")
        .with_status(200)
        .expect(COUNT)
        .create();

    let client = Client::new();
    let url = format!("{}/batch-callback", mockito::server_url());

    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    let (done_tx, done_rx) = mpsc::channel();

    let requests: Vec<Request> = (0..COUNT)
        .map(|_| Request::new(url.clone(), Some(Duration::from_secs(10))))
        .collect();

    client.start_requests_with_callback(requests, move |_request, response| {
        assert_eq!(response.lift_status(), LiftStatus::Success);
        if counter.fetch_add(1, Ordering::AcqRel) + 1 == COUNT {
            done_tx.send(()).unwrap();
        }
    });

    done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(completions.load(Ordering::Acquire), COUNT);
}

#[test]
fn stopped_client_rejects_submissions() {
    let _ = env_logger::builder().is_test(true).try_init();

    let client = Client::new();
    client.stop();

    let url = format!("{}/rejected", mockito::server_url());
    let (_request, response) = block_on(client.start_request(Request::new(url, None)));

    assert_eq!(response.lift_status(), LiftStatus::ErrorFailedToStart);
    assert_eq!(
        response.status_code(),
        StatusCode::Http500InternalServerError
    );
    assert_eq!(response.total_time(), Duration::ZERO);
    assert_eq!(response.num_connects(), 0);
    assert_eq!(response.num_redirects(), 0);
}

#[test]
fn client_drains_before_destruction() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("GET", "/drain")
        .with_status(200)
        .expect(10)
        .create();

    let url = format!("{}/drain", mockito::server_url());
    let completions = Arc::new(AtomicUsize::new(0));

    {
        let client = Client::new();
        let counter = Arc::clone(&completions);
        let requests: Vec<Request> = (0..10)
            .map(|_| Request::new(url.clone(), Some(Duration::from_secs(10))))
            .collect();
        client.start_requests_with_callback(requests, move |_request, _response| {
            counter.fetch_add(1, Ordering::AcqRel);
        });
        // Dropping the client blocks until every request flushed.
    }

    assert_eq!(completions.load(Ordering::Acquire), 10);
}

#[test]
fn thread_event_hook_runs_on_start_and_stop() {
    let _ = env_logger::builder().is_test(true).try_init();

    let events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&events);

    let client = Client::builder()
        .reserve_connections(4)
        .max_connections(32)
        .on_thread_event(move || {
            counter.fetch_add(1, Ordering::AcqRel);
        })
        .build()
        .unwrap();

    assert!(client.is_running());
    assert_eq!(events.load(Ordering::Acquire), 1);

    drop(client);
    assert_eq!(events.load(Ordering::Acquire), 2);
}

#[test]
fn head_request_has_empty_body() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("HEAD", "/async-head")
        .with_status(200)
        .create();

    let client = Client::new();
    let url = format!("{}/async-head", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.set_method(Method::Head);

    let (_request, response) = block_on(client.start_request(request));

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
    assert!(response.data().is_empty());
}

#[test]
fn client_wide_resolve_host_applies() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("GET", "/client-resolved")
        .with_status(200)
        .create();

    let port = mockito::server_address().port();
    let client = Client::builder()
        .resolve_host(ResolveHost::new("lift-client.example", port, "127.0.0.1"))
        .build()
        .unwrap();

    let url = format!("http://lift-client.example:{port}/client-resolved");
    let (_request, response) =
        block_on(client.start_request(Request::new(url, Some(Duration::from_secs(10)))));

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
}

#[test]
fn client_pool_spreads_requests() {
    let _ = env_logger::builder().is_test(true).try_init();

    const COUNT: usize = 20;

    let _mock = mockito::mock("GET", "/pool")
        .with_status(200)
        .expect(COUNT)
        .create();

    let pool = ClientPool::builder().client_count(3).build().unwrap();
    let url = format!("{}/pool", mockito::server_url());

    let requests: Vec<Request> = (0..COUNT)
        .map(|_| Request::new(url.clone(), Some(Duration::from_secs(10))))
        .collect();

    let completions = block_on(join_all(pool.start_requests(requests)));
    assert_eq!(completions.len(), COUNT);
    for (_request, response) in completions {
        assert_eq!(response.lift_status(), LiftStatus::Success);
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    while !pool.is_empty() {
        assert!(Instant::now() < deadline, "pool never drained");
        std::thread::yield_now();
    }
}

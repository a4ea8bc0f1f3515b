//! User-visible timeout behavior: the two-tier rule delivers a synthetic
//! 504 at the request deadline while the transport keeps the connection
//! attempt alive up to the connect budget.

use std::io::Read;
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use lift::{Client, LiftStatus, Request, StatusCode};

/// A server that accepts connections and then never responds, parking each
/// socket so the peer sees neither data nor a close.
fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let mut parked = Vec::new();
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(_) => break,
            };
            // Swallow the request bytes in the background, respond never.
            let clone = stream.try_clone().unwrap();
            thread::spawn(move || {
                let mut clone = clone;
                let mut buf = [0u8; 1024];
                while let Ok(n) = clone.read(&mut buf) {
                    if n == 0 {
                        break;
                    }
                }
            });
            parked.push(stream);
        }
    });

    format!("http://{addr}/")
}

#[test]
fn request_timeout_beats_longer_connect_budget() {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = silent_server();
    let client = Client::new();

    let mut request = Request::new(url, Some(Duration::from_millis(5)));
    request.set_connect_timeout(Some(Duration::from_secs(1)));

    let started = Instant::now();
    let (_request, response) = block_on(client.start_request(request));

    assert_eq!(response.lift_status(), LiftStatus::Timeout);
    assert_eq!(response.status_code(), StatusCode::Http504GatewayTimeout);
    assert_eq!(response.total_time(), Duration::from_millis(5));
    assert_eq!(response.num_connects(), 0);
    assert_eq!(response.num_redirects(), 0);
    // Delivered at the request deadline, not the connect budget.
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[test]
fn client_wide_connect_budget_applies() {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = silent_server();
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let (_request, response) =
        block_on(client.start_request(Request::new(url, Some(Duration::from_millis(10)))));

    assert_eq!(response.lift_status(), LiftStatus::Timeout);
    assert_eq!(response.status_code(), StatusCode::Http504GatewayTimeout);
    assert_eq!(response.total_time(), Duration::from_millis(10));
}

#[test]
fn staggered_timeouts_fire_in_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = silent_server();
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let mut first = Request::new(url.clone(), Some(Duration::from_millis(5)));
    first.set_connect_timeout(Some(Duration::from_secs(1)));
    let mut second = Request::new(url, Some(Duration::from_millis(10)));
    second.set_connect_timeout(Some(Duration::from_secs(1)));

    let futures = client.start_requests(vec![first, second]);
    let mut outcomes = Vec::new();
    for future in futures {
        outcomes.push(block_on(future));
    }

    assert_eq!(outcomes[0].1.lift_status(), LiftStatus::Timeout);
    assert_eq!(outcomes[0].1.total_time(), Duration::from_millis(5));
    assert_eq!(outcomes[1].1.lift_status(), LiftStatus::Timeout);
    assert_eq!(outcomes[1].1.total_time(), Duration::from_millis(10));
}

#[test]
fn zero_timeout_still_completes() {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = silent_server();
    let client = Client::new();

    let mut request = Request::new(url, Some(Duration::ZERO));
    request.set_connect_timeout(Some(Duration::from_secs(1)));

    let (_request, response) = block_on(client.start_request(request));

    assert_eq!(response.lift_status(), LiftStatus::Timeout);
    assert_eq!(response.status_code(), StatusCode::Http504GatewayTimeout);
    assert_eq!(response.total_time(), Duration::ZERO);
    assert_eq!(response.num_connects(), 0);
}

#[test]
fn timeout_delivery_via_callback() {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = silent_server();
    let client = Client::new();

    let mut request = Request::new(url, Some(Duration::from_millis(5)));
    request.set_connect_timeout(Some(Duration::from_secs(1)));

    let (sender, receiver) = mpsc::channel();
    client.start_request_with_callback(request, move |request, response| {
        sender.send((request, response)).unwrap();
    });

    let (request, response) = receiver.recv_timeout(Duration::from_secs(10)).unwrap();
    // The callback receives a disarmed copy while the transport finishes
    // tearing the connection down in the background.
    assert_eq!(request.timeout(), Some(Duration::from_millis(5)));
    assert_eq!(response.lift_status(), LiftStatus::Timeout);
    assert_eq!(response.status_code(), StatusCode::Http504GatewayTimeout);
}

#[test]
fn transport_enforces_timeout_without_connect_budget() {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = silent_server();
    let client = Client::new();

    // No connect timeout anywhere: the transport owns the deadline and the
    // outcome arrives through the normal completion path.
    let (_request, response) =
        block_on(client.start_request(Request::new(url, Some(Duration::from_millis(50)))));

    assert_eq!(response.lift_status(), LiftStatus::Timeout);
}

#[test]
fn happy_eyeballs_zero_does_not_hang() {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = silent_server();
    let client = Client::new();

    let mut request = Request::new(url, Some(Duration::from_millis(50)));
    request.set_happy_eyeballs_timeout(Some(Duration::ZERO));

    let (_request, response) = block_on(client.start_request(request));
    assert_eq!(response.lift_status(), LiftStatus::Timeout);
}

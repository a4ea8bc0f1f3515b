use std::sync::{Arc, Mutex};
use std::time::Duration;

use lift::{
    DebugInfoType, LiftStatus, Method, Request, ResolveHost, StatusCode, TransferProgress, Version,
};

#[test]
fn get_request() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mock = mockito::mock("GET", "/get")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("sync body")
        .create();

    let url = format!("{}/get", mockito::server_url());
    let request = Request::new(url, Some(Duration::from_secs(10)));
    let response = request.perform(None);

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
    assert_eq!(response.version(), Version::Http11);
    assert_eq!(&response.data()[..], b"sync body");
    assert_eq!(
        response.header("content-type").map(|h| h.value()),
        Some("text/plain")
    );
    assert!(response.num_connects() >= 1);
    assert_eq!(response.num_redirects(), 0);

    // The status code table round trips for a successful response.
    let code = response.status_code();
    assert_eq!(StatusCode::from_u16(code.as_u16()), code);

    mock.assert();
}

#[test]
fn get_not_found() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("GET", "/not/here").with_status(404).create();

    let url = format!("{}/not/here", mockito::server_url());
    let response = Request::new(url, Some(Duration::from_secs(10))).perform(None);

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http404NotFound);
}

#[test]
fn head_request_has_empty_body() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("HEAD", "/head").with_status(200).create();

    let url = format!("{}/head", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.set_method(Method::Head);
    let response = request.perform(None);

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
    assert!(response.data().is_empty());
}

#[test]
fn post_with_body() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mock = mockito::mock("POST", "/post")
        .match_body("name=value")
        .with_status(200)
        .with_body("posted")
        .create();

    let url = format!("{}/post", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.set_body("name=value").unwrap();
    assert_eq!(request.method(), Method::Post);

    let response = request.perform(None);

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
    assert_eq!(&response.data()[..], b"posted");

    mock.assert();
}

#[test]
fn post_method_not_allowed() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("POST", "/no-post").with_status(405).create();

    let url = format!("{}/no-post", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.set_body("data").unwrap();
    // Strip the transport's automatic 'Expect: 100-continue' negotiation.
    request.remove_header("Expect");

    let response = request.perform(None);

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http405MethodNotAllowed);
}

#[test]
fn custom_headers_are_sent() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mock = mockito::mock("GET", "/echo-header")
        .match_header("x-lift-test", "42")
        .with_status(200)
        .create();

    let url = format!("{}/echo-header", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.add_header("x-lift-test", "42");

    let response = request.perform(None);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);

    mock.assert();
}

#[test]
fn transfer_progress_handler_sees_the_download() {
    let _ = env_logger::builder().is_test(true).try_init();

    let body = "x".repeat(4096);
    let _mock = mockito::mock("GET", "/progress")
        .with_status(200)
        .with_body(&body)
        .create();

    let url = format!("{}/progress", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));

    let seen: Arc<Mutex<Vec<TransferProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    request.set_transfer_progress_handler(move |progress| {
        sink.lock().unwrap().push(progress);
        true
    });

    let response = request.perform(None);
    assert_eq!(response.lift_status(), LiftStatus::Success);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    let last = seen.last().unwrap();
    assert_eq!(last.downloaded, 4096);
    assert_eq!(last.uploaded, 0);
}

#[test]
fn aborting_from_the_progress_handler_fails_the_request() {
    let _ = env_logger::builder().is_test(true).try_init();

    let body = "x".repeat(65536);
    let _mock = mockito::mock("GET", "/progress-abort")
        .with_status(200)
        .with_body(&body)
        .create();

    let url = format!("{}/progress-abort", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.set_transfer_progress_handler(|_progress| false);

    let response = request.perform(None);
    assert_ne!(response.lift_status(), LiftStatus::Success);
}

#[test]
fn max_redirects_zero_blocks_the_first_redirect() {
    let _ = env_logger::builder().is_test(true).try_init();

    let target_url = format!("{}/redirect-target", mockito::server_url());
    let _redirect = mockito::mock("GET", "/redirect-src")
        .with_status(302)
        .with_header("location", &target_url)
        .create();
    let _target = mockito::mock("GET", "/redirect-target")
        .with_status(200)
        .create();

    let url = format!("{}/redirect-src", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.set_follow_redirects(true, Some(0));

    let response = request.perform(None);

    // The first response is reported, not the redirect target.
    assert_eq!(response.status_code(), StatusCode::Http302Found);
    assert_eq!(response.num_redirects(), 0);
}

#[test]
fn redirects_are_followed_by_default() {
    let _ = env_logger::builder().is_test(true).try_init();

    let target_url = format!("{}/followed-target", mockito::server_url());
    let _redirect = mockito::mock("GET", "/followed-src")
        .with_status(302)
        .with_header("location", &target_url)
        .create();
    let _target = mockito::mock("GET", "/followed-target")
        .with_status(200)
        .with_body("followed")
        .create();

    let url = format!("{}/followed-src", mockito::server_url());
    let response = Request::new(url, Some(Duration::from_secs(10))).perform(None);

    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
    assert_eq!(&response.data()[..], b"followed");
    assert_eq!(response.num_redirects(), 1);
}

#[test]
fn resolve_host_override_bypasses_dns() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("GET", "/resolved").with_status(200).create();

    let port = mockito::server_address().port();
    let url = format!("http://lift-test.example:{port}/resolved");

    let mut request = Request::new(url, Some(Duration::from_secs(10)));
    request.add_resolve_host(ResolveHost::new("lift-test.example", port, "127.0.0.1"));

    let response = request.perform(None);
    assert_eq!(response.lift_status(), LiftStatus::Success);
    assert_eq!(response.status_code(), StatusCode::Http200Ok);
}

#[test]
fn debug_info_handler_sees_the_conversation() {
    let _ = env_logger::builder().is_test(true).try_init();

    let _mock = mockito::mock("GET", "/debug").with_status(200).create();

    let url = format!("{}/debug", mockito::server_url());
    let mut request = Request::new(url, Some(Duration::from_secs(10)));

    let events: Arc<Mutex<Vec<DebugInfoType>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    request.set_debug_info_handler(move |kind, _data| {
        sink.lock().unwrap().push(kind);
    });

    let response = request.perform(None);
    assert_eq!(response.lift_status(), LiftStatus::Success);

    let events = events.lock().unwrap();
    assert!(events.contains(&DebugInfoType::HeaderOut));
    assert!(events.contains(&DebugInfoType::HeaderIn));
}

#[test]
fn dns_error_surfaces_as_connect_dns_error() {
    let _ = env_logger::builder().is_test(true).try_init();

    let request = Request::new(
        "http://host.invalid./",
        Some(Duration::from_secs(10)),
    );
    let response = request.perform(None);

    assert_eq!(response.lift_status(), LiftStatus::ConnectDnsError);
    assert_eq!(response.status_code(), StatusCode::HttpUnknown);
}

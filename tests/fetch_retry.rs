// tests/fetch_retry.rs
mod common;

use std::time::Duration;

use common::{Recorder, Scripted};
use poem_scrape::config::options::FetchOptions;
use poem_scrape::core::net::Response;
use poem_scrape::error::FetchError;
use poem_scrape::fetch::Fetcher;

const URL: &str = "https://poetry.test/poem";

fn opts(max_retries: u32, jitter: bool) -> FetchOptions {
    FetchOptions {
        max_retries,
        jitter,
        seed: Some(1),
        base_delay: Duration::from_millis(500),
        ..FetchOptions::default()
    }
}

#[test]
fn retry_after_is_honoured() {
    let too_many = Response::status(429).with_retry_after("2");
    let t = Scripted::new().route(
        URL,
        vec![too_many.clone(), too_many.clone(), too_many, Response::ok("<html>ok</html>")],
    );
    let rec = Recorder::default();
    let mut f = Fetcher::new(&t, &opts(8, true)).with_sleeper(&rec);

    assert_eq!(f.fetch_url(URL).unwrap(), b"<html>ok</html>");
    assert_eq!(t.calls_to(URL), 4);
    let waits = rec.waits();
    assert_eq!(waits.len(), 3);
    assert!(waits.iter().all(|w| *w >= Duration::from_secs(2)));
}

#[test]
fn permanent_500_gives_up_after_max_retries() {
    let t = Scripted::new().route(URL, vec![Response::status(500)]);
    let rec = Recorder::default();
    let mut f = Fetcher::new(&t, &opts(3, false)).with_sleeper(&rec);

    match f.fetch_url(URL).unwrap_err() {
        FetchError::Fatal { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, FetchError::Transient { .. }));
        }
        other => panic!("expected Fatal, got {other}"),
    }
    assert_eq!(t.calls_to(URL), 3);
    // exponential 0.5s, 1s; nothing after the last attempt
    assert_eq!(rec.waits(), vec![Duration::from_millis(500), Duration::from_secs(1)]);
}

#[test]
fn client_errors_are_not_retried() {
    let t = Scripted::new().route(URL, vec![Response::status(403)]);
    let rec = Recorder::default();
    let mut f = Fetcher::new(&t, &opts(5, false)).with_sleeper(&rec);

    assert!(matches!(f.fetch_url(URL), Err(FetchError::Status { status: 403, .. })));
    assert_eq!(t.calls_to(URL), 1);
    assert!(rec.waits().is_empty());
}

// src/fetch.rs
//! Page fetcher: one GET per page (or URL) with bounded retries.
//!
//! Transient failures (connection errors, timeouts, 5xx, 429) are retried up to
//! `max_retries` total attempts. Between attempts the fetcher waits for the
//! server's `Retry-After` when present, otherwise for an exponential backoff plus
//! jitter. Other non-success statuses fail immediately.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::options::FetchOptions;
use crate::core::backoff::{is_transient_status, Backoff};
use crate::core::net::{Response, Transport};
use crate::error::FetchError;

/// Blocking pause. Swapped out in tests to record waits instead.
pub trait Sleeper {
    fn sleep(&self, d: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}

pub struct Fetcher<T: Transport, S: Sleeper = ThreadSleeper> {
    transport: T,
    sleeper: S,
    backoff: Backoff,
    max_retries: u32,
    rng: Option<StdRng>,
    url_template: String,
}

impl<T: Transport> Fetcher<T, ThreadSleeper> {
    pub fn new(transport: T, opts: &FetchOptions) -> Self {
        let rng = opts.jitter.then(|| match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });
        Self {
            transport,
            sleeper: ThreadSleeper,
            backoff: Backoff::new(opts.base_delay),
            max_retries: opts.max_retries.max(1),
            rng,
            url_template: s!(crate::config::consts::LISTING_URL_TEMPLATE),
        }
    }
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Fetcher<T, S2> {
        Fetcher {
            transport: self.transport,
            sleeper,
            backoff: self.backoff,
            max_retries: self.max_retries,
            rng: self.rng,
            url_template: self.url_template,
        }
    }

    /// Listing URL pattern with a `{page}` placeholder.
    pub fn with_url_template(mut self, template: &str) -> Self {
        self.url_template = s!(template);
        self
    }

    pub fn page_url(&self, page: u32) -> String {
        self.url_template.replace("{page}", &page.to_string())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Sleep through the fetcher's sleeper (inter-page courtesy delay etc.).
    pub fn pause(&self, d: Duration) {
        self.sleeper.sleep(d);
    }

    /// Fetch listing page `page` and decode it (lossy UTF-8).
    pub fn fetch(&mut self, page: u32) -> Result<String, FetchError> {
        let url = self.page_url(page);
        let body = self.fetch_url(&url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Fetch any URL with the retry policy; returns the raw body.
    pub fn fetch_url(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut last = None;

        for attempt in 1..=self.max_retries {
            let (reason, response) = match self.transport.get(url) {
                Ok(resp) if resp.is_success() => return Ok(resp.body),
                Ok(resp) if is_transient_status(resp.status) => {
                    (format!("HTTP {}", resp.status), Some(resp))
                }
                Ok(resp) => {
                    return Err(FetchError::Status { url: s!(url), status: resp.status });
                }
                Err(e) => (e.to_string(), None),
            };

            if attempt < self.max_retries {
                let wait = self.wait_for(attempt, response.as_ref());
                logw!(
                    "Transient failure for {url} (attempt {attempt}/{}): {reason}. Waiting {:.2}s.",
                    self.max_retries,
                    wait.as_secs_f64()
                );
                self.sleeper.sleep(wait);
            } else {
                logw!("Transient failure for {url} (attempt {attempt}/{}): {reason}", self.max_retries);
            }
            last = Some(FetchError::Transient { url: s!(url), reason });
        }

        Err(FetchError::Fatal {
            url: s!(url),
            attempts: self.max_retries,
            last: Box::new(last.unwrap_or_else(|| FetchError::Transient {
                url: s!(url),
                reason: s!("no attempt made"),
            })),
        })
    }

    fn wait_for(&mut self, attempt: u32, response: Option<&Response>) -> Duration {
        if let Some(wait) = Backoff::retry_after(response) {
            return wait;
        }
        let delay = self.backoff.next_delay(attempt, response);
        match self.rng.as_mut() {
            Some(rng) => {
                let bound = self.backoff.jitter_bound().as_secs_f64();
                delay + Duration::from_secs_f64(rng.gen_range(0.0..bound))
            }
            None => delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::net::TransportError;
    use std::cell::RefCell;

    struct Script(RefCell<Vec<Result<Response, TransportError>>>);

    impl Transport for Script {
        fn get(&self, _url: &str) -> Result<Response, TransportError> {
            self.0.borrow_mut().remove(0)
        }
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Duration>>);

    impl Sleeper for Recorder {
        fn sleep(&self, d: Duration) {
            self.0.borrow_mut().push(d);
        }
    }

    fn opts(max_retries: u32) -> FetchOptions {
        FetchOptions { max_retries, jitter: false, base_delay: Duration::from_secs(1), ..FetchOptions::default() }
    }

    #[test]
    fn connection_errors_are_retried() {
        let script = Script(RefCell::new(vec![
            Err(TransportError(s!("connection reset"))),
            Ok(Response::ok("hi")),
        ]));
        let rec = Recorder::default();
        let mut f = Fetcher::new(&script, &opts(3)).with_sleeper(&rec);
        assert_eq!(f.fetch_url("http://x/").unwrap(), b"hi");
        assert_eq!(*rec.0.borrow(), vec![Duration::from_secs(1)]);
    }

    #[test]
    fn not_found_fails_without_retry() {
        let script = Script(RefCell::new(vec![Ok(Response::status(404))]));
        let rec = Recorder::default();
        let mut f = Fetcher::new(&script, &opts(5)).with_sleeper(&rec);
        let err = f.fetch_url("http://x/gone").unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(rec.0.borrow().is_empty());
    }

    #[test]
    fn jitter_stays_within_bound() {
        let script = Script(RefCell::new(vec![Ok(Response::status(502)), Ok(Response::ok("ok"))]));
        let rec = Recorder::default();
        let o = FetchOptions { jitter: true, seed: Some(7), ..opts(2) };
        let mut f = Fetcher::new(&script, &o).with_sleeper(&rec);
        f.fetch_url("http://x/").unwrap();
        let waited = rec.0.borrow()[0];
        assert!(waited >= Duration::from_secs(1));
        assert!(waited < Duration::from_secs_f64(1.0 + 0.6));
    }

    #[test]
    fn page_url_substitutes_placeholder() {
        let script = Script(RefCell::new(vec![]));
        let f = Fetcher::new(&script, &opts(1)).with_url_template("http://h/list?page={page}");
        assert_eq!(f.page_url(12), "http://h/list?page=12");
    }
}

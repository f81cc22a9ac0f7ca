// src/core/backoff.rs
// Retry delay policy. Pure: no clock, no RNG, no I/O.

use std::time::Duration;

use super::net::Response;
use crate::config::consts::BACKOFF_CAP_SECS;

/// Statuses worth another attempt.
pub fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// `Retry-After` in (possibly fractional) seconds. HTTP-date form is not supported.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    Duration::try_from_secs_f64(secs.max(0.0)).ok()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Backoff {
    pub base: Duration,
    pub cap: Duration,
}

impl Backoff {
    pub fn new(base: Duration) -> Self {
        Self { base, cap: Duration::from_secs_f64(BACKOFF_CAP_SECS) }
    }

    /// Server-requested wait, when the response carries a usable `Retry-After`.
    pub fn retry_after(response: Option<&Response>) -> Option<Duration> {
        response
            .and_then(|r| r.retry_after.as_deref())
            .and_then(parse_retry_after)
    }

    /// Wait before the attempt following `attempt` (1-based).
    /// `Retry-After` wins; otherwise `min(cap, base * 2^(attempt-1))`.
    pub fn next_delay(&self, attempt: u32, response: Option<&Response>) -> Duration {
        if let Some(wait) = Self::retry_after(response) {
            return wait;
        }
        let exp = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.base.as_secs_f64() * 2f64.powi(exp);
        Duration::from_secs_f64(secs.min(self.cap.as_secs_f64()))
    }

    /// Upper bound of the random jitter added to exponential waits.
    pub fn jitter_bound(&self) -> Duration {
        Duration::from_secs_f64(0.5 * self.base.as_secs_f64() + 0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn retry_after_takes_precedence() {
        let b = Backoff::new(secs(0.5));
        let resp = Response::status(429).with_retry_after("2");
        assert_eq!(b.next_delay(1, Some(&resp)), secs(2.0));
        assert_eq!(b.next_delay(7, Some(&resp)), secs(2.0));
    }

    #[test]
    fn exponential_growth_is_capped() {
        let b = Backoff::new(secs(1.0));
        assert_eq!(b.next_delay(1, None), secs(1.0));
        assert_eq!(b.next_delay(2, None), secs(2.0));
        assert_eq!(b.next_delay(4, None), secs(8.0));
        assert_eq!(b.next_delay(10, None), secs(60.0));
        assert_eq!(b.next_delay(u32::MAX, None), secs(60.0));
    }

    #[test]
    fn bad_retry_after_falls_back_to_backoff() {
        let b = Backoff::new(secs(1.0));
        let resp = Response::status(503).with_retry_after("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(b.next_delay(3, Some(&resp)), secs(4.0));
    }

    #[test]
    fn retry_after_parsing() {
        assert_eq!(parse_retry_after(" 1.5 "), Some(secs(1.5)));
        assert_eq!(parse_retry_after("-3"), Some(Duration::ZERO));
        assert_eq!(parse_retry_after("inf"), None);
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(500));
        assert!(is_transient_status(504));
        assert!(!is_transient_status(404));
        assert!(!is_transient_status(200));
    }
}

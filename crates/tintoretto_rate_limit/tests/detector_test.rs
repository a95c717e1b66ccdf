//! Tests for rate limit error classification.

use std::io;
use tintoretto_rate_limit::{MessageRateLimitDetector, RateLimitDetector};

fn err(message: &str) -> io::Error {
    io::Error::other(message.to_string())
}

#[test]
fn test_recognizes_throttling_vocabulary() {
    let detector = MessageRateLimitDetector::new();

    assert!(detector.is_rate_limit(&err("HTTP 429 Too Many Requests")));
    assert!(detector.is_rate_limit(&err("Rate limit exceeded, retry later")));
    assert!(detector.is_rate_limit(&err("error code: rate_limit_exceeded")));
    assert!(detector.is_rate_limit(&err("Quota exceeded for this billing period")));
    assert!(detector.is_rate_limit(&err("request was throttled")));
    assert!(detector.is_rate_limit(&err("Throttling in effect")));
}

#[test]
fn test_ignores_unrelated_errors() {
    let detector = MessageRateLimitDetector::new();

    assert!(!detector.is_rate_limit(&err("Invalid API key")));
    assert!(!detector.is_rate_limit(&err("connection refused")));
    assert!(!detector.is_rate_limit(&err("HTTP 500 Internal Server Error")));
    assert!(!detector.is_rate_limit(&err("model not found")));
}

#[test]
fn test_matching_is_case_insensitive() {
    let detector = MessageRateLimitDetector::new();

    assert!(detector.is_rate_limit(&err("RATE LIMIT")));
    assert!(detector.is_rate_limit(&err("TOO MANY REQUESTS")));
}

#[test]
fn test_custom_vocabulary() {
    let detector = MessageRateLimitDetector::with_patterns(["slow down"]);

    assert!(detector.is_rate_limit(&err("please SLOW DOWN")));
    // Custom vocabulary replaces the default, it does not extend it.
    assert!(!detector.is_rate_limit(&err("HTTP 429")));
}

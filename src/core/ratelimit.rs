use reqwest::header::HeaderMap;
use std::time::Duration;

/// Attempts per request, the first one included.
pub const MAX_ATTEMPTS: u32 = 3;

/// Longest a single server-requested wait is honored.
pub const MAX_RETRY_WAIT_MS: u64 = 60_000;

/// Used when a 429 carries no usable delay.
const FALLBACK_RETRY_MS: u64 = 1_000;

/// Delay requested by a 429 response: Discord's JSON `retry_after` (seconds,
/// fractional) wins over the `Retry-After` header (whole seconds).
pub fn retry_after_ms(headers: &HeaderMap, body: &str) -> u64 {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["retry_after"].as_f64())
        .map(|secs| (secs * 1000.0).ceil() as u64);

    let from_header = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0).ceil() as u64);

    from_body.or(from_header).unwrap_or(FALLBACK_RETRY_MS)
}

pub fn capped_wait(retry_after_ms: u64) -> Duration {
    Duration::from_millis(retry_after_ms.min(MAX_RETRY_WAIT_MS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_body_retry_after_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("7"));
        assert_eq!(retry_after_ms(&headers, r#"{"retry_after": 1.25}"#), 1250);
    }

    #[test]
    fn test_header_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("3"));
        assert_eq!(retry_after_ms(&headers, "rate limited"), 3000);
    }

    #[test]
    fn test_missing_retry_after_uses_fallback() {
        assert_eq!(retry_after_ms(&HeaderMap::new(), ""), FALLBACK_RETRY_MS);
    }

    #[test]
    fn test_wait_is_capped() {
        assert_eq!(capped_wait(600_000), Duration::from_millis(MAX_RETRY_WAIT_MS));
        assert_eq!(capped_wait(250), Duration::from_millis(250));
    }
}

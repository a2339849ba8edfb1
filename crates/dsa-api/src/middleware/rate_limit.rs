//! Per-IP rate limits built on `tower_governor`.
//!
//! Client IPs come from `X-Forwarded-For`/`X-Real-IP` when present (the API
//! runs behind a proxy), otherwise from the peer address.

/// Quiz submissions: one token per two seconds
pub const QUIZ_SUBMIT_PERIOD_MS: u64 = 2000;
/// Quiz submissions allowed back to back before the period applies
pub const QUIZ_SUBMIT_BURST_SIZE: u32 = 5;

/// Everything else under `/api`: twenty per second
pub const GENERAL_PERIOD_MS: u64 = 50;
/// Requests allowed back to back before the period applies
pub const GENERAL_BURST_SIZE: u32 = 50;

/// Build a `GovernorLayer` keyed on the client IP.
///
/// `per_ms` is the replenish period of one request token in milliseconds.
/// Both arguments must be non-zero.
#[macro_export]
macro_rules! make_rate_limit_layer {
    ($per_ms:expr, $burst:expr) => {{
        let config = ::tower_governor::governor::GovernorConfigBuilder::default()
            .per_millisecond($per_ms)
            .burst_size($burst)
            .key_extractor(::tower_governor::key_extractor::SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("rate limit period and burst size must be non-zero");
        ::tower_governor::GovernorLayer::new(config)
    }};
}

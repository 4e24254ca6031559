//! Common test utilities shared across all integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! Every client built here talks to a local `wiremock` server with short
//! timeouts, so timeout paths are exercised with real (but small) delays.

use pfolio_client::Client;
use pfolio_client::config::{ConfirmedRetryConfig, Hosting, Timeouts, WakeupConfig};
use std::time::Duration;
use wiremock::MockServer;

/// Per-call timeout used for every preset in tests.
pub const TEST_CALL_TIMEOUT: Duration = Duration::from_millis(300);

/// Delay that reliably exceeds [`TEST_CALL_TIMEOUT`].
#[allow(dead_code)]
pub const SLOW_RESPONSE: Duration = Duration::from_millis(1500);

pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        quick: TEST_CALL_TIMEOUT,
        standard: TEST_CALL_TIMEOUT,
        extended: TEST_CALL_TIMEOUT,
        long_running: TEST_CALL_TIMEOUT,
    }
}

/// Client against `server` with test timeouts and the given hosting mode.
///
/// The mock server listens on localhost, so hosted behaviour has to be
/// forced through [`Hosting::Hosted`].
pub fn client_for(server: &MockServer, hosting: Hosting) -> Client {
    Client::builder(server.uri())
        .timeouts(fast_timeouts())
        .wakeup(WakeupConfig {
            health_path: "/health".to_string(),
            probe_timeout: Duration::from_millis(500),
            grace_period: Duration::from_millis(50),
            max_retries: 1,
        })
        .confirmed_retry(ConfirmedRetryConfig {
            max_attempts: 2,
            backoff_step: Duration::from_millis(20),
        })
        .hosting(hosting)
        .build()
        .expect("test client should build")
}

#[allow(dead_code)]
pub fn local_client(server: &MockServer) -> Client {
    client_for(server, Hosting::Local)
}

#[allow(dead_code)]
pub fn hosted_client(server: &MockServer) -> Client {
    client_for(server, Hosting::Hosted)
}

//! Property-based tests for the classifier and the retry bookkeeping.
//!
//! The classifier must be a pure function of the error shape, and its rule
//! order must hold for every status code and server message.

use proptest::prelude::*;
use std::time::Duration;

use super::backend::is_hosted_backend;
use super::classify::{MessageCategory, classify};
use super::confirmed_retry::RetryContext;
use super::errors::PfolioError;
use super::http::common::construct_url;
use super::http::error_helpers::{api_error, truncate_for_context};

// =============================================================================
// Strategy Generators
// =============================================================================

fn arb_status() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(400u16),
        Just(401),
        Just(403),
        Just(404),
        Just(500),
        Just(503),
        300u16..600,
    ]
}

fn arb_server_message() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Za-z][A-Za-z0-9 .,!]{0,40}")
}

/// Error shapes that can be rebuilt from plain data (no live `reqwest::Error`).
#[derive(Debug, Clone)]
enum ErrorShape {
    Timeout(u64),
    Api(u16, Option<String>),
    Parse(String),
    InvalidInput(String),
    Cancelled,
}

impl ErrorShape {
    fn build(&self) -> PfolioError {
        match self {
            Self::Timeout(ms) => PfolioError::Timeout(Duration::from_millis(*ms)),
            Self::Api(status_code, message) => PfolioError::Api {
                status_code: *status_code,
                message: message.clone(),
                body: String::new(),
            },
            Self::Parse(s) => PfolioError::Parse(s.clone()),
            Self::InvalidInput(s) => PfolioError::InvalidInput(s.clone()),
            Self::Cancelled => PfolioError::Cancelled,
        }
    }
}

fn arb_error_shape() -> impl Strategy<Value = ErrorShape> {
    prop_oneof![
        (1u64..120_000).prop_map(ErrorShape::Timeout),
        (arb_status(), arb_server_message()).prop_map(|(s, m)| ErrorShape::Api(s, m)),
        ".{0,40}".prop_map(ErrorShape::Parse),
        "[A-Za-z].{0,40}".prop_map(ErrorShape::InvalidInput),
        Just(ErrorShape::Cancelled),
    ]
}

// =============================================================================
// Classifier
// =============================================================================

proptest! {
    /// Classifying the same shape twice gives the same answer.
    #[test]
    fn classify_is_pure(shape in arb_error_shape()) {
        let first = classify(&shape.build());
        let second = classify(&shape.build());
        prop_assert_eq!(first, second);
    }

    /// Every classification carries a displayable message.
    #[test]
    fn classify_never_yields_empty_message(shape in arb_error_shape()) {
        prop_assert!(!classify(&shape.build()).message.trim().is_empty());
    }

    /// Timeouts are cold starts no matter how long they waited.
    #[test]
    fn timeout_always_cold_start(ms in 1u64..600_000) {
        let c = classify(&PfolioError::Timeout(Duration::from_millis(ms)));
        prop_assert_eq!(c.category, MessageCategory::ColdStartTimeout);
    }

    /// Status rules win over the server message, except where the rule
    /// itself prefers it.
    #[test]
    fn status_rules_checked_before_fallback(status in arb_status(), message in arb_server_message()) {
        let err = PfolioError::Api { status_code: status, message: message.clone(), body: String::new() };
        let c = classify(&err);
        let expected = match status {
            400 => MessageCategory::Validation,
            401 => MessageCategory::Unauthorized,
            403 => MessageCategory::Forbidden,
            404 => MessageCategory::EndpointNotFound,
            500 => MessageCategory::ServerError,
            503 => MessageCategory::ServiceUnavailable,
            _ => MessageCategory::Generic,
        };
        prop_assert_eq!(c.category, expected);

        if let (400 | 402 | 405..=499 | 501 | 502 | 504.., Some(m)) = (status, message.as_deref()) {
            prop_assert_eq!(c.message, m);
        }
    }

    /// Arbitrary error bodies never crash the error path.
    #[test]
    fn api_error_from_any_body(status in 400u16..600, body in ".{0,400}") {
        let err = api_error(status, &body);
        prop_assert_eq!(err.status_code(), Some(status));
        let _ = classify(&err);
    }
}

// =============================================================================
// Helpers
// =============================================================================

proptest! {
    #[test]
    fn truncate_respects_bound(s in ".{0,300}", max in 0usize..250) {
        let out = truncate_for_context(&s, max);
        if s.len() <= max {
            prop_assert_eq!(out, s);
        } else {
            prop_assert!(out.ends_with("..."));
            prop_assert!(out.len() <= max + 3);
        }
    }

    #[test]
    fn construct_url_always_has_single_separator(path in "[a-z]{1,10}(/[a-z0-9]{1,8}){0,3}") {
        let with_slash = construct_url("http://localhost:8080", &format!("/{path}")).unwrap();
        let without_slash = construct_url("http://localhost:8080", &path).unwrap();
        prop_assert_eq!(&with_slash, &without_slash);
        prop_assert!(!with_slash.contains("8080//"));
    }

    #[test]
    fn loopback_ipv4_is_never_hosted(a in 0u8..=255, b in 0u8..=255, c in 1u8..=254, port in 1u16..=65535) {
        let url = format!("http://127.{a}.{b}.{c}:{port}");
        prop_assert!(!is_hosted_backend(&url));
    }

    #[test]
    fn retry_context_never_exceeds_max(max in 0u32..10, advances in 0usize..20) {
        let mut ctx = RetryContext::new(max, Duration::from_secs(2));
        for _ in 0..advances {
            let _ = ctx.advance();
            prop_assert!(ctx.attempt <= ctx.max_attempts);
        }
    }
}

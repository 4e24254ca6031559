//! # pfolio-client
//!
//! Async client for the portfolio back-office REST backend.
//!
//! The backend typically runs on a free-tier host that puts idle processes to
//! sleep, so the first request after a quiet period can take tens of seconds.
//! Besides typed operations for every resource, the crate provides the
//! resilience layer needed to live with that:
//!
//! - per-call timeout presets ([`config::Timeouts`])
//! - a wake-up retry policy that probes the backend and retries once after a
//!   local timeout ([`Client::with_wakeup`])
//! - a user-confirmed retry loop with linear backoff ([`ConfirmedRetry`])
//! - a classifier turning any failure into a user-facing message
//!   ([`classify::classify`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use pfolio_client::{Client, models::AdminCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pfolio_client::PfolioError> {
//!     let client = Client::from_env()?;
//!
//!     let stats = client.dashboard_stats().await;
//!     println!("{} skills, {} projects", stats.skills, stats.projects);
//!
//!     match client.login(&AdminCredentials::new("admin", "secret")).await {
//!         Ok(_) => println!("Logged in"),
//!         Err(e) => println!("{}", pfolio_client::classify::user_message(&e)),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Debugging
//!
//! Set `LOUD_WIRE=1` to print every request and response to stderr.
//! Credential fields are masked.

mod client;
mod errors;
pub(crate) mod http;
mod request;

pub mod backend;
pub mod cache;
pub mod classify;
pub mod config;
pub mod confirmed_retry;
pub mod fanout;
pub mod models;
mod resources;
pub mod wakeup;

#[cfg(test)]
mod proptest_tests;

pub use client::{Client, ClientBuilder};
pub use confirmed_retry::{Confirm, ConfirmedRetry, ConfirmedRetryError, RetryState};
pub use errors::{ErrorKind, PfolioError};
pub use request::{ApiRequest, MultipartBody, RequestBody, ResponsePayload};
pub use resources::ABOUT_SKILLS_CACHE_KEY;
pub use tokio_util::sync::CancellationToken;
pub use wakeup::{LivenessProbe, WakeupPolicy};

//! Hosted vs. local backend detection.
//!
//! Free-tier hosts put idle processes to sleep, so the first request after a
//! quiet period can take tens of seconds. Local backends never cold-start.

use crate::Client;
use crate::config::Hosting;
use reqwest::Url;
use std::net::IpAddr;

/// Notice shown next to spinners while a hosted backend may be waking up.
pub const HOSTED_LATENCY_NOTICE: &str =
    "The hosted backend may take up to 60 seconds to respond if it has been idle.";

/// Returns `true` if `base_url` points anywhere but this machine.
///
/// `localhost`, `*.localhost`, loopback addresses and the unspecified address
/// count as local. A URL that cannot be parsed falls back to a substring check.
///
/// ```
/// use pfolio_client::backend::is_hosted_backend;
///
/// assert!(is_hosted_backend("https://pfolio-backend.onrender.com"));
/// assert!(!is_hosted_backend("http://localhost:8080"));
/// assert!(!is_hosted_backend("http://127.0.0.1:8080/api"));
/// ```
#[must_use]
pub fn is_hosted_backend(base_url: &str) -> bool {
    let parsed = Url::parse(base_url.trim()).ok();
    match parsed.as_ref().and_then(Url::host_str) {
        Some(host) => !is_local_host(host),
        None => !base_url.contains("localhost") && !base_url.contains("127.0.0.1"),
    }
}

fn is_local_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }
    let domain = host.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || domain.ends_with(".localhost")
}

impl Client {
    /// Returns `true` if the configured backend is treated as hosted.
    ///
    /// [`Hosting::Hosted`] and [`Hosting::Local`] override detection.
    #[must_use]
    pub fn is_hosted(&self) -> bool {
        match self.config.hosting {
            Hosting::Hosted => true,
            Hosting::Local => false,
            Hosting::Auto => is_hosted_backend(&self.base_url),
        }
    }

    /// Latency notice to show while a request is in flight, if any.
    #[must_use]
    pub fn latency_notice(&self) -> Option<&'static str> {
        self.is_hosted().then_some(HOSTED_LATENCY_NOTICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_domains() {
        assert!(is_hosted_backend("https://pfolio-backend.onrender.com"));
        assert!(is_hosted_backend("https://api.example.com:8443/base"));
        assert!(is_hosted_backend("http://10.0.0.12:8080"));
        assert!(is_hosted_backend("http://[2001:db8::1]:8080"));
    }

    #[test]
    fn test_local_hosts() {
        assert!(!is_hosted_backend("http://localhost:8080"));
        assert!(!is_hosted_backend("http://LOCALHOST:8080/"));
        assert!(!is_hosted_backend("http://api.localhost:3000"));
        assert!(!is_hosted_backend("http://127.0.0.1:8080"));
        assert!(!is_hosted_backend("http://127.0.1.1:8080"));
        assert!(!is_hosted_backend("http://0.0.0.0:8080"));
        assert!(!is_hosted_backend("http://[::1]:8080"));
    }

    #[test]
    fn test_unparseable_falls_back_to_substring() {
        assert!(!is_hosted_backend("localhost:8080"));
        assert!(is_hosted_backend("pfolio.onrender.com"));
    }

    #[test]
    fn test_is_hosted_is_deterministic() {
        let url = "https://pfolio-backend.onrender.com";
        assert_eq!(is_hosted_backend(url), is_hosted_backend(url));
    }

    #[test]
    fn test_client_hosting_override() {
        let local_url = "http://127.0.0.1:8080";
        let auto = Client::new(local_url).unwrap();
        assert!(!auto.is_hosted());
        assert_eq!(auto.latency_notice(), None);

        let forced = Client::builder(local_url)
            .hosting(Hosting::Hosted)
            .build()
            .unwrap();
        assert!(forced.is_hosted());
        assert_eq!(forced.latency_notice(), Some(HOSTED_LATENCY_NOTICE));

        let forced_local = Client::builder("https://pfolio.onrender.com")
            .hosting(Hosting::Local)
            .build()
            .unwrap();
        assert!(!forced_local.is_hosted());
    }
}

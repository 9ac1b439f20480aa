//! Integration tests for the Bazaar marketplace client.
//!
//! Every test runs the real [`HttpTransport`] against a `wiremock` server
//! standing in for the marketplace API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use bazaar_client::{ClientConfig, HttpTransport, SyncCoordinator};
use secrecy::SecretString;
use url::Url;
use wiremock::MockServer;

/// Token every signed-in test session uses.
pub const TEST_TOKEN: &str = "test-token-4f2a";

/// Client configuration pointing at `server`'s `/api` prefix.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn config_for(server: &MockServer) -> ClientConfig {
    let url = Url::parse(&format!("{}/api", server.uri())).expect("mock server URI is a URL");
    let mut config = ClientConfig::new(url);
    config.timeout = Duration::from_secs(2);
    config
}

/// A coordinator for `server` with a signed-in session.
///
/// # Panics
///
/// Panics if the HTTP client fails to build.
#[must_use]
#[allow(clippy::expect_used)]
pub fn signed_in(server: &MockServer) -> SyncCoordinator<HttpTransport> {
    let mut config = config_for(server);
    config.api_token = Some(SecretString::from(TEST_TOKEN));
    SyncCoordinator::from_config(&config).expect("HTTP client builds")
}

/// `Bearer` header value for [`TEST_TOKEN`].
#[must_use]
pub fn bearer() -> String {
    format!("Bearer {TEST_TOKEN}")
}

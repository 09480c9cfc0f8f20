//! Google OAuth helpers: starting the flow and explaining callback errors.

use reqwest::Url;
use thiserror::Error;
use tracing::error;

use crate::api::{ApiError, AuthBackend};
use crate::navigation::Navigator;

/// Shown for callback error codes we don't recognize
pub const OAUTH_FALLBACK_MESSAGE: &str =
    "An error occurred during Google login. Please try again.";

#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("Failed to initiate Google login. Please try again.")]
    Initiation(#[source] ApiError),
}

/// User-facing message for an OAuth callback error code
pub fn oauth_error_message(code: &str) -> &'static str {
    match code {
        "oauth_cancelled" => "Google login was cancelled. Please try again if you want to sign in.",
        "oauth_invalid_request" => "Invalid OAuth request. Please try again.",
        "oauth_unauthorized" => "OAuth client not authorized. Please contact support.",
        "oauth_unsupported" => "OAuth response type not supported. Please contact support.",
        "oauth_invalid_scope" => "Invalid OAuth scope requested. Please contact support.",
        "oauth_server_error" => "Google server error. Please try again later.",
        "oauth_unavailable" => "Google OAuth temporarily unavailable. Please try again later.",
        "oauth_missing_code" => "OAuth authorization failed. Please try again.",
        "oauth_invalid_state" => "Invalid OAuth state. Please try again.",
        "oauth_error" => "OAuth login failed. Please try again.",
        "oauth_failed" => "Google login failed. Please try again.",
        _ => OAUTH_FALLBACK_MESSAGE,
    }
}

/// Message for the `error` query parameter of a callback URL, if there is one
pub fn check_oauth_error(location: &Url) -> Option<&'static str> {
    location
        .query_pairs()
        .find(|(key, _)| key == "error")
        .filter(|(_, value)| !value.is_empty())
        .map(|(_, value)| oauth_error_message(&value))
}

/// Fetch the authorization URL and hard-redirect to it. On failure nothing
/// navigates and the caller gets the generic message to show.
pub async fn initiate_google_oauth(
    backend: &dyn AuthBackend,
    navigator: &dyn Navigator,
) -> Result<(), OAuthError> {
    match backend.google_auth_url().await {
        Ok(url) => {
            navigator.redirect(&url);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Google OAuth initiation failed");
            Err(OAuthError::Initiation(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{MemoryNavigator, Navigation};
    use crate::testing::MockBackend;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid test URL")
    }

    #[test]
    fn test_known_and_unknown_codes() {
        assert_eq!(
            oauth_error_message("oauth_cancelled"),
            "Google login was cancelled. Please try again if you want to sign in."
        );
        assert_eq!(
            oauth_error_message("oauth_failed"),
            "Google login failed. Please try again."
        );
        assert_eq!(oauth_error_message("something_else"), OAUTH_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_check_oauth_error() {
        assert_eq!(
            check_oauth_error(&url("https://app.test/login?error=oauth_cancelled")),
            Some("Google login was cancelled. Please try again if you want to sign in.")
        );
        assert_eq!(
            check_oauth_error(&url("https://app.test/signup?next=%2F&error=bogus")),
            Some(OAUTH_FALLBACK_MESSAGE)
        );
        assert_eq!(check_oauth_error(&url("https://app.test/login")), None);
        assert_eq!(check_oauth_error(&url("https://app.test/login?error=")), None);
    }

    #[tokio::test]
    async fn test_initiate_redirects_on_success() {
        let backend = MockBackend::unauthorized()
            .with_oauth_url("https://accounts.google.com/o/oauth2/v2/auth?state=abc");
        let nav = MemoryNavigator::new("/login");

        initiate_google_oauth(&backend, &nav)
            .await
            .expect("initiation should succeed");
        assert_eq!(
            nav.history(),
            vec![Navigation::Redirect(
                "https://accounts.google.com/o/oauth2/v2/auth?state=abc".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_initiate_failure_is_generic() {
        let backend = MockBackend::unauthorized();
        let nav = MemoryNavigator::new("/login");

        let err = initiate_google_oauth(&backend, &nav)
            .await
            .expect_err("initiation should fail");
        assert_eq!(err.to_string(), "Failed to initiate Google login. Please try again.");
        assert!(nav.history().is_empty());
    }
}

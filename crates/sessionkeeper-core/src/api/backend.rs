// Seam between the session layer and the remote auth endpoints.
//
// `ApiClient` is the production implementation; tests inject fakes.

use async_trait::async_trait;

use super::ApiError;
use crate::models::UserIdentity;

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Fetch the identity behind the current session cookie
    async fn current_user(&self) -> Result<UserIdentity, ApiError>;

    /// Invalidate the server-side session
    async fn logout(&self) -> Result<(), ApiError>;

    /// Ask the backend for a Google authorization URL
    async fn google_auth_url(&self) -> Result<String, ApiError>;
}

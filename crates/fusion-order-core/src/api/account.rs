//! Login, registration and logout.

use tracing::{debug, info};

use crate::auth::SessionData;
use crate::models::{AuthRequest, AuthResponse, RegisterRequest, User};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Authenticate and store the returned bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.post("/auth/login", &request).await?;

        if auth.token.is_empty() {
            return Err(ApiError::Decode("login response carried no token".to_string()));
        }

        let session = SessionData::new(auth.token.clone())
            .with_user(auth.username.clone(), auth.role);
        self.credentials()
            .set_session(&session)
            .map_err(|e| ApiError::Credentials(e.to_string()))?;
        info!(username = %auth.display_name(), role = ?auth.role, "Logged in");
        Ok(auth)
    }

    /// Create an account. Admins use the same endpoint to add users.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let user: User = self.post("/auth/register", request).await?;
        debug!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Forget the local credential. The server keeps no session to end.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.credentials()
            .clear()
            .map_err(|e| ApiError::Credentials(e.to_string()))?;
        info!("Logged out");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials().is_present()
    }
}

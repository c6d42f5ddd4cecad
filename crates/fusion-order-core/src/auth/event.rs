/// Published by the dispatcher when the server revokes the session.
///
/// The credential has already been cleared by the time subscribers see
/// this; the host decides how to get the user back to `login_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SessionExpired { message: String, login_path: String },
}

impl AuthEvent {
    pub fn login_path(&self) -> &str {
        match self {
            AuthEvent::SessionExpired { login_path, .. } => login_path,
        }
    }
}

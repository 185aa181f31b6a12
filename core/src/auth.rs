//! Login flow.
//!
//! # Security
//! The backend exposes its stored credential record at `GET /auth` and the
//! client compares the submitted pair against it. The password therefore
//! travels to every client in plaintext and nothing stops a client from
//! skipping the comparison. This matches the backend contract as it exists;
//! a sound backend would verify credentials itself and return a verdict with
//! a session token.

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::resource::ResourceClient;
use crate::session::{SessionError, SessionStore};
use crate::transport::Transport;
use crate::types::Credentials;

pub const LOGIN_OK: &str = "Login successful! Welcome back!";
pub const LOGIN_REJECTED: &str = "Invalid username or password";
pub const LOGIN_UNREACHABLE: &str =
    "Failed to connect to the server. Please make sure the backend is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    InvalidCredentials,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Signs in iff both submitted fields equal the stored record. A mismatch
/// is an ordinary outcome and leaves the session untouched.
pub async fn sign_in<T: Transport>(
    client: &ResourceClient<T>,
    session: &SessionStore,
    notifier: &dyn Notifier,
    submitted: &Credentials,
) -> Result<LoginOutcome, LoginError> {
    let stored = match client.login().await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("could not fetch credentials: {e}");
            notifier.error(LOGIN_UNREACHABLE);
            return Err(e.into());
        }
    };

    if submitted.username != stored.username || submitted.password != stored.password {
        tracing::info!(username = %submitted.username, "login rejected");
        notifier.error(LOGIN_REJECTED);
        return Ok(LoginOutcome::InvalidCredentials);
    }

    session.login(&submitted.username)?;
    notifier.success(LOGIN_OK);
    Ok(LoginOutcome::Authenticated)
}

//! API session credentials.
//!
//! The server authenticates every call with a `(database, userName, sessionId)`
//! triple. Obtaining a session is out of scope; the triple is read from
//! configuration and forwarded untouched.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Credentials of an already established API session.
#[derive(Clone)]
pub struct Credentials {
    /// Database (tenant) name.
    pub database: String,
    /// User the session was issued to.
    pub user_name: String,
    /// Session id returned by the server's authenticate call.
    pub session_id: SecretString,
}

impl Credentials {
    pub fn new(
        database: impl Into<String>,
        user_name: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        let session_id: String = session_id.into();
        Self {
            database: database.into(),
            user_name: user_name.into(),
            session_id: SecretString::new(session_id.into()),
        }
    }

    /// Expose the session id for building a request body.
    pub fn session_id(&self) -> &str {
        self.session_id.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("database", &self.database)
            .field("user_name", &self.user_name)
            .field("session_id", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_session_id() {
        let creds = Credentials::new("fleet_db", "reporter@example.com", "s3cr3t-session");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("fleet_db"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cr3t-session"));
    }

    #[test]
    fn test_session_id_is_exposed_on_request() {
        let creds = Credentials::new("fleet_db", "reporter@example.com", "abc");
        assert_eq!(creds.session_id(), "abc");
    }
}

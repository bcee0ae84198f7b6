use serde::{Deserialize, Serialize};

/// Verified identity claim carried from the transport boundary.
///
/// Token signature verification happens in the API layer; by the time a
/// claim reaches application code its subject is trusted. A claim does
/// not imply a local user row exists yet -- identity resolution decides
/// that per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    subject: String,
    name: Option<String>,
    email: Option<String>,
}

impl IdentityClaim {
    /// Creates an identity claim from verified token claims.
    #[must_use]
    pub fn new(subject: impl Into<String>, name: Option<String>, email: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            name,
            email,
        }
    }

    /// Returns the stable subject identifier from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name, if the provider returned one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

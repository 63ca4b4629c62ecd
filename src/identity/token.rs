use std::fmt;

/// Short-lived credential produced by the identity provider's client SDK.
///
/// Consumed once by the issuer. Never persisted and never logged; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct IdToken(String);

impl IdToken {
    /// Absent and empty values are both treated as "no token".
    pub fn parse(raw: Option<String>) -> Option<Self> {
        match raw {
            Some(s) if !s.is_empty() => Some(Self(s)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdToken(<redacted, {} bytes>)", self.0.len())
    }
}

/// Signed credential minted by the identity provider and stored in the `session` cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionArtifact(String);

impl SessionArtifact {
    pub fn new<S: Into<String>>(value: S) -> Self { Self(value.into()) }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Debug for SessionArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionArtifact(<redacted, {} bytes>)", self.0.len())
    }
}

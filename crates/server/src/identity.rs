use std::collections::HashMap;
use std::fmt;

/// Opaque identity of an authenticated caller.
///
/// Inserted into request extensions by the bearer-auth middleware; handlers
/// read it with `Extension<CallerId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves a bearer token to a caller identity.
pub trait IdentityVerifier: Send + Sync {
    /// Returns `None` when the token is unknown or invalid.
    fn verify(&self, token: &str) -> Option<CallerId>;
}

/// Verifier backed by a fixed token -> user id table from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<CallerId> {
        self.tokens.get(token).map(|id| CallerId::new(id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_token_resolves_to_user() {
        let verifier = StaticTokenVerifier::default().with_token("t-1", "alice");
        assert_eq!(verifier.verify("t-1"), Some(CallerId::new("alice")));
        assert_eq!(verifier.verify("t-2"), None);
        assert_eq!(verifier.len(), 1);
    }

    #[test]
    fn empty_verifier_rejects_everything() {
        let verifier = StaticTokenVerifier::default();
        assert!(verifier.is_empty());
        assert!(verifier.verify("").is_none());
    }
}

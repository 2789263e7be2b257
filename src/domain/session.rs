use std::fmt;

/// Opaque bearer credential owned by the external session store.
///
/// The flow only reads it and attaches it to protected requests; it is never
/// mutated or persisted here. The debug form is redacted so tokens do not
/// leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

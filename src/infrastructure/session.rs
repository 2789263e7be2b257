use crate::domain::ports::TokenSource;
use crate::domain::session::AuthToken;

/// Environment variable consulted by default for the session token.
pub const DEFAULT_TOKEN_VAR: &str = "SUBFLOW_TOKEN";

/// Reads the session credential from a well-known environment variable.
///
/// The variable is owned by whatever signed the user in; this adapter only
/// reads it. Unset or blank counts as absent.
pub struct EnvTokenSource {
    var: String,
}

impl EnvTokenSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenSource {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_VAR)
    }
}

impl TokenSource for EnvTokenSource {
    fn token(&self) -> Option<AuthToken> {
        std::env::var(&self.var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(AuthToken::new)
    }
}

use crate::error::SubscribeError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// Accepts 07XXXXXXXX, 2547XXXXXXXX or +2547XXXXXXXX.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+254|254|0)?7\d{8}$").expect("pattern is valid"));

/// A validated M-Pesa mobile number.
///
/// Construction via `FromStr` is the only validation point: internal
/// whitespace and hyphens are stripped, and the remainder must match one of
/// the accepted prefix forms followed by `7` and eight digits. A value of
/// this type is the only phone representation that ever reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PhoneNumber {
    type Err = SubscribeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if MOBILE_PATTERN.is_match(&cleaned) {
            Ok(Self(cleaned))
        } else {
            Err(SubscribeError::InvalidPhone(raw.to_string()))
        }
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

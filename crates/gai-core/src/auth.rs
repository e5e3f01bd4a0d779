use subtle::ConstantTimeEq;

/// Header carrying the shared secret on every relay call.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Unauthorized,
}

impl Authorization {
    pub fn is_authorized(self) -> bool {
        self == Authorization::Authorized
    }
}

/// Check a presented key against the configured secret.
///
/// Exact byte equality only; a missing header is never authorized. Every
/// relay call site goes through here so the comparison scheme can change in
/// one place.
pub fn authorize(presented: Option<&str>, expected: &str) -> Authorization {
    let Some(presented) = presented else {
        return Authorization::Unauthorized;
    };
    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Authorization::Authorized
    } else {
        Authorization::Unauthorized
    }
}

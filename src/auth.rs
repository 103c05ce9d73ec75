//! The two independent credential checks of the service: the shared secret
//! carried in the path of every API route, and the basic-auth pair guarding
//! the documentation pages.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

/// Compares two strings in time independent of where they differ.
///
/// Both sides are hashed first so the comparison also does not leak the
/// length of the expected value.
pub fn constant_time_eq(supplied: &str, expected: &str) -> bool {
    let a = Sha256::digest(supplied.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Path secret for the conversion routes.
#[derive(Clone)]
pub struct ApiSecret {
    expected: String,
}

impl ApiSecret {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    pub fn verify(&self, supplied: &str) -> bool {
        constant_time_eq(supplied, &self.expected)
    }
}

impl std::fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSecret").finish_non_exhaustive()
    }
}

/// Username/password pair for the documentation pages.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks an `Authorization` header value of the form `Basic <base64>`.
    pub fn verify_header(&self, header: &str) -> bool {
        let Some((user, pass)) = decode_basic(header) else {
            return false;
        };
        // evaluate both so a wrong username costs the same as a wrong password
        let user_ok = constant_time_eq(&user, &self.username);
        let pass_ok = constant_time_eq(&pass, &self.password);
        user_ok & pass_ok
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

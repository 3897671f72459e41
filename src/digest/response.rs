//! Digest response computation.
//!
//! Implements the `qop=auth` branch of RFC 2617 with MD5:
//!
//! ```text
//! HA1      = MD5(username:realm:password)
//! HA2      = MD5(method:uri)
//! response = MD5(HA1:nonce:nc:cnonce:qop:HA2)
//! ```

use super::DigestChallenge;
use md5::{Digest, Md5};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// Length of a rendered client nonce in hex characters.
pub const CNONCE_LEN: usize = 16;

/// The only nonce count ever sent. Challenges are never reused.
const NONCE_COUNT: u32 = 1;

/// Device login credentials.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// A client-generated nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientNonce(String);

impl ClientNonce {
    /// Draws 8 bytes from the OS CSPRNG and renders them as hex.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CNONCE_LEN / 2];
        OsRng.fill_bytes(&mut bytes);
        let mut rendered = hex::encode(bytes);
        rendered.truncate(CNONCE_LEN);
        Self(rendered)
    }

    /// Wraps a known value. Used to reproduce a recorded exchange.
    pub fn from_static(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the nonce text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How the `nc` directive is rendered.
///
/// Jasminer firmware has been observed with a bare decimal `1`. RFC 2617
/// specifies eight zero-padded hex digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NonceCountFormat {
    /// `1`
    #[default]
    Decimal,
    /// `00000001`
    Padded,
}

impl NonceCountFormat {
    /// Renders a nonce count.
    pub fn render(self, count: u32) -> String {
        match self {
            NonceCountFormat::Decimal => count.to_string(),
            NonceCountFormat::Padded => format!("{:08x}", count),
        }
    }
}

/// A computed `Authorization` credential set for one request.
#[derive(Debug, Clone)]
pub struct DigestResponse {
    username: String,
    realm: String,
    nonce: String,
    uri: String,
    cnonce: String,
    nc: String,
    qop: String,
    response: String,
}

impl DigestResponse {
    /// Answers `challenge` for a request of `method` against `uri`.
    pub fn compute(
        challenge: &DigestChallenge,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        cnonce: &ClientNonce,
        nc_format: NonceCountFormat,
    ) -> Self {
        let nc = nc_format.render(NONCE_COUNT);
        let ha1 = md5_hex(&format!(
            "{}:{}:{}",
            credentials.username, challenge.realm, credentials.password
        ));
        let ha2 = md5_hex(&format!("{}:{}", method, uri));
        let response = md5_hex(&format!(
            "{}:{}:{}:{}:{}:{}",
            ha1,
            challenge.nonce,
            nc,
            cnonce.as_str(),
            challenge.qop,
            ha2
        ));

        Self {
            username: credentials.username.clone(),
            realm: challenge.realm.clone(),
            nonce: challenge.nonce.clone(),
            uri: uri.to_string(),
            cnonce: cnonce.as_str().to_string(),
            nc,
            qop: challenge.qop.clone(),
            response,
        }
    }

    /// The hex `response` digest.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Renders the `Authorization` header value.
    pub fn to_header(&self) -> String {
        format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", cnonce="{}", nc={}, qop="{}", response="{}""#,
            self.username, self.realm, self.nonce, self.uri, self.cnonce, self.nc, self.qop, self.response
        )
    }
}

fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

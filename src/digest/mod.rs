//! HTTP digest authentication client.
//!
//! Jasminer devices guard their CGI endpoints with RFC 2617 digest
//! authentication. This module performs the challenge/response handshake
//! by hand:
//!
//! ```text
//! GET uri                    →  401 + WWW-Authenticate: Digest realm, nonce, qop
//! GET uri + Authorization    →  200 + body
//! ```
//!
//! No session is kept. Every fetch negotiates a new challenge and a new
//! client nonce, and always sends nonce count `1`.

mod challenge;
mod client;
mod response;

pub use challenge::DigestChallenge;
pub use client::{DigestClient, DEFAULT_TIMEOUT};
pub use response::{ClientNonce, Credentials, DigestResponse, NonceCountFormat, CNONCE_LEN};

use thiserror::Error;

/// Broad class of a digest failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, timeout or body read error.
    Network,
    /// The device rejected the credentials.
    Auth,
    /// The device answered with something the handshake cannot use.
    Protocol,
}

/// Errors that can occur while fetching through digest authentication.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("credentials for {username:?} rejected with status {status}")]
    Rejected { status: u16, username: String },

    #[error("response carried no digest WWW-Authenticate challenge")]
    MissingChallenge,

    #[error("unsupported authentication scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("digest challenge is missing the {0} directive")]
    MissingDirective(&'static str),

    #[error("unsupported qop {0:?} (only auth is handled)")]
    UnsupportedQop(String),

    #[error("authenticated request returned status {0}")]
    UnexpectedStatus(u16),
}

impl DigestError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DigestError::Network(_) => ErrorKind::Network,
            DigestError::Rejected { .. } => ErrorKind::Auth,
            DigestError::MissingChallenge
            | DigestError::UnsupportedScheme(_)
            | DigestError::MissingDirective(_)
            | DigestError::UnsupportedQop(_)
            | DigestError::UnexpectedStatus(_) => ErrorKind::Protocol,
        }
    }
}

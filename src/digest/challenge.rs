//! `WWW-Authenticate` challenge parsing.
//!
//! Only the directives needed for `qop=auth` digests are extracted.
//! Everything else in the header (`opaque`, `algorithm`, `stale`) is ignored.

use super::DigestError;

/// Quality of protection this client can answer.
const QOP_AUTH: &str = "auth";

/// A server-issued digest challenge.
///
/// Valid for exactly one authenticated request. The client never caches
/// a challenge across polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    /// Protection space the credentials belong to.
    pub realm: String,
    /// Server nonce.
    pub nonce: String,
    /// Selected quality of protection.
    pub qop: String,
}

impl DigestChallenge {
    /// Parses the value of a `WWW-Authenticate` header.
    ///
    /// The header must use the `Digest` scheme and carry `realm`, `nonce`
    /// and `qop` directives.
    pub fn parse(header: &str) -> Result<Self, DigestError> {
        let header = header.trim();
        let (scheme, params) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
        if !scheme.eq_ignore_ascii_case("digest") {
            return Err(DigestError::UnsupportedScheme(scheme.to_string()));
        }

        let mut realm = None;
        let mut nonce = None;
        let mut qop = None;

        for directive in split_directives(params) {
            let Some((name, value)) = directive.split_once('=') else {
                continue;
            };
            let value = directive_value(value);
            match name.trim().to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "qop" => qop = Some(value),
                _ => {}
            }
        }

        let realm = realm.ok_or(DigestError::MissingDirective("realm"))?;
        let nonce = nonce.ok_or(DigestError::MissingDirective("nonce"))?;
        let qop = qop.ok_or(DigestError::MissingDirective("qop"))?;
        Ok(Self {
            realm,
            nonce,
            qop: select_qop(&qop)?,
        })
    }

    /// Picks the first digest challenge out of a set of header values.
    ///
    /// Servers may offer several schemes (`Basic`, `Digest`) in separate
    /// headers. Returns `MissingChallenge` when none of them is a digest.
    pub fn from_headers<'a, I>(values: I) -> Result<Self, DigestError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut last_error = DigestError::MissingChallenge;
        for value in values {
            match Self::parse(value) {
                Ok(challenge) => return Ok(challenge),
                Err(DigestError::UnsupportedScheme(scheme)) => {
                    tracing::debug!(%scheme, "Skipping non-digest challenge");
                }
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

/// Splits directives on commas that are not inside a quoted string.
fn split_directives(params: &str) -> Vec<&str> {
    let mut directives = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in params.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                directives.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    directives.push(params[start..].trim());
    directives.retain(|d| !d.is_empty());
    directives
}

/// Takes the text between the first pair of double quotes, or the bare
/// token when the value is unquoted.
fn directive_value(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_prefix('"') {
        Some(rest) => rest.split('"').next().unwrap_or_default().to_string(),
        None => raw.to_string(),
    }
}

fn select_qop(offered: &str) -> Result<String, DigestError> {
    offered
        .split(',')
        .map(str::trim)
        .find(|q| q.eq_ignore_ascii_case(QOP_AUTH))
        .map(|_| QOP_AUTH.to_string())
        .ok_or_else(|| DigestError::UnsupportedQop(offered.to_string()))
}

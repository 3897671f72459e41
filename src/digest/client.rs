//! Two-request digest handshake over `reqwest`.

use super::{ClientNonce, Credentials, DigestChallenge, DigestError, DigestResponse, NonceCountFormat};
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::StatusCode;
use std::time::Duration;

/// Default timeout applied to every round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const METHOD: &str = "GET";

/// HTTP client that answers a fresh digest challenge on every fetch.
///
/// Each call to [`DigestClient::fetch`] costs two round trips: one to
/// collect the challenge, one to send the authenticated request.
#[derive(Debug, Clone)]
pub struct DigestClient {
    http: reqwest::Client,
    credentials: Credentials,
    nc_format: NonceCountFormat,
}

impl DigestClient {
    /// Creates a client with the default timeout and nonce count format.
    pub fn new(credentials: Credentials) -> Result<Self, DigestError> {
        Self::with_options(credentials, DEFAULT_TIMEOUT, NonceCountFormat::default())
    }

    /// Creates a client with an explicit timeout and nonce count format.
    pub fn with_options(
        credentials: Credentials,
        timeout: Duration,
        nc_format: NonceCountFormat,
    ) -> Result<Self, DigestError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            credentials,
            nc_format,
        })
    }

    /// Fetches `uri` behind digest authentication and returns the body.
    pub async fn fetch(&self, uri: &str) -> Result<Bytes, DigestError> {
        let unauthorized = self.http.get(uri).send().await?;
        let challenge = DigestChallenge::from_headers(
            unauthorized
                .headers()
                .get_all(WWW_AUTHENTICATE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        )?;
        tracing::debug!(
            uri,
            status = unauthorized.status().as_u16(),
            realm = %challenge.realm,
            "Received digest challenge"
        );
        // The challenge body must be drained for the connection to be reused.
        if let Err(e) = unauthorized.bytes().await {
            tracing::debug!(uri, error = %e, "Failed to drain challenge body");
        }

        let authorization = DigestResponse::compute(
            &challenge,
            &self.credentials,
            METHOD,
            uri,
            &ClientNonce::generate(),
            self.nc_format,
        );

        let response = self
            .http
            .get(uri)
            .header(AUTHORIZATION, authorization.to_header())
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.bytes().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DigestError::Rejected {
                status: response.status().as_u16(),
                username: self.credentials.username().to_string(),
            }),
            status => Err(DigestError::UnexpectedStatus(status.as_u16())),
        }
    }
}

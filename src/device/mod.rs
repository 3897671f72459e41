//! Jasminer device access and payload decoding.
//!
//! A poll fetches two CGI endpoints through the digest client and decodes
//! them into a [`DeviceSnapshot`]. Any failure aborts the whole poll; no
//! partial snapshot is ever returned.

mod payload;
mod snapshot;

pub use payload::{parse, parse_identity, parse_status, parse_unit_value, ParseError};
pub use snapshot::{
    BoardReading, DeviceIdentity, DeviceSnapshot, DeviceStatus, FanSpeeds, NetworkInfo,
    PoolReading,
};

use crate::digest::{DigestClient, DigestError};
use thiserror::Error;

/// Identity and network information.
pub const IDENTITY_ENDPOINT: &str = "/cgi-bin/index.cgi";
/// Hashrate, boards and pools.
pub const STATUS_ENDPOINT: &str = "/cgi-bin/minerStatus.cgi";

/// Errors that abort a poll.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("fetching {endpoint} failed: {source}")]
    Fetch {
        endpoint: &'static str,
        source: DigestError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A Jasminer device reachable over HTTP.
#[derive(Debug, Clone)]
pub struct Device {
    base_uri: String,
    client: DigestClient,
}

impl Device {
    /// Creates a device handle. A trailing `/` on `base_uri` is dropped.
    pub fn new(base_uri: impl Into<String>, client: DigestClient) -> Self {
        let mut base_uri = base_uri.into();
        while base_uri.ends_with('/') {
            base_uri.pop();
        }
        Self { base_uri, client }
    }

    /// Returns the base URI.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Fetches and decodes both payloads.
    pub async fn poll(&self) -> Result<DeviceSnapshot, PollError> {
        let identity = self.fetch(IDENTITY_ENDPOINT).await?;
        let status = self.fetch(STATUS_ENDPOINT).await?;

        let snapshot = parse(&identity, &status)?;
        tracing::debug!(
            boards = snapshot.status.boards.len(),
            pools = snapshot.status.pools.len(),
            "Device polled"
        );
        Ok(snapshot)
    }

    async fn fetch(&self, endpoint: &'static str) -> Result<bytes::Bytes, PollError> {
        let uri = format!("{}{}", self.base_uri, endpoint);
        self.client
            .fetch(&uri)
            .await
            .map_err(|source| PollError::Fetch { endpoint, source })
    }
}

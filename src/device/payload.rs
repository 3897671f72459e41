//! Decoding of the two device JSON payloads.
//!
//! The firmware mixes plain numbers with unit-suffixed strings
//! (`"254.31 MH/s"`, `"0.00 %"`) and omits optional pool fields instead of
//! sending empty strings. Decoding walks the JSON tree with a path-aware
//! cursor so every failure names the exact field that broke it.

use super::snapshot::{
    BoardReading, DeviceIdentity, DeviceSnapshot, DeviceStatus, FanSpeeds, NetworkInfo,
    PoolReading,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while decoding device payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed {document} JSON: {source}")]
    Malformed {
        document: &'static str,
        source: serde_json::Error,
    },

    #[error("{document}: missing field {path}")]
    MissingField { document: &'static str, path: String },

    #[error("{document}: field {path} should be {expected}")]
    WrongType {
        document: &'static str,
        path: String,
        expected: &'static str,
    },

    #[error("{document}: field {path} has no numeric value in {value:?}")]
    NotNumeric {
        document: &'static str,
        path: String,
        value: String,
    },
}

impl ParseError {
    /// Dotted path of the offending field, if the error concerns one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ParseError::Malformed { .. } => None,
            ParseError::MissingField { path, .. }
            | ParseError::WrongType { path, .. }
            | ParseError::NotNumeric { path, .. } => Some(path),
        }
    }
}

const IDENTITY: &str = "identity";
const STATUS: &str = "status";

/// Decodes the identity and status payloads into one snapshot.
pub fn parse(identity_json: &[u8], status_json: &[u8]) -> Result<DeviceSnapshot, ParseError> {
    Ok(DeviceSnapshot {
        identity: parse_identity(identity_json)?,
        status: parse_status(status_json)?,
    })
}

/// Decodes the `index.cgi` payload.
pub fn parse_identity(json: &[u8]) -> Result<DeviceIdentity, ParseError> {
    let root = decode(IDENTITY, json)?;
    let root = Node::root(IDENTITY, &root);

    Ok(DeviceIdentity {
        miner_type: root.optional_str("minertype")?,
        firmware_version: root.optional_str("fs_version")?,
        mem_total: root.field("mem_total")?.unit_number()?,
        mem_used: root.field("mem_used")?.unit_number()?,
        mem_free: root.field("mem_free")?.unit_number()?,
        network: NetworkInfo {
            kind: root.optional_str("nettype")?,
            mac: root.optional_str("macaddr")?,
            ip: root.optional_str("ipaddress")?,
            netmask: root.optional_str("netmask")?,
            gateway: root.optional_str("gateway")?,
            dns1: root.optional_str("dns1")?,
            dns2: root.optional_str("dns2")?,
        },
    })
}

/// Decodes the `minerStatus.cgi` payload.
pub fn parse_status(json: &[u8]) -> Result<DeviceStatus, ParseError> {
    let root = decode(STATUS, json)?;
    let root = Node::root(STATUS, &root);

    let summary = root.field("summary")?;
    let boards = root.field("boards")?;
    let pools = root.field("pools")?;

    let board_list = boards
        .field("board")?
        .elements()?
        .into_iter()
        .enumerate()
        .map(|(index, board)| -> Result<BoardReading, ParseError> {
            Ok(BoardReading {
                index,
                rate: board.field("rate")?.unit_number()?,
                asics: board.field("asics")?.number()?,
                freq: board.field("freq")?.number()?,
                temp: board.field("temp")?.number()?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    let pool_list = pools
        .field("pool")?
        .elements()?
        .into_iter()
        .enumerate()
        .map(|(index, pool)| -> Result<PoolReading, ParseError> {
            Ok(PoolReading {
                index,
                status: pool.field("status")?.string()?.to_string(),
                user: pool.optional_str("user")?,
                url: pool.optional_str("url")?,
                works: pool.field("works")?.number()?,
                accepted: pool.field("accept")?.number()?,
                rejected: pool.field("reject")?.number()?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(DeviceStatus {
        uptime_secs: summary.field("uptime")?.number()?,
        rate_realtime: summary.field("rt")?.unit_number()?,
        rate_average: summary.field("avg")?.unit_number()?,
        reject_rate: summary.field("rejectRate")?.unit_number()?,
        fans: FanSpeeds {
            fan1: boards.field("fan1")?.number()?,
            fan2: boards.field("fan2")?.number()?,
        },
        boards: board_list,
        pools: pool_list,
    })
}

/// Parses the number in front of a unit suffix.
///
/// The first whitespace-delimited token must be a number: `"123.45 MH/s"`
/// gives `123.45`, `"1e3 MH/s"` gives `1000`. A unit glued to the number
/// (`"71.5C"`) is split off, unless the number itself runs on with a `,`
/// or an exponent, in which case the value is rejected rather than cut
/// short. Returns `None` when no number can be read.
pub fn parse_unit_value(text: &str) -> Option<f64> {
    let token = text.split_whitespace().next()?;
    if let Ok(value) = token.parse::<f64>() {
        return value.is_finite().then_some(value);
    }

    let end = token
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    match token[end..].chars().next() {
        Some(',' | 'e' | 'E') => None,
        _ => token[..end].parse().ok(),
    }
}

fn decode(document: &'static str, json: &[u8]) -> Result<Value, ParseError> {
    serde_json::from_slice(json).map_err(|source| ParseError::Malformed { document, source })
}

/// A JSON value together with the path that led to it.
struct Node<'a> {
    document: &'static str,
    path: String,
    value: &'a Value,
}

impl<'a> Node<'a> {
    fn root(document: &'static str, value: &'a Value) -> Self {
        Self {
            document,
            path: String::new(),
            value,
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn object(&self) -> Result<&'a Map<String, Value>, ParseError> {
        self.value.as_object().ok_or_else(|| self.wrong_type("an object"))
    }

    fn field(&self, key: &str) -> Result<Node<'a>, ParseError> {
        let path = self.child_path(key);
        match self.object()?.get(key) {
            Some(value) => Ok(Node {
                document: self.document,
                path,
                value,
            }),
            None => Err(ParseError::MissingField {
                document: self.document,
                path,
            }),
        }
    }

    /// A string field that may be absent or `null`.
    fn optional_str(&self, key: &str) -> Result<String, ParseError> {
        match self.field(key) {
            Ok(node) if node.value.is_null() => Ok(String::new()),
            Ok(node) => node.string().map(str::to_string),
            Err(ParseError::MissingField { .. }) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    fn elements(&self) -> Result<Vec<Node<'a>>, ParseError> {
        let items = self.value.as_array().ok_or_else(|| self.wrong_type("an array"))?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, value)| Node {
                document: self.document,
                path: format!("{}[{}]", self.path, i),
                value,
            })
            .collect())
    }

    fn string(&self) -> Result<&'a str, ParseError> {
        self.value.as_str().ok_or_else(|| self.wrong_type("a string"))
    }

    fn number(&self) -> Result<f64, ParseError> {
        self.value.as_f64().ok_or_else(|| self.wrong_type("a number"))
    }

    /// A number embedded in a string with a trailing unit.
    ///
    /// Bare JSON numbers are accepted as well.
    fn unit_number(&self) -> Result<f64, ParseError> {
        if let Some(n) = self.value.as_f64() {
            return Ok(n);
        }
        let text = self
            .value
            .as_str()
            .ok_or_else(|| self.wrong_type("a number or numeric string"))?;
        parse_unit_value(text).ok_or_else(|| ParseError::NotNumeric {
            document: self.document,
            path: self.path.clone(),
            value: text.to_string(),
        })
    }

    fn wrong_type(&self, expected: &'static str) -> ParseError {
        ParseError::WrongType {
            document: self.document,
            path: if self.path.is_empty() {
                "(root)".to_string()
            } else {
                self.path.clone()
            },
            expected,
        }
    }
}

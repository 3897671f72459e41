//! Jasminer Prometheus Exporter Library
//!
//! Polls a Jasminer mining rig's embedded web interface and republishes
//! its status as Prometheus gauges. The device's CGI endpoints sit behind
//! HTTP digest authentication, which this crate answers by hand.
//!
//! # Architecture
//!
//! Every scrape runs one poll end to end:
//!
//! ```text
//! GET /metrics → digest (×2 endpoints) → device::parse → MetricAdapter → encode
//! ```
//!
//! # Design Principles
//!
//! - **No state between polls**: every scrape renegotiates the digest
//!   challenge and builds a fresh snapshot
//! - **Contained failures**: a failed poll reports `jasminer_up 0` instead
//!   of taking the exporter down
//! - **Typed decoding**: payload errors name the offending field path
//!
//! # Example
//!
//! ```no_run
//! use jasminer_exporter::{
//!     device::Device,
//!     digest::{Credentials, DigestClient},
//!     metrics::{MetricAdapter, MetricTable},
//!     Exporter,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DigestClient::new(Credentials::new("root", "root"))?;
//! let device = Device::new("http://192.168.1.50", client);
//! let exporter = Exporter::new(device, MetricAdapter::new(MetricTable::default()));
//!
//! let text = exporter.render().await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod device;
pub mod digest;
pub mod exporter;
pub mod metrics;

// Re-export commonly used types at crate root
pub use config::{Cli, ConfigError, ExporterConfig};
pub use device::{Device, DeviceSnapshot, ParseError, PollError};
pub use digest::{Credentials, DigestClient, DigestError};
pub use exporter::{Exporter, Scrape};
pub use metrics::{MetricAdapter, MetricTable, MetricsServer, MetricsServerConfig, Observation};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Prometheus metrics for Jasminer devices.
//!
//! This module turns a [`DeviceSnapshot`](crate::device::DeviceSnapshot)
//! into gauge observations and serves them in Prometheus text format.
//!
//! # Metrics Exposed
//!
//! ## Identity
//! - `jasminer_miner{type}` - Miner model (always 1)
//! - `jasminer_version{datetime}` - Firmware version (always 1)
//! - `jasminer_mem_total`, `jasminer_mem_used`, `jasminer_mem_free` - Memory
//! - `jasminer_network{type,mac,ip,mask,gateway,dns1,dns2}` - Network setup (always 1)
//!
//! ## Mining
//! - `jasminer_uptime` - Uptime in seconds
//! - `jasminer_rate_realtime`, `jasminer_rate_average` - Hashrate in MH/s
//! - `jasminer_reject_rate` - Reject rate in %
//! - `jasminer_fan_speed{device}` - Fan speed
//! - `jasminer_board_rate{device,asics,freq}` - Board hashrate in MH/s
//! - `jasminer_board_temp{device}` - Board temperature in °C
//!
//! ## Pools
//! - `jasminer_pool_config{pool,status,user,url}` - Pool setup (always 1)
//! - `jasminer_pool_works{pool}`, `jasminer_pool_accepted{pool}`, `jasminer_pool_rejected{pool}`
//!
//! ## Exporter
//! - `jasminer_up` - 1 when the device poll succeeded, 0 otherwise
//! - `jasminer_scrape_duration_seconds` - Time spent polling the device
//!
//! # Example
//!
//! ```
//! use jasminer_exporter::device::DeviceSnapshot;
//! use jasminer_exporter::metrics::{encode, MetricAdapter, MetricTable};
//!
//! let adapter = MetricAdapter::new(MetricTable::default());
//! let observations = adapter.observe(&DeviceSnapshot::default());
//! let text = encode(adapter.table(), &observations).unwrap();
//! assert!(text.contains("jasminer_uptime 0"));
//! ```

mod adapter;
mod collector;
mod server;
mod table;

pub use adapter::{MetricAdapter, Observation};
pub use collector::{encode, MetricsError};
pub use server::{MetricsServer, MetricsServerConfig, ServerError, DEFAULT_METRICS_PATH, DEFAULT_PORT};
pub use table::{MetricDef, MetricTable, NAMESPACE};

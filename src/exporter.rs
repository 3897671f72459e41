//! One scrape: poll the device, map the snapshot, encode.

use crate::device::{Device, PollError};
use crate::metrics::{encode, MetricAdapter, MetricsError, Observation};
use std::time::Instant;

/// Result of polling the device for one scrape.
#[derive(Debug)]
pub struct Scrape {
    /// Device observations followed by the exporter self-metrics.
    pub observations: Vec<Observation>,
    /// The poll error, when the device could not be read.
    pub error: Option<PollError>,
}

impl Scrape {
    /// Whether the device was read successfully.
    pub fn is_up(&self) -> bool {
        self.error.is_none()
    }
}

/// Couples a device with the metric adapter.
#[derive(Debug, Clone)]
pub struct Exporter {
    device: Device,
    adapter: MetricAdapter,
}

impl Exporter {
    /// Creates an exporter.
    pub fn new(device: Device, adapter: MetricAdapter) -> Self {
        Self { device, adapter }
    }

    /// Polls the device once.
    ///
    /// A failed poll yields only the self-metrics, with `up` set to 0.
    pub async fn scrape(&self) -> Scrape {
        let started = Instant::now();
        let result = self.device.poll().await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(snapshot) => {
                let mut observations = self.adapter.observe(&snapshot);
                observations.extend(self.adapter.scrape_status(true, elapsed));
                Scrape {
                    observations,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    device = %self.device.base_uri(),
                    error = %e,
                    "Device poll failed"
                );
                Scrape {
                    observations: self.adapter.scrape_status(false, elapsed),
                    error: Some(e),
                }
            }
        }
    }

    /// Polls the device and renders the Prometheus text exposition.
    pub async fn render(&self) -> Result<String, MetricsError> {
        let scrape = self.scrape().await;
        encode(self.adapter.table(), &scrape.observations)
    }
}

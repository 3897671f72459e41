//! Prometheus text exposition of observations.

use super::adapter::Observation;
use super::table::MetricTable;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("observation for unknown metric {0}")]
    UnknownMetric(String),
}

/// Encodes one scrape's observations in Prometheus text format.
///
/// A fresh registry is built for every scrape, so families that were
/// present in a previous scrape but not in this one simply disappear.
pub fn encode(table: &MetricTable, observations: &[Observation]) -> Result<String, MetricsError> {
    let registry = Registry::new();
    let mut gauges: HashMap<&str, GaugeVec> = HashMap::new();

    for def in table.definitions() {
        let gauge = GaugeVec::new(Opts::new(def.name.as_str(), def.help), def.labels)?;
        registry.register(Box::new(gauge.clone()))?;
        gauges.insert(def.name.as_str(), gauge);
    }

    for obs in observations {
        let gauge = gauges
            .get(obs.name.as_str())
            .ok_or_else(|| MetricsError::UnknownMetric(obs.name.clone()))?;
        let values: Vec<&str> = obs.labels.iter().map(|(_, v)| v.as_str()).collect();
        gauge.get_metric_with_label_values(&values)?.set(obs.value);
    }

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

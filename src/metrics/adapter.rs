//! Snapshot to gauge observations.

use super::table::{MetricDef, MetricTable};
use crate::device::DeviceSnapshot;

/// One gauge sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Fully qualified metric name.
    pub name: String,
    /// Label name/value pairs, in the order of the metric definition.
    pub labels: Vec<(&'static str, String)>,
    /// Sample value.
    pub value: f64,
}

impl Observation {
    fn new(def: &MetricDef, values: &[&str], value: f64) -> Self {
        debug_assert_eq!(def.labels.len(), values.len(), "label arity for {}", def.name);
        Self {
            name: def.name.clone(),
            labels: def
                .labels
                .iter()
                .zip(values)
                .map(|(name, value)| (*name, value.to_string()))
                .collect(),
            value,
        }
    }

    /// Returns the value of a label.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Maps device snapshots onto the metric table.
///
/// Values pass through unchanged. Boards and pools produce one group of
/// observations per entry, labeled by position.
#[derive(Debug, Clone, Default)]
pub struct MetricAdapter {
    table: MetricTable,
}

impl MetricAdapter {
    /// Creates an adapter over the given table.
    pub fn new(table: MetricTable) -> Self {
        Self { table }
    }

    /// Returns the metric table.
    pub fn table(&self) -> &MetricTable {
        &self.table
    }

    /// Produces the observations for one snapshot.
    pub fn observe(&self, snapshot: &DeviceSnapshot) -> Vec<Observation> {
        let t = &self.table;
        let identity = &snapshot.identity;
        let status = &snapshot.status;
        let net = &identity.network;

        let mut out = vec![
            Observation::new(&t.miner, &[&identity.miner_type], 1.0),
            Observation::new(&t.version, &[&identity.firmware_version], 1.0),
            Observation::new(&t.mem_total, &[], identity.mem_total),
            Observation::new(&t.mem_used, &[], identity.mem_used),
            Observation::new(&t.mem_free, &[], identity.mem_free),
            Observation::new(
                &t.network,
                &[
                    &net.kind,
                    &net.mac,
                    &net.ip,
                    &net.netmask,
                    &net.gateway,
                    &net.dns1,
                    &net.dns2,
                ],
                1.0,
            ),
            Observation::new(&t.uptime, &[], status.uptime_secs),
            Observation::new(&t.rate_realtime, &[], status.rate_realtime),
            Observation::new(&t.rate_average, &[], status.rate_average),
            Observation::new(&t.reject_rate, &[], status.reject_rate),
            Observation::new(&t.fan_speed, &["fan1"], status.fans.fan1),
            Observation::new(&t.fan_speed, &["fan2"], status.fans.fan2),
        ];

        for board in &status.boards {
            let label = board.label();
            let asics = format!("{:.0}", board.asics);
            let freq = format!("{:.0}", board.freq);
            out.push(Observation::new(&t.board_rate, &[&label, &asics, &freq], board.rate));
            out.push(Observation::new(&t.board_temp, &[&label], board.temp));
        }

        for pool in &status.pools {
            let label = pool.label();
            out.push(Observation::new(
                &t.pool_config,
                &[&label, &pool.status, &pool.user, &pool.url],
                1.0,
            ));
            out.push(Observation::new(&t.pool_works, &[&label], pool.works));
            out.push(Observation::new(&t.pool_accepted, &[&label], pool.accepted));
            out.push(Observation::new(&t.pool_rejected, &[&label], pool.rejected));
        }

        out
    }

    /// Exporter self-metrics for one scrape.
    pub fn scrape_status(&self, up: bool, duration_secs: f64) -> Vec<Observation> {
        vec![
            Observation::new(&self.table.up, &[], if up { 1.0 } else { 0.0 }),
            Observation::new(&self.table.scrape_duration, &[], duration_secs),
        ]
    }
}

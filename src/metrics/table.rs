//! Metric family definitions.
//!
//! The table is built once at startup and handed to the adapter and the
//! encoder. Nothing is registered globally.

/// Default metric namespace.
pub const NAMESPACE: &str = "jasminer";

/// One gauge family: fully qualified name, help text and label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDef {
    /// Fully qualified metric name, e.g. `jasminer_uptime`.
    pub name: String,
    /// Help text.
    pub help: &'static str,
    /// Label names, in the order the adapter supplies values.
    pub labels: &'static [&'static str],
}

impl MetricDef {
    fn new(
        namespace: &str,
        name: &str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name: format!("{}_{}", namespace, name),
            help,
            labels,
        }
    }
}

/// Every gauge family the exporter can emit.
#[derive(Debug, Clone)]
pub struct MetricTable {
    /// Miner model, value always 1.
    pub miner: MetricDef,
    /// Firmware version, value always 1.
    pub version: MetricDef,
    /// Total memory.
    pub mem_total: MetricDef,
    /// Used memory.
    pub mem_used: MetricDef,
    /// Free memory.
    pub mem_free: MetricDef,
    /// Network configuration, value always 1.
    pub network: MetricDef,
    /// Uptime in seconds.
    pub uptime: MetricDef,
    /// Realtime hashrate.
    pub rate_realtime: MetricDef,
    /// Average hashrate.
    pub rate_average: MetricDef,
    /// Reject rate.
    pub reject_rate: MetricDef,
    /// Fan speed per fan.
    pub fan_speed: MetricDef,
    /// Hashrate per board.
    pub board_rate: MetricDef,
    /// Temperature per board.
    pub board_temp: MetricDef,
    /// Pool configuration, value always 1.
    pub pool_config: MetricDef,
    /// Works per pool.
    pub pool_works: MetricDef,
    /// Accepted shares per pool.
    pub pool_accepted: MetricDef,
    /// Rejected shares per pool.
    pub pool_rejected: MetricDef,
    /// Whether the last poll succeeded.
    pub up: MetricDef,
    /// Time spent polling the device.
    pub scrape_duration: MetricDef,
}

impl MetricTable {
    /// Builds the table under a custom namespace.
    pub fn new(namespace: &str) -> Self {
        let def = |name: &str, help: &'static str, labels: &'static [&'static str]| {
            MetricDef::new(namespace, name, help, labels)
        };

        Self {
            miner: def("miner", "Type description", &["type"]),
            version: def("version", "Version", &["datetime"]),
            mem_total: def("mem_total", "Total memory", &[]),
            mem_used: def("mem_used", "Used memory", &[]),
            mem_free: def("mem_free", "Free memory", &[]),
            network: def(
                "network",
                "Network configuration",
                &["type", "mac", "ip", "mask", "gateway", "dns1", "dns2"],
            ),
            uptime: def("uptime", "Uptime in seconds", &[]),
            rate_realtime: def("rate_realtime", "Realtime hashrate (in MH/s)", &[]),
            rate_average: def("rate_average", "Average hashrate (in MH/s)", &[]),
            reject_rate: def("reject_rate", "Reject rate (in %)", &[]),
            fan_speed: def("fan_speed", "Fan speed", &["device"]),
            board_rate: def(
                "board_rate",
                "Board hashrate (in MH/s)",
                &["device", "asics", "freq"],
            ),
            board_temp: def("board_temp", "Board temperature (in °C)", &["device"]),
            pool_config: def(
                "pool_config",
                "Pool configuration",
                &["pool", "status", "user", "url"],
            ),
            pool_works: def("pool_works", "Pool works", &["pool"]),
            pool_accepted: def("pool_accepted", "Pool accepted", &["pool"]),
            pool_rejected: def("pool_rejected", "Pool rejected", &["pool"]),
            up: def("up", "Whether the last device poll succeeded (1) or failed (0)", &[]),
            scrape_duration: def(
                "scrape_duration_seconds",
                "Time spent polling the device",
                &[],
            ),
        }
    }

    /// All definitions, in exposition order.
    pub fn definitions(&self) -> [&MetricDef; 19] {
        [
            &self.miner,
            &self.version,
            &self.mem_total,
            &self.mem_used,
            &self.mem_free,
            &self.network,
            &self.uptime,
            &self.rate_realtime,
            &self.rate_average,
            &self.reject_rate,
            &self.fan_speed,
            &self.board_rate,
            &self.board_temp,
            &self.pool_config,
            &self.pool_works,
            &self.pool_accepted,
            &self.pool_rejected,
            &self.up,
            &self.scrape_duration,
        ]
    }
}

impl Default for MetricTable {
    fn default() -> Self {
        Self::new(NAMESPACE)
    }
}

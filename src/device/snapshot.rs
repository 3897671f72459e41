//! Typed readings from one poll.

/// Device identity and network configuration from `index.cgi`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceIdentity {
    /// Miner model, e.g. `JASMINER-X4`.
    pub miner_type: String,
    /// Firmware build string.
    pub firmware_version: String,
    /// Total memory as reported by the device.
    pub mem_total: f64,
    /// Used memory.
    pub mem_used: f64,
    /// Free memory.
    pub mem_free: f64,
    /// Network configuration.
    pub network: NetworkInfo,
}

/// Network settings, reported as label values only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInfo {
    /// `DHCP` or `Static`.
    pub kind: String,
    /// MAC address.
    pub mac: String,
    /// IPv4 address.
    pub ip: String,
    /// Subnet mask.
    pub netmask: String,
    /// Default gateway.
    pub gateway: String,
    /// Primary DNS server.
    pub dns1: String,
    /// Secondary DNS server.
    pub dns2: String,
}

/// One hashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardReading {
    /// Position in the device's board list.
    pub index: usize,
    /// Hashrate in MH/s.
    pub rate: f64,
    /// Number of ASIC chips on the board.
    pub asics: f64,
    /// Chip frequency in MHz.
    pub freq: f64,
    /// Temperature in °C.
    pub temp: f64,
}

impl BoardReading {
    /// Label used for this board, `board0`, `board1`, ...
    pub fn label(&self) -> String {
        format!("board{}", self.index)
    }
}

/// One configured mining pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolReading {
    /// Position in the device's pool list.
    pub index: usize,
    /// Connection status as reported, e.g. `Alive`.
    pub status: String,
    /// Worker name, empty when the device omits it.
    pub user: String,
    /// Stratum URL, empty when the device omits it.
    pub url: String,
    /// Work units received.
    pub works: f64,
    /// Accepted shares.
    pub accepted: f64,
    /// Rejected shares.
    pub rejected: f64,
}

impl PoolReading {
    /// Label used for this pool, `pool0`, `pool1`, ...
    pub fn label(&self) -> String {
        format!("pool{}", self.index)
    }
}

/// Both fan speeds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FanSpeeds {
    /// First fan, RPM.
    pub fan1: f64,
    /// Second fan, RPM.
    pub fan2: f64,
}

/// Mining status from `minerStatus.cgi`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceStatus {
    /// Seconds since the miner started.
    pub uptime_secs: f64,
    /// Realtime hashrate in MH/s.
    pub rate_realtime: f64,
    /// Average hashrate in MH/s.
    pub rate_average: f64,
    /// Reject rate in percent.
    pub reject_rate: f64,
    /// Fan speeds.
    pub fans: FanSpeeds,
    /// Boards in device order.
    pub boards: Vec<BoardReading>,
    /// Pools in device order.
    pub pools: Vec<PoolReading>,
}

/// Everything read from the device in one poll.
///
/// Built fresh for each scrape and dropped once metrics are encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    /// Identity payload.
    pub identity: DeviceIdentity,
    /// Status payload.
    pub status: DeviceStatus,
}

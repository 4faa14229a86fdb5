//! Raw observations produced by the per-host samplers.

use crate::Endpoint;

/// One row of a node's connection trace.
///
/// Records are immutable once parsed. A node produces an ordered sequence of
/// them per capture window; the node they came from is carried by whatever
/// owns the sequence, not by the record itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionRecord {
    pub local: Endpoint,
    pub remote: Endpoint,

    /// Opaque state code from the connection sampler.
    pub state: i32,

    /// Observed round-trip latency in milliseconds.
    pub latency_ms: f64,

    /// Kilobytes received by the local side.
    pub rx_kb: f64,

    /// Kilobytes sent by the local side.
    pub tx_kb: f64,

    /// Command name of the owning process.
    pub command: String,
    pub pid: u32,

    /// Capture timestamp in microseconds, when the sampler reports one.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub timestamp_us: Option<u64>,
}

impl ConnectionRecord {
    /// Create a builder for connection records.
    pub fn builder() -> ConnectionRecordBuilder {
        ConnectionRecordBuilder::new()
    }

    /// Identity string of the owning process on `node`, e.g. `svc (123, nodeA)`.
    ///
    /// Pids are only unique within a node, so the node is part of the identity.
    pub fn identity(&self, node: &str) -> String {
        format!("{} ({}, {})", self.command, self.pid, node)
    }
}

/// Builder for [`ConnectionRecord`], mostly useful in tests and fixtures.
#[derive(Debug)]
pub struct ConnectionRecordBuilder {
    record: ConnectionRecord,
}

impl ConnectionRecordBuilder {
    pub fn new() -> Self {
        Self {
            record: ConnectionRecord {
                local: Endpoint::new("0.0.0.0", 0),
                remote: Endpoint::new("0.0.0.0", 0),
                state: 0,
                latency_ms: 0.0,
                rx_kb: 0.0,
                tx_kb: 0.0,
                command: String::new(),
                pid: 0,
                timestamp_us: None,
            },
        }
    }

    pub fn local(mut self, endpoint: Endpoint) -> Self {
        self.record.local = endpoint;
        self
    }

    pub fn remote(mut self, endpoint: Endpoint) -> Self {
        self.record.remote = endpoint;
        self
    }

    pub fn state(mut self, state: i32) -> Self {
        self.record.state = state;
        self
    }

    pub fn latency_ms(mut self, ms: f64) -> Self {
        self.record.latency_ms = ms;
        self
    }

    /// Set received and sent kilobytes, in that order.
    pub fn kilobytes(mut self, rx: f64, tx: f64) -> Self {
        self.record.rx_kb = rx;
        self.record.tx_kb = tx;
        self
    }

    pub fn process(mut self, command: impl Into<String>, pid: u32) -> Self {
        self.record.command = command.into();
        self.record.pid = pid;
        self
    }

    pub fn timestamp_us(mut self, ts: u64) -> Self {
        self.record.timestamp_us = Some(ts);
        self
    }

    pub fn build(self) -> ConnectionRecord {
        self.record
    }
}

impl Default for ConnectionRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One resource snapshot row for a process.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessSample {
    pub pid: u32,
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

/// Averaged resource usage of one process over a capture window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessStats {
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_includes_node() {
        let record = ConnectionRecord::builder().process("nginx", 42).build();
        assert_eq!(record.identity("web-1"), "nginx (42, web-1)");
        assert_ne!(record.identity("web-1"), record.identity("web-2"));
    }

    #[test]
    fn test_builder_kilobytes_order() {
        let record = ConnectionRecord::builder().kilobytes(10.0, 20.0).build();
        assert_eq!(record.rx_kb, 10.0);
        assert_eq!(record.tx_kb, 20.0);
        assert!(record.timestamp_us.is_none());
    }
}

//! Connection trace parsing.
//!
//! The connection sampler writes CSV with the header
//! `STATE,PID,COMM,LADDR,LPORT,RADDR,RPORT,TX_KB,RX_KB,MS,TS`. Columns are
//! looked up by name; `TS` is optional. Every numeric field goes through an
//! explicit parse so a bad value is reported instead of silently becoming
//! NaN downstream.

use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use fleetmap_types::{ConnectionRecord, Endpoint};
use tracing::warn;

use crate::error::ParseError;

struct Columns {
    state: usize,
    pid: usize,
    comm: usize,
    laddr: usize,
    lport: usize,
    raddr: usize,
    rport: usize,
    tx_kb: usize,
    rx_kb: usize,
    ms: usize,
    ts: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ParseError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(ParseError::MissingColumn(name))
        };
        Ok(Self {
            state: find("STATE")?,
            pid: find("PID")?,
            comm: find("COMM")?,
            laddr: find("LADDR")?,
            lport: find("LPORT")?,
            raddr: find("RADDR")?,
            rport: find("RPORT")?,
            tx_kb: find("TX_KB")?,
            rx_kb: find("RX_KB")?,
            ms: find("MS")?,
            ts: headers.iter().position(|h| h == "TS"),
        })
    }

    /// The sampler re-emits the header (with a junk first column) when the
    /// kernel drops events.
    fn is_lost_events_marker(&self, row: &StringRecord) -> bool {
        row.get(self.pid) == Some("PID") && row.get(self.comm) == Some("COMM")
    }
}

/// Parse a node's connection trace into ordered records.
///
/// Blank input means the node observed no connections.
pub fn parse_trace(text: &str) -> Result<Vec<ConnectionRecord>, ParseError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns = Columns::from_headers(reader.headers()?)?;
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());

        if columns.is_lost_events_marker(&row) {
            warn!(line, "connection sampler reported lost events");
            continue;
        }

        let local = Endpoint::new(
            text_field(&row, columns.laddr, line, "LADDR")?,
            number(&row, columns.lport, line, "LPORT")?,
        );
        let remote = Endpoint::new(
            text_field(&row, columns.raddr, line, "RADDR")?,
            number(&row, columns.rport, line, "RPORT")?,
        );

        let timestamp_us = match columns.ts {
            Some(idx) if row.get(idx).is_some_and(|v| !v.is_empty()) => {
                Some(number(&row, idx, line, "TS")?)
            }
            _ => None,
        };

        records.push(ConnectionRecord {
            local,
            remote,
            state: number(&row, columns.state, line, "STATE")?,
            latency_ms: measure(&row, columns.ms, line, "MS")?,
            rx_kb: measure(&row, columns.rx_kb, line, "RX_KB")?,
            tx_kb: measure(&row, columns.tx_kb, line, "TX_KB")?,
            command: text_field(&row, columns.comm, line, "COMM")?.to_string(),
            pid: number(&row, columns.pid, line, "PID")?,
            timestamp_us,
        });
    }

    Ok(records)
}

fn text_field<'r>(
    row: &'r StringRecord,
    idx: usize,
    line: u64,
    field: &'static str,
) -> Result<&'r str, ParseError> {
    match row.get(idx) {
        Some(v) if !v.is_empty() => Ok(v),
        other => Err(ParseError::InvalidField {
            line,
            field,
            value: other.unwrap_or_default().to_string(),
        }),
    }
}

fn number<T: FromStr>(
    row: &StringRecord,
    idx: usize,
    line: u64,
    field: &'static str,
) -> Result<T, ParseError> {
    let value = text_field(row, idx, line, field)?;
    value.parse().map_err(|_| ParseError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })
}

/// A non-negative finite quantity (latency or kilobytes).
fn measure(row: &StringRecord, idx: usize, line: u64, field: &'static str) -> Result<f64, ParseError> {
    let v: f64 = number(row, idx, line, field)?;
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(ParseError::InvalidField {
            line,
            field,
            value: v.to_string(),
        })
    }
}

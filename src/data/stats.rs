//! Per-process resource averages from `top -b` batch output.
//!
//! Only process rows are considered: lines that start with a pid once
//! trimmed. Header and summary lines (`top - ...`, `Tasks:`, `%Cpu(s):`,
//! the column header) and blank lines are skipped.

use std::collections::BTreeMap;

use fleetmap_types::{ProcessSample, ProcessStats};

use crate::error::ParseError;

/// Column of the CPU percentage in a `top -b` process row.
pub const CPU_FIELD: usize = 8;
/// Column of the memory percentage in a `top -b` process row.
pub const MEM_FIELD: usize = 9;

/// Parse every process row of a multi-snapshot sample text.
pub fn parse_samples(text: &str) -> Result<Vec<ProcessSample>, ParseError> {
    let mut samples = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let line_no = idx as u64 + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() <= MEM_FIELD {
            return Err(ParseError::ShortLine {
                line: line_no,
                expected: MEM_FIELD + 1,
                found: fields.len(),
            });
        }

        let pid = fields[0]
            .parse::<u32>()
            .map_err(|_| invalid(line_no, "PID", fields[0]))?;
        let cpu_percent = parse_percent(line_no, "%CPU", fields[CPU_FIELD])?;
        let mem_percent = parse_percent(line_no, "%MEM", fields[MEM_FIELD])?;

        samples.push(ProcessSample {
            pid,
            cpu_percent,
            mem_percent,
        });
    }

    Ok(samples)
}

/// Average samples per pid.
pub fn average(samples: &[ProcessSample]) -> BTreeMap<u32, ProcessStats> {
    let mut sums: BTreeMap<u32, (f64, f64, u32)> = BTreeMap::new();
    for s in samples {
        let entry = sums.entry(s.pid).or_insert((0.0, 0.0, 0));
        entry.0 += s.cpu_percent;
        entry.1 += s.mem_percent;
        entry.2 += 1;
    }

    sums.into_iter()
        .map(|(pid, (cpu, mem, n))| {
            let n = f64::from(n);
            (
                pid,
                ProcessStats {
                    cpu_percent: cpu / n,
                    mem_percent: mem / n,
                },
            )
        })
        .collect()
}

/// Parse and average in one step.
pub fn parse_stats(text: &str) -> Result<BTreeMap<u32, ProcessStats>, ParseError> {
    Ok(average(&parse_samples(text)?))
}

fn parse_percent(line: u64, field: &'static str, value: &str) -> Result<f64, ParseError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(invalid(line, field, value)),
    }
}

fn invalid(line: u64, field: &'static str, value: &str) -> ParseError {
    ParseError::InvalidField {
        line,
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP: &str = "\
top - 10:00:01 up 3 days,  2:11,  1 user,  load average: 0.10, 0.20, 0.30
Tasks: 180 total,   1 running, 179 sleeping,   0 stopped,   0 zombie
%Cpu(s):  1.2 us,  0.4 sy,  0.0 ni, 98.3 id,  0.0 wa,  0.0 hi,  0.1 si,  0.0 st
MiB Mem :  15923.1 total,   8123.4 free,   2311.0 used,   5488.7 buff/cache

    PID USER      PR  NI    VIRT    RES    SHR S  %CPU  %MEM     TIME+ COMMAND
    123 root      20   0  812344  51200  20480 S  12.0   4.0   1:02.33 svc
    456 www       20   0  412344  11200  10480 S   1.0   0.5   0:02.33 nginx

top - 10:00:01 up 3 days,  2:11,  1 user,  load average: 0.10, 0.20, 0.30
    PID USER      PR  NI    VIRT    RES    SHR S  %CPU  %MEM     TIME+ COMMAND
    123 root      20   0  812344  51200  20480 S   8.0   6.0   1:02.40 svc
";

    #[test]
    fn test_skips_headers_and_blank_lines() {
        let samples = parse_samples(TOP).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].pid, 123);
        assert_eq!(samples[1].pid, 456);
    }

    #[test]
    fn test_average_per_pid() {
        let stats = parse_stats(TOP).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[&123].cpu_percent, 10.0);
        assert_eq!(stats[&123].mem_percent, 5.0);
    }

    #[test]
    fn test_single_sample_unchanged() {
        let stats = parse_stats(TOP).unwrap();
        assert_eq!(
            stats[&456],
            ProcessStats {
                cpu_percent: 1.0,
                mem_percent: 0.5
            }
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_stats("").unwrap().is_empty());
    }

    #[test]
    fn test_short_row_is_error() {
        let err = parse_samples("1 root 20 0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::ShortLine {
                line: 1,
                expected: 10,
                found: 4
            }
        ));
    }

    #[test]
    fn test_non_numeric_cpu_is_error() {
        let err = parse_samples("  7 root 20 0 1 1 1 S abc 1.0 0:00.01 init").unwrap_err();
        match err {
            ParseError::InvalidField { field, value, .. } => {
                assert_eq!(field, "%CPU");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(parse_samples("7 root 20 0 1 1 1 S NaN 1.0 0:00.01 init").is_err());
    }
}

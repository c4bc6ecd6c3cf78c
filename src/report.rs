//! Timing records and benchmark report export.

use crate::error::{Error, Result};
use hdrhistogram::Histogram;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

/// Host and device time of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub host: Option<Duration>,
    pub device: Duration,
}

impl Timing {
    /// Host time over device time, when both are known.
    pub fn speedup(&self) -> Option<f64> {
        let device = self.device.as_secs_f64();
        match self.host {
            Some(host) if device > 0.0 => Some(host.as_secs_f64() / device),
            _ => None,
        }
    }
}

/// Distribution of repeated run times, in nanoseconds.
#[derive(Debug)]
pub struct TimingStats {
    histogram: Histogram<u64>,
}

impl TimingStats {
    pub fn new() -> Result<Self> {
        // 3 significant figures, up to one hour
        let histogram = Histogram::new_with_max(3_600_000_000_000, 3)
            .map_err(|e| Error::config(format!("histogram: {:?}", e)))?;
        Ok(Self { histogram })
    }

    pub fn record(&mut self, duration: Duration) {
        let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(ns.max(1));
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }

    pub fn mean(&self) -> Duration {
        if self.is_empty() {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.histogram.mean() as u64)
    }

    pub fn median(&self) -> Duration {
        Duration::from_nanos(self.histogram.value_at_quantile(0.5))
    }

    pub fn min(&self) -> Duration {
        Duration::from_nanos(self.histogram.min())
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.histogram.max())
    }
}

/// One row of a size sweep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "telemetry", derive(serde::Serialize))]
pub struct BenchRecord {
    pub size: usize,
    pub host_secs: Option<f64>,
    pub device_secs: f64,
}

impl BenchRecord {
    pub fn new(size: usize, host: Option<Duration>, device: Duration) -> Self {
        Self {
            size,
            host_secs: host.map(|d| d.as_secs_f64()),
            device_secs: device.as_secs_f64(),
        }
    }

    pub fn speedup(&self) -> Option<f64> {
        match self.host_secs {
            Some(host) if self.device_secs > 0.0 => Some(host / self.device_secs),
            _ => None,
        }
    }
}

/// Trait for exporting sweep results to different formats
pub trait ReportExporter {
    fn export(&self, title: &str, records: &[BenchRecord]) -> Result<()>;
}

/// Whitespace separated table: two header lines, then
/// `size host_secs device_secs` rows. Missing host times are written as
/// `nan`.
pub fn render_table(title: &str, records: &[BenchRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title);
    let _ = writeln!(out, "size host_secs device_secs");
    for record in records {
        let host = record
            .host_secs
            .map(|s| format!("{:.9}", s))
            .unwrap_or_else(|| "nan".to_string());
        let _ = writeln!(out, "{} {} {:.9}", record.size, host, record.device_secs);
    }
    out
}

/// Export to a plain text table
#[derive(Debug)]
pub struct TableExporter {
    output_path: PathBuf,
}

impl TableExporter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

impl ReportExporter for TableExporter {
    fn export(&self, title: &str, records: &[BenchRecord]) -> Result<()> {
        std::fs::write(&self.output_path, render_table(title, records))?;
        log::info!("wrote {} rows to {}", records.len(), self.output_path.display());
        Ok(())
    }
}

/// Export to JSON format
#[cfg(feature = "telemetry")]
#[derive(Debug)]
pub struct JsonExporter {
    output_path: PathBuf,
}

#[cfg(feature = "telemetry")]
impl JsonExporter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

#[cfg(feature = "telemetry")]
#[derive(serde::Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    records: Vec<JsonRow<'a>>,
}

#[cfg(feature = "telemetry")]
#[derive(serde::Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    record: &'a BenchRecord,
    speedup: Option<f64>,
}

#[cfg(feature = "telemetry")]
impl ReportExporter for JsonExporter {
    fn export(&self, title: &str, records: &[BenchRecord]) -> Result<()> {
        let report = JsonReport {
            title,
            records: records
                .iter()
                .map(|record| JsonRow {
                    record,
                    speedup: record.speedup(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        std::fs::write(&self.output_path, json)?;
        log::info!("wrote JSON report to {}", self.output_path.display());
        Ok(())
    }
}

/// Export to console (stdout)
#[derive(Debug)]
pub struct ConsoleExporter;

impl ReportExporter for ConsoleExporter {
    fn export(&self, title: &str, records: &[BenchRecord]) -> Result<()> {
        println!("=== {} ===", title);
        println!("{:>8} {:>14} {:>14} {:>10}", "size", "host [s]", "device [s]", "speedup");
        for record in records {
            let host = record
                .host_secs
                .map(|s| format!("{:.6}", s))
                .unwrap_or_else(|| "-".to_string());
            let speedup = record
                .speedup()
                .map(|s| format!("{:.2}x", s))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:>8} {:>14} {:>14.6} {:>10}",
                record.size, host, record.device_secs, speedup
            );
        }
        Ok(())
    }
}

// Console presentation surface: progress, log lines, live samples, result table

use colored::Colorize;
use std::fmt::Display;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{Table, Tabled};

use helpdesk_core::domain::{CollectionRun, MetricsSample, Reading};
use helpdesk_core::port::{LogSink, ProgressObserver, SampleSink};

const BAR_WIDTH: usize = 30;

/// Writes every side channel to stdout
///
/// Live samples can be muted so they don't bury collection output.
pub struct ConsoleSink {
    show_samples: AtomicBool,
}

impl ConsoleSink {
    pub fn new(show_samples: bool) -> Self {
        Self {
            show_samples: AtomicBool::new(show_samples),
        }
    }

    pub fn set_show_samples(&self, show: bool) {
        self.show_samples.store(show, Ordering::Relaxed);
    }
}

impl ProgressObserver for ConsoleSink {
    fn on_progress(&self, checkpoint: u8) {
        println!("{}", progress_bar(checkpoint).cyan());
    }
}

impl LogSink for ConsoleSink {
    fn log_line(&self, line: &str) {
        println!("{line}");
    }
}

impl SampleSink for ConsoleSink {
    fn publish(&self, sample: &MetricsSample) {
        if self.show_samples.load(Ordering::Relaxed) {
            println!("{}", format_sample(sample).dimmed());
            let _ = std::io::stdout().flush();
        }
    }
}

/// One JSON object per sample (for `watch --json`)
pub struct JsonSampleSink;

impl SampleSink for JsonSampleSink {
    fn publish(&self, sample: &MetricsSample) {
        match serde_json::to_string(sample) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "Could not serialize sample"),
        }
    }
}

pub fn progress_bar(checkpoint: u8) -> String {
    let filled = usize::from(checkpoint.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        checkpoint
    )
}

fn show<T: Display>(reading: &Reading<T>, unit: &str) -> String {
    match reading {
        Reading::Available(v) => format!("{v}{unit}"),
        Reading::Unavailable(_) => "n/a".to_string(),
    }
}

fn show_percent(reading: &Reading<f32>) -> String {
    match reading {
        Reading::Available(v) => format!("{v:.1}%"),
        Reading::Unavailable(_) => "n/a".to_string(),
    }
}

pub fn format_sample(sample: &MetricsSample) -> String {
    let temperature = match &sample.temperature_celsius {
        Reading::Available(t) => format!("{t:.0}°C"),
        Reading::Unavailable(_) => "n/a".to_string(),
    };
    format!(
        "[{}] CPU {} | MEM {} | DISK {} | TEMP {} | {} ({})",
        sample.sampled_at.format("%H:%M:%S"),
        show_percent(&sample.cpu_percent),
        show_percent(&sample.mem_percent),
        show_percent(&sample.disk_percent),
        temperature,
        show(&sample.hostname, ""),
        show(&sample.ip_address, ""),
    )
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Probe")]
    probe: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Attempts")]
    attempts: u32,
    #[tabled(rename = "Time (ms)")]
    duration_ms: i64,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub fn results_table(run: &CollectionRun) -> String {
    let rows: Vec<ResultRow> = run
        .results
        .iter()
        .map(|r| ResultRow {
            probe: r.probe_name.clone(),
            status: match (r.succeeded, r.skipped) {
                (true, _) => "OK",
                (false, true) => "SKIPPED",
                (false, false) => "FAILED",
            },
            attempts: r.attempts,
            duration_ms: r.duration_ms,
            detail: r.error_detail.clone().unwrap_or_default(),
        })
        .collect();
    Table::new(rows).to_string()
}

/// Table, counts, and the single terminal notification
pub fn print_run(run: &CollectionRun) {
    if !run.results.is_empty() {
        println!();
        println!("{}", results_table(run));
    }

    let summary = format!(
        "{} succeeded, {} failed, {} skipped",
        run.succeeded_count(),
        run.failed_count(),
        run.skipped_count()
    );

    match (run.archive_path(), run.error()) {
        (Some(archive), _) => {
            println!("{}", format!("✓ Report archived: {}", archive.display()).green().bold());
            println!("  {summary}");
        }
        (None, Some(e)) => {
            println!(
                "{}",
                format!("✗ Collection failed at {} stage: {e}", e.stage()).red().bold()
            );
            if !run.results.is_empty() {
                println!("  {summary}; artifacts kept in {}", run.output_directory.display());
            }
        }
        (None, None) => println!("{}", "Collection did not finish".yellow()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use helpdesk_core::domain::ProbeResult;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}]   0%", ".".repeat(30)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(30)));
        assert!(progress_bar(50).starts_with(&format!("[{}.", "#".repeat(15))));
    }

    #[test]
    fn test_format_sample_marks_unavailable() {
        let sample = MetricsSample {
            sampled_at: Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            cpu_percent: Reading::Available(12.5),
            mem_percent: Reading::Available(50.0),
            disk_percent: Reading::Available(40.0),
            temperature_celsius: Reading::unavailable("no sensor"),
            hostname: Reading::Available("desk-01".to_string()),
            ip_address: Reading::Available(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 42))),
        };

        assert_eq!(
            format_sample(&sample),
            "[09:30:00] CPU 12.5% | MEM 50.0% | DISK 40.0% | TEMP n/a | desk-01 (10.0.0.42)"
        );
    }

    #[test]
    fn test_results_table_lists_each_probe() {
        let mut run = CollectionRun::new("20260314_093000", PathBuf::from("/tmp/r"));
        run.record(ProbeResult::success("Running Processes", PathBuf::from("/tmp/r/p.txt")));
        run.record(ProbeResult::failure("Defender Status", PathBuf::from("/tmp/r/d.txt"), "exit code 1"));
        run.record(ProbeResult::skipped("Storage Health", PathBuf::from("/tmp/r/s.txt")));

        let table = results_table(&run);
        assert!(table.contains("Running Processes"));
        assert!(table.contains("exit code 1"));
        assert!(table.contains("SKIPPED"));
    }
}

//! Batch outcome accumulation and summary reporting.

use crate::errors::{ConvertError, FailureKind};
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One classified per-item failure.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// An output that exhausted the quality ladder without meeting its budget.
/// The file is on disk; this entry makes the best-effort policy visible.
#[derive(Debug, Clone, Serialize)]
pub struct OversizedOutput {
    pub path: PathBuf,
    pub profile: String,
    pub size_kb: f64,
    pub budget_kb: f64,
}

/// Terminal artifact of a batch run, returned to the caller in every case.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
    pub oversized: Vec<OversizedOutput>,
    /// Set when a device-full condition halted the batch before the end.
    pub aborted: bool,
}

impl ConversionReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failures: Vec::new(),
            oversized: Vec::new(),
            aborted: false,
        }
    }

    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    pub fn fail(&mut self, path: &Path, error: &ConvertError) {
        self.failures.push(ItemFailure {
            path: path.to_path_buf(),
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }

    /// Clean run: every discovered item converted (an empty batch is clean).
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

/// Human-readable end-of-run summary in the terminal.
pub fn print_summary_report(report: &ConversionReport, profiles: usize, duration: Duration) {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              📊 Variant Conversion Summary           ║");
    println!("╠══════════════════════════════════════════════════════╣");
    println!("║  📁 Images found:      {:>10}                    ║", report.total);
    println!("║  ✅ Converted:         {:>10}                    ║", report.succeeded);
    println!("║  ❌ Failed:            {:>10}                    ║", report.failed());
    println!("║  🎨 Profiles each:     {:>10}                    ║", profiles);
    println!(
        "║  📈 Success rate:      {:>9.1}%                    ║",
        report.success_rate()
    );
    println!("║  ⏱️  Total time:        {:>10}                    ║", format_duration(duration));
    println!("╚══════════════════════════════════════════════════════╝");

    if report.aborted {
        println!(
            "{}",
            style("🛑 Batch aborted early: storage device full. Remaining images were not attempted.")
                .red()
                .bold()
        );
    }

    if !report.failures.is_empty() {
        println!();
        println!("❌ Failures:");
        for failure in &report.failures {
            println!(
                "   [{}] {}: {}",
                style(failure.kind.label()).yellow(),
                failure.path.display(),
                failure.message
            );
        }
    }

    if !report.oversized.is_empty() {
        println!();
        println!("⚠️  Outputs over budget (kept as best effort):");
        for over in &report.oversized {
            println!(
                "   {} [{}] {:.1} KB > {:.1} KB",
                over.path.display(),
                over.profile,
                over.size_kb,
                over.budget_kb
            );
        }
    }
}

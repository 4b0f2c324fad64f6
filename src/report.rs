// File: src/report.rs
//! Run report: what each stage did, where the outputs went, and whether the
//! enhanced calendar still looks like a calendar.
//!
//! Every stage hands back its own counters; the controller collects them
//! here. Rendering is plain text, once for the console and once (with a
//! timestamp) for the log file.

use crate::calendar::{ValidationCheck, all_passed};
use crate::model::{BuildReport, EnrichMode, EnrichReport};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::PathBuf;

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub auspicious: usize,
    pub inauspicious: usize,
    pub unmatched: usize,
}

impl SplitSummary {
    pub fn written(&self) -> usize {
        self.auspicious + self.inauspicious
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Split Summary:");
        let _ = writeln!(out, "  Auspicious (吉):        {}", self.auspicious);
        let _ = writeln!(out, "  Inauspicious (凶):      {}", self.inauspicious);
        let _ = writeln!(out, "  Skipped (unenhanced):   {}", self.unmatched);
        let _ = writeln!(out, "  ────────────────────────");
        let _ = writeln!(out, "  Total in output:        {}", self.written());
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub label: &'static str,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl OutputFile {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub mode: EnrichMode,
    pub markers: BuildReport,
    pub taboos: Option<BuildReport>,
    pub enrich: EnrichReport,
    pub split: SplitSummary,
    pub files: Vec<OutputFile>,
    pub validation: Vec<ValidationCheck>,
    pub log_file: Option<PathBuf>,
}

impl RunReport {
    pub fn is_valid(&self) -> bool {
        all_passed(&self.validation)
    }

    fn write_statistics(&self, out: &mut String) {
        let e = &self.enrich;
        let _ = writeln!(out, "Statistics:");
        let _ = writeln!(out, "  Total events processed:  {}", e.total);
        let _ = writeln!(
            out,
            "  Events enhanced:         {} ({:.1}%)",
            e.enhanced,
            e.enhanced_percent()
        );
        let _ = writeln!(out, "  Events with markers:     {}", e.with_marker);
        if self.mode.uses_taboos() {
            let _ = writeln!(out, "  Events with taboos:      {}", e.with_taboo);
        }
        let _ = writeln!(out, "  Events skipped:          {}", e.skipped);
        let _ = writeln!(out, "  Missing lookups:         {}", e.missing_lookups);
        let _ = writeln!(out, "  Unrecognized titles:     {}", e.unrecognized);
        let _ = writeln!(out, "  Missing DTSTART/SUMMARY: {}", e.missing_fields);
    }

    fn write_lookups(&self, out: &mut String) {
        let _ = writeln!(out, "Lookups:");
        let m = &self.markers;
        let _ = writeln!(
            out,
            "  Marker entries:          {} from {} days ({} skipped)",
            m.entries,
            m.blocks - m.skipped(),
            m.skipped()
        );
        if let Some(t) = &self.taboos {
            let _ = writeln!(
                out,
                "  Taboo entries:           {} from {} days ({} skipped)",
                t.entries,
                t.blocks - t.skipped(),
                t.skipped()
            );
        }
        for warning in &m.warnings {
            let _ = writeln!(out, "    • {}", warning);
        }
    }

    fn write_samples(&self, out: &mut String, with_labels: bool) {
        let samples = &self.enrich.samples;
        if samples.is_empty() {
            return;
        }
        let _ = writeln!(out, "Sample Transformations (first {} events):", samples.len());
        for (idx, sample) in samples.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Sample {} - Date: {}", idx + 1, sample.date);
            if with_labels {
                let _ = writeln!(out, "    Before: {}", sample.before);
                let _ = writeln!(out, "    After:  {}", sample.after);
            } else {
                let _ = writeln!(out, "    {}", sample.before);
                let _ = writeln!(out, "    {}", sample.after);
            }
        }
    }

    fn write_warnings(&self, out: &mut String, limit: usize) {
        let warnings = &self.enrich.warnings;
        if warnings.is_empty() {
            return;
        }
        let shown = limit.min(warnings.len());
        let _ = writeln!(out, "First {} Warnings (total: {}):", shown, warnings.len());
        for warning in warnings.iter().take(shown) {
            let _ = writeln!(out, "    • {}", warning);
        }
    }

    /// Console rendering.
    pub fn render(&self, max_warnings: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        let _ = writeln!(out, "ENHANCEMENT COMPLETE - SUMMARY REPORT");
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        let _ = writeln!(out);

        self.write_statistics(&mut out);
        let _ = writeln!(out);
        self.write_lookups(&mut out);

        if !self.files.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Files:");
            for file in &self.files {
                let _ = writeln!(
                    out,
                    "  {:<24} {:>8.2} MB  {}",
                    format!("{}:", file.label),
                    file.size_mb(),
                    file.path.display()
                );
            }
        }

        if !self.validation.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Validation Results:");
            for check in &self.validation {
                let status = if check.passed { "PASS" } else { "FAIL" };
                let _ = writeln!(out, "  {}: {}", check.name, status);
            }
            let overall = if self.is_valid() { "VALID" } else { "INVALID" };
            let _ = writeln!(out, "  Overall status:          {}", overall);
        }

        let _ = writeln!(out);
        self.write_samples(&mut out, true);
        let _ = writeln!(out);
        self.write_warnings(&mut out, max_warnings);

        if let Some(log_file) = &self.log_file {
            let _ = writeln!(out);
            let _ = writeln!(out, "Log file saved to:    {}", log_file.display());
        }

        let _ = writeln!(out);
        out.push_str(&self.split.render());
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        out
    }

    /// Log-file rendering, stamped with the time of the run.
    pub fn render_log(&self, timestamp: DateTime<Local>, max_warnings: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Enhancement Timestamp: {}", timestamp.to_rfc3339());
        let _ = writeln!(out);
        self.write_statistics(&mut out);
        let _ = writeln!(out);
        self.write_lookups(&mut out);
        let _ = writeln!(out);
        self.write_samples(&mut out, false);
        let _ = writeln!(out);
        self.write_warnings(&mut out, max_warnings);
        let _ = writeln!(out);
        out.push_str(&self.split.render());
        out
    }
}

// File: src/model/enrich.rs
//! Rewrites stem-branch event titles with their hour's marker and taboos.
//!
//! `『丙子时 庚午日 丙子月 甲辰龙年』` becomes
//! `『吉 [丙不修灶 必见灾殃] 丙子时 庚午日 丙子月 甲辰龙年』` when the marker
//! table has `丙子 -> 吉` for that date and the taboo table has a phrase for
//! the stem `丙`.

use super::lookup::{MarkerTable, TabooTable};
use super::{HOUR_SUFFIX, TITLE_CLOSE, TITLE_OPEN};
use crate::calendar::{BEGIN_EVENT, CalendarDocument, extract_date, extract_summary, replace_summary};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static HOUR_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{}(\S{{2}}){}", TITLE_OPEN, HOUR_SUFFIX)).unwrap()
});

/// Which lookups take part in enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichMode {
    MarkersOnly,
    #[default]
    MarkersAndTaboos,
}

impl EnrichMode {
    pub fn uses_taboos(self) -> bool {
        matches!(self, EnrichMode::MarkersAndTaboos)
    }
}

/// Result of enriching one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub title: String,
    /// `None` when the title does not start with `『XX时`.
    pub hour_code: Option<String>,
    pub marker_applied: bool,
    pub taboo_applied: bool,
}

impl Enrichment {
    fn unchanged(title: &str, hour_code: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            hour_code: hour_code.map(str::to_string),
            marker_applied: false,
            taboo_applied: false,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.marker_applied || self.taboo_applied
    }
}

/// The two-character hour code of a `『XX时 ...』` title.
pub fn hour_code(title: &str) -> Option<&str> {
    HOUR_CODE_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A before/after pair kept for the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub date: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub total: usize,
    pub enhanced: usize,
    pub with_marker: usize,
    pub with_taboo: usize,
    pub skipped: usize,
    pub missing_fields: usize,
    pub unrecognized: usize,
    pub missing_lookups: usize,
    pub samples: Vec<Sample>,
    /// Distinct `No enhancement found for date/code` messages, first seen first.
    pub warnings: Vec<String>,
}

impl EnrichReport {
    pub fn enhanced_percent(&self) -> f64 {
        100.0 * self.enhanced as f64 / self.total.max(1) as f64
    }
}

pub struct Enricher<'a> {
    markers: &'a MarkerTable,
    taboos: Option<&'a TabooTable>,
    max_samples: usize,
}

impl<'a> Enricher<'a> {
    /// Taboos are only consulted when a table is given and the mode asks
    /// for them.
    pub fn new(markers: &'a MarkerTable, taboos: Option<&'a TabooTable>, mode: EnrichMode) -> Self {
        Self {
            markers,
            taboos: taboos.filter(|_| mode.uses_taboos()),
            max_samples: 5,
        }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Surrounding whitespace is ignored when matching; an enriched title
    /// is written without it.
    pub fn enrich_title(&self, title: &str, date: &str) -> Enrichment {
        let trimmed = title.trim();
        let (Some(code), Some(interior)) = (
            hour_code(trimmed),
            trimmed
                .strip_prefix(TITLE_OPEN)
                .and_then(|t| t.strip_suffix(TITLE_CLOSE)),
        ) else {
            return Enrichment::unchanged(title, None);
        };

        let marker = self.markers.get(date, code);
        let taboos: Vec<&str> = match (self.taboos, code.chars().next()) {
            (Some(table), Some(stem)) => table.phrases_for(date, stem).collect(),
            _ => Vec::new(),
        };

        if marker.is_none() && taboos.is_empty() {
            return Enrichment::unchanged(title, Some(code));
        }

        let mut tokens: Vec<String> = Vec::with_capacity(taboos.len() + 1);
        if let Some(marker) = marker {
            tokens.push(marker.to_string());
        }
        tokens.extend(taboos.iter().map(|phrase| format!("[{}]", phrase)));

        Enrichment {
            title: format!("{}{} {}{}", TITLE_OPEN, tokens.join(" "), interior, TITLE_CLOSE),
            hour_code: Some(code.to_string()),
            marker_applied: marker.is_some(),
            taboo_applied: !taboos.is_empty(),
        }
    }

    /// Enriches every event of a calendar. Header, footer and untouched
    /// events are copied verbatim.
    pub fn enrich_calendar(&self, content: &str) -> (String, EnrichReport) {
        let doc = CalendarDocument::parse(content);
        let mut report = EnrichReport::default();
        let mut seen_warnings = HashSet::new();

        let mut out = String::with_capacity(content.len() + content.len() / 4);
        out.push_str(doc.header);
        for block in &doc.entries {
            report.total += 1;
            out.push_str(BEGIN_EVENT);
            match self.enrich_block(block, &mut report, &mut seen_warnings) {
                Some(rewritten) => out.push_str(&rewritten),
                None => out.push_str(block),
            }
        }
        out.push_str(doc.footer);

        (out, report)
    }

    fn enrich_block(
        &self,
        block: &str,
        report: &mut EnrichReport,
        seen_warnings: &mut HashSet<String>,
    ) -> Option<String> {
        let (Some(date), Some(title)) = (extract_date(block), extract_summary(block)) else {
            report.missing_fields += 1;
            report.skipped += 1;
            return None;
        };

        let result = self.enrich_title(title, date);
        if !result.is_enriched() {
            report.skipped += 1;
            match result.hour_code {
                Some(code) => {
                    report.missing_lookups += 1;
                    let warning = format!("No enhancement found for {}/{}", date, code);
                    if seen_warnings.insert(warning.clone()) {
                        log::debug!("{}", warning);
                        report.warnings.push(warning);
                    }
                }
                None => report.unrecognized += 1,
            }
            return None;
        }

        report.enhanced += 1;
        if result.marker_applied {
            report.with_marker += 1;
        }
        if result.taboo_applied {
            report.with_taboo += 1;
        }
        if report.samples.len() < self.max_samples {
            report.samples.push(Sample {
                date: date.to_string(),
                before: format!("SUMMARY:{}", title),
                after: format!("SUMMARY:{}", result.title),
            });
        }

        Some(replace_summary(block, &result.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> MarkerTable {
        let mut table = MarkerTable::new();
        let mut report = Default::default();
        table.insert_label("20250101", "丙子吉 戊寅凶", &mut report);
        table
    }

    fn taboos() -> TabooTable {
        let mut table = TabooTable::new();
        table.insert_label("20250101", "庚不经络 织机虚张,丙不修灶 必见灾殃");
        table
    }

    #[test]
    fn test_hour_code_extraction() {
        assert_eq!(hour_code("『丙子时 庚午日 丙子月 甲辰龙年』"), Some("丙子"));
        assert_eq!(hour_code("『吉 丙子时 庚午日』"), None);
        assert_eq!(hour_code("丙子时 庚午日"), None);
        assert_eq!(hour_code("『丙 时』"), None);
    }

    #[test]
    fn test_marker_only_title() {
        let markers = markers();
        let enricher = Enricher::new(&markers, None, EnrichMode::MarkersAndTaboos);

        let result = enricher.enrich_title("『丙子时 庚午日 丙子月 甲辰龙年』", "20250101");
        assert_eq!(result.title, "『吉 丙子时 庚午日 丙子月 甲辰龙年』");
        assert!(result.marker_applied);
        assert!(!result.taboo_applied);

        let result = enricher.enrich_title("『戊寅时 庚午日 丙子月 甲辰龙年』", "20250101");
        assert_eq!(result.title, "『凶 戊寅时 庚午日 丙子月 甲辰龙年』");
    }

    #[test]
    fn test_marker_and_taboo_title() {
        let markers = markers();
        let taboos = taboos();
        let enricher = Enricher::new(&markers, Some(&taboos), EnrichMode::MarkersAndTaboos);

        let result = enricher.enrich_title("『丙子时 庚午日』", "20250101");
        assert_eq!(result.title, "『吉 [丙不修灶 必见灾殃] 丙子时 庚午日』");
        assert!(result.marker_applied && result.taboo_applied);
    }

    #[test]
    fn test_markers_only_mode_ignores_taboos() {
        let markers = markers();
        let taboos = taboos();
        let enricher = Enricher::new(&markers, Some(&taboos), EnrichMode::MarkersOnly);

        let result = enricher.enrich_title("『丙子时 庚午日』", "20250101");
        assert_eq!(result.title, "『吉 丙子时 庚午日』");
        assert!(!result.taboo_applied);

        let result = enricher.enrich_title("『庚辰时 庚午日』", "20250101");
        assert!(!result.is_enriched());
        assert_eq!(result.title, "『庚辰时 庚午日』");
    }

    #[test]
    fn test_surrounding_whitespace_keeps_single_brackets() {
        let markers = markers();
        let enricher = Enricher::new(&markers, None, EnrichMode::MarkersAndTaboos);

        let result = enricher.enrich_title("『丙子时 庚午日』 ", "20250101");
        assert_eq!(result.title, "『吉 丙子时 庚午日』");
        assert_eq!(result.title.matches(TITLE_CLOSE).count(), 1);

        let result = enricher.enrich_title("  『戊寅时 庚午日』", "20250101");
        assert_eq!(result.title, "『凶 戊寅时 庚午日』");

        // An unclosed title is left alone.
        let result = enricher.enrich_title("『丙子时 庚午日", "20250101");
        assert_eq!(result.title, "『丙子时 庚午日");
        assert_eq!(result.hour_code, None);
    }

    #[test]
    fn test_miss_and_unrecognized_are_distinguished() {
        let markers = markers();
        let enricher = Enricher::new(&markers, None, EnrichMode::MarkersAndTaboos);

        let miss = enricher.enrich_title("『丁丑时 庚午日』", "20250101");
        assert_eq!(miss.title, "『丁丑时 庚午日』");
        assert_eq!(miss.hour_code.as_deref(), Some("丁丑"));
        assert!(!miss.is_enriched());

        let other_day = enricher.enrich_title("『丙子时 庚午日』", "20250102");
        assert!(!other_day.is_enriched());

        let odd = enricher.enrich_title("Team sync", "20250101");
        assert_eq!(odd.title, "Team sync");
        assert_eq!(odd.hour_code, None);
    }

    #[test]
    fn test_enrich_calendar_counts_and_dedups_warnings() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\nDTSTART:20250101T230000\nSUMMARY:『丙子时 庚午日』\nEND:VEVENT\n\
BEGIN:VEVENT\nDTSTART:20250101T010000\nSUMMARY:『丁丑时 庚午日』\nEND:VEVENT\n\
BEGIN:VEVENT\nDTSTART:20250101T010000\nSUMMARY:『丁丑时 庚午日』\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:『丙子时 庚午日』\nEND:VEVENT\n\
BEGIN:VEVENT\nDTSTART:20250101T050000\nSUMMARY:Lunch\nEND:VEVENT\n\
END:VCALENDAR\n";
        let markers = markers();
        let enricher = Enricher::new(&markers, None, EnrichMode::MarkersOnly).with_max_samples(1);
        let (out, report) = enricher.enrich_calendar(ics);

        assert_eq!(report.total, 5);
        assert_eq!(report.enhanced, 1);
        assert_eq!(report.with_marker, 1);
        assert_eq!(report.skipped, 4);
        assert_eq!(report.missing_lookups, 2);
        assert_eq!(report.missing_fields, 1);
        assert_eq!(report.unrecognized, 1);
        assert_eq!(report.warnings, vec!["No enhancement found for 20250101/丁丑"]);
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.samples[0].before, "SUMMARY:『丙子时 庚午日』");
        assert_eq!(report.samples[0].after, "SUMMARY:『吉 丙子时 庚午日』");

        assert_eq!(out, ics.replacen("SUMMARY:『丙子时", "SUMMARY:『吉 丙子时", 1));
    }
}

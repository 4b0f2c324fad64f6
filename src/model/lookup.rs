// File: src/model/lookup.rs
//! Lookup tables built from the whole-day source calendars.
//!
//! Both sources share the same layout: one all-day event per date whose
//! `SUMMARY` carries the data. The marker calendar lists `code + marker`
//! tokens separated by whitespace (`丙子吉 丁丑吉 戊寅凶 ...`); the taboo
//! calendar lists comma-separated phrases whose first character is the stem
//! they apply to (`庚不经络 织机虚张,午不苫盖 屋主更张`).

use crate::calendar::{CalendarDocument, extract_date, extract_summary};
use std::collections::HashMap;

/// Counters collected while building a table. Blocks without a date or a
/// label are skipped, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub blocks: usize,
    pub missing_date: usize,
    pub missing_label: usize,
    pub entries: usize,
    pub malformed_tokens: usize,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn skipped(&self) -> usize {
        self.missing_date + self.missing_label
    }
}

/// Calls `visit(date, label, report)` for every block carrying both fields.
fn scan_days<'a>(
    content: &'a str,
    report: &mut BuildReport,
    mut visit: impl FnMut(&'a str, &'a str, &mut BuildReport),
) {
    let doc = CalendarDocument::parse(content);
    for block in doc.entries {
        report.blocks += 1;
        let Some(date) = extract_date(block) else {
            report.missing_date += 1;
            continue;
        };
        let Some(label) = extract_summary(block) else {
            report.missing_label += 1;
            continue;
        };
        visit(date, label, report);
    }
}

/// date -> hour code -> marker character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerTable {
    days: HashMap<String, HashMap<String, char>>,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ics(content: &str) -> (Self, BuildReport) {
        let mut table = Self::new();
        let mut report = BuildReport::default();
        scan_days(content, &mut report, |date, label, report| {
            table.insert_label(date, label, report)
        });
        (table, report)
    }

    /// Adds every `code + marker` token of one day's label.
    ///
    /// A token needs at least three characters: the last one is the marker,
    /// the rest is the code. Shorter tokens are counted and ignored. A code
    /// seen twice for the same date keeps the last marker and leaves a
    /// warning behind.
    pub fn insert_label(&mut self, date: &str, label: &str, report: &mut BuildReport) {
        let day = self.days.entry(date.to_string()).or_default();
        for token in label.split_whitespace() {
            if token.chars().count() < 3 {
                report.malformed_tokens += 1;
                continue;
            }
            let Some((split_at, marker)) = token.char_indices().last() else {
                continue;
            };
            let code = &token[..split_at];
            match day.insert(code.to_string(), marker) {
                Some(previous) => {
                    let warning = format!(
                        "Duplicate code {} on {} ({} replaced by {})",
                        code, date, previous, marker
                    );
                    log::debug!("{}", warning);
                    report.warnings.push(warning);
                }
                None => report.entries += 1,
            }
        }
    }

    pub fn get(&self, date: &str, code: &str) -> Option<char> {
        self.days.get(date)?.get(code).copied()
    }

    pub fn day(&self, date: &str) -> Option<&HashMap<String, char>> {
        self.days.get(date)
    }

    pub fn dates(&self) -> usize {
        self.days.len()
    }

    /// Total number of (date, code) pairs.
    pub fn len(&self) -> usize {
        self.days.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taboo {
    pub stem: char,
    pub phrase: String,
}

/// date -> taboos in the order they appear in the source label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabooTable {
    days: HashMap<String, Vec<Taboo>>,
}

impl TabooTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ics(content: &str) -> (Self, BuildReport) {
        let mut table = Self::new();
        let mut report = BuildReport::default();
        scan_days(content, &mut report, |date, label, report| {
            report.entries += table.insert_label(date, label);
        });
        (table, report)
    }

    /// Appends every non-empty phrase of one day's label. Returns how many
    /// were stored.
    pub fn insert_label(&mut self, date: &str, label: &str) -> usize {
        let day = self.days.entry(date.to_string()).or_default();
        let before = day.len();
        for phrase in label.split(',').map(str::trim) {
            let Some(stem) = phrase.chars().next() else {
                continue;
            };
            day.push(Taboo {
                stem,
                phrase: phrase.to_string(),
            });
        }
        day.len() - before
    }

    /// Every phrase recorded for `date` whose stem is `stem`, in source order.
    pub fn phrases_for<'a>(&'a self, date: &str, stem: char) -> impl Iterator<Item = &'a str> + 'a {
        self.days
            .get(date)
            .into_iter()
            .flatten()
            .filter(move |t| t.stem == stem)
            .map(|t| t.phrase.as_str())
    }

    pub fn day(&self, date: &str) -> &[Taboo] {
        self.days.get(date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn dates(&self) -> usize {
        self.days.len()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

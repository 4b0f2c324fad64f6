// File: src/model/partition.rs
use super::verdict::Verdict;
use crate::calendar::{CalendarDocument, assemble, extract_summary, set_calendar_name};

/// Events of an enriched calendar grouped by the marker leading their title.
///
/// Blocks are borrowed verbatim from the source text; order within each
/// group follows the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<'a> {
    pub header: &'a str,
    pub footer: &'a str,
    line_ending: &'static str,
    pub auspicious: Vec<&'a str>,
    pub inauspicious: Vec<&'a str>,
    /// Blocks without a title or without a leading marker.
    pub unmatched: usize,
}

/// Verdict of one event block, `None` when its title has no leading marker.
pub fn classify(block: &str) -> Option<Verdict> {
    extract_summary(block).and_then(Verdict::from_title)
}

impl<'a> Partition<'a> {
    pub fn split(content: &'a str) -> Self {
        let doc = CalendarDocument::parse(content);
        let mut partition = Self {
            header: doc.header,
            footer: doc.footer,
            line_ending: doc.line_ending(),
            auspicious: Vec::new(),
            inauspicious: Vec::new(),
            unmatched: 0,
        };

        for block in doc.entries {
            match classify(block) {
                Some(Verdict::Auspicious) => partition.auspicious.push(block),
                Some(Verdict::Inauspicious) => partition.inauspicious.push(block),
                None => partition.unmatched += 1,
            }
        }
        partition
    }

    pub fn entries(&self, verdict: Verdict) -> &[&'a str] {
        match verdict {
            Verdict::Auspicious => &self.auspicious,
            Verdict::Inauspicious => &self.inauspicious,
        }
    }

    pub fn total(&self) -> usize {
        self.auspicious.len() + self.inauspicious.len() + self.unmatched
    }

    /// A complete calendar holding only `verdict`'s events, with the
    /// display name replaced by `calendar_name`.
    pub fn render(&self, verdict: Verdict, calendar_name: &str) -> String {
        let header = set_calendar_name(self.header, calendar_name, self.line_ending);
        assemble(&header, self.entries(verdict), self.footer)
    }
}

// File: src/calendar.rs
//! Text-level view of an iCalendar document.
//!
//! Entries are kept as slices of the source text, so an event that is not
//! touched is written back byte-for-byte (line endings included). Only the
//! few fields the pipeline needs are extracted, each through a helper that
//! returns `None` when the field is absent.

use icalendar::Calendar;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

pub const BEGIN_CALENDAR: &str = "BEGIN:VCALENDAR";
pub const END_CALENDAR: &str = "END:VCALENDAR";
pub const BEGIN_EVENT: &str = "BEGIN:VEVENT";
pub const END_EVENT: &str = "END:VEVENT";
pub const CALNAME_KEY: &str = "X-WR-CALNAME";

// DTSTART with or without parameters (`;VALUE=DATE`, `;TZID=...`).
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^DTSTART(?:;[^:\r\n]*)?:([0-9]{8})").unwrap());
static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^SUMMARY:([^\r\n]+)").unwrap());
static CALNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^X-WR-CALNAME:[^\r\n]*").unwrap());

/// A calendar split into the text before the first event, the event
/// bodies, and the text after the last complete event.
///
/// Each entry starts right after `BEGIN:VEVENT` and runs through the line
/// ending that follows its `END:VEVENT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument<'a> {
    pub header: &'a str,
    pub entries: Vec<&'a str>,
    pub footer: &'a str,
}

impl<'a> CalendarDocument<'a> {
    pub fn parse(content: &'a str) -> Self {
        let Some(first) = content.find(BEGIN_EVENT) else {
            // No events at all: keep the closing line in the footer so a
            // renamed header can still be followed by entries.
            let split_at = content.rfind(END_CALENDAR).unwrap_or(content.len());
            return Self {
                header: &content[..split_at],
                entries: Vec::new(),
                footer: &content[split_at..],
            };
        };

        let mut entries = Vec::new();
        let mut footer_start = first;
        let mut cursor = Some(first);

        while let Some(begin) = cursor {
            let body_start = begin + BEGIN_EVENT.len();
            let Some(end_offset) = content[body_start..].find(END_EVENT) else {
                // Unterminated trailing block stays in the footer untouched.
                break;
            };
            let mut body_end = body_start + end_offset + END_EVENT.len();
            body_end += line_ending_len(&content[body_end..]);

            entries.push(&content[body_start..body_end]);
            footer_start = body_end;
            cursor = content[body_end..]
                .find(BEGIN_EVENT)
                .map(|offset| body_end + offset);
        }

        Self {
            header: &content[..first],
            entries,
            footer: &content[footer_start..],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Line ending used by the document header, `\r\n` for RFC 5545 files.
    pub fn line_ending(&self) -> &'static str {
        if self.header.contains("\r\n") || self.footer.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }
}

fn line_ending_len(rest: &str) -> usize {
    if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\n') {
        1
    } else {
        0
    }
}

/// Joins a header, event bodies and footer back into a document.
pub fn assemble<I, S>(header: &str, entries: I, footer: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from(header);
    for entry in entries {
        out.push_str(BEGIN_EVENT);
        out.push_str(entry.as_ref());
    }
    out.push_str(footer);
    out
}

/// The 8-digit date at the front of the block's `DTSTART` value.
pub fn extract_date(block: &str) -> Option<&str> {
    DATE_RE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Value of the first `SUMMARY:` line, without its line ending.
pub fn extract_summary(block: &str) -> Option<&str> {
    SUMMARY_RE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replaces the value of the first `SUMMARY:` line. Everything else in the
/// block, including that line's ending, is kept as is.
pub fn replace_summary(block: &str, summary: &str) -> String {
    match SUMMARY_RE.captures(block).and_then(|caps| caps.get(1)) {
        Some(value) => {
            let mut out = String::with_capacity(block.len() + summary.len());
            out.push_str(&block[..value.start()]);
            out.push_str(summary);
            out.push_str(&block[value.end()..]);
            out
        }
        None => block.to_string(),
    }
}

/// Sets the calendar display name in a document header.
///
/// An existing `X-WR-CALNAME` line is rewritten; otherwise the property is
/// appended as the last header line.
pub fn set_calendar_name(header: &str, name: &str, line_ending: &str) -> String {
    let line = format!("{}:{}", CALNAME_KEY, name);
    if CALNAME_RE.is_match(header) {
        return CALNAME_RE.replace_all(header, NoExpand(&line)).into_owned();
    }

    let mut out = String::with_capacity(header.len() + line.len() + 2);
    out.push_str(header);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(line_ending);
    }
    out.push_str(&line);
    out.push_str(line_ending);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCheck {
    pub name: &'static str,
    pub passed: bool,
}

/// Structural checks run on a written calendar.
pub fn validate(content: &str) -> Vec<ValidationCheck> {
    let body = content.trim_start_matches('\u{feff}');
    let begins = body.matches(BEGIN_EVENT).count();
    let ends = body.matches(END_EVENT).count();

    vec![
        ValidationCheck {
            name: "starts_with_BEGIN:VCALENDAR",
            passed: body.starts_with(BEGIN_CALENDAR),
        },
        ValidationCheck {
            name: "ends_with_END:VCALENDAR",
            passed: body.trim_end().ends_with(END_CALENDAR),
        },
        ValidationCheck {
            name: "has_VEVENT_blocks",
            passed: begins > 0 && ends > 0,
        },
        ValidationCheck {
            name: "event_count_matches",
            passed: begins == ends,
        },
        ValidationCheck {
            name: "parses_as_icalendar",
            passed: body.parse::<Calendar>().is_ok(),
        },
    ]
}

pub fn all_passed(checks: &[ValidationCheck]) -> bool {
    checks.iter().all(|c| c.passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRLF_DOC: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//shichen//test//EN\r\nX-WR-CALNAME:干支\r\n\
BEGIN:VEVENT\r\nDTSTART:20250101T230000\r\nSUMMARY:『丙子时 庚午日 丙子月 甲辰龙年』\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nDTSTART:20250102T010000\r\nSUMMARY:『丁丑时 辛未日 丙子月 甲辰龙年』\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_splits_header_entries_footer() {
        let doc = CalendarDocument::parse(CRLF_DOC);
        assert_eq!(doc.len(), 2);
        assert!(doc.header.ends_with("X-WR-CALNAME:干支\r\n"));
        assert_eq!(doc.footer, "END:VCALENDAR\r\n");
        assert!(doc.entries[0].starts_with("\r\nDTSTART:20250101T230000"));
        assert!(doc.entries[0].ends_with("END:VEVENT\r\n"));
        assert_eq!(doc.line_ending(), "\r\n");
    }

    #[test]
    fn test_reassembly_is_byte_identical() {
        let doc = CalendarDocument::parse(CRLF_DOC);
        assert_eq!(assemble(doc.header, &doc.entries, doc.footer), CRLF_DOC);

        let lf = CRLF_DOC.replace("\r\n", "\n");
        let doc = CalendarDocument::parse(&lf);
        assert_eq!(doc.line_ending(), "\n");
        assert_eq!(assemble(doc.header, &doc.entries, doc.footer), lf);
    }

    #[test]
    fn test_unterminated_block_stays_in_footer() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:a\nEND:VEVENT\nBEGIN:VEVENT\nSUMMARY:b\n";
        let doc = CalendarDocument::parse(text);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.footer, "BEGIN:VEVENT\nSUMMARY:b\n");
        assert_eq!(assemble(doc.header, &doc.entries, doc.footer), text);
    }

    #[test]
    fn test_document_without_events() {
        let text = "BEGIN:VCALENDAR\nX-WR-CALNAME:Empty\nEND:VCALENDAR\n";
        let doc = CalendarDocument::parse(text);
        assert!(doc.is_empty());
        assert_eq!(doc.header, "BEGIN:VCALENDAR\nX-WR-CALNAME:Empty\n");
        assert_eq!(doc.footer, "END:VCALENDAR\n");
    }

    #[test]
    fn test_extract_date_variants() {
        assert_eq!(
            extract_date("\nDTSTART;VALUE=DATE:20250101\n"),
            Some("20250101")
        );
        assert_eq!(extract_date("\nDTSTART:20250102T030000\n"), Some("20250102"));
        assert_eq!(
            extract_date("\nDTSTART;TZID=Asia/Shanghai:20250103T050000\n"),
            Some("20250103")
        );
        assert_eq!(extract_date("\nDTEND:20250103T050000\n"), None);
        assert_eq!(extract_date("\nDTSTART:2025\n"), None);
    }

    #[test]
    fn test_extract_summary_stops_at_line_end() {
        let block = "\r\nUID:1\r\nSUMMARY:『丙子时』\r\nLOCATION:x\r\n";
        assert_eq!(extract_summary(block), Some("『丙子时』"));
        assert_eq!(extract_summary("\r\nUID:1\r\n"), None);
        assert_eq!(extract_summary("\nSUMMARY:\n"), None);
    }

    #[test]
    fn test_replace_summary_keeps_other_lines() {
        let block = "\r\nUID:1\r\nSUMMARY:old\r\nLOCATION:x\r\nEND:VEVENT\r\n";
        assert_eq!(
            replace_summary(block, "new value"),
            "\r\nUID:1\r\nSUMMARY:new value\r\nLOCATION:x\r\nEND:VEVENT\r\n"
        );
        assert_eq!(replace_summary("\nUID:1\n", "x"), "\nUID:1\n");
    }

    #[test]
    fn test_set_calendar_name() {
        let header = "BEGIN:VCALENDAR\r\nX-WR-CALNAME:干支\r\nVERSION:2.0\r\n";
        assert_eq!(
            set_calendar_name(header, "Auspicious Times", "\r\n"),
            "BEGIN:VCALENDAR\r\nX-WR-CALNAME:Auspicious Times\r\nVERSION:2.0\r\n"
        );

        // Replacement text is literal, `$` must survive.
        assert!(set_calendar_name(header, "$1 cal", "\r\n").contains("X-WR-CALNAME:$1 cal\r\n"));

        let bare = "BEGIN:VCALENDAR\nVERSION:2.0\n";
        assert_eq!(
            set_calendar_name(bare, "Named", "\n"),
            "BEGIN:VCALENDAR\nVERSION:2.0\nX-WR-CALNAME:Named\n"
        );
    }

    #[test]
    fn test_validate_flags_unbalanced_documents() {
        let checks = validate(CRLF_DOC);
        assert!(all_passed(&checks), "{:?}", checks);

        let broken = CRLF_DOC.replacen("END:VEVENT", "", 1);
        let checks = validate(&broken);
        let balance = checks
            .iter()
            .find(|c| c.name == "event_count_matches")
            .unwrap();
        assert!(!balance.passed);
        assert!(!all_passed(&checks));

        let checks = validate("hello");
        assert!(checks.iter().take(3).all(|c| !c.passed));
    }
}

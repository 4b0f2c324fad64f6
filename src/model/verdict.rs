// File: src/model/verdict.rs
use super::TITLE_OPEN;
use std::fmt;
use strum::EnumIter;

/// Outcome recorded for a two-hour slot in the marker calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Verdict {
    Auspicious,
    Inauspicious,
}

impl Verdict {
    pub const fn marker(self) -> char {
        match self {
            Verdict::Auspicious => '吉',
            Verdict::Inauspicious => '凶',
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '吉' => Some(Verdict::Auspicious),
            '凶' => Some(Verdict::Inauspicious),
            _ => None,
        }
    }

    /// Classifies an enriched title by the character right after `『`.
    pub fn from_title(title: &str) -> Option<Self> {
        let mut chars = title.chars();
        if chars.next()? != TITLE_OPEN {
            return None;
        }
        Self::from_marker(chars.next()?)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Auspicious => write!(f, "Auspicious ({})", self.marker()),
            Verdict::Inauspicious => write!(f, "Inauspicious ({})", self.marker()),
        }
    }
}

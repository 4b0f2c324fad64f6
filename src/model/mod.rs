// File: ./src/model/mod.rs
pub mod enrich;
pub mod lookup;
pub mod partition;
pub mod verdict;

pub use enrich::{EnrichMode, EnrichReport, Enricher, Enrichment, Sample};
pub use lookup::{BuildReport, MarkerTable, Taboo, TabooTable};
pub use partition::Partition;
pub use verdict::Verdict;

/// Opening bracket of a stem-branch event title.
pub const TITLE_OPEN: char = '『';
/// Closing bracket of a stem-branch event title.
pub const TITLE_CLOSE: char = '』';
/// Designator that follows the hour code (`丙子时`).
pub const HOUR_SUFFIX: char = '时';

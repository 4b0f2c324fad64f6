// File: ./src/controller.rs
/*!
Runs the enrichment pipeline against a working directory.

Stages run strictly in order: build the marker (and taboo) lookups, enrich
the target calendar, write it, split it by verdict, validate, report. A
stage never shares state with the next one except through its return
value. File access failures abort the run; per-event problems only show up
in the report.
*/

use crate::calendar::{self, ValidationCheck};
use crate::config::Config;
use crate::context::AppContext;
use crate::model::{BuildReport, Enricher, MarkerTable, Partition, TabooTable, Verdict};
use crate::report::{OutputFile, RunReport, SplitSummary};
use crate::storage::LocalStorage;
use anyhow::Result;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

pub struct Pipeline<'a> {
    ctx: &'a dyn AppContext,
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a dyn AppContext, config: &'a Config) -> Self {
        Self { ctx, config }
    }

    fn path(&self, file: &str) -> Result<PathBuf> {
        self.ctx.resolve(file)
    }

    pub fn build_markers(&self) -> Result<(MarkerTable, BuildReport)> {
        let path = self.path(&self.config.marker_file)?;
        log::info!("Building marker lookup from {}", path.display());
        let content = LocalStorage::read_calendar(&path)?;
        let (table, report) = MarkerTable::from_ics(&content);
        log::info!(
            "Built marker lookup with {} entries over {} days",
            table.len(),
            table.dates()
        );
        for warning in &report.warnings {
            log::warn!("{}", warning);
        }
        Ok((table, report))
    }

    /// `None` in markers-only mode; the taboo file is not read then.
    pub fn build_taboos(&self) -> Result<Option<(TabooTable, BuildReport)>> {
        if !self.config.mode.uses_taboos() {
            log::info!("Markers-only mode, skipping taboo lookup");
            return Ok(None);
        }
        let path = self.path(&self.config.taboo_file)?;
        log::info!("Building taboo lookup from {}", path.display());
        let content = LocalStorage::read_calendar(&path)?;
        let (table, report) = TabooTable::from_ics(&content);
        log::info!(
            "Built taboo lookup with {} entries over {} days",
            table.len(),
            table.dates()
        );
        Ok(Some((table, report)))
    }

    /// Full run: lookups, enhanced calendar, split calendars, validation,
    /// report (and log file when configured).
    pub fn run(&self) -> Result<RunReport> {
        let (markers, marker_report) = self.build_markers()?;
        let taboos = self.build_taboos()?;

        let target_path = self.path(&self.config.target_file)?;
        log::info!("Enhancing {}", target_path.display());
        let target = LocalStorage::read_calendar(&target_path)?;

        let enricher = Enricher::new(
            &markers,
            taboos.as_ref().map(|(table, _)| table),
            self.config.mode,
        )
        .with_max_samples(self.config.max_samples);
        let (enhanced, enrich_report) = enricher.enrich_calendar(&target);
        log::info!(
            "Enhanced {} of {} events ({} missing lookups)",
            enrich_report.enhanced,
            enrich_report.total,
            enrich_report.missing_lookups
        );

        let enhanced_path = self.path(&self.config.enhanced_file)?;
        log::info!("Writing enhanced file to {}", enhanced_path.display());
        LocalStorage::atomic_write(&enhanced_path, &enhanced)?;

        let split = self.write_split(&enhanced)?;
        let validation = calendar::validate(&enhanced);
        if !calendar::all_passed(&validation) {
            log::warn!("Enhanced calendar failed validation");
        }

        let mut files = vec![
            Self::output_file("Original", target_path),
            Self::output_file("Enhanced", enhanced_path),
        ];
        for verdict in Verdict::iter() {
            let label = match verdict {
                Verdict::Auspicious => "Auspicious",
                Verdict::Inauspicious => "Inauspicious",
            };
            files.push(Self::output_file(
                label,
                self.path(self.config.output_file(verdict))?,
            ));
        }

        let mut report = RunReport {
            mode: self.config.mode,
            markers: marker_report,
            taboos: taboos.map(|(_, report)| report),
            enrich: enrich_report,
            split,
            files,
            validation,
            log_file: None,
        };

        if let Some(name) = self.config.log_file() {
            let log_path = self.path(name)?;
            let text = report.render_log(chrono::Local::now(), self.config.max_warnings_logged);
            LocalStorage::atomic_write(&log_path, text)?;
            report.log_file = Some(log_path);
        }

        Ok(report)
    }

    /// Splits the already written enhanced calendar.
    pub fn split(&self) -> Result<SplitSummary> {
        let path = self.path(&self.config.enhanced_file)?;
        log::info!("Reading {}", path.display());
        let content = LocalStorage::read_calendar(&path)?;
        self.write_split(&content)
    }

    fn write_split(&self, enhanced: &str) -> Result<SplitSummary> {
        let partition = Partition::split(enhanced);
        for verdict in Verdict::iter() {
            let path = self.path(self.config.output_file(verdict))?;
            let rendered = partition.render(verdict, self.config.calendar_name(verdict));
            LocalStorage::atomic_write(&path, rendered)?;
            log::info!(
                "Wrote {} {} events to {}",
                partition.entries(verdict).len(),
                verdict,
                path.display()
            );
        }

        Ok(SplitSummary {
            auspicious: partition.auspicious.len(),
            inauspicious: partition.inauspicious.len(),
            unmatched: partition.unmatched,
        })
    }

    /// Structural checks for any calendar file, the enhanced one by default.
    pub fn validate_file(&self, file: Option<&Path>) -> Result<(PathBuf, Vec<ValidationCheck>)> {
        let path = match file {
            Some(file) => self.ctx.get_work_dir()?.join(file),
            None => self.path(&self.config.enhanced_file)?,
        };
        let content = LocalStorage::read_calendar(&path)?;
        Ok((path, calendar::validate(&content)))
    }

    fn output_file(label: &'static str, path: PathBuf) -> OutputFile {
        OutputFile {
            label,
            size_bytes: LocalStorage::file_size(&path),
            path,
        }
    }
}

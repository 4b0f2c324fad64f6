// Reads source calendars and writes generated files.
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalStorage;

impl LocalStorage {
    /// Reads a whole UTF-8 calendar file.
    pub fn read_calendar(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read calendar file: {}", path.display()))
    }

    /// Sidecar path used while writing: `name.ics` -> `name.ics.tmp`
    fn get_tmp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("output"));
        name.push(".tmp");
        path.with_file_name(name)
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = Self::get_tmp_path(path);
        fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move output into place: {}", path.display()))?;
        Ok(())
    }

    /// Size on disk, 0 when the file cannot be inspected.
    pub fn file_size(path: &Path) -> u64 {
        fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AppContext, TestContext};

    #[test]
    fn test_atomic_write_and_read() {
        let ctx = TestContext::new();
        let path = ctx.get_work_dir().unwrap().join("out.ics");

        LocalStorage::atomic_write(&path, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();
        assert_eq!(
            LocalStorage::read_calendar(&path).unwrap(),
            "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n"
        );
        assert!(!path.with_file_name("out.ics.tmp").exists());
        assert_eq!(LocalStorage::file_size(&path), 32);
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let ctx = TestContext::new();
        let path = ctx.get_work_dir().unwrap().join("missing.ics");

        let err = LocalStorage::read_calendar(&path).unwrap_err();
        assert!(err.to_string().contains("missing.ics"));
        assert_eq!(LocalStorage::file_size(&path), 0);
    }
}

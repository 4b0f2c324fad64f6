// File: ./src/context.rs
/*! Working-directory context.

The `AppContext` trait decides where input calendars are read from, where
outputs are written, and where the configuration file lives. Two
implementations are provided:

- `StandardContext`: the current directory, or an override root given on
  the command line. Falls back to the platform config directory
  (`directories::ProjectDirs`) for the configuration file.
- `TestContext`: a unique temporary directory, removed on drop.

Code doing filesystem IO takes a `&dyn AppContext`; nothing here reads
global or environment state beyond the current directory.
*/

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "shichen.toml";

pub trait AppContext: Send + Sync + std::fmt::Debug {
    /// Directory holding the input calendars and receiving the outputs.
    fn get_work_dir(&self) -> Result<PathBuf>;

    /// Fallback directory for the configuration file.
    fn get_config_dir(&self) -> Result<PathBuf>;

    /// `shichen.toml` in the working directory.
    fn get_local_config_path(&self) -> Result<PathBuf> {
        Ok(self.get_work_dir()?.join(CONFIG_FILE_NAME))
    }

    /// The working-directory config when present, otherwise the one in the
    /// config directory (which may not exist either).
    fn get_config_file_path(&self) -> Result<PathBuf> {
        let local = self.get_local_config_path()?;
        if local.exists() {
            return Ok(local);
        }
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    /// Resolves a configured file name against the working directory.
    /// Absolute paths are returned unchanged.
    fn resolve(&self, file: &str) -> Result<PathBuf> {
        Ok(self.get_work_dir()?.join(file))
    }
}

// --- Production Implementation ---

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn get_proj_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "shichen", "shichen")
    }
}

impl AppContext for StandardContext {
    fn get_work_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            if !root.is_dir() {
                anyhow::bail!("Working directory does not exist: {}", root.display());
            }
            return Ok(root.clone());
        }
        std::env::current_dir().context("Failed to determine the current directory")
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return Ok(root.join("config"));
        }
        let proj = Self::get_proj_dirs().ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        Ok(proj.config_dir().to_path_buf())
    }
}

// --- Test Implementation ---

#[derive(Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a new TestContext backed by a unique temporary directory.
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let root = std::env::temp_dir().join(format!("shichen_test_{}", uuid));
        // Best-effort create; tests will panic if this fails.
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }

    /// Writes `contents` to `name` inside the working directory.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("failed to write test fixture");
        path
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_work_dir(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("config");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Best-effort cleanup; ignore errors.
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

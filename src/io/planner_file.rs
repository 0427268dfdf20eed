use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

/// Read and write access to planner documents.
pub trait PlannerFile {
    fn read(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Planner documents on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPlannerFile;

impl PlannerFile for FsPlannerFile {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        atomic_write(path, content.as_bytes())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// `<dir>/Day Planner-YYYYMMDD.md`
pub fn today_planner_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("Day Planner-{}.md", date.format("%Y%m%d")))
}

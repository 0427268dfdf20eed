use std::fs;
use std::io;
use std::path::Path;

use crate::io::planner_file::atomic_write;
use crate::ops::insert::insert_template;
use crate::parse::{SegmentError, locate, split_lines};

/// Add an empty planner block to the note at `path`, creating the note
/// (and its directory) if needed.
///
/// `line` is 1-based; without it the block goes at the end of the note.
/// Returns the 1-based line the block heading landed on.
pub fn init_planner(path: &Path, line: Option<usize>) -> Result<usize, Box<dyn std::error::Error>> {
    if line == Some(0) {
        return Err("line numbers start at 1".into());
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(format!("could not read {}: {}", path.display(), e).into()),
    };

    let lines = split_lines(&content);
    match locate(&lines) {
        Ok(_) | Err(SegmentError::Unterminated { .. }) => {
            return Err(format!("{} already has a day planner", path.display()).into());
        }
        Err(SegmentError::NotFound) => {}
    }

    let at = match line {
        Some(n) => (n - 1).min(lines.len()),
        None => append_index(&lines),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| format!("could not create {}: {}", parent.display(), e))?;
    }
    atomic_write(path, insert_template(&content, at).as_bytes())
        .map_err(|e| format!("could not write {}: {}", path.display(), e))?;
    Ok(at + 1)
}

/// Append after the last line, keeping a trailing newline at the end.
fn append_index(lines: &[String]) -> usize {
    match lines.last() {
        Some(last) if last.is_empty() => lines.len() - 1,
        _ => lines.len(),
    }
}

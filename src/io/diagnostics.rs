use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::io::planner_file::atomic_write;

/// Size past which old entries are dropped on the next append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Entries older than this are dropped when the log is trimmed.
pub const PRUNE_AGE_DAYS: i64 = 14;

/// Header written at the top of a new log.
const FILE_HEADER: &str = "\
<!-- dayplan diagnostic log
     Problems found while updating day planner notes.
     View with: dp log
     Safe to delete. -->

---
";

/// Separator between timestamp and category in an entry header
const HEADER_SEP: &str = " - ";

/// Stage of the update cycle an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Segment,
    Render,
    Read,
    Write,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Segment => write!(f, "segment"),
            DiagnosticCategory::Render => write!(f, "render"),
            DiagnosticCategory::Read => write!(f, "read"),
            DiagnosticCategory::Write => write!(f, "write"),
        }
    }
}

impl DiagnosticCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "segment" => Some(DiagnosticCategory::Segment),
            "render" => Some(DiagnosticCategory::Render),
            "read" => Some(DiagnosticCategory::Read),
            "write" => Some(DiagnosticCategory::Write),
            _ => None,
        }
    }
}

/// A single entry in the diagnostic log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub timestamp: DateTime<Utc>,
    pub category: DiagnosticCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl DiagnosticEntry {
    pub fn new(category: DiagnosticCategory, description: impl Into<String>) -> Self {
        DiagnosticEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Format this entry as a markdown block for the log.
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {}{}{}: {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            HEADER_SEP,
            self.category,
            self.description,
        );

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push_str("\n---\n");
        out
    }

    /// Serialize to JSON for `dp log --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }

    /// Human-readable form for `dp log`.
    pub fn to_display_markdown(&self) -> String {
        self.to_markdown()
    }
}

/// Path of the diagnostic log for planners in `dir`.
pub fn log_path(dir: &Path) -> PathBuf {
    dir.join(".dayplan.log")
}

/// Append an entry. Failures are printed to stderr and otherwise ignored.
pub fn log_diagnostic(dir: &Path, entry: DiagnosticEntry) {
    if let Err(e) = log_diagnostic_inner(dir, &entry) {
        eprintln!("warning: could not write to diagnostic log: {}", e);
    }
}

fn log_diagnostic_inner(dir: &Path, entry: &DiagnosticEntry) -> io::Result<()> {
    let path = log_path(dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        let content = std::fs::read_to_string(&path)?;
        let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
        atomic_write(&path, prune_entries_before(&content, &cutoff).as_bytes())?;
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Read entries, most recent first.
pub fn read_entries(dir: &Path, limit: Option<usize>) -> Vec<DiagnosticEntry> {
    let content = match std::fs::read_to_string(log_path(dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries.reverse();
    entries
}

/// Remove every entry, keeping the header. Returns how many were removed.
pub fn clear_log(dir: &Path) -> io::Result<usize> {
    let path = log_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let count = parse_entries(&content).len();
    atomic_write(&path, FILE_HEADER.as_bytes())?;
    Ok(count)
}

fn parse_entries(content: &str) -> Vec<DiagnosticEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some((timestamp, category, description)) =
            line.strip_prefix("## ").and_then(parse_entry_header)
        else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }
            if line == "---" {
                break;
            }
            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }
            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(DiagnosticEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> - <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, DiagnosticCategory, String)> {
    let (timestamp, rest) = header.split_once(HEADER_SEP)?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .ok()?
        .with_timezone(&Utc);
    let (category, description) = rest.split_once(": ")?;
    let category = DiagnosticCategory::parse_category(category)?;
    Some((timestamp, category, description.to_string()))
}

/// Drop entries older than `cutoff`, keeping the header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current_entry = String::new();
    let mut current_timestamp: Option<DateTime<Utc>> = None;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }

        if let Some(stripped) = line.strip_prefix("## ") {
            if let Some(ts) = current_timestamp
                && ts >= *cutoff
            {
                result.push_str(&current_entry);
            }
            current_entry.clear();
            current_timestamp = parse_entry_header(stripped).map(|(ts, _, _)| ts);
        }
        current_entry.push_str(line);
        current_entry.push('\n');
    }

    if let Some(ts) = current_timestamp
        && ts >= *cutoff
    {
        result.push_str(&current_entry);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry_at(ts: &str, description: &str) -> DiagnosticEntry {
        DiagnosticEntry {
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
            ..DiagnosticEntry::new(DiagnosticCategory::Render, description)
        }
    }

    #[test]
    fn log_and_read_back() {
        let tmp = TempDir::new().unwrap();
        log_diagnostic(
            tmp.path(),
            DiagnosticEntry::new(DiagnosticCategory::Segment, "unterminated planner")
                .field("File", "Day Planner-20250514.md"),
        );
        log_diagnostic(
            tmp.path(),
            DiagnosticEntry::new(DiagnosticCategory::Render, "progress fallback")
                .field("Line", 3)
                .body("- [ ] 09:00 Write report\n---"),
        );

        let entries = read_entries(tmp.path(), None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, DiagnosticCategory::Render);
        assert_eq!(entries[0].fields, vec![("Line".to_string(), "3".to_string())]);
        assert_eq!(entries[0].body, "- [ ] 09:00 Write report\n---");
        assert_eq!(entries[1].description, "unterminated planner");

        let content = std::fs::read_to_string(log_path(tmp.path())).unwrap();
        assert!(content.starts_with("<!-- dayplan diagnostic log"));
        assert_eq!(content.matches("<!--").count(), 1);
    }

    #[test]
    fn limit_keeps_most_recent() {
        let tmp = TempDir::new().unwrap();
        for n in 0..5 {
            log_diagnostic(
                tmp.path(),
                DiagnosticEntry::new(DiagnosticCategory::Write, format!("failure {}", n)),
            );
        }
        let entries = read_entries(tmp.path(), Some(2));
        let descriptions: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["failure 4", "failure 3"]);
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_entries(tmp.path(), None).is_empty());
        assert_eq!(clear_log(tmp.path()).unwrap(), 0);
    }

    #[test]
    fn clear_keeps_header() {
        let tmp = TempDir::new().unwrap();
        log_diagnostic(tmp.path(), DiagnosticEntry::new(DiagnosticCategory::Read, "gone"));
        assert_eq!(clear_log(tmp.path()).unwrap(), 1);
        assert!(read_entries(tmp.path(), None).is_empty());
        let content = std::fs::read_to_string(log_path(tmp.path())).unwrap();
        assert_eq!(content, FILE_HEADER);
    }

    #[test]
    fn prune_drops_old_entries() {
        let content = format!(
            "{}{}{}",
            FILE_HEADER,
            entry_at("2024-01-01T00:00:00Z", "old").to_markdown(),
            entry_at("2025-06-01T00:00:00Z", "new").to_markdown()
        );
        let cutoff = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let pruned = prune_entries_before(&content, &cutoff);
        let entries = parse_entries(&pruned);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "new");
        assert!(pruned.starts_with(FILE_HEADER));
    }
}

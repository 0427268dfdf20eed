use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::planner_file::atomic_write;
use crate::model::config::DayplanConfig;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "dayplan.toml";

/// Error type for config I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not edit {path}: {source}")]
    EditError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("unknown config key '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Kind of value a config key holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Bool,
    Integer,
    Text,
}

/// Settable keys: (key, table, kind)
const KEYS: &[(&str, &str, ValueKind)] = &[
    ("complete_past_items", "planner", ValueKind::Bool),
    ("mermaid", "planner", ValueKind::Bool),
    ("break_label", "planner", ValueKind::Text),
    ("end_label", "planner", ValueKind::Text),
    ("cooldown_ms", "planner", ValueKind::Integer),
    ("directory", "planner", ValueKind::Text),
    ("interval_secs", "watch", ValueKind::Integer),
];

/// Load the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<DayplanConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DayplanConfig::default()),
        Err(source) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read the config as a toml_edit document for round-trip-safe editing.
/// A missing file yields an empty document.
pub fn read_config_doc(path: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    text.parse().map_err(|source| ConfigError::EditError {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config_doc(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    atomic_write(path, doc.to_string().as_bytes()).map_err(|source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

/// Set `key` to `value` in the config document, creating its table if needed.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) -> Result<(), ConfigError> {
    let &(_, table, kind) = KEYS
        .iter()
        .find(|(k, _, _)| *k == key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let invalid = |expected| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    };
    let item = match kind {
        ValueKind::Bool => toml_edit::value(value.parse::<bool>().map_err(|_| invalid("true or false"))?),
        ValueKind::Integer => {
            let n = value.parse::<u64>().map_err(|_| invalid("a whole number"))?;
            toml_edit::value(i64::try_from(n).map_err(|_| invalid("a smaller number"))?)
        }
        ValueKind::Text => toml_edit::value(value),
    };

    if !doc.contains_key(table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[table][key] = item;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# planner settings
[planner]
complete_past_items = true # auto check
mermaid = false

[watch]
interval_secs = 30
"#
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(config.planner.complete_past_items);
        assert!(read_config_doc(&tmp.path().join(CONFIG_FILE)).unwrap().is_empty());
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[planner\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn round_trip_preserves_comments() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, sample_config()).unwrap();

        let doc = read_config_doc(&path).unwrap();
        write_config_doc(&path, &doc).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), sample_config());
    }

    #[test]
    fn set_bool_keeps_neighbours() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "mermaid", "true").unwrap();
        let result = doc.to_string();
        assert!(result.contains("mermaid = true"));
        assert!(result.contains("# planner settings"));

        let config: DayplanConfig = toml::from_str(&result).unwrap();
        assert!(config.planner.mermaid);
        assert_eq!(config.watch.interval_secs, 30);
    }

    #[test]
    fn set_creates_missing_table() {
        let mut doc = toml_edit::DocumentMut::new();
        set_value(&mut doc, "cooldown_ms", "9000").unwrap();
        set_value(&mut doc, "end_label", "DONE").unwrap();
        let config: DayplanConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.planner.cooldown_ms, 9000);
        assert_eq!(config.planner.end_label, "DONE");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let mut doc = toml_edit::DocumentMut::new();
        assert!(matches!(
            set_value(&mut doc, "colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            set_value(&mut doc, "mermaid", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "interval_secs", "-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}

use serde::{Deserialize, Serialize};

/// Configuration from dayplan.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayplanConfig {
    #[serde(default)]
    pub planner: PlannerSettings,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Check off items whose span has ended. When false, the checkbox the
    /// user wrote is preserved.
    #[serde(default = "default_true")]
    pub complete_past_items: bool,
    /// Prepend a mermaid gantt chart to the plan
    #[serde(default)]
    pub mermaid: bool,
    #[serde(default = "default_break_label")]
    pub break_label: String,
    #[serde(default = "default_end_label")]
    pub end_label: String,
    /// Quiet period after a manual edit during which no rewrite happens
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Directory holding the dated planner notes, relative to the config file
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            complete_past_items: true,
            mermaid: false,
            break_label: default_break_label(),
            end_label: default_end_label(),
            cooldown_ms: default_cooldown_ms(),
            directory: default_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between scheduled update cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_break_label() -> String {
    "BREAK".to_string()
}

fn default_end_label() -> String {
    "END".to_string()
}

fn default_cooldown_ms() -> u64 {
    6000
}

fn default_directory() -> String {
    "Day Planners".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

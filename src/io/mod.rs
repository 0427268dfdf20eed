pub mod config_io;
pub mod diagnostics;
pub mod lock;
pub mod planner_file;
pub mod watcher;

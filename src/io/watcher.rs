use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// The planner file changed on disk.
    Changed(PathBuf),
}

/// Watches a single planner file for outside edits.
///
/// The parent directory is watched, since editors commonly replace files
/// by rename; events for other files are dropped.
pub struct PlannerWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl PlannerWatcher {
    pub fn start(file: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target = file.to_path_buf();
        let dir = match file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                if is_relevant(&event, &target) {
                    let _ = tx.send(FileEvent::Changed(target.clone()));
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(PlannerWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending file events.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block until an event arrives or `timeout` passes, then drain the rest.
    pub fn wait(&self, timeout: Duration) -> Vec<FileEvent> {
        let mut events = Vec::new();
        if let Ok(evt) = self.rx.recv_timeout(timeout) {
            events.push(evt);
            events.extend(self.poll());
        }
        events
    }
}

/// Creates, modifications and removes of the planner file itself.
fn is_relevant(event: &Event, target: &Path) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some() && p.file_name() == target.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_the_planner_file_counts() {
        let target = Path::new("/notes/Day Planner-20250514.md");
        assert!(is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/notes/Day Planner-20250514.md"),
            target
        ));
        assert!(is_relevant(
            &event(EventKind::Create(CreateKind::File), "/notes/Day Planner-20250514.md"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/notes/.dayplan.log"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Access(AccessKind::Any), "/notes/Day Planner-20250514.md"),
            target
        ));
    }
}

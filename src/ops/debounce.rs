use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};

/// Quiet period after a manual edit
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(6000);

/// Whether a rewrite must wait because the user edited the plan less than
/// `cooldown` ago.
pub fn should_suppress_write(
    last_edit: Option<NaiveDateTime>,
    now: NaiveDateTime,
    cooldown: Duration,
) -> bool {
    let Some(last_edit) = last_edit else {
        return false;
    };
    match TimeDelta::from_std(cooldown) {
        Ok(cooldown) => now - last_edit < cooldown,
        Err(_) => true,
    }
}

/// Caller-owned editing state carried between update cycles.
#[derive(Debug, Clone)]
pub struct EditSession {
    last_edit: Option<NaiveDateTime>,
    cooldown: Duration,
}

impl Default for EditSession {
    fn default() -> Self {
        EditSession::new(DEFAULT_COOLDOWN)
    }
}

impl EditSession {
    pub fn new(cooldown: Duration) -> Self {
        EditSession {
            last_edit: None,
            cooldown,
        }
    }

    /// Record that the user is editing the planner file
    pub fn mark_edit(&mut self, now: NaiveDateTime) {
        self.last_edit = Some(now);
    }

    pub fn last_edit(&self) -> Option<NaiveDateTime> {
        self.last_edit
    }

    pub fn should_suppress_write(&self, now: NaiveDateTime) -> bool {
        should_suppress_write(self.last_edit, now, self.cooldown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn edit_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn suppresses_inside_the_cooldown() {
        let last = edit_time();
        let now = last + TimeDelta::milliseconds(1);
        assert!(should_suppress_write(Some(last), now, DEFAULT_COOLDOWN));
    }

    #[test]
    fn allows_after_the_cooldown() {
        let last = edit_time();
        let now = last + TimeDelta::milliseconds(6001);
        assert!(!should_suppress_write(Some(last), now, DEFAULT_COOLDOWN));
        let now = last + TimeDelta::milliseconds(6000);
        assert!(!should_suppress_write(Some(last), now, DEFAULT_COOLDOWN));
    }

    #[test]
    fn no_edit_never_suppresses() {
        assert!(!should_suppress_write(None, edit_time(), DEFAULT_COOLDOWN));
    }

    #[test]
    fn session_tracks_latest_edit() {
        let mut session = EditSession::default();
        let first = edit_time();
        session.mark_edit(first);
        assert!(session.should_suppress_write(first + TimeDelta::seconds(5)));

        session.mark_edit(first + TimeDelta::seconds(5));
        assert!(session.should_suppress_write(first + TimeDelta::seconds(10)));
        assert!(!session.should_suppress_write(first + TimeDelta::seconds(12)));
        assert_eq!(session.last_edit(), Some(first + TimeDelta::seconds(5)));
    }
}

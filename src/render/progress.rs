use chrono::NaiveTime;

use crate::model::plan::PlanItem;

/// Number of cells in the progress bar
const BAR_CELLS: u32 = 10;

/// Why progress through the current item could not be derived
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("no item follows {raw_time} to measure progress against")]
    NoNext { raw_time: String },
    #[error("span from {start} to {end} is empty")]
    EmptySpan { start: String, end: String },
}

/// Progress through the current item's span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Elapsed share of the span, 0..=100
    pub percent: u32,
    /// Whole minutes until the next item starts
    pub minutes_left: i64,
}

impl Progress {
    /// Measure `now` against the span from `current` to `next`.
    pub fn between(
        current: &PlanItem,
        next: Option<&PlanItem>,
        now: NaiveTime,
    ) -> Result<Progress, ProgressError> {
        let next = next.ok_or_else(|| ProgressError::NoNext {
            raw_time: current.raw_time.clone(),
        })?;
        let total = (next.start - current.start).num_seconds();
        if total <= 0 {
            return Err(ProgressError::EmptySpan {
                start: current.raw_time.clone(),
                end: next.raw_time.clone(),
            });
        }
        let elapsed = (now - current.start).num_seconds().clamp(0, total);
        Ok(Progress {
            percent: (elapsed * 100 / total) as u32,
            minutes_left: (next.start - now).num_minutes().max(0),
        })
    }

    /// Text bar: `███░░░░░░░ 30% (42 min left)`
    pub fn markdown(&self) -> String {
        let filled = (self.percent / (100 / BAR_CELLS)).min(BAR_CELLS) as usize;
        format!(
            "{}{} {}% ({} min left)",
            "█".repeat(filled),
            "░".repeat(BAR_CELLS as usize - filled),
            self.percent,
            self.minutes_left
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(raw: &str, h: u32, m: u32) -> PlanItem {
        PlanItem::new(raw, NaiveTime::from_hms_opt(h, m, 0).unwrap(), "task")
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn halfway_through_two_hours() {
        let p = Progress::between(&item("09:00", 9, 0), Some(&item("11:00", 11, 0)), at(10, 0)).unwrap();
        assert_eq!(p, Progress { percent: 50, minutes_left: 60 });
        assert_eq!(p.markdown(), "█████░░░░░ 50% (60 min left)");
    }

    #[test]
    fn start_of_span_is_zero() {
        let p = Progress::between(&item("9:00", 9, 0), Some(&item("9:30", 9, 30)), at(9, 0)).unwrap();
        assert_eq!(p.percent, 0);
        assert_eq!(p.markdown(), "░░░░░░░░░░ 0% (30 min left)");
    }

    #[test]
    fn percent_rounds_down() {
        let p = Progress::between(&item("09:00", 9, 0), Some(&item("09:03", 9, 3)), at(9, 2)).unwrap();
        assert_eq!(p.percent, 66);
        assert_eq!(p.markdown(), "██████░░░░ 66% (1 min left)");
    }

    #[test]
    fn missing_next_is_an_error() {
        let err = Progress::between(&item("09:00", 9, 0), None, at(10, 0)).unwrap_err();
        assert_eq!(err, ProgressError::NoNext { raw_time: "09:00".into() });
    }

    #[test]
    fn empty_span_is_an_error() {
        let err = Progress::between(&item("11:00", 11, 0), Some(&item("10:00", 10, 0)), at(11, 0))
            .unwrap_err();
        assert!(matches!(err, ProgressError::EmptySpan { .. }));
    }
}

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Checkbox state of a plan item line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    Open,
    Done,
}

impl Check {
    /// The character used inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            Check::Open => ' ',
            Check::Done => 'x',
        }
    }

    /// Parse a checkbox character into a state
    pub fn from_checkbox_char(c: char) -> Option<Check> {
        match c {
            ' ' => Some(Check::Open),
            'x' | 'X' => Some(Check::Done),
            _ => None,
        }
    }

    pub fn from_bool(done: bool) -> Check {
        if done { Check::Done } else { Check::Open }
    }
}

/// A single time-stamped task line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    /// The time token exactly as written (`9:00`, `09:00`)
    pub raw_time: String,
    /// Normalized time of day
    pub start: NaiveTime,
    /// Task label, without checkbox and time token
    pub text: String,
    /// Whether the source checkbox was `[x]`
    pub is_completed: bool,
    /// Whether the label is the configured break label
    pub is_break: bool,

    /// The original source line
    #[serde(skip)]
    pub raw: String,
}

impl PlanItem {
    pub fn new(raw_time: &str, start: NaiveTime, text: &str) -> Self {
        PlanItem {
            raw_time: raw_time.to_string(),
            start,
            text: text.to_string(),
            is_completed: false,
            is_break: false,
            raw: format!("- [ ] {} {}", raw_time, text),
        }
    }
}

/// One line of the managed segment, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanLine {
    /// A well-formed task line
    Item(PlanItem),
    /// The end-of-day sentinel line (`- [ ] 18:00 END`)
    EndOfDay(PlanItem),
    /// A line that does not match the item grammar, emitted verbatim
    Unmatched { raw: String },
}

impl PlanLine {
    /// The parsed item, if this line is well-formed
    pub fn item(&self) -> Option<&PlanItem> {
        match self {
            PlanLine::Item(item) | PlanLine::EndOfDay(item) => Some(item),
            PlanLine::Unmatched { .. } => None,
        }
    }

    pub fn is_end_of_day(&self) -> bool {
        matches!(self, PlanLine::EndOfDay(_))
    }
}

/// End of an item's time span
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanEnd {
    /// Start of the following item
    At(NaiveTime),
    /// Synthetic end of day, after every time of the day
    Midnight,
}

impl SpanEnd {
    /// Whether this end lies at or before `now`
    pub fn reached(self, now: NaiveTime) -> bool {
        match self {
            SpanEnd::At(end) => end <= now,
            SpanEnd::Midnight => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn checkbox_chars_are_single_width() {
        assert_eq!(Check::Open.checkbox_char(), ' ');
        assert_eq!(Check::Done.checkbox_char(), 'x');
        assert_eq!(Check::from_checkbox_char('X'), Some(Check::Done));
        assert_eq!(Check::from_checkbox_char('>'), None);
    }

    #[test]
    fn span_end_is_half_open() {
        assert!(SpanEnd::At(t(10, 0)).reached(t(10, 0)));
        assert!(!SpanEnd::At(t(10, 0)).reached(t(9, 59)));
        assert!(!SpanEnd::Midnight.reached(NaiveTime::from_hms_opt(23, 59, 59).unwrap()));
        assert!(SpanEnd::At(t(9, 0)) < SpanEnd::Midnight);
    }

    #[test]
    fn unmatched_line_has_no_item() {
        let line = PlanLine::Unmatched {
            raw: "random text".into(),
        };
        assert!(line.item().is_none());
        assert!(!line.is_end_of_day());
    }
}

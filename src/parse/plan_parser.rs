use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::model::config::PlannerSettings;
use crate::model::plan::{Check, PlanItem, PlanLine};

/// Heading of the block rendered around the current item
pub const CURRENT_TASK_HEADER: &str = "**Current Task**";
/// Prefix of the rendered progress line
pub const PROGRESS_PREFIX: &str = "> ||";
/// Opening fence of the rendered diagram
pub const MERMAID_FENCE: &str = "```mermaid";
pub const FENCE_CLOSE: &str = "```";
/// First lines inside the rendered diagram fence
pub const GANTT_PREAMBLE: [&str; 4] = [
    "gantt",
    "    dateFormat HH:mm",
    "    axisFormat %H:%M",
    "    section Plan",
];

/// `- [ ] 09:00 Label`, with the list dash and checkbox optional
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:-\s*)?(?:\[(?P<check>[ xX])\]\s*)?(?P<time>[0-9]{1,2}:[0-9]{2})\s+(?P<text>.*)$",
    )
    .expect("item grammar is a valid regex")
});

/// `> ||09:00||{bar}||11:00||`
static PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^> \|\|[^|]*\|\|[^|]*\|\|[^|]*\|\|$").expect("progress line is a valid regex")
});

/// Labels with special meaning in the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub break_label: String,
    pub end_label: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels::from_settings(&PlannerSettings::default())
    }
}

impl Labels {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Labels {
            break_label: settings.break_label.clone(),
            end_label: settings.end_label.clone(),
        }
    }
}

/// Parse the managed segment into plan lines.
///
/// Never fails: a line that does not match the item grammar becomes
/// `PlanLine::Unmatched` and keeps its exact text. Output this crate
/// rendered on an earlier cycle (the current-task block and the diagram)
/// is dropped here so it can be rendered afresh.
pub fn parse_plan(lines: &[String], labels: &Labels) -> Vec<PlanLine> {
    let mut parsed = Vec::with_capacity(lines.len());
    let mut idx = 0;
    while idx < lines.len() {
        if let Some(next_idx) = skip_generated(lines, idx) {
            idx = next_idx;
            continue;
        }
        parsed.push(parse_line(&lines[idx], labels));
        idx += 1;
    }
    parsed
}

/// Parse a single line of the segment
pub fn parse_line(line: &str, labels: &Labels) -> PlanLine {
    let unmatched = || PlanLine::Unmatched {
        raw: line.to_string(),
    };
    let Some(caps) = ITEM_RE.captures(line) else {
        return unmatched();
    };
    let raw_time = &caps["time"];
    let Some(start) = parse_time(raw_time) else {
        return unmatched();
    };

    let check = caps
        .name("check")
        .and_then(|m| m.as_str().chars().next())
        .and_then(Check::from_checkbox_char)
        .unwrap_or(Check::Open);
    let text = caps["text"].trim_end();

    let item = PlanItem {
        raw_time: raw_time.to_string(),
        start,
        text: text.to_string(),
        is_completed: check == Check::Done,
        is_break: !labels.break_label.is_empty() && text.starts_with(&labels.break_label),
        raw: line.to_string(),
    };

    if text == labels.end_label {
        PlanLine::EndOfDay(item)
    } else {
        PlanLine::Item(item)
    }
}

/// `H:MM` or `HH:MM` on a 24 hour clock
fn parse_time(token: &str) -> Option<NaiveTime> {
    let (hours, minutes) = token.split_once(':')?;
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

/// If a previously rendered block starts at `idx`, return the index just
/// past it. Only the exact shapes `render_plan` emits qualify; anything the
/// user wrote that merely looks similar stays in the plan.
fn skip_generated(lines: &[String], idx: usize) -> Option<usize> {
    if lines[idx] == MERMAID_FENCE {
        return skip_gantt(lines, idx);
    }

    let mut pos = idx;
    if lines[pos].is_empty() {
        pos += 1;
    }
    let line = |at: usize| lines.get(at).map(String::as_str);
    let block = line(pos) == Some(CURRENT_TASK_HEADER)
        && line(pos + 1) == Some("")
        && line(pos + 2).is_some_and(|l| PROGRESS_RE.is_match(l))
        && line(pos + 3) == Some("");
    block.then_some(pos + 4)
}

/// A closed fence whose body opens with the gantt preamble
fn skip_gantt(lines: &[String], idx: usize) -> Option<usize> {
    let body = &lines[idx + 1..];
    let preamble = body.len() >= GANTT_PREAMBLE.len()
        && body.iter().zip(GANTT_PREAMBLE).all(|(line, expected)| line == expected);
    if !preamble {
        return None;
    }
    body.iter()
        .position(|l| l == FENCE_CLOSE)
        .map(|offset| idx + 1 + offset + 1)
}

use chrono::NaiveTime;
use serde::Serialize;

use crate::model::plan::{Check, PlanItem, PlanLine, SpanEnd};
use crate::model::summary::PlanSummary;
use crate::ops::cycle::CycleOutcome;
use crate::render::progress::Progress;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ItemJson {
    pub line: usize,
    pub time: String,
    pub text: String,
    pub kind: ItemKind,
    pub status: ItemStatus,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Break,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Past,
    Current,
    Upcoming,
}

#[derive(Debug, Serialize)]
pub struct ProgressJson {
    pub percent: u32,
    pub minutes_left: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryJson {
    pub now: String,
    pub empty: bool,
    pub exhausted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressJson>,
    pub items: Vec<ItemJson>,
    pub unmatched: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CycleJson {
    pub file: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn item_status(summary: &PlanSummary, idx: usize) -> ItemStatus {
    if summary.current == Some(idx) && !summary.is_past(idx) {
        ItemStatus::Current
    } else if summary.is_past(idx) {
        ItemStatus::Past
    } else {
        ItemStatus::Upcoming
    }
}

fn item_kind(line: &PlanLine, item: &PlanItem) -> ItemKind {
    if line.is_end_of_day() {
        ItemKind::End
    } else if item.is_break {
        ItemKind::Break
    } else {
        ItemKind::Task
    }
}

fn span_end_text(end: Option<SpanEnd>) -> Option<String> {
    match end? {
        SpanEnd::At(t) => Some(t.format("%H:%M").to_string()),
        SpanEnd::Midnight => Some("24:00".to_string()),
    }
}

/// Progress through the current item, if it can be measured
pub fn current_progress(summary: &PlanSummary, now: NaiveTime) -> Option<Progress> {
    let current = summary.current_item()?;
    if summary.is_exhausted() {
        return None;
    }
    Progress::between(current, summary.next_item(), now).ok()
}

pub fn summary_to_json(summary: &PlanSummary, now: NaiveTime) -> SummaryJson {
    let mut items = Vec::new();
    let mut unmatched = Vec::new();
    for (idx, line) in summary.lines.iter().enumerate() {
        match line.item() {
            Some(item) => items.push(ItemJson {
                line: idx,
                time: item.raw_time.clone(),
                text: item.text.clone(),
                kind: item_kind(line, item),
                status: item_status(summary, idx),
                completed: item.is_completed,
                ends: span_end_text(summary.span_end(idx)),
            }),
            None => {
                if let PlanLine::Unmatched { raw } = line
                    && !raw.trim().is_empty()
                {
                    unmatched.push(raw.clone());
                }
            }
        }
    }

    SummaryJson {
        now: now.format("%H:%M").to_string(),
        empty: summary.empty,
        exhausted: summary.is_exhausted(),
        current: summary.current,
        next: summary.next,
        progress: current_progress(summary, now).map(|p| ProgressJson {
            percent: p.percent,
            minutes_left: p.minutes_left,
        }),
        items,
        unmatched,
    }
}

pub fn outcome_label(outcome: &CycleOutcome) -> &'static str {
    match outcome {
        CycleOutcome::Written => "written",
        CycleOutcome::Unchanged => "unchanged",
        CycleOutcome::Suppressed => "suppressed",
        CycleOutcome::Skipped(_) => "skipped",
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One line per item: `> [ ] 09:00 Write report`, with `>` on the current item
pub fn format_summary(summary: &PlanSummary, now: NaiveTime) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.empty {
        lines.push("no timed items in the day planner".to_string());
        return lines;
    }

    for idx in summary.item_indices() {
        let Some(item) = summary.lines[idx].item() else {
            continue;
        };
        let status = item_status(summary, idx);
        let marker = if status == ItemStatus::Current { '>' } else { ' ' };
        let check = Check::from_bool(status == ItemStatus::Past);
        let mut line = format!("{} [{}] {} {}", marker, check.checkbox_char(), item.raw_time, item.text);
        if status == ItemStatus::Current
            && let Some(progress) = current_progress(summary, now)
        {
            line.push_str(&format!("  {}", progress.markdown()));
        }
        lines.push(line);
    }

    if summary.is_exhausted() {
        lines.push(String::new());
        lines.push("day complete".to_string());
    } else if summary.current.is_none() {
        lines.push(String::new());
        lines.push("nothing scheduled yet".to_string());
    }
    lines
}

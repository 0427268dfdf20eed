use chrono::Timelike;

use crate::model::plan::{PlanLine, SpanEnd};
use crate::model::summary::PlanSummary;
use crate::parse::plan_parser::{FENCE_CLOSE, GANTT_PREAMBLE, MERMAID_FENCE};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Render the plan as a fenced mermaid gantt chart.
///
/// Unmatched lines and the end line are left out. Expects `calculate` to
/// have run so past and current items can be styled.
pub fn gantt(summary: &PlanSummary) -> Vec<String> {
    let mut lines = vec![MERMAID_FENCE.to_string()];
    lines.extend(GANTT_PREAMBLE.iter().map(|l| l.to_string()));

    for (idx, line) in summary.lines.iter().enumerate() {
        let PlanLine::Item(item) = line else {
            continue;
        };
        let minutes = match summary.span_end(idx) {
            Some(SpanEnd::At(end)) => (end - item.start).num_minutes().max(0),
            Some(SpanEnd::Midnight) | None => {
                (SECONDS_PER_DAY - i64::from(item.start.num_seconds_from_midnight())) / 60
            }
        };

        let mut tags = String::new();
        if item.is_break {
            tags.push_str("crit, ");
        }
        if summary.current == Some(idx) {
            tags.push_str("active, ");
        } else if summary.is_past(idx) {
            tags.push_str("done, ");
        }
        if minutes == 0 {
            tags.push_str("milestone, ");
        }

        lines.push(format!(
            "    {} :{}{}, {}m",
            label(&item.text),
            tags,
            item.start.format("%H:%M"),
            minutes
        ));
    }

    lines.push(FENCE_CLOSE.to_string());
    lines
}

/// `:` separates the label from the task data and `#`/`;` are syntax too.
fn label(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if matches!(c, ':' | '#' | ';') { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "(untitled)".to_string()
    } else {
        cleaned.to_string()
    }
}

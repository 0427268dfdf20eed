use chrono::NaiveTime;

use crate::model::config::PlannerSettings;
use crate::model::plan::{Check, PlanItem, PlanLine};
use crate::model::summary::PlanSummary;
use crate::parse::plan_parser::{CURRENT_TASK_HEADER, PROGRESS_PREFIX};
use crate::render::mermaid;
use crate::render::progress::{Progress, ProgressError};

/// A line that fell back to plain rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWarning {
    /// Index of the line within the managed segment
    pub line: usize,
    pub error: ProgressError,
}

/// Rendered segment content plus any per-line fallbacks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    pub lines: Vec<String>,
    pub warnings: Vec<RenderWarning>,
}

/// Re-serialize every line of a calculated summary.
///
/// Unmatched lines are emitted verbatim. The current item is expanded into
/// the current-task block with a progress bar; if progress can't be
/// derived, only its item line is emitted and a warning is recorded.
/// Callers skip empty summaries.
pub fn render_plan(summary: &PlanSummary, settings: &PlannerSettings, now: NaiveTime) -> RenderOutput {
    let mut out = RenderOutput::default();
    if settings.mermaid {
        out.lines.extend(mermaid::gantt(summary));
    }

    for (idx, line) in summary.lines.iter().enumerate() {
        let item = match line {
            PlanLine::Unmatched { raw } => {
                out.lines.push(raw.clone());
                continue;
            }
            PlanLine::Item(item) | PlanLine::EndOfDay(item) => item,
        };

        if summary.current != Some(idx) {
            out.lines.push(item_line(item, summary.is_past(idx), settings));
        } else if line.is_end_of_day() {
            out.lines.push(item_line(item, true, settings));
        } else {
            match current_block(summary, item, settings, now) {
                Ok(block) => out.lines.extend(block),
                Err(error) => {
                    out.warnings.push(RenderWarning { line: idx, error });
                    out.lines.push(item_line(item, false, settings));
                }
            }
        }
    }
    out
}

/// `- [x] 09:00 Label`. With `complete_past_items` off, the checkbox the
/// user wrote wins over `complete`. A line whose checkbox keeps its state is
/// returned exactly as written.
pub fn item_line(item: &PlanItem, complete: bool, settings: &PlannerSettings) -> String {
    if !settings.complete_past_items || complete == item.is_completed {
        return item.raw.clone();
    }
    let check = Check::from_bool(complete);
    format!("- [{}] {} {}", check.checkbox_char(), item.raw_time, item.text)
}

fn current_block(
    summary: &PlanSummary,
    current: &PlanItem,
    settings: &PlannerSettings,
    now: NaiveTime,
) -> Result<Vec<String>, ProgressError> {
    let next = summary.next_item();
    let progress = Progress::between(current, next, now)?;
    let next_time = next.map(|n| n.raw_time.as_str()).unwrap_or_default();
    Ok(vec![
        String::new(),
        CURRENT_TASK_HEADER.to_string(),
        String::new(),
        format!(
            "{}{}||{}||{}||",
            PROGRESS_PREFIX,
            current.raw_time,
            progress.markdown(),
            next_time
        ),
        String::new(),
        item_line(current, false, settings),
    ])
}

use chrono::NaiveTime;

use super::plan::{PlanItem, PlanLine, SpanEnd};

/// Derived schedule state for one parse of the managed segment.
///
/// Created fresh for every update cycle. `calculate` assigns `current`,
/// `next` and the per-line past flags for a given time of day, and may be
/// called repeatedly; the same `now` always yields the same assignment.
#[derive(Debug, Clone)]
pub struct PlanSummary {
    /// All segment lines in document order
    pub lines: Vec<PlanLine>,
    /// Index of the line whose span contains `now`
    pub current: Option<usize>,
    /// Index of the well-formed line following `current`
    pub next: Option<usize>,
    /// True when no well-formed items were parsed, not counting the end line
    pub empty: bool,
    /// Where the plan closes, `None` for an empty plan
    pub sentinel: Option<Sentinel>,
    exhausted: bool,
    ends: Vec<Option<SpanEnd>>,
    past: Vec<bool>,
}

/// The end-of-day sentinel closing the last real item's span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// An explicit end line in the document, by line index
    Line(usize),
    /// No end line was written; the plan closes when the last item starts
    Synthetic(NaiveTime),
}

impl PlanSummary {
    pub fn new(lines: Vec<PlanLine>) -> Self {
        let ends = span_ends(&lines);
        let empty = !lines.iter().any(|l| matches!(l, PlanLine::Item(_)));
        let sentinel = find_sentinel(&lines);
        let past = vec![false; lines.len()];
        PlanSummary {
            lines,
            current: None,
            next: None,
            empty,
            sentinel,
            exhausted: false,
            ends,
            past,
        }
    }

    /// Derive `current`, `next` and past flags relative to `now`.
    pub fn calculate(&mut self, now: NaiveTime) {
        self.current = None;
        self.next = None;
        self.exhausted = false;
        self.past.iter_mut().for_each(|p| *p = false);

        let indices: Vec<usize> = self.item_indices().collect();
        for (pos, &idx) in indices.iter().enumerate() {
            let (Some(item), Some(end)) = (self.lines[idx].item(), self.ends[idx]) else {
                continue;
            };
            let mut past = end.reached(now);

            // Overlapping spans only occur in out-of-order documents;
            // the first one in document order keeps the slot.
            if self.current.is_none() && item.start <= now && !past {
                self.current = Some(idx);
                self.next = indices.get(pos + 1).copied();
                if self.lines[idx].is_end_of_day() {
                    past = true;
                    self.exhausted = true;
                }
            }
            self.past[idx] = past;
        }

        if let Some(Sentinel::Synthetic(start)) = self.sentinel
            && self.current.is_none()
            && start <= now
        {
            self.exhausted = true;
        }
    }

    /// Indices of well-formed lines (items and the end-of-day sentinel)
    pub fn item_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.item().is_some())
            .map(|(idx, _)| idx)
    }

    pub fn is_past(&self, idx: usize) -> bool {
        self.past.get(idx).copied().unwrap_or(false)
    }

    pub fn span_end(&self, idx: usize) -> Option<SpanEnd> {
        self.ends.get(idx).copied().flatten()
    }

    pub fn current_item(&self) -> Option<&PlanItem> {
        self.current.and_then(|idx| self.lines[idx].item())
    }

    pub fn next_item(&self) -> Option<&PlanItem> {
        self.next.and_then(|idx| self.lines[idx].item())
    }

    /// Whether the end-of-day sentinel has been reached
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Each item's span runs to the start of the next well-formed line. An
/// explicit end line runs to midnight. A last item with no end line after
/// it closes the day itself, so its span is empty.
fn span_ends(lines: &[PlanLine]) -> Vec<Option<SpanEnd>> {
    let mut ends = vec![None; lines.len()];
    let mut following = None;
    for (idx, line) in lines.iter().enumerate().rev() {
        match line {
            PlanLine::Item(item) => {
                ends[idx] = Some(following.unwrap_or(SpanEnd::At(item.start)));
                following = Some(SpanEnd::At(item.start));
            }
            PlanLine::EndOfDay(item) => {
                ends[idx] = Some(SpanEnd::Midnight);
                following = Some(SpanEnd::At(item.start));
            }
            PlanLine::Unmatched { .. } => {}
        }
    }
    ends
}

fn find_sentinel(lines: &[PlanLine]) -> Option<Sentinel> {
    if let Some(idx) = lines.iter().position(PlanLine::is_end_of_day) {
        return Some(Sentinel::Line(idx));
    }
    lines
        .iter()
        .rev()
        .find_map(PlanLine::item)
        .map(|last| Sentinel::Synthetic(last.start))
}

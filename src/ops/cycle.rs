use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;

use crate::io::planner_file::PlannerFile;
use crate::model::config::PlannerSettings;
use crate::model::summary::PlanSummary;
use crate::ops::clock::Clock;
use crate::ops::debounce::EditSession;
use crate::parse::{Labels, Segment, SegmentError, join_lines, locate, parse_plan, split_lines};
use crate::render::plan_renderer::{RenderWarning, render_plan};

/// Error type for update cycles
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Why a document was left alone
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Skip {
    #[error(transparent)]
    NoSegment(#[from] SegmentError),
    #[error("the day planner has no timed items")]
    Empty,
}

/// A parsed planner document
#[derive(Debug, Clone)]
pub struct PlannerDocument {
    pub lines: Vec<String>,
    pub segment: Segment,
    pub summary: PlanSummary,
}

impl PlannerDocument {
    /// Locate and parse the managed block of `content`.
    pub fn parse(content: &str, settings: &PlannerSettings) -> Result<Self, SegmentError> {
        let lines = split_lines(content);
        let segment = locate(&lines)?;
        let parsed = parse_plan(segment.lines(&lines), &Labels::from_settings(settings));
        Ok(PlannerDocument {
            lines,
            segment,
            summary: PlanSummary::new(parsed),
        })
    }
}

/// The full new document text for one point in time
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub content: String,
    pub summary: PlanSummary,
    pub warnings: Vec<RenderWarning>,
}

/// Compute the complete new document without touching any file.
pub fn render_document(
    content: &str,
    settings: &PlannerSettings,
    now: NaiveTime,
) -> Result<RenderedDocument, Skip> {
    let PlannerDocument {
        lines,
        segment,
        mut summary,
    } = PlannerDocument::parse(content, settings)?;
    summary.calculate(now);
    if summary.empty {
        return Err(Skip::Empty);
    }
    let rendered = render_plan(&summary, settings, now);
    let merged = segment.splice(&lines, rendered.lines);
    Ok(RenderedDocument {
        content: join_lines(&merged),
        summary,
        warnings: rendered.warnings,
    })
}

/// What an update cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The document was rewritten
    Written,
    /// Nothing changed since the last rewrite
    Unchanged,
    /// The user edited the plan within the cooldown
    Suppressed,
    Skipped(Skip),
}

/// Result of an update cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// The document as it stands after the cycle, when it was read
    pub content: Option<String>,
    pub summary: Option<PlanSummary>,
    pub warnings: Vec<RenderWarning>,
}

impl CycleReport {
    fn without_content(outcome: CycleOutcome) -> Self {
        CycleReport {
            outcome,
            content: None,
            summary: None,
            warnings: Vec::new(),
        }
    }
}

/// Run one update cycle against the planner at `path`.
///
/// The document is read once, the full new content is computed, and it is
/// written back in a single call only when it differs from what was read.
pub fn run_cycle(
    file: &dyn PlannerFile,
    path: &Path,
    session: &EditSession,
    clock: &dyn Clock,
    settings: &PlannerSettings,
) -> Result<CycleReport, CycleError> {
    let now = clock.now();
    if session.should_suppress_write(now) {
        return Ok(CycleReport::without_content(CycleOutcome::Suppressed));
    }

    let content = file.read(path).map_err(|source| CycleError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let rendered = match render_document(&content, settings, now.time()) {
        Ok(rendered) => rendered,
        Err(skip) => {
            return Ok(CycleReport {
                outcome: CycleOutcome::Skipped(skip),
                content: Some(content),
                summary: None,
                warnings: Vec::new(),
            });
        }
    };

    let outcome = if rendered.content == content {
        CycleOutcome::Unchanged
    } else {
        file.write(path, &rendered.content)
            .map_err(|source| CycleError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        CycleOutcome::Written
    };

    Ok(CycleReport {
        outcome,
        content: Some(rendered.content),
        summary: Some(rendered.summary),
        warnings: rendered.warnings,
    })
}

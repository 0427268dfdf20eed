use std::ops::Range;

/// A line containing this text opens the managed block
pub const START_MARKER: &str = "# Day Planner";
/// A line exactly equal to this closes the managed block
pub const END_DELIMITER: &str = "---";

/// Why no managed block could be located
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    #[error("no `# Day Planner` heading found")]
    NotFound,
    #[error("day planner heading on line {start} has no closing `---`")]
    Unterminated { start: usize },
}

/// Line range of the managed block inside a document.
///
/// `start` is the line after the heading; `end` is the index of the closing
/// delimiter, so the content is `start..end` and may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The managed content lines of `doc`
    pub fn lines<'a>(&self, doc: &'a [String]) -> &'a [String] {
        &doc[self.range()]
    }

    /// Rebuild `doc` with the managed content replaced by `content`.
    pub fn splice(&self, doc: &[String], content: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(doc.len() - self.range().len() + content.len());
        out.extend_from_slice(&doc[..self.start]);
        out.extend(content);
        out.extend_from_slice(&doc[self.end..]);
        out
    }
}

/// Find the managed block in a document.
///
/// Scans top to bottom. Every marker line moves `start` to the line after
/// it, so when the heading repeats before the delimiter the last one wins.
/// The first delimiter after a marker ends the scan.
pub fn locate(lines: &[String]) -> Result<Segment, SegmentError> {
    let mut start = None;
    for (idx, line) in lines.iter().enumerate() {
        if line.contains(START_MARKER) {
            start = Some(idx + 1);
        }
        if let Some(start) = start
            && line == END_DELIMITER
        {
            return Ok(Segment { start, end: idx });
        }
    }
    match start {
        Some(start) => Err(SegmentError::Unterminated { start }),
        None => Err(SegmentError::NotFound),
    }
}

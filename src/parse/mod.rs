pub mod plan_parser;
pub mod segment;

pub use plan_parser::{Labels, parse_line, parse_plan};
pub use segment::{Segment, SegmentError, locate};

/// Split a document into lines on `\n` only, so joining with `\n`
/// reproduces it byte for byte.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(str::to_string).collect()
}

pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_and_join_are_inverse() {
        for src in ["", "a", "a\n", "a\r\nb\n\n", "\n\n"] {
            assert_eq!(join_lines(&split_lines(src)), src);
        }
    }
}

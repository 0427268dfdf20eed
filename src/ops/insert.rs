use crate::parse::{join_lines, split_lines};

/// Lines of an empty planner block
pub const PLANNER_TEMPLATE: &[&str] = &["## Day Planner", "", "---"];

/// Insert the empty planner block before line `line` (0-indexed) of
/// `content`. Lines past the end append the block.
pub fn insert_template(content: &str, line: usize) -> String {
    if content.is_empty() {
        return join_lines(&template_lines());
    }
    let mut lines = split_lines(content);
    let at = line.min(lines.len());
    lines.splice(at..at, template_lines());
    join_lines(&lines)
}

fn template_lines() -> Vec<String> {
    PLANNER_TEMPLATE.iter().map(|l| l.to_string()).collect()
}

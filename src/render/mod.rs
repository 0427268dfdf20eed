pub mod mermaid;
pub mod plan_renderer;
pub mod progress;

pub use mermaid::gantt;
pub use plan_renderer::{RenderOutput, RenderWarning, item_line, render_plan};
pub use progress::{Progress, ProgressError};

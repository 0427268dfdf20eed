pub mod config;
pub mod plan;
pub mod summary;

pub use config::*;
pub use plan::*;
pub use summary::*;

pub mod clock;
pub mod cycle;
pub mod debounce;
pub mod insert;

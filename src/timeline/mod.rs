//! The tabular timeline artifact and its annotation pass.
pub mod annotate;
pub mod row;

pub use annotate::annotate;
pub use row::{Timeline, TimelineRow};

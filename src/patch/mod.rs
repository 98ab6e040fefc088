//! Matrix-patch construction: entries, synthetic ids, the safety razor, and
//! the timeline compiler.
pub mod compiler;
pub mod entry;
pub mod retarget;
pub mod synthetic;

pub use compiler::{Compilation, ErrorMode, PatchCompiler, WEIGHT_TOLERANCE};
pub use entry::{MatrixPatch, PatchEntry};
pub use retarget::retarget_edge;

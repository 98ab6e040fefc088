//! Date matching and interpolation-weight calculation.
pub mod matching;
pub mod weights;

pub use matching::{bracket, nearest, Bracket};
pub use weights::{weights, InterpolationMode, InterpolationWeights};

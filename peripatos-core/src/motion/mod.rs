//! Motion primitives
//!
//! Time-paced linear interpolation between poses.

pub mod interpolate;

pub use interpolate::{PoseInterpolator, PoseStep};

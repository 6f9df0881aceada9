//! Hardware abstraction traits
//!
//! These traits define the interface between the gait engine and
//! hardware-specific servo implementations.

pub mod actuator;

pub use actuator::{ActuatorError, ActuatorPort};

//! Board-agnostic gait and trajectory engine for the Peripatos quadruped
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Joint model (identity, safe limits, mirror mapping)
//! - Pose value type and time-paced pose interpolation
//! - Gait phase generator (diagonal trot)
//! - Gait sequencer state machine
//! - Actuator abstraction trait
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod gait;
pub mod joint;
pub mod motion;
pub mod pose;
pub mod traits;

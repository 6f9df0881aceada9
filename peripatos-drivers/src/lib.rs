//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in peripatos-core for the robot's hardware:
//!
//! - LX-16A serial bus servo driver
//! - Boot-time servo diagnostics

#![no_std]
#![deny(unsafe_code)]

pub mod servo;

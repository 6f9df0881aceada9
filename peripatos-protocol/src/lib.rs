//! LX-16A Serial Bus Servo Protocol
//!
//! This crate defines the half-duplex UART protocol spoken by the LX-16A
//! bus servos that drive the Peripatos quadruped's joints. One bus carries
//! all eight servos; each command addresses a single servo by id.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌────────┬────────┬────┬────────┬─────────┬────────┬──────────┐
//! │ HEADER │ HEADER │ ID │ LENGTH │ COMMAND │ PARAMS │ CHECKSUM │
//! │ 0x55   │ 0x55   │ 1B │ 1B     │ 1B      │ 0–7B   │ 1B       │
//! └────────┴────────┴────┴────────┴─────────┴────────┴──────────┘
//! ```
//!
//! LENGTH is the parameter count plus 3; CHECKSUM is the bitwise NOT of
//! the low byte of the sum of ID, LENGTH, COMMAND and all parameters.
//! Read commands are answered with a frame of the same shape carrying the
//! same command identifier.

#![no_std]
#![deny(unsafe_code)]

pub mod commands;
pub mod frame;

pub use commands::{deg_to_ticks, ticks_to_deg, ReplyError, DEG_PER_TICK, MAX_TICKS};
pub use frame::{Frame, FrameError, FrameParser, BROADCAST_ID, FRAME_HEADER, MAX_FRAME_SIZE};

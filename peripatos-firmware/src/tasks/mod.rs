//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod frame_log;
pub mod gait;

pub use frame_log::frame_log_task;
pub use gait::gait_task;

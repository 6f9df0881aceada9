//! LX-16A bus servo drivers

pub mod diagnostics;
pub mod lx16a;

pub use diagnostics::{DiagnosticsReport, JointDiagnostics, JointStatus, LED_WALK_ORDER};
pub use lx16a::{Lx16aBus, DEFAULT_REPLY_TIMEOUT};

//! Frame log task
//!
//! Drains dispatched-frame records from the gait task and emits them as
//! CSV rows over defmt. Capturing the RTT stream and stripping the log
//! prefixes yields a file the usual plotting scripts can read directly.

use defmt::*;

use crate::channels::FRAME_LOG;

#[embassy_executor::task]
pub async fn frame_log_task() {
    info!("t,id1,id2,id3,id4,id5,id6,id7,id8");

    loop {
        let rec = FRAME_LOG.receive().await;
        let a = rec.angles;
        info!(
            "{=f32},{=f32},{=f32},{=f32},{=f32},{=f32},{=f32},{=f32},{=f32}",
            rec.t_s, a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7]
        );
    }
}

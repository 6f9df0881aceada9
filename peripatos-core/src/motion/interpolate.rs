//! Time-paced linear pose interpolation
//!
//! Produces the smooth ramp between two poses: `steps + 1` frames with
//! constant pacing, each joint interpolated independently in logical space.
//! Mapping and clamping stay with the joint model at dispatch time; this
//! module knows nothing about direction reversal or hardware bounds.

use crate::pose::Pose;

/// One interpolation frame and the pacing delay to hold before the next
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoseStep {
    /// Commanded pose for this frame, logical degrees
    pub pose: Pose,
    /// Delay before the next frame, milliseconds (constant per sequence)
    pub delay_ms: u32,
}

/// Lazy, finite sequence of interpolated poses
///
/// Frame `k` of `steps` has `alpha = k / steps`; the first frame equals the
/// start pose and the last frame is the end pose emitted verbatim, so no
/// rounding drift can survive the endpoint. The iterator is pure: the same
/// arguments always reproduce the identical sequence.
#[derive(Debug, Clone)]
pub struct PoseInterpolator {
    start: Pose,
    end: Pose,
    steps: u32,
    step_delay_ms: u32,
    next_frame: u32,
}

impl PoseInterpolator {
    /// Interpolate from `start` to `end` in `steps` steps over `duration_ms`
    ///
    /// `steps` is raised to at least 1; a zero duration yields back-to-back
    /// frames with no pacing delay.
    pub fn new(start: Pose, end: Pose, steps: u32, duration_ms: u32) -> Self {
        let steps = steps.max(1);
        Self {
            start,
            end,
            steps,
            step_delay_ms: duration_ms / steps,
            next_frame: 0,
        }
    }

    /// Frames remaining in the sequence
    pub fn remaining(&self) -> u32 {
        self.steps + 1 - self.next_frame
    }

    fn pose_at(&self, frame: u32) -> Pose {
        if frame == 0 {
            return self.start;
        }
        if frame >= self.steps {
            // Emit the endpoint exactly rather than recomputing it
            return self.end;
        }
        let alpha = frame as f32 / self.steps as f32;
        let mut angles = self.start.angles();
        let end = self.end.angles();
        for (a, b) in angles.iter_mut().zip(end) {
            *a += (b - *a) * alpha;
        }
        Pose::from_angles(angles)
    }
}

impl Iterator for PoseInterpolator {
    type Item = PoseStep;

    fn next(&mut self) -> Option<PoseStep> {
        if self.next_frame > self.steps {
            return None;
        }
        let pose = self.pose_at(self.next_frame);
        self.next_frame += 1;
        Some(PoseStep {
            pose,
            delay_ms: self.step_delay_ms,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PoseInterpolator {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pose(angles: [f32; 8]) -> Pose {
        Pose::from_angles(angles)
    }

    const START: [f32; 8] = [100.0, 60.0, 100.0, 180.0, 130.0, 180.0, 100.0, 40.0];
    const END: [f32; 8] = [130.0, 75.0, 94.0, 160.0, 125.0, 200.0, 106.0, 55.0];

    #[test]
    fn test_endpoints_are_exact() {
        let frames: heapless::Vec<PoseStep, 32> =
            PoseInterpolator::new(pose(START), pose(END), 15, 300).collect();

        assert_eq!(frames.len(), 16); // steps + 1
        assert_eq!(frames[0].pose, pose(START));
        assert_eq!(frames[15].pose, pose(END));
    }

    #[test]
    fn test_constant_pacing() {
        let frames: heapless::Vec<PoseStep, 32> =
            PoseInterpolator::new(pose(START), pose(END), 15, 300).collect();
        for step in &frames {
            assert_eq!(step.delay_ms, 20); // 300 / 15
        }
    }

    #[test]
    fn test_single_step_is_start_then_end() {
        let frames: heapless::Vec<PoseStep, 4> =
            PoseInterpolator::new(pose(START), pose(END), 1, 0).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].pose, pose(START));
        assert_eq!(frames[1].pose, pose(END));
        assert_eq!(frames[0].delay_ms, 0);
    }

    #[test]
    fn test_reinvocation_reproduces_sequence() {
        let a: heapless::Vec<PoseStep, 64> =
            PoseInterpolator::new(pose(START), pose(END), 40, 1000).collect();
        let b: heapless::Vec<PoseStep, 64> =
            PoseInterpolator::new(pose(START), pose(END), 40, 1000).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_midpoint() {
        let frames: heapless::Vec<PoseStep, 4> =
            PoseInterpolator::new(pose([0.0; 8]), pose([10.0; 8]), 2, 100).collect();
        for (_, angle) in frames[1].pose.iter() {
            assert_eq!(angle, 5.0);
        }
    }

    proptest! {
        #[test]
        fn prop_per_joint_monotone(steps in 1u32..60) {
            let frames: heapless::Vec<PoseStep, 64> =
                PoseInterpolator::new(pose(START), pose(END), steps, 500).collect();

            for joint_idx in 0..8 {
                let rising = END[joint_idx] >= START[joint_idx];
                let mut prev = frames[0].pose.angles()[joint_idx];
                for step in frames.iter().skip(1) {
                    let value = step.pose.angles()[joint_idx];
                    if rising {
                        prop_assert!(value >= prev);
                    } else {
                        prop_assert!(value <= prev);
                    }
                    prev = value;
                }
            }
        }
    }
}

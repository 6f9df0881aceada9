//! Diagonal-trot phase generator
//!
//! Pure functions from a cycle-relative phase angle to the target pose for
//! that instant. Hips oscillate symmetrically around their stance angle;
//! knees flex one-sided during the swing half of the cycle only, so a knee
//! never extends past its own stance value. Identical inputs always yield
//! the identical target pose.

use micromath::F32Ext;

use crate::config::GaitConfig;
use crate::joint::{JointTable, Leg};
use crate::pose::Pose;

/// Phase angle of one leg at cycle phase `phi`, radians
///
/// Legs in group B run exactly pi behind group A - the diagonal pairing
/// that keeps the trot statically stable.
pub fn leg_phase(config: &GaitConfig, leg: Leg, phi: f32) -> f32 {
    phi + config.groups[leg].phase_offset()
}

/// Target pose for cycle phase `phi`, relative to the stance baseline
///
/// Every target angle is bounded to its joint's safe interval before it is
/// returned. Targets are always computed against the fixed stance pose,
/// never accumulated from a previous target, so error cannot compound
/// across cycles.
pub fn target_pose(phi: f32, config: &GaitConfig, stance: &Pose, table: &JointTable) -> Pose {
    let mut pose = *stance;

    for leg in Leg::ALL {
        let swing = leg_phase(config, leg, phi).sin();

        let hip = table.hip(leg);
        let hip_target =
            stance.angle(hip.id) + config.amplitude_deg * config.hip_gain[leg] * swing;

        let knee = table.knee(leg);
        let knee_target =
            stance.angle(knee.id) + config.lift_deg * config.knee_gain[leg] * swing.max(0.0);

        pose = pose
            .with_joint(hip.id, hip.clamp(hip_target))
            .with_joint(knee.id, knee.clamp(knee_target));
    }

    pose
}

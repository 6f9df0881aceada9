//! Pose value type: one logical angle per joint
//!
//! A pose is always complete - exactly one entry per known joint id - and
//! immutable once constructed. All transformations produce new poses, which
//! replaces the clone-then-mutate dictionaries of the original tuning
//! scripts with a single value type.

use crate::joint::{JointId, JOINT_COUNT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A snapshot of all eight joint angles, in degrees, logical space
///
/// Equality is structural and exact; the gait sequencer relies on this to
/// verify drift-free re-anchoring against the stance pose.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Angles indexed by `JointId::index()`
    angles: [f32; JOINT_COUNT],
}

impl Pose {
    /// Build a pose from angles in ascending joint id order (id 1 first)
    pub const fn from_angles(angles: [f32; JOINT_COUNT]) -> Self {
        Self { angles }
    }

    /// The angle commanded for one joint
    pub fn angle(&self, id: JointId) -> f32 {
        self.angles[id.index()]
    }

    /// A new pose with one joint's angle replaced
    pub fn with_joint(mut self, id: JointId, angle_deg: f32) -> Self {
        self.angles[id.index()] = angle_deg;
        self
    }

    /// Angles in ascending joint id order
    pub const fn angles(&self) -> [f32; JOINT_COUNT] {
        self.angles
    }

    /// Iterate `(id, angle)` pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (JointId, f32)> + '_ {
        JointId::ALL.iter().map(move |&id| (id, self.angle(id)))
    }
}

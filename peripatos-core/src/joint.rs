//! Joint model: identity, safe angle limits, and logical/physical mapping
//!
//! Each of the eight bus servos drives either a hip or a knee on one of
//! four legs. Left and right limbs are mounted as mirror images, so some
//! joints run "reversed": gait math uses a common logical convention and
//! the mapping into the physical command space mirrors the angle inside
//! the joint's limit interval. Which joints are reversed is configuration
//! data, not a hard-coded constant - it was tuned empirically per unit.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of joints on the robot (4 legs x hip + knee)
pub const JOINT_COUNT: usize = 8;

/// Default hardware-safe angle limits in degrees
pub const DEFAULT_MIN_DEG: f32 = 40.0;
pub const DEFAULT_MAX_DEG: f32 = 200.0;

/// Leg identifier, named by corner (right-front, right-rear, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Leg {
    /// Right front
    Rf,
    /// Right rear
    Rr,
    /// Left rear
    Lr,
    /// Left front
    Lf,
}

impl Leg {
    /// All legs, in bus wiring order
    pub const ALL: [Leg; 4] = [Leg::Rf, Leg::Rr, Leg::Lr, Leg::Lf];

    /// Index for leg-keyed arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Check if this leg is on the left side of the body
    pub const fn is_left(self) -> bool {
        matches!(self, Leg::Lr | Leg::Lf)
    }
}

/// Role of a joint within its leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointRole {
    /// Fore/aft swing joint
    Hip,
    /// Lift/flex joint
    Knee,
}

/// Validated bus id of a joint (1..=8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointId(u8);

impl JointId {
    /// Lowest valid bus id
    pub const MIN: u8 = 1;
    /// Highest valid bus id
    pub const MAX: u8 = JOINT_COUNT as u8;

    /// All joint ids in ascending order - also the per-frame dispatch order
    pub const ALL: [JointId; JOINT_COUNT] = [
        JointId(1),
        JointId(2),
        JointId(3),
        JointId(4),
        JointId(5),
        JointId(6),
        JointId(7),
        JointId(8),
    ];

    /// Create a joint id, checking the valid range
    pub const fn new(raw: u8) -> Option<Self> {
        if raw >= Self::MIN && raw <= Self::MAX {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// The raw bus id
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Index for id-keyed arrays
    pub(crate) const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for JointId {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(ConfigError::UnknownJoint(raw))
    }
}

/// Errors in the joint table or gait configuration
///
/// These are programming/configuration contract violations detected before
/// a run starts, never runtime hardware faults.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Referenced joint id is not in the table
    UnknownJoint(u8),
    /// Two table entries share the same bus id
    DuplicateJoint(JointId),
    /// No table entry for this leg/role pair
    MissingJoint { leg: Leg, role: JointRole },
    /// Angle limits violate `min < max`
    InvalidLimits { joint: JointId, min_deg: f32, max_deg: f32 },
    /// A gait group has no legs assigned
    EmptyGaitGroup,
    /// `frames_per_cycle` must be non-zero
    ZeroFramesPerCycle,
    /// `substeps_per_frame` must be non-zero
    ZeroSubsteps,
    /// Settle interpolation needs at least one step
    ZeroSettleSteps,
    /// Knee lift must not pull the knee past its stance value
    NegativeLift,
}

/// Static per-joint configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointConfig {
    /// Bus id
    pub id: JointId,
    /// Leg this joint belongs to
    pub leg: Leg,
    /// Hip or knee
    pub role: JointRole,
    /// Mechanically mirrored mounting: command space runs backwards
    pub reversed: bool,
    /// Hardware-safe minimum angle (degrees, physical space)
    pub min_deg: f32,
    /// Hardware-safe maximum angle (degrees, physical space)
    pub max_deg: f32,
}

impl JointConfig {
    /// Map a logical angle into the physical command space
    ///
    /// For a reversed joint this mirrors the angle inside the limit
    /// interval: `(min + max) - angle`. The transform is its own inverse,
    /// so applying it twice returns the original value.
    pub fn logical_to_physical(&self, angle_deg: f32) -> f32 {
        if self.reversed {
            (self.min_deg + self.max_deg) - angle_deg
        } else {
            angle_deg
        }
    }

    /// Map a physical angle back into the logical convention
    ///
    /// Identical to [`Self::logical_to_physical`] - the mirror transform
    /// is an involution on the same bounds.
    pub fn physical_to_logical(&self, angle_deg: f32) -> f32 {
        self.logical_to_physical(angle_deg)
    }

    /// Bound an angle to the hardware-safe interval
    ///
    /// Applied in physical space immediately before dispatch. Out-of-range
    /// commands are never an error; a bounded motion is always preferred
    /// over refusing to move.
    pub fn clamp(&self, angle_deg: f32) -> f32 {
        angle_deg.clamp(self.min_deg, self.max_deg)
    }
}

/// The robot's standard wiring: bus ids grouped in leg pairs, the reversal
/// set as calibrated on the physical unit.
const STANDARD_JOINTS: [JointConfig; JOINT_COUNT] = {
    const fn joint(id: u8, leg: Leg, role: JointRole, reversed: bool) -> JointConfig {
        JointConfig {
            id: JointId(id),
            leg,
            role,
            reversed,
            min_deg: DEFAULT_MIN_DEG,
            max_deg: DEFAULT_MAX_DEG,
        }
    }
    [
        joint(1, Leg::Rf, JointRole::Hip, true),
        joint(2, Leg::Rf, JointRole::Knee, true),
        joint(3, Leg::Rr, JointRole::Hip, false),
        joint(4, Leg::Rr, JointRole::Knee, false),
        joint(5, Leg::Lr, JointRole::Hip, false),
        joint(6, Leg::Lr, JointRole::Knee, false),
        joint(7, Leg::Lf, JointRole::Hip, false),
        joint(8, Leg::Lf, JointRole::Knee, true),
    ]
};

/// Validated table of all eight joints
///
/// Owns the static limit/reversal data. All mapping and clamping functions
/// are pure lookups over this table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointTable {
    /// Entries indexed by `JointId::index()`
    joints: [JointConfig; JOINT_COUNT],
}

impl Default for JointTable {
    fn default() -> Self {
        // The standard wiring is complete and unique by construction.
        match Self::new(STANDARD_JOINTS) {
            Ok(table) => table,
            Err(_) => unreachable!(),
        }
    }
}

impl JointTable {
    /// Build and validate a joint table
    ///
    /// Checks that every bus id appears exactly once, every leg has both a
    /// hip and a knee, and every limit interval satisfies `min < max`.
    pub fn new(joints: [JointConfig; JOINT_COUNT]) -> Result<Self, ConfigError> {
        let mut slots: [Option<JointConfig>; JOINT_COUNT] = [None; JOINT_COUNT];

        for joint in joints {
            if joint.min_deg >= joint.max_deg {
                return Err(ConfigError::InvalidLimits {
                    joint: joint.id,
                    min_deg: joint.min_deg,
                    max_deg: joint.max_deg,
                });
            }
            let slot = &mut slots[joint.id.index()];
            if slot.is_some() {
                return Err(ConfigError::DuplicateJoint(joint.id));
            }
            *slot = Some(joint);
        }

        // 8 unique ids in 8 slots means every slot is filled
        let mut table = [STANDARD_JOINTS[0]; JOINT_COUNT];
        for (i, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(joint) => table[i] = joint,
                None => return Err(ConfigError::UnknownJoint(i as u8 + 1)),
            }
        }

        let result = Self { joints: table };
        for leg in Leg::ALL {
            for role in [JointRole::Hip, JointRole::Knee] {
                if result.find(leg, role).is_none() {
                    return Err(ConfigError::MissingJoint { leg, role });
                }
            }
        }
        Ok(result)
    }

    fn find(&self, leg: Leg, role: JointRole) -> Option<&JointConfig> {
        self.joints.iter().find(|j| j.leg == leg && j.role == role)
    }

    /// Look up a joint by bus id
    pub fn joint(&self, id: JointId) -> &JointConfig {
        &self.joints[id.index()]
    }

    /// Look up a joint by a raw (unvalidated) bus id
    pub fn joint_by_raw_id(&self, raw: u8) -> Result<&JointConfig, ConfigError> {
        let id = JointId::try_from(raw)?;
        Ok(self.joint(id))
    }

    /// The hip joint of a leg
    pub fn hip(&self, leg: Leg) -> &JointConfig {
        // Validation guarantees presence
        match self.find(leg, JointRole::Hip) {
            Some(joint) => joint,
            None => unreachable!(),
        }
    }

    /// The knee joint of a leg
    pub fn knee(&self, leg: Leg) -> &JointConfig {
        match self.find(leg, JointRole::Knee) {
            Some(joint) => joint,
            None => unreachable!(),
        }
    }

    /// Iterate joints in ascending id order (the dispatch order)
    pub fn iter(&self) -> impl Iterator<Item = &JointConfig> {
        self.joints.iter()
    }
}

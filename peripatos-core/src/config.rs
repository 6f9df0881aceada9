//! Gait and stance configuration
//!
//! All tuning that the original field scripts kept in module-level globals
//! lives here as immutable value types handed to the engine at construction.
//! Defaults carry the constants calibrated on the physical unit.

use core::f32::consts::PI;
use core::ops::Index;

use crate::joint::{ConfigError, JointTable, Leg};
use crate::pose::Pose;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-leg value table (gains, group assignment, ...)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegMap<T> {
    /// Values indexed by `Leg::index()`
    values: [T; 4],
}

impl<T: Copy> LegMap<T> {
    /// Same value for every leg
    pub const fn uniform(value: T) -> Self {
        Self { values: [value; 4] }
    }

    /// Values in `Leg::ALL` order (RF, RR, LR, LF)
    pub const fn new(values: [T; 4]) -> Self {
        Self { values }
    }

    /// A new map with one leg's value replaced
    pub fn with(mut self, leg: Leg, value: T) -> Self {
        self.values[leg.index()] = value;
        self
    }
}

impl<T> Index<Leg> for LegMap<T> {
    type Output = T;

    fn index(&self, leg: Leg) -> &T {
        &self.values[leg.index()]
    }
}

/// Diagonal trot group
///
/// Group B runs exactly half a cycle behind group A. The opposite-phase
/// pairing is what keeps two feet on the ground in a four-legged trot, so
/// the offset is a fixed constant rather than configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GaitGroup {
    A,
    B,
}

impl GaitGroup {
    /// Phase offset applied to legs in this group, in radians
    pub const fn phase_offset(self) -> f32 {
        match self {
            GaitGroup::A => 0.0,
            GaitGroup::B => PI,
        }
    }
}

/// Interpolation used to settle into or out of the stance pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SettleConfig {
    /// Total settle time in milliseconds
    pub duration_ms: u32,
    /// Number of interpolation steps
    pub steps: u32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            steps: 40,
        }
    }
}

/// Gait tuning parameters for one walking run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaitConfig {
    /// Hip swing amplitude in degrees; the sign selects the walking
    /// direction (determined empirically per unit)
    pub amplitude_deg: f32,
    /// Extra knee flex during the swing half of the cycle, degrees (>= 0)
    pub lift_deg: f32,
    /// Per-leg hip amplitude multipliers (balance trim)
    pub hip_gain: LegMap<f32>,
    /// Per-leg knee lift multipliers
    pub knee_gain: LegMap<f32>,
    /// Nominal time budget of one gait frame, milliseconds
    pub frame_interval_ms: u32,
    /// Gait frames per full cycle
    pub frames_per_cycle: u32,
    /// Complete cycles to walk before re-anchoring and finishing
    pub cycles: u32,
    /// Interpolation sub-steps from the current pose toward each frame
    /// target; the nested interpolation is what keeps motion smooth
    pub substeps_per_frame: u32,
    /// Leg-to-group assignment; must leave neither group empty
    pub groups: LegMap<GaitGroup>,
    /// Interpolation into stance (approach) and back out (return)
    pub settle: SettleConfig,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            amplitude_deg: 18.0,
            lift_deg: 20.0,
            // The left-front hip ran weak on the prototype; the gain trim
            // compensates without touching the shared amplitude
            hip_gain: LegMap::uniform(1.0).with(Leg::Lf, 1.5),
            knee_gain: LegMap::uniform(1.0),
            frame_interval_ms: 30,
            frames_per_cycle: 25,
            cycles: 3,
            substeps_per_frame: 1,
            groups: LegMap::new([GaitGroup::B, GaitGroup::A, GaitGroup::B, GaitGroup::A]),
            settle: SettleConfig::default(),
        }
    }
}

impl GaitConfig {
    /// Validate the configuration before a run
    ///
    /// Malformed configuration is always fatal to starting a run; nothing
    /// here is recoverable at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frames_per_cycle == 0 {
            return Err(ConfigError::ZeroFramesPerCycle);
        }
        if self.substeps_per_frame == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        if self.settle.steps == 0 {
            return Err(ConfigError::ZeroSettleSteps);
        }
        if self.lift_deg < 0.0 {
            return Err(ConfigError::NegativeLift);
        }
        let mut group_a = 0;
        let mut group_b = 0;
        for leg in Leg::ALL {
            match self.groups[leg] {
                GaitGroup::A => group_a += 1,
                GaitGroup::B => group_b += 1,
            }
        }
        if group_a == 0 || group_b == 0 {
            return Err(ConfigError::EmptyGaitGroup);
        }
        Ok(())
    }

    /// Total gait frames in a full run
    pub fn total_frames(&self) -> u32 {
        self.cycles * self.frames_per_cycle
    }

    /// Cycle-relative phase angle for a frame index, radians
    pub fn phase_at(&self, frame: u32) -> f32 {
        2.0 * PI * (frame % self.frames_per_cycle) as f32 / self.frames_per_cycle as f32
    }
}

/// Stance pose configuration
///
/// The base pose is the symmetric standing table; `roll_adjust_deg` is the
/// lateral trim that levels the body when one side sags: left legs get
/// hip - adj / knee + adj (longer), right legs the opposite (shorter).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StanceConfig {
    /// Symmetric base stance, logical degrees
    pub base: Pose,
    /// Lateral trim in degrees; positive leans the body to the right
    /// (3-5 worked on the prototype)
    pub roll_adjust_deg: f32,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            base: Pose::from_angles([130.0, 60.0, 100.0, 180.0, 130.0, 180.0, 100.0, 40.0]),
            roll_adjust_deg: 0.0,
        }
    }
}

impl StanceConfig {
    /// The stance pose actually used for homing and re-anchoring
    pub fn build(&self, table: &JointTable) -> Pose {
        let adj = self.roll_adjust_deg;
        let mut pose = self.base;
        for leg in Leg::ALL {
            let (hip_adj, knee_adj) = if leg.is_left() {
                (-adj, adj)
            } else {
                (adj, -adj)
            };
            let hip = table.hip(leg).id;
            let knee = table.knee(leg).id;
            pose = pose
                .with_joint(hip, pose.angle(hip) + hip_adj)
                .with_joint(knee, pose.angle(knee) + knee_adj);
        }
        pose
    }
}

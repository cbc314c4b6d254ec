//! Vehicle profiles — immutable kinematic bounds.

use serde::{Deserialize, Serialize};

use ts_core::ElementKind;

use crate::{NetError, NetResult};

/// Kinematic limits shared by value with every agent spawned from it.
///
/// Fields are private so a profile can only exist in a validated state;
/// deserialization goes through the same checks as [`Vehicle::new`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VehicleFields", into = "VehicleFields")]
pub struct Vehicle {
    min_acceleration: f64,
    max_acceleration: f64,
    min_velocity:     f64,
    max_velocity:     f64,
    length:           f64,
}

/// Unchecked wire form of [`Vehicle`].
#[derive(Serialize, Deserialize)]
struct VehicleFields {
    min_acceleration: f64,
    max_acceleration: f64,
    #[serde(default)]
    min_velocity:     f64,
    max_velocity:     f64,
    length:           f64,
}

impl Vehicle {
    /// Accelerations in m/s², velocities in m/s, length in metres.
    ///
    /// A `min_velocity` of zero means the vehicle never reverses.
    pub fn new(
        min_acceleration: f64,
        max_acceleration: f64,
        min_velocity:     f64,
        max_velocity:     f64,
        length:           f64,
    ) -> NetResult<Self> {
        let all_finite = [min_acceleration, max_acceleration, min_velocity, max_velocity, length]
            .iter()
            .all(|v| v.is_finite());
        let reason = if !all_finite {
            Some("non-finite bound")
        } else if min_acceleration > max_acceleration {
            Some("min acceleration exceeds max acceleration")
        } else if min_velocity > max_velocity {
            Some("min velocity exceeds max velocity")
        } else if length <= 0.0 {
            Some("length must be positive")
        } else {
            None
        };
        match reason {
            Some(r) => Err(NetError::construction(ElementKind::Agent, format!("vehicle profile: {r}"))),
            None => Ok(Self { min_acceleration, max_acceleration, min_velocity, max_velocity, length }),
        }
    }

    #[inline]
    pub fn min_acceleration(&self) -> f64 {
        self.min_acceleration
    }

    #[inline]
    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    #[inline]
    pub fn min_velocity(&self) -> f64 {
        self.min_velocity
    }

    #[inline]
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Clamp `v` into `[min_velocity, max_velocity]`.
    #[inline]
    pub fn clamp_velocity(&self, v: f64) -> f64 {
        v.clamp(self.min_velocity, self.max_velocity)
    }

    /// Clamp `a` into `[min_acceleration, max_acceleration]`.
    #[inline]
    pub fn clamp_acceleration(&self, a: f64) -> f64 {
        a.clamp(self.min_acceleration, self.max_acceleration)
    }
}

impl Default for Vehicle {
    /// A passenger car: 2.6 m/s² up, 4.5 m/s² braking, 33.3 m/s top speed.
    fn default() -> Self {
        Self {
            min_acceleration: -4.5,
            max_acceleration: 2.6,
            min_velocity:     0.0,
            max_velocity:     33.3,
            length:           5.0,
        }
    }
}

impl TryFrom<VehicleFields> for Vehicle {
    type Error = NetError;

    fn try_from(f: VehicleFields) -> NetResult<Self> {
        Vehicle::new(f.min_acceleration, f.max_acceleration, f.min_velocity, f.max_velocity, f.length)
    }
}

impl From<Vehicle> for VehicleFields {
    fn from(v: Vehicle) -> Self {
        Self {
            min_acceleration: v.min_acceleration,
            max_acceleration: v.max_acceleration,
            min_velocity:     v.min_velocity,
            max_velocity:     v.max_velocity,
            length:           v.length,
        }
    }
}

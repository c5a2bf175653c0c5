//! Inverse strapdown mechanization toolbox
//!
//! This crate provides the tools for recovering the body-frame kinematics (specific force and angular rate) that
//! a moving body must have experienced to go from one known navigation state to the next. It is the inverse of the
//! usual strapdown mechanization: rather than integrating IMU readings into position, velocity, and attitude, the
//! estimators here take two full navigation states separated by a time interval and return the accelerometer and
//! gyroscope readings that would have produced that state transition. The typical use is generating synthetic
//! "truth" IMU data from a known trajectory for testing navigation filters and sensor fusion algorithms.
//!
//! This crate is primarily built off of three additional dependencies:
//! - [`nalgebra`](https://crates.io/crates/nalgebra): Provides the linear algebra tools (3x3 direction cosine matrices and vectors).
//! - [`nav-types`](https://crates.io/crates/nav-types): Provides geodetic and Cartesian point types and conversions.
//! - [`uom`](https://crates.io/crates/uom): Provides unit-safe quantities for the unit-aware entry points.
//!
//! The primary reference text is _Principles of GNSS, Inertial, and Multisensor Integrated Navigation Systems, 2nd
//! Edition_ by Paul D. Groves. Where applicable, calculations will be referenced by the appropriate equation number
//! tied to the book. In general, variables will be named according to the quantity they represent and not the symbol
//! used in the book.
//!
//! ## Crate overview
//!
//! - [earth]: Earth model constants, frame rotations, gravity and gravitation models.
//! - [frames]: Tagged attitude transforms, navigation state snapshots for each reference frame and conversions between them.
//! - [units]: Time interval and unit-wrapped quantity adapters.
//! - [inversion]: The shared inversion algorithm and the [inversion::KinematicsEstimator] trait.
//! - [ecef], [eci], [ned]: The frame-specific estimators.
//! - [sim]: Trajectory records and batch generation of synthetic IMU readings.
//!
//! ## Inverse mechanization
//!
//! Given the attitude $C_b^\gamma$ of the body with respect to a reference frame $\gamma$ at two epochs separated by
//! $\tau$, the rotation of the body with respect to inertial space over the interval is
//!
//! $$
//! C_{old}^{new} = C_b^\gamma(+)^T \\, C_\gamma \\, C_b^\gamma(-)
//! $$
//!
//! where $C_\gamma$ compensates for the rotation of the reference frame itself (identity for ECI, the Earth rotation
//! for ECEF, the Earth rotation plus transport rate for NED). The rotation vector $\alpha_{ib}^b$ is extracted from the
//! antisymmetric part of $C_{old}^{new}$ and the angular rate is $\omega_{ib}^b = \alpha_{ib}^b / \tau$. The specific
//! force is the finite-difference velocity derivative corrected by gravity and the rotating-frame terms, resolved into
//! body axes through the attitude averaged over the interval (Groves, eq. 5.84 - 5.86).
pub mod earth;
pub mod ecef;
pub mod eci;
pub mod frames;
pub mod inversion;
pub mod ned;
pub mod sim;
pub mod units;

use nalgebra::Vector3;
use std::convert::TryFrom;
use std::fmt::{self, Display};
use thiserror::Error;

pub use ecef::ECEFKinematicsEstimator;
pub use eci::ECIKinematicsEstimator;
pub use frames::{ECEFFrame, ECIFrame, FrameTransform, FrameType, NEDFrame};
pub use inversion::KinematicsEstimator;
pub use ned::NEDKinematicsEstimator;
pub use units::TimeInterval;

/// Errors produced while estimating kinematics or building navigation states.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum KinematicsError {
    /// The time interval between the two navigation states was negative or not a number
    #[error("time interval must be a non-negative number of seconds, got {0}")]
    InvalidTimeInterval(f64),
    /// An attitude transform was tagged with the wrong source or destination frame
    #[error("expected a {expected:?} -> {expected_destination:?} transform, got {found:?} -> {found_destination:?}")]
    InvalidFrameTransform {
        expected: FrameType,
        expected_destination: FrameType,
        found: FrameType,
        found_destination: FrameType,
    },
    /// Geodetic latitude outside of [-90, 90] degrees
    #[error("latitude must be within [-pi/2, pi/2] radians, got {0}")]
    InvalidLatitude(f64),
    /// Longitude that is not a finite number of radians
    #[error("longitude must be a finite number of radians, got {0}")]
    InvalidLongitude(f64),
    /// The attitude averaged over the interval could not be inverted
    #[error("averaged attitude matrix is singular")]
    SingularMatrix,
}

/// Body-frame kinematics: the readings an ideal IMU would report over an interval.
///
/// This is the output of every estimator in the crate. Both vectors are resolved along the body axes. The specific
/// force is the non-gravitational acceleration of the body with respect to inertial space and the angular rate is the
/// rotation rate of the body with respect to inertial space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyKinematics {
    /// Specific force in m/s^2, body frame x, y, z axis
    pub specific_force: Vector3<f64>,
    /// Angular rate in rad/s, body frame x, y, z axis
    pub angular_rate: Vector3<f64>,
}
impl Display for BodyKinematics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BodyKinematics {{ specific_force: [{:.4}, {:.4}, {:.4}], angular_rate: [{:.6}, {:.6}, {:.6}] }}",
            self.specific_force[0],
            self.specific_force[1],
            self.specific_force[2],
            self.angular_rate[0],
            self.angular_rate[1],
            self.angular_rate[2]
        )
    }
}
impl BodyKinematics {
    /// Create a new BodyKinematics from specific force (m/s^2) and angular rate (rad/s) vectors
    pub fn new(specific_force: Vector3<f64>, angular_rate: Vector3<f64>) -> BodyKinematics {
        BodyKinematics {
            specific_force,
            angular_rate,
        }
    }
    /// Magnitude of the specific force in m/s^2
    pub fn specific_force_norm(&self) -> f64 {
        self.specific_force.norm()
    }
    /// Magnitude of the angular rate in rad/s
    pub fn angular_rate_norm(&self) -> f64 {
        self.angular_rate.norm()
    }
    /// Specific force as unit-aware accelerations
    pub fn specific_force_with_units(&self) -> [units::Acceleration; 3] {
        units::vector_to_acceleration(&self.specific_force)
    }
    /// Angular rate as unit-aware angular velocities
    pub fn angular_rate_with_units(&self) -> [units::AngularVelocity; 3] {
        units::vector_to_angular_velocity(&self.angular_rate)
    }
}
impl From<BodyKinematics> for Vec<f64> {
    /// Converts a BodyKinematics to a Vec<f64> of length 6 (3 for specific force, 3 for angular rate).
    fn from(data: BodyKinematics) -> Self {
        data.specific_force
            .iter()
            .chain(data.angular_rate.iter())
            .cloned()
            .collect()
    }
}
impl TryFrom<&[f64]> for BodyKinematics {
    type Error = &'static str;
    /// Attempts to create a BodyKinematics from a slice of 6 elements (specific force then angular rate).
    fn try_from(slice: &[f64]) -> Result<Self, Self::Error> {
        if slice.len() != 6 {
            return Err("Slice must have length 6 for BodyKinematics");
        }
        Ok(BodyKinematics {
            specific_force: Vector3::new(slice[0], slice[1], slice[2]),
            angular_rate: Vector3::new(slice[3], slice[4], slice[5]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_body_kinematics_default() {
        let kinematics = BodyKinematics::default();
        assert_eq!(kinematics.specific_force, Vector3::zeros());
        assert_eq!(kinematics.angular_rate, Vector3::zeros());
    }
    #[test]
    fn test_body_kinematics_norms() {
        let kinematics =
            BodyKinematics::new(Vector3::new(3.0, 4.0, 0.0), Vector3::new(0.0, 0.0, -2.0));
        assert_approx_eq!(kinematics.specific_force_norm(), 5.0);
        assert_approx_eq!(kinematics.angular_rate_norm(), 2.0);
    }
    #[test]
    fn test_body_kinematics_vec_conversions() {
        let kinematics =
            BodyKinematics::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
        let values: Vec<f64> = kinematics.into();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let back = BodyKinematics::try_from(values.as_slice()).unwrap();
        assert_eq!(back, kinematics);
        assert!(BodyKinematics::try_from(&values[..5]).is_err());
    }
    #[test]
    fn test_body_kinematics_display() {
        let kinematics =
            BodyKinematics::new(Vector3::new(0.0, 0.0, -9.81), Vector3::new(0.0, 0.0, 0.0));
        let text = format!("{}", kinematics);
        assert!(text.starts_with("BodyKinematics"));
        assert!(text.contains("-9.8100"));
    }
    #[test]
    fn test_error_messages() {
        let err = KinematicsError::InvalidTimeInterval(-1.0);
        assert!(err.to_string().contains("-1"));
        let err = KinematicsError::InvalidFrameTransform {
            expected: FrameType::Body,
            expected_destination: FrameType::ECEF,
            found: FrameType::Body,
            found_destination: FrameType::Body,
        };
        assert!(err.to_string().contains("ECEF"));
    }
}

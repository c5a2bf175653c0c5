//! Kinematics estimation in the Earth-centered Earth-fixed frame
//!
//! The ECEF frame rotates with the Earth, so the attitude change between two epochs contains the Earth's rotation
//! over the interval as well as the body's own rotation. The estimator inserts the ECI to ECEF rotation for the
//! interval between the two attitudes so that the extracted rate is the body rate with respect to inertial space.
//! The specific force is the finite-difference acceleration corrected by gravity (gravitation plus centrifugal) and
//! the Coriolis term (Groves, section 5.2 and eq. 5.36).
//!
//! $$
//! f_{ib}^e = \frac{v_{eb}^e(+) - v_{eb}^e(-)}{\tau} - g_b^e(r_{eb}^e(+)) + 2 \Omega_{ie}^e v_{eb}^e(-)
//! $$
//!
//! Every entry point funnels into [`ECEFKinematicsEstimator::estimate`] and returns bit-identical results for the
//! same inputs.
use crate::earth;
use crate::frames::{self, ECEFFrame, FrameTransform, FrameType, NEDFrame};
use crate::inversion::{KinematicsEstimator, ReferenceMotion, invert_mechanization};
use crate::units::{self, Length, TimeInterval, Velocity};
use crate::{BodyKinematics, KinematicsError};

use nalgebra::Vector3;
use nav_types::ECEF;

/// Body kinematics from two navigation states resolved in the ECEF frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ECEFKinematicsEstimator;

impl ECEFKinematicsEstimator {
    /// Estimate the body kinematics between two ECEF navigation states.
    ///
    /// # Parameters
    /// - `time_interval` - Seconds between the old and new states, must be non-negative
    /// - `attitude` - Body to ECEF attitude at the new epoch
    /// - `old_attitude` - Body to ECEF attitude at the old epoch
    /// - `velocity` - ECEF velocity at the new epoch, m/s
    /// - `old_velocity` - ECEF velocity at the old epoch, m/s
    /// - `position` - ECEF position at the new epoch, meters
    ///
    /// # Returns
    /// The specific force and angular rate resolved in body axes. A zero interval returns zeros.
    ///
    /// # Errors
    /// [`KinematicsError::InvalidTimeInterval`] for a negative or non-finite interval,
    /// [`KinematicsError::InvalidFrameTransform`] unless both attitudes are Body -> ECEF, and
    /// [`KinematicsError::SingularMatrix`] if the averaged attitude can't be inverted.
    ///
    /// # Example
    /// ```rust
    /// use nalgebra::Vector3;
    /// use kinematics::{ECEFKinematicsEstimator, FrameTransform, FrameType, earth};
    /// let attitude = FrameTransform::identity(FrameType::Body, FrameType::ECEF);
    /// let position = Vector3::new(earth::EQUATORIAL_RADIUS, 0.0, 0.0);
    /// let result = ECEFKinematicsEstimator::estimate(
    ///     1.0, &attitude, &attitude, &Vector3::zeros(), &Vector3::zeros(), &position,
    /// ).unwrap();
    /// assert!((result.angular_rate_norm() - earth::RATE).abs() < 1e-12);
    /// ```
    pub fn estimate(
        time_interval: f64,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        position: &Vector3<f64>,
    ) -> Result<BodyKinematics, KinematicsError> {
        invert_mechanization(
            FrameType::ECEF,
            time_interval,
            attitude,
            old_attitude,
            |dt| {
                let omega_ie = earth::vector_to_skew_symmetric(&earth::RATE_VECTOR);
                let specific_force = (velocity - old_velocity) / dt - earth::gravity_ecef(position)
                    + 2.0 * omega_ie * old_velocity;
                ReferenceMotion {
                    specific_force,
                    frame_rotation: earth::eci_to_ecef(dt),
                    frame_rotation_angle: earth::RATE_VECTOR * dt,
                }
            },
        )
    }
    /// Same as [`estimate`](Self::estimate), writing into `result`. `result` is untouched on error.
    pub fn estimate_into(
        time_interval: f64,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        position: &Vector3<f64>,
        result: &mut BodyKinematics,
    ) -> Result<(), KinematicsError> {
        *result = Self::estimate(
            time_interval,
            attitude,
            old_attitude,
            velocity,
            old_velocity,
            position,
        )?;
        Ok(())
    }
    /// Unit-aware form of [`estimate`](Self::estimate)
    pub fn estimate_with_units<T: Into<TimeInterval>>(
        time_interval: T,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &[Velocity; 3],
        old_velocity: &[Velocity; 3],
        position: &[Length; 3],
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate(
            time_interval.into().seconds(),
            attitude,
            old_attitude,
            &units::velocity_to_vector(velocity),
            &units::velocity_to_vector(old_velocity),
            &units::length_to_vector(position),
        )
    }
    /// Form of [`estimate`](Self::estimate) taking the new position as a nav-types point
    pub fn estimate_at_point<T: Into<TimeInterval>>(
        time_interval: T,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        position: &ECEF<f64>,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate(
            time_interval.into().seconds(),
            attitude,
            old_attitude,
            velocity,
            old_velocity,
            &Vector3::new(position.x(), position.y(), position.z()),
        )
    }
    /// Estimate from two full navigation states. Only the new position is used.
    pub fn estimate_from_frames<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &ECEFFrame,
        old_frame: &ECEFFrame,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate(
            time_interval.into().seconds(),
            &frame.attitude,
            &old_frame.attitude,
            &frame.velocity,
            &old_frame.velocity,
            &frame.position,
        )
    }
    pub fn estimate_from_frames_into<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &ECEFFrame,
        old_frame: &ECEFFrame,
        result: &mut BodyKinematics,
    ) -> Result<(), KinematicsError> {
        *result = Self::estimate_from_frames(time_interval, frame, old_frame)?;
        Ok(())
    }
}

impl KinematicsEstimator for ECEFKinematicsEstimator {
    type Frame = ECEFFrame;
    const FRAME: FrameType = FrameType::ECEF;
    fn estimate_frames<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &ECEFFrame,
        old_frame: &ECEFFrame,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate_from_frames(time_interval, frame, old_frame)
    }
    fn express(ned: &NEDFrame, _time: f64) -> Result<ECEFFrame, KinematicsError> {
        frames::ned_to_ecef(ned)
    }
}

//! Kinematics estimation in the Earth-centered inertial frame
//!
//! The inertial frame does not rotate, so the attitude change between the two epochs is entirely the body's own
//! rotation and no frame rate correction is needed. The specific force is the finite-difference acceleration minus
//! the J2 gravitation (Groves, eq. 5.18).
use crate::earth;
use crate::frames::{self, ECIFrame, FrameTransform, FrameType, NEDFrame};
use crate::inversion::{KinematicsEstimator, ReferenceMotion, invert_mechanization};
use crate::units::{self, Length, TimeInterval, Velocity};
use crate::{BodyKinematics, KinematicsError};

use nalgebra::{Matrix3, Point3, Vector3};

/// Body kinematics from two navigation states resolved in the ECI frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ECIKinematicsEstimator;

impl ECIKinematicsEstimator {
    /// Estimate the body kinematics between two ECI navigation states.
    ///
    /// Arguments mirror [`ECEFKinematicsEstimator::estimate`](crate::ECEFKinematicsEstimator::estimate) with every
    /// quantity resolved in ECI axes and the velocities taken with respect to inertial space.
    pub fn estimate(
        time_interval: f64,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        position: &Vector3<f64>,
    ) -> Result<BodyKinematics, KinematicsError> {
        invert_mechanization(
            FrameType::ECI,
            time_interval,
            attitude,
            old_attitude,
            |dt| ReferenceMotion {
                specific_force: (velocity - old_velocity) / dt - earth::gravitation_eci(position),
                frame_rotation: Matrix3::identity(),
                frame_rotation_angle: Vector3::zeros(),
            },
        )
    }
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
    /// Form of [`estimate`](Self::estimate) taking the position as an ECI point in meters
    pub fn estimate_at_point<T: Into<TimeInterval>>(
        time_interval: T,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        position: &Point3<f64>,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate(
            time_interval.into().seconds(),
            attitude,
            old_attitude,
            velocity,
            old_velocity,
            &position.coords,
        )
    }
    pub fn estimate_from_frames<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &ECIFrame,
        old_frame: &ECIFrame,
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
        frame: &ECIFrame,
        old_frame: &ECIFrame,
        result: &mut BodyKinematics,
    ) -> Result<(), KinematicsError> {
        *result = Self::estimate_from_frames(time_interval, frame, old_frame)?;
        Ok(())
    }
}

impl KinematicsEstimator for ECIKinematicsEstimator {
    type Frame = ECIFrame;
    const FRAME: FrameType = FrameType::ECI;
    fn estimate_frames<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &ECIFrame,
        old_frame: &ECIFrame,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate_from_frames(time_interval, frame, old_frame)
    }
    fn express(ned: &NEDFrame, time: f64) -> Result<ECIFrame, KinematicsError> {
        frames::ecef_to_eci(time, &frames::ned_to_ecef(ned)?)
    }
}

//! Shared inverse mechanization
//!
//! All three estimators solve the same problem: given the attitude of the body at the start and end of an interval,
//! and the motion of the reference frame itself over that interval, find the body rate and specific force. The only
//! things that change between frames are the required attitude tags, the matrix that compensates for the rotation of
//! the reference frame, the specific force resolved in the reference frame, and the frame rotation angle used to
//! correct the averaged attitude. Those are bundled into a [`ReferenceMotion`] by each estimator and handed to
//! [`invert_mechanization`].
//!
//! The rotation vector extraction and attitude averaging follow Groves, section 5.5.
use crate::earth::{skew_symmetric_to_vector, vector_to_skew_symmetric};
use crate::frames::{FrameTransform, FrameType, NEDFrame};
use crate::units::TimeInterval;
use crate::{BodyKinematics, KinematicsError};

use nalgebra::{Matrix3, Vector3};

/// Rotation angle (rad) above which the rotation vector is rescaled by theta / sin(theta)
pub const SCALING_THRESHOLD: f64 = 2e-5;
/// Rotation vector magnitude (rad) above which the full attitude averaging is applied
pub const ALPHA_THRESHOLD: f64 = 1e-8;

/// Common interface for the frame-specific estimators.
///
/// Lets batch processing be written once for any reference frame. The estimators are stateless, so every
/// method is an associated function.
pub trait KinematicsEstimator {
    /// Navigation state type the estimator consumes
    type Frame: Send + Sync;
    /// Reference frame the body attitude must be resolved in
    const FRAME: FrameType;
    /// Estimate the body kinematics between `old_frame` and `frame`, `time_interval` seconds apart
    fn estimate_frames<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &Self::Frame,
        old_frame: &Self::Frame,
    ) -> Result<BodyKinematics, KinematicsError>;
    /// Express a local-level state in this estimator's frame, `time` seconds after ECI and ECEF coincided
    fn express(ned: &NEDFrame, time: f64) -> Result<Self::Frame, KinematicsError>;
}

/// Per-frame inputs to the shared inversion, evaluated for a strictly positive interval.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReferenceMotion {
    /// Specific force resolved in the reference frame, m/s^2
    pub specific_force: Vector3<f64>,
    /// Rotation inserted between the old and new attitude to remove the reference frame's own rotation
    pub frame_rotation: Matrix3<f64>,
    /// Rotation angle of the reference frame with respect to inertial space over the interval
    pub frame_rotation_angle: Vector3<f64>,
}

/// Extract the rotation vector from a differential attitude matrix (Groves eq. 5.84 and 5.85)
pub fn rotation_vector(c_old_new: &Matrix3<f64>) -> Vector3<f64> {
    let alpha = 0.5 * skew_symmetric_to_vector(&(c_old_new.transpose() - c_old_new));
    let cos_theta = (0.5 * (c_old_new.trace() - 1.0)).clamp(-1.0, 1.0);
    let theta = cos_theta.acos();
    if theta > SCALING_THRESHOLD {
        alpha * (theta / theta.sin())
    } else {
        alpha
    }
}

/// Attitude averaged over the interval (Groves eq. 5.86)
///
/// `frame_rotation_angle` is the rotation of the reference frame over the same interval, zero for ECI.
pub fn average_attitude(
    old_attitude: &Matrix3<f64>,
    alpha: &Vector3<f64>,
    frame_rotation_angle: &Vector3<f64>,
) -> Matrix3<f64> {
    let correction = 0.5 * vector_to_skew_symmetric(frame_rotation_angle) * old_attitude;
    let magnitude = alpha.norm();
    if magnitude > ALPHA_THRESHOLD {
        let magnitude_squared = magnitude * magnitude;
        let skew_alpha = vector_to_skew_symmetric(alpha);
        let average = Matrix3::identity()
            + ((1.0 - magnitude.cos()) / magnitude_squared) * skew_alpha
            + ((1.0 - magnitude.sin() / magnitude) / magnitude_squared) * skew_alpha * skew_alpha;
        old_attitude * average - correction
    } else {
        old_attitude - correction
    }
}

/// Check the interval and attitude tags shared by every estimator entry point
pub(crate) fn validate(
    frame: FrameType,
    time_interval: f64,
    attitude: &FrameTransform,
    old_attitude: &FrameTransform,
) -> Result<(), KinematicsError> {
    // also catches NaN
    if !(time_interval >= 0.0) || time_interval.is_infinite() {
        return Err(KinematicsError::InvalidTimeInterval(time_interval));
    }
    attitude.ensure(FrameType::Body, frame)?;
    old_attitude.ensure(FrameType::Body, frame)?;
    Ok(())
}

/// Recover body-frame specific force and angular rate from two attitudes and the reference frame motion.
///
/// `reference` is only evaluated for a positive interval. A zero interval returns exact zeros once the inputs have
/// been validated.
pub(crate) fn invert_mechanization<F>(
    frame: FrameType,
    time_interval: f64,
    attitude: &FrameTransform,
    old_attitude: &FrameTransform,
    reference: F,
) -> Result<BodyKinematics, KinematicsError>
where
    F: FnOnce(f64) -> ReferenceMotion,
{
    validate(frame, time_interval, attitude, old_attitude)?;
    if time_interval == 0.0 {
        log::trace!("zero time interval in {} frame, returning zero kinematics", frame);
        return Ok(BodyKinematics::default());
    }
    let motion = reference(time_interval);
    let c_old_new = attitude.matrix.transpose() * motion.frame_rotation * old_attitude.matrix;
    let alpha = rotation_vector(&c_old_new);
    let average = average_attitude(&old_attitude.matrix, &alpha, &motion.frame_rotation_angle);
    let average_inverse = average
        .try_inverse()
        .ok_or(KinematicsError::SingularMatrix)?;
    Ok(BodyKinematics {
        specific_force: average_inverse * motion.specific_force,
        angular_rate: alpha / time_interval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Rotation3;

    fn yaw(angle: f64) -> Matrix3<f64> {
        *Rotation3::from_euler_angles(0.0, 0.0, angle).matrix()
    }

    #[test]
    fn test_rotation_vector_identity() {
        assert_eq!(rotation_vector(&Matrix3::identity()), Vector3::zeros());
    }
    #[test]
    fn test_rotation_vector_scaled() {
        let alpha = rotation_vector(&yaw(0.3).transpose());
        assert_approx_eq!(alpha[0], 0.0, 1e-12);
        assert_approx_eq!(alpha[1], 0.0, 1e-12);
        assert_approx_eq!(alpha[2], 0.3, 1e-12);
    }
    #[test]
    fn test_rotation_vector_small_angle_unscaled() {
        let alpha = rotation_vector(&yaw(1e-6).transpose());
        assert_approx_eq!(alpha[2], (1e-6_f64).sin(), 1e-18);
    }
    #[test]
    fn test_rotation_vector_roll_and_pitch() {
        let c = *Rotation3::from_euler_angles(0.2, 0.0, 0.0).matrix();
        assert_approx_eq!(rotation_vector(&c.transpose())[0], 0.2, 1e-12);
        let c = *Rotation3::from_euler_angles(0.0, -0.1, 0.0).matrix();
        assert_approx_eq!(rotation_vector(&c.transpose())[1], -0.1, 1e-12);
    }
    #[test]
    fn test_average_attitude_no_motion() {
        let old = yaw(0.7);
        let average = average_attitude(&old, &Vector3::zeros(), &Vector3::zeros());
        assert_eq!(average, old);
    }
    #[test]
    fn test_average_attitude_rotation() {
        let angle = 0.5;
        let average = average_attitude(
            &Matrix3::identity(),
            &Vector3::new(0.0, 0.0, angle),
            &Vector3::zeros(),
        );
        assert_approx_eq!(average[(0, 0)], angle.sin() / angle, 1e-12);
        assert_approx_eq!(average[(0, 1)], -(1.0 - angle.cos()) / angle, 1e-12);
        assert_approx_eq!(average[(2, 2)], 1.0, 1e-12);
    }
    #[test]
    fn test_average_attitude_frame_correction() {
        let frame_angle = Vector3::new(0.0, 0.0, 1e-3);
        let average = average_attitude(&Matrix3::identity(), &Vector3::zeros(), &frame_angle);
        assert_approx_eq!(average[(0, 1)], 0.5e-3, 1e-15);
        assert_approx_eq!(average[(1, 0)], -0.5e-3, 1e-15);
    }
    #[test]
    fn test_validate() {
        let c = FrameTransform::identity(FrameType::Body, FrameType::ECI);
        assert!(validate(FrameType::ECI, 0.0, &c, &c).is_ok());
        assert_eq!(
            validate(FrameType::ECI, -1.0, &c, &c),
            Err(KinematicsError::InvalidTimeInterval(-1.0))
        );
        assert!(validate(FrameType::ECI, f64::NAN, &c, &c).is_err());
        assert!(validate(FrameType::ECI, f64::INFINITY, &c, &c).is_err());
        assert!(validate(FrameType::ECEF, 1.0, &c, &c).is_err());
    }
    #[test]
    fn test_invert_mechanization_zero_interval_skips_reference() {
        let c = FrameTransform::identity(FrameType::Body, FrameType::ECI);
        let result = invert_mechanization(FrameType::ECI, 0.0, &c, &c, |_| {
            panic!("reference motion evaluated for a zero interval")
        })
        .unwrap();
        assert_eq!(result, BodyKinematics::default());
    }
    #[test]
    fn test_invert_mechanization_singular() {
        let mut c = FrameTransform::identity(FrameType::Body, FrameType::ECI);
        c.matrix = Matrix3::zeros();
        let result = invert_mechanization(FrameType::ECI, 1.0, &c, &c, |_| ReferenceMotion {
            specific_force: Vector3::new(0.0, 0.0, 1.0),
            frame_rotation: Matrix3::identity(),
            frame_rotation_angle: Vector3::zeros(),
        });
        assert_eq!(result, Err(KinematicsError::SingularMatrix));
    }
}

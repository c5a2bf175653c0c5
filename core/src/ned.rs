//! Kinematics estimation in the local-level north-east-down frame
//!
//! The local-level frame turns with the Earth and also turns as its origin is carried over the curved ellipsoid by
//! the body's motion (the transport rate). Both rates are removed from the attitude change before the body rate is
//! extracted. The transport rate is evaluated at both ends of the interval, which is why the NED estimator needs the
//! old position as well as the new one (Groves, eq. 5.44 and section 5.4).
//!
//! $$
//! f_{ib}^n = \frac{v_{eb}^n(+) - v_{eb}^n(-)}{\tau} - g_b^n(L_b(-), h_b(-)) + (\Omega_{en}^n(-) + 2\Omega_{ie}^n) v_{eb}^n(-)
//! $$
use crate::earth;
use crate::frames::{FrameTransform, FrameType, NEDFrame, check_latitude};
use crate::inversion::{KinematicsEstimator, ReferenceMotion, invert_mechanization, validate};
use crate::units::{self, Angle, Length, TimeInterval, Velocity};
use crate::{BodyKinematics, KinematicsError};

use nalgebra::{Matrix3, Vector3};
use nav_types::WGS84;
use uom::si::length::meter;

/// Body kinematics from two navigation states resolved in the NED frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NEDKinematicsEstimator;

impl NEDKinematicsEstimator {
    /// Estimate the body kinematics between two local-level navigation states.
    ///
    /// # Parameters
    /// - `time_interval` - Seconds between the old and new states, must be non-negative
    /// - `attitude`, `old_attitude` - Body to NED attitudes at the new and old epochs
    /// - `velocity`, `old_velocity` - North, east, down velocities at the new and old epochs, m/s
    /// - `latitude`, `height` - Geodetic latitude (radians) and ellipsoidal height (meters) at the new epoch
    /// - `old_latitude`, `old_height` - The same at the old epoch
    ///
    /// Latitudes outside of [-pi/2, pi/2] are rejected with [`KinematicsError::InvalidLatitude`].
    ///
    /// # Example
    /// ```rust
    /// use nalgebra::Vector3;
    /// use kinematics::{NEDKinematicsEstimator, FrameTransform, FrameType, earth};
    /// let level = FrameTransform::identity(FrameType::Body, FrameType::NED);
    /// let latitude = 45.0_f64.to_radians();
    /// let result = NEDKinematicsEstimator::estimate(
    ///     0.1, &level, &level, &Vector3::zeros(), &Vector3::zeros(), latitude, 0.0, latitude, 0.0,
    /// ).unwrap();
    /// assert!(result.specific_force[2] < -9.8);
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn estimate(
        time_interval: f64,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        latitude: f64,
        height: f64,
        old_latitude: f64,
        old_height: f64,
    ) -> Result<BodyKinematics, KinematicsError> {
        validate(FrameType::NED, time_interval, attitude, old_attitude)?;
        check_latitude(latitude)?;
        check_latitude(old_latitude)?;
        invert_mechanization(
            FrameType::NED,
            time_interval,
            attitude,
            old_attitude,
            |dt| {
                let omega_ie = earth::earth_rate_ned(old_latitude);
                let old_omega_en = earth::transport_rate(old_latitude, old_height, old_velocity);
                let omega_en = earth::transport_rate(latitude, height, velocity);
                let frame_rate = earth::vector_to_skew_symmetric(&omega_ie)
                    + 0.5 * earth::vector_to_skew_symmetric(&omega_en)
                    + 0.5 * earth::vector_to_skew_symmetric(&old_omega_en);
                let specific_force = (velocity - old_velocity) / dt
                    - earth::gravity_ned(old_latitude, old_height)
                    + earth::vector_to_skew_symmetric(&(old_omega_en + 2.0 * omega_ie)) * old_velocity;
                ReferenceMotion {
                    specific_force,
                    frame_rotation: Matrix3::identity() - frame_rate * dt,
                    frame_rotation_angle: (old_omega_en + omega_ie) * dt,
                }
            },
        )
    }
    #[allow(clippy::too_many_arguments)]
    pub fn estimate_into(
        time_interval: f64,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        latitude: f64,
        height: f64,
        old_latitude: f64,
        old_height: f64,
        result: &mut BodyKinematics,
    ) -> Result<(), KinematicsError> {
        *result = Self::estimate(
            time_interval,
            attitude,
            old_attitude,
            velocity,
            old_velocity,
            latitude,
            height,
            old_latitude,
            old_height,
        )?;
        Ok(())
    }
    #[allow(clippy::too_many_arguments)]
    pub fn estimate_with_units<T: Into<TimeInterval>>(
        time_interval: T,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &[Velocity; 3],
        old_velocity: &[Velocity; 3],
        latitude: Angle,
        height: Length,
        old_latitude: Angle,
        old_height: Length,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate(
            time_interval.into().seconds(),
            attitude,
            old_attitude,
            &units::velocity_to_vector(velocity),
            &units::velocity_to_vector(old_velocity),
            units::angle_to_radians(&latitude),
            height.get::<meter>(),
            units::angle_to_radians(&old_latitude),
            old_height.get::<meter>(),
        )
    }
    /// Form of [`estimate`](Self::estimate) taking both positions as nav-types geodetic points
    pub fn estimate_at_point<T: Into<TimeInterval>>(
        time_interval: T,
        attitude: &FrameTransform,
        old_attitude: &FrameTransform,
        velocity: &Vector3<f64>,
        old_velocity: &Vector3<f64>,
        position: &WGS84<f64>,
        old_position: &WGS84<f64>,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate(
            time_interval.into().seconds(),
            attitude,
            old_attitude,
            velocity,
            old_velocity,
            position.latitude_radians(),
            position.altitude(),
            old_position.latitude_radians(),
            old_position.altitude(),
        )
    }
    pub fn estimate_from_frames<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &NEDFrame,
        old_frame: &NEDFrame,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate(
            time_interval.into().seconds(),
            &frame.attitude,
            &old_frame.attitude,
            &frame.velocity,
            &old_frame.velocity,
            frame.latitude,
            frame.height,
            old_frame.latitude,
            old_frame.height,
        )
    }
    pub fn estimate_from_frames_into<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &NEDFrame,
        old_frame: &NEDFrame,
        result: &mut BodyKinematics,
    ) -> Result<(), KinematicsError> {
        *result = Self::estimate_from_frames(time_interval, frame, old_frame)?;
        Ok(())
    }
}

impl KinematicsEstimator for NEDKinematicsEstimator {
    type Frame = NEDFrame;
    const FRAME: FrameType = FrameType::NED;
    fn estimate_frames<T: Into<TimeInterval>>(
        time_interval: T,
        frame: &NEDFrame,
        old_frame: &NEDFrame,
    ) -> Result<BodyKinematics, KinematicsError> {
        Self::estimate_from_frames(time_interval, frame, old_frame)
    }
    fn express(ned: &NEDFrame, _time: f64) -> Result<NEDFrame, KinematicsError> {
        Ok(*ned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use uom::si::angle::radian;
    use uom::si::velocity::meter_per_second;

    const LATITUDE: f64 = 0.7222; // ~41.38 deg

    fn level() -> FrameTransform {
        FrameTransform::identity(FrameType::Body, FrameType::NED)
    }

    #[test]
    fn test_stationary_level_body() {
        let result = NEDKinematicsEstimator::estimate(
            1.0,
            &level(),
            &level(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            LATITUDE,
            0.0,
            LATITUDE,
            0.0,
        )
        .unwrap();
        let earth_rate = earth::earth_rate_ned(LATITUDE);
        let gravity = earth::gravity_ned(LATITUDE, 0.0);
        for i in 0..3 {
            assert_approx_eq!(result.angular_rate[i], earth_rate[i], 1e-12);
            assert_approx_eq!(result.specific_force[i], -gravity[i], 1e-6);
        }
    }
    #[test]
    fn test_level_flight_north_follows_transport_rate() {
        let speed = 100.0;
        let dt = 0.5;
        let (r_n, _, _) = earth::principal_radii(LATITUDE, 1000.0);
        let latitude = LATITUDE + speed * dt / (r_n + 1000.0);
        let velocity = Vector3::new(speed, 0.0, 0.0);
        let result = NEDKinematicsEstimator::estimate(
            dt, &level(), &level(), &velocity, &velocity, latitude, 1000.0, LATITUDE, 1000.0,
        )
        .unwrap();
        // the body pitches down with the local level
        assert_approx_eq!(result.angular_rate[1], -speed / (r_n + 1000.0), 1e-9);
        assert_approx_eq!(result.angular_rate[0], earth::RATE * LATITUDE.cos(), 1e-9);
        assert!(result.specific_force.iter().all(|f| f.is_finite()));
    }
    #[test]
    fn test_yaw_rate() {
        let dt = 0.2;
        let attitude = FrameTransform::from_euler_angles(FrameType::Body, FrameType::NED, 0.0, 0.0, 0.01);
        let result = NEDKinematicsEstimator::estimate(
            dt,
            &attitude,
            &level(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            LATITUDE,
            0.0,
            LATITUDE,
            0.0,
        )
        .unwrap();
        assert_approx_eq!(result.angular_rate[2], 0.05 - earth::RATE * LATITUDE.sin(), 1e-6);
    }
    #[test]
    fn test_zero_interval() {
        let result = NEDKinematicsEstimator::estimate(
            0.0,
            &level(),
            &level(),
            &Vector3::new(5.0, 0.0, 0.0),
            &Vector3::zeros(),
            LATITUDE,
            10.0,
            LATITUDE,
            0.0,
        )
        .unwrap();
        assert_eq!(result, BodyKinematics::default());
    }
    #[test]
    fn test_negative_interval() {
        let result = NEDKinematicsEstimator::estimate(
            -1.0,
            &level(),
            &level(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            LATITUDE,
            0.0,
            LATITUDE,
            0.0,
        );
        assert_eq!(result, Err(KinematicsError::InvalidTimeInterval(-1.0)));
    }
    #[test]
    fn test_wrong_frame_tag() {
        let mut attitude = level();
        attitude.destination = FrameType::Body;
        let result = NEDKinematicsEstimator::estimate(
            0.1,
            &attitude,
            &level(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            LATITUDE,
            0.0,
            LATITUDE,
            0.0,
        );
        assert!(matches!(result, Err(KinematicsError::InvalidFrameTransform { .. })));
    }
    #[test]
    fn test_invalid_latitude() {
        let result = NEDKinematicsEstimator::estimate(
            0.1,
            &level(),
            &level(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            LATITUDE,
            0.0,
            3.0,
            0.0,
        );
        assert_eq!(result, Err(KinematicsError::InvalidLatitude(3.0)));
    }
    #[test]
    fn test_interval_checked_before_latitude() {
        let result = NEDKinematicsEstimator::estimate(
            -1.0,
            &level(),
            &level(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            3.0,
            0.0,
            3.0,
            0.0,
        );
        assert_eq!(result, Err(KinematicsError::InvalidTimeInterval(-1.0)));
        let mut attitude = level();
        attitude.destination = FrameType::ECEF;
        let result = NEDKinematicsEstimator::estimate(
            0.1,
            &attitude,
            &level(),
            &Vector3::zeros(),
            &Vector3::zeros(),
            f64::NAN,
            0.0,
            LATITUDE,
            0.0,
        );
        assert!(matches!(result, Err(KinematicsError::InvalidFrameTransform { .. })));
    }
    #[test]
    fn test_entry_points_agree() {
        let dt = 0.25;
        let old_attitude = FrameTransform::from_euler_angles(FrameType::Body, FrameType::NED, 0.02, -0.01, 1.0);
        let attitude = FrameTransform::from_euler_angles(FrameType::Body, FrameType::NED, 0.03, -0.02, 1.02);
        let old_position = WGS84::from_radians_and_meters(LATITUDE, 0.038, 12.0);
        let position = WGS84::from_radians_and_meters(LATITUDE + 1e-7, 0.038 + 1e-7, 11.9);
        let old_velocity = Vector3::new(10.0, 9.0, 0.4);
        let velocity = Vector3::new(10.5, 9.2, 0.3);
        let canonical = NEDKinematicsEstimator::estimate(
            dt,
            &attitude,
            &old_attitude,
            &velocity,
            &old_velocity,
            position.latitude_radians(),
            position.altitude(),
            old_position.latitude_radians(),
            old_position.altitude(),
        )
        .unwrap();
        let at_point = NEDKinematicsEstimator::estimate_at_point(
            dt,
            &attitude,
            &old_attitude,
            &velocity,
            &old_velocity,
            &position,
            &old_position,
        )
        .unwrap();
        assert_eq!(at_point, canonical);
        let frame = NEDFrame::from_point(&position, velocity, attitude).unwrap();
        let old_frame = NEDFrame::from_point(&old_position, old_velocity, old_attitude).unwrap();
        let mut into = BodyKinematics::default();
        NEDKinematicsEstimator::estimate_into(
            dt,
            &attitude,
            &old_attitude,
            &velocity,
            &old_velocity,
            position.latitude_radians(),
            position.altitude(),
            old_position.latitude_radians(),
            old_position.altitude(),
            &mut into,
        )
        .unwrap();
        assert_eq!(into, canonical);
        let mut frames_into = BodyKinematics::default();
        NEDKinematicsEstimator::estimate_from_frames_into(dt, &frame, &old_frame, &mut frames_into).unwrap();
        assert_eq!(frames_into, canonical);
        let from_frames = NEDKinematicsEstimator::estimate_from_frames(dt, &frame, &old_frame).unwrap();
        assert_eq!(from_frames, canonical);
        let to_velocity = |v: &Vector3<f64>| {
            [
                Velocity::new::<meter_per_second>(v[0]),
                Velocity::new::<meter_per_second>(v[1]),
                Velocity::new::<meter_per_second>(v[2]),
            ]
        };
        let with_units = NEDKinematicsEstimator::estimate_with_units(
            units::Time::new::<uom::si::time::second>(dt),
            &attitude,
            &old_attitude,
            &to_velocity(&velocity),
            &to_velocity(&old_velocity),
            Angle::new::<radian>(frame.latitude),
            Length::new::<meter>(frame.height),
            Angle::new::<radian>(old_frame.latitude),
            Length::new::<meter>(old_frame.height),
        )
        .unwrap();
        assert_eq!(with_units, canonical);
        let from_trait =
            <NEDKinematicsEstimator as KinematicsEstimator>::estimate_frames(dt, &frame, &old_frame).unwrap();
        assert_eq!(from_trait, canonical);
    }
}

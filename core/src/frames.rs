//! Reference frames, tagged attitude transforms, and navigation state snapshots
//!
//! Every attitude in this crate is carried as a [`FrameTransform`]: a 3x3 direction cosine matrix that rotates
//! vectors resolved in the `source` frame into the `destination` frame, tagged with both frame identities. The
//! estimators only accept body-to-reference transforms (source [`FrameType::Body`]) and check the tags before doing
//! any math, so a transform built for one frame can't silently be used as another.
//!
//! The navigation state structs ([`ECEFFrame`], [`ECIFrame`], [`NEDFrame`]) bundle a position, velocity and attitude
//! for a single epoch. Conversions between them follow Groves, section 2.5.
use crate::KinematicsError;
use crate::earth;

use nalgebra::{Matrix3, Rotation3, Vector3};
use nav_types::{ECEF, WGS84};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt::{self, Display};

/// Identity of a coordinate frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameType {
    /// Body frame: x forward, y right, z down, fixed to the IMU
    Body,
    /// Earth-centered Earth-fixed frame
    ECEF,
    /// Earth-centered inertial frame, coincident with ECEF at time zero
    ECI,
    /// Local-level north-east-down frame
    NED,
}
impl Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameType::Body => "Body",
            FrameType::ECEF => "ECEF",
            FrameType::ECI => "ECI",
            FrameType::NED => "NED",
        };
        write!(f, "{}", name)
    }
}

/// A direction cosine matrix tagged with the frames it maps between.
///
/// `matrix * v_source = v_destination`. For a body attitude in NED this is $C_b^n$.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransform {
    pub source: FrameType,
    pub destination: FrameType,
    pub matrix: Matrix3<f64>,
}
impl FrameTransform {
    pub fn new(source: FrameType, destination: FrameType, matrix: Matrix3<f64>) -> FrameTransform {
        FrameTransform {
            source,
            destination,
            matrix,
        }
    }
    pub fn identity(source: FrameType, destination: FrameType) -> FrameTransform {
        FrameTransform::new(source, destination, Matrix3::identity())
    }
    /// Build a transform from roll, pitch, and yaw (radians, intrinsic z-y-x order)
    pub fn from_euler_angles(
        source: FrameType,
        destination: FrameType,
        roll: f64,
        pitch: f64,
        yaw: f64,
    ) -> FrameTransform {
        FrameTransform::from_rotation(source, destination, &Rotation3::from_euler_angles(roll, pitch, yaw))
    }
    /// Tag a nalgebra rotation with the frames it maps between
    pub fn from_rotation(
        source: FrameType,
        destination: FrameType,
        rotation: &Rotation3<f64>,
    ) -> FrameTransform {
        FrameTransform::new(source, destination, *rotation.matrix())
    }
    /// The reverse transform. Uses the transpose, so the matrix is assumed orthonormal.
    pub fn inverse(&self) -> FrameTransform {
        FrameTransform::new(self.destination, self.source, self.matrix.transpose())
    }
    /// Roll, pitch, and yaw (radians) of the matrix
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        Rotation3::from_matrix_unchecked(self.matrix).euler_angles()
    }
    /// Checks that the matrix is orthonormal with a positive determinant, to within `threshold`
    pub fn is_valid(&self, threshold: f64) -> bool {
        let orthogonality = (self.matrix.transpose() * self.matrix - Matrix3::identity()).abs().max();
        orthogonality <= threshold && (self.matrix.determinant() - 1.0).abs() <= threshold
    }
    /// Returns an error unless the transform maps `source` into `destination`
    pub fn ensure(&self, source: FrameType, destination: FrameType) -> Result<(), KinematicsError> {
        if self.source == source && self.destination == destination {
            Ok(())
        } else {
            Err(KinematicsError::InvalidFrameTransform {
                expected: source,
                expected_destination: destination,
                found: self.source,
                found_destination: self.destination,
            })
        }
    }
    /// Chain `self` (a -> b) with `next` (b -> c) into a single a -> c transform
    pub fn compose(&self, next: &FrameTransform) -> Result<FrameTransform, KinematicsError> {
        if self.destination != next.source {
            return Err(KinematicsError::InvalidFrameTransform {
                expected: self.destination,
                expected_destination: next.destination,
                found: next.source,
                found_destination: next.destination,
            });
        }
        Ok(FrameTransform::new(
            self.source,
            next.destination,
            next.matrix * self.matrix,
        ))
    }
}

/// Rejects geodetic latitudes outside of [-pi/2, pi/2]
pub(crate) fn check_latitude(latitude: f64) -> Result<(), KinematicsError> {
    if latitude.abs() <= FRAC_PI_2 {
        Ok(())
    } else {
        Err(KinematicsError::InvalidLatitude(latitude))
    }
}

/// Rejects NaN and infinite longitudes. Any finite value is accepted and wrapped when needed.
pub(crate) fn check_longitude(longitude: f64) -> Result<(), KinematicsError> {
    if longitude.is_finite() {
        Ok(())
    } else {
        Err(KinematicsError::InvalidLongitude(longitude))
    }
}

/// Navigation state resolved in the Earth-centered Earth-fixed frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ECEFFrame {
    /// Cartesian position in meters
    pub position: Vector3<f64>,
    /// Velocity of the body with respect to the Earth, resolved in ECEF, m/s
    pub velocity: Vector3<f64>,
    /// Body to ECEF attitude
    pub attitude: FrameTransform,
}
impl ECEFFrame {
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        attitude: FrameTransform,
    ) -> Result<ECEFFrame, KinematicsError> {
        attitude.ensure(FrameType::Body, FrameType::ECEF)?;
        Ok(ECEFFrame {
            position,
            velocity,
            attitude,
        })
    }
    pub fn point(&self) -> ECEF<f64> {
        ECEF::new(self.position[0], self.position[1], self.position[2])
    }
}

/// Navigation state resolved in the Earth-centered inertial frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ECIFrame {
    pub position: Vector3<f64>,
    /// Velocity with respect to inertial space, m/s
    pub velocity: Vector3<f64>,
    pub attitude: FrameTransform,
}
impl ECIFrame {
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        attitude: FrameTransform,
    ) -> Result<ECIFrame, KinematicsError> {
        attitude.ensure(FrameType::Body, FrameType::ECI)?;
        Ok(ECIFrame {
            position,
            velocity,
            attitude,
        })
    }
}

/// Navigation state with a geodetic position and a local-level velocity and attitude
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NEDFrame {
    /// Geodetic latitude in radians
    pub latitude: f64,
    /// Longitude in radians
    pub longitude: f64,
    /// Height above the WGS84 ellipsoid in meters
    pub height: f64,
    /// North, east, down velocity in m/s
    pub velocity: Vector3<f64>,
    /// Body to NED attitude
    pub attitude: FrameTransform,
}
impl NEDFrame {
    pub fn new(
        latitude: f64,
        longitude: f64,
        height: f64,
        velocity: Vector3<f64>,
        attitude: FrameTransform,
    ) -> Result<NEDFrame, KinematicsError> {
        check_latitude(latitude)?;
        check_longitude(longitude)?;
        attitude.ensure(FrameType::Body, FrameType::NED)?;
        Ok(NEDFrame {
            latitude,
            longitude,
            height,
            velocity,
            attitude,
        })
    }
    /// Build from a nav-types geodetic point
    pub fn from_point(
        point: &WGS84<f64>,
        velocity: Vector3<f64>,
        attitude: FrameTransform,
    ) -> Result<NEDFrame, KinematicsError> {
        NEDFrame::new(
            point.latitude_radians(),
            point.longitude_radians(),
            point.altitude(),
            velocity,
            attitude,
        )
    }
    /// Geodetic point, longitude wrapped into [-pi, pi)
    pub fn point(&self) -> Result<WGS84<f64>, KinematicsError> {
        check_latitude(self.latitude)?;
        check_longitude(self.longitude)?;
        let longitude = (self.longitude + PI).rem_euclid(2.0 * PI) - PI;
        WGS84::try_from_radians_and_meters(self.latitude, longitude, self.height)
            .ok_or(KinematicsError::InvalidLongitude(self.longitude))
    }
}

/// Convert a local-level navigation state to ECEF (Groves eq. 2.150, 2.152)
pub fn ned_to_ecef(ned: &NEDFrame) -> Result<ECEFFrame, KinematicsError> {
    ned.attitude.ensure(FrameType::Body, FrameType::NED)?;
    let ecef = ECEF::from(ned.point()?);
    let c_n_e = earth::ned_to_ecef(ned.latitude, ned.longitude);
    let attitude = FrameTransform::new(FrameType::Body, FrameType::ECEF, c_n_e * ned.attitude.matrix);
    Ok(ECEFFrame {
        position: Vector3::new(ecef.x(), ecef.y(), ecef.z()),
        velocity: c_n_e * ned.velocity,
        attitude,
    })
}

/// Convert an ECEF navigation state to local-level (Groves eq. 2.151, 2.152)
pub fn ecef_to_ned(ecef: &ECEFFrame) -> Result<NEDFrame, KinematicsError> {
    ecef.attitude.ensure(FrameType::Body, FrameType::ECEF)?;
    let wgs84 = WGS84::from(ecef.point());
    let latitude = wgs84.latitude_radians();
    let longitude = wgs84.longitude_radians();
    check_latitude(latitude)?;
    let c_e_n = earth::ecef_to_ned(latitude, longitude);
    Ok(NEDFrame {
        latitude,
        longitude,
        height: wgs84.altitude(),
        velocity: c_e_n * ecef.velocity,
        attitude: FrameTransform::new(FrameType::Body, FrameType::NED, c_e_n * ecef.attitude.matrix),
    })
}

/// Convert an ECEF navigation state to ECI at `time` seconds after the frames coincided (Groves eq. 2.145)
pub fn ecef_to_eci(time: f64, ecef: &ECEFFrame) -> Result<ECIFrame, KinematicsError> {
    ecef.attitude.ensure(FrameType::Body, FrameType::ECEF)?;
    let c_e_i = earth::ecef_to_eci(time);
    let omega_ie = earth::vector_to_skew_symmetric(&earth::RATE_VECTOR);
    Ok(ECIFrame {
        position: c_e_i * ecef.position,
        velocity: c_e_i * (ecef.velocity + omega_ie * ecef.position),
        attitude: FrameTransform::new(FrameType::Body, FrameType::ECI, c_e_i * ecef.attitude.matrix),
    })
}

/// Convert an ECI navigation state to ECEF at `time` seconds after the frames coincided (Groves eq. 2.146)
pub fn eci_to_ecef(time: f64, eci: &ECIFrame) -> Result<ECEFFrame, KinematicsError> {
    eci.attitude.ensure(FrameType::Body, FrameType::ECI)?;
    let c_i_e = earth::eci_to_ecef(time);
    let omega_ie = earth::vector_to_skew_symmetric(&earth::RATE_VECTOR);
    Ok(ECEFFrame {
        position: c_i_e * eci.position,
        velocity: c_i_e * (eci.velocity - omega_ie * eci.position),
        attitude: FrameTransform::new(FrameType::Body, FrameType::ECEF, c_i_e * eci.attitude.matrix),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn barcelona(attitude: FrameTransform) -> NEDFrame {
        NEDFrame::new(
            41.3825_f64.to_radians(),
            2.176944_f64.to_radians(),
            12.0,
            Vector3::new(3.0, -1.5, 0.2),
            attitude,
        )
        .unwrap()
    }

    #[test]
    fn test_transform_inverse_and_compose() {
        let c_b_n = FrameTransform::from_euler_angles(FrameType::Body, FrameType::NED, 0.1, -0.2, 0.3);
        assert!(c_b_n.is_valid(1e-12));
        let c_n_b = c_b_n.inverse();
        assert_eq!(c_n_b.source, FrameType::NED);
        assert_eq!(c_n_b.destination, FrameType::Body);
        let round_trip = c_b_n.compose(&c_n_b).unwrap();
        assert_eq!(round_trip.source, FrameType::Body);
        assert_eq!(round_trip.destination, FrameType::Body);
        assert!((round_trip.matrix - Matrix3::identity()).abs().max() < 1e-12);
        assert!(c_b_n.compose(&c_b_n).is_err());
    }
    #[test]
    fn test_transform_euler_angles() {
        let c = FrameTransform::from_euler_angles(FrameType::Body, FrameType::NED, 0.1, -0.2, 0.3);
        let (roll, pitch, yaw) = c.euler_angles();
        assert_approx_eq!(roll, 0.1, 1e-12);
        assert_approx_eq!(pitch, -0.2, 1e-12);
        assert_approx_eq!(yaw, 0.3, 1e-12);
    }
    #[test]
    fn test_transform_from_rotation() {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), 0.25);
        let c = FrameTransform::from_rotation(FrameType::Body, FrameType::ECEF, &rotation);
        assert_eq!(c.source, FrameType::Body);
        assert_eq!(c.destination, FrameType::ECEF);
        assert_eq!(c.matrix, *rotation.matrix());
        let (roll, pitch, yaw) = c.euler_angles();
        assert_approx_eq!(roll, 0.0, 1e-12);
        assert_approx_eq!(pitch, 0.0, 1e-12);
        assert_approx_eq!(yaw, 0.25, 1e-12);
        let rotated = c.matrix * Vector3::x();
        assert_approx_eq!(rotated[1], 0.25_f64.sin(), 1e-12);
    }
    #[test]
    fn test_transform_is_valid() {
        let mut c = FrameTransform::identity(FrameType::Body, FrameType::ECI);
        assert!(c.is_valid(1e-12));
        c.matrix[(0, 0)] = 2.0;
        assert!(!c.is_valid(1e-6));
    }
    #[test]
    fn test_frame_tags_checked() {
        let wrong = FrameTransform::identity(FrameType::Body, FrameType::ECEF);
        let err = NEDFrame::new(0.0, 0.0, 0.0, Vector3::zeros(), wrong).unwrap_err();
        assert_eq!(
            err,
            KinematicsError::InvalidFrameTransform {
                expected: FrameType::Body,
                expected_destination: FrameType::NED,
                found: FrameType::Body,
                found_destination: FrameType::ECEF,
            }
        );
        assert!(ECIFrame::new(Vector3::zeros(), Vector3::zeros(), wrong).is_err());
        assert!(ECEFFrame::new(Vector3::zeros(), Vector3::zeros(), wrong).is_ok());
    }
    #[test]
    fn test_latitude_checked() {
        let attitude = FrameTransform::identity(FrameType::Body, FrameType::NED);
        let err = NEDFrame::new(2.0, 0.0, 0.0, Vector3::zeros(), attitude).unwrap_err();
        assert_eq!(err, KinematicsError::InvalidLatitude(2.0));
    }
    #[test]
    fn test_non_finite_longitude_rejected() {
        let attitude = FrameTransform::identity(FrameType::Body, FrameType::NED);
        let err = NEDFrame::new(0.3, f64::INFINITY, 0.0, Vector3::zeros(), attitude).unwrap_err();
        assert_eq!(err, KinematicsError::InvalidLongitude(f64::INFINITY));
        assert!(matches!(
            NEDFrame::new(0.3, f64::NAN, 0.0, Vector3::zeros(), attitude),
            Err(KinematicsError::InvalidLongitude(_))
        ));
        // fields are public, so the conversions check again
        let mut ned = NEDFrame::new(0.3, 0.1, 0.0, Vector3::zeros(), attitude).unwrap();
        ned.longitude = f64::NAN;
        assert!(matches!(ned.point(), Err(KinematicsError::InvalidLongitude(_))));
        assert!(matches!(ned_to_ecef(&ned), Err(KinematicsError::InvalidLongitude(_))));
        ned.longitude = f64::NEG_INFINITY;
        assert!(matches!(ned_to_ecef(&ned), Err(KinematicsError::InvalidLongitude(_))));
        ned.longitude = 0.1;
        ned.latitude = f64::NAN;
        assert!(matches!(ned_to_ecef(&ned), Err(KinematicsError::InvalidLatitude(_))));
    }
    #[test]
    fn test_ned_ecef_round_trip() {
        let attitude = FrameTransform::from_euler_angles(FrameType::Body, FrameType::NED, 0.05, 0.1, 1.2);
        let ned = barcelona(attitude);
        let ecef = ned_to_ecef(&ned).unwrap();
        assert!(ecef.attitude.is_valid(1e-12));
        // ground speed is preserved
        assert_approx_eq!(ecef.velocity.norm(), ned.velocity.norm(), 1e-9);
        let back = ecef_to_ned(&ecef).unwrap();
        assert_approx_eq!(back.latitude, ned.latitude, 1e-9);
        assert_approx_eq!(back.longitude, ned.longitude, 1e-9);
        assert_approx_eq!(back.height, ned.height, 1e-3);
        assert!((back.velocity - ned.velocity).abs().max() < 1e-9);
        assert!((back.attitude.matrix - ned.attitude.matrix).abs().max() < 1e-9);
    }
    #[test]
    fn test_longitude_wrapped() {
        let attitude = FrameTransform::identity(FrameType::Body, FrameType::NED);
        let east = NEDFrame::new(0.3, 1.5 * PI, 0.0, Vector3::zeros(), attitude).unwrap();
        let west = NEDFrame::new(0.3, -0.5 * PI, 0.0, Vector3::zeros(), attitude).unwrap();
        assert_approx_eq!(east.point().unwrap().longitude_radians(), -0.5 * PI, 1e-12);
        let a = ned_to_ecef(&east).unwrap();
        let b = ned_to_ecef(&west).unwrap();
        assert!((a.position - b.position).abs().max() < 1e-6);
    }
    #[test]
    fn test_ned_to_ecef_at_equator() {
        let attitude = FrameTransform::identity(FrameType::Body, FrameType::NED);
        let ned = NEDFrame::new(0.0, 0.0, 0.0, Vector3::new(1.0, 0.0, 0.0), attitude).unwrap();
        let ecef = ned_to_ecef(&ned).unwrap();
        assert_approx_eq!(ecef.position[0], earth::EQUATORIAL_RADIUS, 1e-6);
        assert_approx_eq!(ecef.position[1], 0.0, 1e-6);
        assert_approx_eq!(ecef.position[2], 0.0, 1e-6);
        // north at the equator and prime meridian is ECEF +z
        assert_approx_eq!(ecef.velocity[2], 1.0, 1e-12);
    }
    #[test]
    fn test_ecef_eci_round_trip() {
        let attitude = FrameTransform::from_euler_angles(FrameType::Body, FrameType::NED, 0.0, 0.0, 0.5);
        let ecef = ned_to_ecef(&barcelona(attitude)).unwrap();
        let eci = ecef_to_eci(120.0, &ecef).unwrap();
        assert_approx_eq!(eci.position.norm(), ecef.position.norm(), 1e-6);
        let back = eci_to_ecef(120.0, &eci).unwrap();
        assert!((back.position - ecef.position).abs().max() < 1e-6);
        assert!((back.velocity - ecef.velocity).abs().max() < 1e-9);
        assert!((back.attitude.matrix - ecef.attitude.matrix).abs().max() < 1e-12);
    }
    #[test]
    fn test_ecef_to_eci_adds_earth_rotation() {
        let attitude = FrameTransform::identity(FrameType::Body, FrameType::ECEF);
        let ecef = ECEFFrame::new(
            Vector3::new(earth::EQUATORIAL_RADIUS, 0.0, 0.0),
            Vector3::zeros(),
            attitude,
        )
        .unwrap();
        let eci = ecef_to_eci(0.0, &ecef).unwrap();
        assert_approx_eq!(eci.velocity[1], earth::RATE * earth::EQUATORIAL_RADIUS, 1e-9);
        assert_eq!(eci.attitude.destination, FrameType::ECI);
    }
}

//! Earth-related constants and functions
//!
//! This module contains constants and functions related to the Earth's shape, rotation, and
//! gravity field. The Earth is modeled as an ellipsoid (WGS84) with a semi-major axis and a
//! semi-minor axis. Surface gravity follows the Somigliana model, the gravitational field in
//! Cartesian frames uses the J2 (oblateness) approximation, and the Earth's rotation rate is
//! included for the rotating-frame corrections needed when inverting the strapdown equations.
//!
//! # Coordinate Systems
//! Three reference frames are used throughout the crate in addition to the body frame of the
//! vehicle: the Earth-centered inertial (ECI) frame, which is fixed with respect to the stars;
//! the Earth-centered Earth-fixed (ECEF) frame, which rotates with the Earth about its z-axis;
//! and the local-level North-East-Down (NED) frame, whose origin is the body and whose axes are
//! defined by the tangent to the ellipsoid at the body's geodetic position.
//!
//! All angles taken by the functions in this module are in **radians** and all distances are
//! in meters. Geodetic to Cartesian point conversion itself is left to the
//! [`nav-types`](https://crates.io/crates/nav-types) crate (see [crate::frames]).
//!
//! # Rotation Functions
//! The rotations needed for the inverse mechanization are the ECI/ECEF rotation over a given
//! time and the ECEF/NED rotation at a given geodetic position. They are returned as plain
//! `Matrix3<f64>` direction cosine matrices and follow the notation of Groves, _Principles of
//! GNSS, Inertial, and Multisensor Integrated Navigation Systems, 2nd Edition_, Chapter 2.
use ::nalgebra::{Matrix3, Vector3};

// Earth constants (WGS84)
/// Earth's rotation rate rad/s ($\omega_{ie}$)
pub const RATE: f64 = 7.2921159e-5;
/// Earth's rotation rate rad/s ($\omega_{ie}$) in a vector form
pub const RATE_VECTOR: Vector3<f64> = Vector3::new(0.0, 0.0, RATE);
/// Earth's equitorial radius in meters
pub const EQUATORIAL_RADIUS: f64 = 6378137.0; // meters
/// Earth's polar radius in meters
pub const POLAR_RADIUS: f64 = 6356752.31425; // meters
/// Earth's eccentricity ($e$)
pub const ECCENTRICITY: f64 = 0.0818191908425; // unit-less
/// Earth's eccentricity squared ($e^2$)
pub const ECCENTRICITY_SQUARED: f64 = ECCENTRICITY * ECCENTRICITY;
/// Earth's gravitational acceleration at the equator ($g_e$) in $m/s^2$
pub const GE: f64 = 9.7803253359; // m/s^2, equatorial radius
/// Earth's gravitational acceleration at the poles ($g_p$) in $m/s^2$
pub const GP: f64 = 9.8321849378; // $m/s^2$, polar radius
/// Earth's flattening factor ($f$)
pub const F: f64 = 1.0 / 298.257223563; // Flattening factor
/// Somigliana's constant ($K$)
pub const K: f64 = (POLAR_RADIUS * GP - EQUATORIAL_RADIUS * GE) / (EQUATORIAL_RADIUS * GE); // Somigliana's constant
/// WGS84 Earth gravitational constant ($\mu$) in $m^3/s^2$
pub const GM: f64 = 3.986004418e14;
/// Earth's second gravitational constant ($J_2$)
pub const J2: f64 = 1.082627e-3;

/// Convert a three-element vector to a skew-symmetric matrix
///
/// Groves' notation uses a lot of skew-symmetric matrices to represent cross products
/// and to perform more concise matrix operations (particularly involving rotations).
/// This function converts a three-element vector to a skew-symmetric matrix.
///
/// $$
/// x = \begin{bmatrix} a \\\\ b \\\\ c \end{bmatrix} \rightarrow X = \begin{bmatrix} 0 & -c & b \\\\ c & 0 & -a \\\\ -b & a & 0 \end{bmatrix}
/// $$
///
/// # Example
/// ```rust
/// use nalgebra::{Vector3, Matrix3};
/// use kinematics::earth;
/// let v: Vector3<f64> = Vector3::new(1.0, 2.0, 3.0);
/// let skew: Matrix3<f64> = earth::vector_to_skew_symmetric(&v);
/// ```
pub fn vector_to_skew_symmetric(v: &Vector3<f64>) -> Matrix3<f64> {
    let mut skew: Matrix3<f64> = Matrix3::zeros();
    skew[(0, 1)] = -v[2];
    skew[(0, 2)] = v[1];
    skew[(1, 0)] = v[2];
    skew[(1, 2)] = -v[0];
    skew[(2, 0)] = -v[1];
    skew[(2, 1)] = v[0];
    skew
}
/// Convert a skew-symmetric matrix to a three-element vector
///
/// This function converts a skew-symmetric matrix to a three-element vector. This is the
/// inverse operation of the `vector_to_skew_symmetric` function.
///
/// $$
/// X = \begin{bmatrix} 0 & -c & b \\\\ c & 0 & -a \\\\ -b & a & 0 \end{bmatrix} \rightarrow x = \begin{bmatrix} a \\\\ b \\\\ c \end{bmatrix}
/// $$
pub fn skew_symmetric_to_vector(skew: &Matrix3<f64>) -> Vector3<f64> {
    Vector3::new(skew[(2, 1)], skew[(0, 2)], skew[(1, 0)])
}
/// Coordinate transformation from the Earth-centered Inertial (ECI) frame to the Earth-centered
/// Earth-fixed (ECEF) frame ($C_i^e$).
///
/// The ECEF frame rotates with respect to the ECI frame about the common z-axis at the Earth's
/// rotation rate. The two frames are assumed coincident at `time = 0`.
///
/// # Parameters
/// - `time` - The time in seconds since the frames were coincident
///
/// # Returns
/// A 3x3 rotation matrix that converts from the ECI frame to the ECEF frame
///
/// # Example
/// ```rust
/// use nalgebra::Matrix3;
/// use kinematics::earth;
/// let rot: Matrix3<f64> = earth::eci_to_ecef(30.0);
/// ```
pub fn eci_to_ecef(time: f64) -> Matrix3<f64> {
    let (sin_angle, cos_angle) = (RATE * time).sin_cos();
    let mut rot: Matrix3<f64> = Matrix3::zeros();
    rot[(0, 0)] = cos_angle;
    rot[(0, 1)] = sin_angle;
    rot[(1, 0)] = -sin_angle;
    rot[(1, 1)] = cos_angle;
    rot[(2, 2)] = 1.0;
    rot
}
/// Coordinate transformation from the ECEF frame to the ECI frame ($C_e^i$).
///
/// # Parameters
/// - `time` - The time in seconds since the frames were coincident
///
/// # Returns
/// A 3x3 rotation matrix that converts from the ECEF frame to the ECI frame
pub fn ecef_to_eci(time: f64) -> Matrix3<f64> {
    eci_to_ecef(time).transpose()
}
/// Coordinate transformation from the ECEF frame to the local-level NED frame ($C_e^n$).
///
/// The local-level frame is defined by the tangent to the ellipsoidal surface at the given
/// geodetic latitude and longitude (Groves, eq. 2.150).
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in radians
/// - `longitude` - The WGS84 longitude in radians
///
/// # Returns
/// A 3x3 rotation matrix that converts from the ECEF frame to the NED frame
///
/// # Example
/// ```rust
/// use nalgebra::Matrix3;
/// use kinematics::earth;
/// let rot: Matrix3<f64> = earth::ecef_to_ned(45.0_f64.to_radians(), 90.0_f64.to_radians());
/// ```
pub fn ecef_to_ned(latitude: f64, longitude: f64) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();
    Matrix3::new(
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        -sin_lon,
        cos_lon,
        0.0,
        -cos_lat * cos_lon,
        -cos_lat * sin_lon,
        -sin_lat,
    )
}
/// Coordinate transformation from the local-level NED frame to the ECEF frame ($C_n^e$).
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in radians
/// - `longitude` - The WGS84 longitude in radians
pub fn ned_to_ecef(latitude: f64, longitude: f64) -> Matrix3<f64> {
    ecef_to_ned(latitude, longitude).transpose()
}
/// Calculate principal radii of curvature
///
/// The [principal radii of curvature](https://en.wikipedia.org/wiki/Earth_radius) are used to
/// convert between Cartesian velocities in the local-level frame and rates of change of the
/// WGS84 geodetic coordinates.
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in radians
/// - `altitude` - The WGS84 altitude in meters
///
/// # Returns
/// A tuple of the principal radii of curvature (r_n, r_e, r_p) in meters where r_n is the radius
/// of curvature in the meridian (Groves' $R_N$), r_e is the transverse radius of curvature
/// (Groves' $R_E$), and r_p is the distance from the polar axis of a point at the given altitude.
///
/// # Example
/// ```rust
/// use kinematics::earth;
/// let (r_n, r_e, r_p) = earth::principal_radii(45.0_f64.to_radians(), 1000.0);
/// ```
pub fn principal_radii(latitude: f64, altitude: f64) -> (f64, f64, f64) {
    let sin_lat: f64 = latitude.sin();
    let sin_lat_sq: f64 = sin_lat * sin_lat;
    let r_n: f64 = (EQUATORIAL_RADIUS * (1.0 - ECCENTRICITY_SQUARED))
        / (1.0 - ECCENTRICITY_SQUARED * sin_lat_sq).powf(3.0 / 2.0);
    let r_e: f64 = EQUATORIAL_RADIUS / (1.0 - ECCENTRICITY_SQUARED * sin_lat_sq).sqrt();
    let r_p: f64 = (r_e + altitude) * latitude.cos();
    (r_n, r_e, r_p)
}
/// Surface gravity magnitude from the [Somigliana
/// equation](https://en.wikipedia.org/wiki/Theoretical_gravity#Somigliana_equation).
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in radians
///
/// # Returns
/// The magnitude of gravity (gravitation plus centrifugal) on the ellipsoid surface in m/s^2
pub fn somigliana(latitude: f64) -> f64 {
    let sin_lat_sq: f64 = latitude.sin().powi(2);
    (GE * (1.0 + K * sin_lat_sq)) / (1.0 - ECCENTRICITY_SQUARED * sin_lat_sq).sqrt()
}
/// Calculate the gravity vector resolved in the local-level NED frame
///
/// Gravity here is the sum of the gravitational and centrifugal accelerations experienced by a
/// body that is stationary with respect to the Earth. The down component scales the Somigliana
/// surface value with height (Groves, eq. 2.139) and the small north component accounts for the
/// curvature of the plumb line (Groves, eq. 2.140). The east component is zero.
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in radians
/// - `altitude` - The WGS84 altitude in meters
///
/// # Returns
/// The gravity vector in m/s^2, NED axes (positive down)
///
/// # Example
/// ```rust
/// use kinematics::earth;
/// let g = earth::gravity_ned(45.0_f64.to_radians(), 1000.0);
/// assert!(g[2] > 9.7);
/// ```
pub fn gravity_ned(latitude: f64, altitude: f64) -> Vector3<f64> {
    let sin_lat_sq: f64 = latitude.sin().powi(2);
    let g_0: f64 = somigliana(latitude);
    let north: f64 = -8.08e-9 * altitude * (2.0 * latitude).sin();
    let down: f64 = g_0
        * (1.0
            - (2.0 / EQUATORIAL_RADIUS)
                * (1.0
                    + F * (1.0 - 2.0 * sin_lat_sq)
                    + (RATE * RATE * EQUATORIAL_RADIUS * EQUATORIAL_RADIUS * POLAR_RADIUS / GM))
                * altitude
            + (3.0 * altitude * altitude / (EQUATORIAL_RADIUS * EQUATORIAL_RADIUS)));
    Vector3::new(north, 0.0, down)
}
/// Calculate the gravitational acceleration resolved in the ECI frame
///
/// Uses the J2 model of the Earth's gravitational field (Groves, eq. 2.142). This is pure
/// gravitation; no centrifugal term is included, which is what an inertial frame requires.
///
/// # Parameters
/// - `position` - Cartesian position of the body with respect to the Earth's center, meters
///
/// # Returns
/// The gravitational acceleration in m/s^2 along the axes of the frame the position is resolved
/// in. A zero vector is returned for a position at the Earth's center.
///
/// # Example
/// ```rust
/// use nalgebra::Vector3;
/// use kinematics::earth;
/// let gamma = earth::gravitation_eci(&Vector3::new(earth::EQUATORIAL_RADIUS, 0.0, 0.0));
/// assert!(gamma[0] < -9.8);
/// ```
pub fn gravitation_eci(position: &Vector3<f64>) -> Vector3<f64> {
    let magnitude: f64 = position.norm();
    if magnitude == 0.0 {
        return Vector3::zeros();
    }
    let z_scale: f64 = 5.0 * (position[2] / magnitude).powi(2);
    let oblateness: f64 = 1.5 * J2 * (EQUATORIAL_RADIUS / magnitude).powi(2);
    -GM / magnitude.powi(3)
        * (position
            + oblateness
                * Vector3::new(
                    (1.0 - z_scale) * position[0],
                    (1.0 - z_scale) * position[1],
                    (3.0 - z_scale) * position[2],
                ))
}
/// Calculate the gravity vector resolved in the ECEF frame
///
/// Gravity is the J2 gravitation of [gravitation_eci] evaluated at the ECEF position plus the
/// centrifugal acceleration caused by the Earth's rotation (Groves, eq. 2.133).
///
/// # Parameters
/// - `position` - ECEF position of the body in meters
///
/// # Returns
/// The gravity vector in m/s^2, ECEF axes
pub fn gravity_ecef(position: &Vector3<f64>) -> Vector3<f64> {
    if position.norm() == 0.0 {
        return Vector3::zeros();
    }
    let gamma: Vector3<f64> = gravitation_eci(position);
    Vector3::new(
        gamma[0] + RATE * RATE * position[0],
        gamma[1] + RATE * RATE * position[1],
        gamma[2],
    )
}
/// Calculate the Earth rotation rate vector in the local-level frame
///
/// The Earth's rotation rate modeled as a vector in the local-level NED frame ($\omega_{ie}^n$).
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in radians
///
/// # Returns
/// The Earth's rotation rate vector in rad/s in the NED frame
pub fn earth_rate_ned(latitude: f64) -> Vector3<f64> {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    Vector3::new(RATE * cos_lat, 0.0, -RATE * sin_lat)
}
/// Calculate the transport rate vector in the local-level frame
///
/// The transport rate ($\omega_{en}^n$) is the rate of change of the local-level frame with
/// respect to the ECEF frame: the origin of the local-level frame moves with the body over the
/// curved surface of the WGS84 ellipsoid, so the frame itself rotates (Groves, eq. 5.44).
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in radians
/// - `altitude` - The WGS84 altitude in meters
/// - `velocity` - The velocity vector in the local-level frame (north, east, down) in m/s
///
/// # Returns
/// The transport rate vector in rad/s in the NED frame
///
/// # Example
/// ```rust
/// use nalgebra::Vector3;
/// use kinematics::earth;
/// let omega_en_n = earth::transport_rate(45.0_f64.to_radians(), 1000.0, &Vector3::new(10.0, 0.0, 0.0));
/// assert!(omega_en_n[1] < 0.0);
/// ```
pub fn transport_rate(latitude: f64, altitude: f64, velocity: &Vector3<f64>) -> Vector3<f64> {
    let (r_n, r_e, _) = principal_radii(latitude, altitude);
    Vector3::new(
        velocity[1] / (r_e + altitude),
        -velocity[0] / (r_n + altitude),
        -velocity[1] * latitude.tan() / (r_e + altitude),
    )
}

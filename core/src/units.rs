//! Unit-aware adapters
//!
//! The estimators work on raw `f64` values in SI base units (seconds, meters, m/s, radians). This module wraps the
//! [`uom`] quantities used by the unit-aware entry points and converts them into those raw values. Since every
//! conversion here is to or from an SI base unit, no scaling is applied and the unit-aware entry points return
//! bit-identical results to the raw ones.
use nalgebra::Vector3;
use std::time::Duration;
use uom::si::acceleration::meter_per_second_squared;
use uom::si::angle::radian;
use uom::si::angular_velocity::radian_per_second;
use uom::si::length::meter;
use uom::si::time::second;
use uom::si::velocity::meter_per_second;

pub use uom::si::f64::{Acceleration, Angle, AngularVelocity, Length, Time, Velocity};

/// Time elapsed between two navigation states, in seconds.
///
/// Accepts a raw `f64` of seconds, a `uom` [`Time`], or a [`Duration`]. No validation happens here, the estimators
/// reject negative and non-finite intervals.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct TimeInterval(pub f64);
impl TimeInterval {
    pub fn seconds(&self) -> f64 {
        self.0
    }
}
impl From<f64> for TimeInterval {
    fn from(seconds: f64) -> Self {
        TimeInterval(seconds)
    }
}
impl From<Time> for TimeInterval {
    fn from(time: Time) -> Self {
        TimeInterval(time.get::<second>())
    }
}
impl From<Duration> for TimeInterval {
    fn from(duration: Duration) -> Self {
        TimeInterval(duration.as_secs_f64())
    }
}

pub fn velocity_to_vector(velocity: &[Velocity; 3]) -> Vector3<f64> {
    Vector3::new(
        velocity[0].get::<meter_per_second>(),
        velocity[1].get::<meter_per_second>(),
        velocity[2].get::<meter_per_second>(),
    )
}
pub fn length_to_vector(position: &[Length; 3]) -> Vector3<f64> {
    Vector3::new(
        position[0].get::<meter>(),
        position[1].get::<meter>(),
        position[2].get::<meter>(),
    )
}
pub fn vector_to_acceleration(v: &Vector3<f64>) -> [Acceleration; 3] {
    [
        Acceleration::new::<meter_per_second_squared>(v[0]),
        Acceleration::new::<meter_per_second_squared>(v[1]),
        Acceleration::new::<meter_per_second_squared>(v[2]),
    ]
}
pub fn vector_to_angular_velocity(v: &Vector3<f64>) -> [AngularVelocity; 3] {
    [
        AngularVelocity::new::<radian_per_second>(v[0]),
        AngularVelocity::new::<radian_per_second>(v[1]),
        AngularVelocity::new::<radian_per_second>(v[2]),
    ]
}
/// Angle in radians
pub fn angle_to_radians(angle: &Angle) -> f64 {
    angle.get::<radian>()
}

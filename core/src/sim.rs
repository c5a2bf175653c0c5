//! Synthetic IMU generation from a known trajectory.
//!
//! This module provides:
//! - A struct (`TrajectoryRecord`) for reading and writing truth trajectories to/from CSV files
//! - A struct (`KinematicsRecord`) for the generated specific force and angular rate
//! - `SimulationConfig` for describing a generation run, stored as JSON, YAML, or TOML
//! - Functions for running any of the frame-specific estimators over a trajectory
//!
//! Each consecutive pair of trajectory records is one estimation request. The pairs are independent, so they can be
//! fanned out over threads with `rayon`; the output is identical either way.

use crate::inversion::KinematicsEstimator;
use crate::{
    BodyKinematics, ECEFKinematicsEstimator, ECIKinematicsEstimator, FrameTransform, FrameType,
    KinematicsError, NEDFrame, NEDKinematicsEstimator,
};

use clap::ValueEnum;
use nalgebra::Vector3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// A single truth navigation state, one row of the input CSV.
///
/// Position is geodetic (degrees and meters), velocity is local-level, and attitude is the body to NED roll, pitch,
/// and yaw in radians.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct TrajectoryRecord {
    /// Time in seconds
    pub time: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude above the WGS84 ellipsoid in meters
    pub altitude: f64,
    /// North velocity in m/s
    pub velocity_north: f64,
    /// East velocity in m/s
    pub velocity_east: f64,
    /// Down velocity in m/s
    pub velocity_down: f64,
    /// Roll angle in radians
    pub roll: f64,
    /// Pitch angle in radians
    pub pitch: f64,
    /// Yaw angle in radians
    pub yaw: f64,
}

impl TrajectoryRecord {
    /// Reads a CSV file and returns a vector of `TrajectoryRecord` structs.
    ///
    /// # Arguments
    /// * `path` - Path to the CSV file to read.
    ///
    /// # Returns
    /// * `Ok(Vec<TrajectoryRecord>)` if successful.
    /// * `Err` if the file cannot be read or parsed.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, Box<dyn std::error::Error>> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: Self = result?;
            records.push(record);
        }
        Ok(records)
    }
    /// Writes a slice of TrajectoryRecord structs to a CSV file.
    pub fn to_csv<P: AsRef<Path>>(records: &[Self], path: P) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
    /// The record as a local-level navigation state (angles converted to radians)
    pub fn to_ned_frame(&self) -> Result<NEDFrame, KinematicsError> {
        NEDFrame::new(
            self.latitude.to_radians(),
            self.longitude.to_radians(),
            self.altitude,
            Vector3::new(self.velocity_north, self.velocity_east, self.velocity_down),
            FrameTransform::from_euler_angles(
                FrameType::Body,
                FrameType::NED,
                self.roll,
                self.pitch,
                self.yaw,
            ),
        )
    }
}

/// Generated IMU readings for the interval ending at `time`, one row of the output CSV.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct KinematicsRecord {
    /// Time in seconds at the end of the interval
    pub time: f64,
    pub specific_force_x: f64,
    pub specific_force_y: f64,
    pub specific_force_z: f64,
    pub angular_rate_x: f64,
    pub angular_rate_y: f64,
    pub angular_rate_z: f64,
}

impl KinematicsRecord {
    pub fn new(time: f64, kinematics: &BodyKinematics) -> KinematicsRecord {
        KinematicsRecord {
            time,
            specific_force_x: kinematics.specific_force[0],
            specific_force_y: kinematics.specific_force[1],
            specific_force_z: kinematics.specific_force[2],
            angular_rate_x: kinematics.angular_rate[0],
            angular_rate_y: kinematics.angular_rate[1],
            angular_rate_z: kinematics.angular_rate[2],
        }
    }
    pub fn kinematics(&self) -> BodyKinematics {
        BodyKinematics::new(
            Vector3::new(
                self.specific_force_x,
                self.specific_force_y,
                self.specific_force_z,
            ),
            Vector3::new(self.angular_rate_x, self.angular_rate_y, self.angular_rate_z),
        )
    }
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, Box<dyn std::error::Error>> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: Self = result?;
            records.push(record);
        }
        Ok(records)
    }
    pub fn to_csv<P: AsRef<Path>>(records: &[Self], path: P) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Reference frame the trajectory is expressed in before estimation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NavigationFrame {
    #[default]
    #[value(name = "ned")]
    NED,
    #[value(name = "ecef")]
    ECEF,
    #[value(name = "eci")]
    ECI,
}
impl Display for NavigationFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationFrame::NED => "ned",
            NavigationFrame::ECEF => "ecef",
            NavigationFrame::ECI => "eci",
        };
        write!(f, "{}", name)
    }
}

/// Settings for one trajectory-to-IMU generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Input trajectory CSV file
    pub input: String,
    /// Output IMU CSV file
    pub output: String,
    /// Reference frame used for the estimation
    pub frame: NavigationFrame,
    /// Process intervals in parallel
    pub parallel: bool,
    /// Log level (off, error, warn, info, debug, trace)
    pub log_level: String,
    /// Optional log file; logs go to stderr when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}
impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            input: "trajectory.csv".to_string(),
            output: "imu.csv".to_string(),
            frame: NavigationFrame::NED,
            parallel: false,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}
impl SimulationConfig {
    /// Write the configuration as pretty JSON.
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(io::Error::other)
    }
    /// Read the configuration from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::other)
    }
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = serde_yaml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_yaml::from_reader(file).map_err(io::Error::other)
    }
    pub fn to_toml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = toml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    pub fn from_toml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut s = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut s)?;
        toml::from_str(&s).map_err(io::Error::other)
    }
    /// Generic write: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let p = path.as_ref();
        let ext = p
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());
        match ext.as_deref() {
            Some("json") => self.to_json(p),
            Some("yaml") | Some("yml") => self.to_yaml(p),
            Some("toml") => self.to_toml(p),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "unsupported file extension",
            )),
        }
    }
    /// Generic read: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let p = path.as_ref();
        let ext = p
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());
        match ext.as_deref() {
            Some("json") => Self::from_json(p),
            Some("yaml") | Some("yml") => Self::from_yaml(p),
            Some("toml") => Self::from_toml(p),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "unsupported file extension",
            )),
        }
    }
}

/// Estimate the IMU readings for one pair of consecutive records
fn step<E: KinematicsEstimator>(
    start_time: f64,
    old: &TrajectoryRecord,
    new: &TrajectoryRecord,
) -> Result<KinematicsRecord, KinematicsError> {
    let old_frame = E::express(&old.to_ned_frame()?, old.time - start_time)?;
    let frame = E::express(&new.to_ned_frame()?, new.time - start_time)?;
    let kinematics = E::estimate_frames(new.time - old.time, &frame, &old_frame)?;
    Ok(KinematicsRecord::new(new.time, &kinematics))
}

/// Run an estimator over every consecutive pair of records.
///
/// Produces one output record per interval, stamped with the time at the end of the interval. For ECI the first
/// record's time is taken as the epoch where ECI and ECEF coincide. Out-of-order timestamps fail with
/// [`KinematicsError::InvalidTimeInterval`] and duplicated timestamps produce zero readings.
pub fn generate_kinematics<E: KinematicsEstimator>(
    records: &[TrajectoryRecord],
    parallel: bool,
) -> Result<Vec<KinematicsRecord>, KinematicsError> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let start_time = first.time;
    log::debug!(
        "estimating {} intervals in the {} frame",
        records.len().saturating_sub(1),
        E::FRAME
    );
    if parallel {
        records
            .par_windows(2)
            .map(|pair| step::<E>(start_time, &pair[0], &pair[1]))
            .collect()
    } else {
        records
            .windows(2)
            .map(|pair| step::<E>(start_time, &pair[0], &pair[1]))
            .collect()
    }
}

/// Dispatch [`generate_kinematics`] on the chosen reference frame
pub fn run(
    records: &[TrajectoryRecord],
    frame: NavigationFrame,
    parallel: bool,
) -> Result<Vec<KinematicsRecord>, KinematicsError> {
    if records.len() < 2 {
        log::warn!(
            "{} trajectory record(s) supplied, at least two are needed to form an interval",
            records.len()
        );
    }
    let output = match frame {
        NavigationFrame::NED => generate_kinematics::<NEDKinematicsEstimator>(records, parallel),
        NavigationFrame::ECEF => generate_kinematics::<ECEFKinematicsEstimator>(records, parallel),
        NavigationFrame::ECI => generate_kinematics::<ECIKinematicsEstimator>(records, parallel),
    }?;
    log::debug!(
        "generated {} IMU records in the {} frame (parallel: {})",
        output.len(),
        frame,
        parallel
    );
    Ok(output)
}

/// Read the configured input, generate the IMU readings, and write the configured output.
///
/// Returns the number of records written.
pub fn run_from_config(config: &SimulationConfig) -> Result<usize, Box<dyn std::error::Error>> {
    let records = TrajectoryRecord::from_csv(&config.input)?;
    log::info!("read {} trajectory records from {}", records.len(), config.input);
    let output = run(&records, config.frame, config.parallel)?;
    KinematicsRecord::to_csv(&output, &config.output)?;
    log::info!("wrote {} IMU records to {}", output.len(), config.output);
    Ok(output.len())
}

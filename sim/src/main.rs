//! KINEMATICS SIM: Generate synthetic truth IMU readings from a known trajectory.
//!
//! Reads trajectory CSV files (geodetic position, NED velocity, and roll/pitch/yaw at each epoch), inverts the
//! strapdown mechanization between every pair of consecutive epochs, and writes the specific force and angular rate
//! an ideal IMU would have measured.
//!
//! You can run the tool either by:
//!   1. Loading all parameters from a configuration file (TOML/JSON/YAML)
//!   2. Specifying parameters via command-line flags

mod common;

use clap::{Args, Parser, Subcommand};
use common::{
    get_csv_files, init_logger, output_file_for, prepare_output_path, validate_input_path,
};
use kinematics::sim::{NavigationFrame, SimulationConfig, run_from_config};
use log::{error, info};
use rayon::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};

const LONG_ABOUT: &str = "KINEMATICS SIM: Generate synthetic truth IMU readings from a known trajectory.

The input is a CSV file, or a directory of CSV files, with the columns
time, latitude, longitude, altitude, velocity_north, velocity_east, velocity_down, roll, pitch, yaw
(seconds, degrees, meters, m/s, and radians). For every pair of consecutive rows the tool recovers the
specific force and angular rate, in body axes, that would have produced the change of state. The
estimation can be carried out in the NED, ECEF, or ECI frame.

You can run the tool either by:
  1. Loading all parameters from a configuration file (TOML/JSON/YAML)
  2. Specifying parameters via command-line flags";

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about = "Generate synthetic truth IMU readings from a known trajectory.", long_about = LONG_ABOUT)]
struct Cli {
    /// Run from a configuration file (TOML/JSON/YAML)
    /// This option overrides any subcommand arguments
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Command to execute (ignored if --config is provided)
    #[command(subcommand)]
    command: Option<Command>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log file path (if not specified, logs to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Process files and intervals in parallel
    #[arg(long, global = true)]
    parallel: bool,
}

/// Top-level commands
#[derive(Subcommand, Clone)]
enum Command {
    #[command(
        name = "run",
        about = "Generate IMU readings from trajectory data",
        long_about = "Generate IMU readings from one trajectory CSV file or a directory of them. With a directory, the output is treated as a directory and each result is written as {input_stem}_imu.csv."
    )]
    Run(RunArgs),
    #[command(name = "create-config", about = "Write a template configuration file")]
    CreateConfig(CreateConfigArgs),
}

/// Arguments for the run command
#[derive(Args, Clone, Debug)]
struct RunArgs {
    /// Input CSV file path or directory containing CSV files
    #[arg(short, long, value_parser)]
    input: PathBuf,

    /// Output CSV file path, or directory when the input is a directory
    #[arg(short, long, value_parser)]
    output: PathBuf,

    /// Reference frame used for the estimation
    #[arg(short, long, value_enum, default_value_t = NavigationFrame::NED)]
    frame: NavigationFrame,
}

/// Arguments for create-config command
#[derive(Args, Clone, Debug)]
struct CreateConfigArgs {
    /// Output file path for the config file
    /// File extension determines format: .json, .yaml/.yml, or .toml
    #[arg(short, long, value_parser)]
    output: PathBuf,

    /// Reference frame for the template
    #[arg(short, long, value_enum, default_value_t = NavigationFrame::NED)]
    frame: NavigationFrame,
}

/// Process a single trajectory file
fn process_file(
    input_file: &Path,
    output_file: &Path,
    config: &SimulationConfig,
) -> Result<usize, Box<dyn Error>> {
    info!("Processing file: {}", input_file.display());
    let file_config = SimulationConfig {
        input: input_file.to_string_lossy().to_string(),
        output: output_file.to_string_lossy().to_string(),
        ..config.clone()
    };
    run_from_config(&file_config)
}

/// Run every trajectory file named by the configuration
fn execute(config: &SimulationConfig) -> Result<(), Box<dyn Error>> {
    info!("Frame: {}", config.frame);
    info!("Input: {}", config.input);
    info!("Output: {}", config.output);
    info!("Parallel: {}", config.parallel);

    let input = Path::new(&config.input);
    let output = Path::new(&config.output);
    validate_input_path(input)?;
    let csv_files = get_csv_files(input)?;
    let is_multiple = input.is_dir();
    prepare_output_path(output, is_multiple)?;

    if is_multiple {
        info!("Processing {} CSV files from directory", csv_files.len());
    }

    let failures: Vec<(PathBuf, String)> = if config.parallel && csv_files.len() > 1 {
        csv_files
            .par_iter()
            .filter_map(|input_file| {
                let output_file = output_file_for(input_file, output, is_multiple);
                process_file(input_file, &output_file, config)
                    .err()
                    .map(|e| (input_file.clone(), e.to_string()))
            })
            .collect()
    } else {
        let mut failures = Vec::new();
        for input_file in &csv_files {
            let output_file = output_file_for(input_file, output, is_multiple);
            if let Err(e) = process_file(input_file, &output_file, config) {
                if !is_multiple {
                    return Err(e);
                }
                failures.push((input_file.clone(), e.to_string()));
            }
        }
        failures
    };

    if !failures.is_empty() {
        for (file, err) in &failures {
            error!("Error processing {}: {}", file.display(), err);
        }
        return Err(format!("{} file(s) failed to process", failures.len()).into());
    }
    Ok(())
}

/// Write a template configuration
fn create_config_file(args: &CreateConfigArgs) -> Result<(), Box<dyn Error>> {
    let config = SimulationConfig {
        frame: args.frame,
        ..Default::default()
    };
    prepare_output_path(&args.output, false)?;
    config.to_file(&args.output)?;
    println!("Configuration file created: {}", args.output.display());
    println!("\nYou can now run the tool with:");
    println!("  kinematics-sim --config {}", args.output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // --config wins over any subcommand; CLI log file and parallel flag still apply
    if let Some(ref config_path) = cli.config {
        let mut config = SimulationConfig::from_file(config_path)?;
        let config_log_file = config.log_file.as_ref().map(PathBuf::from);
        let log_file = cli.log_file.as_ref().or(config_log_file.as_ref());
        init_logger(&config.log_level, log_file.map(PathBuf::as_path))?;
        info!("Loaded configuration from {}", config_path.display());
        if cli.parallel {
            config.parallel = true;
        }
        return execute(&config);
    }

    init_logger(&cli.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Some(Command::Run(args)) => {
            let config = SimulationConfig {
                input: args.input.to_string_lossy().to_string(),
                output: args.output.to_string_lossy().to_string(),
                frame: args.frame,
                parallel: cli.parallel,
                log_level: cli.log_level.clone(),
                log_file: cli
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
            };
            execute(&config)
        }
        Some(Command::CreateConfig(args)) => create_config_file(&args),
        None => {
            eprintln!("Error: No command provided. Use -h or --help for usage information.");
            std::process::exit(1);
        }
    }
}

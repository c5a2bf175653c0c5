//! Shared helpers for the command line tool: logger setup and input/output path handling.

use std::error::Error;
use std::path::{Path, PathBuf};

/// Initialize the logger.
///
/// # Arguments
/// * `log_level` - Log level string (off, error, warn, info, debug, trace)
/// * `log_file` - Optional path to log file (logs to stderr if None)
///
/// # Errors
/// Returns an error if the log file cannot be opened or a logger is already installed.
pub fn init_logger(log_level: &str, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    use std::io::Write;

    let level = log_level.parse::<log::LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
        log::LevelFilter::Info
    });

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if let Some(log_path) = log_file {
        create_parent_dir(log_path)?;
        let target = Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.try_init()?;
    Ok(())
}

fn create_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Validate that the input path exists and is either a file or directory.
pub fn validate_input_path(input: &Path) -> Result<(), Box<dyn Error>> {
    if !input.exists() {
        return Err(format!("Input path '{}' does not exist.", input.display()).into());
    }
    if !input.is_file() && !input.is_dir() {
        return Err(format!(
            "Input path '{}' is neither a file nor a directory.",
            input.display()
        )
        .into());
    }
    Ok(())
}

/// Get all trajectory CSV files from a path (either a single file or every CSV in a directory).
///
/// # Returns
/// A sorted vector of PathBuf for each CSV file found.
///
/// # Errors
/// Returns an error if the input file is not a CSV, the directory holds no CSV files, or the path is neither a file
/// nor a directory.
pub fn get_csv_files(input: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    if input.is_file() {
        if input.extension().and_then(|s| s.to_str()) != Some("csv") {
            return Err(format!("Input file '{}' is not a CSV file.", input.display()).into());
        }
        Ok(vec![input.to_path_buf()])
    } else if input.is_dir() {
        let mut csv_files: Vec<PathBuf> = std::fs::read_dir(input)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("csv")
            })
            .collect();

        if csv_files.is_empty() {
            return Err(format!("No CSV files found in directory '{}'.", input.display()).into());
        }

        csv_files.sort();
        Ok(csv_files)
    } else {
        Err(format!(
            "Input path '{}' is neither a file nor a directory.",
            input.display()
        )
        .into())
    }
}

/// Create the directories an output needs.
///
/// With several inputs `output` is a directory and is created itself, otherwise it is a file and only its parent
/// is created.
pub fn prepare_output_path(output: &Path, multiple: bool) -> Result<(), Box<dyn Error>> {
    if multiple {
        std::fs::create_dir_all(output)?;
    } else {
        create_parent_dir(output)?;
    }
    Ok(())
}

/// Output file for one input: `output` itself for a single input, `{output}/{input_stem}_imu.csv` otherwise.
pub fn output_file_for(input_file: &Path, output: &Path, multiple: bool) -> PathBuf {
    if !multiple {
        return output.to_path_buf();
    }
    let stem = input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("trajectory");
    output.join(format!("{}_imu.csv", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_validate_input_path_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");
        File::create(&file_path).unwrap();

        assert!(validate_input_path(&file_path).is_ok());
    }

    #[test]
    fn test_validate_input_path_nonexistent() {
        let result = validate_input_path(Path::new("/nonexistent/path"));
        assert!(result.is_err());
    }

    #[test]
    fn test_get_csv_files_single_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");
        File::create(&file_path).unwrap();

        let result = get_csv_files(&file_path).unwrap();
        assert_eq!(result, vec![file_path]);
    }

    #[test]
    fn test_get_csv_files_directory() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("b.csv")).unwrap();
        File::create(dir.path().join("a.csv")).unwrap();
        File::create(dir.path().join("c.txt")).unwrap();

        let result = get_csv_files(dir.path()).unwrap();
        assert_eq!(result, vec![dir.path().join("a.csv"), dir.path().join("b.csv")]);
    }

    #[test]
    fn test_get_csv_files_rejects_non_csv_and_empty_dir() {
        let dir = tempdir().unwrap();
        assert!(get_csv_files(dir.path()).is_err());
        let file_path = dir.path().join("test.txt");
        File::create(&file_path).unwrap();
        assert!(get_csv_files(&file_path).is_err());
    }

    #[test]
    fn test_prepare_output_path() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("runs").join("imu.csv");
        prepare_output_path(&nested, false).unwrap();
        assert!(dir.path().join("runs").is_dir());
        assert!(!nested.exists());

        let out_dir = dir.path().join("batch");
        prepare_output_path(&out_dir, true).unwrap();
        assert!(out_dir.is_dir());
    }

    #[test]
    fn test_output_file_for() {
        let input = Path::new("data/flight_01.csv");
        assert_eq!(
            output_file_for(input, Path::new("out.csv"), false),
            PathBuf::from("out.csv")
        );
        assert_eq!(
            output_file_for(input, Path::new("out"), true),
            PathBuf::from("out/flight_01_imu.csv")
        );
    }
}

use std::path::PathBuf;

use thiserror::Error;
use demography::DemographyError;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Invalid sampling scheme")]
    Sampling(#[from] DemographyError),

    #[error("Invalid simulation parameter: {name} = {value}. {expected}")]
    InvalidParameter{name: &'static str, value: f64, expected: &'static str},

    #[error("Failed to write simulation results into {}", .path.display())]
    IOError{path: PathBuf, #[source] source: std::io::Error},
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to create a working directory for the simulation engine")]
    Workdir(#[source] std::io::Error),

    #[error("Failed to spawn '{program}'")]
    Spawn{program: String, #[source] source: std::io::Error},

    #[error("'{program}' failed with {status}. stderr:\n{stderr}")]
    ExitStatus{program: String, status: String, stderr: String},

    #[error("'{program}' did not produce the expected output file {}", .path.display())]
    MissingOutput{program: String, path: PathBuf},
}

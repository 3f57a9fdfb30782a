use gpuwatch_hardware::HardwareError;
use thiserror::Error;

/// Exporter error types. Every variant is fatal to the sampling loop.
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Unable to get metrics: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Unable to marshal metrics to JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unable to write metrics: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to publish metrics to CloudWatch: {0}")]
    Publish(String),

    #[error("Unable to read instance metadata: {0}")]
    InstanceMetadata(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, ExporterError>;

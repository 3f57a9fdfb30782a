use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ExporterError, Result};

/// Storage resolutions accepted by CloudWatch (seconds)
pub const HIGH_RESOLUTION: i32 = 1;
pub const STANDARD_RESOLUTION: i32 = 60;

/// Exporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Zero-based NVML device index
    #[serde(default)]
    pub device_index: u32,

    /// Sampling period in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Where records go
    #[serde(default)]
    pub sink: SinkKind,

    /// Line format of the console sink
    #[serde(default)]
    pub format: OutputFormat,

    /// CloudWatch settings, only read when `sink = "cloudwatch"`
    #[serde(default)]
    pub cloudwatch: CloudWatchConfig,
}

/// CloudWatch sink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudWatchConfig {
    /// Metric namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Storage resolution in seconds (1 or 60)
    #[serde(default = "default_storage_resolution")]
    pub storage_resolution: i32,

    /// EC2 instance id dimension; looked up from instance metadata when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    /// EC2 instance type dimension; looked up from instance metadata when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// AWS region override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Metric sink selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Print records to stdout
    #[default]
    Console,

    /// Publish records with PutMetricData
    CloudWatch,
}

/// Console line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,

    /// `temperature,power,gpu_usage,memory_total,memory_used`
    Csv,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            interval_secs: default_interval_secs(),
            sink: SinkKind::default(),
            format: OutputFormat::default(),
            cloudwatch: CloudWatchConfig::default(),
        }
    }
}

impl Default for CloudWatchConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            storage_resolution: default_storage_resolution(),
            instance_id: None,
            instance_type: None,
            region: None,
        }
    }
}

impl ExporterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Reject settings the loop or the sinks cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(ExporterError::InvalidConfiguration(
                "interval must be at least one second".to_string(),
            ));
        }

        if self.sink == SinkKind::CloudWatch {
            self.cloudwatch.validate()?;
        }

        Ok(())
    }
}

impl CloudWatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(ExporterError::InvalidConfiguration(
                "CloudWatch namespace must not be empty".to_string(),
            ));
        }

        if !matches!(
            self.storage_resolution,
            HIGH_RESOLUTION | STANDARD_RESOLUTION
        ) {
            return Err(ExporterError::InvalidConfiguration(format!(
                "storage resolution must be {} or {}, got {}",
                HIGH_RESOLUTION, STANDARD_RESOLUTION, self.storage_resolution
            )));
        }

        Ok(())
    }
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" | "stdout" => Ok(Self::Console),
            "cloudwatch" => Ok(Self::CloudWatch),
            other => Err(format!("unknown sink: {}", other)),
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => f.write_str("console"),
            Self::CloudWatch => f.write_str("cloudwatch"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

// Default value functions for serde
fn default_interval_secs() -> u64 { 5 }
fn default_namespace() -> String { "gpuwatch".to_string() }
fn default_storage_resolution() -> i32 { STANDARD_RESOLUTION }

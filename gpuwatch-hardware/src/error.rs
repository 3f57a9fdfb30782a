use thiserror::Error;

#[derive(Error, Debug)]
pub enum HardwareError {
    #[error("Unable to initialize NVML: {0}")]
    Init(String),

    #[error("Unable to shutdown NVML: {0}")]
    Shutdown(String),

    #[error("Unable to get device count: {0}")]
    DeviceCount(String),

    #[error("Device index {index} out of range ({count} device(s) present)")]
    InvalidDeviceIndex { index: u32, count: u32 },

    #[error("Unable to get device at index {index}: {reason}")]
    DeviceHandle { index: u32, reason: String },

    #[error("Unable to get uuid of device at index {index}: {reason}")]
    DeviceUuid { index: u32, reason: String },

    #[error("Unable to read {metric}: {reason}")]
    Read { metric: &'static str, reason: String },
}

impl HardwareError {
    /// Failed telemetry read with the library's error string attached
    pub fn read(metric: &'static str, reason: impl ToString) -> Self {
        Self::Read {
            metric,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HardwareError>;

//! GPU telemetry access for gpuwatch.
//!
//! Wraps one NVML device behind the [`GpuDevice`] trait and turns its raw
//! readings into [`Metrics`] records.

// Re-export main components for easy access
pub use device::{sample, GpuDevice};
pub use error::{HardwareError, Result};
pub use metrics::{bytes_to_gib, milliwatts_to_watts, MemoryUsage, Metrics};
pub use nvml::{check_device_index, NvmlDevice, NvmlLibrary};

pub mod device;
pub mod error;
pub mod metrics;
pub mod nvml;

/// Version of the gpuwatch-hardware library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

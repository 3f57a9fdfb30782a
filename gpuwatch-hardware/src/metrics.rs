use serde::Serialize;
use std::fmt;

/// Bytes per GiB
const BYTES_PER_GIB: f32 = (1u64 << 30) as f32;

/// One telemetry snapshot of a single GPU
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub temperature: u32,  // Celsius
    pub power: f32,        // Watts
    pub gpu_usage: u32,    // Percentage
    pub memory_total: f32, // GiB
    pub memory_used: f32,  // GiB
}

/// Framebuffer memory of a device, in GiB
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub total: f32,
    pub used: f32,
}

impl MemoryUsage {
    pub fn from_bytes(total: u64, used: u64) -> Self {
        Self {
            total: bytes_to_gib(total),
            used: bytes_to_gib(used),
        }
    }
}

/// Delimited form: `temperature,power,gpu_usage,memory_total,memory_used`
impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{:.2},{},{:.1},{:.2}",
            self.temperature, self.power, self.gpu_usage, self.memory_total, self.memory_used
        )
    }
}

/// Convert an NVML power reading (mW) to watts
pub fn milliwatts_to_watts(milliwatts: u32) -> f32 {
    milliwatts as f32 / 1000.0
}

/// Convert a byte count to GiB
pub fn bytes_to_gib(bytes: u64) -> f32 {
    bytes as f32 / BYTES_PER_GIB
}

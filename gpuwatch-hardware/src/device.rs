use tracing::trace;

use crate::error::Result;
use crate::metrics::{MemoryUsage, Metrics};

/// Read-only telemetry access to one GPU.
///
/// Each read is a single pass-through to the management library, already
/// converted to the units of [`Metrics`].
#[cfg_attr(test, mockall::automock)]
pub trait GpuDevice {
    /// Zero-based index the device was resolved from
    fn index(&self) -> u32;

    /// GPU die temperature in Celsius
    fn temperature(&self) -> Result<u32>;

    /// Current power draw in watts
    fn power(&self) -> Result<f32>;

    /// GPU utilization in percent
    fn utilization(&self) -> Result<u32>;

    /// Total and used framebuffer memory in GiB
    fn memory(&self) -> Result<MemoryUsage>;
}

/// Read all telemetry values and build one record.
///
/// The first failing read aborts the sample, so a record is either complete
/// or not produced at all.
pub fn sample<D: GpuDevice + ?Sized>(device: &D) -> Result<Metrics> {
    let temperature = device.temperature()?;
    let power = device.power()?;
    let memory = device.memory()?;
    let gpu_usage = device.utilization()?;

    trace!(
        index = device.index(),
        temperature,
        power,
        gpu_usage,
        "sampled device"
    );

    Ok(Metrics {
        temperature,
        power,
        gpu_usage,
        memory_total: memory.total,
        memory_used: memory.used,
    })
}

use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::{Device, Nvml};
use tracing::{debug, info, warn};

use crate::device::GpuDevice;
use crate::error::{HardwareError, Result};
use crate::metrics::{milliwatts_to_watts, MemoryUsage};

/// Initialized NVML library.
///
/// Devices borrow from the library, so it has to outlive every handle it
/// hands out. Shutting down consumes it.
pub struct NvmlLibrary {
    nvml: Nvml,
}

impl NvmlLibrary {
    /// Initialize NVML. Must happen once before any device query.
    pub fn init() -> Result<Self> {
        info!("Initializing NVML");

        let nvml = Nvml::init().map_err(|e| {
            warn!("Failed to initialize NVML: {}", e);
            HardwareError::Init(e.to_string())
        })?;

        if let Ok(version) = nvml.sys_driver_version() {
            debug!("NVIDIA driver version {}", version);
        }

        Ok(Self { nvml })
    }

    /// Number of devices visible to NVML
    pub fn device_count(&self) -> Result<u32> {
        self.nvml
            .device_count()
            .map_err(|e| HardwareError::DeviceCount(e.to_string()))
    }

    /// Resolve the device at `index` along with its UUID.
    ///
    /// The index is validated against the device count before a handle is
    /// requested, so an out-of-range index never reaches a telemetry read.
    pub fn device(&self, index: u32) -> Result<NvmlDevice<'_>> {
        open_checked(index, || self.device_count(), |index| self.open(index))
    }

    fn open(&self, index: u32) -> Result<NvmlDevice<'_>> {
        let device = self
            .nvml
            .device_by_index(index)
            .map_err(|e| HardwareError::DeviceHandle {
                index,
                reason: e.to_string(),
            })?;

        let uuid = device.uuid().map_err(|e| HardwareError::DeviceUuid {
            index,
            reason: e.to_string(),
        })?;

        let name = device.name().unwrap_or_else(|_| "Unknown GPU".into());
        info!("Using GPU {}: {} ({})", index, name, uuid);

        Ok(NvmlDevice {
            index,
            uuid,
            name,
            device,
        })
    }

    /// Shut NVML down. Consuming the library makes a second shutdown
    /// impossible.
    pub fn shutdown(self) -> Result<()> {
        info!("Shutting down NVML");
        self.nvml
            .shutdown()
            .map_err(|e| HardwareError::Shutdown(e.to_string()))
    }
}

// Nothing is opened unless the index is in range
fn open_checked<T>(
    index: u32,
    count: impl FnOnce() -> Result<u32>,
    open: impl FnOnce(u32) -> Result<T>,
) -> Result<T> {
    check_device_index(index, count()?)?;
    open(index)
}

/// Fail unless `index` addresses one of `count` devices
pub fn check_device_index(index: u32, count: u32) -> Result<()> {
    if index >= count {
        return Err(HardwareError::InvalidDeviceIndex { index, count });
    }
    Ok(())
}

/// One GPU resolved through NVML
pub struct NvmlDevice<'nvml> {
    index: u32,
    uuid: String,
    name: String,
    device: Device<'nvml>,
}

impl NvmlDevice<'_> {
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl GpuDevice for NvmlDevice<'_> {
    fn index(&self) -> u32 {
        self.index
    }

    fn temperature(&self) -> Result<u32> {
        self.device
            .temperature(TemperatureSensor::Gpu)
            .map_err(|e| HardwareError::read("temperature", e))
    }

    fn power(&self) -> Result<f32> {
        self.device
            .power_usage()
            .map(milliwatts_to_watts)
            .map_err(|e| HardwareError::read("power usage", e))
    }

    fn utilization(&self) -> Result<u32> {
        self.device
            .utilization_rates()
            .map(|u| u.gpu)
            .map_err(|e| HardwareError::read("utilization rates", e))
    }

    fn memory(&self) -> Result<MemoryUsage> {
        self.device
            .memory_info()
            .map(|m| MemoryUsage::from_bytes(m.total, m.used))
            .map_err(|e| HardwareError::read("memory info", e))
    }
}

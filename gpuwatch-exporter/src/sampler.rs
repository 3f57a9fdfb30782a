use gpuwatch_hardware::{sample, GpuDevice, Metrics};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{ExporterError, Result};
use crate::sink::MetricsSink;

/// Default sampling period
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Periodically samples one device and hands each record to a sink
pub struct Sampler<D, S> {
    device: D,
    sink: S,
    interval: Duration,
    max_ticks: Option<u64>,
}

impl<D: GpuDevice, S: MetricsSink> Sampler<D, S> {
    pub fn new(device: D, sink: S, interval: Duration) -> Self {
        Self {
            device,
            sink,
            interval,
            max_ticks: None,
        }
    }

    /// Stop after emitting `ticks` records instead of running forever
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (D, S) {
        (self.device, self.sink)
    }

    /// Sample once and emit the record. Nothing reaches the sink unless
    /// every read succeeded.
    pub async fn tick(&mut self) -> Result<Metrics> {
        let metrics = sample(&self.device)?;
        self.sink.emit(&metrics).await?;
        debug!(
            temperature = metrics.temperature,
            power = metrics.power,
            gpu_usage = metrics.gpu_usage,
            "Emitted metrics to {}",
            self.sink.name()
        );
        Ok(metrics)
    }

    /// Tick at a fixed rate, starting immediately.
    ///
    /// Returns the number of records emitted once the tick limit is reached,
    /// or the first error. Without a limit it only returns on error.
    pub async fn run(&mut self) -> Result<u64> {
        if self.interval.is_zero() {
            return Err(ExporterError::InvalidConfiguration(
                "sampling interval must be non-zero".to_string(),
            ));
        }

        info!(
            "Sampling GPU {} every {:?} into {}",
            self.device.index(),
            self.interval,
            self.sink.name()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut emitted = 0u64;
        loop {
            if self.max_ticks.is_some_and(|max| emitted >= max) {
                info!("Emitted {} record(s), stopping", emitted);
                return Ok(emitted);
            }

            ticker.tick().await;
            self.tick().await?;
            emitted += 1;
        }
    }
}

//! Destinations for metrics records.

use async_trait::async_trait;
use gpuwatch_hardware::Metrics;

use crate::error::Result;

pub mod cloudwatch;
pub mod console;

pub use cloudwatch::{CloudWatchSink, InstanceIdentity};
pub use console::ConsoleSink;

/// Receives one record per sampling tick
#[async_trait]
pub trait MetricsSink: Send {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Emit one record. A failure ends the sampling loop.
    async fn emit(&mut self, metrics: &Metrics) -> Result<()>;
}

#[async_trait]
impl<S: MetricsSink + ?Sized> MetricsSink for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn emit(&mut self, metrics: &Metrics) -> Result<()> {
        (**self).emit(metrics).await
    }
}

//! gpuwatch exporter
//!
//! Samples one GPU at a fixed interval and emits every record to a single
//! sink: stdout (JSON or CSV lines) or CloudWatch.
//!
//! # Example
//!
//! ```no_run
//! use gpuwatch_exporter::{ConsoleSink, OutputFormat, Sampler, DEFAULT_INTERVAL};
//! use gpuwatch_hardware::NvmlLibrary;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let library = NvmlLibrary::init()?;
//!     {
//!         let device = library.device(0)?;
//!         let sink = ConsoleSink::stdout(OutputFormat::Json);
//!         Sampler::new(device, sink, DEFAULT_INTERVAL).run().await?;
//!     }
//!     library.shutdown()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod sampler;
pub mod shutdown;
pub mod sink;

// Re-export main types
pub use config::{CloudWatchConfig, ExporterConfig, OutputFormat, SinkKind};
pub use error::{ExporterError, Result};
pub use sampler::{Sampler, DEFAULT_INTERVAL};
pub use shutdown::{Watchdog, SHUTDOWN_GRACE};
pub use sink::{CloudWatchSink, ConsoleSink, InstanceIdentity, MetricsSink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

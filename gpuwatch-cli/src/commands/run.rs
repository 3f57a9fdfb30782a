use anyhow::{Context, Result};
use clap::Args;
use gpuwatch_exporter::{
    CloudWatchSink, ConsoleSink, ExporterConfig, MetricsSink, OutputFormat, Sampler, SinkKind,
    Watchdog, SHUTDOWN_GRACE,
};
use gpuwatch_hardware::NvmlLibrary;
use std::process;
use tracing::info;

use crate::config::{load_config, render_config};

/// Sample a GPU and export its telemetry
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// GPU index to sample
    #[arg(short, long)]
    pub device: Option<u32>,

    /// Sampling interval in seconds
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Console output format (json, csv)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Metrics sink (console, cloudwatch)
    #[arg(short, long)]
    pub sink: Option<SinkKind>,

    /// CloudWatch namespace
    #[arg(long)]
    pub namespace: Option<String>,

    /// CloudWatch storage resolution in seconds (1 or 60)
    #[arg(long)]
    pub resolution: Option<i32>,

    /// EC2 instance id dimension
    #[arg(long, env = "GPUWATCH_INSTANCE_ID")]
    pub instance_id: Option<String>,

    /// EC2 instance type dimension
    #[arg(long, env = "GPUWATCH_INSTANCE_TYPE")]
    pub instance_type: Option<String>,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,

    /// Stop after this many records
    #[arg(short = 'n', long)]
    pub count: Option<u64>,

    /// Dry run - validate config without sampling
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut ExporterConfig) {
        if let Some(device) = self.device {
            config.device_index = device;
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(sink) = self.sink {
            config.sink = sink;
        }

        let cloudwatch = &mut config.cloudwatch;
        if let Some(namespace) = &self.namespace {
            cloudwatch.namespace = namespace.clone();
        }
        if let Some(resolution) = self.resolution {
            cloudwatch.storage_resolution = resolution;
        }
        if let Some(instance_id) = &self.instance_id {
            cloudwatch.instance_id = Some(instance_id.clone());
        }
        if let Some(instance_type) = &self.instance_type {
            cloudwatch.instance_type = Some(instance_type.clone());
        }
        if let Some(region) = &self.region {
            cloudwatch.region = Some(region.clone());
        }
    }
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut config = load_config()?;
    args.apply(&mut config);
    config.validate()?;

    if args.dry_run {
        println!("{}", render_config(&config)?);
        return Ok(());
    }

    // Registered before setup so an early signal still reaches the watchdog
    let signals = Signals::install().context("Unable to install signal handlers")?;
    let mut watchdog = Watchdog::spawn(signals.recv(), SHUTDOWN_GRACE, || process::exit(130));

    let sink = build_sink(&config).await?;

    let library = NvmlLibrary::init()?;
    let outcome = export(&library, &config, sink, args.count, &mut watchdog).await;

    // Shut down even when sampling failed, then report the sampling error first
    let shutdown = library.shutdown();
    watchdog.finish();
    outcome?;
    shutdown?;

    Ok(())
}

async fn build_sink(config: &ExporterConfig) -> Result<Box<dyn MetricsSink>> {
    Ok(match config.sink {
        SinkKind::Console => Box::new(ConsoleSink::stdout(config.format)),
        SinkKind::CloudWatch => Box::new(
            CloudWatchSink::from_config(&config.cloudwatch)
                .await
                .context("Unable to set up CloudWatch sink")?,
        ),
    })
}

async fn export(
    library: &NvmlLibrary,
    config: &ExporterConfig,
    sink: Box<dyn MetricsSink>,
    count: Option<u64>,
    watchdog: &mut Watchdog,
) -> Result<()> {
    let device = library
        .device(config.device_index)
        .context("Unable to get device")?;

    let mut sampler = Sampler::new(device, sink, config.interval());
    if let Some(count) = count {
        sampler = sampler.with_max_ticks(count);
    }

    tokio::select! {
        biased;
        _ = watchdog.stopped() => {}
        result = sampler.run() => {
            result?;
        }
    }

    info!("Sampling stopped");
    Ok(())
}

/// Termination signal listeners, registered as soon as they are created
#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct Signals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl Signals {
    fn install() -> Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(mut self) -> &'static str {
        self.ctrl_c.recv().await;
        "Ctrl-C"
    }
}

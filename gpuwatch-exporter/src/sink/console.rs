use async_trait::async_trait;
use gpuwatch_hardware::Metrics;
use std::io::{self, Write};

use super::MetricsSink;
use crate::config::OutputFormat;
use crate::error::Result;

/// Writes one line per record, flushing after each
pub struct ConsoleSink<W> {
    writer: W,
    format: OutputFormat,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Render a record without the trailing newline
    pub fn render(&self, metrics: &Metrics) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string(metrics)?,
            OutputFormat::Csv => metrics.to_string(),
        })
    }
}

#[async_trait]
impl<W: Write + Send> MetricsSink for ConsoleSink<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn emit(&mut self, metrics: &Metrics) -> Result<()> {
        let line = self.render(metrics)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

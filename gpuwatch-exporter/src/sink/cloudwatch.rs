use async_trait::async_trait;
use aws_config::imds;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use aws_sdk_cloudwatch::Client;
use gpuwatch_hardware::Metrics;
use tracing::{debug, info};

use super::MetricsSink;
use crate::config::CloudWatchConfig;
use crate::error::{ExporterError, Result};

const INSTANCE_ID_PATH: &str = "/latest/meta-data/instance-id";
const INSTANCE_TYPE_PATH: &str = "/latest/meta-data/instance-type";

/// Instance the metrics are attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceIdentity {
    pub instance_id: String,
    pub instance_type: String,
}

impl InstanceIdentity {
    pub fn new(instance_id: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            instance_type: instance_type.into(),
        }
    }

    /// Take the identity from configuration, asking the EC2 instance metadata
    /// service for whatever is missing
    pub async fn resolve(config: &CloudWatchConfig) -> Result<Self> {
        if let (Some(id), Some(kind)) = (&config.instance_id, &config.instance_type) {
            return Ok(Self::new(id.clone(), kind.clone()));
        }

        debug!("Looking up instance identity from instance metadata");
        let client = imds::Client::builder().build();

        let instance_id = match &config.instance_id {
            Some(id) => id.clone(),
            None => fetch_metadata(&client, INSTANCE_ID_PATH).await?,
        };
        let instance_type = match &config.instance_type {
            Some(kind) => kind.clone(),
            None => fetch_metadata(&client, INSTANCE_TYPE_PATH).await?,
        };

        Ok(Self::new(instance_id, instance_type))
    }

    /// Dimensions attached to every datum
    pub fn dimensions(&self) -> Vec<Dimension> {
        vec![
            Dimension::builder()
                .name("InstanceId")
                .value(&self.instance_id)
                .build(),
            Dimension::builder()
                .name("InstanceType")
                .value(&self.instance_type)
                .build(),
        ]
    }
}

async fn fetch_metadata(client: &imds::Client, path: &str) -> Result<String> {
    let value = client
        .get(path)
        .await
        .map_err(|e| ExporterError::InstanceMetadata(format!("{}: {}", path, e)))?;
    Ok(value.as_ref().to_owned())
}

/// Map a record to the data of one PutMetricData call
pub fn metric_data(
    metrics: &Metrics,
    dimensions: &[Dimension],
    resolution: i32,
) -> Vec<MetricDatum> {
    let datum = |name: &str, unit: StandardUnit, value: f64| {
        MetricDatum::builder()
            .metric_name(name)
            .set_dimensions(Some(dimensions.to_vec()))
            .unit(unit)
            .storage_resolution(resolution)
            .value(value)
            .build()
    };

    vec![
        datum("GPU Usage", StandardUnit::Percent, f64::from(metrics.gpu_usage)),
        datum("Memory Used", StandardUnit::Gigabytes, f64::from(metrics.memory_used)),
        datum("Temperature (C)", StandardUnit::None, f64::from(metrics.temperature)),
        datum("Power (W)", StandardUnit::None, f64::from(metrics.power)),
    ]
}

/// Publishes each record as one batched PutMetricData call
pub struct CloudWatchSink {
    client: Client,
    namespace: String,
    resolution: i32,
    dimensions: Vec<Dimension>,
}

impl CloudWatchSink {
    pub fn new(
        client: Client,
        namespace: impl Into<String>,
        resolution: i32,
        identity: &InstanceIdentity,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            resolution,
            dimensions: identity.dimensions(),
        }
    }

    /// Build a client from the default AWS credential chain and resolve the
    /// instance identity
    pub async fn from_config(config: &CloudWatchConfig) -> Result<Self> {
        config.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let identity = InstanceIdentity::resolve(config).await?;
        info!(
            "Publishing to CloudWatch namespace {} as {} ({})",
            config.namespace, identity.instance_id, identity.instance_type
        );

        Ok(Self::new(
            Client::new(&sdk_config),
            config.namespace.clone(),
            config.storage_resolution,
            &identity,
        ))
    }
}

#[async_trait]
impl MetricsSink for CloudWatchSink {
    fn name(&self) -> &'static str {
        "cloudwatch"
    }

    async fn emit(&mut self, metrics: &Metrics) -> Result<()> {
        let data = metric_data(metrics, &self.dimensions, self.resolution);

        self.client
            .put_metric_data()
            .namespace(&self.namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map_err(|e| ExporterError::Publish(DisplayErrorContext(&e).to_string()))?;

        debug!("Published metrics to {}", self.namespace);
        Ok(())
    }
}

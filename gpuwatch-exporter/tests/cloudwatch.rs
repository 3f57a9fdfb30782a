use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_cloudwatch::Client;
use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
use aws_smithy_types::body::SdkBody;
use gpuwatch_exporter::{CloudWatchSink, ExporterError, InstanceIdentity, MetricsSink};
use gpuwatch_hardware::Metrics;
use tokio_test::{assert_err, assert_ok};

const NAMESPACE: &str = "gpuwatch-fleet";

fn metrics() -> Metrics {
    Metrics {
        temperature: 71,
        power: 301.5,
        gpu_usage: 96,
        memory_total: 80.0,
        memory_used: 62.25,
    }
}

/// HTTP client answering a single request with `status`
fn replay(status: u16) -> StaticReplayClient {
    StaticReplayClient::new(vec![ReplayEvent::new(
        http::Request::builder()
            .uri("https://monitoring.us-east-1.amazonaws.com/")
            .body(SdkBody::empty())
            .unwrap(),
        http::Response::builder()
            .status(status)
            .body(SdkBody::empty())
            .unwrap(),
    )])
}

fn sink(http_client: &StaticReplayClient) -> CloudWatchSink {
    let config = aws_sdk_cloudwatch::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .retry_config(RetryConfig::disabled())
        .http_client(http_client.clone())
        .build();

    CloudWatchSink::new(
        Client::from_conf(config),
        NAMESPACE,
        60,
        &InstanceIdentity::new("i-0123456789abcdef0", "p4d.24xlarge"),
    )
}

#[tokio::test]
async fn test_emit_sends_one_batched_call() {
    let http_client = replay(200);
    let mut sink = sink(&http_client);

    assert_ok!(sink.emit(&metrics()).await);

    let requests: Vec<_> = http_client.actual_requests().collect();
    assert_eq!(requests.len(), 1);

    let request = requests[0];
    assert!(request.uri().contains("monitoring.us-east-1.amazonaws.com"));

    let body = String::from_utf8_lossy(request.body().bytes().unwrap_or_default()).into_owned();
    assert!(body.contains(NAMESPACE), "namespace missing from {}", body);
    for name in ["Usage", "Memory", "Temperature", "Power"] {
        assert!(body.contains(name), "{} missing from {}", name, body);
    }
    // Every datum carries both dimensions
    assert_eq!(body.matches("p4d.24xlarge").count(), 4);
}

#[tokio::test]
async fn test_rejected_call_is_publish_error() {
    let http_client = replay(403);
    let mut sink = sink(&http_client);

    let err = assert_err!(sink.emit(&metrics()).await);
    assert!(matches!(err, ExporterError::Publish(_)), "unexpected error: {}", err);
    assert_eq!(http_client.actual_requests().count(), 1);
}

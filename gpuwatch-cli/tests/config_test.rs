use clap::Parser;
use gpuwatch_cli::config::render_config;
use gpuwatch_cli::{load_config_from, RunArgs};
use gpuwatch_exporter::{ExporterConfig, OutputFormat, SinkKind};
use pretty_assertions::assert_eq;
use std::fs;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    run: RunArgs,
}

fn parse(args: &[&str]) -> RunArgs {
    TestCli::try_parse_from(std::iter::once("gpuwatch").chain(args.iter().copied()))
        .unwrap()
        .run
}

#[test]
fn test_no_flags_keep_config() {
    let mut config = ExporterConfig::default();
    parse(&[]).apply(&mut config);
    assert_eq!(config, ExporterConfig::default());
}

#[test]
fn test_flags_override_config() {
    let args = parse(&[
        "--device",
        "1",
        "-i",
        "1",
        "--format",
        "csv",
        "--sink",
        "cloudwatch",
        "--namespace",
        "Inference/GPU",
        "--resolution",
        "1",
        "--instance-id",
        "i-0abc",
        "--instance-type",
        "g5.2xlarge",
        "--region",
        "eu-west-1",
        "-n",
        "3",
    ]);

    let mut config = ExporterConfig::default();
    args.apply(&mut config);

    assert_eq!(config.device_index, 1);
    assert_eq!(config.interval_secs, 1);
    assert_eq!(config.format, OutputFormat::Csv);
    assert_eq!(config.sink, SinkKind::CloudWatch);
    assert_eq!(config.cloudwatch.namespace, "Inference/GPU");
    assert_eq!(config.cloudwatch.storage_resolution, 1);
    assert_eq!(config.cloudwatch.instance_id.as_deref(), Some("i-0abc"));
    assert_eq!(config.cloudwatch.instance_type.as_deref(), Some("g5.2xlarge"));
    assert_eq!(config.cloudwatch.region.as_deref(), Some("eu-west-1"));
    assert_eq!(args.count, Some(3));
    assert!(config.validate().is_ok());
}

#[test]
fn test_unknown_sink_rejected() {
    assert!(TestCli::try_parse_from(["gpuwatch", "--sink", "kafka"]).is_err());
}

#[test]
fn test_load_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
interval_secs = 15
format = "csv"

[cloudwatch]
namespace = "Fleet/GPU"
"#,
    )
    .unwrap();

    let mut config = load_config_from(&path).unwrap();
    assert_eq!(config.interval_secs, 15);
    assert_eq!(config.format, OutputFormat::Csv);
    assert_eq!(config.cloudwatch.namespace, "Fleet/GPU");
    assert_eq!(config.device_index, 0);

    // Flags win over the file
    parse(&["--interval", "2"]).apply(&mut config);
    assert_eq!(config.interval_secs, 2);
    assert_eq!(config.format, OutputFormat::Csv);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "interval_secs = \"soon\"").unwrap();

    assert!(load_config_from(&path).is_err());
}

#[test]
fn test_rendered_config_round_trips() {
    let mut config = ExporterConfig::default();
    config.cloudwatch.region = Some("us-east-1".to_string());

    let rendered = render_config(&config).unwrap();
    assert!(rendered.contains("interval_secs = 5"));
    assert!(!rendered.contains("instance_id"));

    let parsed: ExporterConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, config);
}

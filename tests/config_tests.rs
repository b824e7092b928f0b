use framepipe::engine::ExecutionConfig;
use framepipe::resilience::Backoff;
use framepipe::PipelineError;
use serde_json::json;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = ExecutionConfig::default();
    assert!(!config.allow_interruptions);
    assert!(!config.enable_metrics);
    assert!(!config.retry_on_error);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_backoff, Backoff::None);
    assert_eq!(config.cycle_pause(), Duration::from_millis(10));
}

#[test]
fn test_from_json_partial_object() {
    let config = ExecutionConfig::from_json(json!({
        "enable_metrics": true,
        "retry_on_error": true,
        "max_retries": 5
    }))
    .unwrap();
    assert!(config.enable_metrics);
    assert!(config.retry_on_error);
    assert_eq!(config.max_retries, 5);
    assert!(!config.allow_interruptions);
}

#[test]
fn test_from_json_nested_section() {
    let config = ExecutionConfig::from_json(json!({
        "processors": [],
        "pipeline_config": {
            "allow_interruptions": true,
            "retry_backoff": {"strategy": "exponential", "base_ms": 10, "max_ms": 200},
            "cycle_pause_ms": 0
        }
    }))
    .unwrap();
    assert!(config.allow_interruptions);
    assert_eq!(
        config.retry_backoff,
        Backoff::Exponential {
            base_ms: 10,
            max_ms: 200
        }
    );
    assert!(config.cycle_pause().is_zero());
}

#[test]
fn test_from_json_rejects_non_object() {
    let err = ExecutionConfig::from_json(json!([1, 2, 3])).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));

    let err = ExecutionConfig::from_json(json!({"max_retries": "many"})).unwrap_err();
    assert!(matches!(err, PipelineError::Json(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"pipeline_config": {{"enable_metrics": true, "retry_backoff": {{"strategy": "fixed", "delay_ms": 25}}}}}}"#
    )
    .unwrap();

    let config = ExecutionConfig::from_file(file.path()).unwrap();
    assert!(config.enable_metrics);
    assert_eq!(config.retry_backoff, Backoff::Fixed { delay_ms: 25 });
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ExecutionConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PipelineError::Io(_)));
}

#[test]
fn test_builder_setters() {
    let config = ExecutionConfig::default()
        .with_interruptions(true)
        .with_metrics(true)
        .with_retries(1)
        .with_cycle_pause(Duration::from_millis(3));
    assert!(config.allow_interruptions);
    assert!(config.enable_metrics);
    assert!(config.retry_on_error);
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.cycle_pause_ms, 3);
}

#[test]
fn test_sub_millisecond_pause_rounds_up() {
    let config = ExecutionConfig::default().with_cycle_pause(Duration::from_micros(500));
    assert_eq!(config.cycle_pause_ms, 1);
    assert_eq!(config.cycle_pause(), Duration::from_millis(1));

    let config = ExecutionConfig::default().with_cycle_pause(Duration::from_micros(2_001));
    assert_eq!(config.cycle_pause_ms, 3);

    let config = ExecutionConfig::default().with_cycle_pause(Duration::ZERO);
    assert!(config.cycle_pause().is_zero());
}

//! Loading tuning files and environment overrides.

use std::io::Write;

use tempfile::NamedTempFile;

use eta_engine::{compute_eta, EtaConfig, EtaError, TripContext, Weather};

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(json.as_bytes()).expect("write temp file");
    file
}

#[test]
fn tuning_file_overrides_only_named_constants() {
    let file = write_config(
        r#"{
            "catalog": { "weather": { "rain": 0.25 } },
            "additive": { "weather_per_hour": 4.0 }
        }"#,
    );
    let config = EtaConfig::from_file(file.path()).expect("load config");

    assert_eq!(config.catalog.weather.rain, 0.25);
    assert_eq!(config.catalog.weather.snow, 0.40);
    assert_eq!(config.catalog.version, "1.0.0");
    assert_eq!(config.additive.weather_per_hour, 4.0);
    assert_eq!(config.additive.traffic_per_hour, 3.0);
    assert_eq!(config.context.night_weather, 1.3);
}

#[test]
fn tuned_catalog_changes_the_estimate() {
    let file = write_config(r#"{ "catalog": { "weather": { "rain": 0.25 } } }"#);
    let tuned = EtaConfig::from_file(file.path()).expect("load config");
    let ctx = TripContext::new(20.0)
        .expect("valid base")
        .with_weather(Weather::Rain);

    let default_eta = compute_eta(&ctx, None, &EtaConfig::default()).expect("estimate");
    let tuned_eta = compute_eta(&ctx, None, &tuned).expect("estimate");
    assert!(tuned_eta.adjusted_minutes > default_eta.adjusted_minutes);
}

#[test]
fn malformed_json_is_a_decode_error() {
    let file = write_config(r#"{ "combine": { "k": "#);
    assert!(matches!(
        EtaConfig::from_file(file.path()),
        Err(EtaError::Json(_))
    ));
}

#[test]
fn out_of_range_values_fail_validation() {
    let file = write_config(r#"{ "traffic": { "min_confidence": 2.0 } }"#);
    let err = EtaConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, EtaError::InvalidConfig(_)));
    assert!(!err.is_input_error());
}

#[test]
fn non_finite_catalog_values_fail_validation() {
    let mut config = EtaConfig::default();
    config.catalog.road_problem.accident = f64::NAN;
    assert!(matches!(config.validate(), Err(EtaError::InvalidConfig(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.json");
    assert!(matches!(EtaConfig::from_file(&path), Err(EtaError::Io(_))));
}

// Only test in this binary that touches the process environment.
#[test]
fn environment_overrides_apply_on_top_of_file() {
    let file = write_config(r#"{ "min_fraction": 0.7 }"#);
    std::env::set_var("ETA_CONFIG_PATH", file.path());
    std::env::set_var("ETA_DIMINISHING_K", "0.9");
    std::env::set_var("ETA_TRAFFIC_MIN_CONFIDENCE", "not-a-number");

    let config = EtaConfig::from_env();

    std::env::remove_var("ETA_CONFIG_PATH");
    std::env::remove_var("ETA_DIMINISHING_K");
    std::env::remove_var("ETA_TRAFFIC_MIN_CONFIDENCE");

    let config = config.expect("load from env");
    assert_eq!(config.min_fraction, 0.7);
    assert_eq!(config.combine.k, 0.9);
    assert_eq!(config.traffic.min_confidence, 0.3);
}

use radview_config::defaults::{
    DEFAULT_PREDICTION_CONCURRENCY, DEFAULT_TIMEOUT_SECS, MAX_PREDICTION_CONCURRENCY,
};
use radview_config::{ClientSettings, ConfigError};

#[test]
fn defaults_fill_every_missing_field() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credentials.json");
    let config = ClientSettings {
        credential_path: Some(path.clone()),
        ..ClientSettings::default()
    }
    .validate()
    .expect("defaults validate");

    assert_eq!(config.api_url.scheme(), "https");
    assert!(config.api_url.path().ends_with('/'));
    assert!(config.predict_url.path().ends_with('/'));
    assert_eq!(config.credential_path, path);
    assert_eq!(config.http_timeout.as_secs(), DEFAULT_TIMEOUT_SECS);
    assert_eq!(
        config.prediction_concurrency.get(),
        DEFAULT_PREDICTION_CONCURRENCY
    );
}

#[test]
fn concurrency_above_cap_is_rejected() {
    let err = ClientSettings {
        credential_path: Some("creds.json".into()),
        prediction_concurrency: Some(MAX_PREDICTION_CONCURRENCY + 1),
        ..ClientSettings::default()
    }
    .validate()
    .expect_err("cap enforced");
    assert_eq!(
        err.to_string(),
        "invalid value '33' for prediction_concurrency: must be between 1 and 32"
    );
}

#[test]
fn bad_predict_url_names_the_field() {
    let err = ClientSettings {
        credential_path: Some("creds.json".into()),
        predict_url: Some("mailto:ml@example.com".into()),
        ..ClientSettings::default()
    }
    .validate()
    .expect_err("mailto rejected");
    assert!(matches!(
        err,
        ConfigError::InvalidField {
            field: "predict_url",
            ..
        }
    ));
}

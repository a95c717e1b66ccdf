//! Tests for the TOML configuration system.

use std::io::Write;
use tempfile::Builder;
use tintoretto_rate_limit::{RateLimitConfig, ThrottleConfig};

#[test]
fn test_load_bundled_defaults() {
    let config = ThrottleConfig::load().unwrap();

    // The bundled defaults ship at least the openai budget.
    let openai = config.get("openai").unwrap();
    assert_eq!(openai.max_concurrent, 5);
    assert_eq!(openai.max_per_window, Some(60));
    assert_eq!(openai.window_seconds, 60.0);
}

#[test]
fn test_config_from_file() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        r#"
[limiters.custom]
max_concurrent = 7
max_per_window = 42
window_seconds = 30.0

[limiters.open-ended]
max_concurrent = 12
"#
    )
    .unwrap();

    let config = ThrottleConfig::from_file(temp_file.path()).unwrap();

    let custom = config.get("custom").unwrap();
    assert_eq!(custom.max_concurrent, 7);
    assert_eq!(custom.max_per_window, Some(42));
    assert_eq!(custom.window_seconds, 30.0);

    let open_ended = config.get("open-ended").unwrap();
    assert_eq!(open_ended.max_concurrent, 12);
    assert_eq!(open_ended.max_per_window, None);
    assert_eq!(open_ended.window_seconds, 60.0);
}

#[test]
fn test_config_rejects_invalid_entry() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        r#"
[limiters.broken]
max_concurrent = 0
"#
    )
    .unwrap();

    let err = ThrottleConfig::from_file(temp_file.path()).unwrap_err();
    assert!(format!("{err}").contains("broken"));
}

#[test]
fn test_config_missing_file_fails() {
    assert!(ThrottleConfig::from_file("/no/such/tintoretto.toml").is_err());
}

#[test]
fn test_names_lists_entries() {
    let mut config = ThrottleConfig::default();
    config
        .limiters
        .insert("alpha".to_string(), RateLimitConfig::new(1));
    config
        .limiters
        .insert("beta".to_string(), RateLimitConfig::new(2));

    let mut names = config.names();
    names.sort();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[test]
fn test_rate_limit_config_validation() {
    assert!(RateLimitConfig::new(1).validate().is_ok());
    assert!(RateLimitConfig::new(0).validate().is_err());
    assert!(RateLimitConfig::with_window(5, 0).validate().is_err());
    assert!(
        RateLimitConfig::new(5)
            .window_seconds(-1.0)
            .validate()
            .is_err()
    );
    assert!(
        RateLimitConfig::new(5)
            .window_seconds(f64::NAN)
            .validate()
            .is_err()
    );
}

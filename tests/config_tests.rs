use std::env;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use once_cell::sync::Lazy;
use trainboard::config::{self, AppConfig, ConfigError, DataMode};

// Tests in this file mutate process environment variables.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const KEYS: &[&str] = &["API_BASE_URL", "API_TOKEN", "DATA_MODE", "REQUEST_TIMEOUT_SECS", "HOST", "PORT"];

fn clear_env() {
    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
fn test_sanitize_base_url_removes_trailing_slash() {
    assert_eq!(
        config::sanitize_base_url("https://training.example.com/api/"),
        "https://training.example.com/api"
    );
}

#[test]
fn test_sanitize_base_url_multiple_trailing_slashes() {
    assert_eq!(
        config::sanitize_base_url("https://training.example.com/api///"),
        "https://training.example.com/api"
    );
}

#[test]
fn test_sanitize_base_url_with_whitespace() {
    assert_eq!(
        config::sanitize_base_url("  https://training.example.com/api/  "),
        "https://training.example.com/api"
    );
}

#[test]
fn test_sanitize_base_url_whitespace_only() {
    assert_eq!(config::sanitize_base_url("   "), "http://localhost:8000");
}

#[test]
fn test_data_mode_parsing() {
    assert_eq!("dummy".parse::<DataMode>(), Ok(DataMode::Dummy));
    assert_eq!(" LIVE ".parse::<DataMode>(), Ok(DataMode::Live));
    assert_eq!(
        "staging".parse::<DataMode>(),
        Err(ConfigError::InvalidDataMode("staging".to_string()))
    );
}

#[test]
fn test_from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = AppConfig::from_env().unwrap();

    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.data_mode, DataMode::Dummy);
    assert_eq!(cfg.request_timeout, Duration::from_secs(30));
    assert_eq!(config::get_host(), "127.0.0.1");
    assert_eq!(config::get_port(), 8080);
}

#[test]
fn test_from_env_reads_every_key() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();
    env::set_var("API_BASE_URL", "https://training.example.com/");
    env::set_var("API_TOKEN", "  secret-token \n");
    env::set_var("DATA_MODE", "live");
    env::set_var("REQUEST_TIMEOUT_SECS", "5");

    let cfg = AppConfig::from_env().unwrap();

    assert_eq!(cfg.api_base_url, "https://training.example.com");
    assert_eq!(cfg.api_token, "secret-token");
    assert_eq!(cfg.data_mode, DataMode::Live);
    assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    clear_env();
}

#[test]
fn test_invalid_values_are_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    env::set_var("REQUEST_TIMEOUT_SECS", "0");
    assert!(matches!(AppConfig::from_env(), Err(ConfigError::InvalidTimeout(_))));

    env::set_var("REQUEST_TIMEOUT_SECS", "soon");
    assert!(matches!(AppConfig::from_env(), Err(ConfigError::InvalidTimeout(_))));

    env::remove_var("REQUEST_TIMEOUT_SECS");
    env::set_var("DATA_MODE", "prod");
    assert!(matches!(AppConfig::from_env(), Err(ConfigError::InvalidDataMode(_))));
    clear_env();
}

#[test]
fn test_env_file_is_loaded() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "API_BASE_URL=https://from-file.example.com/").unwrap();
    writeln!(file, "DATA_MODE=live").unwrap();
    writeln!(file, "PORT=9191").unwrap();
    file.flush().unwrap();

    config::load_env_file(file.path().to_str());
    let cfg = AppConfig::from_env().unwrap();

    assert_eq!(cfg.api_base_url, "https://from-file.example.com");
    assert_eq!(cfg.data_mode, DataMode::Live);
    assert_eq!(config::get_port(), 9191);
    clear_env();
}

#[test]
fn test_with_data_mode_overrides_environment() {
    let cfg = AppConfig::default().with_data_mode(DataMode::Live);
    assert_eq!(cfg.data_mode, DataMode::Live);
}

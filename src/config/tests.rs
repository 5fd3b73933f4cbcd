use super::load_config;
use super::settings::Settings;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8181);
    assert_eq!(settings.dashboard.recent_logs, 50);
    assert_eq!(settings.logging.level, "info");
}

/// Runs `f` with the working directory switched to a fresh temp dir.
fn in_temp_dir<R>(f: impl FnOnce(&TempDir) -> R) -> R {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");
    let result = f(&tmp);
    env::set_current_dir(orig).expect("restore cwd");
    result
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let cfg = in_temp_dir(|_| load_config().expect("load_config failed"));
    assert_eq!(cfg, Settings::default());
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let cfg = in_temp_dir(|_| {
        fs::create_dir_all("config").expect("create config dir");
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [dashboard]
            recent_logs = 10
        "#;
        fs::write("config/default.toml", toml).expect("write config file");
        load_config().expect("load_config failed")
    });

    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.dashboard.recent_logs, 10);
    // untouched section keeps its default
    assert_eq!(cfg.logging.level, "info");
}

#[test]
#[serial]
fn env_overrides_file() {
    let cfg = in_temp_dir(|_| {
        fs::create_dir_all("config").expect("create config dir");
        fs::write("config/default.toml", "[server]\nport = 9000\n").expect("write config file");

        temp_env::with_vars(
            [
                ("AIRHUB__SERVER__PORT", Some("9100")),
                ("AIRHUB__LOGGING__LEVEL", Some("debug")),
            ],
            || load_config().expect("load_config failed"),
        )
    });

    assert_eq!(cfg.server.port, 9100);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.server.host, "127.0.0.1");
}

#[test]
#[serial]
fn invalid_env_value_is_an_error() {
    let result = in_temp_dir(|_| {
        temp_env::with_var("AIRHUB__SERVER__PORT", Some("abc"), load_config)
    });

    assert!(result.is_err(), "a non-numeric port must not load: {result:?}");
}

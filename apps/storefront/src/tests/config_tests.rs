use super::*;

use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_the_demo_store() {
    let settings = Settings::default();
    assert_eq!(settings.page_size, 6);
    assert_eq!(settings.commit_delay_ms, 800);
    assert_eq!(settings.demo_username, "admin");
    assert_eq!(settings.demo_password, "123456");

    let config = settings.storefront_config();
    assert_eq!(config.commit_delay, Duration::from_millis(800));
    assert_eq!(config.session.login_delay, Duration::from_millis(1000));
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite::memory:"),
        "sqlite::memory:"
    );
    assert_eq!(
        normalize_database_url("  "),
        Settings::default().database_url
    );
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(
        &path,
        "page_size = 4\ncommit_delay_ms = 0\ndatabase_url = \"shop.db\"\n",
    )
    .expect("write config");

    let settings = load_settings(&path).expect("load");
    assert_eq!(settings.page_size, 4);
    assert_eq!(settings.commit_delay_ms, 0);
    assert_eq!(settings.database_url, "sqlite://shop.db");
    assert_eq!(settings.login_delay_ms, 1000);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, "bind_addr = \"0.0.0.0:80\"\n").expect("write config");
    assert!(load_settings(&path).is_err());
}

#[test]
fn missing_file_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings(&dir.path().join("absent.toml")).expect("load");
    assert_eq!(settings.page_size, Settings::default().page_size);
}

#[test]
fn env_overrides_win_and_bad_numbers_are_ignored() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("STOREFRONT_DB", "sqlite://first.db"),
            ("APP__DATABASE_URL", "sqlite://second.db"),
            ("APP__PAGE_SIZE", "12"),
            ("APP__COMMIT_DELAY_MS", "soon"),
            ("APP__DEMO_PASSWORD", "hunter22"),
        ]),
    );
    assert_eq!(settings.database_url, "sqlite://second.db");
    assert_eq!(settings.page_size, 12);
    assert_eq!(settings.commit_delay_ms, 800);
    assert_eq!(settings.demo_password, "hunter22");
}

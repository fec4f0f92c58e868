/// Configuration and data-directory tests.
///
/// These tests change `BINWATCH_HOME` and `BINWATCH_CAPACITY` with
/// `std::env::set_var` / `remove_var`, which are `unsafe` in edition 2024.
/// Everything runs inside one test function, so no other thread in this
/// binary reads the environment at the same time.
use binwatch::analytics::logger::activity_log_path;
use binwatch::config;
use binwatch::session::SessionStore;

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must not be called while another thread reads the environment.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must not be called while another thread reads the environment.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

#[test]
fn global_config_lifecycle_under_binwatch_home() {
    let home = std::env::temp_dir().join(format!("binwatch-config-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);

    unsafe { set_env("BINWATCH_HOME", home.to_str().unwrap()) };
    unsafe { remove_env("BINWATCH_CAPACITY") };

    // Everything lives under the data dir.
    assert_eq!(config::data_dir(), Some(home.clone()));
    assert_eq!(config::global_config_file(), Some(home.join("config.toml")));
    assert_eq!(activity_log_path(), Some(home.join("activity.jsonl")));
    assert_eq!(
        SessionStore::default_location().unwrap().path(),
        home.join("session.json")
    );

    // No file yet: defaults.
    assert_eq!(config::load().evaluator.capacity, 28);

    // init writes the annotated defaults once.
    let path = config::init_config(false).unwrap();
    assert_eq!(path, home.join("config.toml"));
    assert!(config::init_config(false).is_err());
    assert_eq!(config::load().evaluator.capacity, 28);

    // set validates against the schema.
    config::set_config_value("evaluator.capacity", "40").unwrap();
    assert_eq!(config::load().evaluator.capacity, 40);
    assert!(config::set_config_value("evaluator.capacity", "lots").is_err());
    assert!(config::set_config_value("evaluator.bogus", "1").is_err());
    assert_eq!(config::load().evaluator.capacity, 40);

    // Env beats the file.
    unsafe { set_env("BINWATCH_CAPACITY", "12") };
    assert_eq!(config::load().evaluator.capacity, 12);
    unsafe { remove_env("BINWATCH_CAPACITY") };

    // Unparseable env values are ignored.
    unsafe { set_env("BINWATCH_CAPACITY", "twelve") };
    assert_eq!(config::load().evaluator.capacity, 40);
    unsafe { remove_env("BINWATCH_CAPACITY") };

    let shown = config::show_effective_config().unwrap();
    assert!(shown.contains("capacity = 40"), "{shown}");

    config::reset_config().unwrap();
    assert_eq!(config::load().evaluator.capacity, 28);

    unsafe { remove_env("BINWATCH_HOME") };
    let _ = std::fs::remove_dir_all(&home);
}

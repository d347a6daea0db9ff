use brandscope_config::BrandscopeConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_and_expands_placeholders() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
server:
  bind: "0.0.0.0:8081"
database:
  url: "sqlite://${BRANDSCOPE_DATA_DIR}/sites.db?mode=rwc"
scrape:
  timeout_ms: 4000
"#;
    let p = write_yaml(&tmp, "brandscope.yaml", file_yaml);

    temp_env::with_var("BRANDSCOPE_DATA_DIR", Some("/tmp/brandscope"), || {
        let config = BrandscopeConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load service config");

        assert_eq!(config.server.bind, "0.0.0.0:8081");
        assert_eq!(config.database.url, "sqlite:///tmp/brandscope/sites.db?mode=rwc");
        assert_eq!(config.scrape.timeout_ms, 4000);
        // Untouched section keeps its default.
        assert_eq!(config.scrape.user_agent, "Mozilla/5.0");
    });
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();

    let config = BrandscopeConfigLoader::new()
        .with_file(tmp.path().join("nope.yaml"))
        .load()
        .expect("defaults despite missing file");

    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.scrape.timeout_ms, 10_000);
}

#[test]
#[serial]
fn environment_overrides_win_over_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "brandscope.yaml", "server:\n  bind: \"127.0.0.1:7000\"\n");

    temp_env::with_vars(
        [
            ("BRANDSCOPE_SERVER__BIND", Some("0.0.0.0:9999")),
            ("BRANDSCOPE_SCRAPE__TIMEOUT_MS", Some("2500")),
        ],
        || {
            let config = BrandscopeConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load with overrides");

            assert_eq!(config.server.bind, "0.0.0.0:9999");
            assert_eq!(config.scrape.timeout_ms, 2500);
        },
    );
}

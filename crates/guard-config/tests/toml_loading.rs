//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use guard_config::{EmbeddingMode, GuardConfig};

#[test]
fn loads_classifier_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[classifier]
api_key = "toml-key"
model = "gemini-2.5-pro"
timeout_secs = 15
max_attempts = 5
temperature = 0.0
"#,
        )?;

        let config: GuardConfig = Figment::from(Serialized::defaults(GuardConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.classifier.api_key, "toml-key");
        assert_eq!(config.classifier.model, "gemini-2.5-pro");
        assert_eq!(config.classifier.timeout_secs, 15);
        assert_eq!(config.classifier.max_attempts, 5);
        assert!(config.classifier.is_configured());
        // untouched fields keep their defaults
        assert_eq!(config.classifier.base_delay_ms, 250);
        Ok(())
    });
}

#[test]
fn loads_store_and_scan_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[store]
path = ":memory:"
window_size = 500
window_overlap = 50

[scan]
chunk_lines = 25
workers = 8
extensions = ["py", "rs"]

[embeddings]
mode = "hash"
hash_dimension = 64
"#,
        )?;

        let config: GuardConfig = Figment::from(Serialized::defaults(GuardConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.store.is_in_memory());
        assert_eq!(config.store.window_size, 500);
        assert_eq!(config.store.window_overlap, 50);
        assert_eq!(config.store.query_k, 5);
        assert_eq!(config.scan.chunk_lines, 25);
        assert_eq!(config.scan.workers, 8);
        assert_eq!(config.scan.extensions, vec!["py", "rs"]);
        assert_eq!(config.embeddings.mode, EmbeddingMode::Hash);
        assert_eq!(config.embeddings.hash_dimension, 64);
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".guardian")?;
        jail.create_file(
            ".guardian/config.toml",
            r#"
[general]
default_limit = 50
"#,
        )?;

        let config = GuardConfig::load().expect("config loads");
        assert_eq!(config.general.default_limit, 50);
        Ok(())
    });
}

#[test]
fn invalid_toml_values_fail_validation() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[store]
window_size = 100
window_overlap = 100
"#,
        )?;

        let config: GuardConfig = Figment::from(Serialized::defaults(GuardConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.validate().is_err());
        Ok(())
    });
}

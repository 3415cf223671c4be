use super::*;
use std::collections::HashMap;
use std::path::PathBuf;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn partial_config_overrides_only_named_fields() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("enrich.json");
    fs::write(
        &path,
        r#"{"schema_version": 1, "backend": "command", "lm_command": "llm -m haiku", "max_attempts": 5}"#,
    )
    .unwrap();

    let config = load_config(&path).expect("load config");
    assert_eq!(config.backend, Backend::Command);
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.checkpoint_every, 50);

    let options = config.pipeline_options(Some(7));
    assert_eq!(options.max_attempts, 5);
    assert_eq!(options.limit, Some(7));
    assert_eq!(options.call_delay, Duration::from_millis(200));
    assert_eq!(options.validator.min_len(), 10);
}

#[test]
fn missing_default_config_uses_defaults_but_explicit_path_must_exist() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let paths = DataPaths::new(dir.path().to_path_buf());
    assert_eq!(
        load_config_for(&paths, None).unwrap(),
        EnrichConfig::default()
    );
    let missing = dir.path().join("other.json");
    let err = load_config_for(&paths, Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("read config"));
}

#[test]
fn rejects_bad_schema_paths_and_zero_budgets() {
    let config = EnrichConfig {
        schema_version: 2,
        ..EnrichConfig::default()
    };
    assert!(validate_config(&config)
        .unwrap_err()
        .to_string()
        .contains("schema_version"));

    let config = EnrichConfig {
        dataset: "../words.json".to_string(),
        ..EnrichConfig::default()
    };
    assert!(validate_config(&config).is_err());

    let config = EnrichConfig {
        checkpoint_every: 0,
        ..EnrichConfig::default()
    };
    assert!(validate_config(&config)
        .unwrap_err()
        .to_string()
        .contains("checkpoint_every"));
}

#[test]
fn unknown_config_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("enrich.json");
    fs::write(&path, r#"{"max_attempt": 4}"#).unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("max_attempt"));
}

#[test]
fn lm_command_prefers_flag_then_config_then_env() {
    let env = env_from(&[(LM_COMMAND_ENV, "env-llm")]);
    let mut config = EnrichConfig::default();
    assert_eq!(
        resolve_lm_command_with(None, &config, &env).unwrap(),
        "env-llm"
    );
    config.lm_command = Some("config-llm".to_string());
    assert_eq!(
        resolve_lm_command_with(None, &config, &env).unwrap(),
        "config-llm"
    );
    assert_eq!(
        resolve_lm_command_with(Some("flag-llm"), &config, &env).unwrap(),
        "flag-llm"
    );
    let none = env_from(&[]);
    assert!(resolve_lm_command_with(None, &EnrichConfig::default(), none).is_err());
}

#[test]
fn api_key_comes_from_env_before_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let paths = DataPaths::new(PathBuf::from(dir.path()));
    assert!(resolve_api_key_with(&paths, env_from(&[])).is_err());

    fs::write(paths.api_key_path(), "  file-key\n").unwrap();
    assert_eq!(
        resolve_api_key_with(&paths, env_from(&[])).unwrap(),
        "file-key"
    );
    assert_eq!(
        resolve_api_key_with(&paths, env_from(&[(FALLBACK_API_KEY_ENV, "fallback")])).unwrap(),
        "fallback"
    );
    let both = env_from(&[(API_KEY_ENV, "primary"), (FALLBACK_API_KEY_ENV, "fallback")]);
    assert_eq!(resolve_api_key_with(&paths, both).unwrap(), "primary");
}

use guard_config::GuardConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &GuardConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &GuardConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.classifier.is_configured() && has_env_prefix(&env_keys, "GUARDIAN_CLASSIFIER") {
        warnings.push(
            "Classifier API key appears unset while GUARDIAN_CLASSIFIER* env vars exist. Use double underscores (example: GUARDIAN_CLASSIFIER__API_KEY)."
                .to_string(),
        );
    }

    for key in &env_keys {
        if let Some(rest) = key.strip_prefix("GUARDIAN_") {
            if rest != "LOG" && !rest.contains("__") {
                warnings.push(format!(
                    "{key} is not a recognised setting. Sections are separated by double underscores (example: GUARDIAN_SCAN__WORKERS)."
                ));
            }
        }
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}

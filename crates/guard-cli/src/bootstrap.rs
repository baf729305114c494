use std::path::Path;

use anyhow::Context;
use guard_config::GuardConfig;

/// Load `.env` for the project, then the layered configuration.
pub fn load_config(project_root: &Path) -> anyhow::Result<GuardConfig> {
    load_project_dotenv(project_root)?;

    let config = GuardConfig::load_from(project_root).context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}

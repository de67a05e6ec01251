//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
///
/// `config_path` is the file given with `--config`, if any.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<&str>) -> Result<()> {
    let path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = settings.with_value(key, value)?;
            updated.save_to(&path)?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::kv("Config file", &path.display().to_string());
        }

        ConfigAction::Init { force } => {
            if path.exists() && !force {
                Output::warning(&format!("Config already exists at {}", path.display()));
                Output::info("Use --force to overwrite it with the defaults.");
                return Ok(());
            }
            Settings::default().save_to(&path)?;
            Output::success(&format!("Wrote default config to {}", path.display()));
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

//! Config file loading

use crate::domain::Config;
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of environment variables overriding config values, e.g.
/// `REPO_DIAGRAM_LLM__MODEL=gpt-4o-mini`.
pub const ENV_PREFIX: &str = "REPO_DIAGRAM_";

/// Section name accepted as a nested table in shared config files.
const NESTED_SECTION: &str = "repo-diagram";

/// Load configuration from `config_path`, or discover one in `root`, then
/// apply the environment overlay.
///
/// An explicit file that fails to parse is an error; an auto-discovered one
/// only logs a warning and falls back to defaults.
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let file_config = load_file_config(root, config_path)?;
    apply_env_overlay(file_config)
}

fn load_file_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(root),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(cfg) => {
            tracing::debug!("loaded config from {}", config_file.display());
            Ok(cfg)
        }
        Err(e) if explicit => Err(e),
        Err(e) => {
            tracing::warn!(
                "Failed to parse auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(Config::default())
        }
    }
}

/// Merge `REPO_DIAGRAM_*` variables over `base`, nested keys split on `__`.
///
/// `GITHUB_TOKEN` fills the token when neither the file nor the overlay set one.
pub fn apply_env_overlay(base: Config) -> Result<Config> {
    let file_token = base.github_token.clone();

    let mut merged: Config = Figment::from(Serialized::defaults(base))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Invalid configuration in environment")?;

    merged.github_token = merged
        .github_token
        .or(file_token)
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .filter(|token| !token.trim().is_empty());

    Ok(merged)
}

/// Parse TOML config, supporting a nested [repo-diagram] section.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(NESTED_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, supporting a nested repo-diagram section.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(NESTED_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(root: &Path) -> Option<PathBuf> {
    let candidates =
        ["repo-diagram.toml", ".repo-diagram.toml", "repo-diagram.yml", "repo-diagram.yaml"];

    candidates.iter().map(|candidate| root.join(candidate)).find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_defaults_when_missing() {
        let tmp = TempDir::new().expect("tmp");
        let cfg = load_file_config(tmp.path(), None).expect("config");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_load_toml_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("repo-diagram.toml"),
            "[llm]\nmodel = 'gpt-4o-mini'\n\n[cache]\ncapacity = 8\n",
        )
        .expect("write");

        let cfg = load_file_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.cache.capacity, 8);
        assert_eq!(cfg.cache.ttl_secs, 1800, "unset keys keep defaults");
    }

    #[test]
    fn test_nested_section_in_toml() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("shared.toml");
        fs::write(&path, "[repo-diagram.server]\nport = 9000\n").expect("write");

        let cfg = load_file_config(tmp.path(), Some(&path)).expect("config");
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn test_load_yaml_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("repo-diagram.yml"),
            "fetch:\n  max_files: 10\nrender:\n  base_url: http://localhost:3000\n",
        )
        .expect("write");

        let cfg = load_file_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.fetch.max_files, 10);
        assert_eq!(cfg.render.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_explicit_config_invalid_type_returns_err() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[server]\nport = 'eighty'\n").expect("write");

        let result = load_file_config(tmp.path(), Some(&path));
        assert!(result.is_err(), "explicit config with invalid type should return Err");
    }

    #[test]
    fn test_explicit_config_unsupported_extension_returns_err() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.ini");
        fs::write(&path, "port=1\n").expect("write");

        assert!(load_file_config(tmp.path(), Some(&path)).is_err());
    }

    #[test]
    fn test_auto_discovered_invalid_config_returns_default() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("repo-diagram.toml"), "[cache]\ncapacity = 'lots'\n")
            .expect("write");

        let cfg = load_file_config(tmp.path(), None).expect("should not error on auto-discovery");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_env_overlay_keeps_file_values_without_env() {
        let mut base = Config::default();
        base.llm.model = "from-file".to_string();
        base.github_token = Some("ghp_file".to_string());

        let merged = apply_env_overlay(base).expect("overlay");
        assert_eq!(merged.llm.model, "from-file");
        assert_eq!(merged.github_token.as_deref(), Some("ghp_file"));
    }
}

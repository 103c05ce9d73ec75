mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(config_path, |key| env::var(key).ok()).await
}

/// Reads `path`, applies overrides from `lookup` and validates the result.
pub async fn load_from<P, F>(path: P, lookup: F) -> Result<Config>
where
    P: AsRef<Path>,
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    let mut config = parse(&config_str)?;
    apply_env_overrides(&mut config, lookup)?;
    config.validate()?;

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

/// Applies `PORT`, `API_SECRET` and `DOCS_PASSWORD` on top of the file values.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("PORT is not a valid port number: '{}'", port)))?;
    }

    if let Some(secret) = lookup("API_SECRET") {
        config.auth.api_secret = secret;
    }

    if let Some(password) = lookup("DOCS_PASSWORD") {
        match config.docs.as_mut() {
            Some(docs) => docs.password = password,
            None => {
                config.docs = Some(DocsConfig {
                    username: "user".to_string(),
                    password,
                })
            }
        }
    }

    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.auth.api_secret.is_empty() {
            return Err(Error::config("auth.api_secret must not be empty"));
        }
        if let Some(docs) = &self.docs {
            if docs.username.is_empty() || docs.password.is_empty() {
                return Err(Error::config(
                    "docs.username and docs.password must not be empty",
                ));
            }
        }
        if self.toolkit.workers == 0 {
            return Err(Error::config("toolkit.workers must be at least 1"));
        }
        if self.toolkit.request_timeout_secs == 0 {
            return Err(Error::config(
                "toolkit.request_timeout_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MINIMAL: &str = r#"
auth:
  api_secret: "s3cret"
"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.logs.level, "info");
        assert_eq!(config.toolkit.python, "python3");
        assert_eq!(config.toolkit.workers, 2);
        assert!(config.docs.is_none());
        assert!(!config.auth.allow_unauthenticated_inchi_key_plain);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_port_and_secrets() {
        let mut config = parse(MINIMAL).unwrap();
        let vars: HashMap<&str, &str> = [
            ("PORT", "9123"),
            ("API_SECRET", "other"),
            ("DOCS_PASSWORD", "pw"),
        ]
        .into_iter()
        .collect();

        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.server.port, 9123);
        assert_eq!(config.auth.api_secret, "other");
        let docs = config.docs.unwrap();
        assert_eq!(docs.username, "user");
        assert_eq!(docs.password, "pw");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = parse(MINIMAL).unwrap();
        let result = apply_env_overrides(&mut config, |key| {
            (key == "PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn empty_secret_fails_validation() {
        let config = parse("auth:\n  api_secret: \"\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_workers_fails_validation() {
        let config = parse("auth:\n  api_secret: x\ntoolkit:\n  workers: 0\n").unwrap();
        assert!(config.validate().is_err());
    }
}

use crate::core::model::UserId;
use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DATA_DIR_ENV: &str = "VIDSHELF_DATA_DIR";
const USER_ENV: &str = "VIDSHELF_USER";
const IDENTITY_TTL_ENV: &str = "VIDSHELF_IDENTITY_TTL_SECS";

const DEFAULT_DATA_DIR: &str = "shelf";
const DEFAULT_IDENTITY_TTL_SECS: u64 = 300;

/// Runtime settings, read from the environment and overridable from the CLI.
///
/// | Env Var                      | Default |
/// |------------------------------|---------|
/// | `VIDSHELF_DATA_DIR`          | `shelf` |
/// | `VIDSHELF_USER`              | unset   |
/// | `VIDSHELF_IDENTITY_TTL_SECS` | `300`   |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub user: Option<UserId>,
    pub identity_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let user = lookup(USER_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(UserId::from);

        let identity_ttl = match lookup(IDENTITY_TTL_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::validation(format!("{IDENTITY_TTL_ENV} must be a whole number of seconds"))
            })?,
            None => DEFAULT_IDENTITY_TTL_SECS,
        };

        Ok(Self {
            data_dir,
            user,
            identity_ttl: Duration::from_secs(identity_ttl),
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, user: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(user) = user.filter(|u| !u.trim().is_empty()) {
            self.user = Some(UserId::from(user.trim()));
        }
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("vidshelf.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("shelf"));
        assert_eq!(config.user, None);
        assert_eq!(config.identity_ttl, Duration::from_secs(300));
    }

    #[test]
    fn reads_environment_and_applies_overrides() {
        let config = Config::from_lookup(lookup(&[
            (DATA_DIR_ENV, "/tmp/shelf"),
            (USER_ENV, " alice "),
            (IDENTITY_TTL_ENV, "30"),
        ]))
        .unwrap();
        assert_eq!(config.user, Some(UserId::from("alice")));
        assert_eq!(config.identity_ttl, Duration::from_secs(30));

        let config = config.with_overrides(Some(PathBuf::from("other")), Some("bob".into()));
        assert_eq!(config.data_dir, PathBuf::from("other"));
        assert_eq!(config.user, Some(UserId::from("bob")));
    }

    #[test]
    fn rejects_bad_ttl() {
        assert!(Config::from_lookup(lookup(&[(IDENTITY_TTL_ENV, "soon")])).is_err());
    }
}

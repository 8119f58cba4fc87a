//! Layered configuration loading: defaults → file → environment
//! variables, later sources win (`SPEC_FULL.md` §A1).
//!
//! Mirrors the teacher's configuration crate's loading hierarchy and
//! validate-after-load shape, generalised with generics so both the
//! coordinator and the worker binaries share one loader instead of
//! duplicating the merge/override logic for their own config struct.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(String),
    #[error("could not parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Implemented by a config struct that has cross-field constraints to
/// enforce after loading (e.g. a timeout that must be non-negative). The
/// default no-op impl is enough for configs with no such constraints.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Load a config of type `T`: start from `T::default()`, overlay the TOML
/// file at `path` if one is given and exists, then overlay environment
/// variables named `{env_prefix}_{FIELD}` (uppercased), then validate.
pub fn load<T>(path: Option<&Path>, env_prefix: &str) -> Result<T, ConfigError>
where
    T: Default + Serialize + DeserializeOwned + Validate,
{
    let mut table = match toml::Value::try_from(T::default())
        .map_err(|e| ConfigError::Parse(e.to_string()))?
    {
        toml::Value::Table(t) => t,
        _ => unreachable!("a config struct always serializes to a TOML table"),
    };

    if let Some(path) = path {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
            let file_value: toml::Value =
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
            if let toml::Value::Table(file_table) = file_value {
                for (key, value) in file_table {
                    table.insert(key, value);
                }
            }
        }
    }

    apply_env_overrides(&mut table, env_prefix);

    let config: T = toml::Value::Table(table)
        .try_into()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(table: &mut toml::value::Table, prefix: &str) {
    for (key, value) in table.iter_mut() {
        let env_name = format!("{}_{}", prefix, key.to_uppercase());
        if let Ok(raw) = std::env::var(&env_name) {
            *value = coerce_like(&raw, value);
        }
    }
}

fn coerce_like(raw: &str, existing: &toml::Value) -> toml::Value {
    match existing {
        toml::Value::Integer(_) => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .unwrap_or_else(|_| toml::Value::String(raw.to_string())),
        toml::Value::Float(_) => raw
            .parse::<f64>()
            .map(toml::Value::Float)
            .unwrap_or_else(|_| toml::Value::String(raw.to_string())),
        toml::Value::Boolean(_) => raw
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .unwrap_or_else(|_| toml::Value::String(raw.to_string())),
        _ => toml::Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Sample {
        bind: String,
        port: i64,
        heartbeat_secs: i64,
    }

    impl Validate for Sample {
        fn validate(&self) -> Result<(), ConfigError> {
            if self.heartbeat_secs < 0 {
                return Err(ConfigError::Invalid("heartbeat_secs must be >= 0".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn defaults_are_used_when_nothing_else_is_set() {
        let config: Sample = load(None, "SAMPLE_TEST_DEFAULTS").unwrap();
        assert_eq!(config, Sample::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"port = 9090"#).unwrap();
        let config: Sample = load(Some(file.path()), "SAMPLE_TEST_FILE").unwrap();
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn env_overrides_both_defaults_and_file() {
        std::env::set_var("SAMPLE_TEST_ENV_PORT", "7070");
        let config: Sample = load(None, "SAMPLE_TEST_ENV").unwrap();
        std::env::remove_var("SAMPLE_TEST_ENV_PORT");
        assert_eq!(config.port, 7070);
    }

    #[test]
    fn invalid_config_is_rejected() {
        std::env::set_var("SAMPLE_TEST_INVALID_HEARTBEAT_SECS", "-1");
        let result: Result<Sample, ConfigError> = load(None, "SAMPLE_TEST_INVALID");
        std::env::remove_var("SAMPLE_TEST_INVALID_HEARTBEAT_SECS");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}

//! Configuration file upkeep: detect and fill keys missing from older files.

use super::{Config, KNOWN_KEYS};
use crate::errors::{AppError, AppResult};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Return the known keys absent from the YAML document at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    missing_keys_in(&content)
}

pub fn missing_keys_in(content: &str) -> AppResult<Vec<String>> {
    let yaml: Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::Config(format!("invalid YAML: {}", e)))?;

    let Some(map) = yaml.as_mapping() else {
        return Err(AppError::Config("configuration root is not a mapping".into()));
    };

    Ok(KNOWN_KEYS
        .iter()
        .filter(|k| !map.contains_key(Value::String(k.to_string())))
        .map(|k| k.to_string())
        .collect())
}

/// Insert defaults for every missing key, keeping the values already set.
/// Returns the keys that were added.
pub fn fill_missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    let (updated, added) = fill_missing_in(&content)?;

    if !added.is_empty() {
        fs::write(path, updated).map_err(|_| AppError::ConfigSave)?;
    }

    Ok(added)
}

fn fill_missing_in(content: &str) -> AppResult<(String, Vec<String>)> {
    let mut yaml: Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::Config(format!("invalid YAML: {}", e)))?;

    let defaults = serde_yaml::to_value(Config::default()).map_err(|_| AppError::ConfigSave)?;
    let (Some(map), Some(default_map)) = (yaml.as_mapping_mut(), defaults.as_mapping()) else {
        return Err(AppError::Config("configuration root is not a mapping".into()));
    };

    let mut added = Vec::new();
    for key in KNOWN_KEYS {
        let k = Value::String(key.to_string());
        if !map.contains_key(&k)
            && let Some(v) = default_map.get(&k)
        {
            map.insert(k, v.clone());
            added.push(key.to_string());
        }
    }

    let serialized = serde_yaml::to_string(&yaml).map_err(|_| AppError::ConfigSave)?;
    Ok((serialized, added))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_keys_missing_from_old_files() {
        let missing = missing_keys_in("database: /tmp/a.sqlite\ngrace_minutes: 10\n").unwrap();
        assert!(missing.contains(&"badge_tick_secs".to_string()));
        assert!(!missing.contains(&"database".to_string()));
        assert!(!missing.contains(&"grace_minutes".to_string()));
    }

    #[test]
    fn filling_keeps_existing_values() {
        let (out, added) = fill_missing_in("database: /tmp/a.sqlite\ngrace_minutes: 5\n").unwrap();
        assert!(added.contains(&"watchdog_tick_secs".to_string()));
        let cfg: Config = serde_yaml::from_str(&out).unwrap();
        assert_eq!(cfg.database, "/tmp/a.sqlite");
        assert_eq!(cfg.grace_minutes, 5);
        assert!(missing_keys_in(&out).unwrap().is_empty());
    }
}

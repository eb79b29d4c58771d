use std::env;
use std::str::FromStr;

use crate::infra::ConfigError;
use crate::planners::StrategyKind;

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub strategy: StrategyKind,
    pub replays_folder: Option<String>,
    /// Run against a generated board instead of stdin/stdout.
    pub seed: Option<u64>,
    pub perception_radius: i32,
    pub danger_density: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::AStar,
            replays_folder: None,
            seed: None,
            perception_radius: 1,
            danger_density: 0.15,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let perception_radius: i32 =
            parse_var(&lookup, "KEYMAKER_PERCEPTION")?.unwrap_or(defaults.perception_radius);
        // The agent must at least see the cells next to it.
        if perception_radius < 1 {
            return Err(ConfigError::InvalidValue {
                key: "KEYMAKER_PERCEPTION",
                value: perception_radius.to_string(),
            });
        }
        Ok(Self {
            strategy: parse_var(&lookup, "KEYMAKER_STRATEGY")?.unwrap_or(defaults.strategy),
            replays_folder: lookup("KEYMAKER_REPLAYS_FOLDER").filter(|v| !v.is_empty()),
            seed: parse_var(&lookup, "KEYMAKER_SEED")?,
            perception_radius,
            danger_density: parse_var(&lookup, "KEYMAKER_DANGER_DENSITY")?
                .unwrap_or(defaults.danger_density),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("KEYMAKER_STRATEGY", "backtracking"),
            ("KEYMAKER_REPLAYS_FOLDER", "replays"),
            ("KEYMAKER_SEED", "42"),
            ("KEYMAKER_PERCEPTION", "2"),
            ("KEYMAKER_DANGER_DENSITY", "0.3"),
        ]))
        .unwrap();
        assert_eq!(config.strategy, StrategyKind::Backtracking);
        assert_eq!(config.replays_folder.as_deref(), Some("replays"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.perception_radius, 2);
        assert_eq!(config.danger_density, 0.3);
    }

    #[test]
    fn test_invalid_value() {
        let err = Config::from_lookup(lookup(&[("KEYMAKER_SEED", "forty")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "KEYMAKER_SEED", .. }
        ));
        assert!(Config::from_lookup(lookup(&[("KEYMAKER_STRATEGY", "dijkstra")])).is_err());
    }

    #[test]
    fn test_perception_below_one_is_rejected() {
        for value in ["0", "-2"] {
            let err = Config::from_lookup(lookup(&[("KEYMAKER_PERCEPTION", value)])).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { key: "KEYMAKER_PERCEPTION", .. }
            ));
        }
        let config = Config::from_lookup(lookup(&[("KEYMAKER_PERCEPTION", "1")])).unwrap();
        assert_eq!(config.perception_radius, 1);
    }
}

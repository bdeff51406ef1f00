//! Configuration sources consulted by skills for defaults and credentials.
//!
//! ```rust
//! use cskills::{SkillConfigSource, StaticSkillConfig};
//!
//! let config = StaticSkillConfig::new().with_value("weather", "default_zip_code", "10001");
//! let weather = config.section("weather").expect("section");
//!
//! assert_eq!(weather.get("default_zip_code"), Some("10001"));
//! assert!(config.section("twitch").is_err());
//! ```

use std::collections::HashMap;

use crate::SkillError;

pub const ENV_PREFIX: &str = "CELADON_SKILL";

pub trait SkillConfigSource: Send + Sync {
    /// Fails with a configuration error when nothing is configured for `name`.
    fn section(&self, name: &str) -> Result<SkillConfigSection, SkillError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillConfigSection {
    pub name: String,
    values: HashMap<String, String>,
}

impl SkillConfigSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Blank values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn require(&self, skill: &str, key: &str, config_command: &str) -> Result<&str, SkillError> {
        self.get(key)
            .ok_or_else(|| SkillError::missing_setting(skill, key, config_command))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// In-memory configuration, typically assembled by the host application.
#[derive(Debug, Clone, Default)]
pub struct StaticSkillConfig {
    sections: HashMap<String, SkillConfigSection>,
}

impl StaticSkillConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(
        mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(section, key, value);
        self
    }

    pub fn set(&mut self, section: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        let section = section.into();
        self.sections
            .entry(section.clone())
            .or_insert_with(|| SkillConfigSection::new(section))
            .values
            .insert(key.into(), value.into());
    }
}

impl SkillConfigSource for StaticSkillConfig {
    fn section(&self, name: &str) -> Result<SkillConfigSection, SkillError> {
        self.sections
            .get(name)
            .cloned()
            .ok_or_else(|| unconfigured(name))
    }
}

/// Reads `CELADON_SKILL_<SECTION>_<KEY>` variables; keys are lowercased.
#[derive(Debug, Clone, Default)]
pub struct EnvSkillConfig {
    snapshot: Option<Vec<(String, String)>>,
}

impl EnvSkillConfig {
    /// Reads the process environment on every lookup.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            snapshot: Some(
                vars.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    fn vars(&self) -> Vec<(String, String)> {
        match &self.snapshot {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        }
    }
}

impl SkillConfigSource for EnvSkillConfig {
    fn section(&self, name: &str) -> Result<SkillConfigSection, SkillError> {
        let prefix = format!("{ENV_PREFIX}_{}_", name.to_ascii_uppercase());
        let section = self
            .vars()
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .filter(|suffix| !suffix.is_empty())
                    .map(|suffix| (suffix.to_ascii_lowercase(), value))
            })
            .fold(SkillConfigSection::new(name), |section, (key, value)| {
                section.with_value(key, value)
            });

        if section.is_empty() {
            return Err(unconfigured(name));
        }
        Ok(section)
    }
}

fn unconfigured(name: &str) -> SkillError {
    SkillError::configuration(format!("no configuration found for '{name}'"))
        .with_context("section", name)
}

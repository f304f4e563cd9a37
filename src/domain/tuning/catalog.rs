use std::collections::HashMap;

use crate::domain::errors::ConfigError;

use super::variants::{EngineConfig, GameVariant};

/// Validated engine configuration for every variant the server can host.
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    configs: HashMap<GameVariant, EngineConfig>,
}

impl VariantCatalog {
    /// Built-in presets, unchanged.
    pub fn presets() -> Self {
        let configs = GameVariant::ALL
            .into_iter()
            .map(|variant| (variant, EngineConfig::for_variant(variant)))
            .collect();
        Self { configs }
    }

    pub fn get(&self, variant: GameVariant) -> Option<&EngineConfig> {
        self.configs.get(&variant)
    }

    /// Applies a TOML document on top of the presets.
    ///
    /// Top-level tables are keyed by variant slug and deep-merged onto that
    /// variant's preset, so a file only needs the fields it changes:
    ///
    /// ```toml
    /// [code-collection.scoring]
    /// collision_radius = 20.0
    /// ```
    ///
    /// Every merged config is validated; the first problem rejects the whole file.
    pub fn with_overrides_toml(mut self, text: &str) -> Result<Self, ConfigError> {
        let overrides: toml::Table =
            toml::from_str(text).map_err(|e| ConfigError::Tuning(e.to_string()))?;

        for (slug, patch) in overrides {
            let variant = GameVariant::from_slug(&slug)
                .ok_or_else(|| ConfigError::UnknownVariant(slug.clone()))?;
            if !patch.is_table() {
                return Err(ConfigError::Tuning(format!(
                    "`{slug}` must be a table of overrides"
                )));
            }

            let base = self
                .configs
                .get(&variant)
                .cloned()
                .unwrap_or_else(|| EngineConfig::for_variant(variant));
            let mut merged =
                toml::Value::try_from(&base).map_err(|e| ConfigError::Tuning(e.to_string()))?;
            merge(&mut merged, patch);

            let config: EngineConfig = merged
                .try_into()
                .map_err(|e: toml::de::Error| ConfigError::Tuning(format!("{slug}: {e}")))?;
            config.validate()?;
            self.configs.insert(variant, config);
        }

        Ok(self)
    }
}

impl Default for VariantCatalog {
    fn default() -> Self {
        Self::presets()
    }
}

fn merge(base: &mut toml::Value, patch: toml::Value) {
    match (base, patch) {
        (toml::Value::Table(base), toml::Value::Table(patch)) => {
            for (key, value) in patch {
                if let Some(existing) = base.get_mut(&key) {
                    merge(existing, value);
                    continue;
                }
                base.insert(key, value);
            }
        }
        (base, patch) => *base = patch,
    }
}

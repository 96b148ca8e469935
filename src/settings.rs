use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "LEADS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("at least one city is required")]
    MissingCities,

    #[error("at least one category is required")]
    MissingCategories,

    #[error("generator count must be greater than zero")]
    ZeroCount,

    #[error("generator count {count} exceeds max_attempts {max_attempts}")]
    CountExceedsAttempts { count: usize, max_attempts: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub places: PlacesSettings,
    pub generator: GeneratorSettings,
}

/// Search fan-out for the Maps scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesSettings {
    pub cities: Vec<String>,
    pub categories: Vec<String>,
    pub max_results_per_search: usize,
    /// Appended to every query text.
    pub country: String,
    pub country_code: String,
    pub language: String,
}

impl Default for PlacesSettings {
    fn default() -> Self {
        PlacesSettings {
            cities: vec!["Stockholm".into(), "Gothenburg".into(), "Malmö".into()],
            categories: vec!["café".into(), "gym".into(), "beauty salon".into()],
            max_results_per_search: 20,
            country: "Sweden".into(),
            country_code: "se".into(),
            language: "en".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub count: usize,
    pub max_attempts: usize,
    pub seed: Option<u64>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            count: 100,
            max_attempts: 10_000,
            seed: None,
        }
    }
}

/// `LEADS_GENERATOR__COUNT=50`, `LEADS_PLACES__CITIES=Uppsala,Lund`
pub fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("places.cities")
        .with_list_parse_key("places.categories")
        .try_parsing(true)
}

impl Settings {
    /// Defaults, then the optional file, then `LEADS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_from(path, env_source())
    }

    pub fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.places.cities.is_empty() {
            return Err(SettingsError::MissingCities);
        }
        if self.places.categories.is_empty() {
            return Err(SettingsError::MissingCategories);
        }
        if self.generator.count == 0 {
            return Err(SettingsError::ZeroCount);
        }
        if self.generator.count > self.generator.max_attempts {
            return Err(SettingsError::CountExceedsAttempts {
                count: self.generator.count,
                max_attempts: self.generator.max_attempts,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env_source().source(Some(map))
    }

    #[test]
    fn defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.places.cities.len(), 3);
        assert_eq!(s.places.max_results_per_search, 20);
        assert_eq!(s.generator.seed, None);
    }

    #[test]
    fn load_with_no_sources_gives_defaults() {
        let s = Settings::load_from(None, env(&[])).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let s = Settings::load_from(Some(Path::new("tests/fixtures/settings.toml")), env(&[])).unwrap();
        assert_eq!(s.places.cities, vec!["Uppsala".to_string()]);
        assert_eq!(s.places.categories, vec!["bakery".to_string(), "florist".to_string()]);
        assert_eq!(s.places.country, "Sweden");
        assert_eq!(s.places.max_results_per_search, 20);
        assert_eq!(s.generator.count, 25);
        assert_eq!(s.generator.seed, Some(7));
    }

    #[test]
    fn env_overrides_file() {
        let s = Settings::load_from(
            Some(Path::new("tests/fixtures/settings.toml")),
            env(&[
                ("LEADS_GENERATOR__COUNT", "5"),
                ("LEADS_PLACES__CITIES", "Lund,Umeå"),
            ]),
        )
        .unwrap();
        assert_eq!(s.generator.count, 5);
        assert_eq!(s.places.cities, vec!["Lund".to_string(), "Umeå".to_string()]);
        assert_eq!(s.generator.seed, Some(7));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load_from(Some(Path::new("tests/fixtures/nope.toml")), env(&[]));
        assert!(matches!(err, Err(SettingsError::Load(_))));
    }

    #[test]
    fn validation_errors() {
        let mut s = Settings::default();
        s.places.cities.clear();
        assert!(matches!(s.validate(), Err(SettingsError::MissingCities)));

        let mut s = Settings::default();
        s.places.categories.clear();
        assert!(matches!(s.validate(), Err(SettingsError::MissingCategories)));

        let mut s = Settings::default();
        s.generator.count = 0;
        assert!(matches!(s.validate(), Err(SettingsError::ZeroCount)));

        let mut s = Settings::default();
        s.generator.max_attempts = 10;
        let err = s.validate().unwrap_err();
        assert_eq!(err.to_string(), "generator count 100 exceeds max_attempts 10");
    }
}

//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading statutory
//! configurations from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{FinancialYear, PayPeriod};

use super::types::StatutoryConfig;

/// Loads and provides access to statutory configuration by financial year.
///
/// # Directory Structure
///
/// Every `.yaml` file in the directory holds one financial year:
/// ```text
/// config/statutory/
/// ├── 2024-25.yaml
/// └── 2025-26.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::FinancialYear;
///
/// let loader = ConfigLoader::load("./config/statutory").unwrap();
/// let config = loader.for_year(FinancialYear::new(2024)).unwrap();
/// println!("PF cap: {}", config.provident_fund.monthly_cap);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    configs: BTreeMap<FinancialYear, StatutoryConfig>,
}

impl ConfigLoader {
    /// Loads every `.yaml` file in `path`.
    ///
    /// Fails if the directory is missing or empty, if any file cannot be
    /// parsed or fails validation, or if two files claim the same year.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let dir = path.as_ref();
        let dir_str = dir.display().to_string();

        if !dir.is_dir() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut configs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                let config = Self::load_yaml::<StatutoryConfig>(&path)?;
                debug!(
                    path = %path.display(),
                    financial_year = %config.financial_year,
                    version = %config.version,
                    "Loaded statutory configuration"
                );
                configs.push(config);
            }
        }

        if configs.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no configuration files found)", dir_str),
            });
        }

        let loader = Self::from_configs(configs)?;
        info!(
            path = %dir_str,
            years = loader.configs.len(),
            "Statutory configuration ready"
        );
        Ok(loader)
    }

    /// Builds a loader from already-parsed records, validating each.
    pub fn from_configs(configs: Vec<StatutoryConfig>) -> EngineResult<Self> {
        let mut by_year = BTreeMap::new();
        for config in configs {
            config.validate()?;
            let year = config.financial_year;
            if by_year.insert(year, config).is_some() {
                return Err(EngineError::InvalidConfiguration {
                    financial_year: year.to_string(),
                    message: "more than one configuration file for this year".to_string(),
                });
            }
        }
        Ok(Self { configs: by_year })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the configuration for a financial year.
    ///
    /// # Errors
    ///
    /// `MissingConfiguration` when no file covers the year.
    pub fn for_year(&self, year: FinancialYear) -> EngineResult<&StatutoryConfig> {
        self.configs
            .get(&year)
            .ok_or_else(|| EngineError::MissingConfiguration {
                financial_year: year.to_string(),
            })
    }

    /// Returns the configuration governing a pay period.
    pub fn for_period(&self, period: &PayPeriod) -> EngineResult<&StatutoryConfig> {
        self.for_year(period.financial_year())
    }

    /// Returns the loaded financial years, oldest first.
    pub fn financial_years(&self) -> Vec<FinancialYear> {
        self.configs.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/statutory"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_shipped_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert!(loader.financial_years().contains(&FinancialYear::new(2024)));
        assert!(loader.financial_years().contains(&FinancialYear::new(2025)));
    }

    #[test]
    fn test_shipped_2024_values() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let config = loader.for_year(FinancialYear::new(2024)).unwrap();

        assert_eq!(config.provident_fund.monthly_cap, dec("1800"));
        assert_eq!(config.esi.eligibility_threshold, dec("21000"));
        assert_eq!(config.compensation.standard_working_days, 22);
        assert_eq!(config.tds.cess_rate, dec("0.04"));
    }

    #[test]
    fn test_for_period_uses_financial_year() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let march = PayPeriod::new(3, 2025).unwrap();
        let april = PayPeriod::new(4, 2025).unwrap();

        assert_eq!(
            loader.for_period(&march).unwrap().financial_year,
            FinancialYear::new(2024)
        );
        assert_eq!(
            loader.for_period(&april).unwrap().financial_year,
            FinancialYear::new(2025)
        );
    }

    #[test]
    fn test_missing_year_returns_missing_configuration() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.for_year(FinancialYear::new(2001)) {
            Err(EngineError::MissingConfiguration { financial_year }) => {
                assert_eq!(financial_year, "2001-02");
            }
            other => panic!("Expected MissingConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("/nonexistent/path"));
            }
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_empty_directory_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        match ConfigLoader::load(dir.path()) {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("no configuration files found"));
            }
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.yaml"), "financial_year: [unclosed").unwrap();

        match ConfigLoader::load(dir.path()) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.ends_with("broken.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_year_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let content = fs::read_to_string("./config/statutory/2024-25.yaml").unwrap();
        fs::write(dir.path().join("a.yaml"), &content).unwrap();
        fs::write(dir.path().join("b.yaml"), &content).unwrap();

        match ConfigLoader::load(dir.path()) {
            Err(EngineError::InvalidConfiguration { financial_year, .. }) => {
                assert_eq!(financial_year, "2024-25");
            }
            other => panic!("Expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_non_yaml_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let content = fs::read_to_string("./config/statutory/2024-25.yaml").unwrap();
        fs::write(dir.path().join("2024-25.yaml"), &content).unwrap();
        fs::write(dir.path().join("README.md"), "notes").unwrap();

        let loader = ConfigLoader::load(dir.path()).unwrap();
        assert_eq!(loader.financial_years(), vec![FinancialYear::new(2024)]);
    }
}

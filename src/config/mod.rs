//! Statutory configuration for the payroll engine.
//!
//! Tax slabs, PF ceilings, ESI thresholds, professional tax bands and the
//! compensation defaults change from year to year, so they live in one YAML
//! file per financial year rather than in code.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//! use payroll_engine::models::PayPeriod;
//!
//! let loader = ConfigLoader::load("./config/statutory").unwrap();
//! let period = PayPeriod::new(3, 2025).unwrap();
//! println!("Using {}", loader.for_period(&period).unwrap().version);
//! ```

mod loader;
mod settings;
mod types;

pub use loader::ConfigLoader;
pub use settings::ServerSettings;
pub use types::{
    CompensationDefaults, EsiConfig, ProfessionalTaxBand, ProfessionalTaxConfig,
    ProvidentFundConfig, StatutoryConfig, TaxSlab, TdsConfig,
};

//! Pay period and financial year models.
//!
//! This module contains the [`PayPeriod`] and [`FinancialYear`] types used to key
//! payroll records and to select the statutory configuration that applies.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The first month of an Indian financial year (April).
pub const FINANCIAL_YEAR_START_MONTH: u32 = 4;

/// One calendar month of payroll.
///
/// A payroll record is unique per `(employee_id, month, year)`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{FinancialYear, PayPeriod};
///
/// let period = PayPeriod::new(3, 2025).unwrap();
/// assert_eq!(period.label(), "March 2025");
/// assert_eq!(period.financial_year(), FinancialYear::new(2024));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The year (e.g. 2025).
    pub year: i32,
    /// The month, 1 (January) to 12 (December).
    pub month: u32,
}

impl PayPeriod {
    /// Creates a validated pay period.
    pub fn new(month: u32, year: i32) -> EngineResult<Self> {
        let period = Self { year, month };
        period.validate()?;
        Ok(period)
    }

    /// Checks that the month is 1..=12 and the year is representable.
    pub fn validate(&self) -> EngineResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(EngineError::invalid_input(
                "month",
                format!("{} is not a calendar month (1-12)", self.month),
            ));
        }
        if !(1900..=9999).contains(&self.year) {
            return Err(EngineError::invalid_input(
                "year",
                format!("{} is outside the supported range", self.year),
            ));
        }
        Ok(())
    }

    /// Returns the financial year (April-March) this period belongs to.
    pub fn financial_year(&self) -> FinancialYear {
        if self.month >= FINANCIAL_YEAR_START_MONTH {
            FinancialYear::new(self.year)
        } else {
            FinancialYear::new(self.year - 1)
        }
    }

    /// Returns the first day of the period.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Returns the number of calendar days in the period.
    pub fn days_in_month(&self) -> u32 {
        let Some(first) = self.first_day() else {
            return 0;
        };
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.map(|n| n.signed_duration_since(first).num_days() as u32)
            .unwrap_or(0)
    }

    /// Returns a human-readable label such as "March 2025".
    pub fn label(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown");
        format!("{} {}", name, self.year)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// A financial year running from April of `start_year` to March of the next year.
///
/// Serialized in the `"2024-25"` form.
///
/// # Example
///
/// ```
/// use payroll_engine::models::FinancialYear;
///
/// let fy: FinancialYear = "2024-25".parse().unwrap();
/// assert_eq!(fy.start_year(), 2024);
/// assert_eq!(fy.to_string(), "2024-25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FinancialYear {
    start_year: i32,
}

impl FinancialYear {
    /// Creates the financial year starting in April of `start_year`.
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Returns the financial year containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= FINANCIAL_YEAR_START_MONTH {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    /// The calendar year in which this financial year starts.
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Returns true if the pay period falls within this financial year.
    pub fn contains(&self, period: &PayPeriod) -> bool {
        period.financial_year() == *self
    }

    /// Returns the twelve pay periods of this financial year, April first.
    pub fn periods(&self) -> Vec<PayPeriod> {
        (0..12)
            .map(|offset| {
                let month = (FINANCIAL_YEAR_START_MONTH - 1 + offset) % 12 + 1;
                let year = if month >= FINANCIAL_YEAR_START_MONTH {
                    self.start_year
                } else {
                    self.start_year + 1
                };
                PayPeriod { year, month }
            })
            .collect()
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

impl FromStr for FinancialYear {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            EngineError::invalid_input(
                "financial_year",
                format!("'{}' is not of the form YYYY-YY", s),
            )
        };

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start_year: i32 = start.parse().map_err(|_| invalid())?;
        let end_suffix: i32 = end.parse().map_err(|_| invalid())?;

        if end.len() != 2 || end_suffix != (start_year + 1).rem_euclid(100) {
            return Err(invalid());
        }

        Ok(Self::new(start_year))
    }
}

impl TryFrom<String> for FinancialYear {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FinancialYear> for String {
    fn from(fy: FinancialYear) -> Self {
        fy.to_string()
    }
}

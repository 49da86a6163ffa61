//! Worked-time summary for a pay period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Most overtime hours accepted for one month (31 days of 24 hours).
pub const MAX_OVERTIME_HOURS: Decimal = Decimal::from_parts(744, 0, 0, false, 0);

/// Attendance and overtime figures for one employee in one pay period.
///
/// Only `overtime_hours` affects pay. Day counts are carried onto the payroll
/// record for reporting; absence does not reduce the base salary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkSummary {
    /// Hours worked beyond the standard schedule.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Working days in the period; falls back to the configured standard.
    #[serde(default)]
    pub standard_working_days: Option<u32>,
    /// Days the employee was present. Half days are allowed.
    #[serde(default)]
    pub days_present: Option<Decimal>,
}

impl WorkSummary {
    /// A summary with overtime only.
    pub fn with_overtime(overtime_hours: Decimal) -> Self {
        Self {
            overtime_hours,
            ..Self::default()
        }
    }

    /// Rejects negative hours or day counts, and more overtime than
    /// [`MAX_OVERTIME_HOURS`].
    pub fn validate(&self) -> EngineResult<()> {
        if self.overtime_hours < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "overtime_hours",
                format!("must not be negative, got {}", self.overtime_hours),
            ));
        }
        if self.overtime_hours > MAX_OVERTIME_HOURS {
            return Err(EngineError::invalid_input(
                "overtime_hours",
                format!(
                    "must not exceed {} hours in a month, got {}",
                    MAX_OVERTIME_HOURS, self.overtime_hours
                ),
            ));
        }
        if let Some(days) = self.days_present {
            if days < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    "days_present",
                    format!("must not be negative, got {}", days),
                ));
            }
        }
        if self.standard_working_days == Some(0) {
            return Err(EngineError::invalid_input(
                "standard_working_days",
                "must be at least one day",
            ));
        }
        Ok(())
    }
}

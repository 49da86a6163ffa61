//! Storage for employees, payroll records and TDS declarations.
//!
//! The engine only talks to the traits in this module. [`memory`] provides
//! concurrent in-memory implementations where every write to a single key is
//! atomic.

pub mod memory;

pub use memory::{InMemoryEmployeeStore, InMemoryPayrollStore, InMemoryTdsStore};

use chrono::{DateTime, Utc};

use crate::error::EngineResult;
use crate::models::{
    Employee, FinancialYear, PayPeriod, PayrollKey, PayrollRecord, PayrollStatus, TdsRecord,
};

/// Employee master data.
pub trait EmployeeStore: Send + Sync {
    /// Inserts or replaces an employee, returning the previous version if any.
    fn upsert(&self, employee: Employee) -> Option<Employee>;

    /// Fetches an employee by id.
    fn get(&self, employee_id: &str) -> EngineResult<Employee>;

    /// All employees ordered by id.
    fn list(&self) -> Vec<Employee>;

    /// Active employees ordered by id.
    fn list_active(&self) -> Vec<Employee> {
        self.list().into_iter().filter(Employee::is_active).collect()
    }
}

/// What an upsert did to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed for the key.
    Created,
    /// An existing record was overwritten.
    Replaced,
}

/// Payroll records keyed by `(employee_id, month, year)`.
pub trait PayrollStore: Send + Sync {
    /// Inserts the record, or replaces the one stored under the same key.
    ///
    /// A replacement keeps the stored `id` and `created_at`; everything else
    /// comes from `record`. The swap is atomic per key, so concurrent upserts
    /// for one key leave exactly one record holding one complete computation.
    ///
    /// # Errors
    ///
    /// `InvalidStatusTransition` if the stored record's status is further
    /// along than `record.status`. A paid record is never recomputed.
    fn upsert(&self, record: PayrollRecord) -> EngineResult<(PayrollRecord, UpsertOutcome)>;

    /// Inserts the record only if its key is free.
    ///
    /// # Errors
    ///
    /// `DuplicateComputation` if a record already exists for the key.
    fn create(&self, record: PayrollRecord) -> EngineResult<PayrollRecord>;

    /// Fetches the record for a key.
    fn get(&self, key: &PayrollKey) -> EngineResult<PayrollRecord>;

    /// Records for one pay period ordered by employee id.
    fn list_for_period(&self, period: PayPeriod) -> Vec<PayrollRecord>;

    /// Records whose period falls in a financial year, ordered by employee
    /// then period.
    fn list_for_financial_year(&self, financial_year: FinancialYear) -> Vec<PayrollRecord>;

    /// Moves a record's status forward.
    ///
    /// # Errors
    ///
    /// `PayrollNotFound` for an unknown key, `InvalidStatusTransition` for a
    /// backwards move.
    fn update_status(
        &self,
        key: &PayrollKey,
        status: PayrollStatus,
        now: DateTime<Utc>,
    ) -> EngineResult<PayrollRecord>;
}

/// TDS records keyed by `(employee_id, financial_year)`.
pub trait TdsStore: Send + Sync {
    /// Inserts or replaces the record for its employee and year.
    fn upsert(&self, record: TdsRecord) -> TdsRecord;

    /// Fetches the record for an employee and year.
    fn get(&self, employee_id: &str, financial_year: FinancialYear) -> EngineResult<TdsRecord>;
}

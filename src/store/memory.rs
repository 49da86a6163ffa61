//! In-memory stores backed by [`DashMap`].
//!
//! DashMap shards its locks, so writers to different keys never block each
//! other and a write through an entry guard is atomic for its key.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::{EmployeeStore, PayrollStore, TdsStore, UpsertOutcome};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, FinancialYear, PayPeriod, PayrollKey, PayrollRecord, PayrollStatus, TdsRecord,
};

/// Employees keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeStore {
    employees: DashMap<String, Employee>,
}

impl InMemoryEmployeeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmployeeStore for InMemoryEmployeeStore {
    fn upsert(&self, employee: Employee) -> Option<Employee> {
        self.employees.insert(employee.id.clone(), employee)
    }

    fn get(&self, employee_id: &str) -> EngineResult<Employee> {
        self.employees
            .get(employee_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    fn list(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> = self
            .employees
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        employees.sort_by(|a, b| a.id.cmp(&b.id));
        employees
    }
}

/// Payroll records keyed by employee and period.
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    records: DashMap<PayrollKey, PayrollRecord>,
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn collect_sorted<F>(&self, filter: F) -> Vec<PayrollRecord>
    where
        F: Fn(&PayrollRecord) -> bool,
    {
        let mut records: Vec<PayrollRecord> = self
            .records
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        records
    }
}

impl PayrollStore for InMemoryPayrollStore {
    fn upsert(&self, mut record: PayrollRecord) -> EngineResult<(PayrollRecord, UpsertOutcome)> {
        match self.records.entry(record.key()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get();
                if !existing.status.can_transition_to(record.status) {
                    return Err(EngineError::InvalidStatusTransition {
                        from: existing.status.to_string(),
                        to: record.status.to_string(),
                    });
                }
                record.id = existing.id;
                record.created_at = existing.created_at;
                entry.insert(record.clone());
                debug!(
                    employee_id = %record.employee_id,
                    period = %record.period,
                    record_id = %record.id,
                    "Payroll record replaced"
                );
                Ok((record, UpsertOutcome::Replaced))
            }
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                debug!(
                    employee_id = %record.employee_id,
                    period = %record.period,
                    record_id = %record.id,
                    "Payroll record created"
                );
                Ok((record, UpsertOutcome::Created))
            }
        }
    }

    fn create(&self, record: PayrollRecord) -> EngineResult<PayrollRecord> {
        match self.records.entry(record.key()) {
            Entry::Occupied(_) => Err(EngineError::DuplicateComputation {
                employee_id: record.employee_id,
                month: record.period.month,
                year: record.period.year,
            }),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    fn get(&self, key: &PayrollKey) -> EngineResult<PayrollRecord> {
        self.records
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(key))
    }

    fn list_for_period(&self, period: PayPeriod) -> Vec<PayrollRecord> {
        self.collect_sorted(|record| record.period == period)
    }

    fn list_for_financial_year(&self, financial_year: FinancialYear) -> Vec<PayrollRecord> {
        self.collect_sorted(|record| financial_year.contains(&record.period))
    }

    fn update_status(
        &self,
        key: &PayrollKey,
        status: PayrollStatus,
        now: DateTime<Utc>,
    ) -> EngineResult<PayrollRecord> {
        let mut entry = self.records.get_mut(key).ok_or_else(|| not_found(key))?;
        entry.transition_to(status, now)?;
        Ok(entry.value().clone())
    }
}

fn not_found(key: &PayrollKey) -> EngineError {
    EngineError::PayrollNotFound {
        employee_id: key.employee_id.clone(),
        month: key.period.month,
        year: key.period.year,
    }
}

/// TDS records keyed by employee and financial year.
#[derive(Debug, Default)]
pub struct InMemoryTdsStore {
    records: DashMap<(String, FinancialYear), TdsRecord>,
}

impl InMemoryTdsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TdsStore for InMemoryTdsStore {
    fn upsert(&self, record: TdsRecord) -> TdsRecord {
        let key = (
            record.declaration.employee_id.clone(),
            record.declaration.financial_year,
        );
        self.records.insert(key, record.clone());
        record
    }

    fn get(&self, employee_id: &str, financial_year: FinancialYear) -> EngineResult<TdsRecord> {
        self.records
            .get(&(employee_id.to_string(), financial_year))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::TdsNotFound {
                employee_id: employee_id.to_string(),
                financial_year: financial_year.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceSummary, CompensationProfile, EmployeeStatus, TdsComputation, TdsDeclaration,
    };
    use chrono::Duration;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use uuid::Uuid;

    fn employee(id: &str, status: EmployeeStatus) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Employee {}", id),
            department: None,
            designation: None,
            status,
            compensation: CompensationProfile::with_base_salary(Decimal::new(30000, 0)),
        }
    }

    fn record(employee_id: &str, month: u32, year: i32, net_pay: i64) -> PayrollRecord {
        let period = PayPeriod::new(month, year).unwrap();
        let now = Utc::now();
        PayrollRecord {
            id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            period,
            financial_year: period.financial_year(),
            config_version: "test".to_string(),
            base_salary: Decimal::new(net_pay, 0),
            allowances: BTreeMap::new(),
            overtime_hours: Decimal::ZERO,
            overtime_pay: Decimal::ZERO,
            gross_pay: Decimal::new(net_pay, 0),
            deductions: BTreeMap::new(),
            total_deductions: Decimal::ZERO,
            net_pay: Decimal::new(net_pay, 0),
            employer_contributions: BTreeMap::new(),
            esi_eligible: false,
            attendance: AttendanceSummary {
                standard_working_days: 22,
                days_present: None,
                days_absent: None,
            },
            status: PayrollStatus::Processed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_employee_list_active_filters_status() {
        let store = InMemoryEmployeeStore::new();
        store.upsert(employee("emp_002", EmployeeStatus::Active));
        store.upsert(employee("emp_001", EmployeeStatus::Active));
        store.upsert(employee("emp_003", EmployeeStatus::Inactive));

        let ids: Vec<String> = store.list_active().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["emp_001", "emp_002"]);
        assert_eq!(store.list().len(), 3);
    }

    #[test]
    fn test_employee_not_found() {
        let store = InMemoryEmployeeStore::new();
        assert!(matches!(
            store.get("missing"),
            Err(EngineError::EmployeeNotFound { .. })
        ));
    }

    #[test]
    fn test_upsert_replaces_values_and_keeps_identity() {
        let store = InMemoryPayrollStore::new();
        let first = record("emp_001", 6, 2024, 50000);
        let (stored, outcome) = store.upsert(first.clone()).unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let mut second = record("emp_001", 6, 2024, 51000);
        second.created_at = first.created_at + Duration::seconds(60);
        let (replaced, outcome) = store.upsert(second).unwrap();

        assert_eq!(outcome, UpsertOutcome::Replaced);
        assert_eq!(replaced.id, stored.id);
        assert_eq!(replaced.created_at, first.created_at);
        assert_eq!(replaced.net_pay, Decimal::new(51000, 0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_rejects_duplicate_key() {
        let store = InMemoryPayrollStore::new();
        store.create(record("emp_001", 6, 2024, 50000)).unwrap();

        match store.create(record("emp_001", 6, 2024, 50000)) {
            Err(EngineError::DuplicateComputation {
                employee_id,
                month,
                year,
            }) => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(month, 6);
                assert_eq!(year, 2024);
            }
            other => panic!("Expected DuplicateComputation, got {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_upserts_leave_one_record() {
        let store = Arc::new(InMemoryPayrollStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.upsert(record("emp_001", 6, 2024, 50000 + i)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 1);
        let key = PayrollKey::new("emp_001", PayPeriod::new(6, 2024).unwrap());
        let stored = store.get(&key).unwrap();
        // Whichever write won, its values are internally consistent.
        assert_eq!(stored.gross_pay, stored.net_pay);
    }

    #[test]
    fn test_list_for_financial_year_spans_calendar_years() {
        let store = InMemoryPayrollStore::new();
        store.upsert(record("emp_001", 3, 2024, 1)).unwrap();
        store.upsert(record("emp_001", 4, 2024, 1)).unwrap();
        store.upsert(record("emp_001", 3, 2025, 1)).unwrap();
        store.upsert(record("emp_001", 4, 2025, 1)).unwrap();

        let periods: Vec<String> = store
            .list_for_financial_year(FinancialYear::new(2024))
            .iter()
            .map(|r| r.period.to_string())
            .collect();
        assert_eq!(periods, vec!["2024-04", "2025-03"]);
    }

    #[test]
    fn test_list_for_period_is_sorted_by_employee() {
        let store = InMemoryPayrollStore::new();
        store.upsert(record("emp_002", 6, 2024, 1)).unwrap();
        store.upsert(record("emp_001", 6, 2024, 1)).unwrap();
        store.upsert(record("emp_001", 7, 2024, 1)).unwrap();

        let ids: Vec<String> = store
            .list_for_period(PayPeriod::new(6, 2024).unwrap())
            .into_iter()
            .map(|r| r.employee_id)
            .collect();
        assert_eq!(ids, vec!["emp_001", "emp_002"]);
    }

    #[test]
    fn test_update_status_moves_forward_only() {
        let store = InMemoryPayrollStore::new();
        let (stored, _) = store.upsert(record("emp_001", 6, 2024, 1)).unwrap();
        let key = stored.key();

        let paid = store
            .update_status(&key, PayrollStatus::Paid, Utc::now())
            .unwrap();
        assert_eq!(paid.status, PayrollStatus::Paid);

        assert!(matches!(
            store.update_status(&key, PayrollStatus::Pending, Utc::now()),
            Err(EngineError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_upsert_refuses_to_recompute_paid_record() {
        let store = InMemoryPayrollStore::new();
        let (stored, _) = store.upsert(record("emp_001", 6, 2024, 50000)).unwrap();
        store
            .update_status(&stored.key(), PayrollStatus::Paid, Utc::now())
            .unwrap();

        match store.upsert(record("emp_001", 6, 2024, 51000)) {
            Err(EngineError::InvalidStatusTransition { from, to }) => {
                assert_eq!(from, "paid");
                assert_eq!(to, "processed");
            }
            other => panic!("Expected InvalidStatusTransition, got {:?}", other),
        }

        let kept = store.get(&stored.key()).unwrap();
        assert_eq!(kept.status, PayrollStatus::Paid);
        assert_eq!(kept.net_pay, Decimal::new(50000, 0));
    }

    #[test]
    fn test_update_status_unknown_key() {
        let store = InMemoryPayrollStore::new();
        let key = PayrollKey::new("emp_404", PayPeriod::new(1, 2025).unwrap());
        assert!(matches!(
            store.update_status(&key, PayrollStatus::Paid, Utc::now()),
            Err(EngineError::PayrollNotFound { .. })
        ));
    }

    #[test]
    fn test_tds_store_round_trip() {
        let store = InMemoryTdsStore::new();
        let fy = FinancialYear::new(2024);
        let record = TdsRecord {
            declaration: TdsDeclaration {
                employee_id: "emp_001".to_string(),
                financial_year: fy,
                annual_salary: Decimal::new(600000, 0),
                section_80c: Decimal::ZERO,
                section_80d: Decimal::ZERO,
                hra_exemption: Decimal::ZERO,
                professional_tax: Decimal::ZERO,
                other_deductions: Decimal::ZERO,
            },
            computation: TdsComputation {
                annual_salary: Decimal::new(600000, 0),
                total_deductions: Decimal::ZERO,
                taxable_income: Decimal::new(600000, 0),
                slabs: vec![],
                tax_before_cess: Decimal::ZERO,
                cess: Decimal::ZERO,
                annual_tax: Decimal::ZERO,
                monthly_tds: Decimal::ZERO,
                declared: true,
            },
            config_version: "test".to_string(),
            updated_at: Utc::now(),
        };
        store.upsert(record.clone());

        assert_eq!(store.get("emp_001", fy).unwrap(), record);
        assert!(matches!(
            store.get("emp_001", FinancialYear::new(2025)),
            Err(EngineError::TdsNotFound { .. })
        ));
    }
}

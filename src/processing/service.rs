//! The payroll service: configuration, stores and engine wired together.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::calculation::{PayrollInput, compute_annual_tds, compute_payroll};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CompensationProfile, Employee, FinancialYear, PayPeriod, PayrollBreakdown, PayrollKey,
    PayrollRecord, PayrollStatus, TdsDeclaration, TdsRecord, WorkSummary,
};
use crate::report::{ComplianceReportType, ComplianceSummary, Payslip};
use crate::store::{
    EmployeeStore, InMemoryEmployeeStore, InMemoryPayrollStore, InMemoryTdsStore, PayrollStore,
    TdsStore, UpsertOutcome,
};

use super::batch::{BatchFailure, BatchItem, BatchResult, ProcessedPayroll, WriteMode};

/// Runs payroll operations against a configuration and a set of stores.
///
/// Cloning is cheap; clones share the same configuration and stores.
#[derive(Clone)]
pub struct PayrollService {
    config: Arc<ConfigLoader>,
    employees: Arc<dyn EmployeeStore>,
    payroll: Arc<dyn PayrollStore>,
    tds: Arc<dyn TdsStore>,
}

impl PayrollService {
    /// Creates a service over the given stores.
    pub fn new(
        config: ConfigLoader,
        employees: Arc<dyn EmployeeStore>,
        payroll: Arc<dyn PayrollStore>,
        tds: Arc<dyn TdsStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            employees,
            payroll,
            tds,
        }
    }

    /// Creates a service with empty in-memory stores.
    pub fn in_memory(config: ConfigLoader) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryEmployeeStore::new()),
            Arc::new(InMemoryPayrollStore::new()),
            Arc::new(InMemoryTdsStore::new()),
        )
    }

    /// The loaded statutory configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The employee store.
    pub fn employees(&self) -> &dyn EmployeeStore {
        self.employees.as_ref()
    }

    /// The payroll record store.
    pub fn payroll(&self) -> &dyn PayrollStore {
        self.payroll.as_ref()
    }

    /// The TDS record store.
    pub fn tds(&self) -> &dyn TdsStore {
        self.tds.as_ref()
    }

    /// Computes a breakdown without storing anything.
    ///
    /// Uses the employee's stored TDS declaration for the period's financial
    /// year when there is one.
    pub fn calculate(
        &self,
        employee_id: &str,
        profile: &CompensationProfile,
        period: PayPeriod,
        work: &WorkSummary,
    ) -> EngineResult<PayrollBreakdown> {
        period.validate()?;
        let config = self.config.for_period(&period)?;
        let declaration = self.declaration_for(employee_id, period.financial_year())?;

        compute_payroll(
            &PayrollInput {
                employee_id,
                profile,
                period,
                work,
                tds_declaration: declaration.as_ref(),
            },
            config,
        )
    }

    /// Computes and stores one employee's payroll for a period.
    ///
    /// The record is written with status `processed`. A record already marked
    /// `paid` is left untouched and the call fails with
    /// `InvalidStatusTransition`.
    pub fn process_employee(
        &self,
        employee: &Employee,
        period: PayPeriod,
        work: &WorkSummary,
        mode: WriteMode,
    ) -> EngineResult<ProcessedPayroll> {
        employee.validate()?;
        let breakdown = self.calculate(&employee.id, &employee.compensation, period, work)?;
        let record = PayrollRecord::from_breakdown(&breakdown, PayrollStatus::Processed, Utc::now());

        let (record, outcome) = match mode {
            WriteMode::Upsert => self.payroll.upsert(record)?,
            WriteMode::CreateOnly => (self.payroll.create(record)?, UpsertOutcome::Created),
        };

        debug!(
            employee_id = %employee.id,
            period = %period,
            net_pay = %record.net_pay,
            outcome = ?outcome,
            "Employee payroll processed"
        );

        Ok(ProcessedPayroll {
            record,
            breakdown,
            outcome,
        })
    }

    /// Processes payroll for every active employee.
    ///
    /// Employees are processed one at a time in id order. A failing employee is
    /// recorded in [`BatchResult::failures`] and the run continues. `cancel` is
    /// checked before each employee; once it fires the remaining employees are
    /// listed in [`BatchResult::not_attempted`].
    ///
    /// `work` supplies per-employee work summaries; employees without one are
    /// processed with no overtime.
    ///
    /// # Errors
    ///
    /// Only for problems that would fail every employee: an invalid period or
    /// no configuration for its financial year.
    pub fn process_payroll(
        &self,
        period: PayPeriod,
        work: &HashMap<String, WorkSummary>,
        mode: WriteMode,
        cancel: &CancellationToken,
    ) -> EngineResult<BatchResult> {
        period.validate()?;
        self.config.for_period(&period)?;

        let start_time = Instant::now();
        let employees = self.employees.list_active();
        info!(
            period = %period,
            employees = employees.len(),
            "Starting payroll run"
        );

        let default_work = WorkSummary::default();
        let mut result = BatchResult::new(period);

        for (index, employee) in employees.iter().enumerate() {
            if cancel.is_cancelled() {
                result.cancelled = true;
                result.not_attempted = employees[index..].iter().map(|e| e.id.clone()).collect();
                warn!(
                    period = %period,
                    not_attempted = result.not_attempted.len(),
                    "Payroll run cancelled"
                );
                break;
            }

            let summary = work.get(&employee.id).unwrap_or(&default_work);
            match self.process_employee(employee, period, summary, mode) {
                Ok(processed) => {
                    result.total_net_pay =
                        result.total_net_pay.saturating_add(processed.record.net_pay);
                    result.processed.push(BatchItem {
                        employee_id: employee.id.clone(),
                        record_id: processed.record.id,
                        gross_pay: processed.record.gross_pay,
                        net_pay: processed.record.net_pay,
                        replaced: processed.outcome == UpsertOutcome::Replaced,
                    });
                }
                Err(err) => {
                    warn!(
                        employee_id = %employee.id,
                        period = %period,
                        error = %err,
                        "Employee payroll failed"
                    );
                    result.failures.push(BatchFailure::new(employee.id.clone(), &err));
                }
            }
        }

        info!(
            period = %period,
            processed = result.processed.len(),
            failed = result.failures.len(),
            cancelled = result.cancelled,
            total_net_pay = %result.total_net_pay,
            duration_us = start_time.elapsed().as_micros(),
            "Payroll run finished"
        );

        Ok(result)
    }

    /// Processes one employee and returns the payslip for the stored record.
    pub fn generate_payslip(
        &self,
        employee_id: &str,
        period: PayPeriod,
        work: &WorkSummary,
    ) -> EngineResult<Payslip> {
        let employee = self.employees.get(employee_id)?;
        let processed = self.process_employee(&employee, period, work, WriteMode::Upsert)?;
        Payslip::from_record(&employee, &processed.record, Utc::now())
    }

    /// Builds the payslip for an already stored record.
    pub fn payslip(&self, employee_id: &str, period: PayPeriod) -> EngineResult<Payslip> {
        let employee = self.employees.get(employee_id)?;
        let record = self.payroll.get(&PayrollKey::new(employee_id, period))?;
        Payslip::from_record(&employee, &record, Utc::now())
    }

    /// Computes the annual tax for a declaration and stores it.
    ///
    /// Later payroll runs for the same employee and year deduct the stored
    /// monthly instalment.
    pub fn compute_tds(&self, declaration: TdsDeclaration) -> EngineResult<TdsRecord> {
        let config = self.config.for_year(declaration.financial_year)?;
        let computation = compute_annual_tds(&declaration, &config.tds, true)?;

        info!(
            employee_id = %declaration.employee_id,
            financial_year = %declaration.financial_year,
            annual_tax = %computation.annual_tax,
            monthly_tds = %computation.monthly_tds,
            "TDS declaration computed"
        );

        Ok(self.tds.upsert(TdsRecord {
            declaration,
            computation,
            config_version: config.version.clone(),
            updated_at: Utc::now(),
        }))
    }

    /// Moves a stored record's status forward.
    pub fn update_status(
        &self,
        employee_id: &str,
        period: PayPeriod,
        status: PayrollStatus,
    ) -> EngineResult<PayrollRecord> {
        self.payroll
            .update_status(&PayrollKey::new(employee_id, period), status, Utc::now())
    }

    /// Summarizes stored records for a financial year.
    pub fn compliance_summary(
        &self,
        report_type: ComplianceReportType,
        financial_year: FinancialYear,
    ) -> ComplianceSummary {
        let records = self.payroll.list_for_financial_year(financial_year);
        ComplianceSummary::build(report_type, financial_year, &records, Utc::now())
    }

    fn declaration_for(
        &self,
        employee_id: &str,
        financial_year: FinancialYear,
    ) -> EngineResult<Option<TdsDeclaration>> {
        match self.tds.get(employee_id, financial_year) {
            Ok(record) => Ok(Some(record.declaration)),
            Err(EngineError::TdsNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

//! Statutory compliance summaries.
//!
//! A summary aggregates stored payroll records for one financial year into
//! per-employee totals and grand totals, for PF, ESI, professional tax, TDS or
//! all four together.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DEDUCTION_ESI, DEDUCTION_PF, DEDUCTION_PROFESSIONAL_TAX, DEDUCTION_TDS, FinancialYear,
    PayrollRecord, RESERVED_EMPLOYEE_ID,
};

/// Which statutory figures a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceReportType {
    /// Provident fund, employee and employer.
    #[serde(rename = "pf")]
    ProvidentFund,
    /// ESI, employee and employer.
    Esi,
    /// Professional tax.
    #[serde(rename = "pt")]
    ProfessionalTax,
    /// Income tax deducted at source.
    Tds,
    /// Every column.
    All,
}

impl ComplianceReportType {
    /// The short name used in URLs and file names.
    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceReportType::ProvidentFund => "pf",
            ComplianceReportType::Esi => "esi",
            ComplianceReportType::ProfessionalTax => "pt",
            ComplianceReportType::Tds => "tds",
            ComplianceReportType::All => "all",
        }
    }

    fn columns(self) -> &'static [Column] {
        match self {
            ComplianceReportType::ProvidentFund => &[Column::PfEmployee, Column::PfEmployer],
            ComplianceReportType::Esi => &[Column::EsiEmployee, Column::EsiEmployer],
            ComplianceReportType::ProfessionalTax => &[Column::ProfessionalTax],
            ComplianceReportType::Tds => &[Column::Tds],
            ComplianceReportType::All => &[
                Column::PfEmployee,
                Column::PfEmployer,
                Column::EsiEmployee,
                Column::EsiEmployer,
                Column::ProfessionalTax,
                Column::Tds,
            ],
        }
    }
}

impl fmt::Display for ComplianceReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceReportType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pf" | "provident_fund" => Ok(ComplianceReportType::ProvidentFund),
            "esi" => Ok(ComplianceReportType::Esi),
            "pt" | "professional_tax" => Ok(ComplianceReportType::ProfessionalTax),
            "tds" => Ok(ComplianceReportType::Tds),
            "all" => Ok(ComplianceReportType::All),
            other => Err(EngineError::invalid_input(
                "report_type",
                format!("unknown report type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Column {
    PfEmployee,
    PfEmployer,
    EsiEmployee,
    EsiEmployer,
    ProfessionalTax,
    Tds,
}

impl Column {
    fn header(self) -> &'static str {
        match self {
            Column::PfEmployee => "pf_employee",
            Column::PfEmployer => "pf_employer",
            Column::EsiEmployee => "esi_employee",
            Column::EsiEmployer => "esi_employer",
            Column::ProfessionalTax => "professional_tax",
            Column::Tds => "tds",
        }
    }

    fn value(self, totals: &ComplianceTotals) -> Decimal {
        match self {
            Column::PfEmployee => totals.pf_employee,
            Column::PfEmployer => totals.pf_employer,
            Column::EsiEmployee => totals.esi_employee,
            Column::EsiEmployer => totals.esi_employer,
            Column::ProfessionalTax => totals.professional_tax,
            Column::Tds => totals.tds,
        }
    }
}

/// Summed statutory figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceTotals {
    /// Number of monthly records summed.
    pub months: u32,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Employee PF.
    pub pf_employee: Decimal,
    /// Employer PF.
    pub pf_employer: Decimal,
    /// Employee ESI.
    pub esi_employee: Decimal,
    /// Employer ESI.
    pub esi_employer: Decimal,
    /// Professional tax.
    pub professional_tax: Decimal,
    /// TDS.
    pub tds: Decimal,
}

// Sums saturate so a corrupt stored record cannot panic a report.
impl ComplianceTotals {
    fn add_record(&mut self, record: &PayrollRecord) {
        self.months = self.months.saturating_add(1);
        self.gross_pay = self.gross_pay.saturating_add(record.gross_pay);
        self.pf_employee = self.pf_employee.saturating_add(record.deduction(DEDUCTION_PF));
        self.pf_employer = self
            .pf_employer
            .saturating_add(record.employer_contribution(DEDUCTION_PF));
        self.esi_employee = self.esi_employee.saturating_add(record.deduction(DEDUCTION_ESI));
        self.esi_employer = self
            .esi_employer
            .saturating_add(record.employer_contribution(DEDUCTION_ESI));
        self.professional_tax = self
            .professional_tax
            .saturating_add(record.deduction(DEDUCTION_PROFESSIONAL_TAX));
        self.tds = self.tds.saturating_add(record.deduction(DEDUCTION_TDS));
    }

    fn add(&mut self, other: &ComplianceTotals) {
        self.months = self.months.saturating_add(other.months);
        self.gross_pay = self.gross_pay.saturating_add(other.gross_pay);
        self.pf_employee = self.pf_employee.saturating_add(other.pf_employee);
        self.pf_employer = self.pf_employer.saturating_add(other.pf_employer);
        self.esi_employee = self.esi_employee.saturating_add(other.esi_employee);
        self.esi_employer = self.esi_employer.saturating_add(other.esi_employer);
        self.professional_tax = self.professional_tax.saturating_add(other.professional_tax);
        self.tds = self.tds.saturating_add(other.tds);
    }
}

/// One employee's row in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRow {
    /// The employee.
    pub employee_id: String,
    /// The employee's totals for the year.
    #[serde(flatten)]
    pub totals: ComplianceTotals,
}

/// A compliance summary for one financial year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    /// What the summary covers.
    pub report_type: ComplianceReportType,
    /// The financial year summarized.
    pub financial_year: FinancialYear,
    /// Per-employee rows ordered by employee id.
    pub rows: Vec<ComplianceRow>,
    /// Sum over all rows.
    pub totals: ComplianceTotals,
    /// When the summary was built.
    pub generated_at: DateTime<Utc>,
}

impl ComplianceSummary {
    /// Builds a summary from stored records.
    ///
    /// Records outside `financial_year` are ignored.
    pub fn build(
        report_type: ComplianceReportType,
        financial_year: FinancialYear,
        records: &[PayrollRecord],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut per_employee: BTreeMap<&str, ComplianceTotals> = BTreeMap::new();
        for record in records
            .iter()
            .filter(|record| financial_year.contains(&record.period))
        {
            per_employee
                .entry(record.employee_id.as_str())
                .or_default()
                .add_record(record);
        }

        let mut totals = ComplianceTotals::default();
        let rows = per_employee
            .into_iter()
            .map(|(employee_id, employee_totals)| {
                totals.add(&employee_totals);
                ComplianceRow {
                    employee_id: employee_id.to_string(),
                    totals: employee_totals,
                }
            })
            .collect();

        Self {
            report_type,
            financial_year,
            rows,
            totals,
            generated_at,
        }
    }

    /// Renders the summary as CSV with a header row and a closing `TOTAL` row.
    ///
    /// Columns are `employee_id,months,gross_pay` followed by the figures the
    /// report type covers.
    pub fn to_csv(&self) -> EngineResult<String> {
        let columns = self.report_type.columns();
        let mut out = String::new();

        let mut header = vec!["employee_id", "months", "gross_pay"];
        header.extend(columns.iter().map(|c| c.header()));
        out.push_str(&header.join(","));
        out.push('\n');

        let mut write_row = |label: &str, totals: &ComplianceTotals| {
            let mut fields = vec![
                csv_field(label),
                totals.months.to_string(),
                format!("{:.2}", totals.gross_pay),
            ];
            fields.extend(columns.iter().map(|c| format!("{:.2}", c.value(totals))));
            out.push_str(&fields.join(","));
            out.push('\n');
        };

        for row in &self.rows {
            if row.employee_id.trim().eq_ignore_ascii_case(RESERVED_EMPLOYEE_ID) {
                return Err(EngineError::invalid_input(
                    "employee_id",
                    format!("'{}' is reserved in compliance exports", RESERVED_EMPLOYEE_ID),
                ));
            }
            write_row(&row.employee_id, &row.totals);
        }
        write_row(RESERVED_EMPLOYEE_ID, &self.totals);

        Ok(out)
    }

    /// Suggested download file name, e.g. `compliance-pf-2024-25.csv`.
    pub fn csv_file_name(&self) -> String {
        format!(
            "compliance-{}-{}.csv",
            self.report_type, self.financial_year
        )
    }
}

/// Quotes a CSV field when it contains a separator, quote or line break.
///
/// Only free-text columns go through here; the numeric columns are written
/// with `{:.2}` and never need quoting.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

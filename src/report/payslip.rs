//! Payslip assembly and rendering.
//!
//! A [`Payslip`] is a read-only view over a stored [`PayrollRecord`] and the
//! employee's identity. Nothing is recomputed; every figure comes from the
//! record.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ALLOWANCE_CONVEYANCE, ALLOWANCE_HRA, ALLOWANCE_MEDICAL, ALLOWANCE_SPECIAL,
    AttendanceSummary, DEDUCTION_ESI, DEDUCTION_PF, DEDUCTION_PROFESSIONAL_TAX, DEDUCTION_TDS,
    Employee, FinancialYear, PayPeriod, PayrollRecord, PayrollStatus,
};

/// Output format for a rendered payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayslipFormat {
    /// The structured payslip as JSON.
    #[default]
    Json,
    /// A standalone HTML document.
    Html,
    /// Fixed-width plain text.
    Text,
}

impl FromStr for PayslipFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(PayslipFormat::Json),
            "html" => Ok(PayslipFormat::Html),
            "text" | "txt" => Ok(PayslipFormat::Text),
            other => Err(EngineError::invalid_input(
                "format",
                format!("unsupported payslip format '{}'", other),
            )),
        }
    }
}

/// One labelled amount on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipLine {
    /// Printed label.
    pub label: String,
    /// Amount.
    pub amount: Decimal,
}

impl PayslipLine {
    fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// A rendered-ready payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Id of the payroll record this payslip shows.
    pub record_id: Uuid,
    /// Employee id.
    pub employee_id: String,
    /// Employee name.
    pub employee_name: String,
    /// Department, if known.
    pub department: Option<String>,
    /// Designation, if known.
    pub designation: Option<String>,
    /// The pay period.
    pub period: PayPeriod,
    /// Financial year of the period.
    pub financial_year: FinancialYear,
    /// Base salary, allowances and overtime, in print order.
    pub earnings: Vec<PayslipLine>,
    /// Employee deductions, in print order.
    pub deductions: Vec<PayslipLine>,
    /// Employer contributions, shown for information.
    pub employer_contributions: Vec<PayslipLine>,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Net pay.
    pub net_pay: Decimal,
    /// Attendance for the period.
    pub attendance: AttendanceSummary,
    /// Status of the underlying record.
    pub status: PayrollStatus,
    /// When this payslip was assembled.
    pub generated_at: DateTime<Utc>,
}

const EARNING_LABELS: [(&str, &str); 4] = [
    (ALLOWANCE_HRA, "House Rent Allowance"),
    (ALLOWANCE_CONVEYANCE, "Conveyance Allowance"),
    (ALLOWANCE_MEDICAL, "Medical Allowance"),
    (ALLOWANCE_SPECIAL, "Special Allowance"),
];

const DEDUCTION_LABELS: [(&str, &str); 4] = [
    (DEDUCTION_PF, "Provident Fund"),
    (DEDUCTION_ESI, "Employee State Insurance"),
    (DEDUCTION_PROFESSIONAL_TAX, "Professional Tax"),
    (DEDUCTION_TDS, "Income Tax (TDS)"),
];

fn label_for(labels: &[(&str, &'static str)], key: &str) -> String {
    labels
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| key.replace('_', " "))
}

/// Orders known keys first in `labels` order, then any others alphabetically.
fn lines(
    labels: &[(&str, &'static str)],
    amounts: &std::collections::BTreeMap<String, Decimal>,
) -> Vec<PayslipLine> {
    let mut out: Vec<PayslipLine> = labels
        .iter()
        .filter_map(|(key, label)| amounts.get(*key).map(|amount| PayslipLine::new(*label, *amount)))
        .collect();
    out.extend(
        amounts
            .iter()
            .filter(|(key, _)| !labels.iter().any(|(k, _)| *k == key.as_str()))
            .map(|(key, amount)| PayslipLine::new(label_for(labels, key), *amount)),
    );
    out
}

impl Payslip {
    /// Assembles a payslip from an employee and their stored record.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the record belongs to a different employee.
    pub fn from_record(
        employee: &Employee,
        record: &PayrollRecord,
        generated_at: DateTime<Utc>,
    ) -> EngineResult<Self> {
        if employee.id != record.employee_id {
            return Err(EngineError::invalid_input(
                "employee_id",
                format!(
                    "record belongs to '{}', not '{}'",
                    record.employee_id, employee.id
                ),
            ));
        }

        let mut earnings = vec![PayslipLine::new("Basic Salary", record.base_salary)];
        earnings.extend(lines(&EARNING_LABELS, &record.allowances));
        if !record.overtime_pay.is_zero() {
            earnings.push(PayslipLine::new(
                format!("Overtime ({}h)", record.overtime_hours.normalize()),
                record.overtime_pay,
            ));
        }

        Ok(Self {
            record_id: record.id,
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            department: employee.department.clone(),
            designation: employee.designation.clone(),
            period: record.period,
            financial_year: record.financial_year,
            earnings,
            deductions: lines(&DEDUCTION_LABELS, &record.deductions),
            employer_contributions: lines(&DEDUCTION_LABELS, &record.employer_contributions),
            gross_pay: record.gross_pay,
            total_deductions: record.total_deductions,
            net_pay: record.net_pay,
            attendance: record.attendance.clone(),
            status: record.status,
            generated_at,
        })
    }

    /// Renders fixed-width plain text.
    pub fn render_text(&self) -> String {
        const WIDTH: usize = 48;
        let rule = "-".repeat(WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "PAYSLIP - {}", self.period.label());
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Employee: {} ({})", self.employee_name, self.employee_id);
        if let Some(department) = &self.department {
            let _ = writeln!(out, "Department: {}", department);
        }
        if let Some(designation) = &self.designation {
            let _ = writeln!(out, "Designation: {}", designation);
        }
        let _ = writeln!(out, "Financial year: {}", self.financial_year);
        let _ = writeln!(
            out,
            "Working days: {}",
            self.attendance.standard_working_days
        );
        if let Some(present) = self.attendance.days_present {
            let _ = writeln!(out, "Days present: {}", present.normalize());
        }

        let mut section = |title: &str, lines: &[PayslipLine], total: Option<(&str, Decimal)>| {
            let _ = writeln!(out, "{}", rule);
            let _ = writeln!(out, "{}", title);
            for line in lines {
                let _ = writeln!(out, "  {:<30}{:>14}", line.label, money(line.amount));
            }
            if let Some((label, amount)) = total {
                let _ = writeln!(out, "  {:<30}{:>14}", label, money(amount));
            }
        };

        section("EARNINGS", &self.earnings, Some(("Gross Pay", self.gross_pay)));
        section(
            "DEDUCTIONS",
            &self.deductions,
            Some(("Total Deductions", self.total_deductions)),
        );
        section("EMPLOYER CONTRIBUTIONS", &self.employer_contributions, None);

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "  {:<30}{:>14}", "NET PAY", money(self.net_pay));
        out
    }

    /// Renders a standalone HTML document. User-supplied text is escaped.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        let title = format!(
            "Payslip - {} - {}",
            html_escape(&self.employee_name),
            self.period.label()
        );

        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n",
            title
        );
        let _ = writeln!(out, "<h1>Payslip for {}</h1>", self.period.label());
        let _ = writeln!(out, "<table class=\"employee\">");
        let mut identity = vec![
            ("Employee", html_escape(&self.employee_name)),
            ("Employee ID", html_escape(&self.employee_id)),
        ];
        if let Some(department) = &self.department {
            identity.push(("Department", html_escape(department)));
        }
        if let Some(designation) = &self.designation {
            identity.push(("Designation", html_escape(designation)));
        }
        identity.push(("Financial Year", self.financial_year.to_string()));
        identity.push((
            "Working Days",
            self.attendance.standard_working_days.to_string(),
        ));
        for (label, value) in identity {
            let _ = writeln!(out, "<tr><th>{}</th><td>{}</td></tr>", label, value);
        }
        let _ = writeln!(out, "</table>");

        html_table(&mut out, "Earnings", &self.earnings, Some(("Gross Pay", self.gross_pay)));
        html_table(
            &mut out,
            "Deductions",
            &self.deductions,
            Some(("Total Deductions", self.total_deductions)),
        );
        html_table(
            &mut out,
            "Employer Contributions",
            &self.employer_contributions,
            None,
        );

        let _ = writeln!(
            out,
            "<p class=\"net-pay\"><strong>Net Pay: &#8377;{}</strong></p>",
            money(self.net_pay)
        );
        out.push_str("</body>\n</html>\n");
        out
    }
}

fn html_table(out: &mut String, title: &str, lines: &[PayslipLine], total: Option<(&str, Decimal)>) {
    let _ = writeln!(out, "<h2>{}</h2>", title);
    let _ = writeln!(out, "<table>");
    for line in lines {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td class=\"amount\">{}</td></tr>",
            html_escape(&line.label),
            money(line.amount)
        );
    }
    if let Some((label, amount)) = total {
        let _ = writeln!(
            out,
            "<tr class=\"total\"><th>{}</th><th class=\"amount\">{}</th></tr>",
            label,
            money(amount)
        );
    }
    let _ = writeln!(out, "</table>");
}

/// Formats an amount with exactly two decimal places.
fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Escapes the HTML special characters in text content and attribute values.
fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

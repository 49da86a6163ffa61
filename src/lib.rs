//! Payroll and statutory deduction engine
//!
//! This crate computes monthly payroll for Indian employers: gross pay from a
//! compensation profile, employee and employer provident fund, ESI,
//! professional tax and TDS, and net pay. Every computation is pure and
//! carries an audit trace. Records are stored per employee and pay period,
//! rendered as payslips and aggregated into compliance summaries.
//!
//! Statutory rates and thresholds are read from one YAML file per financial
//! year; see [`config::ConfigLoader`].

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod processing;
pub mod report;
pub mod store;

//! Data models for extracted invoices, operator overrides and configuration.

pub mod config;
pub mod manual;
pub mod record;

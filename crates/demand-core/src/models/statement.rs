//! Statement (payment ledger) data models.

use std::collections::BTreeMap;

use serde::Serialize;

use super::canonical::{Canonical, CanonicalDate, Money, Percent};
use crate::statement::ColumnMapping;

/// Canonical role a CSV column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    RevenueDate,
    Revenue,
    Collected,
    Status,
    CollectionDate,
    Method,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 6] = [
        ColumnRole::RevenueDate,
        ColumnRole::Revenue,
        ColumnRole::Collected,
        ColumnRole::Status,
        ColumnRole::CollectionDate,
        ColumnRole::Method,
    ];

    /// Canonicalized header spellings accepted for this role.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ColumnRole::RevenueDate => &["revenue_date", "date", "payment_date"],
            ColumnRole::Revenue => &["revenue", "gross_revenue", "amount"],
            ColumnRole::Collected => &["collected", "pipe_collected", "to_pipe", "remitted"],
            ColumnRole::Status => &["status", "result"],
            ColumnRole::CollectionDate => &["collection_date", "collected_date", "remit_date"],
            ColumnRole::Method => &["method", "payment_method"],
        }
    }

    /// Human label, used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::RevenueDate => "Revenue Date",
            ColumnRole::Revenue => "Revenue",
            ColumnRole::Collected => "Collected",
            ColumnRole::Status => "Status",
            ColumnRole::CollectionDate => "Collection Date",
            ColumnRole::Method => "Method",
        }
    }

    /// Required roles must be present before any row is read.
    pub fn is_required(&self) -> bool {
        matches!(self, ColumnRole::RevenueDate | ColumnRole::Revenue)
    }
}

/// Totals accumulated over a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementAggregate {
    /// Revenue of every counted row.
    pub total_revenue: Money,
    /// Collected amounts of rows with a successful status.
    pub total_collected: Money,
    /// Data rows iterated, including filtered and skipped ones.
    pub rows_processed: usize,
    /// Rows that contributed to the totals.
    pub rows_counted: usize,
    /// Rows dated before the effective date.
    pub rows_filtered: usize,
    /// Rows dropped because a cell could not be parsed.
    pub rows_skipped: usize,
    /// Revenue-share rate as supplied.
    pub rr_percent: Canonical<Percent>,
    /// `total_revenue × rate`, present when a rate parsed.
    pub rr_amount: Option<Money>,
    /// `max(0, rr_amount − total_collected)`, present when a rate parsed.
    pub shortfall: Option<Money>,
    /// Effective-date filter, if one parsed.
    pub effective_date_applied: Option<CanonicalDate>,
    /// Header row as read.
    pub columns: Vec<String>,
    /// Role assignment for the header row.
    pub mapping: ColumnMapping,
    /// Successful collections grouped by canonical status.
    pub collected_by_status: BTreeMap<String, Money>,
    /// Most recent successful collection.
    pub last_collection_date: Option<CanonicalDate>,
}

impl StatementAggregate {
    /// Response shape handed to callers.
    pub fn report(&self) -> StatementReport {
        let metrics = StatementMetrics {
            total_revenue: self.total_revenue.to_string(),
            successful_payments: self.total_collected.to_string(),
            rr_percent: self.rr_percent.display_opt(),
            rr_amount: self.rr_amount.map(|m| m.to_string()),
            shortfall: self.shortfall.map(|m| m.to_string()),
        };

        let fill = StatementFill {
            total_revenue: metrics.total_revenue.clone(),
            successful_payments: metrics.successful_payments.clone(),
            rr_percent: metrics.rr_percent.clone().unwrap_or_default(),
            rr_amount: metrics.rr_amount.clone().unwrap_or_default(),
            shortfall: metrics.shortfall.clone().unwrap_or_default(),
            last_payment_date: self
                .last_collection_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
        };

        StatementReport {
            ok: true,
            inputs_detected: InputsDetected {
                revenue_rows_processed: self.rows_processed,
                effective_date_applied: self.effective_date_applied.map(|d| d.to_string()),
                columns: self.columns.clone(),
                column_roles: self
                    .mapping
                    .iter()
                    .map(|(role, column)| (role, column.header.clone()))
                    .collect(),
            },
            metrics,
            fill,
        }
    }
}

/// JSON report for a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementReport {
    pub ok: bool,
    pub inputs_detected: InputsDetected,
    pub metrics: StatementMetrics,
    pub fill: StatementFill,
}

/// What the aggregator saw, for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputsDetected {
    pub revenue_rows_processed: usize,
    pub effective_date_applied: Option<String>,
    pub columns: Vec<String>,
    pub column_roles: BTreeMap<ColumnRole, String>,
}

/// Canonical display strings, `null` when not computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementMetrics {
    pub total_revenue: String,
    pub successful_payments: String,
    pub rr_percent: Option<String>,
    pub rr_amount: Option<String>,
    pub shortfall: Option<String>,
}

/// Form auto-fill values, empty strings instead of `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFill {
    pub total_revenue: String,
    pub successful_payments: String,
    pub rr_percent: String,
    pub rr_amount: String,
    pub shortfall: String,
    pub last_payment_date: String,
}

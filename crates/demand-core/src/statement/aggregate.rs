//! Statement aggregation: revenue, successful collections, amount due and shortfall.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, trace, warn};

use super::columns::ColumnMapping;
use super::Result;
use crate::error::StatementError;
use crate::extract::rules::{parse_amount, parse_date, parse_percent};
use crate::models::canonical::{Canonical, CanonicalDate, Money};
use crate::models::config::StatementConfig;
use crate::models::statement::{ColumnRole, StatementAggregate};

/// Caller-supplied inputs, both free-form text.
#[derive(Debug, Clone, Default)]
pub struct StatementOptions {
    /// Only count revenue dated on or after this date.
    pub effective_date: Option<String>,
    /// Revenue-share rate used to compute the amount due.
    pub rr_percent: Option<String>,
}

impl StatementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the effective-date filter.
    pub fn with_effective_date(mut self, date: impl Into<String>) -> Self {
        self.effective_date = Some(date.into());
        self
    }

    /// Set the revenue-share rate.
    pub fn with_rr_percent(mut self, rate: impl Into<String>) -> Self {
        self.rr_percent = Some(rate.into());
        self
    }
}

/// What happened to a single data row.
#[derive(Debug)]
enum RowOutcome {
    /// Dated before the effective date.
    Filtered,
    /// A cell could not be parsed.
    Malformed(String),
    Counted(ParsedRow),
}

#[derive(Debug)]
struct ParsedRow {
    revenue: Money,
    collected: Money,
    status: Option<String>,
    successful: bool,
    paid_on: Option<NaiveDate>,
}

/// Running totals over counted rows.
#[derive(Debug, Default)]
struct Totals {
    revenue: Money,
    collected: Money,
    collected_by_status: BTreeMap<String, Money>,
    last_collection_date: Option<NaiveDate>,
}

impl Totals {
    /// Add a row, or leave the totals untouched when a sum would overflow.
    fn add(&mut self, row: ParsedRow) -> std::result::Result<(), String> {
        let overflow = |what: &str| format!("{} total out of range", what);

        let revenue = self
            .revenue
            .checked_add(row.revenue)
            .ok_or_else(|| overflow("revenue"))?;

        if !row.successful {
            self.revenue = revenue;
            return Ok(());
        }

        let collected = self
            .collected
            .checked_add(row.collected)
            .ok_or_else(|| overflow("collected"))?;
        let key = row.status.unwrap_or_else(|| "unknown".to_string());
        let by_status = self
            .collected_by_status
            .get(&key)
            .copied()
            .unwrap_or_default()
            .checked_add(row.collected)
            .ok_or_else(|| overflow("collected"))?;

        self.revenue = revenue;
        self.collected = collected;
        self.collected_by_status.insert(key, by_status);
        if row.collected.is_positive() {
            self.last_collection_date = self.last_collection_date.max(row.paid_on);
        }
        Ok(())
    }
}

/// Aggregates CSV payment ledgers.
#[derive(Debug, Clone)]
pub struct StatementAggregator {
    success_statuses: HashSet<String>,
}

impl StatementAggregator {
    /// Create an aggregator with the given success statuses.
    pub fn new(config: &StatementConfig) -> Self {
        Self {
            success_statuses: config
                .success_statuses
                .iter()
                .map(|s| canonicalize_status(s))
                .collect(),
        }
    }

    /// Aggregate a CSV statement. The first row is the header.
    pub fn aggregate_csv(&self, data: &[u8], options: &StatementOptions) -> Result<StatementAggregate> {
        let text = String::from_utf8_lossy(data);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        self.aggregate_records(headers, reader.records(), options)
    }

    /// Aggregate rows that are already split into cells.
    pub fn aggregate_rows<H, S>(
        &self,
        header: &[H],
        rows: impl IntoIterator<Item = impl AsRef<[S]>>,
        options: &StatementOptions,
    ) -> Result<StatementAggregate>
    where
        H: AsRef<str>,
        S: AsRef<str>,
    {
        let headers = header.iter().map(|h| h.as_ref().to_string()).collect();
        let records = rows.into_iter().map(|row| {
            let record: StringRecord = row.as_ref().iter().map(|cell| cell.as_ref()).collect();
            Ok::<_, csv::Error>(record)
        });
        self.aggregate_records(headers, records, options)
    }

    fn aggregate_records<I>(
        &self,
        headers: Vec<String>,
        records: I,
        options: &StatementOptions,
    ) -> Result<StatementAggregate>
    where
        I: IntoIterator<Item = std::result::Result<StringRecord, csv::Error>>,
    {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(StatementError::MissingHeader);
        }

        let mapping = ColumnMapping::from_headers(&headers);
        for role in ColumnRole::ALL.into_iter().filter(|r| r.is_required()) {
            mapping.require(role)?;
        }
        debug!(
            "Statement columns: {:?}",
            mapping.iter().map(|(role, c)| (role, c.header.as_str())).collect::<Vec<_>>()
        );

        let effective_date = options
            .effective_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| {
                let parsed = parse_date(s);
                if parsed.is_none() {
                    warn!("Ignoring unparseable effective date {:?}", s);
                }
                parsed
            });

        info!(
            "Aggregating statement with {} columns, effective date {:?}",
            headers.len(),
            effective_date
        );

        let mut totals = Totals::default();
        let mut rows_processed = 0;
        let mut rows_counted = 0;
        let mut rows_filtered = 0;
        let mut rows_skipped = 0;

        for record in records {
            rows_processed += 1;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable row {}: {}", rows_processed, e);
                    rows_skipped += 1;
                    continue;
                }
            };

            match self.read_row(&record, &mapping, effective_date) {
                RowOutcome::Filtered => rows_filtered += 1,
                RowOutcome::Malformed(reason) => {
                    trace!("Skipping row {}: {}", rows_processed, reason);
                    rows_skipped += 1;
                }
                RowOutcome::Counted(row) => match totals.add(row) {
                    Ok(()) => rows_counted += 1,
                    Err(reason) => {
                        warn!("Skipping row {}: {}", rows_processed, reason);
                        rows_skipped += 1;
                    }
                },
            }
        }

        if rows_skipped > 0 {
            warn!("Skipped {} malformed statement rows", rows_skipped);
        }

        let rr_percent = options
            .rr_percent
            .as_deref()
            .map(parse_percent)
            .unwrap_or_default();

        let Totals {
            revenue: total_revenue,
            collected: total_collected,
            collected_by_status,
            last_collection_date,
        } = totals;

        let (rr_amount, shortfall) = match rr_percent.parsed() {
            Some(rate) => {
                let rr_amount = total_revenue * *rate;
                let shortfall = rr_amount.shortfall_after(total_collected);
                if shortfall.is_none() {
                    warn!("Shortfall out of range for {} due, {} paid", rr_amount, total_collected);
                }
                (Some(rr_amount), shortfall)
            }
            None => (None, None),
        };

        debug!(
            "Statement totals: revenue={} collected={} rows={} (counted {}, filtered {}, skipped {})",
            total_revenue, total_collected, rows_processed, rows_counted, rows_filtered, rows_skipped
        );

        Ok(StatementAggregate {
            total_revenue,
            total_collected,
            rows_processed,
            rows_counted,
            rows_filtered,
            rows_skipped,
            rr_percent,
            rr_amount,
            shortfall,
            effective_date_applied: effective_date.map(CanonicalDate),
            columns: headers,
            mapping,
            collected_by_status,
            last_collection_date: last_collection_date.map(CanonicalDate),
        })
    }

    fn read_row(
        &self,
        record: &StringRecord,
        mapping: &ColumnMapping,
        effective_date: Option<NaiveDate>,
    ) -> RowOutcome {
        let cell = |role: ColumnRole| -> Option<&str> {
            mapping.index(role).map(|i| record.get(i).unwrap_or(""))
        };

        let revenue_date = cell(ColumnRole::RevenueDate).and_then(parse_date);
        if let (Some(filter), Some(date)) = (effective_date, revenue_date) {
            if date < filter {
                return RowOutcome::Filtered;
            }
        }

        let revenue = match parse_cell_amount(cell(ColumnRole::Revenue)) {
            Ok(amount) => amount,
            Err(raw) => return RowOutcome::Malformed(format!("revenue {:?}", raw)),
        };

        let collected = match parse_cell_amount(cell(ColumnRole::Collected)) {
            Ok(amount) => amount,
            Err(raw) => return RowOutcome::Malformed(format!("collected {:?}", raw)),
        };

        let status = cell(ColumnRole::Status).map(canonicalize_status);
        let successful = match &status {
            Some(status) => self.success_statuses.contains(status),
            None => collected.is_positive(),
        };

        let paid_on = cell(ColumnRole::CollectionDate)
            .and_then(parse_date)
            .or(revenue_date);

        RowOutcome::Counted(ParsedRow {
            revenue,
            collected,
            status,
            successful,
            paid_on,
        })
    }
}

impl Default for StatementAggregator {
    fn default() -> Self {
        Self::new(&StatementConfig::default())
    }
}

/// Aggregate a CSV statement with default success statuses.
pub fn aggregate_statement(data: &[u8], options: &StatementOptions) -> Result<StatementAggregate> {
    StatementAggregator::default().aggregate_csv(data, options)
}

/// Lowercase and keep ASCII letters only (`"Succeeded "` and `"SUCCEEDED!"` agree).
fn canonicalize_status(status: &str) -> String {
    status
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

/// Empty or missing cells count as zero; anything else must parse.
fn parse_cell_amount(cell: Option<&str>) -> std::result::Result<Money, String> {
    match cell {
        None | Some("") => Ok(Money::ZERO),
        Some(raw) => parse_amount(raw).map(Money::new).ok_or_else(|| raw.to_string()),
    }
}

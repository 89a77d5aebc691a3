//! Header canonicalization and column-role mapping.

use std::collections::BTreeMap;

use crate::error::StatementError;
use crate::extract::rules::patterns::HEADER_SEPARATORS;
use crate::models::statement::ColumnRole;

/// Lowercase, collapse every run of non-alphanumerics to `_`, trim `_`.
///
/// `"Revenue Date"`, `"revenue_date"` and `"REVENUE-DATE"` all become
/// `"revenue_date"`.
pub fn canonicalize_header(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    HEADER_SEPARATORS
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// A header cell assigned to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    /// Position in the header row.
    pub index: usize,
    /// Header text as it appears in the file.
    pub header: String,
    /// Canonicalized header.
    pub canonical: String,
}

/// Assignment of actual CSV columns to canonical roles.
///
/// At most one column maps to each role; when several headers match the same
/// role the first in header order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<ColumnRole, MappedColumn>,
}

impl ColumnMapping {
    /// Build the mapping from a header row.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns = BTreeMap::new();

        for (index, header) in headers.into_iter().enumerate() {
            let header = header.as_ref();
            let canonical = canonicalize_header(header);

            let Some(role) = ColumnRole::ALL
                .into_iter()
                .find(|role| role.aliases().contains(&canonical.as_str()))
            else {
                continue;
            };

            columns.entry(role).or_insert_with(|| MappedColumn {
                index,
                header: header.to_string(),
                canonical,
            });
        }

        Self { columns }
    }

    pub fn get(&self, role: ColumnRole) -> Option<&MappedColumn> {
        self.columns.get(&role)
    }

    /// Column index for a role.
    pub fn index(&self, role: ColumnRole) -> Option<usize> {
        self.get(role).map(|c| c.index)
    }

    /// Index of a role that must be present.
    pub fn require(&self, role: ColumnRole) -> Result<usize, StatementError> {
        self.index(role).ok_or(StatementError::MissingColumn(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, &MappedColumn)> {
        self.columns.iter().map(|(role, column)| (*role, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_header() {
        assert_eq!(canonicalize_header("Revenue Date"), "revenue_date");
        assert_eq!(canonicalize_header("revenue_date"), "revenue_date");
        assert_eq!(canonicalize_header("REVENUE-DATE"), "revenue_date");
        assert_eq!(canonicalize_header("  Revenue   Date:: "), "revenue_date");
        assert_eq!(canonicalize_header("\u{feff}Status"), "status");
    }

    #[test]
    fn test_aliases_map_to_roles() {
        for header in ["Revenue Date", "revenue_date", "REVENUE-DATE", "Date", "Payment Date"] {
            let mapping = ColumnMapping::from_headers([header]);
            assert_eq!(mapping.index(ColumnRole::RevenueDate), Some(0), "{header}");
        }
    }

    #[test]
    fn test_full_header_row() {
        let mapping = ColumnMapping::from_headers([
            "Revenue Date",
            "Revenue",
            "Collected",
            "Method",
            "Collection Date",
            "Source",
            "Status",
        ]);

        assert_eq!(mapping.index(ColumnRole::RevenueDate), Some(0));
        assert_eq!(mapping.index(ColumnRole::Revenue), Some(1));
        assert_eq!(mapping.index(ColumnRole::Collected), Some(2));
        assert_eq!(mapping.index(ColumnRole::Method), Some(3));
        assert_eq!(mapping.index(ColumnRole::CollectionDate), Some(4));
        assert_eq!(mapping.index(ColumnRole::Status), Some(6));
        assert_eq!(mapping.iter().count(), 6);
        assert!(mapping.iter().all(|(_, column)| column.header != "Source"));
    }

    #[test]
    fn test_first_matching_header_wins() {
        let mapping = ColumnMapping::from_headers(["Amount", "Gross Revenue", "Date"]);
        let revenue = mapping.get(ColumnRole::Revenue).unwrap();
        assert_eq!(revenue.index, 0);
        assert_eq!(revenue.header, "Amount");
        assert!(mapping.iter().all(|(_, column)| column.header != "Gross Revenue"));
    }

    #[test]
    fn test_require_missing_role() {
        let mapping = ColumnMapping::from_headers(["Date", "Notes"]);
        assert!(mapping.require(ColumnRole::RevenueDate).is_ok());
        assert!(matches!(
            mapping.require(ColumnRole::Revenue),
            Err(StatementError::MissingColumn(ColumnRole::Revenue))
        ));
    }
}

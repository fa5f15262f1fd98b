use std::collections::BTreeSet;

use serde::Serialize;

use super::columns;
use super::model::{RawTable, ReportingPeriod, Row};
use crate::error::{Result, SnapshotError};

pub const AT_CATEGORY: &str = "Capital - Assistive Technology";
pub const ALL_CATEGORY: &str = "All";
pub const NATIONWIDE: &str = "All Australia";

// ---------------------------------------------------------------------------
// Scope: which support category / geography a table is narrowed to
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub category: String,
    pub geography: String,
}

impl Scope {
    pub fn new(category: impl Into<String>, geography: impl Into<String>) -> Self {
        Scope {
            category: category.into(),
            geography: geography.into(),
        }
    }

    /// Capital - Assistive Technology, nationwide.
    pub fn assistive_technology() -> Self {
        Scope::new(AT_CATEGORY, NATIONWIDE)
    }

    /// Same geography, every support category combined.
    pub fn all_supports(&self) -> Self {
        Scope::new(ALL_CATEGORY, self.geography.clone())
    }

    fn matches(&self, row: &Row) -> bool {
        let text = |col: &str| row.get(col).map(|v| v.to_string());
        text(columns::SUPPORT_CATEGORY).as_deref() == Some(self.category.as_str())
            && text(columns::STATE_TERRITORY).as_deref() == Some(self.geography.as_str())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "category '{}' in '{}'", self.category, self.geography)
    }
}

// ---------------------------------------------------------------------------
// ScopedTable: the rows of one sheet that fall inside a scope
// ---------------------------------------------------------------------------

/// Rows of a sheet matching one [`Scope`], in source order.
#[derive(Debug, Clone)]
pub struct ScopedTable {
    pub table: String,
    pub scope: Scope,
    pub rows: Vec<Row>,
}

impl ScopedTable {
    /// Distinct reporting periods present in these rows, sorted.
    pub fn periods(&self) -> BTreeSet<ReportingPeriod> {
        self.rows
            .iter()
            .filter_map(|row| row.get(columns::PERIOD))
            .filter_map(ReportingPeriod::from_cell)
            .collect()
    }
}

/// Fail with a schema error naming the first missing column.
pub fn require_columns(table: &RawTable, required: &[&str]) -> Result<()> {
    match required.iter().find(|col| !table.has_column(col)) {
        Some(missing) => Err(SnapshotError::Schema {
            table: table.name.clone(),
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Keep the rows whose category and geography equal the scope exactly.
///
/// Matching is case-sensitive; run the table through
/// [`normalize`](super::normalize::normalize) first. An empty result is an
/// error since nothing downstream can be derived from it.
pub fn filter_scope(table: &RawTable, scope: &Scope) -> Result<ScopedTable> {
    require_columns(table, &[columns::SUPPORT_CATEGORY, columns::STATE_TERRITORY])?;

    let rows: Vec<Row> = table
        .rows
        .iter()
        .filter(|row| scope.matches(row))
        .cloned()
        .collect();

    if rows.is_empty() {
        return Err(SnapshotError::NoMatchingRow {
            table: table.name.clone(),
            criteria: scope.to_string(),
        });
    }

    log::debug!("'{}': {} of {} rows in {scope}", table.name, rows.len(), table.len());
    Ok(ScopedTable {
        table: table.name.clone(),
        scope: scope.clone(),
        rows,
    })
}

/// The natural maximum of the periods in `scoped`.
pub fn latest_period(scoped: &ScopedTable) -> Result<ReportingPeriod> {
    scoped
        .periods()
        .into_iter()
        .next_back()
        .ok_or_else(|| SnapshotError::NoMatchingRow {
            table: scoped.table.clone(),
            criteria: format!("any reporting period in {}", scoped.scope),
        })
}

/// The first row (in source order) reported for `period`.
///
/// The extract is expected to hold exactly one such row; duplicates are
/// tolerated by taking the first.
pub fn select_period<'a>(scoped: &'a ScopedTable, period: &ReportingPeriod) -> Result<&'a Row> {
    let mut matching = scoped
        .rows
        .iter()
        .filter(|row| row.get(columns::PERIOD).is_some_and(|cell| period.matches(cell)));

    let first = matching.next().ok_or_else(|| SnapshotError::NoMatchingRow {
        table: scoped.table.clone(),
        criteria: format!("period {period} in {}", scoped.scope),
    })?;

    let extra = matching.count();
    if extra > 0 {
        log::warn!(
            "'{}' has {} rows for period {period} in {}; using the first",
            scoped.table,
            extra + 1,
            scoped.scope
        );
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn providers(rows: &[(&str, &str, &str, i64)]) -> RawTable {
        RawTable::from_records(
            "Provider by Total",
            columns::PROVIDERS.iter().map(|c| c.to_string()).collect(),
            rows.iter().map(|&(cat, geo, period, n)| {
                vec![cat.into(), geo.into(), period.into(), CellValue::Integer(n)]
            }),
        )
    }

    #[test]
    fn filters_on_exact_category_and_geography() {
        let table = providers(&[
            (AT_CATEGORY, NATIONWIDE, "2024-Q1", 10),
            (AT_CATEGORY, "NSW", "2024-Q1", 4),
            ("All", NATIONWIDE, "2024-Q1", 99),
            ("capital - assistive technology", NATIONWIDE, "2024-Q1", 1),
        ]);
        let scoped = filter_scope(&table, &Scope::assistive_technology()).unwrap();
        assert_eq!(scoped.rows.len(), 1);
        assert_eq!(scoped.rows[0][columns::ACTIVE_PROVIDER], CellValue::Integer(10));
    }

    #[test]
    fn no_match_is_an_error() {
        let table = providers(&[("All", NATIONWIDE, "2024-Q1", 99)]);
        let err = filter_scope(&table, &Scope::assistive_technology()).unwrap_err();
        assert!(matches!(err, SnapshotError::NoMatchingRow { .. }));
        assert!(err.to_string().contains(AT_CATEGORY));
    }

    #[test]
    fn missing_key_column_is_a_schema_error() {
        let table = RawTable::from_records("Provider by Total", vec!["Period".into()], vec![]);
        let err = filter_scope(&table, &Scope::assistive_technology()).unwrap_err();
        match err {
            SnapshotError::Schema { column, .. } => assert_eq!(column, columns::SUPPORT_CATEGORY),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn latest_period_is_the_natural_max() {
        let table = providers(&[
            (AT_CATEGORY, NATIONWIDE, "2024-Q2", 1),
            (AT_CATEGORY, NATIONWIDE, "2025-Q1", 2),
            (AT_CATEGORY, NATIONWIDE, "2024-Q4", 3),
        ]);
        let scoped = filter_scope(&table, &Scope::assistive_technology()).unwrap();
        assert_eq!(latest_period(&scoped).unwrap().as_str(), "2025-Q1");
    }

    #[test]
    fn duplicate_period_rows_pick_the_first() {
        let table = providers(&[
            (AT_CATEGORY, NATIONWIDE, "2024-Q1", 7),
            (AT_CATEGORY, NATIONWIDE, "2024-Q1", 8),
        ]);
        let scoped = filter_scope(&table, &Scope::assistive_technology()).unwrap();
        let row = select_period(&scoped, &ReportingPeriod::new("2024-Q1")).unwrap();
        assert_eq!(row[columns::ACTIVE_PROVIDER], CellValue::Integer(7));
    }

    #[test]
    fn period_missing_from_another_sheet_fails() {
        let table = providers(&[(AT_CATEGORY, NATIONWIDE, "2024-Q1", 7)]);
        let scoped = filter_scope(&table, &Scope::assistive_technology()).unwrap();
        let err = select_period(&scoped, &ReportingPeriod::new("2024-Q2")).unwrap_err();
        assert!(matches!(err, SnapshotError::NoMatchingRow { .. }));
        assert!(err.to_string().contains("2024-Q2"));
    }
}

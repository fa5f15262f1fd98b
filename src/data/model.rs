use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what a spreadsheet can hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl CellValue {
    /// Text view used for key columns: nulls become empty text.
    pub fn to_trimmed_text(&self) -> String {
        self.to_string().trim().to_string()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Row / RawTable
// ---------------------------------------------------------------------------

/// One sheet row: column name → cell.
pub type Row = BTreeMap<String, CellValue>;

/// A loaded sheet. `columns` keeps the header order of the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        RawTable {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Build a table from header names and positional cells. Short rows are
    /// padded with nulls.
    pub fn from_records<I>(name: impl Into<String>, columns: Vec<String>, records: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let rows = records
            .into_iter()
            .map(|cells| {
                let mut cells = cells.into_iter();
                columns
                    .iter()
                    .map(|col| (col.clone(), cells.next().unwrap_or(CellValue::Null)))
                    .collect()
            })
            .collect();
        RawTable::new(name, columns, rows)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ReportingPeriod
// ---------------------------------------------------------------------------

/// A reporting-period label such as `2024-Q2` or `2025-06-30`.
///
/// Ordering is natural: runs of digits compare by numeric value, everything
/// else compares as text. `Q10` therefore sorts after `Q9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportingPeriod(String);

impl ReportingPeriod {
    pub fn new(label: impl Into<String>) -> Self {
        ReportingPeriod(label.into().trim().to_string())
    }

    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        if cell.is_null() {
            return None;
        }
        let label = cell.to_trimmed_text();
        (!label.is_empty()).then(|| ReportingPeriod(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, cell: &CellValue) -> bool {
        ReportingPeriod::from_cell(cell).as_ref() == Some(self)
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for ReportingPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReportingPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

/// Split a label into alternating digit / non-digit chunks.
fn chunks(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_digit: Option<bool> = None;
    for (i, ch) in s.char_indices() {
        let digit = ch.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            out.push(&s[start..i]);
            start = i;
        }
        prev_digit = Some(digit);
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    for (ca, cb) in chunks(a).into_iter().zip(chunks(b)) {
        let both_digits =
            ca.bytes().all(|c| c.is_ascii_digit()) && cb.bytes().all(|c| c.is_ascii_digit());
        let ord = if both_digits {
            let ta = ca.trim_start_matches('0');
            let tb = cb.trim_start_matches('0');
            ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb))
        } else {
            ca.cmp(cb)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    chunks(a).len().cmp(&chunks(b).len())
}

//! Arithmetic and formatting helpers that turn sheet cells into dashboard
//! figures. Parsing here is strict (`clean_currency`, `share_percent`) while
//! formatting is best-effort (`format_currency`, `format_number`).

use std::fmt;

use serde::{Serialize, Serializer};

use crate::data::model::CellValue;
use crate::error::{Result, SnapshotError};

// ---------------------------------------------------------------------------
// Strict parsing
// ---------------------------------------------------------------------------

/// Parse currency text such as `"$1,234.50"` into `1234.5`.
pub fn clean_currency(text: &str) -> Result<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| SnapshotError::NumericParse {
            text: text.to_string(),
            context: "expected a currency amount".to_string(),
        })
}

/// Numeric value of a cell. Text goes through [`clean_currency`].
/// `context` names the column in the error.
pub fn cell_amount(cell: &CellValue, context: &str) -> Result<f64> {
    match cell {
        CellValue::Integer(i) => Ok(*i as f64),
        CellValue::Float(v) => Ok(*v),
        CellValue::Text(s) => clean_currency(s).map_err(|_| SnapshotError::NumericParse {
            text: s.clone(),
            context: context.to_string(),
        }),
        other => Err(SnapshotError::NumericParse {
            text: other.to_string(),
            context: context.to_string(),
        }),
    }
}

/// `part / whole * 100`, both sides parsed strictly.
pub fn share_percent(part: &CellValue, whole: &CellValue) -> Result<f64> {
    let numerator = cell_amount(part, "share numerator")?;
    let denominator = cell_amount(whole, "share denominator")?;
    if denominator == 0.0 {
        return Err(SnapshotError::DivisionByZero {
            part: part.to_string(),
        });
    }
    Ok(numerator / denominator * 100.0)
}

/// Active participants per active provider, one decimal place.
/// Zero (or negative) providers yields `0.0`.
///
/// Rounding is applied to the exact binary value of the ratio, with exact
/// halves going to the even digit: `10.25` becomes `10.2`, `10.75` becomes
/// `10.8`.
pub fn participants_per_provider(participants: f64, providers: f64) -> f64 {
    if providers <= 0.0 {
        return 0.0;
    }
    let ratio = participants / providers;
    format!("{ratio:.1}").parse().unwrap_or(ratio)
}

// ---------------------------------------------------------------------------
// Share: a percentage that may be unavailable
// ---------------------------------------------------------------------------

/// Share of a total. A zero total yields [`Share::NotAvailable`] instead of
/// failing the snapshot; it is rendered and serialized as `"n/a"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Share {
    Available(f64),
    NotAvailable,
}

impl Share {
    /// Fold a [`share_percent`] result: division by zero becomes
    /// `NotAvailable`, every other error is passed on.
    pub fn from_result(result: Result<f64>) -> Result<Share> {
        match result {
            Ok(value) => Ok(Share::Available(value)),
            Err(SnapshotError::DivisionByZero { part }) => {
                log::warn!("share of {part} is not available: total is zero");
                Ok(Share::NotAvailable)
            }
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Share::Available(v) => write!(f, "{v:.1}% of total"),
            Share::NotAvailable => write!(f, "n/a"),
        }
    }
}

impl Serialize for Share {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Share::Available(v) => serializer.serialize_f64(*v),
            Share::NotAvailable => serializer.serialize_str("n/a"),
        }
    }
}

// ---------------------------------------------------------------------------
// Best-effort formatting
// ---------------------------------------------------------------------------

/// Human-readable dollars: `$1.50B`, `$2.30M`, `$2.30K`, `$12.00`.
/// Anything that does not parse as a number is returned as-is.
pub fn format_currency(value: &CellValue) -> String {
    let amount = match value {
        CellValue::Integer(i) => *i as f64,
        CellValue::Float(v) => *v,
        CellValue::Text(s) => match clean_currency(s) {
            Ok(v) => v,
            Err(_) => return s.clone(),
        },
        other => return other.to_string(),
    };

    let magnitude = amount.abs();
    if magnitude >= 1_000_000_000.0 {
        format!("${:.2}B", amount / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("${:.2}M", amount / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("${:.2}K", amount / 1_000.0)
    } else {
        format!("${amount:.2}")
    }
}

/// Integer counts with thousands separators (`12,345`). Floats are
/// truncated; anything else is returned as-is.
pub fn format_number(value: &CellValue) -> String {
    match value {
        CellValue::Integer(i) => group_thousands(*i),
        CellValue::Float(v) if v.is_finite() => group_thousands(v.trunc() as i64),
        CellValue::Text(s) => match s.trim().parse::<i64>() {
            Ok(i) => group_thousands(i),
            Err(_) => s.clone(),
        },
        other => other.to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

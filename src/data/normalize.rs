use super::columns;
use super::model::{CellValue, RawTable, Row};

/// Columns whose values are used as exact-match filter keys.
pub const KEY_COLUMNS: &[&str] = &[columns::SUPPORT_CATEGORY, columns::STATE_TERRITORY];

/// Strip whitespace from every column name and coerce the key columns to
/// trimmed text. Filters compare with plain string equality, so every sheet
/// goes through here before selection.
pub fn normalize(table: RawTable) -> RawTable {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| c.trim().to_string())
        .collect();

    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(col, val)| {
                    let col = col.trim().to_string();
                    let val = if KEY_COLUMNS.contains(&col.as_str()) {
                        CellValue::Text(val.to_trimmed_text())
                    } else {
                        val
                    };
                    (col, val)
                })
                .collect::<Row>()
        })
        .collect();

    RawTable::new(table.name, columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_headers_and_key_values() {
        let table = RawTable::from_records(
            "Market by Total",
            vec![" Support Category ".into(), "State/Territory".into(), "Payments ".into()],
            vec![vec![
                CellValue::from("  All "),
                CellValue::from("All Australia\t"),
                CellValue::from(" $10 "),
            ]],
        );

        let table = normalize(table);
        assert_eq!(
            table.columns,
            vec![columns::SUPPORT_CATEGORY, columns::STATE_TERRITORY, columns::PAYMENTS]
        );
        let row = &table.rows[0];
        assert_eq!(row[columns::SUPPORT_CATEGORY], CellValue::from("All"));
        assert_eq!(row[columns::STATE_TERRITORY], CellValue::from("All Australia"));
        // measure columns are left alone
        assert_eq!(row["Payments"], CellValue::from(" $10 "));
    }

    #[test]
    fn coerces_non_text_keys() {
        let table = RawTable::from_records(
            "t",
            vec!["Support Category".into(), "State/Territory".into()],
            vec![vec![CellValue::Integer(7), CellValue::Null]],
        );
        let table = normalize(table);
        assert_eq!(table.rows[0]["Support Category"], CellValue::from("7"));
        assert_eq!(table.rows[0]["State/Territory"], CellValue::from(""));
    }
}

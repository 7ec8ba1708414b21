//! Minimal reader for rdb-style tab-delimited tables.
//!
//! An rdb table is plain text: any number of leading `#` comment lines, a
//! tab-separated row of column names, a tab-separated row of column
//! definitions, then one row per record.

use std::collections::HashMap;
use std::io::BufRead;

use crate::{Error, Result};

/// Read the `names` columns from the table in `reader`.
///
/// Column values are returned as strings in row order. Rows shorter than
/// the header are padded with empty fields.
///
/// # Errors
/// [`Error::MissingColumn`] if a requested column is not in the table,
/// [`Error::InvalidTable`] if the header rows are absent, [`Error::Io`]
/// on read failure.
pub fn read_columns<R>(reader: R, names: &[&str]) -> Result<HashMap<String, Vec<String>>>
where
    R: BufRead,
{
    let mut lines = reader.lines();

    let header = loop {
        let Some(line) = lines.next() else {
            return Err(Error::InvalidTable("missing column name row".into()));
        };
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        break line;
    };
    let columns: Vec<&str> = header.split('\t').collect();

    let mut idxs = Vec::with_capacity(names.len());
    for name in names {
        match columns.iter().position(|col| col == name) {
            Some(idx) => idxs.push(idx),
            None => return Err(Error::MissingColumn((*name).to_string())),
        }
    }

    // column definition row; present but not interpreted
    match lines.next() {
        Some(line) => {
            line?;
        }
        None => return Err(Error::InvalidTable("missing column definition row".into())),
    }

    let mut cols: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for line in lines {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        for (col, idx) in cols.iter_mut().zip(&idxs) {
            col.push(fields.get(*idx).copied().unwrap_or("").to_string());
        }
    }

    Ok(names
        .iter()
        .map(|name| (*name).to_string())
        .zip(cols)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "# lab test runs\n\
line\tenergy\tMCP\n\
N\tN\tN\n\
B-K\t183\t2350\n\
C-K\t277\t2350\n\
O-K\t525\t2400\n";

    #[test]
    fn reads_requested_columns() {
        let cols = read_columns(TABLE.as_bytes(), &["line", "MCP"]).unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols["line"], ["B-K", "C-K", "O-K"]);
        assert_eq!(cols["MCP"], ["2350", "2350", "2400"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = read_columns(TABLE.as_bytes(), &["line", "exposure"]).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(name) if name == "exposure"));
    }

    #[test]
    fn short_rows_pad_with_empty_fields() {
        let table = "a\tb\nN\tN\nonly-a\n";
        let cols = read_columns(table.as_bytes(), &["a", "b"]).unwrap();
        assert_eq!(cols["a"], ["only-a"]);
        assert_eq!(cols["b"], [""]);
    }

    #[test]
    fn header_only_table_yields_empty_columns() {
        let table = "a\tb\nN\tN\n";
        let cols = read_columns(table.as_bytes(), &["b"]).unwrap();
        assert!(cols["b"].is_empty());
    }

    #[test]
    fn table_without_definition_row_is_invalid() {
        let err = read_columns("a\tb\n".as_bytes(), &["a"]).unwrap_err();
        assert!(matches!(err, Error::InvalidTable(_)));
    }
}

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;

use crate::data::Row;

/// Read headered CSV into rows keyed by column name. Every cell comes back
/// as a string value; `normalize_rows` decides later which cells are numeric.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("Failed to read CSV record")?;
        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), Value::String(cell.to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_csv_from_stdin() -> Result<Vec<Row>> {
    read_csv(std::io::stdin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_headered_csv() {
        let input = "month,sales\nJan,100\nFeb,250\n";
        let rows = read_csv(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["month"], "Jan");
        assert_eq!(rows[1]["sales"], "250");
    }

    #[test]
    fn test_preserves_column_order() {
        let input = "b,a,c\n1,2,3\n";
        let rows = read_csv(input.as_bytes()).unwrap();
        let keys: Vec<_> = rows[0].keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}

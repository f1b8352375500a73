use serde_json::Value;

use crate::data::{num_value, Row};

/// Coerce heterogeneous cell values into typed values before inference or
/// chart math runs. Pure; input rows are left untouched.
///
/// A string cell becomes a number only when the trimmed text parses fully as
/// a base-10 float AND does not look like a date: `"42"` -> 42, `"2024-05"`
/// stays a string, `"42-10"` stays a string. Nulls stay null here; they
/// collapse to zero only in series-value reads (`data::number_at`).
pub fn normalize_rows(rows: &[Row]) -> Vec<Row> {
    rows.iter().map(normalize_row).collect()
}

fn normalize_row(row: &Row) -> Row {
    let mut out = Row::new();
    for (key, value) in row {
        out.insert(key.clone(), normalize_cell(value));
    }
    out
}

fn normalize_cell(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() && !is_date_like(trimmed) => num_value(n),
                _ => Value::String(trimmed.to_string()),
            }
        }
        other => other.clone(),
    }
}

/// Date-like shapes: `YYYY-MM-DD`, `YYYY-MM-DDThh:mm:ss[.sss]Z`, `YYYY-MM`.
pub fn is_date_like(s: &str) -> bool {
    is_year_month(s) || is_iso_date(s)
}

fn is_year_month(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 7 && digits(&b[0..4]) && b[4] == b'-' && digits(&b[5..7])
}

fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() < 10 || !digits(&b[0..4]) || b[4] != b'-' || !digits(&b[5..7]) || b[7] != b'-' || !digits(&b[8..10]) {
        return false;
    }
    if b.len() == 10 {
        return true;
    }
    // Optional time part: Thh:mm:ss[.sss]Z
    let rest = &b[10..];
    if rest.len() < 10 || rest[0] != b'T' || !digits(&rest[1..3]) || rest[3] != b':' || !digits(&rest[4..6]) || rest[6] != b':' || !digits(&rest[7..9]) {
        return false;
    }
    let tail = &rest[9..];
    match tail {
        [b'Z'] => true,
        [b'.', frac @ .., b'Z'] => !frac.is_empty() && digits(frac),
        _ => false,
    }
}

fn digits(b: &[u8]) -> bool {
    b.iter().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: serde_json::Value) -> Row {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_numeric_strings_become_numbers() {
        let rows = vec![row(json!({"a": "42", "b": " 3.5 ", "c": "-7"}))];
        let out = normalize_rows(&rows);
        assert_eq!(out[0]["a"], json!(42));
        assert_eq!(out[0]["b"], json!(3.5));
        assert_eq!(out[0]["c"], json!(-7));
    }

    #[test]
    fn test_date_like_strings_stay_strings() {
        let rows = vec![row(json!({
            "ym": "2024-05",
            "d": "2024-05-01",
            "ts": "2024-05-01T10:30:00Z",
            "frac": "2024-05-01T10:30:00.123Z",
        }))];
        let out = normalize_rows(&rows);
        assert_eq!(out[0]["ym"], json!("2024-05"));
        assert_eq!(out[0]["d"], json!("2024-05-01"));
        assert_eq!(out[0]["ts"], json!("2024-05-01T10:30:00Z"));
        assert_eq!(out[0]["frac"], json!("2024-05-01T10:30:00.123Z"));
    }

    #[test]
    fn test_partial_numeric_stays_string() {
        let rows = vec![row(json!({"a": "42-10", "b": "NaN", "c": "12abc"}))];
        let out = normalize_rows(&rows);
        assert_eq!(out[0]["a"], json!("42-10"));
        assert_eq!(out[0]["b"], json!("NaN"));
        assert_eq!(out[0]["c"], json!("12abc"));
    }

    #[test]
    fn test_null_and_numbers_pass_through() {
        let rows = vec![row(json!({"n": null, "x": 9, "b": true}))];
        let out = normalize_rows(&rows);
        assert_eq!(out[0]["n"], json!(null));
        assert_eq!(out[0]["x"], json!(9));
        assert_eq!(out[0]["b"], json!(true));
    }

    #[test]
    fn test_input_not_mutated() {
        let rows = vec![row(json!({"a": "42"}))];
        let _ = normalize_rows(&rows);
        assert_eq!(rows[0]["a"], json!("42"));
    }
}

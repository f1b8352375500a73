use serde_json::Value;

use crate::data::{cell_label, num_value, number_at, Row};
use crate::ir::EncodingPlan;

/// Pivot long-format rows (one row per category x group) into wide format
/// (one row per category, one column per group), when the plan declares a
/// grouping field that is present on the first row and exactly one usable
/// value key exists. Otherwise the input passes through untouched.
///
/// Generated columns are named `{value_key}_{group}`; a (category, group)
/// pair with no source rows simply has no key; holes are never zero-filled.
/// The returned plan's `value_keys` are the generated composite names.
pub fn reshape(rows: &[Row], plan: &EncodingPlan) -> (Vec<Row>, EncodingPlan) {
    let series_key = match plan.series_key.as_deref() {
        Some(k) => k,
        None => return (rows.to_vec(), plan.clone()),
    };
    let grouped = rows.first().is_some_and(|r| r.contains_key(series_key));
    if !grouped || plan.value_keys.len() != 1 {
        return (rows.to_vec(), plan.clone());
    }
    let value_key = &plan.value_keys[0];

    // Distinct categories and groups in first-appearance order.
    let mut categories: Vec<Value> = Vec::new();
    let mut groups: Vec<String> = Vec::new();
    for row in rows {
        let cat = row.get(&plan.category_key).cloned().unwrap_or(Value::Null);
        if !categories.contains(&cat) {
            categories.push(cat);
        }
        let group = cell_label(row.get(series_key));
        if !groups.contains(&group) {
            groups.push(group);
        }
    }

    let mut wide = Vec::with_capacity(categories.len());
    for cat in &categories {
        let mut out = Row::new();
        out.insert(plan.category_key.clone(), cat.clone());
        for group in &groups {
            let mut sum = 0.0;
            let mut seen = false;
            for row in rows {
                let row_cat = row.get(&plan.category_key).cloned().unwrap_or(Value::Null);
                if &row_cat == cat && cell_label(row.get(series_key)) == *group {
                    sum += number_at(row, value_key);
                    seen = true;
                }
            }
            if seen {
                out.insert(format!("{}_{}", value_key, group), num_value(sum));
            }
        }
        wide.push(out);
    }

    let mut wide_plan = plan.clone();
    wide_plan.value_keys = groups
        .iter()
        .map(|g| format!("{}_{}", value_key, g))
        .collect();
    wide_plan.series_key = None;
    (wide, wide_plan)
}

/// Annotate each row with `cumulative`: the running share of the total,
/// in percent rounded to two decimals, after a stable descending sort by
/// the value key. A total of zero yields all-zero shares. Idempotent under
/// re-application with the same value key.
pub fn annotate_cumulative(rows: &[Row], value_key: &str) -> Vec<Row> {
    let mut sorted: Vec<Row> = rows.to_vec();
    sorted.sort_by(|a, b| {
        number_at(b, value_key)
            .partial_cmp(&number_at(a, value_key))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total: f64 = sorted.iter().map(|r| number_at(r, value_key)).sum();
    let mut running = 0.0;
    for row in &mut sorted {
        running += number_at(row, value_key);
        let share = if total > 0.0 {
            (running / total * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };
        row.insert("cumulative".to_string(), num_value(share));
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChartConfig;
    use crate::resolve::resolve_encoding;
    use serde_json::json;

    fn rows(v: serde_json::Value) -> Vec<Row> {
        serde_json::from_value(v).unwrap()
    }

    fn sales_by_region() -> (Vec<Row>, EncodingPlan) {
        let cfg: ChartConfig = serde_json::from_value(json!({
            "x_axis_col_name": "month",
            "y_axis_col_name": "sales",
            "series": "region",
        }))
        .unwrap();
        let data = crate::normalize::normalize_rows(&rows(json!([
            {"region": "East", "month": "Jan", "sales": "100"},
            {"region": "East", "month": "Feb", "sales": "200"},
            {"region": "West", "month": "Jan", "sales": "50"},
        ])));
        let plan = resolve_encoding(&cfg, &data);
        (data, plan)
    }

    #[test]
    fn test_pivot_worked_example() {
        let (data, plan) = sales_by_region();
        let (wide, wide_plan) = reshape(&data, &plan);

        assert_eq!(wide_plan.value_keys, vec!["sales_East", "sales_West"]);
        assert_eq!(wide.len(), 2);
        assert_eq!(wide[0]["month"], json!("Jan"));
        assert_eq!(wide[0]["sales_East"], json!(100));
        assert_eq!(wide[0]["sales_West"], json!(50));
        assert_eq!(wide[1]["month"], json!("Feb"));
        assert_eq!(wide[1]["sales_East"], json!(200));
        // Absent pair stays a hole, not a zero.
        assert!(!wide[1].contains_key("sales_West"));
    }

    #[test]
    fn test_pivot_sum_invariant() {
        let (data, plan) = sales_by_region();
        let (wide, wide_plan) = reshape(&data, &plan);
        for cat in ["Jan", "Feb"] {
            let long_sum: f64 = data
                .iter()
                .filter(|r| r["month"] == json!(cat))
                .map(|r| number_at(r, "sales"))
                .sum();
            let wide_row = wide.iter().find(|r| r["month"] == json!(cat)).unwrap();
            let wide_sum: f64 = wide_plan
                .value_keys
                .iter()
                .map(|k| number_at(wide_row, k))
                .sum();
            assert_eq!(long_sum, wide_sum);
        }
    }

    #[test]
    fn test_no_reshape_without_group_on_first_row() {
        let (data, mut plan) = sales_by_region();
        plan.series_key = Some("territory".to_string());
        let (out, out_plan) = reshape(&data, &plan);
        assert_eq!(out.len(), data.len());
        assert_eq!(out_plan.value_keys, plan.value_keys);
    }

    #[test]
    fn test_no_reshape_with_multiple_value_keys() {
        let (data, mut plan) = sales_by_region();
        plan.value_keys = vec!["sales".to_string(), "cost".to_string()];
        let (out, _) = reshape(&data, &plan);
        assert_eq!(out.len(), data.len());
    }

    #[test]
    fn test_duplicate_pairs_are_summed() {
        let cfg: ChartConfig = serde_json::from_value(json!({
            "x_axis_col_name": "month",
            "y_axis_col_name": "sales",
            "series": "region",
        }))
        .unwrap();
        let data = rows(json!([
            {"region": "East", "month": "Jan", "sales": 10},
            {"region": "East", "month": "Jan", "sales": 5},
        ]));
        let plan = resolve_encoding(&cfg, &data);
        let (wide, _) = reshape(&data, &plan);
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0]["sales_East"], json!(15));
    }

    #[test]
    fn test_cumulative_annotation() {
        let data = rows(json!([
            {"cat": "b", "value": 30},
            {"cat": "a", "value": 60},
            {"cat": "c", "value": 10},
        ]));
        let annotated = annotate_cumulative(&data, "value");
        assert_eq!(annotated[0]["cat"], json!("a"));
        assert_eq!(annotated[0]["cumulative"], json!(60));
        assert_eq!(annotated[1]["cumulative"], json!(90));
        assert_eq!(annotated[2]["cumulative"], json!(100));
    }

    #[test]
    fn test_cumulative_idempotent() {
        let data = rows(json!([
            {"cat": "a", "value": 2},
            {"cat": "b", "value": 8},
        ]));
        let once = annotate_cumulative(&data, "value");
        let twice = annotate_cumulative(&once, "value");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cumulative_zero_total() {
        let data = rows(json!([
            {"cat": "a", "value": 0},
            {"cat": "b", "value": 0},
        ]));
        let annotated = annotate_cumulative(&data, "value");
        assert!(annotated.iter().all(|r| r["cumulative"] == json!(0)));
    }

    #[test]
    fn test_cumulative_nulls_read_as_zero() {
        let data = rows(json!([
            {"cat": "a", "value": null},
            {"cat": "b", "value": 40},
        ]));
        let annotated = annotate_cumulative(&data, "value");
        assert_eq!(annotated[0]["cat"], json!("b"));
        assert_eq!(annotated[0]["cumulative"], json!(100));
        assert_eq!(annotated[1]["cumulative"], json!(100));
    }
}

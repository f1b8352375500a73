use std::collections::HashSet;

use serde_json::Value;

use crate::data::{ChartConfig, Row};
use crate::format::pretty_label;
use crate::ir::EncodingPlan;

/// Column-name fragments that mark a key as a natural categorical axis.
const CATEGORY_HINTS: [&str; 6] = ["name", "category", "state", "month", "date", "label"];

/// Resolve a partial chart declaration into a fully-populated encoding plan.
///
/// Total function: it never fails and never panics. With no usable category
/// key the first key of the first row is used; with empty data the category
/// key is the empty string. An inferred `value_keys` can end up pointing at a
/// column no row carries ("value"); downstream reports "no numeric series"
/// instead of failing.
pub fn resolve_encoding(config: &ChartConfig, rows: &[Row]) -> EncodingPlan {
    let first = rows.first();
    let keys: Vec<&String> = first.map(|r| r.keys().collect()).unwrap_or_default();

    let category_key = resolve_category_key(config, rows, &keys);
    let value_keys = resolve_value_keys(config, first, &keys, &category_key);

    let category_label = config
        .x_axis_label
        .clone()
        .unwrap_or_else(|| pretty_label(&category_key));
    let value_label = config.y_axis_label.clone().unwrap_or_else(|| {
        if value_keys.len() == 1 {
            pretty_label(&value_keys[0])
        } else {
            pretty_label(&value_keys.join(", "))
        }
    });

    EncodingPlan {
        category_key,
        value_keys,
        category_label,
        value_label,
        series_key: config.group_key().map(str::to_string),
    }
}

fn resolve_category_key(config: &ChartConfig, rows: &[Row], keys: &[&String]) -> String {
    // 1. Declared axis, first element if a list was sent.
    if let Some(declared) = config
        .x_axis_col_name
        .as_ref()
        .and_then(|c| c.first())
        .or(config.category_col_name.as_deref())
    {
        return declared.to_string();
    }

    // 2. Semantic name hint, case-insensitive substring match.
    if let Some(hinted) = keys.iter().find(|k| {
        let lower = k.to_lowercase();
        CATEGORY_HINTS.iter().any(|h| lower.contains(h))
    }) {
        return (*hinted).clone();
    }

    // 3. First low-cardinality string column.
    let threshold = (rows.len() as f64 / 2.0).max(3.0);
    if let Some(first_row) = rows.first() {
        for key in keys {
            if !matches!(first_row.get(key.as_str()), Some(Value::String(_))) {
                continue;
            }
            let distinct: HashSet<String> = rows
                .iter()
                .map(|r| crate::data::cell_label(r.get(key.as_str())))
                .collect();
            if (distinct.len() as f64) < threshold {
                return (*key).clone();
            }
        }
    }

    // 4. Last resort: literally the first key, or empty for empty data.
    keys.first().map(|k| (*k).clone()).unwrap_or_default()
}

fn resolve_value_keys(
    config: &ChartConfig,
    first: Option<&Row>,
    keys: &[&String],
    category_key: &str,
) -> Vec<String> {
    if let Some(declared) = config.declared_value_keys() {
        return declared;
    }

    let numeric: Vec<String> = first
        .map(|row| {
            keys.iter()
                .filter(|k| matches!(row.get(k.as_str()), Some(Value::Number(_))))
                .filter(|k| k.as_str() != category_key)
                .map(|k| (*k).clone())
                .collect()
        })
        .unwrap_or_default();

    if numeric.is_empty() {
        // Literal "value", declared or not; emptiness is reported downstream.
        vec!["value".to_string()]
    } else {
        numeric
    }
}

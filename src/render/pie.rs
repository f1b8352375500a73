use crate::data::{cell_label, number_at, ChartConfig, Row};
use crate::ir::{ChartShape, EncodingPlan, Portion};
use crate::render::{Prepared, Renderer};

/// Part-to-whole archetype. Non-positive slices carry no angle and are
/// filtered out before rendering; the remainder is sorted descending.
pub struct PieRenderer;

pub static PIE: PieRenderer = PieRenderer;

impl Renderer for PieRenderer {
    fn prepare(&self, rows: &[Row], plan: &EncodingPlan, config: &ChartConfig) -> Prepared {
        let category_key = config
            .category_col_name
            .as_deref()
            .unwrap_or(&plan.category_key);
        let value_key = config
            .value_col_name
            .as_deref()
            .or_else(|| plan.value_keys.first().map(String::as_str))
            .unwrap_or("value");

        let slices = positive_portions(rows, category_key, value_key, config);
        if slices.is_empty() {
            return Prepared::Empty("no positive values for the pie chart".to_string());
        }
        Prepared::Shape(ChartShape::Pie { slices })
    }
}

/// Shared by pie and funnel: label each row, read its value, drop
/// non-positive entries, sort descending (stable).
pub(crate) fn positive_portions(
    rows: &[Row],
    category_key: &str,
    value_key: &str,
    config: &ChartConfig,
) -> Vec<Portion> {
    let label_key = config.label_col_name.as_deref();
    let mut portions: Vec<Portion> = rows
        .iter()
        .map(|row| {
            let name = match label_key.and_then(|k| row.get(k)) {
                Some(v) => cell_label(Some(v)),
                None => match row.get(category_key) {
                    Some(serde_json::Value::Null) | None => "Unknown".to_string(),
                    some => cell_label(some),
                },
            };
            Portion {
                name,
                value: number_at(row, value_key),
            }
        })
        .filter(|p| p.value > 0.0)
        .collect();
    portions.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    portions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChartPayload;
    use crate::ir::RenderOutcome;
    use crate::render::render_chart;
    use serde_json::json;

    fn render(v: serde_json::Value) -> RenderOutcome {
        let p: ChartPayload = serde_json::from_value(v).unwrap();
        render_chart(&p)
    }

    #[test]
    fn test_pie_filters_and_sorts() {
        let outcome = render(json!({
            "chart_type": "pie_chart",
            "data": [
                {"segment": "B", "amount": 20},
                {"segment": "A", "amount": 50},
                {"segment": "C", "amount": 0},
                {"segment": "D", "amount": -5},
            ],
            "chart_config": {"category_col_name": "segment", "value_col_name": "amount"},
        }));
        match outcome {
            RenderOutcome::Chart(desc) => match desc.shape {
                ChartShape::Pie { slices } => {
                    assert_eq!(slices.len(), 2);
                    assert_eq!(slices[0], Portion { name: "A".to_string(), value: 50.0 });
                    assert_eq!(slices[1], Portion { name: "B".to_string(), value: 20.0 });
                }
                other => panic!("expected pie shape, got {:?}", other),
            },
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn test_pie_all_non_positive_is_empty() {
        let outcome = render(json!({
            "chart_type": "pie_chart",
            "data": [{"segment": "A", "amount": 0}],
            "chart_config": {"category_col_name": "segment", "value_col_name": "amount"},
        }));
        assert!(matches!(outcome, RenderOutcome::Empty { .. }));
    }

    #[test]
    fn test_pie_null_category_reads_unknown() {
        let outcome = render(json!({
            "chart_type": "pie_chart",
            "data": [{"segment": null, "amount": 10}],
            "chart_config": {"category_col_name": "segment", "value_col_name": "amount"},
        }));
        match outcome {
            RenderOutcome::Chart(desc) => match desc.shape {
                ChartShape::Pie { slices } => assert_eq!(slices[0].name, "Unknown"),
                other => panic!("expected pie shape, got {:?}", other),
            },
            other => panic!("expected chart, got {:?}", other),
        }
    }
}

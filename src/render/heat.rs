use crate::data::{cell_label, number_at, ChartConfig, Row};
use crate::ir::{ChartShape, EncodingPlan};
use crate::render::{numeric_candidates, safe_value_keys, Prepared, Renderer};

/// Density archetype: one matrix row per value key, one column per data row.
/// Missing cells read as 0 so the grid stays rectangular.
pub struct HeatMapRenderer;

pub static HEAT_MAP: HeatMapRenderer = HeatMapRenderer;

impl Renderer for HeatMapRenderer {
    fn prepare(&self, rows: &[Row], plan: &EncodingPlan, _config: &ChartConfig) -> Prepared {
        let candidates = numeric_candidates(rows, &plan.category_key);
        let y_labels = safe_value_keys(plan, &candidates);
        if y_labels.is_empty() {
            return Prepared::Empty("no numeric series found to render the heat map".to_string());
        }

        let x_labels: Vec<String> = rows
            .iter()
            .map(|r| cell_label(r.get(&plan.category_key)))
            .collect();
        let cells: Vec<Vec<f64>> = y_labels
            .iter()
            .map(|key| rows.iter().map(|r| number_at(r, key)).collect())
            .collect();

        Prepared::Shape(ChartShape::HeatMap {
            x_labels,
            y_labels,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChartPayload;
    use crate::ir::RenderOutcome;
    use crate::render::render_chart;
    use serde_json::json;

    #[test]
    fn test_heat_map_grid() {
        let p: ChartPayload = serde_json::from_value(json!({
            "chart_type": "heat_map",
            "data": [
                {"month": "Jan", "product_a": 30, "product_b": 40},
                {"month": "Feb", "product_a": 50, "product_b": null},
            ],
            "chart_config": {
                "x_axis_col_name": "month",
                "y_axis_col_name": ["product_a", "product_b"],
            },
        }))
        .unwrap();
        match render_chart(&p) {
            RenderOutcome::Chart(desc) => match desc.shape {
                ChartShape::HeatMap {
                    x_labels,
                    y_labels,
                    cells,
                } => {
                    assert_eq!(x_labels, vec!["Jan", "Feb"]);
                    assert_eq!(y_labels, vec!["product_a", "product_b"]);
                    assert_eq!(cells[0], vec![30.0, 50.0]);
                    // Null cell reads as 0 to keep the grid rectangular.
                    assert_eq!(cells[1], vec![40.0, 0.0]);
                }
                other => panic!("expected heat map shape, got {:?}", other),
            },
            other => panic!("expected chart, got {:?}", other),
        }
    }
}

use crate::data::{ChartConfig, Row};
use crate::ir::{ChartShape, EncodingPlan, Geometry, Orientation, Stacking};
use crate::render::{category_axis, numeric_candidates, safe_value_keys, Prepared, Renderer};

/// Trend archetypes: line and its filled-area variant.
pub struct LineRenderer {
    geometry: Geometry,
}

pub static LINE: LineRenderer = LineRenderer {
    geometry: Geometry::Line,
};
pub static AREA: LineRenderer = LineRenderer {
    geometry: Geometry::Area,
};

impl Renderer for LineRenderer {
    fn prepare(&self, rows: &[Row], plan: &EncodingPlan, _config: &ChartConfig) -> Prepared {
        let candidates = numeric_candidates(rows, &plan.category_key);
        let keys = safe_value_keys(plan, &candidates);
        if keys.is_empty() {
            return Prepared::Empty("no numeric series found to render the line chart".to_string());
        }
        Prepared::Shape(ChartShape::Cartesian {
            geometry: self.geometry,
            orientation: Orientation::Vertical,
            stacking: Stacking::None,
            category: category_axis(rows, plan),
            value_label: plan.value_label.clone(),
            series: crate::render::series_for_keys(rows, &keys),
        })
    }
}

use crate::data::{ChartConfig, Row};
use crate::ir::{ChartShape, EncodingPlan, Geometry, Orientation, Stacking};
use crate::render::{category_axis, numeric_candidates, safe_value_keys, Prepared, Renderer};

/// The four bar variants share one preparation path; orientation and
/// stacking are presentation attributes of the description. The horizontal
/// variant swaps category/value onto physical axes downstream; the encoding
/// plan itself stays orientation-agnostic.
pub struct BarRenderer {
    orientation: Orientation,
    stacking: Stacking,
}

pub static VERTICAL: BarRenderer = BarRenderer {
    orientation: Orientation::Vertical,
    stacking: Stacking::None,
};
pub static HORIZONTAL: BarRenderer = BarRenderer {
    orientation: Orientation::Horizontal,
    stacking: Stacking::None,
};
pub static STACKED: BarRenderer = BarRenderer {
    orientation: Orientation::Vertical,
    stacking: Stacking::Stacked,
};
pub static CLUSTERED: BarRenderer = BarRenderer {
    orientation: Orientation::Vertical,
    stacking: Stacking::Clustered,
};

impl Renderer for BarRenderer {
    fn prepare(&self, rows: &[Row], plan: &EncodingPlan, _config: &ChartConfig) -> Prepared {
        let candidates = numeric_candidates(rows, &plan.category_key);
        let keys = safe_value_keys(plan, &candidates);
        if keys.is_empty() {
            return Prepared::Empty("no numeric series found to render the bar chart".to_string());
        }
        Prepared::Shape(ChartShape::Cartesian {
            geometry: Geometry::Bar,
            orientation: self.orientation,
            stacking: self.stacking,
            category: category_axis(rows, plan),
            value_label: plan.value_label.clone(),
            series: crate::render::series_for_keys(rows, &keys),
        })
    }
}

use crate::data::{ChartConfig, Row};
use crate::ir::{ChartShape, EncodingPlan};
use crate::render::pie::positive_portions;
use crate::render::{Prepared, Renderer};

/// Sequential drop-off archetype. Rows missing the stage or value key are
/// skipped; non-positive stages are filtered; stages sort descending.
pub struct FunnelRenderer;

pub static FUNNEL: FunnelRenderer = FunnelRenderer;

impl Renderer for FunnelRenderer {
    fn prepare(&self, rows: &[Row], plan: &EncodingPlan, config: &ChartConfig) -> Prepared {
        let stages_key = config
            .stages_col_name
            .as_deref()
            .unwrap_or(&plan.category_key);
        let value_key = config
            .value_col_name
            .as_deref()
            .or_else(|| plan.value_keys.first().map(String::as_str))
            .unwrap_or("value");

        let usable: Vec<Row> = rows
            .iter()
            .filter(|r| r.contains_key(stages_key) && r.contains_key(value_key))
            .cloned()
            .collect();
        let stages = positive_portions(&usable, stages_key, value_key, config);
        if stages.is_empty() {
            return Prepared::Empty("no valid funnel data".to_string());
        }
        Prepared::Shape(ChartShape::Funnel { stages })
    }
}

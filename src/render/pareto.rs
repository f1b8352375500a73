use crate::data::{number_at, ChartConfig, Row};
use crate::format::pretty_label;
use crate::ir::{ChartShape, EncodingPlan, Series};
use crate::render::{category_axis, numeric_candidates, safe_value_keys, Prepared, Renderer};
use crate::transform::annotate_cumulative;

/// Ranked-contribution archetype: bars sorted descending with a companion
/// cumulative-share line on a 0-100 percent axis.
pub struct ParetoRenderer;

pub static PARETO: ParetoRenderer = ParetoRenderer;

impl Renderer for ParetoRenderer {
    fn prepare(&self, rows: &[Row], plan: &EncodingPlan, _config: &ChartConfig) -> Prepared {
        let candidates = numeric_candidates(rows, &plan.category_key);
        let primary = match safe_value_keys(plan, &candidates).into_iter().next() {
            Some(key) => key,
            None => {
                return Prepared::Empty(
                    "no primary numeric series found for the pareto chart".to_string(),
                )
            }
        };

        let ranked = annotate_cumulative(rows, &primary);
        let bars = Series {
            key: primary.clone(),
            name: pretty_label(&primary),
            values: ranked.iter().map(|r| Some(number_at(r, &primary))).collect(),
        };
        let cumulative = ranked.iter().map(|r| number_at(r, "cumulative")).collect();

        Prepared::Shape(ChartShape::Pareto {
            category: category_axis(&ranked, plan),
            value_label: plan.value_label.clone(),
            bars,
            cumulative,
        })
    }
}

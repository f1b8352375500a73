//! Chart dispatch registry: a closed tag set mapped to archetype renderers.
//! Unknown tags surface as an explicit unsupported state, empty inputs as an
//! explicit empty state; there is no silent fallthrough to a wrong archetype.

pub mod bar;
pub mod funnel;
pub mod heat;
pub mod line;
pub mod map;
pub mod pareto;
pub mod pie;

use serde_json::Value;

use crate::data::{cell_label, opt_number_at, ChartConfig, ChartPayload, Row};
use crate::format::{month_label, pretty_label};
use crate::ir::{CategoryAxis, ChartDescription, ChartKind, ChartShape, EncodingPlan, RenderOutcome, Series};
use crate::normalize::normalize_rows;
use crate::resolve::resolve_encoding;
use crate::transform::reshape;

/// One chart archetype. `prepare` turns resolved rows into a renderable
/// shape, or the empty state when the data cannot carry this archetype.
pub trait Renderer: Sync {
    fn prepare(&self, rows: &[Row], plan: &EncodingPlan, config: &ChartConfig) -> Prepared;
}

pub enum Prepared {
    Shape(ChartShape),
    Empty(String),
}

fn renderer_for(kind: ChartKind) -> &'static dyn Renderer {
    match kind {
        ChartKind::VerticalBarChart => &bar::VERTICAL,
        ChartKind::HorizontalBarChart => &bar::HORIZONTAL,
        ChartKind::StackedBarChart => &bar::STACKED,
        ChartKind::ClusteredBarChart => &bar::CLUSTERED,
        ChartKind::LineChart => &line::LINE,
        ChartKind::LineAreaChart => &line::AREA,
        ChartKind::PieChart => &pie::PIE,
        ChartKind::FunnelChart => &funnel::FUNNEL,
        ChartKind::ParetoChart => &pareto::PARETO,
        ChartKind::BubbleMap => &map::BUBBLE_MAP,
        ChartKind::HeatMap => &heat::HEAT_MAP,
    }
}

/// Full pipeline for one payload: normalize rows, resolve the encoding,
/// reshape long-format data, dispatch on the chart tag. Pure with respect to
/// the payload, so re-rendering already-ingested data any number of times is
/// safe; nothing here caches on row count.
pub fn render_chart(payload: &ChartPayload) -> RenderOutcome {
    let config = &payload.chart_config;

    // A missing tag falls back on the declared grouping, not on a guess per
    // call site: grouped data reads as a trend, ungrouped as a bar.
    let tag = payload.chart_type.clone().unwrap_or_else(|| {
        if config.group_key().is_some() {
            "line_chart".to_string()
        } else {
            "vertical_bar_chart".to_string()
        }
    });
    let kind = match ChartKind::from_tag(&tag) {
        Some(kind) => kind,
        None => return RenderOutcome::Unsupported { chart_type: tag },
    };

    if payload.data.is_empty() {
        return RenderOutcome::Empty {
            reason: "no data".to_string(),
        };
    }

    let rows = normalize_rows(&payload.data);
    let plan = resolve_encoding(config, &rows);
    let (rows, plan) = reshape(&rows, &plan);

    let title = payload
        .title
        .clone()
        .or_else(|| config.title.clone())
        .unwrap_or_else(|| "Chart".to_string());

    match renderer_for(kind).prepare(&rows, &plan, config) {
        Prepared::Shape(shape) => RenderOutcome::Chart(ChartDescription { title, kind, shape }),
        Prepared::Empty(reason) => RenderOutcome::Empty { reason },
    }
}

// =============================================================================
// Shared preparation helpers
// =============================================================================

/// Keys that hold a number in at least one row, in first-appearance order,
/// excluding the category key.
pub(crate) fn numeric_candidates(rows: &[Row], category_key: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for row in rows {
        for (key, value) in row {
            if key != category_key
                && matches!(value, Value::Number(_))
                && !out.contains(key)
            {
                out.push(key.clone());
            }
        }
    }
    out
}

/// The plan's value keys narrowed to columns actually present as numbers;
/// when none survive, up to four observed numeric columns stand in.
pub(crate) fn safe_value_keys(plan: &EncodingPlan, candidates: &[String]) -> Vec<String> {
    let surviving: Vec<String> = plan
        .value_keys
        .iter()
        .filter(|k| candidates.contains(k))
        .cloned()
        .collect();
    if !surviving.is_empty() {
        surviving
    } else {
        candidates.iter().take(4).cloned().collect()
    }
}

/// One tick per row, date-like ticks shortened to month names.
pub(crate) fn category_axis(rows: &[Row], plan: &EncodingPlan) -> CategoryAxis {
    let ticks = rows
        .iter()
        .map(|r| month_label(&cell_label(r.get(&plan.category_key))))
        .collect();
    CategoryAxis {
        key: plan.category_key.clone(),
        label: plan.category_label.clone(),
        ticks,
    }
}

/// One series per key, aligned with the row order; pivot holes stay `None`.
pub(crate) fn series_for_keys(rows: &[Row], keys: &[String]) -> Vec<Series> {
    keys.iter()
        .map(|key| Series {
            key: key.clone(),
            name: pretty_label(key),
            values: rows.iter().map(|r| opt_number_at(r, key)).collect(),
        })
        .collect()
}

use serde::{Deserialize, Serialize};

// =============================================================================
// Phase 1: Encoding resolution
// =============================================================================

/// Fully-populated axis/series assignment, produced by the encoding resolver
/// from an all-optional `ChartConfig` and the observed rows. Orientation
/// agnostic: the horizontal-bar axis swap happens at description time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingPlan {
    pub category_key: String,
    pub value_keys: Vec<String>,
    pub category_label: String,
    pub value_label: String,
    pub series_key: Option<String>,
}

// =============================================================================
// Phase 2: Dispatch
// =============================================================================

/// Closed set of chart archetypes understood by the dispatch registry.
/// Tags match the wire protocol verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    VerticalBarChart,
    HorizontalBarChart,
    StackedBarChart,
    ClusteredBarChart,
    LineChart,
    LineAreaChart,
    PieChart,
    FunnelChart,
    ParetoChart,
    BubbleMap,
    HeatMap,
}

impl ChartKind {
    pub fn from_tag(tag: &str) -> Option<ChartKind> {
        match tag {
            "vertical_bar_chart" | "bar_chart" => Some(ChartKind::VerticalBarChart),
            "horizontal_bar_chart" => Some(ChartKind::HorizontalBarChart),
            "stacked_bar_chart" => Some(ChartKind::StackedBarChart),
            "clustered_bar_chart" => Some(ChartKind::ClusteredBarChart),
            "line_chart" => Some(ChartKind::LineChart),
            "line_area_chart" | "area_chart" => Some(ChartKind::LineAreaChart),
            "pie_chart" => Some(ChartKind::PieChart),
            "funnel_chart" => Some(ChartKind::FunnelChart),
            "pareto_chart" => Some(ChartKind::ParetoChart),
            "bubble_map" => Some(ChartKind::BubbleMap),
            "heat_map" => Some(ChartKind::HeatMap),
            _ => None,
        }
    }
}

// =============================================================================
// Phase 3: Renderable description
// =============================================================================

/// Outcome of dispatching one chart payload. Empty and unsupported states are
/// explicit values, never exceptions and never silently-defaulted charts.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    Chart(ChartDescription),
    /// Valid terminal state: nothing to chart (empty data, no numeric series).
    Empty { reason: String },
    /// The tag is carried so the caller can surface it per chart.
    Unsupported { chart_type: String },
}

/// Backend-neutral description of one renderable chart. The presentation
/// layer executes this blindly; no visual styling lives here.
#[derive(Debug, Clone, Serialize)]
pub struct ChartDescription {
    pub title: String,
    pub kind: ChartKind,
    #[serde(flatten)]
    pub shape: ChartShape,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartShape {
    /// Bars, lines and areas share one category-by-series layout.
    Cartesian {
        geometry: Geometry,
        orientation: Orientation,
        stacking: Stacking,
        category: CategoryAxis,
        value_label: String,
        series: Vec<Series>,
    },
    Pie {
        slices: Vec<Portion>,
    },
    Funnel {
        stages: Vec<Portion>,
    },
    Pareto {
        category: CategoryAxis,
        value_label: String,
        bars: Series,
        /// Running share of total, percent 0-100, aligned with `bars.values`.
        cumulative: Vec<f64>,
    },
    BubbleMap {
        points: Vec<MapPoint>,
    },
    HeatMap {
        x_labels: Vec<String>,
        y_labels: Vec<String>,
        /// cells[y][x], missing cells read as 0.
        cells: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    Bar,
    Line,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stacking {
    None,
    Stacked,
    Clustered,
}

/// The categorical axis: source column, display label, one tick per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAxis {
    pub key: String,
    pub label: String,
    pub ticks: Vec<String>,
}

/// One plotted series. `values` aligns with the category ticks; `None` marks
/// a key absent from that row (pivot holes are not zero-filled).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub key: String,
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// One part-to-whole item (pie slice, funnel stage).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portion {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

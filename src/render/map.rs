use serde_json::Value;

use crate::data::{cell_label, opt_number_at, ChartConfig, Row};
use crate::ir::{ChartShape, EncodingPlan, MapPoint};
use crate::render::{Prepared, Renderer};

/// Geo-magnitude archetype. Coordinate keys are declared or found by name
/// fragment; rows whose coordinates do not parse are skipped.
pub struct BubbleMapRenderer;

pub static BUBBLE_MAP: BubbleMapRenderer = BubbleMapRenderer;

const SIZE_HINTS: [&str; 5] = ["spend", "amount", "total", "value", "size"];

impl Renderer for BubbleMapRenderer {
    fn prepare(&self, rows: &[Row], _plan: &EncodingPlan, config: &ChartConfig) -> Prepared {
        let first = match rows.first() {
            Some(r) => r,
            None => return Prepared::Empty("no data".to_string()),
        };

        let lat_key = resolve_key(config.lat_col_name.as_deref(), first, &["lat"], "lat");
        let lon_key = resolve_key(config.lon_col_name.as_deref(), first, &["lon"], "lon");
        let size_key = config.size_col_name.clone().or_else(|| {
            first
                .keys()
                .find(|k| {
                    let lower = k.to_lowercase();
                    SIZE_HINTS.iter().any(|h| lower.contains(h))
                })
                .cloned()
        });
        let label_key = first.keys().find(|k| k.to_lowercase().contains("city")).cloned();

        let points: Vec<MapPoint> = rows
            .iter()
            .filter_map(|row| {
                let lat = opt_number_at(row, &lat_key)?;
                let lon = opt_number_at(row, &lon_key)?;
                Some(MapPoint {
                    label: label_key.as_deref().and_then(|k| {
                        row.get(k).filter(|v| !matches!(v, Value::Null))
                    }).map(|v| cell_label(Some(v))),
                    lat,
                    lon,
                    size: size_key.as_deref().and_then(|k| opt_number_at(row, k)),
                })
            })
            .collect();

        if points.is_empty() {
            return Prepared::Empty("no rows with usable coordinates".to_string());
        }
        Prepared::Shape(ChartShape::BubbleMap { points })
    }
}

fn resolve_key(declared: Option<&str>, first: &Row, hints: &[&str], fallback: &str) -> String {
    if let Some(k) = declared {
        return k.to_string();
    }
    first
        .keys()
        .find(|k| {
            let lower = k.to_lowercase();
            hints.iter().any(|h| lower.contains(h))
        })
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChartPayload;
    use crate::ir::RenderOutcome;
    use crate::render::render_chart;
    use serde_json::json;

    #[test]
    fn test_bubble_map_infers_keys_by_fragment() {
        let p: ChartPayload = serde_json::from_value(json!({
            "chart_type": "bubble_map",
            "data": [
                {"CITY": "Mumbai", "latitude": "19.07", "longitude": "72.87", "total_spend": 900},
                {"CITY": "Pune", "latitude": "18.52", "longitude": "73.85", "total_spend": 300},
                {"CITY": "Nowhere", "latitude": null, "longitude": null, "total_spend": 10},
            ],
        }))
        .unwrap();
        match render_chart(&p) {
            RenderOutcome::Chart(desc) => match desc.shape {
                ChartShape::BubbleMap { points } => {
                    assert_eq!(points.len(), 2);
                    assert_eq!(points[0].label.as_deref(), Some("Mumbai"));
                    assert_eq!(points[0].lat, 19.07);
                    assert_eq!(points[0].size, Some(900.0));
                }
                other => panic!("expected bubble map shape, got {:?}", other),
            },
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn test_bubble_map_without_coordinates_is_empty() {
        let p: ChartPayload = serde_json::from_value(json!({
            "chart_type": "bubble_map",
            "data": [{"region": "East", "sales": 10}],
        }))
        .unwrap();
        assert!(matches!(render_chart(&p), RenderOutcome::Empty { .. }));
    }
}

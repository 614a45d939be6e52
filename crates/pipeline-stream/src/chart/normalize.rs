use serde_json::Value;
use tracing::debug;

use crate::errors::ChartDataError;

/// Field under which the formatter stage publishes its descriptor. Some
/// producers wrap the descriptor in this field a second time.
pub const DESCRIPTOR_FIELD: &str = "formatted_data_for_visualization";

/// Labels longer than this many characters are shortened for display.
pub const MAX_LABEL_CHARS: usize = 20;

const ELLIPSIS: &str = "...";

/// Normalized visualization type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    /// Passed through to the plotting library under its own name.
    Other(String),
}

impl ChartKind {
    /// Name of the kind as it appears on the wire.
    pub fn name(&self) -> &str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
            Self::Other(name) => name,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// One named data series.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    /// Non-numeric points are kept as gaps.
    pub values: Vec<Option<f64>>,
}

/// A validated chart description.
///
/// `labels.len()` is not guaranteed to equal each series' length.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartDescriptor {
    pub kind: ChartKind,
    pub orientation: Orientation,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub title: String,
}

/// Result of normalizing an untrusted descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum NormalizedChart {
    /// No chart was requested (`type` missing or `"none"`).
    Empty,
    /// A chart was requested but its data is unusable.
    Invalid(ChartDataError),
    Chart(ChartDescriptor),
}

/// Normalizes a formatter payload into a `NormalizedChart`. Never fails.
pub fn normalize(payload: &Value) -> NormalizedChart {
    let descriptor = unwrap_descriptor(payload);
    let Some(object) = descriptor.as_object() else {
        return NormalizedChart::Invalid(ChartDataError::NotAnObject);
    };

    let type_name = object
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default();
    let (kind, orientation) = match type_name.as_str() {
        "" | "none" => return NormalizedChart::Empty,
        "horizontal_bar" => (ChartKind::Bar, Orientation::Horizontal),
        "bar" => (ChartKind::Bar, Orientation::Vertical),
        "line" => (ChartKind::Line, Orientation::Vertical),
        "pie" => (ChartKind::Pie, Orientation::Vertical),
        "scatter" => (ChartKind::Scatter, Orientation::Vertical),
        other => (ChartKind::Other(other.to_string()), Orientation::Vertical),
    };

    let Some(data) = object.get("data").and_then(Value::as_object) else {
        return NormalizedChart::Invalid(ChartDataError::MissingData);
    };
    let Some(raw_labels) = data.get("labels").and_then(Value::as_array) else {
        return NormalizedChart::Invalid(ChartDataError::MissingLabels);
    };
    let Some(raw_values) = data.get("values").and_then(Value::as_array) else {
        return NormalizedChart::Invalid(ChartDataError::MissingValues);
    };

    let labels = raw_labels.iter().map(label_text).map(|l| shorten_label(&l)).collect();
    let mut series = parse_series(raw_values);
    if kind == ChartKind::Pie {
        if series.is_empty() {
            return NormalizedChart::Invalid(ChartDataError::EmptyPie);
        }
        series.truncate(1);
    }

    let title = object
        .get("options")
        .and_then(|o| o.get("title"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    debug!(kind = kind.name(), series = series.len(), "normalized chart descriptor");
    NormalizedChart::Chart(ChartDescriptor {
        kind,
        orientation,
        labels,
        series,
        title,
    })
}

/// Unwraps the stage field, then at most one self-nesting of it.
fn unwrap_descriptor(payload: &Value) -> &Value {
    let outer = payload.get(DESCRIPTOR_FIELD).unwrap_or(payload);
    outer.get(DESCRIPTOR_FIELD).unwrap_or(outer)
}

/// Shortens `label` to `MAX_LABEL_CHARS` characters plus an ellipsis.
pub fn shorten_label(label: &str) -> String {
    match label.char_indices().nth(MAX_LABEL_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &label[..cut]),
        None => label.to_string(),
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_series(raw: &[Value]) -> Vec<Series> {
    // A bare list of numbers is one unnamed series.
    if !raw.is_empty() && raw.iter().all(|v| !v.is_object()) {
        return vec![Series {
            label: "Series 1".to_string(),
            values: raw.iter().map(numeric_value).collect(),
        }];
    }
    raw.iter()
        .filter(|entry| entry.is_object())
        .enumerate()
        .map(|(idx, entry)| Series {
            label: entry
                .get("label")
                .map(label_text)
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| format!("Series {}", idx + 1)),
            values: entry
                .get("data")
                .and_then(Value::as_array)
                .map(|points| points.iter().map(numeric_value).collect())
                .unwrap_or_default(),
        })
        .collect()
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart(value: Value) -> ChartDescriptor {
        match normalize(&value) {
            NormalizedChart::Chart(c) => c,
            other => panic!("expected chart, got {other:?}"),
        }
    }

    #[test]
    fn missing_or_none_type_is_empty() {
        assert_eq!(normalize(&json!({})), NormalizedChart::Empty);
        assert_eq!(normalize(&json!({"type": "none"})), NormalizedChart::Empty);
        assert_eq!(normalize(&json!({"type": "NONE"})), NormalizedChart::Empty);
        assert_eq!(
            normalize(&json!({DESCRIPTOR_FIELD: {"error": "No data available to format."}})),
            NormalizedChart::Empty
        );
    }

    #[test]
    fn missing_labels_or_values_is_invalid() {
        assert_eq!(
            normalize(&json!({"type": "bar"})),
            NormalizedChart::Invalid(ChartDataError::MissingData)
        );
        assert_eq!(
            normalize(&json!({"type": "bar", "data": {"values": []}})),
            NormalizedChart::Invalid(ChartDataError::MissingLabels)
        );
        assert_eq!(
            normalize(&json!({"type": "bar", "data": {"labels": [], "values": "5"}})),
            NormalizedChart::Invalid(ChartDataError::MissingValues)
        );
        assert_eq!(
            normalize(&json!("bar")),
            NormalizedChart::Invalid(ChartDataError::NotAnObject)
        );
    }

    #[test]
    fn horizontal_bar_maps_to_bar_horizontal() {
        let c = chart(json!({"type": "horizontal_bar", "data": {"labels": [], "values": []}}));
        assert_eq!(c.kind, ChartKind::Bar);
        assert_eq!(c.orientation, Orientation::Horizontal);
    }

    #[test]
    fn other_known_types_are_vertical() {
        for (name, kind) in [
            ("bar", ChartKind::Bar),
            ("Line", ChartKind::Line),
            ("pie", ChartKind::Pie),
            ("scatter", ChartKind::Scatter),
        ] {
            let c = chart(json!({
                "type": name,
                "data": {"labels": ["a"], "values": [{"label": "v", "data": [1]}]}
            }));
            assert_eq!(c.kind, kind);
            assert_eq!(c.orientation, Orientation::Vertical);
        }
    }

    #[test]
    fn unwraps_exactly_one_extra_nesting_level() {
        let inner = json!({"type": "line", "data": {"labels": ["a"], "values": [[1]]}});
        let double = json!({DESCRIPTOR_FIELD: {DESCRIPTOR_FIELD: inner.clone()}});
        assert_eq!(chart(double).kind, ChartKind::Line);

        let triple = json!({DESCRIPTOR_FIELD: {DESCRIPTOR_FIELD: {DESCRIPTOR_FIELD: inner}}});
        assert_eq!(normalize(&triple), NormalizedChart::Empty);
    }

    #[test]
    fn pie_keeps_only_first_series() {
        let c = chart(json!({
            "type": "pie",
            "data": {
                "labels": ["a", "b"],
                "values": [
                    {"label": "first", "data": [1, 2]},
                    {"label": "second", "data": [3, 4]},
                    {"label": "third", "data": [5, 6]}
                ]
            }
        }));
        assert_eq!(c.series.len(), 1);
        assert_eq!(c.series[0].values, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn pie_without_series_is_invalid() {
        assert_eq!(
            normalize(&json!({"type": "pie", "data": {"labels": ["a"], "values": []}})),
            NormalizedChart::Invalid(ChartDataError::EmptyPie)
        );
    }

    #[test]
    fn non_pie_keeps_every_series_in_order() {
        let c = chart(json!({
            "type": "bar",
            "data": {
                "labels": ["a"],
                "values": [{"label": "x", "data": [1]}, {"data": ["2.5"]}, {"label": "z", "data": [null]}]
            }
        }));
        let labels: Vec<&str> = c.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["x", "Series 2", "z"]);
        assert_eq!(c.series[1].values, vec![Some(2.5)]);
        assert_eq!(c.series[2].values, vec![None]);
    }

    #[test]
    fn labels_are_truncated_for_display() {
        let long = "abcdefghijklmnopqrstuvwxy"; // 25 chars
        let exact = "abcdefghijklmnopqrst"; // 20 chars
        let c = chart(json!({
            "type": "bar",
            "data": {"labels": [long, exact, 2024], "values": []}
        }));
        assert_eq!(c.labels, vec!["abcdefghijklmnopqrst...", exact, "2024"]);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let label = "é".repeat(25);
        assert_eq!(shorten_label(&label), format!("{}...", "é".repeat(20)));
        assert_eq!(shorten_label(&"é".repeat(20)), "é".repeat(20));
    }

    #[test]
    fn title_comes_from_options() {
        let c = chart(json!({
            "type": "bar",
            "data": {"labels": [], "values": []},
            "options": {"title": "Cost by region"}
        }));
        assert_eq!(c.title, "Cost by region");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SessionError;

/// One record of an analytical payload: an ordered mapping from column name to
/// a JSON scalar. Rows in one payload are not guaranteed to share keys.
pub type Row = Map<String, Value>;

/// Read a cell as a number for series math. Nulls and missing keys collapse
/// to 0 here, and only here; identity/category cells are never coerced.
pub fn number_at(row: &Row, key: &str) -> f64 {
    cell_number(row.get(key)).unwrap_or(0.0)
}

/// Read a cell as a number, keeping "absent" distinct from zero.
pub fn opt_number_at(row: &Row, key: &str) -> Option<f64> {
    cell_number(row.get(key))
}

fn cell_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Render a cell as a category/group label.
pub fn cell_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => "null".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Build a JSON number, preferring the integer representation when exact.
pub fn num_value(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// A column declaration that arrives as either a single name or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    One(String),
    Many(Vec<String>),
}

impl ColumnRef {
    pub fn first(&self) -> Option<&str> {
        match self {
            ColumnRef::One(s) => Some(s),
            ColumnRef::Many(v) => v.first().map(String::as_str),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            ColumnRef::One(s) => vec![s.clone()],
            ColumnRef::Many(v) => v.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnRef::One(_) => 1,
            ColumnRef::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Best-effort declaration of chart intent. Every field is optional; absent
/// fields are inferred by the encoding resolver, never defaulted ad hoc.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_col_name: Option<ColumnRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_col_name: Option<ColumnRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_col_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_col_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_col_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stages_col_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat_col_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon_col_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_col_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartConfig {
    /// The declared grouping field, in declaration-priority order.
    pub fn group_key(&self) -> Option<&str> {
        self.series
            .as_deref()
            .or(self.cluster_by.as_deref())
            .or(self.stack_by.as_deref())
            .or(self.color_by.as_deref())
    }

    /// Declared value columns, normalized to a list.
    pub fn declared_value_keys(&self) -> Option<Vec<String>> {
        if let Some(y) = &self.y_axis_col_name {
            return Some(y.to_vec());
        }
        self.value_col_name.as_ref().map(|v| vec![v.clone()])
    }
}

/// One chart as announced on the wire. Immutable once received; reshaping
/// produces new rows rather than touching these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default)]
    pub chart_config: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub claim: String,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub interpretation: String,
}

/// The merge target for one streamed assistant turn. Narrative fields arrive
/// piecemeal; `charts` is append-only for the life of the answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticalResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_quality_alert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detailed_findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_followups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<ChartPayload>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalyticalResult {
    /// Shallow merge: incoming fields overwrite same-named fields, everything
    /// else is unioned. Used by the `complete` reducer.
    pub fn merge_from(&mut self, incoming: AnalyticalResult) {
        macro_rules! take_some {
            ($field:ident) => {
                if incoming.$field.is_some() {
                    self.$field = incoming.$field;
                }
            };
        }
        take_some!(answer);
        take_some!(executive_summary);
        take_some!(data_quality_alert);
        take_some!(root_cause_analysis);
        if !incoming.key_insights.is_empty() {
            self.key_insights = incoming.key_insights;
        }
        if !incoming.recommendations.is_empty() {
            self.recommendations = incoming.recommendations;
        }
        if !incoming.detailed_findings.is_empty() {
            self.detailed_findings = incoming.detailed_findings;
        }
        if !incoming.suggested_followups.is_empty() {
            self.suggested_followups = incoming.suggested_followups;
        }
        if !incoming.charts.is_empty() {
            self.charts = incoming.charts;
        }
        for (k, v) in incoming.extra {
            self.extra.insert(k, v);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One turn in the conversation. Assistant turns carry either plain text
/// (greetings, failures) or a merged analytical result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub from: Sender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalyticalResult>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            from: Sender::User,
            text: Some(text.into()),
            result: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Message {
            from: Sender::Assistant,
            text: Some(text.into()),
            result: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant_result(result: AnalyticalResult) -> Self {
        Message {
            from: Sender::Assistant,
            text: None,
            result: Some(result),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only ordered sequence of turns. The only post-append mutation is the
/// additive merge the stream session performs on its own in-progress message.
#[derive(Debug, Default, Serialize)]
pub struct Transcript {
    pub messages: Vec<Message>,
    #[serde(skip)]
    in_flight: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Transcript::default()
    }

    /// Record a user turn and open the gate for one streamed answer.
    /// Fails while a previous answer is still streaming on this transcript.
    pub fn begin_query(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        if self.in_flight {
            return Err(SessionError::QueryInFlight);
        }
        self.messages.push(Message::user(text));
        self.in_flight = true;
        Ok(())
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn close_query(&mut self) {
        self.in_flight = false;
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

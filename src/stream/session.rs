use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::data::{AnalyticalResult, ChartConfig, ChartPayload, Message, Row, Transcript};
use crate::stream::decoder::StreamFrame;

/// Ephemeral status attached to an in-flight answer. Discarded at the
/// terminal frame; never persisted into an `AnalyticalResult`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "progress")]
    pub percent: Option<f64>,
    #[serde(default)]
    pub stage: Option<String>,
}

/// Drives one streamed answer against one transcript: classifies frames by
/// event name and folds them additively into the in-progress assistant
/// message. One session per outstanding query; independent transcripts get
/// independent sessions and share nothing.
#[derive(Debug, Default)]
pub struct Session {
    message_ix: Option<usize>,
    progress: Option<Progress>,
    done: bool,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn apply_frame(&mut self, transcript: &mut Transcript, frame: &StreamFrame) {
        if self.done {
            warn!(event = ?frame.event, "frame after terminal state ignored");
            return;
        }
        match frame.event.as_deref() {
            Some("progress") => self.update_progress(&frame.payload),
            Some("chart") => {
                self.apply_chart(transcript, &frame.payload);
                self.update_progress(&frame.payload);
            }
            Some("complete") => self.apply_complete(transcript, &frame.payload),
            Some("error") => {
                let description = frame
                    .payload
                    .get("message")
                    .or_else(|| frame.payload.get("error"))
                    .and_then(Value::as_str)
                    .unwrap_or("the analysis stream reported an error")
                    .to_string();
                self.terminate_with_text(transcript, &description);
            }
            other => warn!(event = ?other, "unrecognized frame event ignored"),
        }
    }

    /// Transport failure: fatal to this session only. The transcript keeps
    /// its history and stays usable for a fresh query.
    pub fn fail(&mut self, transcript: &mut Transcript, description: &str) {
        if !self.done {
            self.terminate_with_text(transcript, description);
        }
    }

    /// Convert an aborted read into a visible terminal state, so no
    /// transcript entry is left showing only ephemeral progress.
    pub fn abort(&mut self, transcript: &mut Transcript, reason: &str) {
        self.fail(transcript, reason);
    }

    fn update_progress(&mut self, payload: &Value) {
        match Progress::deserialize(payload) {
            Ok(p) => self.progress = Some(p),
            Err(_) => self.progress = Some(Progress::default()),
        }
    }

    fn apply_chart(&mut self, transcript: &mut Transcript, payload: &Value) {
        let chart = match payload.get("chart") {
            Some(value) => match ChartPayload::deserialize(value) {
                Ok(chart) => chart,
                Err(err) => {
                    warn!(%err, "chart frame with undecodable chart ignored");
                    return;
                }
            },
            None => return,
        };
        let ix = self.ensure_message(transcript);
        if let Some(result) = transcript.messages[ix].result.as_mut() {
            result.charts.push(chart);
        }
    }

    fn apply_complete(&mut self, transcript: &mut Transcript, payload: &Value) {
        let raw = payload.get("result").cloned().unwrap_or(Value::Null);
        let incoming = match raw {
            Value::Null => AnalyticalResult::default(),
            value => match serde_json::from_value::<AnalyticalResult>(value) {
                Ok(result) => result,
                Err(err) => {
                    warn!(%err, "complete frame with undecodable result ignored");
                    AnalyticalResult::default()
                }
            },
        };
        let incoming = promote_quick_insight(incoming);

        let ix = self.ensure_message(transcript);
        let message = &mut transcript.messages[ix];
        if let Some(result) = message.result.as_mut() {
            result.merge_from(incoming);
        }
        message.timestamp = chrono::Utc::now();

        self.progress = None;
        self.done = true;
        transcript.close_query();
    }

    fn terminate_with_text(&mut self, transcript: &mut Transcript, description: &str) {
        transcript.push(Message::assistant_text(format!(
            "Sorry, something went wrong: {}. Please try again.",
            description
        )));
        self.progress = None;
        self.done = true;
        transcript.close_query();
    }

    /// The in-progress assistant message, created on first need. A terminal
    /// frame with no prior chart frames still gets a message to land in.
    fn ensure_message(&mut self, transcript: &mut Transcript) -> usize {
        match self.message_ix {
            Some(ix) => ix,
            None => {
                transcript.push(Message::assistant_result(AnalyticalResult::default()));
                let ix = transcript.messages.len() - 1;
                self.message_ix = Some(ix);
                ix
            }
        }
    }
}

/// A quick-insight `complete` frame carries bare `answer` + `chart_config` +
/// `data` instead of a charts array. Promote those three fields into one
/// synthesized chart so the rest of the pipeline sees a uniform result.
/// Pure: a reducer from incoming result to incoming result.
pub fn promote_quick_insight(mut result: AnalyticalResult) -> AnalyticalResult {
    // "suggested_actions" is the wire spelling of follow-ups.
    if result.suggested_followups.is_empty() {
        if let Some(actions) = result.extra.remove("suggested_actions") {
            if let Ok(actions) = serde_json::from_value::<Vec<String>>(actions) {
                result.suggested_followups = actions;
            }
        }
    }

    let is_quick_insight = result.answer.is_some()
        && result.executive_summary.is_none()
        && result.extra.contains_key("chart_config")
        && result.extra.contains_key("data");
    if !is_quick_insight {
        return result;
    }

    let config: ChartConfig = result
        .extra
        .remove("chart_config")
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    let data: Vec<Row> = result
        .extra
        .remove("data")
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    result.extra.remove("sql_query");

    let chart_type = result
        .extra
        .get("chart_type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| guess_chart_type(&config));
    let title = config
        .title
        .clone()
        .or_else(|| {
            result
                .extra
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Quick Insight".to_string());

    result.charts = vec![ChartPayload {
        title: Some(title),
        chart_type: Some(chart_type),
        data,
        chart_config: config,
    }];
    result
}

/// Chart-type guess for undeclared quick insights: grouped data reads as a
/// trend, several declared value columns as a stacked comparison, anything
/// else as a plain vertical bar.
fn guess_chart_type(config: &ChartConfig) -> String {
    if config.group_key().is_some() {
        "line_chart".to_string()
    } else if config.y_axis_col_name.as_ref().is_some_and(|y| y.len() > 1) {
        "stacked_bar_chart".to_string()
    } else {
        "vertical_bar_chart".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sender;
    use serde_json::json;

    fn frame(event: &str, payload: Value) -> StreamFrame {
        StreamFrame {
            event: Some(event.to_string()),
            payload,
        }
    }

    fn start() -> (Transcript, Session) {
        let mut t = Transcript::new();
        t.begin_query("show me sales").unwrap();
        (t, Session::new())
    }

    #[test]
    fn test_progress_is_ephemeral() {
        let (mut t, mut s) = start();
        s.apply_frame(
            &mut t,
            &frame("progress", json!({"message": "running sql", "progress": 40, "stage": "sql"})),
        );
        assert_eq!(s.progress().unwrap().percent, Some(40.0));
        assert_eq!(t.messages.len(), 1); // only the user turn

        s.apply_frame(&mut t, &frame("complete", json!({"result": {"answer": "done"}})));
        assert!(s.progress().is_none());
        assert!(s.is_done());
    }

    #[test]
    fn test_charts_append_in_arrival_order() {
        let (mut t, mut s) = start();
        s.apply_frame(&mut t, &frame("chart", json!({"chart": {"title": "A"}})));
        s.apply_frame(&mut t, &frame("chart", json!({"chart": {"title": "B"}})));
        s.apply_frame(
            &mut t,
            &frame("complete", json!({"result": {"executive_summary": "done"}})),
        );

        assert_eq!(t.messages.len(), 2);
        let answer = t.messages.last().unwrap();
        assert_eq!(answer.from, Sender::Assistant);
        let result = answer.result.as_ref().unwrap();
        assert_eq!(result.executive_summary.as_deref(), Some("done"));
        let titles: Vec<_> = result
            .charts
            .iter()
            .map(|c| c.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_complete_without_prior_message_creates_one() {
        let (mut t, mut s) = start();
        s.apply_frame(&mut t, &frame("complete", json!({"result": {"answer": "42"}})));
        let answer = t.messages.last().unwrap();
        assert_eq!(answer.result.as_ref().unwrap().answer.as_deref(), Some("42"));
        assert!(!t.is_in_flight());
    }

    #[test]
    fn test_quick_insight_promotion() {
        let promoted = promote_quick_insight(
            serde_json::from_value(json!({
                "answer": "Revenue rose 12%.",
                "chart_config": {"y_axis_col_name": ["revenue"]},
                "data": [{"month": "Jan", "revenue": 100}],
                "sql_query": "select 1",
            }))
            .unwrap(),
        );
        assert_eq!(promoted.charts.len(), 1);
        let chart = &promoted.charts[0];
        assert_eq!(chart.chart_type.as_deref(), Some("vertical_bar_chart"));
        assert_eq!(chart.title.as_deref(), Some("Quick Insight"));
        assert_eq!(chart.data.len(), 1);
        // Raw fields are gone; the answer stays narrative.
        assert!(!promoted.extra.contains_key("chart_config"));
        assert!(!promoted.extra.contains_key("data"));
        assert!(!promoted.extra.contains_key("sql_query"));
        assert_eq!(promoted.answer.as_deref(), Some("Revenue rose 12%."));
    }

    #[test]
    fn test_quick_insight_type_guesses() {
        let grouped: ChartConfig =
            serde_json::from_value(json!({"series": "region"})).unwrap();
        assert_eq!(guess_chart_type(&grouped), "line_chart");
        let multi: ChartConfig =
            serde_json::from_value(json!({"y_axis_col_name": ["a", "b"]})).unwrap();
        assert_eq!(guess_chart_type(&multi), "stacked_bar_chart");
        assert_eq!(guess_chart_type(&ChartConfig::default()), "vertical_bar_chart");
    }

    #[test]
    fn test_summary_present_skips_promotion() {
        let untouched = promote_quick_insight(
            serde_json::from_value(json!({
                "answer": "a",
                "executive_summary": "already full",
                "chart_config": {},
                "data": [],
            }))
            .unwrap(),
        );
        assert!(untouched.charts.is_empty());
        assert!(untouched.extra.contains_key("chart_config"));
    }

    #[test]
    fn test_error_event_terminates_with_text() {
        let (mut t, mut s) = start();
        s.apply_frame(&mut t, &frame("chart", json!({"chart": {"title": "A"}})));
        s.apply_frame(&mut t, &frame("error", json!({"message": "warehouse unreachable"})));

        assert!(s.is_done());
        assert!(!t.is_in_flight());
        let last = t.messages.last().unwrap();
        assert!(last.text.as_ref().unwrap().contains("warehouse unreachable"));
        assert!(last.result.is_none());
    }

    #[test]
    fn test_late_frames_ignored() {
        let (mut t, mut s) = start();
        s.apply_frame(&mut t, &frame("complete", json!({"result": {"answer": "done"}})));
        let len = t.messages.len();
        s.apply_frame(&mut t, &frame("chart", json!({"chart": {"title": "late"}})));
        assert_eq!(t.messages.len(), len);
        let result = t.messages.last().unwrap().result.as_ref().unwrap();
        assert!(result.charts.is_empty());
    }

    #[test]
    fn test_abort_leaves_visible_terminal_state() {
        let (mut t, mut s) = start();
        s.apply_frame(&mut t, &frame("progress", json!({"message": "working"})));
        s.abort(&mut t, "the connection was interrupted");
        assert!(s.is_done());
        assert!(!t.is_in_flight());
        let last = t.messages.last().unwrap();
        assert!(last.text.as_ref().unwrap().contains("interrupted"));
    }

    #[test]
    fn test_independent_transcripts_are_isolated() {
        let (mut t1, mut s1) = start();
        let mut t2 = Transcript::new();
        t2.begin_query("other question").unwrap();
        let mut s2 = Session::new();

        s1.apply_frame(&mut t1, &frame("chart", json!({"chart": {"title": "A"}})));
        s2.apply_frame(&mut t2, &frame("complete", json!({"result": {"answer": "b"}})));

        assert!(!s1.is_done());
        assert!(s2.is_done());
        assert_eq!(t1.messages.len(), 2);
        assert_eq!(t2.messages.len(), 2);
    }
}

use serde_json::Value;

use crate::errors::ClientError;
use crate::event::StreamEvent;

/// Default prefix of lines that carry an event payload.
pub const DEFAULT_EVENT_PREFIX: &str = "data:";

/// Extracts events from decoded frames.
#[derive(Clone, Debug)]
pub struct EventFrameParser {
    prefix: String,
}

impl Default for EventFrameParser {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_PREFIX)
    }
}

impl EventFrameParser {
    /// Creates a parser that recognises lines starting with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Parses one frame.
    ///
    /// Returns `Ok(None)` for lines that carry no event (blank lines, comments,
    /// keep-alives, anything without the event prefix). A prefixed line whose
    /// payload is not a well-formed event object is a framing error.
    pub fn parse_frame(&self, frame: &str) -> Result<Option<StreamEvent>, ClientError> {
        let Some(rest) = frame.strip_prefix(self.prefix.as_str()) else {
            return Ok(None);
        };
        let payload = rest.trim();
        if payload.is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(payload)
            .map_err(|e| ClientError::framing(format!("invalid event JSON: {e}")))?;
        let Value::Object(mut object) = value else {
            return Err(ClientError::framing("event payload is not a JSON object"));
        };
        let stage_name = match object.remove("event") {
            Some(Value::String(name)) => name,
            Some(_) => return Err(ClientError::framing("event name is not a string")),
            None => return Err(ClientError::framing("event payload has no `event` field")),
        };
        let data = match object.remove("data") {
            Some(Value::Null) | None => Value::Object(serde_json::Map::new()),
            Some(data) => data,
        };
        Ok(Some(StreamEvent::new(&stage_name, data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Stage, StagePayload};

    #[test]
    fn ignores_lines_without_event_prefix() {
        let parser = EventFrameParser::default();
        for line in ["", ": keep-alive", "event: message", "id: 4", "data:", "data:    "] {
            assert_eq!(parser.parse_frame(line), Ok(None), "line {line:?}");
        }
    }

    #[test]
    fn parses_event_with_data() {
        let parser = EventFrameParser::default();
        let event = parser
            .parse_frame(r#"data: {"event":"validate_sql","data":{"validated_sql":"SELECT 1"}}"#)
            .expect("parse")
            .expect("event");
        assert_eq!(event.stage, Stage::ValidateSql);
        assert_eq!(
            event.payload,
            StagePayload::ValidateSql {
                validated_sql: Some("SELECT 1".into()),
                error: None
            }
        );
    }

    #[test]
    fn end_event_without_data_is_accepted() {
        let parser = EventFrameParser::default();
        let event = parser
            .parse_frame(r#"data: {"event": "end"}"#)
            .expect("parse")
            .expect("event");
        assert_eq!(event.stage, Stage::End);
        assert_eq!(event.payload, StagePayload::End);
    }

    #[test]
    fn malformed_payloads_are_framing_errors() {
        let parser = EventFrameParser::default();
        for line in [
            "data: {not json",
            "data: [1, 2]",
            r#"data: {"data": {}}"#,
            r#"data: {"event": 3}"#,
        ] {
            let err = parser.parse_frame(line).expect_err(line);
            assert!(matches!(err, ClientError::Framing { .. }), "line {line:?}");
        }
    }

    #[test]
    fn custom_prefix_is_honoured() {
        let parser = EventFrameParser::new("event-data:");
        assert_eq!(parser.parse_frame(r#"data: {"event":"end"}"#), Ok(None));
        assert!(
            parser
                .parse_frame(r#"event-data: {"event":"end"}"#)
                .expect("parse")
                .is_some()
        );
    }
}

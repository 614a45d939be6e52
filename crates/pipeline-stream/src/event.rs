use std::fmt;

use serde_json::Value;

use crate::table::TableData;

/// Backend pipeline phase that produced an event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    ValidateQuestion,
    ValidateSql,
    ExecuteSql,
    Visualizer,
    Formatter,
    Insight,
    End,
    Error,
    /// A stage this client does not know about; ignored by the dispatcher.
    Unknown(String),
}

impl Stage {
    /// Maps a wire name to a stage. Never fails.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "validate_question" => Self::ValidateQuestion,
            "validate_sql" => Self::ValidateSql,
            "execute_sql" => Self::ExecuteSql,
            "visualizer" => Self::Visualizer,
            "formatter" => Self::Formatter,
            "insight" => Self::Insight,
            "end" => Self::End,
            "error" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the wire name of the stage.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ValidateQuestion => "validate_question",
            Self::ValidateSql => "validate_sql",
            Self::ExecuteSql => "execute_sql",
            Self::Visualizer => "visualizer",
            Self::Formatter => "formatter",
            Self::Insight => "insight",
            Self::End => "end",
            Self::Error => "error",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage-specific payload, validated when the frame is parsed.
///
/// Fields of the wrong JSON type inside a known stage degrade to `None` or an
/// empty value instead of failing the frame.
#[derive(Clone, Debug, PartialEq)]
pub enum StagePayload {
    ValidateQuestion {
        error: Option<String>,
    },
    ValidateSql {
        validated_sql: Option<String>,
        error: Option<String>,
    },
    ExecuteSql {
        table: TableData,
        error: Option<String>,
    },
    Visualizer {
        visualization: Option<String>,
    },
    /// Raw chart descriptor; normalized by the chart module on dispatch.
    Formatter {
        descriptor: Value,
    },
    Insight {
        markdown: String,
    },
    End,
    Error {
        message: String,
    },
    Unknown {
        data: Value,
    },
}

impl StagePayload {
    /// Builds the typed payload for `stage` from the event's `data` value.
    pub fn from_value(stage: &Stage, data: Value) -> Self {
        match stage {
            Stage::ValidateQuestion => Self::ValidateQuestion {
                error: error_field(&data),
            },
            Stage::ValidateSql => Self::ValidateSql {
                validated_sql: string_field(&data, "validated_sql"),
                error: error_field(&data),
            },
            Stage::ExecuteSql => Self::ExecuteSql {
                table: data
                    .get("sql_dataframe")
                    .map(TableData::from_value)
                    .unwrap_or_default(),
                error: error_field(&data),
            },
            Stage::Visualizer => Self::Visualizer {
                visualization: string_field(&data, "visualization"),
            },
            Stage::Formatter => Self::Formatter { descriptor: data },
            Stage::Insight => Self::Insight {
                markdown: string_field(&data, "insight").unwrap_or_default(),
            },
            Stage::End => Self::End,
            Stage::Error => Self::Error {
                message: opaque_message(&data),
            },
            Stage::Unknown(_) => Self::Unknown { data },
        }
    }
}

/// One decoded protocol event.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamEvent {
    pub stage: Stage,
    pub payload: StagePayload,
}

impl StreamEvent {
    /// Builds an event from a stage name and its raw `data` value.
    pub fn new(stage_name: &str, data: Value) -> Self {
        let stage = Stage::from_wire(stage_name);
        let payload = StagePayload::from_value(&stage, data);
        Self { stage, payload }
    }
}

fn string_field(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

/// Reads the `error` field the way a truthiness check would: absent, `null`,
/// `false`, `0` and `""` mean no error. Any other value becomes message text.
fn error_field(data: &Value) -> Option<String> {
    match data.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Bool(true) => Some("unknown error".to_string()),
        other => Some(opaque_message(other)),
    }
}

fn opaque_message(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        Value::Null => "unknown error".to_string(),
        Value::Object(map) => match ["error", "message", "detail"]
            .iter()
            .find_map(|key| map.get(*key))
        {
            Some(Value::String(text)) => text.clone(),
            _ => data.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stage_names_round_trip_through_wire_form() {
        for name in [
            "validate_question",
            "validate_sql",
            "execute_sql",
            "visualizer",
            "formatter",
            "insight",
            "end",
            "error",
        ] {
            let stage = Stage::from_wire(name);
            assert!(!matches!(stage, Stage::Unknown(_)), "{name} should be known");
            assert_eq!(stage.as_str(), name);
        }
        assert_eq!(
            Stage::from_wire("content_classification"),
            Stage::Unknown("content_classification".into())
        );
    }

    #[test]
    fn execute_sql_payload_parses_table() {
        let event = StreamEvent::new(
            "execute_sql",
            json!({"sql_dataframe": {"columns": ["a"], "data": [[1]]}}),
        );
        match event.payload {
            StagePayload::ExecuteSql { table, error } => {
                assert_eq!(table.columns, vec!["a"]);
                assert_eq!(table.data.len(), 1);
                assert!(error.is_none());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn wrongly_typed_fields_degrade_to_none() {
        let event = StreamEvent::new("validate_sql", json!({"validated_sql": 42}));
        assert_eq!(
            event.payload,
            StagePayload::ValidateSql {
                validated_sql: None,
                error: None
            }
        );
    }

    #[test]
    fn error_field_follows_truthiness() {
        let cases = [
            (json!({"error": "bad"}), Some("bad")),
            (json!({"error": {"detail": "Unsupported question"}}), Some("Unsupported question")),
            (json!({"error": true}), Some("unknown error")),
            (json!({"error": ""}), None),
            (json!({"error": false}), None),
            (json!({"error": null}), None),
            (json!({}), None),
        ];
        for (data, expected) in cases {
            let event = StreamEvent::new("validate_question", data.clone());
            assert_eq!(
                event.payload,
                StagePayload::ValidateQuestion {
                    error: expected.map(str::to_string)
                },
                "data {data}"
            );
        }
    }

    #[test]
    fn error_payload_is_rendered_as_opaque_text() {
        let as_string = StreamEvent::new("error", json!("db timeout"));
        assert_eq!(
            as_string.payload,
            StagePayload::Error {
                message: "db timeout".into()
            }
        );
        let as_object = StreamEvent::new("error", json!({"code": 7}));
        assert_eq!(
            as_object.payload,
            StagePayload::Error {
                message: "{\"code\":7}".into()
            }
        );
    }
}

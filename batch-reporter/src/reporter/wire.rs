// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The JSON-lines event stream format.
//!
//! Each non-blank line is one JSON object tagged by an `"event"` field:
//!
//! ```text
//! {"event":"dispatch","agents":["Chrome","Firefox"]}
//! {"event":"agent-result","agent":"Chrome","details":{"name":"a.html","passed":1,"failed":0}}
//! {"event":"agent-beat","agent":"Chrome"}
//! {"event":"complete"}
//! ```
//!
//! Result trees arrive untyped. An object carrying all of `passed`, `failed` and `type` is a test
//! leaf; any other object is a suite. This is the only place that shape is sniffed: everything
//! downstream sees [`ResultNode`].

use super::events::*;
use crate::errors::{EventParseError, EventParseErrorKind};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::BufRead;

#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum WireEvent {
    Dispatch {
        agents: Vec<AgentId>,
    },
    AgentResult {
        agent: AgentId,
        details: WireAgentResult,
    },
    AgentScriptError {
        agent: AgentId,
        details: ScriptErrorDetails,
    },
    AgentError {
        agent: AgentId,
        details: AgentErrorDetails,
    },
    AgentComplete {
        agent: AgentId,
    },
    AgentBeat {
        agent: AgentId,
    },
    Complete,
}

#[derive(Deserialize)]
struct WireAgentResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    passed: u64,
    #[serde(default)]
    failed: u64,
    #[serde(default)]
    coverage: Option<CoverageSample>,
    #[serde(flatten)]
    rest: IndexMap<String, Value>,
}

/// Parses a single line of the event stream.
///
/// Returns `Ok(None)` for blank lines. `line_number` is 1-based and only used for errors.
pub fn parse_event_line(
    line_number: usize,
    line: &str,
) -> Result<Option<ReporterEvent>, EventParseError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let wire: WireEvent = serde_json::from_str(line)
        .map_err(|err| EventParseError::new(line_number, EventParseErrorKind::Json(err)))?;
    wire.into_event()
        .map(Some)
        .map_err(|kind| EventParseError::new(line_number, kind))
}

impl WireEvent {
    fn into_event(self) -> Result<ReporterEvent, EventParseErrorKind> {
        let event = match self {
            WireEvent::Dispatch { agents } => ReporterEvent::Dispatch { agents },
            WireEvent::AgentResult { agent, details } => ReporterEvent::AgentResult {
                agent,
                details: details.into_details()?,
            },
            WireEvent::AgentScriptError { agent, details } => {
                ReporterEvent::AgentScriptError { agent, details }
            }
            WireEvent::AgentError { agent, details } => {
                ReporterEvent::AgentError { agent, details }
            }
            WireEvent::AgentComplete { agent } => ReporterEvent::AgentComplete { agent },
            WireEvent::AgentBeat { agent } => ReporterEvent::AgentBeat { agent },
            WireEvent::Complete => ReporterEvent::Complete,
        };
        Ok(event)
    }
}

impl WireAgentResult {
    fn into_details(self) -> Result<AgentResultDetails, EventParseErrorKind> {
        let mut path = Vec::new();
        let children = convert_children(&mut path, self.rest)?;
        Ok(AgentResultDetails {
            name: self.name,
            passed: self.passed,
            failed: self.failed,
            coverage: self.coverage,
            children,
        })
    }
}

/// Converts the object-valued entries of `entries` into result nodes. Other values are skipped.
fn convert_children(
    path: &mut Vec<String>,
    entries: impl IntoIterator<Item = (String, Value)>,
) -> Result<IndexMap<String, ResultNode>, EventParseErrorKind> {
    let mut children = IndexMap::new();
    for (key, value) in entries {
        if let Value::Object(object) = value {
            path.push(key.clone());
            let node = convert_node(path, &key, object)?;
            path.pop();
            children.insert(key, node);
        }
    }
    Ok(children)
}

fn convert_node(
    path: &mut Vec<String>,
    key: &str,
    mut object: Map<String, Value>,
) -> Result<ResultNode, EventParseErrorKind> {
    if is_leaf(&object) {
        return convert_leaf(path, key, &object).map(ResultNode::TestLeaf);
    }

    let name = match object.remove("name") {
        Some(Value::String(name)) => name,
        _ => key.to_owned(),
    };
    let children = convert_children(path, object)?;
    Ok(ResultNode::Suite(Suite { name, children }))
}

fn is_leaf(object: &Map<String, Value>) -> bool {
    object.contains_key("passed") && object.contains_key("failed") && object.contains_key("type")
}

fn convert_leaf(
    path: &[String],
    key: &str,
    object: &Map<String, Value>,
) -> Result<TestLeaf, EventParseErrorKind> {
    let invalid = |field, reason| EventParseErrorKind::InvalidLeaf {
        path: path.join("/"),
        field,
        reason,
    };
    let count = |field: &'static str| {
        object
            .get(field)
            .and_then(Value::as_u64)
            .ok_or_else(|| invalid(field, "is not a non-negative integer"))
    };
    let optional_str = |field: &'static str| match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(field, "is not a string")),
    };

    Ok(TestLeaf {
        name: optional_str("name")?.unwrap_or_else(|| key.to_owned()),
        passed: count("passed")?,
        failed: count("failed")?,
        result: optional_str("result")?,
        message: optional_str("message")?.unwrap_or_default(),
    })
}

/// Reads [`ReporterEvent`]s from a JSON-lines stream, skipping blank lines.
#[derive(Debug)]
pub struct EventReader<R> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> EventReader<R> {
    /// Creates a new reader over `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<ReporterEvent, EventParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line_number += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    return Some(Err(EventParseError::new(
                        self.line_number,
                        EventParseErrorKind::Read(err),
                    )));
                }
            }
            match parse_event_line(self.line_number, &self.buf) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn parse(line: &str) -> ReporterEvent {
        parse_event_line(1, line)
            .expect("line parses")
            .expect("line is not blank")
    }

    #[test]
    fn simple_events() {
        assert_eq!(
            parse(r#"{"event":"dispatch","agents":["Chrome","Firefox"]}"#),
            ReporterEvent::Dispatch {
                agents: vec!["Chrome".into(), "Firefox".into()],
            }
        );
        assert_eq!(
            parse(r#"{"event":"agent-beat","agent":"Chrome"}"#),
            ReporterEvent::AgentBeat {
                agent: "Chrome".into(),
            }
        );
        assert_eq!(
            parse(
                r#"{"event":"agent-script-error","agent":"IE","details":{"message":"x is undefined","url":"http://h/t.js","line":12}}"#
            ),
            ReporterEvent::AgentScriptError {
                agent: "IE".into(),
                details: ScriptErrorDetails {
                    message: "x is undefined".to_owned(),
                    url: "http://h/t.js".to_owned(),
                    line: Some(ErrorLine::Number(12.into())),
                },
            }
        );
        assert_eq!(parse(r#"{"event":"complete"}"#), ReporterEvent::Complete);
        assert!(parse_event_line(1, "   \n").unwrap().is_none());
    }

    #[test_case(r#""line":null"#, None ; "null")]
    #[test_case(r#""url":"u""#, None ; "missing")]
    #[test_case(r#""line":"12""#, Some("12") ; "string")]
    #[test_case(r#""line":12.5"#, Some("12.5") ; "float")]
    #[test_case(r#""line":true"#, Some("true") ; "other scalar")]
    fn script_error_fields_are_lenient(fields: &str, line: Option<&str>) {
        let event = parse(&format!(
            r#"{{"event":"agent-script-error","agent":"IE","details":{{{fields}}}}}"#
        ));
        let ReporterEvent::AgentScriptError { details, .. } = event else {
            panic!("expected script error, got {event:?}");
        };
        assert_eq!(details.message, "");
        assert_eq!(details.line.map(|line| line.to_string()).as_deref(), line);
    }

    #[test]
    fn agent_error_without_message() {
        assert_eq!(
            parse(r#"{"event":"agent-error","agent":"IE","details":{}}"#),
            ReporterEvent::AgentError {
                agent: "IE".into(),
                details: AgentErrorDetails::default(),
            }
        );
    }

    #[test]
    fn result_tree_is_typed() {
        let event = parse(
            r#"{"event":"agent-result","agent":"Chrome","details":{
                "name":"ui.html","passed":1,"failed":1,
                "coverage":{"a.js":{"calledLines":3,"coveredLines":10}},
                "ui":{"name":"UI suite","passed":1,"failed":1,"total":2,
                    "login":{"passed":0,"failed":1,"type":"test","result":"fail","message":"expected true\ngot false"},
                    "signup":{"passed":1,"failed":0,"type":"test","result":"pass","name":"signs up"}},
                "timestamp":"ignored"}}"#,
        );

        let ReporterEvent::AgentResult { agent, details } = event else {
            panic!("expected agent result, got {event:?}");
        };
        assert_eq!(agent.as_str(), "Chrome");
        assert_eq!(details.name, "ui.html");
        assert_eq!((details.passed, details.failed), (1, 1));
        assert_eq!(
            details.coverage,
            Some(CoverageSample::new([(
                "a.js".to_owned(),
                FileCoverage {
                    called_lines: 3,
                    covered_lines: 10,
                },
            )]))
        );

        // The string-valued "timestamp" field is not a node.
        assert_eq!(details.children.len(), 1);
        let Some(ResultNode::Suite(suite)) = details.children.get("ui") else {
            panic!("expected ui suite, got {:?}", details.children);
        };
        assert_eq!(suite.name, "UI suite");
        let keys: Vec<_> = suite.children.keys().map(String::as_str).collect();
        assert_eq!(keys, ["login", "signup"]);
        assert_eq!(
            suite.children["login"],
            ResultNode::TestLeaf(TestLeaf {
                name: "login".to_owned(),
                passed: 0,
                failed: 1,
                result: Some("fail".to_owned()),
                message: "expected true\ngot false".to_owned(),
            })
        );
        let ResultNode::TestLeaf(signup) = &suite.children["signup"] else {
            panic!("signup should be a leaf");
        };
        assert_eq!(signup.name, "signs up");
        assert!(!signup.is_failure());
    }

    #[test]
    fn object_missing_type_is_a_suite() {
        let event = parse(
            r#"{"event":"agent-result","agent":"A","details":{"name":"n","passed":0,"failed":0,
                "group":{"passed":0,"failed":0}}}"#,
        );
        let ReporterEvent::AgentResult { details, .. } = event else {
            panic!("expected agent result");
        };
        assert_eq!(
            details.children["group"],
            ResultNode::Suite(Suite {
                name: "group".to_owned(),
                children: IndexMap::new(),
            })
        );
    }

    #[test]
    fn invalid_leaf_reports_path() {
        let err = parse_event_line(
            7,
            r#"{"event":"agent-result","agent":"A","details":{"name":"n","passed":0,"failed":1,
                "outer":{"inner":{"passed":"zero","failed":1,"type":"test"}}}}"#,
        )
        .expect_err("leaf with string count is rejected");
        assert_eq!(err.line_number(), 7);
        assert_eq!(
            err.kind().to_string(),
            "invalid test leaf at `outer/inner`: field `passed` is not a non-negative integer"
        );
    }

    #[test]
    fn unknown_event_is_an_error() {
        let err = parse_event_line(3, r#"{"event":"reticulate"}"#).expect_err("unknown event");
        assert_eq!(err.line_number(), 3);
        assert!(matches!(err.kind(), EventParseErrorKind::Json(_)));
    }

    #[test]
    fn reader_skips_blank_lines_and_counts_lines() {
        let input = indoc! {r#"
            {"event":"dispatch","agents":["A"]}

            {"event":"agent-complete","agent":"A"}
            not json
        "#};
        let mut reader = EventReader::new(input.as_bytes());

        assert_eq!(
            reader.next().unwrap().unwrap(),
            ReporterEvent::Dispatch {
                agents: vec!["A".into()],
            }
        );
        assert_eq!(
            reader.next().unwrap().unwrap(),
            ReporterEvent::AgentComplete { agent: "A".into() }
        );
        let err = reader.next().unwrap().expect_err("line 4 is not JSON");
        assert_eq!(err.line_number(), 4);
        assert!(reader.next().is_none());
    }
}
